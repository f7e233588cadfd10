use serde::{Deserialize, Serialize};

/// Structured catalog row for one watch listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Stable row id
    pub id: i64,

    /// Listing title
    #[serde(default)]
    pub title: Option<String>,

    /// Price as scraped (with or without a leading `$`)
    #[serde(default)]
    pub price: Option<String>,

    /// Overall rating text (e.g., "4.5 out of 5 stars")
    #[serde(default)]
    pub overall_rating: Option<String>,

    /// Total review count text
    #[serde(default)]
    pub total_reviews: Option<String>,

    /// Availability text
    #[serde(default)]
    pub availability: Option<String>,

    /// Model number
    #[serde(default)]
    pub model_number: Option<String>,

    /// Band material
    #[serde(default)]
    pub material: Option<String>,

    /// Item length
    #[serde(default)]
    pub item_length: Option<String>,

    /// Clasp type
    #[serde(default)]
    pub clasp: Option<String>,
}

/// Non-blank, trimmed field value
fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Render a catalog item into the sentence-style text that gets embedded
///
/// Every field contributes a sentence; missing or blank fields fall back to a
/// fixed phrase, so two items missing the same fields render identically
/// apart from their present fields.
pub fn render_document(item: &CatalogItem) -> String {
    let title = present(&item.title).unwrap_or("N/A");
    let price = present(&item.price)
        .map(|p| format!("The product costs ${}.", p.trim_start_matches('$')))
        .unwrap_or_else(|| "Price not available.".to_string());
    let rating = present(&item.overall_rating)
        .map(|r| format!("It has an overall rating of {}.", r))
        .unwrap_or_else(|| "No rating available.".to_string());
    // A missing review count reuses the rating fallback phrase
    let reviews = present(&item.total_reviews)
        .map(|r| format!("It also has a total of {} reviews.", r))
        .unwrap_or_else(|| "No rating available.".to_string());
    let availability =
        present(&item.availability).unwrap_or("Availability information not provided.");
    let model = present(&item.model_number)
        .map(|m| format!("The model number is {}.", m))
        .unwrap_or_else(|| "Model number not provided.".to_string());
    let material = present(&item.material)
        .map(|m| format!("The material is {}.", m))
        .unwrap_or_else(|| "Material not specified.".to_string());
    let length = present(&item.item_length)
        .map(|l| format!("It has an item length of {}.", l))
        .unwrap_or_else(|| "Item length not provided.".to_string());
    let clasp = present(&item.clasp)
        .map(|c| format!("The clasp type is {}.", c))
        .unwrap_or_else(|| "Clasp type not specified.".to_string());

    format!(
        "{}. {} {} {} {} {} {} {} {}",
        title, price, rating, reviews, availability, model, material, length, clasp
    )
}
