//! Record types for extracted listings data
//!
//! Two plain data records flow through the pipelines: a search result
//! (one per listing card on a results page) and a review (one per review
//! card on a detail page). Construction never fails: blank or missing
//! string fields become a `"No <fieldname>"` placeholder, present fields
//! are trimmed. Nothing else is transformed.

/// A record that can be deduplicated and serialized by a pipeline
pub trait Record: Send + 'static {
    /// Column names, in the stable order used for the header row
    fn fields() -> &'static [&'static str];

    /// The natural key used to detect duplicates
    fn key(&self) -> &str;

    /// Field values in the same order as [`Record::fields`]
    fn values(&self) -> Vec<String>;
}

/// Normalizes a raw extracted field: trimmed when present and non-blank,
/// a field-specific placeholder otherwise
fn normalize(raw: Option<&str>, field: &str) -> String {
    match raw.map(str::trim) {
        Some(trimmed) if !trimmed.is_empty() => trimmed.to_string(),
        _ => format!("No {}", field),
    }
}

/// One listing card from a search results page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRecord {
    pub name: String,
    pub description: String,
    pub dates: String,
    pub price: String,
    pub url: String,
}

impl SearchRecord {
    /// Builds a record from raw extracted fields, normalizing each one
    pub fn new(
        name: Option<&str>,
        description: Option<&str>,
        dates: Option<&str>,
        price: Option<&str>,
        url: Option<&str>,
    ) -> Self {
        Self {
            name: normalize(name, "name"),
            description: normalize(description, "description"),
            dates: normalize(dates, "dates"),
            price: normalize(price, "price"),
            url: normalize(url, "url"),
        }
    }
}

impl Record for SearchRecord {
    fn fields() -> &'static [&'static str] {
        &["name", "description", "dates", "price", "url"]
    }

    fn key(&self) -> &str {
        &self.name
    }

    fn values(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.description.clone(),
            self.dates.clone(),
            self.price.clone(),
            self.url.clone(),
        ]
    }
}

/// One review card from a listing detail page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRecord {
    pub name: String,
    /// Count of filled star indicators; never negative
    pub stars: u32,
    pub review: String,
}

impl ReviewRecord {
    /// Builds a record from raw extracted fields, normalizing each one
    pub fn new(name: Option<&str>, stars: u32, review: Option<&str>) -> Self {
        Self {
            name: normalize(name, "name"),
            stars,
            review: normalize(review, "review"),
        }
    }
}

impl Record for ReviewRecord {
    fn fields() -> &'static [&'static str] {
        &["name", "stars", "review"]
    }

    fn key(&self) -> &str {
        &self.name
    }

    fn values(&self) -> Vec<String> {
        vec![self.name.clone(), self.stars.to_string(), self.review.clone()]
    }
}
