//! Output contract of the page-extraction boundary.
//!
//! An extractor run never fails on a missing field: each field either holds
//! the text found on the page or that field's sentinel string. The sentinel
//! is data, not an error, and is stored verbatim downstream.

use serde::{Deserialize, Serialize};

/// Sentinel strings recorded when a field could not be located on the page.
pub mod sentinel {
    pub const TITLE: &str = "Title not found";
    pub const PRICE: &str = "Price not found";
    pub const DESCRIPTION: &str = "Description not found";
    pub const HIGHLIGHTS: &str = "Highlights not found";
    pub const RATING: &str = "Rating not found";
    pub const REVIEWS: &str = "Reviews not found";
    pub const IMAGE: &str = "Image not found";
    pub const TOTAL_PURCHASES: &str = "Total purchases not found";
}

/// A raw field record produced by one extractor run against a product page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawProduct {
    pub title: String,
    pub price: String,
    pub description: String,
    pub highlights: String,
    pub rating: String,
    pub reviews: String,
    pub image_url: String,
    pub total_purchases: String,
}

impl RawProduct {
    /// A record with every field set to its sentinel.
    pub fn missing() -> Self {
        Self {
            title: sentinel::TITLE.to_string(),
            price: sentinel::PRICE.to_string(),
            description: sentinel::DESCRIPTION.to_string(),
            highlights: sentinel::HIGHLIGHTS.to_string(),
            rating: sentinel::RATING.to_string(),
            reviews: sentinel::REVIEWS.to_string(),
            image_url: sentinel::IMAGE.to_string(),
            total_purchases: sentinel::TOTAL_PURCHASES.to_string(),
        }
    }
}
