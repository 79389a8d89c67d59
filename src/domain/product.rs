use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::extraction::RawProduct;
use crate::domain::types::{ProductId, ProductUrl};

/// One timestamped price reading in a product's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Raw currency text as shown on the page, e.g. `"₹1,299"` or `"$10"`.
    pub price: String,
    pub observed_at: NaiveDateTime,
}

/// A tracked product listing with its full price history.
///
/// Descriptive fields keep whatever the extractor saw at creation time,
/// including per-field sentinels. `price_history` is append-only and ordered
/// oldest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub url: ProductUrl,
    pub title: String,
    pub description: String,
    pub highlights: String,
    pub rating: String,
    pub reviews: String,
    pub image_url: String,
    pub total_purchases: String,
    pub price_history: Vec<PricePoint>,
    pub created_at: NaiveDateTime,
}

impl Product {
    /// The newest recorded observation, if any.
    pub fn latest_price(&self) -> Option<&PricePoint> {
        self.price_history.last()
    }

    /// The oldest recorded observation, if any.
    pub fn oldest_price(&self) -> Option<&PricePoint> {
        self.price_history.first()
    }
}

/// Extractor output shaped into product fields plus a single price
/// observation, ready for the merge engine.
///
/// Normalization never fails and performs no validation: sentinel strings
/// pass through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedProduct {
    pub title: String,
    pub description: String,
    pub highlights: String,
    pub rating: String,
    pub reviews: String,
    pub image_url: String,
    pub total_purchases: String,
    pub price: String,
}

impl From<RawProduct> for NormalizedProduct {
    fn from(raw: RawProduct) -> Self {
        Self {
            title: raw.title,
            description: raw.description,
            highlights: raw.highlights,
            rating: raw.rating,
            reviews: raw.reviews,
            image_url: raw.image_url,
            total_purchases: raw.total_purchases,
            price: raw.price,
        }
    }
}

/// Information required to create a new [`Product`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub url: ProductUrl,
    pub title: String,
    pub description: String,
    pub highlights: String,
    pub rating: String,
    pub reviews: String,
    pub image_url: String,
    pub total_purchases: String,
    /// First price observation, recorded at creation time.
    pub price: String,
}

impl NewProduct {
    pub fn new(url: ProductUrl, fields: NormalizedProduct) -> Self {
        Self {
            url,
            title: fields.title,
            description: fields.description,
            highlights: fields.highlights,
            rating: fields.rating,
            reviews: fields.reviews,
            image_url: fields.image_url,
            total_purchases: fields.total_purchases,
            price: fields.price,
        }
    }
}

/// Reduces raw price text to a comparable number.
///
/// Currency symbols and thousands separators are dropped; the first `.` is
/// kept as the decimal point. Returns `None` when no digits remain, which is
/// the case for sentinel values.
pub fn parse_price_text(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    // Keep only the first decimal point so "1.299.00" does not slip through.
    let mut seen_dot = false;
    let cleaned: String = cleaned
        .chars()
        .filter(|c| {
            if *c == '.' {
                if seen_dot {
                    return false;
                }
                seen_dot = true;
            }
            true
        })
        .collect();
    cleaned.parse::<f64>().ok()
}
