//! Page-extraction boundary.
//!
//! The rest of the system only depends on [`ProductExtractor`]: a stateless
//! URL-to-record function. Client and session lifecycle stay behind this
//! boundary.

use thiserror::Error;

use crate::domain::extraction::RawProduct;
use crate::domain::types::ProductUrl;

pub mod css;

/// Errors raised when an extraction run fails outright. Missing fields are
/// not errors; they come back as sentinel values in the record.
#[derive(Debug, Error)]
pub enum ExtractorError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("unexpected HTTP status {0}")]
    Status(reqwest::StatusCode),
    #[error("invalid selector `{0}`")]
    Selector(String),
}

/// Loads a product page and yields the raw field record.
#[allow(async_fn_in_trait)]
pub trait ProductExtractor {
    async fn extract(&self, url: &ProductUrl) -> Result<RawProduct, ExtractorError>;
}
