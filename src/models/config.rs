use serde::Deserialize;

use crate::extractor::css::SelectorSet;
use crate::repository::PriceIndex;
use crate::services::merge::MergePolicy;

/// Configuration options for the pricewatch service.
///
/// Loaded from an optional `pricewatch.yaml` next to the binary, overridable
/// through `PRICEWATCH_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Skip the price append when the newest recorded price is unchanged.
    /// Off by default: every successful fetch is recorded.
    #[serde(default)]
    pub append_on_change_only: bool,
    /// Filter catalog search on the oldest observation instead of the
    /// latest, matching the behavior of earlier deployments.
    #[serde(default)]
    pub legacy_price_filter: bool,
    /// CSS selectors used by the page extractor.
    #[serde(default)]
    pub selectors: SelectorSet,
}

impl AppConfig {
    pub fn merge_policy(&self) -> MergePolicy {
        MergePolicy {
            append_on_change_only: self.append_on_change_only,
        }
    }

    pub fn price_index(&self) -> PriceIndex {
        if self.legacy_price_filter {
            PriceIndex::Oldest
        } else {
            PriceIndex::Latest
        }
    }
}

fn default_database_url() -> String {
    "pricewatch.db".to_string()
}

fn default_bind_address() -> String {
    "127.0.0.1:8080".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            bind_address: default_bind_address(),
            append_on_change_only: false,
            legacy_price_filter: false,
            selectors: SelectorSet::default(),
        }
    }
}
