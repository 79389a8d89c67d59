use std::time::Duration;

use reqwest::Client;
use scraper::{Html, Selector};
use serde::Deserialize;

use crate::domain::extraction::{RawProduct, sentinel};
use crate::domain::types::ProductUrl;
use crate::extractor::{ExtractorError, ProductExtractor};

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0 Safari/537.36";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Per-field CSS selectors driving the extractor.
///
/// Storefront markup changes without notice, so selectors live in
/// configuration rather than code. `highlights` may match several elements;
/// their texts are joined with `", "`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectorSet {
    pub title: String,
    pub price: String,
    pub description: String,
    pub highlights: String,
    pub rating: String,
    pub reviews: String,
    pub image: String,
    pub total_purchases: String,
}

impl Default for SelectorSet {
    fn default() -> Self {
        Self {
            title: "h1".to_string(),
            price: ".price".to_string(),
            description: ".description".to_string(),
            highlights: ".highlights li".to_string(),
            rating: ".rating".to_string(),
            reviews: ".reviews".to_string(),
            image: ".product-image img".to_string(),
            total_purchases: ".total-purchases".to_string(),
        }
    }
}

/// Extractor that fetches a page over HTTP and scrapes configured CSS
/// selectors. Fields without a match come back as their sentinel.
#[derive(Clone)]
pub struct CssExtractor {
    client: Client,
    selectors: SelectorSet,
}

impl CssExtractor {
    pub fn new(selectors: SelectorSet) -> Result<Self, ExtractorError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client, selectors })
    }

    fn selector(source: &str) -> Result<Selector, ExtractorError> {
        Selector::parse(source).map_err(|_| ExtractorError::Selector(source.to_string()))
    }

    fn first_text(document: &Html, selector: &Selector) -> Option<String> {
        document
            .select(selector)
            .next()
            .map(|element| element.text().collect::<String>().trim().to_string())
            .filter(|text| !text.is_empty())
    }

    fn joined_text(document: &Html, selector: &Selector) -> Option<String> {
        let parts: Vec<String> = document
            .select(selector)
            .map(|element| element.text().collect::<String>().trim().to_string())
            .filter(|text| !text.is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }

    fn image_src(document: &Html, selector: &Selector) -> Option<String> {
        document
            .select(selector)
            .next()
            .and_then(|element| element.value().attr("src"))
            .map(str::to_string)
            .filter(|src| !src.is_empty())
    }

    fn scrape(&self, document: &Html) -> Result<RawProduct, ExtractorError> {
        let s = &self.selectors;
        Ok(RawProduct {
            title: Self::first_text(document, &Self::selector(&s.title)?)
                .unwrap_or_else(|| sentinel::TITLE.to_string()),
            price: Self::first_text(document, &Self::selector(&s.price)?)
                .unwrap_or_else(|| sentinel::PRICE.to_string()),
            description: Self::first_text(document, &Self::selector(&s.description)?)
                .unwrap_or_else(|| sentinel::DESCRIPTION.to_string()),
            highlights: Self::joined_text(document, &Self::selector(&s.highlights)?)
                .unwrap_or_else(|| sentinel::HIGHLIGHTS.to_string()),
            rating: Self::first_text(document, &Self::selector(&s.rating)?)
                .unwrap_or_else(|| sentinel::RATING.to_string()),
            reviews: Self::first_text(document, &Self::selector(&s.reviews)?)
                .unwrap_or_else(|| sentinel::REVIEWS.to_string()),
            image_url: Self::image_src(document, &Self::selector(&s.image)?)
                .unwrap_or_else(|| sentinel::IMAGE.to_string()),
            total_purchases: Self::first_text(document, &Self::selector(&s.total_purchases)?)
                .unwrap_or_else(|| sentinel::TOTAL_PURCHASES.to_string()),
        })
    }
}

impl ProductExtractor for CssExtractor {
    async fn extract(&self, url: &ProductUrl) -> Result<RawProduct, ExtractorError> {
        let response = self.client.get(url.as_str()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ExtractorError::Status(status));
        }
        let body = response.text().await?;
        let document = Html::parse_document(&body);
        self.scrape(&document)
    }
}
