use serde::Deserialize;

use crate::domain::product::{NormalizedProduct, Product};
use crate::domain::types::ProductUrl;
use crate::extractor::ProductExtractor;
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{
    PriceIndex, ProductListQuery, ProductReader, ProductSearchQuery, ProductWriter,
};

use super::merge::{MergePolicy, MergeReport, resolve_and_merge};
use super::{ServiceError, ServiceResult};

/// Filters accepted by the catalog search endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchFilter {
    pub title: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
}

/// Fetch a product page and merge the extraction result into the catalog.
///
/// Extraction runs to completion before the merge sequence starts, so no
/// store resource is held while the page loads. Extraction failures surface
/// as [`ServiceError::ExtractionUnavailable`] and leave no partial state.
pub async fn track_product<E, R>(
    url: &str,
    extractor: &E,
    policy: &MergePolicy,
    repo: &R,
) -> ServiceResult<MergeReport>
where
    E: ProductExtractor,
    R: ProductReader + ProductWriter,
{
    let url = ProductUrl::new(url)?;
    let raw = match extractor.extract(&url).await {
        Ok(raw) => raw,
        Err(e) => {
            log::error!("Extraction failed for {url}: {e}");
            return Err(ServiceError::ExtractionUnavailable(e.to_string()));
        }
    };
    resolve_and_merge(&url, NormalizedProduct::from(raw), policy, repo)
}

/// Search the tracked catalog. Empty filter strings impose no constraint.
pub fn search_catalog<R>(
    filter: SearchFilter,
    price_index: PriceIndex,
    repo: &R,
) -> ServiceResult<Vec<Product>>
where
    R: ProductReader,
{
    let mut query = ProductSearchQuery::default().price_index(price_index);
    if let Some(title) = filter.title.filter(|t| !t.is_empty()) {
        query = query.title(title);
    }
    if let Some(min_price) = filter.min_price.filter(|p| !p.is_empty()) {
        query = query.min_price(min_price);
    }
    if let Some(max_price) = filter.max_price.filter(|p| !p.is_empty()) {
        query = query.max_price(max_price);
    }

    match repo.search_products(query) {
        Ok(products) => Ok(products),
        Err(e) => {
            log::error!("Failed to search products: {e}");
            Err(e.into())
        }
    }
}

/// Paginated listing of every tracked product.
pub fn list_catalog<R>(page: usize, repo: &R) -> ServiceResult<Paginated<Product>>
where
    R: ProductReader,
{
    match repo.list_products(ProductListQuery::default().paginate(page, DEFAULT_ITEMS_PER_PAGE)) {
        Ok((total, products)) => Ok(Paginated::new(
            products,
            page,
            total.div_ceil(DEFAULT_ITEMS_PER_PAGE),
        )),
        Err(e) => {
            log::error!("Failed to list products: {e}");
            Err(e.into())
        }
    }
}
