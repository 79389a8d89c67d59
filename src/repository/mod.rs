use crate::db::{DbConnection, DbPool};
use crate::domain::product::{NewProduct, Product, parse_price_text};
use crate::domain::types::{ProductId, ProductUrl};
use crate::pagination::Pagination;

pub mod errors;
pub mod product;

pub use errors::{RepositoryError, RepositoryResult};

/// Repository implementation backed by Diesel and SQLite.
///
/// The underlying `r2d2::Pool` is cheap to clone, allowing the repository to
/// be passed around freely between handlers.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool,
}

impl DieselRepository {
    /// Create a new repository from an established database pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get a pooled database connection.
    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Query parameters used when listing products.
#[derive(Debug, Clone, Default)]
pub struct ProductListQuery {
    /// Pagination parameters.
    pub pagination: Option<Pagination>,
}

impl ProductListQuery {
    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

/// Which observation of a product's history a price filter applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PriceIndex {
    /// The newest observation.
    #[default]
    Latest,
    /// The first observation ever recorded. Matches the behavior of earlier
    /// deployments that filtered on history index zero.
    Oldest,
}

/// Query parameters used when searching the catalog.
#[derive(Debug, Clone, Default)]
pub struct ProductSearchQuery {
    /// Case-insensitive title substring.
    pub title: Option<String>,
    /// Inclusive lower bound, raw price text.
    pub min_price: Option<String>,
    /// Inclusive upper bound, raw price text.
    pub max_price: Option<String>,
    /// Observation the price bounds apply to.
    pub price_index: PriceIndex,
}

impl ProductSearchQuery {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn min_price(mut self, min_price: impl Into<String>) -> Self {
        self.min_price = Some(min_price.into());
        self
    }

    pub fn max_price(mut self, max_price: impl Into<String>) -> Self {
        self.max_price = Some(max_price.into());
        self
    }

    pub fn price_index(mut self, price_index: PriceIndex) -> Self {
        self.price_index = price_index;
        self
    }

    pub fn has_price_filter(&self) -> bool {
        self.min_price.is_some() || self.max_price.is_some()
    }

    /// Applies the price bounds to the observation selected by
    /// [`Self::price_index`]. A product whose selected observation does not
    /// parse as a number fails the filter when any bound is present.
    pub fn matches_price(&self, product: &Product) -> bool {
        if !self.has_price_filter() {
            return true;
        }
        let point = match self.price_index {
            PriceIndex::Latest => product.latest_price(),
            PriceIndex::Oldest => product.oldest_price(),
        };
        let Some(value) = point.and_then(|p| parse_price_text(&p.price)) else {
            return false;
        };
        if let Some(min) = self.min_price.as_deref().and_then(parse_price_text)
            && value < min
        {
            return false;
        }
        if let Some(max) = self.max_price.as_deref().and_then(parse_price_text)
            && value > max
        {
            return false;
        }
        true
    }

    /// Case-insensitive substring match on the product title.
    pub fn matches_title(&self, title: &str) -> bool {
        match &self.title {
            Some(needle) => title.to_lowercase().contains(&needle.to_lowercase()),
            None => true,
        }
    }
}

/// Read-only operations for product entities.
pub trait ProductReader {
    /// Retrieve a product by its identifier.
    fn get_product_by_id(&self, id: ProductId) -> RepositoryResult<Option<Product>>;
    /// Retrieve a product by exact URL match.
    fn get_product_by_url(&self, url: &ProductUrl) -> RepositoryResult<Option<Product>>;
    /// List products with optional pagination. Returns the total count
    /// alongside the requested page.
    fn list_products(&self, query: ProductListQuery) -> RepositoryResult<(usize, Vec<Product>)>;
    /// Search the catalog by title substring and price range.
    fn search_products(&self, query: ProductSearchQuery) -> RepositoryResult<Vec<Product>>;
}

/// Write operations for product entities.
pub trait ProductWriter {
    /// Persist a new product together with its first price observation.
    fn create_product(&self, product: &NewProduct) -> RepositoryResult<Product>;
    /// Append one price observation to an existing product's history.
    fn append_price(&self, id: ProductId, price: &str) -> RepositoryResult<Product>;
}
