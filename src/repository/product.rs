use std::collections::HashMap;

use chrono::Utc;
use diesel::prelude::*;

use crate::db::DbConnection;
use crate::domain::product::{NewProduct, Product};
use crate::domain::types::{ProductId, ProductUrl};
use crate::models::product::{
    NewPricePoint as DbNewPricePoint, NewProduct as DbNewProduct, PricePoint as DbPricePoint,
    Product as DbProduct,
};
use crate::repository::{
    DieselRepository, ProductListQuery, ProductReader, ProductSearchQuery, ProductWriter,
    RepositoryError, RepositoryResult,
};

impl DieselRepository {
    /// Load one product's history and assemble the domain record.
    fn assemble(conn: &mut DbConnection, row: DbProduct) -> RepositoryResult<Product> {
        use crate::schema::price_points;

        let points = price_points::table
            .filter(price_points::product_id.eq(row.id))
            .order(price_points::id.asc())
            .load::<DbPricePoint>(conn)?;

        Ok(Product::try_from((row, points))?)
    }

    /// Batch variant of [`Self::assemble`] preserving the row order.
    fn assemble_all(
        conn: &mut DbConnection,
        rows: Vec<DbProduct>,
    ) -> RepositoryResult<Vec<Product>> {
        use crate::schema::price_points;

        let ids: Vec<i32> = rows.iter().map(|row| row.id).collect();
        let points = price_points::table
            .filter(price_points::product_id.eq_any(&ids))
            .order(price_points::id.asc())
            .load::<DbPricePoint>(conn)?;

        let mut by_product: HashMap<i32, Vec<DbPricePoint>> = HashMap::new();
        for point in points {
            by_product.entry(point.product_id).or_default().push(point);
        }

        rows.into_iter()
            .map(|row| {
                let history = by_product.remove(&row.id).unwrap_or_default();
                Ok(Product::try_from((row, history))?)
            })
            .collect()
    }
}

impl ProductReader for DieselRepository {
    fn get_product_by_id(&self, id: ProductId) -> RepositoryResult<Option<Product>> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let row = products::table
            .filter(products::id.eq(id.get()))
            .first::<DbProduct>(&mut conn)
            .optional()?;

        row.map(|row| Self::assemble(&mut conn, row)).transpose()
    }

    fn get_product_by_url(&self, url: &ProductUrl) -> RepositoryResult<Option<Product>> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let row = products::table
            .filter(products::url.eq(url.as_str()))
            .first::<DbProduct>(&mut conn)
            .optional()?;

        row.map(|row| Self::assemble(&mut conn, row)).transpose()
    }

    fn list_products(&self, query: ProductListQuery) -> RepositoryResult<(usize, Vec<Product>)> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let query_builder = || products::table.into_boxed::<diesel::sqlite::Sqlite>();

        let total = query_builder().count().get_result::<i64>(&mut conn)? as usize;

        let mut items = query_builder();

        // Apply pagination if requested
        if let Some(pagination) = &query.pagination {
            let offset = ((pagination.page.max(1) - 1) * pagination.per_page) as i64;
            let limit = pagination.per_page as i64;
            items = items.offset(offset).limit(limit);
        }

        let rows = items
            .order(products::id.asc())
            .load::<DbProduct>(&mut conn)?;

        let items = Self::assemble_all(&mut conn, rows)?;

        Ok((total, items))
    }

    fn search_products(&self, query: ProductSearchQuery) -> RepositoryResult<Vec<Product>> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let mut rows = products::table.into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(title) = &query.title {
            rows = rows.filter(products::title.like(format!("%{title}%")));
        }

        let rows = rows
            .order(products::id.asc())
            .load::<DbProduct>(&mut conn)?;

        let mut items = Self::assemble_all(&mut conn, rows)?;

        // Price bounds compare against parsed history entries, which the
        // store cannot do in SQL over raw currency text.
        if query.has_price_filter() {
            items.retain(|product| query.matches_price(product));
        }

        Ok(items)
    }
}

impl ProductWriter for DieselRepository {
    fn create_product(&self, product: &NewProduct) -> RepositoryResult<Product> {
        use crate::schema::{price_points, products};

        let mut conn = self.conn()?;
        let now = Utc::now().naive_utc();

        let row = conn.transaction::<DbProduct, RepositoryError, _>(|conn| {
            let row = diesel::insert_into(products::table)
                .values(DbNewProduct {
                    url: product.url.as_str(),
                    title: &product.title,
                    description: &product.description,
                    highlights: &product.highlights,
                    rating: &product.rating,
                    reviews: &product.reviews,
                    image_url: &product.image_url,
                    total_purchases: &product.total_purchases,
                    created_at: now,
                })
                .get_result::<DbProduct>(conn)?;

            diesel::insert_into(price_points::table)
                .values(DbNewPricePoint {
                    product_id: row.id,
                    price: &product.price,
                    observed_at: now,
                })
                .execute(conn)?;

            Ok(row)
        })?;

        Self::assemble(&mut conn, row)
    }

    fn append_price(&self, id: ProductId, price: &str) -> RepositoryResult<Product> {
        use crate::schema::{price_points, products};

        let mut conn = self.conn()?;

        let row = products::table
            .filter(products::id.eq(id.get()))
            .first::<DbProduct>(&mut conn)
            .optional()?
            .ok_or(RepositoryError::NotFound)?;

        diesel::insert_into(price_points::table)
            .values(DbNewPricePoint {
                product_id: row.id,
                price,
                observed_at: Utc::now().naive_utc(),
            })
            .execute(&mut conn)?;

        Self::assemble(&mut conn, row)
    }
}
