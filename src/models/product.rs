use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::product::{PricePoint as DomainPricePoint, Product as DomainProduct};
use crate::domain::types::{ProductId, ProductUrl, TypeConstraintError};

/// Diesel representation of a product row.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::products)]
pub struct Product {
    pub id: i32,
    pub url: String,
    pub title: String,
    pub description: String,
    pub highlights: String,
    pub rating: String,
    pub reviews: String,
    pub image_url: String,
    pub total_purchases: String,
    pub created_at: NaiveDateTime,
}

/// Diesel representation of a price history row.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::price_points)]
pub struct PricePoint {
    pub id: i32,
    pub product_id: i32,
    pub price: String,
    pub observed_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::products)]
pub struct NewProduct<'a> {
    pub url: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub highlights: &'a str,
    pub rating: &'a str,
    pub reviews: &'a str,
    pub image_url: &'a str,
    pub total_purchases: &'a str,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::price_points)]
pub struct NewPricePoint<'a> {
    pub product_id: i32,
    pub price: &'a str,
    pub observed_at: NaiveDateTime,
}

impl From<PricePoint> for DomainPricePoint {
    fn from(point: PricePoint) -> Self {
        Self {
            price: point.price,
            observed_at: point.observed_at,
        }
    }
}

impl TryFrom<(Product, Vec<PricePoint>)> for DomainProduct {
    type Error = TypeConstraintError;

    fn try_from((product, points): (Product, Vec<PricePoint>)) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ProductId::new(product.id)?,
            url: ProductUrl::new(product.url)?,
            title: product.title,
            description: product.description,
            highlights: product.highlights,
            rating: product.rating,
            reviews: product.reviews,
            image_url: product.image_url,
            total_purchases: product.total_purchases,
            price_history: points.into_iter().map(Into::into).collect(),
            created_at: product.created_at,
        })
    }
}
