//! Core library exports for the pricewatch service.
//!
//! Tracks e-commerce product listings by URL, keeps an append-only history
//! of observed prices per product, and exposes search over the tracked
//! catalog.

pub mod db;
pub mod domain;
pub mod models;
pub mod pagination;
pub mod repository;
pub mod schema;
pub mod services;

#[cfg(feature = "server")]
pub mod extractor;
#[cfg(feature = "server")]
pub mod routes;
