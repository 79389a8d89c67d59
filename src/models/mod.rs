//! Diesel row types and application configuration.

#[cfg(feature = "server")]
pub mod config;
pub mod product;
