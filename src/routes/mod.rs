//! Thin HTTP wrappers over the service layer.

pub mod products;
