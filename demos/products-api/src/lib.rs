//! Demo products API: declarative routes over an in-memory store, with
//! validation and generated OpenAPI documentation.

pub mod products;
pub mod repository;
pub mod schemas;

use axum::Router;
use routedoc_openapi::{configure, DocsConfig};

use crate::repository::ProductRepository;

/// Assemble the whole application router: the products controller plus the
/// document and docs-UI endpoints.
pub fn build_app(repo: ProductRepository) -> Router {
    configure(
        Router::new(),
        vec![products::controller(repo)],
        DocsConfig::new("Products API", "1.0.0"),
    )
}
