//! Wire types for the products resource. Each derives `JsonSchema` so the
//! same definition drives request validation and the generated document.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Product {
    pub id: u64,
    #[schemars(length(min = 1, max = 100))]
    pub name: String,
    #[schemars(range(min = 0.01, max = 1_000_000.0))]
    pub price: f64,
    #[schemars(length(min = 1, max = 10))]
    pub categories: Vec<String>,
}

/// Payload for creating a product; the repository assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CreateProduct {
    #[schemars(length(min = 1, max = 100))]
    pub name: String,
    #[schemars(range(min = 0.01, max = 1_000_000.0))]
    pub price: f64,
    #[schemars(length(min = 1, max = 10))]
    pub categories: Vec<String>,
}

/// Partial update: absent fields keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ProductPatch {
    #[schemars(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[schemars(range(min = 0.01, max = 1_000_000.0))]
    pub price: Option<f64>,
    #[schemars(length(min = 1, max = 10))]
    pub categories: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductIdParams {
    pub product_id: u64,
}

/// Query filter for the list endpoint.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ListFilter {
    /// Case-insensitive substring match on the product name.
    pub name: Option<String>,
    /// Keep products carrying at least one of these categories.
    pub categories: Option<Vec<String>>,
}
