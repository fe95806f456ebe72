//! One-stop import for route-definition sites.
//!
//! ```ignore
//! use routedoc_core::prelude::*;
//!
//! let controller = ApiController::new().route(
//!     Route::get("/products").response(200, ApiSchema::of::<Vec<Product>>()),
//!     |req: ParsedRequest| async move { Ok(Json(vec![]).into_response()) },
//! );
//! ```

pub use crate::controller::{
    ApiController, HandlerResult, Method, ParsedRequest, Route, RouteHandler,
};
pub use crate::error::AppError;
pub use crate::http::{IntoResponse, Json, Response, StatusCode};
pub use crate::response::ResponseSpec;
pub use crate::schema::{ApiSchema, BodySpec};
pub use crate::validation::{Facet, FacetFailure, FieldError};
