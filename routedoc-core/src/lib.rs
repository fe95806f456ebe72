pub mod controller;
pub mod error;
pub mod http;
pub mod layers;
pub mod merge;
pub mod path;
pub mod prelude;
pub mod response;
pub mod schema;
pub mod validation;

pub use controller::{ApiController, HandlerResult, Method, ParsedRequest, Route};
pub use error::AppError;
pub use layers::{catch_panic_layer, default_trace, init_tracing};
pub use merge::deep_merge;
pub use response::ResponseSpec;
pub use schema::{ApiSchema, BodySpec, ParamLocation, ParamSpec};
pub use validation::{Facet, FacetFailure, FieldError};

pub use schemars;
