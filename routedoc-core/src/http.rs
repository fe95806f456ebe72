//! Re-exports of the axum types that appear in the public API, so downstream
//! crates do not need a direct axum dependency for the common cases.

pub use axum::body::Body;
pub use axum::extract::{Path, Query, RawPathParams, Request, State};
pub use axum::http::{HeaderMap, StatusCode, Uri};
pub use axum::response::{Html, IntoResponse, Response};
pub use axum::routing::{on, MethodFilter};
pub use axum::{serve, Json, Router};
