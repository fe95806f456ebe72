mod builder;
mod handlers;

pub use builder::{build_document, DocsConfig};
pub use handlers::configure;
