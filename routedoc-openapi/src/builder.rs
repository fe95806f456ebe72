use routedoc_core::controller::ApiController;
use routedoc_core::merge::deep_merge;
use serde_json::{json, Value};

const DEFAULT_TITLE: &str = "API Documentation";
const DEFAULT_VERSION: &str = "N/A";
const DEFAULT_SPEC_PATH: &str = "/swagger.json";
const DEFAULT_DOCS_PATH: &str = "/api-docs";

/// Configuration for the assembled OpenAPI document and its endpoints.
pub struct DocsConfig {
    pub title: Option<String>,
    pub version: Option<String>,
    /// Title shown by the documentation UI. Defaults to "{title} v{version}".
    pub docs_title: Option<String>,
    /// Path serving the JSON document.
    pub spec_path: String,
    /// Path serving the documentation UI.
    pub docs_path: String,
    /// Optional document merged under the generated one (servers, security
    /// schemes, hand-written paths).
    pub initial_doc: Option<Value>,
}

impl DocsConfig {
    pub fn new(title: &str, version: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            version: Some(version.to_string()),
            ..Self::default()
        }
    }

    pub fn with_docs_title(mut self, title: &str) -> Self {
        self.docs_title = Some(title.to_string());
        self
    }

    pub fn with_spec_path(mut self, path: &str) -> Self {
        self.spec_path = path.to_string();
        self
    }

    pub fn with_docs_path(mut self, path: &str) -> Self {
        self.docs_path = path.to_string();
        self
    }

    pub fn with_initial_doc(mut self, doc: Value) -> Self {
        self.initial_doc = Some(doc);
        self
    }

    pub(crate) fn resolved_title(&self) -> String {
        self.title.clone().unwrap_or_else(|| DEFAULT_TITLE.to_string())
    }

    pub(crate) fn resolved_version(&self) -> String {
        self.version
            .clone()
            .unwrap_or_else(|| DEFAULT_VERSION.to_string())
    }

    pub(crate) fn resolved_docs_title(&self) -> String {
        self.docs_title.clone().unwrap_or_else(|| match &self.version {
            Some(version) => format!("{} v{}", self.resolved_title(), version),
            None => self.resolved_title(),
        })
    }
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            title: None,
            version: None,
            docs_title: None,
            spec_path: DEFAULT_SPEC_PATH.to_string(),
            docs_path: DEFAULT_DOCS_PATH.to_string(),
            initial_doc: None,
        }
    }
}

/// Assemble one OpenAPI document from every controller's accumulated paths.
///
/// Path items are deep-merged, so controllers contributing different methods
/// to the same path (for example `GET /products` and `POST /products`) end
/// up under one path entry. Controller order is significant: on overlapping
/// scalar keys the later controller wins.
pub fn build_document<'a>(
    config: &DocsConfig,
    controllers: impl IntoIterator<Item = &'a ApiController>,
) -> Value {
    let mut document = json!({
        "openapi": "3.0.0",
        "info": {
            "title": config.resolved_title(),
            "version": config.resolved_version(),
        },
        "paths": {},
    });

    if let Some(initial) = &config.initial_doc {
        deep_merge(&mut document, initial);
    }

    for controller in controllers {
        deep_merge(
            &mut document["paths"],
            &Value::Object(controller.paths().clone()),
        );
    }

    document
}
