//! The route registrar: one [`ApiController`] accumulates live axum routes
//! and the matching OpenAPI path-item fragments, keeping the two consistent
//! by construction — both are derived from the same [`Route`] declaration.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};

use crate::error::AppError;
use crate::http::{
    HeaderMap, IntoResponse, MethodFilter, RawPathParams, Request, Response, Router, Uri,
};
use crate::path;
use crate::response::ResponseSpec;
use crate::schema::{ApiSchema, BodySpec, ParamLocation, ParamSpec};
use crate::validation::RequestGate;

/// Request body size limit applied when buffering a JSON body for validation.
const BODY_LIMIT: usize = 2 * 1024 * 1024;

/// The HTTP methods a route declaration may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "get",
            Method::Post => "post",
            Method::Put => "put",
            Method::Patch => "patch",
            Method::Delete => "delete",
        }
    }

    fn filter(&self) -> MethodFilter {
        match self {
            Method::Get => MethodFilter::GET,
            Method::Post => MethodFilter::POST,
            Method::Put => MethodFilter::PUT,
            Method::Patch => MethodFilter::PATCH,
            Method::Delete => MethodFilter::DELETE,
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for HTTP methods the engine does not support.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedMethod(pub String);

impl std::fmt::Display for UnsupportedMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Unsupported HTTP method '{}'", self.0)
    }
}

impl std::error::Error for UnsupportedMethod {}

impl FromStr for Method {
    type Err = UnsupportedMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Ok(Method::Get),
            "post" => Ok(Method::Post),
            "put" => Ok(Method::Put),
            "patch" => Ok(Method::Patch),
            "delete" => Ok(Method::Delete),
            other => Err(UnsupportedMethod(other.to_string())),
        }
    }
}

/// An interceptor run before the validation gate. It may rewrite the request
/// or short-circuit with a response.
pub type Middleware =
    Arc<dyn Fn(Request) -> BoxFuture<'static, Result<Request, Response>> + Send + Sync>;

/// The request a handler receives after the validation gate has run: the
/// `params`, `query` and `body` facets hold the schema's parsed output, not
/// the raw wire strings.
#[derive(Debug)]
pub struct ParsedRequest {
    pub method: http::Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub params: Value,
    pub query: Value,
    pub body: Value,
}

impl ParsedRequest {
    pub fn params_as<T: DeserializeOwned>(&self) -> Result<T, AppError> {
        deserialize_facet(&self.params, "params")
    }

    pub fn query_as<T: DeserializeOwned>(&self) -> Result<T, AppError> {
        deserialize_facet(&self.query, "query")
    }

    pub fn body_as<T: DeserializeOwned>(&self) -> Result<T, AppError> {
        deserialize_facet(&self.body, "body")
    }
}

fn deserialize_facet<T: DeserializeOwned>(value: &Value, facet: &str) -> Result<T, AppError> {
    serde_json::from_value(value.clone()).map_err(|err| {
        AppError::Internal(format!("validated {facet} did not match the handler type: {err}"))
    })
}

/// Handler return type: a full response, or an [`AppError`] forwarded to the
/// error channel.
pub type HandlerResult = Result<Response, AppError>;

/// A route handler. Implemented for any `Fn(ParsedRequest) -> Future`.
pub trait RouteHandler: Send + Sync + 'static {
    fn call(&self, request: ParsedRequest) -> BoxFuture<'static, HandlerResult>;
}

impl<F, Fut> RouteHandler for F
where
    F: Fn(ParsedRequest) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = HandlerResult> + Send + 'static,
{
    fn call(&self, request: ParsedRequest) -> BoxFuture<'static, HandlerResult> {
        (self)(request).boxed()
    }
}

/// Declaration of one HTTP endpoint: method, path, facet schemas, responses
/// and documentation metadata. Consumed once by [`ApiController::route`].
pub struct Route {
    method: Method,
    path: String,
    description: Option<String>,
    params: Option<ApiSchema>,
    query: Option<ApiSchema>,
    body: Option<BodySpec>,
    responses: BTreeMap<u16, ResponseSpec>,
    middleware: Vec<Middleware>,
    tags: Vec<String>,
    extensions: Map<String, Value>,
}

impl Route {
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            description: None,
            params: None,
            query: None,
            body: None,
            responses: BTreeMap::new(),
            middleware: Vec::new(),
            tags: Vec::new(),
            extensions: Map::new(),
        }
    }

    pub fn get(path: &str) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: &str) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: &str) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn patch(path: &str) -> Self {
        Self::new(Method::Patch, path)
    }

    pub fn delete(path: &str) -> Self {
        Self::new(Method::Delete, path)
    }

    /// OpenAPI description of the route.
    pub fn describe(mut self, text: &str) -> Self {
        self.description = Some(text.to_string());
        self
    }

    /// Schema for the path parameters.
    pub fn params(mut self, schema: ApiSchema) -> Self {
        self.params = Some(schema);
        self
    }

    /// Schema for the query string.
    pub fn query(mut self, schema: ApiSchema) -> Self {
        self.query = Some(schema);
        self
    }

    /// Schema (or raw content-object override) for the request body.
    pub fn body(mut self, body: impl Into<BodySpec>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Declare the response for one status code.
    pub fn response(mut self, status: u16, response: impl Into<ResponseSpec>) -> Self {
        self.responses.insert(status, response.into());
        self
    }

    /// Add an interceptor, run in declaration order before the validation
    /// gate — it sees the raw request, body unparsed.
    pub fn middleware<F, Fut>(mut self, middleware: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<Request, Response>> + Send + 'static,
    {
        self.middleware
            .push(Arc::new(move |request| middleware(request).boxed()));
        self
    }

    /// Add an OpenAPI tag.
    pub fn tag(mut self, tag: &str) -> Self {
        self.tags.push(tag.to_string());
        self
    }

    /// Attach an arbitrary operation-object field, forwarded verbatim into
    /// the generated document.
    pub fn extension(mut self, key: &str, value: Value) -> Self {
        self.extensions.insert(key.to_string(), value);
        self
    }
}

/// A controller accumulating live routes and their OpenAPI fragments.
///
/// Both grow monotonically as [`route`](Self::route) is called; registration
/// is chainable and happens once at startup.
pub struct ApiController {
    router: Router,
    paths: Map<String, Value>,
    default_responses: BTreeMap<u16, ResponseSpec>,
}

impl ApiController {
    pub fn new() -> Self {
        Self {
            router: Router::new(),
            paths: Map::new(),
            default_responses: BTreeMap::new(),
        }
    }

    /// Create a controller with responses documented on every route (e.g. a
    /// standard 404 shape). Declaration-level responses win on collision.
    pub fn with_default_responses(
        responses: impl IntoIterator<Item = (u16, ResponseSpec)>,
    ) -> Self {
        Self {
            router: Router::new(),
            paths: Map::new(),
            default_responses: responses.into_iter().collect(),
        }
    }

    /// Register one route: bind the live endpoint (middleware, validation
    /// gate, handler) and merge the matching path-item fragment.
    ///
    /// # Panics
    ///
    /// Configuration errors are fatal and raised here, not deferred: an
    /// invalid path, an empty `responses` map, a schema that fails to
    /// compile, or a duplicate (path, method) binding.
    pub fn route(mut self, route: Route, handler: impl RouteHandler) -> Self {
        if let Err(err) = path::check_router_path(&route.path) {
            panic!("route {} {}: {err}", route.method, route.path);
        }
        if route.responses.is_empty() {
            panic!("route {} {} declares no responses", route.method, route.path);
        }

        let gate = RequestGate::build(
            route.params.as_ref(),
            route.query.as_ref(),
            route.body.as_ref().and_then(BodySpec::schema),
        )
        .unwrap_or_else(|err| panic!("route {} {}: {err}", route.method, route.path));
        let gate = Arc::new(gate);

        let handler: Arc<dyn RouteHandler> = Arc::new(handler);
        let middleware = route.middleware.clone();

        // axum 0.8 binds brace-notation paths, same as the document.
        let bind_path = path::to_openapi_path(&route.path);

        let endpoint = move |raw_params: RawPathParams, request: Request| {
            let gate = gate.clone();
            let handler = handler.clone();
            let middleware = middleware.clone();
            let raw_params: Vec<(String, String)> = raw_params
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect();
            dispatch(gate, handler, middleware, raw_params, request)
        };

        self.router = self
            .router
            .route(&bind_path, crate::http::on(route.method.filter(), endpoint));
        tracing::debug!(method = %route.method, path = %bind_path, "registered route");

        self.add_to_paths(&route, &bind_path);
        self
    }

    /// The accumulated OpenAPI paths, keyed by brace-notation path.
    pub fn paths(&self) -> &Map<String, Value> {
        &self.paths
    }

    /// The populated router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn into_parts(self) -> (Router, Map<String, Value>) {
        (self.router, self.paths)
    }

    fn add_to_paths(&mut self, route: &Route, openapi_path: &str) {
        let mut operation = Map::new();
        if let Some(description) = &route.description {
            operation.insert("description".into(), json!(description));
        }
        if !route.tags.is_empty() {
            operation.insert("tags".into(), json!(route.tags));
        }

        let mut parameters = Vec::new();
        if let Some(schema) = &route.params {
            parameters.extend(
                schema
                    .parameters(ParamLocation::Path)
                    .iter()
                    .map(ParamSpec::to_openapi),
            );
        }
        if let Some(schema) = &route.query {
            parameters.extend(
                schema
                    .parameters(ParamLocation::Query)
                    .iter()
                    .map(ParamSpec::to_openapi),
            );
        }
        if !parameters.is_empty() {
            operation.insert("parameters".into(), Value::Array(parameters));
        }

        if let Some(body) = &route.body {
            operation.insert("requestBody".into(), body.to_request_body());
        }

        // controller defaults first, declaration wins on collision
        let mut responses: BTreeMap<u16, &ResponseSpec> = BTreeMap::new();
        for (status, spec) in &self.default_responses {
            responses.insert(*status, spec);
        }
        for (status, spec) in &route.responses {
            responses.insert(*status, spec);
        }
        let mut rendered = Map::new();
        for (status, spec) in responses {
            rendered.insert(status.to_string(), spec.normalize());
        }
        operation.insert("responses".into(), Value::Object(rendered));

        for (key, value) in &route.extensions {
            operation.insert(key.clone(), value.clone());
        }

        let path_item = self
            .paths
            .entry(openapi_path.to_string())
            .or_insert_with(|| json!({}));
        if let Some(item) = path_item.as_object_mut() {
            // last registration for a given (path, method) wins
            item.insert(route.method.as_str().to_string(), Value::Object(operation));
        }
    }
}

impl Default for ApiController {
    fn default() -> Self {
        Self::new()
    }
}

async fn dispatch(
    gate: Arc<RequestGate>,
    handler: Arc<dyn RouteHandler>,
    middleware: Vec<Middleware>,
    raw_params: Vec<(String, String)>,
    mut request: Request,
) -> Response {
    for interceptor in &middleware {
        request = match interceptor(request).await {
            Ok(next) => next,
            Err(response) => return response,
        };
    }

    let (parts, body) = request.into_parts();
    let bytes = match axum::body::to_bytes(body, BODY_LIMIT).await {
        Ok(bytes) => bytes,
        Err(err) => {
            return AppError::BadRequest(format!("failed to read request body: {err}"))
                .into_response()
        }
    };
    let raw_query: Vec<(String, String)> =
        form_urlencoded::parse(parts.uri.query().unwrap_or("").as_bytes())
            .into_owned()
            .collect();

    let facets = match gate.run(&raw_params, &raw_query, &bytes).await {
        Ok(facets) => facets,
        Err(response) => return response,
    };

    let parsed = ParsedRequest {
        method: parts.method,
        uri: parts.uri,
        headers: parts.headers,
        params: facets.params,
        query: facets.query,
        body: facets.body,
    };
    match handler.call(parsed).await {
        Ok(response) => response,
        Err(error) => error.into_response(),
    }
}
