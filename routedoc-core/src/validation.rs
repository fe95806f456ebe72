//! Request validation: the middleware factory behind every schema-typed
//! route.
//!
//! A [`RequestGate`] is built once per route from the declared params, query
//! and body schemas (compiled to JSON Schema validators up front, so a bad
//! schema fails registration, not a request). At request time the three
//! facets are checked independently — their failures are collected, not
//! short-circuited — and on success each facet is rewritten with the
//! parsed/coerced value, so handlers never see raw path or query strings.

use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

use bytes::Bytes;
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::http::{IntoResponse, Json, Response, StatusCode};
use crate::schema::ApiSchema;

/// One of the three independently validated request parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Facet {
    Params,
    Query,
    Body,
}

/// A single structured validation error within a facet.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    /// JSON pointer into the offending value (empty for the root).
    pub path: String,
    pub message: String,
}

/// All validation errors for one failed facet, as serialized in the 400 body.
#[derive(Debug, Clone, Serialize)]
pub struct FacetFailure {
    #[serde(rename = "type")]
    pub facet: Facet,
    pub errors: Vec<FieldError>,
}

/// A schema that failed to compile at registration time.
///
/// This is a configuration error: the registrar raises it immediately
/// rather than deferring to request time.
#[derive(Debug)]
pub struct SchemaCompileError {
    pub facet: Facet,
    pub message: String,
}

impl std::fmt::Display for SchemaCompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid {:?} schema: {}", self.facet, self.message)
    }
}

impl std::error::Error for SchemaCompileError {}

/// The three parsed facet values produced by a successful gate run.
#[derive(Debug)]
pub struct ParsedFacets {
    pub params: Value,
    pub query: Value,
    pub body: Value,
}

struct FacetValidator {
    schema: ApiSchema,
    compiled: jsonschema::Validator,
}

impl FacetValidator {
    fn compile(facet: Facet, schema: &ApiSchema) -> Result<Self, SchemaCompileError> {
        let compiled =
            jsonschema::validator_for(schema.json()).map_err(|err| SchemaCompileError {
                facet,
                message: err.to_string(),
            })?;
        Ok(Self {
            schema: schema.clone(),
            compiled,
        })
    }

    fn check(&self, value: Value) -> Result<Value, Vec<FieldError>> {
        let errors: Vec<FieldError> = self
            .compiled
            .iter_errors(&value)
            .map(|error| FieldError {
                path: error.instance_path().to_string(),
                message: error.to_string(),
            })
            .collect();
        if errors.is_empty() {
            Ok(value)
        } else {
            Err(errors)
        }
    }

    /// Build a JSON object from raw string key/value pairs, coercing each
    /// value toward the type its schema property declares.
    fn coerce_entries(&self, entries: &[(String, String)]) -> Value {
        let properties = self.schema.json().get("properties").and_then(Value::as_object);

        let mut grouped: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for (key, value) in entries {
            grouped.entry(key.as_str()).or_default().push(value.as_str());
        }

        let mut out = Map::new();
        for (key, values) in grouped {
            let property = properties.and_then(|props| props.get(key));
            out.insert(key.to_string(), coerce_values(&values, property));
        }
        Value::Object(out)
    }
}

/// Coerce one or more raw string occurrences of a parameter into the JSON
/// type its schema declares. Values that do not parse are left as strings
/// and rejected by the schema check instead.
fn coerce_values(values: &[&str], schema: Option<&Value>) -> Value {
    let declared_type = schema
        .and_then(|s| s.get("type"))
        .and_then(Value::as_str);

    match declared_type {
        Some("array") => {
            let items = schema.and_then(|s| s.get("items"));
            let parts: Vec<Value> = if values.len() > 1 {
                values.iter().map(|v| coerce_primitive(v, items)).collect()
            } else {
                values[0]
                    .split(',')
                    .filter(|part| !part.is_empty())
                    .map(|part| coerce_primitive(part.trim(), items))
                    .collect()
            };
            Value::Array(parts)
        }
        Some("object") => serde_json::from_str(values[values.len() - 1])
            .unwrap_or_else(|_| Value::String(values[values.len() - 1].to_string())),
        _ => coerce_primitive(values[values.len() - 1], schema),
    }
}

fn coerce_primitive(value: &str, schema: Option<&Value>) -> Value {
    let declared_type = schema
        .and_then(|s| s.get("type"))
        .and_then(Value::as_str);
    match declared_type {
        Some("integer") => value
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(value.to_string())),
        Some("number") => value
            .parse::<f64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(value.to_string())),
        Some("boolean") => value
            .parse::<bool>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(value.to_string())),
        _ => Value::String(value.to_string()),
    }
}

/// Raw string pairs collected into a plain JSON object, last value winning.
/// Used for facets without a declared schema, which pass through untouched.
fn string_map(entries: &[(String, String)]) -> Value {
    let mut out = Map::new();
    for (key, value) in entries {
        out.insert(key.clone(), Value::String(value.clone()));
    }
    Value::Object(out)
}

/// Outcome of checking one facet.
enum FacetOutcome {
    /// No schema declared: the raw value passes through unmodified.
    Passthrough(Value),
    Valid(Value),
    Invalid(Vec<FieldError>),
    /// The validator itself crashed (not a validation failure).
    Crashed,
}

fn guarded(
    facet: Facet,
    op: impl FnOnce() -> Result<Value, Vec<FieldError>>,
) -> FacetOutcome {
    match catch_unwind(AssertUnwindSafe(op)) {
        Ok(Ok(value)) => FacetOutcome::Valid(value),
        Ok(Err(errors)) => FacetOutcome::Invalid(errors),
        Err(panic) => {
            tracing::error!(
                facet = ?facet,
                error = %panic_message(panic.as_ref()),
                "error validating the request"
            );
            FacetOutcome::Crashed
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// The validation gate for one route: up to three compiled facet validators.
pub struct RequestGate {
    params: Option<FacetValidator>,
    query: Option<FacetValidator>,
    body: Option<FacetValidator>,
}

impl RequestGate {
    /// Compile validators for the schemas that are present.
    pub fn build(
        params: Option<&ApiSchema>,
        query: Option<&ApiSchema>,
        body: Option<&ApiSchema>,
    ) -> Result<Self, SchemaCompileError> {
        Ok(Self {
            params: params
                .map(|schema| FacetValidator::compile(Facet::Params, schema))
                .transpose()?,
            query: query
                .map(|schema| FacetValidator::compile(Facet::Query, schema))
                .transpose()?,
            body: body
                .map(|schema| FacetValidator::compile(Facet::Body, schema))
                .transpose()?,
        })
    }

    /// Run the gate over the raw request facets.
    ///
    /// The three checks have no ordering dependency; they are joined and
    /// their failures reported together in one 400. `Err` carries the
    /// response to send; the handler must not run in that case.
    pub async fn run(
        &self,
        raw_params: &[(String, String)],
        raw_query: &[(String, String)],
        body: &Bytes,
    ) -> Result<ParsedFacets, Response> {
        let (params, query, body) = tokio::join!(
            async { self.check_params(raw_params) },
            async { self.check_query(raw_query) },
            async { self.check_body(body) },
        );

        let mut failures = Vec::new();
        let mut crashed = false;
        let params = resolve(params, Facet::Params, &mut failures, &mut crashed);
        let query = resolve(query, Facet::Query, &mut failures, &mut crashed);
        let body = resolve(body, Facet::Body, &mut failures, &mut crashed);

        if crashed {
            let body = json!({ "message": "There was a problem validating the request" });
            return Err((StatusCode::BAD_REQUEST, Json(body)).into_response());
        }
        if !failures.is_empty() {
            return Err((StatusCode::BAD_REQUEST, Json(failures)).into_response());
        }
        Ok(ParsedFacets {
            params,
            query,
            body,
        })
    }

    fn check_params(&self, raw: &[(String, String)]) -> FacetOutcome {
        match &self.params {
            None => FacetOutcome::Passthrough(string_map(raw)),
            Some(validator) => {
                guarded(Facet::Params, || validator.check(validator.coerce_entries(raw)))
            }
        }
    }

    fn check_query(&self, raw: &[(String, String)]) -> FacetOutcome {
        match &self.query {
            None => FacetOutcome::Passthrough(string_map(raw)),
            Some(validator) => {
                guarded(Facet::Query, || validator.check(validator.coerce_entries(raw)))
            }
        }
    }

    fn check_body(&self, bytes: &Bytes) -> FacetOutcome {
        match &self.body {
            None => FacetOutcome::Passthrough(parse_json_lenient(bytes)),
            Some(validator) => guarded(Facet::Body, || {
                if bytes.is_empty() {
                    if validator.schema.is_optional() {
                        return Ok(Value::Null);
                    }
                    return Err(vec![FieldError {
                        path: String::new(),
                        message: "request body is required".to_string(),
                    }]);
                }
                match serde_json::from_slice::<Value>(bytes) {
                    Ok(value) => validator.check(value),
                    Err(err) => Err(vec![FieldError {
                        path: String::new(),
                        message: format!("invalid JSON body: {err}"),
                    }]),
                }
            }),
        }
    }
}

fn resolve(
    outcome: FacetOutcome,
    facet: Facet,
    failures: &mut Vec<FacetFailure>,
    crashed: &mut bool,
) -> Value {
    match outcome {
        FacetOutcome::Passthrough(value) | FacetOutcome::Valid(value) => value,
        FacetOutcome::Invalid(errors) => {
            failures.push(FacetFailure { facet, errors });
            Value::Null
        }
        FacetOutcome::Crashed => {
            *crashed = true;
            Value::Null
        }
    }
}

fn parse_json_lenient(bytes: &Bytes) -> Value {
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(bytes).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id_schema() -> ApiSchema {
        ApiSchema::raw(json!({
            "type": "object",
            "properties": { "id": { "type": "integer" } },
            "required": ["id"],
        }))
    }

    fn name_schema() -> ApiSchema {
        ApiSchema::raw(json!({
            "type": "object",
            "properties": { "name": { "type": "string", "minLength": 1 } },
            "required": ["name"],
        }))
    }

    #[test]
    fn coerces_numeric_strings_per_schema() {
        assert_eq!(coerce_primitive("7", Some(&json!({ "type": "integer" }))), json!(7));
        assert_eq!(coerce_primitive("1.5", Some(&json!({ "type": "number" }))), json!(1.5));
        assert_eq!(coerce_primitive("true", Some(&json!({ "type": "boolean" }))), json!(true));
        // unparseable values stay strings and fail the schema check instead
        assert_eq!(coerce_primitive("abc", Some(&json!({ "type": "integer" }))), json!("abc"));
        assert_eq!(coerce_primitive("7", None), json!("7"));
    }

    #[test]
    fn coerces_arrays_from_repeats_and_commas() {
        let schema = json!({ "type": "array", "items": { "type": "string" } });
        assert_eq!(coerce_values(&["a,b"], Some(&schema)), json!(["a", "b"]));
        assert_eq!(coerce_values(&["a", "b"], Some(&schema)), json!(["a", "b"]));
    }

    #[tokio::test]
    async fn valid_request_rewrites_facets_with_parsed_values() {
        let params = id_schema();
        let gate = RequestGate::build(Some(&params), None, None).unwrap();
        let parsed = gate
            .run(
                &[("id".to_string(), "7".to_string())],
                &[],
                &Bytes::new(),
            )
            .await
            .expect("gate should pass");
        // coerced to a number, not the raw string
        assert_eq!(parsed.params["id"], json!(7));
    }

    #[tokio::test]
    async fn failures_are_collected_across_facets() {
        let params = id_schema();
        let body = name_schema();
        let gate = RequestGate::build(Some(&params), None, Some(&body)).unwrap();
        let response = gate
            .run(
                &[("id".to_string(), "abc".to_string())],
                &[],
                &Bytes::from_static(br#"{"name":""}"#),
            )
            .await
            .expect_err("gate should fail");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn facets_without_schema_pass_through() {
        let gate = RequestGate::build(None, None, None).unwrap();
        let parsed = gate
            .run(
                &[("id".to_string(), "7".to_string())],
                &[("q".to_string(), "x".to_string())],
                &Bytes::new(),
            )
            .await
            .expect("gate should pass");
        // untouched raw strings
        assert_eq!(parsed.params["id"], json!("7"));
        assert_eq!(parsed.query["q"], json!("x"));
        assert_eq!(parsed.body, Value::Null);
    }

    #[tokio::test]
    async fn missing_required_body_is_a_body_failure() {
        let body = name_schema();
        let gate = RequestGate::build(None, None, Some(&body)).unwrap();
        let response = gate.run(&[], &[], &Bytes::new()).await.expect_err("should fail");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn optional_body_may_be_absent() {
        let body = name_schema().optional();
        let gate = RequestGate::build(None, None, Some(&body)).unwrap();
        let parsed = gate.run(&[], &[], &Bytes::new()).await.expect("should pass");
        assert_eq!(parsed.body, Value::Null);
    }
}
