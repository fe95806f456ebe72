//! Validation schemas and their projection into OpenAPI structures.
//!
//! An [`ApiSchema`] wraps a JSON Schema value (normally generated from a
//! [`schemars::JsonSchema`] type) together with the flags the engine needs:
//! whether the schema is optional and whether it is the no-content sentinel.
//! Projection turns an object-shaped schema into OpenAPI `parameters`
//! entries, and a body schema into a full `requestBody` object.

use schemars::generate::SchemaSettings;
use schemars::JsonSchema;
use serde::Serialize;
use serde_json::{json, Map, Value};

/// A validation schema handed to the route registration engine.
#[derive(Debug, Clone)]
pub struct ApiSchema {
    json: Value,
    optional: bool,
    no_content: bool,
}

impl ApiSchema {
    /// Generate a schema from a `JsonSchema` type.
    ///
    /// Subschemas are inlined so the projected value is self-contained, and
    /// the `$schema` marker is stripped before embedding in OpenAPI.
    pub fn of<T: JsonSchema>() -> Self {
        let generator = SchemaSettings::openapi3()
            .with(|settings| settings.inline_subschemas = true)
            .into_generator();
        let mut json = generator.into_root_schema_for::<T>().to_value();
        if let Some(obj) = json.as_object_mut() {
            obj.remove("$schema");
        }
        Self {
            json,
            optional: false,
            no_content: false,
        }
    }

    /// Wrap a hand-written JSON Schema value.
    pub fn raw(json: Value) -> Self {
        Self {
            json,
            optional: false,
            no_content: false,
        }
    }

    /// The no-content sentinel: a schema whose sole meaning is "this
    /// response or body carries no data".
    pub fn no_content() -> Self {
        Self {
            json: Value::Null,
            optional: true,
            no_content: true,
        }
    }

    /// Mark the schema optional (body may be absent, requestBody not required).
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Attach a description, surfaced in the projected OpenAPI structures.
    pub fn describe(mut self, text: &str) -> Self {
        if let Some(obj) = self.json.as_object_mut() {
            obj.insert("description".into(), json!(text));
        }
        self
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn is_no_content(&self) -> bool {
        self.no_content
    }

    pub fn description(&self) -> Option<&str> {
        self.json.get("description").and_then(Value::as_str)
    }

    /// The underlying JSON Schema value.
    pub fn json(&self) -> &Value {
        &self.json
    }

    /// Project an object-shaped schema into a flat list of named parameters
    /// for the given location.
    ///
    /// Required-ness is exactly membership in the schema's `required` array,
    /// i.e. "not optional in the source schema" — a property with a default
    /// is still required unless declared optional.
    pub fn parameters(&self, location: ParamLocation) -> Vec<ParamSpec> {
        let empty = Map::new();
        let properties = self
            .json
            .get("properties")
            .and_then(Value::as_object)
            .unwrap_or(&empty);
        let required: Vec<&str> = self
            .json
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        properties
            .iter()
            .map(|(name, schema)| ParamSpec {
                name: name.clone(),
                location,
                required: required.contains(&name.as_str()),
                schema: schema.clone(),
            })
            .collect()
    }
}

/// Where a parameter is located in the HTTP request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    Path,
    Query,
}

/// One projected parameter: a top-level property of a params/query schema.
#[derive(Debug, Clone, Serialize)]
pub struct ParamSpec {
    pub name: String,
    pub location: ParamLocation,
    pub required: bool,
    pub schema: Value,
}

impl ParamSpec {
    /// Render as an OpenAPI `ParameterObject`.
    pub fn to_openapi(&self) -> Value {
        let location = match self.location {
            ParamLocation::Path => "path",
            ParamLocation::Query => "query",
        };
        json!({
            "name": self.name,
            "in": location,
            "required": self.required,
            "schema": self.schema,
        })
    }
}

/// A route's request body: either a validation schema (JSON body, validated
/// and documented from the same source) or a raw OpenAPI `RequestBodyObject`
/// used verbatim — the escape hatch for bodies a schema cannot express,
/// e.g. multipart uploads.
#[derive(Debug, Clone)]
pub enum BodySpec {
    Schema(ApiSchema),
    Raw(Value),
}

impl BodySpec {
    /// The validation schema, when this body is schema-backed.
    pub fn schema(&self) -> Option<&ApiSchema> {
        match self {
            BodySpec::Schema(schema) => Some(schema),
            BodySpec::Raw(_) => None,
        }
    }

    /// Render as an OpenAPI `RequestBodyObject`.
    pub fn to_request_body(&self) -> Value {
        match self {
            BodySpec::Raw(doc) => doc.clone(),
            BodySpec::Schema(schema) => {
                let mut body = json!({
                    "content": {
                        "application/json": { "schema": schema.json() }
                    },
                    "required": !schema.is_optional(),
                });
                if let Some(description) = schema.description() {
                    body["description"] = json!(description);
                }
                body
            }
        }
    }
}

impl From<ApiSchema> for BodySpec {
    fn from(schema: ApiSchema) -> Self {
        BodySpec::Schema(schema)
    }
}

impl From<Value> for BodySpec {
    fn from(doc: Value) -> Self {
        BodySpec::Raw(doc)
    }
}
