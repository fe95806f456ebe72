//! Normalization of declared route responses into OpenAPI `ResponseObject`s.

use serde_json::{json, Value};

use crate::schema::ApiSchema;

const NO_CONTENT_DESCRIPTION: &str = "No content";

/// A declared response for one status code: either a validation schema
/// (meaning a JSON body of that shape) or a raw OpenAPI `ResponseObject`
/// used as-is — the escape hatch for responses schemas cannot express,
/// e.g. binary downloads.
#[derive(Debug, Clone)]
pub enum ResponseSpec {
    Schema(ApiSchema),
    Raw(Value),
}

impl ResponseSpec {
    /// Render as an OpenAPI `ResponseObject`.
    ///
    /// The no-content sentinel yields `{"description": "No content"}` with
    /// no `content` key at all. Strict OpenAPI consumers treat an empty
    /// `content: {}` differently from an omitted key, so the key must be
    /// absent, not empty.
    pub fn normalize(&self) -> Value {
        match self {
            ResponseSpec::Raw(doc) => doc.clone(),
            ResponseSpec::Schema(schema) if schema.is_no_content() => {
                json!({ "description": NO_CONTENT_DESCRIPTION })
            }
            ResponseSpec::Schema(schema) => json!({
                "description": schema.description().unwrap_or(""),
                "content": {
                    "application/json": { "schema": schema.json() }
                }
            }),
        }
    }
}

impl From<ApiSchema> for ResponseSpec {
    fn from(schema: ApiSchema) -> Self {
        ResponseSpec::Schema(schema)
    }
}

impl From<Value> for ResponseSpec {
    fn from(doc: Value) -> Self {
        ResponseSpec::Raw(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_content_sentinel_omits_content_key() {
        let normalized = ResponseSpec::from(ApiSchema::no_content()).normalize();
        assert_eq!(normalized["description"], "No content");
        assert!(normalized.get("content").is_none());
    }

    #[test]
    fn schema_response_carries_json_content() {
        let schema = ApiSchema::raw(json!({ "type": "object" }));
        let normalized = ResponseSpec::from(schema).normalize();
        assert_eq!(normalized["description"], "");
        assert_eq!(
            normalized["content"]["application/json"]["schema"]["type"],
            "object"
        );
    }

    #[test]
    fn schema_description_becomes_response_description() {
        let schema = ApiSchema::raw(json!({ "type": "array" })).describe("all products");
        let normalized = ResponseSpec::from(schema).normalize();
        assert_eq!(normalized["description"], "all products");
    }

    #[test]
    fn raw_response_passes_through() {
        let doc = json!({
            "description": "Error response",
            "content": { "application/json": { "schema": { "type": "object" } } }
        });
        assert_eq!(ResponseSpec::from(doc.clone()).normalize(), doc);
    }
}
