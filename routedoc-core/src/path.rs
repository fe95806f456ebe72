//! Translation between the controller's express-style path notation
//! (`/products/:productId`) and the brace notation used both by OpenAPI
//! and by the axum router (`/products/{productId}`).

use std::fmt;

/// Characters allowed in a path parameter name, matching RFC 3986 unreserved
/// characters.
fn is_param_ident(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~'))
}

/// Convert `/api/products/:productId` to `/api/products/{productId}`.
///
/// Only whole segments consisting of a leading `:` followed by a valid
/// parameter identifier are rewritten, so the conversion is idempotent:
/// segments already in brace form (or literal segments) pass through
/// unchanged.
pub fn to_openapi_path(path: &str) -> String {
    path.split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) if is_param_ident(name) => format!("{{{name}}}"),
            _ => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Convert `/api/products/{productId}` back to `/api/products/:productId`.
///
/// Brace syntax alone cannot be distinguished from literal braces, so the
/// caller supplies the parameter names declared in the params schema; only
/// those braces are rewritten.
pub fn to_router_path<I, S>(path: &str, param_names: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = path.to_string();
    for name in param_names {
        let name = name.as_ref();
        out = out.replace(&format!("{{{name}}}"), &format!(":{name}"));
    }
    out
}

/// A path segment containing a `:` that does not form a parameter token.
///
/// Neither notation gives a mid-segment colon a meaning, so it is rejected
/// at registration rather than passed through as a literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidPath {
    pub path: String,
    pub segment: String,
}

impl fmt::Display for InvalidPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "path '{}' contains segment '{}' with a literal ':' that is not a parameter token",
            self.path, self.segment
        )
    }
}

impl std::error::Error for InvalidPath {}

/// Reject paths where a `:` appears anywhere but as a full parameter token.
pub fn check_router_path(path: &str) -> Result<(), InvalidPath> {
    for segment in path.split('/') {
        if !segment.contains(':') {
            continue;
        }
        match segment.strip_prefix(':') {
            Some(name) if is_param_ident(name) => {}
            _ => {
                return Err(InvalidPath {
                    path: path.to_string(),
                    segment: segment.to_string(),
                })
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_colon_tokens_to_braces() {
        assert_eq!(
            to_openapi_path("/api/products/:productId"),
            "/api/products/{productId}"
        );
        assert_eq!(
            to_openapi_path("/api/products/:productId/images/:imageId"),
            "/api/products/{productId}/images/{imageId}"
        );
    }

    #[test]
    fn leaves_literal_segments_alone() {
        assert_eq!(to_openapi_path("/api/products"), "/api/products");
        assert_eq!(to_openapi_path("/"), "/");
    }

    #[test]
    fn translation_is_idempotent() {
        let once = to_openapi_path("/api/products/:productId");
        assert_eq!(to_openapi_path(&once), once);
    }

    #[test]
    fn inverse_uses_declared_names_only() {
        assert_eq!(
            to_router_path("/api/products/{productId}", ["productId"]),
            "/api/products/:productId"
        );
        // undeclared braces stay literal
        assert_eq!(
            to_router_path("/api/{literal}/{productId}", ["productId"]),
            "/api/{literal}/:productId"
        );
    }

    #[test]
    fn round_trip_through_both_notations() {
        let router = "/api/products/:productId";
        let openapi = to_openapi_path(router);
        assert_eq!(to_router_path(&openapi, ["productId"]), router);
    }

    #[test]
    fn rejects_mid_segment_colon() {
        assert!(check_router_path("/api/pro:ducts").is_err());
        assert!(check_router_path("/api/products/:").is_err());
        assert!(check_router_path("/api/products/:id").is_ok());
        assert!(check_router_path("/api/products").is_ok());
    }
}
