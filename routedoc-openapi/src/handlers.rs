use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::Router;
use routedoc_core::controller::ApiController;
use routedoc_core::layers::{catch_panic_layer, default_trace};

use crate::builder::{build_document, DocsConfig};

/// Mount every controller's router onto `app`, plus the assembled OpenAPI
/// document and a documentation UI pointed at it.
///
/// Assembly happens once, here; the document is then served read-only.
/// The returned router carries request tracing and a panic-to-500 layer.
pub fn configure(app: Router, controllers: Vec<ApiController>, config: DocsConfig) -> Router {
    let document = build_document(&config, controllers.iter());
    let spec_json =
        serde_json::to_string_pretty(&document).unwrap_or_else(|_| "{}".to_string());
    let docs_html = DOCS_HTML
        .replace("%TITLE%", &config.resolved_docs_title())
        .replace("%SPEC_URL%", &config.spec_path);

    let mut app = app;
    for controller in controllers {
        let (router, _) = controller.into_parts();
        app = app.merge(router);
    }

    app = app
        .route(
            &config.spec_path,
            get(move || {
                let json = spec_json.clone();
                async move { ([("content-type", "application/json")], json).into_response() }
            }),
        )
        .route(
            &config.docs_path,
            get(move || {
                let html = docs_html.clone();
                async move { Html(html).into_response() }
            }),
        );

    app.layer(default_trace()).layer(catch_panic_layer())
}

const DOCS_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>%TITLE%</title>
    <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script>
        window.onload = () => {
            SwaggerUIBundle({
                url: "%SPEC_URL%",
                dom_id: "#swagger-ui",
                layout: "BaseLayout",
            });
        };
    </script>
</body>
</html>"##;
