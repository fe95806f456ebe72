use routedoc_core::http::Json;
use routedoc_core::prelude::*;
use routedoc_test::TestApp;
use serde_json::{json, Value};

fn echo_handler(
    request: ParsedRequest,
) -> impl std::future::Future<Output = HandlerResult> + Send {
    async move {
        Ok(Json(json!({
            "params": request.params,
            "query": request.query,
            "body": request.body,
        }))
        .into_response())
    }
}

fn item_controller() -> ApiController {
    let params = ApiSchema::raw(json!({
        "type": "object",
        "properties": { "id": { "type": "integer" } },
        "required": ["id"],
    }));
    let query = ApiSchema::raw(json!({
        "type": "object",
        "properties": {
            "limit": { "type": "integer" },
            "active": { "type": "boolean" },
        },
    }));
    let body = ApiSchema::raw(json!({
        "type": "object",
        "properties": { "name": { "type": "string", "minLength": 1 } },
        "required": ["name"],
    }));

    ApiController::new()
        .route(
            Route::get("/items")
                .query(query)
                .response(200, ApiSchema::raw(json!({ "type": "object" }))),
            echo_handler,
        )
        .route(
            Route::patch("/items/:id")
                .params(params)
                .body(body)
                .response(200, ApiSchema::raw(json!({ "type": "object" }))),
            echo_handler,
        )
}

#[tokio::test]
async fn path_params_are_coerced_to_schema_types() {
    let app = TestApp::new(item_controller().router());

    let response = app
        .patch("/items/7")
        .json(&json!({ "name": "lamp" }))
        .send()
        .await
        .assert_ok();

    let echoed = response.json_value();
    assert_eq!(echoed["params"]["id"], json!(7));
    assert_eq!(echoed["body"]["name"], "lamp");
}

#[tokio::test]
async fn query_strings_are_coerced_to_schema_types() {
    let app = TestApp::new(item_controller().router());

    let response = app
        .get("/items?limit=5&active=true")
        .send()
        .await
        .assert_ok();

    let echoed = response.json_value();
    assert_eq!(echoed["query"]["limit"], json!(5));
    assert_eq!(echoed["query"]["active"], json!(true));
}

#[tokio::test]
async fn all_failing_facets_are_reported_together() {
    let app = TestApp::new(item_controller().router());

    let response = app
        .patch("/items/abc")
        .json(&json!({}))
        .send()
        .await
        .assert_bad_request();

    let failures: Vec<Value> = response.json();
    let facets: Vec<&str> = failures
        .iter()
        .map(|failure| failure["type"].as_str().unwrap())
        .collect();
    assert_eq!(facets, vec!["Params", "Body"]);
    for failure in &failures {
        let errors = failure["errors"].as_array().unwrap();
        assert!(!errors.is_empty());
        assert!(errors[0].get("path").is_some());
        assert!(errors[0].get("message").is_some());
    }
}

#[tokio::test]
async fn malformed_json_body_is_a_body_failure() {
    let app = TestApp::new(item_controller().router());

    let response = app
        .patch("/items/7")
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .assert_bad_request();

    let failures: Vec<Value> = response.json();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0]["type"], "Body");
}

#[tokio::test]
async fn undeclared_facets_pass_through_untouched() {
    let app = TestApp::new(item_controller().router());

    // /items declares no params or body schema
    let response = app.get("/items?limit=3").send().await.assert_ok();
    let echoed = response.json_value();
    assert_eq!(echoed["body"], Value::Null);
}

#[tokio::test]
async fn middleware_short_circuits_before_validation() {
    let controller = ApiController::new().route(
        Route::post("/guarded")
            .body(ApiSchema::raw(json!({
                "type": "object",
                "properties": { "name": { "type": "string" } },
                "required": ["name"],
            })))
            .response(200, ApiSchema::no_content())
            .middleware(|_request| async {
                Err((StatusCode::UNAUTHORIZED, "no token").into_response())
            }),
        echo_handler,
    );
    let app = TestApp::new(controller.router());

    // an invalid body would normally fail validation; the middleware
    // answers first
    app.post("/guarded")
        .json(&json!({}))
        .send()
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn handler_errors_use_the_error_channel() {
    let controller = ApiController::new().route(
        Route::get("/missing").response(404, ApiSchema::no_content()),
        |_request: ParsedRequest| async {
            Err(AppError::NotFound("no such thing".to_string()))
        },
    );
    let app = TestApp::new(controller.router());

    let response = app.get("/missing").send().await.assert_not_found();
    assert_eq!(response.json_value()["error"], "no such thing");
}
