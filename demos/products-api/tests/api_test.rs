use products_api::build_app;
use products_api::repository::ProductRepository;
use products_api::schemas::Product;
use routedoc_test::TestApp;
use serde_json::{json, Value};

fn app() -> TestApp {
    TestApp::new(build_app(ProductRepository::seeded()))
}

#[tokio::test]
async fn lists_and_filters_products() {
    let app = app();

    let all: Vec<Product> = app.get("/api/products").send().await.assert_ok().json();
    assert_eq!(all.len(), 2);

    let lamps: Vec<Product> = app
        .get("/api/products?name=lamp")
        .send()
        .await
        .assert_ok()
        .json();
    assert_eq!(lamps.len(), 1);
    assert_eq!(lamps[0].name, "Desk lamp");

    let furniture: Vec<Product> = app
        .get("/api/products?categories=furniture")
        .send()
        .await
        .assert_ok()
        .json();
    assert_eq!(furniture.len(), 1);
    assert_eq!(furniture[0].id, 2);
}

#[tokio::test]
async fn creates_then_fetches_a_product() {
    let app = app();

    let created: Product = app
        .post("/api/products")
        .json(&json!({
            "name": "Monitor arm",
            "price": 59.99,
            "categories": ["office"],
        }))
        .send()
        .await
        .assert_status(http::StatusCode::CREATED)
        .json();
    assert_eq!(created.id, 3);

    let fetched: Product = app
        .get("/api/products/3")
        .send()
        .await
        .assert_ok()
        .json();
    assert_eq!(fetched.name, "Monitor arm");
}

#[tokio::test]
async fn patches_only_the_given_fields() {
    let app = app();

    let updated: Product = app
        .patch("/api/products/1")
        .json(&json!({ "price": 29.0 }))
        .send()
        .await
        .assert_ok()
        .json();
    assert_eq!(updated.price, 29.0);
    assert_eq!(updated.name, "Desk lamp");
}

#[tokio::test]
async fn deletes_a_product() {
    let app = app();

    app.delete("/api/products/1")
        .send()
        .await
        .assert_status(http::StatusCode::NO_CONTENT);
    app.get("/api/products/1").send().await.assert_not_found();
}

#[tokio::test]
async fn unknown_id_answers_the_documented_404_shape() {
    let app = app();

    let response = app.get("/api/products/999").send().await.assert_not_found();
    assert_eq!(response.json_value()["message"], "Product 999 not found");
}

#[tokio::test]
async fn invalid_request_reports_every_failing_facet() {
    let app = app();

    // non-numeric id and an out-of-range price, in one request
    let response = app
        .patch("/api/products/abc")
        .json(&json!({ "price": 0.0 }))
        .send()
        .await
        .assert_bad_request();

    let failures: Vec<Value> = response.json();
    let facets: Vec<&str> = failures
        .iter()
        .map(|failure| failure["type"].as_str().unwrap())
        .collect();
    assert_eq!(facets, vec!["Params", "Body"]);
}

#[tokio::test]
async fn serves_the_generated_document() {
    let app = app();

    let document = app.get("/swagger.json").send().await.assert_ok().json_value();
    assert_eq!(document["openapi"], "3.0.0");
    assert_eq!(document["info"]["title"], "Products API");

    let item = &document["paths"]["/api/products/{productId}"];
    for method in ["get", "patch", "delete"] {
        assert!(item.get(method).is_some(), "missing {method} operation");
    }

    // the path parameter is documented from the params schema
    let parameters = item["get"]["parameters"].as_array().unwrap();
    assert!(parameters
        .iter()
        .any(|p| p["name"] == "productId" && p["in"] == "path" && p["required"] == true));

    // delete documents a bodiless 204
    let no_content = &item["delete"]["responses"]["204"];
    assert_eq!(no_content["description"], "No content");
    assert!(no_content.get("content").is_none());

    // the controller-wide 404 shows up on every operation
    assert_eq!(
        item["get"]["responses"]["404"]["description"],
        "Product not found"
    );
}

#[tokio::test]
async fn document_conforms_to_the_openapi_meta_schema() {
    let meta: Value = serde_json::from_str(include_str!("data/openapi-3.0-schema.json"))
        .expect("meta-schema parses");
    let validator = jsonschema::validator_for(&meta).expect("meta-schema compiles");

    let app = app();
    let document = app.get("/swagger.json").send().await.assert_ok().json_value();

    let violations: Vec<String> = validator
        .iter_errors(&document)
        .map(|error| format!("{} at {}", error, error.instance_path()))
        .collect();
    assert!(
        violations.is_empty(),
        "generated document violates the OpenAPI 3.0 meta-schema:\n{}",
        violations.join("\n")
    );
}

#[tokio::test]
async fn serves_the_docs_ui() {
    let app = app();
    let response = app.get("/api-docs").send().await.assert_ok();
    assert!(response.text().contains("Products API v1.0.0"));
}
