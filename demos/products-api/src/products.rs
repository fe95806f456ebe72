//! Route declarations for the products resource.

use routedoc_core::prelude::*;
use serde_json::json;

use crate::repository::ProductRepository;
use crate::schemas::{CreateProduct, ListFilter, Product, ProductIdParams, ProductPatch};

pub fn controller(repo: ProductRepository) -> ApiController {
    let list_repo = repo.clone();
    let create_repo = repo.clone();
    let get_repo = repo.clone();
    let patch_repo = repo.clone();
    let delete_repo = repo;

    ApiController::with_default_responses([(404, not_found_response())])
        .route(
            Route::get("/api/products")
                .describe("List products, optionally filtered by name and categories")
                .tag("products")
                .query(ApiSchema::of::<ListFilter>())
                .response(200, ApiSchema::of::<Vec<Product>>()),
            move |request: ParsedRequest| {
                let repo = list_repo.clone();
                async move {
                    let filter: ListFilter = request.query_as()?;
                    let products = repo.list(&filter).await;
                    Ok(Json(products).into_response())
                }
            },
        )
        .route(
            Route::post("/api/products")
                .describe("Create a product")
                .tag("products")
                .body(ApiSchema::of::<CreateProduct>())
                .response(201, ApiSchema::of::<Product>()),
            move |request: ParsedRequest| {
                let repo = create_repo.clone();
                async move {
                    let input: CreateProduct = request.body_as()?;
                    let product = repo.create(input).await;
                    Ok((StatusCode::CREATED, Json(product)).into_response())
                }
            },
        )
        .route(
            Route::get("/api/products/:productId")
                .describe("Fetch one product by id")
                .tag("products")
                .params(ApiSchema::of::<ProductIdParams>())
                .response(200, ApiSchema::of::<Product>()),
            move |request: ParsedRequest| {
                let repo = get_repo.clone();
                async move {
                    let params: ProductIdParams = request.params_as()?;
                    let product = repo
                        .get(params.product_id)
                        .await
                        .ok_or_else(|| not_found(params.product_id))?;
                    Ok(Json(product).into_response())
                }
            },
        )
        .route(
            Route::patch("/api/products/:productId")
                .describe("Update some fields of a product")
                .tag("products")
                .params(ApiSchema::of::<ProductIdParams>())
                .body(ApiSchema::of::<ProductPatch>())
                .response(200, ApiSchema::of::<Product>()),
            move |request: ParsedRequest| {
                let repo = patch_repo.clone();
                async move {
                    let params: ProductIdParams = request.params_as()?;
                    let patch: ProductPatch = request.body_as()?;
                    let product = repo
                        .update(params.product_id, patch)
                        .await
                        .ok_or_else(|| not_found(params.product_id))?;
                    Ok(Json(product).into_response())
                }
            },
        )
        .route(
            Route::delete("/api/products/:productId")
                .describe("Delete a product")
                .tag("products")
                .params(ApiSchema::of::<ProductIdParams>())
                .response(204, ApiSchema::no_content()),
            move |request: ParsedRequest| {
                let repo = delete_repo.clone();
                async move {
                    let params: ProductIdParams = request.params_as()?;
                    if !repo.delete(params.product_id).await {
                        return Err(not_found(params.product_id));
                    }
                    Ok(StatusCode::NO_CONTENT.into_response())
                }
            },
        )
}

fn not_found(id: u64) -> AppError {
    AppError::Custom {
        status: StatusCode::NOT_FOUND,
        body: json!({ "message": format!("Product {id} not found") }),
    }
}

fn not_found_response() -> ResponseSpec {
    ResponseSpec::Raw(json!({
        "description": "Product not found",
        "content": {
            "application/json": {
                "schema": {
                    "type": "object",
                    "properties": { "message": { "type": "string" } },
                    "required": ["message"],
                }
            }
        }
    }))
}
