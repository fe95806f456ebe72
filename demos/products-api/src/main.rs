use products_api::build_app;
use products_api::repository::ProductRepository;
use routedoc_core::init_tracing;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_tracing();

    let app = build_app(ProductRepository::seeded());
    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
    tracing::info!("listening on {} - docs at /api-docs", listener.local_addr()?);
    axum::serve(listener, app).await
}
