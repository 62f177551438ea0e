use axum::{
    routing::{get, post},
    Router,
};
use dotenvy::dotenv;
use std::env;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use medtrack::database::{create_database_pool, Database};
use medtrack::handlers::inventory;

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    env_logger::init();

    let database_url = env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set");

    let db = create_database_pool(&database_url).await
        .expect("Failed to connect to database");

    let app = create_router(db);

    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("0.0.0.0:{}", port);

    println!("🚀 Medtrack server starting on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

fn create_router(db: Database) -> Router {
    Router::new()
        // Inventory ledger views (read-side projections, safe to retry)
        .route("/api/inventory/summary", get(inventory::get_inventory_summary))
        .route("/api/inventory/detail", get(inventory::get_inventory_detail))
        .route("/api/inventory/demo", get(inventory::get_demo_inventory))
        .route("/api/inventory/available", get(inventory::get_available_products))
        .route("/api/inventory/pick", post(inventory::pick_products))
        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(db)
}
