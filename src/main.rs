use axum::{Json, Router, routing::get};
use carebook::{
    Config,
    api::{ApiDoc, api_routes},
    core::services::{CarebookService, ServiceSettings},
    infrastructure::{
        images::{ImageHost, cloudinary::CloudinaryClient, in_memory::InMemoryImageHost},
        logging::in_memory::InMemoryLogging,
        payments::{PaymentGateway, razorpay::RazorpayClient},
        storage::in_memory::InMemoryStorage,
    },
};
use http::{HeaderName, Method, header};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    // Initialize tracing; RUST_LOG wins over LOG_LEVEL
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string())))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::from_env().inspect_err(|e| error!("Refusing to start: {}", e))?;
    info!("Loaded configuration: {:?}", config);

    // Initialize storage, logging and the external collaborators
    let storage = InMemoryStorage::new();
    let logging = InMemoryLogging::new();
    let images: Arc<dyn ImageHost> = match config.cloudinary.clone() {
        Some(cloudinary) => Arc::new(CloudinaryClient::new(cloudinary)),
        None => {
            warn!("Cloudinary credentials not set, keeping uploaded images in memory");
            Arc::new(InMemoryImageHost::new())
        }
    };
    let payments: Arc<dyn PaymentGateway> = Arc::new(RazorpayClient::new(config.razorpay.clone()));

    let service = Arc::new(CarebookService::new(
        storage,
        logging,
        images,
        payments,
        &config.jwt_secret,
        ServiceSettings::from(&config),
    ));

    let app = Router::new()
        // add / route with a simple health check
        .route("/", get(|| async { Json(json!({ "success": true, "message": "API working" })) }))
        .merge(api_routes(service, config.max_upload_bytes))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CompressionLayer::new()) // Gzip compression
        .layer(TimeoutLayer::new(Duration::from_secs(30))) // 30-second timeout
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([
                    header::CONTENT_TYPE,
                    header::AUTHORIZATION,
                    HeaderName::from_static("token"),
                    HeaderName::from_static("utoken"),
                ]),
        )
        .layer(TraceLayer::new_for_http()); // Request tracing

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Server running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
