use table_viewer::{create_router, AppState};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_PORT: u16 = 3000;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let port = std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    let app = create_router(AppState::new());

    let address = format!("0.0.0.0:{port}");
    info!(%address, "starting table viewer");

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .expect("Failed to bind listening port");
    axum::serve(listener, app).await.expect("Server error");
}
