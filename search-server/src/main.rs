//! Live-search server
//!
//! Fixed-config variant: one shared MySQL pool created at startup with a
//! bounded number of concurrent connections; every request borrows a
//! connection from the pool and returns it automatically.

mod search;

use axum::response::Html;
use axum::routing::get;
use axum::Router;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use sqlx::MySqlPool;
use table_viewer::ConnectionConfig;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_PORT: u16 = 3000;

/// Bounded concurrent connections; requests beyond this queue in the pool
const POOL_MAX_CONNECTIONS: u32 = 10;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = config_from_env();
    let pool = create_pool(&config);

    let port = std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    let app = create_router(pool);

    let address = format!("0.0.0.0:{port}");
    info!(%address, database = %config.database, "starting search server");

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .expect("Failed to bind listening port");
    axum::serve(listener, app).await.expect("Server error");
}

/// Immutable connection config for the process lifetime, read once from the
/// environment
fn config_from_env() -> ConnectionConfig {
    ConnectionConfig {
        host: std::env::var("DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
        port: std::env::var("DB_PORT")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(3306),
        user: std::env::var("DB_USER").unwrap_or_else(|_| "root".to_string()),
        password: std::env::var("DB_PASSWORD").unwrap_or_default(),
        database: std::env::var("DB_NAME").unwrap_or_else(|_| "demo".to_string()),
    }
}

/// Create the shared pool; connections are established lazily on first use
fn create_pool(config: &ConnectionConfig) -> MySqlPool {
    let options = MySqlConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .password(&config.password)
        .database(&config.database);

    MySqlPoolOptions::new()
        .max_connections(POOL_MAX_CONNECTIONS)
        .connect_lazy_with(options)
}

fn create_router(pool: MySqlPool) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/search", get(search::search_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(pool)
}

/// Serve the embedded live-search page
async fn index() -> Html<&'static str> {
    Html(SEARCH_PAGE)
}

const SEARCH_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Live Search</title>
    <style>
        body { font-family: Arial, sans-serif; max-width: 600px; margin: 40px auto; padding: 20px; }
        input { width: 100%; padding: 10px; border: 1px solid #ddd; border-radius: 4px; font-size: 16px; box-sizing: border-box; }
        ul { list-style: none; padding: 0; }
        li { padding: 10px; border-bottom: 1px solid #eee; }
        .meta { color: #888; font-size: 13px; }
    </style>
</head>
<body>
    <h1>Live Search</h1>
    <input type="text" id="search" placeholder="Search by name, location, bio, or age..." autocomplete="off">
    <ul id="results"></ul>
    <script>
        const input = document.getElementById('search');
        const results = document.getElementById('results');
        let timer = null;
        input.addEventListener('input', () => {
            clearTimeout(timer);
            timer = setTimeout(async () => {
                const response = await fetch('/search?q=' + encodeURIComponent(input.value));
                const rows = await response.json();
                results.innerHTML = Array.isArray(rows)
                    ? rows.map(row =>
                        `<li>${escapeHtml(String(row.name ?? ''))}` +
                        `<div class="meta">${escapeHtml(String(row.location ?? ''))}` +
                        ` &middot; age ${escapeHtml(String(row.age ?? ''))}</div></li>`
                      ).join('')
                    : '';
            }, 200);
        });
        function escapeHtml(text) {
            const div = document.createElement('div');
            div.textContent = text;
            return div.innerHTML;
        }
    </script>
</body>
</html>
"#;
