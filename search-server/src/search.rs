//! Live-search endpoint
//!
//! One parameterized query per request against the shared pool: three
//! substring clauses over name, location, and bio, plus an exact age clause
//! when the term is all digits. The row limit is a fixed constant.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use sqlx::MySqlPool;
use tracing::error;

use table_viewer::rows_to_json;

/// Fixed cap on returned rows; not user-configurable
const SEARCH_RESULT_LIMIT: u32 = 25;

/// Query string for GET /search
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// Handler for GET /search?q=term
///
/// Returns a JSON array of matching records, at most
/// [`SEARCH_RESULT_LIMIT`] rows. An empty or whitespace-only term returns
/// `[]` without touching the pool.
pub async fn search_handler(
    State(pool): State<MySqlPool>,
    Query(params): Query<SearchParams>,
) -> Response {
    let term = params.q.unwrap_or_default().trim().to_string();

    if term.is_empty() {
        return Json(Vec::<serde_json::Value>::new()).into_response();
    }

    // An all-digits term also matches the age column exactly, with the
    // parsed integer bound as an extra parameter.
    let exact_age = parse_numeric_term(&term);
    let sql = build_search_sql(exact_age.is_some());
    let like = format!("%{term}%");

    let mut query = sqlx::query(&sql).bind(&like).bind(&like).bind(&like);
    if let Some(age) = exact_age {
        query = query.bind(age);
    }

    match query.fetch_all(&pool).await {
        Ok(rows) => match rows_to_json(&rows) {
            Ok(records) => Json(records).into_response(),
            Err(database_error) => {
                error!(%database_error, "search row decoding failed");
                database_error_response()
            }
        },
        Err(database_error) => {
            error!(%database_error, "search query failed");
            database_error_response()
        }
    }
}

fn database_error_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": "Database error" })),
    )
        .into_response()
}

/// Parse the term as an exact-age match candidate
///
/// Only all-digits terms qualify; anything else (including signed or
/// overflowing values) falls back to substring matching alone.
fn parse_numeric_term(term: &str) -> Option<i64> {
    if term.chars().all(|character| character.is_ascii_digit()) {
        term.parse().ok()
    } else {
        None
    }
}

/// Build the search statement; literal values are always bound, never
/// concatenated
fn build_search_sql(with_age_clause: bool) -> String {
    let age_clause = if with_age_clause { " OR age = ?" } else { "" };
    format!(
        "SELECT id, name, age, location FROM people \
         WHERE name LIKE ? OR location LIKE ? OR bio LIKE ?{age_clause} \
         LIMIT {SEARCH_RESULT_LIMIT}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    #[test]
    fn test_parse_numeric_term() {
        assert_eq!(parse_numeric_term("42"), Some(42));
        assert_eq!(parse_numeric_term("0"), Some(0));
        assert_eq!(parse_numeric_term("abc"), None);
        assert_eq!(parse_numeric_term("4a2"), None);
        assert_eq!(parse_numeric_term("-7"), None);
        // All digits but too large for i64
        assert_eq!(parse_numeric_term("99999999999999999999"), None);
    }

    #[test]
    fn test_search_sql_with_numeric_term() {
        let sql = build_search_sql(true);
        assert!(sql.contains("name LIKE ?"));
        assert!(sql.contains("location LIKE ?"));
        assert!(sql.contains("bio LIKE ?"));
        assert!(sql.contains("OR age = ?"));
        assert!(sql.ends_with("LIMIT 25"));
    }

    #[test]
    fn test_search_sql_without_numeric_term() {
        let sql = build_search_sql(false);
        assert!(!sql.contains("age = ?"));
        assert!(sql.ends_with("LIMIT 25"));
    }

    /// Empty and whitespace-only terms short-circuit before any pool use, so
    /// a lazily-created pool with no server behind it works here.
    #[tokio::test]
    async fn test_empty_term_returns_empty_array() {
        let pool = sqlx::mysql::MySqlPoolOptions::new()
            .max_connections(1)
            .connect_lazy("mysql://root@localhost:1/none")
            .expect("lazy pool");
        let app = crate::create_router(pool);

        for uri in ["/search", "/search?q=", "/search?q=%20%20"] {
            let response = app
                .clone()
                .oneshot(Request::get(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);

            let bytes = response.into_body().collect().await.unwrap().to_bytes();
            assert_eq!(&bytes[..], b"[]");
        }
    }
}
