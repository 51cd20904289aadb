//! Export-flow handlers: file downloads for table and custom-query exports
//!
//! Errors in these flows come back as JSON `{"error": message}` bodies with
//! an error status code rather than rendered pages.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

use crate::database::{mysql, DatabaseError};
use crate::export::{
    custom_export_basename, export_rows, table_export_basename, ExportError, ExportPayload,
};
use crate::schema::{QueryExportRequest, RowSet};
use crate::state::AppState;

/// Handler for GET /database/export/{format}/{table_name}
///
/// Fetches every row of the table, then serializes it in the requested
/// format. The format value is examined only after the fetch, so an
/// unsupported format is rejected after a successful query.
pub async fn export_table(
    State(state): State<AppState>,
    Path((format, table_name)): Path<(String, String)>,
) -> Response {
    let Some(config) = state.config() else {
        return error_response(StatusCode::BAD_REQUEST, "No database connection");
    };

    let row_set = match fetch_table(&config, &table_name).await {
        Ok(row_set) => row_set,
        Err(error) => {
            error!(table = %table_name, %error, "table export failed");
            return database_error_response(&error);
        }
    };

    match export_rows(
        &row_set,
        &format,
        &table_export_basename(&table_name),
        &table_name,
    ) {
        Ok(payload) => download_response(payload),
        Err(ExportError::EmptyResult) => {
            error_response(StatusCode::NOT_FOUND, "No data found in table")
        }
        Err(error) => export_error_response(&error),
    }
}

async fn fetch_table(
    config: &crate::schema::ConnectionConfig,
    table: &str,
) -> Result<RowSet, DatabaseError> {
    let mut connection = mysql::open_connection(config).await?;
    mysql::fetch_table_rows(&mut connection, table).await
}

/// Handler for POST /database/export-query
///
/// Executes the supplied SQL as-is and serializes the result. The filename
/// override from the request replaces the generated `custom_export_{date}`
/// base name.
pub async fn export_query(
    State(state): State<AppState>,
    Json(request): Json<QueryExportRequest>,
) -> Response {
    let Some(config) = state.config() else {
        return error_response(StatusCode::BAD_REQUEST, "No database connection");
    };

    let row_set = match run_export_query(&config, &request.query).await {
        Ok(row_set) => row_set,
        Err(error) => {
            error!(%error, "query export failed");
            return database_error_response(&error);
        }
    };

    let base_name = custom_export_basename(request.filename.as_deref());
    match export_rows(&row_set, &request.format, &base_name, "Query Results") {
        Ok(payload) => download_response(payload),
        Err(error) => export_error_response(&error),
    }
}

async fn run_export_query(
    config: &crate::schema::ConnectionConfig,
    sql: &str,
) -> Result<RowSet, DatabaseError> {
    let mut connection = mysql::open_connection(config).await?;
    mysql::run_query(&mut connection, sql).await
}

/// Build the attachment response for a finished export
fn download_response(payload: ExportPayload) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, payload.content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", payload.filename),
        )
        .body(Body::from(payload.bytes))
        .unwrap_or_else(|_| Response::new(Body::empty()))
}

fn database_error_response(database_error: &DatabaseError) -> Response {
    let status = match database_error {
        DatabaseError::NotConnected => StatusCode::BAD_REQUEST,
        DatabaseError::TableNotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, &format!("Export failed: {database_error}"))
}

fn export_error_response(export_error: &ExportError) -> Response {
    let status = match export_error {
        ExportError::EmptyResult => StatusCode::NOT_FOUND,
        ExportError::UnsupportedFormat(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, &export_error.to_string())
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}
