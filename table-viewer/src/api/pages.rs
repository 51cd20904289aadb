//! Page-flow handlers: connect, view table, disconnect
//!
//! Every database error in these flows is converted to a message rendered
//! inline on the page; nothing here returns a bare error status.

use axum::extract::State;
use axum::response::Html;
use axum::Form;
use tracing::{error, info};

use crate::database::mysql;
use crate::schema::{ConnectForm, ViewTableForm};
use crate::state::AppState;
use crate::views::{render_index, PageContext, TableData};

/// Handler for GET /
///
/// Renders the empty state: connection form only, no alerts or data.
pub async fn index() -> Html<String> {
    Html(render_index(&PageContext::empty()))
}

/// Handler for POST /database/connect
///
/// Stores the submitted config, then verifies it by opening a connection and
/// listing tables. The config is stored before verification, so a failed
/// connect still replaces the previous config (source behavior, kept as-is).
pub async fn connect(
    State(state): State<AppState>,
    Form(form): Form<ConnectForm>,
) -> Html<String> {
    let config = form.into_config();
    state.set_config(config.clone());

    let context = match try_connect(&config).await {
        Ok(tables) => {
            info!(database = %config.database, "connected");
            PageContext {
                success: Some("Connected successfully!".to_string()),
                tables: Some(tables),
                ..PageContext::default()
            }
        }
        Err(error) => {
            error!(%error, "connect failed");
            PageContext::with_error(error.to_string())
        }
    };

    Html(render_index(&context))
}

async fn try_connect(
    config: &crate::schema::ConnectionConfig,
) -> Result<Vec<String>, crate::database::DatabaseError> {
    let mut connection = mysql::open_connection(config).await?;
    mysql::list_tables(&mut connection).await
}

/// Handler for POST /database/view-table
///
/// Fetches the selected table's rows and column descriptions and re-renders
/// the page with the table list for the dropdown. A fresh connection is
/// opened for the request and dropped when it completes.
pub async fn view_table(
    State(state): State<AppState>,
    Form(form): Form<ViewTableForm>,
) -> Html<String> {
    let Some(config) = state.config() else {
        return Html(render_index(&PageContext::with_error(
            "Please connect to database first",
        )));
    };

    let context = match fetch_table_view(&config, &form.table_name).await {
        Ok((tables, columns, rows)) => PageContext {
            tables: Some(tables),
            selected_table: Some(form.table_name),
            data: Some(TableData { columns, rows }),
            ..PageContext::default()
        },
        Err(error) => {
            error!(table = %form.table_name, %error, "view table failed");
            PageContext::with_error(format!("Failed to fetch table data: {error}"))
        }
    };

    Html(render_index(&context))
}

async fn fetch_table_view(
    config: &crate::schema::ConnectionConfig,
    table: &str,
) -> Result<
    (Vec<String>, Vec<crate::schema::ColumnInfo>, Vec<serde_json::Value>),
    crate::database::DatabaseError,
> {
    let mut connection = mysql::open_connection(config).await?;

    let row_set = mysql::fetch_table_rows(&mut connection, table).await?;
    let columns = mysql::describe_table(&mut connection, table).await?;
    // Re-list tables for the dropdown
    let tables = mysql::list_tables(&mut connection).await?;

    Ok((tables, columns, row_set.rows))
}

/// Handler for POST /database/disconnect
///
/// Clears the active config and renders the cleared state.
pub async fn disconnect(State(state): State<AppState>) -> Html<String> {
    state.clear_config();
    Html(render_index(&PageContext::with_success(
        "Disconnected from database",
    )))
}
