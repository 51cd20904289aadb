//! MySQL connection handling and query execution
//!
//! Every function here runs a read-only statement (SELECT/SHOW/DESCRIBE) and
//! returns rows in the order the server produced them. Connections are opened
//! per call by the handlers and closed when dropped; there is no retry and no
//! partial result.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::Value;
use sqlx::mysql::{MySqlColumn, MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::{Column, ConnectOptions, Row, TypeInfo, ValueRef};

use crate::database::DatabaseError;
use crate::schema::{ColumnInfo, ConnectionConfig, RowSet};

/// Open a brand-new connection for the given config
///
/// The credential-driven flow opens one connection per request and drops it
/// when the request finishes, so a stale config never keeps a handle alive.
pub async fn open_connection(
    config: &ConnectionConfig,
) -> Result<MySqlConnection, DatabaseError> {
    let options = MySqlConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .password(&config.password)
        .database(&config.database);

    options
        .connect()
        .await
        .map_err(|error| DatabaseError::Connection(error.to_string()))
}

/// Quote an identifier (table name) to prevent breaking out of the SQL text
///
/// MySQL uses backticks for identifiers; backticks inside the name are
/// escaped by doubling them. Identifiers cannot be bound as parameters, so
/// interpolation is unavoidable here; callers additionally validate table
/// names against the introspected table list before interpolating.
fn quote_identifier(identifier: &str) -> String {
    format!("`{}`", identifier.replace('`', "``"))
}

/// List all table names in the connected database
pub async fn list_tables(
    connection: &mut MySqlConnection,
) -> Result<Vec<String>, DatabaseError> {
    let rows = sqlx::query("SHOW TABLES").fetch_all(&mut *connection).await?;

    // SHOW TABLES returns a single column named after the database
    // ("Tables_in_<db>"), so read it by position.
    let mut tables = Vec::with_capacity(rows.len());
    for row in &rows {
        tables.push(text_at(row, 0).unwrap_or_default());
    }

    Ok(tables)
}

/// Check that a table exists before its name is interpolated into SQL
async fn ensure_table_exists(
    connection: &mut MySqlConnection,
    table: &str,
) -> Result<(), DatabaseError> {
    let tables = list_tables(connection).await?;
    if tables.iter().any(|name| name == table) {
        Ok(())
    } else {
        Err(DatabaseError::TableNotFound(table.to_string()))
    }
}

/// Get column information for a table via `DESCRIBE`
pub async fn describe_table(
    connection: &mut MySqlConnection,
    table: &str,
) -> Result<Vec<ColumnInfo>, DatabaseError> {
    ensure_table_exists(connection, table).await?;

    let describe_query = format!("DESCRIBE {}", quote_identifier(table));
    let rows = sqlx::query(&describe_query)
        .fetch_all(&mut *connection)
        .await?;

    // DESCRIBE returns: Field, Type, Null, Key, Default, Extra
    let mut columns = Vec::with_capacity(rows.len());
    for row in &rows {
        let nullable = text_at(row, 2).as_deref() == Some("YES");
        columns.push(ColumnInfo {
            field: text_at(row, 0).unwrap_or_default(),
            data_type: text_at(row, 1).unwrap_or_default(),
            nullable,
            key: text_at(row, 3).unwrap_or_default(),
            default_value: text_at(row, 4),
            extra: text_at(row, 5).unwrap_or_default(),
        });
    }

    Ok(columns)
}

/// Fetch every row of a table
///
/// The table name is validated against `SHOW TABLES` first, then interpolated
/// quoted; literal values never appear here so nothing else needs binding.
pub async fn fetch_table_rows(
    connection: &mut MySqlConnection,
    table: &str,
) -> Result<RowSet, DatabaseError> {
    ensure_table_exists(connection, table).await?;

    let select_query = format!("SELECT * FROM {}", quote_identifier(table));
    let rows = sqlx::query(&select_query)
        .fetch_all(&mut *connection)
        .await?;

    row_set_from(&rows)
}

/// Execute an arbitrary SQL string, as supplied
///
/// Free-form query text is an accepted risk surface of the custom-query
/// export flow; it is executed without validation or rewriting.
pub async fn run_query(
    connection: &mut MySqlConnection,
    sql: &str,
) -> Result<RowSet, DatabaseError> {
    let rows = sqlx::query(sql).fetch_all(&mut *connection).await?;
    row_set_from(&rows)
}

/// Build a [`RowSet`] from driver rows, capturing column order from the
/// first row
pub fn row_set_from(rows: &[MySqlRow]) -> Result<RowSet, DatabaseError> {
    let columns = if let Some(first_row) = rows.first() {
        first_row
            .columns()
            .iter()
            .map(|column| column.name().to_string())
            .collect()
    } else {
        Vec::new()
    };

    Ok(RowSet {
        columns,
        rows: rows_to_json(rows)?,
    })
}

/// Convert driver rows to flat JSON objects
pub fn rows_to_json(rows: &[MySqlRow]) -> Result<Vec<Value>, DatabaseError> {
    let mut json_rows = Vec::with_capacity(rows.len());
    for row in rows {
        json_rows.push(row_to_json(row)?);
    }
    Ok(json_rows)
}

/// Convert a single MySQL row to a JSON object
fn row_to_json(row: &MySqlRow) -> Result<Value, DatabaseError> {
    let mut map = serde_json::Map::new();

    for column in row.columns() {
        let value = extract_column_value(row, column)?;
        map.insert(column.name().to_string(), value);
    }

    Ok(Value::Object(map))
}

/// Extract a column value from a MySQL row and convert it to JSON
///
/// The driver reports the server-side type; values are decoded accordingly
/// with a permissive fallback chain so unexpected types degrade to a string
/// or null instead of failing the whole result set.
fn extract_column_value(row: &MySqlRow, column: &MySqlColumn) -> Result<Value, DatabaseError> {
    let column_name = column.name();
    let type_name = column.type_info().name();

    if row
        .try_get_raw(column_name)
        .map_err(|error| DatabaseError::Query(error.to_string()))?
        .is_null()
    {
        return Ok(Value::Null);
    }

    match type_name {
        "BOOLEAN" => {
            if let Ok(value) = row.try_get::<bool, _>(column_name) {
                return Ok(Value::Bool(value));
            }
        }
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" => {
            if let Ok(value) = row.try_get::<i64, _>(column_name) {
                return Ok(Value::Number(value.into()));
            }
        }
        "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
        | "BIGINT UNSIGNED" | "BIT" => {
            if let Ok(value) = row.try_get::<u64, _>(column_name) {
                return Ok(Value::Number(value.into()));
            }
        }
        "FLOAT" | "DOUBLE" => {
            if let Ok(value) = row.try_get::<f64, _>(column_name) {
                if let Some(number) = serde_json::Number::from_f64(value) {
                    return Ok(Value::Number(number));
                }
            }
        }
        "DATETIME" => {
            if let Ok(value) = row.try_get::<NaiveDateTime, _>(column_name) {
                return Ok(Value::String(value.to_string()));
            }
        }
        "TIMESTAMP" => {
            if let Ok(value) = row.try_get::<DateTime<Utc>, _>(column_name) {
                return Ok(Value::String(value.to_rfc3339()));
            }
        }
        "DATE" => {
            if let Ok(value) = row.try_get::<NaiveDate, _>(column_name) {
                return Ok(Value::String(value.to_string()));
            }
        }
        "TIME" => {
            if let Ok(value) = row.try_get::<NaiveTime, _>(column_name) {
                return Ok(Value::String(value.to_string()));
            }
        }
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" => {
            if let Ok(value) = row.try_get::<Vec<u8>, _>(column_name) {
                return Ok(Value::String(binary_placeholder(&value)));
            }
        }
        _ => {
            // DECIMAL, CHAR/VARCHAR, the TEXT family, ENUM, SET, and JSON all
            // decode cleanly as strings.
            if let Ok(value) = row.try_get::<String, _>(column_name) {
                return Ok(Value::String(value));
            }
        }
    }

    // Fallback: try common decodings in order before giving up.
    if let Ok(value) = row.try_get::<String, _>(column_name) {
        return Ok(Value::String(value));
    }
    if let Ok(value) = row.try_get::<i64, _>(column_name) {
        return Ok(Value::Number(value.into()));
    }
    if let Ok(value) = row.try_get::<u64, _>(column_name) {
        return Ok(Value::Number(value.into()));
    }
    if let Ok(value) = row.try_get::<f64, _>(column_name) {
        if let Some(number) = serde_json::Number::from_f64(value) {
            return Ok(Value::Number(number));
        }
    }
    if let Ok(value) = row.try_get::<Vec<u8>, _>(column_name) {
        return Ok(Value::String(
            String::from_utf8(value.clone())
                .unwrap_or_else(|_| binary_placeholder(&value)),
        ));
    }

    Ok(Value::Null)
}

/// Render binary data as a short hex-labelled placeholder
fn binary_placeholder(data: &[u8]) -> String {
    const PREVIEW_BYTES: usize = 32;

    let preview = &data[..data.len().min(PREVIEW_BYTES)];
    let suffix = if data.len() > PREVIEW_BYTES { "..." } else { "" };
    format!("[BLOB: {} bytes, hex: {}{}]", data.len(), hex::encode(preview), suffix)
}

/// Read a column as text by position, tolerating byte-typed metadata columns
fn text_at(row: &MySqlRow, index: usize) -> Option<String> {
    if let Ok(value) = row.try_get::<Option<String>, _>(index) {
        return value;
    }
    row.try_get::<Option<Vec<u8>>, _>(index)
        .ok()
        .flatten()
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("users"), "`users`");
        assert_eq!(quote_identifier("odd`name"), "`odd``name`");
    }

    #[test]
    fn test_binary_placeholder_short() {
        let placeholder = binary_placeholder(&[0xde, 0xad]);
        assert_eq!(placeholder, "[BLOB: 2 bytes, hex: dead]");
    }

    #[test]
    fn test_binary_placeholder_truncates_preview() {
        let data = vec![0xab; 100];
        let placeholder = binary_placeholder(&data);
        assert!(placeholder.starts_with("[BLOB: 100 bytes, hex: "));
        assert!(placeholder.ends_with("...]"));
        // 32 preview bytes -> 64 hex characters
        assert!(placeholder.contains(&"ab".repeat(32)));
    }
}
