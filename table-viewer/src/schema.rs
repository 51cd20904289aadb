//! Data model for connection state, introspection results, and exports
//!
//! These types mirror what the database driver hands back at runtime; nothing
//! here is cached beyond a single request.

use serde::{Deserialize, Serialize};

/// Connection parameters for one MySQL database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Database host
    pub host: String,

    /// Database port
    pub port: u16,

    /// Username
    pub user: String,

    /// Password
    pub password: String,

    /// Database (schema) name
    pub database: String,
}

/// Information about a single column, as reported by `DESCRIBE`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnInfo {
    /// Column name
    pub field: String,

    /// Declared SQL type (e.g. "int(11)", "varchar(255)")
    pub data_type: String,

    /// Whether the column allows NULL values
    pub nullable: bool,

    /// Key flag ("PRI", "UNI", "MUL", or empty)
    pub key: String,

    /// Default value expression (if any)
    pub default_value: Option<String>,

    /// Extra attributes (e.g. "auto_increment")
    pub extra: String,
}

/// An ordered result set: column names in driver order plus one JSON object
/// per row. Produced fresh for every query and discarded after rendering or
/// export completes.
#[derive(Debug, Clone, Serialize)]
pub struct RowSet {
    /// Column names in the order the driver returned them
    pub columns: Vec<String>,

    /// Row records as flat JSON objects
    pub rows: Vec<serde_json::Value>,
}

impl RowSet {
    /// Whether the result set contains no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Form body for POST /database/connect
#[derive(Debug, Deserialize)]
pub struct ConnectForm {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub port: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub database: String,
}

impl ConnectForm {
    /// Build a connection config, applying the form's defaults for host and
    /// port when the fields were left blank.
    pub fn into_config(self) -> ConnectionConfig {
        let host = if self.host.trim().is_empty() {
            "localhost".to_string()
        } else {
            self.host
        };
        let port = self.port.trim().parse().unwrap_or(3306);

        ConnectionConfig {
            host,
            port,
            user: self.user,
            password: self.password,
            database: self.database,
        }
    }
}

/// Form body for POST /database/view-table
#[derive(Debug, Deserialize)]
pub struct ViewTableForm {
    #[serde(rename = "tableName")]
    pub table_name: String,
}

/// JSON body for POST /database/export-query
#[derive(Debug, Deserialize)]
pub struct QueryExportRequest {
    /// SQL text to execute, as supplied
    pub query: String,

    /// Requested export format ("csv", "json", or "excel"); validated at the
    /// export switch, after the query has run
    pub format: String,

    /// Optional filename override (without extension)
    pub filename: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_form_defaults() {
        let form = ConnectForm {
            host: String::new(),
            port: String::new(),
            user: "root".to_string(),
            password: "secret".to_string(),
            database: "demo".to_string(),
        };

        let config = form.into_config();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 3306);
        assert_eq!(config.user, "root");
        assert_eq!(config.database, "demo");
    }

    #[test]
    fn test_connect_form_explicit_values() {
        let form = ConnectForm {
            host: "db.internal".to_string(),
            port: "3307".to_string(),
            user: "viewer".to_string(),
            password: String::new(),
            database: "app".to_string(),
        };

        let config = form.into_config();
        assert_eq!(config.host, "db.internal");
        assert_eq!(config.port, 3307);
    }
}
