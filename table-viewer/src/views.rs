//! HTML rendering for the single-page viewer UI
//!
//! Uses an embedded template with string interpolation rather than an
//! external template engine; every user-derived value is escaped before it
//! reaches the page.

use serde_json::Value;

use crate::schema::ColumnInfo;

/// Everything the index page can show: alerts, the table list, and the
/// currently selected table's columns and rows.
#[derive(Debug, Default)]
pub struct PageContext {
    pub error: Option<String>,
    pub success: Option<String>,
    pub tables: Option<Vec<String>>,
    pub selected_table: Option<String>,
    pub data: Option<TableData>,
}

/// Columns and rows of the table being viewed
#[derive(Debug)]
pub struct TableData {
    pub columns: Vec<ColumnInfo>,
    pub rows: Vec<Value>,
}

impl PageContext {
    /// Empty state: no alerts, no tables, no data
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn with_success(message: impl Into<String>) -> Self {
        Self {
            success: Some(message.into()),
            ..Self::default()
        }
    }
}

/// Render the full index page for the given context
pub fn render_index(context: &PageContext) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>MySQL Table Viewer</title>
    <style>
        body {{ font-family: Arial, sans-serif; max-width: 1200px; margin: 0 auto; padding: 20px; background-color: #f5f5f5; }}
        .container {{ background: white; padding: 30px; border-radius: 8px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); margin-bottom: 20px; }}
        h1 {{ color: #333; text-align: center; margin-bottom: 30px; }}
        h2 {{ color: #555; border-bottom: 2px solid #007bff; padding-bottom: 10px; }}
        .form-group {{ margin-bottom: 15px; }}
        label {{ display: block; margin-bottom: 5px; font-weight: bold; color: #555; }}
        input, select, button, textarea {{ width: 100%; padding: 10px; border: 1px solid #ddd; border-radius: 4px; font-size: 14px; box-sizing: border-box; }}
        button {{ background-color: #007bff; color: white; border: none; cursor: pointer; font-weight: bold; margin-top: 10px; }}
        button:hover {{ background-color: #0056b3; }}
        .btn-secondary {{ background-color: #6c757d; }}
        .alert {{ padding: 15px; margin-bottom: 20px; border-radius: 4px; }}
        .alert-error {{ background-color: #f8d7da; color: #721c24; border: 1px solid #f5c6cb; }}
        .alert-success {{ background-color: #d4edda; color: #155724; border: 1px solid #c3e6cb; }}
        table {{ width: 100%; border-collapse: collapse; margin-top: 20px; }}
        th, td {{ padding: 12px; text-align: left; border-bottom: 1px solid #ddd; }}
        th {{ background-color: #f8f9fa; font-weight: bold; color: #555; }}
        tr:hover {{ background-color: #f5f5f5; }}
        .table-container {{ overflow-x: auto; margin-top: 20px; }}
        .form-row {{ display: flex; gap: 15px; }}
        .form-row .form-group {{ flex: 1; }}
        .export-buttons {{ display: flex; gap: 10px; margin-top: 15px; }}
        .export-buttons a {{ flex: 1; padding: 8px 12px; background-color: #28a745; color: white; text-decoration: none; border-radius: 4px; text-align: center; font-weight: bold; }}
        .custom-query textarea {{ min-height: 100px; resize: vertical; font-family: 'Courier New', monospace; }}
        .form-inline {{ display: flex; gap: 10px; align-items: flex-end; }}
        .form-inline .form-group {{ flex: 1; }}
    </style>
</head>
<body>
    <h1>MySQL Table Viewer</h1>
{connection_form}
{alerts}
{table_select}
{data_section}
{custom_query}
{export_script}
</body>
</html>
"#,
        connection_form = connection_form_section(context),
        alerts = alerts_section(context),
        table_select = table_select_section(context),
        data_section = data_section(context),
        custom_query = custom_query_section(context),
        export_script = export_script(),
    )
}

fn connection_form_section(context: &PageContext) -> String {
    let disconnect = if context.tables.is_some() {
        r#"        <form action="/database/disconnect" method="POST">
            <button type="submit" class="btn-secondary">Disconnect</button>
        </form>
"#
    } else {
        ""
    };

    format!(
        r#"    <div class="container">
        <h2>Database Connection</h2>
        <form action="/database/connect" method="POST">
            <div class="form-row">
                <div class="form-group">
                    <label for="host">Host:</label>
                    <input type="text" id="host" name="host" value="localhost" required>
                </div>
                <div class="form-group">
                    <label for="port">Port:</label>
                    <input type="number" id="port" name="port" value="3306" required>
                </div>
            </div>
            <div class="form-row">
                <div class="form-group">
                    <label for="user">Username:</label>
                    <input type="text" id="user" name="user" required>
                </div>
                <div class="form-group">
                    <label for="password">Password:</label>
                    <input type="password" id="password" name="password">
                </div>
            </div>
            <div class="form-group">
                <label for="database">Database Name:</label>
                <input type="text" id="database" name="database" required>
            </div>
            <button type="submit">Connect to Database</button>
        </form>
{disconnect}    </div>
"#
    )
}

fn alerts_section(context: &PageContext) -> String {
    let mut html = String::new();
    if let Some(error) = &context.error {
        html.push_str(&format!(
            "    <div class=\"alert alert-error\">{}</div>\n",
            html_escape(error)
        ));
    }
    if let Some(success) = &context.success {
        html.push_str(&format!(
            "    <div class=\"alert alert-success\">{}</div>\n",
            html_escape(success)
        ));
    }
    html
}

fn table_select_section(context: &PageContext) -> String {
    let Some(tables) = &context.tables else {
        return String::new();
    };
    if tables.is_empty() {
        return String::new();
    }

    let options: String = tables
        .iter()
        .map(|table| {
            let selected = if context.selected_table.as_deref() == Some(table.as_str()) {
                " selected"
            } else {
                ""
            };
            format!(
                "                    <option value=\"{name}\"{selected}>{name}</option>\n",
                name = html_escape(table),
            )
        })
        .collect();

    format!(
        r#"    <div class="container">
        <h2>Select Table to View</h2>
        <form action="/database/view-table" method="POST">
            <div class="form-group">
                <label for="tableName">Available Tables:</label>
                <select id="tableName" name="tableName" required>
                    <option value="">Select a table...</option>
{options}                </select>
            </div>
            <button type="submit">View Table Data</button>
        </form>
    </div>
"#
    )
}

fn data_section(context: &PageContext) -> String {
    let (Some(data), Some(table)) = (&context.data, &context.selected_table) else {
        return String::new();
    };

    let table_name = html_escape(table);
    let export_links = format!(
        r#"        <div class="export-buttons">
            <a href="/database/export/csv/{table_name}" target="_blank">Export as CSV</a>
            <a href="/database/export/json/{table_name}" target="_blank">Export as JSON</a>
            <a href="/database/export/excel/{table_name}" target="_blank">Export as Excel</a>
        </div>
"#
    );

    let body = if data.rows.is_empty() {
        "        <p>No data found in this table.</p>\n".to_string()
    } else {
        let header_cells: String = data
            .columns
            .iter()
            .map(|column| format!("<th>{}</th>", html_escape(&column.field)))
            .collect();

        let body_rows: String = data
            .rows
            .iter()
            .map(|row| {
                let cells: String = data
                    .columns
                    .iter()
                    .map(|column| format!("<td>{}</td>", html_escape(&cell_text(row, &column.field))))
                    .collect();
                format!("                    <tr>{cells}</tr>\n")
            })
            .collect();

        format!(
            r#"        <div class="table-container">
            <table>
                <thead><tr>{header_cells}</tr></thead>
                <tbody>
{body_rows}                </tbody>
            </table>
        </div>
"#
        )
    };

    format!(
        r#"    <div class="container">
        <h2>Table: {table_name}</h2>
        <p><strong>Total Records:</strong> {count}</p>
{export_links}{body}    </div>
"#,
        count = data.rows.len(),
    )
}

fn custom_query_section(context: &PageContext) -> String {
    if context.tables.as_ref().map_or(true, |tables| tables.is_empty()) {
        return String::new();
    }

    r#"    <div class="container custom-query">
        <h2>Custom Query Export</h2>
        <p>Write a custom SQL query to export specific data:</p>
        <form id="customQueryForm">
            <div class="form-group">
                <label for="customQuery">SQL Query:</label>
                <textarea id="customQuery" name="query" placeholder="SELECT * FROM your_table WHERE condition..." required></textarea>
            </div>
            <div class="form-inline">
                <div class="form-group">
                    <label for="exportFormat">Export Format:</label>
                    <select id="exportFormat" name="format" required>
                        <option value="csv">CSV</option>
                        <option value="json">JSON</option>
                        <option value="excel">Excel</option>
                    </select>
                </div>
                <div class="form-group">
                    <label for="exportFilename">Filename (optional):</label>
                    <input type="text" id="exportFilename" name="filename" placeholder="my_export">
                </div>
                <button type="submit">Export Query Results</button>
            </div>
        </form>
    </div>
"#
    .to_string()
}

/// Client-side script that posts the custom query and downloads the response
/// as a file, using the server-suggested filename
fn export_script() -> &'static str {
    r#"    <script>
        document.getElementById('customQueryForm')?.addEventListener('submit', async function(e) {
            e.preventDefault();
            const formData = new FormData(this);
            const body = JSON.stringify({
                query: formData.get('query'),
                format: formData.get('format'),
                filename: formData.get('filename')
            });
            try {
                const response = await fetch('/database/export-query', {
                    method: 'POST',
                    headers: { 'Content-Type': 'application/json' },
                    body
                });
                if (response.ok) {
                    const disposition = response.headers.get('Content-Disposition');
                    const match = disposition?.match(/filename="(.+)"/);
                    const downloadName = match ? match[1] : 'export';
                    const blob = await response.blob();
                    const url = window.URL.createObjectURL(blob);
                    const a = document.createElement('a');
                    a.href = url;
                    a.download = downloadName;
                    document.body.appendChild(a);
                    a.click();
                    window.URL.revokeObjectURL(url);
                    document.body.removeChild(a);
                } else {
                    const error = await response.json();
                    alert('Export failed: ' + error.error);
                }
            } catch (error) {
                alert('Export failed: ' + error.message);
            }
        });
    </script>
"#
}

/// Display text for one cell of the data table
fn cell_text(row: &Value, field: &str) -> String {
    match row.get(field) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape("<script>\"a\" & 'b'</script>"),
            "&lt;script&gt;&quot;a&quot; &amp; &#39;b&#39;&lt;/script&gt;"
        );
    }

    #[test]
    fn test_empty_state_renders_connection_form_only() {
        let page = render_index(&PageContext::empty());
        assert!(page.contains("Database Connection"));
        assert!(!page.contains("Select Table to View"));
        assert!(!page.contains("Custom Query Export"));
        assert!(!page.contains("alert-error"));
    }

    #[test]
    fn test_error_message_is_escaped() {
        let page = render_index(&PageContext::with_error("bad <host>"));
        assert!(page.contains("alert-error"));
        assert!(page.contains("bad &lt;host&gt;"));
        assert!(!page.contains("bad <host>"));
    }

    #[test]
    fn test_connected_state_renders_tables_and_query_form() {
        let context = PageContext {
            success: Some("Connected successfully!".to_string()),
            tables: Some(vec!["users".to_string(), "orders".to_string()]),
            ..PageContext::default()
        };
        let page = render_index(&context);
        assert!(page.contains("Connected successfully!"));
        assert!(page.contains("<option value=\"users\">users</option>"));
        assert!(page.contains("Custom Query Export"));
        assert!(page.contains("Disconnect"));
    }

    #[test]
    fn test_data_table_renders_rows_and_export_links() {
        let context = PageContext {
            tables: Some(vec!["users".to_string()]),
            selected_table: Some("users".to_string()),
            data: Some(TableData {
                columns: vec![ColumnInfo {
                    field: "name".to_string(),
                    data_type: "varchar(255)".to_string(),
                    nullable: false,
                    key: String::new(),
                    default_value: None,
                    extra: String::new(),
                }],
                rows: vec![json!({"name": "Ada"}), json!({"name": null})],
            }),
            ..PageContext::default()
        };
        let page = render_index(&context);
        assert!(page.contains("Table: users"));
        assert!(page.contains("<strong>Total Records:</strong> 2"));
        assert!(page.contains("/database/export/csv/users"));
        assert!(page.contains("<td>Ada</td>"));
        assert!(page.contains("<td></td>"));
    }
}
