// SQLite table load / replace

use std::path::Path;

use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection, OpenFlags};
use tracing::debug;

use cafesplit_recon::model::{Table, Value};

/// Open an existing database read-only. A missing file is an error rather
/// than a fresh empty database.
pub fn open_source(path: &Path) -> Result<Connection, String> {
    Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|e| format!("{}: {e}", path.display()))
}

/// Open (creating if needed) the database receiving the split tables.
/// Tables not written by this run are left alone.
pub fn open_output(path: &Path) -> Result<Connection, String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            return Err(format!("{}: parent directory does not exist", path.display()));
        }
    }
    Connection::open(path).map_err(|e| format!("{}: {e}", path.display()))
}

/// Read every row and column of `name`.
pub fn load_table(conn: &Connection, name: &str) -> Result<Table, String> {
    let mut stmt = conn
        .prepare(&format!("SELECT * FROM {}", quote_ident(name)))
        .map_err(|e| format!("table '{name}': {e}"))?;
    let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
    let width = columns.len();

    let mut table = Table::new(columns);
    let mut rows = stmt.query([]).map_err(|e| format!("table '{name}': {e}"))?;
    while let Some(row) = rows.next().map_err(|e| format!("table '{name}': {e}"))? {
        let mut values = Vec::with_capacity(width);
        for i in 0..width {
            let cell = row.get_ref(i).map_err(|e| format!("table '{name}': {e}"))?;
            values.push(from_sql(cell));
        }
        table.rows.push(values);
    }

    debug!(table = name, rows = table.len(), columns = width, "loaded table");
    Ok(table)
}

/// Drop `name` if present and recreate it holding exactly `table`.
///
/// One transaction per table: a failure leaves earlier tables written.
pub fn replace_table(conn: &mut Connection, name: &str, table: &Table) -> Result<(), String> {
    if table.columns.is_empty() {
        return Err(format!("table '{name}': no columns"));
    }

    let tx = conn.transaction().map_err(|e| format!("table '{name}': {e}"))?;
    let ident = quote_ident(name);

    tx.execute(&format!("DROP TABLE IF EXISTS {ident}"), [])
        .map_err(|e| format!("table '{name}': {e}"))?;

    let defs: Vec<String> = table
        .columns
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{} {}", quote_ident(c), column_type(table, i)))
        .collect();
    tx.execute(&format!("CREATE TABLE {ident} ({})", defs.join(", ")), [])
        .map_err(|e| format!("table '{name}': {e}"))?;

    {
        let placeholders: Vec<String> = (1..=table.columns.len()).map(|i| format!("?{i}")).collect();
        let mut stmt = tx
            .prepare(&format!("INSERT INTO {ident} VALUES ({})", placeholders.join(", ")))
            .map_err(|e| format!("table '{name}': {e}"))?;
        for row in &table.rows {
            stmt.execute(params_from_iter(row.iter().map(to_sql)))
                .map_err(|e| format!("table '{name}': {e}"))?;
        }
    }

    tx.commit().map_err(|e| format!("table '{name}': {e}"))?;
    debug!(table = name, rows = table.len(), "replaced table");
    Ok(())
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Declared type from the column's values: INTEGER if every non-NULL value
/// is an integer, REAL if every one is numeric, BLOB if every one is a blob,
/// otherwise TEXT.
fn column_type(table: &Table, col: usize) -> &'static str {
    let mut integer = true;
    let mut numeric = true;
    let mut blob = true;
    let mut any = false;

    for v in table.rows.iter().map(|r| &r[col]) {
        match v {
            Value::Null => continue,
            Value::Integer(_) => blob = false,
            Value::Real(_) => {
                integer = false;
                blob = false;
            }
            Value::Text(_) => {
                integer = false;
                numeric = false;
                blob = false;
            }
            Value::Blob(_) => {
                integer = false;
                numeric = false;
            }
        }
        any = true;
    }

    match (any, integer, numeric, blob) {
        (false, ..) => "TEXT",
        (true, true, ..) => "INTEGER",
        (true, false, true, _) => "REAL",
        (true, false, false, true) => "BLOB",
        _ => "TEXT",
    }
}

fn from_sql(cell: ValueRef<'_>) -> Value {
    match cell {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(n) => Value::Integer(n),
        ValueRef::Real(x) => Value::Real(x),
        ValueRef::Text(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
    }
}

fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Integer(n) => SqlValue::Integer(*n),
        Value::Real(x) => SqlValue::Real(*x),
        Value::Text(s) => SqlValue::Text(s.clone()),
        Value::Blob(b) => SqlValue::Blob(b.clone()),
    }
}
