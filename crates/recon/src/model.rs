use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::config::ColumnNames;
use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Table names
// ---------------------------------------------------------------------------

/// Combined (food + cafe) tables read from the source database.
pub const SOURCE_STORES: &str = "stores";
pub const SOURCE_MENUS: &str = "menus";

/// Tables written to the output database.
pub const STORES_FOOD: &str = "stores_food";
pub const MENUS_FOOD: &str = "menus_food";
pub const STORES_CAFE: &str = "stores_cafe";
pub const MENUS_CAFE: &str = "menus_cafe";

// ---------------------------------------------------------------------------
// Cells + untyped tables
// ---------------------------------------------------------------------------

/// A dynamically typed cell, mirroring SQLite storage classes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    /// Infer a storage class from raw CSV text.
    ///
    /// Empty → NULL. A value becomes INTEGER or REAL only when that number
    /// prints back as exactly the same text; everything else stays text.
    /// Leading zeros, a leading `+`, integers beyond i64 and reals such as
    /// `4500.0` or `1e3` therefore keep their spelling.
    pub fn infer(raw: &str) -> Self {
        if raw.is_empty() {
            return Self::Null;
        }
        if !looks_numeric(raw) {
            return Self::Text(raw.to_string());
        }
        if let Ok(n) = raw.parse::<i64>() {
            if n.to_string() == raw {
                return Self::Integer(n);
            }
            return Self::Text(raw.to_string());
        }
        if raw.contains(['.', 'e', 'E']) {
            if let Ok(x) = raw.parse::<f64>() {
                if x.is_finite() && x.to_string() == raw {
                    return Self::Real(x);
                }
            }
        }
        Self::Text(raw.to_string())
    }

    /// Canonical text used for identity comparisons. NULL has no key.
    pub fn key(&self) -> Option<String> {
        match self {
            Self::Null => None,
            other => Some(other.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

fn looks_numeric(raw: &str) -> bool {
    raw.bytes().any(|b| b.is_ascii_digit())
        && raw
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'-' | b'+' | b'.' | b'e' | b'E'))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Real(x) => write!(f, "{x}"),
            Self::Text(s) => write!(f, "{s}"),
            Self::Blob(bytes) => write!(f, "{}", String::from_utf8_lossy(bytes)),
        }
    }
}

/// A relational table with an open column set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns, rows: Vec::new() }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Like `column_index`, but a missing column is an error naming `table`.
    pub fn require_column(&self, table: &str, name: &str) -> Result<usize, ReconError> {
        self.column_index(name).ok_or_else(|| ReconError::MissingColumn {
            table: table.into(),
            column: name.into(),
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Copy of this table keeping only rows for which `keep` returns true.
    pub fn filter_rows(&self, mut keep: impl FnMut(&[Value]) -> bool) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: self.rows.iter().filter(|r| keep(r)).cloned().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Input files
// ---------------------------------------------------------------------------

/// Header + rows of a delimited file, all fields as raw text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// One discovered input file. `table` is `Err` when reading or parsing failed.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub table: Result<RawTable, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Unreadable,
    Empty,
    MissingColumns,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreadable => write!(f, "unreadable"),
            Self::Empty => write!(f, "empty"),
            Self::MissingColumns => write!(f, "missing_columns"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedFile {
    pub file: String,
    pub reason: SkipReason,
    pub detail: String,
}

// ---------------------------------------------------------------------------
// Typed cafe records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct StoreRecord {
    pub store_id: String,
    pub name: String,
    pub hours: String,
    pub phone: String,
    pub address: String,
    /// Non-required columns carried through from the source file.
    pub extra: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MenuRecord {
    pub store_id: String,
    pub item_name: String,
    pub price: String,
}

/// Merged cafe stores. `columns` is the union of headers across accepted
/// files, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreTable {
    pub records: Vec<StoreRecord>,
    pub columns: Vec<String>,
}

impl StoreTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Header in first-seen order. Required columns absent from `columns`
    /// (tables built in code) come first.
    pub fn header(&self, columns: &ColumnNames) -> Vec<String> {
        let mut header: Vec<String> = columns
            .store_columns()
            .iter()
            .filter(|c| !self.columns.iter().any(|h| h == *c))
            .map(|c| c.to_string())
            .collect();
        header.extend(self.columns.iter().cloned());
        header
    }

    pub fn to_table(&self, columns: &ColumnNames) -> Table {
        let header = self.header(columns);
        let rows = self
            .records
            .iter()
            .map(|r| {
                header
                    .iter()
                    .map(|c| r.field(columns, c).map(Value::infer).unwrap_or(Value::Null))
                    .collect()
            })
            .collect();
        Table { columns: header, rows }
    }
}

impl StoreRecord {
    /// Raw text of column `name`, typed field or extra.
    pub fn field(&self, columns: &ColumnNames, name: &str) -> Option<&str> {
        let [id, store_name, hours, phone, address] = columns.store_columns();
        match name {
            n if n == id => Some(self.store_id.as_str()),
            n if n == store_name => Some(self.name.as_str()),
            n if n == hours => Some(self.hours.as_str()),
            n if n == phone => Some(self.phone.as_str()),
            n if n == address => Some(self.address.as_str()),
            n => self.extra.get(n).map(String::as_str),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MenuTable {
    pub records: Vec<MenuRecord>,
}

impl MenuTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Always exactly three columns, even with no records.
    pub fn to_table(&self, columns: &ColumnNames) -> Table {
        let mut table = Table::new(vec![
            columns.store_id.clone(),
            columns.item_name.clone(),
            columns.price.clone(),
        ]);
        for r in &self.records {
            table.rows.push(vec![
                Value::infer(&r.store_id),
                Value::infer(&r.item_name),
                Value::infer(&r.price),
            ]);
        }
        table
    }
}

// ---------------------------------------------------------------------------
// Split
// ---------------------------------------------------------------------------

pub struct SplitInput {
    pub cafe_stores: StoreTable,
    pub cafe_menus: MenuTable,
    pub combined_stores: Table,
    pub combined_menus: Table,
}

/// A combined-database store excluded by name whose phone/address match no
/// cafe record of that name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameCollision {
    pub store_id: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct SplitOutput {
    pub stores_food: Table,
    pub menus_food: Table,
    pub stores_cafe: StoreTable,
    pub menus_cafe: MenuTable,
    pub excluded_store_ids: Vec<String>,
    pub name_collisions: Vec<NameCollision>,
    /// `menus_food` rows whose store_id is absent from `stores_food`.
    pub orphan_menu_rows: usize,
}

impl SplitOutput {
    /// The four output tables, in write order.
    pub fn tables(&self, columns: &ColumnNames) -> Vec<(&'static str, Table)> {
        vec![
            (STORES_FOOD, self.stores_food.clone()),
            (MENUS_FOOD, self.menus_food.clone()),
            (STORES_CAFE, self.stores_cafe.to_table(columns)),
            (MENUS_CAFE, self.menus_cafe.to_table(columns)),
        ]
    }
}
