use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Run settings. Every key is optional; the defaults reproduce the fixed
/// layout of the batch exports (`../data`, `../db/yogiyo.db`).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SplitConfig {
    pub paths: PathConfig,
    pub columns: ColumnNames,
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathConfig {
    /// Directory holding the per-batch CSV exports.
    pub data_dir: String,
    /// File-name glob for cafe store exports, matched inside `data_dir`.
    pub store_pattern: String,
    /// File-name glob for cafe menu exports, matched inside `data_dir`.
    pub menu_pattern: String,
    /// Combined restaurant/cafe database (read only).
    pub source_db: String,
    /// Database receiving the four split tables.
    pub output_db: String,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            data_dir: "../data".into(),
            store_pattern: "stores_cafe*.csv".into(),
            menu_pattern: "menus_cafe_*.csv".into(),
            source_db: "../db/yogiyo.db".into(),
            output_db: "../data/yogiyo_separated.db".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Column mapping
// ---------------------------------------------------------------------------

/// Header names for the typed store/menu fields. `store_id` and `name` are
/// also looked up in the combined database tables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnNames {
    pub store_id: String,
    pub name: String,
    pub hours: String,
    pub phone: String,
    pub address: String,
    pub item_name: String,
    pub price: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            store_id: "store_id".into(),
            name: "가게명".into(),
            hours: "영업시간".into(),
            phone: "전화번호".into(),
            address: "주소".into(),
            item_name: "메뉴명".into(),
            price: "가격".into(),
        }
    }
}

impl ColumnNames {
    pub fn store_columns(&self) -> [&str; 5] {
        [
            self.store_id.as_str(),
            self.name.as_str(),
            self.hours.as_str(),
            self.phone.as_str(),
            self.address.as_str(),
        ]
    }

    pub fn menu_columns(&self) -> [&str; 3] {
        [self.store_id.as_str(), self.item_name.as_str(), self.price.as_str()]
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl SplitConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: SplitConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        let p = &self.paths;
        for (key, value) in [
            ("paths.data_dir", &p.data_dir),
            ("paths.store_pattern", &p.store_pattern),
            ("paths.menu_pattern", &p.menu_pattern),
            ("paths.source_db", &p.source_db),
            ("paths.output_db", &p.output_db),
        ] {
            if value.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!("{key} must not be empty")));
            }
        }

        // Patterns match file names inside data_dir, never paths
        for (key, pattern) in [
            ("paths.store_pattern", &p.store_pattern),
            ("paths.menu_pattern", &p.menu_pattern),
        ] {
            if pattern.contains('/') || pattern.contains('\\') {
                return Err(ReconError::ConfigValidation(format!(
                    "{key} must be a file-name pattern, got '{pattern}'"
                )));
            }
        }

        if p.source_db == p.output_db {
            return Err(ReconError::ConfigValidation(
                "paths.output_db must differ from paths.source_db".into(),
            ));
        }

        let c = &self.columns;
        for (key, value) in [
            ("columns.store_id", &c.store_id),
            ("columns.name", &c.name),
            ("columns.hours", &c.hours),
            ("columns.phone", &c.phone),
            ("columns.address", &c.address),
            ("columns.item_name", &c.item_name),
            ("columns.price", &c.price),
        ] {
            if value.is_empty() {
                return Err(ReconError::ConfigValidation(format!("{key} must not be empty")));
            }
        }

        check_distinct("store", &c.store_columns())?;
        check_distinct("menu", &c.menu_columns())?;

        Ok(())
    }
}

fn check_distinct(kind: &str, names: &[&str]) -> Result<(), ReconError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(*name) {
            return Err(ReconError::ConfigValidation(format!(
                "{kind} column '{name}' is mapped more than once"
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
