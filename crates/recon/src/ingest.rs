use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::config::ColumnNames;
use crate::dedup::{dedup_menus, dedup_stores, StoreDedupStats};
use crate::error::ReconError;
use crate::model::{
    MenuRecord, MenuTable, RawTable, SkipReason, SkippedFile, SourceFile, StoreRecord, StoreTable,
};

#[derive(Debug, Clone)]
pub struct StoreIngest {
    pub table: StoreTable,
    pub accepted: Vec<String>,
    pub skipped: Vec<SkippedFile>,
    pub dedup: StoreDedupStats,
}

#[derive(Debug, Clone)]
pub struct MenuIngest {
    pub table: MenuTable,
    pub accepted: Vec<String>,
    pub skipped: Vec<SkippedFile>,
    pub duplicates_removed: usize,
}

/// Validate, concatenate (in slice order) and dedup cafe store files.
///
/// Files that failed to read, are empty, or lack a required column are
/// skipped. Zero accepted files is fatal.
pub fn merge_stores(files: &[SourceFile], columns: &ColumnNames) -> Result<StoreIngest, ReconError> {
    let required = columns.store_columns();
    let mut accepted = Vec::new();
    let mut skipped = Vec::new();
    let mut table = StoreTable::default();

    for file in files {
        let raw = match check_file(file, &required) {
            Ok(raw) => raw,
            Err(skip) => {
                warn!(file = %skip.file, reason = %skip.reason, "skipped store file: {}", skip.detail);
                skipped.push(skip);
                continue;
            }
        };

        let idx = |name: &str| raw.column_index(name).unwrap_or_default();
        let [id_i, name_i, hours_i, phone_i, addr_i] = required.map(idx);

        let extras: Vec<(usize, &String)> = raw
            .headers
            .iter()
            .enumerate()
            .filter(|(_, h)| !required.contains(&h.as_str()))
            .collect();
        for h in &raw.headers {
            if !table.columns.contains(h) {
                table.columns.push(h.clone());
            }
        }

        for row in &raw.rows {
            let extra: HashMap<String, String> =
                extras.iter().map(|(i, h)| ((*h).clone(), row[*i].clone())).collect();
            table.records.push(StoreRecord {
                store_id: row[id_i].clone(),
                name: row[name_i].clone(),
                hours: row[hours_i].clone(),
                phone: row[phone_i].clone(),
                address: row[addr_i].clone(),
                extra,
            });
        }
        debug!(file = %file.name, rows = raw.rows.len(), "accepted store file");
        accepted.push(file.name.clone());
    }

    if accepted.is_empty() {
        return Err(ReconError::NoValidStoreFiles { scanned: files.len() });
    }

    let dedup = dedup_stores(&mut table.records);
    info!(
        files = accepted.len(),
        stores = table.len(),
        dropped_by_contact = dedup.by_contact,
        dropped_by_store_id = dedup.by_store_id,
        "merged cafe stores"
    );

    Ok(StoreIngest { table, accepted, skipped, dedup })
}

/// Validate, concatenate (in slice order) and dedup cafe menu files.
///
/// Never fails: with no usable file the result is an empty table.
/// Columns other than the three required ones are dropped.
pub fn merge_menus(files: &[SourceFile], columns: &ColumnNames) -> MenuIngest {
    let required = columns.menu_columns();
    let mut accepted = Vec::new();
    let mut skipped = Vec::new();
    let mut table = MenuTable::default();

    for file in files {
        let raw = match check_file(file, &required) {
            Ok(raw) => raw,
            Err(skip) => {
                warn!(file = %skip.file, reason = %skip.reason, "skipped menu file: {}", skip.detail);
                skipped.push(skip);
                continue;
            }
        };

        let idx = |name: &str| raw.column_index(name).unwrap_or_default();
        let [id_i, item_i, price_i] = required.map(idx);

        table.records.extend(raw.rows.iter().map(|row| MenuRecord {
            store_id: row[id_i].clone(),
            item_name: row[item_i].clone(),
            price: row[price_i].clone(),
        }));
        debug!(file = %file.name, rows = raw.rows.len(), "accepted menu file");
        accepted.push(file.name.clone());
    }

    if accepted.is_empty() {
        info!("no menu data; menus_cafe will be empty");
    }

    let duplicates_removed = dedup_menus(&mut table.records);
    info!(
        files = accepted.len(),
        menus = table.len(),
        dropped = duplicates_removed,
        "merged cafe menus"
    );

    MenuIngest { table, accepted, skipped, duplicates_removed }
}

fn check_file<'a>(file: &'a SourceFile, required: &[&str]) -> Result<&'a RawTable, SkippedFile> {
    let skip = |reason, detail: String| SkippedFile {
        file: file.name.clone(),
        reason,
        detail,
    };

    let raw = match &file.table {
        Ok(raw) => raw,
        Err(msg) => return Err(skip(SkipReason::Unreadable, msg.clone())),
    };

    if raw.headers.is_empty() || raw.rows.is_empty() {
        return Err(skip(SkipReason::Empty, "no data rows".into()));
    }

    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|c| raw.column_index(c).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(skip(
            SkipReason::MissingColumns,
            format!(
                "missing [{}], present [{}]",
                missing.join(", "),
                raw.headers.join(", ")
            ),
        ));
    }

    Ok(raw)
}
