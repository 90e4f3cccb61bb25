use std::collections::{HashMap, HashSet};

use tracing::{info, warn};

use crate::config::ColumnNames;
use crate::error::ReconError;
use crate::model::{
    NameCollision, SplitInput, SplitOutput, StoreTable, Table, Value, SOURCE_MENUS, SOURCE_STORES,
};

/// Partition the combined tables into food and cafe.
///
/// A combined store is cafe when its name equals the name of any merged cafe
/// store. Names are the only criterion: two unrelated stores sharing a name
/// are both excluded (reported in `name_collisions`). Stores and menus are
/// filtered independently by their own `store_id` column, so `menus_food`
/// may reference stores absent from `stores_food` (counted in
/// `orphan_menu_rows`). The cafe tables pass through unchanged.
pub fn split(input: SplitInput, columns: &ColumnNames) -> Result<SplitOutput, ReconError> {
    let SplitInput {
        cafe_stores,
        cafe_menus,
        combined_stores,
        combined_menus,
    } = input;

    let id_col = combined_stores.require_column(SOURCE_STORES, &columns.store_id)?;
    let name_col = combined_stores.require_column(SOURCE_STORES, &columns.name)?;
    let menu_id_col = combined_menus.require_column(SOURCE_MENUS, &columns.store_id)?;

    let names = cafe_names(&cafe_stores);
    let excluded_store_ids = matching_store_ids(&combined_stores, id_col, name_col, &names);
    let excluded: HashSet<&str> = excluded_store_ids.iter().map(String::as_str).collect();

    let stores_food = exclude_store_ids(&combined_stores, id_col, &excluded);
    let menus_food = exclude_store_ids(&combined_menus, menu_id_col, &excluded);

    let name_collisions = find_name_collisions(&combined_stores, &cafe_stores, columns, &excluded);
    for c in &name_collisions {
        warn!(
            store_id = %c.store_id,
            name = %c.name,
            "excluded by name only; phone/address match no cafe record"
        );
    }

    let orphan_menu_rows = count_orphan_menus(&stores_food, id_col, &menus_food, menu_id_col);
    if orphan_menu_rows > 0 {
        warn!(rows = orphan_menu_rows, "menus_food rows reference stores not in stores_food");
    }

    info!(
        combined_stores = combined_stores.len(),
        combined_menus = combined_menus.len(),
        excluded_stores = excluded_store_ids.len(),
        stores_food = stores_food.len(),
        menus_food = menus_food.len(),
        "split combined tables"
    );

    Ok(SplitOutput {
        stores_food,
        menus_food,
        stores_cafe: cafe_stores,
        menus_cafe: cafe_menus,
        excluded_store_ids,
        name_collisions,
        orphan_menu_rows,
    })
}

/// Distinct non-empty store names in the merged cafe table.
pub fn cafe_names(stores: &StoreTable) -> HashSet<&str> {
    stores
        .records
        .iter()
        .map(|r| r.name.as_str())
        .filter(|n| !n.is_empty())
        .collect()
}

/// store_ids (canonical text, first-seen order, distinct) of rows whose name
/// is in `names`. Rows with a NULL store_id or name never match.
pub fn matching_store_ids(
    stores: &Table,
    id_col: usize,
    name_col: usize,
    names: &HashSet<&str>,
) -> Vec<String> {
    let mut seen = HashSet::new();
    stores
        .rows
        .iter()
        .filter(|row| match row[name_col].key() {
            Some(name) => names.contains(name.as_str()),
            None => false,
        })
        .filter_map(|row| row[id_col].key())
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

/// Copy of `table` without rows whose `id_col` is in `excluded`.
pub fn exclude_store_ids(table: &Table, id_col: usize, excluded: &HashSet<&str>) -> Table {
    table.filter_rows(|row| match row[id_col].key() {
        Some(id) => !excluded.contains(id.as_str()),
        None => true,
    })
}

fn find_name_collisions(
    combined: &Table,
    cafe: &StoreTable,
    columns: &ColumnNames,
    excluded: &HashSet<&str>,
) -> Vec<NameCollision> {
    let (Some(id_col), Some(name_col), Some(phone_col), Some(addr_col)) = (
        combined.column_index(&columns.store_id),
        combined.column_index(&columns.name),
        combined.column_index(&columns.phone),
        combined.column_index(&columns.address),
    ) else {
        return Vec::new();
    };

    let mut contacts: HashMap<&str, Vec<(&str, &str)>> = HashMap::new();
    for r in &cafe.records {
        contacts
            .entry(r.name.as_str())
            .or_default()
            .push((r.phone.as_str(), r.address.as_str()));
    }

    let text = |v: &Value| v.key().unwrap_or_default();
    let mut collisions = Vec::new();
    for row in &combined.rows {
        let Some(id) = row[id_col].key() else { continue };
        if !excluded.contains(id.as_str()) {
            continue;
        }
        let name = text(&row[name_col]);
        let phone = text(&row[phone_col]);
        let address = text(&row[addr_col]);
        let same_place = contacts
            .get(name.as_str())
            .is_some_and(|list| list.iter().any(|(p, a)| *p == phone && *a == address));
        if !same_place {
            collisions.push(NameCollision { store_id: id, name });
        }
    }
    collisions
}

fn count_orphan_menus(stores: &Table, id_col: usize, menus: &Table, menu_id_col: usize) -> usize {
    let ids: HashSet<String> = stores.rows.iter().filter_map(|r| r[id_col].key()).collect();
    menus
        .rows
        .iter()
        .filter(|r| match r[menu_id_col].key() {
            Some(id) => !ids.contains(&id),
            None => true,
        })
        .count()
}
