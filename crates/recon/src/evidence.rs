use serde::Serialize;

use crate::ingest::{MenuIngest, StoreIngest};
use crate::model::{NameCollision, SkippedFile, SplitOutput};

#[derive(Debug, Clone, Serialize)]
pub struct SplitMeta {
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileSummary {
    pub accepted: Vec<String>,
    pub skipped: Vec<SkippedFile>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CafeSummary {
    pub stores: usize,
    pub menus: usize,
    pub stores_dropped_by_contact: usize,
    pub stores_dropped_by_store_id: usize,
    pub menus_dropped: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FoodSummary {
    pub combined_stores: usize,
    pub combined_menus: usize,
    pub excluded_store_ids: usize,
    pub stores: usize,
    pub menus: usize,
    pub orphan_menu_rows: usize,
    pub name_collisions: Vec<NameCollision>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SplitSummary {
    pub meta: SplitMeta,
    pub store_files: FileSummary,
    pub menu_files: FileSummary,
    pub cafe: CafeSummary,
    pub food: FoodSummary,
}

/// Collect run statistics from the ingest reports and the split result.
/// `combined_stores` / `combined_menus` are the source row counts.
pub fn compute_summary(
    stores: &StoreIngest,
    menus: &MenuIngest,
    output: &SplitOutput,
    combined_stores: usize,
    combined_menus: usize,
) -> SplitSummary {
    SplitSummary {
        meta: SplitMeta {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        store_files: FileSummary {
            accepted: stores.accepted.clone(),
            skipped: stores.skipped.clone(),
        },
        menu_files: FileSummary {
            accepted: menus.accepted.clone(),
            skipped: menus.skipped.clone(),
        },
        cafe: CafeSummary {
            stores: output.stores_cafe.len(),
            menus: output.menus_cafe.len(),
            stores_dropped_by_contact: stores.dedup.by_contact,
            stores_dropped_by_store_id: stores.dedup.by_store_id,
            menus_dropped: menus.duplicates_removed,
        },
        food: FoodSummary {
            combined_stores,
            combined_menus,
            excluded_store_ids: output.excluded_store_ids.len(),
            stores: output.stores_food.len(),
            menus: output.menus_food.len(),
            orphan_menu_rows: output.orphan_menu_rows,
            name_collisions: output.name_collisions.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColumnNames;
    use crate::ingest::{merge_menus, merge_stores};
    use crate::load::parse_csv;
    use crate::model::{SourceFile, SplitInput, Table, Value};

    fn file(name: &str, csv: &str) -> SourceFile {
        SourceFile {
            name: name.into(),
            table: parse_csv(name, csv, b',').map_err(|e| e.to_string()),
        }
    }

    #[test]
    fn summary_counts() {
        let columns = ColumnNames::default();
        let stores = merge_stores(
            &[
                file(
                    "stores_cafe_1.csv",
                    "store_id,가게명,영업시간,전화번호,주소\n1,카페 A,9-18,010,서울\n2,카페 A,9-18,010,서울\n",
                ),
                file("stores_cafe_2.csv", "store_id\n"),
            ],
            &columns,
        )
        .unwrap();
        let menus = merge_menus(&[], &columns);

        let mut combined = Table::new(vec!["store_id".into(), "가게명".into()]);
        combined.rows.push(vec![Value::Integer(10), Value::Text("카페 A".into())]);
        combined.rows.push(vec![Value::Integer(11), Value::Text("한식당".into())]);
        let combined_menus = Table::new(vec!["store_id".into()]);

        let output = crate::engine::split(
            SplitInput {
                cafe_stores: stores.table.clone(),
                cafe_menus: menus.table.clone(),
                combined_stores: combined,
                combined_menus,
            },
            &columns,
        )
        .unwrap();

        let summary = compute_summary(&stores, &menus, &output, 2, 0);
        assert_eq!(summary.store_files.accepted, vec!["stores_cafe_1.csv"]);
        assert_eq!(summary.store_files.skipped.len(), 1);
        assert_eq!(summary.cafe.stores, 1);
        assert_eq!(summary.cafe.stores_dropped_by_contact, 1);
        assert_eq!(summary.cafe.menus, 0);
        assert_eq!(summary.food.excluded_store_ids, 1);
        assert_eq!(summary.food.stores, 1);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["store_files"]["skipped"][0]["reason"], "empty");
        assert_eq!(json["food"]["combined_stores"], 2);
    }
}
