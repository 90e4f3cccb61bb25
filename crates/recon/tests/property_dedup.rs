// Property-based tests for cafe merge and food/cafe split.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use std::collections::HashSet;

use proptest::prelude::*;
use cafesplit_recon::config::ColumnNames;
use cafesplit_recon::ingest::{merge_menus, merge_stores};
use cafesplit_recon::model::{MenuTable, RawTable, SourceFile, SplitInput, StoreTable, Table, Value};
use cafesplit_recon::split;

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

// Small alphabets so duplicates are common
fn store_row() -> impl Strategy<Value = Vec<String>> {
    (0..6u8, 0..3u8, 0..2u8, 0..2u8).prop_map(|(id, name, phone, addr)| {
        vec![
            id.to_string(),
            format!("카페{name}"),
            "09-18".to_string(),
            format!("02-{phone}"),
            format!("서울 {addr}"),
        ]
    })
}

fn store_files() -> impl Strategy<Value = Vec<Vec<Vec<String>>>> {
    prop::collection::vec(prop::collection::vec(store_row(), 1..6), 1..4)
}

fn menu_rows() -> impl Strategy<Value = Vec<Vec<String>>> {
    prop::collection::vec(
        (0..3u8, 0..3u8, 0..2u8).prop_map(|(id, item, price)| {
            vec![id.to_string(), format!("메뉴{item}"), format!("{}", 4000 + price as u32 * 500)]
        }),
        0..12,
    )
}

fn as_files(prefix: &str, headers: &[&str], files: Vec<Vec<Vec<String>>>) -> Vec<SourceFile> {
    files
        .into_iter()
        .enumerate()
        .map(|(i, rows)| SourceFile {
            name: format!("{prefix}_{i:02}.csv"),
            table: Ok(RawTable {
                headers: headers.iter().map(|h| h.to_string()).collect(),
                rows,
            }),
        })
        .collect()
}

const STORE_HEADERS: [&str; 5] = ["store_id", "가게명", "영업시간", "전화번호", "주소"];
const MENU_HEADERS: [&str; 3] = ["store_id", "메뉴명", "가격"];

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn merged_stores_unique_by_contact_and_id(files in store_files()) {
        let all_rows: Vec<Vec<String>> = files.iter().flatten().cloned().collect();
        let merged = merge_stores(&as_files("stores_cafe", &STORE_HEADERS, files), &ColumnNames::default()).unwrap();
        let records = &merged.table.records;

        let triples: HashSet<_> = records.iter().map(|r| (&r.name, &r.phone, &r.address)).collect();
        prop_assert_eq!(triples.len(), records.len());
        let ids: HashSet<_> = records.iter().map(|r| &r.store_id).collect();
        prop_assert_eq!(ids.len(), records.len());

        // Every survivor is the first input row carrying its triple
        for r in records {
            let first = all_rows
                .iter()
                .find(|row| row[1] == r.name && row[3] == r.phone && row[4] == r.address)
                .unwrap();
            prop_assert_eq!(&first[0], &r.store_id);
        }

        prop_assert_eq!(
            merged.dedup.by_contact + merged.dedup.by_store_id + records.len(),
            all_rows.len()
        );
    }

    #[test]
    fn merged_menus_are_first_seen_distinct_tuples(a in menu_rows(), b in menu_rows()) {
        let mut expected: Vec<Vec<String>> = Vec::new();
        for row in a.iter().chain(b.iter()) {
            if !expected.contains(row) {
                expected.push(row.clone());
            }
        }
        let files: Vec<Vec<Vec<String>>> = vec![a, b].into_iter().filter(|f| !f.is_empty()).collect();

        let merged = merge_menus(&as_files("menus_cafe", &MENU_HEADERS, files), &ColumnNames::default());
        let got: Vec<Vec<String>> = merged
            .table
            .records
            .iter()
            .map(|r| vec![r.store_id.clone(), r.item_name.clone(), r.price.clone()])
            .collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn excluded_ids_are_exactly_name_matches(
        cafe in prop::collection::vec(0..5u8, 1..5),
        combined in prop::collection::vec((0..20i64, 0..8u8), 0..15),
    ) {
        let cafe_names: HashSet<String> = cafe.iter().map(|n| format!("가게{n}")).collect();
        let cafe_stores = StoreTable {
            records: cafe
                .iter()
                .enumerate()
                .map(|(i, n)| cafesplit_recon::StoreRecord {
                    store_id: format!("c{i}"),
                    name: format!("가게{n}"),
                    hours: String::new(),
                    phone: String::new(),
                    address: String::new(),
                    extra: Default::default(),
                })
                .collect(),
            columns: Vec::new(),
        };

        let mut stores = Table::new(vec!["store_id".into(), "가게명".into()]);
        let mut menus = Table::new(vec!["store_id".into()]);
        for (id, n) in &combined {
            stores.rows.push(vec![Value::Integer(*id), Value::Text(format!("가게{n}"))]);
            menus.rows.push(vec![Value::Integer(*id)]);
        }

        let out = split(
            SplitInput {
                cafe_stores,
                cafe_menus: MenuTable::default(),
                combined_stores: stores,
                combined_menus: menus,
            },
            &ColumnNames::default(),
        )
        .unwrap();

        let matched: HashSet<String> = combined
            .iter()
            .filter(|(_, n)| cafe_names.contains(&format!("가게{n}")))
            .map(|(id, _)| id.to_string())
            .collect();
        let excluded: HashSet<String> = out.excluded_store_ids.iter().cloned().collect();
        prop_assert_eq!(&excluded, &matched);

        for row in out.stores_food.rows.iter().chain(out.menus_food.rows.iter()) {
            prop_assert!(!matched.contains(&row[0].to_string()));
        }
        let kept = combined.iter().filter(|(id, _)| !matched.contains(&id.to_string())).count();
        prop_assert_eq!(out.stores_food.len(), kept);
        prop_assert_eq!(out.menus_food.len(), kept);
    }
}
