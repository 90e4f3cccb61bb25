use std::collections::HashSet;
use std::hash::Hash;

use crate::model::{MenuRecord, StoreRecord};

/// Keep the first record for each key, preserving order. Returns the number
/// of records dropped.
pub fn dedup_by_key<T, K, F>(records: &mut Vec<T>, mut key: F) -> usize
where
    K: Hash + Eq,
    F: FnMut(&T) -> K,
{
    let before = records.len();
    let mut seen: HashSet<K> = HashSet::with_capacity(before);
    records.retain(|r| seen.insert(key(r)));
    before - records.len()
}

/// Records removed by each store dedup pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreDedupStats {
    pub by_contact: usize,
    pub by_store_id: usize,
}

/// Two passes, in order: (name, phone, address), then store_id.
pub fn dedup_stores(records: &mut Vec<StoreRecord>) -> StoreDedupStats {
    let by_contact = dedup_by_key(records, |r| {
        (r.name.clone(), r.phone.clone(), r.address.clone())
    });
    let by_store_id = dedup_by_key(records, |r| r.store_id.clone());
    StoreDedupStats { by_contact, by_store_id }
}

/// Single pass over the full (store_id, item_name, price) tuple.
pub fn dedup_menus(records: &mut Vec<MenuRecord>) -> usize {
    dedup_by_key(records, |r| r.clone())
}
