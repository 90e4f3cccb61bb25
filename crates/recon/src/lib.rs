//! `cafesplit-recon` — Cafe store/menu merge and food/cafe reconciliation engine.
//!
//! Pure engine crate: receives parsed tables, returns merged and partitioned
//! results. No filesystem or database dependencies.

pub mod config;
pub mod dedup;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod ingest;
pub mod load;
pub mod model;

pub use config::{ColumnNames, SplitConfig};
pub use engine::split;
pub use error::ReconError;
pub use model::{
    MenuRecord, MenuTable, SourceFile, SplitInput, SplitOutput, StoreRecord, StoreTable, Table,
    Value,
};
