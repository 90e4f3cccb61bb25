// run / validate commands

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use cafesplit_io::{csv as csv_io, sqlite};
use cafesplit_recon::evidence::{compute_summary, SplitSummary};
use cafesplit_recon::ingest::{merge_menus, merge_stores};
use cafesplit_recon::model::{SOURCE_MENUS, SOURCE_STORES};
use cafesplit_recon::{split, ReconError, SplitConfig, SplitInput};

use crate::CliError;

pub struct RunArgs {
    pub config: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub source_db: Option<PathBuf>,
    pub output_db: Option<PathBuf>,
    pub json: bool,
}

/// Filesystem locations after applying config file and flag overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ResolvedPaths {
    data_dir: PathBuf,
    source_db: PathBuf,
    output_db: PathBuf,
}

pub fn cmd_run(args: RunArgs) -> Result<(), CliError> {
    let config = load_config(args.config.as_deref())?;
    let paths = resolve_paths(&config, args.config.as_deref(), &args);
    if paths.source_db == paths.output_db {
        return Err(CliError::usage("output database must differ from source database")
            .with_hint("pass --output-db with a different path"));
    }
    let columns = &config.columns;

    info!(
        data_dir = %paths.data_dir.display(),
        source_db = %paths.source_db.display(),
        output_db = %paths.output_db.display(),
        "starting split"
    );

    // 1. Cafe store exports (fatal when none usable)
    let store_files = csv_io::read_sources(&paths.data_dir, &config.paths.store_pattern)
        .map_err(|e| CliError::usage(format!("store pattern: {e}")))?;
    let stores = merge_stores(&store_files, columns).map_err(|e| match e {
        ReconError::NoValidStoreFiles { .. } => CliError::no_stores(e.to_string()).with_hint(
            format!(
                "expected {} in {} with columns {}",
                config.paths.store_pattern,
                paths.data_dir.display(),
                columns.store_columns().join(", ")
            ),
        ),
        other => CliError::general(other.to_string()),
    })?;

    // 2. Cafe menu exports (absent data yields an empty table)
    let menu_files = csv_io::read_sources(&paths.data_dir, &config.paths.menu_pattern)
        .map_err(|e| CliError::usage(format!("menu pattern: {e}")))?;
    let menus = merge_menus(&menu_files, columns);

    // 3. Combined database
    let source = sqlite::open_source(&paths.source_db).map_err(|e| {
        CliError::source(format!("cannot open source database: {e}"))
            .with_hint("pass --source-db or set paths.source_db in the config file")
    })?;
    let combined_stores = sqlite::load_table(&source, SOURCE_STORES)
        .map_err(|e| CliError::source(format!("source database: {e}")))?;
    let combined_menus = sqlite::load_table(&source, SOURCE_MENUS)
        .map_err(|e| CliError::source(format!("source database: {e}")))?;
    drop(source);
    let (combined_store_rows, combined_menu_rows) = (combined_stores.len(), combined_menus.len());

    // 4. Partition
    let output = split(
        SplitInput {
            cafe_stores: stores.table.clone(),
            cafe_menus: menus.table.clone(),
            combined_stores,
            combined_menus,
        },
        columns,
    )
    .map_err(|e| match e {
        ReconError::MissingColumn { .. } => CliError::source(e.to_string())
            .with_hint("set [columns] in the config file to match the source database"),
        other => CliError::general(other.to_string()),
    })?;

    let summary = compute_summary(&stores, &menus, &output, combined_store_rows, combined_menu_rows);

    // 5. Write, one transaction per table
    let mut conn = sqlite::open_output(&paths.output_db)
        .map_err(|e| CliError::output(format!("cannot open output database: {e}")))?;
    for (name, table) in output.tables(columns) {
        sqlite::replace_table(&mut conn, name, &table)
            .map_err(|e| CliError::output(format!("write failed: {e}")))?;
        info!(table = name, rows = table.len(), "wrote table");
    }

    print_summary(&summary, &paths.output_db);
    if args.json {
        let json = serde_json::to_string_pretty(&summary)
            .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;
        println!("{json}");
    }

    Ok(())
}

pub fn cmd_validate(config_path: Option<PathBuf>) -> Result<(), CliError> {
    let config = load_config(config_path.as_deref())?;
    let text = toml::to_string_pretty(&config)
        .map_err(|e| CliError::general(format!("TOML serialization error: {e}")))?;
    match &config_path {
        Some(p) => eprintln!("config ok: {}", p.display()),
        None => eprintln!("config ok: built-in defaults"),
    }
    print!("{text}");
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<SplitConfig, CliError> {
    let Some(path) = path else {
        return Ok(SplitConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::usage(format!("cannot read config {}: {e}", path.display())))?;
    SplitConfig::from_toml(&text).map_err(|e| {
        CliError::usage(format!("{}: {e}", path.display()))
            .with_hint("run 'cafesplit validate --config <file>' to check the file")
    })
}

/// Flags win over the config file. Relative paths from a config file are
/// taken relative to that file's directory; defaults and flags relative to
/// the working directory.
fn resolve_paths(config: &SplitConfig, config_path: Option<&Path>, args: &RunArgs) -> ResolvedPaths {
    let base = config_path
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .unwrap_or_default();
    let from_config = |p: &str| {
        let p = PathBuf::from(p);
        if p.is_absolute() {
            p
        } else {
            base.join(p)
        }
    };

    ResolvedPaths {
        data_dir: args
            .data_dir
            .clone()
            .unwrap_or_else(|| from_config(&config.paths.data_dir)),
        source_db: args
            .source_db
            .clone()
            .unwrap_or_else(|| from_config(&config.paths.source_db)),
        output_db: args
            .output_db
            .clone()
            .unwrap_or_else(|| from_config(&config.paths.output_db)),
    }
}

fn print_summary(summary: &SplitSummary, output_db: &Path) {
    let cafe = &summary.cafe;
    let food = &summary.food;

    eprintln!(
        "cafe:  {} stores ({} + {} duplicates dropped) from {} file(s), {} menu rows ({} duplicates dropped) from {} file(s)",
        cafe.stores,
        cafe.stores_dropped_by_contact,
        cafe.stores_dropped_by_store_id,
        summary.store_files.accepted.len(),
        cafe.menus,
        cafe.menus_dropped,
        summary.menu_files.accepted.len(),
    );
    eprintln!(
        "food:  {} of {} stores, {} of {} menu rows ({} store ids excluded)",
        food.stores, food.combined_stores, food.menus, food.combined_menus, food.excluded_store_ids,
    );
    for skip in summary.store_files.skipped.iter().chain(&summary.menu_files.skipped) {
        eprintln!("skip:  {} ({}): {}", skip.file, skip.reason, skip.detail);
    }
    if !food.name_collisions.is_empty() {
        warn!(count = food.name_collisions.len(), "stores excluded on name alone");
    }
    if food.orphan_menu_rows > 0 {
        eprintln!(
            "note:  {} menus_food rows reference stores not in stores_food",
            food.orphan_menu_rows
        );
    }
    eprintln!("wrote: {}", output_db.display());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> RunArgs {
        RunArgs {
            config: None,
            data_dir: None,
            source_db: None,
            output_db: None,
            json: false,
        }
    }

    #[test]
    fn test_defaults_relative_to_cwd() {
        let paths = resolve_paths(&SplitConfig::default(), None, &args());
        assert_eq!(paths.data_dir, PathBuf::from("../data"));
        assert_eq!(paths.source_db, PathBuf::from("../db/yogiyo.db"));
        assert_eq!(paths.output_db, PathBuf::from("../data/yogiyo_separated.db"));
    }

    #[test]
    fn test_config_paths_relative_to_config_dir() {
        let config = SplitConfig::from_toml("[paths]\ndata_dir = \"exports\"\n").unwrap();
        let paths = resolve_paths(&config, Some(Path::new("/srv/job/cafesplit.toml")), &args());
        assert_eq!(paths.data_dir, PathBuf::from("/srv/job/exports"));
        assert_eq!(paths.source_db, PathBuf::from("/srv/job/../db/yogiyo.db"));
    }

    #[test]
    fn test_flags_override_config() {
        let config = SplitConfig::default();
        let mut a = args();
        a.source_db = Some(PathBuf::from("combined.db"));
        a.output_db = Some(PathBuf::from("/tmp/out.db"));
        let paths = resolve_paths(&config, Some(Path::new("/srv/job/cafesplit.toml")), &a);
        assert_eq!(paths.source_db, PathBuf::from("combined.db"));
        assert_eq!(paths.output_db, PathBuf::from("/tmp/out.db"));
        assert_eq!(paths.data_dir, PathBuf::from("/srv/job/../data"));
    }

    #[test]
    fn test_absolute_config_path_kept() {
        let config = SplitConfig::from_toml("[paths]\nsource_db = \"/data/all.db\"\n").unwrap();
        let paths = resolve_paths(&config, Some(Path::new("conf/cafesplit.toml")), &args());
        assert_eq!(paths.source_db, PathBuf::from("/data/all.db"));
    }
}
