// cafesplit CLI - split a combined restaurant/cafe database into food and cafe tables

mod exit_codes;
mod logging;
mod split;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::{EXIT_ERROR, EXIT_NO_STORES, EXIT_OUTPUT, EXIT_SOURCE, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "cafesplit")]
#[command(about = "Merge cafe CSV exports and split a combined store database into food and cafe tables")]
#[command(long_version = long_version())]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge cafe exports and write stores_food, menus_food, stores_cafe, menus_cafe
    #[command(after_help = "\
Examples:
  cafesplit run
  cafesplit run --config cafesplit.toml
  cafesplit run --data-dir exports --source-db yogiyo.db --output-db separated.db
  cafesplit run --json > summary.json

Exit codes:
  0  success
  3  no valid cafe store file (nothing written)
  4  source database missing or lacking stores/menus
  5  output database write failed")]
    Run {
        /// TOML config file (paths and column names)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Directory holding stores_cafe*.csv / menus_cafe_*.csv exports
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Combined restaurant/cafe database to read
        #[arg(long)]
        source_db: Option<PathBuf>,

        /// Database to write the four split tables to
        #[arg(long)]
        output_db: Option<PathBuf>,

        /// Print the run summary as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Validate a config file and print the resolved settings
    #[command(after_help = "\
Examples:
  cafesplit validate
  cafesplit validate --config cafesplit.toml")]
    Validate {
        /// TOML config file (defaults apply when omitted)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,
    },
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nbuild:   debug",
            "\ntarget:  ", env!("TARGET"),
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nbuild:   release",
            "\ntarget:  ", env!("TARGET"),
        )
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        None => {
            // No subcommand = show help
            eprintln!("Usage: cafesplit <command> [options]");
            eprintln!("       cafesplit --help for more information");
            Ok(())
        }
        Some(Commands::Run {
            config,
            data_dir,
            source_db,
            output_db,
            json,
        }) => split::cmd_run(split::RunArgs {
            config,
            data_dir,
            source_db,
            output_db,
            json,
        }),
        Some(Commands::Validate { config }) => split::cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn no_stores(msg: impl Into<String>) -> Self {
        Self { code: EXIT_NO_STORES, message: msg.into(), hint: None }
    }

    pub fn source(msg: impl Into<String>) -> Self {
        Self { code: EXIT_SOURCE, message: msg.into(), hint: None }
    }

    pub fn output(msg: impl Into<String>) -> Self {
        Self { code: EXIT_OUTPUT, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
