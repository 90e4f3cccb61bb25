//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract — scripts rely on them.
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Success                                              |
//! | 1    | General error (unspecified)                          |
//! | 2    | Usage error (bad arguments, invalid config file)     |
//! | 3    | No valid cafe store file; nothing was written        |
//! | 4    | Source database unreadable or missing a table/column |
//! | 5    | Output database could not be written                 |

/// Success - all four tables written.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, unreadable or invalid config file.
pub const EXIT_USAGE: u8 = 2;

/// Every store export was unreadable, empty, or missing required columns.
/// The output database is not opened.
pub const EXIT_NO_STORES: u8 = 3;

/// Source database missing, unreadable, or lacking `stores`/`menus`
/// or a required column in them.
pub const EXIT_SOURCE: u8 = 4;

/// Output database could not be opened or a table write failed.
/// Tables written before the failure remain.
pub const EXIT_OUTPUT: u8 = 5;
