use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty path, duplicate column name, etc.).
    ConfigValidation(String),
    /// Every cafe store file was unreadable or failed schema validation.
    NoValidStoreFiles { scanned: usize },
    /// Required column absent from a table.
    MissingColumn { table: String, column: String },
    /// CSV text could not be parsed into a table.
    Csv { file: String, message: String },
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::NoValidStoreFiles { scanned } => {
                write!(f, "no valid cafe store files ({scanned} scanned)")
            }
            Self::MissingColumn { table, column } => {
                write!(f, "table '{table}': missing column '{column}'")
            }
            Self::Csv { file, message } => write!(f, "{file}: {message}"),
        }
    }
}

impl std::error::Error for ReconError {}
