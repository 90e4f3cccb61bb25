// CSV export discovery and reading

use std::io::Read;
use std::path::{Path, PathBuf};

use cafesplit_recon::load::parse_csv;
use cafesplit_recon::model::SourceFile;
use tracing::debug;

/// Regular files in `dir` whose name matches `pattern`, sorted by path.
/// A missing directory yields no files.
pub fn discover(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, String> {
    let full = format!(
        "{}/{}",
        glob::Pattern::escape(&dir.to_string_lossy()),
        pattern
    );
    let entries = glob::glob(&full).map_err(|e| format!("bad pattern {pattern:?}: {e}"))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| e.to_string())?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    debug!(dir = %dir.display(), pattern, count = files.len(), "discovered files");
    Ok(files)
}

/// Discover and read every file matching `pattern`. Per-file failures are
/// carried in `SourceFile::table`, never returned as an error.
pub fn read_sources(dir: &Path, pattern: &str) -> Result<Vec<SourceFile>, String> {
    Ok(discover(dir, pattern)?
        .iter()
        .map(|p| read_source_file(p))
        .collect())
}

pub fn read_source_file(path: &Path) -> SourceFile {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let table = read_file_as_utf8(path).and_then(|content| {
        let delimiter = sniff_delimiter(&content);
        parse_csv(&name, &content, delimiter).map_err(|e| e.to_string())
    });

    SourceFile { name, table }
}

const SNIFF_DATA_ROWS: usize = 5;

/// Pick the field delimiter of an export from its header and first data
/// rows.
///
/// A candidate must split the header into more than one field. Among those,
/// the one whose data rows most often match the header width wins; a tie
/// goes to the wider header, then to the earlier candidate (comma first).
pub fn sniff_delimiter(content: &str) -> u8 {
    [b',', b'\t', b';', b'|']
        .into_iter()
        .filter_map(|delim| {
            let widths = record_widths(content, delim);
            let (&header, data) = widths.split_first()?;
            (header > 1).then(|| {
                let agreeing = data.iter().filter(|&&w| w == header).count();
                (delim, agreeing, header)
            })
        })
        .fold(None, |best: Option<(u8, usize, usize)>, cand| match best {
            Some(b) if (b.1, b.2) >= (cand.1, cand.2) => Some(b),
            _ => Some(cand),
        })
        .map_or(b',', |(delim, ..)| delim)
}

/// Field counts of the header and up to `SNIFF_DATA_ROWS` records after it.
/// Quoted fields may span lines.
fn record_widths(content: &str, delimiter: u8) -> Vec<usize> {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes())
        .records()
        .take(SNIFF_DATA_ROWS + 1)
        .map_while(Result::ok)
        .map(|r| r.len())
        .collect()
}

/// Read file as UTF-8, dropping a leading BOM. Invalid UTF-8 falls back to
/// EUC-KR (CP949 family), the usual encoding of Korean spreadsheet exports.
pub fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let mut file = std::fs::File::open(path).map_err(|e| format!("{}: {e}", path.display()))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| format!("{}: {e}", path.display()))?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(match s.strip_prefix('\u{feff}') {
            Some(rest) => rest.to_string(),
            None => s,
        }),
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, had_errors) = encoding_rs::EUC_KR.decode(&bytes);
            if had_errors {
                return Err(format!("{}: not valid UTF-8 or EUC-KR", path.display()));
            }
            debug!(file = %path.display(), "decoded as EUC-KR");
            Ok(decoded.into_owned())
        }
    }
}
