use crate::error::ReconError;
use crate::model::RawTable;

/// Parse delimited text with a header row into a `RawTable`.
///
/// Rows shorter than the header are padded with empty fields; rows longer
/// than the header are an error. Text with no header line at all is an
/// error, a header with no data rows is not.
pub fn parse_csv(file: &str, content: &str, delimiter: u8) -> Result<RawTable, ReconError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    if content.trim().is_empty() {
        return Err(ReconError::Csv {
            file: file.into(),
            message: "no columns to parse".into(),
        });
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| csv_err(file, e))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(|e| csv_err(file, e))?;
        if record.len() > headers.len() {
            // +2: 1-based, plus the header line
            let line = record.position().map(|p| p.line()).unwrap_or(i as u64 + 2);
            return Err(ReconError::Csv {
                file: file.into(),
                message: format!(
                    "line {}: expected {} fields, saw {}",
                    line,
                    headers.len(),
                    record.len()
                ),
            });
        }
        let mut row: Vec<String> = record.iter().map(|f| f.to_string()).collect();
        row.resize(headers.len(), String::new());
        rows.push(row);
    }

    Ok(RawTable { headers, rows })
}

fn csv_err(file: &str, e: csv::Error) -> ReconError {
    ReconError::Csv {
        file: file.into(),
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_basic() {
        let csv = "\
store_id,가게명,영업시간,전화번호,주소
1,카페 A,09:00-18:00,02-111-1111,서울
2,카페 B,10:00-22:00,02-222-2222,부산
";
        let table = parse_csv("stores_cafe_1.csv", csv, b',').unwrap();
        assert_eq!(table.headers.len(), 5);
        assert_eq!(table.headers[1], "가게명");
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1][1], "카페 B");
    }

    #[test]
    fn bom_stripped_from_first_header() {
        let csv = "\u{feff}store_id,메뉴명,가격\n1,라떼,4500\n";
        let table = parse_csv("m.csv", csv, b',').unwrap();
        assert_eq!(table.headers[0], "store_id");
        assert_eq!(table.column_index("store_id"), Some(0));
    }

    #[test]
    fn short_rows_padded() {
        let csv = "store_id,메뉴명,가격\n1,라떼\n";
        let table = parse_csv("m.csv", csv, b',').unwrap();
        assert_eq!(table.rows[0], vec!["1", "라떼", ""]);
    }

    #[test]
    fn long_rows_rejected() {
        let csv = "store_id,메뉴명,가격\n1,라떼,4500,extra\n";
        let err = parse_csv("m.csv", csv, b',').unwrap_err();
        assert!(err.to_string().contains("line 2"), "{err}");
    }

    #[test]
    fn header_only_is_empty_table() {
        let table = parse_csv("m.csv", "store_id,메뉴명,가격\n", b',').unwrap();
        assert_eq!(table.headers.len(), 3);
        assert!(table.rows.is_empty());
    }

    #[test]
    fn blank_text_is_error() {
        assert!(parse_csv("m.csv", "", b',').is_err());
        assert!(parse_csv("m.csv", "\n\n", b',').is_err());
    }

    #[test]
    fn quoted_fields_keep_delimiter() {
        let csv = "store_id,가게명,주소\n1,\"카페, 본점\",서울\n";
        let table = parse_csv("s.csv", csv, b',').unwrap();
        assert_eq!(table.rows[0][1], "카페, 본점");
    }
}
