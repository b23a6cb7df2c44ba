//! Comma-separated export/import of the record list. The header row carries
//! the same seven keys as the JSON file so both formats describe one field
//! set.

use crate::error::{Result, SchemaError, StoreError};
use crate::models::{Field, Record};

/// Render the records as CSV with a header row. Lines end in `\n`.
pub fn to_csv(records: &[Record]) -> String {
    let mut out = String::new();
    let header: Vec<&str> = Field::ALL.into_iter().map(Field::key).collect();
    out.push_str(&header.join(","));
    out.push('\n');

    for record in records {
        let row: Vec<String> = Field::ALL
            .into_iter()
            .map(|field| escape_cell(record.get(field)))
            .collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }

    out
}

/// Parse CSV text produced by `to_csv` or a spreadsheet. Columns are matched
/// by header name, so their order may differ from the export order.
pub fn from_csv(text: &str) -> Result<Vec<Record>> {
    let rows = split_rows(text)?;
    let mut rows = rows.into_iter();

    let (_, header) = rows
        .next()
        .ok_or_else(|| StoreError::Parse("the CSV file is empty".to_string()))?;
    let header: Vec<String> = header
        .iter()
        .map(|cell| cell.trim().trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut columns = Vec::with_capacity(Field::ALL.len());
    let mut missing = Vec::new();
    for field in Field::ALL {
        match header.iter().position(|name| name == field.key()) {
            Some(idx) => columns.push((field, idx)),
            None => missing.push(field.key()),
        }
    }
    if !missing.is_empty() {
        return Err(SchemaError::MissingFields(missing).into());
    }

    let mut records = Vec::new();
    for (line, cells) in rows {
        if cells.len() == 1 && cells[0].trim().is_empty() {
            continue;
        }
        if cells.len() != header.len() {
            return Err(StoreError::Parse(format!(
                "line {line} has {} columns, expected {}",
                cells.len(),
                header.len()
            )));
        }
        let mut record = Record::default();
        for (field, idx) in &columns {
            record.set(*field, cells[*idx].clone());
        }
        records.push(record);
    }

    Ok(records)
}

fn escape_cell(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Split CSV text into rows of cells, honouring quoted cells that span lines.
/// Each row is paired with the 1-based line number it starts on.
fn split_rows(text: &str) -> Result<Vec<(usize, Vec<String>)>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut row_start = 1;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    cell.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    cell.push(ch);
                }
                _ => cell.push(ch),
            }
            continue;
        }

        match ch {
            '"' if cell.is_empty() => in_quotes = true,
            ',' => row.push(std::mem::take(&mut cell)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                row.push(std::mem::take(&mut cell));
                rows.push((row_start, std::mem::take(&mut row)));
                line += 1;
                row_start = line;
            }
            _ => cell.push(ch),
        }
    }

    if in_quotes {
        return Err(StoreError::Parse(format!(
            "unterminated quoted value starting on line {row_start}"
        )));
    }
    if !cell.is_empty() || !row.is_empty() {
        row.push(cell);
        rows.push((row_start, row));
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_only_cells_that_need_it() {
        assert_eq!(escape_cell("plain"), "plain");
        assert_eq!(escape_cell("a,b"), "\"a,b\"");
        assert_eq!(escape_cell("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn split_rows_handles_crlf_and_multiline_cells() {
        let rows = split_rows("a,b\r\n\"x\ny\",z\r\n").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].1, vec!["a", "b"]);
        assert_eq!(rows[1], (2, vec!["x\ny".to_string(), "z".to_string()]));
    }

    #[test]
    fn header_without_all_keys_is_a_schema_error() {
        let err = from_csv("proyecto,fecha\nJ1,2024\n").unwrap_err();
        match err {
            StoreError::Schema(SchemaError::MissingFields(keys)) => {
                assert_eq!(keys, vec!["ubicacion", "arbitro", "estado", "resultado", "descripcion"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn wrong_column_count_reports_line() {
        let text = "proyecto,fecha,ubicacion,arbitro,estado,resultado,descripcion\nJ1,2024\n";
        let err = from_csv(text).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn unterminated_quote_is_rejected() {
        assert!(matches!(split_rows("\"abc"), Err(StoreError::Parse(_))));
    }
}
