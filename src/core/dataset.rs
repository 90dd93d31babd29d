use crate::domain::model::{CellValue, Dataset, Record};
use crate::utils::error::{FetchError, Result};
use csv::ReaderBuilder;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::LazyLock;

static NUMERIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?$").expect("numeric pattern is valid")
});

/// Cell contents read as a missing value.
pub const NULL_TOKENS: &[&str] = &[
    "NA", "N/A", "n/a", "NaN", "nan", "null", "NULL", "None", "#N/A", "<NA>",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Integer,
    Float,
    Text,
}

pub fn is_null_token(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty() || NULL_TOKENS.contains(&trimmed)
}

/// Parses a whole CSV document. The first line is the header.
pub fn parse_csv(text: &str) -> Result<Dataset> {
    let text = text.trim_start_matches('\u{feff}');
    ensure_quotes_closed(text)?;

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Err(FetchError::read("No columns to parse from file"));
    }
    let columns = dedupe_columns(headers.iter());

    let mut raw_rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record?;
        raw_rows.push(record.iter().map(str::to_string).collect());
    }
    tracing::debug!(
        "Parsed CSV with {} columns and {} rows",
        columns.len(),
        raw_rows.len()
    );

    let kinds: Vec<ColumnKind> = (0..columns.len())
        .map(|index| infer_column_kind(raw_rows.iter().map(|row| row[index].as_str())))
        .collect();

    let rows = raw_rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .zip(kinds.iter())
                .map(|(raw, kind)| to_cell(raw, *kind))
                .collect()
        })
        .collect();

    Ok(Dataset { columns, rows })
}

/// Selects `fields` from every row, in the order given.
pub fn project(dataset: &Dataset, fields: &[String]) -> Vec<Record> {
    let indices: Vec<(&String, Option<usize>)> = fields
        .iter()
        .map(|field| (field, dataset.column_index(field)))
        .collect();

    dataset
        .rows
        .iter()
        .map(|row| {
            let mut data = Map::with_capacity(indices.len());
            for &(field, index) in &indices {
                let value = index
                    .and_then(|i| row.get(i))
                    .map(Value::from)
                    .unwrap_or(Value::Null);
                data.insert(field.clone(), value);
            }
            Record { data }
        })
        .collect()
}

fn dedupe_columns<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let names: Vec<&str> = names.collect();
    let mut used: HashSet<String> = HashSet::new();
    let mut columns = Vec::with_capacity(names.len());

    for name in names {
        let mut candidate = name.to_string();
        let mut suffix = 1;
        while used.contains(&candidate) {
            candidate = format!("{}.{}", name, suffix);
            suffix += 1;
        }
        used.insert(candidate.clone());
        columns.push(candidate);
    }
    columns
}

fn infer_column_kind<'a>(cells: impl Iterator<Item = &'a str>) -> ColumnKind {
    let mut kind = ColumnKind::Integer;
    for raw in cells {
        if is_null_token(raw) {
            continue;
        }
        let trimmed = raw.trim();
        if !NUMERIC.is_match(trimmed) {
            return ColumnKind::Text;
        }
        if trimmed.parse::<i64>().is_ok() {
            continue;
        }
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => kind = ColumnKind::Float,
            _ => return ColumnKind::Text,
        }
    }
    kind
}

fn to_cell(raw: String, kind: ColumnKind) -> CellValue {
    if is_null_token(&raw) {
        return CellValue::Null;
    }
    let trimmed = raw.trim();
    match kind {
        ColumnKind::Integer => trimmed
            .parse::<i64>()
            .map(CellValue::Integer)
            .unwrap_or(CellValue::Text(raw)),
        ColumnKind::Float => trimmed
            .parse::<f64>()
            .map(CellValue::Float)
            .unwrap_or(CellValue::Text(raw)),
        ColumnKind::Text => CellValue::Text(raw),
    }
}

// The csv reader silently runs an unterminated quote to end of input.
fn ensure_quotes_closed(text: &str) -> Result<()> {
    let mut in_quotes = false;
    let mut at_field_start = true;
    let mut line = 1;
    let mut opened_at = 0;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                }
                '"' => in_quotes = false,
                '\n' => line += 1,
                _ => {}
            }
            continue;
        }
        match c {
            '"' if at_field_start => {
                in_quotes = true;
                opened_at = line;
                at_field_start = false;
            }
            ',' | '\r' => at_field_start = true,
            '\n' => {
                line += 1;
                at_field_start = true;
            }
            _ => at_field_start = false,
        }
    }

    if in_quotes {
        return Err(FetchError::read(format!(
            "unterminated quoted field starting on line {}",
            opened_at
        )));
    }
    Ok(())
}
