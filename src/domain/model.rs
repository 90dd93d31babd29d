use serde::Serialize;
use serde_json::{Map, Value};

/// A single typed cell of a parsed CSV document.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Null,
}

impl From<&CellValue> for Value {
    fn from(cell: &CellValue) -> Self {
        match cell {
            CellValue::Text(text) => Value::String(text.clone()),
            CellValue::Integer(n) => Value::Number((*n).into()),
            // Non-finite floats are never produced by the parser, but fall back to null anyway.
            CellValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            CellValue::Null => Value::Null,
        }
    }
}

/// Parsed CSV: unique column names and rows of equal width.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Dataset {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One projected row. Keys keep the order the fields were requested in.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Record {
    pub data: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultEnvelope {
    Data(Vec<Record>),
    Error(String),
}
