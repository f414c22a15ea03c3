//! Bridges to JSON documents and tabular query results.
//!
//! A document is read as its ordered `(attribute, value)` pairs; an array sink receives
//! serialized elements. A [`Table`] is a column list plus positional rows, as a tabular query
//! returns them; each table row becomes a [`Row`].

use crate::collection::Elem;
use crate::error::CanalError;
use crate::node::Extent;
use crate::record::Row;
use crate::Canal;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

impl Canal<(String, Value)> {
    /// The document's attributes in their stored order.
    pub fn from_document(doc: &Map<String, Value>) -> Self {
        Canal::from_vec(doc.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }
}

impl Canal<Value> {
    pub fn from_json_array(items: Vec<Value>) -> Self {
        Canal::from_vec(items)
    }
}

impl<T: Elem + Serialize> Canal<T> {
    /// Serialize every element into a JSON array.
    pub fn collect_json(&self) -> Result<Value> {
        let mut out = Vec::new();
        self.append_json(&mut out)?;
        Ok(Value::Array(out))
    }

    /// Serialize every element onto the end of `sink`, returning how many were appended.
    ///
    /// On error `sink` keeps whatever was appended before the failing element.
    pub fn append_json(&self, sink: &mut Vec<Value>) -> Result<usize> {
        let before = sink.len();
        for r in self.drain("append_json")? {
            sink.push(serde_json::to_value(r?)?);
        }
        Ok(sink.len() - before)
    }

    /// Project each element to a [`Row`] through its serialized form. Elements that do not
    /// serialize to a JSON object fail with [`CanalError::NotARecord`].
    pub fn to_rows(&self) -> Canal<Row> {
        self.try_map(|t| match serde_json::to_value(t)? {
            Value::Object(row) => Ok(row),
            other => Err(CanalError::NotARecord {
                found: kind_of(&other).to_string(),
            }
            .into()),
        })
    }
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Rows of a tabular result with their column names.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>, rows: Vec<Vec<Value>>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows,
        }
    }

    /// Column name to position.
    pub fn ordinals(&self) -> HashMap<&str, usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.as_str(), i))
            .collect()
    }

    pub fn ordinal(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }
}

impl Canal<Row> {
    /// One [`Row`] per table row, columns in table order. Short rows leave trailing columns
    /// null; extra cells are ignored.
    pub fn from_table(table: &Table) -> Self {
        let table = Arc::new(table.clone());
        Canal::source(Extent::Finite, move || {
            let table = Arc::clone(&table);
            Box::new((0..table.rows.len()).map(move |i| -> Result<Row> {
                let cells = &table.rows[i];
                Ok(table
                    .columns
                    .iter()
                    .enumerate()
                    .map(|(c, name)| (name.clone(), cells.get(c).cloned().unwrap_or(Value::Null)))
                    .collect())
            }))
        })
    }
}
