//! Row values, stored as consecutive (column ID, value) datum pairs. A row
//! with no columns is stored as a single nil datum.

use std::collections::HashMap;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use crate::encoding::codec::{NIL_FLAG, take_datum};
use crate::errvalue;
use crate::error::{Error, Result};
use crate::types::{Column, Datum};

/// The outcome of decoding a single column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ColumnValue {
    /// The column is not present in the row data, e.g. because it was added
    /// after the row was written.
    Missing,
    /// The column is null.
    Null,
    /// The column's text value.
    Text(String),
    /// The column's value could not be converted to text. Contains the error
    /// and a debug dump of the stored datum.
    Error { error: String, datum: String },
}

/// A decoded table column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecodedColumn {
    pub id: i64,
    pub name: String,
    pub value: ColumnValue,
}

/// A decoded row, with one entry per schema column in schema order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecodedRow {
    pub columns: Vec<DecodedColumn>,
}

/// Decodes a base64-encoded row value using the given table columns.
///
/// Structural decoding errors fail the entire row, while errors converting an
/// individual column value are recorded for that column.
pub fn decode_row(payload: &str, columns: &[Column]) -> Result<DecodedRow> {
    if payload.is_empty() {
        return Err(Error::EmptyPayload);
    }
    let bytes = BASE64.decode(payload)?;
    let mut datums = decode_row_datums(&bytes, columns)?;
    let columns = columns
        .iter()
        .map(|column| {
            let value = match datums.remove(&column.id) {
                None => ColumnValue::Missing,
                Some(Datum::Null) => ColumnValue::Null,
                Some(datum) => {
                    match datum.clone().unflatten(&column.field_type).and_then(|d| d.to_text()) {
                        Ok(text) => ColumnValue::Text(text),
                        Err(err) => {
                            log::debug!("column {} failed to decode: {err}", column.name);
                            ColumnValue::Error { error: err.to_string(), datum: format!("{datum:?}") }
                        }
                    }
                }
            };
            DecodedColumn { id: column.id, name: column.name.to_string(), value }
        })
        .collect();
    Ok(DecodedRow { columns })
}

/// Decodes the raw datums of the given columns from a row value. Values of
/// columns not in the schema are skipped, and decoding stops once all schema
/// columns have been found.
pub fn decode_row_datums(bytes: &[u8], columns: &[Column]) -> Result<HashMap<i64, Datum>> {
    if bytes.is_empty() {
        return Err(Error::NoRowData);
    }
    let mut datums = HashMap::new();
    if bytes == [NIL_FLAG] {
        return Ok(datums);
    }
    let mut input = bytes;
    while !input.is_empty() {
        let id = match take_datum(&mut input)? {
            Datum::Int64(id) => id,
            Datum::Uint64(id) => id as i64,
            datum => return errvalue!("invalid column ID {datum:?}"),
        };
        let datum = take_datum(&mut input)?;
        if columns.iter().any(|c| c.id == id) {
            datums.insert(id, datum);
            if datums.len() == columns.len() {
                break;
            }
        }
    }
    Ok(datums)
}
