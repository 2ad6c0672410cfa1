//! Table keys, as stored in TiKV. Row keys have the form t{table_id}_r{row_id}
//! and index keys t{table_id}_i{index_id}{values...}, where the IDs are
//! memcomparable i64s and the values are flag-prefixed datums.
//!
//! Keys come in two layouts:
//!
//! * Compact: the raw key, as used by TiDB. At least 19 bytes, with `_` at
//!   byte 9 and r/i at byte 10.
//! * Padded: the raw key wrapped in the memcomparable bytes encoding, as
//!   stored by TiKV. At least 22 bytes, with `_` at byte 10 and r/i at byte 11,
//!   shifted by the group marker at byte 8.
//!
//! Padded keys are unwrapped into compact keys before parsing, which also drops
//! any suffix after the encoded key, e.g. a timestamp.

pub mod keyrange;
pub mod row;

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::encoding::codec::decode_datums;
use crate::encoding::format::Raw;
use crate::encoding::memcomparable::{take_bytes, take_int};
use crate::error::{Error, Result};
use crate::types::{Datum, Kind};

/// The table key prefix.
pub const TABLE_PREFIX: &[u8] = b"t";
/// The row key separator following the table ID.
pub const ROW_PREFIX_SEP: &[u8] = b"_r";
/// The index key separator following the table ID.
pub const INDEX_PREFIX_SEP: &[u8] = b"_i";

/// The minimum length of a compact table key.
const COMPACT_MIN_LEN: usize = 19;
/// The minimum length of a padded table key.
const PADDED_MIN_LEN: usize = 22;

/// The kind of a table key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyKind {
    Row,
    Index,
}

impl KeyKind {
    /// Returns the kind for a kind byte.
    fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'r' => Some(Self::Row),
            b'i' => Some(Self::Index),
            _ => None,
        }
    }
}

/// A table key layout. Layouts are detected by their byte signatures, in the
/// order of Layout::ALL. The signatures are mutually exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layout {
    Compact,
    Padded,
}

impl Layout {
    /// All layouts, in detection order.
    pub const ALL: [Layout; 2] = [Layout::Compact, Layout::Padded];

    /// Returns the key kind if the key matches the layout's signature.
    pub fn detect(&self, key: &[u8]) -> Option<KeyKind> {
        let (min_len, sep) = match self {
            Self::Compact => (COMPACT_MIN_LEN, 9),
            Self::Padded => (PADDED_MIN_LEN, 10),
        };
        if key.len() < min_len || !key.starts_with(TABLE_PREFIX) || key[sep] != b'_' {
            return None;
        }
        KeyKind::from_byte(key[sep + 1])
    }

    /// Converts a key in this layout to the compact layout.
    fn to_compact<'a>(&self, key: &'a [u8]) -> Result<Cow<'a, [u8]>> {
        match self {
            Self::Compact => Ok(Cow::Borrowed(key)),
            Self::Padded => {
                let compact = take_bytes(&mut &key[..]).map_err(|err| {
                    Error::UnrecognizedKeyFormat(format!("invalid padded key: {err}"))
                })?;
                Ok(Cow::Owned(compact))
            }
        }
    }
}

/// Detects the key's layout and kind, and returns the compact key. Errors with
/// UnrecognizedKeyFormat if no layout matches.
fn parse(key: &[u8]) -> Result<(KeyKind, Cow<'_, [u8]>)> {
    for layout in Layout::ALL {
        let Some(kind) = layout.detect(key) else {
            continue;
        };
        let compact = layout.to_compact(key)?;
        if Layout::Compact.detect(&compact) != Some(kind) {
            return Err(Error::UnrecognizedKeyFormat(format!(
                "{layout:?} key {} does not unwrap to a table key",
                Raw::bytes(key)
            )));
        }
        return Ok((kind, compact));
    }
    Err(Error::UnrecognizedKeyFormat(format!("not a table key: {}", Raw::bytes(key))))
}

/// Decodes the table ID and row/index ID of a compact key, and returns the
/// remaining bytes.
fn decode_ids(compact: &[u8]) -> Result<(i64, i64, &[u8])> {
    let table_id = take_int(&mut &compact[1..9])?;
    let id = take_int(&mut &compact[11..19])?;
    Ok((table_id, id, &compact[19..]))
}

/// A table row key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableRowKey {
    pub table_id: i64,
    pub row_id: i64,
}

/// A table index key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableIndexKey {
    pub table_id: i64,
    pub index_id: i64,
    pub values: Vec<IndexValue>,
}

/// A decoded index value with its type tag and text form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndexValue {
    pub kind: Kind,
    pub text: String,
}

impl From<Datum> for IndexValue {
    /// Non-UTF-8 strings are escaped rather than rejected.
    fn from(datum: Datum) -> Self {
        let text = match (datum.to_text(), &datum) {
            (Ok(text), _) => text,
            (Err(_), Datum::String(b) | Datum::Bytes(b) | Datum::BinaryLiteral(b)) => Raw::bytes(b),
            (Err(err), _) => {
                log::warn!("can't convert index value {datum:?} to text: {err}");
                format!("{datum:?}")
            }
        };
        Self { kind: datum.kind(), text }
    }
}

/// Decodes a row key, in either layout. Trailing bytes after the row ID are
/// ignored.
pub fn decode_row_key(key: &[u8]) -> Result<TableRowKey> {
    let (kind, compact) = parse(key)?;
    if kind != KeyKind::Row {
        return Err(Error::UnrecognizedKeyFormat(format!("not a row key: {}", Raw::bytes(key))));
    }
    let (table_id, row_id, _) = decode_ids(&compact)?;
    Ok(TableRowKey { table_id, row_id })
}

/// Decodes an index key, in either layout. Index values are decoded until the
/// key is exhausted or a value fails to decode.
pub fn decode_index_key(key: &[u8]) -> Result<TableIndexKey> {
    let (kind, compact) = parse(key)?;
    if kind != KeyKind::Index {
        return Err(Error::UnrecognizedKeyFormat(format!("not an index key: {}", Raw::bytes(key))));
    }
    let (table_id, index_id, values) = decode_ids(&compact)?;
    let values = decode_datums(values).into_iter().map(IndexValue::from).collect();
    Ok(TableIndexKey { table_id, index_id, values })
}

/// Decodes a bare list of index values.
pub fn decode_index_values(bytes: &[u8]) -> Vec<IndexValue> {
    decode_datums(bytes).into_iter().map(IndexValue::from).collect()
}
