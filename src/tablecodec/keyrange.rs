//! Key ranges of the meta keyspace, the table keyspace and individual tables.

use serde::{Deserialize, Serialize};

use super::{INDEX_PREFIX_SEP, ROW_PREFIX_SEP, TABLE_PREFIX};
use crate::errinput;
use crate::encoding::memcomparable::encode_int;
use crate::error::Result;
use crate::types::Index;

/// A key range from an inclusive start key to an exclusive end key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeyRange {
    pub start: Vec<u8>,
    pub end: Vec<u8>,
}

impl KeyRange {
    pub fn new(start: impl Into<Vec<u8>>, end: impl Into<Vec<u8>>) -> Self {
        Self { start: start.into(), end: end.into() }
    }
}

/// The global key ranges.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GlobalRanges {
    /// Schema metadata.
    pub meta: KeyRange,
    /// All tables.
    pub table: KeyRange,
}

impl GlobalRanges {
    pub fn new() -> Self {
        Self { meta: KeyRange::new(b"m", b"n"), table: KeyRange::new(b"t", b"u") }
    }
}

impl Default for GlobalRanges {
    fn default() -> Self {
        Self::new()
    }
}

/// The key ranges of a table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableRanges {
    /// The entire table.
    pub table: KeyRange,
    /// All of the table's indexes.
    pub indexes: KeyRange,
    /// Individual indexes, by name.
    pub index: Vec<(String, KeyRange)>,
    /// The table's rows.
    pub rows: KeyRange,
}

impl TableRanges {
    /// Derives the key ranges of the given table ID and indexes.
    pub fn new(table_id: i64, indexes: &[Index]) -> Result<Self> {
        let table_prefix = table_prefix(table_id);
        let table_end = table_prefix_after(table_id)?;
        let index_prefix = [table_prefix.as_slice(), INDEX_PREFIX_SEP].concat();
        let row_prefix = [table_prefix.as_slice(), ROW_PREFIX_SEP].concat();

        let mut index = Vec::with_capacity(indexes.len());
        for idx in indexes {
            let Some(next) = idx.id.checked_add(1) else {
                return errinput!("index ID {} out of range", idx.id);
            };
            let range = KeyRange::new(
                [index_prefix.as_slice(), &encode_int(idx.id)[..]].concat(),
                [index_prefix.as_slice(), &encode_int(next)[..]].concat(),
            );
            index.push((idx.name.original.clone(), range));
        }

        Ok(Self {
            table: KeyRange::new(table_prefix, table_end.clone()),
            indexes: KeyRange::new(index_prefix, row_prefix.clone()),
            index,
            rows: KeyRange::new(row_prefix, table_end),
        })
    }
}

/// Returns the key prefix of a table, t{table_id}.
pub fn table_prefix(table_id: i64) -> Vec<u8> {
    [TABLE_PREFIX, &encode_int(table_id)[..]].concat()
}

/// Returns the key prefix of the table following the given table.
fn table_prefix_after(table_id: i64) -> Result<Vec<u8>> {
    match table_id.checked_add(1) {
        Some(next) => Ok(table_prefix(next)),
        None => errinput!("table ID {table_id} out of range"),
    }
}
