//! Formats decoded keys, rows, key ranges and raw payloads as text output.

use itertools::Itertools as _;

use super::memcomparable::encode_bytes;
use crate::decoder::DecodedKey;
use crate::tablecodec::IndexValue;
use crate::tablecodec::keyrange::{GlobalRanges, KeyRange, TableRanges};
use crate::tablecodec::row::{ColumnValue, DecodedRow};

/// Formats raw byte slices without any decoding.
pub struct Raw;

impl Raw {
    /// Formats raw bytes as escaped ASCII strings.
    pub fn bytes(bytes: &[u8]) -> String {
        let escaped = bytes.iter().copied().flat_map(std::ascii::escape_default).collect_vec();
        format!("\"{}\"", String::from_utf8_lossy(&escaped))
    }

    /// Formats a key as hex, optionally memcomparable-encoding it first.
    pub fn key(key: &[u8], encode: bool) -> String {
        match encode {
            true => hex::encode(encode_bytes(key)),
            false => hex::encode(key),
        }
    }

    /// Formats a raw payload as hex, and as a big-endian u64 if it fits.
    pub fn payload(bytes: &[u8]) -> String {
        let mut output = format!("hex: {}\n", hex::encode(bytes));
        if bytes.len() <= 8 {
            let mut buf = [0; 8];
            buf[8 - bytes.len()..].copy_from_slice(bytes);
            output += &format!("uint64: {}\n", u64::from_be_bytes(buf));
        }
        output
    }
}

/// Formats decoded values as human-readable text.
pub struct Text;

impl Text {
    /// Formats a decoded key.
    pub fn key(key: &DecodedKey) -> String {
        match key {
            DecodedKey::TableRow(key) => {
                format!("format: table_row\ntable_id: {}\nrow_id: {}\n", key.table_id, key.row_id)
            }
            DecodedKey::TableIndex(key) => format!(
                "format: table_index\ntable_id: {}\nindex_id: {}\n{}",
                key.table_id,
                key.index_id,
                Self::index_values(&key.values)
            ),
            DecodedKey::IndexValues(values) => {
                format!("format: index_value\n{}", Self::index_values(values))
            }
        }
    }

    /// Formats index values, one per line.
    pub fn index_values(values: &[IndexValue]) -> String {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| format!("index_value[{i}]: {{type: {}, value: {}}}\n", v.kind, v.text))
            .join("")
    }

    /// Formats a decoded row, one line per column.
    pub fn row(row: &DecodedRow) -> String {
        row.columns
            .iter()
            .map(|column| {
                let name = &column.name;
                match &column.value {
                    ColumnValue::Missing => format!("{name} not found in data\n"),
                    ColumnValue::Null => format!("{name} is NULL\n"),
                    ColumnValue::Text(text) => format!("{name}:\t{text}\n"),
                    ColumnValue::Error { error, datum } => {
                        format!("{name} ToString error: {error} datum: {datum}\n")
                    }
                }
            })
            .join("")
    }

    /// Formats the global key ranges.
    pub fn global_ranges(ranges: &GlobalRanges, encode: bool) -> String {
        format!(
            "global ranges:\n  meta: {}\n  table: {}\n",
            Self::range(&ranges.meta, encode),
            Self::range(&ranges.table, encode),
        )
    }

    /// Formats a table's key ranges.
    pub fn table_ranges(name: &str, ranges: &TableRanges, encode: bool) -> String {
        let mut output =
            format!("table {name} ranges: (NOTE: key range might be changed after DDL)\n");
        output += &format!("  table: {}\n", Self::range(&ranges.table, encode));
        output += &format!("  table indexes: {}\n", Self::range(&ranges.indexes, encode));
        for (index, range) in &ranges.index {
            output += &format!("    index {index}: {}\n", Self::range(range, encode));
        }
        output += &format!("  table rows: {}\n", Self::range(&ranges.rows, encode));
        output
    }

    /// Formats a key range as (start, end).
    fn range(range: &KeyRange, encode: bool) -> String {
        format!("({}, {})", Raw::key(&range.start, encode), Raw::key(&range.end, encode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tablecodec::row::DecodedColumn;
    use crate::tablecodec::{TableIndexKey, TableRowKey};
    use crate::types::{CIStr, Index, Kind};
    use test_case::test_case;

    #[test_case(b"" => r#""""#)]
    #[test_case(b"t_r" => r#""t_r""#)]
    #[test_case(b"a\x00\xff\"" => r#""a\x00\xff\"""#)]
    fn raw_bytes(bytes: &[u8]) -> String {
        Raw::bytes(bytes)
    }

    #[test_case(b"AAAAACqPhb0=" => "hex: 000000002a8f85bd\nuint64: 714048957\n"; "eight bytes")]
    #[test_case(b"AQI=" => "hex: 0102\nuint64: 258\n"; "short")]
    #[test_case(b"" => "hex: \nuint64: 0\n"; "empty")]
    #[test_case(b"AAECAwQFBgcI" => "hex: 000102030405060708\n"; "long")]
    fn payload(base64: &[u8]) -> String {
        use base64::Engine as _;
        let bytes = base64::engine::general_purpose::STANDARD.decode(base64).expect("invalid base64");
        Raw::payload(&bytes)
    }

    #[test]
    fn key_row() {
        let key = DecodedKey::TableRow(TableRowKey { table_id: 1935, row_id: 539578 });
        assert_eq!(Text::key(&key), "format: table_row\ntable_id: 1935\nrow_id: 539578\n");
    }

    #[test]
    fn key_index() {
        let values = vec![
            IndexValue { kind: Kind::Int64, text: "2".into() },
            IndexValue { kind: Kind::Bytes, text: "abc".into() },
        ];
        let key = DecodedKey::TableIndex(TableIndexKey { table_id: 95, index_id: 1, values: values.clone() });
        assert_eq!(
            Text::key(&key),
            "format: table_index\ntable_id: 95\nindex_id: 1\n\
             index_value[0]: {type: bigint, value: 2}\n\
             index_value[1]: {type: bytes, value: abc}\n"
        );
        assert_eq!(
            Text::key(&DecodedKey::IndexValues(values)),
            "format: index_value\n\
             index_value[0]: {type: bigint, value: 2}\n\
             index_value[1]: {type: bytes, value: abc}\n"
        );
    }

    #[test]
    fn row() {
        let column = |name: &str, value| DecodedColumn { id: 1, name: name.to_string(), value };
        let row = DecodedRow {
            columns: vec![
                column("a", ColumnValue::Text("1".into())),
                column("c", ColumnValue::Null),
                column("e", ColumnValue::Missing),
                column("f", ColumnValue::Error { error: "bad".into(), datum: "Bytes([255])".into() }),
            ],
        };
        assert_eq!(
            Text::row(&row),
            "a:\t1\nc is NULL\ne not found in data\nf ToString error: bad datum: Bytes([255])\n"
        );
    }

    #[test]
    fn ranges() -> crate::error::Result<()> {
        assert_eq!(
            Text::global_ranges(&GlobalRanges::new(), false),
            "global ranges:\n  meta: (6d, 6e)\n  table: (74, 75)\n"
        );
        assert_eq!(
            Text::global_ranges(&GlobalRanges::new(), true),
            "global ranges:\n  meta: (6d00000000000000f8, 6e00000000000000f8)\n  table: (7400000000000000f8, 7500000000000000f8)\n"
        );

        let ranges = TableRanges::new(60, &[Index { id: 1, name: CIStr::new("idx") }])?;
        assert_eq!(
            Text::table_ranges("t", &ranges, false),
            "table t ranges: (NOTE: key range might be changed after DDL)\n\
             \x20 table: (74800000000000003c, 74800000000000003d)\n\
             \x20 table indexes: (74800000000000003c5f69, 74800000000000003c5f72)\n\
             \x20   index idx: (74800000000000003c5f698000000000000001, 74800000000000003c5f698000000000000002)\n\
             \x20 table rows: (74800000000000003c5f72, 74800000000000003d)\n"
        );
        let encoded = Text::table_ranges("t", &ranges, true);
        assert!(encoded.contains("  table: (7480000000000000ff3c00000000000000f8, "), "{encoded}");
        Ok(())
    }
}
