use crate::errinput;
use crate::error::{Error, Result};

use serde::{Deserialize, Serialize};

/// MySQL column type codes, as used in TiDB field types.
pub mod mysql {
    pub const TYPE_DECIMAL: u8 = 0;
    pub const TYPE_TINY: u8 = 1;
    pub const TYPE_SHORT: u8 = 2;
    pub const TYPE_LONG: u8 = 3;
    pub const TYPE_FLOAT: u8 = 4;
    pub const TYPE_DOUBLE: u8 = 5;
    pub const TYPE_NULL: u8 = 6;
    pub const TYPE_TIMESTAMP: u8 = 7;
    pub const TYPE_LONGLONG: u8 = 8;
    pub const TYPE_INT24: u8 = 9;
    pub const TYPE_DATE: u8 = 10;
    pub const TYPE_DURATION: u8 = 11;
    pub const TYPE_DATETIME: u8 = 12;
    pub const TYPE_YEAR: u8 = 13;
    pub const TYPE_VARCHAR: u8 = 15;
    pub const TYPE_BIT: u8 = 16;
    pub const TYPE_JSON: u8 = 0xf5;
    pub const TYPE_NEW_DECIMAL: u8 = 0xf6;
    pub const TYPE_ENUM: u8 = 0xf7;
    pub const TYPE_SET: u8 = 0xf8;
    pub const TYPE_BLOB: u8 = 0xfc;
    pub const TYPE_VAR_STRING: u8 = 0xfd;
    pub const TYPE_STRING: u8 = 0xfe;
}

/// A case-insensitive name: the original and the lowercased form.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CIStr {
    #[serde(rename = "O")]
    pub original: String,
    #[serde(rename = "L", default)]
    pub lower: String,
}

impl CIStr {
    pub fn new(name: &str) -> Self {
        Self { original: name.to_string(), lower: name.to_lowercase() }
    }
}

impl std::fmt::Display for CIStr {
    /// Displays the lowercased name, deriving it if missing.
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self.lower.as_str() {
            "" => f.write_str(&self.original.to_lowercase()),
            lower => f.write_str(lower),
        }
    }
}

/// A column's declared type.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldType {
    /// The MySQL type code, see mysql::TYPE_*.
    #[serde(rename = "Tp")]
    pub tp: u8,
    #[serde(rename = "Flen", default)]
    pub flen: i32,
    /// The number of fraction digits, or the fractional seconds precision of
    /// time types. -1 if unspecified.
    #[serde(rename = "Decimal", default)]
    pub decimal: i32,
    /// Enum and set elements.
    #[serde(rename = "Elems", default)]
    pub elems: Option<Vec<String>>,
}

impl FieldType {
    /// Returns the fractional seconds precision, 0 if unspecified.
    pub fn fsp(&self) -> u8 {
        self.decimal.clamp(0, super::time::MAX_FSP as i32) as u8
    }

    /// Returns the enum or set elements.
    pub fn elems(&self) -> &[String] {
        self.elems.as_deref().unwrap_or_default()
    }
}

/// A table column.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: i64,
    pub name: CIStr,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

/// A table index.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Index {
    pub id: i64,
    #[serde(rename = "idx_name")]
    pub name: CIStr,
}

/// A table schema, as served by the TiDB status API.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub id: i64,
    pub name: CIStr,
    #[serde(rename = "cols", default)]
    pub columns: Vec<Column>,
    #[serde(rename = "index_info", default)]
    pub indexes: Option<Vec<Index>>,
}

impl Table {
    /// Parses a table schema from JSON.
    pub fn from_json(json: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(json)?)
    }

    /// Returns the table's indexes.
    pub fn indexes(&self) -> &[Index] {
        self.indexes.as_deref().unwrap_or_default()
    }
}

/// A reference to a table, either by database and table name or by ID.
#[derive(Clone, Debug, PartialEq)]
pub enum TableRef {
    Name { database: String, table: String },
    ID(i64),
}

impl std::str::FromStr for TableRef {
    type Err = Error;

    /// Parses "db.table" or a numeric table ID.
    fn from_str(s: &str) -> Result<Self> {
        if let Ok(id) = s.parse() {
            return Ok(Self::ID(id));
        }
        match s.split('.').collect::<Vec<_>>().as_slice() {
            [database, table] if !database.is_empty() && !table.is_empty() => {
                Ok(Self::Name { database: database.to_string(), table: table.to_string() })
            }
            _ => errinput!("invalid table {s:?}, expected database.table or table ID"),
        }
    }
}

impl std::fmt::Display for TableRef {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Name { database, table } => write!(f, "{database}.{table}"),
            Self::ID(id) => write!(f, "{id}"),
        }
    }
}
