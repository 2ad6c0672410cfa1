use super::schema::{FieldType, mysql};
use super::{Decimal, Duration, Json, Time, TimeType};
use crate::errdata;
use crate::error::Result;

use itertools::Itertools as _;
use serde::{Deserialize, Serialize};

/// A datum type tag. The numeric values and names are stable, and match
/// TiDB's datum kinds, e.g. for presentation of decoded index values.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Kind {
    Null = 0,
    Int64 = 1,
    Uint64 = 2,
    Float32 = 3,
    Float64 = 4,
    String = 5,
    Bytes = 6,
    BinaryLiteral = 7,
    Decimal = 8,
    Duration = 9,
    Enum = 10,
    Bit = 11,
    Set = 12,
    Time = 13,
    Interface = 14,
    MinNotNull = 15,
    MaxValue = 16,
    Raw = 17,
    Json = 18,
}

impl Kind {
    /// Returns the presentation name of the type tag.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Int64 => "bigint",
            Self::Uint64 => "unsigned bigint",
            Self::Float32 => "float",
            Self::Float64 => "double",
            Self::String => "char",
            Self::Bytes => "bytes",
            Self::BinaryLiteral => "bit/hex literal",
            Self::Decimal => "decimal",
            Self::Duration => "time",
            Self::Enum => "enum",
            Self::Bit => "bit",
            Self::Set => "set",
            Self::Time => "datetime",
            Self::Interface => "interface",
            Self::MinNotNull => "min_not_null",
            Self::MaxValue => "max_value",
            Self::Raw => "raw",
            Self::Json => "json",
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// An enum value: the element name and its 1-based index.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Enum {
    pub name: String,
    pub value: u64,
}

/// A set value: the comma-separated element names and their bitmask.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Set {
    pub name: String,
    pub value: u64,
}

/// A decoded scalar value, tagged by its kind.
///
/// Decoding the wire encoding only yields null, integers, doubles, bytes,
/// decimals, durations, JSON and the range sentinels. The remaining kinds are
/// produced by unflatten(), which reinterprets a datum according to the
/// declared column type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Datum {
    Null,
    Int64(i64),
    Uint64(u64),
    Float32(f32),
    Float64(f64),
    /// A character string. Not necessarily valid UTF-8.
    String(Vec<u8>),
    Bytes(Vec<u8>),
    BinaryLiteral(Vec<u8>),
    Decimal(Decimal),
    Duration(Duration),
    Enum(Enum),
    Bit(Vec<u8>),
    Set(Set),
    Time(Time),
    Json(Json),
    /// Sorts before all non-null values, used for range boundaries.
    MinNotNull,
    /// Sorts after all values, used for range boundaries.
    MaxValue,
}

impl Datum {
    /// Returns the datum's type tag.
    pub fn kind(&self) -> Kind {
        match self {
            Self::Null => Kind::Null,
            Self::Int64(_) => Kind::Int64,
            Self::Uint64(_) => Kind::Uint64,
            Self::Float32(_) => Kind::Float32,
            Self::Float64(_) => Kind::Float64,
            Self::String(_) => Kind::String,
            Self::Bytes(_) => Kind::Bytes,
            Self::BinaryLiteral(_) => Kind::BinaryLiteral,
            Self::Decimal(_) => Kind::Decimal,
            Self::Duration(_) => Kind::Duration,
            Self::Enum(_) => Kind::Enum,
            Self::Bit(_) => Kind::Bit,
            Self::Set(_) => Kind::Set,
            Self::Time(_) => Kind::Time,
            Self::Json(_) => Kind::Json,
            Self::MinNotNull => Kind::MinNotNull,
            Self::MaxValue => Kind::MaxValue,
        }
    }

    /// Returns true if the datum is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Converts the datum to its canonical string form. Fails if a string or
    /// byte value isn't valid UTF-8, or if a JSON document is malformed. Bit
    /// values and binary literals are shown as hex, e.g. 0x4142.
    pub fn to_text(&self) -> Result<String> {
        Ok(match self {
            Self::Null => "NULL".to_string(),
            Self::Int64(v) => v.to_string(),
            Self::Uint64(v) => v.to_string(),
            Self::Float32(v) => v.to_string(),
            Self::Float64(v) => v.to_string(),
            Self::String(b) | Self::Bytes(b) => String::from_utf8(b.clone())?,
            Self::BinaryLiteral(b) | Self::Bit(b) => format!("0x{}", hex::encode(b)),
            Self::Decimal(d) => d.to_string(),
            Self::Duration(d) => d.to_string(),
            Self::Enum(e) => e.name.clone(),
            Self::Set(s) => s.name.clone(),
            Self::Time(t) => t.to_string(),
            Self::Json(j) => j.to_text()?,
            Self::MinNotNull => "-inf".to_string(),
            Self::MaxValue => "+inf".to_string(),
        })
    }

    /// Reinterprets a decoded datum according to the column's declared type,
    /// e.g. turning a packed u64 into a datetime or an index into an enum
    /// element. Nulls and types without a special representation are
    /// returned unchanged.
    pub fn unflatten(self, field_type: &FieldType) -> Result<Datum> {
        if self.is_null() {
            return Ok(self);
        }
        Ok(match field_type.tp {
            mysql::TYPE_FLOAT => Self::Float32(self.as_f64()? as f32),
            mysql::TYPE_VARCHAR | mysql::TYPE_STRING | mysql::TYPE_VAR_STRING => {
                Self::String(self.into_bytes()?)
            }
            mysql::TYPE_DATE | mysql::TYPE_DATETIME | mysql::TYPE_TIMESTAMP => {
                let tp = match field_type.tp {
                    mysql::TYPE_DATE => TimeType::Date,
                    mysql::TYPE_DATETIME => TimeType::Datetime,
                    _ => TimeType::Timestamp,
                };
                Self::Time(Time::from_packed(self.as_u64()?, tp, field_type.fsp())?)
            }
            mysql::TYPE_DURATION => Self::Duration(Duration::new(self.as_i64()?, field_type.fsp())),
            mysql::TYPE_ENUM => {
                let value = self.as_u64()?;
                let elems = field_type.elems();
                match value.checked_sub(1).and_then(|i| elems.get(i as usize)) {
                    Some(name) => Self::Enum(Enum { name: name.clone(), value }),
                    None => {
                        // Tolerated, and read as the empty enum value.
                        log::warn!("enum value {value} out of range for {} elements", elems.len());
                        Self::Enum(Enum { name: String::new(), value: 0 })
                    }
                }
            }
            mysql::TYPE_SET => {
                let value = self.as_u64()?;
                let elems = field_type.elems();
                if elems.len() < 64 && value >> elems.len() != 0 {
                    return errdata!("set value {value:#b} out of range for {} elements", elems.len());
                }
                let name = elems
                    .iter()
                    .take(64)
                    .enumerate()
                    .filter(|(i, _)| value & (1u64 << i) != 0)
                    .map(|(_, name)| name)
                    .join(",");
                Self::Set(Set { name, value })
            }
            mysql::TYPE_BIT => {
                let bytes = self.as_u64()?.to_be_bytes();
                let size = (field_type.flen + 7) >> 3;
                Self::Bit(match size {
                    1..=8 => bytes[8 - size as usize..].to_vec(),
                    _ => bytes.iter().copied().skip_while(|b| *b == 0).collect(),
                })
            }
            _ => self,
        })
    }

    /// Returns the datum as an f64, if it is a float.
    fn as_f64(&self) -> Result<f64> {
        match self {
            Self::Float64(v) => Ok(*v),
            Self::Float32(v) => Ok(*v as f64),
            datum => errdata!("expected float, got {datum:?}"),
        }
    }

    /// Returns the datum as an i64, if it is an integer. Unsigned integers are
    /// reinterpreted.
    fn as_i64(&self) -> Result<i64> {
        match self {
            Self::Int64(v) => Ok(*v),
            Self::Uint64(v) => Ok(*v as i64),
            datum => errdata!("expected integer, got {datum:?}"),
        }
    }

    /// Returns the datum as a u64, if it is an integer. Signed integers are
    /// reinterpreted.
    fn as_u64(&self) -> Result<u64> {
        match self {
            Self::Uint64(v) => Ok(*v),
            Self::Int64(v) => Ok(*v as u64),
            datum => errdata!("expected integer, got {datum:?}"),
        }
    }

    /// Returns the datum's bytes, if it is a string or byte value.
    fn into_bytes(self) -> Result<Vec<u8>> {
        match self {
            Self::String(b) | Self::Bytes(b) => Ok(b),
            datum => errdata!("expected bytes, got {datum:?}"),
        }
    }
}
