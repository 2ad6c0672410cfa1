//! TiDB's binary JSON format, little-endian throughout:
//!
//! * Object: count u32, size u32, count key entries (offset u32, length u16),
//!   count value entries (type u8, offset u32), then the keys and values.
//! * Array: count u32, size u32, count value entries, then the values.
//! * Literal: a single byte, 0 for null, 1 for true and 2 for false. Inlined
//!   into the value entry offset when nested.
//! * Int64, Uint64, Float64: 8 bytes.
//! * String: a uvarint length and the UTF-8 bytes.
//!
//! Offsets are relative to the start of the enclosing object or array. JSON
//! values are rendered as text the way MySQL prints them.

use crate::encoding::memcomparable::{take_byte, take_slice, take_uvarint};
use crate::error::{Error, Result};
use crate::{errdata, errvalue};

use serde::{Deserialize, Serialize};

const TYPE_OBJECT: u8 = 0x01;
const TYPE_ARRAY: u8 = 0x03;
const TYPE_LITERAL: u8 = 0x04;
const TYPE_INT64: u8 = 0x09;
const TYPE_UINT64: u8 = 0x0a;
const TYPE_FLOAT64: u8 = 0x0b;
const TYPE_STRING: u8 = 0x0c;

const LITERAL_NULL: u8 = 0x00;
const LITERAL_TRUE: u8 = 0x01;
const LITERAL_FALSE: u8 = 0x02;

/// Size of an object or array header.
const HEADER_SIZE: usize = 8;
/// Size of an object key entry.
const KEY_ENTRY_SIZE: usize = 6;
/// Size of a value entry.
const VALUE_ENTRY_SIZE: usize = 5;
/// Maximum nesting depth of objects and arrays, as in MySQL.
const MAX_DEPTH: usize = 100;

/// A binary JSON document: its type code and encoded value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Json {
    pub type_code: u8,
    pub value: Vec<u8>,
}

impl Json {
    /// Decodes a JSON document, peeking at its header to find its size, and
    /// advances the input.
    pub fn take(input: &mut &[u8]) -> Result<Self> {
        let type_code = take_byte(input)?;
        let size = match type_code {
            TYPE_OBJECT | TYPE_ARRAY => {
                let Some(size) = input.get(4..HEADER_SIZE) else {
                    return errvalue!("truncated JSON container header {input:x?}");
                };
                u32::from_le_bytes([size[0], size[1], size[2], size[3]]) as usize
            }
            TYPE_LITERAL => 1,
            TYPE_INT64 | TYPE_UINT64 | TYPE_FLOAT64 => 8,
            TYPE_STRING => {
                let mut peek = *input;
                take_string(&mut peek)?;
                input.len() - peek.len()
            }
            tp => return errvalue!("unknown JSON type code {tp:#04x}"),
        };
        let value = take_slice(input, size)?.to_vec();
        Ok(Self { type_code, value })
    }

    /// Renders the document as JSON text, e.g. {"a": 1, "b": [true, "x"]}.
    pub fn to_text(&self) -> Result<String> {
        let mut output = String::new();
        write_value(self.type_code, &self.value, 1, &mut output)?;
        Ok(output)
    }
}

/// Chops off a string value: a uvarint length and the string bytes.
fn take_string<'a>(input: &mut &'a [u8]) -> Result<&'a [u8]> {
    let len = take_uvarint(input)?;
    let Ok(len) = usize::try_from(len) else {
        return errvalue!("JSON string length {len} out of range");
    };
    take_slice(input, len)
}

/// Renders a value of the given type, encoded at the start of data. Containers
/// are nested depth levels deep, counting from 1.
fn write_value(type_code: u8, data: &[u8], depth: usize, output: &mut String) -> Result<()> {
    if matches!(type_code, TYPE_OBJECT | TYPE_ARRAY) && depth > MAX_DEPTH {
        return errdata!("JSON nested deeper than {MAX_DEPTH} levels");
    }
    match type_code {
        TYPE_OBJECT => write_object(container_at(data)?, depth, output)?,
        TYPE_ARRAY => write_array(container_at(data)?, depth, output)?,
        TYPE_LITERAL => match data.first() {
            Some(&LITERAL_NULL) => output.push_str("null"),
            Some(&LITERAL_TRUE) => output.push_str("true"),
            Some(&LITERAL_FALSE) => output.push_str("false"),
            literal => return errdata!("invalid JSON literal {literal:?}"),
        },
        TYPE_INT64 => output.push_str(&i64::from_le_bytes(read_array(data, 0)?).to_string()),
        TYPE_UINT64 => output.push_str(&u64::from_le_bytes(read_array(data, 0)?).to_string()),
        TYPE_FLOAT64 => output.push_str(&f64::from_le_bytes(read_array(data, 0)?).to_string()),
        TYPE_STRING => write_string(take_string(&mut &data[..])?, output)?,
        tp => return errdata!("unknown JSON type code {tp:#04x}"),
    }
    Ok(())
}

/// Returns the object or array at the start of data, cut to its declared size.
fn container_at(data: &[u8]) -> Result<&[u8]> {
    let size = u32::from_le_bytes(read_array(data, 4)?) as usize;
    match data.get(..size) {
        Some(container) if size >= HEADER_SIZE => Ok(container),
        _ => errdata!("invalid JSON container size {size} for {} bytes", data.len()),
    }
}

fn write_object(data: &[u8], depth: usize, output: &mut String) -> Result<()> {
    let count = u32::from_le_bytes(read_array(data, 0)?) as usize;
    let values_start = HEADER_SIZE + count * KEY_ENTRY_SIZE;
    let data_start = values_start + count * VALUE_ENTRY_SIZE;
    output.push('{');
    for i in 0..count {
        if i > 0 {
            output.push_str(", ");
        }
        let entry = HEADER_SIZE + i * KEY_ENTRY_SIZE;
        let offset = u32::from_le_bytes(read_array(data, entry)?) as usize;
        let len = u16::from_le_bytes(read_array(data, entry + 4)?) as usize;
        let key = match data.get(offset..offset + len) {
            Some(key) if offset >= data_start => key,
            _ => return errdata!("JSON key at {offset} out of bounds"),
        };
        write_string(key, output)?;
        output.push_str(": ");
        write_entry(data, values_start + i * VALUE_ENTRY_SIZE, data_start, depth, output)?;
    }
    output.push('}');
    Ok(())
}

fn write_array(data: &[u8], depth: usize, output: &mut String) -> Result<()> {
    let count = u32::from_le_bytes(read_array(data, 0)?) as usize;
    let data_start = HEADER_SIZE + count * VALUE_ENTRY_SIZE;
    output.push('[');
    for i in 0..count {
        if i > 0 {
            output.push_str(", ");
        }
        write_entry(data, HEADER_SIZE + i * VALUE_ENTRY_SIZE, data_start, depth, output)?;
    }
    output.push(']');
    Ok(())
}

/// Renders the value referenced by the value entry at the given position of
/// an object or array. Values must lie after the container's entry tables,
/// i.e. at or beyond data_start.
fn write_entry(
    container: &[u8],
    entry: usize,
    data_start: usize,
    depth: usize,
    output: &mut String,
) -> Result<()> {
    let [type_code] = read_array(container, entry)?;
    let offset: [u8; 4] = read_array(container, entry + 1)?;
    if type_code == TYPE_LITERAL {
        return write_value(type_code, &offset[..1], depth + 1, output);
    }
    let offset = u32::from_le_bytes(offset) as usize;
    if offset < data_start || offset >= container.len() {
        return errdata!("JSON value at {offset} out of bounds");
    }
    write_value(type_code, &container[offset..], depth + 1, output)
}

/// Renders a quoted and escaped JSON string.
fn write_string(bytes: &[u8], output: &mut String) -> Result<()> {
    let string = std::str::from_utf8(bytes)
        .map_err(|err| Error::InvalidData(format!("invalid UTF-8 in JSON string: {err}")))?;
    output.push_str(&serde_json::to_string(string)?);
    Ok(())
}

/// Reads N bytes at the given position.
fn read_array<const N: usize>(data: &[u8], at: usize) -> Result<[u8; N]> {
    data.get(at..at + N)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or_else(|| Error::InvalidData(format!("truncated JSON value at {at}")))
}
