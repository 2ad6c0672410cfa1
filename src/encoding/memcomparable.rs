//! Memcomparable is the lexicographical order-preserving binary encoding used
//! by TiDB for keys, and for the primitives of its value encoding. Byte-wise
//! comparison of encoded values matches the logical ordering of the values.
//!
//! u64:     Big-endian binary representation.
//! i64:     Big-endian binary representation, with sign bit flipped.
//! f64:     Big-endian binary representation, with sign bit flipped if +, all
//!          bits flipped if -.
//! Vec<u8>: Groups of 8 bytes, the last group right-padded with 0x00. Each
//!          group is followed by a marker byte 0xff - padding, such that a
//!          full group has marker 0xff and the final group has marker < 0xff.
//!          An input of exactly n*8 bytes gets an extra all-padding group.
//!
//! Values that don't need to be ordered use more compact encodings:
//!
//! varint:  Zigzag-encoded LEB128 (as Go's encoding/binary.PutVarint).
//! uvarint: LEB128.
//! compact bytes: varint length followed by the raw bytes.
//!
//! The take_* functions decode a value from the start of a byte slice and
//! shrink the slice past it, leaving the remaining input.

use crate::error::{Error, Result};
use crate::errvalue;

/// The size of a byte group.
pub const GROUP_SIZE: usize = 8;

/// The marker byte following a full group.
pub const GROUP_MARKER: u8 = 0xff;

/// The sign bit, flipped in i64 encodings.
const SIGN_MASK: u64 = 1 << 63;

/// Encodes a byte slice in 8-byte groups, each followed by a marker byte. See
/// module documentation for details.
pub fn encode_bytes(bytes: &[u8]) -> Vec<u8> {
    let mut encoded = Vec::with_capacity((bytes.len() / GROUP_SIZE + 1) * (GROUP_SIZE + 1));
    // chunks() yields nothing for an empty slice, and no padding group for a
    // multiple of 8, so handle the final group separately.
    let full = bytes.len() / GROUP_SIZE * GROUP_SIZE;
    for group in bytes[..full].chunks(GROUP_SIZE) {
        encoded.extend(group);
        encoded.push(GROUP_MARKER);
    }
    let tail = &bytes[full..];
    let pad = GROUP_SIZE - tail.len();
    encoded.extend(tail);
    encoded.extend(std::iter::repeat_n(0x00, pad));
    encoded.push(GROUP_MARKER - pad as u8);
    encoded
}

/// Decodes and chops off a group-encoded byte slice. Decoding stops after the
/// first group with a marker below 0xff, any remaining input is left as is.
pub fn take_bytes(input: &mut &[u8]) -> Result<Vec<u8>> {
    let mut decoded = Vec::with_capacity(input.len() / (GROUP_SIZE + 1) * GROUP_SIZE);
    loop {
        if input.len() < GROUP_SIZE + 1 {
            return errvalue!("insufficient bytes for byte group, got {:x?}", input);
        }
        let (group, rest) = input.split_at(GROUP_SIZE + 1);
        *input = rest;
        let (marker, group) = (group[GROUP_SIZE], &group[..GROUP_SIZE]);
        if marker == GROUP_MARKER {
            decoded.extend(group);
            continue;
        }
        let pad = (GROUP_MARKER - marker) as usize;
        if pad > GROUP_SIZE {
            return errvalue!("invalid byte group marker {marker:#04x}");
        }
        let (data, padding) = group.split_at(GROUP_SIZE - pad);
        if padding.iter().any(|b| *b != 0x00) {
            return errvalue!("invalid byte group padding {padding:x?}");
        }
        decoded.extend(data);
        return Ok(decoded);
    }
}

/// Encodes an i64 as big-endian with the sign bit flipped, such that negative
/// numbers are ordered before positive numbers.
pub fn encode_int(v: i64) -> [u8; 8] {
    (v as u64 ^ SIGN_MASK).to_be_bytes()
}

/// Decodes and chops off an i64. See encode_int().
pub fn take_int(input: &mut &[u8]) -> Result<i64> {
    Ok((u64::from_be_bytes(take_fixed(input)?) ^ SIGN_MASK) as i64)
}

/// Encodes a u64 as big-endian.
pub fn encode_uint(v: u64) -> [u8; 8] {
    v.to_be_bytes()
}

/// Decodes and chops off a u64. See encode_uint().
pub fn take_uint(input: &mut &[u8]) -> Result<u64> {
    Ok(u64::from_be_bytes(take_fixed(input)?))
}

/// Encodes an f64 in big-endian form, flipping the sign bit of positive
/// numbers and all bits of negative numbers, so that negative numbers order
/// from smallest to greatest before positive ones.
pub fn encode_float(v: f64) -> [u8; 8] {
    let bits = v.to_bits();
    let encoded = match bits & SIGN_MASK {
        0 => bits | SIGN_MASK,
        _ => !bits,
    };
    encoded.to_be_bytes()
}

/// Decodes and chops off an f64. See encode_float().
pub fn take_float(input: &mut &[u8]) -> Result<f64> {
    let bits = u64::from_be_bytes(take_fixed(input)?);
    Ok(f64::from_bits(match bits & SIGN_MASK {
        0 => !bits,
        _ => bits & !SIGN_MASK,
    }))
}

/// Encodes an i64 as a zigzag varint.
pub fn encode_varint(v: i64) -> Vec<u8> {
    encode_uvarint(((v << 1) ^ (v >> 63)) as u64)
}

/// Decodes and chops off a zigzag varint. See encode_varint().
pub fn take_varint(input: &mut &[u8]) -> Result<i64> {
    let u = take_uvarint(input)?;
    Ok((u >> 1) as i64 ^ -((u & 1) as i64))
}

/// Encodes a u64 as a LEB128 varint, 7 bits per byte with the high bit set on
/// all but the last byte.
pub fn encode_uvarint(mut v: u64) -> Vec<u8> {
    let mut encoded = Vec::with_capacity(10);
    while v >= 0x80 {
        encoded.push(v as u8 | 0x80);
        v >>= 7;
    }
    encoded.push(v as u8);
    encoded
}

/// Decodes and chops off a LEB128 varint. See encode_uvarint().
pub fn take_uvarint(input: &mut &[u8]) -> Result<u64> {
    let bytes = *input;
    let mut v = 0u64;
    for (i, byte) in bytes.iter().enumerate() {
        // A u64 takes at most 10 bytes, and the 10th can only hold 1 bit.
        if i == 9 && *byte > 1 {
            return errvalue!("varint overflows u64");
        }
        v |= ((byte & 0x7f) as u64) << (7 * i);
        if byte & 0x80 == 0 {
            *input = &bytes[i + 1..];
            return Ok(v);
        }
    }
    errvalue!("insufficient bytes for varint, got {bytes:x?}")
}

/// Decodes and chops off compact bytes: a varint length and the raw bytes.
pub fn take_compact_bytes(input: &mut &[u8]) -> Result<Vec<u8>> {
    let len = take_varint(input)?;
    let len = usize::try_from(len)
        .map_err(|_| Error::InvalidEncodedValue(format!("negative length {len}")))?;
    Ok(take_slice(input, len)?.to_vec())
}

/// Chops off and returns a single byte.
pub fn take_byte(input: &mut &[u8]) -> Result<u8> {
    Ok(take_slice(input, 1)?[0])
}

/// Chops off and returns the next N bytes as an array.
pub fn take_fixed<const N: usize>(input: &mut &[u8]) -> Result<[u8; N]> {
    let mut bytes = [0; N];
    bytes.copy_from_slice(take_slice(input, N)?);
    Ok(bytes)
}

/// Chops off and returns the next len bytes, or errors if there aren't enough
/// bytes left.
pub fn take_slice<'a>(input: &mut &'a [u8], len: usize) -> Result<&'a [u8]> {
    if input.len() < len {
        return errvalue!("insufficient bytes, expected {len} bytes for {:x?}", input);
    }
    let (bytes, rest) = input.split_at(len);
    *input = rest;
    Ok(bytes)
}
