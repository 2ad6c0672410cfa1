//! Flag-prefixed datum encoding, used for index key values and row values.
//!
//! Each datum is a type flag byte followed by the flag's payload, using the
//! memcomparable encodings for keys (bytes, int, uint, float) and compact
//! encodings for row values (compact bytes, varint, uvarint).

use super::memcomparable::{
    take_byte, take_bytes, take_compact_bytes, take_float, take_int, take_uint, take_uvarint,
    take_varint,
};
use crate::errvalue;
use crate::error::Result;
use crate::types::{Datum, Decimal, Duration, Json, MAX_FSP};

pub const NIL_FLAG: u8 = 0;
pub const BYTES_FLAG: u8 = 1;
pub const COMPACT_BYTES_FLAG: u8 = 2;
pub const INT_FLAG: u8 = 3;
pub const UINT_FLAG: u8 = 4;
pub const FLOAT_FLAG: u8 = 5;
pub const DECIMAL_FLAG: u8 = 6;
pub const DURATION_FLAG: u8 = 7;
pub const VARINT_FLAG: u8 = 8;
pub const UVARINT_FLAG: u8 = 9;
pub const JSON_FLAG: u8 = 10;
pub const MAX_FLAG: u8 = 250;

/// Decodes and chops off a single flag-prefixed datum.
pub fn take_datum(input: &mut &[u8]) -> Result<Datum> {
    let flag = take_byte(input)?;
    Ok(match flag {
        NIL_FLAG => Datum::Null,
        // A bare bytes flag is the lowest non-null value.
        BYTES_FLAG if input.is_empty() => Datum::MinNotNull,
        BYTES_FLAG => Datum::Bytes(take_bytes(input)?),
        COMPACT_BYTES_FLAG => Datum::Bytes(take_compact_bytes(input)?),
        INT_FLAG => Datum::Int64(take_int(input)?),
        UINT_FLAG => Datum::Uint64(take_uint(input)?),
        FLOAT_FLAG => Datum::Float64(take_float(input)?),
        DECIMAL_FLAG => Datum::Decimal(Decimal::take(input)?),
        DURATION_FLAG => Datum::Duration(Duration::new(take_int(input)?, MAX_FSP)),
        VARINT_FLAG => Datum::Int64(take_varint(input)?),
        UVARINT_FLAG => Datum::Uint64(take_uvarint(input)?),
        JSON_FLAG => Datum::Json(Json::take(input)?),
        MAX_FLAG => Datum::MaxValue,
        flag => return errvalue!("invalid encoded value flag {flag}"),
    })
}

/// Decodes a single datum, which must span the entire input.
pub fn decode_datum(mut input: &[u8]) -> Result<Datum> {
    let datum = take_datum(&mut input)?;
    if !input.is_empty() {
        return errvalue!("unexpected trailing bytes {input:x?}");
    }
    Ok(datum)
}

/// Decodes consecutive datums until the input is exhausted or a datum fails
/// to decode. Any undecodable tail is ignored, e.g. a truncated value or a
/// key suffix appended after the encoded values.
pub fn decode_datums(mut input: &[u8]) -> Vec<Datum> {
    let mut datums = Vec::new();
    while !input.is_empty() {
        match take_datum(&mut input) {
            Ok(datum) => datums.push(datum),
            Err(err) => {
                log::debug!("ignoring undecodable tail {input:x?}: {err}");
                break;
            }
        }
    }
    datums
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use test_case::test_case;

    #[test_case("00" => Datum::Null; "nil")]
    #[test_case("01" => Datum::MinNotNull; "min not null")]
    #[test_case("016162630000000000fa" => Datum::Bytes(b"abc".to_vec()); "bytes")]
    #[test_case("0206616263" => Datum::Bytes(b"abc".to_vec()); "compact bytes")]
    #[test_case("038000000000000002" => Datum::Int64(2); "int")]
    #[test_case("037ffffffffffffffe" => Datum::Int64(-2); "negative int")]
    #[test_case("04ffffffffffffffff" => Datum::Uint64(u64::MAX); "uint")]
    #[test_case("05bff8000000000000" => Datum::Float64(1.5); "float")]
    #[test_case("053ffdffffffffffff" => Datum::Float64(-2.25); "negative float")]
    #[test_case("08d804" => Datum::Int64(300); "varint")]
    #[test_case("0803" => Datum::Int64(-2); "negative varint")]
    #[test_case("09ac02" => Datum::Uint64(300); "uvarint")]
    #[test_case("fa" => Datum::MaxValue; "max")]
    fn decode(hex: &str) -> Datum {
        decode_datum(&hex::decode(hex).expect("invalid hex")).expect("decode failed")
    }

    #[test_case("060a02800004d238" => "1234.56"; "decimal")]
    #[test_case("0780000362f1e51300" => "01:02:03.500000"; "duration")]
    #[test_case("077ffffc9d0e1aed00" => "-01:02:03.500000"; "negative duration")]
    #[test_case("0a01020000003c0000001e00000001001f00000001000920000000032800000061620100000000000000020000001400000004010000000c120000000178" => r#"{"a": 1, "b": [true, "x"]}"#; "json")]
    fn decode_text(hex: &str) -> String {
        let datum = decode_datum(&hex::decode(hex).expect("invalid hex")).expect("decode failed");
        datum.to_text().expect("to_text failed")
    }

    #[test_case(""; "empty")]
    #[test_case("0b"; "unknown flag")]
    #[test_case("03800000"; "truncated int")]
    #[test_case("016162"; "truncated bytes")]
    #[test_case("0380000000000000020a"; "trailing bytes")]
    fn decode_error(hex: &str) {
        let result = decode_datum(&hex::decode(hex).expect("invalid hex"));
        assert!(matches!(result, Err(Error::InvalidEncodedValue(_))), "{result:?}");
    }

    #[test]
    fn datums() {
        let bytes = hex::decode("08040206616263").expect("invalid hex");
        assert_eq!(decode_datums(&bytes), vec![Datum::Int64(2), Datum::Bytes(b"abc".to_vec())]);
    }

    /// Decoding stops silently at the first undecodable datum.
    #[test]
    fn datums_tail() {
        let bytes = hex::decode("03800000000000000203800000000000000203800000").expect("invalid hex");
        assert_eq!(decode_datums(&bytes), vec![Datum::Int64(2), Datum::Int64(2)]);
        assert_eq!(decode_datums(&[0x0b, 0x00]), vec![]);
        assert_eq!(decode_datums(&[]), vec![]);
    }
}
