//! Decodes user-supplied keys, trying a fixed sequence of strategies until one
//! succeeds. Keys are given either as escaped text, as printed in TiDB and
//! TiKV logs, or base64-encoded, as returned by the TiDB HTTP API.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use crate::encoding::escape::unescape;
use crate::error::{Error, Result};
use crate::tablecodec::{
    IndexValue, TableIndexKey, TableRowKey, decode_index_key, decode_index_values, decode_row_key,
};

/// A decoded key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum DecodedKey {
    TableRow(TableRowKey),
    TableIndex(TableIndexKey),
    /// A bare list of index values, without key framing.
    IndexValues(Vec<IndexValue>),
}

/// A key decoding strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// Escaped text as a row key.
    EscapedRow,
    /// Escaped text as an index key.
    EscapedIndex,
    /// Base64 as a row key.
    Base64Row,
    /// Base64 as an index key.
    Base64Index,
    /// Base64 as a list of index values. Fails if no values decode, rather
    /// than yielding an empty list.
    Base64Values,
}

impl Strategy {
    /// All strategies, in the order they're tried.
    pub const ALL: [Strategy; 5] = [
        Strategy::EscapedRow,
        Strategy::EscapedIndex,
        Strategy::Base64Row,
        Strategy::Base64Index,
        Strategy::Base64Values,
    ];

    /// Decodes the key text using this strategy.
    pub fn decode(&self, text: &str) -> Result<DecodedKey> {
        let raw = match self {
            Self::EscapedRow | Self::EscapedIndex => unescape(text.as_bytes())?,
            Self::Base64Row | Self::Base64Index | Self::Base64Values => BASE64.decode(text)?,
        };
        Ok(match self {
            Self::EscapedRow | Self::Base64Row => DecodedKey::TableRow(decode_row_key(&raw)?),
            Self::EscapedIndex | Self::Base64Index => DecodedKey::TableIndex(decode_index_key(&raw)?),
            Self::Base64Values => match decode_index_values(&raw) {
                values if values.is_empty() => {
                    return Err(Error::UnrecognizedKeyFormat("no index values".into()));
                }
                values => DecodedKey::IndexValues(values),
            },
        })
    }
}

/// Decodes a key, trying each strategy in order. Errors with the last
/// strategy's error if all of them fail.
pub fn decode_key(text: &str) -> Result<DecodedKey> {
    let mut error = Error::UnrecognizedKeyFormat(format!("{text:?}"));
    for strategy in Strategy::ALL {
        match strategy.decode(text) {
            Ok(key) => {
                log::debug!("decoded key using {strategy:?}");
                return Ok(key);
            }
            Err(err) => {
                log::debug!("{strategy:?} failed to decode key: {err}");
                error = err;
            }
        }
    }
    Err(error)
}
