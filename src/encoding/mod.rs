//! Binary data encodings used by TiDB and TiKV.
//!
//! * escape: C-style escaped text, as keys appear in logs.
//! * memcomparable: order-preserving encodings of bytes and numbers.
//! * codec: flag-prefixed datums, built on memcomparable.
//! * format: text output of decoded data.

pub mod codec;
pub mod escape;
pub mod format;
pub mod memcomparable;
