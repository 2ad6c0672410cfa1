#![warn(clippy::all)]

#[cfg(test)]
#[macro_use]
extern crate pretty_assertions;

pub mod client;
pub mod decoder;
pub mod encoding;
pub mod error;
pub mod tablecodec;
pub mod types;

pub use client::{Client, SchemaFile, SchemaSource};
pub use decoder::{DecodedKey, decode_key};
