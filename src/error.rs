use serde::{Deserialize, Serialize};

/// tidbctl errors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Error {
    /// A textual key ended in the middle of an escape sequence.
    UnterminatedEscape(String),
    /// The digits of a \x or octal escape sequence are not valid hex/octal.
    MalformedEscapeDigits(String),
    /// An encoded value has an unknown type flag or a truncated payload.
    InvalidEncodedValue(String),
    /// A raw key does not match any known table key layout.
    UnrecognizedKeyFormat(String),
    /// The row payload to decode is empty.
    EmptyPayload,
    /// The row payload did not contain any row data.
    NoRowData,
    /// The schema source failed to look up a table.
    SchemaLookupFailed(String),
    /// Invalid data, typically decoded values that don't fit their type.
    InvalidData(String),
    /// Invalid user input, typically CLI arguments or configuration.
    InvalidInput(String),
    /// An IO error.
    IO(String),
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::UnterminatedEscape(msg) => write!(f, "unterminated escape: {msg}"),
            Error::MalformedEscapeDigits(msg) => write!(f, "malformed escape digits: {msg}"),
            Error::InvalidEncodedValue(msg) => write!(f, "invalid encoded value: {msg}"),
            Error::UnrecognizedKeyFormat(msg) => write!(f, "unrecognized key format: {msg}"),
            Error::EmptyPayload => write!(f, "no data to decode"),
            Error::NoRowData => write!(f, "payload contains no row data"),
            Error::SchemaLookupFailed(msg) => write!(f, "schema lookup failed: {msg}"),
            Error::InvalidData(msg) => write!(f, "invalid data: {msg}"),
            Error::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            Error::IO(msg) => write!(f, "io error: {msg}"),
        }
    }
}

/// Constructs an Error::InvalidData for the given format string.
#[macro_export]
macro_rules! errdata {
    ($($args:tt)*) => { $crate::error::Error::InvalidData(format!($($args)*)).into() };
}

/// Constructs an Error::InvalidInput for the given format string.
#[macro_export]
macro_rules! errinput {
    ($($args:tt)*) => { $crate::error::Error::InvalidInput(format!($($args)*)).into() };
}

/// Constructs an Error::InvalidEncodedValue for the given format string.
#[macro_export]
macro_rules! errvalue {
    ($($args:tt)*) => { $crate::error::Error::InvalidEncodedValue(format!($($args)*)).into() };
}

/// A tidbctl Result returning Error.
pub type Result<T> = std::result::Result<T, Error>;

impl<T> From<Error> for Result<T> {
    fn from(error: Error) -> Self {
        Err(error)
    }
}

impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Self {
        Error::InvalidInput(format!("invalid base64: {err}"))
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::InvalidInput(err.to_string())
    }
}

impl From<log::ParseLevelError> for Error {
    fn from(err: log::ParseLevelError) -> Self {
        Error::InvalidInput(err.to_string())
    }
}

impl From<log::SetLoggerError> for Error {
    fn from(err: log::SetLoggerError) -> Self {
        Error::IO(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::SchemaLookupFailed(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidData(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IO(err.to_string())
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Error::InvalidData(err.to_string())
    }
}
