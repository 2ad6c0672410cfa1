//! Decoded TiDB values and table schemas.

mod datum;
mod decimal;
mod json;
pub mod schema;
mod time;

pub use datum::{Datum, Enum, Kind, Set};
pub use decimal::Decimal;
pub use json::Json;
pub use schema::{CIStr, Column, FieldType, Index, Table, TableRef};
pub use time::{Duration, MAX_FSP, Time, TimeType};
