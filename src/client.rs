use std::path::PathBuf;
use std::time::Duration;

use reqwest::StatusCode;

use crate::error::{Error, Result};
use crate::types::{Table, TableRef};

/// Looks up table schemas.
pub trait SchemaSource {
    /// Fetches the schema of the given table.
    fn table(&self, table: &TableRef) -> Result<Table>;
}

/// A TiDB status API client.
pub struct Client {
    base_url: String,
    http: reqwest::blocking::Client,
}

impl Client {
    /// Request timeout.
    const TIMEOUT: Duration = Duration::from_secs(30);

    /// Creates a new client for the TiDB status API at the given address.
    pub fn new(host: &str, port: u16) -> Result<Self> {
        let http = reqwest::blocking::Client::builder().timeout(Self::TIMEOUT).build()?;
        Ok(Self { base_url: format!("http://{host}:{port}"), http })
    }

    /// Returns the schema URL of a table.
    pub fn schema_url(&self, table: &TableRef) -> String {
        match table {
            TableRef::Name { database, table } => {
                format!("{}/schema/{database}/{table}", self.base_url)
            }
            TableRef::ID(id) => format!("{}/schema?table_id={id}", self.base_url),
        }
    }

    /// Fetches the body of a URL, erroring on non-200 responses.
    fn get(&self, url: &str) -> Result<Vec<u8>> {
        log::debug!("GET {url}");
        let response = self.http.get(url).send()?;
        let status = response.status();
        let body = response.bytes()?;
        log::debug!("GET {url} returned {status} with {} bytes", body.len());
        if status != StatusCode::OK {
            return Err(Error::SchemaLookupFailed(format!(
                "{url} returned {status}: {}",
                String::from_utf8_lossy(&body).trim()
            )));
        }
        Ok(body.to_vec())
    }
}

impl SchemaSource for Client {
    fn table(&self, table: &TableRef) -> Result<Table> {
        let body = self.get(&self.schema_url(table))?;
        Table::from_json(&body)
            .map_err(|err| Error::SchemaLookupFailed(format!("invalid schema for {table}: {err}")))
    }
}

/// A table schema read from a JSON file, in the TiDB status API format.
pub struct SchemaFile {
    path: PathBuf,
}

impl SchemaFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SchemaSource for SchemaFile {
    /// Reads the schema file, and checks that it is for the given table.
    fn table(&self, table: &TableRef) -> Result<Table> {
        log::debug!("reading schema from {}", self.path.display());
        let schema = Table::from_json(&std::fs::read(&self.path)?)?;
        let matches = match table {
            TableRef::ID(id) => schema.id == *id,
            TableRef::Name { table, .. } => schema.name.to_string() == table.to_lowercase(),
        };
        if !matches {
            return Err(Error::SchemaLookupFailed(format!(
                "{} contains table {} ({}), not {table}",
                self.path.display(),
                schema.name,
                schema.id
            )));
        }
        Ok(schema)
    }
}
