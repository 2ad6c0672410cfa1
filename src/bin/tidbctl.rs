//! tidbctl is a diagnostic client for TiDB. It decodes raw storage keys and
//! row values, as found in logs and the TiDB HTTP API, and shows key ranges.
//! Table schemas are fetched from the TiDB status API, or read from a file.

#![warn(clippy::all)]

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use clap::Parser as _;
use serde::Deserialize;
use simplelog::{ColorChoice, LevelFilter, TerminalMode};

use tidbctl::encoding::format::{Raw, Text};
use tidbctl::error::Result;
use tidbctl::tablecodec::keyrange::{GlobalRanges, TableRanges};
use tidbctl::tablecodec::row::decode_row;
use tidbctl::types::TableRef;
use tidbctl::{Client, SchemaFile, SchemaSource, decode_key, errinput};

fn main() {
    if let Err(error) = Command::parse().run() {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

/// The tidbctl command.
#[derive(clap::Parser)]
#[command(about = "A diagnostic client for TiDB.", version, propagate_version = true)]
struct Command {
    #[command(subcommand)]
    subcommand: Subcommand,
    /// Configuration file path.
    #[arg(short = 'c', long, global = true, default_value = "tidbctl.yaml")]
    config: String,
    /// TiDB server host.
    #[arg(long, global = true)]
    host: Option<String>,
    /// TiDB server status port.
    #[arg(long, global = true)]
    port: Option<u16>,
    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(clap::Subcommand)]
enum Subcommand {
    /// Decodes a key: a table row key (t{id}_r{id}), a table index key
    /// (t{id}_i{id}{values}), or base64-encoded index values. Keys are given as
    /// escaped text or base64.
    Decoder { key: String },
    /// Decodes a base64 value to hex and uint64. Given a table (db.table or
    /// table ID) as well, decodes it as a row value of the table.
    #[command(name = "base64decode")]
    Base64Decode {
        /// [table] value
        #[arg(num_args = 1..=2, required = true, value_names = ["TABLE", "VALUE"])]
        args: Vec<String>,
        /// Read the table schema from a JSON file instead of the TiDB server.
        #[arg(long)]
        schema: Option<String>,
    },
    /// Decodes a base64-encoded row value of a table (db.table or table ID).
    #[command(name = "decode-table", alias = "decodeTable")]
    DecodeTable {
        table: String,
        value: String,
        /// Read the table schema from a JSON file instead of the TiDB server.
        #[arg(long)]
        schema: Option<String>,
    },
    /// Shows the global key ranges, and a table's key ranges if given.
    Keyrange {
        /// Memcomparable-encode keys, as stored in TiKV.
        #[arg(short, long)]
        encode: bool,
        /// Database name.
        #[arg(short, long)]
        database: Option<String>,
        /// Table name.
        #[arg(short, long)]
        table: Option<String>,
    },
}

impl Command {
    /// Runs the command.
    fn run(self) -> Result<()> {
        let mut cfg = Config::load(&self.config)?;
        if let Some(host) = self.host {
            cfg.host = host;
        }
        if let Some(port) = self.port {
            cfg.port = port;
        }

        let loglevel = match self.verbose {
            true => LevelFilter::Debug,
            false => cfg.log_level.parse()?,
        };
        let mut logconfig = simplelog::ConfigBuilder::new();
        if loglevel != LevelFilter::Debug {
            logconfig.add_filter_allow_str("tidbctl");
        }
        simplelog::TermLogger::init(
            loglevel,
            logconfig.build(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        )?;

        match self.subcommand {
            Subcommand::Decoder { key } => print!("{}", Text::key(&decode_key(&key)?)),
            Subcommand::Base64Decode { args, schema } => match args.as_slice() {
                [value] => print!("{}", Raw::payload(&BASE64.decode(value)?)),
                [table, value] => Self::decode_table(&cfg, table, value, schema)?,
                _ => return errinput!("expected [table] value"),
            },
            Subcommand::DecodeTable { table, value, schema } => {
                Self::decode_table(&cfg, &table, &value, schema)?
            }
            Subcommand::Keyrange { encode, database, table } => {
                print!("{}", Text::global_ranges(&GlobalRanges::new(), encode));
                let (Some(database), Some(table)) = (database, table) else {
                    return Ok(());
                };
                let client = Client::new(&cfg.host, cfg.port)?;
                let tableref = TableRef::Name { database, table: table.clone() };
                let schema = client.table(&tableref)?;
                let ranges = TableRanges::new(schema.id, schema.indexes())?;
                print!("{}", Text::table_ranges(&table, &ranges, encode));
            }
        }
        Ok(())
    }

    /// Decodes a row value of the given table.
    fn decode_table(cfg: &Config, table: &str, value: &str, schema: Option<String>) -> Result<()> {
        let source: Box<dyn SchemaSource> = match schema {
            Some(path) => Box::new(SchemaFile::new(path)),
            None => Box::new(Client::new(&cfg.host, cfg.port)?),
        };
        let table = source.table(&table.parse()?)?;
        print!("{}", Text::row(&decode_row(value, &table.columns)?));
        Ok(())
    }
}

/// tidbctl configuration. Read from defaults, then the config file, then
/// TIDBCTL_* environment variables, then command-line flags.
#[derive(Debug, Deserialize)]
struct Config {
    host: String,
    port: u16,
    log_level: String,
}

impl Config {
    fn load(file: &str) -> Result<Self> {
        Ok(config::Config::builder()
            .set_default("host", "127.0.0.1")?
            .set_default("port", 10080)?
            .set_default("log_level", "warn")?
            .add_source(config::File::with_name(file).required(false))
            .add_source(config::Environment::with_prefix("TIDBCTL"))
            .build()?
            .try_deserialize()?)
    }
}
