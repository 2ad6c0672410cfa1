//! End-to-end tests of the tidbctl binary.

use std::error::Error;
use std::io::{BufRead as _, BufReader, Write as _};
use std::net::TcpListener;

use pretty_assertions::assert_eq;
use test_case::test_case;

type Result<T> = std::result::Result<T, Box<dyn Error>>;

/// Schema of the table (a int, b varchar(20), c datetime, d timestamp, e
/// varchar(20)) with ID 60, where e was added after the row was written.
const SCHEMA: &str = r#"{
    "id": 60,
    "name": {"O": "t", "L": "t"},
    "cols": [
        {"id": 1, "name": {"O": "a", "L": "a"}, "type": {"Tp": 3, "Flen": 11, "Decimal": 0}},
        {"id": 2, "name": {"O": "b", "L": "b"}, "type": {"Tp": 15, "Flen": 20, "Decimal": 0}},
        {"id": 3, "name": {"O": "c", "L": "c"}, "type": {"Tp": 12, "Flen": 19, "Decimal": 0}},
        {"id": 4, "name": {"O": "d", "L": "d"}, "type": {"Tp": 7, "Flen": 19, "Decimal": 0}},
        {"id": 5, "name": {"O": "e", "L": "e"}, "type": {"Tp": 15, "Flen": 20, "Decimal": 0}}
    ],
    "index_info": [{"id": 1, "idx_name": {"O": "idx_b", "L": "idx_b"}}]
}"#;

/// A row value of the table: (1, "哈哈 hello", NULL, 2019-03-22 06:20:17).
const ROW: &str = "CAIIAggEAhjlk4jlk4ggaGVsbG8IBgAICAmAgICI0Yyr0Rk=";

/// The output of a tidbctl run.
struct Output {
    success: bool,
    stdout: String,
    stderr: String,
}

/// Builds and runs tidbctl with the given arguments, ignoring any config file.
fn tidbctl(args: &[&str]) -> Result<Output> {
    let build = escargot::CargoBuild::new().bin("tidbctl").run()?;
    let output = build.command().args(["-c", "/nonexistent/tidbctl.yaml"]).args(args).output()?;
    Ok(Output {
        success: output.status.success(),
        stdout: String::from_utf8(output.stdout)?,
        stderr: String::from_utf8(output.stderr)?,
    })
}

/// Runs tidbctl, asserting that it succeeds, and returns stdout.
fn tidbctl_ok(args: &[&str]) -> Result<String> {
    let output = tidbctl(args)?;
    assert!(output.success, "tidbctl {args:?} failed: {}", output.stderr);
    Ok(output.stdout)
}

/// Writes the table schema to a temporary file.
fn schema_file() -> Result<tempfile::NamedTempFile> {
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(SCHEMA.as_bytes())?;
    Ok(file)
}

#[test_case(r"t\x80\x00\x00\x00\x00\x00\x07\x8f_r\x80\x00\x00\x00\x00\x08\x3b\xba", 1935, 539578; "escaped")]
#[test_case(r"t\200\000\000\000\000\000\025\377\316_r\200\000\001j\331\377\357vI\000\000\000\000\000\372", 5582, 1558434510409; "escaped padded")]
#[test_case("dIAAAAAAAABAX3KAAAAAAAAAAQ==", 64, 1; "base64")]
fn decoder_row(key: &str, table_id: i64, row_id: i64) -> Result<()> {
    assert_eq!(
        tidbctl_ok(&["decoder", key])?,
        format!("format: table_row\ntable_id: {table_id}\nrow_id: {row_id}\n")
    );
    Ok(())
}

#[test]
fn decoder_index() -> Result<()> {
    let key = r"t\x80\x00\x00\x00\x00\x00\x00\x5f_i\x80\x00\x00\x00\x00\x00\x00\x01\x03\x80\x00\x00\x00\x00\x00\x00\x02\x03\x80\x00\x00\x00\x00\x00\x00\x02";
    assert_eq!(
        tidbctl_ok(&["decoder", key])?,
        "format: table_index\ntable_id: 95\nindex_id: 1\n\
         index_value[0]: {type: bigint, value: 2}\n\
         index_value[1]: {type: bigint, value: 2}\n"
    );
    Ok(())
}

#[test]
fn decoder_index_values() -> Result<()> {
    assert_eq!(
        tidbctl_ok(&["decoder", "CAQCBmFiYw=="])?,
        "format: index_value\n\
         index_value[0]: {type: bigint, value: 2}\n\
         index_value[1]: {type: bytes, value: abc}\n"
    );
    Ok(())
}

#[test]
fn decoder_error() -> Result<()> {
    let output = tidbctl(&["decoder", "/w=="])?;
    assert!(!output.success);
    assert_eq!(output.stdout, "");
    assert!(output.stderr.starts_with("Error: unrecognized key format"), "{}", output.stderr);
    Ok(())
}

/// Corrupt binary JSON is reported, never crashing the process.
#[test]
fn decoder_corrupt_json() -> Result<()> {
    let stdout = tidbctl_ok(&["decoder", "CgMBAAAADQAAAAMAAAAA"])?;
    assert!(stdout.starts_with("format: index_value\nindex_value[0]: {type: json, value: "), "{stdout}");

    let output = tidbctl(&["decoder", "Cgz///////////8B"])?;
    assert!(!output.success);
    assert!(output.stderr.contains("Error: unrecognized key format"), "{}", output.stderr);
    Ok(())
}

#[test]
fn base64decode() -> Result<()> {
    assert_eq!(tidbctl_ok(&["base64decode", "AAAAACqPhb0="])?, "hex: 000000002a8f85bd\nuint64: 714048957\n");
    let output = tidbctl(&["base64decode", "not base64!"])?;
    assert!(!output.success);
    assert!(output.stderr.starts_with("Error: invalid input"), "{}", output.stderr);
    Ok(())
}

#[test_case(&["decode-table", "test.t"]; "decode-table by name")]
#[test_case(&["decodeTable", "60"]; "decodeTable by id")]
#[test_case(&["base64decode", "test.t"]; "base64decode with table")]
fn decode_table(args: &[&str]) -> Result<()> {
    let file = schema_file()?;
    let path = file.path().to_string_lossy().to_string();
    let args = [args, &[ROW, "--schema", &path]].concat();
    assert_eq!(
        tidbctl_ok(&args)?,
        "a:\t1\nb:\t哈哈 hello\nc is NULL\nd:\t2019-03-22 06:20:17\ne not found in data\n"
    );
    Ok(())
}

#[test]
fn decode_table_errors() -> Result<()> {
    let file = schema_file()?;
    let path = file.path().to_string_lossy().to_string();

    let output = tidbctl(&["decode-table", "test.t", "", "--schema", &path])?;
    assert!(!output.success);
    assert!(output.stderr.starts_with("Error: no data to decode"), "{}", output.stderr);

    let output = tidbctl(&["decode-table", "a.b.c", ROW, "--schema", &path])?;
    assert!(!output.success);
    assert!(output.stderr.starts_with("Error: invalid input"), "{}", output.stderr);

    let output = tidbctl(&["decode-table", "61", ROW, "--schema", &path])?;
    assert!(!output.success);
    assert!(output.stderr.starts_with("Error: schema lookup failed"), "{}", output.stderr);
    Ok(())
}

#[test]
fn keyrange_global() -> Result<()> {
    assert_eq!(
        tidbctl_ok(&["keyrange"])?,
        "global ranges:\n  meta: (6d, 6e)\n  table: (74, 75)\n"
    );
    assert_eq!(
        tidbctl_ok(&["keyrange", "-e"])?,
        "global ranges:\n  meta: (6d00000000000000f8, 6e00000000000000f8)\n  table: (7400000000000000f8, 7500000000000000f8)\n"
    );
    Ok(())
}

/// Fetches the table schema from a one-shot HTTP server.
#[test]
fn keyrange_table() -> Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let port = listener.local_addr()?.port().to_string();
    let server = std::thread::spawn(move || -> std::io::Result<String> {
        let (mut stream, _) = listener.accept()?;
        let mut reader = BufReader::new(stream.try_clone()?);
        let mut request_line = String::new();
        reader.read_line(&mut request_line)?;
        let mut line = String::new();
        while reader.read_line(&mut line)? > 2 {
            line.clear();
        }
        write!(
            stream,
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{SCHEMA}",
            SCHEMA.len()
        )?;
        Ok(request_line.trim().to_string())
    });

    let stdout = tidbctl_ok(&["keyrange", "-d", "test", "-t", "t", "--host", "127.0.0.1", "--port", &port])?;
    assert_eq!(
        stdout,
        "global ranges:\n  meta: (6d, 6e)\n  table: (74, 75)\n\
         table t ranges: (NOTE: key range might be changed after DDL)\n\
         \x20 table: (74800000000000003c, 74800000000000003d)\n\
         \x20 table indexes: (74800000000000003c5f69, 74800000000000003c5f72)\n\
         \x20   index idx_b: (74800000000000003c5f698000000000000001, 74800000000000003c5f698000000000000002)\n\
         \x20 table rows: (74800000000000003c5f72, 74800000000000003d)\n"
    );
    let request_line = server.join().map_err(|_| "server panicked")??;
    assert_eq!(request_line, "GET /schema/test/t HTTP/1.1");
    Ok(())
}
