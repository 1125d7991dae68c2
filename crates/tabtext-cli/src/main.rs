//! `tabtext` CLI — convert, export, and inspect delimited text files.
//!
//! ## Usage
//!
//! ```sh
//! # Re-encode a Shift_JIS CSV as UTF-8 TSV with CRLF line breaks (stdin → stdout)
//! tabtext convert -e SJIS --out-delimiter tab --line-break CRLF < data.csv
//!
//! # Convert from file to file, quoting every field
//! tabtext convert -i data.csv -o data.out.csv --quote-all
//!
//! # Export a CSV with a header line to LTSV
//! tabtext ltsv -i access.csv -o access.ltsv
//!
//! # Export a CSV with a header line to a JSON array of objects
//! tabtext json -i data.csv
//!
//! # Show record count, field count and detected line break
//! tabtext stats -i data.csv
//! ```
//!
//! Set `RUST_LOG=debug` (or pass `--verbose`) to see the reader's and
//! writer's debug events on stderr.

use std::fs::File;
use std::io::{self, Read, Write};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::{Map, Value};
use tabtext_core::field::to_fields;
use tabtext_core::{Encoding, LineBreak, LtsvWriter, ReadOptions, Reader, WriteOptions};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "tabtext",
    version,
    about = "Convert CSV/TSV between delimiters, encodings and line breaks"
)]
struct Cli {
    /// Emit debug logging on stderr (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct InputArgs {
    /// Input file (reads from stdin if omitted)
    #[arg(short, long)]
    input: Option<String>,
    /// Input field delimiter (`tab` or `\t` for a tab)
    #[arg(short, long, default_value = ",", value_parser = parse_delimiter)]
    delimiter: char,
    /// Input encoding: UTF8, UTF8M, UTF16, UTF16BE, UTF16LE, UTF16BEM, UTF16LEM, SJIS
    #[arg(short, long, default_value = "UTF8")]
    encoding: Encoding,
    /// Read absent fields as empty strings instead of null
    #[arg(long)]
    without_null: bool,
}

impl InputArgs {
    fn options(&self) -> ReadOptions {
        ReadOptions {
            delimiter: self.delimiter,
            without_null: self.without_null,
            encoding: self.encoding,
        }
    }

    fn reader(&self) -> Result<Reader> {
        let input = open_input(self.input.as_deref())?;
        self.options()
            .reader(input)
            .with_context(|| format!("Failed to decode input as {}", self.encoding))
    }
}

#[derive(Args)]
struct OutputArgs {
    /// Output file (writes to stdout if omitted)
    #[arg(short, long)]
    output: Option<String>,
    /// Output encoding
    #[arg(long, default_value = "UTF8")]
    out_encoding: Encoding,
    /// Output line break: LF, CR or CRLF
    #[arg(long, default_value = "LF")]
    line_break: LineBreak,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite delimited text with another delimiter, encoding or line break
    Convert {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        output: OutputArgs,
        /// Output delimiter (defaults to the input delimiter)
        #[arg(long, value_parser = parse_delimiter)]
        out_delimiter: Option<char>,
        /// Quote every output field, not only those that need it
        #[arg(long)]
        quote_all: bool,
    },
    /// Export delimited text with a header line to LTSV
    Ltsv {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Export delimited text with a header line to a JSON array of objects
    Json {
        #[command(flatten)]
        input: InputArgs,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Show record count, field count and detected line break
    Stats {
        #[command(flatten)]
        input: InputArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Convert {
            input,
            output,
            out_delimiter,
            quote_all,
        } => {
            let mut reader = input.reader()?;
            let options = WriteOptions {
                delimiter: out_delimiter.unwrap_or(input.delimiter),
                line_break: output.line_break,
                encoding: output.out_encoding,
            };
            let mut writer = options
                .writer(open_output(output.output.as_deref())?)
                .context("Failed to open output")?;

            let mut count = 0usize;
            while let Some(record) = reader.read().context("Failed to read input")? {
                let mut fields = to_fields(&record);
                if quote_all {
                    fields.iter_mut().for_each(|field| field.quote = true);
                }
                writer.write(&fields).context("Failed to write output")?;
                count += 1;
            }
            writer.flush().context("Failed to flush output")?;
            tracing::info!(records = count, "converted");
        }
        Commands::Ltsv { input, output } => {
            let mut reader = input.reader()?;
            let header = reader.read_header().context("Failed to read header")?;
            let mut writer = LtsvWriter::new(
                open_output(output.output.as_deref())?,
                header,
                output.line_break,
                output.out_encoding,
            )
            .context("Invalid LTSV header")?;

            loop {
                let line = reader.line();
                let Some(record) = reader.read().context("Failed to read input")? else {
                    break;
                };
                let values: Vec<String> =
                    record.into_iter().map(Option::unwrap_or_default).collect();
                writer
                    .write(&values)
                    .with_context(|| format!("Failed to write record at line {line}"))?;
            }
            writer.flush().context("Failed to flush output")?;
        }
        Commands::Json { input, output } => {
            let table = tabtext_core::read_with_header(
                open_input(input.input.as_deref())?,
                &input.options(),
            )
            .context("Failed to read input")?;

            let rows: Vec<Value> = table
                .records
                .into_iter()
                .map(|record| {
                    let object: Map<String, Value> = table
                        .header
                        .iter()
                        .cloned()
                        .zip(record.into_iter().map(|cell| cell.map_or(Value::Null, Value::String)))
                        .collect();
                    Value::Object(object)
                })
                .collect();
            let pretty = serde_json::to_string_pretty(&Value::Array(rows))?;

            let mut sink = open_output(output.as_deref())?;
            writeln!(sink, "{pretty}").context("Failed to write output")?;
            sink.flush().context("Failed to flush output")?;
        }
        Commands::Stats { input } => {
            let mut reader = input.reader()?;
            let records = reader.read_all().context("Failed to read input")?;
            println!("Records:     {}", records.len());
            println!("Fields:      {}", reader.field_count().unwrap_or(0));
            println!(
                "Line break:  {}",
                reader.detected_line_break().map_or("none", LineBreak::name)
            );
        }
    }

    Ok(())
}

/// Console logging on stderr, filtered by `RUST_LOG` (default `warn`).
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .init();
}

/// Accept a single character, or `tab` / `\t` for a tab.
fn parse_delimiter(s: &str) -> std::result::Result<char, String> {
    if matches!(s, "tab" | "\\t") {
        return Ok('\t');
    }
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if !matches!(c, '"' | '\r' | '\n') => Ok(c),
        _ => Err(format!(
            "expected a single character other than a quote or line break, got '{s}'"
        )),
    }
}

fn open_input(path: Option<&str>) -> Result<Box<dyn Read>> {
    match path {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("Failed to read file: {}", path))?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(io::stdin().lock())),
    }
}

fn open_output(path: Option<&str>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file =
                File::create(path).with_context(|| format!("Failed to write file: {}", path))?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(io::stdout().lock())),
    }
}
