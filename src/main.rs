//! mi-decode
//!
//! Reads GDB/MI output from stdin and writes one JSON object per decoded
//! result record to stdout.
//!
//! Usage:
//!   gdb --interpreter=mi2 ./prog 2>&1 | mi-decode
//!   mi-decode --labelled-arrays --all-pairs < session.log

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::LineDecoder;
use gdb_mi_records::gdb::{EscapePolicy, ParserConfig};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mi-decode", version, about = "Decode GDB/MI result records to JSON")]
struct Cli {
    /// Resolve C-style escapes in string values
    #[arg(long)]
    unescape: bool,

    /// Accept `name={...}` array elements as emitted by GDB
    #[arg(long)]
    labelled_arrays: bool,

    /// Classify every top-level pair instead of only the first
    #[arg(long)]
    all_pairs: bool,

    /// Maximum object/array nesting
    #[arg(long)]
    max_depth: Option<usize>,
}

impl Cli {
    fn parser_config(&self) -> ParserConfig {
        let mut config = ParserConfig {
            labelled_array_elements: self.labelled_arrays,
            ..ParserConfig::default()
        };
        if self.unescape {
            config.escape_policy = EscapePolicy::Unescape;
        }
        if let Some(depth) = self.max_depth {
            config.max_depth = depth;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the JSON stream
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let decoder = LineDecoder::new(cli.parser_config(), cli.all_pairs)?;

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let mut decoded = 0usize;
    let mut failed = 0usize;

    while let Some(line) = lines.next_line().await? {
        debug!("Received: {}", line);
        for report in decoder.decode_line(&line) {
            if report.is_failure() {
                failed += 1;
            } else {
                decoded += 1;
            }
            let mut json = serde_json::to_string(&report)?;
            json.push('\n');
            stdout.write_all(json.as_bytes()).await?;
        }
        stdout.flush().await?;
    }

    info!("Decoded {} records, {} failed", decoded, failed);
    Ok(())
}
