// qsapy - A transpiler turning QS script syntax trees into Python source
// Copyright (C) 2026  Marcel Joachim Kloubert <marcel@kloubert.dev>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! qsapy Transpiler CLI
//!
//! Converts QS syntax trees (XML) into Python modules.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use qsapy::codegen::TraceSink;
use qsapy::driver::{convert_batch, destination_for, ConversionItem};
use qsapy::TranspileOptions;
use tracing_subscriber::EnvFilter;

/// qsapy - QS syntax trees to Python
#[derive(Parser, Debug)]
#[command(name = "qsapy")]
#[command(author = "Marcel Joachim Kloubert <marcel@kloubert.dev>")]
#[command(version)]
#[command(about = "Transpile QS script syntax trees (XML) into Python modules")]
#[command(long_about = r#"
qsapy reads the XML syntax tree of a QS script and writes the equivalent
Python module, targeting the qsa runtime library.

Each FILE is written next to itself with ".py" appended, unless --path
names an output directory.

Example usage:
  qsapy flfactppal.qs.xml
  qsapy scripts/*.qs.xml --path build/ --jobs 4
  qsapy module.qs.xml --trace-file module.trace --no-format

Logging is controlled through QSAPY_LOG (or RUST_LOG), e.g.
  QSAPY_LOG=qsapy=debug qsapy module.qs.xml
"#)]
struct Cli {
    /// XML syntax tree files to convert
    #[arg(required = true, value_name = "FILES")]
    files: Vec<PathBuf>,

    /// Directory to write the Python files to
    #[arg(long, value_name = "DIR")]
    path: Option<PathBuf>,

    /// Only report warnings and errors
    #[arg(short, long)]
    quiet: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Print the parsed options before converting
    #[arg(long)]
    optdebug: bool,

    /// Write a handler trace to FILE
    #[arg(long, value_name = "FILE")]
    trace_file: Option<PathBuf>,

    /// Do not run the output through black
    #[arg(long)]
    no_format: bool,

    /// Pass unresolved identifiers through unchanged
    #[arg(long)]
    permissive: bool,

    /// Maximum number of parallel workers
    #[arg(long, value_name = "N")]
    jobs: Option<usize>,
}

fn init_logging(cli: &Cli) {
    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("QSAPY_LOG")
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new(if cli.quiet { "warn" } else { "info" }))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    if cli.optdebug {
        println!("{:#?}", cli);
    }

    if let Some(dir) = &cli.path {
        if !dir.is_dir() {
            eprintln!("Error: Output directory does not exist: {}", dir.display());
            return ExitCode::from(2);
        }
    }

    let trace = match &cli.trace_file {
        Some(path) => match TraceSink::create(path) {
            Ok(sink) => Some(Arc::new(sink)),
            Err(e) => {
                eprintln!("Error: Cannot create trace file {}: {}", path.display(), e);
                return ExitCode::from(3);
            }
        },
        None => None,
    };

    let options = TranspileOptions {
        strict: !cli.permissive,
        format: !cli.no_format,
        trace,
        ..TranspileOptions::default()
    };

    let items: Vec<ConversionItem> = cli
        .files
        .iter()
        .map(|src| ConversionItem::new(src, destination_for(src, cli.path.as_deref())))
        .collect();

    let summary = convert_batch(&items, &options, cli.jobs);

    if !cli.quiet {
        for (dst, ok) in &summary.converted {
            if *ok {
                println!("Converted -> {}", dst.display());
            }
        }
    }

    if summary.all_ok() {
        ExitCode::SUCCESS
    } else {
        eprintln!(
            "Error: {} of {} files failed to convert",
            summary.failures(),
            summary.converted.len()
        );
        ExitCode::from(1)
    }
}
