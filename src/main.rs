//! # Textflow CLI
//!
//! Usage:
//!   textflow input.json -o report.json
//!   echo '{ ... }' | textflow
//!   textflow --example > paragraph.json
//!
//! The report is printed to stdout unless `-o` is given. Set `RUST_LOG` to
//! see what the engine is doing (e.g. `RUST_LOG=textflow=debug`).

use std::env;
use std::fs;
use std::io::{self, Read};
use std::process;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("textflow=info"));
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(true),
        )
        .try_init();
}

fn main() {
    init_logging();
    let args: Vec<String> = env::args().collect();

    // Handle --example flag
    if args.iter().any(|a| a == "--example") {
        print!("{}", example_paragraph_json());
        return;
    }

    // Read input
    let input = if args.len() > 1 && !args[1].starts_with('-') {
        fs::read_to_string(&args[1]).unwrap_or_else(|e| {
            eprintln!("✗ Failed to read {}: {}", args[1], e);
            process::exit(1);
        })
    } else {
        let mut buf = String::new();
        if let Err(e) = io::stdin().read_to_string(&mut buf) {
            eprintln!("✗ Failed to read stdin: {}", e);
            process::exit(1);
        }
        buf
    };

    // Parse output path
    let output_path = args
        .windows(2)
        .find(|w| w[0] == "-o")
        .map(|w| w[1].clone());

    let report = match textflow::layout_json(&input) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("✗ Layout failed: {}", e);
            process::exit(1);
        }
    };
    tracing::info!(lines = report.line_count, "laid out document");

    let json = match serde_json::to_string_pretty(&report) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("✗ Failed to serialize report: {}", e);
            process::exit(1);
        }
    };

    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(&path, &json) {
                eprintln!("✗ Failed to write {}: {}", path, e);
                process::exit(1);
            }
            eprintln!("✓ Written {} lines to {}", report.line_count, path);
        }
        None => println!("{}", json),
    }
}

fn example_paragraph_json() -> &'static str {
    r##"{
  "text": "Invoice INV-2026-001\nWeb Development Services\t40\t$6,000.00\nPayment is due within 15 days of invoice date. Please make checks payable to Acme Corp or wire transfer to the account details provided separately.",
  "font": { "family": "Helvetica", "size": 10 },
  "width": 240,
  "spacing": 2,
  "tabs": [150, 190],
  "indent": 0,
  "wrapIndent": 12,
  "styles": [
    {
      "start": 0,
      "end": 19,
      "style": { "font": { "family": "Helvetica", "size": 14, "weight": 700 } }
    },
    {
      "start": 76,
      "end": 88,
      "style": { "font": { "family": "Courier", "size": 10 } }
    }
  ]
}
"##
}
