//! Text and JSON output formatting for CLI commands.

use serde::Serialize;

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON document per item
    Json,
}

/// Print a serializable item. Text mode falls back to pretty JSON.
pub fn print_item<T: Serialize>(item: &T, format: OutputFormat) {
    let rendered = match format {
        OutputFormat::Text => serde_json::to_string_pretty(item),
        OutputFormat::Json => serde_json::to_string(item),
    };
    match rendered {
        Ok(s) => println!("{s}"),
        Err(e) => print_error(&format!("Failed to render output: {e}")),
    }
}

pub fn print_success(message: &str) {
    println!("✓ {message}");
}

pub fn print_error(message: &str) {
    eprintln!("✗ {message}");
}
