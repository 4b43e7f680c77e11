mod format;

use crate::query::DisplayMode;
use clap::{ArgAction, Parser, Subcommand};
pub use format::OutputFormat;
use std::path::PathBuf;

/// Decode, encode and normalize log search filter queries
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true, env = "LOG_QUERY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short = 'F', long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Increase log verbosity
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Decode a query string into structured filters
    Decode {
        /// Query string, e.g. "api:a AND method:(GET OR POST)"
        query: String,

        /// Virtual-host path prepended to `path:` clauses
        #[arg(long)]
        api_path: Option<String>,
    },
    /// Encode structured filters (a JSON object) into a query string
    Encode {
        /// Filter state as JSON; read from --file or stdin when omitted
        state: Option<String>,

        /// Read the filter state JSON from a file
        #[arg(long, conflicts_with = "state")]
        file: Option<PathBuf>,

        /// Display mode to apply before encoding
        #[arg(long, value_enum)]
        mode: Option<DisplayMode>,
    },
    /// Decode then re-encode a query string into its canonical form
    Normalize {
        /// Query string to normalize
        query: String,

        /// Virtual-host path prepended to `path:` clauses
        #[arg(long)]
        api_path: Option<String>,

        /// Display mode to apply before encoding
        #[arg(long, value_enum)]
        mode: Option<DisplayMode>,
    },
}

pub fn cli_parse() -> Cli {
    Cli::parse()
}
