pub mod cli;
pub mod config;
pub mod query;

use crate::config::{CodecConfig, LoggingRules};
use anyhow::Context;
pub use cli::{Commands, OutputFormat, cli_parse};
pub use query::{
    ApiContext, Decoder, DisplayMode, Field, FilterState, FilterValue, QueryError, TracingSink,
    UnknownFieldLog, UnknownFieldSink, encode,
};
use serde_json::json;
use std::fmt::Write;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Result of decoding a query on behalf of a command.
struct Decoded {
    state: FilterState,
    mode: DisplayMode,
    unknown: Vec<String>,
}

fn init_logging(rules: &LoggingRules, verbose: u8, quiet: bool) {
    let default_directive = if quiet {
        "error"
    } else if verbose > 0 {
        "debug"
    } else {
        rules.level.as_str()
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    // A subscriber may already be installed when embedded in a larger binary.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn decode_query(query: &str, api_path: Option<&String>, config: &CodecConfig) -> Decoded {
    let api: &dyn ApiContext = match api_path {
        Some(path) => path,
        None => &config.api,
    };

    let mut unknown = Vec::new();
    let mut sink = |message: &str, token: &str| {
        tracing::warn!(token, "{message}");
        unknown.push(token.to_string());
    };

    let mut state = FilterState::new();
    let mode = Decoder::new()
        .with_api(api)
        .decode_into(&mut state, Some(query), &mut sink);

    Decoded {
        state,
        mode,
        unknown,
    }
}

/// Render a decoded state as `field = value` lines followed by the display mode.
pub fn format_state_text(state: &FilterState, mode: DisplayMode) -> String {
    let mut out = String::new();
    if !state.has_filters() {
        let _ = writeln!(out, "(no filters)");
    }
    for (field, value) in state.present() {
        let _ = writeln!(out, "{field} = {value}");
    }
    let _ = writeln!(out, "mode = {mode}");
    out
}

fn read_state(state: Option<&String>, file: Option<&Path>) -> anyhow::Result<FilterState> {
    let raw = match (state, file) {
        (Some(raw), _) => raw.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read filter state file '{}'", path.display()))?,
        (None, None) => std::io::read_to_string(std::io::stdin())
            .context("Failed to read filter state from stdin")?,
    };

    serde_json::from_str(&raw).context("Invalid filter state JSON")
}

fn print_query(query: &str, mode: DisplayMode, format: OutputFormat) {
    match format {
        OutputFormat::Text => println!("{query}"),
        OutputFormat::Json => println!("{}", json!({ "query": query, "mode": mode })),
    }
}

pub fn run() -> anyhow::Result<()> {
    let cli = cli_parse();
    let config = config::load_config(cli.config.as_deref()).context("Failed to load config")?;
    init_logging(&config.logging, cli.verbose, cli.quiet);

    if let Some(path) = &cli.config {
        tracing::debug!(path = %path.display(), "loaded config");
    }

    match &cli.command {
        Commands::Decode { query, api_path } => {
            let decoded = decode_query(query, api_path.as_ref(), &config);
            match cli.format {
                OutputFormat::Text => print!("{}", format_state_text(&decoded.state, decoded.mode)),
                OutputFormat::Json => {
                    let output = json!({
                        "filters": decoded.state,
                        "mode": decoded.mode,
                        "unknown": decoded.unknown,
                    });
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
            }
        }
        Commands::Encode { state, file, mode } => {
            let mut state = read_state(state.as_ref(), file.as_deref())?;
            if let Some(mode) = mode {
                mode.apply(&mut state);
            }
            let mode = DisplayMode::resolve(&state);
            print_query(&encode(&state), mode, cli.format);
        }
        Commands::Normalize {
            query,
            api_path,
            mode,
        } => {
            let mut decoded = decode_query(query, api_path.as_ref(), &config);
            let mode = match mode {
                Some(mode) => {
                    mode.apply(&mut decoded.state);
                    *mode
                }
                None => DisplayMode::normalize(&mut decoded.state),
            };
            print_query(&encode(&decoded.state), mode, cli.format);
        }
    }

    Ok(())
}
