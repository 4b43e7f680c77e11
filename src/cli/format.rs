use clap::ValueEnum;

/// How command results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One `field = value` line per filter
    #[default]
    Text,
    /// A single JSON document
    Json,
}
