use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// SQL Safety Gateway - vet read-only SQL, cap rows, mask PII, redact plans
#[derive(Parser, Debug)]
#[command(name = "sql-safety-gateway")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands
}

/// Overrides applied on top of file and environment configuration
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Backend type (embedded or networked)
    #[arg(long, global = true)]
    pub backend: Option<String>,

    /// Comma-separated list of allowed relations
    #[arg(long, global = true, value_delimiter = ',')]
    pub whitelist: Option<Vec<String>>,

    /// Maximum number of rows a query may return
    #[arg(long, global = true)]
    pub row_cap: Option<u64>,

    /// Output format
    #[arg(short = 'f', long, global = true, value_enum, default_value = "text")]
    pub format: Format,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate, whitelist and row-cap a statement without running it
    Check {
        /// SQL text, @path to read a file, or - for stdin
        sql: String
    },

    /// Run the full query pipeline against a captured result set
    Query {
        /// SQL text, @path to read a file, or - for stdin
        sql: String,

        /// JSON array of row objects standing in for the backend result
        #[arg(short, long)]
        rows: PathBuf
    },

    /// Describe the plan of a statement with all identifying detail removed
    Explain {
        /// SQL text, @path to read a file, or - for stdin
        sql: String,

        /// Captured engine plan (PostgreSQL JSON or SQLite query plan rows)
        #[arg(short, long)]
        plan: Option<PathBuf>
    },

    /// Mask PII in a JSON array of row objects
    Mask {
        /// Path to the rows file, or - for stdin
        rows: String
    },

    /// Show the configuration exposed to callers
    Config
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Format {
    Text,
    Json,
    Yaml
}
