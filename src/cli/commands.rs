//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Signed, rate-limit aware REST query CLI
#[derive(Parser, Debug)]
#[command(name = "tokenquery")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Report failed requests and keep going instead of aborting
    #[arg(long, global = true)]
    pub keep_going: bool,

    /// Command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Request a single object
    Get {
        /// Request URL
        url: String,

        /// Send a POST instead of a GET
        #[arg(long)]
        post: bool,
    },

    /// Request a collection of objects
    Collection {
        /// Request URL
        url: String,

        /// Send a POST instead of a GET
        #[arg(long)]
        post: bool,
    },

    /// Follow a cursor endpoint page by page
    Cursor {
        /// Base URL (the cursor parameter is appended)
        url: String,

        /// Cursor to start from (-1 is the first page)
        #[arg(long, allow_hyphen_values = true)]
        start_cursor: Option<i64>,

        /// Stop after this many items
        #[arg(long)]
        max_items: Option<usize>,

        /// Page field holding the items counted against --max-items
        #[arg(long, default_value = "ids")]
        items_field: String,
    },

    /// Walk a descending-identifier timeline with max_id
    Timeline {
        /// Base URL (max_id is appended after the first page)
        url: String,
    },

    /// Look up identifiers and names in capped batches
    Lookup {
        /// Lookup endpoint URL
        url: String,

        /// Numeric identifiers (comma-separated)
        #[arg(long, value_delimiter = ',')]
        ids: Vec<i64>,

        /// Names (comma-separated)
        #[arg(long, value_delimiter = ',')]
        names: Vec<String>,
    },

    /// Query a rate limit status endpoint
    RateLimit {
        /// Rate limit status URL
        url: String,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one record per line)
    Json,
    /// Human-readable output
    Pretty,
}
