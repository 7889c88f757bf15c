use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tabfile")]
#[command(about = "Line-oriented file helpers: TSV maps, line I/O and deletion watch", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Increase log verbosity (-v: info, -vv: debug)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbosity: u8,

    /// Suppress progress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file (defaults to the nearest .tabfile.toml)
    #[arg(long, global = true, env = "TABFILE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the lines of a file
    Lines {
        path: PathBuf,

        /// Show a live line counter on stderr
        #[arg(long)]
        progress: bool,
    },

    /// Parse a two-column TSV file and print it sorted by key
    Map {
        path: PathBuf,

        /// Skip lines that don't have exactly two columns
        #[arg(long = "skip-errors")]
        skip_errors: bool,
    },

    /// Parse a TSV file into key -> values and print it sorted by key
    MapList {
        path: PathBuf,

        /// Column holding the key
        #[arg(long = "key-index", default_value = "0")]
        key_index: usize,

        /// Keep only the last row for each key
        #[arg(long)]
        overwrite: bool,

        /// Exclude rows with fewer than N fields
        #[arg(long = "min-fields")]
        min_fields: Option<usize>,
    },

    /// Read one number per line and print count and sum
    Doubles { path: PathBuf },

    /// List directory entries (nothing if not a directory)
    Ls { path: PathBuf },

    /// Exit 0 if the path exists, 1 otherwise
    Exists { path: PathBuf },

    /// Create an empty file if absent
    Touch { path: PathBuf },

    /// Delete a file
    Rm { path: PathBuf },

    /// Copy a file; fails if the destination exists
    Cp { from: PathBuf, to: PathBuf },

    /// Create a directory and its parents
    Mkdir { path: PathBuf },

    /// Create a fresh output directory, exiting with an error if it exists
    MkdirOrDie { dir: String },

    /// Block until a file is deleted
    WaitDelete { path: PathBuf },
}

/// Parse CLI arguments using Clap
pub fn parse_args() -> Cli {
    Cli::parse()
}
