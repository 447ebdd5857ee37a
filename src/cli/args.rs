//! CLI argument definitions using clap
//!
//! Commands:
//! - avrofix migrate [--config <path>] [--dir <path>] [FILES...]
//! - avrofix verify [--dir <path>] [--extension <ext>] [FILES...]
//! - avrofix rules [--config <path>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// avrofix - normalizes field names in Avro container files
#[derive(Parser, Debug)]
#[command(name = "avrofix")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Migrate container files, writing a new file next to each input
    Migrate {
        /// Path to a JSON configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Directory scanned for inputs when no files are given
        #[arg(long, default_value = "./database")]
        dir: PathBuf,

        /// Overrides the configured output suffix
        #[arg(long)]
        suffix: Option<String>,

        /// Overrides the number of migrated records shown per file
        #[arg(long)]
        preview: Option<usize>,

        /// Stop at the first failing file
        #[arg(long)]
        fail_fast: bool,

        /// Input files; overrides --dir
        files: Vec<PathBuf>,
    },

    /// Print the schema and leading records of container files
    Verify {
        /// Directory scanned when no files are given
        #[arg(long, default_value = "./database")]
        dir: PathBuf,

        /// Extension of files to verify when scanning
        #[arg(long, default_value = "avronew")]
        extension: String,

        /// Records shown per file
        #[arg(long, default_value_t = crate::pipeline::DEFAULT_VERIFY_LIMIT)]
        limit: usize,

        /// Files to verify; overrides --dir
        files: Vec<PathBuf>,
    },

    /// Print the effective migration rules
    Rules {
        /// Path to a JSON configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
