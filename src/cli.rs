//! Command line interface.

use crate::config::Config;
use crate::source::SourceFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "symsearch")]
#[command(about = "Incremental search over documented symbols", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (default: ./symsearch.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Index source file or directory; replaces configured sources (repeatable)
    #[arg(short, long = "source", global = true)]
    pub sources: Vec<PathBuf>,

    /// Source format override
    #[arg(long, value_enum, global = true)]
    pub format: Option<SourceFormat>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Search symbols by name fragment
    Query {
        fragment: String,
        /// Match token prefixes only
        #[arg(long)]
        prefix: bool,
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
    },
    /// Show one exact entry
    Lookup { token: String },
    /// Build the index and write a snapshot
    Compile {
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Print index statistics
    Stats,
    /// Serve the index over MCP on stdio
    Serve,
}

impl Cli {
    /// Loads the config file and applies command line overrides.
    pub fn resolve_config(&self) -> crate::error::Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;

        if !self.sources.is_empty() {
            config.sources = self.sources.clone();
        }
        if let Some(format) = self.format {
            config.format = format;
        }
        if let Some(Commands::Query { prefix: true, .. }) = &self.command {
            config.match_mode = crate::search::MatchMode::Prefix;
        }
        Ok(config)
    }
}
