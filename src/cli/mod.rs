//! Command-line interface for org-attach.
//!
//! `org-attach [--config PATH] [--dry-run] <TYPE> <ENTRY>...`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use crate::adapters::HttpFetcher;
use crate::config::Config;
use crate::core::{EntryType, Orchestrator};

/// org-attach - Automatic templates for org-mode
#[derive(Parser, Debug)]
#[command(name = "org-attach")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Type of the entries to add
    #[arg(value_enum)]
    pub entry_type: TypeArg,

    /// Descriptors for the entries to add (bib: SOURCE or SOURCE,ATTACHMENT)
    #[arg(required = true)]
    pub entries: Vec<String>,

    /// Config file (searched for in parent directories if not given)
    #[arg(short, long, env = "ORG_ATTACH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print the fragments without storing or appending anything
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TypeArg {
    /// Bibliography entry (DOI, URL, HAL id or BibTeX file)
    Bib,

    /// Jupyter notebook
    Ipynb,
}

impl From<TypeArg> for EntryType {
    fn from(t: TypeArg) -> Self {
        match t {
            TypeArg::Bib => EntryType::Bib,
            TypeArg::Ipynb => EntryType::Ipynb,
        }
    }
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        let config = Config::discover(self.config.as_deref())
            .context("Error with the configuration file")?;
        let fetcher = HttpFetcher::new().context("Failed to create HTTP client")?;

        let orchestrator = Orchestrator::new(config, Box::new(fetcher)).dry_run(self.dry_run);
        let entry_type = EntryType::from(self.entry_type);

        for arg in &self.entries {
            let fragments = orchestrator.add(entry_type, arg)?;
            if self.dry_run {
                for fragment in fragments {
                    println!("{}", fragment);
                }
            }
        }

        Ok(())
    }
}
