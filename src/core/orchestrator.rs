//! Main orchestrator for adding entries.
//!
//! Processes arguments one at a time: resolve, build, render, store the
//! attachment, append the fragment. The first failure stops the run.

use anyhow::{Context, Result};
use tracing::{info, instrument};

use crate::adapters::Fetcher;
use crate::config::Config;
use crate::library::HashStore;

use super::attach::AttachmentManager;
use super::entry::EntryType;
use super::orgfile::OrgFile;
use super::render::EntryRenderer;
use super::resolver::SourceResolver;

/// Adds entries to the configured org file
pub struct Orchestrator {
    config: Config,
    manager: AttachmentManager,
    renderer: EntryRenderer,
    orgfile: OrgFile,
    dry_run: bool,
}

impl Orchestrator {
    /// Create an orchestrator fetching remote sources through `fetcher`
    pub fn new(config: Config, fetcher: Box<dyn Fetcher>) -> Self {
        let store = HashStore::for_orgfile(&config.orgfile);
        let manager = AttachmentManager::new(SourceResolver::new(fetcher), store);
        let renderer = EntryRenderer::new(config.level);
        let orgfile = OrgFile::new(&config.orgfile);
        Self {
            config,
            manager,
            renderer,
            orgfile,
            dry_run: false,
        }
    }

    /// Render only; store nothing and leave the org file untouched
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Add every entry described by one argument; returns the fragments
    #[instrument(skip(self))]
    pub fn add(&self, entry_type: EntryType, arg: &str) -> Result<Vec<String>> {
        let type_config = self.config.type_config(entry_type);
        let entries = self
            .manager
            .build_entries(entry_type, type_config, arg)
            .with_context(|| format!("Failed to process argument '{}'", arg))?;

        let mut fragments = Vec::with_capacity(entries.len());
        for entry in entries {
            let identity = entry
                .model()
                .attachment_identity()
                .with_context(|| format!("Failed to read attachment for '{}'", arg))?;
            let fragment = self.renderer.render(entry.model(), identity.as_ref());

            if !self.dry_run {
                if let (Some(attachment), Some(identity)) = (entry.into_attachment(), &identity) {
                    let stored = self
                        .manager
                        .persist(attachment, identity)
                        .with_context(|| format!("Failed to store attachment for '{}'", arg))?;
                    info!("Attached {}", stored.path.display());
                }
                self.orgfile.append(&fragment).with_context(|| {
                    format!("Failed to append to {}", self.orgfile.path().display())
                })?;
            }

            fragments.push(fragment);
        }

        Ok(fragments)
    }

    /// Add every argument in order, stopping at the first failure
    pub fn add_all<S: AsRef<str>>(&self, entry_type: EntryType, args: &[S]) -> Result<Vec<String>> {
        let mut fragments = Vec::new();
        for arg in args {
            fragments.extend(self.add(entry_type, arg.as_ref())?);
        }
        Ok(fragments)
    }
}
