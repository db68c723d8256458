//! Attachment management.
//!
//! Builds entries for one command-line argument, resolving the attachment
//! that goes with each of them, and moves finished attachments into the
//! store.

use anyhow::Result;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::TypeConfig;
use crate::domain::BibEntry;
use crate::library::{Attachment, HashStore, StoreError, StoredArtifact};

use super::entry::{BibOrgEntry, EntryType, IpynbOrgEntry, OrgEntry};
use super::render::AttachmentIdentity;
use super::resolver::SourceResolver;

/// Malformed command-line arguments
#[derive(Debug, Error)]
pub enum ArgumentError {
    #[error("Argument {bibliography} holds several bibliographical entries, but one attachment {attachment} was given.")]
    SeveralEntriesOneAttachment {
        bibliography: String,
        attachment: String,
    },

    #[error("Wrong argument format, got {0}.")]
    WrongFormat(String),
}

/// Resolves entries with their attachments and stores the attachments
pub struct AttachmentManager {
    resolver: SourceResolver,
    store: HashStore,
}

impl AttachmentManager {
    pub fn new(resolver: SourceResolver, store: HashStore) -> Self {
        Self { resolver, store }
    }

    /// Build the finalized entries described by one argument.
    ///
    /// A `bib` argument is `SOURCE` or `SOURCE,ATTACHMENT`; an `ipynb`
    /// argument is a notebook path or URL. Either every entry of the
    /// argument is built, or none is.
    pub fn build_entries(
        &self,
        entry_type: EntryType,
        config: &TypeConfig,
        arg: &str,
    ) -> Result<Vec<OrgEntry>> {
        let entries = match entry_type {
            EntryType::Bib => self.build_bib_entries(config, arg)?,
            EntryType::Ipynb => {
                let attachment = self.resolver.resolve_file(arg)?;
                vec![OrgEntry::Ipynb(IpynbOrgEntry::new(config, attachment)?)]
            }
        };

        entries
            .into_iter()
            .map(|entry| -> Result<OrgEntry> { Ok(entry.finalize()?) })
            .collect()
    }

    fn build_bib_entries(&self, config: &TypeConfig, arg: &str) -> Result<Vec<OrgEntry>> {
        let tokens: Vec<&str> = arg.split(',').map(str::trim).collect();

        match tokens.as_slice() {
            [source] => {
                let bibs = self.resolver.resolve_bibliography(source)?;
                bibs.into_iter()
                    .map(|bib| -> Result<OrgEntry> {
                        let attachment = match &config.pdfpath {
                            Some(dir) => Some(self.resolver.resolve_file_by_key(dir, bib.key())?),
                            None => self.pdf_field_attachment(&bib),
                        };
                        Ok(OrgEntry::Bib(BibOrgEntry::new(config, bib, attachment)?))
                    })
                    .collect()
            }
            [source, attachment] => {
                let mut bibs = self.resolver.resolve_bibliography(source)?;
                if bibs.len() > 1 {
                    return Err(ArgumentError::SeveralEntriesOneAttachment {
                        bibliography: source.to_string(),
                        attachment: attachment.to_string(),
                    }
                    .into());
                }
                let file = self.resolver.resolve_file(attachment)?;
                let bib = bibs.remove(0);
                Ok(vec![OrgEntry::Bib(BibOrgEntry::new(config, bib, Some(file))?)])
            }
            _ => Err(ArgumentError::WrongFormat(arg.to_string()).into()),
        }
    }

    /// Best-effort attachment from the record's own `pdf` field
    fn pdf_field_attachment(&self, bib: &BibEntry) -> Option<Attachment> {
        let pdf = bib.pdf()?;
        match self.resolver.resolve_file(pdf) {
            Ok(attachment) => Some(attachment),
            Err(e) => {
                warn!("Could not fetch the pdf of '{}', not attaching: {}", bib.key(), e);
                None
            }
        }
    }

    /// Move an attachment into the store under its computed identity
    pub fn persist(
        &self,
        attachment: Attachment,
        identity: &AttachmentIdentity,
    ) -> Result<StoredArtifact, StoreError> {
        debug!("Persisting {} ({})", identity.file_name, identity.hash);
        self.store.store(attachment, &identity.hash, &identity.file_name)
    }
}
