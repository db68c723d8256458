//! Core logic.
//!
//! This module contains:
//! - Resolver: ordered fallback from an argument to BibTeX or file bytes
//! - Attach: builds entries with their attachments and stores them
//! - Entry: the entry model shared by bibliography and notebook entries
//! - Render: org-mode fragments
//! - OrgFile: appending fragments to the outline file
//! - Orchestrator: ties the above together per argument

pub mod attach;
pub mod entry;
pub mod orchestrator;
pub mod orgfile;
pub mod render;
pub mod resolver;

// Re-export commonly used types
pub use attach::{ArgumentError, AttachmentManager};
pub use entry::{
    BibOrgEntry, EntryError, EntryModel, EntryType, IpynbOrgEntry, OrgEntry, Section, ATTACH_TAG,
};
pub use orchestrator::Orchestrator;
pub use orgfile::OrgFile;
pub use render::{AttachmentIdentity, EntryRenderer};
pub use resolver::{ResolveError, SourceResolver, BIBTEX_MIME, DOI_RESOLVER, HAL_BIBTEX_URL};
