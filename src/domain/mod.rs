//! Domain types for org-attach.
//!
//! - Bib: one bibliography record and where it came from

pub mod bib;

// Re-export commonly used types
pub use bib::{BibEntry, BibError, BibOrigin};
