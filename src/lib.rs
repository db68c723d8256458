//! org-attach - Attach papers, bibliographies and notebooks to an org file
//!
//! Turns a DOI, a URL, a HAL identifier, a BibTeX file or a notebook into an
//! org-mode heading appended to a reading list, and keeps a copy of the
//! associated file in a content-addressed store next to the org file.
//!
//! # Architecture
//!
//! Each argument goes through the same steps:
//! - Resolution: the argument is tried as a path, a DOI, a URL, then a HAL id
//! - Attachment: the matching file is resolved and held in a temporary directory
//! - Rendering: the entry becomes an org fragment
//! - Storage: the file moves to `data/<hash[0:2]>/<hash[2:]>/<name>`
//!
//! # Modules
//!
//! - `adapters`: External system integrations (HTTP)
//! - `bibtex`: BibTeX parsing, names and LaTeX to text
//! - `core`: Resolution, entries, rendering, orchestration
//! - `domain`: Data structures (BibEntry)
//! - `library`: Attachments and the hash store
//! - `notebook`: Notebook metadata and HTML export
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Add a paper by DOI
//! org-attach bib 10.1137/0206024
//!
//! # Add a BibTeX file with its PDF
//! org-attach bib refs.bib,paper.pdf
//!
//! # Add a notebook
//! org-attach ipynb analysis.ipynb
//! ```

pub mod adapters;
pub mod bibtex;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod library;
pub mod notebook;

// Re-export main types at crate root for convenience
pub use adapters::{Fetcher, HttpFetcher};
pub use config::Config;
pub use core::{EntryType, Orchestrator};
pub use domain::{BibEntry, BibOrigin};
pub use library::{Attachment, HashStore};
