//! Attachment storage for the org file.
//!
//! Attached files are kept next to the org file, addressed by the SHA-512
//! of their content.
//!
//! # Storage Layout
//!
//! ```text
//! <org file dir>/
//! ├── notes.org
//! └── data/
//!     └── <hash[0:2]>/              # first two hex chars
//!         └── <hash[2:]>/           # remaining 126 hex chars
//!             └── <display name>    # e.g. Fast_Pattern_Matching.pdf
//! ```

pub mod attachment;
pub mod store;

pub use attachment::{Attachment, AttachmentOrigin};
pub use store::{hash_bytes, hash_file, HashStore, StoreError, StoredArtifact, DATA_DIR};
