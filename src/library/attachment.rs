//! Files waiting to be stored.
//!
//! An [`Attachment`] owns a private temporary directory holding one file.
//! It is consumed by [`Attachment::move_to`]; dropping it instead discards
//! the temporary copy.

use std::fmt;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{info, warn};

use super::store::hash_file;

/// How many leading bytes are inspected when guessing the file type
const SNIFF_LEN: u64 = 8192;

/// Where an attachment came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentOrigin {
    /// Looked up by bibliography key in a search directory
    Key,

    /// Downloaded from a URL
    Url,

    /// Copied from a local path
    Path,
}

impl fmt::Display for AttachmentOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttachmentOrigin::Key => write!(f, "key"),
            AttachmentOrigin::Url => write!(f, "url"),
            AttachmentOrigin::Path => write!(f, "path"),
        }
    }
}

/// A file pending storage
#[derive(Debug)]
pub struct Attachment {
    dir: TempDir,
    file_name: String,
    arg: String,
    origin: AttachmentOrigin,
}

impl Attachment {
    /// Create an attachment holding the given bytes
    pub fn from_bytes(
        file_name: &str,
        bytes: &[u8],
        arg: &str,
        origin: AttachmentOrigin,
    ) -> io::Result<Self> {
        let attachment = Self::empty(file_name, arg, origin)?;
        fs::write(attachment.path(), bytes)?;
        info!("New attachment from {} {}", origin, arg);
        Ok(attachment)
    }

    /// Create an attachment holding a copy of a local file
    pub fn from_file(
        source: &Path,
        file_name: &str,
        arg: &str,
        origin: AttachmentOrigin,
    ) -> io::Result<Self> {
        let attachment = Self::empty(file_name, arg, origin)?;
        fs::copy(source, attachment.path())?;
        info!("New attachment from {} {}", origin, arg);
        Ok(attachment)
    }

    fn empty(file_name: &str, arg: &str, origin: AttachmentOrigin) -> io::Result<Self> {
        let file_name = match Path::new(file_name).file_name() {
            Some(name) => name.to_string_lossy().to_string(),
            None => "attachment".to_string(),
        };
        Ok(Self {
            dir: tempfile::tempdir()?,
            file_name,
            arg: arg.to_string(),
            origin,
        })
    }

    /// Path of the temporary copy
    pub fn path(&self) -> PathBuf {
        self.dir.path().join(&self.file_name)
    }

    /// Argument the attachment was resolved from
    pub fn arg(&self) -> &str {
        &self.arg
    }

    pub fn origin(&self) -> AttachmentOrigin {
        self.origin
    }

    /// File name derived from the source, e.g. `paper.pdf`
    pub fn original_fullname(&self) -> &str {
        &self.file_name
    }

    /// File name without its extension
    pub fn original_name(&self) -> &str {
        Path::new(&self.file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.file_name)
    }

    /// Extension of the source file name, with its leading dot
    pub fn original_extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
    }

    /// Hex SHA-512 of the current content (recomputed on every call)
    pub fn hash(&self) -> io::Result<String> {
        hash_file(&self.path())
    }

    /// Extension for the stored file.
    ///
    /// Prefers the source name's extension, then the content's magic bytes,
    /// then `.txt` for UTF-8 text and `.bin` for anything else.
    pub fn extension(&self) -> io::Result<String> {
        if let Some(ext) = self.original_extension() {
            return Ok(ext);
        }

        let mut head = Vec::new();
        fs::File::open(self.path())?
            .take(SNIFF_LEN)
            .read_to_end(&mut head)?;

        if let Some(kind) = infer::get(&head) {
            return Ok(format!(".{}", kind.extension()));
        }
        let is_text = match std::str::from_utf8(&head) {
            Ok(_) => true,
            // Valid up to a character cut in half by the sniff window
            Err(e) => e.error_len().is_none(),
        };
        Ok(if is_text { ".txt" } else { ".bin" }.to_string())
    }

    /// Move the file to its final location and release the temporary directory.
    ///
    /// Only a failed move is an error. Once the file is in place, a temporary
    /// directory that cannot be removed is logged and left behind.
    pub fn move_to(self, target: &Path) -> io::Result<()> {
        let source = self.path();
        if fs::rename(&source, target).is_err() {
            // Temp dirs often sit on another filesystem
            fs::copy(&source, target)?;
        }
        release(self.dir);
        Ok(())
    }
}

fn release(dir: TempDir) {
    let path = dir.path().to_path_buf();
    if let Err(e) = dir.close() {
        warn!("Could not remove temporary directory {}: {}", path.display(), e);
    }
}
