//! Content-addressed file store.

use std::ffi::OsStr;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha512};
use thiserror::Error;
use tracing::{info, warn};

use super::attachment::Attachment;

/// Name of the store directory, created next to the org file
pub const DATA_DIR: &str = "data";

/// Errors that can occur while storing an attachment
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid content hash: '{0}'")]
    InvalidDigest(String),

    #[error("Invalid attachment name: '{0}'")]
    InvalidName(String),

    #[error("Unexpected duplicate: {} already exists (file attached twice, or a hash collision)", .0.display())]
    Duplicate(PathBuf),

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A file that now lives in the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredArtifact {
    /// Hex SHA-512 of the content
    pub hash: String,

    /// Display name inside the leaf directory
    pub file_name: String,

    /// Absolute location of the stored file
    pub path: PathBuf,
}

/// Hash-bucketed store rooted at `<root>/data`
#[derive(Debug, Clone)]
pub struct HashStore {
    data_dir: PathBuf,
}

impl HashStore {
    /// Create a store under `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: root.into().join(DATA_DIR),
        }
    }

    /// Store living next to the given org file
    pub fn for_orgfile(orgfile: &Path) -> Self {
        Self::new(orgfile.parent().unwrap_or(Path::new(".")))
    }

    /// Leaf directory for a digest: `data/<digest[0:2]>/<digest[2:]>`
    pub fn leaf_dir(&self, digest: &str) -> Result<PathBuf, StoreError> {
        validate_digest(digest)?;
        Ok(self.data_dir.join(&digest[..2]).join(&digest[2..]))
    }

    /// Where a file with this digest and display name is stored
    pub fn stored_path(&self, digest: &str, display_name: &str) -> Result<PathBuf, StoreError> {
        Ok(self.leaf_dir(digest)?.join(display_name))
    }

    /// Check whether a leaf directory already exists for the digest
    pub fn contains(&self, digest: &str) -> bool {
        self.leaf_dir(digest).map(|p| p.is_dir()).unwrap_or(false)
    }

    /// Move an attachment into the store.
    ///
    /// The first-level bucket is created on demand; the leaf directory must
    /// not exist yet, otherwise [`StoreError::Duplicate`] is returned and
    /// nothing is overwritten.
    pub fn store(
        &self,
        attachment: Attachment,
        digest: &str,
        display_name: &str,
    ) -> Result<StoredArtifact, StoreError> {
        if Path::new(display_name).file_name() != Some(OsStr::new(display_name)) {
            return Err(StoreError::InvalidName(display_name.to_string()));
        }

        let leaf = self.leaf_dir(digest)?;
        let bucket = leaf.parent().unwrap_or(&self.data_dir).to_path_buf();
        fs::create_dir_all(&bucket).map_err(|source| StoreError::Io {
            path: bucket.clone(),
            source,
        })?;

        if let Err(source) = fs::create_dir(&leaf) {
            if source.kind() == io::ErrorKind::AlreadyExists {
                return Err(StoreError::Duplicate(leaf));
            }
            return Err(StoreError::Io { path: leaf, source });
        }

        let target = leaf.join(display_name);
        if let Err(source) = attachment.move_to(&target) {
            // A leftover leaf would make every retry look like a duplicate
            if let Err(e) = fs::remove_dir_all(&leaf) {
                warn!("Could not remove {}: {}", leaf.display(), e);
            }
            return Err(StoreError::Io {
                path: target,
                source,
            });
        }

        info!("Stored {} as {}", display_name, target.display());
        Ok(StoredArtifact {
            hash: digest.to_string(),
            file_name: display_name.to_string(),
            path: target,
        })
    }
}

fn validate_digest(digest: &str) -> Result<(), StoreError> {
    if digest.len() <= 2 || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(StoreError::InvalidDigest(digest.to_string()));
    }
    Ok(())
}

/// Hex SHA-512 of everything the reader yields, read in chunks
pub fn hash_reader<R: Read>(mut reader: R) -> io::Result<String> {
    let mut hasher = Sha512::new();
    io::copy(&mut reader, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

/// Hex SHA-512 of a file's content
pub fn hash_file(path: &Path) -> io::Result<String> {
    hash_reader(fs::File::open(path)?)
}

/// Hex SHA-512 of an in-memory buffer
pub fn hash_bytes(bytes: &[u8]) -> String {
    hex::encode(Sha512::digest(bytes))
}
