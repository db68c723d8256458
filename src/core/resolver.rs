//! Source resolution.
//!
//! Turns a free-form command-line token into BibTeX text or file bytes by
//! trying each interpretation in a fixed order. Local files come first:
//! checking them is cheap and unambiguous, and a path that happens to look
//! like an identifier must not trigger a network round-trip.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use glob::{glob, Pattern};
use thiserror::Error;
use tracing::{debug, warn};

use crate::adapters::{FetchError, Fetcher};
use crate::domain::{BibEntry, BibOrigin};
use crate::library::{Attachment, AttachmentOrigin};

/// DOI resolver; the argument is appended
pub const DOI_RESOLVER: &str = "https://doi.org/";

/// HAL archive endpoint serving BibTeX for an identifier
pub const HAL_BIBTEX_URL: &str = "https://hal.archives-ouvertes.fr/{id}/bibtex";

/// Media type requested from DOI and URL sources
pub const BIBTEX_MIME: &str = "application/x-bibtex";

/// Errors raised while resolving an argument
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Argument {arg} is not an understandable format (not a DOI, not a path to a bibtex file, etc.).")]
    UnrecognizedBibliography { arg: String },

    #[error("Argument {arg} is neither an existing file nor a downloadable URL.")]
    UnrecognizedFile { arg: String },

    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("Couldn't find file '{key}' in '{}'", dir.display())]
    KeyNotFound { key: String, dir: PathBuf },

    #[error("Invalid search pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Why a single candidate interpretation did not apply
#[derive(Debug, Error)]
enum CandidateError {
    #[error("not a file")]
    NotAFile,

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

type BibCandidate = fn(&SourceResolver, &str) -> Result<String, CandidateError>;
type FileCandidate = fn(&SourceResolver, &str) -> Result<Attachment, CandidateError>;

/// Interpretations of a bibliography argument, in the order they are tried
const BIB_CANDIDATES: [(BibOrigin, BibCandidate); 4] = [
    (BibOrigin::Path, SourceResolver::bibtex_from_file),
    (BibOrigin::Doi, SourceResolver::bibtex_from_doi),
    (BibOrigin::Url, SourceResolver::bibtex_from_url),
    (BibOrigin::HalId, SourceResolver::bibtex_from_halid),
];

/// Interpretations of a file argument, in the order they are tried
const FILE_CANDIDATES: [(AttachmentOrigin, FileCandidate); 2] = [
    (AttachmentOrigin::Path, SourceResolver::file_from_path),
    (AttachmentOrigin::Url, SourceResolver::file_from_url),
];

/// Resolves arguments against the filesystem and the web
pub struct SourceResolver {
    fetcher: Box<dyn Fetcher>,
}

impl SourceResolver {
    pub fn new(fetcher: Box<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    /// Resolve a bibliography argument into one entry per record.
    ///
    /// The first interpretation that yields parseable BibTeX with at least
    /// one record wins. Fetch and parse failures both fall through to the
    /// next interpretation.
    pub fn resolve_bibliography(&self, arg: &str) -> Result<Vec<BibEntry>, ResolveError> {
        for (origin, candidate) in BIB_CANDIDATES {
            let text = match candidate(self, arg) {
                Ok(text) => text,
                Err(e) => {
                    debug!("{} is not a {}: {}", arg, origin, e);
                    continue;
                }
            };
            if text.trim().is_empty() {
                debug!("{} as {} gave no content", arg, origin);
                continue;
            }
            match BibEntry::from_bibtex(&text, origin, arg) {
                Ok(entries) => return Ok(entries),
                Err(e) => warn!("{} as {} did not give usable bibtex: {}", arg, origin, e),
            }
        }
        Err(ResolveError::UnrecognizedBibliography {
            arg: arg.to_string(),
        })
    }

    /// Resolve a file argument: a local path, else a URL
    pub fn resolve_file(&self, arg: &str) -> Result<Attachment, ResolveError> {
        for (origin, candidate) in FILE_CANDIDATES {
            match candidate(self, arg) {
                Ok(attachment) => return Ok(attachment),
                Err(e) => debug!("{} is not a {}: {}", arg, origin, e),
            }
        }
        Err(ResolveError::UnrecognizedFile {
            arg: arg.to_string(),
        })
    }

    /// Find a file named `key` (extension ignored) anywhere under `dir`.
    ///
    /// Matches are visited in sorted path order; the first one wins.
    pub fn resolve_file_by_key(&self, dir: &Path, key: &str) -> Result<Attachment, ResolveError> {
        if !dir.is_dir() {
            return Err(ResolveError::NotADirectory(dir.to_path_buf()));
        }

        let pattern = format!(
            "{}/**/*",
            Pattern::escape(&dir.to_string_lossy()).trim_end_matches('/')
        );
        for path in glob(&pattern)?.flatten() {
            if !path.is_file() {
                continue;
            }
            if path.file_stem().and_then(|s| s.to_str()) != Some(key) {
                continue;
            }
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| key.to_string());
            return Attachment::from_file(&path, &file_name, key, AttachmentOrigin::Key)
                .map_err(|source| ResolveError::Io { path, source });
        }

        Err(ResolveError::KeyNotFound {
            key: key.to_string(),
            dir: dir.to_path_buf(),
        })
    }

    fn bibtex_from_file(&self, arg: &str) -> Result<String, CandidateError> {
        if !Path::new(arg).is_file() {
            return Err(CandidateError::NotAFile);
        }
        Ok(fs::read_to_string(arg)?)
    }

    fn bibtex_from_doi(&self, arg: &str) -> Result<String, CandidateError> {
        let url = format!("{}{}", DOI_RESOLVER, arg);
        Ok(self.fetcher.get_text(&url, Some(BIBTEX_MIME))?)
    }

    fn bibtex_from_url(&self, arg: &str) -> Result<String, CandidateError> {
        Ok(self.fetcher.get_text(arg, Some(BIBTEX_MIME))?)
    }

    fn bibtex_from_halid(&self, arg: &str) -> Result<String, CandidateError> {
        let url = HAL_BIBTEX_URL.replace("{id}", arg);
        Ok(self.fetcher.get_text(&url, None)?)
    }

    fn file_from_path(&self, arg: &str) -> Result<Attachment, CandidateError> {
        let path = Path::new(arg);
        if !path.is_file() {
            return Err(CandidateError::NotAFile);
        }
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(Attachment::from_file(path, &file_name, arg, AttachmentOrigin::Path)?)
    }

    fn file_from_url(&self, arg: &str) -> Result<Attachment, CandidateError> {
        let bytes = self.fetcher.get(arg, None)?;
        Ok(Attachment::from_bytes(
            &url_file_name(arg),
            &bytes,
            arg,
            AttachmentOrigin::Url,
        )?)
    }
}

/// Last segment of a URL's path, ignoring query and fragment
fn url_file_name(url: &str) -> String {
    let path = match reqwest::Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.split(|c| c == '?' || c == '#').next().unwrap_or_default().to_string(),
    };
    let name = path.rsplit('/').next().unwrap_or_default();
    if name.is_empty() {
        "attachment".to_string()
    } else {
        name.to_string()
    }
}
