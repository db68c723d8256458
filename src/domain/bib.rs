//! Bibliography entries.
//!
//! A [`BibEntry`] wraps exactly one parsed BibTeX record together with where
//! it came from. Multi-entry sources are split into one `BibEntry` per record.

use std::fmt;

use thiserror::Error;
use tracing::info;

use crate::bibtex::{self, to_plain_text, ParseError, Person};

/// Errors raised while modelling bibliography entries
#[derive(Debug, Error)]
pub enum BibError {
    #[error("Invalid bibtex: {0}")]
    Parse(#[from] ParseError),

    #[error("Wrong bibtex, no entries.")]
    NoEntries,

    #[error("Stopping at bibtex entry '{key}' because it had no 'author' field.")]
    MissingAuthor { key: String },
}

/// How a bibliography argument was interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BibOrigin {
    /// Local bibliography file
    Path,

    /// DOI resolved through doi.org
    Doi,

    /// URL serving BibTeX
    Url,

    /// HAL archive identifier
    HalId,
}

impl fmt::Display for BibOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BibOrigin::Path => write!(f, "path"),
            BibOrigin::Doi => write!(f, "doi"),
            BibOrigin::Url => write!(f, "url"),
            BibOrigin::HalId => write!(f, "halid"),
        }
    }
}

/// One bibliography record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BibEntry {
    entry: bibtex::Entry,
    origin: BibOrigin,
    arg: String,
}

impl BibEntry {
    /// Wrap a single parsed record
    pub fn new(entry: bibtex::Entry, origin: BibOrigin, arg: impl Into<String>) -> Self {
        let arg = arg.into();
        info!("New bibtex from {} {}", origin, arg);
        Self { entry, origin, arg }
    }

    /// Parse raw BibTeX and split it into one `BibEntry` per record
    pub fn from_bibtex(text: &str, origin: BibOrigin, arg: &str) -> Result<Vec<Self>, BibError> {
        let bib = bibtex::parse(text)?;
        if bib.is_empty() {
            return Err(BibError::NoEntries);
        }
        Ok(bib
            .entries
            .into_iter()
            .map(|entry| Self::new(entry, origin, arg))
            .collect())
    }

    pub fn origin(&self) -> BibOrigin {
        self.origin
    }

    /// Argument the entry was resolved from
    pub fn arg(&self) -> &str {
        &self.arg
    }

    pub fn key(&self) -> &str {
        &self.entry.key
    }

    /// Title as plain text; empty when the record has none
    pub fn title(&self) -> String {
        self.entry.field("title").map(to_plain_text).unwrap_or_default()
    }

    pub fn doi(&self) -> Option<&str> {
        self.entry.field("doi")
    }

    pub fn url(&self) -> Option<&str> {
        self.entry.field("url")
    }

    /// Link to the document itself, when the record carries one
    pub fn pdf(&self) -> Option<&str> {
        self.entry.field("pdf")
    }

    /// Authors in order; a record without any is an error
    pub fn authors(&self) -> Result<Vec<Person>, BibError> {
        match self.entry.persons("author") {
            Some(persons) if !persons.is_empty() => Ok(persons),
            _ => Err(BibError::MissingAuthor {
                key: self.entry.key.clone(),
            }),
        }
    }

    /// Authors as "First Middle Last, First Middle Last, ..."
    pub fn authors_display(&self) -> Result<String, BibError> {
        Ok(self
            .authors()?
            .iter()
            .map(Person::display_name)
            .collect::<Vec<_>>()
            .join(", "))
    }

    /// Canonical BibTeX for this record alone
    pub fn bibtex(&self) -> String {
        self.entry.to_bibtex()
    }
}
