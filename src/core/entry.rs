//! Org entries built from resolved sources.
//!
//! Every entry type exposes the same capabilities through [`EntryModel`]:
//! a title, configured properties, tags, sections and an optional pending
//! attachment. [`OrgEntry`] is the closed set of variants, dispatched by the
//! [`EntryType`] given on the command line.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::config::TypeConfig;
use crate::domain::{BibEntry, BibError};
use crate::library::{Attachment, AttachmentOrigin};
use crate::notebook::{self, LanguageInfo, Notebook, NotebookError};

use super::render::AttachmentIdentity;

/// Tag added to every entry that carries an attachment
pub const ATTACH_TAG: &str = "ATTACH";

/// Errors raised while building an entry
#[derive(Debug, Error)]
pub enum EntryError {
    #[error(transparent)]
    Bib(#[from] BibError),

    #[error(transparent)]
    Notebook(#[from] NotebookError),

    #[error("Failed to prepare attachment: {0}")]
    Io(#[from] io::Error),
}

/// Kinds of entries org-attach can add
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryType {
    /// Bibliography record (DOI, URL, HAL id or BibTeX file)
    Bib,

    /// Jupyter notebook
    Ipynb,
}

impl EntryType {
    /// Key of this type's section in the config file
    pub fn type_key(&self) -> &'static str {
        match self {
            EntryType::Bib => "bib",
            EntryType::Ipynb => "ipynb",
        }
    }

    /// Property names this type can fill in
    pub fn known_properties(&self) -> &'static [&'static str] {
        match self {
            EntryType::Bib => &["DOI", "URL", "AUTHORS"],
            EntryType::Ipynb => &["LANGUAGE", "VERSION"],
        }
    }
}

/// A sub-heading under an entry, with optional literal body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub heading: String,
    pub body: Option<String>,
}

impl Section {
    pub fn new(heading: impl Into<String>, body: Option<String>) -> Self {
        Self {
            heading: heading.into(),
            body,
        }
    }
}

/// Capabilities shared by every entry type
pub trait EntryModel {
    /// Settings for this entry's type
    fn config(&self) -> &TypeConfig;

    /// Heading title, as plain text
    fn title(&self) -> String;

    /// Value of one of the type's known properties
    fn property(&self, name: &str) -> Option<String>;

    /// Tags specific to this entry, added after the configured ones
    fn extra_tags(&self) -> Vec<String> {
        Vec::new()
    }

    /// Sections specific to this entry, added after the configured ones
    fn extra_sections(&self) -> Vec<Section> {
        Vec::new()
    }

    /// Attachment waiting to be stored, if any
    fn attachment(&self) -> Option<&Attachment>;

    /// Name the attachment gets inside the store
    fn attachment_file_name(&self) -> io::Result<Option<String>>;

    /// Configured properties in configuration order
    fn properties(&self) -> Vec<(String, String)> {
        self.config()
            .properties
            .iter()
            .map(|name| (name.clone(), self.property(name).unwrap_or_default()))
            .collect()
    }

    /// Configured tags, then entry tags, then `ATTACH` when attached
    fn tags(&self) -> Vec<String> {
        let mut tags = self.config().tags.clone();
        tags.extend(self.extra_tags());
        if self.attachment().is_some() {
            tags.push(ATTACH_TAG.to_string());
        }
        tags
    }

    /// Configured (empty) sections, then entry sections
    fn sections(&self) -> Vec<Section> {
        let mut sections: Vec<Section> = self
            .config()
            .sections
            .iter()
            .map(|heading| Section::new(heading.clone(), None))
            .collect();
        sections.extend(self.extra_sections());
        sections
    }

    /// Store name and content hash of the pending attachment
    fn attachment_identity(&self) -> io::Result<Option<AttachmentIdentity>> {
        let (Some(attachment), Some(file_name)) =
            (self.attachment(), self.attachment_file_name()?)
        else {
            return Ok(None);
        };
        Ok(Some(AttachmentIdentity {
            file_name,
            hash: attachment.hash()?,
        }))
    }
}

/// Entry for one bibliography record
#[derive(Debug)]
pub struct BibOrgEntry {
    config: TypeConfig,
    bib: BibEntry,
    authors: String,
    attachment: Option<Attachment>,
}

impl BibOrgEntry {
    /// Build the entry; a record without authors is rejected here
    pub fn new(
        config: &TypeConfig,
        bib: BibEntry,
        attachment: Option<Attachment>,
    ) -> Result<Self, EntryError> {
        let authors = bib.authors_display()?;
        Ok(Self {
            config: config.clone(),
            bib,
            authors,
            attachment,
        })
    }
}

impl EntryModel for BibOrgEntry {
    fn config(&self) -> &TypeConfig {
        &self.config
    }

    fn title(&self) -> String {
        self.bib.title()
    }

    fn property(&self, name: &str) -> Option<String> {
        match name {
            "DOI" => self.bib.doi().map(str::to_string),
            "URL" => self.bib.url().map(str::to_string),
            "AUTHORS" => Some(self.authors.clone()),
            _ => None,
        }
    }

    fn extra_sections(&self) -> Vec<Section> {
        let body = format!(
            "#+BEGIN_SRC bib :tangle bibliography.bib\n{}#+END_SRC",
            self.bib.bibtex()
        );
        vec![Section::new("BibTeX", Some(body))]
    }

    fn attachment(&self) -> Option<&Attachment> {
        self.attachment.as_ref()
    }

    /// Title with separators replaced by underscores, plus the extension
    fn attachment_file_name(&self) -> io::Result<Option<String>> {
        let Some(attachment) = &self.attachment else {
            return Ok(None);
        };
        let title = self.bib.title();
        let stem = if title.trim().is_empty() {
            self.bib.key().to_string()
        } else {
            title
        };
        let stem: String = stem
            .chars()
            .map(|c| if c == ' ' || c == '/' || c == '\\' { '_' } else { c })
            .collect();
        Ok(Some(format!("{}{}", stem, attachment.extension()?)))
    }
}

/// Entry for one notebook
#[derive(Debug)]
pub struct IpynbOrgEntry {
    config: TypeConfig,
    attachment: Attachment,
    language: LanguageInfo,
    resource_dir: Option<PathBuf>,
    compiled: bool,
}

impl IpynbOrgEntry {
    /// Build the entry from the notebook attachment
    pub fn new(config: &TypeConfig, attachment: Attachment) -> Result<Self, EntryError> {
        let language = notebook::read_language_info(&attachment.path())?;
        let resource_dir = match attachment.origin() {
            AttachmentOrigin::Path => Path::new(attachment.arg())
                .parent()
                .map(|p| if p.as_os_str().is_empty() { Path::new(".") } else { p })
                .map(Path::to_path_buf),
            _ => None,
        };
        Ok(Self {
            config: config.clone(),
            attachment,
            language,
            resource_dir,
            compiled: false,
        })
    }

    /// Replace the notebook with its self-contained HTML export.
    ///
    /// Only runs when `compile` is configured, and at most once. The
    /// attachment is swapped only after the export fully succeeded.
    pub fn compile(&mut self) -> Result<(), EntryError> {
        if !self.config.compile || self.compiled {
            return Ok(());
        }

        let notebook = Notebook::read(&self.attachment.path())?;
        let html = notebook::to_html(&notebook, &self.title())?;
        let base_dir = match &self.resource_dir {
            Some(dir) => dir.clone(),
            None => self
                .attachment
                .path()
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        };
        let html = notebook::inline_resources(&html, &base_dir)?;

        let file_name = format!("{}.html", self.attachment.original_name());
        let compiled = Attachment::from_bytes(
            &file_name,
            html.as_bytes(),
            self.attachment.arg(),
            self.attachment.origin(),
        )?;
        info!("Compiled {} to {}", self.attachment.arg(), file_name);

        self.attachment = compiled;
        self.compiled = true;
        Ok(())
    }
}

impl EntryModel for IpynbOrgEntry {
    fn config(&self) -> &TypeConfig {
        &self.config
    }

    /// File name with underscores as spaces, first letter capitalized
    fn title(&self) -> String {
        let name = self.attachment.original_name().replace('_', " ");
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    fn property(&self, name: &str) -> Option<String> {
        match name {
            "LANGUAGE" => Some(self.language.name.clone()),
            "VERSION" => self.language.version.clone(),
            _ => None,
        }
    }

    fn extra_tags(&self) -> Vec<String> {
        vec![self.language.name.to_uppercase()]
    }

    fn attachment(&self) -> Option<&Attachment> {
        Some(&self.attachment)
    }

    fn attachment_file_name(&self) -> io::Result<Option<String>> {
        Ok(Some(self.attachment.original_fullname().to_string()))
    }
}

/// The closed set of entry variants
#[derive(Debug)]
pub enum OrgEntry {
    Bib(BibOrgEntry),
    Ipynb(IpynbOrgEntry),
}

impl OrgEntry {
    pub fn model(&self) -> &dyn EntryModel {
        match self {
            OrgEntry::Bib(entry) => entry,
            OrgEntry::Ipynb(entry) => entry,
        }
    }

    /// Run the type's one-time transform before rendering
    pub fn finalize(mut self) -> Result<Self, EntryError> {
        if let OrgEntry::Ipynb(entry) = &mut self {
            entry.compile()?;
        }
        Ok(self)
    }

    /// Give up the pending attachment for storage
    pub fn into_attachment(self) -> Option<Attachment> {
        match self {
            OrgEntry::Bib(entry) => entry.attachment,
            OrgEntry::Ipynb(entry) => Some(entry.attachment),
        }
    }
}
