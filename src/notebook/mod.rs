//! Jupyter notebooks.
//!
//! Only what org-attach needs: the kernel language from the metadata, and a
//! self-contained HTML export of nbformat 4 notebooks.

pub mod export;
pub mod inline;

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

pub use export::to_html;
pub use inline::inline_resources;

/// Errors raised while reading or exporting a notebook
#[derive(Debug, Error)]
pub enum NotebookError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid notebook JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Notebook has no language_info in its metadata")]
    MissingLanguage,

    #[error("Unsupported nbformat {0}, only version 4 can be exported")]
    UnsupportedFormat(u32),

    #[error("Failed to inline resource {}: {source}", path.display())]
    Resource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Kernel language recorded in the notebook metadata
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LanguageInfo {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub language_info: Option<LanguageInfo>,
}

/// A parsed notebook document
#[derive(Debug, Clone, Deserialize)]
pub struct Notebook {
    pub nbformat: u32,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "cell_type", rename_all = "lowercase")]
pub enum Cell {
    Markdown {
        source: MultilineString,
    },
    Code {
        source: MultilineString,
        #[serde(default)]
        execution_count: Option<u32>,
        #[serde(default)]
        outputs: Vec<Output>,
    },
    Raw {
        source: MultilineString,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "output_type", rename_all = "snake_case")]
pub enum Output {
    Stream {
        #[serde(default)]
        name: String,
        text: MultilineString,
    },
    ExecuteResult {
        #[serde(default)]
        data: BTreeMap<String, serde_json::Value>,
    },
    DisplayData {
        #[serde(default)]
        data: BTreeMap<String, serde_json::Value>,
    },
    Error {
        ename: String,
        evalue: String,
        #[serde(default)]
        traceback: Vec<String>,
    },
}

/// Text stored either as one string or as a list of lines
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MultilineString {
    One(String),
    Many(Vec<String>),
}

impl MultilineString {
    pub fn text(&self) -> String {
        match self {
            MultilineString::One(s) => s.clone(),
            MultilineString::Many(lines) => lines.concat(),
        }
    }
}

impl Notebook {
    /// Parse notebook JSON
    pub fn from_json(content: &str) -> Result<Self, NotebookError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Read a notebook file
    pub fn read(path: &Path) -> Result<Self, NotebookError> {
        Self::from_json(&read_file(path)?)
    }
}

/// Read the `language_info` block of a notebook file
pub fn read_language_info(path: &Path) -> Result<LanguageInfo, NotebookError> {
    #[derive(Deserialize)]
    struct Header {
        #[serde(default)]
        metadata: Metadata,
    }

    let header: Header = serde_json::from_str(&read_file(path)?)?;
    header
        .metadata
        .language_info
        .ok_or(NotebookError::MissingLanguage)
}

fn read_file(path: &Path) -> Result<String, NotebookError> {
    fs::read_to_string(path).map_err(|source| NotebookError::Read {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    pub(crate) const SAMPLE: &str = r##"{
 "cells": [
  {"cell_type": "markdown", "metadata": {}, "source": ["# Fourier analysis\n", "Some *maths*."]},
  {"cell_type": "code", "execution_count": 1, "metadata": {}, "source": "print('hi')",
   "outputs": [
    {"output_type": "stream", "name": "stdout", "text": ["hi\n"]},
    {"output_type": "execute_result", "execution_count": 1, "metadata": {}, "data": {"text/plain": ["42"]}}
   ]},
  {"cell_type": "raw", "metadata": {}, "source": []}
 ],
 "metadata": {
  "kernelspec": {"display_name": "Python 3", "language": "python", "name": "python3"},
  "language_info": {"name": "python", "version": "3.6.1", "mimetype": "text/x-python"}
 },
 "nbformat": 4,
 "nbformat_minor": 2
}"##;

    #[test]
    fn test_read_language_info() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("fourier.ipynb");
        fs::write(&path, SAMPLE).unwrap();

        let info = read_language_info(&path).unwrap();
        assert_eq!(info.name, "python");
        assert_eq!(info.version.as_deref(), Some("3.6.1"));
    }

    #[test]
    fn test_missing_language_info() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bare.ipynb");
        fs::write(&path, r#"{"metadata": {}, "nbformat": 4, "cells": []}"#).unwrap();

        assert!(matches!(
            read_language_info(&path),
            Err(NotebookError::MissingLanguage)
        ));
    }

    #[test]
    fn test_not_json() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("paper.pdf");
        fs::write(&path, b"%PDF-1.4").unwrap();
        assert!(matches!(read_language_info(&path), Err(NotebookError::Json(_))));
    }

    #[test]
    fn test_parse_cells() {
        let notebook = Notebook::from_json(SAMPLE).unwrap();
        assert_eq!(notebook.nbformat, 4);
        assert_eq!(notebook.cells.len(), 3);
        match &notebook.cells[0] {
            Cell::Markdown { source } => {
                assert_eq!(source.text(), "# Fourier analysis\nSome *maths*.")
            }
            other => panic!("unexpected cell: {:?}", other),
        }
        match &notebook.cells[1] {
            Cell::Code { outputs, execution_count, .. } => {
                assert_eq!(*execution_count, Some(1));
                assert_eq!(outputs.len(), 2);
            }
            other => panic!("unexpected cell: {:?}", other),
        }
    }
}
