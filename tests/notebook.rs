//! Notebook Integration Tests
//!
//! Tests notebook entries end to end, stored as is or compiled to a single
//! self-contained HTML file.

use std::fs;
use std::path::PathBuf;

use org_attach::adapters::{FetchError, Fetcher};
use org_attach::library::{hash_bytes, DATA_DIR};
use org_attach::{Config, EntryType, Orchestrator};
use tempfile::TempDir;

const NOTEBOOK: &str = r##"{
 "nbformat": 4,
 "nbformat_minor": 2,
 "metadata": {
  "kernelspec": {"name": "python3", "display_name": "Python 3", "language": "python"},
  "language_info": {"name": "python", "version": "3.6.1"}
 },
 "cells": [
  {
   "cell_type": "markdown",
   "metadata": {},
   "source": ["# Fourier analysis\n", "\n", "![spectrum](figure.png)"]
  },
  {
   "cell_type": "code",
   "execution_count": 1,
   "metadata": {},
   "source": ["x = 6 * 7\n", "x"],
   "outputs": [
    {
     "output_type": "execute_result",
     "execution_count": 1,
     "metadata": {},
     "data": {"text/plain": ["42"]}
    }
   ]
  }
 ]
}
"##;

// 1x1 transparent PNG
const PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

struct Offline;

impl Fetcher for Offline {
    fn get(&self, url: &str, _accept: Option<&str>) -> Result<Vec<u8>, FetchError> {
        Err(FetchError::InvalidUrl(url.to_string()))
    }
}

struct Workspace {
    dir: TempDir,
    orgfile: PathBuf,
    notebook: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let orgfile = dir.path().join("notebooks.org");
        fs::write(&orgfile, "").unwrap();
        let notebook = dir.path().join("fourier_analysis.ipynb");
        fs::write(&notebook, NOTEBOOK).unwrap();
        fs::write(dir.path().join("figure.png"), PNG).unwrap();
        Self {
            dir,
            orgfile,
            notebook,
        }
    }

    fn config(&self) -> Config {
        let mut config = Config::new(&self.orgfile);
        config.ipynb.tags = vec!["NOTEBOOK".to_string()];
        config.ipynb.properties = vec!["LANGUAGE".to_string(), "VERSION".to_string()];
        config
    }

    fn add(&self, config: Config) -> String {
        let mut fragments = Orchestrator::new(config, Box::new(Offline))
            .add(EntryType::Ipynb, &self.notebook.to_string_lossy())
            .unwrap();
        assert_eq!(fragments.len(), 1);
        fragments.remove(0)
    }

    fn stored(&self, hash: &str, name: &str) -> PathBuf {
        self.dir
            .path()
            .join(DATA_DIR)
            .join(&hash[..2])
            .join(&hash[2..])
            .join(name)
    }
}

#[test]
fn test_notebook_stored_as_is() {
    let ws = Workspace::new();
    let hash = hash_bytes(NOTEBOOK.as_bytes());

    let fragment = ws.add(ws.config());

    assert_eq!(
        fragment,
        format!(
            "* Fourier analysis\t:NOTEBOOK:PYTHON:ATTACH:\n\
             :PROPERTIES:\n\
             :LANGUAGE: python\n\
             :VERSION: 3.6.1\n\
             :Attachments: fourier_analysis.ipynb\n\
             :ID: {}\n\
             :END:\n",
            hash
        )
    );

    let stored = ws.stored(&hash, "fourier_analysis.ipynb");
    assert_eq!(fs::read_to_string(stored).unwrap(), NOTEBOOK);
    assert_eq!(
        fs::read_to_string(&ws.orgfile).unwrap(),
        format!("{}\n", fragment)
    );
}

#[test]
fn test_notebook_compiled_to_html() {
    let ws = Workspace::new();
    let mut config = ws.config();
    config.ipynb.compile = true;

    let fragment = ws.add(config);

    assert!(fragment.contains(":Attachments: fourier_analysis.html\n"));
    let hash = fragment
        .lines()
        .find_map(|line| line.strip_prefix(":ID: "))
        .unwrap()
        .to_string();

    let html = fs::read_to_string(ws.stored(&hash, "fourier_analysis.html")).unwrap();
    assert_eq!(hash_bytes(html.as_bytes()), hash);
    assert!(html.contains("<title>Fourier analysis</title>"));
    assert!(html.contains("<h1>Fourier analysis</h1>"));
    assert!(html.contains("In [1]:"));
    assert!(html.contains("42"));
    assert!(html.contains("src=\"data:image/png;base64,"));
    assert!(!html.contains("src=\"figure.png\""));

    // The notebook itself is not stored
    assert!(!ws
        .stored(&hash_bytes(NOTEBOOK.as_bytes()), "fourier_analysis.ipynb")
        .exists());
}

#[test]
fn test_compile_fails_on_missing_figure() {
    let ws = Workspace::new();
    fs::remove_file(ws.dir.path().join("figure.png")).unwrap();
    let mut config = ws.config();
    config.ipynb.compile = true;

    let result = Orchestrator::new(config, Box::new(Offline))
        .add(EntryType::Ipynb, &ws.notebook.to_string_lossy());

    assert!(result.is_err());
    assert!(!ws.dir.path().join(DATA_DIR).exists());
    assert_eq!(fs::read_to_string(&ws.orgfile).unwrap(), "");
}

#[test]
fn test_notebook_without_language_is_rejected() {
    let ws = Workspace::new();
    fs::write(
        &ws.notebook,
        r#"{"nbformat": 4, "nbformat_minor": 2, "metadata": {}, "cells": []}"#,
    )
    .unwrap();

    let result = Orchestrator::new(ws.config(), Box::new(Offline))
        .add(EntryType::Ipynb, &ws.notebook.to_string_lossy());

    assert!(result.is_err());
}
