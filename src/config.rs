//! Configuration for org-attach.
//!
//! Configuration sources (highest priority first):
//! 1. Explicit path (`--config` or `ORG_ATTACH_CONFIG`)
//! 2. `.orgattachrc` in the current directory or any parent
//! 3. `~/.config/orgattach/.orgattachrc`
//!
//! Paths in the config file are relative to the config file's directory.
//!
//! ```yaml
//! orgfile: papers.org
//! level: 2
//! bib:
//!   tags: [PAPER]
//!   todo: READ
//!   properties: [DOI, AUTHORS]
//!   sections: [Summary, Notes]
//!   pdfpath: ~/papers
//! ipynb:
//!   tags: NOTEBOOK
//!   properties: [LANGUAGE, VERSION]
//!   compile: true
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::core::EntryType;

/// Config file name looked up in the directory hierarchy
pub const CONFIG_FILE: &str = ".orgattachrc";

/// Errors raised while locating or loading the configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No configuration file found. Please add a .orgattachrc file somewhere.")]
    NotFound,

    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("No orgfile defined in the configuration file {}.", .0.display())]
    MissingOrgFile(PathBuf),

    #[error("orgfile {} does not exist.", .0.display())]
    OrgFileNotFound(PathBuf),

    #[error("Invalid level {0}: headings start at level 1.")]
    InvalidLevel(usize),

    #[error("Unknown property '{name}' for entry type '{entry_type}'.")]
    UnknownProperty { entry_type: String, name: String },
}

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    pub orgfile: Option<String>,
    pub level: Option<usize>,
    #[serde(default)]
    pub bib: TypeConfigFile,
    #[serde(default)]
    pub ipynb: TypeConfigFile,
}

/// Per-entry-type settings as written in YAML
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TypeConfigFile {
    pub tags: Option<OneOrMany>,
    pub todo: Option<String>,
    pub properties: Vec<String>,
    pub sections: Vec<String>,
    pub pdfpath: Option<String>,
    pub compile: bool,
}

/// A single tag or a list of tags
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(tag) => vec![tag],
            OneOrMany::Many(tags) => tags,
        }
    }
}

/// Resolved settings for one entry type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeConfig {
    /// Tags put on every heading of this type
    pub tags: Vec<String>,

    /// Keyword placed before the title (e.g. `TODO`)
    pub todo: Option<String>,

    /// Property names to render, in order
    pub properties: Vec<String>,

    /// Empty sub-headings added under each entry
    pub sections: Vec<String>,

    /// Directory searched for attachments named after the entry key
    pub pdfpath: Option<PathBuf>,

    /// Export notebooks to self-contained HTML before attaching
    pub compile: bool,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the config file, if loaded from one
    pub config_file: Option<PathBuf>,

    /// Outline file entries are appended to
    pub orgfile: PathBuf,

    /// Heading depth of each entry
    pub level: usize,

    pub bib: TypeConfig,
    pub ipynb: TypeConfig,
}

impl Config {
    /// Minimal configuration for the given org file
    pub fn new(orgfile: impl Into<PathBuf>) -> Self {
        Self {
            config_file: None,
            orgfile: orgfile.into(),
            level: 1,
            bib: TypeConfig::default(),
            ipynb: TypeConfig::default(),
        }
    }

    /// Settings for one entry type
    pub fn type_config(&self, entry_type: EntryType) -> &TypeConfig {
        match entry_type {
            EntryType::Bib => &self.bib,
            EntryType::Ipynb => &self.ipynb,
        }
    }

    /// Locate and load the configuration.
    ///
    /// An explicit path wins; otherwise the directory hierarchy starting at
    /// the current directory is searched, then the user config directory.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let cwd = std::env::current_dir().map_err(|source| ConfigError::Read {
                    path: PathBuf::from("."),
                    source,
                })?;
                find_config_file(&cwd).ok_or(ConfigError::NotFound)?
            }
        };
        Self::load(&path)
    }

    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        debug!("Loading config from {}", path.display());
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let raw: ConfigFile = serde_yaml::from_str(&content).map_err(|source| {
            ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })?;

        let base_dir = path.parent().unwrap_or(Path::new("."));

        let orgfile = raw
            .orgfile
            .as_deref()
            .ok_or_else(|| ConfigError::MissingOrgFile(path.to_path_buf()))?;
        let orgfile = resolve_path(base_dir, orgfile);
        if !orgfile.is_file() {
            return Err(ConfigError::OrgFileNotFound(orgfile));
        }

        let level = raw.level.unwrap_or(1);
        if level == 0 {
            return Err(ConfigError::InvalidLevel(level));
        }

        Ok(Self {
            config_file: Some(path.to_path_buf()),
            orgfile,
            level,
            bib: resolve_type(EntryType::Bib, raw.bib, base_dir)?,
            ipynb: resolve_type(EntryType::Ipynb, raw.ipynb, base_dir)?,
        })
    }
}

fn resolve_type(
    entry_type: EntryType,
    raw: TypeConfigFile,
    base_dir: &Path,
) -> Result<TypeConfig, ConfigError> {
    let known = entry_type.known_properties();
    if let Some(name) = raw.properties.iter().find(|p| !known.contains(&p.as_str())) {
        return Err(ConfigError::UnknownProperty {
            entry_type: entry_type.type_key().to_string(),
            name: name.clone(),
        });
    }

    Ok(TypeConfig {
        tags: raw.tags.map(OneOrMany::into_vec).unwrap_or_default(),
        todo: raw.todo.filter(|t| !t.is_empty()),
        properties: raw.properties,
        sections: raw.sections,
        pdfpath: raw.pdfpath.map(|p| resolve_path(base_dir, &p)),
        compile: raw.compile,
    })
}

/// Find the config file in `start` or its parents, then in the user config dir
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE);
        if config_path.is_file() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    let fallback = dirs::home_dir()?
        .join(".config")
        .join("orgattach")
        .join(CONFIG_FILE);
    fallback.is_file().then_some(fallback)
}

/// Resolve a path that may start with `~` or be relative to `base`
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let expanded = match path_str.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => match dirs::home_dir() {
            Some(home) => home.join(rest.trim_start_matches('/')),
            None => PathBuf::from(path_str),
        },
        _ => PathBuf::from(path_str),
    };

    if expanded.is_absolute() {
        expanded
    } else {
        base.join(&expanded)
            .canonicalize()
            .unwrap_or_else(|_| base.join(expanded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_config(dir: &Path, content: &str) -> PathBuf {
        let config_path = dir.join(CONFIG_FILE);
        let mut file = fs::File::create(&config_path).unwrap();
        writeln!(file, "{}", content).unwrap();
        config_path
    }

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("papers.org"), "").unwrap();
        fs::create_dir(temp.path().join("pdfs")).unwrap();
        let config_path = write_config(
            temp.path(),
            r#"
orgfile: papers.org
level: 2
bib:
  tags: [PAPER, TOREAD]
  todo: READ
  properties: [DOI, AUTHORS]
  sections: [Summary, Notes]
  pdfpath: pdfs
ipynb:
  tags: NOTEBOOK
  properties: [LANGUAGE]
  compile: true
"#,
        );

        let config = Config::load(&config_path).unwrap();
        assert_eq!(config.level, 2);
        assert_eq!(
            config.orgfile,
            temp.path().join("papers.org").canonicalize().unwrap()
        );
        assert_eq!(config.bib.tags, vec!["PAPER", "TOREAD"]);
        assert_eq!(config.bib.todo.as_deref(), Some("READ"));
        assert_eq!(config.bib.properties, vec!["DOI", "AUTHORS"]);
        assert_eq!(config.bib.sections, vec!["Summary", "Notes"]);
        assert_eq!(
            config.bib.pdfpath,
            Some(temp.path().join("pdfs").canonicalize().unwrap())
        );
        assert!(!config.bib.compile);

        assert_eq!(config.ipynb.tags, vec!["NOTEBOOK"]);
        assert!(config.ipynb.compile);
        assert_eq!(config.type_config(EntryType::Ipynb), &config.ipynb);
    }

    #[test]
    fn test_defaults() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("notes.org"), "").unwrap();
        let config_path = write_config(temp.path(), "orgfile: notes.org");

        let config = Config::load(&config_path).unwrap();
        assert_eq!(config.level, 1);
        assert_eq!(config.bib, TypeConfig::default());
        assert_eq!(config.ipynb, TypeConfig::default());
    }

    #[test]
    fn test_missing_orgfile_key() {
        let temp = TempDir::new().unwrap();
        let config_path = write_config(temp.path(), "level: 1");
        assert!(matches!(
            Config::load(&config_path),
            Err(ConfigError::MissingOrgFile(_))
        ));
    }

    #[test]
    fn test_orgfile_must_exist() {
        let temp = TempDir::new().unwrap();
        let config_path = write_config(temp.path(), "orgfile: nowhere.org");
        assert!(matches!(
            Config::load(&config_path),
            Err(ConfigError::OrgFileNotFound(_))
        ));
    }

    #[test]
    fn test_level_zero_rejected() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("notes.org"), "").unwrap();
        let config_path = write_config(temp.path(), "orgfile: notes.org\nlevel: 0");
        assert!(matches!(
            Config::load(&config_path),
            Err(ConfigError::InvalidLevel(0))
        ));
    }

    #[test]
    fn test_unknown_property_rejected() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("notes.org"), "").unwrap();
        let config_path = write_config(
            temp.path(),
            "orgfile: notes.org\nbib:\n  properties: [DOI, LANGUAGE]",
        );
        match Config::load(&config_path) {
            Err(ConfigError::UnknownProperty { entry_type, name }) => {
                assert_eq!(entry_type, "bib");
                assert_eq!(name, "LANGUAGE");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_yaml() {
        let temp = TempDir::new().unwrap();
        let config_path = write_config(temp.path(), "orgfile: [unclosed");
        assert!(matches!(
            Config::load(&config_path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_find_config_in_parent() {
        let temp = TempDir::new().unwrap();
        let config_path = write_config(temp.path(), "orgfile: notes.org");
        let nested = temp.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_config_file(&nested), Some(config_path));
    }

    #[test]
    fn test_resolve_relative_path() {
        let base = PathBuf::from("/home/user/project");

        assert_eq!(
            resolve_path(&base, "./subdir"),
            PathBuf::from("/home/user/project/./subdir")
        );
        assert_eq!(
            resolve_path(&base, "/absolute/path"),
            PathBuf::from("/absolute/path")
        );
    }

    #[test]
    fn test_resolve_home_path() {
        let home = dirs::home_dir().unwrap();
        assert_eq!(resolve_path(Path::new("/base"), "~"), home);
        assert_eq!(
            resolve_path(Path::new("/base"), "~/papers"),
            home.join("papers")
        );
    }
}
