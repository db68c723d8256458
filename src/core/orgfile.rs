//! The outline file entries are appended to.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Append-only handle on an org file
#[derive(Debug, Clone)]
pub struct OrgFile {
    path: PathBuf,
}

impl OrgFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `fragment` followed by a newline
    pub fn append(&self, fragment: &str) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(fragment.as_bytes())?;
        file.write_all(b"\n")?;
        file.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_append_keeps_existing_content() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("notes.org");
        fs::write(&path, "#+TITLE: Notes\n").unwrap();

        let org = OrgFile::new(&path);
        org.append("* First").unwrap();
        org.append("* Second\n:PROPERTIES:\n:END:").unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "#+TITLE: Notes\n* First\n* Second\n:PROPERTIES:\n:END:\n"
        );
    }
}
