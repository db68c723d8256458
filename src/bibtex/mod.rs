//! Minimal BibTeX support.
//!
//! Parses raw bibliographic text into ordered entries, splits person lists
//! into structured names, renders LaTeX markup as plain text, and writes
//! entries back in a canonical form.
//!
//! The canonical form is stable: parsing the output of [`Entry::to_bibtex`]
//! yields the same entry again, which is what lets a rendered org fragment be
//! fed back in as a new source.

pub mod latex;
pub mod names;
pub mod parse;

pub use latex::to_plain_text;
pub use names::{split_persons, Person};
pub use parse::{parse, ParseError};

/// A single bibliography record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Entry type, lowercased (e.g. `article`)
    pub entry_type: String,

    /// Citation key
    pub key: String,

    /// Fields in source order, names lowercased, values with macros expanded
    pub fields: Vec<(String, String)>,
}

impl Entry {
    /// Look up a field value by (case-insensitive) name
    pub fn field(&self, name: &str) -> Option<&str> {
        let name = name.to_lowercase();
        self.fields
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Persons listed under a role such as `author` or `editor`.
    ///
    /// Returns `None` when the role is absent.
    pub fn persons(&self, role: &str) -> Option<Vec<Person>> {
        self.field(role).map(split_persons)
    }

    /// Serialize the entry in canonical form (always newline-terminated)
    pub fn to_bibtex(&self) -> String {
        let mut out = format!("@{}{{{}", self.entry_type, self.key);
        for (name, value) in &self.fields {
            out.push_str(&format!(",\n  {} = {{{}}}", name, value));
        }
        out.push_str("\n}\n");
        out
    }
}

/// An ordered collection of parsed entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bibliography {
    pub entries: Vec<Entry>,
}

impl Bibliography {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
