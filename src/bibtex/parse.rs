//! BibTeX reader.

use std::collections::HashMap;

use thiserror::Error;
use tracing::warn;

use super::{Bibliography, Entry};

/// Errors produced while reading BibTeX text
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("duplicate entry key '{0}'")]
    DuplicateKey(String),
}

const MONTHS: [(&str, &str); 12] = [
    ("jan", "January"),
    ("feb", "February"),
    ("mar", "March"),
    ("apr", "April"),
    ("may", "May"),
    ("jun", "June"),
    ("jul", "July"),
    ("aug", "August"),
    ("sep", "September"),
    ("oct", "October"),
    ("nov", "November"),
    ("dec", "December"),
];

/// Parse BibTeX text into its entries, in source order.
///
/// Text outside of `@` commands is ignored, as are `@comment` and
/// `@preamble`. `@string` definitions are expanded into later values.
pub fn parse(src: &str) -> Result<Bibliography, ParseError> {
    let mut reader = Reader::new(src);
    let mut bib = Bibliography::default();

    while reader.skip_to_at() {
        let command = reader.identifier()?.to_lowercase();
        reader.skip_ws();

        match command.as_str() {
            "comment" => reader.skip_group(),
            "preamble" => {
                let close = reader.open_delimiter()?;
                reader.value()?;
                reader.expect(close)?;
            }
            "string" => {
                let close = reader.open_delimiter()?;
                reader.skip_ws();
                let name = reader.identifier()?.to_lowercase();
                reader.skip_ws();
                reader.expect('=')?;
                let value = reader.value()?;
                reader.skip_ws();
                reader.expect(close)?;
                reader.macros.insert(name, value);
            }
            _ => {
                let entry = reader.entry(command)?;
                if bib.entries.iter().any(|e| e.key == entry.key) {
                    return Err(ParseError::DuplicateKey(entry.key));
                }
                bib.entries.push(entry);
            }
        }
    }

    Ok(bib)
}

struct Reader<'a> {
    src: &'a str,
    pos: usize,
    macros: HashMap<String, String>,
}

impl<'a> Reader<'a> {
    fn new(src: &'a str) -> Self {
        let macros = MONTHS
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self { src, pos: 0, macros }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::Syntax {
            line: self.src[..self.pos].matches('\n').count() + 1,
            message: message.into(),
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    /// Advance past the next `@`. Returns false at end of input.
    fn skip_to_at(&mut self) -> bool {
        match self.src[self.pos..].find('@') {
            Some(offset) => {
                self.pos += offset + 1;
                true
            }
            None => {
                self.pos = self.src.len();
                false
            }
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), ParseError> {
        self.skip_ws();
        match self.peek() {
            Some(c) if c == expected => {
                self.bump();
                Ok(())
            }
            Some(c) => Err(self.error(format!("expected '{}', found '{}'", expected, c))),
            None => Err(self.error(format!("expected '{}', found end of input", expected))),
        }
    }

    /// Consume `{` or `(` and return the matching closing delimiter
    fn open_delimiter(&mut self) -> Result<char, ParseError> {
        self.skip_ws();
        match self.bump() {
            Some('{') => Ok('}'),
            Some('(') => Ok(')'),
            _ => Err(self.error("expected '{' or '('")),
        }
    }

    fn identifier(&mut self) -> Result<&'a str, ParseError> {
        let src = self.src;
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| !c.is_whitespace() && !"{}(),=\"#%'@".contains(c))
        {
            self.bump();
        }
        if self.pos == start {
            return Err(self.error("expected an identifier"));
        }
        Ok(&src[start..self.pos])
    }

    /// Skip a delimited group (used for `@comment`)
    fn skip_group(&mut self) {
        let close = match self.peek() {
            Some('{') => '}',
            Some('(') => ')',
            _ => return,
        };
        let open = self.bump().unwrap_or('{');
        let mut depth = 0usize;
        while let Some(c) = self.bump() {
            if c == open {
                depth += 1;
            } else if c == close {
                if depth == 0 {
                    return;
                }
                depth -= 1;
            }
        }
    }

    fn entry(&mut self, entry_type: String) -> Result<Entry, ParseError> {
        let close = self.open_delimiter()?;
        self.skip_ws();

        let start = self.pos;
        while self.peek().is_some_and(|c| c != ',' && c != close) {
            self.bump();
        }
        let key = self.src[start..self.pos].trim().to_string();
        if key.is_empty() {
            return Err(self.error(format!("@{} entry without a key", entry_type)));
        }

        let mut fields: Vec<(String, String)> = Vec::new();
        loop {
            self.skip_ws();
            match self.bump() {
                Some(c) if c == close => break,
                Some(',') => {}
                Some(c) => {
                    return Err(self.error(format!("unexpected '{}' in entry '{}'", c, key)))
                }
                None => return Err(self.error(format!("unterminated entry '{}'", key))),
            }

            self.skip_ws();
            if self.peek() == Some(close) {
                self.bump();
                break;
            }

            let name = self.identifier()?.to_lowercase();
            self.expect('=')?;
            let value = self.value()?;
            if fields.iter().any(|(n, _)| *n == name) {
                warn!("Entry '{}' repeats field '{}', keeping the first", key, name);
            } else {
                fields.push((name, value));
            }
        }

        Ok(Entry {
            entry_type,
            key,
            fields,
        })
    }

    /// Read a value: one or more `#`-joined parts, whitespace-normalized
    fn value(&mut self) -> Result<String, ParseError> {
        let mut raw = String::new();
        loop {
            self.skip_ws();
            match self.peek() {
                Some('{') => {
                    self.bump();
                    raw.push_str(&self.delimited('}')?);
                }
                Some('"') => {
                    self.bump();
                    raw.push_str(&self.delimited('"')?);
                }
                Some(c) if c.is_ascii_digit() => {
                    let start = self.pos;
                    while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                        self.bump();
                    }
                    raw.push_str(&self.src[start..self.pos]);
                }
                Some(_) => {
                    let name = self.identifier()?;
                    match self.macros.get(&name.to_lowercase()) {
                        Some(expansion) => raw.push_str(expansion),
                        None => {
                            warn!("Undefined BibTeX macro '{}', keeping it verbatim", name);
                            raw.push_str(name);
                        }
                    }
                }
                None => return Err(self.error("expected a value, found end of input")),
            }

            self.skip_ws();
            if self.peek() == Some('#') {
                self.bump();
            } else {
                break;
            }
        }
        Ok(normalize_whitespace(&raw))
    }

    /// Read up to the terminator at brace depth zero, consuming it
    fn delimited(&mut self, terminator: char) -> Result<String, ParseError> {
        let start = self.pos;
        let mut depth = 0usize;
        loop {
            let here = self.pos;
            match self.bump() {
                Some('{') => depth += 1,
                Some('}') if depth > 0 => depth -= 1,
                Some(c) if c == terminator && depth == 0 => {
                    return Ok(self.src[start..here].to_string());
                }
                Some('}') => return Err(self.error("unbalanced '}' in value")),
                Some(_) => {}
                None => return Err(self.error("unterminated value")),
            }
        }
    }
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
