//! BibTeX person names.
//!
//! Handles the three name layouts BibTeX accepts:
//! `First von Last`, `von Last, First` and `von Last, Jr, First`.

use super::latex::to_plain_text;

/// One person from an `author`/`editor` list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Person {
    pub first: Vec<String>,
    pub middle: Vec<String>,
    pub prelast: Vec<String>,
    pub last: Vec<String>,
    pub lineage: Vec<String>,
}

impl Person {
    /// Parse a single name
    pub fn parse(name: &str) -> Self {
        let parts = split_top_level(name, |c| c == ',');
        let mut person = Person::default();

        let first_middle = match parts.as_slice() {
            [] => return person,
            [single] => {
                let words = words(single);
                let n = words.len();
                if n <= 1 {
                    person.last = words;
                    return person;
                }
                match words[..n - 1].iter().position(|w| starts_lowercase(w)) {
                    Some(start) => {
                        let end = (start..n - 1)
                            .rev()
                            .find(|&k| starts_lowercase(&words[k]))
                            .unwrap_or(start);
                        person.prelast = words[start..=end].to_vec();
                        person.last = words[end + 1..].to_vec();
                        words[..start].to_vec()
                    }
                    None => {
                        person.last = vec![words[n - 1].clone()];
                        words[..n - 1].to_vec()
                    }
                }
            }
            [von_last, rest @ ..] => {
                let (prelast, last) = split_von_last(words(von_last));
                person.prelast = prelast;
                person.last = last;
                match rest {
                    [first] => words(first),
                    [lineage, first, ..] => {
                        person.lineage = words(lineage);
                        words(first)
                    }
                    [] => Vec::new(),
                }
            }
        };

        let mut given = first_middle.into_iter();
        person.first = given.next().into_iter().collect();
        person.middle = given.collect();
        person
    }

    /// "First Middle Last", rendered as plain text
    pub fn display_name(&self) -> String {
        self.first
            .iter()
            .chain(&self.middle)
            .chain(&self.last)
            .map(|w| to_plain_text(w))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Split a person list on top-level `and`
pub fn split_persons(field: &str) -> Vec<Person> {
    words(field)
        .split(|w| w.eq_ignore_ascii_case("and"))
        .filter(|group| !group.is_empty())
        .map(|group| Person::parse(&group.join(" ")))
        .collect()
}

fn split_von_last(words: Vec<String>) -> (Vec<String>, Vec<String>) {
    let n = words.len();
    let von = words
        .iter()
        .take(n.saturating_sub(1))
        .take_while(|w| starts_lowercase(w))
        .count();
    let mut prelast = words;
    let last = prelast.split_off(von);
    (prelast, last)
}

fn starts_lowercase(word: &str) -> bool {
    for c in word.chars() {
        if c == '{' {
            return false;
        }
        if c.is_alphabetic() {
            return c.is_lowercase();
        }
    }
    false
}

fn words(s: &str) -> Vec<String> {
    split_top_level(s, char::is_whitespace)
}

/// Split on separators outside of braces, dropping empty pieces
fn split_top_level(s: &str, is_separator: impl Fn(char) -> bool) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;

    for c in s.chars() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            _ => {}
        }
        if depth == 0 && is_separator(c) {
            let piece = current.trim().to_string();
            if !piece.is_empty() {
                pieces.push(piece);
            }
            current.clear();
        } else {
            current.push(c);
        }
    }
    let piece = current.trim().to_string();
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}
