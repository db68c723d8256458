//! Org-mode rendering of entries.
//!
//! A fragment has three blocks:
//!
//! ```text
//! * TODO Title	:TAG1:TAG2:ATTACH:
//! :PROPERTIES:
//! :DOI: 10.1137/0206024
//! :Attachments: Title.pdf
//! :ID: <sha512>
//! :END:
//! ** Section
//! body
//! ```
//!
//! Rendering is a pure function of the entry and the attachment identity.

use super::entry::EntryModel;

/// Name and hash of an attachment as recorded in the properties drawer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentIdentity {
    pub file_name: String,
    pub hash: String,
}

/// Renders entries at a fixed heading depth
#[derive(Debug, Clone, Copy)]
pub struct EntryRenderer {
    level: usize,
}

impl EntryRenderer {
    pub fn new(level: usize) -> Self {
        Self {
            level: level.max(1),
        }
    }

    /// Render one entry as an org fragment.
    ///
    /// The sections block is always present, so an entry without sections
    /// ends with an empty line.
    pub fn render(&self, entry: &dyn EntryModel, attachment: Option<&AttachmentIdentity>) -> String {
        let blocks = [
            self.header(entry),
            self.properties(entry, attachment),
            self.sections(entry),
        ];

        // An empty sections block still leaves its line
        blocks
            .join("\n")
            .split('\n')
            .map(str::trim_end)
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn header(&self, entry: &dyn EntryModel) -> String {
        let mut words = vec!["*".repeat(self.level)];
        if let Some(todo) = &entry.config().todo {
            words.push(todo.clone());
        }
        words.push(entry.title());

        format!("{}\t:{}:", words.join(" "), entry.tags().join(":"))
    }

    fn properties(&self, entry: &dyn EntryModel, attachment: Option<&AttachmentIdentity>) -> String {
        let mut properties = entry.properties();
        if let Some(identity) = attachment {
            properties.push(("Attachments".to_string(), identity.file_name.clone()));
            properties.push(("ID".to_string(), identity.hash.clone()));
        }

        let mut lines = vec![":PROPERTIES:".to_string()];
        lines.extend(properties.into_iter().map(|(name, value)| {
            if value.is_empty() {
                format!(":{}:", name)
            } else {
                format!(":{}: {}", name, value)
            }
        }));
        lines.push(":END:".to_string());
        lines.join("\n")
    }

    fn sections(&self, entry: &dyn EntryModel) -> String {
        let stars = "*".repeat(self.level + 1);
        entry
            .sections()
            .into_iter()
            .map(|section| match section.body.filter(|b| !b.is_empty()) {
                Some(body) => format!("{} {}\n{}", stars, section.heading, body),
                None => format!("{} {}", stars, section.heading),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TypeConfig;
    use crate::core::entry::Section;
    use crate::library::Attachment;
    use std::io;

    struct Fixed {
        config: TypeConfig,
        title: String,
        extra: Vec<Section>,
    }

    impl EntryModel for Fixed {
        fn config(&self) -> &TypeConfig {
            &self.config
        }

        fn title(&self) -> String {
            self.title.clone()
        }

        fn property(&self, name: &str) -> Option<String> {
            match name {
                "DOI" => Some("10.1/x".to_string()),
                _ => None,
            }
        }

        fn extra_sections(&self) -> Vec<Section> {
            self.extra.clone()
        }

        fn attachment(&self) -> Option<&Attachment> {
            None
        }

        fn attachment_file_name(&self) -> io::Result<Option<String>> {
            Ok(None)
        }
    }

    fn fixed(config: TypeConfig) -> Fixed {
        Fixed {
            config,
            title: "A Title".to_string(),
            extra: vec![Section::new("Body", Some("line one\nline two   ".to_string()))],
        }
    }

    #[test]
    fn test_full_fragment() {
        let entry = fixed(TypeConfig {
            tags: vec!["PAPER".to_string(), "NEW".to_string()],
            todo: Some("READ".to_string()),
            properties: vec!["DOI".to_string(), "URL".to_string()],
            sections: vec!["Notes".to_string()],
            ..Default::default()
        });
        let identity = AttachmentIdentity {
            file_name: "A_Title.pdf".to_string(),
            hash: "abcdef".to_string(),
        };

        let fragment = EntryRenderer::new(2).render(&entry, Some(&identity));
        assert_eq!(
            fragment,
            "** READ A Title\t:PAPER:NEW:\n\
             :PROPERTIES:\n\
             :DOI: 10.1/x\n\
             :URL:\n\
             :Attachments: A_Title.pdf\n\
             :ID: abcdef\n\
             :END:\n\
             *** Notes\n\
             *** Body\n\
             line one\n\
             line two"
        );
    }

    #[test]
    fn test_no_tags_no_todo() {
        let entry = fixed(TypeConfig::default());
        let fragment = EntryRenderer::new(1).render(&entry, None);
        assert_eq!(
            fragment,
            "* A Title\t::\n:PROPERTIES:\n:END:\n** Body\nline one\nline two"
        );
    }

    #[test]
    fn test_without_sections_block() {
        let mut entry = fixed(TypeConfig::default());
        entry.extra.clear();
        assert_eq!(
            EntryRenderer::new(1).render(&entry, None),
            "* A Title\t::\n:PROPERTIES:\n:END:\n"
        );
    }

    #[test]
    fn test_blank_title_keeps_header_shape() {
        let mut entry = fixed(TypeConfig::default());
        entry.title = String::new();
        entry.extra.clear();
        let fragment = EntryRenderer::new(1).render(&entry, None);
        assert_eq!(fragment.lines().next(), Some("* \t::"));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let entry = fixed(TypeConfig {
            tags: vec!["X".to_string()],
            properties: vec!["DOI".to_string()],
            ..Default::default()
        });
        let renderer = EntryRenderer::new(1);
        assert_eq!(renderer.render(&entry, None), renderer.render(&entry, None));
    }
}
