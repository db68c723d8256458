//! Resource inlining for exported HTML.
//!
//! Stylesheets, scripts and images referenced by local path are embedded so
//! the document can be stored as a single file. Remote and `data:` URIs are
//! left as they are.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use regex::Regex;
use tracing::debug;

use super::NotebookError;

fn link_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<link\b[^>]*>").expect("link pattern is valid"))
}

fn script_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)<script\b[^>]*>\s*</script\s*>").expect("script pattern is valid")
    })
}

fn img_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<img\b[^>]*>").expect("img pattern is valid"))
}

fn attribute() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
            .expect("attribute pattern is valid")
    })
}

/// Embed local stylesheets, scripts and images into `html`.
///
/// Relative paths resolve against `base_dir`. A local resource that cannot be
/// read is an error.
pub fn inline_resources(html: &str, base_dir: &Path) -> Result<String, NotebookError> {
    let html = replace_tags(html, link_tag(), |tag| {
        if attr(tag, "rel").as_deref() != Some("stylesheet")
            || attr(tag, "type").as_deref() != Some("text/css")
        {
            return Ok(None);
        }
        let Some(href) = attr(tag, "href").filter(|h| is_local(h)) else {
            return Ok(None);
        };
        let content = read_text(&resolve(base_dir, &href))?;
        Ok(Some(format!("<style type=\"text/css\">{}</style>", content)))
    })?;

    let html = replace_tags(&html, script_tag(), |tag| {
        if attr(tag, "type").as_deref() != Some("text/javascript") {
            return Ok(None);
        }
        let Some(src) = attr(tag, "src").filter(|s| is_local(s)) else {
            return Ok(None);
        };
        let content = read_text(&resolve(base_dir, &src))?;
        Ok(Some(format!(
            "<script type=\"text/javascript\">{}</script>",
            content
        )))
    })?;

    replace_tags(&html, img_tag(), |tag| {
        let Some(src) = attr(tag, "src").filter(|s| is_local(s)) else {
            return Ok(None);
        };
        let path = resolve(base_dir, &src);
        let Some(ext) = path.extension().map(|e| e.to_string_lossy().to_lowercase()) else {
            return Ok(None);
        };
        let bytes = fs::read(&path).map_err(|source| NotebookError::Resource {
            path: path.clone(),
            source,
        })?;
        let alt = attr(tag, "alt").unwrap_or_default();
        Ok(Some(format!(
            "<img alt=\"{}\" src=\"data:image/{};base64,{}\"/>",
            alt,
            ext,
            STANDARD.encode(bytes)
        )))
    })
}

/// Replace every match of `tag_re` for which `replace` returns a new tag
fn replace_tags<F>(html: &str, tag_re: &Regex, mut replace: F) -> Result<String, NotebookError>
where
    F: FnMut(&str) -> Result<Option<String>, NotebookError>,
{
    let mut out = String::with_capacity(html.len());
    let mut last = 0;
    for m in tag_re.find_iter(html) {
        if let Some(new_tag) = replace(m.as_str())? {
            debug!("Inlining {}", m.as_str());
            out.push_str(&html[last..m.start()]);
            out.push_str(&new_tag);
            last = m.end();
        }
    }
    out.push_str(&html[last..]);
    Ok(out)
}

/// Value of an attribute in a single tag, if present
fn attr(tag: &str, name: &str) -> Option<String> {
    attribute()
        .captures_iter(tag)
        .find(|caps| caps[1].eq_ignore_ascii_case(name))
        .map(|caps| {
            caps.get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default()
        })
}

fn is_local(reference: &str) -> bool {
    let lower = reference.to_ascii_lowercase();
    !(lower.is_empty()
        || lower.starts_with("http://")
        || lower.starts_with("https://")
        || lower.starts_with("//")
        || lower.starts_with("data:"))
}

fn resolve(base_dir: &Path, reference: &str) -> PathBuf {
    let path = Path::new(reference);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

fn read_text(path: &Path) -> Result<String, NotebookError> {
    fs::read_to_string(path).map_err(|source| NotebookError::Resource {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_inline_stylesheet_and_script() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("style.css"), "body { color: red; }").unwrap();
        fs::write(temp.path().join("app.js"), "var x = 1;").unwrap();

        let html = r#"<head><link rel="stylesheet" type="text/css" href="style.css"><script type="text/javascript" src="app.js"></script></head>"#;
        let inlined = inline_resources(html, temp.path()).unwrap();

        assert_eq!(
            inlined,
            r#"<head><style type="text/css">body { color: red; }</style><script type="text/javascript">var x = 1;</script></head>"#
        );
    }

    #[test]
    fn test_inline_image() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("plot.png"), b"PNGDATA").unwrap();

        let html = r#"<p><img src="plot.png" alt="A plot" /></p>"#;
        let inlined = inline_resources(html, temp.path()).unwrap();

        assert_eq!(
            inlined,
            format!(
                r#"<p><img alt="A plot" src="data:image/png;base64,{}"/></p>"#,
                STANDARD.encode(b"PNGDATA")
            )
        );
    }

    #[test]
    fn test_remote_and_data_left_alone() {
        let temp = TempDir::new().unwrap();
        let html = concat!(
            r#"<link rel="stylesheet" type="text/css" href="https://cdn.example.org/x.css">"#,
            r#"<script type="text/javascript" src="//cdn.example.org/x.js"></script>"#,
            r#"<img src="data:image/png;base64,AAAA">"#,
        );
        assert_eq!(inline_resources(html, temp.path()).unwrap(), html);
    }

    #[test]
    fn test_non_matching_tags_left_alone() {
        let temp = TempDir::new().unwrap();
        let html = r#"<link rel="icon" href="favicon.ico"><script src="app.js"></script><img src="noext">"#;
        assert_eq!(inline_resources(html, temp.path()).unwrap(), html);
    }

    #[test]
    fn test_missing_local_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let html = r#"<img src="missing.png">"#;
        assert!(matches!(
            inline_resources(html, temp.path()),
            Err(NotebookError::Resource { .. })
        ));
    }
}
