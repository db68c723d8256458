//! HTML export of notebooks.

use std::sync::OnceLock;

use pulldown_cmark::{html, Options, Parser};
use regex::Regex;
use serde_json::Value;

use super::{Cell, Notebook, NotebookError, Output};

const STYLE: &str = "\
body { max-width: 60em; margin: 2em auto; font-family: sans-serif; line-height: 1.5; }
.cell { margin: 1em 0; }
.input pre { background: #f7f7f7; border: 1px solid #cfcfcf; padding: 0.5em; }
.prompt { color: #303f9f; font-family: monospace; }
.output pre { padding: 0.5em; }
.output .stderr, .output .error { background: #fdd; }
img { max-width: 100%; }
";

/// Image types embedded as data URIs, in order of preference
const IMAGE_TYPES: [&str; 3] = ["image/png", "image/jpeg", "image/svg+xml"];

/// Render a notebook as one HTML document.
///
/// Images produced by the notebook are embedded; references written by hand
/// in markdown cells are left for [`super::inline_resources`].
pub fn to_html(notebook: &Notebook, title: &str) -> Result<String, NotebookError> {
    if notebook.nbformat < 4 {
        return Err(NotebookError::UnsupportedFormat(notebook.nbformat));
    }

    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str(&format!("<title>{}</title>\n", escape_html(title)));
    out.push_str(&format!("<style type=\"text/css\">\n{}</style>\n", STYLE));
    out.push_str("</head>\n<body>\n");

    for cell in &notebook.cells {
        match cell {
            Cell::Markdown { source } => {
                out.push_str("<div class=\"cell markdown\">\n");
                out.push_str(&markdown_to_html(&source.text()));
                out.push_str("</div>\n");
            }
            Cell::Code {
                source,
                execution_count,
                outputs,
            } => {
                let prompt = execution_count
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| " ".to_string());
                out.push_str("<div class=\"cell code\">\n<div class=\"input\">");
                out.push_str(&format!("<span class=\"prompt\">In [{}]:</span>", prompt));
                out.push_str(&format!(
                    "<pre><code>{}</code></pre></div>\n",
                    escape_html(&source.text())
                ));
                if !outputs.is_empty() {
                    out.push_str("<div class=\"output\">\n");
                    for output in outputs {
                        out.push_str(&output_to_html(output));
                    }
                    out.push_str("</div>\n");
                }
                out.push_str("</div>\n");
            }
            Cell::Raw { source } => {
                out.push_str(&format!(
                    "<div class=\"cell raw\"><pre>{}</pre></div>\n",
                    escape_html(&source.text())
                ));
            }
        }
    }

    out.push_str("</body>\n</html>\n");
    Ok(out)
}

fn markdown_to_html(source: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut html_out = String::new();
    html::push_html(&mut html_out, Parser::new_ext(source, options));
    html_out
}

fn output_to_html(output: &Output) -> String {
    match output {
        Output::Stream { name, text } => format!(
            "<pre class=\"{}\">{}</pre>\n",
            escape_html(name),
            escape_html(&text.text())
        ),
        Output::ExecuteResult { data } | Output::DisplayData { data } => {
            for mime in IMAGE_TYPES {
                if let Some(content) = data.get(mime).map(value_text) {
                    let encoded = if mime == "image/svg+xml" {
                        use base64::Engine;
                        base64::engine::general_purpose::STANDARD.encode(content.as_bytes())
                    } else {
                        content.split_whitespace().collect()
                    };
                    return format!("<img src=\"data:{};base64,{}\">\n", mime, encoded);
                }
            }
            if let Some(content) = data.get("text/html") {
                return format!("<div>{}</div>\n", value_text(content));
            }
            match data.get("text/plain") {
                Some(content) => format!("<pre>{}</pre>\n", escape_html(&value_text(content))),
                None => String::new(),
            }
        }
        Output::Error {
            ename,
            evalue,
            traceback,
        } => {
            let text = if traceback.is_empty() {
                format!("{}: {}", ename, evalue)
            } else {
                traceback.join("\n")
            };
            format!(
                "<pre class=\"error\">{}</pre>\n",
                escape_html(&strip_ansi(&text))
            )
        }
    }
}

/// Text of a MIME bundle value (a string or a list of lines)
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(lines) => lines.iter().filter_map(Value::as_str).collect(),
        other => other.to_string(),
    }
}

fn strip_ansi(text: &str) -> String {
    static ANSI: OnceLock<Regex> = OnceLock::new();
    let ansi = ANSI.get_or_init(|| {
        Regex::new(r"\x1b\[[0-9;]*[A-Za-z]").expect("ANSI escape pattern is valid")
    });
    ansi.replace_all(text, "").into_owned()
}

/// Escape text for use in HTML content or a quoted attribute
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notebook::MultilineString;
    use std::collections::BTreeMap;

    #[test]
    fn test_export_sample() {
        let notebook = Notebook::from_json(crate::notebook::tests::SAMPLE).unwrap();
        let html = to_html(&notebook, "Fourier analysis").unwrap();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Fourier analysis</title>"));
        assert!(html.contains("<h1>Fourier analysis</h1>"));
        assert!(html.contains("<em>maths</em>"));
        assert!(html.contains("print(&#39;hi&#39;)"));
        assert!(html.contains("<pre class=\"stdout\">hi\n</pre>"));
        assert!(html.contains("<pre>42</pre>"));
        assert!(html.trim_end().ends_with("</html>"));
    }

    #[test]
    fn test_old_format_rejected() {
        let notebook = Notebook {
            nbformat: 3,
            metadata: Default::default(),
            cells: vec![],
        };
        assert!(matches!(
            to_html(&notebook, "x"),
            Err(NotebookError::UnsupportedFormat(3))
        ));
    }

    #[test]
    fn test_png_output_embedded() {
        let mut data = BTreeMap::new();
        data.insert("image/png".to_string(), Value::String("iVBORw0K\nGgo=\n".into()));
        data.insert("text/plain".to_string(), Value::String("<Figure>".into()));
        let html = output_to_html(&Output::DisplayData { data });
        assert_eq!(html, "<img src=\"data:image/png;base64,iVBORw0KGgo=\">\n");
    }

    #[test]
    fn test_error_traceback_without_colors() {
        let output = Output::Error {
            ename: "ZeroDivisionError".into(),
            evalue: "division by zero".into(),
            traceback: vec!["\u{1b}[0;31mZeroDivisionError\u{1b}[0m: division by zero".into()],
        };
        assert_eq!(
            output_to_html(&output),
            "<pre class=\"error\">ZeroDivisionError: division by zero</pre>\n"
        );
    }

    #[test]
    fn test_stream_text_escaped() {
        let output = Output::Stream {
            name: "stderr".into(),
            text: MultilineString::Many(vec!["a < b\n".into()]),
        };
        assert_eq!(output_to_html(&output), "<pre class=\"stderr\">a &lt; b\n</pre>\n");
    }
}
