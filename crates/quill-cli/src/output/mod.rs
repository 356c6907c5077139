//! Output formatting for quill.
//!
//! Successful results and failures are both written to stdout, as text or
//! JSON, so callers can parse either from the same stream.

use anyhow::Result;
use serde::Serialize;
use std::io::{self, Write};

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Plain text format - one record per line, IDs first
    #[default]
    Text,
    /// JSON format - machine-readable output
    Json,
}

/// Structured failure response.
#[derive(Debug, Serialize)]
pub struct Failure<'a> {
    pub error: &'a str,
    pub message: String,
}

/// Formatter that can output data in text or JSON format
#[derive(Debug, Clone)]
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Create a new formatter with the specified output format
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Format data according to the configured output format
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(data)?),
            OutputFormat::Text => {
                let json_value = serde_json::to_value(data)?;
                Ok(render_text(&json_value))
            }
        }
    }

    /// Format and print data to stdout
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails
    pub fn print<T: Serialize>(&self, data: &T) -> Result<()> {
        let output = self.format(data)?;
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{output}")?;
        Ok(())
    }

    /// Format and print a list.
    ///
    /// For JSON format, wraps the array in a named object with a count field.
    /// For text, prints one record per line.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails
    pub fn print_list<T: Serialize>(&self, data: &[T], collection_name: &str) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                let mut envelope = serde_json::Map::new();
                envelope.insert(collection_name.to_string(), serde_json::to_value(data)?);
                envelope.insert("count".to_string(), serde_json::json!(data.len()));
                self.print(&serde_json::Value::Object(envelope))
            }
            OutputFormat::Text => self.print(&data),
        }
    }

    /// Print a failure response.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails
    pub fn print_failure(&self, kind: &str, message: String) -> Result<()> {
        self.print(&Failure {
            error: kind,
            message,
        })
    }
}

/// Render a JSON value as concise text
fn render_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Object(map) => {
            // ID-like fields go first, bare
            let id_keys = ["comment_id", "post_id", "user_id"];
            let mut parts = Vec::new();

            for key in &id_keys {
                if let Some(val) = map.get(*key) {
                    parts.push(render_field_value(val));
                }
            }

            for (key, val) in map {
                if id_keys.contains(&key.as_str()) {
                    continue;
                }
                match val {
                    serde_json::Value::Array(arr) if arr.is_empty() => {}
                    serde_json::Value::Null => {}
                    _ => parts.push(format!("{}:{}", key, render_field_value(val))),
                }
            }
            parts.join("  ")
        }
        serde_json::Value::Array(arr) => {
            arr.iter().map(render_text).collect::<Vec<_>>().join("\n")
        }
        _ => render_field_value(value),
    }
}

/// Render a single field value as concise text
fn render_field_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => {
            if s.contains(' ') || s.contains('\n') {
                format!("\"{}\"", s.replace('\n', "\\n"))
            } else {
                s.clone()
            }
        }
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Null => "null".to_string(),
        serde_json::Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(render_field_value).collect();
            format!("[{}]", items.join(","))
        }
        serde_json::Value::Object(map) => {
            let parts: Vec<String> = map
                .iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| format!("{}:{}", k, render_field_value(v)))
                .collect();
            format!("{{{}}}", parts.join(","))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Serialize)]
    struct Listing {
        content: String,
        author_nickname: String,
        comment_id: i64,
    }

    fn listing(id: i64, content: &str) -> Listing {
        Listing {
            content: content.to_string(),
            author_nickname: "alice".to_string(),
            comment_id: id,
        }
    }

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Text);
    }

    #[test]
    fn test_json_output() {
        let formatter = Formatter::new(OutputFormat::Json);
        let output = formatter.format(&listing(3, "hello")).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["comment_id"], 3);
        assert_eq!(parsed["content"], "hello");
    }

    #[test]
    fn test_text_puts_id_first_and_quotes_spaces() {
        let formatter = Formatter::new(OutputFormat::Text);
        let output = formatter.format(&listing(3, "hello there")).unwrap();

        assert!(output.starts_with("3  "));
        assert!(output.contains("content:\"hello there\""));
        assert!(output.contains("author_nickname:alice"));
    }

    #[test]
    fn test_text_one_line_per_item() {
        let formatter = Formatter::new(OutputFormat::Text);
        let output = formatter
            .format(&vec![listing(2, "second"), listing(1, "first")])
            .unwrap();

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('2'));
        assert!(lines[1].starts_with('1'));
    }

    #[test]
    fn test_text_skips_null_and_escapes_newlines() {
        let value = serde_json::json!({
            "comment_id": 1,
            "content": "line one\nline two",
            "edited": null,
        });
        let output = render_text(&value);
        assert!(!output.contains("edited"));
        assert!(output.contains("\"line one\\nline two\""));
    }

    #[test]
    fn test_failure_shape() {
        let formatter = Formatter::new(OutputFormat::Json);
        let output = formatter
            .format(&Failure {
                error: "not_found",
                message: "post not found".to_string(),
            })
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(
            parsed,
            serde_json::json!({ "error": "not_found", "message": "post not found" })
        );
    }
}
