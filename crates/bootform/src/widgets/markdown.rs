//! Textarea with a markdown editor.

use super::{html_escape, Widget};
use crate::cstruct::Cstruct;
use crate::error::Result;
use crate::field::Field;

/// Textarea picked up by the client-side markitup editor in markdown mode.
#[derive(Debug, Clone)]
pub struct MarkdownWidget {
    /// Number of rows.
    pub rows: usize,
    /// Whether to trim submitted values.
    pub strip: bool,
}

impl Default for MarkdownWidget {
    fn default() -> Self {
        Self {
            rows: 10,
            strip: true,
        }
    }
}

impl MarkdownWidget {
    /// Creates a markdown textarea.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Widget for MarkdownWidget {
    fn template(&self) -> &str {
        "markdown"
    }

    fn serialize(&self, field: &Field, cstruct: &Cstruct) -> Result<String> {
        let content = cstruct.as_str().map(html_escape).unwrap_or_default();
        Ok(format!(
            r#"<textarea class="form-control markitup" data-editor="markdown" id="{}" name="{}" rows="{}">{content}</textarea>"#,
            html_escape(&field.oid()),
            html_escape(&field.name),
            self.rows
        ))
    }

    // Editors may post a mapping or a list; the first value wins.
    fn deserialize(&self, pstruct: &Cstruct) -> Cstruct {
        let value = match pstruct {
            Cstruct::Seq(items) => items.first().cloned().unwrap_or_default(),
            Cstruct::Map(entries) => entries.values().next().cloned().unwrap_or_default(),
            other => other.clone(),
        };
        match value {
            Cstruct::Str(s) if s.is_empty() => Cstruct::Null,
            Cstruct::Str(s) if self.strip => Cstruct::Str(s.trim().to_string()),
            other => other,
        }
    }
}
