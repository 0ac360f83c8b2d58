//! Bootstrap input widgets.

use super::{html_escape, Widget, WidgetAttrs};
use crate::cstruct::Cstruct;
use crate::error::Result;
use crate::field::Field;

/// Text input widget.
#[derive(Debug, Clone)]
pub struct TextInputWidget {
    /// The HTML input type (text, email, password, etc.).
    pub input_type: String,
    /// Placeholder text.
    pub placeholder: Option<String>,
    /// Extra attributes.
    pub attrs: WidgetAttrs,
    /// Whether to trim submitted values.
    pub strip: bool,
}

impl Default for TextInputWidget {
    fn default() -> Self {
        Self {
            input_type: "text".to_string(),
            placeholder: None,
            attrs: WidgetAttrs::new(),
            strip: true,
        }
    }
}

impl TextInputWidget {
    /// Creates a new text input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a password input.
    pub fn password() -> Self {
        Self {
            input_type: "password".to_string(),
            strip: false,
            ..Default::default()
        }
    }

    /// Creates an email input.
    pub fn email() -> Self {
        Self {
            input_type: "email".to_string(),
            ..Default::default()
        }
    }

    /// Creates a url input.
    pub fn url() -> Self {
        Self {
            input_type: "url".to_string(),
            ..Default::default()
        }
    }

    /// Sets the placeholder text.
    #[must_use]
    pub fn placeholder(mut self, text: impl Into<String>) -> Self {
        self.placeholder = Some(text.into());
        self
    }

    /// Sets an extra attribute.
    #[must_use]
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.set(key, value);
        self
    }
}

impl Widget for TextInputWidget {
    fn template(&self) -> &str {
        "textinput"
    }

    fn serialize(&self, field: &Field, cstruct: &Cstruct) -> Result<String> {
        let value_attr = cstruct
            .as_str()
            .map(|v| format!(r#" value="{}""#, html_escape(v)))
            .unwrap_or_default();

        let placeholder_attr = self
            .placeholder
            .as_ref()
            .map(|p| format!(r#" placeholder="{}""#, html_escape(p)))
            .unwrap_or_default();

        Ok(format!(
            r#"<input type="{}" class="form-control" id="{}" name="{}"{value_attr}{placeholder_attr}{}/>"#,
            html_escape(&self.input_type),
            html_escape(&field.oid()),
            html_escape(&field.name),
            self.attrs.to_html()
        ))
    }

    fn deserialize(&self, pstruct: &Cstruct) -> Cstruct {
        match pstruct {
            Cstruct::Str(s) if self.strip => Cstruct::Str(s.trim().to_string()),
            other => other.clone(),
        }
    }
}

/// Textarea widget.
#[derive(Debug, Clone)]
pub struct TextAreaWidget {
    /// Number of rows.
    pub rows: usize,
    /// Placeholder text.
    pub placeholder: Option<String>,
}

impl Default for TextAreaWidget {
    fn default() -> Self {
        Self {
            rows: 4,
            placeholder: None,
        }
    }
}

impl TextAreaWidget {
    /// Creates a new textarea with the specified rows.
    pub fn new(rows: usize) -> Self {
        Self {
            rows,
            placeholder: None,
        }
    }

    /// Sets the placeholder text.
    #[must_use]
    pub fn placeholder(mut self, text: impl Into<String>) -> Self {
        self.placeholder = Some(text.into());
        self
    }
}

impl Widget for TextAreaWidget {
    fn template(&self) -> &str {
        "textarea"
    }

    fn serialize(&self, field: &Field, cstruct: &Cstruct) -> Result<String> {
        let content = cstruct.as_str().map(html_escape).unwrap_or_default();
        let placeholder_attr = self
            .placeholder
            .as_ref()
            .map(|p| format!(r#" placeholder="{}""#, html_escape(p)))
            .unwrap_or_default();

        Ok(format!(
            r#"<textarea class="form-control" id="{}" name="{}" rows="{}"{placeholder_attr}>{content}</textarea>"#,
            html_escape(&field.oid()),
            html_escape(&field.name),
            self.rows
        ))
    }
}

/// Select widget.
#[derive(Debug, Clone)]
pub struct SelectWidget {
    /// Available choices (value, label).
    pub choices: Vec<(String, String)>,
    /// Label of the leading empty option; `None` omits it.
    pub blank_label: Option<String>,
}

impl Default for SelectWidget {
    fn default() -> Self {
        Self {
            choices: Vec::new(),
            blank_label: Some("- Select -".to_string()),
        }
    }
}

impl SelectWidget {
    /// Creates a new select with the given choices.
    pub fn new<V, L>(choices: impl IntoIterator<Item = (V, L)>) -> Self
    where
        V: Into<String>,
        L: Into<String>,
    {
        Self {
            choices: choices
                .into_iter()
                .map(|(v, l)| (v.into(), l.into()))
                .collect(),
            ..Default::default()
        }
    }

    /// Disables the blank option.
    #[must_use]
    pub fn no_blank(mut self) -> Self {
        self.blank_label = None;
        self
    }

    /// Sets the blank label.
    #[must_use]
    pub fn blank_label(mut self, label: impl Into<String>) -> Self {
        self.blank_label = Some(label.into());
        self
    }
}

impl Widget for SelectWidget {
    fn template(&self) -> &str {
        "select"
    }

    fn serialize(&self, field: &Field, cstruct: &Cstruct) -> Result<String> {
        let selected: Vec<&str> = match cstruct {
            Cstruct::Str(v) => vec![v.as_str()],
            Cstruct::Seq(items) => items.iter().filter_map(Cstruct::as_str).collect(),
            _ => Vec::new(),
        };

        let mut options = String::new();
        if let Some(blank) = &self.blank_label {
            options.push_str(&format!(r#"<option value="">{}</option>"#, html_escape(blank)));
        }
        for (opt_value, label) in &self.choices {
            let selected_attr = if selected.contains(&opt_value.as_str()) {
                r#" selected="selected""#
            } else {
                ""
            };
            options.push_str(&format!(
                r#"<option value="{}"{selected_attr}>{}</option>"#,
                html_escape(opt_value),
                html_escape(label)
            ));
        }

        Ok(format!(
            r#"<select class="form-select" id="{}" name="{}">{options}</select>"#,
            html_escape(&field.oid()),
            html_escape(&field.name)
        ))
    }
}

/// Checkbox widget.
#[derive(Debug, Clone)]
pub struct CheckboxWidget {
    /// Value submitted when checked.
    pub true_val: String,
    /// Value assumed when unchecked.
    pub false_val: String,
}

impl Default for CheckboxWidget {
    fn default() -> Self {
        Self {
            true_val: "true".to_string(),
            false_val: "false".to_string(),
        }
    }
}

impl CheckboxWidget {
    /// Creates a new checkbox.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Widget for CheckboxWidget {
    fn template(&self) -> &str {
        "checkbox"
    }

    fn serialize(&self, field: &Field, cstruct: &Cstruct) -> Result<String> {
        let checked = cstruct.as_str() == Some(self.true_val.as_str());
        let checked_attr = if checked { r#" checked="checked""# } else { "" };

        Ok(format!(
            r#"<input class="form-check-input" type="checkbox" id="{}" name="{}" value="{}"{checked_attr}/>"#,
            html_escape(&field.oid()),
            html_escape(&field.name),
            html_escape(&self.true_val)
        ))
    }

    fn deserialize(&self, pstruct: &Cstruct) -> Cstruct {
        match pstruct {
            Cstruct::Null => Cstruct::Str(self.false_val.clone()),
            other => other.clone(),
        }
    }
}
