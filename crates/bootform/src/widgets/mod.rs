//! Widgets: the rendering strategy attached to each field.

mod actions;
mod bootstrap;
mod cacheable;
mod markdown;
mod panel;
mod transloadit;

pub use actions::FormActionsWidget;
pub use bootstrap::{CheckboxWidget, SelectWidget, TextAreaWidget, TextInputWidget};
pub use cacheable::{CacheableSelectWidget, RenderCache, ValuesSource};
pub use markdown::MarkdownWidget;
pub use panel::{PanelLayout, PanelWidget, StaticPanels};
pub use transloadit::{TransloaditConfigWidget, TransloaditImageWidget, TransloaditUploadWidget};

use std::collections::BTreeMap;

use crate::cstruct::Cstruct;
use crate::error::Result;
use crate::field::Field;
use crate::renderer::{FORM_TEMPLATE, MAPPING_ITEM_TEMPLATE, MAPPING_TEMPLATE};

/// How the item template treats a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WidgetCategory {
    /// Labelled input.
    #[default]
    Default,
    /// Layout element rendered without label or error chrome.
    Structural,
}

/// Rendering strategy of a field.
pub trait Widget: Send + Sync {
    /// Name of the template this widget renders with.
    fn template(&self) -> &str;

    /// Template used by the parent to render this field as a child.
    fn item_template(&self) -> &str {
        MAPPING_ITEM_TEMPLATE
    }

    /// Category of the widget.
    fn category(&self) -> WidgetCategory {
        WidgetCategory::Default
    }

    /// Whether the widget renders an invisible input.
    fn hidden(&self) -> bool {
        false
    }

    /// Renders the field's control.
    fn serialize(&self, field: &Field, cstruct: &Cstruct) -> Result<String>;

    /// Converts a submitted value into the field's cstruct.
    fn deserialize(&self, pstruct: &Cstruct) -> Cstruct {
        pstruct.clone()
    }
}

/// Extra HTML attributes for a widget's control, rendered in key order.
#[derive(Debug, Clone, Default)]
pub struct WidgetAttrs {
    /// HTML attributes.
    pub attrs: BTreeMap<String, String>,
}

impl WidgetAttrs {
    /// Creates new empty widget attributes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an attribute.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attrs.insert(key.into(), value.into());
    }

    /// Gets an attribute.
    pub fn get(&self, key: &str) -> Option<&String> {
        self.attrs.get(key)
    }

    /// Renders the attributes with a leading space, or nothing.
    pub fn to_html(&self) -> String {
        self.attrs
            .iter()
            .map(|(k, v)| format!(r#" {k}="{}""#, html_escape(v)))
            .collect()
    }

    /// Builder method to set an attribute.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }
}

/// Root widget: renders the whole `<form>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormWidget;

impl Widget for FormWidget {
    fn template(&self) -> &str {
        FORM_TEMPLATE
    }

    fn serialize(&self, field: &Field, cstruct: &Cstruct) -> Result<String> {
        field.renderer.render(self.template(), field, cstruct)
    }
}

/// Nested group of fields rendered as a fieldset.
#[derive(Debug, Clone, Copy, Default)]
pub struct MappingWidget;

impl Widget for MappingWidget {
    fn template(&self) -> &str {
        MAPPING_TEMPLATE
    }

    fn serialize(&self, field: &Field, cstruct: &Cstruct) -> Result<String> {
        field.renderer.render(self.template(), field, cstruct)
    }
}

/// A hidden input.
#[derive(Debug, Clone, Default)]
pub struct HiddenWidget;

impl Widget for HiddenWidget {
    fn template(&self) -> &str {
        "hidden"
    }

    fn hidden(&self) -> bool {
        true
    }

    fn serialize(&self, field: &Field, cstruct: &Cstruct) -> Result<String> {
        let value = cstruct.as_str().unwrap_or_default();
        Ok(format!(
            r#"<input type="hidden" name="{}" value="{}" id="{}"/>"#,
            html_escape(&field.name),
            html_escape(value),
            html_escape(&field.oid())
        ))
    }
}

/// Escapes HTML special characters.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
