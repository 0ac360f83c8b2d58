#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use bootform::renderer::{Renderer, TemplateRegistry};
use bootform::widgets::TextInputWidget;
use bootform::{Button, Cstruct, Field, Result};

/// One call seen by a [`RecordingRenderer`].
#[derive(Debug, Clone, PartialEq)]
pub struct RenderCall {
    pub template: String,
    pub field: String,
    pub cstruct: Cstruct,
}

/// Delegates to the bootstrap templates and records every call.
#[derive(Debug)]
pub struct RecordingRenderer {
    inner: TemplateRegistry,
    calls: Mutex<Vec<RenderCall>>,
}

impl RecordingRenderer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: TemplateRegistry::bootstrap(),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<RenderCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, template: &str) -> Vec<RenderCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.template == template)
            .collect()
    }
}

impl Renderer for RecordingRenderer {
    fn render(&self, template: &str, field: &Field, cstruct: &Cstruct) -> Result<String> {
        self.calls.lock().unwrap().push(RenderCall {
            template: template.to_string(),
            field: field.name.clone(),
            cstruct: cstruct.clone(),
        });
        self.inner.render(template, field, cstruct)
    }
}

pub fn render(form: &Field, cstruct: &Cstruct) -> String {
    form.render(cstruct)
        .unwrap_or_else(|e| panic!("Failed to render {}: {e}", form.formid))
}

/// A form with `n` text children named `field_0` .. `field_{n-1}`.
pub fn form_with_children(n: usize) -> Field {
    (0..n).fold(Field::form("generated"), |form, i| {
        form.child(Field::new(format!("field_{i}"), TextInputWidget::new()))
    })
}

/// A form with one button per name.
pub fn form_with_buttons(names: &[&str]) -> Field {
    names
        .iter()
        .fold(Field::form("buttons"), |form, name| form.button(Button::new(*name)))
}

/// Position of every occurrence of `needle` in `haystack`.
pub fn positions(haystack: &str, needle: &str) -> Vec<usize> {
    haystack.match_indices(needle).map(|(i, _)| i).collect()
}
