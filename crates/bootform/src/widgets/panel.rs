//! Embeds arbitrary named panels inside a form.

use std::collections::HashMap;
use std::sync::Arc;

use super::{Widget, WidgetCategory};
use crate::cstruct::Cstruct;
use crate::error::Result;
use crate::field::Field;

/// Source of named panels.
pub trait PanelLayout: Send + Sync {
    /// Renders the panel called `name`, or `None` if it does not exist.
    fn render_panel(&self, name: &str) -> Option<String>;
}

/// Panels rendered ahead of time.
#[derive(Debug, Clone, Default)]
pub struct StaticPanels {
    panels: HashMap<String, String>,
}

impl StaticPanels {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a panel.
    #[must_use]
    pub fn panel(mut self, name: impl Into<String>, markup: impl Into<String>) -> Self {
        self.panels.insert(name.into(), markup.into());
        self
    }
}

impl PanelLayout for StaticPanels {
    fn render_panel(&self, name: &str) -> Option<String> {
        self.panels.get(name).cloned()
    }
}

/// A structural widget whose output is a named panel.
#[derive(Clone)]
pub struct PanelWidget {
    /// Name of the panel to render.
    pub panel_name: String,
    layout: Arc<dyn PanelLayout>,
}

impl std::fmt::Debug for PanelWidget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PanelWidget")
            .field("panel_name", &self.panel_name)
            .finish_non_exhaustive()
    }
}

impl PanelWidget {
    /// Creates a widget rendering `panel_name` from `layout`.
    pub fn new(panel_name: impl Into<String>, layout: Arc<dyn PanelLayout>) -> Self {
        Self {
            panel_name: panel_name.into(),
            layout,
        }
    }
}

impl Widget for PanelWidget {
    fn template(&self) -> &str {
        "panel"
    }

    fn category(&self) -> WidgetCategory {
        WidgetCategory::Structural
    }

    fn serialize(&self, _field: &Field, _cstruct: &Cstruct) -> Result<String> {
        Ok(self
            .layout
            .render_panel(&self.panel_name)
            .unwrap_or_default())
    }

    fn deserialize(&self, _pstruct: &Cstruct) -> Cstruct {
        Cstruct::Null
    }
}
