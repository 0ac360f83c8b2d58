//! A block of form buttons that can sit anywhere in a form.

use super::{Widget, WidgetCategory};
use crate::cstruct::Cstruct;
use crate::error::Result;
use crate::field::{Button, Field};
use crate::templates::render_button_bar;

/// Renders a button bar as a child field, e.g. a second "save" halfway
/// down a long form.
#[derive(Debug, Clone, Default)]
pub struct FormActionsWidget {
    /// Buttons in display order.
    pub buttons: Vec<Button>,
}

impl FormActionsWidget {
    /// Creates the widget from buttons or button names.
    pub fn new<B: Into<Button>>(buttons: impl IntoIterator<Item = B>) -> Self {
        Self {
            buttons: buttons.into_iter().map(Into::into).collect(),
        }
    }
}

impl Widget for FormActionsWidget {
    fn template(&self) -> &str {
        "form_actions"
    }

    fn category(&self) -> WidgetCategory {
        WidgetCategory::Structural
    }

    fn serialize(&self, field: &Field, _cstruct: &Cstruct) -> Result<String> {
        Ok(render_button_bar(&self.buttons, &field.name, false))
    }

    fn deserialize(&self, _pstruct: &Cstruct) -> Cstruct {
        Cstruct::Null
    }
}
