//! Built-in templates.
//!
//! The form and item templates are registered in
//! [`TemplateRegistry::bootstrap`](crate::renderer::TemplateRegistry::bootstrap);
//! the flash panel wraps an already-rendered form.

mod actions;
mod ajax;
mod flash;
mod form;
mod item;

pub use actions::render_button_bar;
pub use ajax::{merge_ajax_options, render_ajax_script};
pub use flash::{render_flash_default, FlashPanel, FlashRenderer};
pub use form::FormTemplate;
pub use item::{MappingItemTemplate, MappingTemplate};

use crate::cstruct::Cstruct;
use crate::error::Result;
use crate::field::Field;

/// Renders every child of `field` through its own item template, passing the
/// child's slice of `cstruct` (null when absent).
pub fn render_children(field: &Field, cstruct: &Cstruct) -> Result<String> {
    field
        .children
        .iter()
        .map(|child| {
            child
                .renderer
                .render(child.widget.item_template(), child, cstruct.get(&child.name))
        })
        .collect()
}
