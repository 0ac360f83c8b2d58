//! # bootform
//!
//! Bootstrap form rendering: a field tree rendered into a `<form>`, flash
//! message panels, and a form view driving validation and hooks.
//!
//! This crate provides:
//! - The [`Field`] tree and [`Cstruct`] value structure
//! - A template registry with the `form`, `mapping` and `mapping_item` templates
//! - Bootstrap widgets, including structural ones (button bars, panels)
//! - A [`FlashPanel`] that drains session flash messages above a form
//! - [`FormView`], the validate / hook / render request flow
//! - Transloadit upload fields with signed parameters (see [`transloadit`])
//!
//! ## Quick Start
//!
//! ```rust
//! use bootform::widgets::TextInputWidget;
//! use bootform::{Cstruct, Field};
//!
//! let form = Field::form("signup")
//!     .title("Sign Up")
//!     .child(Field::new("email", TextInputWidget::email()).required())
//!     .button("submit");
//!
//! let html = form.render(&Cstruct::map([("email", "ada@example.com")])).unwrap();
//! assert!(html.contains("<legend>Sign Up</legend>"));
//! assert!(html.contains("btn-primary"));
//! ```
//!
//! ## Flash panels
//!
//! ```rust
//! use bootform::templates::FlashPanel;
//! use bootform::{Cstruct, Field};
//! use bootform_session::{FlashQueue, SessionHandle};
//!
//! let session = SessionHandle::default();
//! session.flash("", "Saved").unwrap();
//!
//! let form = Field::form("profile");
//! let panel = FlashPanel::new("");
//! let html = panel.render(&session, || form.render(&Cstruct::Null)).unwrap();
//! assert!(html.contains("Saved"));
//!
//! // The queue was drained.
//! let html = panel.render(&session, || form.render(&Cstruct::Null)).unwrap();
//! assert!(!html.contains("Saved"));
//! ```
//!
//! ## Custom templates
//!
//! Every field renders through its `renderer`. Swap in a
//! [`TemplateRegistry`] with overridden templates and propagate it with
//! [`Field::with_renderer`].

pub mod cstruct;
mod error;
pub mod field;
pub mod i18n;
pub mod preparers;
pub mod renderer;
pub mod schema;
pub mod templates;
pub mod transloadit;
pub mod validation;
pub mod view;
pub mod widgets;

pub use cstruct::Cstruct;
pub use error::{FormError, Result, ValidationErrors, FORM_ERRORS_KEY};
pub use field::{Button, Field, FieldError, FormStyle, Unpacker};
pub use renderer::{RenderContext, Renderer, Template, TemplateRegistry};
pub use templates::FlashPanel;
pub use view::{
    FormHandler, FormRender, FormRequest, FormView, FormViewOptions, HookOutcome, JsonResponse,
    TemplateVars, ValidatedForm, ViewOutcome,
};
