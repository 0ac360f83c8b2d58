//! Template dispatch.
//!
//! A [`Renderer`] turns a template name plus a field and its value into
//! markup. The stock implementation is a [`TemplateRegistry`] holding the
//! structural templates (`form`, `mapping`, `mapping_item`); leaf widgets
//! render themselves through [`Widget::serialize`](crate::widgets::Widget).

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use crate::cstruct::Cstruct;
use crate::error::{FormError, Result};
use crate::field::Field;
use crate::i18n::{NullTranslator, Translator, DOMAIN};
use crate::templates::{FormTemplate, MappingItemTemplate, MappingTemplate};

/// Name of the root form template.
pub const FORM_TEMPLATE: &str = "form";
/// Name of the nested mapping (fieldset) template.
pub const MAPPING_TEMPLATE: &str = "mapping";
/// Name of the default per-child item template.
pub const MAPPING_ITEM_TEMPLATE: &str = "mapping_item";

/// Dispatches a template name to rendered markup.
pub trait Renderer: Send + Sync {
    /// Renders `template` for `field` with its value `cstruct`.
    fn render(&self, template: &str, field: &Field, cstruct: &Cstruct) -> Result<String>;
}

/// Everything a template can see while rendering.
pub struct RenderContext<'a> {
    /// The field being rendered.
    pub field: &'a Field,
    /// The field's value.
    pub cstruct: &'a Cstruct,
    /// Translator for user-facing strings.
    pub translator: &'a dyn Translator,
}

impl RenderContext<'_> {
    /// Translates a message in the crate's domain.
    pub fn translate(&self, msgid: &str) -> String {
        self.translator.translate(DOMAIN, msgid)
    }
}

/// A named template.
pub trait Template: Send + Sync {
    /// Renders the context into markup.
    fn render(&self, ctx: &RenderContext<'_>) -> Result<String>;
}

impl<F> Template for F
where
    F: Fn(&RenderContext<'_>) -> Result<String> + Send + Sync,
{
    fn render(&self, ctx: &RenderContext<'_>) -> Result<String> {
        self(ctx)
    }
}

/// A set of named templates plus the translator they render with.
#[derive(Clone)]
pub struct TemplateRegistry {
    templates: HashMap<String, Arc<dyn Template>>,
    translator: Arc<dyn Translator>,
}

impl std::fmt::Debug for TemplateRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.templates.keys().collect();
        names.sort();
        f.debug_struct("TemplateRegistry")
            .field("templates", &names)
            .finish_non_exhaustive()
    }
}

impl TemplateRegistry {
    /// Creates a registry with no templates.
    pub fn empty() -> Self {
        Self {
            templates: HashMap::new(),
            translator: Arc::new(NullTranslator),
        }
    }

    /// Creates a registry with the bootstrap structural templates.
    pub fn bootstrap() -> Self {
        Self::empty()
            .with_template(FORM_TEMPLATE, FormTemplate)
            .with_template(MAPPING_TEMPLATE, MappingTemplate)
            .with_template(MAPPING_ITEM_TEMPLATE, MappingItemTemplate)
    }

    /// Returns the process-wide default registry.
    pub fn shared() -> Arc<dyn Renderer> {
        static SHARED: OnceLock<Arc<TemplateRegistry>> = OnceLock::new();
        SHARED
            .get_or_init(|| Arc::new(Self::bootstrap()))
            .clone()
    }

    /// Registers (or replaces) a template.
    pub fn register(&mut self, name: impl Into<String>, template: impl Template + 'static) {
        self.templates.insert(name.into(), Arc::new(template));
    }

    /// Builder form of [`TemplateRegistry::register`].
    #[must_use]
    pub fn with_template(mut self, name: impl Into<String>, template: impl Template + 'static) -> Self {
        self.register(name, template);
        self
    }

    /// Sets the translator.
    #[must_use]
    pub fn with_translator(mut self, translator: impl Translator + 'static) -> Self {
        self.translator = Arc::new(translator);
        self
    }

    /// Returns whether a template is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::bootstrap()
    }
}

impl Renderer for TemplateRegistry {
    fn render(&self, template: &str, field: &Field, cstruct: &Cstruct) -> Result<String> {
        let tpl = self
            .templates
            .get(template)
            .ok_or_else(|| FormError::TemplateNotFound(template.to_string()))?;
        let ctx = RenderContext {
            field,
            cstruct,
            translator: self.translator.as_ref(),
        };
        tpl.render(&ctx)
    }
}
