//! The field tree handed to the templates.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cstruct::Cstruct;
use crate::error::{Result, ValidationErrors, FORM_ERRORS_KEY};
use crate::preparers::Preparer;
use crate::renderer::{Renderer, TemplateRegistry};
use crate::validation::Validator;
use crate::widgets::{FormWidget, Widget};

/// Bootstrap layout of a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormStyle {
    /// Labels beside controls.
    #[serde(rename = "form-horizontal")]
    Horizontal,
    /// Everything on one line.
    #[serde(rename = "form-inline")]
    Inline,
    /// Labels above controls.
    #[serde(rename = "form-vertical")]
    Vertical,
    /// Search box layout.
    #[serde(rename = "form-search")]
    Search,
}

impl FormStyle {
    /// Returns the CSS class for this style.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Horizontal => "form-horizontal",
            Self::Inline => "form-inline",
            Self::Vertical => "form-vertical",
            Self::Search => "form-search",
        }
    }
}

impl std::fmt::Display for FormStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error attached to a field after failed validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldError {
    /// Message shown next to the field (or in the form banner).
    pub errormsg: String,
}

impl FieldError {
    /// Creates a field error.
    pub fn new(errormsg: impl Into<String>) -> Self {
        Self {
            errormsg: errormsg.into(),
        }
    }
}

/// A form button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    /// Name submitted with the form.
    pub name: String,
    /// Label.
    pub title: String,
    /// Input type (`submit`, `button`, `reset`).
    pub button_type: String,
    /// Value attribute; the label of an `<input>` button.
    pub value: String,
    /// Whether the button is disabled.
    pub disabled: bool,
    /// Extra CSS classes.
    pub css_class: Option<String>,
}

impl Button {
    /// Creates a submit button titled after its name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let title = title_case(&name);
        Self {
            value: title.clone(),
            title,
            name,
            button_type: "submit".to_string(),
            disabled: false,
            css_class: None,
        }
    }

    /// Sets the label (and value).
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self.value = self.title.clone();
        self
    }

    /// Sets the input type.
    #[must_use]
    pub fn button_type(mut self, button_type: impl Into<String>) -> Self {
        self.button_type = button_type.into();
        self
    }

    /// Disables the button.
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Adds CSS classes.
    #[must_use]
    pub fn css_class(mut self, class: impl Into<String>) -> Self {
        self.css_class = Some(class.into());
        self
    }
}

impl From<&str> for Button {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Button {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

/// Turns `first_name` into `First Name`.
pub(crate) fn title_case(name: &str) -> String {
    name.split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Rewrites the submitted values of a form before it is validated.
pub trait Unpacker: Send + Sync {
    /// Returns the rewritten values.
    fn unpack(&self, pstruct: Cstruct) -> Cstruct;
}

/// A node of the form tree.
#[derive(Clone)]
pub struct Field {
    /// Field name; the key of this field's value in the parent cstruct.
    pub name: String,
    /// Label or legend.
    pub title: String,
    /// Help text.
    pub description: Option<String>,
    /// Form identifier (root only).
    pub formid: String,
    /// Extra CSS classes.
    pub css_class: Option<String>,
    /// Bootstrap layout.
    pub bootstrap_form_style: Option<FormStyle>,
    /// Form action URL.
    pub action: String,
    /// Form method.
    pub method: String,
    /// Form encoding type.
    pub enctype: String,
    /// Validation error, if any.
    pub error: Option<FieldError>,
    /// Ordered children.
    pub children: Vec<Field>,
    /// Ordered buttons.
    pub buttons: Vec<Button>,
    /// Whether to submit through AJAX.
    pub use_ajax: bool,
    /// Extra AJAX options merged over the defaults.
    pub ajax_options: Value,
    /// Template dispatcher.
    pub renderer: Arc<dyn Renderer>,
    /// Rendering strategy.
    pub widget: Arc<dyn Widget>,
    /// Whether a value must be supplied.
    pub required: bool,
    /// Value used when nothing was submitted.
    pub missing: Option<Cstruct>,
    /// Value rendered when no appstruct provides one.
    pub default: Option<Cstruct>,
    /// Validators run on scalar values.
    pub validators: Vec<Arc<dyn Validator>>,
    /// Preparers run on scalar values before validation.
    pub preparers: Vec<Preparer>,
    /// Rewrites applied to submitted values before validation.
    pub unpackers: Vec<Arc<dyn Unpacker>>,
}

impl std::fmt::Debug for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("title", &self.title)
            .field("formid", &self.formid)
            .field("widget", &self.widget.template())
            .field("error", &self.error)
            .field("children", &self.children)
            .field("buttons", &self.buttons)
            .field("required", &self.required)
            .finish_non_exhaustive()
    }
}

impl Field {
    /// Creates a field rendered by `widget`.
    pub fn new(name: impl Into<String>, widget: impl Widget + 'static) -> Self {
        let name = name.into();
        Self {
            title: title_case(&name),
            name,
            description: None,
            formid: String::new(),
            css_class: None,
            bootstrap_form_style: None,
            action: String::new(),
            method: "POST".to_string(),
            enctype: "multipart/form-data".to_string(),
            error: None,
            children: Vec::new(),
            buttons: Vec::new(),
            use_ajax: false,
            ajax_options: Value::Object(serde_json::Map::new()),
            renderer: TemplateRegistry::shared(),
            widget: Arc::new(widget),
            required: false,
            missing: None,
            default: None,
            validators: Vec::new(),
            preparers: Vec::new(),
            unpackers: Vec::new(),
        }
    }

    /// Creates a root form.
    pub fn form(formid: impl Into<String>) -> Self {
        let formid = formid.into();
        let mut field = Self::new(formid.clone(), FormWidget);
        field.formid = formid;
        field.title = String::new();
        field
    }

    /// Adds a child.
    #[must_use]
    pub fn child(mut self, child: Field) -> Self {
        self.children.push(child);
        self
    }

    /// Adds a button.
    #[must_use]
    pub fn button(mut self, button: impl Into<Button>) -> Self {
        self.buttons.push(button.into());
        self
    }

    /// Sets the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the help text.
    #[must_use]
    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Adds CSS classes.
    #[must_use]
    pub fn css_class(mut self, class: impl Into<String>) -> Self {
        self.css_class = Some(class.into());
        self
    }

    /// Sets the bootstrap layout.
    #[must_use]
    pub fn style(mut self, style: FormStyle) -> Self {
        self.bootstrap_form_style = Some(style);
        self
    }

    /// Sets the action URL.
    #[must_use]
    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = action.into();
        self
    }

    /// Sets the method.
    #[must_use]
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    /// Sets the encoding type.
    #[must_use]
    pub fn enctype(mut self, enctype: impl Into<String>) -> Self {
        self.enctype = enctype.into();
        self
    }

    /// Enables AJAX submission with extra options.
    #[must_use]
    pub fn ajax(mut self, options: Value) -> Self {
        self.use_ajax = true;
        self.ajax_options = options;
        self
    }

    /// Sets the error.
    #[must_use]
    pub fn error(mut self, errormsg: impl Into<String>) -> Self {
        self.error = Some(FieldError::new(errormsg));
        self
    }

    /// Makes the field required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the value used when nothing is submitted.
    #[must_use]
    pub fn missing(mut self, value: impl Into<Cstruct>) -> Self {
        self.missing = Some(value.into());
        self
    }

    /// Sets the value rendered when none is supplied.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<Cstruct>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Adds a validator.
    #[must_use]
    pub fn validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validators.push(Arc::new(validator));
        self
    }

    /// Adds a preparer.
    #[must_use]
    pub fn preparer(mut self, preparer: Preparer) -> Self {
        self.preparers.push(preparer);
        self
    }

    /// Adds a rewrite of the submitted values.
    #[must_use]
    pub fn unpacker(mut self, unpacker: impl Unpacker + 'static) -> Self {
        self.unpackers.push(Arc::new(unpacker));
        self
    }

    /// Runs the unpackers over submitted values, in order.
    pub fn unpack(&self, pstruct: Cstruct) -> Cstruct {
        self.unpackers
            .iter()
            .fold(pstruct, |values, unpacker| unpacker.unpack(values))
    }

    /// Replaces the renderer on this field and every descendant.
    #[must_use]
    pub fn with_renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.set_renderer(&renderer);
        self
    }

    fn set_renderer(&mut self, renderer: &Arc<dyn Renderer>) {
        self.renderer = Arc::clone(renderer);
        for child in &mut self.children {
            child.set_renderer(renderer);
        }
    }

    /// Returns the DOM id of the field's input.
    pub fn oid(&self) -> String {
        format!("id_{}", self.name)
    }

    /// Returns a child by name.
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Renders the field through its widget.
    pub fn render(&self, cstruct: &Cstruct) -> Result<String> {
        self.widget.serialize(self, cstruct)
    }

    /// Collects the default values of the children, keyed by name.
    pub fn defaults(&self) -> Cstruct {
        let entries = self
            .children
            .iter()
            .filter_map(|child| {
                let value = if child.children.is_empty() {
                    child.default.clone()?
                } else {
                    child.defaults()
                };
                Some((child.name.clone(), value))
            })
            .collect();
        Cstruct::Map(entries)
    }

    /// Moves named children to new positions; `-1` moves to the end.
    pub fn reorder(&mut self, order: &[(&str, isize)]) {
        let mut moved = Vec::new();
        for (name, index) in order {
            if let Some(pos) = self.children.iter().position(|c| c.name == *name) {
                moved.push((self.children.remove(pos), *index));
            }
        }
        for (child, index) in moved {
            match usize::try_from(index) {
                Ok(i) => {
                    let i = i.min(self.children.len());
                    self.children.insert(i, child);
                }
                Err(_) => self.children.push(child),
            }
        }
    }

    /// Unpacks, deserializes and validates submitted values.
    pub fn validate(&self, pstruct: &Cstruct) -> std::result::Result<Cstruct, ValidationErrors> {
        let pstruct = self.unpack(pstruct.clone());
        let mut errors = ValidationErrors::new();
        let value = self.validate_children(&pstruct, "", &mut errors);
        if errors.is_empty() {
            Ok(value)
        } else {
            Err(errors)
        }
    }

    fn validate_children(&self, pstruct: &Cstruct, path: &str, errors: &mut ValidationErrors) -> Cstruct {
        let mut out = BTreeMap::new();
        for child in &self.children {
            let child_path = join_path(path, &child.name);
            let value = child.validate_node(pstruct.get(&child.name), &child_path, errors);
            out.insert(child.name.clone(), value);
        }
        Cstruct::Map(out)
    }

    fn validate_node(&self, pstruct: &Cstruct, path: &str, errors: &mut ValidationErrors) -> Cstruct {
        if !self.children.is_empty() {
            return self.validate_children(pstruct, path, errors);
        }

        let value = match self.widget.deserialize(pstruct) {
            Cstruct::Str(raw) => Cstruct::Str(self.preparers.iter().fold(raw, |v, p| p(&v))),
            other => other,
        };

        if value.is_empty() {
            if let Some(missing) = &self.missing {
                return missing.clone();
            }
            if self.required {
                errors.add(path, "Required");
            }
            return Cstruct::Null;
        }

        if let Some(raw) = value.as_str() {
            for validator in &self.validators {
                if let Err(msg) = validator.validate(raw) {
                    errors.add(path, msg);
                }
            }
        }
        value
    }

    /// Attaches validation errors to the addressed fields.
    ///
    /// The root gets an error whenever `errors` is non-empty; its message is
    /// the joined form-level errors, or empty.
    pub fn apply_errors(&mut self, errors: &ValidationErrors) {
        self.error = if errors.is_empty() {
            None
        } else {
            let form_level = errors
                .get(FORM_ERRORS_KEY)
                .map(|m| m.join(" "))
                .unwrap_or_default();
            Some(FieldError::new(form_level))
        };
        for child in &mut self.children {
            child.apply_child_errors("", errors);
        }
    }

    fn apply_child_errors(&mut self, prefix: &str, errors: &ValidationErrors) {
        let path = join_path(prefix, &self.name);
        self.error = errors.get(&path).map(|m| FieldError::new(m.join(" ")));
        for child in &mut self.children {
            child.apply_child_errors(&path, errors);
        }
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preparers::strip_whitespace;
    use crate::validation::EmailValidator;
    use crate::widgets::{MappingWidget, TextInputWidget};

    fn signup() -> Field {
        Field::form("signup")
            .child(Field::new("name", TextInputWidget::new()).required())
            .child(
                Field::new("email", TextInputWidget::email())
                    .required()
                    .preparer(strip_whitespace)
                    .validator(EmailValidator::new()),
            )
            .child(
                Field::new("address", MappingWidget)
                    .child(Field::new("city", TextInputWidget::new()).required())
                    .child(Field::new("zip", TextInputWidget::new()).missing("00000")),
            )
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("first_name"), "First Name");
        assert_eq!(title_case("save"), "Save");
    }

    #[test]
    fn test_button_defaults() {
        let button = Button::new("save");
        assert_eq!(button.title, "Save");
        assert_eq!(button.value, "Save");
        assert_eq!(button.button_type, "submit");
        assert!(!button.disabled);
    }

    #[test]
    fn test_form_defaults() {
        let form = Field::form("signup");
        assert_eq!(form.formid, "signup");
        assert_eq!(form.method, "POST");
        assert!(form.title.is_empty());
        assert!(!form.use_ajax);
    }

    #[test]
    fn test_validate_success_prepares_values() {
        let pstruct = Cstruct::from_params([
            ("name", "Ada"),
            ("email", "  ada@example.com "),
            ("address.city", "London"),
        ]);
        let appstruct = signup().validate(&pstruct).unwrap();

        assert_eq!(appstruct.get("email").as_str(), Some("ada@example.com"));
        assert_eq!(appstruct.get("address").get("zip").as_str(), Some("00000"));
    }

    #[test]
    fn test_validate_collects_dotted_errors() {
        let pstruct = Cstruct::from_params([("email", "nope")]);
        let errors = signup().validate(&pstruct).unwrap_err();

        assert_eq!(errors.get("name"), Some(&vec!["Required".to_string()]));
        assert!(errors.get("email").is_some());
        assert!(errors.get("address.city").is_some());
        assert!(errors.get("address.zip").is_none());
    }

    #[test]
    fn test_apply_errors() {
        let mut form = signup();
        let mut errors = ValidationErrors::new();
        errors.add("address.city", "Required");
        form.apply_errors(&errors);

        assert_eq!(form.error, Some(FieldError::new("")));
        let city = form.get("address").and_then(|a| a.get("city")).unwrap();
        assert_eq!(city.error, Some(FieldError::new("Required")));
        assert!(form.get("name").unwrap().error.is_none());
    }

    #[test]
    fn test_defaults() {
        let form = signup().child(Field::new("plan", TextInputWidget::new()).default_value("free"));
        let defaults = form.defaults();
        assert_eq!(defaults.get("plan").as_str(), Some("free"));
        assert!(defaults.get("name").is_null());
        assert!(matches!(defaults.get("address"), Cstruct::Map(_)));
    }

    #[test]
    fn test_reorder() {
        let mut form = Field::form("f")
            .child(Field::new("_csrf", TextInputWidget::new()))
            .child(Field::new("name", TextInputWidget::new()))
            .child(Field::new("description", TextInputWidget::new()));
        form.reorder(&[("description", -1), ("name", 0)]);

        let names: Vec<&str> = form.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["name", "_csrf", "description"]);
    }

    #[test]
    fn test_with_renderer_propagates() {
        let registry: Arc<dyn Renderer> = Arc::new(TemplateRegistry::bootstrap());
        let form = signup().with_renderer(Arc::clone(&registry));
        let city = form.get("address").and_then(|a| a.get("city")).unwrap();
        assert!(Arc::ptr_eq(&city.renderer, &registry));
    }
}
