//! Request handling around a form: build, validate, dispatch to hooks, render.
//!
//! A [`FormView`] pairs a [`FormHandler`] (the schema and the hooks) with
//! [`FormViewOptions`]. [`FormView::handle`] yields either a redirect or the
//! variables a page template needs, including a deferred [`FormRender`] so
//! the form can be rendered later, e.g. inside a
//! [`FlashPanel`](crate::templates::FlashPanel).

use bootform_session::{SessionError, SessionHandle};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::cstruct::Cstruct;
use crate::error::{FormError, Result, ValidationErrors};
use crate::field::{title_case, Button, Field, FormStyle};
use crate::schema::CSRF_FIELD;
use crate::transloadit::TRANSLOADIT_FIELD;

/// Form view configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FormViewOptions {
    /// Button names, in display order.
    pub buttons: Vec<String>,
    /// Form method.
    pub method: String,
    /// Form action URL.
    pub action: String,
    /// Request methods that trigger validation.
    pub validate_methods: Vec<String>,
    /// Submitted button names that skip validation.
    pub ignore_actions: Vec<String>,
    /// Top-level children left out of the section list.
    pub ignore_sections: Vec<String>,
    /// Whether to submit through AJAX.
    pub use_ajax: bool,
    /// Extra AJAX options.
    pub ajax_options: Value,
    /// Whether to render the form eagerly.
    pub should_render_form: bool,
    /// Bootstrap layout.
    pub form_style: Option<FormStyle>,
}

impl Default for FormViewOptions {
    fn default() -> Self {
        Self {
            buttons: vec!["save".to_string()],
            method: "POST".to_string(),
            action: String::new(),
            validate_methods: vec!["POST".to_string()],
            ignore_actions: vec!["cancel".to_string()],
            ignore_sections: vec![CSRF_FIELD.to_string(), TRANSLOADIT_FIELD.to_string()],
            use_ajax: false,
            ajax_options: Value::Object(Map::new()),
            should_render_form: true,
            form_style: None,
        }
    }
}

impl FormViewOptions {
    /// Creates the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads options from JSON; absent keys keep their defaults.
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Sets the buttons.
    #[must_use]
    pub fn buttons<I, S>(mut self, buttons: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.buttons = buttons.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the form method.
    #[must_use]
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    /// Sets the action URL.
    #[must_use]
    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = action.into();
        self
    }

    /// Enables AJAX submission.
    #[must_use]
    pub fn ajax(mut self, options: Value) -> Self {
        self.use_ajax = true;
        self.ajax_options = options;
        self
    }

    /// Sets the bootstrap layout.
    #[must_use]
    pub fn style(mut self, style: FormStyle) -> Self {
        self.form_style = Some(style);
        self
    }

    /// Leaves rendering to the page template.
    #[must_use]
    pub fn deferred(mut self) -> Self {
        self.should_render_form = false;
        self
    }
}

/// The parts of an HTTP request a form view reads.
#[derive(Debug, Clone, Default)]
pub struct FormRequest {
    /// Request method.
    pub method: String,
    /// Request path, used as the upload redirect target.
    pub path: String,
    /// Submitted parameters, in order.
    pub params: Vec<(String, String)>,
    /// Name of the object being edited, if any.
    pub context_name: Option<String>,
    /// The caller's session.
    pub session: Option<SessionHandle>,
}

impl FormRequest {
    /// Creates a request with no parameters.
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            ..Default::default()
        }
    }

    /// Creates a GET request.
    pub fn get() -> Self {
        Self::new("GET")
    }

    /// Creates a POST request.
    pub fn post() -> Self {
        Self::new("POST")
    }

    /// Adds a parameter.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    /// Sets the request path.
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Sets the context name.
    #[must_use]
    pub fn context(mut self, name: impl Into<String>) -> Self {
        self.context_name = Some(name.into());
        self
    }

    /// Attaches the session.
    #[must_use]
    pub fn session(mut self, session: SessionHandle) -> Self {
        self.session = Some(session);
        self
    }

    /// Returns whether a parameter named `name` was submitted.
    pub fn has_param(&self, name: &str) -> bool {
        self.params.iter().any(|(k, _)| k == name)
    }

    /// Returns the parameters as a cstruct.
    pub fn pstruct(&self) -> Cstruct {
        Cstruct::from_params(self.params.iter().map(|(k, v)| (k.as_str(), v.clone())))
    }

    /// Returns the session's CSRF token.
    pub fn csrf_token(&self) -> Result<String> {
        let session = self
            .session
            .as_ref()
            .ok_or(SessionError::SessionNotFound)?;
        Ok(session.csrf_token()?)
    }
}

/// What a success or failure hook wants to happen next.
#[derive(Debug, Clone, PartialEq)]
pub enum HookOutcome {
    /// Keep going; the map is merged into the template variables.
    Continue(Map<String, Value>),
    /// Stop and redirect.
    Redirect(String),
}

impl HookOutcome {
    /// Continue with no extra variables.
    pub fn proceed() -> Self {
        Self::Continue(Map::new())
    }
}

/// Schema and hooks of one form view.
pub trait FormHandler {
    /// Builds the form for `request`.
    fn schema(&self, request: &FormRequest) -> Result<Field>;

    /// Name used in the page heading when the request has no context.
    fn name(&self) -> String {
        let full = std::any::type_name::<Self>();
        let base = full.split('<').next().unwrap_or(full);
        base.rsplit("::").next().unwrap_or(base).to_string()
    }

    /// Values shown when nothing was submitted.
    fn default_appstruct(&self, _request: &FormRequest) -> Option<Cstruct> {
        None
    }

    /// Adjusts the form before validation and rendering.
    fn prepare(&self, form: Field) -> Field {
        form
    }

    /// Handles valid input.
    fn success(&self, _request: &FormRequest, _appstruct: &Cstruct) -> Result<HookOutcome> {
        Ok(HookOutcome::proceed())
    }

    /// Handles invalid input.
    fn failure(&self, _request: &FormRequest, _errors: &ValidationErrors) -> Result<HookOutcome> {
        Ok(HookOutcome::proceed())
    }

    /// JSON body returned for valid input by [`FormView::handle_json`].
    fn success_json(&self, _request: &FormRequest, _appstruct: &Cstruct) -> Result<Option<Value>> {
        Ok(None)
    }

    /// Last chance to change the template variables.
    fn complete(&self, vars: TemplateVars) -> Result<TemplateVars> {
        Ok(vars)
    }
}

/// Result of [`FormView::validate`].
///
/// Both `error` and `appstruct` are `None` when the request was not
/// validated.
#[derive(Debug, Clone)]
pub struct ValidatedForm {
    /// The prepared form.
    pub form: Field,
    /// Validation errors.
    pub error: Option<ValidationErrors>,
    /// Validated values.
    pub appstruct: Option<Cstruct>,
    /// Submitted values.
    pub pstruct: Cstruct,
}

impl ValidatedForm {
    /// Returns the validated values, or the errors as [`FormError::Validation`].
    pub fn into_appstruct(self) -> Result<Option<Cstruct>> {
        match self.error {
            Some(errors) => Err(FormError::Validation(errors)),
            None => Ok(self.appstruct),
        }
    }
}

/// A form paired with the values to render it with.
#[derive(Debug, Clone)]
pub struct FormRender {
    form: Field,
    cstruct: Cstruct,
}

impl FormRender {
    /// Creates a deferred render.
    pub fn new(form: Field, cstruct: Cstruct) -> Self {
        Self { form, cstruct }
    }

    /// Renders the form.
    pub fn render(&self) -> Result<String> {
        self.form.render(&self.cstruct)
    }

    /// Returns the form.
    pub fn form(&self) -> &Field {
        &self.form
    }

    /// Returns the values the form renders with.
    pub fn cstruct(&self) -> &Cstruct {
        &self.cstruct
    }
}

/// Variables handed to the page template.
#[derive(Debug, Clone)]
pub struct TemplateVars {
    /// Heading such as "Edit Profile".
    pub form_name: String,
    /// `(name, title)` of each top-level section.
    pub form_sections: Vec<(String, String)>,
    /// Validated or default values.
    pub appstruct: Option<Cstruct>,
    /// Validation errors.
    pub error: Option<ValidationErrors>,
    /// Response status.
    pub status: u16,
    /// Pre-rendered form, when rendered eagerly.
    pub form: Option<String>,
    /// Deferred form render.
    pub render_form: FormRender,
    /// Variables added by the hooks.
    pub extra: Map<String, Value>,
}

/// Outcome of [`FormView::handle`].
#[derive(Debug, Clone)]
pub enum ViewOutcome {
    /// Redirect to the URL.
    Redirect(String),
    /// Render a page with the variables.
    Render(TemplateVars),
}

/// Outcome of [`FormView::handle_json`].
#[derive(Debug, Clone, PartialEq)]
pub struct JsonResponse {
    /// Response status.
    pub status: u16,
    /// Response body.
    pub body: Value,
}

/// Drives a [`FormHandler`] through one request.
#[derive(Debug, Clone)]
pub struct FormView<H> {
    handler: H,
    options: FormViewOptions,
}

impl<H: FormHandler> FormView<H> {
    /// Creates a view with the given options.
    pub fn new(handler: H, options: FormViewOptions) -> Self {
        Self { handler, options }
    }

    /// Returns the handler.
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Returns the options.
    pub fn options(&self) -> &FormViewOptions {
        &self.options
    }

    /// Builds the form and applies the view options to it.
    pub fn build_form(&self, request: &FormRequest) -> Result<Field> {
        let mut form = self.handler.schema(request)?;
        form.buttons = self.options.buttons.iter().map(Button::new).collect();
        form.method.clone_from(&self.options.method);
        if !self.options.action.is_empty() {
            form.action.clone_from(&self.options.action);
        }
        form.use_ajax = self.options.use_ajax;
        form.ajax_options = self.options.ajax_options.clone();
        if self.options.form_style.is_some() {
            form.bootstrap_form_style = self.options.form_style;
        }
        Ok(self.handler.prepare(form))
    }

    fn should_validate(&self, request: &FormRequest) -> bool {
        let method_matches = self
            .options
            .validate_methods
            .iter()
            .any(|m| m.eq_ignore_ascii_case(&request.method));
        method_matches
            && !self
                .options
                .ignore_actions
                .iter()
                .any(|action| request.has_param(action))
    }

    /// Builds the form and validates the request when its method calls for it.
    pub fn validate(&self, request: &FormRequest) -> Result<ValidatedForm> {
        let form = self.build_form(request)?;

        if !self.should_validate(request) {
            debug!(method = %request.method, formid = %form.formid, "form not validated");
            return Ok(ValidatedForm {
                form,
                error: None,
                appstruct: None,
                pstruct: Cstruct::Null,
            });
        }

        let pstruct = form.unpack(request.pstruct());
        let (error, appstruct) = match form.validate(&pstruct) {
            Ok(appstruct) => (None, Some(appstruct)),
            Err(errors) => (Some(errors), None),
        };
        debug!(
            formid = %form.formid,
            valid = error.is_none(),
            errors = error.as_ref().map_or(0, ValidationErrors::len),
            "validated form"
        );

        Ok(ValidatedForm {
            form,
            error,
            appstruct,
            pstruct,
        })
    }

    /// Runs the full request flow.
    pub fn handle(&self, request: &FormRequest) -> Result<ViewOutcome> {
        let ValidatedForm {
            mut form,
            error,
            appstruct,
            pstruct,
        } = self.validate(request)?;

        let hook = match (&error, &appstruct) {
            (Some(errors), _) => Some(self.handler.failure(request, errors)?),
            (None, Some(values)) => Some(self.handler.success(request, values)?),
            (None, None) => None,
        };
        let extra = match hook {
            Some(HookOutcome::Redirect(url)) => {
                debug!(%url, "form view redirect");
                return Ok(ViewOutcome::Redirect(url));
            }
            Some(HookOutcome::Continue(extra)) => extra,
            None => Map::new(),
        };

        let defaults = form.defaults();
        let (appstruct, cstruct) = match &error {
            Some(errors) => {
                form.apply_errors(errors);
                (None, pstruct.with_defaults(&defaults))
            }
            None => {
                let appstruct = appstruct.or_else(|| self.handler.default_appstruct(request));
                let cstruct = appstruct.clone().unwrap_or_default().with_defaults(&defaults);
                (appstruct, cstruct)
            }
        };

        let render_form = FormRender::new(form, cstruct);
        let rendered = if self.options.should_render_form {
            Some(render_form.render()?)
        } else {
            None
        };

        let vars = TemplateVars {
            form_name: self.form_name(request),
            form_sections: self.top_level_sections(render_form.form()),
            appstruct,
            status: if error.is_some() { 400 } else { 200 },
            error,
            form: rendered,
            render_form,
            extra,
        };
        Ok(ViewOutcome::Render(self.handler.complete(vars)?))
    }

    /// Runs the request flow without rendering, answering with JSON.
    pub fn handle_json(&self, request: &FormRequest) -> Result<JsonResponse> {
        let validated = self.validate(request)?;

        if let Some(errors) = &validated.error {
            return Ok(JsonResponse {
                status: 400,
                body: errors.to_json(),
            });
        }

        let body = match &validated.appstruct {
            Some(values) => self.handler.success_json(request, values)?,
            None => None,
        };
        Ok(JsonResponse {
            status: 200,
            body: body.unwrap_or_else(|| Value::Object(Map::new())),
        })
    }

    /// Returns e.g. "Create new Profile" or "Edit Profile".
    pub fn form_name(&self, request: &FormRequest) -> String {
        let creating = self
            .options
            .buttons
            .first()
            .is_some_and(|b| b.eq_ignore_ascii_case("create"));
        let action = if creating { "Create new" } else { "Edit" };
        let name = request
            .context_name
            .clone()
            .unwrap_or_else(|| self.handler.name());
        format!("{action} {name}")
    }

    /// Returns `(name, title)` for each top-level child not ignored.
    pub fn top_level_sections(&self, form: &Field) -> Vec<(String, String)> {
        form.children
            .iter()
            .filter(|child| !self.options.ignore_sections.contains(&child.name))
            .map(|child| {
                let title = if child.title.is_empty() {
                    title_case(&child.name)
                } else {
                    child.title.clone()
                };
                (child.name.clone(), title)
            })
            .collect()
    }
}
