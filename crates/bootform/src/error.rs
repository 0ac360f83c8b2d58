//! Error types for forms.

use std::collections::BTreeMap;
use thiserror::Error;

/// Key under which form-level (non-field) messages are stored.
pub const FORM_ERRORS_KEY: &str = "__all__";

/// Form-specific errors.
#[derive(Debug, Error)]
pub enum FormError {
    /// No template is registered under the requested name.
    #[error("template not found: {0}")]
    TemplateNotFound(String),

    /// Validation failed with errors.
    #[error("validation errors: {0}")]
    Validation(ValidationErrors),

    /// JSON encoding failed (ajax options, cache keys).
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The session store failed.
    #[error("session error: {0}")]
    Session(#[from] bootform_session::SessionError),

    /// A render collaborator failed.
    #[error("render error: {0}")]
    Render(String),

    /// Settings are missing or unusable.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Collection of validation errors by dotted field path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    /// Errors keyed by field path.
    pub errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    /// Creates a new empty ValidationErrors.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an error for a field.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Adds a form-level error.
    pub fn add_form_error(&mut self, message: impl Into<String>) {
        self.add(FORM_ERRORS_KEY, message);
    }

    /// Returns whether there are any errors.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of fields with errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns errors for a specific field.
    pub fn get(&self, field: &str) -> Option<&Vec<String>> {
        self.errors.get(field)
    }

    /// Returns all errors as a flat list.
    pub fn all_errors(&self) -> Vec<(&str, &str)> {
        self.errors
            .iter()
            .flat_map(|(field, messages)| {
                messages
                    .iter()
                    .map(move |msg| (field.as_str(), msg.as_str()))
            })
            .collect()
    }

    /// Returns the errors as a JSON object of path to message list.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.errors
                .iter()
                .map(|(field, messages)| (field.clone(), serde_json::json!(messages)))
                .collect(),
        )
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (field, messages) in &self.errors {
            for message in messages {
                writeln!(f, "{field}: {message}")?;
            }
        }
        Ok(())
    }
}

/// Result type alias for form operations.
pub type Result<T> = std::result::Result<T, FormError>;
