//! Field validators.

use std::sync::LazyLock;

use regex::Regex;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email pattern")
});

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://([A-Za-z0-9-]+\.)+[A-Za-z]{2,}(:\d+)?([/?#]\S*)?$")
        .expect("valid url pattern")
});

/// Trait for field validators.
pub trait Validator: Send + Sync {
    /// Validates a value and returns an error message if invalid.
    fn validate(&self, value: &str) -> Result<(), String>;

    /// Returns the error message for this validator.
    fn message(&self) -> &str;
}

/// Validator that requires a non-blank value.
#[derive(Debug, Clone)]
pub struct RequiredValidator {
    message: String,
}

impl RequiredValidator {
    /// Creates a new RequiredValidator with default message.
    pub fn new() -> Self {
        Self {
            message: "Required".to_string(),
        }
    }

    /// Creates a new RequiredValidator with custom message.
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Default for RequiredValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for RequiredValidator {
    fn validate(&self, value: &str) -> Result<(), String> {
        if value.trim().is_empty() {
            Err(self.message.clone())
        } else {
            Ok(())
        }
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Validator that enforces a maximum length in characters.
#[derive(Debug, Clone)]
pub struct MaxLengthValidator {
    max_length: usize,
    message: String,
}

impl MaxLengthValidator {
    /// Creates a new MaxLengthValidator.
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length,
            message: format!("Longer than maximum length {max_length}"),
        }
    }
}

impl Validator for MaxLengthValidator {
    fn validate(&self, value: &str) -> Result<(), String> {
        if value.chars().count() > self.max_length {
            Err(self.message.clone())
        } else {
            Ok(())
        }
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Validator that enforces a minimum length in characters.
#[derive(Debug, Clone)]
pub struct MinLengthValidator {
    min_length: usize,
    message: String,
}

impl MinLengthValidator {
    /// Creates a new MinLengthValidator.
    pub fn new(min_length: usize) -> Self {
        Self {
            min_length,
            message: format!("Shorter than minimum length {min_length}"),
        }
    }
}

impl Validator for MinLengthValidator {
    fn validate(&self, value: &str) -> Result<(), String> {
        if value.chars().count() < self.min_length {
            Err(self.message.clone())
        } else {
            Ok(())
        }
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Validator for email addresses.
#[derive(Debug, Clone)]
pub struct EmailValidator {
    message: String,
}

impl EmailValidator {
    /// Creates a new EmailValidator with default message.
    pub fn new() -> Self {
        Self {
            message: "Invalid email address".to_string(),
        }
    }
}

impl Default for EmailValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for EmailValidator {
    fn validate(&self, value: &str) -> Result<(), String> {
        if EMAIL_RE.is_match(value) {
            Ok(())
        } else {
            Err(self.message.clone())
        }
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Validator for absolute http(s) URLs with a top level domain, at most
/// 255 characters long.
#[derive(Debug, Clone)]
pub struct UrlValidator {
    max_length: MaxLengthValidator,
    message: String,
}

impl UrlValidator {
    /// Creates a new UrlValidator with default message.
    pub fn new() -> Self {
        Self {
            max_length: MaxLengthValidator::new(255),
            message: "Invalid url".to_string(),
        }
    }
}

impl Default for UrlValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for UrlValidator {
    fn validate(&self, value: &str) -> Result<(), String> {
        if value.is_empty() {
            return Ok(());
        }
        self.max_length.validate(value)?;
        if URL_RE.is_match(value) {
            Ok(())
        } else {
            Err(format!("{value:?} is not a valid url"))
        }
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Validator using a custom regex pattern.
#[derive(Debug, Clone)]
pub struct RegexValidator {
    pattern: Regex,
    message: String,
}

impl RegexValidator {
    /// Creates a new RegexValidator.
    pub fn new(pattern: &str, message: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            message: message.into(),
        })
    }
}

impl Validator for RegexValidator {
    fn validate(&self, value: &str) -> Result<(), String> {
        if self.pattern.is_match(value) {
            Ok(())
        } else {
            Err(self.message.clone())
        }
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Validator that checks a submitted value against the session's CSRF token.
#[derive(Debug, Clone)]
pub struct CsrfValidator {
    token: String,
    message: String,
}

impl CsrfValidator {
    /// Creates a validator expecting `token`.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            message: "Invalid cross-site scripting token".to_string(),
        }
    }
}

impl Validator for CsrfValidator {
    fn validate(&self, value: &str) -> Result<(), String> {
        if value == self.token {
            Ok(())
        } else {
            Err(self.message.clone())
        }
    }

    fn message(&self) -> &str {
        &self.message
    }
}
