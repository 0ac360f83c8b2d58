//! Translatable strings used by the form templates.

use std::collections::HashMap;

/// Translation domain of every message emitted by this crate.
pub const DOMAIN: &str = "bootform";

/// Heading of the form error banner.
pub const PROBLEM_HEADING: &str = "There was a problem with your submission";

/// Notice shown in the banner when the form error carries no message.
pub const ERRORS_HIGHLIGHTED: &str = "Errors have been highlighted below";

/// Looks up translations for message ids.
pub trait Translator: Send + Sync {
    /// Translates `msgid` within `domain`, falling back to `msgid`.
    fn translate(&self, domain: &str, msgid: &str) -> String;
}

/// Translator that returns every message unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTranslator;

impl Translator for NullTranslator {
    fn translate(&self, _domain: &str, msgid: &str) -> String {
        msgid.to_string()
    }
}

/// Translator backed by an in-memory catalog for a single domain.
#[derive(Debug, Clone)]
pub struct CatalogTranslator {
    domain: String,
    messages: HashMap<String, String>,
}

impl CatalogTranslator {
    /// Creates an empty catalog for `domain`.
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            messages: HashMap::new(),
        }
    }

    /// Adds a translation.
    #[must_use]
    pub fn message(mut self, msgid: impl Into<String>, msgstr: impl Into<String>) -> Self {
        self.messages.insert(msgid.into(), msgstr.into());
        self
    }
}

impl Translator for CatalogTranslator {
    fn translate(&self, domain: &str, msgid: &str) -> String {
        if domain != self.domain {
            return msgid.to_string();
        }
        self.messages
            .get(msgid)
            .cloned()
            .unwrap_or_else(|| msgid.to_string())
    }
}
