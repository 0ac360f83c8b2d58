//! Value preparers, applied to submitted scalars before validation.

use std::sync::LazyLock;

use regex::Regex;

static SPACES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(" +").expect("valid spaces pattern"));

static SCHEME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*://").expect("valid scheme pattern")
});

/// A value preparer.
pub type Preparer = fn(&str) -> String;

/// Strips leading and trailing spaces, tabs and line breaks.
pub fn strip_whitespace(value: &str) -> String {
    value.trim_matches(&[' ', '\t', '\n', '\r'][..]).to_string()
}

/// Lowercases the value.
pub fn coerce_to_lowercase(value: &str) -> String {
    value.to_lowercase()
}

/// Collapses runs of spaces into one.
pub fn remove_multiple_spaces(value: &str) -> String {
    SPACES_RE.replace_all(value, " ").into_owned()
}

/// Prefixes `http://` when the value has no scheme.
pub fn url_preparer(value: &str) -> String {
    if value.is_empty() || SCHEME_RE.is_match(value) {
        value.to_string()
    } else {
        format!("http://{value}")
    }
}

/// Cleans editor output: decodes carriage returns, collapses blank lines
/// and drops one enclosing paragraph.
pub fn markdown_preparer(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    let value = value.replace("&#13;", "\r\n").replace("\n\n", "\n");
    let value = value.strip_prefix("<p>").unwrap_or(&value);
    let value = value.strip_suffix("</p>").unwrap_or(value);
    value.to_string()
}
