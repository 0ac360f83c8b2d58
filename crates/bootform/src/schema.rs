//! Schema helpers shared by every form.

use crate::field::Field;
use crate::validation::CsrfValidator;
use crate::widgets::HiddenWidget;

/// Name of the anti-CSRF child field.
pub const CSRF_FIELD: &str = "_csrf";

/// Methods that never change state (RFC 2616, section 9.1.1).
pub const SAFE_METHODS: [&str; 2] = ["GET", "HEAD"];

/// Returns whether `method` is safe.
pub fn is_safe_method(method: &str) -> bool {
    SAFE_METHODS
        .iter()
        .any(|safe| safe.eq_ignore_ascii_case(method))
}

/// Builds the hidden `_csrf` field for a request made with `method`.
///
/// Safe requests always see the session token; other requests must submit
/// it back unchanged.
pub fn csrf_field(method: &str, token: &str) -> Field {
    let field = Field::new(CSRF_FIELD, HiddenWidget).default_value(token);
    if is_safe_method(method) {
        field.missing(token)
    } else {
        field.required().validator(CsrfValidator::new(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cstruct::Cstruct;
    use crate::widgets::TextInputWidget;

    fn form(method: &str) -> Field {
        Field::form("f")
            .child(csrf_field(method, "s3cret"))
            .child(Field::new("name", TextInputWidget::new()))
    }

    #[test]
    fn test_safe_methods() {
        assert!(is_safe_method("GET"));
        assert!(is_safe_method("head"));
        assert!(!is_safe_method("POST"));
    }

    #[test]
    fn test_get_uses_session_token() {
        let appstruct = form("GET").validate(&Cstruct::map([("name", "x")])).unwrap();
        assert_eq!(appstruct.get(CSRF_FIELD).as_str(), Some("s3cret"));
    }

    #[test]
    fn test_post_requires_token() {
        let errors = form("POST").validate(&Cstruct::map([("name", "x")])).unwrap_err();
        assert_eq!(errors.get(CSRF_FIELD), Some(&vec!["Required".to_string()]));
    }

    #[test]
    fn test_post_rejects_wrong_token() {
        let pstruct = Cstruct::map([("name", "x"), (CSRF_FIELD, "forged")]);
        let errors = form("POST").validate(&pstruct).unwrap_err();
        assert_eq!(
            errors.get(CSRF_FIELD),
            Some(&vec!["Invalid cross-site scripting token".to_string()])
        );
    }

    #[test]
    fn test_post_accepts_token() {
        let pstruct = Cstruct::map([("name", "x"), (CSRF_FIELD, "s3cret")]);
        assert!(form("POST").validate(&pstruct).is_ok());
    }

    #[test]
    fn test_token_is_rendered_by_default() {
        let field = form("GET");
        let html = field.render(&field.defaults()).unwrap();
        assert!(html.contains(r#"<input type="hidden" name="_csrf" value="s3cret" id="id__csrf"/>"#));
    }
}
