//! Form validation
//!
//! Explicit per-field validators returning a tagged result, composed
//! into record-level validation. A form either validates into its
//! cleaned struct or yields a `FormErrors` collection that the handlers
//! feed back into the template for re-rendering. Validation never has
//! side effects; nothing is saved or sent for an invalid form.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Maximum length of a commenter/sharer name, matching the column width.
const NAME_MAX_LEN: usize = 80;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

/// Why a single field failed validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum FieldError {
    /// The field is required but empty or missing
    Required,
    /// The value exceeds the maximum length
    TooLong { max: usize },
    /// The value is not a syntactically valid email address
    InvalidEmail,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldError::Required => write!(f, "This field is required."),
            FieldError::TooLong { max } => {
                write!(f, "Ensure this value has at most {} characters.", max)
            }
            FieldError::InvalidEmail => write!(f, "Enter a valid email address."),
        }
    }
}

/// Per-field errors for one submitted form
#[derive(Debug, Clone, Default, Serialize)]
pub struct FormErrors {
    errors: Vec<(&'static str, FieldError)>,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn push(&mut self, field: &'static str, error: FieldError) {
        self.errors.push((field, error));
    }

    pub fn field(&self, field: &str) -> Option<&FieldError> {
        self.errors
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, e)| e)
    }

    /// (field, message) pairs for template rendering
    pub fn messages(&self) -> Vec<(String, String)> {
        self.errors
            .iter()
            .map(|(name, e)| (name.to_string(), e.to_string()))
            .collect()
    }

    /// Accumulate one field result, keeping the cleaned value if valid.
    fn collect<T>(&mut self, field: &'static str, result: Result<T, FieldError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(error) => {
                self.push(field, error);
                None
            }
        }
    }
}

/// Validate a required text field, trimming surrounding whitespace.
pub fn required(value: &str, max_len: usize) -> Result<String, FieldError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FieldError::Required);
    }
    if trimmed.chars().count() > max_len {
        return Err(FieldError::TooLong { max: max_len });
    }
    Ok(trimmed.to_string())
}

/// Validate a required, syntactically valid email address.
pub fn email(value: &str) -> Result<String, FieldError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FieldError::Required);
    }
    if !EMAIL_RE.is_match(trimmed) {
        return Err(FieldError::InvalidEmail);
    }
    Ok(trimmed.to_string())
}

/// Normalize an optional text field: blank becomes None.
pub fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Raw share-form submission as posted by the browser
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawShareForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub comments: String,
}

/// Cleaned share form
#[derive(Debug, Clone, PartialEq)]
pub struct ShareForm {
    pub name: String,
    pub email: String,
    pub to: String,
    pub comments: Option<String>,
}

impl ShareForm {
    pub fn validate(raw: &RawShareForm) -> Result<Self, FormErrors> {
        let mut errors = FormErrors::default();

        let name = errors.collect("name", required(&raw.name, NAME_MAX_LEN));
        let email = errors.collect("email", self::email(&raw.email));
        let to = errors.collect("to", self::email(&raw.to));
        let comments = optional(&raw.comments);

        if errors.is_empty() {
            Ok(Self {
                name: name.unwrap(),
                email: email.unwrap(),
                to: to.unwrap(),
                comments,
            })
        } else {
            Err(errors)
        }
    }
}

/// Raw comment-form submission as posted by the browser
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawCommentForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub body: String,
}

/// Cleaned comment form
#[derive(Debug, Clone, PartialEq)]
pub struct CommentForm {
    pub name: String,
    pub email: String,
    pub body: String,
}

impl CommentForm {
    pub fn validate(raw: &RawCommentForm) -> Result<Self, FormErrors> {
        let mut errors = FormErrors::default();

        let name = errors.collect("name", required(&raw.name, NAME_MAX_LEN));
        let email = errors.collect("email", self::email(&raw.email));
        let body = errors.collect("body", required(&raw.body, usize::MAX));

        if errors.is_empty() {
            Ok(Self {
                name: name.unwrap(),
                email: email.unwrap(),
                body: body.unwrap(),
            })
        } else {
            Err(errors)
        }
    }
}

/// Search form: an absent or blank query is not an error, just no search.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSearchForm {
    #[serde(default)]
    pub query: String,
}

impl RawSearchForm {
    /// The cleaned query, or None when nothing was searched for.
    pub fn cleaned_query(&self) -> Option<String> {
        optional(&self.query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_trims_and_rejects_blank() {
        assert_eq!(required("  hi  ", 10).unwrap(), "hi");
        assert_eq!(required("   ", 10), Err(FieldError::Required));
        assert_eq!(required("abcdef", 5), Err(FieldError::TooLong { max: 5 }));
    }

    #[test]
    fn test_email_syntax() {
        assert!(email("ann@example.com").is_ok());
        assert_eq!(email(""), Err(FieldError::Required));
        assert_eq!(email("not-an-email"), Err(FieldError::InvalidEmail));
        assert_eq!(email("a@b"), Err(FieldError::InvalidEmail));
        assert_eq!(email("two words@example.com"), Err(FieldError::InvalidEmail));
    }

    #[test]
    fn test_share_form_collects_all_field_errors() {
        let raw = RawShareForm {
            name: String::new(),
            email: "bad".to_string(),
            to: "also bad".to_string(),
            comments: String::new(),
        };
        let errors = ShareForm::validate(&raw).unwrap_err();
        assert_eq!(errors.field("name"), Some(&FieldError::Required));
        assert_eq!(errors.field("email"), Some(&FieldError::InvalidEmail));
        assert_eq!(errors.field("to"), Some(&FieldError::InvalidEmail));
    }

    #[test]
    fn test_share_form_valid() {
        let raw = RawShareForm {
            name: "Ann".to_string(),
            email: "ann@example.com".to_string(),
            to: "bob@example.com".to_string(),
            comments: "  ".to_string(),
        };
        let form = ShareForm::validate(&raw).unwrap();
        assert_eq!(form.name, "Ann");
        assert_eq!(form.comments, None);
    }

    #[test]
    fn test_comment_form_requires_body() {
        let raw = RawCommentForm {
            name: "Bea".to_string(),
            email: "bea@example.com".to_string(),
            body: "  ".to_string(),
        };
        let errors = CommentForm::validate(&raw).unwrap_err();
        assert_eq!(errors.field("body"), Some(&FieldError::Required));
        assert!(errors.field("name").is_none());
    }

    #[test]
    fn test_search_form_blank_query_is_none() {
        assert_eq!(RawSearchForm { query: "  ".into() }.cleaned_query(), None);
        assert_eq!(
            RawSearchForm { query: " rust ".into() }.cleaned_query(),
            Some("rust".to_string())
        );
    }
}
