use serde::Serialize;
use thiserror::Error;

use crate::models::ValidationOutcome;

pub const DEFAULT_MIN_LENGTH: usize = 2;
pub const DEFAULT_MAX_LENGTH: usize = 500;

/// Substrings that reject a query outright. Matched case-insensitively.
pub const DENYLIST: &[&str] = &["<script", "javascript:", "data:", "vbscript:"];

const STRIPPED_CHARS: &[char] = &['<', '>', '{', '}'];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryRejection {
    #[error("Query cannot be empty")]
    Empty,
    #[error("Query too short (minimum length is {min} characters)")]
    TooShort { min: usize },
    #[error("Query too long (maximum length is {max} characters)")]
    TooLong { max: usize },
    #[error("Query contains invalid content")]
    ForbiddenContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueryValidator {
    min_length: usize,
    max_length: usize,
}

impl Default for QueryValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryValidator {
    pub fn new() -> Self {
        Self {
            min_length: DEFAULT_MIN_LENGTH,
            max_length: DEFAULT_MAX_LENGTH,
        }
    }

    pub fn with_limits(min_length: usize, max_length: usize) -> Self {
        Self {
            min_length: min_length.max(1),
            max_length: max_length.max(min_length.max(1)),
        }
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub fn validate(&self, text: &str) -> ValidationOutcome {
        match self.check(text) {
            Ok(sanitized_text) => ValidationOutcome::Accepted { sanitized_text },
            Err(reason) => ValidationOutcome::Rejected { reason },
        }
    }

    fn check(&self, text: &str) -> Result<String, QueryRejection> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(QueryRejection::Empty);
        }

        if trimmed.chars().count() < self.min_length {
            return Err(QueryRejection::TooShort {
                min: self.min_length,
            });
        }

        if text.chars().count() > self.max_length {
            return Err(QueryRejection::TooLong {
                max: self.max_length,
            });
        }

        if contains_denylisted(text) {
            return Err(QueryRejection::ForbiddenContent);
        }

        let sanitized = sanitize(text);
        if sanitized.chars().count() < self.min_length {
            return Err(QueryRejection::TooShort {
                min: self.min_length,
            });
        }

        Ok(sanitized)
    }
}

pub fn validate(text: &str) -> ValidationOutcome {
    QueryValidator::new().validate(text)
}

/// Best-effort scrub: drops `<>{}` then collapses whitespace.
///
/// Not an escaping routine. Dropping before collapsing keeps the function idempotent.
pub fn sanitize(text: &str) -> String {
    text.chars()
        .filter(|ch| !STRIPPED_CHARS.contains(ch))
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn contains_denylisted(text: &str) -> bool {
    let lower = text.to_lowercase();
    DENYLIST.iter().any(|needle| lower.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_and_blank() {
        assert_eq!(
            validate("").rejection_reason(),
            Some(&QueryRejection::Empty)
        );
        assert_eq!(
            validate("   \n\t").rejection_reason(),
            Some(&QueryRejection::Empty)
        );
    }

    #[test]
    fn rejects_too_short_after_trim() {
        let outcome = validate("  a  ");
        assert!(matches!(
            outcome.rejection_reason(),
            Some(QueryRejection::TooShort { min: 2 })
        ));
        assert!(validate("hi").is_accepted());
    }

    #[test]
    fn rejects_overlong_text() {
        let text = "a".repeat(501);
        let outcome = validate(&text);
        let reason = outcome.rejection_reason().unwrap();
        assert!(reason.to_string().contains("length"));
        assert!(validate(&"a".repeat(500)).is_accepted());
    }

    #[test]
    fn rejects_denylisted_content_regardless_of_case() {
        for text in [
            "<script>alert(1)</script>",
            "<SCRIPT src=x>",
            "go to JavaScript:void(0)",
            "data:text/html,hi",
            "VBScript:msgbox",
        ] {
            assert_eq!(
                validate(text).rejection_reason(),
                Some(&QueryRejection::ForbiddenContent),
                "{text}"
            );
        }
    }

    #[test]
    fn sanitizes_accepted_text() {
        let outcome = validate("  where   to {eat}\tdosa <now>  ");
        assert_eq!(outcome.sanitized_text(), Some("where to eat dosa now"));
    }

    #[test]
    fn sanitize_is_idempotent() {
        for text in ["a < b", " {x}  y ", "plain text", "<<>>", "tab\t\tand\nnewline"] {
            let once = sanitize(text);
            assert_eq!(sanitize(&once), once, "{text:?}");
        }
    }

    #[test]
    fn rejects_text_that_sanitizes_to_nothing() {
        assert!(!validate("<>{}").is_accepted());
    }

    #[test]
    fn custom_limits_apply() {
        let validator = QueryValidator::with_limits(5, 10);
        assert!(!validator.validate("four").is_accepted());
        assert!(validator.validate("fives").is_accepted());
        assert!(!validator.validate("eleven chars").is_accepted());
    }
}
