//! Request validation shared by every document route.

use thiserror::Error;

/// Reasons a submitted document is rejected before reaching any model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Document was empty or contained only whitespace.
    #[error("Text content cannot be empty.")]
    EmptyText,
}

/// Reject empty and whitespace-only documents.
pub fn validate_document(text: &str) -> Result<&str, ValidationError> {
    if text.trim().is_empty() {
        Err(ValidationError::EmptyText)
    } else {
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_input() {
        for blank in ["", " ", "\n\t  \r\n", "\u{3000}"] {
            assert_eq!(validate_document(blank), Err(ValidationError::EmptyText));
        }
    }

    #[test]
    fn keeps_text_untouched() {
        assert_eq!(validate_document("  padded  "), Ok("  padded  "));
    }
}
