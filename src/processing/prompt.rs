//! Prompt construction and reply parsing for the generative backend.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Categories the generative model chooses from.
pub const DOCUMENT_TAXONOMY: [&str; 45] = [
    "Invoice",
    "Receipt",
    "Purchase Order",
    "Quotation",
    "Bank Statement",
    "Tax Document",
    "Financial Report",
    "Budget",
    "Expense Report",
    "Payslip",
    "Legal Contract",
    "Non-Disclosure Agreement",
    "Lease Agreement",
    "Terms of Service",
    "Privacy Policy",
    "Court Filing",
    "Power of Attorney",
    "Will or Testament",
    "Resume",
    "Cover Letter",
    "Job Description",
    "Offer Letter",
    "Employee Handbook",
    "Performance Review",
    "Meeting Notes",
    "Memo",
    "Business Proposal",
    "Business Plan",
    "Project Plan",
    "Presentation",
    "Technical Documentation",
    "User Manual",
    "Source Code",
    "Research Paper",
    "Scientific Paper",
    "Thesis or Dissertation",
    "Study Material",
    "Lecture Notes",
    "News Article",
    "Blog Post",
    "Press Release",
    "Fiction",
    "Medical Record",
    "Personal Letter",
    "Form or Application",
];

/// Label reported when the model's reply cannot be used.
pub const UNCLASSIFIED: &str = "Unclassified";
/// Summary reported when the model's reply cannot be used.
pub const ERROR_SUMMARY: &str = "Error: Could not process the document.";

/// Summary and label extracted from the model's reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInsight {
    /// Model-written summary.
    pub summary: String,
    /// Category drawn from [`DOCUMENT_TAXONOMY`].
    pub classification: String,
}

impl DocumentInsight {
    /// Placeholder pair returned whenever generation or parsing fails.
    pub fn error_placeholder() -> Self {
        Self {
            summary: ERROR_SUMMARY.to_string(),
            classification: UNCLASSIFIED.to_string(),
        }
    }
}

/// Failures while interpreting a model reply.
#[derive(Debug, Error)]
pub enum ReplyError {
    /// Reply was not a JSON object with `summary` and `classification` strings.
    #[error("reply is not the expected JSON object: {0}")]
    Json(#[from] serde_json::Error),
}

/// Build the single prompt sent to the generative model.
pub fn build_prompt(text: &str) -> String {
    let categories = DOCUMENT_TAXONOMY.join(", ");
    format!(
        "You are a document analysis assistant. Read the document below and do two things:\n\
         1. Write a concise summary of the document in 3 to 5 sentences.\n\
         2. Classify the document into exactly one of these categories: {categories}.\n\
         \n\
         Respond only with a JSON object of the form \
         {{\"summary\": \"<summary>\", \"classification\": \"<category>\"}} \
         and nothing else.\n\
         \n\
         Document:\n\
         {text}"
    )
}

/// Remove markdown code-fence markers the model tends to wrap JSON in.
pub fn strip_code_fences(reply: &str) -> &str {
    let trimmed = reply.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```JSON"))
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    let without_close = without_open
        .trim_end()
        .strip_suffix("```")
        .unwrap_or(without_open);
    without_close.trim()
}

/// Parse a model reply into a [`DocumentInsight`].
///
/// Labels matching the taxonomy case-insensitively take the taxonomy's spelling; a blank label
/// becomes [`UNCLASSIFIED`].
pub fn parse_reply(reply: &str) -> Result<DocumentInsight, ReplyError> {
    let mut insight: DocumentInsight = serde_json::from_str(strip_code_fences(reply))?;
    insight.summary = insight.summary.trim().to_string();
    insight.classification = canonical_label(&insight.classification);
    Ok(insight)
}

fn canonical_label(label: &str) -> String {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        return UNCLASSIFIED.to_string();
    }
    DOCUMENT_TAXONOMY
        .iter()
        .find(|known| known.eq_ignore_ascii_case(trimmed))
        .map_or_else(|| trimmed.to_string(), |known| known.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_taxonomy_and_document() {
        let prompt = build_prompt("Quarterly revenue grew 12%.");
        for label in DOCUMENT_TAXONOMY {
            assert!(prompt.contains(label), "missing {label}");
        }
        assert!(prompt.contains("\"summary\""));
        assert!(prompt.contains("\"classification\""));
        assert!(prompt.ends_with("Quarterly revenue grew 12%."));
    }

    #[test]
    fn taxonomy_has_no_duplicates() {
        let mut seen = std::collections::HashSet::new();
        for label in DOCUMENT_TAXONOMY {
            assert!(seen.insert(label.to_lowercase()), "duplicate {label}");
        }
    }

    #[test]
    fn strips_fenced_replies() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("  ```\n{\"a\":1}```  "), "{\"a\":1}");
        assert_eq!(strip_code_fences("{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn parses_fenced_reply_and_canonicalizes_label() {
        let reply = "```json\n{\"summary\": \" An invoice for services. \", \"classification\": \"invoice\"}\n```";
        let insight = parse_reply(reply).expect("parsed");
        assert_eq!(insight.summary, "An invoice for services.");
        assert_eq!(insight.classification, "Invoice");
    }

    #[test]
    fn keeps_labels_outside_the_taxonomy_and_blanks_become_unclassified() {
        let other = parse_reply(r#"{"summary": "s", "classification": "Recipe"}"#).expect("parsed");
        assert_eq!(other.classification, "Recipe");

        let blank = parse_reply(r#"{"summary": "s", "classification": "  "}"#).expect("parsed");
        assert_eq!(blank.classification, UNCLASSIFIED);
    }

    #[test]
    fn malformed_replies_are_errors() {
        for reply in [
            "Sure! Here is the summary: it is an invoice.",
            "```json\n{\"summary\": \"cut off",
            r#"{"summary": "no label"}"#,
            r#"{"summary": 1, "classification": "Invoice"}"#,
            "",
        ] {
            assert!(parse_reply(reply).is_err(), "accepted {reply:?}");
        }
    }
}
