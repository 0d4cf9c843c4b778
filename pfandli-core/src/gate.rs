//! Interpreting the classification oracle's free-form answer.

use serde::{Deserialize, Serialize};

/// Fixed instruction sent with every classification request.
pub const CLASSIFY_PROMPT: &str = "Analyze this image for recyclable items, \
focusing on plastic bottles and containers. Please provide a clear analysis \
in the following format:

1. Item Identification: [Describe what you see]
2. Recycling Details:
   - Material Type: [Specify material and recycling code if visible]
   - Preparation Steps: [List steps like rinsing, removing caps, etc.]
   - Recycling Instructions: [Provide specific recycling guidance]
3. Environmental Impact: [Brief note on recycling benefits]

If no recyclable items are detected, simply state that fact.";

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Typed outcome of one classification, produced at the oracle boundary.
pub struct Classification {
    /// Whether the image shows a recyclable plastic container.
    pub recyclable: bool,
    /// The oracle's full answer, kept for rendering.
    pub rationale: String,
}

/// The recyclability predicate applied to oracle text.
///
/// Deliberately coarse: a case-insensitive substring match on "bottle" or
/// "plastic". Negated statements ("not a plastic bottle") still match; the
/// policy lives in this one function so it can be swapped without touching
/// rendering.
#[must_use]
pub fn is_recyclable_text(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("bottle") || lower.contains("plastic")
}

/// Convert raw oracle text into a [`Classification`].
#[must_use]
pub fn classify_text(text: String) -> Classification {
    Classification {
        recyclable: is_recyclable_text(&text),
        rationale: text,
    }
}

#[cfg(test)]
mod tests {
    use super::{classify_text, is_recyclable_text};

    #[test]
    fn positive_answers_pass_the_predicate() {
        assert!(is_recyclable_text(
            "1. Item: plastic bottle with a PET-1 code"
        ));
        assert!(is_recyclable_text("A clear glass BOTTLE on a table"));
    }

    #[test]
    fn negative_answer_fails_the_predicate() {
        assert!(!is_recyclable_text("No recyclable items found."));
        assert!(!is_recyclable_text(""));
    }

    #[test]
    fn classification_keeps_the_full_rationale() {
        let classification = classify_text(String::from("1. Item: plastic bottle..."));
        assert!(classification.recyclable, "predicate should hold");
        assert_eq!(classification.rationale, "1. Item: plastic bottle...");
    }
}
