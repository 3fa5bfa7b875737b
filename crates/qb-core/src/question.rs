//! Question and answer value objects
//!
//! One `Question` is produced per extraction cycle and discarded once its
//! `Answer` has been reported. Neither type is shared across cycles.

use serde::{Deserialize, Serialize};

/// A single candidate option extracted from the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    /// Option label from the fixed alphabet ("A", "B", ...)
    pub label: String,
    /// Full option text as rendered on the page
    pub text: String,
}

impl QuestionOption {
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }
}

/// Normalized record of one exam item
///
/// `raw_text` is the whitespace-normalized page text; `options` are the
/// detected candidate options in document order, labels unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub raw_text: String,
    pub options: Vec<QuestionOption>,
}

impl Question {
    pub fn new(raw_text: impl Into<String>, options: Vec<QuestionOption>) -> Self {
        Self {
            raw_text: raw_text.into(),
            options,
        }
    }

    /// Labels of the extracted options, in document order
    pub fn labels(&self) -> Vec<String> {
        self.options.iter().map(|o| o.label.clone()).collect()
    }

    /// True when no option elements were detected (binary/open-form page)
    pub fn has_options(&self) -> bool {
        !self.options.is_empty()
    }

    /// Short preview of the question text for terminal output
    pub fn preview(&self, max_chars: usize) -> &str {
        match self.raw_text.char_indices().nth(max_chars) {
            Some((idx, _)) => &self.raw_text[..idx],
            None => &self.raw_text,
        }
    }
}

/// How confident the pipeline is in a resolved answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    /// A label from the allowed alphabet was found in the provider reply
    Resolved,
    /// The provider replied but no allowed label could be recognized
    Unparseable,
    /// The provider call itself failed; no reply was received
    ProviderFailed,
}

/// Parsed outcome of one answer cycle
///
/// A resolved answer always carries a label from the originating question's
/// options (or from the default alphabet when no options were extracted).
/// Failed cycles never get a fabricated label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub label: Option<String>,
    pub confidence: Confidence,
}

impl Answer {
    pub fn resolved(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            confidence: Confidence::Resolved,
        }
    }

    pub fn unparseable() -> Self {
        Self {
            label: None,
            confidence: Confidence::Unparseable,
        }
    }

    pub fn provider_failed() -> Self {
        Self {
            label: None,
            confidence: Confidence::ProviderFailed,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.confidence == Confidence::Resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_labels() {
        let q = Question::new(
            "下列哪项正确？",
            vec![
                QuestionOption::new("A", "A. 正确"),
                QuestionOption::new("B", "B. 错误"),
            ],
        );
        assert_eq!(q.labels(), vec!["A", "B"]);
        assert!(q.has_options());
    }

    #[test]
    fn test_question_without_options() {
        let q = Question::new("判断题", vec![]);
        assert!(!q.has_options());
        assert!(q.labels().is_empty());
    }

    #[test]
    fn test_preview_respects_char_boundaries() {
        let q = Question::new("答案是正确的", vec![]);
        // Must not panic on multi-byte boundaries
        assert_eq!(q.preview(3), "答案是");
        assert_eq!(q.preview(100), "答案是正确的");
    }

    #[test]
    fn test_answer_constructors() {
        assert!(Answer::resolved("A").is_resolved());
        assert_eq!(Answer::resolved("A").label.as_deref(), Some("A"));

        let failed = Answer::provider_failed();
        assert_eq!(failed.confidence, Confidence::ProviderFailed);
        assert!(failed.label.is_none());

        let unparsed = Answer::unparseable();
        assert_eq!(unparsed.confidence, Confidence::Unparseable);
        assert!(unparsed.label.is_none());
    }
}
