//! Question extraction
//!
//! Turns a rendered page snapshot into a normalized [`Question`]: strips
//! script/style content, collapses layout whitespace, and scans element
//! texts for option markers via a pluggable [`OptionDetector`] strategy.
//!
//! Extraction is a single best-effort pass. Retry and skip policy belongs
//! to the session loop; this module never fabricates a question.

use scraper::Html;
use tracing::debug;

use crate::error::{Error, Result};
use crate::question::{Question, QuestionOption};

/// Read-only view of a rendered browser page.
///
/// Implemented over a live tab by `qb-browser`; test code supplies
/// in-memory fakes. The core only reads through this interface and never
/// manages browser lifecycle.
pub trait PageSnapshot {
    /// Full rendered markup of the page
    fn render_html(&self) -> Result<String>;

    /// Visible text of every element, in document order
    fn element_texts(&self) -> Result<Vec<String>>;
}

/// Strategy for recognizing option markers in element text.
///
/// The keyword heuristics are inherently fragile and domain-specific, so
/// they live behind this trait: different languages or option alphabets
/// can be substituted without touching the session loop.
pub trait OptionDetector: Send + Sync {
    /// Return the option label if `text` looks like an option element
    fn detect(&self, text: &str) -> Option<String>;
}

/// Detector for binary true/false questions in the original portal's
/// Chinese framing: "A" followed by a correct/true keyword, "B" followed
/// by an incorrect/false keyword.
#[derive(Debug, Default)]
pub struct BinaryKeywordDetector;

impl OptionDetector for BinaryKeywordDetector {
    fn detect(&self, text: &str) -> Option<String> {
        let text = text.trim();
        if text.starts_with('A') && (text.contains("正确") || text.contains('对')) {
            Some("A".to_string())
        } else if text.starts_with('B') && (text.contains("错误") || text.contains('错')) {
            Some("B".to_string())
        } else {
            None
        }
    }
}

/// Detector for generic lettered options: an alphabet letter followed by a
/// separator, e.g. "A. 队列" or "C：栈".
#[derive(Debug)]
pub struct LetterPrefixDetector {
    alphabet: Vec<char>,
}

impl LetterPrefixDetector {
    const SEPARATORS: &'static [char] = &['.', ')', ':', '、', '．', '）', '：'];

    pub fn new(alphabet: impl IntoIterator<Item = char>) -> Self {
        Self {
            alphabet: alphabet.into_iter().collect(),
        }
    }

    /// Four-letter multiple choice (A-D)
    pub fn multiple_choice() -> Self {
        Self::new('A'..='D')
    }
}

impl OptionDetector for LetterPrefixDetector {
    fn detect(&self, text: &str) -> Option<String> {
        let text = text.trim();
        let mut chars = text.chars();
        let first = chars.next()?;
        if !self.alphabet.contains(&first) {
            return None;
        }
        let second = chars.next()?;
        if second.is_whitespace() || Self::SEPARATORS.contains(&second) {
            Some(first.to_string())
        } else {
            None
        }
    }
}

/// Extracts one normalized question per pass from a page snapshot
pub struct QuestionExtractor {
    detector: Box<dyn OptionDetector>,
}

impl QuestionExtractor {
    pub fn new(detector: Box<dyn OptionDetector>) -> Self {
        Self { detector }
    }

    /// Extractor for the binary true/false portal pages
    pub fn binary() -> Self {
        Self::new(Box::new(BinaryKeywordDetector))
    }

    /// Run one extraction pass over the snapshot.
    ///
    /// Zero detected options is a valid outcome (binary and open-form
    /// pages); an unreadable snapshot or an empty page is an error.
    pub fn extract(&self, snapshot: &dyn PageSnapshot) -> Result<Question> {
        let html = snapshot.render_html()?;
        let raw_text = clean_page_text(&html);

        if raw_text.is_empty() {
            return Err(Error::Extraction(
                "page yielded no text after normalization".to_string(),
            ));
        }

        let mut options: Vec<QuestionOption> = Vec::new();
        for text in snapshot.element_texts()? {
            let Some(label) = self.detector.detect(&text) else {
                continue;
            };
            // Document order wins: keep the first element per label
            if options.iter().any(|o| o.label == label) {
                continue;
            }
            options.push(QuestionOption::new(label, text.trim()));
        }

        debug!(
            text_len = raw_text.len(),
            option_count = options.len(),
            "Extracted question from page"
        );

        Ok(Question::new(raw_text, options))
    }
}

/// Strip script/style content from the markup and collapse all whitespace
/// runs (including multi-space layout separators) into single spaces.
pub fn clean_page_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let mut text = String::new();
    for node in document.root_element().descendants() {
        let Some(fragment) = node.value().as_text() else {
            continue;
        };
        let excluded = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .is_some_and(|el| matches!(el.name(), "script" | "style" | "noscript"))
        });
        if !excluded {
            text.push_str(fragment);
            text.push('\n');
        }
    }

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    /// In-memory snapshot for extractor tests
    struct FakeSnapshot {
        html: String,
        elements: Vec<String>,
        fail: bool,
    }

    impl FakeSnapshot {
        fn new(html: &str, elements: &[&str]) -> Self {
            Self {
                html: html.to_string(),
                elements: elements.iter().map(|s| s.to_string()).collect(),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                html: String::new(),
                elements: vec![],
                fail: true,
            }
        }
    }

    impl PageSnapshot for FakeSnapshot {
        fn render_html(&self) -> Result<String> {
            if self.fail {
                Err(Error::Extraction("snapshot unavailable".to_string()))
            } else {
                Ok(self.html.clone())
            }
        }

        fn element_texts(&self) -> Result<Vec<String>> {
            if self.fail {
                Err(Error::Extraction("snapshot unavailable".to_string()))
            } else {
                Ok(self.elements.clone())
            }
        }
    }

    #[test]
    fn test_clean_page_text_strips_script_and_style() {
        let html = r#"<html><head><style>body { color: red; }</style>
            <script>var x = 1;</script></head>
            <body><p>第1题</p><p>判断正误</p></body></html>"#;
        let text = clean_page_text(html);
        assert_eq!(text, "第1题 判断正误");
        assert!(!text.contains("color"));
        assert!(!text.contains("var x"));
    }

    #[test]
    fn test_clean_page_text_collapses_layout_whitespace() {
        let html = "<body><div>第 1  题   共148题</div>\n\n<div>  题目内容  </div></body>";
        assert_eq!(clean_page_text(html), "第 1 题 共148题 题目内容");
    }

    #[test]
    fn test_binary_detector() {
        let d = BinaryKeywordDetector;
        assert_eq!(d.detect("A 正确"), Some("A".to_string()));
        assert_eq!(d.detect("A. 对"), Some("A".to_string()));
        assert_eq!(d.detect("B 错误"), Some("B".to_string()));
        assert_eq!(d.detect("B. 错"), Some("B".to_string()));
        // Wrong keyword for the label
        assert_eq!(d.detect("A 错误"), None);
        assert_eq!(d.detect("C 正确"), None);
        assert_eq!(d.detect("正确"), None);
    }

    #[test]
    fn test_letter_prefix_detector() {
        let d = LetterPrefixDetector::multiple_choice();
        assert_eq!(d.detect("A. 队列"), Some("A".to_string()));
        assert_eq!(d.detect("C：栈"), Some("C".to_string()));
        assert_eq!(d.detect("D) 链表"), Some("D".to_string()));
        assert_eq!(d.detect("B 树"), Some("B".to_string()));
        // Letter embedded in a word is not an option marker
        assert_eq!(d.detect("Apple"), None);
        assert_eq!(d.detect("E. 超出字母表"), None);
    }

    #[test]
    fn test_extract_binary_question() {
        let snapshot = FakeSnapshot::new(
            "<body><div>第1题：太阳从东边升起。</div></body>",
            &["第1题：太阳从东边升起。", "A 正确", "B 错误"],
        );
        let question = QuestionExtractor::binary().extract(&snapshot).unwrap();

        assert_eq!(question.raw_text, "第1题：太阳从东边升起。");
        assert_eq!(question.labels(), vec!["A", "B"]);
        assert_eq!(question.options[0].text, "A 正确");
    }

    #[test]
    fn test_extract_dedupes_labels_in_document_order() {
        // Nested elements repeat the same marker text
        let snapshot = FakeSnapshot::new(
            "<body>题目</body>",
            &["A 正确", "A 正确", "B 错误", "B 错误信息重复"],
        );
        let question = QuestionExtractor::binary().extract(&snapshot).unwrap();

        assert_eq!(question.labels(), vec!["A", "B"]);
        assert_eq!(question.options[1].text, "B 错误");
    }

    #[test]
    fn test_extract_with_zero_options_is_valid() {
        let snapshot = FakeSnapshot::new("<body>开放题：请判断。</body>", &["无标记元素"]);
        let question = QuestionExtractor::binary().extract(&snapshot).unwrap();

        assert!(!question.has_options());
        assert_eq!(question.raw_text, "开放题：请判断。");
    }

    #[test]
    fn test_extract_empty_page_fails() {
        let snapshot = FakeSnapshot::new("<body><script>x()</script></body>", &[]);
        let err = QuestionExtractor::binary().extract(&snapshot).unwrap_err();
        assert!(matches!(err, Error::Extraction(_)));
    }

    #[test]
    fn test_extract_propagates_snapshot_failure() {
        let err = QuestionExtractor::binary()
            .extract(&FakeSnapshot::failing())
            .unwrap_err();
        assert!(matches!(err, Error::Extraction(_)));
    }
}
