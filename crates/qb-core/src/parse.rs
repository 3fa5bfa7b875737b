//! Answer parser
//!
//! Normalizes free-text provider replies into a constrained [`Answer`].
//! Parsing never fails hard: replies that contain no recognizable label
//! resolve to `Confidence::Unparseable`, and the caller must not substitute
//! a default label in that case.

use tracing::debug;

use crate::question::Answer;

/// Parse a raw provider reply against an allowed label alphabet.
///
/// Labels are matched as standalone tokens only: a candidate must not be
/// preceded or followed by an ASCII alphanumeric character, so "B" matches
/// in "答案是B，解析：略" or "B. 错误" but not inside "BASIC". Separators
/// such as `.`, `)`, `:` and any CJK punctuation count as boundaries.
///
/// When several allowed labels appear in the text, the one listed first in
/// `allowed_labels` wins, regardless of text position. For the binary
/// true/false alphabet this keeps the original prefer-A bias; multi-option
/// callers pass the question's own label order.
pub fn parse<S: AsRef<str>>(raw_text: &str, allowed_labels: &[S]) -> Answer {
    let raw_text = raw_text.trim();
    if raw_text.is_empty() {
        debug!("Provider reply is empty, answer unparseable");
        return Answer::unparseable();
    }

    for label in allowed_labels {
        let label = label.as_ref();
        if label.is_empty() {
            continue;
        }
        if contains_standalone(raw_text, label) {
            debug!(label, "Recognized label in provider reply");
            return Answer::resolved(label);
        }
    }

    debug!(reply = raw_text, "No allowed label found in provider reply");
    Answer::unparseable()
}

/// True when `label` occurs in `text` as a standalone token.
fn contains_standalone(text: &str, label: &str) -> bool {
    let mut search_from = 0;
    while let Some(pos) = text[search_from..].find(label) {
        let start = search_from + pos;
        let end = start + label.len();

        let before_ok = text[..start]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_ascii_alphanumeric());
        let after_ok = text[end..]
            .chars()
            .next()
            .is_none_or(|c| !c.is_ascii_alphanumeric());

        if before_ok && after_ok {
            return true;
        }

        search_from = end;
    }
    false
}
