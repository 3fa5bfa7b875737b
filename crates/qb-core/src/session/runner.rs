//! Session loop
//!
//! Drives the extract → ask → parse → present cycle across an expected
//! number of questions. Each cycle starts at a human checkpoint: the
//! operator selects an answer and advances the host page manually, then
//! confirms, and only then does the next automated extraction run. That
//! pause is a deliberate synchronous barrier, not missing automation.
//!
//! Recovery policy: extraction failures skip the cycle (reported, counter
//! advances once), provider failures degrade the cycle to an explicit
//! no-answer result. Neither terminates the run.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::error::Result;
use crate::extract::{PageSnapshot, QuestionExtractor};
use crate::llm::AnswerProvider;
use crate::parse::parse;
use crate::question::{Answer, Question};

use super::types::Session;

/// Human confirmation checkpoint between cycles.
///
/// `wait` blocks until the operator confirms; the session loop suspends
/// indefinitely on it.
pub trait Checkpoint: Send {
    fn wait(&mut self, prompt: &str) -> std::io::Result<()>;
}

/// Receives the outcome of every cycle.
///
/// Implementations present results to the operator and/or persist them;
/// reporter failures are logged by the loop but never abort the run.
pub trait CycleReporter: Send {
    /// A cycle completed with a question and an answer (possibly a
    /// degraded no-answer result)
    fn answered(
        &mut self,
        index: usize,
        total: usize,
        question: &Question,
        answer: &Answer,
    ) -> Result<()>;

    /// Extraction failed; the cycle was skipped for manual handling
    fn skipped(&mut self, index: usize, total: usize, reason: &str) -> Result<()>;
}

/// Tunables for one session run
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Expected number of questions
    pub total_expected: usize,
    /// Fallback label alphabet for questions with no extracted options
    pub default_labels: Vec<String>,
    /// Page-settle delay after the human advances the page
    pub settle_delay: Duration,
}

impl From<&SessionConfig> for SessionSettings {
    fn from(config: &SessionConfig) -> Self {
        Self {
            total_expected: config.total_questions,
            default_labels: config.default_labels.clone(),
            settle_delay: Duration::from_secs(config.settle_delay_secs),
        }
    }
}

/// Orchestrates the per-question cycles of one session
pub struct SessionRunner<'a> {
    snapshot: &'a dyn PageSnapshot,
    extractor: QuestionExtractor,
    provider: &'a dyn AnswerProvider,
    checkpoint: &'a mut dyn Checkpoint,
    reporter: &'a mut dyn CycleReporter,
    settings: SessionSettings,
}

impl<'a> SessionRunner<'a> {
    pub fn new(
        snapshot: &'a dyn PageSnapshot,
        extractor: QuestionExtractor,
        provider: &'a dyn AnswerProvider,
        checkpoint: &'a mut dyn Checkpoint,
        reporter: &'a mut dyn CycleReporter,
        settings: SessionSettings,
    ) -> Self {
        Self {
            snapshot,
            extractor,
            provider,
            checkpoint,
            reporter,
            settings,
        }
    }

    /// Run the full session, one cycle per question index.
    ///
    /// Returns the completed session when the counter reaches the expected
    /// total. The only fatal errors are checkpoint I/O failures (stdin
    /// closed under the operator).
    pub async fn run(&mut self) -> Result<Session> {
        let total = self.settings.total_expected;
        let mut session = Session::new(total);

        info!(total, "Starting answer session");

        for index in 1..=total {
            let prompt = if index == 1 {
                format!("请按回车键开始识别第 {} 题...", index)
            } else {
                format!(
                    "请手动选择答案并点击下一题，完成后按回车键开始识别第 {} 题...",
                    index
                )
            };
            self.checkpoint.wait(&prompt)?;

            if !self.settings.settle_delay.is_zero() {
                tokio::time::sleep(self.settings.settle_delay).await;
            }

            let question = match self.extractor.extract(self.snapshot) {
                Ok(question) => question,
                Err(e) => {
                    warn!(index, error = %e, "Extraction failed, skipping question");
                    if let Err(report_err) = self.reporter.skipped(index, total, &e.to_string()) {
                        warn!(index, error = %report_err, "Failed to report skipped cycle");
                    }
                    continue;
                }
            };

            debug!(index, "Submitting question to answer provider");
            let answer = match self.provider.ask(&question.raw_text).await {
                Ok(raw) => {
                    let labels = if question.has_options() {
                        question.labels()
                    } else {
                        self.settings.default_labels.clone()
                    };
                    parse(&raw, &labels)
                }
                Err(e) => {
                    warn!(index, error = %e, "Answer provider failed, no answer for this cycle");
                    Answer::provider_failed()
                }
            };

            if let Err(e) = self.reporter.answered(index, total, &question, &answer) {
                warn!(index, error = %e, "Failed to report cycle result");
            }
            session.record(question, answer);
        }

        info!(
            total,
            answered = session.answered_count(),
            resolved = session.resolved_count(),
            "Session complete"
        );

        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::question::Confidence;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Page content for one cycle; `None` simulates an unreadable snapshot
    type PageData = Option<(String, Vec<String>)>;

    struct FakePage {
        pages: Vec<PageData>,
        cursor: AtomicUsize,
    }

    impl FakePage {
        fn new(pages: Vec<PageData>) -> Self {
            Self {
                pages,
                cursor: AtomicUsize::new(0),
            }
        }

        fn binary_page() -> PageData {
            Some((
                "<body>第1题：太阳从东边升起。</body>".to_string(),
                vec!["A 正确".to_string(), "B 错误".to_string()],
            ))
        }

        fn page(&self, index: usize) -> &PageData {
            self.pages.get(index).unwrap_or_else(|| {
                self.pages.last().expect("FakePage needs at least one page")
            })
        }
    }

    impl PageSnapshot for FakePage {
        fn render_html(&self) -> Result<String> {
            let index = self.cursor.fetch_add(1, Ordering::SeqCst);
            match self.page(index) {
                Some((html, _)) => Ok(html.clone()),
                None => Err(Error::Extraction("page unreadable".to_string())),
            }
        }

        fn element_texts(&self) -> Result<Vec<String>> {
            // render_html has already advanced the cursor for this cycle
            let index = self.cursor.load(Ordering::SeqCst).saturating_sub(1);
            match self.page(index) {
                Some((_, elements)) => Ok(elements.clone()),
                None => Err(Error::Extraction("page unreadable".to_string())),
            }
        }
    }

    struct FakeProvider {
        replies: Mutex<VecDeque<Result<String>>>,
    }

    impl FakeProvider {
        fn new(replies: Vec<Result<String>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
            }
        }
    }

    #[async_trait::async_trait]
    impl AnswerProvider for FakeProvider {
        async fn ask(&self, _question_text: &str) -> Result<String> {
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok("A".to_string()))
        }
    }

    #[derive(Default)]
    struct CountingCheckpoint {
        prompts: Vec<String>,
    }

    impl Checkpoint for CountingCheckpoint {
        fn wait(&mut self, prompt: &str) -> std::io::Result<()> {
            self.prompts.push(prompt.to_string());
            Ok(())
        }
    }

    #[derive(Debug, PartialEq)]
    enum Event {
        Answered {
            index: usize,
            label: Option<String>,
            confidence: Confidence,
        },
        Skipped {
            index: usize,
        },
    }

    #[derive(Default)]
    struct RecordingReporter {
        events: Vec<Event>,
    }

    impl CycleReporter for RecordingReporter {
        fn answered(
            &mut self,
            index: usize,
            _total: usize,
            _question: &Question,
            answer: &Answer,
        ) -> Result<()> {
            self.events.push(Event::Answered {
                index,
                label: answer.label.clone(),
                confidence: answer.confidence,
            });
            Ok(())
        }

        fn skipped(&mut self, index: usize, _total: usize, _reason: &str) -> Result<()> {
            self.events.push(Event::Skipped { index });
            Ok(())
        }
    }

    fn settings(total: usize) -> SessionSettings {
        SessionSettings {
            total_expected: total,
            default_labels: vec!["A".to_string(), "B".to_string()],
            settle_delay: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn test_full_run_resolves_answers() {
        let page = FakePage::new(vec![FakePage::binary_page()]);
        let provider = FakeProvider::new(vec![
            Ok("答案是B，解析：略".to_string()),
            Ok("A.".to_string()),
        ]);
        let mut checkpoint = CountingCheckpoint::default();
        let mut reporter = RecordingReporter::default();

        let session = SessionRunner::new(
            &page,
            QuestionExtractor::binary(),
            &provider,
            &mut checkpoint,
            &mut reporter,
            settings(2),
        )
        .run()
        .await
        .unwrap();

        assert_eq!(session.answered_count(), 2);
        assert_eq!(session.resolved_count(), 2);
        assert_eq!(session.completed[0].1.label.as_deref(), Some("B"));
        assert_eq!(session.completed[1].1.label.as_deref(), Some("A"));

        // One checkpoint per question, first prompt differs from the rest
        assert_eq!(checkpoint.prompts.len(), 2);
        assert!(checkpoint.prompts[0].contains("第 1 题"));
        assert!(checkpoint.prompts[1].contains("下一题"));
    }

    #[tokio::test]
    async fn test_provider_failure_degrades_cycle_and_advances() {
        let page = FakePage::new(vec![FakePage::binary_page()]);
        let provider = FakeProvider::new(vec![
            Err(Error::Provider("timeout".to_string())),
            Ok("B".to_string()),
        ]);
        let mut checkpoint = CountingCheckpoint::default();
        let mut reporter = RecordingReporter::default();

        let session = SessionRunner::new(
            &page,
            QuestionExtractor::binary(),
            &provider,
            &mut checkpoint,
            &mut reporter,
            settings(2),
        )
        .run()
        .await
        .unwrap();

        // Both cycles completed; the failed one is an explicit no-answer
        assert_eq!(session.answered_count(), 2);
        assert_eq!(
            reporter.events[0],
            Event::Answered {
                index: 1,
                label: None,
                confidence: Confidence::ProviderFailed,
            }
        );
        assert_eq!(
            reporter.events[1],
            Event::Answered {
                index: 2,
                label: Some("B".to_string()),
                confidence: Confidence::Resolved,
            }
        );
    }

    #[tokio::test]
    async fn test_extraction_failure_skips_without_double_increment() {
        let page = FakePage::new(vec![None, FakePage::binary_page()]);
        let provider = FakeProvider::new(vec![Ok("A".to_string())]);
        let mut checkpoint = CountingCheckpoint::default();
        let mut reporter = RecordingReporter::default();

        let session = SessionRunner::new(
            &page,
            QuestionExtractor::binary(),
            &provider,
            &mut checkpoint,
            &mut reporter,
            settings(2),
        )
        .run()
        .await
        .unwrap();

        assert_eq!(reporter.events.len(), 2);
        assert_eq!(reporter.events[0], Event::Skipped { index: 1 });
        assert!(matches!(reporter.events[1], Event::Answered { index: 2, .. }));
        // Skipped cycles are not recorded as completed
        assert_eq!(session.answered_count(), 1);
        // But the checkpoint still ran once per index
        assert_eq!(checkpoint.prompts.len(), 2);
    }

    #[tokio::test]
    async fn test_zero_options_falls_back_to_default_alphabet() {
        let page = FakePage::new(vec![Some((
            "<body>开放判断题。</body>".to_string(),
            vec![],
        ))]);
        let provider = FakeProvider::new(vec![Ok("选B".to_string())]);
        let mut checkpoint = CountingCheckpoint::default();
        let mut reporter = RecordingReporter::default();

        let session = SessionRunner::new(
            &page,
            QuestionExtractor::binary(),
            &provider,
            &mut checkpoint,
            &mut reporter,
            settings(1),
        )
        .run()
        .await
        .unwrap();

        assert_eq!(session.completed[0].0.options.len(), 0);
        assert_eq!(session.completed[0].1.label.as_deref(), Some("B"));
    }

    #[tokio::test]
    async fn test_unparseable_reply_yields_no_label() {
        let page = FakePage::new(vec![FakePage::binary_page()]);
        let provider = FakeProvider::new(vec![Ok("无法判断".to_string())]);
        let mut checkpoint = CountingCheckpoint::default();
        let mut reporter = RecordingReporter::default();

        let session = SessionRunner::new(
            &page,
            QuestionExtractor::binary(),
            &provider,
            &mut checkpoint,
            &mut reporter,
            settings(1),
        )
        .run()
        .await
        .unwrap();

        let (_, answer) = &session.completed[0];
        assert_eq!(answer.confidence, Confidence::Unparseable);
        assert!(answer.label.is_none());
    }
}
