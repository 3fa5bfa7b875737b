//! Operator-facing I/O: the stdin checkpoint, the per-cycle terminal
//! block, and the append-only run logs.
//!
//! The run logs are human-readable prose, not a machine format: one file
//! accumulates extracted question content, the other question/answer
//! pairs, mirroring what the operator sees in the terminal.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, Write};
use std::path::Path;

use chrono::Local;
use qb_core::{Answer, Confidence, Question};

const RULE: &str = "==================================================";

/// Blocking stdin checkpoint between question cycles.
///
/// The operator selects an answer and advances the host page manually;
/// pressing Enter confirms that the next question is on screen.
pub struct StdinCheckpoint;

impl qb_core::Checkpoint for StdinCheckpoint {
    fn wait(&mut self, prompt: &str) -> std::io::Result<()> {
        print!("{}", prompt);
        std::io::stdout().flush()?;

        let mut line = String::new();
        let read = std::io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "stdin closed while waiting for confirmation",
            ));
        }
        Ok(())
    }
}

/// Prints the visible per-cycle block and appends to the run logs
pub struct RunReporter {
    content_log: File,
    answers_log: File,
    preview_chars: usize,
}

impl RunReporter {
    pub fn new(
        content_path: &Path,
        answers_path: &Path,
        preview_chars: usize,
    ) -> qb_core::Result<Self> {
        let mut content_log = open_append(content_path)?;
        let mut answers_log = open_append(answers_path)?;

        let header = format!(
            "答题记录 {}\n{}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            RULE
        );
        content_log.write_all(header.as_bytes())?;
        answers_log.write_all(header.as_bytes())?;

        Ok(Self {
            content_log,
            answers_log,
            preview_chars,
        })
    }

    fn answer_display(answer: &Answer) -> String {
        match answer.confidence {
            Confidence::Resolved => answer
                .label
                .clone()
                .unwrap_or_else(|| "未获得答案".to_string()),
            Confidence::Unparseable => "未能从回复中识别答案".to_string(),
            Confidence::ProviderFailed => "解答失败，未获得答案".to_string(),
        }
    }
}

impl qb_core::CycleReporter for RunReporter {
    fn answered(
        &mut self,
        index: usize,
        total: usize,
        question: &Question,
        answer: &Answer,
    ) -> qb_core::Result<()> {
        let display = Self::answer_display(answer);

        println!();
        println!("{}", RULE);
        println!("第 {}/{} 题:", index, total);
        println!("{}", RULE);
        println!("题目: {}", question.preview(self.preview_chars));
        println!("答案: {}", display);
        println!("{}", RULE);
        println!();

        writeln!(
            self.content_log,
            "第 {} 题:\n{}\n",
            index, question.raw_text
        )?;
        writeln!(
            self.answers_log,
            "第 {} 题:\n题目: {}\n答案: {}\n",
            index,
            question.preview(self.preview_chars),
            display
        )?;
        Ok(())
    }

    fn skipped(&mut self, index: usize, total: usize, reason: &str) -> qb_core::Result<()> {
        println!();
        println!("{}", RULE);
        println!("第 {}/{} 题: 无法提取题目（{}），请手动处理此题", index, total, reason);
        println!("{}", RULE);
        println!();

        writeln!(
            self.answers_log,
            "第 {} 题:\n提取失败: {}\n",
            index, reason
        )?;
        Ok(())
    }
}

fn open_append(path: &Path) -> qb_core::Result<File> {
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}
