//! qb-core: quizbench core library
//!
//! The question-extraction and answer-resolution pipeline: page snapshot →
//! normalized question → pluggable answer provider → parsed answer,
//! orchestrated by a human-checkpointed session loop. Browser lifecycle
//! and persisted output live behind small collaborator traits.

pub mod config;
pub mod error;
pub mod extract;
pub mod llm;
pub mod parse;
pub mod question;
pub mod session;

pub use config::{Config, LlmConfig, LlmProvider, OutputConfig, SessionConfig};
pub use error::{Error, Result};
pub use extract::{
    BinaryKeywordDetector, LetterPrefixDetector, OptionDetector, PageSnapshot, QuestionExtractor,
};
pub use llm::{AnswerProvider, ChatClient};
pub use question::{Answer, Confidence, Question, QuestionOption};
pub use session::{Checkpoint, CycleReporter, Session, SessionRunner, SessionSettings};
