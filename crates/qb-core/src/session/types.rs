//! Session types

use serde::{Deserialize, Serialize};

use crate::question::{Answer, Question};

/// One full run across an expected count of questions.
///
/// `completed` grows monotonically and is appended to only by the session
/// loop; it is not persisted beyond the process (the run-log collaborators
/// own any persisted output).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Expected number of questions in the run
    pub total_expected: usize,
    /// Question/answer pairs in completion order
    pub completed: Vec<(Question, Answer)>,
}

impl Session {
    pub fn new(total_expected: usize) -> Self {
        Self {
            total_expected,
            completed: Vec::new(),
        }
    }

    /// Record one completed cycle
    pub fn record(&mut self, question: Question, answer: Answer) {
        self.completed.push((question, answer));
    }

    /// Count of answered cycles (skipped cycles are not recorded)
    pub fn answered_count(&self) -> usize {
        self.completed.len()
    }

    /// Count of cycles that resolved to a concrete label
    pub fn resolved_count(&self) -> usize {
        self.completed.iter().filter(|(_, a)| a.is_resolved()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_counters() {
        let mut session = Session::new(3);
        session.record(Question::new("q1", vec![]), Answer::resolved("A"));
        session.record(Question::new("q2", vec![]), Answer::provider_failed());

        assert_eq!(session.total_expected, 3);
        assert_eq!(session.answered_count(), 2);
        assert_eq!(session.resolved_count(), 1);
    }
}
