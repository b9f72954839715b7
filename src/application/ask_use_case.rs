// ============================================================
// Layer 2 — Ask Use Case
// ============================================================
// Answers a single question and returns, for scripting:
//   corpus-qa ask --question "What color is the sky?"
//
// Startup is identical to the interactive session (engine,
// cache, fresh context); only the loop is replaced by one turn.
// The text is always a question: `exit` is a loop command only.

use anyhow::{bail, Result};
use std::io::Write;

use crate::application::session::{Session, Turn};
use crate::domain::traits::QuestionAnswerer;

pub struct AskUseCase<A> {
    session: Session<A>,
}

impl<A: QuestionAnswerer> AskUseCase<A> {
    pub fn new(session: Session<A>) -> Self {
        Self { session }
    }

    /// Answer `question`, print the result, and hand back the turn.
    pub fn execute(&self, question: &str, out: &mut impl Write) -> Result<Turn> {
        let turn = self.session.ask(question);
        turn.render(out)?;
        Ok(turn)
    }

    /// Like `execute`, but a failed question becomes an error so the
    /// process exits non-zero.
    pub fn run(&self, question: &str, out: &mut impl Write) -> Result<()> {
        match self.execute(question, out)? {
            Turn::Failed { details, .. } => bail!("Question could not be answered: {details}"),
            turn => {
                tracing::debug!("Ask finished: {:?}", turn);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::session::SessionConfig;
    use crate::domain::{error::QaError, qa_result::QaResult};
    use std::fs;

    /// Answers "2015" with a fixed score; a negative score fails instead.
    struct Fixed(f32);

    impl QuestionAnswerer for Fixed {
        fn answer(&self, question: &str, _context: &str) -> Result<QaResult> {
            if self.0 < 0.0 {
                return Err(QaError::answer(format!("cannot answer '{question}'")).into());
            }
            Ok(QaResult::new("2015", self.0))
        }
    }

    fn use_case(score: f32) -> (tempfile::TempDir, AskUseCase<Fixed>) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("data.txt"), "Rust 1.0 was released in 2015.").unwrap();
        let config = SessionConfig {
            data_file:  dir.path().join("data.txt"),
            cache_file: dir.path().join("vectorized_data.pkl"),
            ..SessionConfig::default()
        };
        let session = Session::startup(config, || Ok(Fixed(score)), &mut std::io::sink()).unwrap();
        (dir, AskUseCase::new(session))
    }

    #[test]
    fn test_single_question_is_answered() {
        let (_dir, ask) = use_case(0.8);
        let mut out = Vec::new();
        let turn = ask.execute("When was Rust 1.0 released?", &mut out).unwrap();

        assert!(matches!(turn, Turn::Answered { .. }));
        assert!(String::from_utf8(out).unwrap().contains("Answer: 2015"));
    }

    #[test]
    fn test_low_confidence_is_reported() {
        let (_dir, ask) = use_case(0.1);
        let mut out = Vec::new();
        let turn = ask.execute("When was Rust 1.0 released?", &mut out).unwrap();

        assert!(matches!(turn, Turn::LowConfidence { .. }));
        assert!(!String::from_utf8(out).unwrap().contains("2015"));
    }

    #[test]
    fn test_exit_is_asked_as_a_question() {
        let (_dir, ask) = use_case(0.8);
        let mut out = Vec::new();
        let turn = ask.execute("exit", &mut out).unwrap();

        assert!(matches!(turn, Turn::Answered { ref question, .. } if question == "exit"));
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("Question: exit"));
        assert!(!out.contains("Goodbye!"));
    }

    #[test]
    fn test_failed_question_is_an_error() {
        let (_dir, ask) = use_case(-1.0);
        let mut out = Vec::new();
        let err = ask.run("When was Rust 1.0 released?", &mut out).unwrap_err();

        assert!(err.to_string().contains("cannot answer 'When was Rust 1.0 released?'"));
        assert!(String::from_utf8(out).unwrap().contains("Error processing the question or context"));
    }

    #[test]
    fn test_low_confidence_is_not_an_error() {
        let (_dir, ask) = use_case(0.1);
        assert!(ask.run("When was Rust 1.0 released?", &mut std::io::sink()).is_ok());
    }
}
