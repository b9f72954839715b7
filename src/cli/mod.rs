// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction. Parses arguments with
// clap, builds the session, and hands the console to it.
// All business logic is delegated to Layer 2 (application).
//
// Two commands are supported:
//   1. `chat` — interactive question loop (default)
//   2. `ask`  — answer one question and exit
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

pub mod console;

use anyhow::Result;
use clap::Parser;
use std::io::{self, IsTerminal};

use crate::application::{
    ask_use_case::AskUseCase,
    session::{LineReader, Session, SessionConfig},
};
use crate::ml::inferencer::{EngineConfig, Inferencer};
use commands::{AskArgs, Commands, SharedArgs};
use console::ReadlineInput;

#[derive(Parser, Debug)]
#[command(
    name = "corpus-qa",
    version,
    about = "Ask questions about a text file using a pretrained extractive Q&A model."
)]
pub struct Cli {
    #[command(flatten)]
    pub shared: SharedArgs,

    /// What to do (defaults to `chat`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command.clone().unwrap_or(Commands::Chat) {
            Commands::Chat      => self.run_chat(),
            Commands::Ask(args) => self.run_ask(args),
        }
    }

    fn start_session(&self) -> Result<Session<Inferencer>> {
        let session_cfg = SessionConfig::from(&self.shared);
        let engine_cfg  = EngineConfig::from(&self.shared);
        tracing::debug!("Session config: {:?}", session_cfg);

        Session::startup(session_cfg, || Inferencer::load(engine_cfg), &mut io::stdout())
    }

    /// Interactive loop. Line editing when attached to a terminal,
    /// plain line reads when stdin is piped.
    fn run_chat(&self) -> Result<()> {
        let session = self.start_session()?;
        let mut out = io::stdout();

        if io::stdin().is_terminal() {
            let mut input = ReadlineInput::new()?;
            session.run(&mut input, &mut out)
        } else {
            let mut input = LineReader::new(io::stdin().lock(), io::stdout());
            session.run(&mut input, &mut out)
        }
    }

    fn run_ask(&self, args: AskArgs) -> Result<()> {
        let session = self.start_session()?;
        AskUseCase::new(session).run(&args.question, &mut io::stdout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["corpus-qa"]).unwrap();
        assert_eq!(cli.command, None);
        assert_eq!(cli.shared.data_file, PathBuf::from("data.txt"));
        assert_eq!(cli.shared.cache_file, PathBuf::from("vectorized_data.pkl"));
        assert_eq!(cli.shared.threshold, 0.30);
        assert!(!cli.shared.verify_cache);
        assert_eq!((cli.shared.max_seq_len, cli.shared.doc_stride, cli.shared.max_answer_len), (384, 128, 15));
    }

    #[test]
    fn test_ask_with_global_options() {
        let cli = Cli::try_parse_from([
            "corpus-qa", "ask", "--question", "What color is the sky?",
            "--data-file", "notes.txt", "--threshold", "0.5", "--verify-cache",
        ])
        .unwrap();

        assert_eq!(
            cli.command,
            Some(Commands::Ask(AskArgs { question: "What color is the sky?".to_string() }))
        );
        let cfg = SessionConfig::from(&cli.shared);
        assert_eq!(cfg.data_file, PathBuf::from("notes.txt"));
        assert_eq!(cfg.threshold, 0.5);
        assert!(cfg.verify_cache);
    }

    #[test]
    fn test_engine_config_conversion() {
        let cli = Cli::try_parse_from(["corpus-qa", "--model", "org/other-squad", "--doc-stride", "64"]).unwrap();
        let cfg = EngineConfig::from(&cli.shared);
        assert_eq!(cfg.model_id, "org/other-squad");
        assert_eq!(cfg.doc_stride, 64);
    }

    #[test]
    fn test_ask_requires_question() {
        assert!(Cli::try_parse_from(["corpus-qa", "ask"]).is_err());
    }
}
