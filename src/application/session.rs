// ============================================================
// Layer 2 — Interactive Session
// ============================================================
// Drives the question/answer loop:
//
//   Startup ──► Ready ──► AwaitingInput ⇄ Answering ──► Exit
//
// Startup, in order:
//   1. Initialise the QA engine        (fatal on failure)
//   2. Load or build the TF-IDF bundle
//        cache file exists → load it, skip preprocessing
//        otherwise         → load context, preprocess, save
//   3. Read the context fresh for answering
//
// The cache is trusted on existence alone: editing data.txt
// after the first run does NOT refit the vectorizer. Passing
// `verify_cache` compares the bundle's content digest with the
// current file and rebuilds on mismatch.
//
// The bundle is kept for the lifetime of the session but the
// engine always answers from the raw context string.
//
// Each input line produces a Turn value. Failures while
// answering are a Turn, never an Err, so the loop survives
// them; only I/O errors on the console end the session early.

use anyhow::Result;
use std::{
    io::{BufRead, Write},
    path::PathBuf,
};

use crate::data::{
    loader::TextFileLoader,
    preprocessor::{Preprocessor, RepresentationBundle},
};
use crate::domain::{
    context::Context,
    qa_result::QaResult,
    traits::{ContextSource, Persistable, QuestionAnswerer},
};
use crate::infra::cache::RepresentationCache;

pub const PROMPT: &str = "Enter your question: ";
pub const EXIT_COMMAND: &str = "exit";
pub const LOW_CONFIDENCE_REPLY: &str = "I'm not confident enough to answer that.";
pub const DEFAULT_THRESHOLD: f32 = 0.30;

// ─── Configuration ────────────────────────────────────────────────────────────
/// File locations and answer policy for one session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub data_file:    PathBuf,
    pub cache_file:   PathBuf,
    /// Answers scoring below this are withheld
    pub threshold:    f32,
    /// Rebuild the cache when it was fitted on different text
    pub verify_cache: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            data_file:    PathBuf::from("data.txt"),
            cache_file:   PathBuf::from("vectorized_data.pkl"),
            threshold:    DEFAULT_THRESHOLD,
            verify_cache: false,
        }
    }
}

// ─── Console input ────────────────────────────────────────────────────────────
/// Where questions come from. `Ok(None)` means end of input.
pub trait InputSource {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// Prompts on a writer and reads lines from any BufRead
/// (piped stdin, files, in-memory buffers in tests).
pub struct LineReader<R, W> {
    reader: R,
    prompt_out: W,
}

impl<R: BufRead, W: Write> LineReader<R, W> {
    pub fn new(reader: R, prompt_out: W) -> Self {
        Self { reader, prompt_out }
    }
}

impl<R: BufRead, W: Write> InputSource for LineReader<R, W> {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.prompt_out, "{prompt}")?;
        self.prompt_out.flush()?;

        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }
}

// ─── Turn ─────────────────────────────────────────────────────────────────────
/// Outcome of handling one input line.
#[derive(Debug, Clone, PartialEq)]
pub enum Turn {
    /// The user typed `exit` (any case)
    Exit,
    /// Score reached the threshold
    Answered { question: String, result: QaResult },
    /// Score below the threshold — answer withheld
    LowConfidence { question: String, result: QaResult },
    /// The engine failed on this question
    Failed { question: String, details: String },
}

impl Turn {
    /// Print this turn the way the console shows it
    pub fn render(&self, out: &mut impl Write) -> std::io::Result<()> {
        match self {
            Turn::Exit => writeln!(out, "Goodbye!"),
            Turn::Answered { question, result } => {
                writeln!(out, "\nQuestion: {question}")?;
                writeln!(out, "Answer: {}\n", result.answer)
            }
            Turn::LowConfidence { question, .. } => {
                writeln!(out, "\nQuestion: {question}")?;
                writeln!(out, "Answer: {LOW_CONFIDENCE_REPLY}\n")
            }
            Turn::Failed { details, .. } => {
                writeln!(out, "Error processing the question or context. Please try again.")?;
                writeln!(out, "Details: {details}\n")
            }
        }
    }
}

// ─── Session ──────────────────────────────────────────────────────────────────
pub struct Session<A> {
    config:   SessionConfig,
    answerer: A,
    bundle:   RepresentationBundle,
    context:  Context,
}

impl<A: QuestionAnswerer> Session<A> {
    /// Run the Startup state. `init_engine` is called first; its
    /// error aborts startup before any file is touched.
    pub fn startup(
        config:      SessionConfig,
        init_engine: impl FnOnce() -> Result<A>,
        out:         &mut impl Write,
    ) -> Result<Self> {
        writeln!(out, "Loading Question-Answering Pipeline...")?;
        let answerer = init_engine()?;

        let loader = TextFileLoader::new(&config.data_file);
        let cache  = RepresentationCache::new(&config.cache_file);
        let bundle = load_or_build_bundle(&config, &loader, &cache, out)?;

        // Always read the context fresh for answering.
        let context = loader.load()?;
        tracing::info!(
            "Session ready: {} bytes of context, {} vocabulary terms",
            context.text().len(),
            bundle.vectorizer.vocabulary().len()
        );

        Ok(Self { config, answerer, bundle, context })
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn bundle(&self) -> &RepresentationBundle {
        &self.bundle
    }

    pub fn answerer(&self) -> &A {
        &self.answerer
    }

    /// Handle one raw input line. Anything other than `exit`,
    /// blank lines included, goes to the engine.
    pub fn turn(&self, line: &str) -> Turn {
        if line.trim().eq_ignore_ascii_case(EXIT_COMMAND) {
            return Turn::Exit;
        }
        self.ask(line)
    }

    /// Send `question` (trimmed) to the engine and apply the threshold.
    /// Never yields `Turn::Exit`.
    pub fn ask(&self, question: &str) -> Turn {
        let question = question.trim().to_string();
        match self.answerer.answer(&question, self.context.text()) {
            Ok(result) if result.is_confident(self.config.threshold) => {
                Turn::Answered { question, result }
            }
            Ok(result) => {
                tracing::debug!("Withholding answer '{}' (score {:.4})", result.answer, result.score);
                Turn::LowConfidence { question, result }
            }
            Err(e) => {
                tracing::warn!("Question failed: {e:#}");
                Turn::Failed { question, details: format!("{e:#}") }
            }
        }
    }

    /// AwaitingInput ⇄ Answering until `exit` or end of input.
    pub fn run(&self, input: &mut impl InputSource, out: &mut impl Write) -> Result<()> {
        writeln!(out, "\nQuestion-Answering AI")?;
        writeln!(out, "Type '{EXIT_COMMAND}' to quit.\n")?;

        loop {
            let turn = match input.read_line(PROMPT)? {
                Some(line) => self.turn(&line),
                None       => Turn::Exit,
            };
            turn.render(out)?;
            out.flush()?;

            if turn == Turn::Exit {
                return Ok(());
            }
        }
    }
}

/// Cache hit → decode; cache miss → load, preprocess, save.
fn load_or_build_bundle(
    config: &SessionConfig,
    loader: &TextFileLoader,
    cache:  &RepresentationCache,
    out:    &mut impl Write,
) -> Result<RepresentationBundle> {
    if cache.exists() {
        writeln!(out, "Loading preprocessed data...")?;
        let bundle = cache.load()?;

        if !config.verify_cache {
            return Ok(bundle);
        }
        let current = loader.load()?;
        if bundle.matches(current.text()) {
            return Ok(bundle);
        }
        tracing::warn!(
            "'{}' changed since '{}' was built, rebuilding",
            loader.path().display(),
            cache.path().display()
        );
        writeln!(out, "Processing context data...")?;
        return rebuild(&current, cache);
    }

    writeln!(out, "Processing context data...")?;
    let context = loader.load()?;
    rebuild(&context, cache)
}

fn rebuild(context: &Context, cache: &RepresentationCache) -> Result<RepresentationBundle> {
    let bundle = Preprocessor::new().preprocess(context.text())?;
    cache.save(&bundle)?;
    tracing::info!("Cached representation to '{}'", cache.path().display());
    Ok(bundle)
}
