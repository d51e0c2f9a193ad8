//! Overwrite confirmation.
//!
//! The engine asks at most one yes/no question per run, and only when an
//! interactive caller is about to replace an existing grant.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// Source of yes/no answers.
pub trait Confirm {
    /// Ask `question` and block until answered.
    fn confirm(&mut self, question: &str) -> io::Result<bool>;
}

/// `y` or `yes`, any case, surrounding whitespace ignored.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Asks on a writer and reads the answer line from a reader.
pub struct TerminalConfirm<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TerminalConfirm<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl TerminalConfirm<io::StdinLock<'static>, io::Stderr> {
    /// Prompt on stderr, answer on stdin.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> Confirm for TerminalConfirm<R, W> {
    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        write!(self.output, "{question} [y/N]: ")?;
        self.output.flush()?;

        let mut line = String::new();
        // EOF reads as an empty answer, which declines.
        self.input.read_line(&mut line)?;
        Ok(is_affirmative(&line))
    }
}

/// Replays canned answers and records every question asked.
#[derive(Debug, Default)]
pub struct ScriptedConfirm {
    answers: VecDeque<String>,
    asked: Vec<String>,
}

impl ScriptedConfirm {
    pub fn new<I, A>(answers: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    /// A script with no answers; any question fails the run.
    pub fn never() -> Self {
        Self::default()
    }

    pub fn asked(&self) -> &[String] {
        &self.asked
    }
}

impl Confirm for ScriptedConfirm {
    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        self.asked.push(question.to_string());
        let answer = self.answers.pop_front().ok_or_else(|| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "no scripted answer left")
        })?;
        Ok(is_affirmative(&answer))
    }
}
