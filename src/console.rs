//! Operator console used by the resolver and the confirmation gate.
//!
//! Interactive reads go through the [`Console`] trait instead of touching
//! stdin directly, so automation and tests can supply canned answers
//! ([`ScriptedConsole`]) or refuse interaction outright
//! ([`ScriptedConsole::headless`]).
//!
//! Everything a console prints goes to stderr. Stdout is reserved for the
//! tool's actual output so `--json` stays parseable.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// A line-oriented operator channel.
pub trait Console {
    /// Shows one line of narration to the operator.
    fn say(&mut self, line: &str);

    /// Shows `prompt` and reads one line.
    ///
    /// Returns `Ok(None)` at end of input (closed stdin, exhausted script).
    /// The returned line has its trailing newline removed but is otherwise
    /// untouched.
    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>>;
}

/// Console bound to the process's stdin and stderr.
#[derive(Debug, Default)]
pub struct TerminalConsole;

impl TerminalConsole {
    pub fn new() -> Self {
        TerminalConsole
    }
}

impl Console for TerminalConsole {
    fn say(&mut self, line: &str) {
        eprintln!("{line}");
    }

    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        let mut stderr = io::stderr().lock();
        write!(stderr, "{prompt}")?;
        stderr.flush()?;

        let mut input = String::new();
        let read = io::stdin().lock().read_line(&mut input)?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(input.trim_end_matches(['\r', '\n']).to_string()))
    }
}

/// Console fed from a fixed list of answers. Records everything shown so
/// callers can assert on it.
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    answers: VecDeque<String>,
    transcript: Vec<String>,
    prompts: usize,
}

impl ScriptedConsole {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedConsole {
            answers: answers.into_iter().map(Into::into).collect(),
            transcript: Vec::new(),
            prompts: 0,
        }
    }

    /// A console with no answers: every prompt sees end of input.
    pub fn headless() -> Self {
        Self::default()
    }

    /// Number of times `ask` was called.
    pub fn prompts(&self) -> usize {
        self.prompts
    }

    /// Every line and prompt shown so far, in order.
    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    /// Whether any shown line contains `needle`.
    pub fn saw(&self, needle: &str) -> bool {
        self.transcript.iter().any(|line| line.contains(needle))
    }
}

impl Console for ScriptedConsole {
    fn say(&mut self, line: &str) {
        self.transcript.push(line.to_string());
    }

    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.prompts += 1;
        self.transcript.push(prompt.to_string());
        Ok(self.answers.pop_front())
    }
}
