//! Line-based interactive decision source.
//!
//! Shows each duplicate pair with numbered paths and reads one answer line:
//! `1` deletes the first file, `2` deletes the second, anything else (or end
//! of input) skips the pair.

use std::io::{self, BufRead, Stderr, StdinLock, Write};

use bytesize::ByteSize;

use super::resolve::{Decision, DecisionSource};
use crate::duplicates::DuplicatePair;

/// Asks the user about each pair over a reader/writer pair.
#[derive(Debug)]
pub struct PromptDecisionSource<R, W> {
    input: R,
    output: W,
    exhausted: bool,
}

impl PromptDecisionSource<StdinLock<'static>, Stderr> {
    /// Prompt on stderr, read answers from stdin.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> PromptDecisionSource<R, W> {
    /// Create a prompt over arbitrary streams.
    #[must_use]
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            exhausted: false,
        }
    }

    fn write_prompt(&mut self, pair: &DuplicatePair) -> io::Result<()> {
        writeln!(self.output)?;
        writeln!(
            self.output,
            "Duplicate files ({} each):",
            ByteSize::b(pair.size)
        )?;
        writeln!(self.output, "  [1] {}", pair.first.display())?;
        writeln!(self.output, "  [2] {}", pair.second.display())?;
        write!(self.output, "Delete which file? [1/2, Enter to skip]: ")?;
        self.output.flush()
    }

    /// Map an answer line to a decision.
    fn parse_answer(answer: &str) -> Decision {
        match answer.trim() {
            "1" => Decision::KeepSecond,
            "2" => Decision::KeepFirst,
            _ => Decision::Skip,
        }
    }

    /// Consume the source, returning the underlying streams.
    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }
}

impl<R: BufRead, W: Write> DecisionSource for PromptDecisionSource<R, W> {
    fn decide(&mut self, pair: &DuplicatePair) -> Decision {
        if self.exhausted {
            return Decision::Skip;
        }

        if let Err(e) = self.write_prompt(pair) {
            log::warn!("Failed to write prompt: {}", e);
            return Decision::Skip;
        }

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => {
                log::debug!("End of input, skipping remaining pairs");
                self.exhausted = true;
                Decision::Skip
            }
            Ok(_) => Self::parse_answer(&line),
            Err(e) => {
                log::warn!("Failed to read answer: {}", e);
                self.exhausted = true;
                Decision::Skip
            }
        }
    }
}
