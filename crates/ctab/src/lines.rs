// Standard Library Imports
use std::io;

// Local Crate Imports
use crate::errors::{CtabError, CtabErrorKind, Result};

/// Hands out input lines one at a time while keeping track of the (1-based) number of the last line read
#[derive(Debug)]
pub struct LineReader<I> {
    lines: I,
    line_number: usize,
}

impl<I: Iterator<Item = io::Result<String>>> LineReader<I> {
    pub const fn new(lines: I) -> Self {
        Self::starting_after(lines, 0)
    }

    /// For input that doesn't start at the beginning of a file: the first line read will be `line_number + 1`
    pub const fn starting_after(lines: I, line_number: usize) -> Self {
        Self { lines, line_number }
    }

    /// The next line, or `None` at the end of the input
    pub fn next_line(&mut self) -> Result<Option<String>> {
        match self.lines.next() {
            None => Ok(None),
            Some(Ok(line)) => {
                self.line_number += 1;
                Ok(Some(line))
            }
            Some(Err(error)) => Err(Box::new(CtabError::io(self.line_number + 1, &error))),
        }
    }

    /// The next line, treating the end of the input as an error
    pub fn expect_line(&mut self, expected: &'static str) -> Result<String> {
        self.next_line()?.ok_or_else(|| {
            let kind = CtabErrorKind::PrematureEnd { expected };
            Box::new(CtabError::new(self.line_number + 1, "", kind))
        })
    }

    pub const fn line_number(&self) -> usize {
        self.line_number
    }

    pub fn error(&self, line: &str, kind: CtabErrorKind) -> CtabError {
        CtabError::new(self.line_number, line, kind)
    }
}

/// Lines from an in-memory string, in the form a `LineReader` expects
pub fn str_lines(text: &str) -> impl Iterator<Item = io::Result<String>> + '_ {
    text.lines().map(|line| Ok(line.to_owned()))
}

// Module Tests ========================================================================================================
