//! Typed line cursor over manifest text.
//!
//! Every read names what it expects so errors carry both the line number and
//! a description of the missing or malformed field.

use segstream_common::{Error, Result};

use crate::Segment;

/// Cursor over the trimmed lines of a document.
///
/// Blank lines at the start and end of the document are dropped; blank lines
/// in the middle are kept so they fail where a value is required.
#[derive(Debug, Clone)]
pub struct LineCursor<'a> {
    /// `(1-based line number, trimmed text)`
    lines: Vec<(usize, &'a str)>,
    pos: usize,
    /// Line number reported when the document ends early.
    eof_line: usize,
}

impl<'a> LineCursor<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut lines: Vec<(usize, &str)> = text
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim()))
            .skip_while(|(_, line)| line.is_empty())
            .collect();

        while lines.last().is_some_and(|(_, line)| line.is_empty()) {
            lines.pop();
        }

        let eof_line = lines.last().map(|(n, _)| n + 1).unwrap_or(1);

        Self {
            lines,
            pos: 0,
            eof_line,
        }
    }

    /// Line number of the next unread line, or one past the end.
    pub fn line(&self) -> usize {
        self.lines
            .get(self.pos)
            .map(|(n, _)| *n)
            .unwrap_or(self.eof_line)
    }

    /// Number of lines not yet consumed.
    pub fn remaining(&self) -> usize {
        self.lines.len() - self.pos
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Consume one line and return its trimmed text.
    pub fn next_line(&mut self, what: &str) -> Result<&'a str> {
        match self.lines.get(self.pos) {
            Some(&(_, text)) => {
                self.pos += 1;
                Ok(text)
            }
            None => Err(Error::manifest_format(
                self.eof_line,
                format!("missing {what}"),
            )),
        }
    }

    /// Consume one line without looking at it.
    pub fn skip(&mut self, what: &str) -> Result<()> {
        self.next_line(what).map(|_| ())
    }

    /// Consume one line holding a non-negative integer.
    pub fn next_count(&mut self, what: &str) -> Result<usize> {
        let line = self.line();
        let text = self.next_line(what)?;
        text.parse::<usize>().map_err(|_| {
            Error::manifest_format(
                line,
                format!("expected a non-negative integer for {what}, found {text:?}"),
            )
        })
    }

    /// Consume one `<offset> <size>` line.
    pub fn next_segment(&mut self) -> Result<Segment> {
        let line = self.line();
        let text = self.next_line("segment line")?;

        let tokens: Vec<&str> = text.split_whitespace().collect();
        let [offset, size] = tokens.as_slice() else {
            return Err(Error::manifest_format(
                line,
                format!(
                    "expected \"<offset> <size>\", found {} tokens in {text:?}",
                    tokens.len()
                ),
            ));
        };

        let parse = |token: &str, field: &str| {
            token.parse::<u64>().map_err(|_| {
                Error::manifest_format(
                    line,
                    format!("expected a non-negative integer for segment {field}, found {token:?}"),
                )
            })
        };
        let offset = parse(*offset, "offset")?;
        let size = parse(*size, "size")?;

        if size == 0 {
            return Err(Error::manifest_format(line, "segment size must be positive"));
        }
        if offset.checked_add(size).is_none() {
            return Err(Error::manifest_format(line, "segment range overflows"));
        }

        Ok(Segment::new(offset, size))
    }
}
