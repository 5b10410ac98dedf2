// pegcst. Packrat parsing over token streams
// Copyright (c) 2024 The pegcst Developers
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

use std::fmt;

use serde::Serialize;

/// A point in the source text.
///
/// `index` is a byte offset, `line` is 1-based and `column` is a 0-based count of characters
/// since the start of the line.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct SourcePosition {
    pub index: usize,
    pub line: usize,
    pub column: usize,
}

impl SourcePosition {
    /// The position of the first character of any input.
    ///
    /// # Examples
    ///
    /// ```
    /// # use pegcst::SourcePosition;
    /// let start = SourcePosition::start();
    ///
    /// assert_eq!((start.index, start.line, start.column), (0, 1, 0));
    /// ```
    #[inline]
    pub fn start() -> SourcePosition {
        SourcePosition {
            index: 0,
            line: 1,
            column: 0,
        }
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A range of source text delimited by two `SourcePosition`s, `end` being exclusive.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
pub struct SourceLocation {
    pub start: SourcePosition,
    pub end: SourcePosition,
}

impl SourceLocation {
    #[inline]
    pub fn new(start: SourcePosition, end: SourcePosition) -> SourceLocation {
        SourceLocation { start, end }
    }

    /// Returns the smallest location covering both `self` and `other`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use pegcst::{SourceLocation, SourcePosition};
    /// let at = |index| SourcePosition { index, line: 1, column: index };
    /// let a = SourceLocation::new(at(0), at(1));
    /// let b = SourceLocation::new(at(4), at(5));
    ///
    /// assert_eq!(a.union(&b), SourceLocation::new(at(0), at(5)));
    /// ```
    #[inline]
    pub fn union(&self, other: &SourceLocation) -> SourceLocation {
        SourceLocation {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Length of the covered text in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.end.index - self.start.index
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Tracks line and column while text is consumed from the front of an input.
///
/// Recognized line terminators are `\r\n` (counted once), `\n`, `\r`, U+2028 and U+2029.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LineTracker {
    position: SourcePosition,
    // A `\r` ended the previously consumed text; a leading `\n` must not count again.
    pending_cr: bool,
}

impl LineTracker {
    pub fn new() -> LineTracker {
        LineTracker {
            position: SourcePosition::start(),
            pending_cr: false,
        }
    }

    #[inline]
    pub fn position(&self) -> SourcePosition {
        self.position
    }

    /// Moves past `text`, which must be the input immediately following the current position.
    ///
    /// # Examples
    ///
    /// ```
    /// # use pegcst::LineTracker;
    /// let mut tracker = LineTracker::new();
    /// tracker.advance("ab\r\ncd");
    ///
    /// let position = tracker.position();
    /// assert_eq!((position.index, position.line, position.column), (6, 2, 2));
    /// ```
    pub fn advance(&mut self, text: &str) {
        for c in text.chars() {
            match c {
                '\n' if self.pending_cr => {
                    self.pending_cr = false;
                }
                '\n' | '\u{2028}' | '\u{2029}' => {
                    self.position.line += 1;
                    self.position.column = 0;
                }
                '\r' => {
                    self.position.line += 1;
                    self.position.column = 0;
                    self.pending_cr = true;
                    continue;
                }
                _ => {
                    self.position.column += 1;
                }
            }
            self.pending_cr = false;
        }
        self.position.index += text.len();
    }
}

impl Default for LineTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns the full line of `input` containing byte offset `index`, without its terminator.
pub(crate) fn line_of(input: &str, index: usize) -> &str {
    let index = index.min(input.len());
    let is_break = |c: char| matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}');

    let start = input[..index]
        .char_indices()
        .rev()
        .find(|&(_, c)| is_break(c))
        .map_or(0, |(i, c)| i + c.len_utf8());
    let end = input[index..]
        .find(is_break)
        .map_or(input.len(), |offset| index + offset);

    &input[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracked(text: &str) -> SourcePosition {
        let mut tracker = LineTracker::new();
        tracker.advance(text);
        tracker.position()
    }

    #[test]
    fn columns_count_characters() {
        let position = tracked("héllo");
        assert_eq!(position.index, 6);
        assert_eq!(position.column, 5);
        assert_eq!(position.line, 1);
    }

    #[test]
    fn crlf_counts_once() {
        assert_eq!(tracked("a\r\nb").line, 2);
        assert_eq!(tracked("a\n\nb").line, 3);
        assert_eq!(tracked("a\r\rb").line, 3);
        assert_eq!(tracked("a\u{2028}b").line, 2);
    }

    #[test]
    fn crlf_split_across_advances() {
        let mut tracker = LineTracker::new();
        tracker.advance("a\r");
        tracker.advance("\nb");
        let position = tracker.position();
        assert_eq!((position.index, position.line, position.column), (4, 2, 1));
    }

    #[test]
    fn line_of_index() {
        let input = "ab\ncd\r\nef";
        assert_eq!(line_of(input, 0), "ab");
        assert_eq!(line_of(input, 4), "cd");
        assert_eq!(line_of(input, 7), "ef");
        assert_eq!(line_of(input, 9), "ef");
        assert_eq!(line_of("", 0), "");
    }
}
