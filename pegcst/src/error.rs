// pegcst. Packrat parsing over token streams
// Copyright (c) 2024 The pegcst Developers
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

//! Types for different kinds of lexing and parsing failures.

use std::fmt;

use thiserror::Error;

use crate::position::{line_of, SourcePosition};
use crate::token::MatchedToken;

/// A grammar's lexicon could not be built.
#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("token definition `{name}` has an invalid pattern: {source}")]
    InvalidPattern {
        name: &'static str,
        #[source]
        source: regex::Error,
    },
}

/// The source text could not be split into tokens.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum LexError {
    /// No definition matches at `position`.
    #[error("no token matches {character:?} at {position}")]
    NoMatch {
        character: char,
        position: SourcePosition,
    },
    /// More than one keyword definition produced the longest match; the lexicon is ambiguous.
    #[error("keywords {} all match {text:?} at {position}", .names.join(", "))]
    AmbiguousKeywords {
        names: Vec<&'static str>,
        text: String,
        position: SourcePosition,
    },
}

impl LexError {
    pub fn position(&self) -> SourcePosition {
        match self {
            LexError::NoMatch { position, .. } | LexError::AmbiguousKeywords { position, .. } => {
                *position
            }
        }
    }
}

/// Something a rule was looking for when it failed.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Expected {
    /// A token of the named category.
    Token(&'static str),
    /// A token of the named category with exactly this text.
    Value {
        name: &'static str,
        value: &'static str,
    },
    /// No more tokens.
    EndOfInput,
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Token(name) => write!(f, "{}", name),
            Expected::Value { value, .. } => write!(f, "{:?}", value),
            Expected::EndOfInput => write!(f, "end of input"),
        }
    }
}

/// Different kinds of parsing errors.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum ErrorVariant {
    /// The token stream did not match the grammar.
    Mismatch {
        /// Everything that was tried at the farthest position reached.
        expected: Vec<Expected>,
        /// The token found there, `None` at end of input.
        found: Option<MatchedToken>,
    },
    /// Parsing made more calls than the configured limit allows.
    CallLimitReached { limit: usize },
}

impl ErrorVariant {
    /// Returns the error message of this variant.
    ///
    /// # Examples
    ///
    /// ```
    /// # use pegcst::{ErrorVariant, Expected};
    /// let variant = ErrorVariant::Mismatch {
    ///     expected: vec![Expected::Token("Literal"), Expected::Token("LParen")],
    ///     found: None,
    /// };
    ///
    /// assert_eq!(variant.message(), "expected Literal or LParen, found end of input");
    /// ```
    pub fn message(&self) -> String {
        match self {
            ErrorVariant::Mismatch { expected, found } => {
                let found = match found {
                    Some(token) => token.to_string(),
                    None => "end of input".to_owned(),
                };
                let expected: Vec<String> = expected.iter().map(ToString::to_string).collect();
                match expected.split_last() {
                    None => format!("unexpected {}", found),
                    Some((only, [])) => format!("expected {}, found {}", only, found),
                    Some((last, [first])) => {
                        format!("expected {} or {}, found {}", first, last, found)
                    }
                    Some((last, init)) => {
                        format!("expected {}, or {}, found {}", init.join(", "), last, found)
                    }
                }
            }
            ErrorVariant::CallLimitReached { limit } => {
                format!("call limit of {} reached", limit)
            }
        }
    }
}

/// A failed parse.
///
/// This is everything the engine knows about a failure; formatting beyond `Display` (suggestions,
/// colors, file names) belongs to the caller.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ParseError {
    pub variant: ErrorVariant,
    /// Start of the offending token, or the end of the last token at end of input.
    pub location: SourcePosition,
    /// Names of the rules that were active, outermost first.
    pub rule_stack: Vec<&'static str>,
    line: String,
}

impl ParseError {
    pub fn new(
        variant: ErrorVariant,
        location: SourcePosition,
        rule_stack: Vec<&'static str>,
    ) -> ParseError {
        ParseError {
            variant,
            location,
            rule_stack,
            line: String::new(),
        }
    }

    /// Attaches the source line containing the error so that `Display` can show it.
    pub fn with_source(mut self, source: &str) -> ParseError {
        self.line = line_of(source, self.location.index).to_owned();
        self
    }

    /// The source line attached by `with_source`, empty otherwise.
    pub fn line(&self) -> &str {
        &self.line
    }

    /// One-line description of the failure.
    pub fn message(&self) -> String {
        self.variant.message()
    }

    /// Expected categories, empty for non-mismatch failures.
    pub fn expected(&self) -> &[Expected] {
        match &self.variant {
            ErrorVariant::Mismatch { expected, .. } => expected,
            ErrorVariant::CallLimitReached { .. } => &[],
        }
    }

    /// The token the failure happened at; `None` at end of input or for non-mismatch failures.
    pub fn found(&self) -> Option<&MatchedToken> {
        match &self.variant {
            ErrorVariant::Mismatch { found, .. } => found.as_ref(),
            ErrorVariant::CallLimitReached { .. } => None,
        }
    }

    fn underline(&self) -> String {
        let mut underline = " ".repeat(self.location.column);

        match self.found() {
            Some(token) if token.row == token.end_row && token.value.chars().count() > 1 => {
                let width = token.value.chars().count();
                underline.push('^');
                underline.push_str(&"-".repeat(width - 2));
                underline.push('^');
            }
            _ => underline.push_str("^---"),
        }

        underline
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let line_number = self.location.line.to_string();
        let spacing = " ".repeat(line_number.len());

        writeln!(f, "{}--> {}:{}", spacing, self.location.line, self.location.column + 1)?;
        writeln!(f, "{} |", spacing)?;
        writeln!(f, "{} | {}", line_number, self.line)?;
        writeln!(f, "{} | {}", spacing, self.underline())?;
        writeln!(f, "{} |", spacing)?;
        write!(f, "{} = {}", spacing, self.message())?;

        if !self.rule_stack.is_empty() {
            write!(f, " (in {})", self.rule_stack.join(" > "))?;
        }

        Ok(())
    }
}

impl std::error::Error for ParseError {}

/// Any failure of a `lex + parse` run.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(name: &'static str, value: &str, index: usize, column: usize) -> MatchedToken {
        MatchedToken {
            name,
            value: value.to_owned(),
            start_index: index,
            end_index: index + value.len(),
            row: 2,
            end_row: 2,
            column_start: column,
            column_end: column + value.chars().count(),
            has_line_break_before: false,
        }
    }

    fn at(index: usize, line: usize, column: usize) -> SourcePosition {
        SourcePosition {
            index,
            line,
            column,
        }
    }

    #[test]
    fn display_mismatch() {
        let error = ParseError::new(
            ErrorVariant::Mismatch {
                expected: vec![
                    Expected::Token("Literal"),
                    Expected::Token("LParen"),
                    Expected::EndOfInput,
                ],
                found: Some(token("Star", "*", 8, 4)),
            },
            at(8, 2, 4),
            vec!["expression", "primary"],
        )
        .with_source("1 +\n1 + * 2\n");

        assert_eq!(
            format!("{}", error),
            vec![
                " --> 2:5",
                "  |",
                "2 | 1 + * 2",
                "  |     ^---",
                "  |",
                "  = expected Literal, LParen, or end of input, found Star \"*\" (in expression > primary)",
            ]
            .join("\n")
        );
    }

    #[test]
    fn display_wide_token() {
        let error = ParseError::new(
            ErrorVariant::Mismatch {
                expected: vec![Expected::Token("Identifier")],
                found: Some(token("Return", "return", 4, 0)),
            },
            at(4, 2, 0),
            vec![],
        )
        .with_source("x =\nreturn");

        assert_eq!(
            format!("{}", error),
            vec![
                " --> 2:1",
                "  |",
                "2 | return",
                "  | ^----^",
                "  |",
                "  = expected Identifier, found Return \"return\"",
            ]
            .join("\n")
        );
    }

    #[test]
    fn end_of_input_message() {
        let variant = ErrorVariant::Mismatch {
            expected: vec![Expected::Token("Literal")],
            found: None,
        };
        assert_eq!(variant.message(), "expected Literal, found end of input");
    }

    #[test]
    fn value_and_unexpected_messages() {
        let variant = ErrorVariant::Mismatch {
            expected: vec![Expected::Value {
                name: "Identifier",
                value: "of",
            }],
            found: Some(token("Identifier", "in", 0, 0)),
        };
        assert_eq!(variant.message(), "expected \"of\", found Identifier \"in\"");

        let variant = ErrorVariant::Mismatch {
            expected: vec![],
            found: Some(token("Identifier", "x", 0, 0)),
        };
        assert_eq!(variant.message(), "unexpected Identifier \"x\"");
    }

    #[test]
    fn expected_lists() {
        let message = |names: &[&'static str]| {
            let variant = ErrorVariant::Mismatch {
                expected: names.iter().map(|&name| Expected::Token(name)).collect(),
                found: None,
            };
            variant.message()
        };

        assert_eq!(message(&["Number"]), "expected Number, found end of input");
        assert_eq!(message(&["Number", "Minus"]), "expected Number or Minus, found end of input");
        assert_eq!(
            message(&["Number", "Minus", "LParen", "Bang"]),
            "expected Number, Minus, LParen, or Bang, found end of input"
        );
    }

    #[test]
    fn call_limit_message() {
        let variant = ErrorVariant::CallLimitReached { limit: 10 };
        assert_eq!(variant.message(), "call limit of 10 reached");
    }

    #[test]
    fn lex_error_display() {
        let error = LexError::NoMatch {
            character: '@',
            position: at(3, 1, 3),
        };
        assert_eq!(error.to_string(), "no token matches '@' at 1:3");

        let error = LexError::AmbiguousKeywords {
            names: vec!["If", "IfAgain"],
            text: "if".to_owned(),
            position: at(0, 1, 0),
        };
        assert_eq!(error.to_string(), "keywords If, IfAgain all match \"if\" at 1:0");
    }
}
