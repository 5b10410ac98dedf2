// pegcst. Packrat parsing over token streams
// Copyright (c) 2024 The pegcst Developers
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.
//! # pegcst
//!
//! A PEG engine for hand-written grammars. Source text is first split into tokens by a
//! context-sensitive, longest-match `Lexer`; grammar rules then run over the tokens through a
//! `ParserState`, which builds a concrete syntax tree of `CstNode`s as rules succeed and
//! memoizes every rule result in a packrat cache.
//!
//! ```
//! use std::sync::Arc;
//!
//! use pegcst::{parse, CstNode, Error, Lexicon, ParserConfig, ParserState, ParseResult, TokenDefinition};
//!
//! fn sum(s: &mut ParserState<'_>) -> ParseResult {
//!     s.rule("sum", |s| {
//!         s.consume("Number")?;
//!         s.many(|s| {
//!             s.consume("Plus")?;
//!             s.consume("Number")
//!         })
//!     })
//! }
//!
//! let lexicon: Lexicon = vec![
//!     TokenDefinition::regex("Number", "[0-9]+").unwrap(),
//!     TokenDefinition::literal("Plus", "+"),
//!     TokenDefinition::regex("Space", " +").unwrap().skip(),
//! ]
//! .into_iter()
//! .collect();
//!
//! let tree = parse(&lexicon, "1 + 22", &ParserConfig::default(), sum).unwrap();
//! assert_eq!(tree.leaf_values(), ["1", "+", "22"]);
//!
//! let error = parse(&lexicon, "1 +", &ParserConfig::default(), sum).unwrap_err();
//! assert_eq!(error.to_string(), [
//!     " --> 1:4",
//!     "  |",
//!     "1 | 1 +",
//!     "  |    ^---",
//!     "  |",
//!     "  = expected Number, found end of input (in sum)",
//! ].join("\n"));
//! ```

#![doc(html_root_url = "https://docs.rs/pegcst")]
#![warn(missing_debug_implementations, rust_2018_idioms)]

use std::sync::Arc;

pub use crate::cache::{CacheEntry, CacheKey, CacheStats, Outcome, PackratCache};
pub use crate::config::{CacheCapacity, ParserConfig, DEFAULT_CACHE_CAPACITY};
pub use crate::cst::{CstNode, Descendants, NodeKind};
pub use crate::error::{Error, ErrorVariant, Expected, LexError, LexiconError, ParseError};
pub use crate::lexer::{tokenize, Lexer};
pub use crate::parser_state::{
    state, Alternative, FarthestAttempt, ParseFailure, ParseResult, ParserState, Snapshot,
    ROOT_RULE,
};
pub use crate::position::{LineTracker, SourceLocation, SourcePosition};
pub use crate::token::{
    ContextConstraint, Lexicon, MatchedToken, Pattern, TemplatePart, TokenDefinition, TokenGroup,
};

mod cache;
mod config;
mod cst;
pub mod error;
mod lexer;
#[macro_use]
mod macros;
mod parser_state;
mod position;
mod token;

/// A finished grammar: turns source text into a tree.
pub trait Parser {
    fn parse(&self, source: &str) -> Result<Arc<CstNode>, Error>;
}

/// Tokenizes `source` with `lexicon` and parses the tokens with the entry rule `f`.
///
/// A parse error carries the source line it happened on, see `ParseError::line`.
pub fn parse<F>(
    lexicon: &Lexicon,
    source: &str,
    config: &ParserConfig,
    f: F,
) -> Result<Arc<CstNode>, Error>
where
    F: for<'t> FnOnce(&mut ParserState<'t>) -> ParseResult,
{
    let tokens = tokenize(lexicon, source)?;
    state(&tokens, config, f).map_err(|error| Error::Parse(error.with_source(source)))
}
