// pegcst. Packrat parsing over token streams
// Copyright (c) 2024 The pegcst Developers
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

//! Integer arithmetic with the usual precedence.
//!
//! ```text
//! expression     = additive
//! additive       = multiplicative ((Plus | Minus) multiplicative)*
//! multiplicative = unary ((Star | Slash | Percent) unary)*
//! unary          = Minus unary | primary
//! primary        = Literal | LParen expression RParen
//! ```

use std::sync::Arc;

use once_cell::sync::Lazy;
use pegcst::{
    parse, CstNode, Error, Lexicon, LexiconError, ParseResult, Parser, ParserConfig, ParserState,
    TokenDefinition,
};

static LEXICON: Lazy<Lexicon> =
    Lazy::new(|| build_lexicon().expect("arithmetic token patterns are valid"));

fn build_lexicon() -> Result<Lexicon, LexiconError> {
    vec![
        TokenDefinition::regex("Literal", "[0-9]+(?:\\.[0-9]+)?"),
        Ok(TokenDefinition::literal("Plus", "+")),
        Ok(TokenDefinition::literal("Minus", "-")),
        Ok(TokenDefinition::literal("Star", "*")),
        Ok(TokenDefinition::literal("Slash", "/")),
        Ok(TokenDefinition::literal("Percent", "%")),
        Ok(TokenDefinition::literal("LParen", "(")),
        Ok(TokenDefinition::literal("RParen", ")")),
        TokenDefinition::regex("WhiteSpace", "[ \t\r\n]+").map(TokenDefinition::skip),
    ]
    .into_iter()
    .collect()
}

/// The arithmetic token categories.
pub fn lexicon() -> &'static Lexicon {
    &LEXICON
}

/// Parser for arithmetic expressions.
#[derive(Clone, Debug, Default)]
pub struct ArithmeticParser {
    config: ParserConfig,
}

impl ArithmeticParser {
    pub fn new() -> ArithmeticParser {
        ArithmeticParser::default()
    }

    pub fn with_config(config: ParserConfig) -> ArithmeticParser {
        ArithmeticParser { config }
    }
}

impl Parser for ArithmeticParser {
    fn parse(&self, source: &str) -> Result<Arc<CstNode>, Error> {
        parse(lexicon(), source, &self.config, expression)
    }
}

pub fn expression(s: &mut ParserState<'_>) -> ParseResult {
    s.rule("expression", additive)
}

fn additive(s: &mut ParserState<'_>) -> ParseResult {
    s.rule("additive", |s| {
        multiplicative(s)?;
        s.many(|s| {
            s.or(&mut [&mut |s| s.consume("Plus"), &mut |s| s.consume("Minus")])?;
            multiplicative(s)
        })
    })
}

fn multiplicative(s: &mut ParserState<'_>) -> ParseResult {
    s.rule("multiplicative", |s| {
        unary(s)?;
        s.many(|s| {
            s.or(&mut [
                &mut |s| s.consume("Star"),
                &mut |s| s.consume("Slash"),
                &mut |s| s.consume("Percent"),
            ])?;
            unary(s)
        })
    })
}

fn unary(s: &mut ParserState<'_>) -> ParseResult {
    s.rule("unary", |s| {
        s.or(&mut [
            &mut |s| {
                s.consume("Minus")?;
                unary(s)
            },
            &mut primary,
        ])
    })
}

fn primary(s: &mut ParserState<'_>) -> ParseResult {
    s.rule("primary", |s| {
        s.or(&mut [
            &mut |s| s.consume("Literal"),
            &mut |s| {
                s.consume("LParen")?;
                expression(s)?;
                s.consume("RParen")
            },
        ])
    })
}
