// pegcst. Packrat parsing over token streams
// Copyright (c) 2024 The pegcst Developers
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

/// Asserts that `input` parses and that the tree renders to the s-expression `sexp`.
///
/// # Examples
///
/// ```
/// # #[macro_use] extern crate pegcst;
/// # use std::sync::Arc;
/// # use pegcst::{parse, tokenize, CstNode, Error, Lexicon, Parser, ParserConfig, TokenDefinition};
/// struct Dots(Lexicon);
///
/// impl Parser for Dots {
///     fn parse(&self, source: &str) -> Result<Arc<CstNode>, Error> {
///         parse(&self.0, source, &ParserConfig::default(), |s| {
///             s.rule("dots", |s| s.many(|s| s.consume("Dot")))
///         })
///     }
/// }
///
/// # fn main() {
/// let dots = Dots(vec![TokenDefinition::literal("Dot", ".")].into_iter().collect());
///
/// parses_to! {
///     parser: dots,
///     input: "..",
///     sexp: r#"(dots (Dot ".") (Dot "."))"#
/// };
/// # }
/// ```
#[macro_export]
macro_rules! parses_to {
    ( parser: $parser:expr, input: $string:expr, sexp: $sexp:expr $(,)* ) => {
        #[allow(unused_mut)]
        {
            let parser = &$parser;
            match $crate::Parser::parse(parser, $string) {
                Ok(tree) => assert_eq!(tree.to_sexp(), $sexp),
                Err(error) => panic!("expected {:?} to parse, but it failed with\n{}", $string, error),
            }
        }
    };
}

/// Asserts that parsing `input` fails expecting exactly `expected` (as displayed) and finding
/// `found` (token text, `None` for end of input) at token start index `index`.
#[macro_export]
macro_rules! fails_with {
    ( parser: $parser:expr, input: $string:expr, expected: [ $( $expected:expr ),* $(,)* ],
      found: $found:expr, index: $index:expr $(,)* ) => {
        #[allow(unused_mut)]
        {
            let parser = &$parser;
            let error = match $crate::Parser::parse(parser, $string) {
                Ok(tree) => panic!("expected {:?} to fail, but it parsed to {}", $string, tree),
                Err($crate::Error::Parse(error)) => error,
                Err(error) => panic!("expected a parse error, but found {}", error),
            };

            let expected: Vec<String> = error.expected().iter().map(|e| e.to_string()).collect();
            let wanted: Vec<&str> = vec![$( $expected ),*];
            assert_eq!(expected, wanted, "expected tokens of\n{}", error);

            let found: Option<&str> = $found;
            assert_eq!(error.found().map(|token| token.value.as_str()), found);
            assert_eq!(error.location.index, $index);
        }
    };
}
