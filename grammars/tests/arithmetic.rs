// pegcst. Packrat parsing over token streams
// Copyright (c) 2024 The pegcst Developers
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

#[macro_use]
extern crate pegcst;

use pegcst::{CacheCapacity, ParserConfig};
use pegcst_grammars::arithmetic::ArithmeticParser;
use pegcst_grammars::Parser;
use proptest::prelude::*;

#[test]
fn sum() {
    parses_to! {
        parser: ArithmeticParser::new(),
        input: "1 + 2",
        sexp: r#"(expression (additive (multiplicative (unary (primary (Literal "1")))) (Plus "+") (multiplicative (unary (primary (Literal "2"))))))"#
    };
}

#[test]
fn negated_group() {
    parses_to! {
        parser: ArithmeticParser::new(),
        input: "-(1 - 2) * 3",
        sexp: r#"(expression (additive (multiplicative (unary (Minus "-") (unary (primary (LParen "(") (expression (additive (multiplicative (unary (primary (Literal "1")))) (Minus "-") (multiplicative (unary (primary (Literal "2")))))) (RParen ")")))) (Star "*") (unary (primary (Literal "3"))))))"#
    };
}

#[test]
fn missing_operand() {
    fails_with! {
        parser: ArithmeticParser::new(),
        input: "1 +",
        expected: ["Minus", "Literal", "LParen"],
        found: None,
        index: 3
    };
}

#[test]
fn unclosed_group() {
    fails_with! {
        parser: ArithmeticParser::new(),
        input: "(1 + 2",
        expected: ["Star", "Slash", "Percent", "Plus", "Minus", "RParen"],
        found: None,
        index: 6
    };
}

#[test]
fn stray_token() {
    fails_with! {
        parser: ArithmeticParser::new(),
        input: "1 2",
        expected: ["Star", "Slash", "Percent", "Plus", "Minus", "end of input"],
        found: Some("2"),
        index: 2
    };
}

#[test]
fn error_display() {
    let error = ArithmeticParser::new().parse("1 +").unwrap_err();

    assert_eq!(
        error.to_string(),
        [
            " --> 1:4",
            "  |",
            "1 | 1 +",
            "  |    ^---",
            "  |",
            "  = expected Minus, Literal, or LParen, found end of input (in expression > additive \
             > multiplicative > unary)",
        ]
        .join("\n")
    );
}

fn flat_expression() -> impl Strategy<Value = (String, usize)> {
    prop::collection::vec(
        (
            "[0-9]{1,3}",
            prop_oneof![Just("+"), Just("-"), Just("*"), Just("/"), Just("%")],
        ),
        1..16,
    )
    .prop_map(|terms| {
        let count = terms.len();
        let mut source = String::new();
        for (number, operator) in &terms {
            source.push_str(number);
            source.push(' ');
            source.push_str(operator);
            source.push(' ');
        }
        source.push('0');
        (source, count * 2 + 1)
    })
}

proptest! {
    #[test]
    fn flat_expressions_parse((source, leaves) in flat_expression()) {
        for cache in [CacheCapacity::Disabled, CacheCapacity::default()] {
            let parser = ArithmeticParser::with_config(ParserConfig::default().with_cache(cache));
            let tree = parser.parse(&source).unwrap();

            prop_assert_eq!(tree.leaves().count(), leaves);
        }
    }
}
