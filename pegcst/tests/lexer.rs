// pegcst. Packrat parsing over token streams
// Copyright (c) 2024 The pegcst Developers
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

use pegcst::{Lexer, Lexicon, MatchedToken, TokenDefinition};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn lexicon() -> Lexicon {
    vec![
        TokenDefinition::literal("If", "if").keyword(),
        TokenDefinition::literal("In", "in").keyword(),
        TokenDefinition::regex("Identifier", "[a-z_][a-z0-9_]*").unwrap(),
        TokenDefinition::regex("Number", "[0-9]+").unwrap(),
        TokenDefinition::literal("Eq", "="),
        TokenDefinition::literal("EqEq", "=="),
        TokenDefinition::regex("Comment", "//[^\n]*").unwrap().skip(),
        TokenDefinition::regex("Whitespace", "[ \t]+").unwrap().skip(),
        TokenDefinition::regex("LineTerminator", "\r\n|\n").unwrap().skip(),
    ]
    .into_iter()
    .collect()
}

fn all_tokens(source: &str) -> Vec<MatchedToken> {
    let lexicon = lexicon();
    let (tokens, trivia) = Lexer::new(&lexicon, source)
        .tokenize_with_trivia()
        .unwrap();

    let mut all: Vec<_> = tokens.into_iter().chain(trivia).collect();
    all.sort_by_key(|token| token.start_index);
    all
}

#[test]
fn trivia_reconstructs_source() {
    let source = "if x == 1 // one\n  in_ = 22\r\n";
    let all = all_tokens(source);

    let text: String = all.iter().map(|token| token.value.as_str()).collect();
    assert_eq!(text, source);

    let names: Vec<_> = all
        .iter()
        .filter(|token| !matches!(token.name, "Whitespace" | "LineTerminator"))
        .map(|token| token.name)
        .collect();
    assert_eq!(
        names,
        ["If", "Identifier", "EqEq", "Number", "Comment", "Identifier", "Eq", "Number"]
    );
}

#[test]
fn keyword_prefix_of_identifier() {
    let lexicon = lexicon();
    let tokens = Lexer::new(&lexicon, "iffy if in_ in").tokenize().unwrap();
    let names: Vec<_> = tokens.iter().map(|token| token.name).collect();

    assert_eq!(names, ["Identifier", "If", "Identifier", "In"]);
}

fn source_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            "[a-z_][a-z0-9_]{0,6}",
            "[0-9]{1,4}",
            Just("=".to_owned()),
            Just("==".to_owned()),
            Just("if".to_owned()),
            "[ \t]{1,3}",
            Just("\n".to_owned()),
            Just("\r\n".to_owned()),
            "//[a-z ]{0,8}\n",
        ],
        0..32,
    )
    .prop_map(|parts| parts.join(" "))
}

proptest! {
    #[test]
    fn lengths_add_up(source in source_strategy()) {
        let all = all_tokens(&source);

        let length: usize = all.iter().map(|token| token.len()).sum();
        prop_assert_eq!(length, source.len());

        for pair in all.windows(2) {
            prop_assert_eq!(pair[0].end_index, pair[1].start_index);
        }
    }

    #[test]
    fn lines_are_monotonic(source in source_strategy()) {
        let lexicon = lexicon();
        let tokens = Lexer::new(&lexicon, &source).tokenize().unwrap();

        for pair in tokens.windows(2) {
            prop_assert!(pair[0].end_row <= pair[1].row);
            prop_assert_eq!(pair[1].has_line_break_before, pair[1].row != pair[0].row);
        }
    }
}
