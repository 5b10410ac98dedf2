// pegcst. Packrat parsing over token streams
// Copyright (c) 2024 The pegcst Developers
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

//! Longest-match tokenization over a `Lexicon`.
//!
//! At every position each active definition is tried; candidates violating their context
//! constraint or forbidden lookahead are dropped and the longest survivor wins, keywords
//! breaking length ties. Template continuation definitions are only active while a template
//! head is open, which lets `}` close either a block or a template substitution without any
//! feedback from the parser.

use log::trace;

use crate::error::LexError;
use crate::position::LineTracker;
use crate::token::{Lexicon, MatchedToken, TemplatePart, TokenDefinition, TokenGroup};

/// Splits a source text into `MatchedToken`s.
#[derive(Debug)]
pub struct Lexer<'l, 's> {
    lexicon: &'l Lexicon,
    source: &'s str,
    tracker: LineTracker,
    template_depth: usize,
    // Name and starting row of the last emitted token.
    previous: Option<(&'static str, usize)>,
}

/// One step of the lexer: the winning definition and the text it matched.
struct Lexeme<'l, 's> {
    definition: &'l TokenDefinition,
    text: &'s str,
}

impl<'l, 's> Lexer<'l, 's> {
    pub fn new(lexicon: &'l Lexicon, source: &'s str) -> Lexer<'l, 's> {
        Lexer {
            lexicon,
            source,
            tracker: LineTracker::new(),
            template_depth: 0,
            previous: None,
        }
    }

    /// Number of template heads seen and not yet closed.
    #[inline]
    pub fn template_depth(&self) -> usize {
        self.template_depth
    }

    /// Tokenizes the whole source, dropping skip-group matches.
    ///
    /// # Examples
    ///
    /// ```
    /// # use pegcst::{Lexer, Lexicon, TokenDefinition};
    /// let lexicon = Lexicon::new(vec![
    ///     TokenDefinition::regex("Number", "[0-9]+").unwrap(),
    ///     TokenDefinition::literal("Plus", "+"),
    ///     TokenDefinition::regex("WhiteSpace", " +").unwrap().skip(),
    /// ]);
    ///
    /// let tokens = Lexer::new(&lexicon, "1 + 23").tokenize().unwrap();
    /// let names: Vec<_> = tokens.iter().map(|t| t.name).collect();
    ///
    /// assert_eq!(names, ["Number", "Plus", "Number"]);
    /// assert_eq!(tokens[2].value, "23");
    /// ```
    pub fn tokenize(self) -> Result<Vec<MatchedToken>, LexError> {
        self.tokenize_with_trivia().map(|(tokens, _)| tokens)
    }

    /// Tokenizes the whole source, also returning the skip-group matches (comments,
    /// whitespace) in source order.
    pub fn tokenize_with_trivia(
        mut self,
    ) -> Result<(Vec<MatchedToken>, Vec<MatchedToken>), LexError> {
        let mut tokens = vec![];
        let mut trivia = vec![];

        while let Some((token, group)) = self.next_token()? {
            match group {
                TokenGroup::Normal => tokens.push(token),
                TokenGroup::Skip => trivia.push(token),
            }
        }

        trace!(
            "lexed {} bytes into {} tokens and {} trivia",
            self.source.len(),
            tokens.len(),
            trivia.len()
        );

        Ok((tokens, trivia))
    }

    /// Matches the next token, skipped or not. Returns `Ok(None)` at the end of the source.
    pub fn next_token(&mut self) -> Result<Option<(MatchedToken, TokenGroup)>, LexError> {
        let index = self.tracker.position().index;
        if index >= self.source.len() {
            return Ok(None);
        }

        let lexeme = self.longest_match(index)?;
        let group = lexeme.definition.group();
        let start = self.tracker.position();
        self.tracker.advance(lexeme.text);
        let end = self.tracker.position();

        let has_line_break_before = match self.previous {
            Some((_, previous_row)) => start.line != previous_row,
            None => start.line > 1,
        };

        let token = MatchedToken {
            name: lexeme.definition.name(),
            value: lexeme.text.to_owned(),
            start_index: start.index,
            end_index: end.index,
            row: start.line,
            end_row: end.line,
            column_start: start.column,
            column_end: end.column,
            has_line_break_before,
        };

        if group == TokenGroup::Normal {
            match lexeme.definition.template_part() {
                Some(TemplatePart::Head) => self.template_depth += 1,
                Some(TemplatePart::Tail) => {
                    self.template_depth = self.template_depth.saturating_sub(1)
                }
                Some(TemplatePart::Middle) | None => (),
            }
            self.previous = Some((token.name, start.line));
        }

        Ok(Some((token, group)))
    }

    fn longest_match(&self, index: usize) -> Result<Lexeme<'l, 's>, LexError> {
        let source: &'s str = self.source;
        let rest = &source[index..];
        let previous = self.previous.map(|(name, _)| name);

        let mut best_len = 0;
        let mut best: Vec<&'l TokenDefinition> = vec![];

        for definition in self.active_definitions() {
            if !definition.context().allows(index, previous) {
                continue;
            }

            let len = match definition.pattern().match_len(rest) {
                Some(len) if len > 0 => len,
                _ => continue,
            };

            if let Some(forbidden) = definition.forbidden_lookahead() {
                if forbidden.match_len(&rest[len..]).is_some() {
                    continue;
                }
            }

            if len > best_len {
                best_len = len;
                best.clear();
                best.push(definition);
            } else if len == best_len {
                best.push(definition);
            }
        }

        let text = &rest[..best_len];
        let definition = match best.as_slice() {
            [] => {
                return Err(LexError::NoMatch {
                    character: rest.chars().next().unwrap_or_default(),
                    position: self.tracker.position(),
                })
            }
            [definition] => *definition,
            candidates => {
                let keywords: Vec<_> = candidates.iter().filter(|d| d.is_keyword()).collect();
                match keywords.as_slice() {
                    [] => candidates[0],
                    [keyword] => **keyword,
                    _ => {
                        return Err(LexError::AmbiguousKeywords {
                            names: keywords.iter().map(|d| d.name()).collect(),
                            text: text.to_owned(),
                            position: self.tracker.position(),
                        })
                    }
                }
            }
        };

        Ok(Lexeme { definition, text })
    }

    fn active_definitions(&self) -> impl Iterator<Item = &'l TokenDefinition> {
        let in_template = self.template_depth > 0;
        self.lexicon
            .definitions()
            .iter()
            .filter(move |definition| in_template || !definition.is_template_continuation())
    }
}

/// Tokenizes `source` with `lexicon`, dropping skip-group matches.
pub fn tokenize(lexicon: &Lexicon, source: &str) -> Result<Vec<MatchedToken>, LexError> {
    Lexer::new(lexicon, source).tokenize()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::position::SourcePosition;
    use crate::token::Pattern;

    fn lexicon() -> Lexicon {
        Lexicon::new(vec![
            TokenDefinition::regex("LineTerminator", r"\r\n|[\n\r]")
                .unwrap()
                .skip(),
            TokenDefinition::regex("WhiteSpace", r"[ \t]+").unwrap().skip(),
            TokenDefinition::regex("Comment", r"/\*[\s\S]*?\*/").unwrap().skip(),
            TokenDefinition::regex("Hashbang", r"#![^\n]*")
                .unwrap()
                .skip()
                .only_at_start(),
            TokenDefinition::literal("If", "if").keyword(),
            TokenDefinition::literal("In", "in").keyword(),
            TokenDefinition::regex("Identifier", "[a-zA-Z_][a-zA-Z0-9_]*").unwrap(),
            TokenDefinition::regex("Number", r"[0-9]+(?:\.[0-9]+)?|\.[0-9]+").unwrap(),
            TokenDefinition::regex("Regex", r"/[^/*\n][^/\n]*/[a-z]*")
                .unwrap()
                .not_after(&["Identifier", "Number", "RParen"]),
            TokenDefinition::literal("Slash", "/"),
            TokenDefinition::literal("LParen", "("),
            TokenDefinition::literal("RParen", ")"),
            TokenDefinition::literal("LBrace", "{"),
            TokenDefinition::literal("RBrace", "}"),
            TokenDefinition::literal("Dot", "."),
            TokenDefinition::literal("Question", "?"),
            TokenDefinition::literal("Colon", ":"),
            TokenDefinition::literal("QuestionDot", "?.")
                .lookahead_after(Pattern::regex("[0-9]").unwrap()),
            TokenDefinition::regex("NoSubstitutionTemplate", r"`[^`$]*`").unwrap(),
            TokenDefinition::regex("TemplateHead", r"`[^`$]*\$\{")
                .unwrap()
                .template(TemplatePart::Head),
            TokenDefinition::regex("TemplateMiddle", r"\}[^`$]*\$\{")
                .unwrap()
                .template(TemplatePart::Middle),
            TokenDefinition::regex("TemplateTail", r"\}[^`$]*`")
                .unwrap()
                .template(TemplatePart::Tail),
        ])
    }

    fn names(source: &str) -> Vec<&'static str> {
        tokenize(&lexicon(), source)
            .unwrap()
            .iter()
            .map(|t| t.name)
            .collect()
    }

    fn values(source: &str) -> Vec<String> {
        tokenize(&lexicon(), source)
            .unwrap()
            .into_iter()
            .map(|t| t.value)
            .collect()
    }

    #[test]
    fn longest_match_beats_keyword() {
        assert_eq!(names("iffy"), ["Identifier"]);
        assert_eq!(values("iffy"), ["iffy"]);
    }

    #[test]
    fn keyword_wins_tie() {
        assert_eq!(names("if"), ["If"]);
        assert_eq!(names("in inx"), ["In", "Identifier"]);
    }

    #[test]
    fn ambiguous_keywords() {
        let lexicon = Lexicon::new(vec![
            TokenDefinition::literal("Of", "of").keyword(),
            TokenDefinition::regex("OfToo", "o[f]").unwrap().keyword(),
        ]);

        let error = tokenize(&lexicon, "of").unwrap_err();
        assert_eq!(
            error,
            LexError::AmbiguousKeywords {
                names: vec!["Of", "OfToo"],
                text: "of".to_owned(),
                position: SourcePosition::start(),
            }
        );
    }

    #[test]
    fn earlier_definition_wins_non_keyword_tie() {
        let lexicon = Lexicon::new(vec![
            TokenDefinition::regex("First", "[a-z]+").unwrap(),
            TokenDefinition::regex("Second", "[a-z]+").unwrap(),
        ]);
        let tokens = tokenize(&lexicon, "abc").unwrap();
        assert_eq!(tokens[0].name, "First");
    }

    #[test]
    fn no_match() {
        let error = tokenize(&lexicon(), "a\n  @").unwrap_err();
        assert_eq!(
            error,
            LexError::NoMatch {
                character: '@',
                position: SourcePosition {
                    index: 4,
                    line: 2,
                    column: 2
                },
            }
        );
    }

    #[test]
    fn template_literal_is_three_tokens() {
        assert_eq!(
            names("`a${b}c`"),
            ["TemplateHead", "Identifier", "TemplateTail"]
        );
        assert_eq!(values("`a${b}c`"), ["`a${", "b", "}c`"]);
    }

    #[test]
    fn template_middle_and_nesting() {
        assert_eq!(
            names("`${a}-${`${b}`}`"),
            [
                "TemplateHead",
                "Identifier",
                "TemplateMiddle",
                "TemplateHead",
                "Identifier",
                "TemplateTail",
                "TemplateTail"
            ]
        );
    }

    #[test]
    fn braces_outside_templates() {
        assert_eq!(names("{a}`x`"), ["LBrace", "Identifier", "RBrace", "NoSubstitutionTemplate"]);
    }

    #[test]
    fn template_depth_closes() {
        let lexicon = lexicon();
        let mut lexer = Lexer::new(&lexicon, "`${a}` }");
        let mut depths = vec![];
        while let Some((token, group)) = lexer.next_token().unwrap() {
            if group == TokenGroup::Normal {
                depths.push((token.name, lexer.template_depth()));
            }
        }
        assert_eq!(
            depths,
            [("TemplateHead", 1), ("Identifier", 1), ("TemplateTail", 0), ("RBrace", 0)]
        );
    }

    #[test]
    fn regex_only_where_an_operand_may_start() {
        assert_eq!(names("(/ab/g)"), ["LParen", "Regex", "RParen"]);
        assert_eq!(
            names("a / b / c"),
            ["Identifier", "Slash", "Identifier", "Slash", "Identifier"]
        );
        assert_eq!(names("(a) /b/"), ["LParen", "Identifier", "RParen", "Slash", "Identifier", "Slash"]);
    }

    #[test]
    fn hashbang_only_at_start() {
        assert_eq!(names("#!/usr/bin/env node\na"), ["Identifier"]);
        assert!(tokenize(&lexicon(), "a #!x").is_err());
    }

    #[test]
    fn forbidden_lookahead() {
        assert_eq!(names("a?.b"), ["Identifier", "QuestionDot", "Identifier"]);
        assert_eq!(names("a?.5:1"), ["Identifier", "Question", "Number", "Colon", "Number"]);
    }

    #[test]
    fn positions_and_line_breaks() {
        let tokens = tokenize(&lexicon(), "a /* x\n y */ b\n\n  c").unwrap();
        let summary: Vec<_> = tokens
            .iter()
            .map(|t| (t.value.as_str(), t.row, t.column_start, t.column_end, t.has_line_break_before))
            .collect();

        assert_eq!(
            summary,
            [
                ("a", 1, 0, 1, false),
                ("b", 2, 6, 7, true),
                ("c", 4, 2, 3, true)
            ]
        );
        assert_eq!(tokens[2].start_index, 18);
    }

    #[test]
    fn first_token_on_later_line() {
        let tokens = tokenize(&lexicon(), "\n a").unwrap();
        assert!(tokens[0].has_line_break_before);
        assert_eq!(tokens[0].row, 2);
    }

    #[test]
    fn line_break_counted_from_previous_token_row() {
        let lexicon = Lexicon::new(vec![
            TokenDefinition::regex("String", r#""[^"]*""#).unwrap(),
            TokenDefinition::regex("Identifier", "[a-z]+").unwrap(),
            TokenDefinition::regex("WhiteSpace", r"\s+").unwrap().skip(),
        ]);
        let tokens = tokenize(&lexicon, "\"a\nbc\" d").unwrap();

        assert_eq!((tokens[0].row, tokens[0].end_row, tokens[0].column_end), (1, 2, 3));
        assert_eq!((tokens[1].row, tokens[1].column_start), (2, 4));
        assert!(tokens[1].has_line_break_before);
    }

    #[test]
    fn trivia_is_kept_apart() {
        let (tokens, trivia) = Lexer::new(&lexicon(), "a /*c*/ b")
            .tokenize_with_trivia()
            .unwrap();

        assert_eq!(tokens.len(), 2);
        let trivia: Vec<_> = trivia.iter().map(|t| t.name).collect();
        assert_eq!(trivia, ["WhiteSpace", "Comment", "WhiteSpace"]);
    }

    #[test]
    fn empty_source() {
        assert!(tokenize(&lexicon(), "").unwrap().is_empty());
    }
}
