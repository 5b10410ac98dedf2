// pegcst. Packrat parsing over token streams
// Copyright (c) 2024 The pegcst Developers
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

//! Token definitions and the tokens matched from them.

use std::collections::BTreeSet;
use std::fmt;

use regex::Regex;
use serde::Serialize;

use crate::error::LexiconError;
use crate::position::{SourceLocation, SourcePosition};

/// What a `TokenDefinition` matches against the input.
#[derive(Clone, Debug)]
pub enum Pattern {
    /// Matches the exact string.
    Literal(String),
    /// Matches a regular expression anchored at the cursor.
    Regex(Regex),
}

impl Pattern {
    /// Compiles `pattern` so that it only ever matches at the start of the searched text.
    pub fn regex(pattern: &str) -> Result<Pattern, regex::Error> {
        Regex::new(&format!("^(?:{})", pattern)).map(Pattern::Regex)
    }

    #[inline]
    pub fn literal(string: impl Into<String>) -> Pattern {
        Pattern::Literal(string.into())
    }

    /// Returns the length in bytes of the match at the very start of `input`, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// # use pegcst::Pattern;
    /// let digits = Pattern::regex("[0-9]+").unwrap();
    ///
    /// assert_eq!(digits.match_len("123abc"), Some(3));
    /// assert_eq!(digits.match_len("abc123"), None);
    /// assert_eq!(Pattern::literal("=>").match_len("=> x"), Some(2));
    /// ```
    #[inline]
    pub fn match_len(&self, input: &str) -> Option<usize> {
        match self {
            Pattern::Literal(string) => {
                if input.starts_with(string.as_str()) {
                    Some(string.len())
                } else {
                    None
                }
            }
            Pattern::Regex(regex) => regex.find(input).map(|m| m.end()),
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Literal(string) => write!(f, "{:?}", string),
            Pattern::Regex(regex) => write!(f, "/{}/", regex.as_str()),
        }
    }
}

/// Whether matched text becomes a token or is only skipped over.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum TokenGroup {
    #[default]
    Normal,
    /// Whitespace, comments and other trivia: consumed by the lexer, never seen by rules.
    Skip,
}

/// Role of a definition inside template literals.
///
/// `Middle` and `Tail` only exist between a `Head` and its closing `Tail`, so the lexer leaves
/// them out while no template is open.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TemplatePart {
    Head,
    Middle,
    Tail,
}

/// Gates a definition on where it appears relative to the start and the previous token.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ContextConstraint {
    /// Only matches at byte offset 0.
    pub only_at_start: bool,
    /// Only matches right after a token with one of these names.
    pub only_after: Option<BTreeSet<&'static str>>,
    /// Never matches right after a token with one of these names.
    pub not_after: BTreeSet<&'static str>,
}

impl ContextConstraint {
    /// Returns `true` if a definition carrying this constraint may match at `index`, given the
    /// name of the previously emitted (non-skipped) token.
    pub fn allows(&self, index: usize, previous: Option<&str>) -> bool {
        if self.only_at_start && index != 0 {
            return false;
        }

        if let Some(only_after) = &self.only_after {
            match previous {
                Some(name) if only_after.contains(name) => (),
                _ => return false,
            }
        }

        match previous {
            Some(name) => !self.not_after.contains(name),
            None => true,
        }
    }
}

/// A lexical category.
///
/// Definitions are built once, when a grammar assembles its `Lexicon`, and are immutable from
/// then on.
///
/// # Examples
///
/// ```
/// # use pegcst::{TokenDefinition, TokenGroup};
/// let whitespace = TokenDefinition::regex("WhiteSpace", r"[ \t]+").unwrap().skip();
/// let if_keyword = TokenDefinition::literal("If", "if").keyword();
///
/// assert_eq!(whitespace.group(), TokenGroup::Skip);
/// assert!(if_keyword.is_keyword());
/// ```
#[derive(Clone, Debug)]
pub struct TokenDefinition {
    name: &'static str,
    pattern: Pattern,
    keyword: bool,
    group: TokenGroup,
    context: ContextConstraint,
    lookahead_after: Option<Pattern>,
    template: Option<TemplatePart>,
}

impl TokenDefinition {
    pub fn new(name: &'static str, pattern: Pattern) -> TokenDefinition {
        TokenDefinition {
            name,
            pattern,
            keyword: false,
            group: TokenGroup::Normal,
            context: ContextConstraint::default(),
            lookahead_after: None,
            template: None,
        }
    }

    /// A definition matching exactly `string`.
    pub fn literal(name: &'static str, string: &str) -> TokenDefinition {
        TokenDefinition::new(name, Pattern::literal(string))
    }

    /// A definition matching the regular expression `pattern`.
    pub fn regex(name: &'static str, pattern: &str) -> Result<TokenDefinition, LexiconError> {
        let pattern = Pattern::regex(pattern)
            .map_err(|source| LexiconError::InvalidPattern { name, source })?;
        Ok(TokenDefinition::new(name, pattern))
    }

    /// Marks the definition as a keyword; keywords win length ties.
    pub fn keyword(mut self) -> Self {
        self.keyword = true;
        self
    }

    /// Puts the definition in the skip group.
    pub fn skip(mut self) -> Self {
        self.group = TokenGroup::Skip;
        self
    }

    pub fn only_at_start(mut self) -> Self {
        self.context.only_at_start = true;
        self
    }

    pub fn only_after(mut self, names: &[&'static str]) -> Self {
        self.context
            .only_after
            .get_or_insert_with(BTreeSet::new)
            .extend(names.iter().copied());
        self
    }

    pub fn not_after(mut self, names: &[&'static str]) -> Self {
        self.context.not_after.extend(names.iter().copied());
        self
    }

    /// Rejects a match when the text right after it matches `pattern`.
    pub fn lookahead_after(mut self, pattern: Pattern) -> Self {
        self.lookahead_after = Some(pattern);
        self
    }

    pub fn template(mut self, part: TemplatePart) -> Self {
        self.template = Some(part);
        self
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    #[inline]
    pub fn is_keyword(&self) -> bool {
        self.keyword
    }

    #[inline]
    pub fn group(&self) -> TokenGroup {
        self.group
    }

    #[inline]
    pub fn context(&self) -> &ContextConstraint {
        &self.context
    }

    #[inline]
    pub fn forbidden_lookahead(&self) -> Option<&Pattern> {
        self.lookahead_after.as_ref()
    }

    #[inline]
    pub fn template_part(&self) -> Option<TemplatePart> {
        self.template
    }

    /// Template continuations are only active while a template literal is open.
    #[inline]
    pub fn is_template_continuation(&self) -> bool {
        matches!(
            self.template,
            Some(TemplatePart::Middle) | Some(TemplatePart::Tail)
        )
    }
}

/// The ordered set of `TokenDefinition`s of one grammar.
#[derive(Clone, Debug, Default)]
pub struct Lexicon {
    definitions: Vec<TokenDefinition>,
}

impl Lexicon {
    pub fn new(definitions: Vec<TokenDefinition>) -> Lexicon {
        Lexicon { definitions }
    }

    #[inline]
    pub fn definitions(&self) -> &[TokenDefinition] {
        &self.definitions
    }

    pub fn get(&self, name: &str) -> Option<&TokenDefinition> {
        self.definitions.iter().find(|definition| definition.name == name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl FromIterator<TokenDefinition> for Lexicon {
    fn from_iter<T: IntoIterator<Item = TokenDefinition>>(iter: T) -> Self {
        Lexicon::new(iter.into_iter().collect())
    }
}

/// A token produced by the lexer.
///
/// Tokens are never mutated after lexing; the parser only moves a cursor over them.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
pub struct MatchedToken {
    pub name: &'static str,
    pub value: String,
    pub start_index: usize,
    pub end_index: usize,
    /// Line of the first character.
    pub row: usize,
    /// Line of the last character.
    pub end_row: usize,
    pub column_start: usize,
    pub column_end: usize,
    /// `true` if this token starts on another row than the previous emitted token.
    pub has_line_break_before: bool,
}

impl MatchedToken {
    #[inline]
    pub fn start(&self) -> SourcePosition {
        SourcePosition {
            index: self.start_index,
            line: self.row,
            column: self.column_start,
        }
    }

    #[inline]
    pub fn end(&self) -> SourcePosition {
        SourcePosition {
            index: self.end_index,
            line: self.end_row,
            column: self.column_end,
        }
    }

    #[inline]
    pub fn loc(&self) -> SourceLocation {
        SourceLocation::new(self.start(), self.end())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.end_index - self.start_index
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for MatchedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.name, self.value)
    }
}
