// pegcst. Packrat parsing over token streams
// Copyright (c) 2024 The pegcst Developers
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

//! The parser state and the combinators grammars are written with.
//!
//! A grammar rule is a plain function taking `&mut ParserState` and returning a `ParseResult`.
//! It wraps its body in `ParserState::rule`, which memoizes the outcome, builds the branch node
//! and restores the cursor on failure. Inside the body, tokens are taken with `consume`, other
//! rules are called directly and choice and repetition go through `or`, `many` and `option`.

use std::mem;
use std::num::NonZeroUsize;
use std::sync::Arc;

use log::debug;

use crate::cache::{CacheEntry, CacheKey, CacheStats, Outcome, PackratCache};
use crate::config::ParserConfig;
use crate::cst::CstNode;
use crate::error::{ErrorVariant, Expected, ParseError};
use crate::position::SourcePosition;
use crate::token::MatchedToken;

/// Name of the branch wrapping the top level when the entry rule did not produce exactly one
/// node.
pub const ROOT_RULE: &str = "root";

/// Result type of rules and combinators.
pub type ParseResult<T = ()> = Result<T, ParseFailure>;

/// Why a rule or combinator did not match.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ParseFailure {
    /// The tokens did not fit; the caller may backtrack and try something else.
    Mismatch,
    /// The call limit was hit; every combinator gives up and the parse fails.
    CallLimit,
}

impl ParseFailure {
    #[inline]
    pub fn is_recoverable(self) -> bool {
        self == ParseFailure::Mismatch
    }
}

/// One alternative of `ParserState::or`.
pub type Alternative<'a, 't> = &'a mut dyn FnMut(&mut ParserState<'t>) -> ParseResult;

/// The farthest token index a parse failed at, with everything expected there.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FarthestAttempt {
    pub index: usize,
    pub expected: Vec<Expected>,
    /// Rules active at the first attempt at `index`, outermost first.
    pub rule_stack: Vec<&'static str>,
}

impl FarthestAttempt {
    /// Combines the attempt made before a rule ran with those made inside it.
    fn merge(
        outer: Option<FarthestAttempt>,
        inner: Option<FarthestAttempt>,
    ) -> Option<FarthestAttempt> {
        match (outer, inner) {
            (None, attempt) | (attempt, None) => attempt,
            (Some(outer), Some(inner)) if inner.index > outer.index => Some(inner),
            (Some(mut outer), Some(inner)) => {
                if inner.index == outer.index {
                    for expected in inner.expected {
                        if !outer.expected.contains(&expected) {
                            outer.expected.push(expected);
                        }
                    }
                }
                Some(outer)
            }
        }
    }

    /// Drops the first `depth` rules of the stack.
    fn relative_to(&self, depth: usize) -> FarthestAttempt {
        FarthestAttempt {
            index: self.index,
            expected: self.expected.clone(),
            rule_stack: self.rule_stack.get(depth..).unwrap_or_default().to_vec(),
        }
    }
}

/// Cursor and child count of the innermost rule, enough to undo anything done since.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Snapshot {
    cursor: usize,
    children: usize,
}

impl Snapshot {
    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

#[derive(Debug)]
struct Frame {
    name: &'static str,
    children: Vec<Arc<CstNode>>,
}

/// Spends the per-parse call budget, one unit per counted combinator call.
#[derive(Debug)]
struct CallLimitTracker {
    limit: Option<NonZeroUsize>,
    calls: usize,
    // Cursor and rule stack at the first refused call.
    reached_at: Option<(usize, Vec<&'static str>)>,
}

impl CallLimitTracker {
    fn new(limit: Option<NonZeroUsize>) -> Self {
        Self {
            limit,
            calls: 0,
            reached_at: None,
        }
    }

    /// Records a call, or returns `false` once the budget is spent.
    fn try_count(&mut self) -> bool {
        match self.limit {
            Some(limit) if self.calls >= limit.get() => false,
            _ => {
                self.calls += 1;
                true
            }
        }
    }

    fn limit(&self) -> usize {
        self.limit.map_or(0, NonZeroUsize::get)
    }
}

/// The complete state of one parse.
#[derive(Debug)]
pub struct ParserState<'t> {
    tokens: &'t [MatchedToken],
    cursor: usize,
    root: Vec<Arc<CstNode>>,
    frames: Vec<Frame>,
    cache: PackratCache,
    farthest: Option<FarthestAttempt>,
    lookahead: usize,
    call_tracker: CallLimitTracker,
}

/// Creates a `ParserState` over `tokens` and drives it with the entry rule `f`.
///
/// The entry rule must consume every token. On success the single node it produced is
/// returned; zero or several nodes are wrapped in a `ROOT_RULE` branch. On failure the farthest
/// attempt is turned into a `ParseError`.
///
/// # Examples
///
/// ```
/// # use pegcst::{state, ParserConfig};
/// let root = state(&[], &ParserConfig::default(), |s| s.rule("empty", |_| Ok(()))).unwrap();
///
/// assert_eq!(root.name(), "empty");
/// assert!(root.children().is_empty());
/// ```
pub fn state<'t, F>(
    tokens: &'t [MatchedToken],
    config: &ParserConfig,
    f: F,
) -> Result<Arc<CstNode>, ParseError>
where
    F: FnOnce(&mut ParserState<'t>) -> ParseResult,
{
    let mut state = ParserState::new(tokens, config);

    let result = f(&mut state).and_then(|()| {
        if state.at_end() {
            Ok(())
        } else {
            Err(state.fail(Expected::EndOfInput))
        }
    });

    let stats = state.cache_stats();
    debug!(
        "packrat cache: {} hits, {} misses, {} stores, {} evictions",
        stats.hits, stats.misses, stats.stores, stats.evictions
    );

    match result {
        Ok(()) => {
            debug!("parsed {} tokens", tokens.len());
            let single = if state.root.len() == 1 {
                state.root.pop()
            } else {
                None
            };
            Ok(single.unwrap_or_else(|| {
                Arc::new(CstNode::branch(ROOT_RULE, mem::take(&mut state.root)))
            }))
        }
        Err(ParseFailure::CallLimit) => {
            let (index, rule_stack) = state.call_tracker.reached_at.take().unwrap_or_default();
            let variant = ErrorVariant::CallLimitReached {
                limit: state.call_tracker.limit(),
            };
            debug!("parse stopped at the call limit, token {}", index);
            Err(ParseError::new(variant, state.position_of(index), rule_stack))
        }
        Err(ParseFailure::Mismatch) => {
            let farthest = state.farthest.take().unwrap_or_else(|| FarthestAttempt {
                index: state.cursor,
                expected: vec![],
                rule_stack: vec![],
            });
            debug!(
                "parse failed at token {} expecting {:?}",
                farthest.index, farthest.expected
            );
            let variant = ErrorVariant::Mismatch {
                expected: farthest.expected,
                found: tokens.get(farthest.index).cloned(),
            };
            Err(ParseError::new(
                variant,
                state.position_of(farthest.index),
                farthest.rule_stack,
            ))
        }
    }
}

impl<'t> ParserState<'t> {
    /// Allocates a fresh state. Most grammars go through `state` instead.
    pub fn new(tokens: &'t [MatchedToken], config: &ParserConfig) -> ParserState<'t> {
        ParserState {
            tokens,
            cursor: 0,
            root: vec![],
            frames: vec![],
            cache: PackratCache::new(config.cache),
            farthest: None,
            lookahead: 0,
            call_tracker: CallLimitTracker::new(config.call_limit),
        }
    }

    #[inline]
    pub fn tokens(&self) -> &'t [MatchedToken] {
        self.tokens
    }

    /// Index of the next token to consume.
    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[inline]
    pub fn peek(&self) -> Option<&'t MatchedToken> {
        self.tokens.get(self.cursor)
    }

    /// Whether the next token has the category `name`.
    #[inline]
    pub fn peek_is(&self, name: &str) -> bool {
        self.peek().map_or(false, |token| token.name == name)
    }

    #[inline]
    pub fn at_end(&self) -> bool {
        self.cursor >= self.tokens.len()
    }

    /// Whether the next token starts on another row than the previous one.
    #[inline]
    pub fn line_break_before(&self) -> bool {
        self.peek().map_or(false, |token| token.has_line_break_before)
    }

    /// Names of the active rules, outermost first.
    pub fn rule_stack(&self) -> Vec<&'static str> {
        self.frames.iter().map(|frame| frame.name).collect()
    }

    #[inline]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Whether the state is running inside a `lookahead`.
    #[inline]
    pub fn is_lookahead(&self) -> bool {
        self.lookahead > 0
    }

    /// Runs the rule `name` at the cursor.
    ///
    /// A cached outcome for `name` at this cursor is replayed instead of running `f`. Otherwise
    /// `f` runs with a fresh frame collecting its nodes; on success they become a branch named
    /// `name` attached to the caller, on failure they are dropped and the cursor is restored.
    ///
    /// # Examples
    ///
    /// ```
    /// # use pegcst::{state, ParserConfig, ParserState, ParseResult};
    /// fn list(s: &mut ParserState<'_>) -> ParseResult {
    ///     s.rule("list", |s| s.many(|s| s.rule("item", |_| Ok(()))))
    /// }
    ///
    /// let root = state(&[], &ParserConfig::default(), list).unwrap();
    /// assert_eq!(root.to_sexp(), "(list)");
    /// ```
    pub fn rule<F>(&mut self, name: &'static str, f: F) -> ParseResult
    where
        F: FnOnce(&mut ParserState<'t>) -> ParseResult,
    {
        self.track_call()?;

        let start = self.cursor;
        let key = CacheKey::new(name, start);
        let depth = self.frames.len();

        if let Some(entry) = self.cache.lookup(&key) {
            let outcome = entry.outcome.clone();
            let farthest = entry.farthest.clone();
            return self.replay(outcome, farthest);
        }

        let saved = self.farthest.take();
        self.frames.push(Frame {
            name,
            children: vec![],
        });
        let result = f(self);
        let children = self
            .frames
            .pop()
            .map(|frame| frame.children)
            .unwrap_or_default();
        let inner = self.farthest.take();

        let outcome = match result {
            Ok(()) => {
                let node = Arc::new(CstNode::branch(name, children));
                self.children_mut().push(Arc::clone(&node));
                Outcome::Matched {
                    end: self.cursor,
                    node,
                }
            }
            Err(ParseFailure::Mismatch) => {
                self.cursor = start;
                Outcome::Failed
            }
            Err(failure) => {
                self.cursor = start;
                self.farthest = FarthestAttempt::merge(saved, inner);
                return Err(failure);
            }
        };
        let matched = matches!(outcome, Outcome::Matched { .. });

        if !self.is_lookahead() {
            let farthest = inner.as_ref().map(|attempt| attempt.relative_to(depth));
            self.cache.store(key, CacheEntry { outcome, farthest });
        }
        self.farthest = FarthestAttempt::merge(saved, inner);

        if matched {
            Ok(())
        } else {
            Err(ParseFailure::Mismatch)
        }
    }

    fn replay(&mut self, outcome: Outcome, farthest: Option<FarthestAttempt>) -> ParseResult {
        if let (Some(mut attempt), false) = (farthest, self.is_lookahead()) {
            let mut rule_stack = self.rule_stack();
            rule_stack.append(&mut attempt.rule_stack);
            attempt.rule_stack = rule_stack;
            self.farthest = FarthestAttempt::merge(self.farthest.take(), Some(attempt));
        }

        match outcome {
            Outcome::Matched { end, node } => {
                self.cursor = end;
                self.children_mut().push(node);
                Ok(())
            }
            Outcome::Failed => Err(ParseFailure::Mismatch),
        }
    }

    /// Consumes the next token if its category is `name`, attaching it as a leaf.
    ///
    /// # Examples
    ///
    /// ```
    /// # use pegcst::{state, tokenize, Lexicon, ParserConfig, TokenDefinition};
    /// let lexicon: Lexicon = vec![TokenDefinition::literal("Dot", ".")].into_iter().collect();
    /// let tokens = tokenize(&lexicon, "..").unwrap();
    ///
    /// let root = state(&tokens, &ParserConfig::default(), |s| {
    ///     s.rule("dots", |s| {
    ///         s.consume("Dot")?;
    ///         s.consume("Dot")
    ///     })
    /// })
    /// .unwrap();
    ///
    /// assert_eq!(root.to_sexp(), r#"(dots (Dot ".") (Dot "."))"#);
    /// ```
    pub fn consume(&mut self, name: &'static str) -> ParseResult {
        self.consume_if(Expected::Token(name), |token| token.name == name)
    }

    /// Consumes the next token if its category is `name` and its text is exactly `value`.
    pub fn consume_value(&mut self, name: &'static str, value: &'static str) -> ParseResult {
        self.consume_if(Expected::Value { name, value }, |token| {
            token.name == name && token.value == value
        })
    }

    fn consume_if<P>(&mut self, expected: Expected, predicate: P) -> ParseResult
    where
        P: Fn(&MatchedToken) -> bool,
    {
        match self.peek() {
            Some(token) if predicate(token) => {
                self.cursor += 1;
                self.children_mut().push(Arc::new(CstNode::leaf(token)));
                Ok(())
            }
            _ => Err(self.fail(expected)),
        }
    }

    /// Records that `expected` was wanted at the cursor and returns the mismatch to propagate.
    ///
    /// Grammars use this for checks that are not a plain token match.
    pub fn fail(&mut self, expected: Expected) -> ParseFailure {
        if !self.is_lookahead() {
            let index = self.cursor;
            let farthest = self.farthest.as_ref().map(|attempt| attempt.index);

            match farthest {
                Some(farthest) if farthest > index => {}
                Some(farthest) if farthest == index => {
                    if let Some(attempt) = self.farthest.as_mut() {
                        if !attempt.expected.contains(&expected) {
                            attempt.expected.push(expected);
                        }
                    }
                }
                _ => {
                    self.farthest = Some(FarthestAttempt {
                        index,
                        expected: vec![expected],
                        rule_stack: self.rule_stack(),
                    });
                }
            }
        }

        ParseFailure::Mismatch
    }

    /// Saves the cursor and the innermost rule's child count.
    #[inline]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            cursor: self.cursor,
            children: self.children().len(),
        }
    }

    /// Returns to `snapshot`, which must have been taken in the same rule.
    #[inline]
    pub fn restore(&mut self, snapshot: Snapshot) {
        self.cursor = snapshot.cursor;
        self.children_mut().truncate(snapshot.children);
    }

    /// Ordered choice: the first alternative that matches wins.
    ///
    /// Every alternative starts from the state `or` was called in. When all of them fail, that
    /// state is restored and the last alternative's failure is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// # use pegcst::{state, tokenize, Lexicon, ParserConfig, TokenDefinition};
    /// let lexicon: Lexicon = vec![
    ///     TokenDefinition::literal("A", "a"),
    ///     TokenDefinition::literal("B", "b"),
    /// ]
    /// .into_iter()
    /// .collect();
    /// let tokens = tokenize(&lexicon, "b").unwrap();
    ///
    /// let root = state(&tokens, &ParserConfig::default(), |s| {
    ///     s.rule("ab", |s| s.or(&mut [&mut |s| s.consume("A"), &mut |s| s.consume("B")]))
    /// })
    /// .unwrap();
    ///
    /// assert_eq!(root.to_sexp(), r#"(ab (B "b"))"#);
    /// ```
    pub fn or(&mut self, alternatives: &mut [Alternative<'_, 't>]) -> ParseResult {
        self.track_call()?;

        let mut last = ParseFailure::Mismatch;
        for alternative in alternatives.iter_mut() {
            let snapshot = self.snapshot();

            match (*alternative)(self) {
                Ok(()) => return Ok(()),
                Err(failure) => {
                    self.restore(snapshot);
                    if !failure.is_recoverable() {
                        return Err(failure);
                    }
                    last = failure;
                }
            }
        }

        Err(last)
    }

    /// Zero or more repetitions of `f`; only a fatal failure makes it fail.
    ///
    /// Repetition stops at the first failing iteration, or at the first iteration that matches
    /// without consuming a token; either is undone.
    pub fn many<F>(&mut self, mut f: F) -> ParseResult
    where
        F: FnMut(&mut ParserState<'t>) -> ParseResult,
    {
        self.track_call()?;

        loop {
            let snapshot = self.snapshot();

            match f(self) {
                Ok(()) if self.cursor > snapshot.cursor => {}
                Ok(()) => {
                    self.restore(snapshot);
                    return Ok(());
                }
                Err(failure) => {
                    self.restore(snapshot);
                    return if failure.is_recoverable() {
                        Ok(())
                    } else {
                        Err(failure)
                    };
                }
            }
        }
    }

    /// One or more repetitions of `f`.
    pub fn many1<F>(&mut self, mut f: F) -> ParseResult
    where
        F: FnMut(&mut ParserState<'t>) -> ParseResult,
    {
        self.sequence(|s| f(s))?;
        self.many(f)
    }

    /// Tries `f` once; a mismatch is undone and still succeeds.
    pub fn option<F>(&mut self, f: F) -> ParseResult
    where
        F: FnOnce(&mut ParserState<'t>) -> ParseResult,
    {
        match self.sequence(f) {
            Err(ParseFailure::Mismatch) => Ok(()),
            result => result,
        }
    }

    /// Runs `f`, undoing everything it did if it fails.
    pub fn sequence<F>(&mut self, f: F) -> ParseResult
    where
        F: FnOnce(&mut ParserState<'t>) -> ParseResult,
    {
        self.track_call()?;

        let snapshot = self.snapshot();
        let result = f(self);
        if result.is_err() {
            self.restore(snapshot);
        }

        result
    }

    /// Checks whether `f` matches (`is_positive`) or does not match (`!is_positive`) at the
    /// cursor without consuming anything or building nodes.
    ///
    /// Failures inside the lookahead are not reported as expected tokens.
    pub fn lookahead<F>(&mut self, is_positive: bool, f: F) -> ParseResult
    where
        F: FnOnce(&mut ParserState<'t>) -> ParseResult,
    {
        self.track_call()?;

        let snapshot = self.snapshot();
        self.lookahead += 1;
        let result = f(self);
        self.lookahead -= 1;
        self.restore(snapshot);

        match result {
            Err(ParseFailure::CallLimit) => Err(ParseFailure::CallLimit),
            Ok(()) if is_positive => Ok(()),
            Err(ParseFailure::Mismatch) if !is_positive => Ok(()),
            _ => Err(ParseFailure::Mismatch),
        }
    }

    fn track_call(&mut self) -> ParseResult {
        if self.call_tracker.try_count() {
            return Ok(());
        }
        if self.call_tracker.reached_at.is_none() {
            self.call_tracker.reached_at = Some((self.cursor, self.rule_stack()));
        }

        Err(ParseFailure::CallLimit)
    }

    fn children(&self) -> &[Arc<CstNode>] {
        match self.frames.last() {
            Some(frame) => &frame.children,
            None => &self.root,
        }
    }

    fn children_mut(&mut self) -> &mut Vec<Arc<CstNode>> {
        match self.frames.last_mut() {
            Some(frame) => &mut frame.children,
            None => &mut self.root,
        }
    }

    /// Source position of token `index`, or the end of the last token past the end.
    fn position_of(&self, index: usize) -> SourcePosition {
        match self.tokens.get(index) {
            Some(token) => token.start(),
            None => self
                .tokens
                .last()
                .map_or_else(SourcePosition::start, MatchedToken::end),
        }
    }
}
