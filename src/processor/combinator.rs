//! Parser-combinator engine.
//!
//! Parsers never mutate an input `Assembly`: each node takes a *set* of
//! candidate assemblies and returns the set advanced by a successful match.
//! A candidate that does not match simply disappears from the output set.
//! Alternation keeps every branch that matched, and repetition keeps every
//! repeat count, so ambiguity is settled afterwards by `best_match`, which
//! picks the candidate that consumed the most tokens.
//!
//! A `Sequence` whose first part matched but whose later part matched
//! nothing is a hard error (`MatchError`), not a silent failure. Optional
//! parts inside a sequence must therefore be written as
//! `Parser::optional(..)` so that the stage always yields at least the
//! "absent" candidate, and any sequence used as an optional branch should
//! start with a token-consuming part.

use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use thiserror::Error;

/// What a terminal needs to know about a token.
pub trait Lexeme: Clone {
    fn text(&self) -> &str;
    fn is_word(&self) -> bool;
    fn is_number(&self) -> bool;
    fn is_quoted(&self) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError<T: fmt::Display> {
    #[error("unexpected token {0}")]
    Unexpected(T),

    #[error("token expected")]
    Exhausted,
}

/// A cursor plus output stack over a shared token list.
#[derive(Debug)]
pub struct Assembly<T, I> {
    tokens: Rc<[T]>,
    index: usize,
    stack: Vec<I>,
}

impl<T, I: Clone> Clone for Assembly<T, I> {
    fn clone(&self) -> Self {
        Self {
            tokens: Rc::clone(&self.tokens),
            index: self.index,
            stack: self.stack.clone(),
        }
    }
}

impl<T, I> Assembly<T, I> {
    pub fn new(tokens: impl Into<Rc<[T]>>) -> Self {
        Self {
            tokens: tokens.into(),
            index: 0,
            stack: Vec::new(),
        }
    }

    /// Index of the next unconsumed token.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn is_done(&self) -> bool {
        self.index >= self.tokens.len()
    }

    pub fn peek(&self) -> Option<&T> {
        self.tokens.get(self.index)
    }

    pub fn push(&mut self, item: I) {
        self.stack.push(item);
    }

    pub fn pop(&mut self) -> Option<I> {
        self.stack.pop()
    }

    /// Pops the top of the stack only if `pred` accepts it.
    pub fn pop_if(&mut self, pred: impl FnOnce(&I) -> bool) -> Option<I> {
        match self.stack.last() {
            Some(top) if pred(top) => self.stack.pop(),
            _ => None,
        }
    }

    pub fn stack(&self) -> &[I] {
        &self.stack
    }

    pub fn into_stack(self) -> Vec<I> {
        self.stack
    }

    fn advance(&mut self) {
        self.index = (self.index + 1).min(self.tokens.len());
    }
}

/// Semantic action run once per successful output assembly.
pub type Assembler<T, I> = Arc<dyn Fn(&mut Assembly<T, I>) + Send + Sync>;

type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// An immutable grammar node.
pub struct Parser<T: 'static, I: 'static> {
    kind: ParserKind<T, I>,
    assembler: Option<Assembler<T, I>>,
}

enum ParserKind<T: 'static, I: 'static> {
    Terminal { predicate: Predicate<T>, discard: bool },
    Sequence(Vec<Parser<T, I>>),
    Alternation(Vec<Parser<T, I>>),
    Repetition(Box<Parser<T, I>>),
    Empty,
    /// Late-bound reference used for recursive rules.
    Deferred(fn() -> &'static Parser<T, I>),
}

impl<T: 'static, I: 'static> fmt::Debug for Parser<T, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ParserKind::Terminal { discard, .. } => {
                f.debug_struct("Terminal").field("discard", discard).finish()
            }
            ParserKind::Sequence(parts) => f.debug_tuple("Sequence").field(parts).finish(),
            ParserKind::Alternation(choices) => {
                f.debug_tuple("Alternation").field(choices).finish()
            }
            ParserKind::Repetition(inner) => f.debug_tuple("Repetition").field(inner).finish(),
            ParserKind::Empty => write!(f, "Empty"),
            ParserKind::Deferred(_) => write!(f, "Deferred"),
        }
    }
}

impl<T: 'static, I: 'static> Parser<T, I> {
    fn from_kind(kind: ParserKind<T, I>) -> Self {
        Self {
            kind,
            assembler: None,
        }
    }

    /// Terminal accepting any single token `pred` approves of.
    pub fn terminal(pred: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        Self::from_kind(ParserKind::Terminal {
            predicate: Arc::new(pred),
            discard: false,
        })
    }

    pub fn sequence(parts: Vec<Parser<T, I>>) -> Self {
        Self::from_kind(ParserKind::Sequence(parts))
    }

    pub fn alternation(choices: Vec<Parser<T, I>>) -> Self {
        Self::from_kind(ParserKind::Alternation(choices))
    }

    pub fn repetition(inner: Parser<T, I>) -> Self {
        Self::from_kind(ParserKind::Repetition(Box::new(inner)))
    }

    pub fn empty() -> Self {
        Self::from_kind(ParserKind::Empty)
    }

    /// `inner` or nothing.
    pub fn optional(inner: Parser<T, I>) -> Self {
        Self::alternation(vec![inner, Self::empty()])
    }

    pub fn deferred(target: fn() -> &'static Parser<T, I>) -> Self {
        Self::from_kind(ParserKind::Deferred(target))
    }

    /// Consume the token without pushing it. Only affects terminals.
    pub fn discard(mut self) -> Self {
        if let ParserKind::Terminal { discard, .. } = &mut self.kind {
            *discard = true;
        }
        self
    }

    pub fn assemble(mut self, f: impl Fn(&mut Assembly<T, I>) + Send + Sync + 'static) -> Self {
        self.assembler = Some(Arc::new(f));
        self
    }
}

impl<T: Lexeme + 'static, I: 'static> Parser<T, I> {
    /// Case-insensitive exact match on the token text.
    pub fn literal(text: &str) -> Self {
        let text = text.to_string();
        Self::terminal(move |t: &T| !t.is_quoted() && t.text().eq_ignore_ascii_case(&text))
    }

    pub fn literal_case_sensitive(text: &str) -> Self {
        let text = text.to_string();
        Self::terminal(move |t: &T| !t.is_quoted() && t.text() == text)
    }

    /// Any one of `texts`, case-insensitively.
    pub fn one_of(texts: &[&str]) -> Self {
        let texts: Vec<String> = texts.iter().map(|s| s.to_string()).collect();
        Self::terminal(move |t: &T| {
            !t.is_quoted() && texts.iter().any(|s| t.text().eq_ignore_ascii_case(s))
        })
    }

    /// An identifier.
    pub fn word() -> Self {
        Self::terminal(|t: &T| t.is_word())
    }

    /// An identifier that is none of `reserved`.
    pub fn word_except(reserved: &'static [&'static str]) -> Self {
        Self::terminal(move |t: &T| {
            t.is_word() && !reserved.iter().any(|r| t.text().eq_ignore_ascii_case(r))
        })
    }

    pub fn number() -> Self {
        Self::terminal(|t: &T| t.is_number())
    }

    pub fn quoted() -> Self {
        Self::terminal(|t: &T| t.is_quoted())
    }
}

impl<T, I> Parser<T, I>
where
    T: Clone + fmt::Display + 'static,
    I: Clone + From<T> + 'static,
{
    /// Matches and then runs this node's assembler on every output.
    pub fn match_and_assemble(
        &self,
        ins: Vec<Assembly<T, I>>,
    ) -> Result<Vec<Assembly<T, I>>, MatchError<T>> {
        let mut outs = self.matches(ins)?;
        if let Some(assembler) = &self.assembler {
            for a in &mut outs {
                assembler(a);
            }
        }
        Ok(outs)
    }

    /// Matches without running this node's own assembler. Sub-parsers are
    /// always assembled.
    pub fn matches(&self, ins: Vec<Assembly<T, I>>) -> Result<Vec<Assembly<T, I>>, MatchError<T>> {
        match &self.kind {
            ParserKind::Terminal { predicate, discard } => Ok(ins
                .into_iter()
                .filter_map(|mut a| {
                    let token = a.peek().filter(|t| predicate(t))?.clone();
                    a.advance();
                    if !discard {
                        a.push(I::from(token));
                    }
                    Some(a)
                })
                .collect()),

            ParserKind::Sequence(parts) => {
                let mut current = ins;
                for (i, part) in parts.iter().enumerate() {
                    let failure = next_token_error(&current);
                    let next = part.match_and_assemble(current)?;
                    if next.is_empty() {
                        if i == 0 {
                            return Ok(next);
                        }
                        return Err(failure);
                    }
                    current = next;
                }
                Ok(current)
            }

            ParserKind::Alternation(choices) => {
                let mut outs = Vec::new();
                for choice in choices {
                    outs.extend(choice.match_and_assemble(ins.clone())?);
                }
                Ok(outs)
            }

            ParserKind::Repetition(inner) => {
                let mut outs = ins.clone();
                let mut current = ins;
                while !current.is_empty() {
                    let floor = current.iter().map(Assembly::index).min().unwrap_or(0);
                    // drop candidates that matched without consuming, or this never ends
                    current = inner
                        .match_and_assemble(current)?
                        .into_iter()
                        .filter(|a| a.index() > floor)
                        .collect();
                    outs.extend(current.iter().cloned());
                }
                Ok(outs)
            }

            ParserKind::Empty => Ok(ins),

            ParserKind::Deferred(target) => target().match_and_assemble(ins),
        }
    }

    /// Runs the grammar from `start` and returns the candidate that consumed
    /// the most tokens, first-seen on ties.
    pub fn best_match(&self, start: Assembly<T, I>) -> Result<Option<Assembly<T, I>>, MatchError<T>> {
        let outs = self.match_and_assemble(vec![start])?;
        let mut best: Option<Assembly<T, I>> = None;
        for a in outs {
            if best.as_ref().is_none_or(|b| a.index() > b.index()) {
                best = Some(a);
            }
        }
        Ok(best)
    }

    /// Like `best_match`, but the winner must have consumed every token.
    pub fn complete_match(&self, start: Assembly<T, I>) -> Result<Assembly<T, I>, MatchError<T>> {
        let first = start.peek().cloned();
        match self.best_match(start)? {
            Some(a) if a.is_done() => Ok(a),
            Some(a) => Err(match a.peek() {
                Some(t) => MatchError::Unexpected(t.clone()),
                None => MatchError::Exhausted,
            }),
            None => Err(match first {
                Some(t) => MatchError::Unexpected(t),
                None => MatchError::Exhausted,
            }),
        }
    }
}

/// Error naming the next token of the furthest-advanced candidate.
fn next_token_error<T: Clone + fmt::Display, I>(candidates: &[Assembly<T, I>]) -> MatchError<T> {
    let mut furthest: Option<&Assembly<T, I>> = None;
    for a in candidates {
        if furthest.is_none_or(|f| a.index() > f.index()) {
            furthest = Some(a);
        }
    }
    match furthest.and_then(Assembly::peek) {
        Some(t) => MatchError::Unexpected(t.clone()),
        None => MatchError::Exhausted,
    }
}
