//! Template tokens: one sum type over the four tag kinds.
//!
//! Each kind declares its delimiters and placeholder through [`TokenType`]
//! and is built by its `parse` hook from a freshly spliced [`TokenSpan`].
//! The closed set keeps dispatch a plain `match`; the manager only needs
//! the start markers to find the next tag in the input.

use std::ops::Range;

use serde_json::Value;
use stencil_rope::{FragmentId, Rope, RopePosition};

use crate::block::TemplateBlock;
use crate::error::{ParseError, RenderError};
use crate::manager::TokenManager;

mod branch;
mod comment;
mod expression;
mod forloop;

pub use branch::{CondKind, IfCondition, IfToken};
pub use comment::CommentToken;
pub use expression::ExpressionToken;
pub use forloop::ForToken;

/// A token kind: its delimiters, its placeholder, and how to build an
/// instance once its span has been carved out of the input.
pub trait TokenType {
    const START: &'static str;
    const END: &'static str;
    /// Stands in for the tag when the parsed template is canonicalized.
    const PLACEHOLDER: &'static str;

    /// Build the token. `rope` is positioned with `span.entry` holding the
    /// full tag text; kinds with branches splice their entries here.
    fn parse(span: TokenSpan, rope: &mut Rope) -> Result<Token, ParseError>;
}

/// The rope footprint of a parsed tag.
#[derive(Debug, Clone)]
pub struct TokenSpan {
    /// Fragment that held the full tag text right after the parse splice.
    pub(crate) entry: FragmentId,
    /// The complete tag text, markers included.
    pub(crate) full: String,
    /// Byte range of `full` between the markers.
    pub(crate) interior: Range<usize>,
}

impl TokenSpan {
    /// The text between the start and end markers.
    pub fn interior(&self) -> &str {
        &self.full[self.interior.clone()]
    }

    pub fn entry(&self) -> FragmentId {
        self.entry
    }

    pub fn full(&self) -> &str {
        &self.full
    }
}

/// A parsed template tag.
#[derive(Debug, Clone)]
pub enum Token {
    Expression(ExpressionToken),
    If(IfToken),
    For(ForToken),
    Comment(CommentToken),
}

impl Token {
    pub fn span(&self) -> &TokenSpan {
        match self {
            Token::Expression(t) => &t.span,
            Token::If(t) => &t.span,
            Token::For(t) => &t.span,
            Token::Comment(t) => &t.span,
        }
    }

    pub fn entry(&self) -> FragmentId {
        self.span().entry
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            Token::Expression(_) => ExpressionToken::PLACEHOLDER,
            Token::If(_) => IfToken::PLACEHOLDER,
            Token::For(_) => ForToken::PLACEHOLDER,
            Token::Comment(_) => CommentToken::PLACEHOLDER,
        }
    }

    /// Number of sub-blocks whose bodies still need parsing.
    pub(crate) fn block_count(&self) -> usize {
        match self {
            Token::If(t) => t.branch_count(),
            Token::For(_) => 1,
            _ => 0,
        }
    }

    pub(crate) fn block(&self, i: usize) -> Option<&TemplateBlock> {
        match self {
            Token::If(t) => t.branch_block(i),
            Token::For(t) if i == 0 => Some(t.block()),
            _ => None,
        }
    }

    pub(crate) fn block_mut(&mut self, i: usize) -> Option<&mut TemplateBlock> {
        match self {
            Token::If(t) => t.branch_block_mut(i),
            Token::For(t) if i == 0 => Some(t.block_mut()),
            _ => None,
        }
    }

    /// Write this token's current value into its own fragments. Returns
    /// the last fragment written.
    pub(crate) fn render(
        &self,
        tokens: &TokenManager,
        data: &mut Value,
        rope: &mut Rope,
    ) -> Result<FragmentId, RenderError> {
        match self {
            Token::Expression(t) => t.render(data, rope),
            Token::If(t) => t.render(tokens, data, rope),
            Token::For(t) => t.render(tokens, data, rope),
            Token::Comment(t) => Ok(t.render(rope)),
        }
    }

    /// Stamp a fresh copy of this token's current value after `after`,
    /// leaving its own fragments untouched. Returns the last fragment of
    /// the copy.
    pub(crate) fn duplicate(
        &self,
        tokens: &TokenManager,
        data: &mut Value,
        rope: &mut Rope,
        after: FragmentId,
    ) -> Result<FragmentId, RenderError> {
        match self {
            Token::Expression(t) => t.duplicate(data, rope, after),
            Token::If(t) => t.duplicate(tokens, data, rope, after),
            Token::For(t) => t.duplicate(tokens, data, rope, after),
            Token::Comment(t) => Ok(t.duplicate(after)),
        }
    }

    /// Blank out every fragment this token owns, preserving identity.
    pub(crate) fn clear(&self, tokens: &TokenManager, rope: &mut Rope) {
        match self {
            Token::Expression(t) => t.clear(rope),
            Token::If(t) => t.clear(tokens, rope),
            Token::For(t) => t.clear(tokens, rope),
            Token::Comment(t) => t.clear(rope),
        }
    }
}

/// Advance past a balanced `start`/`end` marker pair. `text` must begin
/// right after an opening `start`; returns the text after the matching
/// `end`.
pub(crate) fn skip_nested<'a>(
    mut text: &'a str,
    start: &'static str,
    end: &'static str,
) -> Result<&'a str, ParseError> {
    let mut depth = 1usize;
    while depth > 0 {
        match (text.find(start), text.find(end)) {
            (Some(s), Some(e)) if s < e => {
                depth += 1;
                text = &text[s + start.len()..];
            }
            (_, Some(e)) => {
                depth -= 1;
                text = &text[e + end.len()..];
            }
            _ => return Err(ParseError::Unterminated { start, end }),
        }
    }
    Ok(text)
}

/// Strip at most one leading line terminator.
pub(crate) fn trim_one_newline(body: &str) -> &str {
    if let Some(rest) = body.strip_prefix("\r\n") {
        rest
    } else if let Some(rest) = body.strip_prefix('\n') {
        rest
    } else if let Some(rest) = body.strip_prefix('\r') {
        rest
    } else {
        body
    }
}

/// Carve the next tag out of `rem` and splice the rope in lockstep.
///
/// `rem` must start at the tag's `start` marker and `pos` must name the
/// fragment holding exactly that remaining text. On return the fragment
/// holds just the full tag text, the unparsed remainder lives in a fresh
/// fragment right after it, and `rem`/`pos` point at that remainder.
pub(crate) fn parse_span(
    start: &'static str,
    end: &'static str,
    rem: &mut &str,
    pos: &mut RopePosition,
    rope: &mut Rope,
) -> Result<TokenSpan, ParseError> {
    debug_assert!(rem.starts_with(start));
    let after = skip_nested(&rem[start.len()..], start, end)?;
    let mut full_len = rem.len() - after.len();
    let interior = start.len()..full_len - end.len();
    // a tag ending its line absorbs the line terminator that follows it
    if rem[interior.clone()].ends_with(['\n', '\r']) {
        let rest = &rem[full_len..];
        if rest.starts_with("\r\n") {
            full_len += 2;
        } else if rest.starts_with('\n') || rest.starts_with('\r') {
            full_len += 1;
        }
    }
    let full = rem[..full_len].to_string();
    let entry = rope.replace_range(pos.fragment, pos.offset, full.len(), &full);
    *rem = &rem[full_len..];
    if !rem.is_empty() {
        pos.fragment = rope.next(entry).unwrap_or(entry);
        pos.offset = 0;
    }
    Ok(TokenSpan {
        entry,
        full,
        interior,
    })
}
