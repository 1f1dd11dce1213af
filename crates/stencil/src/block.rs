//! Template blocks: ordered runs of literal text and child tokens.
//!
//! A block never owns its child tokens; it references them by identifier
//! through the shared [`TokenManager`], which is what keeps the
//! block/token graph acyclic.

use serde_json::Value;
use stencil_rope::{FragmentId, Rope, RopePosition};

use crate::error::{ParseError, RenderError};
use crate::manager::{TokenId, TokenManager};

/// One part of a block: a literal-text fragment it owns, or a child token
/// referenced by identifier.
#[derive(Debug, Clone)]
pub(crate) enum Part {
    Text { fragment: FragmentId, body: String },
    Token(TokenId),
}

/// An ordered parts list covering one contiguous region of template text.
#[derive(Debug, Clone)]
pub(crate) struct TemplateBlock {
    entry: FragmentId,
    body: String,
    parts: Vec<Part>,
}

impl TemplateBlock {
    pub fn new(entry: FragmentId, body: String) -> Self {
        Self {
            entry,
            body,
            parts: Vec::new(),
        }
    }

    pub fn entry(&self) -> FragmentId {
        self.entry
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn set_parts(&mut self, parts: Vec<Part>) {
        self.parts = parts;
    }

    /// Write this block's content into the rope. Returns the last fragment
    /// written, which is where a following duplicate attaches.
    pub fn render(
        &self,
        tokens: &TokenManager,
        data: &mut Value,
        rope: &mut Rope,
    ) -> Result<Option<FragmentId>, RenderError> {
        let mut last = None;
        for part in &self.parts {
            match part {
                Part::Text { fragment, body } => {
                    rope.replace(*fragment, body);
                    last = Some(*fragment);
                }
                Part::Token(id) => {
                    last = Some(tokens.get(*id).render(tokens, data, rope)?);
                }
            }
        }
        Ok(last)
    }

    /// Stamp a copy of this block's content after `after`, leaving its own
    /// fragments untouched. Returns the last fragment of the copy.
    pub fn duplicate(
        &self,
        tokens: &TokenManager,
        data: &mut Value,
        rope: &mut Rope,
        after: FragmentId,
    ) -> Result<FragmentId, RenderError> {
        let mut last = after;
        for part in &self.parts {
            match part {
                Part::Text { body, .. } => {
                    last = rope.insert_after(last, body);
                }
                Part::Token(id) => {
                    last = tokens.get(*id).duplicate(tokens, data, rope, last)?;
                }
            }
        }
        Ok(last)
    }

    /// Blank out every fragment this block and its children own.
    pub fn clear(&self, tokens: &TokenManager, rope: &mut Rope) {
        for part in &self.parts {
            match part {
                Part::Text { fragment, .. } => rope.replace(*fragment, ""),
                Part::Token(id) => tokens.get(*id).clear(tokens, rope),
            }
        }
    }
}

/// Tokenize `body` into a parts list, splicing the rope in lockstep so
/// every part ends up owning its own fragment. `entry` must be the
/// fragment covering `body`'s region of the rope.
pub(crate) fn parse_block_parts(
    tokens: &mut TokenManager,
    rope: &mut Rope,
    body: &str,
    entry: FragmentId,
) -> Result<Vec<Part>, ParseError> {
    rope.replace(entry, body);
    let mut parts = Vec::new();
    let mut pos = RopePosition {
        fragment: entry,
        offset: 0,
    };
    let mut curr = body;
    let mut rem = body;
    loop {
        match tokens.next_start(rem) {
            None => {
                rope.replace(pos.fragment, rem);
                parts.push(Part::Text {
                    fragment: pos.fragment,
                    body: rem.to_string(),
                });
                break;
            }
            Some((at, variant)) => {
                rem = &rem[at..];
                let prefix = curr.len() - rem.len();
                if prefix > 0 {
                    parts.push(Part::Text {
                        fragment: pos.fragment,
                        body: curr[..prefix].to_string(),
                    });
                    let rest = rope.split(pos.fragment, prefix);
                    pos = RopePosition {
                        fragment: rest,
                        offset: 0,
                    };
                }
                rope.replace(pos.fragment, rem);
                let id = tokens.parse_token(variant, &mut rem, &mut pos, rope)?;
                parse_token_blocks(tokens, rope, id)?;
                parts.push(Part::Token(id));
                curr = rem;
                if rem.is_empty() {
                    break;
                }
            }
        }
    }
    Ok(parts)
}

/// Recurse into a freshly parsed token's sub-blocks, tokenizing each body
/// the same way.
fn parse_token_blocks(
    tokens: &mut TokenManager,
    rope: &mut Rope,
    id: TokenId,
) -> Result<(), ParseError> {
    let count = tokens.get(id).block_count();
    for i in 0..count {
        let (entry, body) = match tokens.get(id).block(i) {
            Some(block) => (block.entry(), block.body().to_string()),
            None => continue,
        };
        let parts = parse_block_parts(tokens, rope, &body, entry)?;
        if let Some(block) = tokens.get_mut(id).block_mut(i) {
            block.set_parts(parts);
        }
    }
    Ok(())
}
