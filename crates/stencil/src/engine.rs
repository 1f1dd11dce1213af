//! The engine: one parse, any number of renders.

use serde_json::Value;
use stencil_rope::Rope;

use crate::block::{parse_block_parts, Part, TemplateBlock};
use crate::error::{ParseError, RenderError};
use crate::manager::TokenManager;

/// A parsed template.
///
/// Parsing splits the template into a rope of fragments and a tree of
/// tokens; rendering stamps values into a fresh copy of that rope, so the
/// parsed state is never consumed and the same engine re-renders new data
/// without re-parsing.
#[derive(Debug)]
pub struct Engine {
    tokens: TokenManager,
    rope: Rope,
    root: TemplateBlock,
}

impl Engine {
    /// Parse `template` into a reusable engine.
    pub fn parse(template: &str) -> Result<Self, ParseError> {
        let mut tokens = TokenManager::with_known_tokens()?;
        let mut rope = Rope::new();
        let entry = rope.append(template);
        let mut root = TemplateBlock::new(entry, template.to_string());
        let parts = parse_block_parts(&mut tokens, &mut rope, template, entry)?;
        root.set_parts(parts);
        Ok(Self { tokens, rope, root })
    }

    /// Render against `data` into `rope`, which is overwritten with a
    /// fresh copy of the parsed rope. `data` is never modified; loop
    /// bindings live in a private copy.
    pub fn render(&self, data: &Value, rope: &mut Rope) -> Result<(), RenderError> {
        *rope = self.rope.clone();
        let mut scratch = data.clone();
        self.root.render(&self.tokens, &mut scratch, rope)?;
        Ok(())
    }

    /// Render and flatten in one call.
    pub fn render_to_string(&self, data: &Value) -> Result<String, RenderError> {
        let mut rope = Rope::new();
        self.render(data, &mut rope)?;
        Ok(rope.flattened())
    }

    /// The template with every top-level tag collapsed to its kind's
    /// placeholder, e.g. `foo is <<<expr>>>`.
    pub fn placeholder_text(&self) -> String {
        let mut rope = self.rope.clone();
        for part in self.root.parts() {
            if let Part::Token(id) = part {
                let token = self.tokens.get(*id);
                token.clear(&self.tokens, &mut rope);
                rope.replace(token.entry(), token.placeholder());
            }
        }
        rope.flattened()
    }

    /// Number of tokens the parse produced, nested ones included.
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }
}
