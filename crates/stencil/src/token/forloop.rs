//! `{% for var in path %}` loop tags.

use serde_json::{Map, Value};
use stencil_rope::{FragmentId, Rope};

use crate::block::TemplateBlock;
use crate::error::{ParseError, RenderError};
use crate::manager::TokenManager;
use crate::path::{self, Resolved};
use crate::token::{trim_one_newline, Token, TokenSpan, TokenType};

/// Reserved name of the per-iteration metadata binding.
const LOOP_KEY: &str = "loop";

/// A `{% for v in seq %}body{% endfor %}` tag.
///
/// The first element renders the body in place; every further element
/// stamps a duplicate after the previous element's last fragment. Each
/// iteration binds the loop variable and a `loop` metadata map into the
/// data root and removes both afterwards.
#[derive(Debug, Clone)]
pub struct ForToken {
    pub(crate) span: TokenSpan,
    var: String,
    collection: String,
    body: TemplateBlock,
}

impl TokenType for ForToken {
    const START: &'static str = "{% for ";
    const END: &'static str = "{% endfor %}";
    const PLACEHOLDER: &'static str = "<<<for>>>";

    fn parse(span: TokenSpan, _rope: &mut Rope) -> Result<Token, ParseError> {
        let interior = span.interior();
        let in_at = interior.find(" in ").ok_or(ParseError::ForMissingIn)?;
        let var = interior[..in_at].trim_matches(' ').to_string();
        let rest = &interior[in_at + 4..];
        // the collection path ends at the first space, which must open the
        // header's closing ` %}`
        let space = rest.find(' ').ok_or_else(|| ParseError::MalformedFor {
            reason: "loop header is missing its closing `%}`".to_string(),
        })?;
        let collection = rest[..space].to_string();
        let rest = &rest[space..];
        if !rest.starts_with(" %}") {
            return Err(ParseError::MalformedFor {
                reason: "unexpected text after the collection path".to_string(),
            });
        }
        if var.is_empty() || collection.is_empty() {
            return Err(ParseError::MalformedFor {
                reason: "empty loop variable or collection path".to_string(),
            });
        }
        let body = trim_one_newline(&rest[3..]).to_string();
        Ok(Token::For(ForToken {
            var,
            collection,
            body: TemplateBlock::new(span.entry, body),
            span,
        }))
    }
}

impl ForToken {
    pub fn var(&self) -> &str {
        &self.var
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub(crate) fn block(&self) -> &TemplateBlock {
        &self.body
    }

    pub(crate) fn block_mut(&mut self) -> &mut TemplateBlock {
        &mut self.body
    }

    pub(crate) fn render(
        &self,
        tokens: &TokenManager,
        data: &mut Value,
        rope: &mut Rope,
    ) -> Result<FragmentId, RenderError> {
        self.run(tokens, data, rope, None)
    }

    pub(crate) fn duplicate(
        &self,
        tokens: &TokenManager,
        data: &mut Value,
        rope: &mut Rope,
        after: FragmentId,
    ) -> Result<FragmentId, RenderError> {
        self.run(tokens, data, rope, Some(after))
    }

    pub(crate) fn clear(&self, tokens: &TokenManager, rope: &mut Rope) {
        self.body.clear(tokens, rope);
    }

    /// Shared render/duplicate walk. `after` is `None` when the first
    /// element may render into the body's own fragments.
    fn run(
        &self,
        tokens: &TokenManager,
        data: &mut Value,
        rope: &mut Rope,
        after: Option<FragmentId>,
    ) -> Result<FragmentId, RenderError> {
        let items: Vec<Value> = match path::resolve(data, &self.collection)? {
            Some(Resolved::Node(Value::Array(items))) => items.clone(),
            Some(Resolved::Node(Value::Object(map))) => map.values().cloned().collect(),
            _ => Vec::new(),
        };
        let length = items.len();
        let mut last = after;
        for (index, item) in items.into_iter().enumerate() {
            self.bind(data, item, index, length)?;
            let rendered = match last {
                None => self.body.render(tokens, data, rope),
                Some(prev) => self.body.duplicate(tokens, data, rope, prev).map(Some),
            };
            self.unbind(data);
            if let Some(frag) = rendered? {
                last = Some(frag);
            }
        }
        match last {
            Some(frag) => Ok(frag),
            None => {
                // absent or empty collection: nothing to show
                self.body.clear(tokens, rope);
                Ok(self.span.entry)
            }
        }
    }

    /// Insert the loop variable and `loop` metadata into the data root.
    /// Colliding with an existing entry is fatal, never silent shadowing.
    fn bind(
        &self,
        data: &mut Value,
        item: Value,
        index: usize,
        length: usize,
    ) -> Result<(), RenderError> {
        let root = data.as_object_mut().ok_or(RenderError::BindRootNotMap)?;
        if root.contains_key(&self.var) {
            return Err(RenderError::NameCollision {
                name: self.var.clone(),
            });
        }
        if root.contains_key(LOOP_KEY) {
            return Err(RenderError::NameCollision {
                name: LOOP_KEY.to_string(),
            });
        }
        let mut meta = Map::new();
        meta.insert("index".to_string(), Value::from(index));
        meta.insert("length".to_string(), Value::from(length));
        meta.insert("revindex".to_string(), Value::from(length - index - 1));
        meta.insert("first".to_string(), Value::Bool(index == 0));
        meta.insert("last".to_string(), Value::Bool(index + 1 == length));
        meta.insert("odd".to_string(), Value::Bool(index % 2 == 1));
        meta.insert("even".to_string(), Value::Bool(index % 2 == 0));
        root.insert(self.var.clone(), item);
        root.insert(LOOP_KEY.to_string(), Value::Object(meta));
        Ok(())
    }

    fn unbind(&self, data: &mut Value) {
        if let Some(root) = data.as_object_mut() {
            root.remove(&self.var);
            root.remove(LOOP_KEY);
        }
    }
}
