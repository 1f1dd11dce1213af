//! `{{ path }}` substitution tags.

use serde_json::Value;
use stencil_rope::{FragmentId, Rope};

use crate::error::{ParseError, RenderError};
use crate::path;
use crate::token::{Token, TokenSpan, TokenType};

/// A `{{ path }}` tag. Renders the resolved value's text, or nothing on a
/// lookup miss.
#[derive(Debug, Clone)]
pub struct ExpressionToken {
    pub(crate) span: TokenSpan,
    expr: String,
}

impl TokenType for ExpressionToken {
    const START: &'static str = "{{";
    const END: &'static str = "}}";
    const PLACEHOLDER: &'static str = "<<<expr>>>";

    fn parse(span: TokenSpan, _rope: &mut Rope) -> Result<Token, ParseError> {
        let expr = span.interior().trim_matches(' ').to_string();
        if expr.contains('|') {
            return Err(ParseError::FilterNotSupported { expr });
        }
        Ok(Token::Expression(ExpressionToken { span, expr }))
    }
}

impl ExpressionToken {
    pub fn expr(&self) -> &str {
        &self.expr
    }

    fn value(&self, data: &Value) -> Result<String, RenderError> {
        Ok(path::eval(data, &self.expr)?.unwrap_or_default())
    }

    pub(crate) fn render(&self, data: &Value, rope: &mut Rope) -> Result<FragmentId, RenderError> {
        let value = self.value(data)?;
        rope.replace(self.span.entry, &value);
        Ok(self.span.entry)
    }

    pub(crate) fn duplicate(
        &self,
        data: &Value,
        rope: &mut Rope,
        after: FragmentId,
    ) -> Result<FragmentId, RenderError> {
        let value = self.value(data)?;
        Ok(rope.insert_after(after, &value))
    }

    pub(crate) fn clear(&self, rope: &mut Rope) {
        rope.replace(self.span.entry, "");
    }
}
