//! `{# ... #}` comment tags. Parsed so their text leaves the output, then
//! inert.

use stencil_rope::{FragmentId, Rope};

use crate::error::ParseError;
use crate::token::{Token, TokenSpan, TokenType};

#[derive(Debug, Clone)]
pub struct CommentToken {
    pub(crate) span: TokenSpan,
}

impl TokenType for CommentToken {
    const START: &'static str = "{#";
    const END: &'static str = "#}";
    const PLACEHOLDER: &'static str = "<<<cmt>>>";

    fn parse(span: TokenSpan, _rope: &mut Rope) -> Result<Token, ParseError> {
        Ok(Token::Comment(CommentToken { span }))
    }
}

impl CommentToken {
    pub(crate) fn render(&self, rope: &mut Rope) -> FragmentId {
        rope.replace(self.span.entry, "");
        self.span.entry
    }

    /// A comment stamps nothing; the copy continues at the incoming
    /// fragment.
    pub(crate) fn duplicate(&self, after: FragmentId) -> FragmentId {
        after
    }

    pub(crate) fn clear(&self, rope: &mut Rope) {
        rope.replace(self.span.entry, "");
    }
}
