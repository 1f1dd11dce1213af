//! The token registry and store.
//!
//! Every token kind gets its own pool in a shared [`PoolCollection`], so a
//! token's identifier carries its kind in the top bits and its slot in the
//! rest. Tokens are claimed during one parse and live until the whole
//! engine is dropped; nothing is released in between.

use stencil_pool::{PoolCollection, PoolError};
use stencil_rope::{Rope, RopePosition};

use crate::error::ParseError;
use crate::token::{
    parse_span, CommentToken, ExpressionToken, ForToken, IfToken, Token, TokenSpan, TokenType,
};

/// Upper bound on registered token kinds.
pub const MAX_TOKEN_KINDS: usize = 32;

const TOKEN_PAGE_SIZE: usize = 256;

type TokenPools = PoolCollection<Token, MAX_TOKEN_KINDS>;

/// Opaque identifier of a token inside a [`TokenManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenId(usize);

#[derive(Debug, Clone, Copy)]
struct VariantSpec {
    start: &'static str,
    end: &'static str,
    parse: fn(TokenSpan, &mut Rope) -> Result<Token, ParseError>,
}

/// Registry of token kinds plus the pooled storage for their instances.
#[derive(Debug, Default)]
pub struct TokenManager {
    pools: TokenPools,
    variants: Vec<VariantSpec>,
}

impl TokenManager {
    pub fn new() -> Self {
        Self {
            pools: PoolCollection::new(),
            variants: Vec::new(),
        }
    }

    /// A manager with the four built-in tag kinds registered.
    pub fn with_known_tokens() -> Result<Self, PoolError> {
        let mut mgr = Self::new();
        mgr.register::<ExpressionToken>()?;
        mgr.register::<IfToken>()?;
        mgr.register::<ForToken>()?;
        mgr.register::<CommentToken>()?;
        Ok(mgr)
    }

    /// Register a token kind; returns its variant index. Fatal once
    /// [`MAX_TOKEN_KINDS`] kinds exist.
    pub fn register<T: TokenType>(&mut self) -> Result<usize, PoolError> {
        let pool = self.pools.add_pool(TOKEN_PAGE_SIZE)?;
        debug_assert_eq!(pool, self.variants.len());
        self.variants.push(VariantSpec {
            start: T::START,
            end: T::END,
            parse: T::parse,
        });
        Ok(pool)
    }

    pub fn num_kinds(&self) -> usize {
        self.variants.len()
    }

    /// Number of tokens claimed so far.
    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    pub fn get(&self, id: TokenId) -> &Token {
        self.pools.get(id.0)
    }

    pub fn get_mut(&mut self, id: TokenId) -> &mut Token {
        self.pools.get_mut(id.0)
    }

    /// Release a run of `n` tokens starting at `id`, following the owning
    /// pool's stack discipline (a non-tail run stays claimed).
    pub fn release(&mut self, id: TokenId, n: usize) {
        self.pools.release(id.0, n);
    }

    /// Every live token across all kinds, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.pools.iter()
    }

    /// Position and variant of the earliest tag start marker in `rem`.
    pub(crate) fn next_start(&self, rem: &str) -> Option<(usize, usize)> {
        let mut best: Option<(usize, usize)> = None;
        for (variant, spec) in self.variants.iter().enumerate() {
            if let Some(at) = rem.find(spec.start) {
                if best.map_or(true, |(b, _)| at < b) {
                    best = Some((at, variant));
                }
            }
        }
        best
    }

    /// Carve the tag at the head of `rem` into a new token of `variant`.
    pub(crate) fn parse_token(
        &mut self,
        variant: usize,
        rem: &mut &str,
        pos: &mut RopePosition,
        rope: &mut Rope,
    ) -> Result<TokenId, ParseError> {
        let spec = self.variants[variant];
        let span = parse_span(spec.start, spec.end, rem, pos, rope)?;
        let token = (spec.parse)(span, rope)?;
        Ok(TokenId(self.pools.claim(variant, token)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_tokens_register_in_order() {
        let mgr = TokenManager::with_known_tokens().unwrap();
        assert_eq!(mgr.num_kinds(), 4);
        assert!(mgr.is_empty());
    }

    #[test]
    fn registration_overflow_is_fatal() {
        let mut mgr = TokenManager::new();
        for _ in 0..MAX_TOKEN_KINDS {
            mgr.register::<CommentToken>().unwrap();
        }
        assert!(matches!(
            mgr.register::<CommentToken>(),
            Err(PoolError::TooManyPools { .. })
        ));
    }

    #[test]
    fn next_start_picks_the_earliest_marker() {
        let mgr = TokenManager::with_known_tokens().unwrap();
        assert_eq!(mgr.next_start("a {# c #} {{x}}"), Some((2, 3)));
        assert_eq!(mgr.next_start("{{x}} {% if a %}"), Some((0, 0)));
        assert_eq!(mgr.next_start("{% for v in s %}"), Some((0, 2)));
        assert_eq!(mgr.next_start("no tags here"), None);
    }

    fn claim_tag(mgr: &mut TokenManager, rope: &mut Rope, variant: usize, text: &str) -> TokenId {
        let entry = rope.append(text);
        let mut pos = RopePosition {
            fragment: entry,
            offset: 0,
        };
        let mut rem = text;
        mgr.parse_token(variant, &mut rem, &mut pos, rope).unwrap()
    }

    #[test]
    fn parse_token_claims_into_the_variant_pool() {
        let mut mgr = TokenManager::with_known_tokens().unwrap();
        let mut rope = Rope::new();
        let id = claim_tag(&mut mgr, &mut rope, 0, "{{foo}}");
        assert_eq!(mgr.len(), 1);
        assert!(matches!(mgr.get(id), Token::Expression(_)));
        assert_eq!(mgr.get(id).span().full(), "{{foo}}");
    }

    #[test]
    fn iter_walks_kinds_in_registration_order() {
        let mut mgr = TokenManager::with_known_tokens().unwrap();
        let mut rope = Rope::new();
        claim_tag(&mut mgr, &mut rope, 3, "{# c #}");
        claim_tag(&mut mgr, &mut rope, 0, "{{a}}");
        let kinds: Vec<&str> = mgr.iter().map(Token::placeholder).collect();
        assert_eq!(kinds, vec!["<<<expr>>>", "<<<cmt>>>"]);
    }

    #[test]
    fn release_reclaims_only_the_pool_tail() {
        let mut mgr = TokenManager::with_known_tokens().unwrap();
        let mut rope = Rope::new();
        let a = claim_tag(&mut mgr, &mut rope, 0, "{{a}}");
        let b = claim_tag(&mut mgr, &mut rope, 0, "{{b}}");
        mgr.release(a, 1); // non-tail: no-op
        assert_eq!(mgr.len(), 2);
        mgr.release(b, 1);
        assert_eq!(mgr.len(), 1);
        assert_eq!(mgr.get(a).span().full(), "{{a}}");
        mgr.release(a, 1);
        assert!(mgr.is_empty());
    }
}
