//! A tag-based template engine that renders in place over a fragment
//! rope.
//!
//! Templates mix literal text with four tag kinds: `{{ path }}`
//! substitutions, `{% if %}`/`{% elif %}`/`{% else %}` branches,
//! `{% for %}` loops and `{# comments #}`. [`Engine::parse`] splits the
//! template once into a rope of stable fragments and a token tree; every
//! [`Engine::render`] stamps values from a [`serde_json::Value`] tree into
//! a fresh copy of that rope, so one parse serves any number of renders.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use stencil::Engine;
//!
//! let engine = Engine::parse("foo is {{foo}}").unwrap();
//! assert_eq!(engine.render_to_string(&json!({"foo": 1})).unwrap(), "foo is 1");
//! assert_eq!(engine.render_to_string(&json!({"foo": 2})).unwrap(), "foo is 2");
//! ```

mod block;
mod engine;
mod error;
mod manager;
mod path;
mod token;

pub use engine::Engine;
pub use error::{ParseError, RenderError};
pub use manager::{TokenId, TokenManager, MAX_TOKEN_KINDS};
pub use path::{MAP_SENTINEL, SEQ_SENTINEL};
pub use token::{
    CommentToken, CondKind, ExpressionToken, ForToken, IfCondition, IfToken, Token, TokenSpan,
    TokenType,
};

pub use stencil_rope::{FragmentId, Rope, RopePosition};
