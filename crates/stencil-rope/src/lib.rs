//! A splice-able sequence of text fragments with stable identifiers.
//!
//! The rope is the render buffer of the stencil template engine: parsing
//! carves a template into fragments, and rendering overwrites individual
//! fragments in place without shifting or invalidating the rest. A
//! [`FragmentId`] stays valid for the lifetime of the rope no matter how
//! the surrounding fragments are edited, so a parsed template can be
//! re-rendered against new data by rewriting only the fragments that
//! carry values.
//!
//! There is no deletion primitive. Logical removal is modeled by replacing
//! a fragment's content with the empty string, which preserves its
//! identity for a later re-render.
//!
//! # Example
//!
//! ```
//! use stencil_rope::Rope;
//!
//! let mut rope = Rope::new();
//! let id = rope.append("hello world");
//! let rest = rope.split(id, 5);
//! rope.replace(id, "goodbye");
//! assert_eq!(rope.flattened(), "goodbye world");
//! assert_eq!(rope.sub(rest, 0), " world");
//! ```

mod rope;

pub use rope::{FragmentId, Rope, RopePosition};
