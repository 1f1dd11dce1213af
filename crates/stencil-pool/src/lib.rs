//! Paged object pools with bit-packed identifiers.
//!
//! A [`Pool`] is a growable arena of slots that grows page by page and
//! never moves a slot once it has been claimed, so indices stay valid for
//! the pool's whole lifetime. A [`PoolCollection`] groups up to a fixed
//! number of pools and addresses every slot with a single packed
//! identifier: the pool index in the top bits, the slot index in the rest.
//!
//! `release` follows stack discipline: only the most recently claimed run
//! is reclaimed, anything else is a deliberate no-op. The intended
//! workload claims during one parse and holds everything until the whole
//! session is dropped, so a general free list would buy nothing.
//!
//! # Example
//!
//! ```
//! use stencil_pool::PoolCollection;
//!
//! let mut pools: PoolCollection<&str, 8> = PoolCollection::new();
//! let strings = pools.add_pool(16).unwrap();
//! let id = pools.claim(strings, "hello");
//! assert_eq!(*pools.get(id), "hello");
//! let (pool, slot) = PoolCollection::<&str, 8>::decode(id);
//! assert_eq!((pool, slot), (strings, 0));
//! ```

mod collection;
mod error;
mod pool;

pub use collection::PoolCollection;
pub use error::{PoolError, Result};
pub use pool::Pool;
