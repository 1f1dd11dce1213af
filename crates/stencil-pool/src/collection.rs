//! A fixed-capacity group of pools sharing one identifier space.

use crate::error::{PoolError, Result};
use crate::pool::Pool;

/// Minimum bit width that addresses every pool index up to `max - 1`.
const fn pool_bits(max_pools: usize) -> u32 {
    let top = max_pools - 1;
    if top == 0 {
        1
    } else {
        usize::BITS - top.leading_zeros()
    }
}

/// Up to `MAX_POOLS` pools addressed through one packed identifier.
///
/// An identifier is `(pool << POOL_SHIFT) | slot`: the pool index sits in
/// the topmost bits, the slot index in the rest. For every valid pair,
/// `decode(encode(pool, slot)) == (pool, slot)`.
#[derive(Debug)]
pub struct PoolCollection<T, const MAX_POOLS: usize> {
    pools: Vec<Pool<T>>,
}

impl<T, const MAX_POOLS: usize> Default for PoolCollection<T, MAX_POOLS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const MAX_POOLS: usize> PoolCollection<T, MAX_POOLS> {
    /// Bits reserved for the pool index.
    pub const POOL_BITS: u32 = pool_bits(MAX_POOLS);
    /// Bits available for the slot index.
    pub const POOL_SHIFT: u32 = usize::BITS - Self::POOL_BITS;
    /// Mask selecting the pool bits of an identifier.
    pub const POOL_MASK: usize = ((1usize << Self::POOL_BITS) - 1) << Self::POOL_SHIFT;
    /// Mask selecting the slot bits of an identifier.
    pub const SLOT_MASK: usize = !Self::POOL_MASK;

    pub fn new() -> Self {
        Self { pools: Vec::new() }
    }

    /// Pack a (pool, slot) pair into one identifier.
    pub fn encode(pool: usize, slot: usize) -> usize {
        debug_assert!(pool < MAX_POOLS);
        debug_assert!(slot & Self::POOL_MASK == 0, "slot index overflows the id");
        (pool << Self::POOL_SHIFT) | slot
    }

    /// Unpack an identifier into its (pool, slot) pair.
    pub fn decode(id: usize) -> (usize, usize) {
        (Self::decode_pool(id), Self::decode_slot(id))
    }

    pub fn decode_pool(id: usize) -> usize {
        (id & Self::POOL_MASK) >> Self::POOL_SHIFT
    }

    pub fn decode_slot(id: usize) -> usize {
        id & Self::SLOT_MASK
    }

    /// Register a new pool with the given page size; returns its index.
    pub fn add_pool(&mut self, page_size: usize) -> Result<usize> {
        if self.pools.len() == MAX_POOLS {
            return Err(PoolError::TooManyPools { max: MAX_POOLS });
        }
        if page_size == 0 || !page_size.is_power_of_two() {
            return Err(PoolError::InvalidPageSize { page_size });
        }
        self.pools.push(Pool::new(page_size));
        Ok(self.pools.len() - 1)
    }

    pub fn num_pools(&self) -> usize {
        self.pools.len()
    }

    /// Total claimed slots across all pools.
    pub fn len(&self) -> usize {
        self.pools.iter().map(Pool::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn pool(&self, pool: usize) -> &Pool<T> {
        &self.pools[pool]
    }

    /// Claim one slot in `pool` holding `value`; returns its packed id.
    pub fn claim(&mut self, pool: usize, value: T) -> usize {
        let slot = self.pools[pool].claim(value);
        Self::encode(pool, slot)
    }

    /// Release a run of `n` slots starting at the packed `id`. Follows the
    /// owning pool's stack discipline.
    pub fn release(&mut self, id: usize, n: usize) {
        let (pool, slot) = Self::decode(id);
        self.pools[pool].release(slot, n);
    }

    pub fn get(&self, id: usize) -> &T {
        let (pool, slot) = Self::decode(id);
        self.pools[pool].get(slot)
    }

    pub fn get_mut(&mut self, id: usize) -> &mut T {
        let (pool, slot) = Self::decode(id);
        self.pools[pool].get_mut(slot)
    }

    /// Every claimed slot across all pools, in pool order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.pools.iter().flat_map(Pool::iter)
    }
}
