//! Property tests for pool identifier packing and claim/release behavior.

use proptest::prelude::*;
use stencil_pool::{Pool, PoolCollection};

const MAX_POOLS: usize = 32;
type Col = PoolCollection<usize, MAX_POOLS>;

proptest! {
    /// encode and decode are inverses for any in-range pair.
    #[test]
    fn encode_decode_inverse(pool in 0..MAX_POOLS, slot in 0usize..1_000_000) {
        let id = Col::encode(pool, slot);
        prop_assert_eq!(Col::decode(id), (pool, slot));
    }

    /// Claimed values are retrievable through their packed ids, regardless
    /// of the order pools were claimed from.
    #[test]
    fn claims_round_trip(
        assignments in prop::collection::vec((0usize..4, any::<usize>()), 0..64)
    ) {
        let mut col: Col = PoolCollection::new();
        for _ in 0..4 {
            col.add_pool(8).unwrap();
        }
        let mut claimed = Vec::new();
        for (pool, value) in assignments {
            claimed.push((col.claim(pool, value), value));
        }
        for (id, value) in claimed {
            prop_assert_eq!(*col.get(id), value);
        }
    }

    /// A pool's length only shrinks when the released run is the tail.
    #[test]
    fn release_respects_stack_order(
        count in 1usize..40,
        release_at in 0usize..40,
    ) {
        let mut pool = Pool::new(8);
        for i in 0..count {
            pool.claim(i);
        }
        pool.release(release_at, 1);
        if release_at + 1 == count {
            prop_assert_eq!(pool.len(), count - 1);
        } else {
            prop_assert_eq!(pool.len(), count);
        }
    }

    /// Indices stay dense however claims are batched into runs.
    #[test]
    fn runs_issue_dense_indices(runs in prop::collection::vec(1usize..8, 1..16)) {
        let mut pool = Pool::new(8);
        let mut expected = 0;
        for n in runs {
            let id = pool.claim_with(n, || 0u8);
            prop_assert_eq!(id, expected);
            expected += n;
        }
        prop_assert_eq!(pool.len(), expected);
    }
}
