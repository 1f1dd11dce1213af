//! A paged, non-relocating arena of slots.

/// Default page size, in slots.
pub const DEFAULT_PAGE_SIZE: usize = 256;

#[derive(Debug)]
struct Page<T> {
    /// Slot index of the first entry in this page.
    start: usize,
    slots: Vec<T>,
}

/// A growable arena of fixed-type slots.
///
/// Storage grows by pages of a power-of-two size; a page's buffer is
/// reserved up front and never reallocated, so a claimed slot keeps its
/// address for the pool's whole lifetime. Slot indices are issued densely
/// starting at zero and are never reused except under the stack-ordered
/// [`release`](Pool::release).
#[derive(Debug)]
pub struct Pool<T> {
    pages: Vec<Page<T>>,
    page_size: usize,
    len: usize,
}

impl<T> Pool<T> {
    /// Create a pool with the given page size (a nonzero power of two).
    pub fn new(page_size: usize) -> Self {
        assert!(
            page_size > 0 && page_size.is_power_of_two(),
            "page size must be a nonzero power of two, got {page_size}"
        );
        Self {
            pages: Vec::new(),
            page_size,
            len: 0,
        }
    }

    /// Number of claimed slots.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total reserved slots across all pages.
    pub fn capacity(&self) -> usize {
        self.pages.iter().map(|p| p.slots.capacity()).sum()
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Claim one slot holding `value`; returns its index.
    pub fn claim(&mut self, value: T) -> usize {
        let id = self.len;
        self.page_with_room(1).slots.push(value);
        self.len += 1;
        id
    }

    /// Claim `n` contiguous slots, filling them from `fill`; returns the
    /// index of the first. A run never spans pages, so `n` must not exceed
    /// the page size.
    pub fn claim_with<F>(&mut self, n: usize, mut fill: F) -> usize
    where
        F: FnMut() -> T,
    {
        assert!(n >= 1, "cannot claim an empty run");
        assert!(
            n <= self.page_size,
            "claim of {n} slots exceeds the page size {}",
            self.page_size
        );
        let id = self.len;
        let page = self.page_with_room(n);
        for _ in 0..n {
            page.slots.push(fill());
        }
        self.len += n;
        id
    }

    /// The last page if `n` more slots fit it, otherwise a fresh one.
    fn page_with_room(&mut self, n: usize) -> &mut Page<T> {
        let needs_page = match self.pages.last() {
            Some(page) => page.slots.len() + n > page.slots.capacity(),
            None => true,
        };
        if needs_page {
            self.pages.push(Page {
                start: self.len,
                slots: Vec::with_capacity(self.page_size),
            });
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    /// Release a run of `n` slots starting at `id`.
    ///
    /// Only the most recently claimed run is reclaimed; releasing anything
    /// else is a deliberate no-op (stack discipline).
    pub fn release(&mut self, id: usize, n: usize) {
        debug_assert!(n >= 1);
        if id + n != self.len {
            return;
        }
        let last = self.pages.len() - 1;
        let page = &mut self.pages[last];
        debug_assert!(id >= page.start, "a run never spans pages");
        page.slots.truncate(id - page.start);
        self.len -= n;
        if page.slots.is_empty() {
            self.pages.pop();
        }
    }

    pub fn get(&self, id: usize) -> &T {
        let page = self.page_of(id);
        &page.slots[id - page.start]
    }

    pub fn get_mut(&mut self, id: usize) -> &mut T {
        assert!(id < self.len, "slot {id} is out of range");
        let pi = self.page_index(id);
        let page = &mut self.pages[pi];
        &mut page.slots[id - page.start]
    }

    /// All claimed slots, in index order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.pages.iter().flat_map(|p| p.slots.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.pages.iter_mut().flat_map(|p| p.slots.iter_mut())
    }

    fn page_of(&self, id: usize) -> &Page<T> {
        assert!(id < self.len, "slot {id} is out of range");
        &self.pages[self.page_index(id)]
    }

    fn page_index(&self, id: usize) -> usize {
        debug_assert!(id < self.len);
        // pages hold their cumulative start, so the owner is the last page
        // starting at or before id
        self.pages.partition_point(|p| p.start <= id) - 1
    }
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_pool_is_empty() {
        let pool: Pool<u32> = Pool::new(8);
        assert_eq!(pool.len(), 0);
        assert_eq!(pool.capacity(), 0);
        assert!(pool.is_empty());
    }

    #[test]
    fn claim_issues_dense_indices() {
        let mut pool = Pool::new(8);
        for i in 0..20 {
            assert_eq!(pool.claim(i), i);
        }
        assert_eq!(pool.len(), 20);
        for i in 0..20 {
            assert_eq!(*pool.get(i), i);
        }
    }

    #[test]
    fn pages_never_grow_past_reserve() {
        let mut pool = Pool::new(4);
        for i in 0..9 {
            pool.claim(i);
        }
        // three pages of four, the last partially filled
        assert_eq!(pool.capacity(), 12);
        assert_eq!(pool.len(), 9);
    }

    #[test]
    fn claim_run_stays_within_one_page() {
        let mut pool = Pool::new(4);
        pool.claim(0u32);
        pool.claim(1);
        pool.claim(2);
        // a run of three cannot fit the current page; a fresh page opens
        // and indices stay dense
        let run = pool.claim_with(3, || 9);
        assert_eq!(run, 3);
        assert_eq!(*pool.get(3), 9);
        assert_eq!(*pool.get(5), 9);
        assert_eq!(*pool.get(2), 2);
    }

    #[test]
    fn release_tail_reclaims() {
        let mut pool = Pool::new(8);
        pool.claim("a");
        let b = pool.claim("b");
        pool.release(b, 1);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.claim("c"), 1);
        assert_eq!(*pool.get(1), "c");
    }

    #[test]
    fn release_non_tail_is_noop() {
        let mut pool = Pool::new(8);
        let a = pool.claim("a");
        pool.claim("b");
        pool.release(a, 1);
        assert_eq!(pool.len(), 2);
        assert_eq!(*pool.get(a), "a");
    }

    #[test]
    fn release_whole_page_allows_reclaim() {
        let mut pool = Pool::new(2);
        pool.claim(0u8);
        pool.claim(1);
        let c = pool.claim(2);
        pool.release(c, 1);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.claim(9), 2);
        assert_eq!(*pool.get(2), 9);
    }

    #[test]
    fn iter_walks_in_index_order() {
        let mut pool = Pool::new(2);
        for i in 0..5 {
            pool.claim(i);
        }
        let all: Vec<i32> = pool.iter().copied().collect();
        assert_eq!(all, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn claim_takes_non_copy_values_by_move() {
        let mut pool = Pool::new(4);
        for i in 0..6usize {
            assert_eq!(pool.claim(vec![i]), i);
        }
        assert_eq!(*pool.get(0), vec![0]);
        assert_eq!(*pool.get(5), vec![5]);
    }

    #[test]
    fn get_mut_edits_in_place() {
        let mut pool = Pool::new(2);
        let id = pool.claim(String::from("x"));
        pool.get_mut(id).push('y');
        assert_eq!(pool.get(id), "xy");
    }
}
