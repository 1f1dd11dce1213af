//! The fragment rope.

/// Stable identifier of one fragment within a [`Rope`].
///
/// Identifiers are never reused within a rope's lifetime. Using an
/// identifier from a different rope, or one that was never issued, is a
/// logic error and panics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FragmentId(usize);

impl FragmentId {
    /// The raw index backing this identifier.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A cursor into the rope: a fragment plus a byte offset inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RopePosition {
    pub fragment: FragmentId,
    pub offset: usize,
}

#[derive(Debug, Clone)]
struct Fragment {
    text: String,
    next: Option<FragmentId>,
}

/// An ordered, splice-able sequence of text fragments.
///
/// Fragments are linked in output order; edits are local to the fragment
/// they name and never shift other fragments. Cloning a rope preserves all
/// identifiers, which is how a parsed template is stamped out once per
/// render.
#[derive(Debug, Clone, Default)]
pub struct Rope {
    fragments: Vec<Fragment>,
    head: Option<FragmentId>,
    tail: Option<FragmentId>,
}

impl Rope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of fragments ever issued (live fragments are never removed).
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// First fragment in link order.
    pub fn head(&self) -> Option<FragmentId> {
        self.head
    }

    /// Append a fragment at the tail of the rope.
    pub fn append(&mut self, text: &str) -> FragmentId {
        let id = self.push(text.to_string(), None);
        match self.tail {
            Some(tail) => self.fragments[tail.0].next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        id
    }

    /// Overwrite the whole content of `id`.
    pub fn replace(&mut self, id: FragmentId, text: &str) {
        let frag = &mut self.fragments[id.0];
        frag.text.clear();
        frag.text.push_str(text);
    }

    /// Overwrite the byte range `[offset, offset + len)` of `id` with
    /// `text`, splicing as needed so other content keeps its identity.
    ///
    /// Returns the identifier of the fragment holding `text`: content
    /// before `offset` keeps the original identifier, content after the
    /// replaced range moves into a fresh fragment linked right after the
    /// returned one.
    pub fn replace_range(
        &mut self,
        id: FragmentId,
        offset: usize,
        len: usize,
        text: &str,
    ) -> FragmentId {
        debug_assert!(offset + len <= self.fragments[id.0].text.len());
        let target = if offset > 0 { self.split(id, offset) } else { id };
        let tail = self.fragments[target.0].text.split_off(len);
        self.replace(target, text);
        if !tail.is_empty() {
            self.link_after(target, tail);
        }
        target
    }

    /// Truncate `id` to `[0, offset)` and move the remainder into a new
    /// fragment linked right after it. Returns the new fragment.
    pub fn split(&mut self, id: FragmentId, offset: usize) -> FragmentId {
        let rest = self.fragments[id.0].text.split_off(offset);
        self.link_after(id, rest)
    }

    /// Create a new fragment holding `text` immediately after `id`.
    pub fn insert_after(&mut self, id: FragmentId, text: &str) -> FragmentId {
        self.link_after(id, text.to_string())
    }

    /// The fragment following `id` in link order, if any.
    pub fn next(&self, id: FragmentId) -> Option<FragmentId> {
        self.fragments[id.0].next
    }

    /// View into the content of `id` starting at `offset`.
    pub fn sub(&self, id: FragmentId, offset: usize) -> &str {
        &self.fragments[id.0].text[offset..]
    }

    /// View into `len` bytes of the content of `id` starting at `offset`.
    pub fn sub_len(&self, id: FragmentId, offset: usize, len: usize) -> &str {
        &self.fragments[id.0].text[offset..offset + len]
    }

    /// Concatenate all fragments, in link order, into `buf`. The buffer is
    /// cleared first and grown as needed.
    pub fn flatten(&self, buf: &mut String) {
        buf.clear();
        let mut cursor = self.head;
        while let Some(id) = cursor {
            let frag = &self.fragments[id.0];
            buf.push_str(&frag.text);
            cursor = frag.next;
        }
    }

    /// Convenience wrapper around [`flatten`](Self::flatten).
    pub fn flattened(&self) -> String {
        let mut buf = String::new();
        self.flatten(&mut buf);
        buf
    }

    fn push(&mut self, text: String, next: Option<FragmentId>) -> FragmentId {
        let id = FragmentId(self.fragments.len());
        self.fragments.push(Fragment { text, next });
        id
    }

    fn link_after(&mut self, id: FragmentId, text: String) -> FragmentId {
        let next = self.fragments[id.0].next;
        let new_id = self.push(text, next);
        self.fragments[id.0].next = Some(new_id);
        if self.tail == Some(id) {
            self.tail = Some(new_id);
        }
        new_id
    }
}
