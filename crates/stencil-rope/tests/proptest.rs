//! Property-based tests for the rope using proptest.

use proptest::prelude::*;
use stencil_rope::Rope;

/// A random edit script applied to a rope seeded with one fragment.
#[derive(Debug, Clone)]
enum Edit {
    Append(String),
    InsertAfter(usize, String),
    Replace(usize, String),
    Split(usize, usize),
}

fn edit_strategy() -> impl Strategy<Value = Edit> {
    prop_oneof![
        "[a-z ]{0,12}".prop_map(Edit::Append),
        (any::<usize>(), "[a-z ]{0,12}").prop_map(|(i, s)| Edit::InsertAfter(i, s)),
        (any::<usize>(), "[a-z ]{0,12}").prop_map(|(i, s)| Edit::Replace(i, s)),
        (any::<usize>(), any::<usize>()).prop_map(|(i, o)| Edit::Split(i, o)),
    ]
}

fn apply(rope: &mut Rope, ids: &mut Vec<stencil_rope::FragmentId>, edit: &Edit) {
    match edit {
        Edit::Append(s) => ids.push(rope.append(s)),
        Edit::InsertAfter(i, s) => {
            let at = ids[i % ids.len()];
            ids.push(rope.insert_after(at, s));
        }
        Edit::Replace(i, s) => rope.replace(ids[i % ids.len()], s),
        Edit::Split(i, o) => {
            let at = ids[i % ids.len()];
            let len = rope.sub(at, 0).len();
            ids.push(rope.split(at, o % (len + 1)));
        }
    }
}

proptest! {
    /// Flattening twice with no intervening edits yields identical output.
    #[test]
    fn flatten_is_idempotent(
        seed in "[a-z ]{1,20}",
        edits in prop::collection::vec(edit_strategy(), 0..40),
    ) {
        let mut rope = Rope::new();
        let mut ids = vec![rope.append(&seed)];
        for edit in &edits {
            apply(&mut rope, &mut ids, edit);
        }
        prop_assert_eq!(rope.flattened(), rope.flattened());
    }

    /// Splitting anywhere never changes the flattened output.
    #[test]
    fn split_preserves_text(
        seed in "[a-z ]{1,20}",
        offset in any::<usize>(),
    ) {
        let mut rope = Rope::new();
        let id = rope.append(&seed);
        let before = rope.flattened();
        rope.split(id, offset % (seed.len() + 1));
        prop_assert_eq!(rope.flattened(), before);
    }

    /// Replacing a fragment with empty text removes it from the output but
    /// keeps its identity usable.
    #[test]
    fn empty_replace_is_logical_removal(
        left in "[a-z]{0,10}",
        mid in "[a-z]{1,10}",
        right in "[a-z]{0,10}",
    ) {
        let mut rope = Rope::new();
        rope.append(&left);
        let m = rope.append(&mid);
        rope.append(&right);
        rope.replace(m, "");
        prop_assert_eq!(rope.flattened(), format!("{left}{right}"));
        rope.replace(m, &mid);
        prop_assert_eq!(rope.flattened(), format!("{left}{mid}{right}"));
    }
}
