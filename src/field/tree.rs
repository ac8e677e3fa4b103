//! Ordered, nested field sequences and the structural edits on them.
//!
//! Nodes are addressed by index paths: `[2, 0]` is the first child of the
//! third top-level field. Every operation resolves its paths before touching
//! anything, so a call either applies completely or leaves the tree as it was.

use super::{Field, FieldId, FieldIdAllocator};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum MoveDirection {
    Up,
    Down,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub(crate) struct FieldTree {
    fields: Vec<Field>,
}

impl From<Vec<Field>> for FieldTree {
    fn from(fields: Vec<Field>) -> Self {
        Self { fields }
    }
}

impl FieldTree {
    /// Top-level sequence.
    pub(crate) fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.fields.clear();
    }

    /// Depth-first pre-order walk over every field.
    pub(crate) fn iter(&self) -> Iter<'_> {
        Iter {
            stack: vec![self.fields.iter()],
        }
    }

    pub(crate) fn find(&self, id: &FieldId) -> Option<&Field> {
        self.iter().find(|f| &f.id == id)
    }

    pub(crate) fn find_mut(&mut self, id: &FieldId) -> Option<&mut Field> {
        let path = self.locate(id)?;
        self.field_at_mut(&path)
    }

    pub(crate) fn contains(&self, id: &FieldId) -> bool {
        self.find(id).is_some()
    }

    /// Appends `field` to the children of fieldset `parent`, or to the top
    /// level when `parent` is `None`. Returns false, dropping the field, if
    /// `parent` is not an existing fieldset.
    pub(crate) fn insert(&mut self, mut field: Field, parent: Option<&FieldId>) -> bool {
        match parent {
            None => {
                field.parent_id = None;
                self.fields.push(field);
                true
            }
            Some(parent_id) => {
                let Some(children) = self.find_mut(parent_id).and_then(Field::children_mut) else {
                    return false;
                };
                field.parent_id = Some(parent_id.clone());
                children.push(field);
                true
            }
        }
    }

    /// Removes the first field with `id`, together with its subtree.
    pub(crate) fn remove(&mut self, id: &FieldId) -> Option<Field> {
        let path = self.locate(id)?;
        let (&index, parent) = path.split_last()?;
        Some(self.sequence_mut(parent)?.remove(index))
    }

    /// Inserts a deep copy of `id` right after it. The copy and every field
    /// below it get fresh ids and a `_copy` name suffix.
    pub(crate) fn duplicate(
        &mut self,
        id: &FieldId,
        ids: &mut FieldIdAllocator,
    ) -> Option<FieldId> {
        let path = self.locate(id)?;
        let (&index, parent) = path.split_last()?;
        let mut copy = self.field_at(&path)?.clone();
        let parent_id = copy.parent_id.clone();
        self.relabel_copy(&mut copy, parent_id, ids);
        let copy_id = copy.id.clone();
        self.sequence_mut(parent)?.insert(index + 1, copy);
        Some(copy_id)
    }

    fn relabel_copy(&self, field: &mut Field, parent_id: Option<FieldId>, ids: &mut FieldIdAllocator) {
        field.id = ids.allocate(|candidate| self.contains(candidate));
        field.name.push_str("_copy");
        field.parent_id = parent_id;
        let own_id = field.id.clone();
        if let Some(children) = field.children_mut() {
            for child in children {
                self.relabel_copy(child, Some(own_id.clone()), ids);
            }
        }
    }

    /// Swaps `id` with its neighbour. No-op at either end of its sequence.
    pub(crate) fn move_field(&mut self, id: &FieldId, direction: MoveDirection) -> bool {
        let Some(path) = self.locate(id) else {
            return false;
        };
        let Some((&index, parent)) = path.split_last() else {
            return false;
        };
        let Some(seq) = self.sequence_mut(parent) else {
            return false;
        };
        let neighbour = match direction {
            MoveDirection::Up => index.checked_sub(1),
            MoveDirection::Down => Some(index + 1).filter(|&i| i < seq.len()),
        };
        match neighbour {
            Some(other) => {
                seq.swap(index, other);
                true
            }
            None => false,
        }
    }

    /// Moves `dragged` to sit immediately before `target`, in whichever
    /// sequence holds `target`. Refuses to move a fieldset into its own
    /// subtree.
    pub(crate) fn reorder(&mut self, dragged: &FieldId, target: &FieldId) -> bool {
        if dragged == target {
            return false;
        }
        let (Some(from), Some(to)) = (self.locate(dragged), self.locate(target)) else {
            return false;
        };
        if to.starts_with(&from) {
            return false;
        }
        let Some((&from_index, from_parent)) = from.split_last() else {
            return false;
        };
        let Some(mut field) = self
            .sequence_mut(from_parent)
            .map(|seq| seq.remove(from_index))
        else {
            return false;
        };

        // Indices after the removal point shifted; find the target again.
        let Some(to) = self.locate(target) else {
            self.restore(from_parent, from_index, field);
            return false;
        };
        let Some((&to_index, to_parent)) = to.split_last() else {
            self.restore(from_parent, from_index, field);
            return false;
        };
        field.parent_id = self.field_at(to_parent).map(|f| f.id.clone());
        match self.sequence_mut(to_parent) {
            Some(seq) => {
                seq.insert(to_index, field);
                true
            }
            None => {
                self.restore(from_parent, from_index, field);
                false
            }
        }
    }

    fn restore(&mut self, parent: &[usize], index: usize, field: Field) {
        if let Some(seq) = self.sequence_mut(parent) {
            seq.insert(index, field);
        }
    }

    /// Rewrites every `parent_id` to match the actual structure.
    pub(crate) fn normalize_parents(&mut self) {
        fn walk(fields: &mut [Field], parent: Option<&FieldId>) {
            for field in fields {
                field.parent_id = parent.cloned();
                let id = field.id.clone();
                if let Some(children) = field.children_mut() {
                    walk(children, Some(&id));
                }
            }
        }
        walk(&mut self.fields, None);
    }

    /// First id (in pre-order) that occurs more than once, if any.
    pub(crate) fn first_duplicate_id(&self) -> Option<&FieldId> {
        let mut seen = HashSet::new();
        self.iter().map(|f| &f.id).find(|id| !seen.insert(*id))
    }

    fn locate(&self, id: &FieldId) -> Option<Vec<usize>> {
        fn walk(fields: &[Field], id: &FieldId, path: &mut Vec<usize>) -> bool {
            for (i, field) in fields.iter().enumerate() {
                path.push(i);
                if &field.id == id {
                    return true;
                }
                if let Some(children) = field.children()
                    && walk(children, id, path)
                {
                    return true;
                }
                path.pop();
            }
            false
        }
        let mut path = Vec::new();
        walk(&self.fields, id, &mut path).then_some(path)
    }

    fn field_at(&self, path: &[usize]) -> Option<&Field> {
        let (&last, parent) = path.split_last()?;
        let mut seq = self.fields.as_slice();
        for &i in parent {
            seq = seq.get(i)?.children()?;
        }
        seq.get(last)
    }

    fn field_at_mut(&mut self, path: &[usize]) -> Option<&mut Field> {
        let (&last, parent) = path.split_last()?;
        self.sequence_mut(parent)?.get_mut(last)
    }

    /// The sequence holding the children of the field at `parent`, or the top
    /// level for an empty path.
    fn sequence_mut(&mut self, parent: &[usize]) -> Option<&mut Vec<Field>> {
        let mut seq = &mut self.fields;
        for &i in parent {
            seq = seq.get_mut(i)?.children_mut()?;
        }
        Some(seq)
    }
}

pub(crate) struct Iter<'a> {
    stack: Vec<std::slice::Iter<'a, Field>>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Field;

    fn next(&mut self) -> Option<&'a Field> {
        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                Some(field) => {
                    if let Some(children) = field.children() {
                        self.stack.push(children.iter());
                    }
                    return Some(field);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldType;
    use pretty_assertions::assert_eq;

    struct Fixture {
        tree: FieldTree,
        ids: FieldIdAllocator,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                tree: FieldTree::default(),
                ids: FieldIdAllocator::default(),
            }
        }

        fn add(&mut self, t: FieldType, parent: Option<&FieldId>) -> FieldId {
            let id = self.ids.allocate(|_| false);
            let name = format!("{t}_{}", id.sequence().unwrap_or_default());
            let field = Field::new(id.clone(), t, name, None);
            assert!(self.tree.insert(field, parent));
            id
        }

        fn order(&self, seq: &[Field]) -> Vec<FieldId> {
            seq.iter().map(|f| f.id.clone()).collect()
        }

        fn children_of(&self, id: &FieldId) -> Vec<FieldId> {
            self.order(self.tree.find(id).and_then(Field::children).unwrap_or_default())
        }
    }

    #[test]
    fn test_find_after_adds_and_deletes() {
        let mut fx = Fixture::new();
        let a = fx.add(FieldType::Text, None);
        let fs = fx.add(FieldType::Fieldset, None);
        let b = fx.add(FieldType::Email, Some(&fs));
        let c = fx.add(FieldType::Number, Some(&fs));
        let d = fx.add(FieldType::Submit, None);

        assert!(fx.tree.remove(&b).is_some());
        assert!(fx.tree.remove(&d).is_some());

        for present in [&a, &fs, &c] {
            assert!(fx.tree.find(present).is_some(), "{present} should be found");
        }
        for gone in [&b, &d] {
            assert!(fx.tree.find(gone).is_none(), "{gone} should be gone");
        }
        assert!(fx.tree.remove(&b).is_none());
    }

    #[test]
    fn test_insert_into_non_fieldset_is_rejected() {
        let mut fx = Fixture::new();
        let text = fx.add(FieldType::Text, None);
        let orphan = Field::new(FieldId::new("x"), FieldType::Email, "x", None);
        assert!(!fx.tree.insert(orphan.clone(), Some(&text)));
        assert!(!fx.tree.insert(orphan, Some(&FieldId::new("missing"))));
        assert_eq!(fx.tree.iter().count(), 1);
    }

    #[test]
    fn test_insert_sets_parent_id() {
        let mut fx = Fixture::new();
        let fs = fx.add(FieldType::Fieldset, None);
        let child = fx.add(FieldType::Text, Some(&fs));
        assert_eq!(fx.tree.find(&child).unwrap().parent_id.as_ref(), Some(&fs));
    }

    #[test]
    fn test_iter_is_pre_order() {
        let mut fx = Fixture::new();
        let a = fx.add(FieldType::Text, None);
        let fs = fx.add(FieldType::Fieldset, None);
        let inner = fx.add(FieldType::Fieldset, Some(&fs));
        let deep = fx.add(FieldType::Date, Some(&inner));
        let b = fx.add(FieldType::Email, Some(&fs));
        let c = fx.add(FieldType::Submit, None);

        let order: Vec<_> = fx.tree.iter().map(|f| f.id.clone()).collect();
        assert_eq!(order, vec![a, fs, inner, deep, b, c]);
    }

    #[test]
    fn test_duplicate_nested_subtree() {
        let mut fx = Fixture::new();
        let before = fx.add(FieldType::Text, None);
        let fs = fx.add(FieldType::Fieldset, None);
        let inner = fx.add(FieldType::Fieldset, Some(&fs));
        fx.add(FieldType::Email, Some(&inner));
        fx.add(FieldType::Radio, Some(&fs));
        let after = fx.add(FieldType::Submit, None);

        let copy_id = fx.tree.duplicate(&fs, &mut fx.ids).unwrap();

        assert_eq!(
            fx.order(fx.tree.fields()),
            vec![before, fs.clone(), copy_id.clone(), after]
        );

        let original = fx.tree.find(&fs).unwrap();
        let copy = fx.tree.find(&copy_id).unwrap();
        let original_ids: HashSet<_> = FieldTree::from(vec![original.clone()])
            .iter()
            .map(|f| f.id.clone())
            .collect();
        let copy_tree = FieldTree::from(vec![copy.clone()]);
        let copy_ids: HashSet<_> = copy_tree.iter().map(|f| f.id.clone()).collect();

        assert_eq!(original_ids.len(), 4);
        assert_eq!(copy_ids.len(), 4);
        assert!(original_ids.is_disjoint(&copy_ids));
        assert!(copy_tree.iter().all(|f| f.name.ends_with("_copy")));
        assert_eq!(copy.parent_id, None);

        let copied_inner = &copy.children().unwrap()[0];
        assert_eq!(copied_inner.parent_id.as_ref(), Some(&copy_id));
        assert_eq!(
            copied_inner.children().unwrap()[0].parent_id.as_ref(),
            Some(&copied_inner.id)
        );
        assert!(fx.tree.first_duplicate_id().is_none());
    }

    #[test]
    fn test_duplicate_inside_fieldset_stays_in_sequence() {
        let mut fx = Fixture::new();
        let fs = fx.add(FieldType::Fieldset, None);
        let a = fx.add(FieldType::Text, Some(&fs));
        let b = fx.add(FieldType::Text, Some(&fs));

        let copy = fx.tree.duplicate(&a, &mut fx.ids).unwrap();
        assert_eq!(fx.children_of(&fs), vec![a, copy.clone(), b]);
        assert_eq!(fx.tree.find(&copy).unwrap().parent_id.as_ref(), Some(&fs));
    }

    #[test]
    fn test_duplicate_missing_is_noop() {
        let mut fx = Fixture::new();
        fx.add(FieldType::Text, None);
        let snapshot = fx.tree.clone();
        assert!(fx.tree.duplicate(&FieldId::new("nope"), &mut fx.ids).is_none());
        assert_eq!(fx.tree, snapshot);
    }

    #[test]
    fn test_move_at_boundaries_is_noop() {
        let mut fx = Fixture::new();
        let a = fx.add(FieldType::Text, None);
        let b = fx.add(FieldType::Email, None);
        let c = fx.add(FieldType::Number, None);

        assert!(!fx.tree.move_field(&a, MoveDirection::Up));
        assert!(!fx.tree.move_field(&c, MoveDirection::Down));
        assert_eq!(fx.order(fx.tree.fields()), vec![a.clone(), b.clone(), c.clone()]);

        assert!(fx.tree.move_field(&b, MoveDirection::Up));
        assert_eq!(fx.order(fx.tree.fields()), vec![b.clone(), a.clone(), c.clone()]);

        assert!(fx.tree.move_field(&a, MoveDirection::Down));
        assert_eq!(fx.order(fx.tree.fields()), vec![b, c, a]);
    }

    #[test]
    fn test_move_within_fieldset() {
        let mut fx = Fixture::new();
        let top = fx.add(FieldType::Text, None);
        let fs = fx.add(FieldType::Fieldset, None);
        let x = fx.add(FieldType::Text, Some(&fs));
        let y = fx.add(FieldType::Text, Some(&fs));

        assert!(!fx.tree.move_field(&x, MoveDirection::Up));
        assert!(fx.tree.move_field(&y, MoveDirection::Up));
        assert_eq!(fx.children_of(&fs), vec![y, x]);
        assert_eq!(fx.order(fx.tree.fields()), vec![top, fs]);
    }

    #[test]
    fn test_reorder_within_top_level() {
        let mut fx = Fixture::new();
        let a = fx.add(FieldType::Text, None);
        let b = fx.add(FieldType::Email, None);
        let c = fx.add(FieldType::Number, None);

        assert!(fx.tree.reorder(&c, &a));
        assert_eq!(fx.order(fx.tree.fields()), vec![c.clone(), a.clone(), b.clone()]);

        // Dragging forward lands before the target, after removal shifts.
        assert!(fx.tree.reorder(&c, &b));
        assert_eq!(fx.order(fx.tree.fields()), vec![a, c, b]);
    }

    #[test]
    fn test_reorder_into_other_fieldset() {
        let mut fx = Fixture::new();
        let first = fx.add(FieldType::Fieldset, None);
        let p = fx.add(FieldType::Text, Some(&first));
        let q = fx.add(FieldType::Email, Some(&first));
        let r = fx.add(FieldType::Date, Some(&first));
        let second = fx.add(FieldType::Fieldset, None);
        let s = fx.add(FieldType::Number, Some(&second));
        let t = fx.add(FieldType::Radio, Some(&second));

        assert!(fx.tree.reorder(&q, &t));

        assert_eq!(fx.children_of(&first), vec![p, r]);
        assert_eq!(fx.children_of(&second), vec![s, q.clone(), t]);
        assert_eq!(fx.tree.find(&q).unwrap().parent_id.as_ref(), Some(&second));
    }

    #[test]
    fn test_reorder_out_of_fieldset() {
        let mut fx = Fixture::new();
        let a = fx.add(FieldType::Text, None);
        let fs = fx.add(FieldType::Fieldset, None);
        let inner = fx.add(FieldType::Email, Some(&fs));

        assert!(fx.tree.reorder(&inner, &a));
        assert_eq!(fx.order(fx.tree.fields()), vec![inner.clone(), a, fs.clone()]);
        assert!(fx.children_of(&fs).is_empty());
        assert_eq!(fx.tree.find(&inner).unwrap().parent_id, None);
    }

    #[test]
    fn test_reorder_rejects_invalid_requests() {
        let mut fx = Fixture::new();
        let a = fx.add(FieldType::Text, None);
        let fs = fx.add(FieldType::Fieldset, None);
        let inner = fx.add(FieldType::Fieldset, Some(&fs));
        let deep = fx.add(FieldType::Email, Some(&inner));
        let snapshot = fx.tree.clone();

        assert!(!fx.tree.reorder(&a, &a));
        assert!(!fx.tree.reorder(&FieldId::new("missing"), &a));
        assert!(!fx.tree.reorder(&a, &FieldId::new("missing")));
        // A fieldset cannot be dropped inside itself.
        assert!(!fx.tree.reorder(&fs, &deep));
        assert!(!fx.tree.reorder(&fs, &inner));

        assert_eq!(fx.tree, snapshot);
    }

    #[test]
    fn test_normalize_parents_and_duplicate_detection() {
        let child = Field::new(FieldId::new("c"), FieldType::Text, "c", Some(FieldId::new("bogus")));
        let mut fieldset = Field::new(FieldId::new("p"), FieldType::Fieldset, "p", None);
        fieldset.children_mut().unwrap().push(child);
        let mut tree = FieldTree::from(vec![fieldset]);

        tree.normalize_parents();
        assert_eq!(
            tree.find(&FieldId::new("c")).unwrap().parent_id,
            Some(FieldId::new("p"))
        );
        assert!(tree.first_duplicate_id().is_none());

        let clash = Field::new(FieldId::new("c"), FieldType::Email, "again", None);
        assert!(tree.insert(clash, None));
        assert_eq!(tree.first_duplicate_id(), Some(&FieldId::new("c")));
    }
}
