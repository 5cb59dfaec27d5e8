//! Organisation scope tree (company > department > team).
//!
//! A user sees rows in their own scope and every scope beneath it.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::database::models::{Scope, ScopeKind};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScopeError {
    #[error("Parent scope {0} does not exist")]
    UnknownParent(Uuid),
    #[error("Scope {0} would become its own ancestor")]
    Cycle(Uuid),
    #[error("A {child} cannot sit under a {parent}")]
    KindOrder { child: ScopeKind, parent: ScopeKind },
    #[error("Scope still has child scopes")]
    HasChildren,
}

#[derive(Debug, Default)]
pub struct ScopeTree {
    parents: HashMap<Uuid, Option<Uuid>>,
    children: HashMap<Uuid, Vec<Uuid>>,
    kinds: HashMap<Uuid, ScopeKind>,
}

impl ScopeTree {
    pub fn new(scopes: &[Scope]) -> Self {
        Self::from_nodes(scopes.iter().map(|s| (s.id, s.parent_id, s.kind)))
    }

    pub fn from_nodes(nodes: impl IntoIterator<Item = (Uuid, Option<Uuid>, ScopeKind)>) -> Self {
        let mut tree = ScopeTree::default();
        for (id, parent, kind) in nodes {
            tree.parents.insert(id, parent);
            tree.kinds.insert(id, kind);
            if let Some(parent) = parent {
                tree.children.entry(parent).or_default().push(id);
            }
        }
        tree
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.parents.contains_key(&id)
    }

    /// `root` and every scope below it. Unknown ids yield an empty list.
    pub fn descendants(&self, root: Uuid) -> Vec<Uuid> {
        if !self.contains(root) {
            return Vec::new();
        }
        let mut seen = HashSet::new();
        let mut stack = vec![root];
        let mut out = Vec::new();
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            out.push(id);
            if let Some(kids) = self.children.get(&id) {
                stack.extend(kids.iter().copied());
            }
        }
        out
    }

    pub fn has_children(&self, id: Uuid) -> bool {
        self.children.get(&id).is_some_and(|kids| !kids.is_empty())
    }

    /// Check that attaching `id` (a `kind` scope) under `parent` keeps the
    /// tree acyclic and the parent strictly above the child.
    pub fn check_parent(&self, id: Uuid, kind: ScopeKind, parent: Option<Uuid>) -> Result<(), ScopeError> {
        let Some(mut cursor) = parent else {
            return Ok(());
        };
        let parent_kind = *self.kinds.get(&cursor).ok_or(ScopeError::UnknownParent(cursor))?;
        if parent_kind.rank() >= kind.rank() {
            return Err(ScopeError::KindOrder { child: kind, parent: parent_kind });
        }
        let mut steps = 0;
        loop {
            if cursor == id {
                return Err(ScopeError::Cycle(id));
            }
            match self.parents.get(&cursor).copied().flatten() {
                Some(next) => cursor = next,
                None => return Ok(()),
            }
            steps += 1;
            // An existing cycle in stored data; refuse to extend it
            if steps > self.parents.len() {
                return Err(ScopeError::Cycle(id));
            }
        }
    }

    pub fn check_removable(&self, id: Uuid) -> Result<(), ScopeError> {
        if self.has_children(id) {
            return Err(ScopeError::HasChildren);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (ScopeTree, [Uuid; 4]) {
        let company = Uuid::new_v4();
        let sales = Uuid::new_v4();
        let emea = Uuid::new_v4();
        let ops = Uuid::new_v4();
        let tree = ScopeTree::from_nodes([
            (company, None, ScopeKind::Company),
            (sales, Some(company), ScopeKind::Department),
            (emea, Some(sales), ScopeKind::Team),
            (ops, Some(company), ScopeKind::Department),
        ]);
        (tree, [company, sales, emea, ops])
    }

    #[test]
    fn descendants_cover_the_subtree() {
        let (tree, [company, sales, emea, ops]) = sample();
        let mut below_sales = tree.descendants(sales);
        below_sales.sort();
        let mut expected = vec![sales, emea];
        expected.sort();
        assert_eq!(below_sales, expected);
        assert_eq!(tree.descendants(company).len(), 4);
        assert_eq!(tree.descendants(ops), vec![ops]);
        assert!(tree.descendants(Uuid::new_v4()).is_empty());
    }

    #[test]
    fn reparenting_under_a_descendant_is_a_cycle() {
        let company = Uuid::new_v4();
        let sales = Uuid::new_v4();
        let emea = Uuid::new_v4();
        // Stored data with kinds out of order, so only the walk can catch it
        let tree = ScopeTree::from_nodes([
            (company, None, ScopeKind::Company),
            (sales, Some(company), ScopeKind::Team),
            (emea, Some(sales), ScopeKind::Company),
        ]);
        assert_eq!(tree.check_parent(sales, ScopeKind::Team, Some(emea)), Err(ScopeError::Cycle(sales)));
        assert!(tree.check_parent(Uuid::new_v4(), ScopeKind::Team, Some(emea)).is_ok());
    }

    #[test]
    fn unknown_parent_is_rejected() {
        let (tree, _) = sample();
        let ghost = Uuid::new_v4();
        assert_eq!(
            tree.check_parent(Uuid::new_v4(), ScopeKind::Team, Some(ghost)),
            Err(ScopeError::UnknownParent(ghost))
        );
    }

    #[test]
    fn parent_must_rank_above_child() {
        let (tree, [company, sales, emea, _]) = sample();
        assert!(tree.check_parent(Uuid::new_v4(), ScopeKind::Department, Some(company)).is_ok());
        assert!(tree.check_parent(Uuid::new_v4(), ScopeKind::Team, Some(company)).is_ok());
        assert!(tree.check_parent(Uuid::new_v4(), ScopeKind::Team, Some(sales)).is_ok());
        assert!(tree.check_parent(Uuid::new_v4(), ScopeKind::Company, None).is_ok());

        assert_eq!(
            tree.check_parent(Uuid::new_v4(), ScopeKind::Company, Some(emea)),
            Err(ScopeError::KindOrder { child: ScopeKind::Company, parent: ScopeKind::Team })
        );
        assert_eq!(
            tree.check_parent(Uuid::new_v4(), ScopeKind::Department, Some(sales)),
            Err(ScopeError::KindOrder { child: ScopeKind::Department, parent: ScopeKind::Department })
        );
    }

    #[test]
    fn scopes_with_children_are_not_removable() {
        let (tree, [_, sales, emea, _]) = sample();
        assert_eq!(tree.check_removable(sales), Err(ScopeError::HasChildren));
        assert!(tree.check_removable(emea).is_ok());
    }
}
