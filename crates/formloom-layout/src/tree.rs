#![forbid(unsafe_code)]

//! Persistent component tree.
//!
//! [`ComponentTree`] is the ordered root list of one page. Nodes are shared
//! through `Arc`, so cloning a tree is a shallow vector copy and every edit
//! goes through [`Arc::make_mut`] along the ancestor path of the changed node.
//! Trees handed out by this crate always satisfy [`ComponentTree::check_invariants`].
//!
//! Nodes are addressed internally by index paths from the root list. Paths
//! are never exposed; callers address nodes by [`ComponentId`].

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::component::{
    Component, ComponentId, ComponentKind, MAX_GROUP_CHILDREN, MIN_GROUP_CHILDREN,
};

/// Ordered list of top-level components for one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ComponentTree {
    roots: Vec<Arc<Component>>,
}

/// Structural invariant violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    DuplicateId {
        id: ComponentId,
    },
    LeafWithChildren {
        id: ComponentId,
        kind: ComponentKind,
    },
    GroupArity {
        id: ComponentId,
        children: usize,
    },
    NestedHorizontalGroup {
        outer: ComponentId,
        inner: ComponentId,
    },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateId { id } => write!(f, "component id {id} appears more than once"),
            Self::LeafWithChildren { id, kind } => {
                write!(f, "{kind} component {id} cannot own children")
            }
            Self::GroupArity { id, children } => write!(
                f,
                "horizontal group {id} has {children} children (allowed {MIN_GROUP_CHILDREN}..={MAX_GROUP_CHILDREN})"
            ),
            Self::NestedHorizontalGroup { outer, inner } => write!(
                f,
                "horizontal group {inner} is nested inside horizontal group {outer}"
            ),
        }
    }
}

impl std::error::Error for InvariantViolation {}

/// Index path from the root list to a node.
pub(crate) type NodePath = Vec<usize>;

impl ComponentTree {
    /// Empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from owned root components, checking every invariant.
    pub fn from_components(roots: Vec<Component>) -> Result<Self, InvariantViolation> {
        let tree = Self {
            roots: roots.into_iter().map(Arc::new).collect(),
        };
        tree.check_invariants()?;
        Ok(tree)
    }

    pub(crate) fn from_shared(roots: Vec<Arc<Component>>) -> Self {
        Self { roots }
    }

    /// Top-level components in display order.
    #[must_use]
    pub fn roots(&self) -> &[Arc<Component>] {
        &self.roots
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Total number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roots.iter().map(|root| root.subtree_len()).sum()
    }

    /// Pre-order walk over every node.
    pub fn walk<'a>(&'a self, mut visit: impl FnMut(&'a Component)) {
        for root in &self.roots {
            root.walk(&mut visit);
        }
    }

    /// Every id in pre-order.
    #[must_use]
    pub fn ids(&self) -> Vec<ComponentId> {
        let mut ids = Vec::new();
        self.walk(|node| ids.push(node.id.clone()));
        ids
    }

    #[must_use]
    pub fn contains(&self, id: &ComponentId) -> bool {
        self.path_of(id).is_some()
    }

    /// Look up a node by id.
    #[must_use]
    pub fn get(&self, id: &ComponentId) -> Option<&Arc<Component>> {
        let path = self.path_of(id)?;
        self.node_at(&path)
    }

    /// Parent of `id`, or `None` for root-level nodes and unknown ids.
    #[must_use]
    pub fn parent_of(&self, id: &ComponentId) -> Option<&Arc<Component>> {
        let path = self.path_of(id)?;
        let (_, parent) = path.split_last()?;
        if parent.is_empty() {
            return None;
        }
        self.node_at(parent)
    }

    /// Ancestors of `id`, nearest first.
    #[must_use]
    pub fn ancestors_of(&self, id: &ComponentId) -> Vec<&Arc<Component>> {
        let Some(path) = self.path_of(id) else {
            return Vec::new();
        };
        (1..path.len())
            .rev()
            .filter_map(|depth| self.node_at(&path[..depth]))
            .collect()
    }

    /// Whether `descendant` lives strictly inside the subtree of `ancestor`.
    #[must_use]
    pub fn is_descendant(&self, ancestor: &ComponentId, descendant: &ComponentId) -> bool {
        ancestor != descendant
            && self
                .get(ancestor)
                .is_some_and(|node| node.contains_id(descendant))
    }

    /// Verify the structural invariants: unique ids, childless leaves,
    /// horizontal group arity, and no horizontal group below another.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let mut seen = BTreeSet::new();
        for root in &self.roots {
            check_node(root, None, &mut seen)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Path plumbing
    // ------------------------------------------------------------------

    pub(crate) fn path_of(&self, id: &ComponentId) -> Option<NodePath> {
        fn search(list: &[Arc<Component>], id: &ComponentId, path: &mut NodePath) -> bool {
            for (index, node) in list.iter().enumerate() {
                path.push(index);
                if node.id == *id || search(&node.children, id, path) {
                    return true;
                }
                path.pop();
            }
            false
        }

        let mut path = Vec::new();
        search(&self.roots, id, &mut path).then_some(path)
    }

    pub(crate) fn node_at(&self, path: &[usize]) -> Option<&Arc<Component>> {
        let (first, rest) = path.split_first()?;
        let mut node = self.roots.get(*first)?;
        for &index in rest {
            node = node.children.get(index)?;
        }
        Some(node)
    }

    /// Mutable child list, cloning shared nodes along the way. The empty
    /// path is the root list.
    pub(crate) fn list_mut(&mut self, container: &[usize]) -> Option<&mut Vec<Arc<Component>>> {
        let mut list = &mut self.roots;
        for &index in container {
            let current = list;
            list = &mut Arc::make_mut(current.get_mut(index)?).children;
        }
        Some(list)
    }

    pub(crate) fn node_mut(&mut self, path: &[usize]) -> Option<&mut Component> {
        let (last, container) = path.split_last()?;
        let list = self.list_mut(container)?;
        list.get_mut(*last).map(Arc::make_mut)
    }

    /// Path of the nearest strict ancestor that is a horizontal group.
    pub(crate) fn horizontal_ancestor(&self, path: &[usize]) -> Option<NodePath> {
        (1..path.len()).rev().find_map(|depth| {
            let prefix = &path[..depth];
            self.node_at(prefix)
                .filter(|node| node.is_horizontal_group())
                .map(|_| prefix.to_vec())
        })
    }
}

fn check_node(
    node: &Component,
    horizontal_parent: Option<&ComponentId>,
    seen: &mut BTreeSet<ComponentId>,
) -> Result<(), InvariantViolation> {
    if !seen.insert(node.id.clone()) {
        return Err(InvariantViolation::DuplicateId {
            id: node.id.clone(),
        });
    }
    if !node.kind.is_group() && !node.children.is_empty() {
        return Err(InvariantViolation::LeafWithChildren {
            id: node.id.clone(),
            kind: node.kind,
        });
    }
    if node.is_horizontal_group() {
        if let Some(outer) = horizontal_parent {
            return Err(InvariantViolation::NestedHorizontalGroup {
                outer: outer.clone(),
                inner: node.id.clone(),
            });
        }
        let count = node.children.len();
        if !(MIN_GROUP_CHILDREN..=MAX_GROUP_CHILDREN).contains(&count) {
            return Err(InvariantViolation::GroupArity {
                id: node.id.clone(),
                children: count,
            });
        }
    }
    let enclosing = if node.is_horizontal_group() {
        Some(&node.id)
    } else {
        horizontal_parent
    };
    for child in &node.children {
        check_node(child, enclosing, seen)?;
    }
    Ok(())
}
