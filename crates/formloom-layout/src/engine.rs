#![forbid(unsafe_code)]

//! Tree mutation engine.
//!
//! Every structural change goes through [`ComponentTree::apply`]. The
//! operation runs against a clone of the tree; on success the new tree is
//! checked against the structural invariants and returned alongside an
//! [`OperationOutcome`]. On failure the caller's tree is untouched and the
//! structured [`OperationFailure`] says why.
//!
//! `apply` takes placements verbatim. The convenience functions at the
//! bottom of this module return the input tree when an operation is
//! rejected. [`add_component`] places literally, so a side drop on a full
//! group is a no-op; [`move_component`] and [`drop_operation`] run the
//! constraint resolver first.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use formloom_core::DropIntent;

use crate::component::{
    Attribute, Component, ComponentId, ComponentKind, MAX_GROUP_CHILDREN, MIN_GROUP_CHILDREN,
};
use crate::constraints::{DraggedItem, DropPlacement, resolve_in};
use crate::factory::ComponentFactory;
use crate::patch::ComponentPatch;
use crate::tree::{ComponentTree, InvariantViolation, NodePath};

/// Structural edit request.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeOperation {
    /// Place a new component (and its subtree) relative to `target`.
    Insert {
        component: Component,
        target: Option<ComponentId>,
        intent: DropIntent,
    },
    /// Merge attributes into an existing component.
    Update {
        id: ComponentId,
        patch: ComponentPatch,
    },
    /// Delete a component and its subtree.
    Remove { id: ComponentId },
    /// Relocate an existing subtree, ids preserved.
    Move {
        source: ComponentId,
        target: Option<ComponentId>,
        intent: DropIntent,
    },
    /// Insert a fresh-id deep copy right after the original.
    Duplicate { id: ComponentId },
}

impl TreeOperation {
    #[must_use]
    pub const fn kind(&self) -> OperationKind {
        match self {
            Self::Insert { .. } => OperationKind::Insert,
            Self::Update { .. } => OperationKind::Update,
            Self::Remove { .. } => OperationKind::Remove,
            Self::Move { .. } => OperationKind::Move,
            Self::Duplicate { .. } => OperationKind::Duplicate,
        }
    }

    fn referenced(&self) -> Vec<ComponentId> {
        match self {
            Self::Insert {
                component, target, ..
            } => std::iter::once(component.id.clone())
                .chain(target.clone())
                .collect(),
            Self::Update { id, .. } | Self::Remove { id } | Self::Duplicate { id } => {
                vec![id.clone()]
            }
            Self::Move { source, target, .. } => std::iter::once(source.clone())
                .chain(target.clone())
                .collect(),
        }
    }
}

/// Stable operation discriminator used in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Insert,
    Update,
    Remove,
    Move,
    Duplicate,
}

impl OperationKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Remove => "remove",
            Self::Move => "move",
            Self::Duplicate => "duplicate",
        }
    }
}

/// A horizontal group that fell below two children and was removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dissolution {
    pub group: ComponentId,
    /// Child that took the group's slot, if any was left.
    pub promoted: Option<ComponentId>,
}

/// Successful operation result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationOutcome {
    pub kind: OperationKind,
    /// Ids referenced or structurally affected, in first-touch order.
    pub touched: Vec<ComponentId>,
    /// Node placed by an insert, move, or duplicate.
    pub placed: Option<ComponentId>,
    /// Horizontal groups created by side-by-side drops.
    pub created_groups: Vec<ComponentId>,
    pub dissolved: Vec<Dissolution>,
    /// Patch attributes ignored because the kind does not carry them.
    pub dropped_attributes: Vec<Attribute>,
}

impl OperationOutcome {
    fn new(kind: OperationKind, referenced: Vec<ComponentId>) -> Self {
        let mut outcome = Self {
            kind,
            touched: Vec::new(),
            placed: None,
            created_groups: Vec::new(),
            dissolved: Vec::new(),
            dropped_attributes: Vec::new(),
        };
        for id in referenced {
            outcome.touch(id);
        }
        outcome
    }

    fn touch(&mut self, id: ComponentId) {
        if !self.touched.contains(&id) {
            self.touched.push(id);
        }
    }
}

/// Failure payload for [`ComponentTree::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationError {
    pub kind: OperationKind,
    pub reason: OperationFailure,
}

impl fmt::Display for OperationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} rejected: {}", self.kind.as_str(), self.reason)
    }
}

impl OperationError {
    /// Log the rejection: `error` for caller bugs, `debug` for refused gestures.
    pub fn log(&self) {
        if self.reason.is_programmer_error() {
            error!(op = self.kind.as_str(), reason = %self.reason, "operation rejected");
        } else {
            debug!(op = self.kind.as_str(), reason = %self.reason, "operation rejected");
        }
    }
}

impl std::error::Error for OperationError {}

/// Structured reasons for operation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationFailure {
    MissingNode {
        id: ComponentId,
    },
    /// An inserted id already exists in the tree.
    DuplicateId {
        id: ComponentId,
    },
    AncestorConflict {
        ancestor: ComponentId,
        descendant: ComponentId,
    },
    GroupFull {
        group: ComponentId,
    },
    /// `item` contains a horizontal group and would land inside one.
    /// `container` is `None` when the group would be created by the drop.
    NestedHorizontalGroup {
        item: ComponentId,
        container: Option<ComponentId>,
    },
    /// Wrapping `target` side by side would create a horizontal group
    /// inside `row`.
    WrapInsideHorizontalGroup {
        target: ComponentId,
        row: ComponentId,
    },
    NoEligibleContainer {
        target: ComponentId,
    },
    /// The inserted subtree is malformed on its own.
    InvalidComponent(InvariantViolation),
    /// The result failed the post-operation invariant check.
    Invariant(InvariantViolation),
    /// An internal node path stopped resolving mid-operation.
    DanglingPath,
}

impl OperationFailure {
    /// Failures that indicate a caller bug rather than an illegal gesture.
    #[must_use]
    pub fn is_programmer_error(&self) -> bool {
        matches!(
            self,
            Self::MissingNode { .. }
                | Self::DuplicateId { .. }
                | Self::InvalidComponent(_)
                | Self::Invariant(_)
                | Self::DanglingPath
        )
    }
}

impl fmt::Display for OperationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingNode { id } => write!(f, "component {id} not found"),
            Self::DuplicateId { id } => write!(f, "component id {id} already exists"),
            Self::AncestorConflict {
                ancestor,
                descendant,
            } => write!(
                f,
                "component {ancestor} cannot be dropped onto itself or its descendant {descendant}"
            ),
            Self::GroupFull { group } => write!(
                f,
                "horizontal group {group} already holds {MAX_GROUP_CHILDREN} components"
            ),
            Self::NestedHorizontalGroup {
                item,
                container: Some(container),
            } => write!(
                f,
                "component {item} contains a horizontal group and cannot be placed inside horizontal group {container}"
            ),
            Self::NestedHorizontalGroup {
                item,
                container: None,
            } => write!(
                f,
                "component {item} contains a horizontal group and cannot be placed side by side"
            ),
            Self::WrapInsideHorizontalGroup { target, row } => write!(
                f,
                "placing beside {target} would nest a horizontal group inside {row}"
            ),
            Self::NoEligibleContainer { target } => {
                write!(f, "no container at or above {target} accepts the component")
            }
            Self::InvalidComponent(violation) => write!(f, "invalid component: {violation}"),
            Self::Invariant(violation) => write!(f, "invariant violated: {violation}"),
            Self::DanglingPath => f.write_str("internal node path no longer resolves"),
        }
    }
}

type OpResult<T> = Result<T, OperationFailure>;

impl ComponentTree {
    /// Apply `operation` to a copy of this tree.
    ///
    /// `factory` supplies ids for horizontal groups created by side-by-side
    /// drops and for duplicates.
    pub fn apply(
        &self,
        factory: &mut ComponentFactory,
        operation: TreeOperation,
    ) -> Result<(ComponentTree, OperationOutcome), OperationError> {
        let kind = operation.kind();
        let mut working = self.clone();
        let mut outcome = OperationOutcome::new(kind, operation.referenced());

        if let Err(reason) = working.apply_inner(factory, operation, &mut outcome) {
            return Err(OperationError { kind, reason });
        }
        if let Err(violation) = working.check_invariants() {
            error!(
                op = kind.as_str(),
                %violation,
                "operation produced an invalid tree"
            );
            return Err(OperationError {
                kind,
                reason: OperationFailure::Invariant(violation),
            });
        }
        Ok((working, outcome))
    }

    fn apply_inner(
        &mut self,
        factory: &mut ComponentFactory,
        operation: TreeOperation,
        outcome: &mut OperationOutcome,
    ) -> OpResult<()> {
        match operation {
            TreeOperation::Insert {
                component,
                target,
                intent,
            } => {
                let item = Arc::new(component);
                self.ensure_insertable(&item)?;
                outcome.placed = Some(item.id.clone());
                self.place(factory, item, target.as_ref(), intent, outcome)
            }
            TreeOperation::Update { id, patch } => {
                let path = self.require(&id)?;
                let mut node = Component::clone(self.node_ref(&path)?);
                let report = patch.apply_to(&mut node);
                if !report.dropped.is_empty() {
                    debug!(
                        id = %id,
                        kind = node.kind.as_str(),
                        dropped = ?report.dropped.iter().map(|a| a.as_str()).collect::<Vec<_>>(),
                        "unsupported attributes dropped"
                    );
                }
                outcome.dropped_attributes = report.dropped;
                if report.changed {
                    *self.node_mut(&path).ok_or_else(|| missing(&id))? = node;
                }
                Ok(())
            }
            TreeOperation::Remove { id } => {
                let path = self.require(&id)?;
                self.detach(&path, outcome).map(drop)
            }
            TreeOperation::Move {
                source,
                target,
                intent,
            } => self.move_subtree(factory, &source, target.as_ref(), intent, outcome),
            TreeOperation::Duplicate { id } => {
                let path = self.require(&id)?;
                let copy = Arc::new(factory.duplicate(self.node_ref(&path)?));
                self.ensure_insertable(&copy)?;
                outcome.placed = Some(copy.id.clone());
                outcome.touch(copy.id.clone());

                if let Some((&index, row_path)) = path.split_last() {
                    let in_row = !row_path.is_empty()
                        && self
                            .node_at(row_path)
                            .is_some_and(|parent| parent.is_horizontal_group());
                    if in_row && self.row_accepts(row_path, &copy).is_ok() {
                        let list = self.list_mut(row_path).ok_or_else(dangling)?;
                        list.insert(index + 1, copy);
                        return Ok(());
                    }
                }
                self.place_vertical(copy, path, true)
            }
        }
    }

    // ------------------------------------------------------------------
    // Placement
    // ------------------------------------------------------------------

    fn place(
        &mut self,
        factory: &mut ComponentFactory,
        item: Arc<Component>,
        target: Option<&ComponentId>,
        intent: DropIntent,
        outcome: &mut OperationOutcome,
    ) -> OpResult<()> {
        let Some(target) = target else {
            let roots = self.list_mut(&[]).ok_or_else(dangling)?;
            if intent == DropIntent::Before {
                roots.insert(0, item);
            } else {
                roots.push(item);
            }
            return Ok(());
        };
        let path = self.require(target)?;
        match intent {
            DropIntent::Left => self.place_beside(factory, item, path, false, outcome),
            DropIntent::Right => self.place_beside(factory, item, path, true, outcome),
            DropIntent::Before => self.place_vertical(item, path, false),
            DropIntent::After => self.place_vertical(item, path, true),
            DropIntent::Inside => self.place_inside(item, path),
        }
    }

    /// Side-by-side placement relative to the node at `path`.
    fn place_beside(
        &mut self,
        factory: &mut ComponentFactory,
        item: Arc<Component>,
        path: NodePath,
        after: bool,
        outcome: &mut OperationOutcome,
    ) -> OpResult<()> {
        let target = self.node_ref(&path)?;
        let target_id = target.id.clone();
        match target.kind {
            ComponentKind::HorizontalGroup => {
                self.row_accepts(&path, &item)?;
                let list = self.list_mut(&path).ok_or_else(|| missing(&target_id))?;
                if after {
                    list.push(item);
                } else {
                    list.insert(0, item);
                }
                Ok(())
            }
            ComponentKind::VerticalGroup => {
                self.column_accepts(&path, &item)?;
                let list = self.list_mut(&path).ok_or_else(|| missing(&target_id))?;
                if after {
                    list.push(item);
                } else {
                    list.insert(0, item);
                }
                Ok(())
            }
            _ => {
                let Some((&index, container)) = path.split_last() else {
                    return Err(missing(&target_id));
                };
                let in_row = !container.is_empty()
                    && self
                        .node_at(container)
                        .is_some_and(|parent| parent.is_horizontal_group());
                if in_row {
                    self.row_accepts(container, &item)?;
                    let list = self.list_mut(container).ok_or_else(|| missing(&target_id))?;
                    list.insert(index + usize::from(after), item);
                    return Ok(());
                }
                if let Some(row_path) = self.horizontal_ancestor(&path) {
                    return Err(OperationFailure::WrapInsideHorizontalGroup {
                        target: target_id,
                        row: self.node_ref(&row_path)?.id.clone(),
                    });
                }
                if item.contains_horizontal_group() {
                    return Err(OperationFailure::NestedHorizontalGroup {
                        item: item.id.clone(),
                        container: None,
                    });
                }

                let existing = Arc::clone(self.node_ref(&path)?);
                let mut row = factory.create(ComponentKind::HorizontalGroup);
                if self.contains(&row.id) {
                    return Err(OperationFailure::DuplicateId { id: row.id });
                }
                row.children = if after {
                    vec![existing, item]
                } else {
                    vec![item, existing]
                };
                outcome.created_groups.push(row.id.clone());
                outcome.touch(row.id.clone());
                let list = self.list_mut(container).ok_or_else(|| missing(&target_id))?;
                list[index] = Arc::new(row);
                Ok(())
            }
        }
    }

    /// Sibling placement above or below `path`, climbing out of horizontal
    /// groups until a container accepts the item.
    fn place_vertical(
        &mut self,
        item: Arc<Component>,
        path: NodePath,
        after: bool,
    ) -> OpResult<()> {
        let mut anchor = path;
        loop {
            let Some((&index, container)) = anchor.split_last() else {
                return Err(dangling());
            };
            let container = container.to_vec();
            let legal = container.is_empty()
                || (self
                    .node_at(&container)
                    .is_some_and(|node| node.kind == ComponentKind::VerticalGroup)
                    && self.column_accepts(&container, &item).is_ok());
            if legal {
                let list = self.list_mut(&container).ok_or_else(dangling)?;
                list.insert(index + usize::from(after), item);
                return Ok(());
            }
            anchor = container;
        }
    }

    /// Append to the nearest eligible container at or above `path`.
    fn place_inside(&mut self, item: Arc<Component>, path: NodePath) -> OpResult<()> {
        let target = self.node_ref(&path)?.id.clone();
        let mut first_refusal = None;
        for depth in (1..=path.len()).rev() {
            let prefix = &path[..depth];
            let check = match self.node_ref(prefix)?.kind {
                ComponentKind::HorizontalGroup => self.row_accepts(prefix, &item),
                ComponentKind::VerticalGroup => self.column_accepts(prefix, &item),
                _ => continue,
            };
            match check {
                Ok(()) => {
                    let list = self.list_mut(prefix).ok_or_else(|| missing(&target))?;
                    list.push(item);
                    return Ok(());
                }
                Err(reason) => {
                    first_refusal.get_or_insert(reason);
                }
            }
        }
        Err(first_refusal.unwrap_or(OperationFailure::NoEligibleContainer { target }))
    }

    fn row_accepts(&self, row_path: &[usize], item: &Component) -> OpResult<()> {
        let row = self.node_ref(row_path)?;
        if item.contains_horizontal_group() {
            return Err(OperationFailure::NestedHorizontalGroup {
                item: item.id.clone(),
                container: Some(row.id.clone()),
            });
        }
        if row.children().len() >= MAX_GROUP_CHILDREN {
            return Err(OperationFailure::GroupFull {
                group: row.id.clone(),
            });
        }
        Ok(())
    }

    fn column_accepts(&self, column_path: &[usize], item: &Component) -> OpResult<()> {
        if !item.contains_horizontal_group() {
            return Ok(());
        }
        match self.horizontal_ancestor(column_path) {
            Some(row_path) => Err(OperationFailure::NestedHorizontalGroup {
                item: item.id.clone(),
                container: Some(self.node_ref(&row_path)?.id.clone()),
            }),
            None => Ok(()),
        }
    }

    // ------------------------------------------------------------------
    // Removal and moves
    // ------------------------------------------------------------------

    /// Remove the node at `path`, dissolving a horizontal group left with
    /// fewer than two children.
    fn detach(
        &mut self,
        path: &[usize],
        outcome: &mut OperationOutcome,
    ) -> OpResult<Arc<Component>> {
        let Some((&index, container)) = path.split_last() else {
            return Err(dangling());
        };
        let list = self.list_mut(container).ok_or_else(dangling)?;
        if index >= list.len() {
            return Err(dangling());
        }
        let removed = list.remove(index);
        self.dissolve_undersized(container.to_vec(), outcome)?;
        Ok(removed)
    }

    fn dissolve_undersized(
        &mut self,
        mut container: NodePath,
        outcome: &mut OperationOutcome,
    ) -> OpResult<()> {
        loop {
            let Some((&index, parent)) = container.split_last() else {
                return Ok(());
            };
            let parent = parent.to_vec();
            let node = self.node_ref(&container)?;
            if !node.is_horizontal_group() || node.children().len() >= MIN_GROUP_CHILDREN {
                return Ok(());
            }
            let group = node.id.clone();
            let promoted = node.children().first().cloned();
            let promoted_id = promoted.as_ref().map(|child| child.id.clone());

            let list = self.list_mut(&parent).ok_or_else(dangling)?;
            match promoted {
                Some(child) => list[index] = child,
                None => {
                    list.remove(index);
                }
            }
            debug!(
                group = %group,
                promoted = ?promoted_id.as_ref().map(ComponentId::as_str),
                "horizontal group dissolved"
            );
            outcome.touch(group.clone());
            outcome.dissolved.push(Dissolution {
                group,
                promoted: promoted_id,
            });
            container = parent;
        }
    }

    fn move_subtree(
        &mut self,
        factory: &mut ComponentFactory,
        source: &ComponentId,
        target: Option<&ComponentId>,
        intent: DropIntent,
        outcome: &mut OperationOutcome,
    ) -> OpResult<()> {
        let source_path = self.require(source)?;
        if let Some(target) = target {
            self.require(target)?;
            if target == source || self.is_descendant(source, target) {
                return Err(OperationFailure::AncestorConflict {
                    ancestor: source.clone(),
                    descendant: target.clone(),
                });
            }
            if intent.is_horizontal() && self.reorder_in_row(&source_path, target, intent)? {
                outcome.placed = Some(source.clone());
                return Ok(());
            }
        }

        let item = self.detach(&source_path, outcome)?;
        let target = target.map(|target| {
            outcome
                .dissolved
                .iter()
                .find(|d| d.group == *target)
                .and_then(|d| d.promoted.clone())
                .unwrap_or_else(|| target.clone())
        });
        outcome.placed = Some(source.clone());
        self.place(factory, item, target.as_ref(), intent, outcome)
    }

    /// Reorder `source` within its own horizontal group. Returns `false`
    /// when the move is not a same-row reorder.
    fn reorder_in_row(
        &mut self,
        source_path: &[usize],
        target: &ComponentId,
        intent: DropIntent,
    ) -> OpResult<bool> {
        let Some((&source_index, row_path)) = source_path.split_last() else {
            return Ok(false);
        };
        if row_path.is_empty() {
            return Ok(false);
        }
        let row = self.node_ref(row_path)?;
        if !row.is_horizontal_group() {
            return Ok(false);
        }
        let after = intent == DropIntent::Right;
        let last = row.children().len() - 1;

        let destination = if row.id == *target {
            if after { last } else { 0 }
        } else {
            let target_path = self.require(target)?;
            match target_path.split_last() {
                Some((&target_index, target_row)) if target_row == row_path => {
                    let shifted = if target_index > source_index {
                        target_index - 1
                    } else {
                        target_index
                    };
                    shifted + usize::from(after)
                }
                _ => return Ok(false),
            }
        };

        let row_id = row.id.clone();
        let list = self.list_mut(row_path).ok_or_else(|| missing(&row_id))?;
        let node = list.remove(source_index);
        list.insert(destination, node);
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn require(&self, id: &ComponentId) -> OpResult<NodePath> {
        self.path_of(id).ok_or_else(|| missing(id))
    }

    fn node_ref(&self, path: &[usize]) -> OpResult<&Arc<Component>> {
        self.node_at(path).ok_or_else(dangling)
    }

    fn ensure_insertable(&self, item: &Arc<Component>) -> OpResult<()> {
        ComponentTree::from_shared(vec![Arc::clone(item)])
            .check_invariants()
            .map_err(OperationFailure::InvalidComponent)?;
        let mut clash = None;
        item.walk(&mut |node| {
            if clash.is_none() && self.contains(&node.id) {
                clash = Some(node.id.clone());
            }
        });
        match clash {
            Some(id) => Err(OperationFailure::DuplicateId { id }),
            None => Ok(()),
        }
    }
}

fn missing(id: &ComponentId) -> OperationFailure {
    OperationFailure::MissingNode { id: id.clone() }
}

fn dangling() -> OperationFailure {
    OperationFailure::DanglingPath
}

// ----------------------------------------------------------------------
// Resolving convenience surface
// ----------------------------------------------------------------------

fn apply_or_keep(
    tree: &ComponentTree,
    factory: &mut ComponentFactory,
    operation: TreeOperation,
) -> ComponentTree {
    match tree.apply(factory, operation) {
        Ok((next, _)) => next,
        Err(err) => {
            err.log();
            tree.clone()
        }
    }
}

/// Resolve a drop of `dragged` and build the matching operation.
///
/// Palette items get a fresh component from `factory`; existing items
/// become a move.
#[must_use]
pub fn drop_operation(
    tree: &ComponentTree,
    factory: &mut ComponentFactory,
    dragged: &DraggedItem,
    target: Option<&ComponentId>,
    intent: DropIntent,
) -> TreeOperation {
    let DropPlacement { target, intent } = resolve_in(tree, intent, dragged, target);
    match &dragged.id {
        Some(source) => TreeOperation::Move {
            source: source.clone(),
            target,
            intent,
        },
        None => TreeOperation::Insert {
            component: factory.create(dragged.kind),
            target,
            intent,
        },
    }
}

/// Add a new component of `kind` exactly where `intent` says. Returns
/// `tree` unchanged on rejection.
pub fn add_component(
    tree: &ComponentTree,
    factory: &mut ComponentFactory,
    kind: ComponentKind,
    target: Option<&ComponentId>,
    intent: DropIntent,
) -> ComponentTree {
    let operation = TreeOperation::Insert {
        component: factory.create(kind),
        target: target.cloned(),
        intent,
    };
    apply_or_keep(tree, factory, operation)
}

/// Merge `patch` into component `id`. Returns `tree` unchanged on rejection.
pub fn update_component(
    tree: &ComponentTree,
    id: &ComponentId,
    patch: ComponentPatch,
) -> ComponentTree {
    apply_or_keep(
        tree,
        &mut ComponentFactory::default(),
        TreeOperation::Update {
            id: id.clone(),
            patch,
        },
    )
}

/// Remove component `id` and its subtree.
pub fn remove_component(tree: &ComponentTree, id: &ComponentId) -> ComponentTree {
    apply_or_keep(
        tree,
        &mut ComponentFactory::default(),
        TreeOperation::Remove { id: id.clone() },
    )
}

/// Move component `source` to the resolved placement relative to `target`.
pub fn move_component(
    tree: &ComponentTree,
    factory: &mut ComponentFactory,
    source: &ComponentId,
    target: Option<&ComponentId>,
    intent: DropIntent,
) -> ComponentTree {
    let Some(node) = tree.get(source) else {
        OperationError {
            kind: OperationKind::Move,
            reason: missing(source),
        }
        .log();
        return tree.clone();
    };
    let operation = drop_operation(tree, factory, &DraggedItem::existing(node), target, intent);
    apply_or_keep(tree, factory, operation)
}
