#![forbid(unsafe_code)]

//! Structural constraint resolver.
//!
//! Rewrites a raw geometric [`DropIntent`] into a placement that respects
//! the tree shape rules. The resolver is pure: it never touches a tree, only
//! a [`DropContext`] summarizing the target's surroundings.
//!
//! Rules, applied in this order:
//!
//! 1. A group unit (a horizontal group, or anything containing one) dropped
//!    on or inside a horizontal group lands as a vertical sibling of that
//!    group: `Before` for `Before`/`Left`, `After` otherwise.
//! 2. A group unit never goes sideways: `Left`/`Right` become
//!    `Before`/`After`.
//! 3. Against a horizontal group target, `Before`/`After` become
//!    `Left`/`Right`; the group's internal axis is horizontal only.
//! 4. `Left`/`Right` against a full horizontal group (or one of its direct
//!    children) fall back to `After` the group, unless the dragged item is
//!    already a member and the drop is a reorder.
//!
//! Everything else passes through unchanged. Legality of the final
//! placement is decided by the engine.

use serde::{Deserialize, Serialize};
use tracing::trace;

use formloom_core::DropIntent;

use crate::component::{Component, ComponentId, ComponentKind, MAX_GROUP_CHILDREN};
use crate::tree::ComponentTree;

/// The thing being dragged: a palette entry or an existing component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraggedItem {
    /// `None` for palette items that do not exist in the tree yet.
    pub id: Option<ComponentId>,
    pub kind: ComponentKind,
    /// Horizontal group, or a subtree containing one.
    pub group_unit: bool,
}

impl DraggedItem {
    /// A new component dragged from the palette.
    #[must_use]
    pub fn palette(kind: ComponentKind) -> Self {
        Self {
            id: None,
            kind,
            group_unit: kind == ComponentKind::HorizontalGroup,
        }
    }

    /// An existing component being moved.
    #[must_use]
    pub fn existing(component: &Component) -> Self {
        Self {
            id: Some(component.id.clone()),
            kind: component.kind,
            group_unit: component.contains_horizontal_group(),
        }
    }

    #[must_use]
    pub fn is_existing(&self) -> bool {
        self.id.is_some()
    }
}

/// Nearest horizontal group at or above the drop target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowContext {
    pub id: ComponentId,
    /// Direct children, in order.
    pub members: Vec<ComponentId>,
    /// The target is the row itself or one of its direct children.
    pub direct: bool,
}

impl RowContext {
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.members.len() >= MAX_GROUP_CHILDREN
    }
}

/// Drop target summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetContext {
    pub id: ComponentId,
    pub kind: ComponentKind,
    pub row: Option<RowContext>,
}

/// Where a drop lands before resolution.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DropContext {
    /// `None` for the empty canvas area.
    pub target: Option<TargetContext>,
}

impl DropContext {
    /// Drop onto the canvas background.
    #[must_use]
    pub fn canvas() -> Self {
        Self { target: None }
    }

    /// Summarize `target` within `tree`. `None` when the id is unknown.
    #[must_use]
    pub fn for_target(tree: &ComponentTree, target: &ComponentId) -> Option<Self> {
        let path = tree.path_of(target)?;
        let node = tree.node_at(&path)?;

        let row_path = if node.is_horizontal_group() {
            Some(path.clone())
        } else {
            tree.horizontal_ancestor(&path)
        };
        let row = match row_path {
            Some(row_path) => {
                let row = tree.node_at(&row_path)?;
                Some(RowContext {
                    id: row.id.clone(),
                    members: row.children().iter().map(|c| c.id.clone()).collect(),
                    direct: path.len() <= row_path.len() + 1,
                })
            }
            None => None,
        };

        Some(Self {
            target: Some(TargetContext {
                id: node.id.clone(),
                kind: node.kind,
                row,
            }),
        })
    }
}

/// Resolved drop location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DropPlacement {
    /// `None` means the canvas root list.
    pub target: Option<ComponentId>,
    pub intent: DropIntent,
}

impl DropPlacement {
    #[must_use]
    pub fn new(target: Option<ComponentId>, intent: DropIntent) -> Self {
        Self { target, intent }
    }
}

/// Rewrite `intent` into a placement that respects the structural rules.
#[must_use]
pub fn resolve(intent: DropIntent, dragged: &DraggedItem, context: &DropContext) -> DropPlacement {
    let Some(target) = &context.target else {
        return DropPlacement::new(None, intent);
    };
    let resolved = resolve_against(intent, dragged, target);
    if resolved.intent != intent || resolved.target.as_ref() != Some(&target.id) {
        trace!(
            raw = intent.as_str(),
            resolved = resolved.intent.as_str(),
            target = %target.id,
            resolved_target = resolved.target.as_ref().map(ComponentId::as_str),
            "drop intent rewritten"
        );
    }
    resolved
}

/// Build the drop context for `target` in `tree` and [`resolve`] against it.
///
/// An unknown target is passed through untouched so the engine reports it.
#[must_use]
pub fn resolve_in(
    tree: &ComponentTree,
    intent: DropIntent,
    dragged: &DraggedItem,
    target: Option<&ComponentId>,
) -> DropPlacement {
    match target {
        None => resolve(intent, dragged, &DropContext::canvas()),
        Some(id) => match DropContext::for_target(tree, id) {
            Some(context) => resolve(intent, dragged, &context),
            None => DropPlacement::new(Some(id.clone()), intent),
        },
    }
}

fn resolve_against(
    intent: DropIntent,
    dragged: &DraggedItem,
    target: &TargetContext,
) -> DropPlacement {
    if dragged.group_unit {
        if let Some(row) = &target.row {
            let vertical = match intent {
                DropIntent::Before | DropIntent::Left => DropIntent::Before,
                DropIntent::After | DropIntent::Right | DropIntent::Inside => DropIntent::After,
            };
            return DropPlacement::new(Some(row.id.clone()), vertical);
        }
        let vertical = match intent {
            DropIntent::Left => DropIntent::Before,
            DropIntent::Right => DropIntent::After,
            other => other,
        };
        return DropPlacement::new(Some(target.id.clone()), vertical);
    }

    let intent = if target.kind == ComponentKind::HorizontalGroup {
        match intent {
            DropIntent::Before => DropIntent::Left,
            DropIntent::After => DropIntent::Right,
            other => other,
        }
    } else {
        intent
    };

    if intent.is_horizontal()
        && let Some(row) = &target.row
        && row.direct
        && row.is_full()
        && !dragged
            .id
            .as_ref()
            .is_some_and(|id| row.members.contains(id))
    {
        return DropPlacement::new(Some(row.id.clone()), DropIntent::After);
    }

    DropPlacement::new(Some(target.id.clone()), intent)
}
