#![forbid(unsafe_code)]

//! Drag gesture state machine.
//!
//! ```text
//! Idle --begin--> Dragging --hover--> Hovering --hover--> Hovering
//!                    |                   |
//!                    +------finish-------+--> Committing --settle--> Idle
//!                    |                   |
//!                    +------cancel-------+--> Idle
//! ```
//!
//! Every hover recomputes the raw intent from the pointer and resolves it
//! against the current tree. The resulting [`DropPreview`] is transient: the
//! session never touches committed state. [`DragSession::finish`] turns the
//! final site into a [`DropCommand`] for the caller to commit.

use formloom_core::{DropIntent, PlacementThresholds, Point, Rect, Size, classify, indicator_rect};
use formloom_layout::{
    ComponentFactory, ComponentId, ComponentKind, DraggedItem, DropPlacement, FormState,
    TreeOperation, drop_operation, resolve_in,
};
use tracing::{debug, trace};

/// What the user picked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragSource {
    /// A new component from the palette.
    Palette(ComponentKind),
    /// A component already on the current page.
    Existing(ComponentId),
}

/// Where the dragged item came from, captured at drag start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragOrigin {
    pub source: DragSource,
    /// Parent group of an existing item; `None` for roots and palette items.
    pub parent: Option<ComponentId>,
    /// Index among its siblings; `None` for palette items.
    pub index: Option<usize>,
}

/// What the pointer is over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DropSite<'a> {
    /// A rendered component, with the pointer relative to its top-left
    /// corner and its measured size.
    Component {
        id: &'a ComponentId,
        pointer: Point,
        size: Size,
    },
    /// Empty canvas area. Drops append to the page.
    Canvas,
    /// Released beyond the canvas bounds.
    Outside,
}

/// Hover feedback for the view layer.
#[derive(Debug, Clone, PartialEq)]
pub struct DropPreview {
    /// Intent read straight from the pointer position.
    pub raw: DropIntent,
    /// Where a drop would actually land.
    pub placement: DropPlacement,
    /// Whether the engine would accept the drop.
    pub legal: bool,
    /// Highlight in the hovered component's local coordinates. `None` when
    /// the placement moved to another node or for canvas drops.
    pub indicator: Option<Rect>,
}

/// Result of [`DragSession::finish`].
#[derive(Debug, Clone, PartialEq)]
pub enum DropCommand {
    /// Commit this operation.
    Commit(TreeOperation),
    /// A palette item released where nothing accepts it.
    Discard,
    /// Nothing to do: no gesture, or a drop onto the dragged item itself.
    Ignore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragPhase {
    #[default]
    Idle,
    Dragging,
    Hovering,
    Committing,
}

#[derive(Debug, Clone)]
struct ActiveDrag {
    origin: DragOrigin,
    item: DraggedItem,
}

/// One drag gesture at a time.
#[derive(Debug, Clone, Default)]
pub struct DragSession {
    thresholds: PlacementThresholds,
    phase: DragPhase,
    active: Option<ActiveDrag>,
    preview: Option<DropPreview>,
}

impl DragSession {
    #[must_use]
    pub fn new(thresholds: PlacementThresholds) -> Self {
        Self {
            thresholds,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    #[must_use]
    pub fn origin(&self) -> Option<&DragOrigin> {
        self.active.as_ref().map(|active| &active.origin)
    }

    /// Most recent hover preview, if any.
    #[must_use]
    pub fn preview(&self) -> Option<&DropPreview> {
        self.preview.as_ref()
    }

    #[must_use]
    pub fn thresholds(&self) -> &PlacementThresholds {
        &self.thresholds
    }

    pub fn set_thresholds(&mut self, thresholds: PlacementThresholds) {
        self.thresholds = thresholds;
    }

    /// Start a gesture. An unfinished gesture is abandoned first.
    ///
    /// Returns `false` when an existing source is not on the current page.
    pub fn begin(&mut self, state: &FormState, source: DragSource) -> bool {
        if self.active.is_some() {
            debug!("drag restarted before the previous gesture ended");
            self.cancel();
        }
        let (item, parent, index) = match &source {
            DragSource::Palette(kind) => (DraggedItem::palette(*kind), None, None),
            DragSource::Existing(id) => {
                let tree = state.tree();
                let Some(node) = tree.get(id) else {
                    debug!(id = %id, "drag start on unknown component");
                    return false;
                };
                let parent = tree.parent_of(id);
                let siblings = parent.map_or(tree.roots(), |group| group.children());
                let index = siblings.iter().position(|sibling| sibling.id == *id);
                (
                    DraggedItem::existing(node),
                    parent.map(|group| group.id.clone()),
                    index,
                )
            }
        };
        trace!(kind = item.kind.as_str(), existing = item.is_existing(), "drag started");
        self.active = Some(ActiveDrag {
            origin: DragOrigin {
                source,
                parent,
                index,
            },
            item,
        });
        self.phase = DragPhase::Dragging;
        true
    }

    /// Recompute the preview for a hover tick.
    ///
    /// `factory` is only cloned for the dry run; its sequence never advances.
    pub fn hover(
        &mut self,
        state: &FormState,
        factory: &ComponentFactory,
        site: DropSite<'_>,
    ) -> Option<&DropPreview> {
        let active = self.active.as_ref()?;
        if self.phase == DragPhase::Committing {
            return None;
        }
        self.phase = DragPhase::Hovering;
        self.preview = preview_for(&self.thresholds, active, state, factory, site);
        self.preview.as_ref()
    }

    /// Turn the release point into a command and enter `Committing`.
    /// Call [`settle`](Self::settle) once the command has been handled.
    pub fn finish(
        &mut self,
        state: &FormState,
        factory: &mut ComponentFactory,
        site: DropSite<'_>,
    ) -> DropCommand {
        let Some(active) = self.active.as_ref() else {
            return DropCommand::Ignore;
        };
        if self.phase == DragPhase::Committing {
            return DropCommand::Ignore;
        }
        self.phase = DragPhase::Committing;
        self.preview = None;
        let tree = state.tree();
        let item = &active.item;
        match site {
            DropSite::Component { id, pointer, size } => {
                if !tree.contains(id) || lands_on_itself(state, item, id) {
                    return DropCommand::Ignore;
                }
                let raw = classify(pointer, size, &self.thresholds);
                DropCommand::Commit(drop_operation(tree, factory, item, Some(id), raw))
            }
            DropSite::Canvas => {
                DropCommand::Commit(drop_operation(tree, factory, item, None, DropIntent::After))
            }
            DropSite::Outside => match &item.id {
                Some(id) => DropCommand::Commit(TreeOperation::Remove { id: id.clone() }),
                None => DropCommand::Discard,
            },
        }
    }

    /// Leave `Committing` and return to `Idle`.
    pub fn settle(&mut self) {
        self.reset();
    }

    /// Abort the gesture with no effect on committed state.
    pub fn cancel(&mut self) {
        if self.active.is_some() {
            trace!("drag cancelled");
        }
        self.reset();
    }

    fn reset(&mut self) {
        self.phase = DragPhase::Idle;
        self.active = None;
        self.preview = None;
    }
}

fn lands_on_itself(state: &FormState, item: &DraggedItem, target: &ComponentId) -> bool {
    item.id
        .as_ref()
        .is_some_and(|id| id == target || state.tree().is_descendant(id, target))
}

fn preview_for(
    thresholds: &PlacementThresholds,
    active: &ActiveDrag,
    state: &FormState,
    factory: &ComponentFactory,
    site: DropSite<'_>,
) -> Option<DropPreview> {
    let tree = state.tree();
    let item = &active.item;
    let (target, raw, size) = match site {
        DropSite::Outside => return None,
        DropSite::Canvas => (None, DropIntent::After, None),
        DropSite::Component { id, pointer, size } => {
            if !tree.contains(id) || lands_on_itself(state, item, id) {
                return None;
            }
            (Some(id), classify(pointer, size, thresholds), Some(size))
        }
    };

    let placement = resolve_in(tree, raw, item, target);
    let mut scratch = factory.clone();
    let operation = drop_operation(tree, &mut scratch, item, target, raw);
    let legal = state.apply(&mut scratch, operation).is_ok();
    let indicator = match (size, target) {
        (Some(size), Some(id)) if placement.target.as_ref() == Some(id) => {
            Some(indicator_rect(placement.intent, size))
        }
        _ => None,
    };
    Some(DropPreview {
        raw,
        placement,
        legal,
        indicator,
    })
}
