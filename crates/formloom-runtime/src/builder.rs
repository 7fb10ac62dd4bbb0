#![forbid(unsafe_code)]

//! The command surface a view layer talks to.
//!
//! [`FormBuilder`] owns the committed state and everything that changes it:
//! the undo [`History`], the id [`ComponentFactory`], the add cooldown gate
//! and the current [`DragSession`]. Views read [`FormBuilder::state`] or
//! [`subscribe`](FormBuilder::subscribe) to changes.
//!
//! Commands never fail for ordinary gestures. A refused edit (full row,
//! drop onto itself, unknown id) leaves the state as it was and the command
//! returns it unchanged. Only page commands and imports report errors.

use std::sync::Arc;

use formloom_core::{CooldownGate, DropIntent, GateDecision};
use formloom_layout::{
    ComponentFactory, ComponentId, ComponentKind, ComponentPatch, DraggedItem, FormLoadError,
    FormState, OperationError, OperationFailure, OperationKind, PageError, PageId,
    TreeOperation, ValidationReport, drop_operation, validate_form,
};
use tracing::{debug, info, trace};
use web_time::Instant;

use crate::config::{BuilderConfig, ConfigError};
use crate::drag::{DragSession, DragSource, DropCommand, DropPreview, DropSite};
use crate::reactive::{Observable, Subscription};
use crate::undo::History;

type AddKey = (ComponentKind, Option<ComponentId>, DropIntent);

/// Stateful editor for one form.
#[derive(Debug)]
pub struct FormBuilder {
    config: BuilderConfig,
    history: History<FormState>,
    published: Observable<FormState>,
    factory: ComponentFactory,
    add_gate: CooldownGate<AddKey>,
    drag: DragSession,
}

impl Default for FormBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FormBuilder {
    /// Empty single-page form with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::assemble(BuilderConfig::default(), FormState::new())
    }

    /// Empty form with `config`, which must validate.
    pub fn with_config(config: BuilderConfig) -> Result<Self, ConfigError> {
        Ok(Self::assemble(config.validated()?, FormState::new()))
    }

    /// Start editing an existing state.
    pub fn from_state(state: FormState, config: BuilderConfig) -> Result<Self, ConfigError> {
        Ok(Self::assemble(config.validated()?, state))
    }

    fn assemble(config: BuilderConfig, state: FormState) -> Self {
        let factory = ComponentFactory::seeded_from(config.id_prefix.clone(), &state);
        let history = History::with_max_depth(state, config.history.max_depth);
        Self {
            published: Observable::new(Arc::clone(history.present())),
            factory,
            history,
            add_gate: CooldownGate::new(config.add_cooldown()),
            drag: DragSession::new(config.placement),
            config,
        }
    }

    // ------------------------------------------------------------------
    // Reading
    // ------------------------------------------------------------------

    /// The committed state.
    #[must_use]
    pub fn state(&self) -> &FormState {
        self.history.present()
    }

    /// Call `callback` with every new state. Drop the guard to stop.
    pub fn subscribe(&self, callback: impl Fn(&FormState) + 'static) -> Subscription {
        self.published.subscribe(callback)
    }

    /// Increments on every published change.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.published.version()
    }

    #[must_use]
    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    #[must_use]
    pub fn factory(&self) -> &ComponentFactory {
        &self.factory
    }

    #[must_use]
    pub fn drag_session(&self) -> &DragSession {
        &self.drag
    }

    #[must_use]
    pub fn validate(&self) -> ValidationReport {
        validate_form(self.state())
    }

    // ------------------------------------------------------------------
    // Tree commands
    // ------------------------------------------------------------------

    /// Add a new `kind` exactly where `intent` says relative to `target`
    /// (`None` = the page itself).
    pub fn add_component(
        &mut self,
        kind: ComponentKind,
        target: Option<&ComponentId>,
        intent: DropIntent,
    ) -> &FormState {
        self.add_component_at(kind, target, intent, Instant::now())
    }

    /// [`add_component`](Self::add_component) with an explicit clock.
    ///
    /// A second identical request inside the cooldown window is dropped.
    pub fn add_component_at(
        &mut self,
        kind: ComponentKind,
        target: Option<&ComponentId>,
        intent: DropIntent,
        now: Instant,
    ) -> &FormState {
        let key = (kind, target.cloned(), intent);
        if let GateDecision::Coalesced { since_last } = self.add_gate.admit(key, now) {
            debug!(
                kind = kind.as_str(),
                since_last_ms = since_last.as_millis() as u64,
                "repeated add coalesced"
            );
            return self.state();
        }
        let component = self.factory.create(kind);
        self.run(TreeOperation::Insert {
            component,
            target: target.cloned(),
            intent,
        });
        self.state()
    }

    pub fn update_component(&mut self, id: &ComponentId, patch: ComponentPatch) -> &FormState {
        self.run(TreeOperation::Update {
            id: id.clone(),
            patch,
        });
        self.state()
    }

    /// Remove `id` and its subtree.
    pub fn delete_component(&mut self, id: &ComponentId) -> &FormState {
        self.run(TreeOperation::Remove { id: id.clone() });
        self.state()
    }

    /// Move `source` relative to `target`, resolving the intent first.
    pub fn move_component(
        &mut self,
        source: &ComponentId,
        target: Option<&ComponentId>,
        intent: DropIntent,
    ) -> &FormState {
        let tree = self.history.present().tree();
        let Some(node) = tree.get(source) else {
            OperationError {
                kind: OperationKind::Move,
                reason: OperationFailure::MissingNode { id: source.clone() },
            }
            .log();
            return self.state();
        };
        let operation = drop_operation(
            tree,
            &mut self.factory,
            &DraggedItem::existing(node),
            target,
            intent,
        );
        self.run(operation);
        self.state()
    }

    /// Insert a copy of `id` right after it.
    pub fn duplicate_component(&mut self, id: &ComponentId) -> &FormState {
        self.run(TreeOperation::Duplicate { id: id.clone() });
        self.state()
    }

    /// Select a component on the current page, or clear with `None`.
    ///
    /// Selection is not an undo step. Unknown ids are ignored.
    pub fn select_component(&mut self, id: Option<&ComponentId>) -> &FormState {
        match self.history.present().with_selection(id.cloned()) {
            Ok(next) => self.replace(next),
            Err(err) => debug!(error = %err, "selection ignored"),
        }
        self.state()
    }

    // ------------------------------------------------------------------
    // Pages
    // ------------------------------------------------------------------

    /// Append a page and switch to it.
    pub fn add_page(&mut self, title: impl Into<String>) -> PageId {
        let (next, id) = self.history.present().add_page(title);
        self.drag.cancel();
        self.commit(next);
        id
    }

    pub fn remove_page(&mut self, id: &PageId) -> Result<&FormState, PageError> {
        let next = self.history.present().remove_page(id)?;
        self.drag.cancel();
        self.commit(next);
        Ok(self.state())
    }

    pub fn rename_page(
        &mut self,
        id: &PageId,
        title: impl Into<String>,
    ) -> Result<&FormState, PageError> {
        let next = self.history.present().rename_page(id, title)?;
        self.commit(next);
        Ok(self.state())
    }

    /// Switch the page being edited. Navigation is not an undo step.
    pub fn set_current_page(&mut self, id: &PageId) -> Result<&FormState, PageError> {
        let next = self.history.present().set_current_page(id)?;
        self.drag.cancel();
        self.replace(next);
        Ok(self.state())
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    pub fn undo(&mut self) -> &FormState {
        if self.history.undo().is_some() {
            self.drag.cancel();
            debug!(past = self.history.past_len(), "undo");
            self.publish();
        }
        self.state()
    }

    pub fn redo(&mut self) -> &FormState {
        if self.history.redo().is_some() {
            self.drag.cancel();
            debug!(future = self.history.future_len(), "redo");
            self.publish();
        }
        self.state()
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ------------------------------------------------------------------
    // Import / export
    // ------------------------------------------------------------------

    /// Replace the whole form with a JSON document. History starts over.
    /// On error nothing changes.
    pub fn load_json(&mut self, input: &str) -> Result<&FormState, FormLoadError> {
        let state = FormState::from_json(input)?;
        self.factory.observe(&state);
        self.history.reset(state);
        self.drag.cancel();
        self.add_gate.reset();
        info!(
            pages = self.state().pages().len(),
            components = self.state().all_ids().len(),
            "form loaded"
        );
        self.publish();
        Ok(self.state())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        self.state().to_json()
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        self.state().to_json_pretty()
    }

    // ------------------------------------------------------------------
    // Drag lifecycle
    // ------------------------------------------------------------------

    /// Returns `false` when the source is not on the current page.
    pub fn on_drag_start(&mut self, source: DragSource) -> bool {
        self.drag.begin(self.history.present(), source)
    }

    /// Preview for the current pointer position. Never changes state.
    pub fn on_drag_hover(&mut self, site: DropSite<'_>) -> Option<&DropPreview> {
        self.drag.hover(self.history.present(), &self.factory, site)
    }

    /// Finish the gesture and commit whatever it resolves to.
    pub fn on_drop(&mut self, site: DropSite<'_>) -> &FormState {
        let command = self
            .drag
            .finish(self.history.present(), &mut self.factory, site);
        match command {
            DropCommand::Commit(operation) => {
                self.run(operation);
            }
            DropCommand::Discard => debug!("palette item dropped outside the canvas"),
            DropCommand::Ignore => trace!("drop ignored"),
        }
        self.drag.settle();
        self.state()
    }

    /// Abort the gesture. Committed state is untouched.
    pub fn on_drag_cancel(&mut self) {
        self.drag.cancel();
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn run(&mut self, operation: TreeOperation) -> bool {
        let kind = operation.kind();
        match self.history.present().apply(&mut self.factory, operation) {
            Ok((next, outcome)) => {
                trace!(
                    op = kind.as_str(),
                    touched = outcome.touched.len(),
                    dissolved = outcome.dissolved.len(),
                    "operation applied"
                );
                self.commit(next)
            }
            Err(err) => {
                err.log();
                false
            }
        }
    }

    fn commit(&mut self, next: FormState) -> bool {
        if !self.history.commit(next) {
            return false;
        }
        debug!(past = self.history.past_len(), "state committed");
        self.publish();
        true
    }

    fn replace(&mut self, next: FormState) {
        if next == *self.state() {
            return;
        }
        self.history.replace_present(next);
        self.publish();
    }

    fn publish(&self) {
        self.published.set(Arc::clone(self.history.present()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formloom_core::{Point, Size};
    use std::cell::Cell;
    use std::rc::Rc;
    use std::time::Duration;

    fn root_kinds(builder: &FormBuilder) -> Vec<ComponentKind> {
        builder.state().tree().roots().iter().map(|n| n.kind).collect()
    }

    fn root_id(builder: &FormBuilder, index: usize) -> ComponentId {
        builder.state().tree().roots()[index].id.clone()
    }

    #[test]
    fn three_adds_two_undos_one_redo() {
        let mut builder = FormBuilder::new();
        for kind in [ComponentKind::TextInput, ComponentKind::Email, ComponentKind::Date] {
            builder.add_component(kind, None, DropIntent::After);
        }
        assert_eq!(builder.state().tree().roots().len(), 3);

        builder.undo();
        builder.undo();
        assert_eq!(root_kinds(&builder), vec![ComponentKind::TextInput]);

        builder.redo();
        assert_eq!(
            root_kinds(&builder),
            vec![ComponentKind::TextInput, ComponentKind::Email]
        );
        assert!(builder.can_undo());
        assert!(builder.can_redo());
    }

    #[test]
    fn repeated_add_inside_cooldown_is_coalesced() {
        let mut builder = FormBuilder::new();
        let t0 = Instant::now();
        builder.add_component_at(ComponentKind::Select, None, DropIntent::After, t0);
        builder.add_component_at(
            ComponentKind::Select,
            None,
            DropIntent::After,
            t0 + Duration::from_millis(50),
        );
        assert_eq!(builder.state().tree().len(), 1);

        builder.add_component_at(
            ComponentKind::Select,
            None,
            DropIntent::After,
            t0 + Duration::from_millis(400),
        );
        assert_eq!(builder.state().tree().len(), 2);
    }

    #[test]
    fn different_add_inside_cooldown_goes_through() {
        let mut builder = FormBuilder::new();
        let t0 = Instant::now();
        builder.add_component_at(ComponentKind::Select, None, DropIntent::After, t0);
        builder.add_component_at(
            ComponentKind::Email,
            None,
            DropIntent::After,
            t0 + Duration::from_millis(10),
        );
        assert_eq!(builder.state().tree().len(), 2);
    }

    #[test]
    fn rejected_edit_records_no_step() {
        let mut builder = FormBuilder::new();
        builder.add_component(ComponentKind::TextInput, None, DropIntent::After);
        let version = builder.version();
        builder.delete_component(&ComponentId::new("ghost"));
        builder.update_component(&ComponentId::new("ghost"), ComponentPatch::new().label("x"));
        assert_eq!(builder.version(), version);
        builder.undo();
        assert!(builder.state().tree().is_empty());
        assert!(!builder.can_undo());
    }

    #[test]
    fn selection_is_not_an_undo_step() {
        let mut builder = FormBuilder::new();
        builder.add_component(ComponentKind::TextInput, None, DropIntent::After);
        let id = root_id(&builder, 0);
        builder.select_component(Some(&id));
        assert_eq!(builder.state().selected(), Some(&id));

        builder.select_component(Some(&ComponentId::new("ghost")));
        assert_eq!(builder.state().selected(), Some(&id));

        builder.undo();
        assert!(builder.state().tree().is_empty());
        assert!(!builder.can_undo());
    }

    #[test]
    fn deleting_selected_component_clears_selection() {
        let mut builder = FormBuilder::new();
        builder.add_component(ComponentKind::Checkbox, None, DropIntent::After);
        let id = root_id(&builder, 0);
        builder.select_component(Some(&id));
        builder.delete_component(&id);
        assert_eq!(builder.state().selected(), None);
    }

    #[test]
    fn subscribers_see_commits_and_undo() {
        let mut builder = FormBuilder::new();
        let seen = Rc::new(Cell::new(usize::MAX));
        let sink = Rc::clone(&seen);
        let _sub = builder.subscribe(move |state| sink.set(state.tree().len()));

        builder.add_component(ComponentKind::Number, None, DropIntent::After);
        assert_eq!(seen.get(), 1);
        builder.undo();
        assert_eq!(seen.get(), 0);
    }

    #[test]
    fn palette_drop_beside_a_field_creates_row() {
        let mut builder = FormBuilder::new();
        builder.add_component(ComponentKind::TextInput, None, DropIntent::After);
        let id = root_id(&builder, 0);

        assert!(builder.on_drag_start(DragSource::Palette(ComponentKind::Email)));
        let site = DropSite::Component {
            id: &id,
            pointer: Point::new(390.0, 40.0),
            size: Size::new(400.0, 80.0),
        };
        let legal = builder.on_drag_hover(site).map(|p| p.legal);
        assert_eq!(legal, Some(true));
        assert_eq!(builder.state().tree().len(), 1, "hover never commits");

        builder.on_drop(site);
        assert_eq!(root_kinds(&builder), vec![ComponentKind::HorizontalGroup]);
        assert!(!builder.drag_session().is_active());
    }

    #[test]
    fn dragging_existing_item_outside_deletes_it() {
        let mut builder = FormBuilder::new();
        builder.add_component(ComponentKind::File, None, DropIntent::After);
        let id = root_id(&builder, 0);
        builder.on_drag_start(DragSource::Existing(id));
        builder.on_drop(DropSite::Outside);
        assert!(builder.state().tree().is_empty());
        builder.undo();
        assert_eq!(builder.state().tree().len(), 1);
    }

    #[test]
    fn drag_cancel_changes_nothing() {
        let mut builder = FormBuilder::new();
        builder.add_component(ComponentKind::File, None, DropIntent::After);
        let before = builder.state().clone();
        let id = root_id(&builder, 0);
        builder.on_drag_start(DragSource::Existing(id));
        builder.on_drag_cancel();
        builder.on_drop(DropSite::Outside);
        assert_eq!(*builder.state(), before);
    }

    #[test]
    fn page_commands_round_trip_through_undo() {
        let mut builder = FormBuilder::new();
        let first = builder.state().current_page_id().clone();
        let second = builder.add_page("Details");
        assert_eq!(builder.state().current_page_id(), &second);
        builder.add_component(ComponentKind::Textarea, None, DropIntent::After);

        builder.set_current_page(&first).expect("page exists");
        assert!(builder.state().tree().is_empty());
        assert!(matches!(
            builder.remove_page(&PageId::new("nope")),
            Err(PageError::MissingPage { .. })
        ));

        builder.remove_page(&second).expect("two pages");
        assert_eq!(builder.state().pages().len(), 1);
        builder.undo();
        assert_eq!(builder.state().pages().len(), 2);
    }

    #[test]
    fn load_replaces_state_and_resets_history() {
        let mut builder = FormBuilder::new();
        builder.add_component(ComponentKind::TextInput, None, DropIntent::After);
        let json = r#"{"schema_version":1,"pages":[{"id":"p","components":[
            {"id":"cmp-email-41","kind":"email","label":"Mail","field_id":"mail"}
        ]}]}"#;
        builder.load_json(json).expect("valid document");
        assert!(!builder.can_undo());
        assert_eq!(builder.state().tree().len(), 1);
        assert!(builder.factory().peek_sequence() >= 42);

        let before = builder.state().clone();
        assert!(builder.load_json("{oops").is_err());
        assert_eq!(*builder.state(), before);
    }

    #[test]
    fn adds_after_loading_a_huge_id_suffix_stay_unique() {
        let mut builder = FormBuilder::new();
        let json = r#"{"schema_version":1,"pages":[{"id":"p","components":[
            {"id":"x-18446744073709551615","kind":"date"}
        ]}]}"#;
        builder.load_json(json).expect("valid document");

        let t0 = Instant::now();
        builder.add_component_at(ComponentKind::TextInput, None, DropIntent::After, t0);
        builder.add_component_at(
            ComponentKind::TextInput,
            None,
            DropIntent::After,
            t0 + Duration::from_secs(1),
        );
        let ids = builder.state().tree().ids();
        assert_eq!(ids.len(), 3);
        assert_ne!(ids[1], ids[2]);
    }

    #[test]
    fn invalid_config_is_refused() {
        let mut config = BuilderConfig::default();
        config.history.max_depth = 0;
        assert!(matches!(
            FormBuilder::with_config(config),
            Err(ConfigError::Validation(_))
        ));
    }
}
