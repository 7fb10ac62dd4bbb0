#![forbid(unsafe_code)]

//! Component factory: fresh ids and per-kind defaults.
//!
//! Ids have the shape `{prefix}-{kind}-{seq}` where `seq` increases
//! monotonically for the lifetime of the factory. The factory is not part of
//! the undoable form state, so an id is never reissued after undo.

use std::sync::Arc;

use tracing::{debug, error};

use crate::component::{
    Alignment, ChoiceOption, Component, ComponentId, ComponentKind, LayoutHints, ValidationRule,
    WidthHint,
};
use crate::form::FormState;

/// Default id prefix.
pub const DEFAULT_ID_PREFIX: &str = "cmp";

/// Default gap between group children, in pixels.
pub const DEFAULT_GROUP_GAP: u16 = 16;

/// Default textarea height in text rows.
pub const DEFAULT_TEXTAREA_ROWS: u16 = 4;

/// Default upload size limit (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Upper bound of the sequence space the factory allocates from.
///
/// Loaded ids with a larger suffix can never collide with a generated id, so
/// seeding ignores them instead of jumping the counter to the end of `u64`.
pub const MAX_SEQUENCE: u64 = u64::MAX >> 1;

/// Creates components with unique ids and sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentFactory {
    prefix: String,
    next: u64,
}

impl Default for ComponentFactory {
    fn default() -> Self {
        Self::new(DEFAULT_ID_PREFIX)
    }
}

impl ComponentFactory {
    /// Factory whose first id uses sequence number 1.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }

    /// Factory that will not reissue any numeric suffix present in `state`.
    #[must_use]
    pub fn seeded_from(prefix: impl Into<String>, state: &FormState) -> Self {
        let mut factory = Self::new(prefix);
        factory.observe(state);
        factory
    }

    /// Advance past every sequence number used in `state`.
    pub fn observe(&mut self, state: &FormState) {
        for page in state.pages() {
            page.tree.walk(|node| {
                match trailing_sequence(node.id.as_str()) {
                    Some(seq) if seq < MAX_SEQUENCE => self.next = self.next.max(seq + 1),
                    Some(seq) => debug!(
                        id = %node.id,
                        seq,
                        "id suffix beyond the generated range ignored"
                    ),
                    None => {}
                }
            });
        }
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Sequence number the next id will use.
    #[must_use]
    pub fn peek_sequence(&self) -> u64 {
        self.next
    }

    /// Allocate a fresh id for `kind`.
    pub fn next_id(&mut self, kind: ComponentKind) -> ComponentId {
        let seq = self.bump();
        self.id_for(kind, seq)
    }

    fn id_for(&self, kind: ComponentKind, seq: u64) -> ComponentId {
        ComponentId::new(format!("{}-{}-{seq}", self.prefix, kind.as_str()))
    }

    fn bump(&mut self) -> u64 {
        let seq = self.next;
        debug_assert!(seq < MAX_SEQUENCE, "component id sequence exhausted");
        if seq >= MAX_SEQUENCE {
            error!(prefix = %self.prefix, seq, "component id sequence exhausted");
        }
        self.next = seq.saturating_add(1);
        seq
    }

    /// New component of `kind` with default attributes.
    ///
    /// Groups start with no children.
    pub fn create(&mut self, kind: ComponentKind) -> Component {
        let seq = self.bump();
        let mut component = Component::new(self.id_for(kind, seq), kind);
        component.label = default_label(kind).to_string();
        if kind.is_input() {
            component.field_id = format!("{}_{seq}", kind.as_str());
        }

        let props = &mut component.props;
        match kind {
            ComponentKind::TextInput => {
                props.placeholder = Some("Enter text".into());
            }
            ComponentKind::Email => {
                props.placeholder = Some("name@example.com".into());
                props.validation = Some(ValidationRule::Email);
            }
            ComponentKind::Number => {
                props.placeholder = Some("0".into());
                props.step = Some(1.0);
            }
            ComponentKind::Textarea => {
                props.placeholder = Some("Enter a longer answer".into());
                props.rows = Some(DEFAULT_TEXTAREA_ROWS);
            }
            ComponentKind::Select | ComponentKind::MultiSelect => {
                props.placeholder = Some("Choose an option".into());
                props.options = default_options();
            }
            ComponentKind::Checkbox | ComponentKind::RadioGroup => {
                props.options = default_options();
            }
            ComponentKind::File => {
                props.accept = vec!["*/*".into()];
                props.max_size_bytes = Some(DEFAULT_MAX_UPLOAD_BYTES);
            }
            ComponentKind::HorizontalGroup => {
                component.layout = LayoutHints {
                    width: WidthHint::Auto,
                    alignment: Alignment::Stretch,
                    gap: DEFAULT_GROUP_GAP,
                };
            }
            ComponentKind::VerticalGroup => {
                component.layout.gap = DEFAULT_GROUP_GAP;
            }
            ComponentKind::Date | ComponentKind::Divider | ComponentKind::Signature => {}
        }
        component
    }

    /// Deep copy of `source` with fresh ids on every node.
    ///
    /// Field ids are regenerated too so the copy submits separately.
    pub fn duplicate(&mut self, source: &Component) -> Component {
        let seq = self.bump();
        let mut copy = source.clone();
        copy.id = self.id_for(source.kind, seq);
        if source.kind.is_input() {
            copy.field_id = format!("{}_{seq}", source.kind.as_str());
        }
        copy.children = source
            .children
            .iter()
            .map(|child| Arc::new(self.duplicate(child)))
            .collect();
        copy
    }
}

fn default_label(kind: ComponentKind) -> &'static str {
    match kind {
        ComponentKind::TextInput => "Text Input",
        ComponentKind::Email => "Email",
        ComponentKind::Number => "Number",
        ComponentKind::Textarea => "Text Area",
        ComponentKind::Select => "Select",
        ComponentKind::MultiSelect => "Multi Select",
        ComponentKind::Checkbox => "Checkboxes",
        ComponentKind::RadioGroup => "Radio Group",
        ComponentKind::Date => "Date",
        ComponentKind::File => "File Upload",
        ComponentKind::Signature => "Signature",
        ComponentKind::Divider | ComponentKind::HorizontalGroup | ComponentKind::VerticalGroup => {
            ""
        }
    }
}

fn default_options() -> Vec<ChoiceOption> {
    (1..=3)
        .map(|n| ChoiceOption::new(format!("Option {n}"), format!("option_{n}")))
        .collect()
}

fn trailing_sequence(id: &str) -> Option<u64> {
    let (_, tail) = id.rsplit_once('-')?;
    tail.parse().ok()
}
