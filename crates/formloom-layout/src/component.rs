#![forbid(unsafe_code)]

//! Component tree node model.
//!
//! A [`Component`] is either a field (a leaf that submits or decorates a
//! value) or a group that arranges child components. The kind tag is a
//! closed enum; every per-kind decision is an exhaustive `match` on
//! [`ComponentKind`].
//!
//! Children are stored as `Arc<Component>` so edits clone only the ancestor
//! path of the node being changed and every other subtree is shared with the
//! previous tree value.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Maximum number of children a horizontal group may hold.
pub const MAX_GROUP_CHILDREN: usize = 4;

/// Minimum number of children a horizontal group must hold at rest.
pub const MIN_GROUP_CHILDREN: usize = 2;

/// Opaque, tree-unique component identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(String);

impl ComponentId {
    /// Wrap a raw identifier.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ComponentId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for ComponentId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

/// Closed set of component kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    TextInput,
    Email,
    Number,
    Textarea,
    Select,
    MultiSelect,
    /// Checkbox group with one box per option.
    Checkbox,
    RadioGroup,
    Date,
    File,
    Divider,
    Signature,
    HorizontalGroup,
    VerticalGroup,
}

impl ComponentKind {
    /// Every kind, in palette order.
    pub const ALL: [Self; 14] = [
        Self::TextInput,
        Self::Email,
        Self::Number,
        Self::Textarea,
        Self::Select,
        Self::MultiSelect,
        Self::Checkbox,
        Self::RadioGroup,
        Self::Date,
        Self::File,
        Self::Divider,
        Self::Signature,
        Self::HorizontalGroup,
        Self::VerticalGroup,
    ];

    /// Stable snake_case tag, identical to the serialized form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TextInput => "text_input",
            Self::Email => "email",
            Self::Number => "number",
            Self::Textarea => "textarea",
            Self::Select => "select",
            Self::MultiSelect => "multi_select",
            Self::Checkbox => "checkbox",
            Self::RadioGroup => "radio_group",
            Self::Date => "date",
            Self::File => "file",
            Self::Divider => "divider",
            Self::Signature => "signature",
            Self::HorizontalGroup => "horizontal_group",
            Self::VerticalGroup => "vertical_group",
        }
    }

    /// Parse a snake_case tag.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == tag)
    }

    /// Group kinds own an ordered child list.
    #[must_use]
    pub const fn is_group(self) -> bool {
        matches!(self, Self::HorizontalGroup | Self::VerticalGroup)
    }

    /// Kinds whose value is picked from an option list.
    #[must_use]
    pub const fn is_choice(self) -> bool {
        matches!(
            self,
            Self::Select | Self::MultiSelect | Self::Checkbox | Self::RadioGroup
        )
    }

    /// Kinds that submit a value with the form.
    #[must_use]
    pub const fn is_input(self) -> bool {
        !matches!(
            self,
            Self::Divider | Self::HorizontalGroup | Self::VerticalGroup
        )
    }

    /// Whether components of this kind carry `attribute`.
    #[must_use]
    pub const fn supports(self, attribute: Attribute) -> bool {
        match attribute {
            Attribute::Label | Attribute::Layout => true,
            Attribute::FieldId | Attribute::Required | Attribute::HelpText => self.is_input(),
            Attribute::Placeholder => matches!(
                self,
                Self::TextInput
                    | Self::Email
                    | Self::Number
                    | Self::Textarea
                    | Self::Select
                    | Self::MultiSelect
                    | Self::Date
            ),
            Attribute::Options => self.is_choice(),
            Attribute::Range => matches!(self, Self::Number),
            Attribute::Rows => matches!(self, Self::Textarea),
            Attribute::FileRules => matches!(self, Self::File),
            Attribute::Validation => matches!(
                self,
                Self::TextInput | Self::Email | Self::Number | Self::Textarea
            ),
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attribute families that are only meaningful for some kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Label,
    FieldId,
    Required,
    HelpText,
    Placeholder,
    Options,
    /// `min`, `max`, and `step`.
    Range,
    Rows,
    /// `accept`, `max_size_bytes`, and `multiple`.
    FileRules,
    Validation,
    Layout,
}

impl Attribute {
    /// Name used in logs and validation messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Label => "label",
            Self::FieldId => "field_id",
            Self::Required => "required",
            Self::HelpText => "help_text",
            Self::Placeholder => "placeholder",
            Self::Options => "options",
            Self::Range => "range",
            Self::Rows => "rows",
            Self::FileRules => "file_rules",
            Self::Validation => "validation",
            Self::Layout => "layout",
        }
    }
}

/// One entry of a choice list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub label: String,
    pub value: String,
}

impl ChoiceOption {
    #[must_use]
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Client-side validation rule attached to a text-like field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ValidationRule {
    /// Value must match a regular expression.
    Pattern { pattern: String, message: String },
    /// Character count bounds, both inclusive.
    Length { min: Option<u32>, max: Option<u32> },
    Email,
    Url,
}

/// Kind-specific field attributes. Unsupported attributes stay at their
/// defaults for a given kind.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldProps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<ChoiceOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<u16>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub accept: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_size_bytes: Option<u64>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub multiple: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationRule>,
}

/// Width hint for the view layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidthHint {
    #[default]
    Auto,
    /// Span of a 12-column grid.
    Columns(u8),
    Pixels(u32),
}

/// Cross-axis alignment hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    #[default]
    Start,
    Center,
    End,
    Stretch,
}

/// Presentation hints. Data only; never consulted by structural rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutHints {
    pub width: WidthHint,
    pub alignment: Alignment,
    pub gap: u16,
}

/// A node in the form tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub id: ComponentId,
    pub kind: ComponentKind,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub field_id: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(default)]
    pub props: FieldProps,
    #[serde(default)]
    pub layout: LayoutHints,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) children: Vec<Arc<Component>>,
}

impl Component {
    /// Build a childless component. Groups start empty.
    #[must_use]
    pub fn new(id: ComponentId, kind: ComponentKind) -> Self {
        Self {
            id,
            kind,
            label: String::new(),
            field_id: String::new(),
            required: false,
            props: FieldProps::default(),
            layout: LayoutHints::default(),
            children: Vec::new(),
        }
    }

    /// Attach children to a group component.
    ///
    /// Returns `None` when `self` is not a group kind; leaves never own
    /// children.
    #[must_use]
    pub fn with_children(mut self, children: Vec<Component>) -> Option<Self> {
        if !self.kind.is_group() {
            return None;
        }
        self.children = children.into_iter().map(Arc::new).collect();
        Some(self)
    }

    /// Ordered children. Always empty for leaf kinds.
    #[must_use]
    pub fn children(&self) -> &[Arc<Component>] {
        &self.children
    }

    #[must_use]
    pub fn is_group(&self) -> bool {
        self.kind.is_group()
    }

    #[must_use]
    pub fn is_horizontal_group(&self) -> bool {
        self.kind == ComponentKind::HorizontalGroup
    }

    /// Whether this node or any descendant is a horizontal group.
    ///
    /// Such a subtree can never be placed under another horizontal group.
    #[must_use]
    pub fn contains_horizontal_group(&self) -> bool {
        self.is_horizontal_group()
            || self
                .children
                .iter()
                .any(|child| child.contains_horizontal_group())
    }

    /// Whether `id` names this node or one of its descendants.
    #[must_use]
    pub fn contains_id(&self, id: &ComponentId) -> bool {
        self.id == *id || self.children.iter().any(|child| child.contains_id(id))
    }

    /// Pre-order walk over this node and its descendants.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Component)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }

    /// Every id in this subtree, pre-order.
    #[must_use]
    pub fn subtree_ids(&self) -> Vec<ComponentId> {
        let mut ids = Vec::new();
        self.walk(&mut |node| ids.push(node.id.clone()));
        ids
    }

    /// Number of nodes in this subtree, including `self`.
    #[must_use]
    pub fn subtree_len(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(|child| child.subtree_len())
            .sum::<usize>()
    }
}
