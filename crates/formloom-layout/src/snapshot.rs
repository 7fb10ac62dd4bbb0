#![forbid(unsafe_code)]

//! JSON import and export of [`FormState`].
//!
//! The document carries a `schema_version`. Import is all-or-nothing: the
//! raw document is parsed into plain records, every structural rule is
//! checked, and only then is a state assembled. Nothing partially loaded
//! ever escapes.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::component::{Component, ComponentId, ComponentKind, FieldProps, LayoutHints};
use crate::form::{FormState, Page, PageId};
use crate::tree::{ComponentTree, InvariantViolation};

/// Schema version written by [`FormState::to_json`].
pub const SCHEMA_VERSION: u32 = 1;

/// Reasons a form document is refused.
#[derive(Debug, Error)]
pub enum FormLoadError {
    #[error("malformed form document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported schema version {found} (this build reads version {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("component {id} has unknown kind {kind:?}")]
    UnknownKind { id: String, kind: String },

    #[error("form document has no pages")]
    NoPages,

    #[error("page id {0} appears more than once")]
    DuplicatePage(String),

    #[error("component id {0} appears on more than one page")]
    DuplicateComponent(String),

    #[error("current page {0} does not exist")]
    MissingCurrentPage(String),

    #[error("selected component {0} is not on the current page")]
    DanglingSelection(String),

    #[error("page {page} is structurally invalid: {violation}")]
    Structure {
        page: String,
        #[source]
        violation: InvariantViolation,
    },
}

#[derive(Deserialize)]
struct VersionProbe {
    schema_version: u32,
}

#[derive(Deserialize)]
struct DocumentRecord {
    pages: Vec<PageRecord>,
    #[serde(default)]
    current_page: Option<String>,
    #[serde(default)]
    selected: Option<String>,
}

#[derive(Deserialize)]
struct PageRecord {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    components: Vec<ComponentRecord>,
}

#[derive(Deserialize)]
struct ComponentRecord {
    id: String,
    kind: String,
    #[serde(default)]
    label: String,
    #[serde(default)]
    field_id: String,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    props: FieldProps,
    #[serde(default)]
    layout: LayoutHints,
    #[serde(default)]
    children: Vec<ComponentRecord>,
}

impl ComponentRecord {
    fn into_component(self) -> Result<Component, FormLoadError> {
        let Some(kind) = ComponentKind::from_tag(&self.kind) else {
            return Err(FormLoadError::UnknownKind {
                id: self.id,
                kind: self.kind,
            });
        };
        let mut component = Component::new(ComponentId::new(self.id), kind);
        component.label = self.label;
        component.field_id = self.field_id;
        component.required = self.required;
        component.props = self.props;
        component.layout = self.layout;
        // Leaves with children are kept here so the invariant check names them.
        component.children = self
            .children
            .into_iter()
            .map(|child| child.into_component().map(Arc::new))
            .collect::<Result<_, _>>()?;
        Ok(component)
    }
}

#[derive(Serialize)]
struct DocumentRef<'a> {
    schema_version: u32,
    pages: &'a [Arc<Page>],
    current_page: &'a PageId,
    #[serde(skip_serializing_if = "Option::is_none")]
    selected: Option<&'a ComponentId>,
}

impl FormState {
    fn document(&self) -> DocumentRef<'_> {
        DocumentRef {
            schema_version: SCHEMA_VERSION,
            pages: self.pages(),
            current_page: self.current_page_id(),
            selected: self.selected(),
        }
    }

    /// Compact JSON export.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.document())
    }

    /// Indented JSON export.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.document())
    }

    /// Parse and validate a form document.
    pub fn from_json(input: &str) -> Result<FormState, FormLoadError> {
        let result = parse_document(input);
        if let Err(err) = &result {
            warn!(error = %err, "form import rejected");
        }
        result
    }
}

fn parse_document(input: &str) -> Result<FormState, FormLoadError> {
    let probe: VersionProbe = serde_json::from_str(input)?;
    if probe.schema_version != SCHEMA_VERSION {
        return Err(FormLoadError::UnsupportedVersion {
            found: probe.schema_version,
            expected: SCHEMA_VERSION,
        });
    }
    let record: DocumentRecord = serde_json::from_str(input)?;
    if record.pages.is_empty() {
        return Err(FormLoadError::NoPages);
    }

    let mut page_ids = BTreeSet::new();
    let mut component_ids = BTreeSet::new();
    let mut pages = Vec::with_capacity(record.pages.len());
    for page in record.pages {
        if !page_ids.insert(page.id.clone()) {
            return Err(FormLoadError::DuplicatePage(page.id));
        }
        let roots = page
            .components
            .into_iter()
            .map(|c| c.into_component().map(Arc::new))
            .collect::<Result<Vec<_>, _>>()?;
        let tree = ComponentTree::from_shared(roots);
        tree.check_invariants()
            .map_err(|violation| FormLoadError::Structure {
                page: page.id.clone(),
                violation,
            })?;
        for id in tree.ids() {
            if !component_ids.insert(id.clone()) {
                return Err(FormLoadError::DuplicateComponent(id.as_str().to_string()));
            }
        }
        pages.push(Arc::new(Page {
            id: PageId::new(page.id),
            title: page.title,
            tree,
        }));
    }

    let current = match &record.current_page {
        None => 0,
        Some(raw) => pages
            .iter()
            .position(|page| page.id.as_str() == raw)
            .ok_or_else(|| FormLoadError::MissingCurrentPage(raw.clone()))?,
    };
    let selected = match record.selected {
        None => None,
        Some(raw) => {
            let id = ComponentId::new(raw);
            if !pages[current].tree.contains(&id) {
                return Err(FormLoadError::DanglingSelection(id.as_str().to_string()));
            }
            Some(id)
        }
    };

    Ok(FormState::from_checked_parts(pages, current, selected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::TreeOperation;
    use crate::factory::ComponentFactory;
    use formloom_core::DropIntent;

    fn sample_state() -> FormState {
        let mut factory = ComponentFactory::default();
        let mut state = FormState::new();
        for kind in [ComponentKind::TextInput, ComponentKind::Select] {
            let component = factory.create(kind);
            state = state
                .apply(
                    &mut factory,
                    TreeOperation::Insert {
                        component,
                        target: None,
                        intent: DropIntent::After,
                    },
                )
                .expect("insert")
                .0;
        }
        let first = state.tree().ids()[0].clone();
        let component = factory.create(ComponentKind::Email);
        state
            .apply(
                &mut factory,
                TreeOperation::Insert {
                    component,
                    target: Some(first),
                    intent: DropIntent::Right,
                },
            )
            .expect("side insert")
            .0
    }

    #[test]
    fn export_then_import_preserves_state() {
        let state = sample_state();
        let json = state.to_json().expect("serialize");
        let restored = FormState::from_json(&json).expect("valid document");
        assert_eq!(restored, state);
    }

    #[test]
    fn export_shape() {
        let json = sample_state().to_json_pretty().expect("serialize");
        let value: serde_json::Value = serde_json::from_str(&json).expect("json");
        assert_eq!(value["schema_version"], 1);
        assert_eq!(value["current_page"], "page-1");
        let components = value["pages"][0]["components"]
            .as_array()
            .expect("components array");
        assert_eq!(components[0]["kind"], "horizontal_group");
        assert_eq!(components[0]["children"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn rejects_unknown_kind() {
        let json = r#"{"schema_version":1,"pages":[{"id":"p","components":[{"id":"a","kind":"hologram"}]}]}"#;
        let err = FormState::from_json(json).unwrap_err();
        assert!(matches!(err, FormLoadError::UnknownKind { ref kind, .. } if kind == "hologram"));
    }

    #[test]
    fn rejects_other_schema_versions() {
        let err = FormState::from_json(r#"{"schema_version":2,"pages":[]}"#).unwrap_err();
        assert!(matches!(
            err,
            FormLoadError::UnsupportedVersion {
                found: 2,
                expected: 1
            }
        ));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            FormState::from_json("{not json").unwrap_err(),
            FormLoadError::Json(_)
        ));
        assert!(matches!(
            FormState::from_json(r#"{"pages":[]}"#).unwrap_err(),
            FormLoadError::Json(_)
        ));
    }

    #[test]
    fn rejects_leaf_with_children() {
        let json = r#"{"schema_version":1,"pages":[{"id":"p","components":[
            {"id":"a","kind":"text_input","children":[{"id":"b","kind":"email"}]}
        ]}]}"#;
        let err = FormState::from_json(json).unwrap_err();
        assert!(matches!(
            err,
            FormLoadError::Structure {
                violation: InvariantViolation::LeafWithChildren { .. },
                ..
            }
        ));
    }

    #[test]
    fn rejects_single_child_row() {
        let json = r#"{"schema_version":1,"pages":[{"id":"p","components":[
            {"id":"r","kind":"horizontal_group","children":[{"id":"b","kind":"email"}]}
        ]}]}"#;
        assert!(matches!(
            FormState::from_json(json).unwrap_err(),
            FormLoadError::Structure {
                violation: InvariantViolation::GroupArity { children: 1, .. },
                ..
            }
        ));
    }

    #[test]
    fn rejects_ids_shared_between_pages() {
        let json = r#"{"schema_version":1,"pages":[
            {"id":"p1","components":[{"id":"a","kind":"date"}]},
            {"id":"p2","components":[{"id":"a","kind":"date"}]}
        ]}"#;
        assert!(matches!(
            FormState::from_json(json).unwrap_err(),
            FormLoadError::DuplicateComponent(id) if id == "a"
        ));
    }

    #[test]
    fn rejects_dangling_references() {
        let no_page = r#"{"schema_version":1,"current_page":"zz","pages":[{"id":"p"}]}"#;
        assert!(matches!(
            FormState::from_json(no_page).unwrap_err(),
            FormLoadError::MissingCurrentPage(_)
        ));
        let no_selection = r#"{"schema_version":1,"selected":"zz","pages":[{"id":"p"}]}"#;
        assert!(matches!(
            FormState::from_json(no_selection).unwrap_err(),
            FormLoadError::DanglingSelection(_)
        ));
        assert!(matches!(
            FormState::from_json(r#"{"schema_version":1,"pages":[]}"#).unwrap_err(),
            FormLoadError::NoPages
        ));
    }

    #[test]
    fn missing_optional_fields_take_defaults() {
        let json = r#"{"schema_version":1,"pages":[{"id":"p","title":"Intro","components":[
            {"id":"a","kind":"checkbox","props":{"options":[{"label":"Yes","value":"yes"}]}}
        ]}]}"#;
        let state = FormState::from_json(json).expect("valid document");
        let node = state.tree().get(&ComponentId::new("a")).expect("node");
        assert_eq!(node.kind, ComponentKind::Checkbox);
        assert_eq!(node.props.options.len(), 1);
        assert!(!node.required);
        assert_eq!(state.current_page().title, "Intro");
    }
}
