#![forbid(unsafe_code)]

//! Multi-page form state.
//!
//! [`FormState`] is the unit stored in history and published to observers:
//! the ordered pages, the page being edited, and the selected component.
//! Values are immutable; every edit returns a new state sharing untouched
//! pages and subtrees with the old one.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::component::ComponentId;
use crate::engine::{OperationError, OperationFailure, OperationOutcome, TreeOperation};
use crate::factory::ComponentFactory;
use crate::tree::ComponentTree;

/// Stable page identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(String);

impl PageId {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PageId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// One page of the form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub id: PageId,
    pub title: String,
    #[serde(rename = "components")]
    pub tree: ComponentTree,
}

/// Page-level edit failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageError {
    MissingPage { id: PageId },
    LastPage { id: PageId },
    MissingComponent { id: ComponentId },
}

impl fmt::Display for PageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingPage { id } => write!(f, "page {id} not found"),
            Self::LastPage { id } => write!(f, "page {id} is the last page and cannot be removed"),
            Self::MissingComponent { id } => {
                write!(f, "component {id} is not on the current page")
            }
        }
    }
}

impl std::error::Error for PageError {}

/// Complete editor document state.
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    pages: Vec<Arc<Page>>,
    current: usize,
    selected: Option<ComponentId>,
}

impl Default for FormState {
    fn default() -> Self {
        Self::new()
    }
}

impl FormState {
    /// One empty page titled "Page 1".
    #[must_use]
    pub fn new() -> Self {
        Self::with_tree(ComponentTree::new())
    }

    /// Single-page state holding `tree`.
    #[must_use]
    pub fn with_tree(tree: ComponentTree) -> Self {
        Self {
            pages: vec![Arc::new(Page {
                id: PageId::new("page-1"),
                title: "Page 1".to_string(),
                tree,
            })],
            current: 0,
            selected: None,
        }
    }

    /// Assemble a state whose pages, current index, and selection have
    /// already been checked.
    pub(crate) fn from_checked_parts(
        pages: Vec<Arc<Page>>,
        current: usize,
        selected: Option<ComponentId>,
    ) -> Self {
        Self {
            pages,
            current,
            selected,
        }
    }

    #[must_use]
    pub fn pages(&self) -> &[Arc<Page>] {
        &self.pages
    }

    #[must_use]
    pub fn page(&self, id: &PageId) -> Option<&Page> {
        self.pages
            .iter()
            .find(|page| page.id == *id)
            .map(Arc::as_ref)
    }

    #[must_use]
    pub fn current_page(&self) -> &Page {
        &self.pages[self.current]
    }

    #[must_use]
    pub fn current_page_id(&self) -> &PageId {
        &self.current_page().id
    }

    /// Tree of the page being edited.
    #[must_use]
    pub fn tree(&self) -> &ComponentTree {
        &self.current_page().tree
    }

    #[must_use]
    pub fn selected(&self) -> Option<&ComponentId> {
        self.selected.as_ref()
    }

    /// Every component id on every page.
    #[must_use]
    pub fn all_ids(&self) -> Vec<ComponentId> {
        self.pages.iter().flat_map(|page| page.tree.ids()).collect()
    }

    // ------------------------------------------------------------------
    // Tree edits
    // ------------------------------------------------------------------

    /// Apply `operation` to the current page.
    ///
    /// Ids stay unique across all pages. A selection that no longer exists
    /// afterwards is cleared.
    pub fn apply(
        &self,
        factory: &mut ComponentFactory,
        operation: TreeOperation,
    ) -> Result<(FormState, OperationOutcome), OperationError> {
        let kind = operation.kind();
        if let TreeOperation::Insert { component, .. } = &operation {
            for id in component.subtree_ids() {
                if self.on_other_page(&id) {
                    return Err(OperationError {
                        kind,
                        reason: OperationFailure::DuplicateId { id },
                    });
                }
            }
        }

        let (tree, outcome) = self.tree().apply(factory, operation)?;

        let fresh = outcome
            .created_groups
            .iter()
            .cloned()
            .chain(
                outcome
                    .placed
                    .as_ref()
                    .and_then(|id| tree.get(id))
                    .map(|node| node.subtree_ids())
                    .unwrap_or_default(),
            )
            .find(|id| self.on_other_page(id));
        if let Some(id) = fresh {
            return Err(OperationError {
                kind,
                reason: OperationFailure::DuplicateId { id },
            });
        }

        Ok((self.replace_current_tree(tree), outcome))
    }

    fn on_other_page(&self, id: &ComponentId) -> bool {
        self.pages
            .iter()
            .enumerate()
            .any(|(index, page)| index != self.current && page.tree.contains(id))
    }

    fn replace_current_tree(&self, tree: ComponentTree) -> FormState {
        let mut pages = self.pages.clone();
        let page = Arc::make_mut(&mut pages[self.current]);
        page.tree = tree;
        let selected = self
            .selected
            .clone()
            .filter(|id| page.tree.contains(id));
        FormState {
            pages,
            current: self.current,
            selected,
        }
    }

    /// Change the selection. `None` clears it.
    pub fn with_selection(&self, id: Option<ComponentId>) -> Result<FormState, PageError> {
        if let Some(id) = &id
            && !self.tree().contains(id)
        {
            return Err(PageError::MissingComponent { id: id.clone() });
        }
        Ok(FormState {
            pages: self.pages.clone(),
            current: self.current,
            selected: id,
        })
    }

    // ------------------------------------------------------------------
    // Page edits
    // ------------------------------------------------------------------

    fn index_of(&self, id: &PageId) -> Result<usize, PageError> {
        self.pages
            .iter()
            .position(|page| page.id == *id)
            .ok_or_else(|| PageError::MissingPage { id: id.clone() })
    }

    fn next_page_id(&self) -> PageId {
        let highest = self
            .pages
            .iter()
            .filter_map(|page| page.id.as_str().strip_prefix("page-"))
            .filter_map(|seq| seq.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        PageId::new(format!("page-{}", highest.saturating_add(1)))
    }

    /// Append an empty page and make it current.
    #[must_use]
    pub fn add_page(&self, title: impl Into<String>) -> (FormState, PageId) {
        let id = self.next_page_id();
        let mut pages = self.pages.clone();
        pages.push(Arc::new(Page {
            id: id.clone(),
            title: title.into(),
            tree: ComponentTree::new(),
        }));
        debug!(page = %id, "page added");
        let current = pages.len() - 1;
        (
            FormState {
                pages,
                current,
                selected: None,
            },
            id,
        )
    }

    /// Remove a page. The last remaining page cannot be removed.
    pub fn remove_page(&self, id: &PageId) -> Result<FormState, PageError> {
        let index = self.index_of(id)?;
        if self.pages.len() == 1 {
            return Err(PageError::LastPage { id: id.clone() });
        }
        let mut pages = self.pages.clone();
        pages.remove(index);

        let (current, selected) = if index == self.current {
            (index.min(pages.len() - 1), None)
        } else if index < self.current {
            (self.current - 1, self.selected.clone())
        } else {
            (self.current, self.selected.clone())
        };
        debug!(page = %id, "page removed");
        Ok(FormState {
            pages,
            current,
            selected,
        })
    }

    pub fn rename_page(
        &self,
        id: &PageId,
        title: impl Into<String>,
    ) -> Result<FormState, PageError> {
        let index = self.index_of(id)?;
        let mut pages = self.pages.clone();
        Arc::make_mut(&mut pages[index]).title = title.into();
        Ok(FormState {
            pages,
            current: self.current,
            selected: self.selected.clone(),
        })
    }

    /// Switch the page being edited. Clears the selection when the page
    /// changes.
    pub fn set_current_page(&self, id: &PageId) -> Result<FormState, PageError> {
        let index = self.index_of(id)?;
        let selected = if index == self.current {
            self.selected.clone()
        } else {
            None
        };
        Ok(FormState {
            pages: self.pages.clone(),
            current: index,
            selected,
        })
    }
}
