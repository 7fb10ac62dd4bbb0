#![forbid(unsafe_code)]

//! Content validation for components and whole forms.
//!
//! Unlike the structural invariants, these checks never block an edit. The
//! builder surfaces them so the author can fix labels, options, and ranges
//! before publishing.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::component::{
    Component, ComponentId, ComponentKind, MAX_GROUP_CHILDREN, MIN_GROUP_CHILDREN, ValidationRule,
};
use crate::form::FormState;

/// Machine-readable issue code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    MissingLabel,
    MissingFieldId,
    NoOptions,
    EmptyOptionValue,
    DuplicateOptionValue,
    InvertedRange,
    NonPositiveStep,
    ZeroRows,
    NoAcceptedTypes,
    EmptyPattern,
    InvertedLength,
    GroupArity,
    DuplicateFieldId,
}

/// One validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub component: ComponentId,
    pub code: IssueCode,
    pub message: String,
}

/// Validation result.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<ValidationIssue>,
}

impl ValidationReport {
    fn from_issues(errors: Vec<ValidationIssue>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

struct Collector<'a> {
    component: &'a Component,
    issues: Vec<ValidationIssue>,
}

impl Collector<'_> {
    fn push(&mut self, code: IssueCode, message: impl Into<String>) {
        self.issues.push(ValidationIssue {
            component: self.component.id.clone(),
            code,
            message: message.into(),
        });
    }
}

/// Check one component's own attributes. Children are not visited.
#[must_use]
pub fn validate(component: &Component) -> ValidationReport {
    ValidationReport::from_issues(component_issues(component))
}

fn component_issues(component: &Component) -> Vec<ValidationIssue> {
    let mut c = Collector {
        component,
        issues: Vec::new(),
    };
    let kind = component.kind;
    let props = &component.props;

    if kind.is_input() {
        if component.label.trim().is_empty() {
            c.push(IssueCode::MissingLabel, "label must not be empty");
        }
        if component.field_id.trim().is_empty() {
            c.push(IssueCode::MissingFieldId, "field id must not be empty");
        }
    }

    if kind.is_choice() {
        if props.options.is_empty() {
            c.push(IssueCode::NoOptions, "at least one option is required");
        }
        let mut seen = BTreeMap::new();
        for (index, option) in props.options.iter().enumerate() {
            if option.value.trim().is_empty() {
                c.push(
                    IssueCode::EmptyOptionValue,
                    format!("option {} has an empty value", index + 1),
                );
            } else if let Some(first) = seen.insert(option.value.as_str(), index) {
                c.push(
                    IssueCode::DuplicateOptionValue,
                    format!(
                        "options {} and {} share the value {:?}",
                        first + 1,
                        index + 1,
                        option.value
                    ),
                );
            }
        }
    }

    match kind {
        ComponentKind::Number => {
            if let (Some(min), Some(max)) = (props.min, props.max)
                && min > max
            {
                c.push(
                    IssueCode::InvertedRange,
                    format!("minimum {min} exceeds maximum {max}"),
                );
            }
            if props.step.is_some_and(|step| step <= 0.0 || step.is_nan()) {
                c.push(IssueCode::NonPositiveStep, "step must be positive");
            }
        }
        ComponentKind::Textarea => {
            if props.rows == Some(0) {
                c.push(IssueCode::ZeroRows, "rows must be at least 1");
            }
        }
        ComponentKind::File => {
            if props.accept.iter().all(|ty| ty.trim().is_empty()) {
                c.push(
                    IssueCode::NoAcceptedTypes,
                    "at least one accepted file type is required",
                );
            }
        }
        ComponentKind::HorizontalGroup => {
            let count = component.children().len();
            if !(MIN_GROUP_CHILDREN..=MAX_GROUP_CHILDREN).contains(&count) {
                c.push(
                    IssueCode::GroupArity,
                    format!(
                        "horizontal group holds {count} components (allowed {MIN_GROUP_CHILDREN}..={MAX_GROUP_CHILDREN})"
                    ),
                );
            }
        }
        _ => {}
    }

    match &props.validation {
        Some(ValidationRule::Pattern { pattern, .. }) if pattern.is_empty() => {
            c.push(IssueCode::EmptyPattern, "pattern must not be empty");
        }
        Some(ValidationRule::Length {
            min: Some(min),
            max: Some(max),
        }) if min > max => {
            c.push(
                IssueCode::InvertedLength,
                format!("minimum length {min} exceeds maximum length {max}"),
            );
        }
        _ => {}
    }

    c.issues
}

/// Check every component on every page, plus field id uniqueness across
/// the form.
#[must_use]
pub fn validate_form(state: &FormState) -> ValidationReport {
    let mut issues = Vec::new();
    let mut field_owners: BTreeMap<&str, &ComponentId> = BTreeMap::new();
    for page in state.pages() {
        page.tree.walk(|node| {
            issues.extend(component_issues(node));
            if node.kind.is_input()
                && !node.field_id.is_empty()
                && let Some(owner) = field_owners.insert(node.field_id.as_str(), &node.id)
            {
                issues.push(ValidationIssue {
                    component: node.id.clone(),
                    code: IssueCode::DuplicateFieldId,
                    message: format!("field id {:?} is also used by {owner}", node.field_id),
                });
            }
        });
    }
    ValidationReport::from_issues(issues)
}
