#![forbid(unsafe_code)]

//! Partial attribute updates.
//!
//! A [`ComponentPatch`] names the attributes to overwrite. Fields left as
//! `None` keep their current value. Clearable attributes use a nested
//! `Option`: `Some(None)` clears, `Some(Some(v))` sets.
//!
//! Merging respects [`ComponentKind::supports`]: attributes the node's kind
//! does not carry are dropped and reported back to the caller.

use crate::component::{
    Attribute, ChoiceOption, Component, ComponentKind, LayoutHints, ValidationRule,
};

/// Attribute overrides for one component.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComponentPatch {
    pub label: Option<String>,
    pub field_id: Option<String>,
    pub required: Option<bool>,
    pub help_text: Option<Option<String>>,
    pub placeholder: Option<Option<String>>,
    pub options: Option<Vec<ChoiceOption>>,
    pub min: Option<Option<f64>>,
    pub max: Option<Option<f64>>,
    pub step: Option<Option<f64>>,
    pub rows: Option<Option<u16>>,
    pub accept: Option<Vec<String>>,
    pub max_size_bytes: Option<Option<u64>>,
    pub multiple: Option<bool>,
    pub validation: Option<Option<ValidationRule>>,
    pub layout: Option<LayoutHints>,
}

/// Result of merging a patch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PatchReport {
    /// At least one attribute value changed.
    pub changed: bool,
    /// Attribute families present in the patch but unsupported by the kind.
    pub dropped: Vec<Attribute>,
}

impl ComponentPatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn field_id(mut self, field_id: impl Into<String>) -> Self {
        self.field_id = Some(field_id.into());
        self
    }

    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    #[must_use]
    pub fn placeholder(mut self, placeholder: Option<String>) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    #[must_use]
    pub fn help_text(mut self, help_text: Option<String>) -> Self {
        self.help_text = Some(help_text);
        self
    }

    #[must_use]
    pub fn options(mut self, options: Vec<ChoiceOption>) -> Self {
        self.options = Some(options);
        self
    }

    #[must_use]
    pub fn range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    #[must_use]
    pub fn rows(mut self, rows: Option<u16>) -> Self {
        self.rows = Some(rows);
        self
    }

    #[must_use]
    pub fn accept(mut self, accept: Vec<String>) -> Self {
        self.accept = Some(accept);
        self
    }

    #[must_use]
    pub fn validation(mut self, rule: Option<ValidationRule>) -> Self {
        self.validation = Some(rule);
        self
    }

    #[must_use]
    pub fn layout(mut self, layout: LayoutHints) -> Self {
        self.layout = Some(layout);
        self
    }

    /// Whether the patch carries no overrides at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge supported attributes into `component`.
    pub fn apply_to(&self, component: &mut Component) -> PatchReport {
        let kind = component.kind;
        let mut merge = Merge {
            kind,
            report: PatchReport::default(),
        };

        merge.set(Attribute::Label, &self.label, &mut component.label);
        merge.set(Attribute::FieldId, &self.field_id, &mut component.field_id);
        merge.set(Attribute::Required, &self.required, &mut component.required);
        merge.set(Attribute::Layout, &self.layout, &mut component.layout);

        let props = &mut component.props;
        merge.set(Attribute::HelpText, &self.help_text, &mut props.help_text);
        merge.set(
            Attribute::Placeholder,
            &self.placeholder,
            &mut props.placeholder,
        );
        merge.set(Attribute::Options, &self.options, &mut props.options);
        merge.set(Attribute::Range, &self.min, &mut props.min);
        merge.set(Attribute::Range, &self.max, &mut props.max);
        merge.set(Attribute::Range, &self.step, &mut props.step);
        merge.set(Attribute::Rows, &self.rows, &mut props.rows);
        merge.set(Attribute::FileRules, &self.accept, &mut props.accept);
        merge.set(
            Attribute::FileRules,
            &self.max_size_bytes,
            &mut props.max_size_bytes,
        );
        merge.set(Attribute::FileRules, &self.multiple, &mut props.multiple);
        merge.set(
            Attribute::Validation,
            &self.validation,
            &mut props.validation,
        );

        merge.report
    }
}

struct Merge {
    kind: ComponentKind,
    report: PatchReport,
}

impl Merge {
    fn set<T: Clone + PartialEq>(&mut self, attribute: Attribute, value: &Option<T>, slot: &mut T) {
        let Some(value) = value else {
            return;
        };
        if !self.kind.supports(attribute) {
            if !self.report.dropped.contains(&attribute) {
                self.report.dropped.push(attribute);
            }
            return;
        }
        if slot != value {
            *slot = value.clone();
            self.report.changed = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentId;

    fn component(kind: ComponentKind) -> Component {
        Component::new(ComponentId::new("x"), kind)
    }

    #[test]
    fn merges_supported_attributes() {
        let mut number = component(ComponentKind::Number);
        let report = ComponentPatch::new()
            .label("Age")
            .range(Some(0.0), Some(130.0))
            .required(true)
            .apply_to(&mut number);
        assert!(report.changed);
        assert!(report.dropped.is_empty());
        assert_eq!(number.label, "Age");
        assert_eq!(number.props.max, Some(130.0));
        assert!(number.required);
    }

    #[test]
    fn drops_unsupported_attributes() {
        let mut text = component(ComponentKind::TextInput);
        let report = ComponentPatch::new()
            .label("Name")
            .options(vec![ChoiceOption::new("A", "a")])
            .rows(Some(3))
            .apply_to(&mut text);
        assert!(report.changed);
        assert_eq!(report.dropped, vec![Attribute::Options, Attribute::Rows]);
        assert!(text.props.options.is_empty());
        assert_eq!(text.props.rows, None);
    }

    #[test]
    fn nested_option_clears() {
        let mut text = component(ComponentKind::TextInput);
        text.props.placeholder = Some("old".into());
        let report = ComponentPatch::new()
            .placeholder(None)
            .apply_to(&mut text);
        assert!(report.changed);
        assert_eq!(text.props.placeholder, None);
    }

    #[test]
    fn identical_values_report_no_change() {
        let mut text = component(ComponentKind::TextInput);
        text.label = "Same".into();
        let report = ComponentPatch::new().label("Same").apply_to(&mut text);
        assert!(!report.changed);
        assert!(ComponentPatch::new().is_empty());
    }

    #[test]
    fn divider_keeps_only_presentation() {
        let mut divider = component(ComponentKind::Divider);
        let report = ComponentPatch::new()
            .label("Section")
            .required(true)
            .field_id("nope")
            .apply_to(&mut divider);
        assert_eq!(divider.label, "Section");
        assert!(!divider.required);
        assert_eq!(report.dropped, vec![Attribute::FieldId, Attribute::Required]);
    }
}
