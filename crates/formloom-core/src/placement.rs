#![forbid(unsafe_code)]

//! Drop-intent classification from pointer geometry.
//!
//! [`classify`] is a pure function of the pointer offset inside a target and
//! the target's measured size. It knows nothing about tree legality; the
//! structural resolver in `formloom-layout` rewrites its output afterwards.
//!
//! # Zones
//!
//! ```text
//!  ┌──────┬──────────────────────┬──────┐
//!  │      │        before        │      │
//!  │      ├──────────────────────┤      │
//!  │ left │        inside        │ right│
//!  │      ├──────────────────────┤      │
//!  │      │        after         │      │
//!  └──────┴──────────────────────┴──────┘
//!   ← h →                         ← h →     h = width  · horizontal
//!                                           v = height · vertical
//! ```
//!
//! Side strips win over the top/bottom bands: horizontal grouping is tested
//! first, vertical insertion second, and `inside` is the remainder.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect, Size};

/// Default fraction of the target width treated as a side strip.
pub const DEFAULT_HORIZONTAL_THRESHOLD: f64 = 0.25;

/// Default fraction of the target height treated as a top/bottom band.
pub const DEFAULT_VERTICAL_THRESHOLD: f64 = 0.30;

/// Classified drop outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropIntent {
    /// Place beside the target, on its left.
    Left,
    /// Place beside the target, on its right.
    Right,
    /// Place above the target as a vertical sibling.
    Before,
    /// Place below the target as a vertical sibling.
    After,
    /// Append to the nearest eligible container.
    Inside,
}

impl DropIntent {
    /// Whether the intent requests side-by-side placement.
    #[inline]
    #[must_use]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }

    /// Whether the intent requests vertical sibling placement.
    #[inline]
    #[must_use]
    pub const fn is_vertical(self) -> bool {
        matches!(self, Self::Before | Self::After)
    }

    /// Stable lowercase name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Before => "before",
            Self::After => "after",
            Self::Inside => "inside",
        }
    }
}

/// Zone thresholds for [`classify`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementThresholds {
    /// Fraction of the width on each side that maps to `left` / `right`.
    pub horizontal: f64,
    /// Fraction of the height at top and bottom that maps to `before` / `after`.
    pub vertical: f64,
    /// When false, side strips are never reported.
    pub horizontal_enabled: bool,
    /// When false, top/bottom bands are never reported.
    pub vertical_enabled: bool,
}

impl Default for PlacementThresholds {
    fn default() -> Self {
        Self {
            horizontal: DEFAULT_HORIZONTAL_THRESHOLD,
            vertical: DEFAULT_VERTICAL_THRESHOLD,
            horizontal_enabled: true,
            vertical_enabled: true,
        }
    }
}

impl PlacementThresholds {
    /// Thresholds with both fractions set explicitly and both axes enabled.
    #[must_use]
    pub fn new(horizontal: f64, vertical: f64) -> Self {
        Self {
            horizontal,
            vertical,
            ..Self::default()
        }
    }

    /// Disable side-by-side grouping.
    #[must_use]
    pub fn without_horizontal(mut self) -> Self {
        self.horizontal_enabled = false;
        self
    }

    /// Disable vertical insertion bands.
    #[must_use]
    pub fn without_vertical(mut self) -> Self {
        self.vertical_enabled = false;
        self
    }

    /// Validate the fractions.
    ///
    /// Each fraction must lie in `(0, 0.5]` so the opposing zones never
    /// overlap. Returns one message per violation; empty means valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if !(self.horizontal > 0.0 && self.horizontal <= 0.5) {
            errors.push(format!(
                "placement.horizontal must be in (0, 0.5], got {}",
                self.horizontal
            ));
        }
        if !(self.vertical > 0.0 && self.vertical <= 0.5) {
            errors.push(format!(
                "placement.vertical must be in (0, 0.5], got {}",
                self.vertical
            ));
        }
        errors
    }
}

/// Classify a pointer position inside a target of the given size.
///
/// Priority order: `left`, `right`, `before`, `after`, then `inside`.
/// Degenerate sizes and non-finite pointers classify as `inside`.
#[must_use]
pub fn classify(pointer: Point, size: Size, thresholds: &PlacementThresholds) -> DropIntent {
    if size.is_degenerate() || !pointer.is_finite() {
        return DropIntent::Inside;
    }

    if thresholds.horizontal_enabled {
        if pointer.x < size.width * thresholds.horizontal {
            return DropIntent::Left;
        }
        if pointer.x > size.width * (1.0 - thresholds.horizontal) {
            return DropIntent::Right;
        }
    }

    if thresholds.vertical_enabled {
        if pointer.y < size.height * thresholds.vertical {
            return DropIntent::Before;
        }
        if pointer.y > size.height * (1.0 - thresholds.vertical) {
            return DropIntent::After;
        }
    }

    DropIntent::Inside
}

/// Local rectangle the view should highlight for an intent.
///
/// Side intents highlight a half-width strip, vertical intents a thin band
/// along the edge, and `inside` the whole target.
#[must_use]
pub fn indicator_rect(intent: DropIntent, size: Size) -> Rect {
    let width = size.width.max(0.0);
    let height = size.height.max(0.0);
    let band = (height * 0.1).clamp(2.0, 8.0).min(height);
    match intent {
        DropIntent::Left => Rect::new(0.0, 0.0, width / 2.0, height),
        DropIntent::Right => Rect::new(width / 2.0, 0.0, width / 2.0, height),
        DropIntent::Before => Rect::new(0.0, 0.0, width, band),
        DropIntent::After => Rect::new(0.0, height - band, width, band),
        DropIntent::Inside => Rect::new(0.0, 0.0, width, height),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: f64 = 400.0;
    const H: f64 = 100.0;

    fn at(fx: f64, fy: f64) -> DropIntent {
        classify(
            Point::new(W * fx, H * fy),
            Size::new(W, H),
            &PlacementThresholds::default(),
        )
    }

    #[test]
    fn boundary_points() {
        assert_eq!(at(0.24, 0.5), DropIntent::Left);
        assert_eq!(at(0.26, 0.29), DropIntent::Before);
        assert_eq!(at(0.5, 0.5), DropIntent::Inside);
        assert_eq!(at(0.76, 0.5), DropIntent::Right);
        assert_eq!(at(0.5, 0.71), DropIntent::After);
    }

    #[test]
    fn side_strips_take_priority_over_bands() {
        assert_eq!(at(0.1, 0.05), DropIntent::Left);
        assert_eq!(at(0.9, 0.95), DropIntent::Right);
    }

    #[test]
    fn exact_threshold_is_not_inside_strip() {
        // Comparisons are strict: exactly 25% of the width is not `left`.
        assert_eq!(at(0.25, 0.5), DropIntent::Inside);
        assert_eq!(at(0.75, 0.5), DropIntent::Inside);
    }

    #[test]
    fn disabled_axes_fall_through() {
        let size = Size::new(W, H);
        let no_h = PlacementThresholds::default().without_horizontal();
        assert_eq!(
            classify(Point::new(5.0, 50.0), size, &no_h),
            DropIntent::Inside
        );
        assert_eq!(
            classify(Point::new(5.0, 5.0), size, &no_h),
            DropIntent::Before
        );

        let no_v = PlacementThresholds::default().without_vertical();
        assert_eq!(
            classify(Point::new(200.0, 1.0), size, &no_v),
            DropIntent::Inside
        );
        assert_eq!(
            classify(Point::new(1.0, 1.0), size, &no_v),
            DropIntent::Left
        );
    }

    #[test]
    fn degenerate_inputs_classify_inside() {
        let t = PlacementThresholds::default();
        assert_eq!(
            classify(Point::new(0.0, 0.0), Size::new(0.0, 10.0), &t),
            DropIntent::Inside
        );
        assert_eq!(
            classify(Point::new(f64::NAN, 1.0), Size::new(10.0, 10.0), &t),
            DropIntent::Inside
        );
    }

    #[test]
    fn custom_thresholds() {
        let t = PlacementThresholds::new(0.1, 0.45);
        let size = Size::new(100.0, 100.0);
        assert_eq!(classify(Point::new(15.0, 50.0), size, &t), DropIntent::Inside);
        assert_eq!(classify(Point::new(15.0, 40.0), size, &t), DropIntent::Before);
    }

    #[test]
    fn threshold_validation() {
        assert!(PlacementThresholds::default().validate().is_empty());
        assert_eq!(PlacementThresholds::new(0.0, 0.3).validate().len(), 1);
        assert_eq!(PlacementThresholds::new(0.6, 0.9).validate().len(), 2);
        assert_eq!(PlacementThresholds::new(f64::NAN, 0.3).validate().len(), 1);
    }

    #[test]
    fn indicator_shapes() {
        let size = Size::new(200.0, 50.0);
        assert_eq!(
            indicator_rect(DropIntent::Left, size),
            Rect::new(0.0, 0.0, 100.0, 50.0)
        );
        assert_eq!(
            indicator_rect(DropIntent::Right, size),
            Rect::new(100.0, 0.0, 100.0, 50.0)
        );
        assert_eq!(
            indicator_rect(DropIntent::Before, size),
            Rect::new(0.0, 0.0, 200.0, 5.0)
        );
        assert_eq!(
            indicator_rect(DropIntent::After, size),
            Rect::new(0.0, 45.0, 200.0, 5.0)
        );
        assert_eq!(
            indicator_rect(DropIntent::Inside, size),
            Rect::from_size(size)
        );
    }

    #[test]
    fn thresholds_deserialize_with_defaults() {
        let t: PlacementThresholds =
            serde_json::from_str(r#"{"horizontal": 0.2}"#).expect("valid thresholds");
        assert_eq!(t.horizontal, 0.2);
        assert_eq!(t.vertical, DEFAULT_VERTICAL_THRESHOLD);
        assert!(t.horizontal_enabled);
    }

    #[test]
    fn intent_serializes_snake_case() {
        let json = serde_json::to_string(&DropIntent::Inside).expect("serialize");
        assert_eq!(json, "\"inside\"");
    }
}
