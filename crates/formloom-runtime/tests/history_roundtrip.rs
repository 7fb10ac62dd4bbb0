#![forbid(unsafe_code)]

//! Undo/redo round trips over random command streams.
//!
//! A deterministic LCG drives adds, moves, deletes, duplicates, drags and
//! page edits through [`FormBuilder`]. Every committed state is recorded;
//! undoing everything must walk back through exactly those states and
//! redoing must walk forward again.

use std::time::Duration;

use formloom_core::{DropIntent, Point, Size};
use formloom_layout::{ComponentId, ComponentKind, ComponentPatch, FormState};
use formloom_runtime::{BuilderConfig, DragSource, DropSite, FormBuilder};
use proptest::prelude::*;
use web_time::Instant;

#[derive(Debug, Clone)]
struct Lcg {
    state: u64,
}

impl Lcg {
    fn new(seed: u64) -> Self {
        Self {
            state: seed ^ 0x2545_F491_4F6C_DD1D,
        }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.state >> 11
    }

    fn choose_index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0);
        (self.next_u64() % len as u64) as usize
    }
}

const INTENTS: [DropIntent; 5] = [
    DropIntent::Left,
    DropIntent::Right,
    DropIntent::Before,
    DropIntent::After,
    DropIntent::Inside,
];

const PALETTE: [ComponentKind; 7] = [
    ComponentKind::TextInput,
    ComponentKind::Email,
    ComponentKind::Number,
    ComponentKind::RadioGroup,
    ComponentKind::Date,
    ComponentKind::Divider,
    ComponentKind::VerticalGroup,
];

fn pick_id(builder: &FormBuilder, rng: &mut Lcg) -> Option<ComponentId> {
    let ids = builder.state().tree().ids();
    (!ids.is_empty()).then(|| ids[rng.choose_index(ids.len())].clone())
}

fn random_step(builder: &mut FormBuilder, rng: &mut Lcg, now: Instant) {
    let intent = INTENTS[rng.choose_index(INTENTS.len())];
    let kind = PALETTE[rng.choose_index(PALETTE.len())];
    let target = pick_id(builder, rng);
    match rng.next_u64() % 9 {
        0..=2 => {
            builder.add_component_at(kind, target.as_ref(), intent, now);
        }
        3 => {
            if let Some(source) = pick_id(builder, rng) {
                builder.move_component(&source, target.as_ref(), intent);
            }
        }
        4 => {
            if let Some(id) = target {
                builder.delete_component(&id);
            }
        }
        5 => {
            if let Some(id) = target {
                builder.duplicate_component(&id);
            }
        }
        6 => {
            if let Some(id) = target {
                builder.update_component(
                    &id,
                    ComponentPatch::new().label(format!("Field {}", rng.next_u64() % 100)),
                );
            }
        }
        7 => {
            builder.on_drag_start(DragSource::Palette(kind));
            let site = match &target {
                Some(id) => DropSite::Component {
                    id,
                    pointer: Point::new(
                        (rng.next_u64() % 400) as f64,
                        (rng.next_u64() % 80) as f64,
                    ),
                    size: Size::new(400.0, 80.0),
                },
                None => DropSite::Canvas,
            };
            builder.on_drag_hover(site);
            builder.on_drop(site);
        }
        _ => {
            if builder.state().pages().len() < 3 {
                builder.add_page("More");
            } else {
                let id = builder.state().current_page_id().clone();
                let _ = builder.remove_page(&id);
            }
        }
    }
}

fn run(seed: u64, steps: usize) -> (FormBuilder, Vec<FormState>) {
    let mut config = BuilderConfig::default();
    config.history.max_depth = steps + 1;
    let mut builder = FormBuilder::with_config(config).expect("valid config");
    let mut rng = Lcg::new(seed);
    let mut timeline = vec![builder.state().clone()];
    let t0 = Instant::now();

    for step in 0..steps {
        random_step(&mut builder, &mut rng, t0 + Duration::from_secs(step as u64));
        let state = builder.state();
        for page in state.pages() {
            page.tree
                .check_invariants()
                .expect("committed state stays well formed");
        }
        if timeline.last() != Some(state) {
            timeline.push(state.clone());
        }
    }
    (builder, timeline)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn undo_walks_back_through_every_commit(seed in any::<u64>(), steps in 5usize..60) {
        let (mut builder, timeline) = run(seed, steps);
        for expected in timeline.iter().rev().skip(1) {
            prop_assert!(builder.can_undo());
            builder.undo();
            prop_assert_eq!(builder.state(), expected);
        }
        prop_assert!(!builder.can_undo());
    }

    #[test]
    fn redo_restores_the_final_state(seed in any::<u64>(), steps in 5usize..60) {
        let (mut builder, timeline) = run(seed, steps);
        let last = timeline.last().cloned().expect("timeline has the initial state");
        while builder.can_undo() {
            builder.undo();
        }
        while builder.can_redo() {
            builder.redo();
        }
        prop_assert_eq!(builder.state(), &last);
    }

    #[test]
    fn component_ids_stay_unique_across_pages(seed in any::<u64>(), steps in 5usize..60) {
        let (builder, _) = run(seed, steps);
        let mut ids = builder.state().all_ids();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        prop_assert_eq!(ids.len(), total);
    }
}
