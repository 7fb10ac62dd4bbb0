#![no_main]

use arbitrary::Arbitrary;
use formloom_core::{DropIntent, Point, Size};
use formloom_layout::{ComponentId, ComponentKind};
use formloom_runtime::{DragSource, DropSite, FormBuilder};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Step {
    Add { kind: u8, target: u8, intent: u8 },
    Move { source: u8, target: u8, intent: u8 },
    Delete { id: u8 },
    Duplicate { id: u8 },
    Drag { kind: u8, target: u8, x: u16, y: u16 },
    DragOut { id: u8 },
    Undo,
    Redo,
}

fn kind(raw: u8) -> ComponentKind {
    ComponentKind::ALL[raw as usize % ComponentKind::ALL.len()]
}

fn intent(raw: u8) -> DropIntent {
    [
        DropIntent::Left,
        DropIntent::Right,
        DropIntent::Before,
        DropIntent::After,
        DropIntent::Inside,
    ][raw as usize % 5]
}

fn pick(builder: &FormBuilder, raw: u8) -> Option<ComponentId> {
    let ids = builder.state().tree().ids();
    if ids.is_empty() || raw == u8::MAX {
        return None;
    }
    Some(ids[raw as usize % ids.len()].clone())
}

fuzz_target!(|steps: Vec<Step>| {
    let mut builder = FormBuilder::new();
    for step in steps.into_iter().take(256) {
        match step {
            Step::Add { kind: k, target, intent: i } => {
                let target = pick(&builder, target);
                builder.add_component(kind(k), target.as_ref(), intent(i));
            }
            Step::Move { source, target, intent: i } => {
                if let Some(source) = pick(&builder, source) {
                    let target = pick(&builder, target);
                    builder.move_component(&source, target.as_ref(), intent(i));
                }
            }
            Step::Delete { id } => {
                if let Some(id) = pick(&builder, id) {
                    builder.delete_component(&id);
                }
            }
            Step::Duplicate { id } => {
                if let Some(id) = pick(&builder, id) {
                    builder.duplicate_component(&id);
                }
            }
            Step::Drag { kind: k, target, x, y } => {
                let target = pick(&builder, target);
                builder.on_drag_start(DragSource::Palette(kind(k)));
                let site = match &target {
                    Some(id) => DropSite::Component {
                        id,
                        pointer: Point::new(f64::from(x % 500), f64::from(y % 120)),
                        size: Size::new(400.0, 100.0),
                    },
                    None => DropSite::Canvas,
                };
                builder.on_drag_hover(site);
                builder.on_drop(site);
            }
            Step::DragOut { id } => {
                if let Some(id) = pick(&builder, id) {
                    builder.on_drag_start(DragSource::Existing(id));
                    builder.on_drop(DropSite::Outside);
                }
            }
            Step::Undo => {
                builder.undo();
            }
            Step::Redo => {
                builder.redo();
            }
        }
        builder
            .state()
            .tree()
            .check_invariants()
            .expect("committed tree is well formed");
    }
});
