//! Property/fuzz-style invariants for component tree operations.
//!
//! Random drag-and-drop streams (palette adds, moves, removals, duplicates,
//! raw side inserts) run against the public engine API. After every step the
//! tree must satisfy the structural rules, rejected operations must leave the
//! input untouched, and the whole stream must replay deterministically.

use formloom_core::DropIntent;
use formloom_layout::{
    ComponentFactory, ComponentId, ComponentKind, ComponentTree, DraggedItem, MAX_GROUP_CHILDREN,
    OperationFailure, TreeOperation, drop_operation,
};
use proptest::prelude::*;

#[derive(Debug, Clone)]
struct Lcg {
    state: u64,
}

impl Lcg {
    fn new(seed: u64) -> Self {
        Self {
            state: seed ^ 0x9E37_79B9_7F4A_7C15,
        }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        self.state
    }

    fn choose_index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0);
        (self.next_u64() % len as u64) as usize
    }

    fn choose_bool(&mut self) -> bool {
        (self.next_u64() & 1) == 0
    }
}

const INTENTS: [DropIntent; 5] = [
    DropIntent::Left,
    DropIntent::Right,
    DropIntent::Before,
    DropIntent::After,
    DropIntent::Inside,
];

const PALETTE: [ComponentKind; 6] = [
    ComponentKind::TextInput,
    ComponentKind::Email,
    ComponentKind::Select,
    ComponentKind::Checkbox,
    ComponentKind::Divider,
    ComponentKind::VerticalGroup,
];

fn random_target(tree: &ComponentTree, rng: &mut Lcg) -> Option<ComponentId> {
    let ids = tree.ids();
    if ids.is_empty() || rng.next_u64() % 6 == 0 {
        return None;
    }
    Some(ids[rng.choose_index(ids.len())].clone())
}

fn random_operation(
    tree: &ComponentTree,
    factory: &mut ComponentFactory,
    rng: &mut Lcg,
) -> TreeOperation {
    let ids = tree.ids();
    let intent = INTENTS[rng.choose_index(INTENTS.len())];
    let roll = if ids.is_empty() { 0 } else { rng.next_u64() % 10 };
    match roll {
        0..=3 => {
            let kind = PALETTE[rng.choose_index(PALETTE.len())];
            let target = random_target(tree, rng);
            drop_operation(tree, factory, &DraggedItem::palette(kind), target.as_ref(), intent)
        }
        4..=6 => {
            let source = &ids[rng.choose_index(ids.len())];
            let node = tree.get(source).expect("listed id exists");
            let target = random_target(tree, rng);
            drop_operation(tree, factory, &DraggedItem::existing(node), target.as_ref(), intent)
        }
        7 => TreeOperation::Remove {
            id: ids[rng.choose_index(ids.len())].clone(),
        },
        8 => TreeOperation::Duplicate {
            id: ids[rng.choose_index(ids.len())].clone(),
        },
        _ => {
            // Raw, unresolved placement: the engine alone must keep the rules.
            let source = ids[rng.choose_index(ids.len())].clone();
            let target = random_target(tree, rng);
            if rng.choose_bool() {
                TreeOperation::Move {
                    source,
                    target,
                    intent,
                }
            } else {
                TreeOperation::Insert {
                    component: factory.create(PALETTE[rng.choose_index(PALETTE.len())]),
                    target,
                    intent,
                }
            }
        }
    }
}

fn assert_shape(tree: &ComponentTree) {
    tree.check_invariants()
        .expect("tree should remain structurally valid");
    tree.walk(|node| {
        if node.is_horizontal_group() {
            assert!(node.children().len() <= MAX_GROUP_CHILDREN);
            assert!(
                node.children()
                    .iter()
                    .all(|child| !child.contains_horizontal_group())
            );
        }
    });
}

/// A copy never nests inside its original and carries the same subtree.
fn assert_duplicate_is_sibling(
    before: &ComponentTree,
    after: &ComponentTree,
    original: &ComponentId,
    copy: Option<&ComponentId>,
) {
    let copy = copy.expect("duplicate reports the copy");
    assert!(
        !after.is_descendant(original, copy),
        "copy {copy} landed inside {original}"
    );
    assert_eq!(
        after.get(copy).map(|node| node.subtree_len()),
        before.get(original).map(|node| node.subtree_len()),
    );
    assert_eq!(after.len(), before.len() + after.get(copy).map_or(0, |n| n.subtree_len()));
}

fn run_sequence(seed: u64, steps: usize) -> (ComponentTree, Vec<TreeOperation>) {
    let mut tree = ComponentTree::new();
    let mut factory = ComponentFactory::new("fz");
    let mut rng = Lcg::new(seed);
    let mut applied = Vec::with_capacity(steps);

    for step in 0..steps {
        let operation = random_operation(&tree, &mut factory, &mut rng);
        let before = tree.clone();
        match tree.apply(&mut factory, operation.clone()) {
            Ok((next, outcome)) => {
                assert_shape(&next);
                if let TreeOperation::Duplicate { id } = &operation {
                    assert_duplicate_is_sibling(&before, &next, id, outcome.placed.as_ref());
                }
                tree = next;
            }
            Err(err) => {
                assert!(
                    !matches!(
                        err.reason,
                        OperationFailure::Invariant(_) | OperationFailure::DanglingPath
                    ),
                    "engine bug at step {step}, seed={seed}, op={operation:?}: {err}"
                );
                assert_eq!(tree, before, "rejected operation must not mutate");
            }
        }
        applied.push(operation);
    }

    (tree, applied)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn random_drop_streams_preserve_invariants(
        seed in any::<u64>(),
        steps in 20usize..150,
    ) {
        let (tree, _) = run_sequence(seed, steps);
        assert_shape(&tree);
    }

    #[test]
    fn random_drop_streams_replay_deterministically(
        seed in any::<u64>(),
        steps in 20usize..80,
    ) {
        let (first_tree, first_ops) = run_sequence(seed, steps);
        let (second_tree, second_ops) = run_sequence(seed, steps);
        prop_assert_eq!(first_ops, second_ops);
        prop_assert_eq!(first_tree, second_tree);
    }

    #[test]
    fn removal_accounts_for_every_node(
        seed in any::<u64>(),
        steps in 10usize..60,
    ) {
        let (tree, _) = run_sequence(seed, steps);
        let ids = tree.ids();
        prop_assume!(!ids.is_empty());
        let mut rng = Lcg::new(seed.rotate_left(17));
        let victim = ids[rng.choose_index(ids.len())].clone();
        let subtree = tree.get(&victim).expect("victim exists").subtree_len();

        let (next, outcome) = tree
            .apply(&mut ComponentFactory::new("rm"), TreeOperation::Remove { id: victim.clone() })
            .expect("removing an existing node always succeeds");
        prop_assert!(!next.contains(&victim));
        prop_assert_eq!(next.len() + subtree + outcome.dissolved.len(), tree.len());
    }
}
