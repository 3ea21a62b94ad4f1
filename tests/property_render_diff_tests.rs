use std::collections::BTreeSet;
use std::time::Duration;

use proptest::prelude::*;
use statchart::render::{
    Attributes, ElementKind, ElementSpec, KeyedElement, RecordingSurface, RenderDiffEngine,
    reconcile,
};

struct Drawn(String);

impl KeyedElement for Drawn {
    fn key(&self) -> &str {
        &self.0
    }
}

fn key_set() -> impl Strategy<Value = BTreeSet<u8>> {
    prop::collection::btree_set(0u8..24, 0..16)
}

fn specs(keys: &[(u8, f64)]) -> Vec<ElementSpec<f64>> {
    keys.iter()
        .map(|&(key, width)| {
            ElementSpec::new(
                format!("k{key}"),
                ElementKind::Rect,
                width,
                Attributes::new().with("width", width),
                Attributes::new().with("width", 0.0),
            )
        })
        .collect()
}

proptest! {
    #[test]
    fn reconcile_groups_are_disjoint_and_complete(
        previous in key_set(),
        next in prop::collection::vec(0u8..24, 0..24)
    ) {
        let drawn: Vec<Drawn> = previous.iter().map(|key| Drawn(format!("k{key}"))).collect();
        let result = reconcile(drawn.iter(), next.clone(), |key| format!("k{key}"));

        let enter: BTreeSet<&str> = result.enter.iter().map(|entry| entry.key.as_str()).collect();
        let update: BTreeSet<&str> =
            result.update.iter().map(|(_, entry)| entry.key.as_str()).collect();
        let exit: BTreeSet<&str> = result.exit.iter().map(|element| element.key()).collect();

        prop_assert!(enter.is_disjoint(&update));
        prop_assert!(enter.is_disjoint(&exit));
        prop_assert!(update.is_disjoint(&exit));

        let distinct_next: BTreeSet<String> = next.iter().map(|key| format!("k{key}")).collect();
        prop_assert_eq!(enter.len() + update.len(), distinct_next.len());
        prop_assert_eq!(update.len() + exit.len(), drawn.len());
    }

    #[test]
    fn engine_settles_at_latest_targets(
        draws in prop::collection::vec(
            prop::collection::vec((0u8..12, 0.0f64..500.0), 0..10),
            1..5
        ),
        step_ms in 0u64..1_200
    ) {
        let mut surface = RecordingSurface::new();
        let mut engine = RenderDiffEngine::default();

        for draw in &draws {
            engine.apply(&mut surface, specs(draw)).expect("apply");
            engine.tick(&mut surface, Duration::from_millis(step_ms)).expect("tick");
        }
        engine.settle(&mut surface).expect("settle");

        let last = draws.last().expect("at least one draw");
        let mut expected: Vec<(String, f64)> = Vec::new();
        for &(key, width) in last {
            let key = format!("k{key}");
            if !expected.iter().any(|(seen, _)| *seen == key) {
                expected.push((key, width));
            }
        }

        prop_assert_eq!(surface.len(), expected.len());
        prop_assert_eq!(engine.len(), expected.len());
        prop_assert!(!engine.is_animating());
        for (key, width) in expected {
            let element = surface.element_by_key(&key).expect("live element");
            prop_assert_eq!(element.attributes.number("width"), Some(width));
        }
    }
}
