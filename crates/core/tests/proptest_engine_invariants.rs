//! Property-based invariant tests for the carousel engine.
//!
//! 1. Wrap correction keeps the offset on the track and preserves the item
//!    shown at the leading edge.
//! 2. Building from a built track's own items reproduces it exactly.
//! 3. Momentum reaches rest within `log(floor / |v0|) / log(decay)` ticks.
//! 4. Snapping lands on the nearest exact multiple of the item width.
//! 5. A drag move lands at `a − (p1 − p0) × gain` before any correction.

use infiniscroll_core::momentum::{Momentum, max_ticks};
use infiniscroll_core::snap::{nearest_index, snap_target};
use infiniscroll_core::wrap::correct;
use infiniscroll_core::{CarouselEngine, EngineConfig, Track};
use infiniscroll_protocol::{HostEvent, ItemMeasure, ItemRole};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

fn item_list(max_len: usize) -> impl Strategy<Value = Vec<ItemMeasure>> {
    proptest::collection::vec(
        (1.0f64..400.0, any::<bool>()).prop_map(|(width, duplicate)| {
            if duplicate {
                ItemMeasure::duplicate(width)
            } else {
                ItemMeasure::original(width)
            }
        }),
        1..=max_len,
    )
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Wrap invariant
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn wrap_stays_on_track_and_preserves_item(
        count in 1usize..12,
        raw_width in 1u32..400,
        fraction in -0.999f64..3.0,
    ) {
        let items = vec![ItemMeasure::original(f64::from(raw_width)); count];
        let track = Track::build(&items, 20.0).unwrap();
        let segment = track.segment_width();
        // Whole units keep the segment arithmetic exact.
        let offset = (fraction * segment).round();

        let corrected = correct(offset, segment).unwrap_or(offset);
        prop_assert!(
            (0.0..=3.0 * segment).contains(&corrected),
            "offset {} corrected to {} (segment {})", offset, corrected, segment
        );
        if corrected != offset {
            prop_assert_eq!((corrected - offset).abs(), segment);
            prop_assert_eq!(track.logical_index(corrected), track.logical_index(offset));
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Rebuild idempotence
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn rebuild_keeps_three_copies(items in item_list(24)) {
        let originals = items.iter().filter(|i| i.role == ItemRole::Original).count();
        match Track::build(&items, 20.0) {
            Ok(first) => {
                let second = Track::build(&first.measures(), 20.0).unwrap();
                prop_assert_eq!(second.len(), 3 * originals);
                prop_assert_eq!(
                    second.slots().iter().filter(|s| s.role() == ItemRole::Original).count(),
                    originals
                );
                prop_assert_eq!(&first, &second);
            }
            Err(_) => prop_assert_eq!(originals, 0),
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Momentum termination
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn momentum_terminates_within_bound(speed in 0.1001f64..50.0, leftward in any::<bool>()) {
        let config = EngineConfig::default();
        let v0 = if leftward { -speed } else { speed };
        let bound = max_ticks(v0, config.decay, config.velocity_floor);

        let mut momentum = Momentum::launch(v0, &config);
        while momentum.step().is_some() {
            prop_assert!(momentum.ticks() <= bound, "v0={} exceeded {} ticks", v0, bound);
        }
        prop_assert!(momentum.velocity().abs() <= config.velocity_floor);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Snap alignment
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn snap_lands_on_nearest_multiple(offset in -2000.0f64..5000.0, width in 1u32..500) {
        let item_width = f64::from(width);
        let index = nearest_index(offset, item_width).unwrap();
        let target = snap_target(offset, item_width).unwrap();

        prop_assert_eq!(target, index as f64 * item_width);
        prop_assert!((target - offset).abs() <= item_width / 2.0 + 1e-9);
        // No other multiple is strictly closer.
        for neighbour in [index - 1, index + 1] {
            let other = neighbour as f64 * item_width;
            prop_assert!((other - offset).abs() + 1e-9 >= (target - offset).abs());
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Drag displacement law
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn drag_moves_by_gain(p0 in 0.0f64..400.0, travel in -150.0f64..150.0) {
        let mut engine = CarouselEngine::new(EngineConfig::default());
        engine.handle(HostEvent::Attach {
            items: vec![ItemMeasure::original(80.0); 4],
            viewport_width: 375.0,
        });
        let anchor = engine.offset();

        engine.handle(HostEvent::PointerDown { x: p0, time_ms: 0.0 });
        engine.handle(HostEvent::PointerMove { x: p0 + travel, time_ms: 16.0 });

        // |travel × 1.2| < 200 keeps the move inside (0, 800): no rewrite.
        let expected = anchor - ((p0 + travel) - p0) * 1.2;
        prop_assert!((engine.offset() - expected).abs() < 1e-9);
        prop_assert!(!engine.is_locked());
    }
}
