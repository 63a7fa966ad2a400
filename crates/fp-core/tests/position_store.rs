//! Integration tests: debounced persistence and plan isolation (fp-core).
//!
//! Drives `PositionStore` with the virtual-clock timer host and records every
//! save the store requests.

use fp_core::{
    FloorPlanId, ManualTimers, NormalizedPosition, ObjectId, PixelPoint, PositionEntry,
    PositionStore, Size,
};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;

type Saves = Rc<RefCell<Vec<(FloorPlanId, Vec<PositionEntry>)>>>;

const DEBOUNCE_MS: u32 = 5000;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn make_store() -> (PositionStore, ManualTimers, Saves) {
    init_logging();
    let timers = ManualTimers::new();
    let saves: Saves = Rc::default();
    let sink = saves.clone();
    let store = PositionStore::new(
        Box::new(timers.clone()),
        DEBOUNCE_MS,
        Box::new(move |plan, entries| sink.borrow_mut().push((plan.clone(), entries.to_vec()))),
    );
    (store, timers, saves)
}

fn advance(store: &mut PositionStore, timers: &ManualTimers, ms: u64) {
    for handle in timers.advance(ms) {
        store.timer_fired(handle);
    }
}

fn plan(id: &str) -> FloorPlanId {
    FloorPlanId::new(id)
}

fn obj(id: &str) -> ObjectId {
    ObjectId::new(id)
}

// ─── Debounce ───────────────────────────────────────────────────────────

#[test]
fn rapid_updates_coalesce_into_one_save() {
    let (mut store, timers, saves) = make_store();
    store.set_current_plan("ground");

    for i in 0..10 {
        let v = f64::from(i) / 10.0;
        store.update_position("light.kitchen", v, v, false);
        advance(&mut store, &timers, 1000);
    }
    assert!(saves.borrow().is_empty(), "saved before the quiet period");

    advance(&mut store, &timers, 4000);
    let saves = saves.borrow();
    assert_eq!(saves.len(), 1);
    assert_eq!(saves[0].0, plan("ground"));
    assert_eq!(
        saves[0].1,
        vec![PositionEntry::new("light.kitchen", 0.9, 0.9)]
    );
}

#[test]
fn save_fires_exactly_at_debounce_boundary() {
    let (mut store, timers, saves) = make_store();
    store.set_current_plan("ground");
    store.update_position("light.a", 0.2, 0.3, false);

    advance(&mut store, &timers, 4999);
    assert!(saves.borrow().is_empty());
    advance(&mut store, &timers, 1);
    assert_eq!(saves.borrow().len(), 1);
    assert!(!store.has_pending_save());
}

#[test]
fn snapshot_contains_whole_plan_not_just_delta() {
    let (mut store, timers, saves) = make_store();
    store.set_current_plan("ground");
    store.load_positions(
        &plan("ground"),
        &[
            PositionEntry::new("light.a", 0.1, 0.1),
            PositionEntry::new("sensor.b", 0.2, 0.2),
        ],
    );
    store.update_position("sensor.b", 0.7, 0.7, false);
    store.update_position("cover.c", 0.3, 0.4, false);
    store.remove_position(&obj("light.a"));

    advance(&mut store, &timers, 5000);
    let saves = saves.borrow();
    assert_eq!(saves.len(), 1);
    assert_eq!(saves[0].1, store.get_all_positions());
    assert_eq!(
        saves[0].1,
        vec![
            PositionEntry::new("cover.c", 0.3, 0.4),
            PositionEntry::new("sensor.b", 0.7, 0.7),
        ]
    );
}

#[test]
fn bulk_load_never_writes_back() {
    let (mut store, timers, saves) = make_store();
    let n = store
        .load_positions_json(
            &plan("ground"),
            r#"[{"entity_id":"light.a","position":{"x":0.25,"y":0.75}}]"#,
        )
        .unwrap();
    assert_eq!(n, 1);
    store.set_current_plan("ground");
    store.update_position("light.b", 0.5, 0.5, true);

    advance(&mut store, &timers, 60_000);
    assert!(saves.borrow().is_empty());
    assert_eq!(
        store.get_position(&obj("light.a")),
        Some(NormalizedPosition::new(0.25, 0.75))
    );
}

#[test]
fn malformed_bulk_load_is_rejected() {
    let (mut store, _timers, _saves) = make_store();
    assert!(store.load_positions_json(&plan("ground"), "[{]").is_err());
    assert!(store.positions_for(&plan("ground")).is_empty());
}

// ─── Force save ─────────────────────────────────────────────────────────

#[test]
fn force_save_cancels_pending_timer() {
    let (mut store, timers, saves) = make_store();
    store.set_current_plan("ground");
    store.update_position("light.a", 0.4, 0.6, false);

    store.force_save();
    assert_eq!(saves.borrow().len(), 1, "force_save must save synchronously");
    assert_eq!(timers.pending_count(), 0);

    advance(&mut store, &timers, 60_000);
    assert_eq!(saves.borrow().len(), 1, "debounced save fired after force_save");
}

#[test]
fn force_save_without_changes_flushes_current_plan() {
    let (mut store, _timers, saves) = make_store();
    store.set_current_plan("ground");
    store.update_position("light.a", 0.4, 0.6, true);

    store.force_save();
    let saves = saves.borrow();
    assert_eq!(saves.len(), 1);
    assert_eq!(saves[0].1, vec![PositionEntry::new("light.a", 0.4, 0.6)]);
}

#[test]
fn mutation_after_force_save_needs_a_new_period() {
    let (mut store, timers, saves) = make_store();
    store.set_current_plan("ground");
    store.update_position("light.a", 0.1, 0.1, false);
    store.force_save();
    store.update_position("light.a", 0.9, 0.9, false);

    advance(&mut store, &timers, 4000);
    assert_eq!(saves.borrow().len(), 1);
    advance(&mut store, &timers, 1000);
    let saves = saves.borrow();
    assert_eq!(saves.len(), 2);
    assert_eq!(saves[1].1, vec![PositionEntry::new("light.a", 0.9, 0.9)]);
}

// ─── Multi-plan isolation ───────────────────────────────────────────────

#[test]
fn positions_are_isolated_per_plan() {
    let (mut store, _timers, _saves) = make_store();
    store.set_current_plan("p1");
    store.update_position("a", 0.2, 0.8, false);

    store.set_current_plan("p2");
    assert_eq!(store.get_position(&obj("a")), None);
    assert!(store.get_all_positions().is_empty());

    store.set_current_plan("p1");
    assert_eq!(
        store.get_position(&obj("a")),
        Some(NormalizedPosition::new(0.2, 0.8))
    );
}

#[test]
fn switching_plan_before_timer_saves_the_mutated_plan() {
    let (mut store, timers, saves) = make_store();
    store.set_current_plan("p1");
    store.update_position("a", 0.2, 0.8, false);
    store.set_current_plan("p2");

    advance(&mut store, &timers, 5000);
    let saves = saves.borrow();
    assert_eq!(saves.len(), 1);
    assert_eq!(saves[0].0, plan("p1"));
}

#[test]
fn edits_on_two_plans_save_both_snapshots() {
    let (mut store, timers, saves) = make_store();
    store.update_position_in(&plan("p1"), "a", NormalizedPosition::new(0.1, 0.1), false);
    store.update_position_in(&plan("p2"), "b", NormalizedPosition::new(0.2, 0.2), false);

    advance(&mut store, &timers, 5000);
    let saved: Vec<FloorPlanId> = saves.borrow().iter().map(|(p, _)| p.clone()).collect();
    assert_eq!(saved, vec![plan("p1"), plan("p2")]);
}

// ─── Normalization ──────────────────────────────────────────────────────

#[test]
fn normalized_position_survives_surface_rescale() {
    let surface = Size::new(500.0, 400.0);
    let dropped = PixelPoint::new(125.0, 300.0);
    let normalized = NormalizedPosition::from_surface_pixels(dropped, surface).unwrap();

    let (mut store, _timers, _saves) = make_store();
    store.set_current_plan("ground");
    store.update_position("light.a", normalized.x, normalized.y, true);

    let stored = store.get_position(&obj("light.a")).unwrap();
    let resized = Size::new(1000.0, 800.0);
    let placed = stored.to_surface_pixels(resized);
    assert!((placed.x - 250.0).abs() < 1e-9);
    assert!((placed.y - 600.0).abs() < 1e-9);

    let back = stored.to_surface_pixels(surface);
    assert!((back.x - dropped.x).abs() < 1e-9);
    assert!((back.y - dropped.y).abs() < 1e-9);
}

#[test]
fn payload_matches_persisted_shape() {
    let entry = PositionEntry::new("light.a", 0.5, 0.25);
    let json = serde_json::to_value(&entry).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"entity_id": "light.a", "position": {"x": 0.5, "y": 0.25}})
    );
}
