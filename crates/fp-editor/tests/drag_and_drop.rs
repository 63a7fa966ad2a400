//! Integration tests: constrained drag, surface fit and trash drops (fp-editor).
//!
//! Simulates the bridge: pointer events go into `ConstrainedDrag`, drops are
//! resolved by `CanvasModel`, and the result is written to a `PositionStore`.

use fp_core::{
    EngineConfig, EngineError, FloorPlanId, ManualTimers, NormalizedPosition, ObjectId,
    PixelPoint, PositionStore, Rect, Size,
};
use fp_editor::{
    AnchorPoll, CanvasModel, ConstrainedDrag, ConstraintMode, DragEffect, DragFrame, DropOutcome,
    PointerInput, PollStep,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// 40×40 element whose center sits at `center` (client px).
fn element_at(center: PixelPoint) -> Rect {
    Rect::new(center.x - 20.0, center.y - 20.0, 40.0, 40.0)
}

fn drag_to(
    drag: &mut ConstrainedDrag,
    frame: &DragFrame,
    press: PixelPoint,
    to: PixelPoint,
) -> (DragEffect, DragEffect) {
    let started = drag.handle(
        &PointerInput::from_pointer_down(press.x, press.y, 0),
        frame,
        false,
    );
    assert_eq!(started, DragEffect::Started);
    let moved = drag.handle(&PointerInput::from_pointer_move(to.x, to.y), frame, false);
    let dropped = drag.handle(&PointerInput::from_pointer_up(to.x, to.y), frame, false);
    (moved, dropped)
}

// ─── Clamping ───────────────────────────────────────────────────────────

#[test]
fn full_mode_keeps_box_inside_container() {
    init_logging();
    let container = Rect::new(0.0, 0.0, 500.0, 400.0);
    let frame = DragFrame {
        element: Rect::new(100.0, 100.0, 40.0, 40.0),
        container,
    };

    let mut drag = ConstrainedDrag::new(ConstraintMode::Full);
    let (moved, dropped) = drag_to(
        &mut drag,
        &frame,
        PixelPoint::new(100.0, 100.0),
        PixelPoint::new(-300.0, -300.0),
    );
    assert_eq!(moved, DragEffect::MoveTo(PixelPoint::new(0.0, 0.0)));
    assert_eq!(dropped, DragEffect::Dropped(PixelPoint::new(0.0, 0.0)));

    let (moved, _) = drag_to(
        &mut drag,
        &frame,
        PixelPoint::new(100.0, 100.0),
        PixelPoint::new(9000.0, 9000.0),
    );
    assert_eq!(moved, DragEffect::MoveTo(PixelPoint::new(460.0, 360.0)));
}

#[test]
fn center_mode_lets_half_the_element_overlap() {
    init_logging();
    let container = Rect::new(0.0, 0.0, 500.0, 400.0);
    let frame = DragFrame {
        element: element_at(PixelPoint::new(250.0, 200.0)),
        container,
    };

    let mut drag = ConstrainedDrag::new(ConstraintMode::Center);
    let (moved, dropped) = drag_to(
        &mut drag,
        &frame,
        PixelPoint::new(250.0, 200.0),
        PixelPoint::new(9000.0, -50.0),
    );
    assert_eq!(moved, DragEffect::MoveTo(PixelPoint::new(500.0, 0.0)));
    assert_eq!(dropped, DragEffect::Dropped(PixelPoint::new(500.0, 0.0)));
}

#[test]
fn drop_is_reported_once() {
    let frame = DragFrame {
        element: element_at(PixelPoint::new(50.0, 50.0)),
        container: Rect::new(0.0, 0.0, 500.0, 400.0),
    };
    let mut drag = ConstrainedDrag::default();
    drag_to(
        &mut drag,
        &frame,
        PixelPoint::new(50.0, 50.0),
        PixelPoint::new(60.0, 60.0),
    );
    assert_eq!(
        drag.handle(&PointerInput::from_pointer_up(60.0, 60.0), &frame, false),
        DragEffect::None
    );
}

// ─── Fit & placement ────────────────────────────────────────────────────

#[test]
fn landscape_image_fits_with_vertical_margins() {
    init_logging();
    let mut canvas = CanvasModel::new(FloorPlanId::new("ground"), &EngineConfig::default());
    canvas.set_image(Size::new(1000.0, 800.0));
    let fit = canvas.refit(Some(Size::new(500.0, 500.0))).unwrap();

    assert_eq!(fit.scale, 0.5);
    assert_eq!(fit.surface, Rect::new(0.0, 50.0, 500.0, 400.0));

    let lamp = ObjectId::new("light.kitchen");
    canvas.attach(lamp.clone(), NormalizedPosition::CENTER);
    assert_eq!(canvas.placement(&lamp), Some(PixelPoint::new(250.0, 200.0)));
}

#[test]
fn placement_follows_resize() {
    let mut canvas = CanvasModel::new(FloorPlanId::new("ground"), &EngineConfig::default());
    canvas.set_image(Size::new(1000.0, 800.0));
    let lamp = ObjectId::new("light.kitchen");
    canvas.attach(lamp.clone(), NormalizedPosition::new(0.25, 0.75));

    canvas.refit(Some(Size::new(500.0, 500.0))).unwrap();
    assert_eq!(canvas.placement(&lamp), Some(PixelPoint::new(125.0, 300.0)));

    canvas.refit(Some(Size::new(2000.0, 1600.0))).unwrap();
    assert_eq!(canvas.placement(&lamp), Some(PixelPoint::new(500.0, 1200.0)));
    assert_eq!(
        canvas.position_of(&lamp),
        Some(NormalizedPosition::new(0.25, 0.75))
    );
}

#[test]
fn hidden_container_uses_measurement_element() {
    let mut canvas = CanvasModel::new(FloorPlanId::new("ground"), &EngineConfig::default());
    canvas.set_image(Size::new(1000.0, 800.0));
    let size = CanvasModel::measure(Size::default(), Size::new(500.0, 500.0));
    assert_eq!(canvas.refit(size).unwrap().scale, 0.5);

    let size = CanvasModel::measure(Size::default(), Size::default());
    assert_eq!(canvas.refit(size), Err(EngineError::ZeroSize));
}

// ─── Drops ──────────────────────────────────────────────────────────────

fn store_for(plan: &FloorPlanId) -> (PositionStore, ManualTimers) {
    let timers = ManualTimers::new();
    let mut store = PositionStore::new(Box::new(timers.clone()), 5000, Box::new(|_, _| {}));
    store.set_current_plan(plan.clone());
    (store, timers)
}

#[test]
fn drop_on_trash_in_edit_mode_deletes_widget_and_entry() {
    init_logging();
    let plan = FloorPlanId::new("ground");
    let (mut store, _timers) = store_for(&plan);

    let mut canvas = CanvasModel::new(plan.clone(), &EngineConfig::default());
    canvas.set_edit_mode(true);

    let lamp = ObjectId::new("light.kitchen");
    store.update_position(lamp.clone(), 0.5, 0.5, true);
    canvas.attach(lamp.clone(), NormalizedPosition::CENTER);

    // Surface at client (100, 100), 500×400. Trash center at (0.95, 0.05)
    // → client (575, 120).
    let surface = Rect::new(100.0, 100.0, 500.0, 400.0);
    let trash_center = surface.to_client(canvas.trash_position().to_surface_pixels(surface.size()));
    let trash = element_at(trash_center);

    let frame = DragFrame {
        element: element_at(PixelPoint::new(350.0, 300.0)),
        container: surface,
    };
    let mut drag = ConstrainedDrag::new(ConstraintMode::Center);
    let (_, dropped) = drag_to(
        &mut drag,
        &frame,
        PixelPoint::new(350.0, 300.0),
        PixelPoint::new(575.0, 120.0),
    );
    let DragEffect::Dropped(local) = dropped else {
        panic!("expected a drop, got {dropped:?}");
    };
    assert_eq!(local, PixelPoint::new(475.0, 20.0));

    let outcome = canvas.apply_drop(&lamp, local, surface, Some(trash), &mut store);
    assert_eq!(outcome, DropOutcome::Trashed);
    assert!(!canvas.contains(&lamp));
    assert_eq!(store.get_position(&lamp), None);
    assert!(store.has_pending_save());
}

#[test]
fn drop_elsewhere_moves_widget_and_schedules_save() {
    let plan = FloorPlanId::new("ground");
    let (mut store, timers) = store_for(&plan);
    let mut canvas = CanvasModel::new(plan, &EngineConfig::default());
    let lamp = ObjectId::new("light.kitchen");
    canvas.attach(lamp.clone(), NormalizedPosition::CENTER);

    let surface = Rect::new(0.0, 0.0, 500.0, 400.0);
    let outcome = canvas.apply_drop(&lamp, PixelPoint::new(125.0, 300.0), surface, None, &mut store);

    let moved = NormalizedPosition::new(0.25, 0.75);
    assert_eq!(outcome, DropOutcome::Moved(moved));
    assert_eq!(canvas.position_of(&lamp), Some(moved));
    assert_eq!(store.get_position(&lamp), Some(moved));
    assert_eq!(timers.pending_count(), 1);
}

#[test]
fn click_without_move_keeps_stored_position_on_bordered_surface() {
    init_logging();
    let plan = FloorPlanId::new("ground");
    let (mut store, _timers) = store_for(&plan);
    let mut canvas = CanvasModel::new(plan, &EngineConfig::default());
    canvas.set_edit_mode(true);

    let lamp = ObjectId::new("light.kitchen");
    let start = NormalizedPosition::new(0.9, 0.1);
    store.update_position(lamp.clone(), start.x, start.y, true);
    canvas.attach(lamp.clone(), start);

    // 500×400 surface with the 3px edit-mode border: the border box is
    // 506×406 at (100, 50), percentages resolve against the padding box.
    let surface = Rect::new(100.0, 50.0, 506.0, 406.0).padding_box(3.0, 3.0, 500.0, 400.0);
    let trash = element_at(
        surface.to_client(canvas.trash_position().to_surface_pixels(surface.size())),
    );

    let mut drag = ConstrainedDrag::new(ConstraintMode::Center);
    for _ in 0..5 {
        let position = canvas.position_of(&lamp).unwrap();
        let center = surface.to_client(position.to_surface_pixels(surface.size()));
        let frame = DragFrame {
            element: element_at(center),
            container: surface,
        };
        let pressed = drag.handle(
            &PointerInput::from_pointer_down(center.x, center.y, 0),
            &frame,
            false,
        );
        assert_eq!(pressed, DragEffect::Started);
        let released = drag.handle(&PointerInput::from_pointer_up(center.x, center.y), &frame, false);
        let DragEffect::Dropped(local) = released else {
            panic!("expected a drop, got {released:?}");
        };
        canvas.apply_drop(&lamp, local, surface, Some(trash), &mut store);
    }

    assert_eq!(canvas.position_of(&lamp), Some(start));
    assert_eq!(store.get_position(&lamp), Some(start));
    assert!(!store.has_pending_save());
}

#[test]
fn ignored_drop_keeps_previous_position() {
    let plan = FloorPlanId::new("ground");
    let (mut store, _timers) = store_for(&plan);
    let mut canvas = CanvasModel::new(plan, &EngineConfig::default());
    let lamp = ObjectId::new("light.kitchen");
    let start = NormalizedPosition::new(0.3, 0.6);
    canvas.attach(lamp.clone(), start);

    let outcome = canvas.apply_drop(&lamp, PixelPoint::new(10.0, 10.0), Rect::default(), None, &mut store);
    assert_eq!(outcome, DropOutcome::Ignored);
    assert_eq!(canvas.position_of(&lamp), Some(start));
    assert!(!store.has_pending_save());
}

#[test]
fn trash_drop_is_persisted_under_reserved_id() {
    let plan = FloorPlanId::new("ground");
    let (mut store, _timers) = store_for(&plan);
    let mut canvas = CanvasModel::new(plan, &EngineConfig::default());

    let moved = canvas.apply_trash_drop(PixelPoint::new(50.0, 360.0), Size::new(500.0, 400.0), &mut store);
    let expected = NormalizedPosition::new(0.1, 0.9);
    assert_eq!(moved, Some(expected));
    assert_eq!(canvas.trash_position(), expected);
    assert_eq!(store.get_position(&ObjectId::trash()), Some(expected));
    assert!(store.has_pending_save());
}

#[test]
fn positions_loaded_after_canvas_creation_are_picked_up() {
    let plan = FloorPlanId::new("ground");
    let (mut store, _timers) = store_for(&plan);
    let mut canvas = CanvasModel::new(plan.clone(), &EngineConfig::default());
    let lamp = ObjectId::new("light.kitchen");
    let fan = ObjectId::new("switch.fan");
    canvas.attach(lamp.clone(), NormalizedPosition::CENTER);
    canvas.attach(fan.clone(), NormalizedPosition::new(0.2, 0.2));

    store
        .load_positions_json(
            &plan,
            r#"[
                {"entity_id": "__trash_icon__", "position": {"x": 0.05, "y": 0.95}},
                {"entity_id": "light.kitchen", "position": {"x": 0.7, "y": 0.3}}
            ]"#,
        )
        .unwrap();

    assert!(canvas.sync_from_store(&store));
    assert_eq!(canvas.trash_position(), NormalizedPosition::new(0.05, 0.95));
    assert_eq!(canvas.position_of(&lamp), Some(NormalizedPosition::new(0.7, 0.3)));
    assert_eq!(canvas.position_of(&fan), Some(NormalizedPosition::new(0.2, 0.2)));
    assert!(!store.has_pending_save());
    assert!(!canvas.sync_from_store(&store));
}

#[test]
fn drop_on_trash_outside_edit_mode_is_a_move() {
    let canvas = CanvasModel::new(FloorPlanId::new("ground"), &EngineConfig::default());
    let surface = Rect::new(100.0, 100.0, 500.0, 400.0);
    let trash = element_at(PixelPoint::new(575.0, 120.0));

    let outcome = canvas.resolve_drop(PixelPoint::new(475.0, 20.0), surface, Some(trash));
    assert_eq!(outcome, DropOutcome::Moved(NormalizedPosition::new(0.95, 0.05)));
}

#[test]
fn trash_edge_counts_as_inside() {
    let mut canvas = CanvasModel::new(FloorPlanId::new("ground"), &EngineConfig::default());
    canvas.set_edit_mode(true);
    let surface = Rect::new(0.0, 0.0, 500.0, 400.0);
    let trash = Rect::new(455.0, 0.0, 40.0, 40.0);

    let on_edge = canvas.resolve_drop(PixelPoint::new(455.0, 40.0), surface, Some(trash));
    assert_eq!(on_edge, DropOutcome::Trashed);

    let outside = canvas.resolve_drop(PixelPoint::new(454.0, 40.0), surface, Some(trash));
    assert!(matches!(outside, DropOutcome::Moved(_)));
}

#[test]
fn drop_on_empty_surface_is_ignored() {
    let canvas = CanvasModel::new(FloorPlanId::new("ground"), &EngineConfig::default());
    let outcome = canvas.resolve_drop(PixelPoint::new(10.0, 10.0), Rect::default(), None);
    assert_eq!(outcome, DropOutcome::Ignored);
}

// ─── Anchor poll ────────────────────────────────────────────────────────

#[test]
fn anchor_poll_gives_up_after_budget() {
    let config = EngineConfig::default();
    let mut poll = AnchorPoll::from_config(&config);

    let mut retries = 0;
    let waited = loop {
        match poll.step(false) {
            PollStep::Retry { after_ms } => {
                assert_eq!(after_ms, 100);
                retries += 1;
            }
            PollStep::TimedOut { waited_ms } => break waited_ms,
            PollStep::Found => unreachable!(),
        }
    };

    assert_eq!(retries, 20);
    assert_eq!(waited, 2000);
    assert_eq!(
        poll.timeout_error("ground"),
        EngineError::AnchorTimeout {
            anchor: "ground".into(),
            waited_ms: 2000
        }
    );
}

#[test]
fn anchor_found_late_stops_polling() {
    let mut poll = AnchorPoll::new(2000, 100);
    for _ in 0..5 {
        assert!(matches!(poll.step(false), PollStep::Retry { .. }));
    }
    assert_eq!(poll.step(true), PollStep::Found);
    assert_eq!(poll.elapsed_ms(), 500);
}
