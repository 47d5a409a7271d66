//! Integration tests: edit session (mb-editor ↔ mb-core).
//!
//! Drives an `EditSession` with a fake renderer through edits, debounced
//! renders, render failures and drag overrides.

use mb_core::config::BoardConfig;
use mb_core::mutate::AddElement;
use mb_core::{Point, Size, Vec2};
use mb_editor::input::InputEvent;
use mb_editor::session::{BlockRenderer, EditSession, RenderStatus};
use pretty_assertions::assert_eq;

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Renders every block to an empty SVG whose width tracks the source
/// length; fails on any block containing `BROKEN`.
#[derive(Default)]
struct FakeRenderer {
    calls: usize,
}

impl BlockRenderer for FakeRenderer {
    fn render(&mut self, index: usize, source: &str) -> Result<String, String> {
        self.calls += 1;
        if source.contains("BROKEN") {
            return Err(format!("Parse error in block {index}"));
        }
        Ok(format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {} {}"></svg>"#,
            100 + source.len(),
            60 + index * 10
        ))
    }
}

fn rendered_session() -> (EditSession, FakeRenderer) {
    init_logs();
    let mut session = EditSession::new(include_str!("fixtures/board.mmd"), BoardConfig::default());
    let mut renderer = FakeRenderer::default();
    let status = session.render_with(&mut renderer, 0.0);
    assert_eq!(status, Some(RenderStatus::Rendered { blocks: 3 }));
    (session, renderer)
}

fn click_add(block_index: usize, clicked: &'static str, target: &'static str) -> AddElement<'static> {
    AddElement {
        block_index,
        clicked: Some(clicked),
        target_name: target,
        connector: "-->",
        ..Default::default()
    }
}

// ─── Rendering ──────────────────────────────────────────────────────────

#[test]
fn first_render_is_immediate() {
    let (session, renderer) = rendered_session();
    assert_eq!(renderer.calls, 3);
    assert_eq!(session.svgs().len(), 3);
    assert_eq!(session.viewport().block_count(), 3);
    assert!(session.last_error().is_none());
}

#[test]
fn edits_render_after_quiet_period() {
    let (mut session, mut renderer) = rendered_session();
    session.set_text("graph TD\n  A --> B", 1000.0);
    assert_eq!(session.render_with(&mut renderer, 1100.0), None);
    session.set_text("graph TD\n  A --> C", 1200.0);
    assert_eq!(session.render_with(&mut renderer, 1300.0), None);
    assert_eq!(
        session.render_with(&mut renderer, 1500.0),
        Some(RenderStatus::Rendered { blocks: 1 })
    );
    assert_eq!(session.render_with(&mut renderer, 9000.0), None);
}

#[test]
fn results_for_superseded_text_are_dropped() {
    let (mut session, _) = rendered_session();
    session.set_text("pie\n  \"a\": 1", 0.0);
    let request = session.due_render(300.0).unwrap();
    assert_eq!(request.sources, vec!["pie\n  \"a\": 1".to_string()]);

    session.set_text("pie\n  \"b\": 2", 310.0);
    let status = session.complete_render(request.generation, vec![Ok("<svg/>".to_string())]);
    assert_eq!(status, RenderStatus::Stale);
    assert_eq!(session.svgs().len(), 3);
}

#[test]
fn failed_render_keeps_visuals_and_text() {
    let (mut session, mut renderer) = rendered_session();
    let before = session.svgs().to_vec();
    let broken = format!("{}\n\ngraph TD\n  BROKEN", session.text());
    session.set_text(&broken, 0.0);

    match session.render_with(&mut renderer, 300.0) {
        Some(RenderStatus::Failed(err)) => assert_eq!(err.index, 3),
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(session.svgs(), before.as_slice());
    assert_eq!(session.text(), broken);
    assert!(session.last_error().is_some());

    session.undo(400.0);
    assert_eq!(
        session.render_with(&mut renderer, 700.0),
        Some(RenderStatus::Rendered { blocks: 3 })
    );
    assert!(session.last_error().is_none());
}

#[test]
fn empty_buffer_clears_visuals() {
    let (mut session, mut renderer) = rendered_session();
    session.clear(0.0);
    assert_eq!(session.render_with(&mut renderer, 300.0), None);
    assert!(session.svgs().is_empty());
    assert_eq!(session.viewport().block_count(), 0);
    assert!(session.blocks().is_empty());
}

// ─── Mutations ──────────────────────────────────────────────────────────

#[test]
fn add_element_is_undoable() {
    let (mut session, _) = rendered_session();
    let original = session.text().to_string();
    session.add_element(&click_add(0, "Pay", "Refund"), 0.0).unwrap();
    assert!(session.text().contains("    Pay --> Refund\n"));
    assert!(session.undo(10.0));
    assert_eq!(session.text(), original);
}

#[test]
fn failed_mutation_keeps_buffer_and_history() {
    let (mut session, _) = rendered_session();
    let original = session.text().to_string();
    assert!(session.add_element(&click_add(9, "Pay", "X"), 0.0).is_err());
    assert!(session.relabel_edge("Pay", "Nowhere", "x", 0.0).is_err());
    assert_eq!(session.text(), original);
    assert!(!session.can_undo());
}

#[test]
fn relabel_goes_through_history() {
    let (mut session, _) = rendered_session();
    session.relabel_edge("Pay", "Cart", "retry", 0.0).unwrap();
    assert!(session.text().contains("Pay -->|retry| Cart"));
    assert!(session.can_undo());
}

#[test]
fn dirty_tracking_follows_saved_text() {
    let (mut session, _) = rendered_session();
    assert!(!session.is_dirty());
    session.add_element(&click_add(0, "Cart", "Wishlist"), 0.0).unwrap();
    assert!(session.is_dirty());
    session.mark_saved();
    assert!(!session.is_dirty());
    session.undo(5.0);
    assert!(session.is_dirty());
}

#[test]
fn markdown_export_has_one_fence_per_block() {
    let (session, _) = rendered_session();
    let md = session.export_markdown();
    assert_eq!(md.matches("```mermaid").count(), 3);
    assert!(md.starts_with("```mermaid\ngraph LR\n"));
}

// ─── Layout ─────────────────────────────────────────────────────────────

fn drag(session: &mut EditSession, block: usize, by: (f64, f64)) {
    session.handle_input(&InputEvent::from_pointer_down(10.0, 10.0, 0), Some(block));
    session.handle_input(
        &InputEvent::PointerMove {
            x: 10.0 + by.0,
            y: 10.0 + by.1,
        },
        Some(block),
    );
    session.handle_input(
        &InputEvent::PointerUp {
            x: 10.0 + by.0,
            y: 10.0 + by.1,
        },
        None,
    );
}

#[test]
fn drag_override_survives_unrelated_edit() {
    let (mut session, mut renderer) = rendered_session();
    let start = session.viewport().position(1);
    drag(&mut session, 1, (50.0, 20.0));
    let dragged = session.viewport().position(1);
    assert_eq!(dragged, start + Vec2::new(50.0, 20.0));

    session.add_element(&click_add(0, "Cart", "Coupon"), 0.0).unwrap();
    session.render_with(&mut renderer, 300.0);
    assert_eq!(session.viewport().position(1), dragged);
    assert!(session.viewport().is_overridden(1));
}

#[test]
fn changing_block_count_resets_overrides() {
    let (mut session, mut renderer) = rendered_session();
    drag(&mut session, 2, (-30.0, 40.0));
    let grown = format!("{}\n\ngraph TD\n  X --> Y", session.text());
    session.set_text(&grown, 0.0);
    session.render_with(&mut renderer, 300.0);
    assert_eq!(session.viewport().block_count(), 4);
    assert!(!session.viewport().is_overridden(2));
}

#[test]
fn realign_fits_and_discards_overrides() {
    let (mut session, _) = rendered_session();
    drag(&mut session, 0, (400.0, 400.0));
    session.realign(Some(Size::new(600.0, 400.0)));
    assert!(!session.viewport().is_overridden(0));
    assert_eq!(session.viewport().position(0), Point::ZERO);
    let t = session.viewport().transform();
    assert!(t.scale <= 1.0);
    assert!(t.offset.x >= 0.0 && t.offset.y >= 0.0);
}

#[test]
fn column_count_is_clamped_and_repacks() {
    let (mut session, _) = rendered_session();
    assert_eq!(session.set_items_per_row(0), 1);
    let positions = session.viewport().positions();
    assert!(positions.iter().all(|p| p.x == 0.0));
    assert_eq!(session.set_items_per_row(99), 6);
    assert!(session.viewport().positions().iter().all(|p| p.y == 0.0));
}
