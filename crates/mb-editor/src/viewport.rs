//! Pan, zoom and block dragging over the packed grid.
//!
//! Block positions come from two layers: the grid packer's derived layout
//! and a sparse map of manual overrides keyed by [`BlockKey`]. An override
//! survives edits that keep the block count and its key, and is dropped by
//! an explicit realign or when the number of blocks changes.

use crate::input::{InputEvent, PointerButton};
use mb_core::config::BoardConfig;
use mb_core::layout::{GridLayout, ViewTransform, fallback_position, fit_to_viewport, pack_grid};
use mb_core::{Affine, BlockKey, Point, Size, Vec2};
use std::collections::{HashMap, HashSet};

/// Current pointer gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    #[default]
    Idle,
    PanningCanvas,
    DraggingBlock(usize),
}

pub struct ViewportController {
    config: BoardConfig,
    transform: ViewTransform,
    mode: InteractionMode,
    last_pointer: Point,
    keys: Vec<BlockKey>,
    sizes: Vec<Size>,
    grid: GridLayout,
    overrides: HashMap<BlockKey, Point>,
}

impl ViewportController {
    /// Out-of-range scale bounds in `config` are repaired first.
    pub fn new(config: &BoardConfig) -> Self {
        Self {
            config: config.clone().sanitized(),
            transform: ViewTransform::IDENTITY,
            mode: InteractionMode::Idle,
            last_pointer: Point::ZERO,
            keys: Vec::new(),
            sizes: Vec::new(),
            grid: GridLayout::default(),
            overrides: HashMap::new(),
        }
    }

    /// Replace the rendered block set and repack the grid.
    ///
    /// `keys` and `sizes` are parallel; extra entries on either side are
    /// ignored.
    pub fn update_blocks(&mut self, keys: Vec<BlockKey>, sizes: Vec<Size>) {
        let count = keys.len().min(sizes.len());
        if count != self.keys.len() {
            if !self.overrides.is_empty() {
                log::debug!(
                    "viewport: block count {} -> {count}, dropping {} override(s)",
                    self.keys.len(),
                    self.overrides.len()
                );
            }
            self.overrides.clear();
        } else {
            let live: HashSet<BlockKey> = keys.iter().take(count).copied().collect();
            self.overrides.retain(|key, _| live.contains(key));
        }
        self.keys = keys;
        self.keys.truncate(count);
        self.sizes = sizes;
        self.sizes.truncate(count);
        if matches!(self.mode, InteractionMode::DraggingBlock(i) if i >= count) {
            self.mode = InteractionMode::Idle;
        }
        self.repack();
    }

    /// Forget every block, e.g. when the buffer holds none.
    pub fn clear_blocks(&mut self) {
        self.update_blocks(Vec::new(), Vec::new());
    }

    /// Change the column count and repack. Overrides are kept.
    pub fn set_items_per_row(&mut self, n: usize) -> usize {
        self.config.items_per_row = BoardConfig::clamp_items_per_row(n);
        self.repack();
        self.config.items_per_row
    }

    /// Discard manual overrides and repack; with a viewport, also fit the
    /// content into it.
    pub fn realign(&mut self, viewport: Option<Size>) {
        self.overrides.clear();
        self.repack();
        let Some(viewport) = viewport else {
            return;
        };
        if self.grid.is_empty() {
            return;
        }
        let content = self.grid.content_size();
        let fitted = fit_to_viewport(content, viewport, self.config.fit_margin);
        let scale = self.config.clamp_scale(fitted.scale);
        self.transform = ViewTransform {
            scale,
            offset: Vec2::new(
                (viewport.width - content.width * scale) / 2.0,
                (viewport.height - content.height * scale) / 2.0,
            ),
        };
        log::debug!("viewport: realigned, scale {scale:.3}");
    }

    /// Canvas-space position of block `index`.
    pub fn position(&self, index: usize) -> Point {
        self.keys
            .get(index)
            .and_then(|key| self.overrides.get(key))
            .or_else(|| self.grid.positions.get(index))
            .copied()
            .unwrap_or_else(|| fallback_position(index))
    }

    pub fn positions(&self) -> Vec<Point> {
        (0..self.keys.len()).map(|i| self.position(i)).collect()
    }

    /// Whether block `index` sits at a manual override.
    pub fn is_overridden(&self, index: usize) -> bool {
        self.keys
            .get(index)
            .is_some_and(|key| self.overrides.contains_key(key))
    }

    /// Feed one input event. `hit_block` is the block whose drag handle is
    /// under the pointer, if any.
    ///
    /// Returns whether anything visible changed.
    pub fn handle(&mut self, event: &InputEvent, hit_block: Option<usize>) -> bool {
        match *event {
            InputEvent::PointerDown { x, y, button } => {
                if button != PointerButton::Primary {
                    return false;
                }
                self.last_pointer = Point::new(x, y);
                self.mode = match hit_block {
                    Some(i) if i < self.keys.len() => InteractionMode::DraggingBlock(i),
                    _ => InteractionMode::PanningCanvas,
                };
                false
            }
            InputEvent::PointerMove { x, y } => {
                let pointer = Point::new(x, y);
                let delta = pointer - self.last_pointer;
                self.last_pointer = pointer;
                match self.mode {
                    InteractionMode::Idle => false,
                    InteractionMode::PanningCanvas => {
                        self.transform.offset += delta;
                        true
                    }
                    InteractionMode::DraggingBlock(i) => {
                        let Some(&key) = self.keys.get(i) else {
                            return false;
                        };
                        let moved = self.position(i) + delta / self.transform.scale;
                        log::trace!("viewport: block {key} -> ({:.1}, {:.1})", moved.x, moved.y);
                        self.overrides.insert(key, moved);
                        true
                    }
                }
            }
            InputEvent::PointerUp { .. } | InputEvent::PointerLeave => {
                self.mode = InteractionMode::Idle;
                false
            }
            InputEvent::Wheel { delta_y } => self.wheel(delta_y),
        }
    }

    /// Additive wheel zoom about the canvas origin.
    pub fn wheel(&mut self, delta_y: f64) -> bool {
        self.set_scale(self.transform.scale - delta_y * self.config.wheel_sensitivity)
    }

    pub fn zoom_in(&mut self) -> bool {
        self.set_scale(self.transform.scale + self.config.button_step)
    }

    /// Step down, stopping at `button_min_scale`. A scale already below that
    /// floor (reached with the wheel) is left alone.
    pub fn zoom_out(&mut self) -> bool {
        let floor = self.config.button_min_scale;
        if self.transform.scale <= floor {
            return false;
        }
        self.set_scale((self.transform.scale - self.config.button_step).max(floor))
    }

    fn set_scale(&mut self, scale: f64) -> bool {
        let scale = self.config.clamp_scale(scale);
        let changed = scale != self.transform.scale;
        self.transform.scale = scale;
        changed
    }

    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    pub fn affine(&self) -> Affine {
        self.transform.to_affine()
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn grid(&self) -> &GridLayout {
        &self.grid
    }

    pub fn items_per_row(&self) -> usize {
        self.config.items_per_row
    }

    pub fn block_count(&self) -> usize {
        self.keys.len()
    }

    fn repack(&mut self) {
        self.grid = pack_grid(&self.sizes, self.config.items_per_row);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(headers: &[&str]) -> Vec<BlockKey> {
        headers.iter().map(|h| BlockKey::new(h, 0)).collect()
    }

    fn controller(n: usize) -> ViewportController {
        let mut vc = ViewportController::new(&BoardConfig::default());
        let headers: Vec<String> = (0..n).map(|i| format!("graph V{i}")).collect();
        let refs: Vec<&str> = headers.iter().map(String::as_str).collect();
        vc.update_blocks(keys(&refs), vec![Size::new(100.0, 100.0); n]);
        vc
    }

    #[test]
    fn primary_down_on_background_pans() {
        let mut vc = controller(2);
        vc.handle(&InputEvent::from_pointer_down(10.0, 10.0, 0), None);
        assert_eq!(vc.mode(), InteractionMode::PanningCanvas);
        assert!(vc.handle(&InputEvent::PointerMove { x: 25.0, y: 5.0 }, None));
        assert_eq!(vc.transform().offset, Vec2::new(15.0, -5.0));
        vc.handle(&InputEvent::PointerLeave, None);
        assert_eq!(vc.mode(), InteractionMode::Idle);
    }

    #[test]
    fn secondary_button_is_ignored() {
        let mut vc = controller(1);
        vc.handle(&InputEvent::from_pointer_down(0.0, 0.0, 2), Some(0));
        assert_eq!(vc.mode(), InteractionMode::Idle);
    }

    #[test]
    fn idle_moves_change_nothing() {
        let mut vc = controller(1);
        assert!(!vc.handle(&InputEvent::PointerMove { x: 50.0, y: 50.0 }, None));
        assert_eq!(vc.transform(), ViewTransform::IDENTITY);
    }

    #[test]
    fn wheel_is_additive_and_clamped() {
        let mut vc = controller(1);
        vc.wheel(100.0);
        assert!((vc.transform().scale - 0.9).abs() < 1e-9);
        vc.wheel(-100_000.0);
        assert_eq!(vc.transform().scale, 5.0);
        vc.wheel(100_000.0);
        assert_eq!(vc.transform().scale, 0.05);
    }

    #[test]
    fn inverted_scale_bounds_are_repaired() {
        let config = BoardConfig {
            min_scale: 6.0,
            ..Default::default()
        };
        let mut vc = ViewportController::new(&config);
        assert!(vc.wheel(1.0));
        assert!((vc.transform().scale - 0.999).abs() < 1e-9);
        vc.wheel(100_000.0);
        assert_eq!(vc.transform().scale, 0.05);
    }

    #[test]
    fn zoom_out_button_floors_at_button_min() {
        let mut vc = controller(1);
        for _ in 0..20 {
            vc.zoom_out();
        }
        assert!((vc.transform().scale - 0.1).abs() < 1e-9);
        vc.wheel(1000.0);
        assert_eq!(vc.transform().scale, 0.05);
        assert!(!vc.zoom_out());
        assert_eq!(vc.transform().scale, 0.05);
    }

    #[test]
    fn zoom_in_caps_at_max() {
        let mut vc = controller(1);
        for _ in 0..100 {
            vc.zoom_in();
        }
        assert_eq!(vc.transform().scale, 5.0);
    }

    #[test]
    fn positions_fall_back_before_layout() {
        let vc = ViewportController::new(&BoardConfig::default());
        assert_eq!(vc.position(1), Point::new(0.0, 300.0));
        assert!(vc.positions().is_empty());
    }
}
