//! The edit session: one buffer and everything derived from it.
//!
//! Text flows one way. An edit (typing, a menu command, undo) replaces the
//! buffer, records a history snapshot and arms the render debounce. When
//! the debounce fires the host renders every block and hands the SVGs back;
//! only then do block sizes, the grid and the viewport change. A failed
//! render leaves the previous visuals in place and never touches the
//! buffer.

use crate::context::{ContextTarget, PickedElement};
use crate::debounce::RenderDebounce;
use crate::history::HistoryLog;
use crate::input::InputEvent;
use crate::viewport::ViewportController;
use mb_core::config::BoardConfig;
use mb_core::error::{MutateError, RenderError};
use mb_core::measure::svg_size;
use mb_core::mutate::{self, AddElement};
use mb_core::segment::{Block, SegmentMode, segment};
use mb_core::{BlockKey, Size};

/// Turns one block's source into SVG markup.
pub trait BlockRenderer {
    fn render(&mut self, index: usize, source: &str) -> Result<String, String>;
}

/// Blocks to render for one debounce generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    pub generation: u64,
    /// Trimmed block sources, in block order.
    pub sources: Vec<String>,
}

/// Outcome of handing render results back to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderStatus {
    /// A newer edit arrived while rendering; the results were dropped.
    Stale,
    /// All blocks rendered and the layout was updated.
    Rendered { blocks: usize },
    /// A block failed; the previous visuals stay on screen.
    Failed(RenderError),
}

pub struct EditSession {
    config: BoardConfig,
    buffer: String,
    history: HistoryLog,
    debounce: RenderDebounce,
    viewport: ViewportController,
    /// Keys of the blocks in the render currently in flight.
    in_flight: Option<(u64, Vec<BlockKey>)>,
    svgs: Vec<String>,
    last_error: Option<RenderError>,
    saved_text: String,
}

impl EditSession {
    /// Open a session on `text`. The first render is due immediately.
    pub fn new(text: impl Into<String>, config: BoardConfig) -> Self {
        let config = config.sanitized();
        let buffer = text.into();
        let mut debounce = RenderDebounce::new(config.render_debounce_ms);
        debounce.force();
        Self {
            history: HistoryLog::new(buffer.clone(), config.history_depth),
            viewport: ViewportController::new(&config),
            saved_text: buffer.clone(),
            buffer,
            debounce,
            in_flight: None,
            svgs: Vec::new(),
            last_error: None,
            config,
        }
    }

    // ─── Text ────────────────────────────────────────────────────────────

    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// Replace the buffer with user-typed text.
    ///
    /// Returns `false` if the text is unchanged.
    pub fn set_text(&mut self, text: &str, now_ms: f64) -> bool {
        if text == self.buffer {
            return false;
        }
        self.buffer = text.to_string();
        self.history.record(text);
        self.debounce.schedule(now_ms);
        true
    }

    /// Replace the buffer with a loaded document and treat it as saved.
    pub fn load_text(&mut self, text: &str) {
        self.buffer = text.to_string();
        self.history.record(text);
        self.saved_text = text.to_string();
        self.debounce.force();
    }

    /// Empty the buffer. Undoable.
    pub fn clear(&mut self, now_ms: f64) -> bool {
        self.set_text("", now_ms)
    }

    /// Connect a new node inside a block; see [`mutate::add_element`].
    ///
    /// On error the buffer is unchanged.
    pub fn add_element(&mut self, request: &AddElement<'_>, now_ms: f64) -> Result<(), MutateError> {
        let patched = mutate::add_element(&self.buffer, request, self.config.segment_mode)
            .inspect_err(|err| log::debug!("add_element skipped: {err}"))?;
        self.set_text(&patched, now_ms);
        Ok(())
    }

    /// Set an edge label; see [`mutate::relabel_edge`].
    pub fn relabel_edge(
        &mut self,
        source: &str,
        target: &str,
        label: &str,
        now_ms: f64,
    ) -> Result<(), MutateError> {
        let patched = mutate::relabel_edge(&self.buffer, source, target, label)
            .inspect_err(|err| log::debug!("relabel skipped: {err}"))?;
        self.set_text(&patched, now_ms);
        Ok(())
    }

    pub fn undo(&mut self, now_ms: f64) -> bool {
        let Some(text) = self.history.undo() else {
            return false;
        };
        self.buffer = text.to_string();
        self.debounce.schedule(now_ms);
        true
    }

    pub fn redo(&mut self, now_ms: f64) -> bool {
        let Some(text) = self.history.redo() else {
            return false;
        };
        self.buffer = text.to_string();
        self.debounce.schedule(now_ms);
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn blocks(&self) -> Vec<Block<'_>> {
        segment(&self.buffer, self.config.segment_mode)
    }

    pub fn export_markdown(&self) -> String {
        mutate::to_markdown(&self.buffer, self.config.segment_mode)
    }

    pub fn portable_blocks(&self) -> Vec<String> {
        mutate::to_portable_blocks(&self.buffer, self.config.segment_mode)
    }

    /// Resolve a right-click on a rendered block.
    pub fn context_target(
        &self,
        diagram_index: usize,
        picked: PickedElement<'_>,
    ) -> Option<ContextTarget> {
        ContextTarget::resolve(&self.blocks(), diagram_index, picked)
    }

    // ─── Dirty tracking ──────────────────────────────────────────────────

    /// Whether the buffer differs from the last saved text.
    pub fn is_dirty(&self) -> bool {
        self.buffer != self.saved_text
    }

    pub fn mark_saved(&mut self) {
        self.saved_text = self.buffer.clone();
    }

    pub fn saved_text(&self) -> &str {
        &self.saved_text
    }

    /// Set the text the buffer is compared against.
    pub fn set_saved_text(&mut self, text: impl Into<String>) {
        self.saved_text = text.into();
    }

    // ─── Rendering ───────────────────────────────────────────────────────

    /// The render to run now, if the quiet period after the last edit has
    /// elapsed.
    ///
    /// A buffer without blocks is not sent to the renderer: the visuals and
    /// any error are cleared right away and `None` is returned.
    pub fn due_render(&mut self, now_ms: f64) -> Option<RenderRequest> {
        let generation = self.debounce.take_due(now_ms)?;
        let blocks = self.blocks();
        if blocks.is_empty() {
            log::debug!("render: buffer has no blocks");
            self.svgs.clear();
            self.last_error = None;
            self.in_flight = None;
            self.viewport.clear_blocks();
            return None;
        }
        let sources = blocks.iter().map(|b| b.source().to_string()).collect();
        self.in_flight = Some((generation, BlockKey::for_blocks(&blocks)));
        Some(RenderRequest {
            generation,
            sources,
        })
    }

    /// Accept the renderer's output for `generation`: one SVG or error
    /// message per requested block.
    pub fn complete_render(
        &mut self,
        generation: u64,
        results: Vec<Result<String, String>>,
    ) -> RenderStatus {
        let keys = match self.in_flight.take() {
            Some((g, keys)) if g == generation && self.debounce.is_current(generation) => keys,
            other => {
                self.in_flight = other;
                log::debug!("render: dropping stale generation {generation}");
                return RenderStatus::Stale;
            }
        };

        let mut svgs = Vec::with_capacity(keys.len());
        for (index, result) in results.into_iter().enumerate() {
            match result {
                Ok(svg) => svgs.push(svg),
                Err(message) => return self.fail(RenderError::new(index, message)),
            }
        }
        if svgs.len() != keys.len() {
            return self.fail(RenderError::new(
                svgs.len().min(keys.len()),
                format!(
                    "renderer returned {} results for {} blocks",
                    svgs.len(),
                    keys.len()
                ),
            ));
        }

        let sizes: Vec<Size> = svgs
            .iter()
            .map(|svg| svg_size(svg, self.config.card_padding, self.config.fallback_size))
            .collect();
        self.viewport.update_blocks(keys, sizes);
        self.svgs = svgs;
        self.last_error = None;
        RenderStatus::Rendered {
            blocks: self.svgs.len(),
        }
    }

    /// Poll the debounce and, if a render is due, run it synchronously.
    pub fn render_with(
        &mut self,
        renderer: &mut impl BlockRenderer,
        now_ms: f64,
    ) -> Option<RenderStatus> {
        let request = self.due_render(now_ms)?;
        let mut results = Vec::with_capacity(request.sources.len());
        for (index, source) in request.sources.iter().enumerate() {
            let result = renderer.render(index, source);
            let failed = result.is_err();
            results.push(result);
            if failed {
                break;
            }
        }
        Some(self.complete_render(request.generation, results))
    }

    /// Milliseconds until the next render is due, for host timers.
    pub fn render_delay(&self, now_ms: f64) -> Option<f64> {
        self.debounce.remaining(now_ms)
    }

    fn fail(&mut self, error: RenderError) -> RenderStatus {
        log::warn!("render failed: {error}");
        self.last_error = Some(error.clone());
        RenderStatus::Failed(error)
    }

    /// SVGs of the last successful render.
    pub fn svgs(&self) -> &[String] {
        &self.svgs
    }

    pub fn last_error(&self) -> Option<&RenderError> {
        self.last_error.as_ref()
    }

    // ─── Canvas ──────────────────────────────────────────────────────────

    pub fn handle_input(&mut self, event: &InputEvent, hit_block: Option<usize>) -> bool {
        self.viewport.handle(event, hit_block)
    }

    /// Repack the grid, dropping manual placements; optionally fit to view.
    pub fn realign(&mut self, viewport: Option<Size>) {
        self.viewport.realign(viewport);
    }

    pub fn set_items_per_row(&mut self, n: usize) -> usize {
        let n = self.viewport.set_items_per_row(n);
        self.config.items_per_row = n;
        n
    }

    /// Switch keyword detection; re-renders.
    pub fn set_segment_mode(&mut self, mode: SegmentMode) {
        if self.config.segment_mode != mode {
            self.config.segment_mode = mode;
            self.debounce.force();
        }
    }

    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut ViewportController {
        &mut self.viewport
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }
}
