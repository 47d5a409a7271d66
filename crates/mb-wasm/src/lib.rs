//! WASM bridge for Mermaid Board: exposes the edit session to the browser.
//!
//! Compiled via `wasm-pack build --target web`. The page owns mermaid.js and
//! the DOM; this module owns the buffer, history, layout and storage. Rich
//! results cross the boundary as JSON strings.

mod storage;

use mb_core::assist::{AssistRequest, clean_code};
use mb_core::config::Settings;
use mb_core::mutate::AddElement;
use mb_core::templates::{DEFAULT_SOURCE, TEMPLATES, template};
use mb_core::{Point, Size};
use mb_editor::context::PickedElement;
use mb_editor::input::InputEvent;
use mb_editor::session::{EditSession, RenderStatus};
use mb_editor::store::DiagramLibrary;
use serde::{Deserialize, Serialize};
use serde_json::json;
use storage::LocalStore;
use wasm_bindgen::prelude::*;

/// The browser-facing board controller.
///
/// Holds the edit session and the diagram library. Every UI action goes
/// through this struct.
#[wasm_bindgen]
pub struct MermaidBoard {
    session: EditSession,
    library: DiagramLibrary<LocalStore>,
    settings: Settings,
}

#[wasm_bindgen]
impl MermaidBoard {
    /// Restore the last workspace and settings from `localStorage`.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        console_error_panic_hook_setup();

        let library = DiagramLibrary::open(LocalStore::open());
        let settings = library.settings();
        let text = library
            .workspace()
            .unwrap_or_else(|| DEFAULT_SOURCE.to_string());
        let mut session = EditSession::new(text.as_str(), settings.board.clone());
        session.set_saved_text(library.baseline(&text));

        Self {
            session,
            library,
            settings,
        }
    }

    // ─── Text ────────────────────────────────────────────────────────────

    pub fn get_text(&self) -> String {
        self.session.text().to_string()
    }

    /// Replace the buffer with typed text. Returns `true` if it changed.
    pub fn set_text(&mut self, text: &str) -> bool {
        let changed = self.session.set_text(text, now());
        self.persist_workspace(changed)
    }

    pub fn clear(&mut self) -> bool {
        let changed = self.session.clear(now());
        self.persist_workspace(changed)
    }

    pub fn undo(&mut self) -> bool {
        let changed = self.session.undo(now());
        self.persist_workspace(changed)
    }

    pub fn redo(&mut self) -> bool {
        let changed = self.session.redo(now());
        self.persist_workspace(changed)
    }

    pub fn can_undo(&self) -> bool {
        self.session.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.session.can_redo()
    }

    /// Connect a new node from the context menu. Returns `false` (buffer
    /// untouched) when the request cannot be applied.
    pub fn add_element(
        &mut self,
        block_index: usize,
        clicked: Option<String>,
        typed_source: Option<String>,
        target_name: &str,
        connector: &str,
        edge_label: Option<String>,
    ) -> bool {
        let request = AddElement {
            block_index,
            clicked: clicked.as_deref(),
            typed_source: typed_source.as_deref(),
            target_name,
            connector,
            edge_label: edge_label.as_deref(),
        };
        let changed = self.session.add_element(&request, now()).is_ok();
        self.persist_workspace(changed)
    }

    pub fn relabel_edge(&mut self, source: &str, target: &str, label: &str) -> bool {
        let changed = self.session.relabel_edge(source, target, label, now()).is_ok();
        self.persist_workspace(changed)
    }

    /// Blocks as JSON: `[{"index":0,"kind":"graph","header":"graph LR"}]`.
    pub fn blocks_json(&self) -> String {
        let blocks: Vec<_> = self
            .session
            .blocks()
            .iter()
            .map(|b| json!({ "index": b.index, "kind": b.kind, "header": b.header() }))
            .collect();
        serde_json::to_string(&blocks).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn export_markdown(&self) -> String {
        self.session.export_markdown()
    }

    // ─── Rendering ───────────────────────────────────────────────────────

    /// Poll the render debounce.
    ///
    /// Returns `{"due":true,"generation":n,"sources":[...]}` when the page
    /// should render now, otherwise `{"due":false,"delayMs":n|null}`.
    pub fn poll_render(&mut self) -> String {
        let now = now();
        match self.session.due_render(now) {
            Some(request) => json!({
                "due": true,
                "generation": request.generation,
                "sources": request.sources,
            }),
            None => json!({ "due": false, "delayMs": self.session.render_delay(now) }),
        }
        .to_string()
    }

    /// Hand back mermaid.js output for `generation`.
    ///
    /// `generation` is the number from [`poll_render`](Self::poll_render);
    /// `results_json` is an array with one `{"svg":"..."}` or
    /// `{"error":"..."}` per requested block.
    pub fn complete_render(&mut self, generation: f64, results_json: &str) -> String {
        let results = match parse_render_results(results_json) {
            Ok(results) => results,
            Err(err) => {
                return json!({ "status": "failed", "index": 0, "message": err.to_string() })
                    .to_string();
            }
        };
        status_json(&self.session.complete_render(generation as u64, results))
    }

    /// The last render error message, or an empty string.
    pub fn last_error(&self) -> String {
        self.session
            .last_error()
            .map(|e| e.message.clone())
            .unwrap_or_default()
    }

    // ─── Canvas ──────────────────────────────────────────────────────────

    /// `hit_block` is the index of the drag handle under the pointer, or -1.
    pub fn pointer_down(&mut self, x: f64, y: f64, button: i16, hit_block: i32) -> bool {
        let hit = usize::try_from(hit_block).ok();
        self.session
            .handle_input(&InputEvent::from_pointer_down(x, y, button), hit)
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        self.session
            .handle_input(&InputEvent::PointerMove { x, y }, None)
    }

    pub fn pointer_up(&mut self, x: f64, y: f64) -> bool {
        self.session.handle_input(&InputEvent::PointerUp { x, y }, None)
    }

    pub fn pointer_leave(&mut self) -> bool {
        self.session.handle_input(&InputEvent::PointerLeave, None)
    }

    pub fn wheel(&mut self, delta_y: f64) -> bool {
        self.session.handle_input(&InputEvent::Wheel { delta_y }, None)
    }

    pub fn zoom_in(&mut self) -> bool {
        self.session.viewport_mut().zoom_in()
    }

    pub fn zoom_out(&mut self) -> bool {
        self.session.viewport_mut().zoom_out()
    }

    /// Repack the grid; with `fit`, also fit it into a `width` x `height`
    /// viewport.
    pub fn realign(&mut self, fit: bool, width: f64, height: f64) {
        self.session
            .realign(fit.then(|| Size::new(width, height)));
    }

    /// Returns the column count actually applied.
    pub fn set_items_per_row(&mut self, n: usize) -> usize {
        let applied = self.session.set_items_per_row(n);
        self.settings.board.items_per_row = applied;
        self.persist_settings();
        applied
    }

    /// Block positions and the canvas transform as JSON.
    pub fn layout_json(&self) -> String {
        let viewport = self.session.viewport();
        let transform = viewport.transform();
        let layout = LayoutView {
            positions: viewport.positions(),
            scale: transform.scale,
            offset_x: transform.offset.x,
            offset_y: transform.offset.y,
        };
        serde_json::to_string(&layout).unwrap_or_else(|_| "{}".to_string())
    }

    /// SVGs of the last successful render as a JSON array.
    pub fn svgs_json(&self) -> String {
        serde_json::to_string(self.session.svgs()).unwrap_or_else(|_| "[]".to_string())
    }

    /// Resolve a right-click. `kind` is `node`, `edge` or `background`;
    /// `element_id` is the node id or edge group id, `label` its text.
    ///
    /// Returns the menu target as JSON, or `null` if no menu should open.
    pub fn context_target(
        &self,
        diagram_index: usize,
        kind: &str,
        element_id: Option<String>,
        label: Option<String>,
    ) -> String {
        let picked = match kind {
            "node" => PickedElement::Node {
                element_id: element_id.as_deref().unwrap_or_default(),
                label: label.as_deref(),
            },
            "edge" => PickedElement::Edge {
                group_id: element_id.as_deref(),
                label: label.as_deref().unwrap_or_default(),
            },
            _ => PickedElement::Background,
        };
        let Some(target) = self.session.context_target(diagram_index, picked) else {
            return "null".to_string();
        };
        let edge = target.edge.as_ref().map(|e| {
            json!({ "source": e.source, "target": e.target, "label": e.label })
        });
        let subject = target.explain_subject();
        json!({
            "diagramIndex": target.diagram_index,
            "nodeId": target.node,
            "edge": edge,
            "explain": subject.map(|(s, is_edge)| json!({ "subject": s, "isEdge": is_edge })),
        })
        .to_string()
    }

    // ─── Files ───────────────────────────────────────────────────────────

    pub fn is_dirty(&self) -> bool {
        self.session.is_dirty()
    }

    /// Name of the open file, or an empty string for an unsaved document.
    pub fn current_file_name(&self) -> String {
        self.library.current_name().unwrap_or_default().to_string()
    }

    /// Saved diagrams, newest first, as JSON.
    pub fn files_json(&self) -> String {
        serde_json::to_string(self.library.files()).unwrap_or_else(|_| "[]".to_string())
    }

    /// Save the buffer. With no file open a `name` is required; the result
    /// is `{"ok":false,"needsName":true}` when it is missing.
    pub fn save_file(&mut self, name: Option<String>) -> String {
        let code = self.session.text().to_string();
        let result = match self.library.save_current(&code, now()) {
            Ok(true) => Ok(()),
            Ok(false) => match name.as_deref() {
                Some(name) => self.library.save_as(name, &code, now()).map(|_| ()),
                None => return json!({ "ok": false, "needsName": true }).to_string(),
            },
            Err(err) => Err(err),
        };
        match result {
            Ok(()) => {
                self.session.mark_saved();
                json!({ "ok": true }).to_string()
            }
            Err(err) => json!({ "ok": false, "error": err.to_string() }).to_string(),
        }
    }

    pub fn load_file(&mut self, id: &str) -> bool {
        let code = match self.library.load(id) {
            Ok(file) => file.code.clone(),
            Err(err) => {
                log::warn!("load_file: {err}");
                return false;
            }
        };
        self.session.load_text(&code);
        self.persist_workspace(true)
    }

    /// Returns `true` if the deleted file was open; the buffer is then
    /// treated as unsaved.
    pub fn delete_file(&mut self, id: &str) -> bool {
        match self.library.delete(id) {
            Ok(was_current) => {
                if was_current {
                    self.session.set_saved_text("");
                }
                was_current
            }
            Err(err) => {
                log::warn!("delete_file: {err}");
                false
            }
        }
    }

    /// Start a fresh document from the default board.
    pub fn new_diagram(&mut self) {
        if let Err(err) = self.library.close_current() {
            log::warn!("new_diagram: {err}");
        }
        self.session.load_text(DEFAULT_SOURCE);
        self.persist_workspace(true);
    }

    /// Remove every stored key and return to the default board.
    pub fn wipe_storage(&mut self) {
        if let Err(err) = self.library.wipe() {
            log::warn!("wipe_storage: {err}");
        }
        self.settings = Settings::default();
        self.session = EditSession::new(DEFAULT_SOURCE, self.settings.board.clone());
    }

    // ─── Templates & settings ────────────────────────────────────────────

    pub fn templates_json(&self) -> String {
        serde_json::to_string(TEMPLATES).unwrap_or_else(|_| "[]".to_string())
    }

    /// Replace the buffer with a template's code. Undoable.
    pub fn apply_template(&mut self, id: &str) -> bool {
        let Some(template) = template(id) else {
            return false;
        };
        let changed = self.session.set_text(template.code, now());
        self.persist_workspace(changed)
    }

    pub fn settings_json(&self) -> String {
        serde_json::to_string(&self.settings).unwrap_or_else(|_| "{}".to_string())
    }

    /// Apply settings JSON (partial objects fill in defaults). Board
    /// changes restart the session over the current text; undo history
    /// does not carry over.
    pub fn set_settings_json(&mut self, settings_json: &str) -> bool {
        let settings: Settings = match serde_json::from_str(settings_json) {
            Ok(settings) => settings,
            Err(err) => {
                log::warn!("set_settings_json: {err}");
                return false;
            }
        };
        let mut settings = settings;
        settings.board = settings.board.sanitized();
        if settings.board != self.settings.board {
            let saved = self.session.saved_text().to_string();
            self.session = EditSession::new(self.session.text(), settings.board.clone());
            self.session.set_saved_text(saved);
        }
        self.settings = settings;
        self.persist_settings();
        true
    }

    pub fn is_ai_configured(&self) -> bool {
        self.settings.ai.is_configured()
    }

    // ─── Assistant prompts ───────────────────────────────────────────────

    /// Prompt for drafting a diagram, as `{"prompt":...,"system":null}`.
    pub fn generate_prompt(&self, description: &str) -> String {
        self.prompt_json(&AssistRequest::Generate { description })
    }

    /// Prompt for repairing the buffer against the last render error.
    pub fn fix_prompt(&self) -> String {
        let error = self.last_error();
        self.prompt_json(&AssistRequest::Fix {
            code: self.session.text(),
            error: &error,
        })
    }

    pub fn explain_prompt(&self, subject: &str, is_edge: bool) -> String {
        self.prompt_json(&AssistRequest::Explain {
            code: self.session.text(),
            element: subject,
            is_edge,
        })
    }

    /// Put assistant-produced code into the buffer. Undoable.
    pub fn apply_generated(&mut self, reply: &str) -> bool {
        let code = clean_code(reply);
        if code.is_empty() {
            return false;
        }
        let changed = self.session.set_text(&code, now());
        self.persist_workspace(changed)
    }
}

impl Default for MermaidBoard {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Private helpers (not exposed to JS) ─────────────────────────────────

impl MermaidBoard {
    fn persist_workspace(&mut self, changed: bool) -> bool {
        if changed {
            if let Err(err) = self.library.set_workspace(self.session.text()) {
                log::warn!("workspace not saved: {err}");
            }
        }
        changed
    }

    fn persist_settings(&mut self) {
        if let Err(err) = self.library.save_settings(&self.settings) {
            log::warn!("settings not saved: {err}");
        }
    }

    fn prompt_json(&self, request: &AssistRequest<'_>) -> String {
        json!({
            "prompt": request.prompt(),
            "system": request.system_instruction(self.settings.language),
            "expectsCode": request.expects_code(),
        })
        .to_string()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LayoutView {
    positions: Vec<Point>,
    scale: f64,
    offset_x: f64,
    offset_y: f64,
}

/// One entry of the page's render result array.
#[derive(Deserialize)]
struct RenderResult {
    svg: Option<String>,
    error: Option<String>,
}

fn parse_render_results(json: &str) -> Result<Vec<Result<String, String>>, serde_json::Error> {
    let raw: Vec<RenderResult> = serde_json::from_str(json)?;
    Ok(raw
        .into_iter()
        .map(|r| match (r.svg, r.error) {
            (_, Some(error)) => Err(error),
            (Some(svg), None) => Ok(svg),
            (None, None) => Err("Syntax Error".to_string()),
        })
        .collect())
}

fn status_json(status: &RenderStatus) -> String {
    match status {
        RenderStatus::Stale => json!({ "status": "stale" }),
        RenderStatus::Rendered { blocks } => json!({ "status": "rendered", "blocks": blocks }),
        RenderStatus::Failed(err) => {
            json!({ "status": "failed", "index": err.index, "message": err.message })
        }
    }
    .to_string()
}

fn now() -> f64 {
    js_sys::Date::now()
}

/// Set up panic hook for better error messages.
fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Mermaid Board WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

// ─── Standalone functions (no board needed) ──────────────────────────────

/// Strip Markdown fences from an assistant reply.
#[wasm_bindgen]
pub fn clean_assistant_code(reply: &str) -> String {
    clean_code(reply)
}

/// Markdown export of arbitrary text, without a board.
#[wasm_bindgen]
pub fn to_markdown(source: &str) -> String {
    mb_core::to_markdown(source, Default::default())
}
