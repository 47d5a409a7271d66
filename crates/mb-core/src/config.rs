//! Session-wide settings.
//!
//! Settings are plain values passed into the session. Nothing here reads or
//! writes storage; persisting them is the caller's job (see the editor's
//! diagram library).

use crate::segment::SegmentMode;
use kurbo::Size;
use serde::{Deserialize, Serialize};

/// Upper bound of the column-count selector.
pub const MAX_ITEMS_PER_ROW: usize = 6;

/// Canvas and editing behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BoardConfig {
    /// Blocks per grid row, `1..=MAX_ITEMS_PER_ROW`.
    pub items_per_row: usize,
    pub segment_mode: SegmentMode,
    /// Added to each rendered diagram's width and height.
    pub card_padding: f64,
    /// Space kept free around the content by fit-to-view.
    pub fit_margin: f64,
    pub min_scale: f64,
    pub max_scale: f64,
    /// The zoom-out button stops here rather than at `min_scale`.
    pub button_min_scale: f64,
    pub button_step: f64,
    /// Scale change per wheel delta unit.
    pub wheel_sensitivity: f64,
    pub render_debounce_ms: f64,
    pub history_depth: usize,
    /// Intrinsic size assumed for SVGs that carry none.
    pub fallback_size: Size,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            items_per_row: 3,
            segment_mode: SegmentMode::default(),
            card_padding: 32.0,
            fit_margin: 80.0,
            min_scale: 0.05,
            max_scale: 5.0,
            button_min_scale: 0.1,
            button_step: 0.1,
            wheel_sensitivity: 0.001,
            render_debounce_ms: 300.0,
            history_depth: 200,
            fallback_size: Size::new(300.0, 200.0),
        }
    }
}

impl BoardConfig {
    /// Clamp a requested column count into the supported range.
    pub fn clamp_items_per_row(n: usize) -> usize {
        n.clamp(1, MAX_ITEMS_PER_ROW)
    }

    /// Clamp a scale into `[min_scale, max_scale]`.
    pub fn clamp_scale(&self, scale: f64) -> f64 {
        scale.clamp(self.min_scale, self.max_scale)
    }

    /// Repair out-of-range values, e.g. after loading hand-edited JSON.
    pub fn sanitized(mut self) -> Self {
        let defaults = BoardConfig::default();
        self.items_per_row = Self::clamp_items_per_row(self.items_per_row);
        if !(self.min_scale > 0.0 && self.min_scale <= self.max_scale) {
            self.min_scale = defaults.min_scale;
            self.max_scale = defaults.max_scale;
        }
        self.button_min_scale = self.button_min_scale.clamp(self.min_scale, self.max_scale);
        self.history_depth = self.history_depth.max(1);
        self.render_debounce_ms = self.render_debounce_ms.max(0.0);
        self
    }
}

/// UI language; also selects the assistant's answer language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Language {
    #[default]
    Ko,
    En,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AiProvider {
    #[default]
    Gemini,
    OpenaiCompatible,
}

/// Assistant connection settings.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AiConfig {
    pub provider: AiProvider,
    pub gemini_key: String,
    pub openai_key: String,
    pub openai_endpoint: String,
    pub openai_model: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: AiProvider::Gemini,
            gemini_key: String::new(),
            openai_key: String::new(),
            openai_endpoint: "https://api.openai.com/v1".to_string(),
            openai_model: "gpt-4o".to_string(),
        }
    }
}

impl AiConfig {
    /// Whether the selected provider has an API key.
    pub fn is_configured(&self) -> bool {
        match self.provider {
            AiProvider::Gemini => !self.gemini_key.trim().is_empty(),
            AiProvider::OpenaiCompatible => !self.openai_key.trim().is_empty(),
        }
    }
}

// Keys stay out of logs.
impl std::fmt::Debug for AiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiConfig")
            .field("provider", &self.provider)
            .field("gemini_key", &redact(&self.gemini_key))
            .field("openai_key", &redact(&self.openai_key))
            .field("openai_endpoint", &self.openai_endpoint)
            .field("openai_model", &self.openai_model)
            .finish()
    }
}

fn redact(key: &str) -> &'static str {
    if key.is_empty() { "<unset>" } else { "<redacted>" }
}

/// Everything persisted between sessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub board: BoardConfig,
    pub language: Language,
    pub ai: AiConfig,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_json_fills_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"board":{"itemsPerRow":2},"language":"EN"}"#).unwrap();
        assert_eq!(settings.board.items_per_row, 2);
        assert_eq!(settings.board.card_padding, 32.0);
        assert_eq!(settings.language, Language::En);
        assert_eq!(settings.ai.openai_model, "gpt-4o");
    }

    #[test]
    fn settings_roundtrip() {
        let mut settings = Settings::default();
        settings.board.segment_mode = SegmentMode::Lexical;
        settings.ai.provider = AiProvider::OpenaiCompatible;
        let json = serde_json::to_string(&settings).unwrap();
        assert!(json.contains("\"OPENAI_COMPATIBLE\""));
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, settings);
    }

    #[test]
    fn sanitized_clamps_ranges() {
        let config = BoardConfig {
            items_per_row: 40,
            min_scale: -1.0,
            history_depth: 0,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(config.items_per_row, MAX_ITEMS_PER_ROW);
        assert_eq!(config.min_scale, 0.05);
        assert_eq!(config.history_depth, 1);
    }

    #[test]
    fn debug_hides_keys() {
        let ai = AiConfig {
            gemini_key: "secret".into(),
            ..Default::default()
        };
        let shown = format!("{ai:?}");
        assert!(!shown.contains("secret"));
        assert!(ai.is_configured());
    }
}
