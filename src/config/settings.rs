use std::path::{Path, PathBuf};

use crate::compile::layout::{EventInfo, TicketLayout};
use crate::foundation::core::Canvas;
use crate::foundation::error::{TicketError, TicketResult};
use crate::render::backend::RenderSettings;
use crate::validation::policy::ValidationConfig;

/// Host-level configuration for a ticket widget, usually loaded from JSON.
///
/// ```json
/// {
///   "validation": { "name_validation": "first", "github_validation": "no_at" },
///   "canvas": { "width": 600, "height": 400 },
///   "font_path": "fonts/Inconsolata-Regular.ttf",
///   "seed": 7
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TicketSettings {
    pub validation: ValidationConfig,
    pub canvas: Canvas,
    /// Font for all ticket text. Relative paths resolve against the settings file.
    pub font_path: Option<PathBuf>,
    /// Bold face for the event name, registrant name and avatar glyph. Resolved like `font_path`.
    pub bold_font_path: Option<PathBuf>,
    pub event: EventInfo,
    /// Seed for ticket numbers; unset means a fresh random seed per widget.
    pub seed: Option<u64>,
}

impl TicketSettings {
    pub fn from_json_str(s: &str) -> TicketResult<Self> {
        let settings: Self = serde_json::from_str(s)
            .map_err(|e| TicketError::serde(format!("invalid settings json: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_path(path: &Path) -> TicketResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            TicketError::validation(format!("failed to read settings '{}': {e}", path.display()))
        })?;
        let mut settings = Self::from_json_str(&text)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let resolve = |font: PathBuf| {
            if font.is_absolute() {
                font
            } else {
                base.join(font)
            }
        };
        settings.font_path = settings.font_path.take().map(resolve);
        settings.bold_font_path = settings.bold_font_path.take().map(resolve);
        Ok(settings)
    }

    pub fn validate(&self) -> TicketResult<()> {
        self.canvas.validate()
    }

    pub fn layout(&self) -> TicketLayout {
        TicketLayout::new(self.canvas, self.event.clone())
    }

    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            clear_rgba: None,
            font_path: self.font_path.clone(),
            bold_font_path: self.bold_font_path.clone(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/settings.rs"]
mod tests;
