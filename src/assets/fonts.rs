use std::path::Path;

use crate::foundation::error::{TicketError, TicketResult};

/// Stateful helper that shapes ticket text with Parley against one registered font.
///
/// The same font bytes back both shaping (Parley) and glyph rasterization (`vello_cpu`),
/// so glyph ids always agree.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<()>,
    family_name: String,
    font: vello_cpu::peniko::FontData,
}

/// A shaped single-line run plus the metrics needed to place it on a baseline.
pub struct ShapedText {
    pub layout: parley::Layout<()>,
    /// Advance width of the run in pixels.
    pub width: f32,
    /// Distance from the layout's top edge to the first baseline.
    pub baseline: f32,
}

impl TextLayoutEngine {
    /// Register `font_bytes` (TTF/OTF) and keep them for rasterization.
    pub fn from_font_bytes(font_bytes: Vec<u8>) -> TicketResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.clone()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            TicketError::validation("no font families registered from font bytes")
        })?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| TicketError::validation("registered font family has no name"))?
            .to_string();

        let font = vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(font_bytes), 0);
        tracing::debug!(family = %family_name, "registered ticket font");
        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
            font,
        })
    }

    pub fn from_path(path: &Path) -> TicketResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            TicketError::validation(format!("failed to read font '{}': {e}", path.display()))
        })?;
        Self::from_font_bytes(bytes)
    }

    pub fn family_name(&self) -> &str {
        &self.family_name
    }

    pub fn font(&self) -> &vello_cpu::peniko::FontData {
        &self.font
    }

    /// Shape `text` on a single unwrapped line.
    pub fn shape(&mut self, text: &str, size_px: f32, bold: bool) -> TicketResult<ShapedText> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(TicketError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        if bold {
            builder.push_default(parley::style::StyleProperty::FontWeight(
                parley::style::FontWeight::BOLD,
            ));
        }

        let mut layout: parley::Layout<()> = builder.build(text);
        layout.break_all_lines(None);

        let baseline = layout
            .lines()
            .next()
            .map(|line| line.metrics().baseline)
            .unwrap_or(size_px);
        let width = layout.width();
        Ok(ShapedText {
            layout,
            width,
            baseline,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fonts.rs"]
mod tests;
