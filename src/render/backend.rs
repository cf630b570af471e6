use std::path::PathBuf;

use crate::assets::fonts::TextLayoutEngine;
use crate::compile::plan::TicketPlan;
use crate::foundation::error::TicketResult;
use crate::render::cpu::CpuBackend;

/// A rendered frame as RGBA8 pixels.
///
/// Frames are **premultiplied alpha**. The `premultiplied` flag makes this explicit at API
/// boundaries; [`crate::encode_png`] converts back to straight alpha.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// RGBA of the pixel at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// A renderer that executes a [`TicketPlan`] into a [`FrameRGBA`].
///
/// Every call paints the whole frame from scratch.
pub trait RenderBackend {
    fn render_plan(&mut self, plan: &TicketPlan) -> TicketResult<FrameRGBA>;
}

/// Available backend kinds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BackendKind {
    /// CPU raster backend powered by `vello_cpu`.
    #[default]
    Cpu,
}

/// Backend-agnostic settings.
#[derive(Clone, Debug, Default)]
pub struct RenderSettings {
    /// If set, backends clear the target to this straight RGBA8 color before drawing.
    pub clear_rgba: Option<[u8; 4]>,
    /// TTF/OTF used for every text run. Without it, text ops are skipped.
    pub font_path: Option<PathBuf>,
    /// Bold face for bold runs. Without it, bold runs are drawn with `font_path`.
    pub bold_font_path: Option<PathBuf>,
}

/// Create a rendering backend implementation.
pub fn create_backend(
    kind: BackendKind,
    settings: &RenderSettings,
) -> TicketResult<Box<dyn RenderBackend>> {
    match kind {
        BackendKind::Cpu => {
            let text = settings
                .font_path
                .as_deref()
                .map(TextLayoutEngine::from_path)
                .transpose()?;
            let bold = settings
                .bold_font_path
                .as_deref()
                .map(TextLayoutEngine::from_path)
                .transpose()?;
            Ok(Box::new(
                CpuBackend::new(settings.clone(), text).with_bold_text(bold),
            ))
        }
    }
}
