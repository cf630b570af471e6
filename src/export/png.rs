use std::io::Cursor;

use anyhow::Context;

use crate::assets::decode::unpremultiply_rgba8_in_place;
use crate::foundation::error::{TicketError, TicketResult};
use crate::render::backend::FrameRGBA;

/// Prefix of every exported ticket file name.
pub const EXPORT_FILE_PREFIX: &str = "conference-ticket-";

/// An encoded ticket ready to be offered as a download.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportedTicket {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Encode a frame as PNG (straight alpha).
pub fn encode_png(frame: &FrameRGBA) -> TicketResult<Vec<u8>> {
    let mut data = frame.data.clone();
    if frame.premultiplied {
        unpremultiply_rgba8_in_place(&mut data);
    }
    let img = image::RgbaImage::from_raw(frame.width, frame.height, data)
        .ok_or_else(|| TicketError::render("frame byte len does not match its dimensions"))?;

    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .context("encode ticket png")?;
    Ok(buf)
}

/// `conference-ticket-<name>.png`, with whitespace runs turned into `_` and path separators dropped.
pub fn export_file_name(full_name: &str) -> String {
    let stem = full_name
        .split_whitespace()
        .map(|token| {
            token
                .chars()
                .filter(|c| !matches!(c, '/' | '\\' | ':' | '\0'))
                .collect::<String>()
        })
        .filter(|token| !token.is_empty())
        .collect::<Vec<_>>()
        .join("_");
    if stem.is_empty() {
        format!("{EXPORT_FILE_PREFIX}ticket.png")
    } else {
        format!("{EXPORT_FILE_PREFIX}{stem}.png")
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/png.rs"]
mod tests;
