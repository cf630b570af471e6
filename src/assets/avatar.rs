use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use crate::assets::decode::{PreparedImage, prepare_rgba8};

/// Largest avatar file accepted, in bytes (500 KiB).
pub const MAX_AVATAR_BYTES: u64 = 500 * 1024;

/// MIME types accepted for avatar uploads.
pub const ACCEPTED_AVATAR_MIME: [&str; 3] = ["image/jpeg", "image/jpg", "image/png"];

/// Largest avatar side in pixels. The raster surface addresses pixmaps with `u16`.
pub const MAX_AVATAR_SIDE: u32 = u16::MAX as u32;

/// Ceiling on what the decoder may allocate for one avatar.
const MAX_AVATAR_DECODE_ALLOC: u64 = 64 * 1024 * 1024;

/// Decoded avatar, cheap to clone and safe to hand across threads.
pub type AvatarImage = Arc<PreparedImage>;

/// Why an avatar upload was refused. The prior avatar, if any, stays in place.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AvatarRejection {
    #[error("unsupported avatar file type '{mime}': please upload a JPG or PNG image")]
    UnsupportedType { mime: String },

    #[error("avatar file is too large ({bytes} bytes): please upload a photo under 500KB")]
    TooLarge { bytes: u64, limit: u64 },

    #[error("avatar image could not be decoded: {0}")]
    Decode(String),
}

/// What the host knows about an upload before reading its bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AvatarUpload {
    /// Declared MIME type.
    pub mime: String,
    /// Declared byte length.
    pub len: u64,
}

impl AvatarUpload {
    pub fn new(mime: impl Into<String>, len: u64) -> Self {
        Self {
            mime: mime.into(),
            len,
        }
    }
}

/// Apply the type and size policy to an upload's metadata.
pub fn check_avatar_upload(upload: &AvatarUpload) -> Result<(), AvatarRejection> {
    let mime = upload.mime.trim().to_ascii_lowercase();
    if !ACCEPTED_AVATAR_MIME.contains(&mime.as_str()) {
        return Err(AvatarRejection::UnsupportedType {
            mime: upload.mime.clone(),
        });
    }
    if upload.len > MAX_AVATAR_BYTES {
        return Err(AvatarRejection::TooLarge {
            bytes: upload.len,
            limit: MAX_AVATAR_BYTES,
        });
    }
    Ok(())
}

/// Decode avatar bytes. Pure, so it may run off the widget's thread.
///
/// Dimensions and decoder allocations are bounded before any pixels are produced, so a
/// small file that inflates to a huge bitmap is refused.
pub fn decode_avatar(bytes: &[u8]) -> Result<AvatarImage, AvatarRejection> {
    let mut limits = image::Limits::default();
    limits.max_image_width = Some(MAX_AVATAR_SIDE);
    limits.max_image_height = Some(MAX_AVATAR_SIDE);
    limits.max_alloc = Some(MAX_AVATAR_DECODE_ALLOC);

    let mut reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| AvatarRejection::Decode(e.to_string()))?;
    reader.limits(limits);
    let img = reader
        .decode()
        .map_err(|e| AvatarRejection::Decode(e.to_string()))?;

    let (width, height) = (img.width(), img.height());
    if width == 0 || height == 0 || width > MAX_AVATAR_SIDE || height > MAX_AVATAR_SIDE {
        return Err(AvatarRejection::Decode(format!(
            "avatar is {width}x{height}; each side must be between 1 and {MAX_AVATAR_SIDE} pixels"
        )));
    }
    Ok(Arc::new(prepare_rgba8(&img)))
}

/// Guess the MIME type of an image file from its extension.
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    match image::ImageFormat::from_path(path).ok()? {
        image::ImageFormat::Png => Some("image/png"),
        image::ImageFormat::Jpeg => Some("image/jpeg"),
        other => Some(other.to_mime_type()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/avatar.rs"]
mod tests;
