//! confticket turns a three-field conference registration form into a rendered ticket.
//!
//! # Pipeline overview
//!
//! 1. **Validate**: `Field + raw value + ValidationConfig -> FieldValidationResult`
//! 2. **Compose**: `TicketState -> TicketPlan` (backend-agnostic draw ops for one frame)
//! 3. **Render**: `TicketPlan -> FrameRGBA` (CPU backend)
//! 4. **Export**: `FrameRGBA -> PNG bytes` named `conference-ticket-<name>.png`
//!
//! [`TicketWidget`] ties the steps together: it owns the form state, repaints after every
//! mutation, sequences avatar uploads so the latest one wins, and gates export behind a
//! successful submit.
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Explicit configuration**: policies are passed in, never read from globals.
//! - **Premultiplied RGBA8**: renderers output premultiplied pixels; PNG export converts back.
#![forbid(unsafe_code)]

mod assets;
mod compile;
mod config;
mod export;
mod foundation;
mod render;
mod ticket;
mod validation;
mod widget;

pub use assets::avatar::{
    ACCEPTED_AVATAR_MIME, AvatarImage, AvatarRejection, AvatarUpload, MAX_AVATAR_BYTES, MAX_AVATAR_SIDE,
    check_avatar_upload, decode_avatar, mime_for_path,
};
pub use assets::decode::{PreparedImage, decode_image};
pub use assets::fonts::{ShapedText, TextLayoutEngine};
pub use compile::layout::{
    AVATAR_GLYPH, EMPTY_PLACEHOLDER, EventInfo, HANDLE_PLACEHOLDER, NAME_PLACEHOLDER,
    TicketLayout, compose_ticket,
};
pub use compile::plan::{
    DrawOp, GradientStop, Paint, TextAlign, TextPaint, TextRole, TicketPlan,
};
pub use config::settings::TicketSettings;
pub use export::png::{EXPORT_FILE_PREFIX, ExportedTicket, encode_png, export_file_name};
pub use foundation::core::{Canvas, Point, Rect, Rgba8, hsl, hsla};
pub use foundation::error::{TicketError, TicketResult};
pub use render::backend::{BackendKind, FrameRGBA, RenderBackend, RenderSettings, create_backend};
pub use render::cpu::CpuBackend;
pub use render::pipeline::{RenderedTicket, render_ticket};
pub use ticket::number::{FALLBACK_NAME, generate_ticket_number, ticket_initials};
pub use ticket::state::{TicketState, display_handle};
pub use validation::feedback::{Feedback, FieldError, TOAST_TTL_MS, present};
pub use validation::policy::{DisplayMode, Field, GithubPolicy, NamePolicy, ValidationConfig};
pub use validation::rules::{
    FieldValidationResult, GITHUB_USERNAME_MAX_LEN, is_valid_github_username, validate,
    validate_email, validate_github, validate_name,
};
pub use widget::session::{
    AvatarOutcome, SubmitOutcome, TicketWidget, UploadToken, WidgetPhase,
};
