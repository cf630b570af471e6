use crate::assets::avatar::AvatarImage;
use crate::foundation::core::{Canvas, Point, Rect, Rgba8};

#[derive(Clone, Debug)]
/// Backend-agnostic display list for one ticket frame.
///
/// Ops are painted in order onto a cleared surface of size `canvas`. A plan always
/// describes the whole frame; there is no partial redraw.
pub struct TicketPlan {
    pub canvas: Canvas,
    pub ops: Vec<DrawOp>,
    /// Number drawn in the footer, when the data branch was taken.
    pub ticket_number: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientStop {
    pub offset: f32,
    pub color: Rgba8,
}

#[derive(Clone, Debug, PartialEq)]
/// Fill style for shapes.
pub enum Paint {
    Solid(Rgba8),
    /// Linear gradient between two canvas-space points.
    Linear {
        start: Point,
        end: Point,
        stops: Vec<GradientStop>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Horizontal anchoring of a text run relative to its origin.
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Fill style for text.
pub enum TextPaint {
    Solid(Rgba8),
    /// Left-to-right gradient spanning exactly the shaped run.
    HorizontalGradient { from: Rgba8, to: Rgba8 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// What a text op shows. Backends ignore it; hosts and tests use it to find runs.
pub enum TextRole {
    EventName,
    DateLocation,
    EmptyPlaceholder,
    AvatarGlyph,
    Name,
    NamePlaceholder,
    Handle,
    HandlePlaceholder,
    TicketNumber,
    CampaignTag,
}

#[derive(Clone, Debug)]
/// Draw operation emitted by [`crate::compose_ticket`].
pub enum DrawOp {
    FillRect {
        rect: Rect,
        paint: Paint,
    },
    FillRoundedRect {
        rect: Rect,
        radius: f64,
        paint: Paint,
    },
    FillCircle {
        center: Point,
        radius: f64,
        paint: Paint,
    },
    StrokeCircle {
        center: Point,
        radius: f64,
        width: f64,
        color: Rgba8,
    },
    /// Image stretched over the circle's bounding square and clipped to the circle.
    CircleImage {
        image: AvatarImage,
        center: Point,
        radius: f64,
    },
    /// Single-line text; `origin.y` is the alphabetic baseline.
    Text {
        role: TextRole,
        text: String,
        origin: Point,
        size_px: f32,
        bold: bool,
        align: TextAlign,
        paint: TextPaint,
    },
    /// Horizontal dashed rule starting at `from` and ending at `to_x`.
    DashedLine {
        from: Point,
        to_x: f64,
        dash: f64,
        gap: f64,
        thickness: f64,
        color: Rgba8,
    },
}

impl TicketPlan {
    /// Text runs in paint order.
    pub fn texts(&self) -> impl Iterator<Item = (TextRole, &str)> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { role, text, .. } => Some((*role, text.as_str())),
            _ => None,
        })
    }

    /// First text run with `role`.
    pub fn text(&self, role: TextRole) -> Option<&str> {
        self.texts().find(|(r, _)| *r == role).map(|(_, t)| t)
    }

    /// True when an avatar (uploaded image or placeholder disc) is part of the frame.
    pub fn has_avatar(&self) -> bool {
        self.ops
            .iter()
            .any(|op| matches!(op, DrawOp::CircleImage { .. } | DrawOp::FillCircle { .. }))
    }

    pub fn has_avatar_image(&self) -> bool {
        self.ops
            .iter()
            .any(|op| matches!(op, DrawOp::CircleImage { .. }))
    }
}
