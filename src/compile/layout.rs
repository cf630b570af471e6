use rand::Rng;

use crate::compile::plan::{
    DrawOp, GradientStop, Paint, TextAlign, TextPaint, TextRole, TicketPlan,
};
use crate::foundation::core::{Canvas, Point, Rect, Rgba8, hsl, hsla};
use crate::ticket::number::generate_ticket_number;
use crate::ticket::state::TicketState;

/// Static copy printed on every ticket.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EventInfo {
    pub name: String,
    pub date_location: String,
    pub campaign_tag: String,
}

impl Default for EventInfo {
    fn default() -> Self {
        Self {
            name: "Coding Conf".to_string(),
            date_location: "Jan 31, 2025 / Austin, TX".to_string(),
            campaign_tag: "#task2025".to_string(),
        }
    }
}

pub const CARD_INSET_X: f64 = 40.0;
pub const CARD_TOP: f64 = 60.0;
pub const CARD_HEIGHT: f64 = 280.0;
pub const CARD_RADIUS: f64 = 16.0;
pub const CONTENT_INSET: f64 = 24.0;
pub const AVATAR_SIZE: f64 = 60.0;
pub const AVATAR_RING_WIDTH: f64 = 2.0;

pub const EMPTY_PLACEHOLDER: &str = "Complete the form to preview your ticket";
pub const NAME_PLACEHOLDER: &str = "Your Name";
pub const HANDLE_PLACEHOLDER: &str = "@username";
pub const AVATAR_GLYPH: &str = "?";

/// Palette shared by every ticket.
struct Palette;

impl Palette {
    fn deep() -> Rgba8 {
        hsl(248.0, 70.0, 10.0)
    }
    fn card() -> Rgba8 {
        hsl(245.0, 19.0, 35.0)
    }
    fn accent() -> Rgba8 {
        hsl(7.0, 88.0, 67.0)
    }
    fn muted() -> Rgba8 {
        hsl(245.0, 15.0, 58.0)
    }
    fn dimmed_white(alpha: f32) -> Rgba8 {
        hsla(0.0, 0.0, 100.0, alpha)
    }
}

/// Fixed geometry of the ticket on a given canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct TicketLayout {
    pub canvas: Canvas,
    pub event: EventInfo,
}

impl Default for TicketLayout {
    fn default() -> Self {
        Self::new(Canvas::default(), EventInfo::default())
    }
}

impl TicketLayout {
    pub fn new(canvas: Canvas, event: EventInfo) -> Self {
        Self { canvas, event }
    }

    pub fn card(&self) -> Rect {
        let w = f64::from(self.canvas.width) - 2.0 * CARD_INSET_X;
        Rect::new(CARD_INSET_X, CARD_TOP, CARD_INSET_X + w, CARD_TOP + CARD_HEIGHT)
    }

    pub fn avatar_center(&self) -> Point {
        let card = self.card();
        let r = AVATAR_SIZE / 2.0;
        Point::new(card.x0 + CONTENT_INSET + r, card.y0 + 90.0 + r)
    }

    pub fn divider_y(&self) -> f64 {
        self.card().y1 - 60.0
    }
}

/// Lay out one full ticket frame for `state`.
///
/// When `state.ticket_number` is unset and the data branch is taken, a fresh number is
/// drawn from `rng`, so two calls may differ only in that footer run.
#[tracing::instrument(skip_all, fields(has_data = state.has_data()))]
pub fn compose_ticket<R: Rng + ?Sized>(
    state: &TicketState,
    layout: &TicketLayout,
    rng: &mut R,
) -> TicketPlan {
    let canvas = layout.canvas;
    let card = layout.card();
    let (w, h) = (f64::from(canvas.width), f64::from(canvas.height));
    let mut ops = Vec::with_capacity(16);

    ops.push(DrawOp::FillRect {
        rect: Rect::new(0.0, 0.0, w, h),
        paint: Paint::Linear {
            start: Point::ZERO,
            end: Point::new(w, h),
            stops: vec![
                GradientStop {
                    offset: 0.0,
                    color: Palette::deep(),
                },
                GradientStop {
                    offset: 0.5,
                    color: Palette::card(),
                },
                GradientStop {
                    offset: 1.0,
                    color: Palette::deep(),
                },
            ],
        },
    });

    ops.push(DrawOp::FillRoundedRect {
        rect: card,
        radius: CARD_RADIUS,
        paint: Paint::Solid(Palette::card()),
    });
    ops.push(DrawOp::FillRoundedRect {
        rect: card,
        radius: CARD_RADIUS,
        paint: Paint::Linear {
            start: Point::new(card.x0, card.y0),
            end: Point::new(card.x1, card.y1),
            stops: vec![
                GradientStop {
                    offset: 0.0,
                    color: Rgba8::WHITE.with_alpha(0.10),
                },
                GradientStop {
                    offset: 1.0,
                    color: Rgba8::opaque(0, 0, 0).with_alpha(0.20),
                },
            ],
        },
    });

    let left = card.x0 + CONTENT_INSET;
    ops.push(text(
        TextRole::EventName,
        &layout.event.name,
        Point::new(left, card.y0 + 40.0),
        20.0,
        true,
        TextAlign::Left,
        TextPaint::Solid(Palette::accent()),
    ));
    ops.push(text(
        TextRole::DateLocation,
        &layout.event.date_location,
        Point::new(left, card.y0 + 65.0),
        14.0,
        false,
        TextAlign::Left,
        TextPaint::Solid(Rgba8::WHITE),
    ));

    let ticket_number = if state.has_data() {
        push_registrant(&mut ops, state, layout);
        Some(
            state
                .ticket_number
                .clone()
                .unwrap_or_else(|| generate_ticket_number(&state.full_name, rng)),
        )
    } else {
        ops.push(text(
            TextRole::EmptyPlaceholder,
            EMPTY_PLACEHOLDER,
            Point::new(canvas.center_x(), card.y0 + CARD_HEIGHT / 2.0),
            16.0,
            false,
            TextAlign::Center,
            TextPaint::Solid(Palette::dimmed_white(0.6)),
        ));
        None
    };

    ops.push(DrawOp::DashedLine {
        from: Point::new(left, layout.divider_y()),
        to_x: card.x1 - CONTENT_INSET,
        dash: 6.0,
        gap: 4.0,
        thickness: 1.0,
        color: Palette::dimmed_white(0.3),
    });

    if let Some(number) = &ticket_number {
        ops.push(text(
            TextRole::TicketNumber,
            &format!("#{number}"),
            Point::new(card.x1 - CONTENT_INSET, card.y1 - 35.0),
            14.0,
            false,
            TextAlign::Right,
            TextPaint::Solid(Palette::dimmed_white(0.8)),
        ));
    }
    ops.push(text(
        TextRole::CampaignTag,
        &layout.event.campaign_tag,
        Point::new(canvas.center_x(), card.y1 - 10.0),
        12.0,
        false,
        TextAlign::Center,
        TextPaint::Solid(Palette::muted()),
    ));

    TicketPlan {
        canvas,
        ops,
        ticket_number,
    }
}

fn push_registrant(ops: &mut Vec<DrawOp>, state: &TicketState, layout: &TicketLayout) {
    let card = layout.card();
    let center = layout.avatar_center();
    let radius = AVATAR_SIZE / 2.0;

    match &state.avatar {
        Some(image) => {
            ops.push(DrawOp::CircleImage {
                image: image.clone(),
                center,
                radius,
            });
            ops.push(DrawOp::StrokeCircle {
                center,
                radius,
                width: AVATAR_RING_WIDTH,
                color: Palette::accent(),
            });
        }
        None => {
            ops.push(DrawOp::FillCircle {
                center,
                radius,
                paint: Paint::Solid(Palette::muted()),
            });
            ops.push(text(
                TextRole::AvatarGlyph,
                AVATAR_GLYPH,
                Point::new(center.x, center.y + 9.0),
                26.0,
                true,
                TextAlign::Center,
                TextPaint::Solid(Rgba8::WHITE),
            ));
        }
    }

    let text_x = card.x0 + 100.0;
    if state.full_name.is_empty() {
        ops.push(text(
            TextRole::NamePlaceholder,
            NAME_PLACEHOLDER,
            Point::new(text_x, card.y0 + 110.0),
            22.0,
            true,
            TextAlign::Left,
            TextPaint::Solid(Palette::dimmed_white(0.4)),
        ));
    } else {
        ops.push(text(
            TextRole::Name,
            &state.full_name,
            Point::new(text_x, card.y0 + 110.0),
            22.0,
            true,
            TextAlign::Left,
            TextPaint::HorizontalGradient {
                from: Palette::accent(),
                to: Rgba8::WHITE,
            },
        ));
    }

    match state.display_handle() {
        Some(handle) => ops.push(text(
            TextRole::Handle,
            &handle,
            Point::new(text_x, card.y0 + 135.0),
            16.0,
            false,
            TextAlign::Left,
            TextPaint::Solid(Rgba8::WHITE),
        )),
        None => ops.push(text(
            TextRole::HandlePlaceholder,
            HANDLE_PLACEHOLDER,
            Point::new(text_x, card.y0 + 135.0),
            16.0,
            false,
            TextAlign::Left,
            TextPaint::Solid(Palette::dimmed_white(0.4)),
        )),
    }
}

fn text(
    role: TextRole,
    text: &str,
    origin: Point,
    size_px: f32,
    bold: bool,
    align: TextAlign,
    paint: TextPaint,
) -> DrawOp {
    DrawOp::Text {
        role,
        text: text.to_string(),
        origin,
        size_px,
        bold,
        align,
        paint,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compile/layout.rs"]
mod tests;
