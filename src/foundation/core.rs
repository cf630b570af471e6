use crate::foundation::error::{TicketError, TicketResult};

pub use kurbo::{Affine, BezPath, Point, Rect};

/// Fixed-size drawing surface dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    /// Smallest canvas that still fits the ticket card and its footer.
    pub const MIN: Canvas = Canvas {
        width: 240,
        height: 360,
    };

    pub fn new(width: u32, height: u32) -> TicketResult<Self> {
        let c = Self { width, height };
        c.validate()?;
        Ok(c)
    }

    pub fn validate(self) -> TicketResult<()> {
        if self.width < Self::MIN.width || self.height < Self::MIN.height {
            return Err(TicketError::validation(format!(
                "canvas must be at least {}x{}, got {}x{}",
                Self::MIN.width,
                Self::MIN.height,
                self.width,
                self.height
            )));
        }
        if self.width > u32::from(u16::MAX) || self.height > u32::from(u16::MAX) {
            return Err(TicketError::validation("canvas dimensions must fit in u16"));
        }
        Ok(())
    }

    pub fn center_x(self) -> f64 {
        f64::from(self.width) / 2.0
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 600,
            height: 400,
        }
    }
}

/// Straight (non-premultiplied) RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const WHITE: Rgba8 = Rgba8::opaque(255, 255, 255);

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            a: unit_to_u8(alpha),
            ..self
        }
    }

    /// Premultiplied channels, rounding the same way the CPU backend does.
    pub fn to_premul(self) -> [u8; 4] {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }
        [
            premul(self.r, self.a),
            premul(self.g, self.a),
            premul(self.b, self.a),
            self.a,
        ]
    }
}

impl From<[u8; 4]> for Rgba8 {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Rgba8 { r, g, b, a }
    }
}

/// CSS-style `hsl(h, s%, l%)` with `s` and `l` given in percent.
pub fn hsl(h: f32, s: f32, l: f32) -> Rgba8 {
    hsla(h, s, l, 1.0)
}

/// CSS-style `hsla(h, s%, l%, a)`.
pub fn hsla(h: f32, s: f32, l: f32, a: f32) -> Rgba8 {
    let s = (s / 100.0).clamp(0.0, 1.0);
    let l = (l / 100.0).clamp(0.0, 1.0);
    let h = h.rem_euclid(360.0) / 60.0;

    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r1, g1, b1) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    Rgba8 {
        r: unit_to_u8(r1 + m),
        g: unit_to_u8(g1 + m),
        b: unit_to_u8(b1 + m),
        a: unit_to_u8(a),
    }
}

fn unit_to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
