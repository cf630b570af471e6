use std::sync::Arc;

use kurbo::Shape;

use crate::assets::avatar::AvatarImage;
use crate::assets::fonts::TextLayoutEngine;
use crate::compile::plan::{DrawOp, Paint, TextAlign, TextPaint, TicketPlan};
use crate::foundation::core::{Affine, BezPath, Point, Rect, Rgba8};
use crate::foundation::error::{TicketError, TicketResult};
use crate::render::backend::{FrameRGBA, RenderBackend, RenderSettings};

const PATH_TOLERANCE: f64 = 0.1;

/// CPU backend powered by `vello_cpu` for vector, image and text rasterization.
pub struct CpuBackend {
    settings: RenderSettings,
    text: Option<TextLayoutEngine>,
    bold_text: Option<TextLayoutEngine>,
    ctx: Option<vello_cpu::RenderContext>,
    avatar_cache: Option<(AvatarImage, vello_cpu::Image)>,
    reported_missing_font: bool,
    reported_missing_bold: bool,
}

impl CpuBackend {
    pub fn new(settings: RenderSettings, text: Option<TextLayoutEngine>) -> Self {
        Self {
            settings,
            text,
            bold_text: None,
            ctx: None,
            avatar_cache: None,
            reported_missing_font: false,
            reported_missing_bold: false,
        }
    }

    /// Use a dedicated bold face for bold runs.
    ///
    /// Parley only selects a face; it does not embolden glyph outlines. Without a bold face,
    /// bold runs are drawn with the regular face.
    pub fn with_bold_text(mut self, bold_text: Option<TextLayoutEngine>) -> Self {
        self.bold_text = bold_text;
        self
    }

    pub fn has_font(&self) -> bool {
        self.text.is_some()
    }

    fn take_ctx(&mut self, width: u16, height: u16) -> vello_cpu::RenderContext {
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        ctx
    }

    fn draw_op(&mut self, ctx: &mut vello_cpu::RenderContext, op: &DrawOp) -> TicketResult<()> {
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        match op {
            DrawOp::FillRect { rect, paint } => {
                set_paint(ctx, paint);
                ctx.fill_rect(&rect_to_cpu(*rect));
            }
            DrawOp::FillRoundedRect {
                rect,
                radius,
                paint,
            } => {
                let path = kurbo::RoundedRect::from_rect(*rect, *radius).to_path(PATH_TOLERANCE);
                set_paint(ctx, paint);
                ctx.fill_path(&bezpath_to_cpu(&path));
            }
            DrawOp::FillCircle {
                center,
                radius,
                paint,
            } => {
                let path = kurbo::Circle::new(*center, *radius).to_path(PATH_TOLERANCE);
                set_paint(ctx, paint);
                ctx.fill_path(&bezpath_to_cpu(&path));
            }
            DrawOp::StrokeCircle {
                center,
                radius,
                width,
                color,
            } => {
                let path = kurbo::Circle::new(*center, *radius).to_path(PATH_TOLERANCE);
                ctx.set_stroke(vello_cpu::kurbo::Stroke::new(*width));
                ctx.set_paint(color_to_cpu(*color));
                ctx.stroke_path(&bezpath_to_cpu(&path));
            }
            DrawOp::CircleImage {
                image,
                center,
                radius,
            } => {
                let paint = self.avatar_paint(image)?;
                let (w, h) = (f64::from(image.width), f64::from(image.height));
                let side = radius * 2.0;
                // Image space: the ellipse inscribed in the image maps onto the avatar circle.
                let tr = Affine::translate((center.x - radius, center.y - radius))
                    * Affine::scale_non_uniform(side / w, side / h);
                let clip = kurbo::Ellipse::new(Point::new(w / 2.0, h / 2.0), (w / 2.0, h / 2.0), 0.0)
                    .to_path(PATH_TOLERANCE);
                ctx.set_transform(affine_to_cpu(tr));
                ctx.set_paint(paint);
                ctx.fill_path(&bezpath_to_cpu(&clip));
            }
            DrawOp::Text {
                text,
                origin,
                size_px,
                bold,
                align,
                paint,
                ..
            } => self.draw_text(ctx, text, *origin, *size_px, *bold, *align, *paint)?,
            DrawOp::DashedLine {
                from,
                to_x,
                dash,
                gap,
                thickness,
                color,
            } => {
                if *dash <= 0.0 || *gap < 0.0 {
                    return Err(TicketError::render("dashed line needs dash > 0 and gap >= 0"));
                }
                ctx.set_paint(color_to_cpu(*color));
                let half = thickness / 2.0;
                let mut x = from.x;
                while x < *to_x {
                    let end = (x + dash).min(*to_x);
                    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                        x,
                        from.y - half,
                        end,
                        from.y + half,
                    ));
                    x += dash + gap;
                }
            }
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_text(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        text: &str,
        origin: Point,
        size_px: f32,
        bold: bool,
        align: TextAlign,
        paint: TextPaint,
    ) -> TicketResult<()> {
        let use_bold_face = bold && self.bold_text.is_some();
        if bold && !use_bold_face && self.text.is_some() && !self.reported_missing_bold {
            tracing::debug!("no bold face configured; bold runs use the regular face");
            self.reported_missing_bold = true;
        }
        let engine = if use_bold_face {
            self.bold_text.as_mut()
        } else {
            self.text.as_mut()
        };
        let Some(engine) = engine else {
            if !self.reported_missing_font {
                tracing::debug!("no font configured; skipping text runs");
                self.reported_missing_font = true;
            }
            return Ok(());
        };
        if text.is_empty() {
            return Ok(());
        }

        let shaped = engine.shape(text, size_px, bold)?;
        let width = f64::from(shaped.width);
        let x0 = match align {
            TextAlign::Left => origin.x,
            TextAlign::Center => origin.x - width / 2.0,
            TextAlign::Right => origin.x - width,
        };
        let y0 = origin.y - f64::from(shaped.baseline);
        ctx.set_transform(affine_to_cpu(Affine::translate((x0, y0))));

        match paint {
            TextPaint::Solid(c) => ctx.set_paint(color_to_cpu(c)),
            TextPaint::HorizontalGradient { from, to } => {
                let stops = [(0.0f32, color_to_cpu(from)), (1.0f32, color_to_cpu(to))];
                let gradient = vello_cpu::peniko::Gradient::new_linear(
                    vello_cpu::kurbo::Point::new(0.0, 0.0),
                    vello_cpu::kurbo::Point::new(width.max(1.0), 0.0),
                )
                .with_stops(stops.as_slice());
                ctx.set_paint(gradient);
            }
        }

        let font = engine.font().clone();
        for line in shaped.layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        Ok(())
    }

    fn avatar_paint(&mut self, image: &AvatarImage) -> TicketResult<vello_cpu::Image> {
        if let Some((cached, paint)) = &self.avatar_cache
            && Arc::ptr_eq(cached, image)
        {
            return Ok(paint.clone());
        }
        let pixmap = pixmap_from_premul_bytes(&image.rgba8_premul, image.width, image.height)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        self.avatar_cache = Some((image.clone(), paint.clone()));
        Ok(paint)
    }
}

impl RenderBackend for CpuBackend {
    #[tracing::instrument(skip_all, fields(ops = plan.ops.len()))]
    fn render_plan(&mut self, plan: &TicketPlan) -> TicketResult<FrameRGBA> {
        plan.canvas.validate()?;
        let width: u16 = plan
            .canvas
            .width
            .try_into()
            .map_err(|_| TicketError::render("surface width exceeds u16"))?;
        let height: u16 = plan
            .canvas
            .height
            .try_into()
            .map_err(|_| TicketError::render("surface height exceeds u16"))?;

        let mut ctx = self.take_ctx(width, height);
        let drawn = plan.ops.iter().try_for_each(|op| self.draw_op(&mut ctx, op));
        if let Err(e) = drawn {
            self.ctx = Some(ctx);
            return Err(e);
        }

        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        if let Some(rgba) = self.settings.clear_rgba {
            clear_pixmap(&mut pixmap, Rgba8::from(rgba).to_premul());
        }
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);
        self.ctx = Some(ctx);

        Ok(FrameRGBA {
            width: plan.canvas.width,
            height: plan.canvas.height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

fn set_paint(ctx: &mut vello_cpu::RenderContext, paint: &Paint) {
    match paint {
        Paint::Solid(c) => ctx.set_paint(color_to_cpu(*c)),
        Paint::Linear { start, end, stops } => {
            let stops: Vec<(f32, vello_cpu::peniko::Color)> = stops
                .iter()
                .map(|s| (s.offset, color_to_cpu(s.color)))
                .collect();
            let gradient = vello_cpu::peniko::Gradient::new_linear(
                vello_cpu::kurbo::Point::new(start.x, start.y),
                vello_cpu::kurbo::Point::new(end.x, end.y),
            )
            .with_stops(stops.as_slice());
            ctx.set_paint(gradient);
        }
    }
}

fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn clear_pixmap(pixmap: &mut vello_cpu::Pixmap, rgba: [u8; 4]) {
    for px in pixmap.data_as_u8_slice_mut().chunks_exact_mut(4) {
        px.copy_from_slice(&rgba);
    }
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> TicketResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| TicketError::render("avatar width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| TicketError::render("avatar height exceeds u16"))?;
    if w == 0 || h == 0 {
        return Err(TicketError::render("avatar image is empty"));
    }
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(TicketError::render("avatar byte len mismatch"));
    }
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect::<Vec<_>>();
    let may_have_opacities = bytes.chunks_exact(4).any(|px| px[3] != 255);
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
