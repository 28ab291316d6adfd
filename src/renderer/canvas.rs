//! Canvas2D surface (browser only)

use glam::Vec2;
use std::f64::consts::TAU;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::Surface;
use crate::color::Rgba;
use crate::error::PlatformError;

fn device_pixel_ratio() -> f64 {
    web_sys::window()
        .map(|w| w.device_pixel_ratio())
        .unwrap_or(1.0)
}

/// A `<canvas>` and its 2D context
///
/// Drawing happens in CSS pixels; the backing store follows the device pixel
/// ratio.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    width: f32,
    height: f32,
    dpr: f64,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, PlatformError> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|_| PlatformError::NoContext2d)?
            .ok_or(PlatformError::NoContext2d)?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| PlatformError::NoContext2d)?;
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        let mut surface = Self {
            canvas,
            ctx,
            width: 0.0,
            height: 0.0,
            dpr: 1.0,
        };
        surface.resize(0.0, 0.0);
        Ok(surface)
    }

    /// Match the backing store to `width × height` CSS pixels
    pub fn resize(&mut self, width: f32, height: f32) {
        let dpr = device_pixel_ratio();
        if width == self.width && height == self.height && dpr == self.dpr {
            return;
        }
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        self.dpr = dpr;
        self.canvas.set_width((self.width as f64 * dpr) as u32);
        self.canvas.set_height((self.height as f64 * dpr) as u32);
        // Setting the size resets context state
        self.ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0).ok();
        self.ctx.set_text_align("center");
        self.ctx.set_text_baseline("middle");
    }
}

impl Surface for CanvasSurface {
    fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        self.ctx
            .clear_rect(0.0, 0.0, self.width as f64, self.height as f64);
    }

    fn fade(&mut self, color: Rgba) {
        self.ctx.set_fill_style_str(&color.css());
        self.ctx
            .fill_rect(0.0, 0.0, self.width as f64, self.height as f64);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        self.ctx.set_fill_style_str(&color.css());
        self.ctx.begin_path();
        self.ctx
            .arc(center.x as f64, center.y as f64, radius as f64, 0.0, TAU)
            .ok();
        self.ctx.fill();
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgba) {
        self.ctx.set_stroke_style_str(&color.css());
        self.ctx.set_line_width(width as f64);
        self.ctx.begin_path();
        self.ctx.move_to(from.x as f64, from.y as f64);
        self.ctx.line_to(to.x as f64, to.y as f64);
        self.ctx.stroke();
    }

    fn fill_glyph(&mut self, glyph: char, pos: Vec2, size_px: f32, color: Rgba) {
        let mut buf = [0u8; 4];
        self.ctx.set_font(&format!("{:.0}px monospace", size_px.max(1.0)));
        self.ctx.set_fill_style_str(&color.css());
        self.ctx
            .fill_text(glyph.encode_utf8(&mut buf), pos.x as f64, pos.y as f64)
            .ok();
    }

    fn stroke_ellipse(&mut self, center: Vec2, radii: Vec2, rotation: f32, width: f32, color: Rgba) {
        self.ctx.set_stroke_style_str(&color.css());
        self.ctx.set_line_width(width as f64);
        self.ctx.begin_path();
        self.ctx
            .ellipse(
                center.x as f64,
                center.y as f64,
                radii.x as f64,
                radii.y as f64,
                rotation as f64,
                0.0,
                TAU,
            )
            .ok();
        self.ctx.stroke();
    }
}
