//! 2D rendering
//!
//! Draw routines target the [`Surface`] trait: a Canvas2D context in the
//! browser, or a recorded [`DrawList`] natively and in tests.

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod recording;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSurface;
pub use recording::{DrawCmd, DrawList};

use glam::Vec2;

use crate::color::Rgba;
use crate::sim::field::{MotionMode, NODE_RADIUS, ParticleField};
use crate::sim::victory::{BOND_COLOR, Entanglement, POINT_COLORS, POINT_RADIUS, VictoryScene};

/// Size noise glyphs are drawn at
pub const NOISE_GLYPH_PX: f32 = 10.0;
/// Alpha noise glyphs are drawn with
pub const NOISE_ALPHA: f32 = 0.04;
/// Orbit ring stroke width in the victory animation
pub const RING_LINE_WIDTH: f32 = 1.0;
/// Bond stroke width between the two orbiting points
pub const BOND_LINE_WIDTH: f32 = 2.0;

/// Minimal immediate-mode 2D target
pub trait Surface {
    /// Drawable size in CSS pixels
    fn size(&self) -> (f32, f32);
    /// Erase to transparent
    fn clear(&mut self);
    /// Cover everything with a translucent fill (trail effect)
    fn fade(&mut self, color: Rgba);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba);
    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgba);
    /// Draw one character centered on `pos`
    fn fill_glyph(&mut self, glyph: char, pos: Vec2, size_px: f32, color: Rgba);
    fn stroke_ellipse(&mut self, center: Vec2, radii: Vec2, rotation: f32, width: f32, color: Rgba);
}

/// Draw one frame of a particle field
///
/// Does nothing while either the field or the surface has no area.
pub fn draw_field<S: Surface + ?Sized>(field: &ParticleField, surface: &mut S) {
    let (w, h) = surface.size();
    if !field.has_area() || w <= 0.0 || h <= 0.0 {
        return;
    }
    let config = field.config();
    match config.trail {
        Some(trail) => surface.fade(trail),
        None => surface.clear(),
    }

    let glyph_mode = config.glyphs.as_deref().is_some_and(|g| !g.is_empty())
        && config.mode != MotionMode::NodeGraph;

    for p in field.particles() {
        if p.noise {
            surface.fill_glyph(p.glyph, p.pos, NOISE_GLYPH_PX, Rgba::WHITE.with_alpha(NOISE_ALPHA));
            continue;
        }
        let color = config.tint.unwrap_or(p.color);
        if config.mode == MotionMode::NodeGraph {
            surface.fill_circle(p.pos, NODE_RADIUS, color);
        } else if glyph_mode {
            surface.fill_glyph(p.glyph, p.pos, p.radius, color);
        } else {
            surface.fill_circle(p.pos, p.radius, color);
        }
    }

    for link in field.links() {
        surface.stroke_line(
            link.from,
            link.to,
            config.link_width,
            config.link_color.with_alpha(link.alpha),
        );
    }
}

/// Draw the rings, points and bond of the entanglement orbit
pub fn draw_entanglement<S: Surface + ?Sized>(orbit: &Entanglement, surface: &mut S) {
    for ring in orbit.rings() {
        surface.stroke_ellipse(ring.center, ring.radii, ring.rotation, RING_LINE_WIDTH, ring.color);
    }
    let points = orbit.points();
    surface.stroke_line(points[0], points[1], BOND_LINE_WIDTH, BOND_COLOR);
    for (pos, color) in points.into_iter().zip(POINT_COLORS) {
        surface.fill_circle(pos, POINT_RADIUS, color);
    }
}

/// Victory canvas: node graph behind the orbit
pub fn draw_victory<S: Surface + ?Sized>(scene: &VictoryScene, surface: &mut S) {
    draw_field(&scene.field, surface);
    draw_entanglement(&scene.orbit, surface);
}
