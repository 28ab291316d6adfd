//! Recording surface for headless runs and tests

use glam::Vec2;

use super::Surface;
use crate::color::Rgba;

/// One recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Clear,
    Fade {
        color: Rgba,
    },
    Circle {
        center: Vec2,
        radius: f32,
        color: Rgba,
    },
    Line {
        from: Vec2,
        to: Vec2,
        width: f32,
        color: Rgba,
    },
    Glyph {
        glyph: char,
        pos: Vec2,
        size_px: f32,
        color: Rgba,
    },
    Ellipse {
        center: Vec2,
        radii: Vec2,
        rotation: f32,
        width: f32,
        color: Rgba,
    },
}

/// A surface that stores calls instead of drawing them
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    width: f32,
    height: f32,
    commands: Vec<DrawCmd>,
}

impl DrawList {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCmd] {
        &self.commands
    }

    /// Number of commands matching `pred`
    pub fn count(&self, pred: impl Fn(&DrawCmd) -> bool) -> usize {
        self.commands.iter().filter(|c| pred(c)).count()
    }

    /// Take the recorded frame, leaving the list empty
    pub fn take(&mut self) -> Vec<DrawCmd> {
        std::mem::take(&mut self.commands)
    }
}

impl Surface for DrawList {
    fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        self.commands.push(DrawCmd::Clear);
    }

    fn fade(&mut self, color: Rgba) {
        self.commands.push(DrawCmd::Fade { color });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        self.commands.push(DrawCmd::Circle {
            center,
            radius,
            color,
        });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgba) {
        self.commands.push(DrawCmd::Line {
            from,
            to,
            width,
            color,
        });
    }

    fn fill_glyph(&mut self, glyph: char, pos: Vec2, size_px: f32, color: Rgba) {
        self.commands.push(DrawCmd::Glyph {
            glyph,
            pos,
            size_px,
            color,
        });
    }

    fn stroke_ellipse(&mut self, center: Vec2, radii: Vec2, rotation: f32, width: f32, color: Rgba) {
        self.commands.push(DrawCmd::Ellipse {
            center,
            radii,
            rotation,
            width,
            color,
        });
    }
}
