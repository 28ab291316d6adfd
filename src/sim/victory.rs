//! Victory animation: node-graph particles behind an "entanglement" orbit

use glam::Vec2;

use super::field::{FieldConfig, MotionMode, ParticleField};
use crate::color::Rgba;
use crate::consts::VICTORY_CANVAS_SIZE;

/// Orbit phase advance per frame
pub const ORBIT_SPEED: f32 = 0.05;
/// Distance of each entangled point from the center
pub const ORBIT_RADIUS: f32 = 50.0;
/// Radius of each entangled point
pub const POINT_RADIUS: f32 = 6.0;

pub const RING_COLOR: Rgba = Rgba::rgb(147, 51, 234);
pub const BOND_COLOR: Rgba = Rgba::rgb(252, 211, 77);
pub const POINT_COLORS: [Rgba; 2] = [Rgba::rgb(236, 72, 153), Rgba::rgb(59, 130, 246)];

/// One of the three counter-rotating rings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ring {
    pub center: Vec2,
    pub radii: Vec2,
    pub rotation: f32,
    pub color: Rgba,
}

/// Two points orbiting a shared center, joined by a bond
#[derive(Debug, Clone, Default)]
pub struct Entanglement {
    /// Orbit phase (radians)
    pub t: f32,
}

impl Entanglement {
    pub fn center() -> Vec2 {
        Vec2::splat(VICTORY_CANVAS_SIZE / 2.0)
    }

    pub fn advance(&mut self) {
        self.t += ORBIT_SPEED;
    }

    pub fn rings(&self) -> [Ring; 3] {
        std::array::from_fn(|i| {
            let fi = i as f32;
            let dir = if i % 2 == 0 { 1.0 } else { -1.0 };
            Ring {
                center: Self::center(),
                radii: Vec2::new(60.0 + fi * 10.0, 30.0 + fi * 5.0),
                rotation: self.t * dir,
                color: RING_COLOR.with_alpha(0.5 - fi * 0.1),
            }
        })
    }

    /// The two entangled points, always diametrically opposite
    pub fn points(&self) -> [Vec2; 2] {
        let offset = Vec2::new(self.t.cos(), self.t.sin()) * ORBIT_RADIUS;
        let c = Self::center();
        [c + offset, c - offset]
    }
}

/// Everything animated during the victory phase
#[derive(Debug, Clone)]
pub struct VictoryScene {
    pub field: ParticleField,
    pub orbit: Entanglement,
}

impl VictoryScene {
    pub fn config() -> FieldConfig {
        FieldConfig {
            count: 36,
            palette: vec![RING_COLOR, POINT_COLORS[0], POINT_COLORS[1]],
            mode: MotionMode::NodeGraph,
            link_distance: Some(70.0),
            link_color: RING_COLOR,
            link_alpha: 0.3,
            speed: 1.0,
            radius: (1.0, 2.0),
            opacity: (0.4, 0.9),
            ..Default::default()
        }
    }

    pub fn new(seed: u64) -> Self {
        Self {
            field: ParticleField::new(Self::config(), VICTORY_CANVAS_SIZE, VICTORY_CANVAS_SIZE, seed),
            orbit: Entanglement::default(),
        }
    }

    /// One display frame
    pub fn advance(&mut self) {
        self.field.step();
        self.orbit.advance();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_are_opposite() {
        let mut orbit = Entanglement::default();
        for _ in 0..37 {
            orbit.advance();
            let [a, b] = orbit.points();
            assert!(((a + b) / 2.0 - Entanglement::center()).length() < 1e-3);
            assert!((a.distance(b) - 2.0 * ORBIT_RADIUS).abs() < 1e-3);
        }
    }

    #[test]
    fn test_rings_counter_rotate() {
        let mut orbit = Entanglement::default();
        orbit.advance();
        let rings = orbit.rings();
        assert!(rings[0].rotation > 0.0);
        assert!(rings[1].rotation < 0.0);
        assert!(rings[2].rotation > 0.0);
        assert!(rings[0].color.a > rings[2].color.a);
        assert_eq!(rings[2].radii, Vec2::new(80.0, 40.0));
    }

    #[test]
    fn test_scene_animates() {
        let mut scene = VictoryScene::new(3);
        assert_eq!(scene.field.len(), 36);
        let before = scene.field.particles()[0].pos;
        for _ in 0..10 {
            scene.advance();
        }
        assert!((scene.orbit.t - 0.5).abs() < 1e-5);
        assert_ne!(scene.field.particles()[0].pos, before);
    }
}
