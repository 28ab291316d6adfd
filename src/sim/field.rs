//! Particle field simulation
//!
//! One configurable engine behind every page background. The field owns its
//! particles and RNG; drawing is done by `renderer::draw_field`.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::color::Rgba;
use crate::consts::MAX_PARTICLES;
use crate::error::ConfigError;
use crate::wrap_coord;

/// How particles move each step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MotionMode {
    /// Constant velocity drift
    #[default]
    Drift,
    /// Fast fall, respawning at the top on a 20 px column grid
    MatrixRain,
    /// Large random jitter every step
    Chaotic,
    /// Half-speed drift drawn as small nodes
    NodeGraph,
}

impl MotionMode {
    /// Whether connective edges are drawn in this mode
    pub fn supports_links(&self) -> bool {
        matches!(self, MotionMode::Drift | MotionMode::NodeGraph)
    }
}

/// Downward speed of matrix rain (px per step)
pub const RAIN_SPEED: f32 = 8.0;
/// Column grid matrix rain respawns on
pub const RAIN_COLUMN: f32 = 20.0;
/// Half-range of chaotic jitter (px per step, per axis)
pub const CHAOS_JITTER: f32 = 7.5;
/// Drift multiplier for node graphs
pub const NODE_SPEED: f32 = 0.5;
/// Radius nodes are drawn with
pub const NODE_RADIUS: f32 = 3.0;
/// Noise glyphs fall this fast (px per step)
pub const NOISE_FALL: f32 = 0.5;
/// Chance per step a noise glyph changes character
pub const NOISE_REROLL: f32 = 0.01;
/// Characters noise particles cycle through
pub const NOISE_GLYPHS: &str = "QWERYUIOPASDFGHJKLZXCVBNM1234567890@#$%&";

/// Parameters of a particle field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Number of particles (clamped to `MAX_PARTICLES`)
    pub count: usize,
    /// Colors particles pick from at creation
    pub palette: Vec<Rgba>,
    pub mode: MotionMode,
    /// Edge threshold in px; `None` disables edges
    pub link_distance: Option<f32>,
    /// Edge color (alpha ignored)
    pub link_color: Rgba,
    /// Edge alpha at distance zero; falls off linearly to 0 at the threshold
    pub link_alpha: f32,
    /// Edge stroke width in px
    pub link_width: f32,
    /// Velocity components are uniform in `[-speed/2, speed/2)`
    pub speed: f32,
    /// Radius range (glyph size in glyph modes)
    pub radius: (f32, f32),
    /// Per-particle opacity range
    pub opacity: (f32, f32),
    /// Translucent fill drawn instead of a clear (trail effect)
    pub trail: Option<Rgba>,
    /// Glyph set; particles are drawn as characters when non-empty
    pub glyphs: Option<String>,
    /// Draw-time color override for every non-noise particle
    pub tint: Option<Rgba>,
    /// Share of particles that are faint falling filler glyphs
    pub noise_fraction: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            count: 80,
            palette: vec![Rgba::rgb(139, 92, 246)],
            mode: MotionMode::Drift,
            link_distance: Some(100.0),
            link_color: Rgba::rgb(139, 92, 246),
            link_alpha: 0.1,
            link_width: 1.0,
            speed: 0.5,
            radius: (1.0, 3.0),
            opacity: (0.2, 0.7),
            trail: None,
            glyphs: None,
            tint: None,
            noise_fraction: 0.0,
        }
    }
}

impl FieldConfig {
    /// Check values coming from external configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let check = |field: &'static str, value: f32, ok: bool| {
            if ok && value.is_finite() {
                Ok(())
            } else {
                Err(ConfigError::OutOfRange { field, value })
            }
        };
        if let Some(d) = self.link_distance {
            check("link_distance", d, d > 0.0)?;
        }
        check("link_alpha", self.link_alpha, (0.0..=1.0).contains(&self.link_alpha))?;
        check("speed", self.speed, self.speed >= 0.0)?;
        check("radius", self.radius.0, self.radius.0 >= 0.0 && self.radius.0 <= self.radius.1)?;
        check("opacity", self.opacity.0, self.opacity.0 >= 0.0 && self.opacity.1 <= 1.0)?;
        check(
            "noise_fraction",
            self.noise_fraction,
            (0.0..=1.0).contains(&self.noise_fraction),
        )?;
        if self.count > MAX_PARTICLES {
            return Err(ConfigError::OutOfRange {
                field: "count",
                value: self.count as f32,
            });
        }
        Ok(())
    }

    /// Clamp into a usable config (never fails)
    fn sanitized(mut self) -> Self {
        self.count = self.count.min(MAX_PARTICLES);
        if self.palette.is_empty() {
            self.palette.push(Rgba::WHITE);
        }
        if self.link_distance.is_some_and(|d| !(d > 0.0 && d.is_finite())) {
            self.link_distance = None;
        }
        self.link_alpha = self.link_alpha.clamp(0.0, 1.0);
        if !(self.link_width > 0.0 && self.link_width.is_finite()) {
            self.link_width = 1.0;
        }
        self.speed = if self.speed.is_finite() { self.speed.max(0.0) } else { 0.0 };
        self.radius.0 = self.radius.0.max(0.0);
        self.radius.1 = self.radius.1.max(self.radius.0);
        self.opacity.0 = self.opacity.0.clamp(0.0, 1.0);
        self.opacity.1 = self.opacity.1.clamp(self.opacity.0, 1.0);
        self.noise_fraction = self.noise_fraction.clamp(0.0, 1.0);
        self
    }

    /// Whether edges are drawn for the current mode
    pub fn links_enabled(&self) -> bool {
        self.link_distance.is_some() && self.mode.supports_links()
    }
}

/// A simulated point
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    /// Fixed at creation
    pub vel: Vec2,
    /// Fixed at creation
    pub radius: f32,
    /// Fixed at creation (alpha includes the opacity roll)
    pub color: Rgba,
    /// Current character in glyph modes
    pub glyph: char,
    /// Faint filler glyph, excluded from edges
    pub noise: bool,
}

/// A connective edge between two particles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    pub from: Vec2,
    pub to: Vec2,
    /// 0-1, higher for closer pairs
    pub alpha: f32,
}

fn pick_glyph<R: Rng>(set: &[char], rng: &mut R) -> Option<char> {
    if set.is_empty() {
        None
    } else {
        Some(set[rng.random_range(0..set.len())])
    }
}

fn lerp(range: (f32, f32), t: f32) -> f32 {
    range.0 + (range.1 - range.0) * t
}

/// A batch of particles moving inside a `width × height` surface
#[derive(Debug, Clone)]
pub struct ParticleField {
    config: FieldConfig,
    glyphs: Vec<char>,
    noise_glyphs: Vec<char>,
    width: f32,
    height: f32,
    /// Extent the particle positions currently refer to (last valid size)
    extent: Vec2,
    particles: Vec<Particle>,
    rng: Pcg32,
}

impl ParticleField {
    /// Create a field. A zero-size field stays empty until resized.
    pub fn new(config: FieldConfig, width: f32, height: f32, seed: u64) -> Self {
        let config = config.sanitized();
        let glyphs = config.glyphs.as_deref().unwrap_or("").chars().collect();
        let mut field = Self {
            config,
            glyphs,
            noise_glyphs: NOISE_GLYPHS.chars().collect(),
            width: 0.0,
            height: 0.0,
            extent: Vec2::ZERO,
            particles: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
        };
        field.resize(width, height);
        field
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn mode(&self) -> MotionMode {
        self.config.mode
    }

    /// True when the surface has been laid out
    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Track a new surface size
    ///
    /// The first valid size seeds the batch; later sizes rescale existing
    /// positions so the distribution is kept and everything stays in bounds.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        if !self.has_area() {
            return;
        }
        let new_extent = Vec2::new(width, height);
        if self.particles.is_empty() {
            self.seed_batch();
        } else if self.extent != new_extent {
            let scale = new_extent / self.extent;
            for p in &mut self.particles {
                p.pos.x = wrap_coord(p.pos.x * scale.x, width);
                p.pos.y = wrap_coord(p.pos.y * scale.y, height);
            }
        }
        self.extent = new_extent;
    }

    fn seed_batch(&mut self) {
        let Self {
            config,
            glyphs,
            noise_glyphs,
            width,
            height,
            particles,
            rng,
            ..
        } = self;
        particles.clear();
        particles.reserve(config.count);
        for _ in 0..config.count {
            let pos = Vec2::new(rng.random::<f32>() * *width, rng.random::<f32>() * *height);
            let vel = Vec2::new(
                (rng.random::<f32>() - 0.5) * config.speed,
                (rng.random::<f32>() - 0.5) * config.speed,
            );
            let radius = lerp(config.radius, rng.random());
            let base = config.palette[rng.random_range(0..config.palette.len())];
            let color = base.fade(lerp(config.opacity, rng.random()));
            let noise = rng.random::<f32>() < config.noise_fraction;
            let glyph = if noise {
                pick_glyph(noise_glyphs, rng)
            } else {
                pick_glyph(glyphs, rng)
            }
            .unwrap_or('0');
            particles.push(Particle {
                pos: Vec2::new(wrap_coord(pos.x, *width), wrap_coord(pos.y, *height)),
                vel,
                radius,
                color,
                glyph,
                noise,
            });
        }
        log::debug!(
            "Seeded {} particles ({:?}) in {}x{}",
            particles.len(),
            config.mode,
            width,
            height
        );
    }

    /// Switch motion rule and glyph set without reseeding
    pub fn set_mode(&mut self, mode: MotionMode, glyphs: Option<&str>) {
        self.config.mode = mode;
        self.config.glyphs = glyphs.map(str::to_string);
        self.glyphs = glyphs.unwrap_or("").chars().collect();
    }

    /// Replace draw-only styling (tint, edges, trail)
    pub fn set_style(&mut self, tint: Option<Rgba>, link_color: Rgba, trail: Option<Rgba>) {
        self.config.tint = tint;
        self.config.link_color = link_color;
        self.config.trail = trail;
    }

    /// Advance every particle by one step
    pub fn step(&mut self) {
        if !self.has_area() {
            return;
        }
        let Self {
            config,
            glyphs,
            noise_glyphs,
            width,
            height,
            particles,
            rng,
            ..
        } = self;
        let (w, h) = (*width, *height);

        for p in particles.iter_mut() {
            if p.noise {
                p.pos.y += NOISE_FALL;
                if rng.random::<f32>() < NOISE_REROLL {
                    if let Some(g) = pick_glyph(noise_glyphs, rng) {
                        p.glyph = g;
                    }
                }
            } else {
                match config.mode {
                    MotionMode::Drift => {
                        p.pos += p.vel;
                    }
                    MotionMode::MatrixRain => {
                        p.pos.y += RAIN_SPEED;
                        if p.pos.y >= h {
                            p.pos.y = 0.0;
                            p.pos.x = (rng.random::<f32>() * w / RAIN_COLUMN).floor() * RAIN_COLUMN;
                        }
                    }
                    MotionMode::Chaotic => {
                        p.pos.x += (rng.random::<f32>() - 0.5) * 2.0 * CHAOS_JITTER;
                        p.pos.y += (rng.random::<f32>() - 0.5) * 2.0 * CHAOS_JITTER;
                    }
                    MotionMode::NodeGraph => {
                        p.pos += p.vel * NODE_SPEED;
                    }
                }
                if config.mode != MotionMode::NodeGraph {
                    if let Some(g) = pick_glyph(glyphs, rng) {
                        p.glyph = g;
                    }
                }
            }
            p.pos.x = wrap_coord(p.pos.x, w);
            p.pos.y = wrap_coord(p.pos.y, h);
        }
    }

    /// Edges between every non-noise pair closer than the link distance
    ///
    /// O(n²); `MAX_PARTICLES` keeps this bounded.
    pub fn links(&self) -> Vec<Link> {
        let Some(threshold) = self.config.link_distance else {
            return Vec::new();
        };
        if !self.config.mode.supports_links() || !self.has_area() {
            return Vec::new();
        }
        let max_alpha = self.config.link_alpha;
        let threshold_sq = threshold * threshold;
        let mut links = Vec::new();
        for (i, a) in self.particles.iter().enumerate() {
            if a.noise {
                continue;
            }
            for b in &self.particles[i + 1..] {
                if b.noise {
                    continue;
                }
                let dist_sq = a.pos.distance_squared(b.pos);
                if dist_sq < threshold_sq {
                    let dist = dist_sq.sqrt();
                    links.push(Link {
                        from: a.pos,
                        to: b.pos,
                        alpha: max_alpha * (1.0 - dist / threshold),
                    });
                }
            }
        }
        links
    }
}
