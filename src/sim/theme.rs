//! Home background theme rotation
//!
//! Every `THEME_PERIOD_MS` the Home field switches to the next theme, with a
//! short glitch flash on each switch. Both deadlines live in a [`TimerQueue`].

use super::field::{MotionMode, ParticleField};
use super::timer::TimerQueue;
use crate::color::Rgba;
use crate::consts::{THEME_GLITCH_MS, THEME_PERIOD_MS};

/// One look of the Home background
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    pub name: &'static str,
    pub mode: MotionMode,
    pub glyphs: Option<&'static str>,
    pub primary: Rgba,
    pub secondary: Rgba,
    pub background: Rgba,
}

impl Theme {
    /// Restyle `field` without reseeding it
    pub fn apply(&self, field: &mut ParticleField) {
        field.set_mode(self.mode, self.glyphs);
        field.set_style(
            Some(self.primary.with_alpha(0.8)),
            self.secondary,
            Some(self.background.with_alpha(0.25)),
        );
    }
}

pub const QUANTUM_REALM: Theme = Theme {
    name: "QUANTUM_REALM",
    mode: MotionMode::Drift,
    glyphs: Some("ΨΦΣπΩµ★●"),
    primary: Rgba::rgb(139, 92, 246),
    secondary: Rgba::rgb(56, 189, 248),
    background: Rgba::rgb(2, 6, 23),
};

pub const RED_ALERT: Theme = Theme {
    name: "RED_ALERT",
    mode: MotionMode::Chaotic,
    glyphs: Some("⚠⚡☠⛔ERROR"),
    primary: Rgba::rgb(239, 68, 68),
    secondary: Rgba::rgb(245, 158, 11),
    background: Rgba::rgb(25, 0, 0),
};

pub const MATRIX_CORE: Theme = Theme {
    name: "MATRIX_CORE",
    mode: MotionMode::MatrixRain,
    glyphs: Some("0101010101XYZ"),
    primary: Rgba::rgb(34, 197, 94),
    secondary: Rgba::rgb(16, 185, 129),
    background: Rgba::rgb(0, 20, 0),
};

pub const CYBER_VOID: Theme = Theme {
    name: "CYBER_VOID",
    mode: MotionMode::NodeGraph,
    glyphs: None,
    primary: Rgba::rgb(234, 179, 8),
    secondary: Rgba::rgb(255, 255, 255),
    background: Rgba::rgb(10, 10, 20),
};

pub const THEMES: [Theme; 4] = [QUANTUM_REALM, RED_ALERT, MATRIX_CORE, CYBER_VOID];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ThemeTimer {
    Switch,
    GlitchOff,
}

/// Rotation state for the Home background
#[derive(Debug, Clone)]
pub struct ThemeCycle {
    themes: Vec<Theme>,
    index: usize,
    glitch: bool,
    glitch_enabled: bool,
    switched_ms: f64,
    now_ms: f64,
    timers: TimerQueue<ThemeTimer>,
}

impl ThemeCycle {
    /// Start on the first theme at `now_ms`
    ///
    /// With `reduced_motion` the chaotic theme is skipped and switches do not
    /// glitch.
    pub fn new(now_ms: f64, reduced_motion: bool) -> Self {
        let themes: Vec<Theme> = THEMES
            .iter()
            .filter(|t| !(reduced_motion && t.mode == MotionMode::Chaotic))
            .copied()
            .collect();
        let mut timers = TimerQueue::new();
        timers.schedule(now_ms, THEME_PERIOD_MS, ThemeTimer::Switch);
        Self {
            themes,
            index: 0,
            glitch: false,
            glitch_enabled: !reduced_motion,
            switched_ms: now_ms,
            now_ms,
            timers,
        }
    }

    pub fn current(&self) -> &Theme {
        &self.themes[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn glitch(&self) -> bool {
        self.glitch
    }

    /// Fraction of the current period elapsed (0-1), for the progress bar
    pub fn progress(&self) -> f32 {
        ((self.now_ms - self.switched_ms) / THEME_PERIOD_MS).clamp(0.0, 1.0) as f32
    }

    /// Run due switches. Returns the new theme if it changed.
    pub fn advance(&mut self, now_ms: f64) -> Option<Theme> {
        self.now_ms = self.now_ms.max(now_ms);
        let mut switched = false;
        while let Some((_, due_ms, timer)) = self.timers.pop_due(self.now_ms) {
            match timer {
                ThemeTimer::Switch => {
                    self.index = (self.index + 1) % self.themes.len();
                    self.switched_ms = due_ms;
                    switched = true;
                    self.timers.schedule(due_ms, THEME_PERIOD_MS, ThemeTimer::Switch);
                    if self.glitch_enabled {
                        self.glitch = true;
                        self.timers.schedule(due_ms, THEME_GLITCH_MS, ThemeTimer::GlitchOff);
                    }
                    log::debug!("Theme: {}", self.current().name);
                }
                ThemeTimer::GlitchOff => self.glitch = false,
            }
        }
        switched.then(|| *self.current())
    }
}
