//! Site settings
//!
//! Read once at startup from an optional `<script type="application/json"
//! id="site-config">` block. Never written back.
//!
//! Page background overrides that fail to parse or validate are dropped with
//! a warning; the page keeps its built-in preset.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::consts::MAX_PARTICLES;
use crate::error::ConfigError;
use crate::pages::Page;
use crate::sim::field::{FieldConfig, MotionMode};

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Particle count multiplier
    pub fn particle_scale(&self) -> f32 {
        match self {
            QualityPreset::Low => 0.5,
            QualityPreset::Medium => 1.0,
            QualityPreset::High => 1.5,
        }
    }

    /// Whether connective edges are drawn at all
    pub fn links_enabled(&self) -> bool {
        match self {
            QualityPreset::Low => false,
            QualityPreset::Medium => true,
            QualityPreset::High => true,
        }
    }
}

/// Site settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Visual Effects ===
    /// Connective edges between particles
    pub links: bool,
    /// Translucent fills that leave motion trails
    pub trails: bool,

    // === Accessibility ===
    /// Reduced motion (no chaotic theme, no glitch flash)
    pub reduced_motion: bool,

    // === Page backgrounds ===
    /// Per-page field replacing the built-in preset
    #[serde(deserialize_with = "deserialize_backgrounds")]
    pub backgrounds: HashMap<Page, FieldConfig>,
}

/// Parse and check one background override
fn parse_background(value: serde_json::Value) -> Result<FieldConfig, ConfigError> {
    let config: FieldConfig = serde_json::from_value(value)?;
    config.validate()?;
    Ok(config)
}

fn deserialize_backgrounds<'de, D>(deserializer: D) -> Result<HashMap<Page, FieldConfig>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = HashMap::<Page, serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|(page, value)| match parse_background(value) {
            Ok(config) => Some((page, config)),
            Err(e) => {
                log::warn!("Ignoring {:?} background override: {}", page, e);
                None
            }
        })
        .collect())
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            links: true,
            trails: true,
            reduced_motion: false,
            backgrounds: HashMap::new(),
        }
    }
}

impl Settings {
    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Parse a settings block; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Effective edge switch (respects the preset)
    pub fn effective_links(&self) -> bool {
        self.links && self.quality.links_enabled()
    }

    /// Adjust a page preset to these settings
    pub fn apply(&self, config: &mut FieldConfig) {
        if config.count > 0 {
            let scaled = (config.count as f32 * self.quality.particle_scale()).round() as usize;
            config.count = scaled.clamp(1, MAX_PARTICLES);
        }
        if !self.effective_links() {
            config.link_distance = None;
        }
        if !self.trails {
            config.trail = None;
        }
        if self.reduced_motion && config.mode == MotionMode::Chaotic {
            config.mode = MotionMode::Drift;
        }
    }

    /// Background for `page`: the override if one loaded, else the preset
    pub fn page_config(&self, page: Page, viewport_width: f32) -> FieldConfig {
        let mut config = self
            .backgrounds
            .get(&page)
            .cloned()
            .unwrap_or_else(|| page.field_config(viewport_width));
        self.apply(&mut config);
        config
    }

    /// Element id of the settings block
    const CONFIG_ELEMENT_ID: &'static str = "site-config";

    /// Load settings from the page (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let json = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(Self::CONFIG_ELEMENT_ID))
            .and_then(|el| el.text_content());

        match json.as_deref().map(Self::from_json) {
            Some(Ok(settings)) => {
                log::info!("Loaded settings from #{}", Self::CONFIG_ELEMENT_ID);
                settings
            }
            Some(Err(e)) => {
                log::warn!("Ignoring #{}: {}", Self::CONFIG_ELEMENT_ID, e);
                Self::default()
            }
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Native: defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        log::info!("Using default settings (no #{})", Self::CONFIG_ELEMENT_ID);
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_partial() {
        let settings = Settings::from_json(r#"{"quality":"Low","reduced_motion":true}"#).unwrap();
        assert_eq!(settings.quality, QualityPreset::Low);
        assert!(settings.reduced_motion);
        assert!(settings.trails);
        assert!(!settings.effective_links());
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            Settings::from_json("{quality:"),
            Err(ConfigError::Json(_))
        ));
        assert!(Settings::from_json(r#"{"quality":"Ultra"}"#).is_err());
    }

    #[test]
    fn test_apply_low_preset() {
        let mut config = FieldConfig {
            count: 80,
            ..Default::default()
        };
        Settings::from_preset(QualityPreset::Low).apply(&mut config);
        assert_eq!(config.count, 40);
        assert!(!config.links_enabled());
    }

    #[test]
    fn test_apply_reduced_motion() {
        let mut config = FieldConfig {
            mode: MotionMode::Chaotic,
            trail: Some(crate::color::Rgba::rgba(0, 0, 0, 0.25)),
            ..Default::default()
        };
        let settings = Settings {
            reduced_motion: true,
            trails: false,
            ..Settings::default()
        };
        settings.apply(&mut config);
        assert_eq!(config.mode, MotionMode::Drift);
        assert_eq!(config.trail, None);
        assert_eq!(config.count, 80);
    }

    #[test]
    fn test_apply_high_preset() {
        let mut config = FieldConfig {
            count: 80,
            ..Default::default()
        };
        Settings::from_preset(QualityPreset::High).apply(&mut config);
        assert_eq!(config.count, 120);
        assert!(config.links_enabled());

        let mut config = FieldConfig {
            count: 250,
            ..Default::default()
        };
        Settings::from_preset(QualityPreset::High).apply(&mut config);
        assert_eq!(config.count, MAX_PARTICLES);
    }

    #[test]
    fn test_background_overrides() {
        let json = r##"{
            "backgrounds": {
                "About": {"count": 5000},
                "Contact": {"link_color": "blue"},
                "Projects": {"count": 20, "link_color": "#ff0000"}
            }
        }"##;
        let settings = Settings::from_json(json).unwrap();
        assert_eq!(settings.backgrounds.len(), 1);

        let projects = settings.page_config(Page::Projects, 1024.0);
        assert_eq!(projects.count, 20);
        assert_eq!(projects.link_color, crate::color::Rgba::rgb(255, 0, 0));

        // Rejected overrides fall back to the preset
        assert_eq!(
            settings.page_config(Page::About, 1024.0),
            Page::About.field_config(1024.0)
        );
        assert_eq!(
            settings.page_config(Page::Contact, 1024.0),
            Page::Contact.field_config(1024.0)
        );
    }

    #[test]
    fn test_parse_background_errors() {
        let over_cap = serde_json::json!({"count": MAX_PARTICLES + 1});
        assert!(matches!(
            parse_background(over_cap),
            Err(ConfigError::OutOfRange { field: "count", .. })
        ));

        let bad_color = serde_json::json!({"palette": ["#12345"]});
        let err = parse_background(bad_color).unwrap_err();
        assert!(err.to_string().contains("Invalid color '#12345'"), "{err}");
    }

    #[test]
    fn test_preset_names() {
        assert_eq!(QualityPreset::from_str("MED"), Some(QualityPreset::Medium));
        assert_eq!(QualityPreset::from_str(QualityPreset::High.as_str()), Some(QualityPreset::High));
        assert_eq!(QualityPreset::from_str("ultra"), None);
    }
}
