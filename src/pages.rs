//! Site pages and their background presets

use serde::{Deserialize, Serialize};

use crate::color::Rgba;
use crate::sim::field::{FieldConfig, MotionMode};
use crate::sim::theme::QUANTUM_REALM;

/// Viewports narrower than this get the reduced Home field
pub const MOBILE_BREAKPOINT: f32 = 768.0;
/// Faint filler glyphs added to the Home field
pub const HOME_NOISE_COUNT: usize = 60;

/// Translucent page fill that leaves motion trails
const PAGE_TRAIL: Rgba = Rgba::rgba(2, 6, 23, 0.1);
const PURPLE: Rgba = Rgba::rgb(168, 85, 247);

/// A navigable page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Page {
    #[default]
    Home,
    About,
    Expertise,
    Projects,
    Contact,
}

impl Page {
    pub const ALL: [Page; 5] = [
        Page::Home,
        Page::About,
        Page::Expertise,
        Page::Projects,
        Page::Contact,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Page::Home => "/",
            Page::About => "/about",
            Page::Expertise => "/expertise",
            Page::Projects => "/projects",
            Page::Contact => "/contact",
        }
    }

    /// Resolve a location path; trailing slashes are ignored
    pub fn from_path(path: &str) -> Option<Page> {
        let trimmed = path.trim_end_matches('/');
        let path = if trimmed.is_empty() { "/" } else { trimmed };
        Page::ALL.into_iter().find(|p| p.path() == path)
    }

    /// Element id of the page's section in the site shell
    pub fn section_id(&self) -> &'static str {
        match self {
            Page::Home => "page-home",
            Page::About => "page-about",
            Page::Expertise => "page-expertise",
            Page::Projects => "page-projects",
            Page::Contact => "page-contact",
        }
    }

    /// Background field for this page at the given viewport width
    pub fn field_config(&self, viewport_width: f32) -> FieldConfig {
        match self {
            Page::Home => home_config(viewport_width),
            Page::About => FieldConfig {
                count: 100,
                palette: vec![
                    Rgba::rgb(0x8b, 0x5c, 0xf6),
                    Rgba::rgb(0x38, 0xbd, 0xf8),
                    Rgba::rgb(0xec, 0x48, 0x99),
                ],
                link_color: Rgba::rgb(139, 92, 246),
                ..content_page(0.5, 2.0)
            },
            Page::Expertise => FieldConfig {
                count: 80,
                palette: vec![
                    Rgba::rgb(0xa8, 0x55, 0xf7),
                    Rgba::rgb(0x14, 0xb8, 0xa6),
                    Rgba::rgb(0xf4, 0x3f, 0x5e),
                ],
                link_color: PURPLE,
                ..content_page(0.3, 2.0)
            },
            Page::Projects => FieldConfig {
                count: 80,
                palette: vec![
                    Rgba::rgb(0xa8, 0x55, 0xf7),
                    Rgba::rgb(0x3b, 0x82, 0xf6),
                    Rgba::rgb(0xec, 0x48, 0x99),
                ],
                link_color: PURPLE,
                ..content_page(0.4, 2.0)
            },
            Page::Contact => FieldConfig {
                count: 60,
                palette: vec![PURPLE],
                link_distance: None,
                ..content_page(0.2, 1.5)
            },
        }
    }
}

/// Shared shape of the content page fields: opaque circles over a trail
fn content_page(speed: f32, max_radius: f32) -> FieldConfig {
    FieldConfig {
        mode: MotionMode::Drift,
        link_distance: Some(100.0),
        link_alpha: 0.1,
        speed,
        radius: (0.0, max_radius),
        opacity: (1.0, 1.0),
        trail: Some(PAGE_TRAIL),
        ..Default::default()
    }
}

/// Home starts on the quantum theme; `ThemeCycle` restyles it from there
fn home_config(viewport_width: f32) -> FieldConfig {
    let base = if viewport_width < MOBILE_BREAKPOINT { 40 } else { 80 };
    let count = base + HOME_NOISE_COUNT;
    let theme = QUANTUM_REALM;
    FieldConfig {
        count,
        palette: vec![theme.primary],
        mode: theme.mode,
        link_distance: Some(120.0),
        link_color: theme.secondary,
        link_alpha: 0.15,
        link_width: 0.5,
        speed: 2.0,
        radius: (8.0, 20.0),
        opacity: (1.0, 1.0),
        trail: Some(theme.background.with_alpha(0.25)),
        glyphs: theme.glyphs.map(str::to_string),
        tint: Some(theme.primary.with_alpha(0.8)),
        noise_fraction: HOME_NOISE_COUNT as f32 / count as f32,
    }
}

/// The site-wide field behind the gate overlay
pub fn background_config() -> FieldConfig {
    FieldConfig {
        count: 80,
        palette: vec![Rgba::rgb(139, 92, 246)],
        link_distance: Some(100.0),
        link_color: Rgba::rgb(139, 92, 246),
        link_alpha: 0.1,
        speed: 0.5,
        radius: (1.0, 3.0),
        opacity: (0.2, 0.7),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_round_trip() {
        for page in Page::ALL {
            assert_eq!(Page::from_path(page.path()), Some(page));
        }
        assert_eq!(Page::from_path("/about/"), Some(Page::About));
        assert_eq!(Page::from_path(""), Some(Page::Home));
        assert_eq!(Page::from_path("/blog"), None);
    }

    #[test]
    fn test_presets_are_valid() {
        for page in Page::ALL {
            for width in [375.0, 1440.0] {
                let config = page.field_config(width);
                assert!(config.validate().is_ok(), "{page:?} at {width}");
            }
        }
        assert!(background_config().validate().is_ok());
    }

    #[test]
    fn test_home_scales_with_viewport() {
        assert_eq!(Page::Home.field_config(375.0).count, 100);
        assert_eq!(Page::Home.field_config(1024.0).count, 140);
        let home = Page::Home.field_config(1024.0);
        assert!((home.noise_fraction - 60.0 / 140.0).abs() < 1e-6);
        assert!(home.links_enabled());
    }

    #[test]
    fn test_contact_has_no_links() {
        let contact = Page::Contact.field_config(1024.0);
        assert!(!contact.links_enabled());
        assert_eq!(contact.radius, (0.0, 1.5));
        assert_eq!(contact.trail, Some(PAGE_TRAIL));
    }
}
