//! Screen configuration: which elements a display shows and how.
//!
//! A screen carries one layout per content kind plus shared settings
//! for the clock, the next-item preview and slide transitions. Configs
//! deserialize from JSON (and TOML with the `toml` feature) with every
//! field optional, so a config file only states what it overrides.

use serde::{Deserialize, Serialize};

use crate::color::{parse_color, Rgb};
use crate::content::ContentKind;
use crate::layout::{Constraints, SizeSpec};
use crate::style::TextStyle;

/// The slot an element occupies on screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ElementRole {
    /// Primary text: lyrics, the passage, the announcement body.
    Main,
    /// Secondary body text shown alongside the main text.
    Content,
    /// Attribution line such as "John 3:16".
    Reference,
    /// Speaker or author name.
    Person,
    /// Wall clock.
    Clock,
    /// Preview of the upcoming item.
    NextPreview,
}

/// Placement and styling for one on-screen element.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ElementConfig {
    pub constraints: Constraints,
    pub size: SizeSpec,
    pub style: TextStyle,
}

/// Element configs for the roles one content kind can populate.
///
/// `main` always exists; the optional roles render only when both the
/// config and the content provide them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoleLayout {
    pub main: ElementConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<ElementConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<ElementConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub person: Option<ElementConfig>,
}

/// Wall clock settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClockConfig {
    pub enabled: bool,
    pub twenty_four_hour: bool,
    pub show_seconds: bool,
    pub element: ElementConfig,
}

impl Default for ClockConfig {
    fn default() -> Self {
        ClockConfig {
            enabled: false,
            twenty_four_hour: true,
            show_seconds: true,
            element: ElementConfig::default(),
        }
    }
}

/// Next-item preview settings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NextPreviewConfig {
    pub enabled: bool,
    pub element: ElementConfig,
}

/// Transition durations in milliseconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransitionConfig {
    pub enter_ms: u32,
    pub exit_ms: u32,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        TransitionConfig { enter_ms: 500, exit_ms: 500 }
    }
}

/// Full configuration for one display screen.
///
/// ## Example
///
/// ```rust
/// use versecast_core_display::ScreenConfig;
///
/// let config: ScreenConfig = serde_json::from_str(
///     r#"{ "clock": { "enabled": true, "showSeconds": false } }"#,
/// ).unwrap();
/// assert!(config.clock.enabled);
/// assert!(!config.clock.show_seconds);
/// assert!(config.clock.twenty_four_hour);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScreenConfig {
    pub song: RoleLayout,
    pub scripture: RoleLayout,
    pub announcement: RoleLayout,
    pub clock: ClockConfig,
    pub next_preview: NextPreviewConfig,
    pub transition: TransitionConfig,
    /// Color applied to highlighted segments that carry no color of
    /// their own, as a CSS color string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_highlight_color: Option<String>,
}

impl ScreenConfig {
    /// Get the role layout used for a given content kind.
    #[inline]
    pub fn layout_for(&self, kind: ContentKind) -> &RoleLayout {
        match kind {
            ContentKind::Song => &self.song,
            ContentKind::Scripture => &self.scripture,
            ContentKind::Announcement => &self.announcement,
        }
    }

    /// Parsed default highlight color, if one is configured and valid.
    pub fn default_highlight(&self) -> Option<Rgb> {
        let raw = self.default_highlight_color.as_deref()?;
        let color = parse_color(raw);
        if color.is_none() {
            log::warn!("ignoring unparseable default highlight color {raw:?}");
        }
        color
    }

    /// Parse a screen configuration from a TOML document.
    ///
    /// Keys follow the same camelCase names as the JSON form.
    #[cfg(feature = "toml")]
    pub fn from_toml_str(input: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(input)
    }
}
