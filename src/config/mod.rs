//! @acp:module "Configuration"
//! @acp:summary "Inspector configuration loading and defaults"
//! @acp:domain cli
//! @acp:layer config

use serde::{Deserialize, Serialize};

use crate::hierarchy::DEFAULT_SIBLING_SCAN_LIMIT;

pub const DEFAULT_CONFIG_PATH: &str = ".inspector.config.json";

/// @acp:summary "Main inspector configuration structure"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Preceding siblings inspected per ancestor level
    #[serde(default = "default_sibling_scan_limit", rename = "siblingScanLimit")]
    pub sibling_scan_limit: usize,

    /// Overlay placement and measurement
    #[serde(default)]
    pub overlay: OverlayConfig,

    /// Reserved key chords
    #[serde(default)]
    pub keys: KeysConfig,

    /// On/off banner behaviour
    #[serde(default)]
    pub banner: BannerConfig,

    /// Viewport used by headless sessions
    #[serde(default)]
    pub viewport: ViewportConfig,

    /// Page patterns to include in scans (glob syntax)
    #[serde(default = "default_include")]
    pub include: Vec<String>,

    /// Page patterns to exclude from scans (glob syntax)
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sibling_scan_limit: default_sibling_scan_limit(),
            overlay: OverlayConfig::default(),
            keys: KeysConfig::default(),
            banner: BannerConfig::default(),
            viewport: ViewportConfig::default(),
            include: default_include(),
            exclude: default_exclude(),
        }
    }
}

impl Config {
    /// @acp:summary "Load config from a JSON file"
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// @acp:summary "Save config to a file"
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// @acp:summary "Load from default location or fall back to defaults"
    pub fn load_or_default() -> Self {
        Self::load(DEFAULT_CONFIG_PATH).unwrap_or_default()
    }

    /// Reject values the controller cannot work with
    pub fn validate(&self) -> crate::Result<()> {
        use crate::error::InspectorError;

        if self.viewport.width <= 0.0 || self.viewport.height <= 0.0 {
            return Err(InspectorError::Config(format!(
                "viewport must be positive, got {}x{}",
                self.viewport.width, self.viewport.height
            )));
        }
        if self.overlay.pointer_margin < 0.0 {
            return Err(InspectorError::Config(
                "overlay.pointerMargin must not be negative".to_string(),
            ));
        }
        crate::input::InputRouter::from_config(&self.keys)?;
        Ok(())
    }
}

fn default_sibling_scan_limit() -> usize {
    DEFAULT_SIBLING_SCAN_LIMIT
}

fn default_include() -> Vec<String> {
    vec!["**/*.html".to_string(), "**/*.htm".to_string()]
}

fn default_exclude() -> Vec<String> {
    vec![
        "**/node_modules/**".to_string(),
        "**/.git/**".to_string(),
    ]
}

/// @acp:summary "Overlay placement and headless measurement settings"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Gap between pointer and tooltip, also kept from the viewport edge
    #[serde(default = "default_pointer_margin", rename = "pointerMargin")]
    pub pointer_margin: f32,

    /// Left indentation per hierarchy level, in pixels
    #[serde(default = "default_indent_step", rename = "indentStep")]
    pub indent_step: u32,

    /// Pin hint offset from the pointer as `[dx, dy]`
    #[serde(default = "default_pin_hint_offset", rename = "pinHintOffset")]
    pub pin_hint_offset: [f32; 2],

    #[serde(default = "default_line_height", rename = "lineHeight")]
    pub line_height: f32,

    #[serde(default = "default_glyph_width", rename = "glyphWidth")]
    pub glyph_width: f32,

    #[serde(default = "default_padding")]
    pub padding: f32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            pointer_margin: default_pointer_margin(),
            indent_step: default_indent_step(),
            pin_hint_offset: default_pin_hint_offset(),
            line_height: default_line_height(),
            glyph_width: default_glyph_width(),
            padding: default_padding(),
        }
    }
}

fn default_pointer_margin() -> f32 {
    10.0
}

fn default_indent_step() -> u32 {
    16
}

fn default_pin_hint_offset() -> [f32; 2] {
    [15.0, -35.0]
}

fn default_line_height() -> f32 {
    18.0
}

fn default_glyph_width() -> f32 {
    7.0
}

fn default_padding() -> f32 {
    12.0
}

/// @acp:summary "Reserved key chords"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeysConfig {
    #[serde(default = "default_toggle_inspection", rename = "toggleInspection")]
    pub toggle_inspection: String,

    #[serde(default = "default_toggle_pin", rename = "togglePin")]
    pub toggle_pin: String,
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            toggle_inspection: default_toggle_inspection(),
            toggle_pin: default_toggle_pin(),
        }
    }
}

fn default_toggle_inspection() -> String {
    "Shift+Z".to_string()
}

fn default_toggle_pin() -> String {
    "Shift+A".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BannerConfig {
    #[serde(default = "default_dismiss_after_ms", rename = "dismissAfterMs")]
    pub dismiss_after_ms: u64,
}

impl Default for BannerConfig {
    fn default() -> Self {
        Self {
            dismiss_after_ms: default_dismiss_after_ms(),
        }
    }
}

fn default_dismiss_after_ms() -> u64 {
    2000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewportConfig {
    #[serde(default = "default_viewport_width")]
    pub width: f32,

    #[serde(default = "default_viewport_height")]
    pub height: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: default_viewport_width(),
            height: default_viewport_height(),
        }
    }
}

fn default_viewport_width() -> f32 {
    1280.0
}

fn default_viewport_height() -> f32 {
    800.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_json_uses_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.sibling_scan_limit, 100);
        assert_eq!(config.overlay.pointer_margin, 10.0);
        assert_eq!(config.overlay.indent_step, 16);
        assert_eq!(config.keys.toggle_pin, "Shift+A");
        assert_eq!(config.banner.dismiss_after_ms, 2000);
        assert_eq!(config.include, default_include());
    }

    #[test]
    fn test_partial_override() {
        let config: Config = serde_json::from_str(
            r#"{"siblingScanLimit": 5, "keys": {"togglePin": "Ctrl+P"}}"#,
        )
        .unwrap();
        assert_eq!(config.sibling_scan_limit, 5);
        assert_eq!(config.keys.toggle_pin, "Ctrl+P");
        assert_eq!(config.keys.toggle_inspection, "Shift+Z");
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(DEFAULT_CONFIG_PATH);

        let mut config = Config::default();
        config.viewport.width = 1024.0;
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.viewport.width, 1024.0);
    }

    #[test]
    fn test_load_rejects_bad_chord() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.json");
        std::fs::write(&path, r#"{"keys": {"toggleInspection": "Hyper+Q"}}"#).unwrap();

        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_load_rejects_shadowed_pin_chord() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("shadowed.json");
        std::fs::write(
            &path,
            r#"{"keys": {"toggleInspection": "Shift+Z", "togglePin": "Ctrl+Shift+Z"}}"#,
        )
        .unwrap();

        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_validate_viewport() {
        let mut config = Config::default();
        config.viewport.height = 0.0;
        assert!(config.validate().is_err());
    }
}
