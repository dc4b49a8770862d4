use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::fonts::TextMeasure;

pub const DEFAULT_FONT_FAMILY: &str = r#"JetBrains Mono, Consolas, "Courier New", monospace"#;

const SCALE: f32 = 2.0;
const FONT_SIZE: f32 = 14.0;
const LINE_HEIGHT: f32 = 1.5;
const MAX_CHARS_PER_LINE: usize = 120;
const PADDING: f32 = 24.0;
const BORDER_RADIUS: f32 = 12.0;
/// Advance of one monospace character relative to the font size, used when
/// no measurement is available.
const CHAR_WIDTH_RATIO: f32 = 0.6;
/// Reference glyph for measuring the character cell width.
const CHAR_WIDTH_PROBE: &str = "0";

/// User-facing rendering settings. Sizes are in unscaled pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    #[serde(default)]
    pub font_family: Option<String>,
    #[serde(default = "default_scale")]
    pub scale: f32,
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    #[serde(default = "default_line_height")]
    pub line_height: f32,
    #[serde(default = "default_max_chars_per_line")]
    pub max_chars_per_line: usize,
    #[serde(default = "default_padding")]
    pub padding: f32,
    #[serde(default = "default_border_radius")]
    pub border_radius: f32,
}

fn default_scale() -> f32 {
    SCALE
}
fn default_font_size() -> f32 {
    FONT_SIZE
}
fn default_line_height() -> f32 {
    LINE_HEIGHT
}
fn default_max_chars_per_line() -> usize {
    MAX_CHARS_PER_LINE
}
fn default_padding() -> f32 {
    PADDING
}
fn default_border_radius() -> f32 {
    BORDER_RADIUS
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            font_family: None,
            scale: SCALE,
            font_size: FONT_SIZE,
            line_height: LINE_HEIGHT,
            max_chars_per_line: MAX_CHARS_PER_LINE,
            padding: PADDING,
            border_radius: BORDER_RADIUS,
        }
    }
}

impl RenderConfig {
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))?;
        config.validated()
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse YAML: {}", e)))?;
        config.validated()
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse JSON: {}", e)))?;
        config.validated()
    }

    /// Loads a config file, picking the format from its extension. Files
    /// without a known extension are tried as TOML, then YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref() {
            Some("toml") => Self::from_toml(&content),
            Some("yaml" | "yml") => Self::from_yaml(&content),
            Some("json") => Self::from_json(&content),
            _ => Self::from_toml(&content).or_else(|_| Self::from_yaml(&content)),
        }
    }

    /// The configured family stack, or the built-in monospace stack when it
    /// is unset or blank.
    pub fn font_family(&self) -> &str {
        match self.font_family.as_deref().map(str::trim) {
            Some(family) if !family.is_empty() => family,
            _ => DEFAULT_FONT_FAMILY,
        }
    }

    pub fn validated(self) -> Result<Self> {
        let sizes = [
            ("scale", self.scale),
            ("font_size", self.font_size),
            ("line_height", self.line_height),
        ];
        for (name, value) in sizes {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::Config(format!("{} must be positive, got {}", name, value)));
            }
        }

        for (name, value) in [("padding", self.padding), ("border_radius", self.border_radius)] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Config(format!(
                    "{} must not be negative, got {}",
                    name, value
                )));
            }
        }

        if self.max_chars_per_line == 0 {
            return Err(Error::Config("max_chars_per_line must be at least 1".to_string()));
        }

        Ok(self)
    }
}

/// Pixel metrics for one render, with the scale factor already applied.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutMetrics {
    pub font_family: String,
    pub font_size: f32,
    pub line_height: f32,
    pub padding: f32,
    pub border_radius: f32,
    /// Width of one character cell. Reseeds continuation rows and offsets
    /// their indentation.
    pub char_width: f32,
    pub max_content_width: f32,
}

impl LayoutMetrics {
    /// Metrics using the estimated character width (`font_size × 0.6`).
    pub fn estimated(config: &RenderConfig) -> Self {
        let font_size = config.font_size * config.scale;
        Self::with_char_width(config, font_size * CHAR_WIDTH_RATIO)
    }

    /// Metrics whose character width comes from the measurer that will lay
    /// out and paint the text. Falls back to the estimate when the font
    /// reports no width.
    pub fn measured<T: TextMeasure>(config: &RenderConfig, measure: &mut T) -> Self {
        let font_size = config.font_size * config.scale;
        let probe = measure.measure_text(CHAR_WIDTH_PROBE, config.font_family(), font_size);
        let char_width = if probe.is_finite() && probe > 0.0 {
            probe
        } else {
            log::debug!("no width for probe glyph, estimating character width");
            font_size * CHAR_WIDTH_RATIO
        };
        Self::with_char_width(config, char_width)
    }

    fn with_char_width(config: &RenderConfig, char_width: f32) -> Self {
        let scale = config.scale;
        let font_size = config.font_size * scale;

        Self {
            font_family: config.font_family().to_string(),
            font_size,
            line_height: font_size * config.line_height,
            padding: config.padding * scale,
            border_radius: config.border_radius * scale,
            char_width,
            max_content_width: config.max_chars_per_line as f32 * char_width,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_FONT_FAMILY, LayoutMetrics, RenderConfig};
    use crate::fonts::{FixedAdvanceMeasure, TextMeasure};
    use std::io::Write;

    #[test]
    fn default_metrics_follow_scale() {
        let metrics = LayoutMetrics::estimated(&RenderConfig::default());
        assert_eq!(metrics.font_size, 28.0);
        assert_eq!(metrics.line_height, 42.0);
        assert_eq!(metrics.padding, 48.0);
        assert_eq!(metrics.border_radius, 24.0);
        assert!((metrics.char_width - 16.8).abs() < 1e-4);
        assert!((metrics.max_content_width - 2016.0).abs() < 1e-2);
        assert_eq!(metrics.font_family, DEFAULT_FONT_FAMILY);
    }

    #[test]
    fn measured_metrics_use_probe_width() {
        let mut measure = FixedAdvanceMeasure::new(0.5);
        let metrics = LayoutMetrics::measured(&RenderConfig::default(), &mut measure);
        assert_eq!(metrics.char_width, 14.0);
        assert_eq!(metrics.max_content_width, 1680.0);
    }

    #[test]
    fn measured_metrics_fall_back_without_fonts() {
        struct NoFonts;
        impl TextMeasure for NoFonts {
            fn measure_text(&mut self, _: &str, _: &str, _: f32) -> f32 {
                0.0
            }
        }

        let metrics = LayoutMetrics::measured(&RenderConfig::default(), &mut NoFonts);
        assert!((metrics.char_width - 16.8).abs() < 1e-4);
    }

    #[test]
    fn blank_font_family_uses_default_stack() {
        let config = RenderConfig {
            font_family: Some("   ".to_string()),
            ..RenderConfig::default()
        };
        assert_eq!(config.font_family(), DEFAULT_FONT_FAMILY);

        let config = RenderConfig {
            font_family: Some("Fira Code".to_string()),
            ..RenderConfig::default()
        };
        assert_eq!(config.font_family(), "Fira Code");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = RenderConfig::from_toml("font_size = 12.0\nmax_chars_per_line = 80\n")
            .expect("valid toml");
        assert_eq!(config.font_size, 12.0);
        assert_eq!(config.max_chars_per_line, 80);
        assert_eq!(config.scale, 2.0);
        assert_eq!(config.padding, 24.0);
    }

    #[test]
    fn yaml_and_json_are_accepted() {
        let yaml = RenderConfig::from_yaml("font_family: Hack\nscale: 1.0\n").expect("yaml");
        assert_eq!(yaml.font_family(), "Hack");
        assert_eq!(yaml.scale, 1.0);

        let json = RenderConfig::from_json(r#"{"padding": 10.0}"#).expect("json");
        assert_eq!(json.padding, 10.0);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(RenderConfig::from_toml("font_size = 0.0").is_err());
        assert!(RenderConfig::from_toml("scale = -1.0").is_err());
        assert!(RenderConfig::from_toml("max_chars_per_line = 0").is_err());
        assert!(RenderConfig::from_toml("padding = -2.0").is_err());
        assert!(RenderConfig::from_toml("font_size = \"big\"").is_err());
    }

    #[test]
    fn load_picks_format_from_extension() {
        let mut file = tempfile::Builder::new()
            .suffix(".yaml")
            .tempfile()
            .expect("temp file");
        writeln!(file, "max_chars_per_line: 60").expect("write config");

        let config = RenderConfig::load(file.path()).expect("load yaml");
        assert_eq!(config.max_chars_per_line, 60);
    }
}
