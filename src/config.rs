use crate::style::StyleConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Output size and fixed placement of every preview element, in pixels.
pub mod geometry {
    pub const CANVAS_WIDTH: u32 = 1280;
    pub const CANVAS_HEIGHT: u32 = 640;
    pub const PADDING_X: f32 = 50.0;
    pub const TITLE_BASELINE: f32 = 150.0;
    /// Gap between the title baseline plus title size and the first description baseline.
    pub const DESCRIPTION_OFFSET: f32 = 25.0;
    /// Space kept free below the title when computing the description budget.
    pub const DESCRIPTION_TOP_RESERVE: f32 = 20.0;
    /// Space kept free at the bottom for the avatar and signature.
    pub const DESCRIPTION_BOTTOM_RESERVE: f32 = 130.0;
    pub const AVATAR_RADIUS: f32 = 25.0;
    pub const AVATAR_X: f32 = 50.0;
    pub const AVATAR_BOTTOM_OFFSET: f32 = 100.0;
    pub const SIGNATURE_BOTTOM_OFFSET: f32 = 130.0;

    pub fn content_width() -> f32 {
        CANVAS_WIDTH as f32 - 2.0 * PADDING_X
    }
}

/// What to do when the title does not fit even at its minimum size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TitleOverflow {
    /// Keep the minimum size and let the title run past the padding.
    #[default]
    Allow,
    /// Keep the minimum size and shorten the title with a trailing ellipsis.
    Ellipsis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FontSettings {
    pub family: String,
    pub title_size: u32,
    pub title_min_size: u32,
    pub description_size: u32,
    /// Exclusive lower bound of the description search; used as-is when nothing fits.
    pub description_floor: u32,
    pub signature_size: u32,
    pub line_spacing: f32,
    pub title_overflow: TitleOverflow,
}

impl Default for FontSettings {
    fn default() -> Self {
        Self {
            family: "'Tektur', sans-serif".to_string(),
            title_size: 60,
            title_min_size: 10,
            description_size: 40,
            description_floor: 10,
            signature_size: 35,
            line_spacing: 10.0,
            title_overflow: TitleOverflow::Allow,
        }
    }
}

impl FontSettings {
    /// Rejects sizes that leave a fit search empty or draw zero-size text.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.title_min_size == 0 {
            anyhow::bail!("fonts.titleMinSize must be at least 1");
        }
        if self.title_min_size > self.title_size {
            anyhow::bail!(
                "fonts.titleMinSize ({}) must not exceed fonts.titleSize ({})",
                self.title_min_size,
                self.title_size
            );
        }
        if self.description_size == 0 {
            anyhow::bail!("fonts.descriptionSize must be at least 1");
        }
        if self.description_floor >= self.description_size {
            anyhow::bail!(
                "fonts.descriptionFloor ({}) must be below fonts.descriptionSize ({})",
                self.description_floor,
                self.description_size
            );
        }
        if self.signature_size == 0 {
            anyhow::bail!("fonts.signatureSize must be at least 1");
        }
        if !self.line_spacing.is_finite() || self.line_spacing < 0.0 {
            anyhow::bail!("fonts.lineSpacing must be a non-negative number, got {}", self.line_spacing);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvatarFallback {
    /// Surface the decode failure to the caller.
    #[default]
    Fail,
    /// Paint a disc in the signature color and finish the preview.
    Placeholder,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AvatarSettings {
    pub fallback: AvatarFallback,
    /// No timeout when unset; a hung decode keeps the request pending.
    pub decode_timeout_ms: Option<u64>,
}

impl AvatarSettings {
    pub fn decode_timeout(&self) -> Option<Duration> {
        self.decode_timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PreviewConfig {
    pub style: StyleConfig,
    pub fonts: FontSettings,
    pub avatar: AvatarSettings,
}

/// Load a config file (JSON or JSON5). Missing keys keep their defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<PreviewConfig> {
    let Some(path) = path else {
        return Ok(PreviewConfig::default());
    };

    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<PreviewConfig> {
    let config: PreviewConfig = json5::from_str(contents)?;
    config.style.validate()?;
    config.fonts.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_yields_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config, PreviewConfig::default());
        assert_eq!(config.fonts.title_size, 60);
        assert_eq!(config.fonts.description_size, 40);
        assert_eq!(config.fonts.description_floor, 10);
    }

    #[test]
    fn partial_json5_overrides_keep_other_defaults() {
        let config = parse_config(
            r##"{
                // comments are fine
                style: { background: "#000000", separatorColor: "#C778DD" },
                fonts: { titleOverflow: "ellipsis" },
                avatar: { fallback: "placeholder", decodeTimeoutMs: 250 },
            }"##,
        )
        .unwrap();
        assert_eq!(config.style.background, "#000000");
        assert_eq!(config.style.repo_color, "#98C379");
        assert_eq!(config.style.separator_color(), "#C778DD");
        assert_eq!(config.fonts.title_overflow, TitleOverflow::Ellipsis);
        assert_eq!(config.fonts.family, "'Tektur', sans-serif");
        assert_eq!(config.avatar.fallback, AvatarFallback::Placeholder);
        assert_eq!(config.avatar.decode_timeout(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn rejects_invalid_colors() {
        let err = parse_config(r#"{ "style": { "background": "dark" } }"#).unwrap_err();
        assert!(err.to_string().contains("background"), "{err}");
    }

    #[test]
    fn rejects_zero_title_min_size() {
        let err = parse_config("{ fonts: { titleMinSize: 0 } }").unwrap_err();
        assert!(err.to_string().contains("titleMinSize"), "{err}");
    }

    #[test]
    fn rejects_zero_description_size() {
        let err = parse_config("{ fonts: { descriptionSize: 0, descriptionFloor: 0 } }").unwrap_err();
        assert!(err.to_string().contains("descriptionSize must be at least 1"), "{err}");
    }

    #[test]
    fn rejects_description_floor_at_or_above_size() {
        let err = parse_config("{ fonts: { descriptionSize: 10, descriptionFloor: 10 } }").unwrap_err();
        assert!(err.to_string().contains("descriptionFloor"), "{err}");
        assert!(parse_config("{ fonts: { descriptionSize: 11, descriptionFloor: 10 } }").is_ok());
    }

    #[test]
    fn rejects_zero_signature_size() {
        let err = parse_config("{ fonts: { signatureSize: 0 } }").unwrap_err();
        assert!(err.to_string().contains("signatureSize"), "{err}");
    }

    #[test]
    fn rejects_negative_line_spacing() {
        let err = parse_config("{ fonts: { lineSpacing: -4 } }").unwrap_err();
        assert!(err.to_string().contains("lineSpacing"), "{err}");
        assert!(parse_config("{ fonts: { lineSpacing: 0 } }").is_ok());
    }

    #[test]
    fn content_width_excludes_padding() {
        assert_eq!(geometry::content_width(), 1180.0);
    }
}
