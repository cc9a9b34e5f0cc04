use crate::error::{PreviewError, Result};
use resvg::tiny_skia;
use serde::{Deserialize, Serialize};

/// Colors used to paint a preview. Every field is a CSS-style hex color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StyleConfig {
    pub background: String,
    pub username_color: String,
    pub repo_color: String,
    pub description_color: String,
    pub signature_color: String,
    /// Color of the `" / "` between owner and repository. Falls back to the
    /// description color.
    pub separator_color: Option<String>,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self::one_dark()
    }
}

impl StyleConfig {
    pub fn one_dark() -> Self {
        Self {
            background: "#282C34".to_string(),
            username_color: "#C778DD".to_string(),
            repo_color: "#98C379".to_string(),
            description_color: "#FFFFFF".to_string(),
            signature_color: "#969696".to_string(),
            separator_color: None,
        }
    }

    pub fn separator_color(&self) -> &str {
        self.separator_color
            .as_deref()
            .unwrap_or(self.description_color.as_str())
    }

    pub fn validate(&self) -> Result<()> {
        let mut fields = vec![
            ("background", self.background.as_str()),
            ("usernameColor", self.username_color.as_str()),
            ("repoColor", self.repo_color.as_str()),
            ("descriptionColor", self.description_color.as_str()),
            ("signatureColor", self.signature_color.as_str()),
        ];
        if let Some(separator) = self.separator_color.as_deref() {
            fields.push(("separatorColor", separator));
        }
        for (field, value) in fields {
            if Rgba::parse(value).is_none() {
                return Err(PreviewError::InvalidColor {
                    field,
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub fn parse(text: &str) -> Option<Self> {
        let hex = text.trim().strip_prefix('#')?;
        fn hex2(b: &[u8]) -> Option<u8> {
            let hi = (*b.first()? as char).to_digit(16)? as u8;
            let lo = (*b.get(1)? as char).to_digit(16)? as u8;
            Some((hi << 4) | lo)
        }
        fn hex1(c: u8) -> Option<u8> {
            let v = (c as char).to_digit(16)? as u8;
            Some((v << 4) | v)
        }

        let bytes = hex.as_bytes();
        match bytes.len() {
            3 => Some(Self {
                r: hex1(bytes[0])?,
                g: hex1(bytes[1])?,
                b: hex1(bytes[2])?,
                a: 255,
            }),
            6 => Some(Self {
                r: hex2(&bytes[0..2])?,
                g: hex2(&bytes[2..4])?,
                b: hex2(&bytes[4..6])?,
                a: 255,
            }),
            8 => Some(Self {
                r: hex2(&bytes[0..2])?,
                g: hex2(&bytes[2..4])?,
                b: hex2(&bytes[4..6])?,
                a: hex2(&bytes[6..8])?,
            }),
            _ => None,
        }
    }

    /// `fill` and `fill-opacity` attribute values.
    pub fn svg_paint(&self) -> (String, f32) {
        (
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b),
            self.a as f32 / 255.0,
        )
    }

    pub fn to_tiny_skia(self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }
}
