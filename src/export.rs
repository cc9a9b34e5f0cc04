use crate::error::Result;
use crate::render::Canvas;
use base64::Engine as _;
use std::path::Path;

pub const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// A finished, published preview. The raster it came from is no longer reachable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub png: Vec<u8>,
    pub filename: String,
    pub width: u32,
    pub height: u32,
}

impl Preview {
    pub fn from_canvas(canvas: Canvas, filename: String) -> Result<Self> {
        let png = canvas.encode_png()?;
        Ok(Self {
            png,
            filename,
            width: canvas.width(),
            height: canvas.height(),
        })
    }

    pub fn data_uri(&self) -> String {
        let mut uri = String::with_capacity(
            PNG_DATA_URI_PREFIX.len() + base64::encoded_len(self.png.len(), true).unwrap_or_default(),
        );
        uri.push_str(PNG_DATA_URI_PREFIX);
        base64::engine::general_purpose::STANDARD.encode_string(&self.png, &mut uri);
        uri
    }

    /// Writes the PNG to `path`, or to `path/<filename>` when `path` is a directory.
    pub fn write_to(&self, path: &Path) -> Result<std::path::PathBuf> {
        let target = if path.is_dir() {
            path.join(&self.filename)
        } else {
            path.to_path_buf()
        };
        std::fs::write(&target, &self.png)?;
        Ok(target)
    }
}
