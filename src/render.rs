use crate::error::{PreviewError, Result};
use crate::layout::{AvatarLayout, DescriptionLayout, PreviewLayout, SignatureLayout, TitleLayout};
use crate::style::Rgba;
use image::RgbaImage;
use resvg::tiny_skia::{self, FillRule, FilterQuality, Paint, PathBuilder, Pixmap, SpreadMode, Transform};
use std::sync::Arc;
use usvg::fontdb::Database;

/// Fill color and font for one draw call. Every call gets its own pen; nothing
/// carries over between calls.
#[derive(Debug, Clone, Copy)]
pub struct Pen<'a> {
    pub fill: &'a str,
    pub family: &'a str,
    pub size: u32,
}

/// An SVG document under construction, rasterized once it is finished.
pub struct Scene {
    svg: String,
}

impl Scene {
    pub fn new(width: u32, height: u32) -> Self {
        let mut svg = String::new();
        svg.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" xml:space=\"preserve\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
        ));
        Self { svg }
    }

    pub fn fill_rect(&mut self, fill: &str, x: f32, y: f32, width: f32, height: f32) {
        let (color, opacity) = paint_attrs(fill);
        self.svg.push_str(&format!(
            "<rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{width:.2}\" height=\"{height:.2}\" fill=\"{color}\" fill-opacity=\"{opacity:.3}\"/>",
        ));
    }

    /// Draws `text` with its alphabetic baseline at `y`, starting at `x`.
    pub fn fill_text(&mut self, pen: &Pen<'_>, x: f32, y: f32, text: &str) {
        if text.is_empty() {
            return;
        }
        let (color, opacity) = paint_attrs(pen.fill);
        self.svg.push_str(&format!(
            "<text x=\"{x:.2}\" y=\"{y:.2}\" font-family=\"{}\" font-size=\"{}\" fill=\"{color}\" fill-opacity=\"{opacity:.3}\">{}</text>",
            escape_xml(pen.family),
            pen.size,
            escape_xml(text)
        ));
    }

    pub fn finish(mut self) -> String {
        self.svg.push_str("</svg>");
        self.svg
    }
}

/// Background, title and description: everything that does not wait on the avatar.
pub fn base_layer_svg(layout: &PreviewLayout) -> String {
    let mut scene = Scene::new(layout.width, layout.height);
    scene.fill_rect(
        &layout.background,
        0.0,
        0.0,
        layout.width as f32,
        layout.height as f32,
    );
    draw_title(&mut scene, &layout.title, &layout.font_family);
    draw_description(&mut scene, &layout.description, &layout.font_family);
    scene.finish()
}

pub fn signature_svg(layout: &PreviewLayout) -> String {
    let mut scene = Scene::new(layout.width, layout.height);
    draw_signature(&mut scene, &layout.signature, &layout.font_family);
    scene.finish()
}

fn draw_title(scene: &mut Scene, title: &TitleLayout, family: &str) {
    for segment in &title.segments {
        let pen = Pen {
            fill: &segment.color,
            family,
            size: title.font_size,
        };
        scene.fill_text(&pen, segment.x, title.baseline_y, &segment.text);
    }
}

fn draw_description(scene: &mut Scene, description: &DescriptionLayout, family: &str) {
    for line in &description.lines {
        let pen = Pen {
            fill: &description.color,
            family,
            size: description.font_size,
        };
        scene.fill_text(&pen, line.x, line.baseline_y, &line.text);
    }
}

fn draw_signature(scene: &mut Scene, signature: &SignatureLayout, family: &str) {
    let pen = Pen {
        fill: &signature.color,
        family,
        size: signature.font_size,
    };
    scene.fill_text(&pen, signature.x, signature.baseline_y, &signature.text);
}

/// The raster surface of one preview.
pub struct Canvas {
    pixmap: Pixmap,
    fonts: Arc<Database>,
}

impl Canvas {
    pub fn new(width: u32, height: u32, fonts: Arc<Database>) -> Result<Self> {
        let pixmap = Pixmap::new(width, height).ok_or(PreviewError::PixmapAlloc { width, height })?;
        Ok(Self { pixmap, fonts })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn paint_base(&mut self, layout: &PreviewLayout) -> Result<()> {
        self.paint_svg(&base_layer_svg(layout))
    }

    pub fn paint_signature(&mut self, layout: &PreviewLayout) -> Result<()> {
        self.paint_svg(&signature_svg(layout))
    }

    /// Scales `bitmap` into the avatar box and keeps only the part inside the circle.
    pub fn paint_avatar(&mut self, avatar: &AvatarLayout, bitmap: &RgbaImage) -> Result<()> {
        let source = bitmap_to_pixmap(bitmap)?;
        let scale_x = avatar.size / source.width() as f32;
        let scale_y = avatar.size / source.height() as f32;
        let shader = tiny_skia::Pattern::new(
            source.as_ref(),
            SpreadMode::Pad,
            FilterQuality::Bilinear,
            1.0,
            Transform::from_row(scale_x, 0.0, 0.0, scale_y, avatar.x, avatar.y),
        );
        let paint = Paint {
            shader,
            anti_alias: true,
            ..Paint::default()
        };
        self.fill_circle(avatar, &paint);
        Ok(())
    }

    pub fn paint_avatar_placeholder(&mut self, avatar: &AvatarLayout, color: &str) {
        let rgba = Rgba::parse(color).unwrap_or(Rgba { r: 0x96, g: 0x96, b: 0x96, a: 255 });
        let mut paint = Paint::default();
        paint.set_color(rgba.to_tiny_skia());
        paint.anti_alias = true;
        self.fill_circle(avatar, &paint);
    }

    pub fn encode_png(&self) -> Result<Vec<u8>> {
        self.pixmap
            .encode_png()
            .map_err(|err| PreviewError::PngEncode(err.to_string()))
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    fn fill_circle(&mut self, avatar: &AvatarLayout, paint: &Paint<'_>) {
        let Some(circle) = PathBuilder::from_circle(avatar.center_x, avatar.center_y, avatar.radius)
        else {
            return;
        };
        self.pixmap
            .fill_path(&circle, paint, FillRule::Winding, Transform::identity(), None);
    }

    fn paint_svg(&mut self, svg: &str) -> Result<()> {
        let options = usvg::Options {
            fontdb: self.fonts.clone(),
            ..Default::default()
        };
        let tree =
            usvg::Tree::from_str(svg, &options).map_err(|err| PreviewError::SvgParse(err.to_string()))?;
        resvg::render(&tree, Transform::identity(), &mut self.pixmap.as_mut());
        Ok(())
    }
}

fn bitmap_to_pixmap(bitmap: &RgbaImage) -> Result<Pixmap> {
    let (width, height) = bitmap.dimensions();
    if width == 0 || height == 0 {
        return Err(PreviewError::AvatarDecode("avatar bitmap is empty".to_string()));
    }
    let mut pixmap = Pixmap::new(width, height).ok_or(PreviewError::PixmapAlloc { width, height })?;
    for (dst, px) in pixmap.pixels_mut().iter_mut().zip(bitmap.pixels()) {
        let [r, g, b, a] = px.0;
        *dst = tiny_skia::ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Ok(pixmap)
}

fn paint_attrs(color: &str) -> (String, f32) {
    match Rgba::parse(color) {
        Some(rgba) => rgba.svg_paint(),
        None => (escape_xml(color), 1.0),
    }
}

fn escape_xml(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            ch if is_xml_char(ch) => out.push(ch),
            _ => out.push(char::REPLACEMENT_CHARACTER),
        }
    }
    out
}

/// XML 1.0 `Char` production; surrogates cannot occur in a Rust `char`.
fn is_xml_char(ch: char) -> bool {
    matches!(ch, '\t' | '\n' | '\r' | '\u{20}'..='\u{FFFD}' | '\u{10000}'..)
}
