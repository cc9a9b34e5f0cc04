use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use ttf_parser::Face;
use usvg::fontdb::{Database, Family, Query, Stretch, Style, Weight};

static SYSTEM_FONTS: Lazy<Arc<Database>> = Lazy::new(|| {
    let mut db = Database::new();
    db.load_system_fonts();
    log::debug!("loaded {} system font faces", db.len());
    Arc::new(db)
});

/// Process-wide system font database, loaded on first use and never mutated.
pub fn system_font_database() -> Arc<Database> {
    SYSTEM_FONTS.clone()
}

/// System fonts plus every font file found under `dirs`.
pub fn font_database_with_dirs<P: AsRef<Path>>(dirs: &[P]) -> Arc<Database> {
    if dirs.is_empty() {
        return system_font_database();
    }
    let mut db = Database::clone(&SYSTEM_FONTS);
    for dir in dirs {
        db.load_fonts_dir(dir.as_ref());
    }
    Arc::new(db)
}

/// A CSS-like font descriptor: a family list such as `'Tektur', sans-serif` and a pixel size.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    pub family: String,
    pub size: f32,
}

impl FontSpec {
    pub fn new(family: impl Into<String>, size: u32) -> Self {
        Self {
            family: family.into(),
            size: size as f32,
        }
    }
}

/// Width oracle used by every fitting algorithm. Must return the same value
/// for the same inputs for the lifetime of a render.
pub trait TextMeasure: Send + Sync {
    fn measure(&self, text: &str, font: &FontSpec) -> f32;
}

/// Font-free measurement from a calibrated per-character width table.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackMetrics;

impl TextMeasure for FallbackMetrics {
    fn measure(&self, text: &str, font: &FontSpec) -> f32 {
        fallback_text_width(text, font.size)
    }
}

pub fn fallback_text_width(text: &str, font_size: f32) -> f32 {
    if font_size <= 0.0 {
        return 0.0;
    }
    text.chars()
        .filter(|ch| *ch != '\n')
        .map(char_width_factor)
        .sum::<f32>()
        * font_size
}

pub fn char_width_factor(ch: char) -> f32 {
    // Em-relative widths calibrated against mermaid-cli output for its default
    // sans font stack at a 16px baseline; '/', '-' and '_' added for titles.
    match ch {
        ' ' => 0.306,
        '\\' | '.' | ',' | ':' | ';' | '|' | '!' | '(' | ')' | '[' | ']' | '{' | '}' => 0.321,
        '/' => 0.380,
        '-' | '_' => 0.420,
        'A' => 0.652,
        'B' => 0.648,
        'C' => 0.734,
        'D' => 0.723,
        'E' => 0.594,
        'F' => 0.575,
        'G' | 'H' => 0.742,
        'I' => 0.272,
        'J' => 0.557,
        'K' => 0.648,
        'L' => 0.559,
        'M' => 0.903,
        'N' => 0.763,
        'O' => 0.754,
        'P' => 0.623,
        'Q' => 0.755,
        'R' => 0.637,
        'S' => 0.633,
        'T' => 0.599,
        'U' => 0.746,
        'V' => 0.661,
        'W' => 0.958,
        'X' => 0.655,
        'Y' => 0.646,
        'Z' => 0.621,
        'a' => 0.550,
        'b' => 0.603,
        'c' => 0.547,
        'd' => 0.609,
        'e' => 0.570,
        'f' => 0.340,
        'g' | 'h' => 0.600,
        'i' => 0.235,
        'j' => 0.227,
        'k' => 0.522,
        'l' => 0.239,
        'm' => 0.867,
        'n' => 0.585,
        'o' => 0.574,
        'p' => 0.595,
        'q' => 0.585,
        'r' => 0.364,
        's' => 0.523,
        't' => 0.305,
        'u' => 0.585,
        'v' => 0.545,
        'w' => 0.811,
        'x' => 0.538,
        'y' => 0.556,
        'z' => 0.550,
        '0' => 0.613,
        '1' => 0.396,
        '2' => 0.609,
        '3' => 0.597,
        '4' => 0.614,
        '5' => 0.586,
        '6' => 0.608,
        '7' => 0.559,
        '8' => 0.611,
        '9' => 0.595,
        '@' | '#' | '%' | '&' => 0.946,
        _ => 0.568,
    }
}

/// Glyph-advance measurement against faces resolved from a font database.
///
/// Families are resolved once, up front. A family that resolves to no face,
/// and any character without a glyph, is measured with [`char_width_factor`].
pub struct FontMetrics {
    faces: HashMap<String, FaceMetrics>,
}

impl FontMetrics {
    pub fn new(db: &Database, families: &[&str]) -> Self {
        let mut faces = HashMap::new();
        for family in families {
            let key = normalize_family_key(family);
            if faces.contains_key(&key) {
                continue;
            }
            match load_face(db, family) {
                Some(face) => {
                    faces.insert(key, face);
                }
                None => log::warn!("no font face for {family:?}; using fallback metrics"),
            }
        }
        Self { faces }
    }

    pub fn resolves(&self, family: &str) -> bool {
        self.faces.contains_key(&normalize_family_key(family))
    }
}

impl TextMeasure for FontMetrics {
    fn measure(&self, text: &str, font: &FontSpec) -> f32 {
        if text.is_empty() || font.size <= 0.0 {
            return 0.0;
        }
        match self.faces.get(&normalize_family_key(&font.family)) {
            Some(face) => face.measure_width(text, font.size),
            None => fallback_text_width(text, font.size),
        }
    }
}

struct FaceMetrics {
    data: Vec<u8>,
    index: u32,
    units_per_em: u16,
    ascii_advances: [u16; 128],
    /// Non-ASCII advances, filled on first use; `None` for chars without a glyph.
    glyph_cache: Mutex<HashMap<char, Option<u16>>>,
}

impl FaceMetrics {
    fn parse(data: Vec<u8>, index: u32) -> Option<Self> {
        let face = Face::parse(&data, index).ok()?;
        let units_per_em = face.units_per_em().max(1);
        let mut ascii_advances = [0u16; 128];
        for byte in 0u8..=127 {
            if let Some(glyph_id) = face.glyph_index(byte as char) {
                ascii_advances[byte as usize] = face.glyph_hor_advance(glyph_id).unwrap_or(0);
            }
        }
        Some(Self {
            data,
            index,
            units_per_em,
            ascii_advances,
            glyph_cache: Mutex::new(HashMap::new()),
        })
    }

    fn measure_width(&self, text: &str, font_size: f32) -> f32 {
        let scale = font_size / self.units_per_em as f32;

        if text.is_ascii() {
            let mut width = 0.0f32;
            for byte in text.bytes() {
                if byte == b'\n' {
                    continue;
                }
                let advance = self.ascii_advances[byte as usize];
                if advance == 0 {
                    width += char_width_factor(byte as char) * font_size;
                } else {
                    width += advance as f32 * scale;
                }
            }
            return width.max(0.0);
        }

        let mut cache = self
            .glyph_cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        self.cache_advances(text, &mut cache);

        let mut width = 0.0f32;
        for ch in text.chars() {
            if ch == '\n' {
                continue;
            }
            let advance = if ch.is_ascii() {
                Some(self.ascii_advances[ch as usize])
            } else {
                cache.get(&ch).copied().flatten()
            };
            match advance {
                Some(advance) if advance > 0 => width += advance as f32 * scale,
                _ => width += char_width_factor(ch) * font_size,
            }
        }
        width.max(0.0)
    }

    /// Parses the face only when `text` has non-ASCII chars not seen before.
    fn cache_advances(&self, text: &str, cache: &mut HashMap<char, Option<u16>>) {
        let missing: Vec<char> = text
            .chars()
            .filter(|ch| !ch.is_ascii() && !cache.contains_key(ch))
            .collect();
        if missing.is_empty() {
            return;
        }
        let face = Face::parse(&self.data, self.index).ok();
        for ch in missing {
            let advance = face.as_ref().and_then(|face| {
                face.glyph_index(ch)
                    .and_then(|glyph| face.glyph_hor_advance(glyph))
            });
            cache.insert(ch, advance);
        }
    }
}

fn load_face(db: &Database, font_family: &str) -> Option<FaceMetrics> {
    let families = parse_family_list(font_family);
    let query = Query {
        families: &families,
        weight: Weight::NORMAL,
        stretch: Stretch::Normal,
        style: Style::Normal,
    };
    let id = db.query(&query)?;
    db.with_face_data(id, |data, index| FaceMetrics::parse(data.to_vec(), index))
        .flatten()
}

fn parse_family_list(font_family: &str) -> Vec<Family<'_>> {
    let mut families = Vec::new();
    for part in font_family.split(',') {
        let raw = part.trim().trim_matches('"').trim_matches('\'');
        if raw.is_empty() {
            continue;
        }
        let family = match raw.to_ascii_lowercase().as_str() {
            "serif" => Family::Serif,
            "sans-serif" | "system-ui" | "-apple-system" | "ui-sans-serif" => Family::SansSerif,
            "monospace" | "ui-monospace" => Family::Monospace,
            "cursive" => Family::Cursive,
            "fantasy" => Family::Fantasy,
            _ => Family::Name(raw),
        };
        families.push(family);
    }
    if families.is_empty() {
        families.push(Family::SansSerif);
    }
    families
}

fn normalize_family_key(font_family: &str) -> String {
    let trimmed = font_family.trim();
    if trimmed.is_empty() {
        "sans-serif".to_string()
    } else {
        trimmed.to_string()
    }
}
