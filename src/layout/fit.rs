use crate::config::{FontSettings, TitleOverflow, geometry};
use crate::style::StyleConfig;
use crate::text_metrics::{FontSpec, TextMeasure};

use super::text::wrap_text;
use super::{TitleLayout, TitleSegment};

pub const TITLE_SEPARATOR: &str = " / ";
const ELLIPSIS: char = '\u{2026}';

/// Largest title size in `title_min_size..=title_size` at which
/// `username / repo` fits `max_width`, centered on the canvas.
pub fn fit_title(
    username: &str,
    repo_name: &str,
    style: &StyleConfig,
    fonts: &FontSettings,
    max_width: f32,
    measure: &dyn TextMeasure,
) -> TitleLayout {
    let floor = fonts.title_min_size.max(1);
    let initial = fonts.title_size.max(floor);
    let mut texts = [
        username.to_string(),
        TITLE_SEPARATOR.to_string(),
        repo_name.to_string(),
    ];

    let mut chosen = None;
    for size in (floor..=initial).rev() {
        let font = FontSpec::new(fonts.family.as_str(), size);
        if title_width(&texts, &font, measure) <= max_width {
            chosen = Some(size);
            break;
        }
    }

    let (font_size, mut overflow) = match chosen {
        Some(size) => (size, false),
        None => (floor, true),
    };
    let font = FontSpec::new(fonts.family.as_str(), font_size);

    if overflow {
        if fonts.title_overflow == TitleOverflow::Ellipsis {
            ellipsize(&mut texts, &font, max_width, measure);
            overflow = title_width(&texts, &font, measure) > max_width;
        }
        if overflow {
            log::warn!(
                "title {username}/{repo_name} exceeds {max_width}px even at {font_size}px"
            );
        }
    }

    let colors = [
        style.username_color.as_str(),
        style.separator_color(),
        style.repo_color.as_str(),
    ];
    let widths: Vec<f32> = texts
        .iter()
        .map(|text| measure.measure(text, &font))
        .collect();
    let width: f32 = widths.iter().sum();
    let origin_x = (geometry::CANVAS_WIDTH as f32 - width) / 2.0;

    let mut x = origin_x;
    let mut segments = Vec::with_capacity(texts.len());
    for ((text, color), seg_width) in texts.into_iter().zip(colors).zip(widths) {
        segments.push(TitleSegment {
            text,
            color: color.to_string(),
            x,
            width: seg_width,
        });
        x += seg_width;
    }

    log::debug!("title fitted at {font_size}px, width {width:.1}px");
    TitleLayout {
        font_size,
        origin_x,
        baseline_y: geometry::TITLE_BASELINE,
        width,
        segments,
        overflow,
    }
}

fn title_width(texts: &[String; 3], font: &FontSpec, measure: &dyn TextMeasure) -> f32 {
    texts.iter().map(|text| measure.measure(text, font)).sum()
}

/// Shortens the repository name, then the username, until the title fits.
fn ellipsize(texts: &mut [String; 3], font: &FontSpec, max_width: f32, measure: &dyn TextMeasure) {
    for target in [2, 0] {
        let mut chars: Vec<char> = texts[target].chars().collect();
        while title_width(texts, font, measure) > max_width && !chars.is_empty() {
            chars.pop();
            let mut shortened: String = chars.iter().collect();
            shortened.push(ELLIPSIS);
            texts[target] = shortened;
        }
        if title_width(texts, font, measure) <= max_width {
            return;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DescriptionFit {
    pub font_size: u32,
    pub lines: Vec<String>,
    pub overflow: bool,
}

/// Largest description size above `description_floor` whose wrap fits `height_budget`.
///
/// Falls back to the wrap at `description_floor` itself, flagged as overflow,
/// when no size in the search range qualifies.
pub fn fit_description(
    description: &str,
    fonts: &FontSettings,
    max_width: f32,
    height_budget: f32,
    measure: &dyn TextMeasure,
) -> DescriptionFit {
    let floor = fonts.description_floor;
    let initial = fonts.description_size.max(floor);

    if description.trim().is_empty() {
        return DescriptionFit {
            font_size: initial,
            lines: Vec::new(),
            overflow: false,
        };
    }

    for size in ((floor + 1)..=initial).rev() {
        let font = FontSpec::new(fonts.family.as_str(), size);
        let lines = wrap_text(description, &font, max_width, measure);
        let total_height = lines.len() as f32 * (size as f32 + fonts.line_spacing);
        if total_height <= height_budget {
            log::debug!(
                "description fitted at {size}px: {} lines, {total_height:.1}/{height_budget:.1}px",
                lines.len()
            );
            return DescriptionFit {
                font_size: size,
                lines,
                overflow: false,
            };
        }
    }

    let font = FontSpec::new(fonts.family.as_str(), floor);
    let lines = wrap_text(description, &font, max_width, measure);
    log::warn!(
        "description needs {} lines at {floor}px, more than the {height_budget:.1}px budget allows",
        lines.len()
    );
    DescriptionFit {
        font_size: floor,
        lines,
        overflow: true,
    }
}
