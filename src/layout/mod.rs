//! Fixed-canvas layout: fits the title, then the description under it, and
//! places the avatar and signature at their fixed spots.

mod fit;
mod text;
mod types;

pub use fit::{DescriptionFit, TITLE_SEPARATOR, fit_description, fit_title};
pub use text::wrap_text;
pub use types::*;

use crate::config::{FontSettings, PreviewConfig, geometry};
use crate::repo::RepositoryMetadata;
use crate::text_metrics::{FontSpec, TextMeasure};

pub fn compute_layout(
    meta: &RepositoryMetadata,
    config: &PreviewConfig,
    measure: &dyn TextMeasure,
) -> PreviewLayout {
    let style = &config.style;
    let fonts = &config.fonts;
    let max_width = geometry::content_width();

    // The description budget depends on the chosen title size.
    let title = fit_title(&meta.owner, &meta.name, style, fonts, max_width, measure);
    let height_budget = description_height_budget(title.font_size);
    let fit = fit_description(&meta.description, fonts, max_width, height_budget, measure);
    let description = place_description(fit, &title, fonts, &style.description_color, measure);

    PreviewLayout {
        width: geometry::CANVAS_WIDTH,
        height: geometry::CANVAS_HEIGHT,
        background: style.background.clone(),
        font_family: fonts.family.clone(),
        title,
        description,
        avatar: avatar_layout(),
        signature: signature_layout(&meta.owner, fonts, &style.signature_color, measure),
    }
}

/// Vertical space left for the description once the title and the bottom row are reserved.
pub fn description_height_budget(title_font_size: u32) -> f32 {
    geometry::CANVAS_HEIGHT as f32
        - (geometry::TITLE_BASELINE + title_font_size as f32 + geometry::DESCRIPTION_TOP_RESERVE)
        - geometry::DESCRIPTION_BOTTOM_RESERVE
}

fn place_description(
    fit: DescriptionFit,
    title: &TitleLayout,
    fonts: &FontSettings,
    color: &str,
    measure: &dyn TextMeasure,
) -> DescriptionLayout {
    let font = FontSpec::new(fonts.family.as_str(), fit.font_size);
    let line_pitch = fit.font_size as f32 + fonts.line_spacing;
    let mut baseline_y =
        title.baseline_y + title.font_size as f32 + geometry::DESCRIPTION_OFFSET;

    let mut lines = Vec::with_capacity(fit.lines.len());
    for text in fit.lines {
        let width = measure.measure(&text, &font);
        lines.push(DescriptionLine {
            x: (geometry::CANVAS_WIDTH as f32 - width) / 2.0,
            baseline_y,
            width,
            text,
        });
        baseline_y += line_pitch;
    }

    DescriptionLayout {
        font_size: fit.font_size,
        line_pitch,
        lines,
        color: color.to_string(),
        overflow: fit.overflow,
    }
}

fn avatar_layout() -> AvatarLayout {
    let radius = geometry::AVATAR_RADIUS;
    let size = radius * 2.0;
    let y = geometry::CANVAS_HEIGHT as f32 - geometry::AVATAR_BOTTOM_OFFSET - size;
    AvatarLayout {
        center_x: geometry::AVATAR_X + radius,
        center_y: y + radius,
        radius,
        x: geometry::AVATAR_X,
        y,
        size,
    }
}

fn signature_layout(
    owner: &str,
    fonts: &FontSettings,
    color: &str,
    measure: &dyn TextMeasure,
) -> SignatureLayout {
    let font = FontSpec::new(fonts.family.as_str(), fonts.signature_size);
    let width = measure.measure(owner, &font);
    SignatureLayout {
        text: owner.to_string(),
        font_size: fonts.signature_size,
        x: geometry::CANVAS_WIDTH as f32 - width - geometry::PADDING_X,
        baseline_y: geometry::CANVAS_HEIGHT as f32 - geometry::SIGNATURE_BOTTOM_OFFSET,
        width,
        color: color.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text_metrics::FallbackMetrics;

    fn octocat(description: &str) -> RepositoryMetadata {
        RepositoryMetadata::new("octocat", "Hello-World", description)
    }

    #[test]
    fn budget_shrinks_as_title_grows() {
        assert_eq!(description_height_budget(60), 640.0 - 230.0 - 130.0);
        assert!(description_height_budget(30) > description_height_budget(60));
    }

    #[test]
    fn title_is_centered_on_measured_width() {
        let config = PreviewConfig::default();
        let layout = compute_layout(&octocat(""), &config, &FallbackMetrics);
        let font = FontSpec::new(config.fonts.family.as_str(), layout.title.font_size);
        let measured = FallbackMetrics.measure("octocat / Hello-World", &font);
        let expected = (1280.0 - measured) / 2.0;
        assert!((layout.title.origin_x - expected).abs() < 0.01);
        assert!(layout.title.font_size <= 60);
    }

    #[test]
    fn description_lines_are_centered_and_stacked() {
        let config = PreviewConfig::default();
        let layout = compute_layout(
            &octocat("A friendly greeting repo\nfor testing"),
            &config,
            &FallbackMetrics,
        );
        let description = &layout.description;
        assert_eq!(description.texts(), vec!["A friendly greeting repo", "for testing"]);
        let first = &description.lines[0];
        assert_eq!(
            first.baseline_y,
            150.0 + layout.title.font_size as f32 + 25.0
        );
        assert_eq!(
            description.lines[1].baseline_y - first.baseline_y,
            description.font_size as f32 + 10.0
        );
        for line in &description.lines {
            assert!((line.x - (1280.0 - line.width) / 2.0).abs() < 0.01);
        }
        assert!(description.total_height() <= description_height_budget(layout.title.font_size));
    }

    #[test]
    fn avatar_and_signature_sit_on_bottom_row() {
        let config = PreviewConfig::default();
        let layout = compute_layout(&octocat(""), &config, &FallbackMetrics);
        assert_eq!(layout.avatar.center_x, 75.0);
        assert_eq!(layout.avatar.center_y, 515.0);
        assert_eq!(layout.avatar.radius, 25.0);
        assert_eq!((layout.avatar.x, layout.avatar.y, layout.avatar.size), (50.0, 490.0, 50.0));

        let signature = &layout.signature;
        assert_eq!(signature.text, "octocat");
        assert_eq!(signature.font_size, 35);
        assert_eq!(signature.baseline_y, 510.0);
        assert!((signature.x + signature.width - 1230.0).abs() < 0.01);
        assert_eq!(signature.color, "#969696");
    }

    #[test]
    fn empty_description_yields_no_lines() {
        let layout = compute_layout(&octocat("   "), &PreviewConfig::default(), &FallbackMetrics);
        assert!(layout.description.lines.is_empty());
        assert!(!layout.description.overflow);
    }
}
