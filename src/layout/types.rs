use serde::Serialize;

/// One contiguous, single-colored run of the title.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TitleSegment {
    pub text: String,
    pub color: String,
    pub x: f32,
    pub width: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TitleLayout {
    pub font_size: u32,
    pub origin_x: f32,
    pub baseline_y: f32,
    /// Sum of the segment widths.
    pub width: f32,
    /// Username, separator and repository name, left to right.
    pub segments: Vec<TitleSegment>,
    /// Set when even the minimum size did not fit the content width.
    pub overflow: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DescriptionLine {
    pub text: String,
    pub x: f32,
    pub baseline_y: f32,
    pub width: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DescriptionLayout {
    pub font_size: u32,
    /// Vertical advance between consecutive baselines.
    pub line_pitch: f32,
    pub lines: Vec<DescriptionLine>,
    pub color: String,
    /// Set when even the floor size exceeded the height budget.
    pub overflow: bool,
}

impl DescriptionLayout {
    pub fn total_height(&self) -> f32 {
        self.lines.len() as f32 * self.line_pitch
    }

    pub fn texts(&self) -> Vec<&str> {
        self.lines.iter().map(|line| line.text.as_str()).collect()
    }
}

/// Circular avatar clip: `radius` around the center, image scaled into the square box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AvatarLayout {
    pub center_x: f32,
    pub center_y: f32,
    pub radius: f32,
    pub x: f32,
    pub y: f32,
    pub size: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignatureLayout {
    pub text: String,
    pub font_size: u32,
    pub x: f32,
    pub baseline_y: f32,
    pub width: f32,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewLayout {
    pub width: u32,
    pub height: u32,
    pub background: String,
    pub font_family: String,
    pub title: TitleLayout,
    pub description: DescriptionLayout,
    pub avatar: AvatarLayout,
    pub signature: SignatureLayout,
}
