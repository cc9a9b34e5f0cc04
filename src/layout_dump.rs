use crate::layout::{PreviewLayout, description_height_budget};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Summary of the fitting decisions followed by the full placed layout.
#[derive(Debug, Serialize)]
pub struct LayoutDump<'a> {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub title_font_size: u32,
    pub title_overflow: bool,
    pub description_font_size: u32,
    pub description_budget: f32,
    pub description_height: f32,
    pub description_overflow: bool,
    pub description_lines: Vec<&'a str>,
    pub layout: &'a PreviewLayout,
}

impl<'a> LayoutDump<'a> {
    pub fn from_layout(layout: &'a PreviewLayout) -> Self {
        let title = layout
            .title
            .segments
            .iter()
            .map(|segment| segment.text.as_str())
            .collect();
        LayoutDump {
            width: layout.width,
            height: layout.height,
            title,
            title_font_size: layout.title.font_size,
            title_overflow: layout.title.overflow,
            description_font_size: layout.description.font_size,
            description_budget: description_height_budget(layout.title.font_size),
            description_height: layout.description.total_height(),
            description_overflow: layout.description.overflow,
            description_lines: layout.description.texts(),
            layout,
        }
    }
}

pub fn write_layout_dump(path: &Path, layout: &PreviewLayout) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
