use std::path::PathBuf;

use tabletalk_core::model::Table;

use crate::layout::{
    chars_per_line, fit_within, title_case, wrap_lines, CELL_FONT_SIZE, CELL_LEADING,
    CELL_PADDING, CONTENT_HEIGHT, CONTENT_WIDTH, IMAGE_BOX, ROW_HEIGHT_FACTOR,
};

/// One renderable unit of an exported report.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportBlock {
    /// Overview title at the top of the report.
    Title(String),
    Heading(String),
    Paragraph(String),
    Table(TableBlock),
    Image(ImageBlock),
}

impl ReportBlock {
    pub fn kind(&self) -> &'static str {
        match self {
            ReportBlock::Title(_) => "title",
            ReportBlock::Heading(_) => "heading",
            ReportBlock::Paragraph(_) => "paragraph",
            ReportBlock::Table(_) => "table",
            ReportBlock::Image(_) => "image",
        }
    }
}

/// A table laid out for the page: title-case headers, equal column widths,
/// and one height per row (header row first).
#[derive(Debug, Clone, PartialEq)]
pub struct TableBlock {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub column_width: f32,
    /// Characters per wrapped cell line.
    pub wrap_width: usize,
    /// `rows.len() + 1` entries; index 0 is the header row.
    pub row_heights: Vec<f32>,
}

impl TableBlock {
    pub fn from_table(table: &Table) -> Self {
        let columns: Vec<String> = table.columns.iter().map(|c| title_case(c)).collect();
        let column_width = CONTENT_WIDTH / columns.len().max(1) as f32;
        let wrap_width = chars_per_line(column_width - 2.0 * CELL_PADDING, CELL_FONT_SIZE);

        let row_heights = std::iter::once(columns.as_slice())
            .chain(table.rows.iter().map(Vec::as_slice))
            .map(|row| row_height(row, wrap_width))
            .collect();

        Self {
            columns,
            rows: table.rows.clone(),
            column_width,
            wrap_width,
            row_heights,
        }
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Data rows, not counting the header.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn total_width(&self) -> f32 {
        self.column_width * self.columns.len() as f32
    }

    pub fn cell_lines(&self, text: &str) -> Vec<String> {
        wrap_lines(text, self.wrap_width)
    }
}

/// Proportional to the longest cell (at most one page), but never shorter
/// than the wrapped text needs. Rows taller than a page are split by the
/// renderer.
fn row_height(cells: &[String], wrap_width: usize) -> f32 {
    let longest = cells.iter().map(|c| c.chars().count()).max().unwrap_or(0);
    let lines = cells
        .iter()
        .map(|c| wrap_lines(c, wrap_width).len())
        .max()
        .unwrap_or(1);
    let proportional = (longest as f32 * ROW_HEIGHT_FACTOR).min(CONTENT_HEIGHT);
    proportional.max(lines_height(lines))
}

/// Height of a cell holding `lines` wrapped lines.
pub fn lines_height(lines: usize) -> f32 {
    lines as f32 * CELL_LEADING + 2.0 * CELL_PADDING
}

/// A chart image, drawn proportionally inside a fixed bounding box.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBlock {
    pub path: PathBuf,
    pub max_width: f32,
    pub max_height: f32,
}

impl ImageBlock {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_width: IMAGE_BOX,
            max_height: IMAGE_BOX,
        }
    }

    /// Drawn size for an image whose natural size is `width` x `height`.
    pub fn fit(&self, width: f32, height: f32) -> (f32, f32) {
        fit_within(width, height, self.max_width, self.max_height)
    }
}
