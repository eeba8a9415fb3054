use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use printpdf::image_crate::{self, DynamicImage, GenericImageView};
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Line, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Point, Rgb,
};

use super::ReportRenderer;
use crate::block::{lines_height, ImageBlock, ReportBlock, TableBlock};
use crate::error::ReportError;
use crate::layout::{
    chars_per_line, text_width, wrap_lines, BODY_FONT_SIZE, BODY_LEADING, CELL_FONT_SIZE,
    CELL_LEADING, CELL_PADDING, CONTENT_HEIGHT, CONTENT_WIDTH, HEADING_FONT_SIZE, MARGIN,
    PAGE_HEIGHT, PAGE_WIDTH, SPACE_AFTER, TITLE_FONT_SIZE,
};

const LAYER: &str = "Layer 1";
const GRID_THICKNESS: f32 = 0.25;

/// Lays the report out on US-letter pages with Helvetica.
#[derive(Debug, Clone)]
pub struct PdfRenderer {
    title: String,
}

impl PdfRenderer {
    /// `title` becomes the PDF document title metadata.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

impl Default for PdfRenderer {
    fn default() -> Self {
        Self::new("Analysis")
    }
}

impl ReportRenderer for PdfRenderer {
    fn render(&self, blocks: &[ReportBlock], output: &Path) -> Result<(), ReportError> {
        let mut writer = PageWriter::new(&self.title)?;
        for block in blocks {
            writer.block(block)?;
        }
        let pages = writer.pages;
        writer.save(output)?;
        tracing::info!(path = %output.display(), pages, blocks = blocks.len(), "Wrote PDF report");
        Ok(())
    }
}

fn mm(pt: f32) -> Mm {
    Mm(pt * 25.4 / 72.0)
}

#[derive(Clone, Copy)]
enum Weight {
    Regular,
    Bold,
}

#[derive(Clone, Copy)]
enum Align {
    Left,
    Center,
}

/// Top-to-bottom flow layout with page breaks.
struct PageWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    /// Cursor: top edge of the next block, in points from the page bottom.
    y: f32,
    pages: usize,
}

impl PageWriter {
    fn new(title: &str) -> Result<Self, ReportError> {
        let (doc, page, layer) =
            PdfDocument::new(title, mm(PAGE_WIDTH), mm(PAGE_HEIGHT), LAYER);
        let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
        let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;
        let layer = doc.get_page(page).get_layer(layer);
        let writer = Self {
            doc,
            layer,
            regular,
            bold,
            y: PAGE_HEIGHT - MARGIN,
            pages: 1,
        };
        writer.style_layer();
        Ok(writer)
    }

    fn style_layer(&self) {
        self.layer
            .set_outline_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
        self.layer.set_outline_thickness(GRID_THICKNESS);
    }

    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(mm(PAGE_WIDTH), mm(PAGE_HEIGHT), LAYER);
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.style_layer();
        self.y = PAGE_HEIGHT - MARGIN;
        self.pages += 1;
    }

    fn at_page_top(&self) -> bool {
        self.y >= PAGE_HEIGHT - MARGIN
    }

    /// Break the page unless `height` still fits above the bottom margin.
    fn reserve(&mut self, height: f32) {
        if self.y - height < MARGIN && !self.at_page_top() {
            self.new_page();
        }
    }

    fn block(&mut self, block: &ReportBlock) -> Result<(), ReportError> {
        match block {
            ReportBlock::Title(text) => {
                self.text(
                    text,
                    TITLE_FONT_SIZE,
                    TITLE_FONT_SIZE + 4.0,
                    Weight::Bold,
                    Align::Center,
                );
                self.y -= SPACE_AFTER;
            }
            ReportBlock::Heading(text) => {
                if !self.at_page_top() {
                    self.y -= HEADING_FONT_SIZE / 2.0;
                }
                self.text(
                    text,
                    HEADING_FONT_SIZE,
                    HEADING_FONT_SIZE + 2.0,
                    Weight::Bold,
                    Align::Left,
                );
                self.y -= HEADING_FONT_SIZE / 2.0;
            }
            ReportBlock::Paragraph(text) => {
                self.text(text, BODY_FONT_SIZE, BODY_LEADING, Weight::Regular, Align::Left);
                self.y -= SPACE_AFTER;
            }
            ReportBlock::Table(table) => {
                self.table(table);
                self.y -= SPACE_AFTER;
            }
            ReportBlock::Image(image) => {
                self.image(image)?;
                self.y -= SPACE_AFTER;
            }
        }
        Ok(())
    }

    /// Wrapped text across the content width, breaking pages between lines.
    fn text(&mut self, text: &str, size: f32, leading: f32, weight: Weight, align: Align) {
        let width = chars_per_line(CONTENT_WIDTH, size);
        for line in wrap_lines(text, width) {
            self.reserve(leading);
            let x = match align {
                Align::Left => MARGIN,
                Align::Center => {
                    MARGIN + (CONTENT_WIDTH - text_width(&line, size)).max(0.0) / 2.0
                }
            };
            let baseline = self.y - size;
            self.put_text(&line, size, x, baseline, weight);
            self.y -= leading;
        }
    }

    fn put_text(&self, text: &str, size: f32, x: f32, baseline: f32, weight: Weight) {
        if text.is_empty() {
            return;
        }
        let font = match weight {
            Weight::Regular => &self.regular,
            Weight::Bold => &self.bold,
        };
        self.layer.use_text(text, size, mm(x), mm(baseline), font);
    }

    /// Bordered grid, centered on the page. Rows move to the next page when
    /// they do not fit; a row taller than a page continues on the next one.
    fn table(&mut self, table: &TableBlock) {
        let left = MARGIN + (CONTENT_WIDTH - table.total_width()).max(0.0) / 2.0;

        let rows = std::iter::once((&table.columns, Weight::Bold))
            .chain(table.rows.iter().map(|r| (r, Weight::Regular)));

        for ((cells, weight), &height) in rows.zip(&table.row_heights) {
            self.reserve(height.min(CONTENT_HEIGHT));
            let lines = cells.iter().map(|c| table.cell_lines(c)).collect();
            let slices = slice_row(lines, height, self.y - MARGIN);
            for (i, slice) in slices.iter().enumerate() {
                if i > 0 {
                    self.new_page();
                }
                let top = self.y;
                for (col, lines) in slice.cells.iter().enumerate() {
                    let x = left + col as f32 * table.column_width;
                    self.rect(x, top, table.column_width, slice.height);
                    self.cell(table.column_width, lines, x, top, slice.height, weight);
                }
                self.y -= slice.height;
            }
        }
    }

    /// Cell lines, centered both ways.
    fn cell(&self, width: f32, lines: &[String], x: f32, top: f32, height: f32, weight: Weight) {
        let block_height = lines.len() as f32 * CELL_LEADING;
        let first_top = top - (height - block_height) / 2.0;
        for (i, line) in lines.iter().enumerate() {
            let slack = width - text_width(line, CELL_FONT_SIZE);
            let line_x = x + slack.max(0.0) / 2.0;
            let baseline = first_top - i as f32 * CELL_LEADING - CELL_FONT_SIZE;
            self.put_text(line, CELL_FONT_SIZE, line_x, baseline, weight);
        }
    }

    fn rect(&self, x: f32, top: f32, width: f32, height: f32) {
        let points = vec![
            (Point::new(mm(x), mm(top)), false),
            (Point::new(mm(x + width), mm(top)), false),
            (Point::new(mm(x + width), mm(top - height)), false),
            (Point::new(mm(x), mm(top - height)), false),
        ];
        self.layer.add_line(Line {
            points,
            is_closed: true,
        });
    }

    fn image(&mut self, block: &ImageBlock) -> Result<(), ReportError> {
        let image_err = |message: String| ReportError::Image {
            path: block.path.display().to_string(),
            message,
        };
        let decoded = image_crate::open(&block.path).map_err(|e| image_err(e.to_string()))?;
        let (px_width, px_height) = decoded.dimensions();
        if px_width == 0 || px_height == 0 {
            return Err(image_err("image has no pixels".into()));
        }
        let (width, height) = block.fit(px_width as f32, px_height as f32);

        self.reserve(height);
        let x = MARGIN + (CONTENT_WIDTH - width).max(0.0) / 2.0;
        let bottom = self.y - height;

        // At 72 dpi one pixel is one point, so scale maps pixels to the fitted size.
        let rgb = DynamicImage::ImageRgb8(decoded.to_rgb8());
        Image::from_dynamic_image(&rgb).add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(mm(x)),
                translate_y: Some(mm(bottom)),
                scale_x: Some(width / px_width as f32),
                scale_y: Some(height / px_height as f32),
                dpi: Some(72.0),
                ..Default::default()
            },
        );
        self.y = bottom;
        Ok(())
    }

    fn save(self, output: &Path) -> Result<(), ReportError> {
        let file = File::create(output)?;
        self.doc.save(&mut BufWriter::new(file))?;
        Ok(())
    }
}

/// One page's share of a table row: its height and the wrapped lines of
/// each cell drawn there.
#[derive(Debug)]
struct RowSlice {
    height: f32,
    cells: Vec<Vec<String>>,
}

/// Split a row of wrapped cells into page-sized slices. The first slice gets
/// `room` points, later ones a full page. Every line lands in exactly one
/// slice.
fn slice_row(mut cells: Vec<Vec<String>>, height: f32, room: f32) -> Vec<RowSlice> {
    let mut slices = Vec::new();
    let mut remaining = height;
    let mut room = room;
    loop {
        let piece = remaining.min(room);
        let capacity = (((piece - 2.0 * CELL_PADDING) / CELL_LEADING).floor() as usize).max(1);
        let drawn: Vec<Vec<String>> = cells
            .iter_mut()
            .map(|lines| {
                let n = capacity.min(lines.len());
                lines.drain(..n).collect::<Vec<_>>()
            })
            .collect();
        slices.push(RowSlice {
            height: piece,
            cells: drawn,
        });

        let left = cells.iter().map(Vec::len).max().unwrap_or(0);
        if left == 0 {
            return slices;
        }
        remaining = (remaining - piece).max(lines_height(left));
        room = CONTENT_HEIGHT;
    }
}
