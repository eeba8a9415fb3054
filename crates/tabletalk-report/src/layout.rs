//! Page geometry and the text measurements shared by the compiler and the
//! renderers. All lengths are PDF points (1/72 inch).

/// US letter.
pub const PAGE_WIDTH: f32 = 612.0;
pub const PAGE_HEIGHT: f32 = 792.0;
pub const MARGIN: f32 = 72.0;
pub const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
pub const CONTENT_HEIGHT: f32 = PAGE_HEIGHT - 2.0 * MARGIN;

/// Charts are fitted proportionally inside this square.
pub const IMAGE_BOX: f32 = 400.0;

/// Row height per character of the longest cell in the row.
pub const ROW_HEIGHT_FACTOR: f32 = 1.6;
pub const CELL_FONT_SIZE: f32 = 10.0;
pub const CELL_LEADING: f32 = 12.0;
pub const CELL_PADDING: f32 = 4.0;

pub const TITLE_FONT_SIZE: f32 = 18.0;
pub const HEADING_FONT_SIZE: f32 = 12.0;
pub const BODY_FONT_SIZE: f32 = 10.0;
pub const BODY_LEADING: f32 = 12.0;
pub const SPACE_AFTER: f32 = 12.0;

/// Average Helvetica glyph advance as a fraction of the font size.
const AVG_CHAR_WIDTH: f32 = 0.5;

/// "total_sales" -> "Total Sales". Each word gets one capital followed by
/// lowercase, so "TOTAL_SALES" and "GDP" become "Total Sales" and "Gdp".
pub fn title_case(text: &str) -> String {
    text.replace('_', " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Approximate rendered width of `text`.
pub fn text_width(text: &str, font_size: f32) -> f32 {
    text.chars().count() as f32 * font_size * AVG_CHAR_WIDTH
}

/// How many characters fit on one line of `width` points.
pub fn chars_per_line(width: f32, font_size: f32) -> usize {
    ((width / (font_size * AVG_CHAR_WIDTH)).floor() as usize).max(1)
}

/// Word-wrap `text` to `width` characters. Long words are broken.
pub fn wrap_lines(text: &str, width: usize) -> Vec<String> {
    let lines: Vec<String> = text
        .lines()
        .flat_map(|line| {
            let wrapped = textwrap::wrap(line, width);
            if wrapped.is_empty() {
                vec![String::new()]
            } else {
                wrapped.into_iter().map(|l| l.into_owned()).collect()
            }
        })
        .collect();
    if lines.is_empty() {
        vec![String::new()]
    } else {
        lines
    }
}

/// Scale `(width, height)` to fit inside `max_width` x `max_height`,
/// keeping the aspect ratio. Smaller images are scaled up.
pub fn fit_within(width: f32, height: f32, max_width: f32, max_height: f32) -> (f32, f32) {
    if width <= 0.0 || height <= 0.0 {
        return (max_width, max_height);
    }
    let scale = (max_width / width).min(max_height / height);
    (width * scale, height * scale)
}
