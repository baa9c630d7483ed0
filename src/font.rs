use crate::badge::blend_pixel;
use image::{Rgba, RgbaImage};
use rusttype::{point, Font, PositionedGlyph, Rect, Scale};
use std::fs;

/// Bold faces probed in order. The first file that reads and parses wins;
/// a full miss falls through to the built-in bitmap font.
const FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "/Library/Fonts/Arial Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

/// Font used for the badge label. Loading never fails: the fallback chain
/// ends at an embedded 5x7 bitmap font.
pub enum LabelFont {
    Truetype(Font<'static>),
    Builtin,
}

impl LabelFont {
    pub fn load() -> Self {
        for path in FONT_PATHS {
            if let Ok(data) = fs::read(path) {
                if let Some(font) = Font::try_from_vec(data) {
                    return LabelFont::Truetype(font);
                }
            }
        }
        LabelFont::Builtin
    }

    /// Width and height of the inked bounding box of `text` at `px` pixels,
    /// ignoring the nominal line box.
    pub fn measure(&self, text: &str, px: u32) -> (u32, u32) {
        match self {
            LabelFont::Truetype(font) => match layout_bounds(font, text, px) {
                Some(b) => ((b.max.x - b.min.x) as u32, (b.max.y - b.min.y) as u32),
                None => (0, 0),
            },
            LabelFont::Builtin => bitmap_extent(text, px),
        }
    }

    /// Draws `text` so that the top-left corner of its inked bounding box
    /// lands at `(x, y)`, alpha-blending over the existing pixels.
    pub fn draw(&self, img: &mut RgbaImage, x: i32, y: i32, text: &str, px: u32, color: Rgba<u8>) {
        match self {
            LabelFont::Truetype(font) => draw_truetype(img, font, x, y, text, px, color),
            LabelFont::Builtin => draw_bitmap(img, x, y, text, px, color),
        }
    }
}

fn layout_glyphs<'f>(font: &'f Font<'static>, text: &str, px: u32) -> Vec<PositionedGlyph<'f>> {
    let scale = Scale::uniform(px as f32);
    let ascent = font.v_metrics(scale).ascent;
    font.layout(text, scale, point(0.0, ascent)).collect()
}

fn layout_bounds(font: &Font<'static>, text: &str, px: u32) -> Option<Rect<i32>> {
    let mut bounds: Option<Rect<i32>> = None;
    for glyph in layout_glyphs(font, text, px) {
        if let Some(bb) = glyph.pixel_bounding_box() {
            bounds = Some(match bounds {
                None => bb,
                Some(b) => Rect {
                    min: point(b.min.x.min(bb.min.x), b.min.y.min(bb.min.y)),
                    max: point(b.max.x.max(bb.max.x), b.max.y.max(bb.max.y)),
                },
            });
        }
    }
    bounds
}

fn draw_truetype(
    img: &mut RgbaImage,
    font: &Font<'static>,
    x: i32,
    y: i32,
    text: &str,
    px: u32,
    color: Rgba<u8>,
) {
    let bounds = match layout_bounds(font, text, px) {
        Some(b) => b,
        None => return,
    };
    for glyph in layout_glyphs(font, text, px) {
        if let Some(bb) = glyph.pixel_bounding_box() {
            glyph.draw(|gx, gy, coverage| {
                let px_x = x + bb.min.x - bounds.min.x + gx as i32;
                let px_y = y + bb.min.y - bounds.min.y + gy as i32;
                blend_pixel(img, px_x, px_y, color, coverage);
            });
        }
    }
}

// Built-in 5x7 bitmap font, scaled with solid blocks. Each glyph is seven
// rows of 5-bit patterns, bit 4 being the leftmost column.
const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;

fn bitmap_cell(px: u32) -> u32 {
    (px / GLYPH_HEIGHT).max(1)
}

fn bitmap_extent(text: &str, px: u32) -> (u32, u32) {
    let cell = bitmap_cell(px);
    let n = text.chars().count() as u32;
    if n == 0 {
        return (0, 0);
    }
    // One empty column between glyphs.
    (n * GLYPH_WIDTH * cell + (n - 1) * cell, GLYPH_HEIGHT * cell)
}

fn draw_bitmap(img: &mut RgbaImage, x: i32, y: i32, text: &str, px: u32, color: Rgba<u8>) {
    let cell = bitmap_cell(px) as i32;
    let mut origin_x = x;
    for c in text.chars() {
        if let Some(rows) = glyph_5x7(c) {
            for (row, bits) in rows.iter().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                        continue;
                    }
                    let left = origin_x + col as i32 * cell;
                    let top = y + row as i32 * cell;
                    for dy in 0..cell {
                        for dx in 0..cell {
                            blend_pixel(img, left + dx, top + dy, color, 1.0);
                        }
                    }
                }
            }
        }
        origin_x += (GLYPH_WIDTH as i32 + 1) * cell;
    }
}

fn glyph_5x7(c: char) -> Option<[u8; 7]> {
    let rows = match c {
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        'A' => [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'B' => [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'D' => [0x1C, 0x12, 0x11, 0x11, 0x11, 0x12, 0x1C],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
        'G' => [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F],
        'H' => [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'J' => [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C],
        'K' => [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
        'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
        'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
        'N' => [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11],
        'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'Q' => [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        'U' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'V' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04],
        'W' => [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A],
        'X' => [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11],
        'Y' => [0x11, 0x11, 0x11, 0x0A, 0x04, 0x04, 0x04],
        'Z' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F],
        _ => return None,
    };
    Some(rows)
}
