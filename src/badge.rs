use crate::font::LabelFont;
use image::{Rgba, RgbaImage};

/// Initials shown on the badge (for S0LSTICE).
pub const LABEL: &str = "S0";

// Theme colors: --color-primary plus a lighter shade for depth.
const OUTER_COLOR: Rgba<u8> = Rgba([124, 58, 237, 255]);
const INNER_COLOR: Rgba<u8> = Rgba([99, 68, 247, 255]);
const SHADOW_COLOR: Rgba<u8> = Rgba([0, 0, 0, 128]);
const LABEL_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Renders the badge at `size` x `size`: transparent canvas, two concentric
/// filled circles, and the centered label drawn shadow-first.
pub fn render_badge(size: u32, font: &LabelFont) -> RgbaImage {
    let mut img = RgbaImage::new(size, size);

    fill_circle(&mut img, size / 10, OUTER_COLOR);
    fill_circle(&mut img, size / 6, INNER_COLOR);

    let px = size / 4;
    let (text_w, text_h) = font.measure(LABEL, px);

    // Center the inked glyph box, not the nominal line box.
    let x = (size.saturating_sub(text_w) / 2) as i32;
    let y = (size.saturating_sub(text_h) / 2) as i32;

    let shadow_offset = (size / 100) as i32;
    font.draw(&mut img, x + shadow_offset, y + shadow_offset, LABEL, px, SHADOW_COLOR);
    font.draw(&mut img, x, y, LABEL, px, LABEL_COLOR);

    img
}

/// Fills the circle inscribed in the square inset by `margin` on every side,
/// with a one-pixel anti-aliased rim.
fn fill_circle(img: &mut RgbaImage, margin: u32, color: Rgba<u8>) {
    let size = img.width();
    let center = size as f32 / 2.0;
    let radius = center - margin as f32;
    if radius <= 0.0 {
        return;
    }

    for y in 0..size {
        for x in 0..size {
            let dx = x as f32 + 0.5 - center;
            let dy = y as f32 + 0.5 - center;
            let distance = (dx * dx + dy * dy).sqrt();

            if distance <= radius - 1.0 {
                img.put_pixel(x, y, color);
            } else if distance < radius {
                // Anti-aliasing rim
                blend_pixel(img, x as i32, y as i32, color, radius - distance);
            }
        }
    }
}

/// Alpha-blends `color` over the destination pixel, weighting the source
/// alpha by `coverage` (0.0..=1.0). Out-of-bounds coordinates are ignored.
pub(crate) fn blend_pixel(img: &mut RgbaImage, x: i32, y: i32, color: Rgba<u8>, coverage: f32) {
    if x < 0 || y < 0 || x >= img.width() as i32 || y >= img.height() as i32 {
        return;
    }
    let src_a = color[3] as f32 / 255.0 * coverage.clamp(0.0, 1.0);
    if src_a <= 0.0 {
        return;
    }

    let dst = img.get_pixel_mut(x as u32, y as u32);
    let dst_a = dst[3] as f32 / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    for i in 0..3 {
        let blended = color[i] as f32 * src_a + dst[i] as f32 * dst_a * (1.0 - src_a);
        dst[i] = (blended / out_a).round() as u8;
    }
    dst[3] = (out_a * 255.0).round() as u8;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn badge(size: u32) -> RgbaImage {
        render_badge(size, &LabelFont::Builtin)
    }

    #[test]
    fn canvas_is_square_and_corner_transparent() {
        for size in [32, 100, 512] {
            let img = badge(size);
            assert_eq!(img.width(), size);
            assert_eq!(img.height(), size);
            assert_eq!(img.get_pixel(0, 0)[3], 0);
            assert_eq!(img.get_pixel(size - 1, size - 1)[3], 0);
        }
    }

    #[test]
    fn circle_margins_follow_size() {
        let size = 512u32;
        let img = badge(size);
        let outer_margin = size / 10;
        let inner_margin = size / 6;
        assert!(inner_margin > outer_margin);

        // Just inside the outer circle's top edge: outer shade only.
        let ring_y = outer_margin + 3;
        assert_eq!(*img.get_pixel(size / 2, ring_y), Rgba([124, 58, 237, 255]));

        // Just outside the outer circle: untouched.
        assert_eq!(img.get_pixel(size / 2, outer_margin - 2)[3], 0);

        // Inside the inner circle but above the label: inner shade.
        let inner_y = inner_margin + 10;
        assert_eq!(*img.get_pixel(size / 2, inner_y), Rgba([99, 68, 247, 255]));
    }

    #[test]
    fn label_is_centered() {
        let size = 128u32;
        let img = badge(size);

        // The builtin font draws the label at full coverage, so its pixels
        // are pure white; the shadow pass blends and stays darker.
        let mut min = (u32::MAX, u32::MAX);
        let mut max = (0u32, 0u32);
        for (x, y, p) in img.enumerate_pixels() {
            if *p == Rgba([255, 255, 255, 255]) {
                min = (min.0.min(x), min.1.min(y));
                max = (max.0.max(x), max.1.max(y));
            }
        }
        assert!(min.0 < max.0, "label pixels not found");

        let left = min.0;
        let right = size - 1 - max.0;
        let top = min.1;
        let bottom = size - 1 - max.1;
        assert!(left.abs_diff(right) <= 1, "horizontal gaps {left} vs {right}");
        assert!(top.abs_diff(bottom) <= 1, "vertical gaps {top} vs {bottom}");
    }

    #[test]
    fn shadow_is_painted_under_the_label() {
        // At 512 the shadow offset is 5px, so some semi-dark pixels must
        // survive down-right of the solid label.
        let img = badge(512);
        let dark = img
            .enumerate_pixels()
            .filter(|(_, _, p)| p[3] > 0 && p[0] < 80 && p[1] < 80 && p[2] < 140)
            .count();
        assert!(dark > 0, "no shadow pixels found");
    }

    #[test]
    fn small_sizes_do_not_panic() {
        for size in [16, 32, 48] {
            let img = badge(size);
            assert_eq!(img.width(), size);
        }
    }
}
