//! Text overlay stage: rasterizes a styled string centered on a normalized
//! anchor point, plain-overwrite compositing.
//!
//! All three contract fonts render through the embedded bitmap face; the
//! `TextFont` choice stays in the parameter contract for the control surface
//! but does not select a different outline here. Bold is a 1px double-strike.

use crate::{
    core::PixelBuffer,
    font::{self, GLYPH_H, GLYPH_W},
    params::TextParams,
};

pub fn apply(buf: &mut PixelBuffer, params: &TextParams) {
    let p = params.clamped();
    if p.content.is_empty() {
        return;
    }
    let (w, h) = (buf.width(), buf.height());
    if w == 0 || h == 0 {
        return;
    }

    // Font size derives from buffer height, floored at a legible minimum.
    let size_px = ((p.size / 100.0) * (h as f32 * 0.5)).max(10.0) as u32;
    let char_h = size_px;
    // Native 5x7 cell plus one column of tracking.
    let char_w = (size_px * (GLYPH_W + 1)).div_ceil(GLYPH_H + 1);

    let chars: Vec<char> = p.content.chars().collect();
    let text_w = char_w as i64 * chars.len() as i64;

    let anchor_x = (p.x / 100.0 * w as f32) as i64;
    let anchor_y = (p.y / 100.0 * h as f32) as i64;
    let mut pen_x = anchor_x - text_w / 2;
    let top = anchor_y - i64::from(char_h) / 2;

    for ch in chars {
        let glyph_w = char_w * GLYPH_W / (GLYPH_W + 1);
        font::draw_char_scaled(buf, ch, pen_x, top, glyph_w, char_h, p.color);
        if p.is_bold {
            font::draw_char_scaled(buf, ch, pen_x + 1, top, glyph_w, char_h, p.color);
        }
        pen_x += i64::from(char_w);
    }
}
