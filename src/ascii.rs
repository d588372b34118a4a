//! Ascii stage: downsamples the working buffer into a character-cell grid
//! and redraws each cell as a ramp glyph quantizing its luminance.

use crate::{color, core::PixelBuffer, font, params::AsciiParams};

/// Grid dimensions for a buffer and cell scale. Cell height is `scale * 1.6`.
/// Returns `None` when either axis collapses to zero cells.
pub fn grid_dims(width: u32, height: u32, scale: f32) -> Option<(u32, u32)> {
    let cell_w = scale;
    let cell_h = scale * 1.6;
    if cell_w <= 0.0 || cell_h <= 0.0 {
        return None;
    }
    let cols = (width as f32 / cell_w).floor() as u32;
    let rows = (height as f32 / cell_h).floor() as u32;
    if cols == 0 || rows == 0 {
        return None;
    }
    Some((cols, rows))
}

pub fn apply(buf: &mut PixelBuffer, scratch: &mut PixelBuffer, params: &AsciiParams) {
    let p = params.clamped();
    let Some((cols, rows)) = grid_dims(buf.width(), buf.height(), p.scale) else {
        return;
    };
    let cell_w = p.scale;
    let cell_h = p.scale * 1.6;

    let (mut background, mut foreground) = (p.background_color, p.text_color);
    if p.inverted {
        std::mem::swap(&mut background, &mut foreground);
    }

    scratch.copy_from(buf);
    buf.fill(background);

    let ramp = p.chars.chars();
    let max_index = ramp.len() - 1;

    for row in 0..rows {
        let y0 = row as f32 * cell_h;
        // One sample per cell, taken at the cell center.
        let sy = ((y0 + cell_h / 2.0) as u32).min(scratch.height() - 1);
        for col in 0..cols {
            let x0 = col as f32 * cell_w;
            let sx = ((x0 + cell_w / 2.0) as u32).min(scratch.width() - 1);
            let sample = scratch.pixel(sx, sy);

            let mut brightness = color::luminance(sample.r, sample.g, sample.b);
            brightness = ((brightness - 0.5) * p.contrast + 0.5).clamp(0.0, 1.0);

            let index = ((1.0 - brightness) * max_index as f32).floor() as usize;
            let glyph = ramp[index.min(max_index)];
            if glyph == ' ' {
                continue;
            }
            let color = if p.color_mode { sample } else { foreground };
            font::draw_char_scaled(
                buf,
                glyph,
                x0 as i64,
                y0 as i64,
                cell_w as u32,
                cell_h as u32,
                color,
            );
        }
    }
}
