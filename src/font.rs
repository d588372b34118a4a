//! Embedded 5x7 bitmap face used by the text overlay and ascii stages.
//!
//! Glyphs are stored column-major, one byte per column, bit `i` of a column
//! being the pixel in row `i`. Coverage is printable ASCII plus the four
//! shade blocks the `blocks` glyph ramp needs, drawn as density stipples.

use crate::core::{PixelBuffer, Rgba8};

/// Native glyph cell width in columns.
pub const GLYPH_W: u32 = 5;
/// Native glyph cell height in rows.
pub const GLYPH_H: u32 = 7;

#[rustfmt::skip]
const ASCII_GLYPHS: [[u8; 5]; 95] = [
    [0x00, 0x00, 0x00, 0x00, 0x00], // ' '
    [0x00, 0x00, 0x5F, 0x00, 0x00], // '!'
    [0x00, 0x07, 0x00, 0x07, 0x00], // '"'
    [0x14, 0x7F, 0x14, 0x7F, 0x14], // '#'
    [0x24, 0x2A, 0x7F, 0x2A, 0x12], // '$'
    [0x23, 0x13, 0x08, 0x64, 0x62], // '%'
    [0x36, 0x49, 0x55, 0x22, 0x50], // '&'
    [0x00, 0x05, 0x03, 0x00, 0x00], // '\''
    [0x00, 0x1C, 0x22, 0x41, 0x00], // '('
    [0x00, 0x41, 0x22, 0x1C, 0x00], // ')'
    [0x14, 0x08, 0x3E, 0x08, 0x14], // '*'
    [0x08, 0x08, 0x3E, 0x08, 0x08], // '+'
    [0x00, 0x50, 0x30, 0x00, 0x00], // ','
    [0x08, 0x08, 0x08, 0x08, 0x08], // '-'
    [0x00, 0x60, 0x60, 0x00, 0x00], // '.'
    [0x20, 0x10, 0x08, 0x04, 0x02], // '/'
    [0x3E, 0x51, 0x49, 0x45, 0x3E], // '0'
    [0x00, 0x42, 0x7F, 0x40, 0x00], // '1'
    [0x42, 0x61, 0x51, 0x49, 0x46], // '2'
    [0x21, 0x41, 0x45, 0x4B, 0x31], // '3'
    [0x18, 0x14, 0x12, 0x7F, 0x10], // '4'
    [0x27, 0x45, 0x45, 0x45, 0x39], // '5'
    [0x3C, 0x4A, 0x49, 0x49, 0x30], // '6'
    [0x01, 0x71, 0x09, 0x05, 0x03], // '7'
    [0x36, 0x49, 0x49, 0x49, 0x36], // '8'
    [0x06, 0x49, 0x49, 0x29, 0x1E], // '9'
    [0x00, 0x36, 0x36, 0x00, 0x00], // ':'
    [0x00, 0x56, 0x36, 0x00, 0x00], // ';'
    [0x08, 0x14, 0x22, 0x41, 0x00], // '<'
    [0x14, 0x14, 0x14, 0x14, 0x14], // '='
    [0x00, 0x41, 0x22, 0x14, 0x08], // '>'
    [0x02, 0x01, 0x51, 0x09, 0x06], // '?'
    [0x32, 0x49, 0x79, 0x41, 0x3E], // '@'
    [0x7E, 0x11, 0x11, 0x11, 0x7E], // 'A'
    [0x7F, 0x49, 0x49, 0x49, 0x36], // 'B'
    [0x3E, 0x41, 0x41, 0x41, 0x22], // 'C'
    [0x7F, 0x41, 0x41, 0x22, 0x1C], // 'D'
    [0x7F, 0x49, 0x49, 0x49, 0x41], // 'E'
    [0x7F, 0x09, 0x09, 0x09, 0x01], // 'F'
    [0x3E, 0x41, 0x49, 0x49, 0x7A], // 'G'
    [0x7F, 0x08, 0x08, 0x08, 0x7F], // 'H'
    [0x00, 0x41, 0x7F, 0x41, 0x00], // 'I'
    [0x20, 0x40, 0x41, 0x3F, 0x01], // 'J'
    [0x7F, 0x08, 0x14, 0x22, 0x41], // 'K'
    [0x7F, 0x40, 0x40, 0x40, 0x40], // 'L'
    [0x7F, 0x02, 0x0C, 0x02, 0x7F], // 'M'
    [0x7F, 0x04, 0x08, 0x10, 0x7F], // 'N'
    [0x3E, 0x41, 0x41, 0x41, 0x3E], // 'O'
    [0x7F, 0x09, 0x09, 0x09, 0x06], // 'P'
    [0x3E, 0x41, 0x51, 0x21, 0x5E], // 'Q'
    [0x7F, 0x09, 0x19, 0x29, 0x46], // 'R'
    [0x46, 0x49, 0x49, 0x49, 0x31], // 'S'
    [0x01, 0x01, 0x7F, 0x01, 0x01], // 'T'
    [0x3F, 0x40, 0x40, 0x40, 0x3F], // 'U'
    [0x1F, 0x20, 0x40, 0x20, 0x1F], // 'V'
    [0x3F, 0x40, 0x38, 0x40, 0x3F], // 'W'
    [0x63, 0x14, 0x08, 0x14, 0x63], // 'X'
    [0x07, 0x08, 0x70, 0x08, 0x07], // 'Y'
    [0x61, 0x51, 0x49, 0x45, 0x43], // 'Z'
    [0x00, 0x7F, 0x41, 0x41, 0x00], // '['
    [0x02, 0x04, 0x08, 0x10, 0x20], // '\\'
    [0x00, 0x41, 0x41, 0x7F, 0x00], // ']'
    [0x04, 0x02, 0x01, 0x02, 0x04], // '^'
    [0x40, 0x40, 0x40, 0x40, 0x40], // '_'
    [0x00, 0x01, 0x02, 0x04, 0x00], // '`'
    [0x20, 0x54, 0x54, 0x54, 0x78], // 'a'
    [0x7F, 0x48, 0x44, 0x44, 0x38], // 'b'
    [0x38, 0x44, 0x44, 0x44, 0x20], // 'c'
    [0x38, 0x44, 0x44, 0x48, 0x7F], // 'd'
    [0x38, 0x54, 0x54, 0x54, 0x18], // 'e'
    [0x08, 0x7E, 0x09, 0x01, 0x02], // 'f'
    [0x0C, 0x52, 0x52, 0x52, 0x3E], // 'g'
    [0x7F, 0x08, 0x04, 0x04, 0x78], // 'h'
    [0x00, 0x44, 0x7D, 0x40, 0x00], // 'i'
    [0x20, 0x40, 0x44, 0x3D, 0x00], // 'j'
    [0x7F, 0x10, 0x28, 0x44, 0x00], // 'k'
    [0x00, 0x41, 0x7F, 0x40, 0x00], // 'l'
    [0x7C, 0x04, 0x18, 0x04, 0x78], // 'm'
    [0x7C, 0x08, 0x04, 0x04, 0x78], // 'n'
    [0x38, 0x44, 0x44, 0x44, 0x38], // 'o'
    [0x7C, 0x14, 0x14, 0x14, 0x08], // 'p'
    [0x08, 0x14, 0x14, 0x18, 0x7C], // 'q'
    [0x7C, 0x08, 0x04, 0x04, 0x08], // 'r'
    [0x48, 0x54, 0x54, 0x54, 0x20], // 's'
    [0x04, 0x3F, 0x44, 0x40, 0x20], // 't'
    [0x3C, 0x40, 0x40, 0x20, 0x7C], // 'u'
    [0x1C, 0x20, 0x40, 0x20, 0x1C], // 'v'
    [0x3C, 0x40, 0x30, 0x40, 0x3C], // 'w'
    [0x44, 0x28, 0x10, 0x28, 0x44], // 'x'
    [0x0C, 0x50, 0x50, 0x50, 0x3C], // 'y'
    [0x44, 0x64, 0x54, 0x4C, 0x44], // 'z'
    [0x00, 0x08, 0x36, 0x41, 0x00], // '{'
    [0x00, 0x00, 0x7F, 0x00, 0x00], // '|'
    [0x00, 0x41, 0x36, 0x08, 0x00], // '}'
    [0x08, 0x04, 0x08, 0x10, 0x08], // '~'
];

// Shade blocks rendered as density stipples, light to full.
const LIGHT_SHADE: [u8; 5] = [0x11, 0x44, 0x11, 0x44, 0x11];
const MEDIUM_SHADE: [u8; 5] = [0x55, 0x2A, 0x55, 0x2A, 0x55];
const DARK_SHADE: [u8; 5] = [0x6E, 0x3B, 0x6E, 0x3B, 0x6E];
const FULL_BLOCK: [u8; 5] = [0x7F, 0x7F, 0x7F, 0x7F, 0x7F];

/// Column bitmap for `ch`, or `None` when the face has no coverage.
pub fn glyph(ch: char) -> Option<&'static [u8; 5]> {
    match ch {
        ' '..='~' => Some(&ASCII_GLYPHS[(ch as usize) - 0x20]),
        '░' => Some(&LIGHT_SHADE),
        '▒' => Some(&MEDIUM_SHADE),
        '▓' => Some(&DARK_SHADE),
        '█' => Some(&FULL_BLOCK),
        _ => None,
    }
}

/// Blit one glyph into the rectangle at `(x0, y0)` sized `cell_w x cell_h`,
/// nearest-neighbor scaled from the 5x7 bitmap, clipped to the buffer.
/// Pixels outside the glyph mask are left untouched (plain overwrite
/// compositing for set pixels only).
pub fn draw_char_scaled(
    buf: &mut PixelBuffer,
    ch: char,
    x0: i64,
    y0: i64,
    cell_w: u32,
    cell_h: u32,
    color: Rgba8,
) {
    let Some(bitmap) = glyph(ch) else {
        return;
    };
    if cell_w == 0 || cell_h == 0 {
        return;
    }
    let (w, h) = (i64::from(buf.width()), i64::from(buf.height()));
    for oy in 0..i64::from(cell_h) {
        let py = y0 + oy;
        if py < 0 || py >= h {
            continue;
        }
        let row = (oy as u64 * u64::from(GLYPH_H) / u64::from(cell_h)) as u8;
        for ox in 0..i64::from(cell_w) {
            let px = x0 + ox;
            if px < 0 || px >= w {
                continue;
            }
            let col = (ox as u64 * u64::from(GLYPH_W) / u64::from(cell_w)) as usize;
            if bitmap[col] >> row & 1 == 1 {
                buf.put_pixel(px as u32, py as u32, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_ascii_coverage() {
        for code in 0x20u32..=0x7E {
            let ch = char::from_u32(code).unwrap();
            assert!(glyph(ch).is_some(), "missing glyph for {ch:?}");
        }
    }

    #[test]
    fn shade_blocks_increase_in_density() {
        let density = |g: &[u8; 5]| -> u32 { g.iter().map(|c| c.count_ones()).sum() };
        let ramp = ['░', '▒', '▓', '█'].map(|c| density(glyph(c).unwrap()));
        assert!(ramp.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn unknown_glyph_is_skipped() {
        assert!(glyph('é').is_none());
        let mut buf = PixelBuffer::new(8, 8);
        draw_char_scaled(&mut buf, 'é', 0, 0, 8, 8, Rgba8::WHITE);
        assert!(buf.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn draw_clips_to_buffer() {
        let mut buf = PixelBuffer::new(4, 4);
        draw_char_scaled(&mut buf, '█', -2, -2, 8, 8, Rgba8::WHITE);
        assert_eq!(buf.pixel(0, 0), Rgba8::WHITE);
    }

    #[test]
    fn space_draws_nothing() {
        let mut buf = PixelBuffer::new(8, 8);
        draw_char_scaled(&mut buf, ' ', 0, 0, 8, 8, Rgba8::WHITE);
        assert!(buf.data().iter().all(|&b| b == 0));
    }
}
