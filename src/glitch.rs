//! Glitch corruption stage: four independent passes in fixed order, each a
//! no-op at its neutral parameter. All channel math saturates to [0, 255]
//! and every random draw comes from the pipeline's seeded generator.

use crate::{core::PixelBuffer, params::GlitchParams};

pub fn apply(
    buf: &mut PixelBuffer,
    scratch: &mut PixelBuffer,
    params: &GlitchParams,
    rng: &mut fastrand::Rng,
) {
    let p = params.clamped();
    if p.pixel_sort > 0.0 {
        pixel_sort_rows(buf, p.pixel_sort, rng);
    }
    if p.block_shift > 0.0 {
        block_displacement(buf, p.block_shift, rng);
    }
    if p.rgb_shift > 0.0 {
        channel_shift(buf, scratch, p.rgb_shift as u32);
    }
    if p.scanlines > 0.0 {
        scanline_degradation(buf, p.scanlines, rng);
    }
}

/// Stable-sort the pixels of randomly selected rows by ascending brightness
/// (plain R+G+B sum). Row indices are drawn independently, so rows may repeat
/// and not every row is visited.
fn pixel_sort_rows(buf: &mut PixelBuffer, amount: f32, rng: &mut fastrand::Rng) {
    let (w, h) = (buf.width(), buf.height());
    if w == 0 || h == 0 {
        return;
    }
    let count = ((h as f32) * amount / 100.0).floor() as u32;

    let mut row: Vec<[u8; 4]> = Vec::with_capacity(w as usize);
    for _ in 0..count {
        let y = rng.u32(0..h);
        row.clear();
        for x in 0..w {
            row.push(buf.pixel(x, y).to_array());
        }
        row.sort_by_key(|px| u16::from(px[0]) + u16::from(px[1]) + u16::from(px[2]));
        let start = buf.offset(0, y);
        let dst = &mut buf.data_mut()[start..start + (w as usize) * 4];
        for (chunk, px) in dst.chunks_exact_mut(4).zip(&row) {
            chunk.copy_from_slice(px);
        }
    }
}

/// Copy randomly sized rectangles to randomly shifted destinations. Both
/// rectangles are clamped fully in bounds; overlapping copies are fine and
/// later blocks may overwrite earlier ones.
fn block_displacement(buf: &mut PixelBuffer, amount: f32, rng: &mut fastrand::Rng) {
    let (w, h) = (buf.width() as i64, buf.height() as i64);
    if w < 2 || h < 3 {
        return;
    }
    let blocks = (amount / 100.0 * 30.0).floor() as u32;

    for _ in 0..blocks {
        let max_bw = (w / 4).max(10).min(w);
        let bw = if max_bw <= 10 { max_bw } else { rng.i64(10..=max_bw) };
        let bh = rng.i64(2..=50.min(h));

        let sx = rng.i64(0..=w - bw);
        let sy = rng.i64(0..=h - bh);
        let dx = rng.i64(-50..=50);
        let dy = rng.i64(-10..=10);
        let tx = (sx + dx).clamp(0, w - bw);
        let ty = (sy + dy).clamp(0, h - bh);

        copy_block(buf, sx, sy, tx, ty, bw, bh);
    }
}

fn copy_block(buf: &mut PixelBuffer, sx: i64, sy: i64, tx: i64, ty: i64, bw: i64, bh: i64) {
    let row_bytes = (bw as usize) * 4;
    for dy in 0..bh {
        let src = buf.offset(sx as u32, (sy + dy) as u32);
        let dst = buf.offset(tx as u32, (ty + dy) as u32);
        buf.data_mut().copy_within(src..src + row_bytes, dst);
    }
}

/// Wrap-around horizontal shift of the red channel only, read from a
/// snapshot so the scan never reads its own writes.
fn channel_shift(buf: &mut PixelBuffer, scratch: &mut PixelBuffer, offset: u32) {
    let (w, h) = (buf.width(), buf.height());
    if w == 0 || offset == 0 {
        return;
    }
    scratch.copy_from(buf);
    for y in 0..h {
        for x in 0..w {
            let shifted = scratch.pixel((x + offset) % w, y);
            let i = buf.offset(x, y);
            buf.data_mut()[i] = shifted.r;
        }
    }
}

/// Darken every n-th row and sprinkle per-pixel noise. Higher `amount`
/// tightens the line spacing, weakens the darkening and raises the noise
/// probability.
fn scanline_degradation(buf: &mut PixelBuffer, amount: f32, rng: &mut fastrand::Rng) {
    let line_skip = 2 + ((10.0 - amount) / 2.0).floor() as u32;
    let factor = 0.5 + (10.0 - amount) / 20.0;
    let noise_chance = amount * 0.01;

    let (w, h) = (buf.width(), buf.height());
    for y in (0..h).step_by(line_skip as usize) {
        for x in 0..w {
            let i = buf.offset(x, y);
            let px = &mut buf.data_mut()[i..i + 3];
            for c in px.iter_mut() {
                *c = (f32::from(*c) * factor) as u8;
            }
            if rng.f32() < noise_chance {
                let i = buf.offset(x, y);
                let px = &mut buf.data_mut()[i..i + 3];
                for c in px.iter_mut() {
                    let noise = rng.i32(-25..=25);
                    *c = (i32::from(*c) + noise).clamp(0, 255) as u8;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Rgba8;

    fn rng(seed: u64) -> fastrand::Rng {
        fastrand::Rng::with_seed(seed)
    }

    fn gradient(w: u32, h: u32) -> PixelBuffer {
        let mut buf = PixelBuffer::new(w, h);
        for y in 0..h {
            for x in 0..w {
                let v = ((x * 7 + y * 13) % 256) as u8;
                buf.put_pixel(x, y, Rgba8::opaque(v, v ^ 0x55, 255 - v));
            }
        }
        buf
    }

    #[test]
    fn neutral_params_leave_buffer_unchanged() {
        let mut buf = gradient(16, 16);
        let before = buf.clone();
        let mut scratch = PixelBuffer::new(1, 1);
        apply(&mut buf, &mut scratch, &GlitchParams::default(), &mut rng(1));
        assert_eq!(buf, before);
    }

    #[test]
    fn channel_shift_zero_is_identity() {
        let mut buf = gradient(8, 8);
        let before = buf.clone();
        let mut scratch = PixelBuffer::new(1, 1);
        channel_shift(&mut buf, &mut scratch, 0);
        assert_eq!(buf, before);
    }

    #[test]
    fn channel_shift_wraps_red_only() {
        let mut buf = gradient(8, 4);
        let before = buf.clone();
        let mut scratch = PixelBuffer::new(1, 1);
        channel_shift(&mut buf, &mut scratch, 3);
        for y in 0..4 {
            for x in 0..8 {
                let got = buf.pixel(x, y);
                let want_r = before.pixel((x + 3) % 8, y).r;
                let orig = before.pixel(x, y);
                assert_eq!(got.r, want_r);
                assert_eq!(got.g, orig.g);
                assert_eq!(got.b, orig.b);
                assert_eq!(got.a, orig.a);
            }
        }
    }

    #[test]
    fn full_width_shift_is_identity() {
        let mut buf = gradient(8, 2);
        let before = buf.clone();
        let mut scratch = PixelBuffer::new(1, 1);
        channel_shift(&mut buf, &mut scratch, 8);
        assert_eq!(buf, before);
    }

    #[test]
    fn pixel_sort_orders_selected_rows() {
        let mut buf = gradient(16, 4);
        pixel_sort_rows(&mut buf, 100.0, &mut rng(3));
        // At least one row must now be non-decreasing in brightness.
        let sorted_rows = (0..4)
            .filter(|&y| {
                let sums: Vec<u16> = (0..16)
                    .map(|x| {
                        let p = buf.pixel(x, y);
                        u16::from(p.r) + u16::from(p.g) + u16::from(p.b)
                    })
                    .collect();
                sums.windows(2).all(|w| w[0] <= w[1])
            })
            .count();
        assert!(sorted_rows >= 1);
    }

    #[test]
    fn pixel_sort_preserves_row_multiset() {
        let mut buf = gradient(8, 2);
        let mut before: Vec<[u8; 4]> = buf.data().chunks_exact(4).map(|c| c.try_into().unwrap()).collect();
        pixel_sort_rows(&mut buf, 50.0, &mut rng(4));
        let mut after: Vec<[u8; 4]> = buf.data().chunks_exact(4).map(|c| c.try_into().unwrap()).collect();
        before.sort_unstable();
        after.sort_unstable();
        assert_eq!(before, after);
    }

    #[test]
    fn block_displacement_stays_in_bounds() {
        // Many seeds; the pass must never index outside the buffer (a panic
        // here would fail the test) and must keep alpha opaque.
        for seed in 0..50u64 {
            let mut buf = gradient(64, 48);
            block_displacement(&mut buf, 100.0, &mut rng(seed));
            assert!(buf.data().chunks_exact(4).all(|px| px[3] == 255));
        }
    }

    #[test]
    fn block_displacement_tiny_buffer_is_safe() {
        let mut buf = gradient(12, 5);
        block_displacement(&mut buf, 100.0, &mut rng(11));
    }

    #[test]
    fn scanlines_darken_every_skip_row() {
        let mut buf = PixelBuffer::new(4, 10);
        buf.fill(Rgba8::opaque(200, 200, 200));
        // amount 10: line_skip = 2, factor = 0.5, noise 10%.
        scanline_degradation(&mut buf, 10.0, &mut rng(5));
        for y in (0..10).step_by(2) {
            let px = buf.pixel(0, y);
            // Darkened to ~100 with up to +/-25 noise.
            assert!(px.r <= 125, "row {y} should be darkened, got {}", px.r);
        }
        assert_eq!(buf.pixel(0, 1).r, 200);
    }

    #[test]
    fn determinism_per_seed() {
        let run = |seed| {
            let mut buf = gradient(32, 32);
            let mut scratch = PixelBuffer::new(1, 1);
            let p = GlitchParams {
                pixel_sort: 30.0,
                block_shift: 70.0,
                rgb_shift: 5.0,
                scanlines: 6.0,
            };
            apply(&mut buf, &mut scratch, &p, &mut rng(seed));
            buf
        };
        assert_eq!(run(42), run(42));
        assert_ne!(run(42), run(43));
    }
}
