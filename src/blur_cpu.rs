//! Separable gaussian blur over straight-alpha RGBA8, fixed-point Q16
//! kernel weights so the hot loops stay in integer arithmetic.

use crate::core::PixelBuffer;

/// Blur `buf` in place with the given radius in pixels. `scratch` holds the
/// intermediate horizontal pass and is resized to match `buf`. Radius below
/// one pixel is a no-op.
pub fn blur_in_place(buf: &mut PixelBuffer, scratch: &mut PixelBuffer, radius_px: f32) {
    if !radius_px.is_finite() || radius_px < 1.0 {
        return;
    }
    let radius = (radius_px.ceil() as u32).min(256);
    let sigma = (radius_px / 2.0).max(0.25);
    let kernel = gaussian_kernel_q16(radius, sigma);

    let (w, h) = (buf.width(), buf.height());
    scratch.resize(w, h);
    horizontal_pass(buf.data(), scratch.data_mut(), w, h, &kernel);
    vertical_pass(scratch.data(), buf.data_mut(), w, h, &kernel);
}

/// Kernel weights summing to exactly 1 << 16; length `2 * radius + 1`.
fn gaussian_kernel_q16(radius: u32, sigma: f32) -> Vec<u32> {
    let r = radius as i32;
    let denom = 2.0 * f64::from(sigma) * f64::from(sigma);
    let mut weights_f = Vec::with_capacity((2 * r + 1) as usize);
    let mut sum = 0.0f64;
    for i in -r..=r {
        let x = f64::from(i);
        let w = (-x * x / denom).exp();
        weights_f.push(w);
        sum += w;
    }

    let mut weights = Vec::with_capacity(weights_f.len());
    let mut acc: i64 = 0;
    for &wf in &weights_f {
        let q = (((wf / sum) * 65536.0).round() as i64).clamp(0, 65536);
        weights.push(q as u32);
        acc += q;
    }
    // Dump rounding error into the center tap so the weights sum to one.
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        weights[mid] = (i64::from(weights[mid]) + delta).clamp(0, 65536) as u32;
    }
    weights
}

fn horizontal_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    for y in 0..height as i32 {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sx = (x + ki as i32 - radius).clamp(0, w - 1);
                let idx = ((y * w + sx) as usize) * 4;
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn vertical_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    let h = height as i32;
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sy = (y + ki as i32 - radius).clamp(0, h - 1);
                let idx = ((sy * w + x) as usize) * 4;
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

#[inline]
fn q16_to_u8(acc: u64) -> u8 {
    (((acc + 32768) >> 16).min(255)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Rgba8;

    #[test]
    fn sub_pixel_radius_is_identity() {
        let mut buf = PixelBuffer::new(4, 4);
        buf.put_pixel(1, 1, Rgba8::opaque(10, 20, 30));
        let before = buf.clone();
        let mut scratch = PixelBuffer::new(1, 1);
        blur_in_place(&mut buf, &mut scratch, 0.5);
        assert_eq!(buf, before);
    }

    #[test]
    fn constant_image_is_unchanged() {
        let mut buf = PixelBuffer::new(5, 3);
        buf.fill(Rgba8::opaque(40, 80, 120));
        let before = buf.clone();
        let mut scratch = PixelBuffer::new(1, 1);
        blur_in_place(&mut buf, &mut scratch, 3.0);
        assert_eq!(buf, before);
    }

    #[test]
    fn energy_spreads_from_single_pixel() {
        let mut buf = PixelBuffer::new(5, 5);
        buf.put_pixel(2, 2, Rgba8::WHITE);
        let mut scratch = PixelBuffer::new(1, 1);
        blur_in_place(&mut buf, &mut scratch, 2.0);

        let lit = buf
            .data()
            .chunks_exact(4)
            .filter(|px| px[0] != 0 || px[3] != 0)
            .count();
        assert!(lit > 1);
        assert!(buf.pixel(2, 2).r < 255);
    }

    #[test]
    fn kernel_weights_sum_to_q16_one() {
        for (radius, sigma) in [(1u32, 0.5f32), (3, 1.5), (8, 4.0)] {
            let k = gaussian_kernel_q16(radius, sigma);
            assert_eq!(k.len() as u32, radius * 2 + 1);
            assert_eq!(k.iter().map(|&w| u64::from(w)).sum::<u64>(), 65536);
        }
    }
}
