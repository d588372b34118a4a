//! Base-frame stage: draws the source into the working buffer with scale,
//! mirror and jitter, then runs the composed color filter and the optional
//! luminance-threshold silhouette pass. Always on; everything downstream
//! layers over its output.

use crate::{
    blur_cpu,
    color::ColorMatrix,
    core::{PixelBuffer, Rgba8},
    params::GlobalParams,
};

pub fn apply(
    buf: &mut PixelBuffer,
    scratch: &mut PixelBuffer,
    src: &[u8],
    src_w: u32,
    src_h: u32,
    params: &GlobalParams,
    mirror: bool,
    rng: &mut fastrand::Rng,
) {
    let p = params.clamped();
    draw_source(buf, src, src_w, src_h, &p, mirror, rng);
    blur_cpu::blur_in_place(buf, scratch, p.blur);
    apply_color_matrix(buf, &p);
    if p.threshold > 0 {
        apply_threshold(buf, p.threshold);
    }
}

/// Nearest-neighbor draw of the source, centered, scaled independently per
/// axis, horizontally mirrored on request and offset by the per-frame jitter
/// vector. Output pixels with no source coverage stay transparent.
fn draw_source(
    buf: &mut PixelBuffer,
    src: &[u8],
    src_w: u32,
    src_h: u32,
    p: &GlobalParams,
    mirror: bool,
    rng: &mut fastrand::Rng,
) {
    buf.fill(Rgba8::TRANSPARENT);
    if src_w == 0 || src_h == 0 || src.len() != (src_w as usize) * (src_h as usize) * 4 {
        return;
    }

    let (w, h) = (buf.width(), buf.height());
    // Base fit scale maps the (possibly capped) source onto the buffer.
    let fit = (w as f32 / src_w as f32).min(h as f32 / src_h as f32);
    let sx = fit * p.scale_x;
    let sy = fit * p.scale_y;

    // Fresh random draw every frame; a nonzero vibration forces continuous
    // re-rendering upstream.
    let jx = if p.vibration > 0.0 {
        (rng.f32() * 2.0 - 1.0) * p.vibration
    } else {
        0.0
    };
    let jy = if p.vibration > 0.0 {
        (rng.f32() * 2.0 - 1.0) * p.vibration
    } else {
        0.0
    };

    let cx = w as f32 / 2.0 + jx;
    let cy = h as f32 / 2.0 + jy;
    let (half_sw, half_sh) = (src_w as f32 / 2.0, src_h as f32 / 2.0);

    for y in 0..h {
        let v = (y as f32 + 0.5 - cy) / sy + half_sh;
        if v < 0.0 || v >= src_h as f32 {
            continue;
        }
        let sv = v as u32;
        for x in 0..w {
            let mut u = (x as f32 + 0.5 - cx) / sx + half_sw;
            if mirror {
                u = src_w as f32 - u;
            }
            if u < 0.0 || u >= src_w as f32 {
                continue;
            }
            let su = u as u32;
            let i = ((sv * src_w + su) as usize) * 4;
            buf.put_pixel(
                x,
                y,
                Rgba8 {
                    r: src[i],
                    g: src[i + 1],
                    b: src[i + 2],
                    a: src[i + 3],
                },
            );
        }
    }
}

/// Brightness, hue rotation and saturation folded into one 3x3 matrix;
/// neutral values skip the pass entirely.
fn apply_color_matrix(buf: &mut PixelBuffer, p: &GlobalParams) {
    let mut m = ColorMatrix::IDENTITY;
    if p.brightness != 1.0 {
        m = ColorMatrix::brightness(p.brightness).then(m);
    }
    if p.colormatrix != 0.0 {
        m = ColorMatrix::hue_rotate(p.colormatrix).then(m);
    }
    if p.saturation != 1.0 {
        m = ColorMatrix::saturate(p.saturation).then(m);
    }
    if m.is_identity() {
        return;
    }

    for px in buf.data_mut().chunks_exact_mut(4) {
        let (r, g, b) = m.apply(px[0], px[1], px[2]);
        px[0] = r;
        px[1] = g;
        px[2] = b;
    }
}

/// Binary silhouette: average brightness at or above `threshold` goes white,
/// below goes black. Alpha untouched. Idempotent for a fixed threshold.
pub fn apply_threshold(buf: &mut PixelBuffer, threshold: u8) {
    let t = u16::from(threshold);
    for px in buf.data_mut().chunks_exact_mut(4) {
        let brightness = (u16::from(px[0]) + u16::from(px[1]) + u16::from(px[2])) / 3;
        let v = if brightness >= t { 255 } else { 0 };
        px[0] = v;
        px[1] = v;
        px[2] = v;
    }
}
