//! Cross-source blend stage: composites a second raster into the working
//! buffer under one of four algorithms. The second source is resampled to
//! working dimensions before any mode runs; a missing source makes the whole
//! stage a no-op upstream.

use image::{RgbaImage, imageops};

use crate::{
    core::PixelBuffer,
    error::{RasterfxError, RasterfxResult},
    params::{BlendMode, BlendParams},
};

/// Resample an arbitrary-size RGBA raster into `dst` at `dst`'s dimensions.
/// Matching dimensions degrade to a straight copy.
pub fn resample_source(dst: &mut PixelBuffer, src: &[u8], src_w: u32, src_h: u32) -> RasterfxResult<()> {
    if src.len() != (src_w as usize) * (src_h as usize) * 4 {
        return Err(RasterfxError::evaluation(
            "blend source length does not match its dimensions",
        ));
    }
    if src_w == dst.width() && src_h == dst.height() {
        return dst.copy_from_raw(src);
    }

    let img = RgbaImage::from_raw(src_w, src_h, src.to_vec())
        .ok_or_else(|| RasterfxError::evaluation("blend source raster is malformed"))?;
    let resized = imageops::resize(&img, dst.width(), dst.height(), imageops::FilterType::Triangle);
    dst.copy_from_raw(resized.as_raw())
}

/// Apply the active blend mode. `b` must already be resampled to the working
/// dimensions; `scratch` receives the pre-mutation snapshot the displacement
/// mode reads from.
pub fn apply(
    buf: &mut PixelBuffer,
    scratch: &mut PixelBuffer,
    b: &PixelBuffer,
    params: &BlendParams,
    rng: &mut fastrand::Rng,
) -> RasterfxResult<()> {
    if b.width() != buf.width() || b.height() != buf.height() {
        return Err(RasterfxError::evaluation(
            "blend source must match working buffer dimensions",
        ));
    }
    let p = params.clamped();
    match p.mode {
        BlendMode::Displacement => displacement(buf, scratch, b, &p, rng),
        BlendMode::Difference => difference(buf, b, &p, rng),
        BlendMode::HardMix => hard_mix(buf, b, &p),
        BlendMode::Interlace => interlace(buf, b, &p),
    }
    Ok(())
}

/// Per-pixel displacement driven by the second source's red/green channels.
/// Each channel maps to a signed offset in [-scale*2, scale*2]; a pixel is
/// replaced with probability `mix/100` from the snapshot at the displaced
/// position (self-referential read, hence the snapshot).
fn displacement(
    buf: &mut PixelBuffer,
    scratch: &mut PixelBuffer,
    b: &PixelBuffer,
    p: &BlendParams,
    rng: &mut fastrand::Rng,
) {
    scratch.copy_from(buf);
    let (w, h) = (buf.width(), buf.height());
    let gate = 1.0 - p.mix / 100.0;
    let amp = p.scale * 2.0;

    for y in 0..h {
        for x in 0..w {
            if rng.f32() <= gate {
                continue;
            }
            let ctrl = b.pixel(x, y);
            let dx = ((f32::from(ctrl.r) / 127.5 - 1.0) * amp).floor() as i64;
            let dy = ((f32::from(ctrl.g) / 127.5 - 1.0) * amp).floor() as i64;
            let sx = (i64::from(x) + dx).clamp(0, i64::from(w) - 1) as u32;
            let sy = (i64::from(y) + dy).clamp(0, i64::from(h) - 1) as u32;
            buf.put_pixel(x, y, scratch.pixel(sx, sy));
        }
    }
}

/// Per-pixel absolute channel difference, gated stochastically by `mix`.
fn difference(buf: &mut PixelBuffer, b: &PixelBuffer, p: &BlendParams, rng: &mut fastrand::Rng) {
    let chance = p.mix / 100.0;
    let b_data = b.data();
    for (i, px) in buf.data_mut().chunks_exact_mut(4).enumerate() {
        if rng.f32() >= chance {
            continue;
        }
        let o = i * 4;
        for c in 0..3 {
            px[c] = px[c].abs_diff(b_data[o + c]);
        }
    }
}

/// Average the two sources per channel, then push past `threshold` toward
/// white and below it toward black by `mix * 2.55`.
fn hard_mix(buf: &mut PixelBuffer, b: &PixelBuffer, p: &BlendParams) {
    let push = p.mix * 2.55;
    let threshold = f32::from(p.threshold);
    let b_data = b.data();
    for (i, px) in buf.data_mut().chunks_exact_mut(4).enumerate() {
        let o = i * 4;
        for c in 0..3 {
            let avg = (f32::from(px[c]) + f32::from(b_data[o + c])) / 2.0;
            let v = if avg > threshold { avg + push } else { avg - push };
            px[c] = v.clamp(0.0, 255.0) as u8;
        }
    }
}

/// Replace every even-indexed band of rows with the second source's bytes.
/// Band height derives from `scale`; `mix` at or below 10 disables the pass.
fn interlace(buf: &mut PixelBuffer, b: &PixelBuffer, p: &BlendParams) {
    if p.mix <= 10.0 {
        return;
    }
    let band_h = ((p.scale / 10.0).floor() as u32).max(1);
    let row_bytes = (buf.width() as usize) * 4;
    let b_data = b.data();
    for y in 0..buf.height() {
        if (y / band_h) % 2 != 0 {
            continue;
        }
        let start = (y as usize) * row_bytes;
        buf.data_mut()[start..start + row_bytes]
            .copy_from_slice(&b_data[start..start + row_bytes]);
    }
}
