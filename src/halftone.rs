//! Halftone stage: resamples the working buffer into a rotated lattice of
//! variable-size dots, classic angled dot-screen style.

use crate::{
    color,
    core::{PixelBuffer, Rgba8},
    params::{HalftoneParams, HalftoneShape},
};

pub fn apply(buf: &mut PixelBuffer, scratch: &mut PixelBuffer, params: &HalftoneParams) {
    let p = params.clamped();
    let (w, h) = (buf.width(), buf.height());
    if w == 0 || h == 0 {
        return;
    }

    scratch.copy_from(buf);
    buf.fill(p.background_color);

    let pitch = p.radius * 1.5;
    let rad = p.angle.to_radians();
    let (sin, cos) = rad.sin_cos();
    let (cx, cy) = (w as f32 / 2.0, h as f32 / 2.0);

    // The lattice over-scans by the longer edge so rotated corners stay
    // covered.
    let margin = w.max(h) as f32;
    let mut gy = -margin;
    while gy < h as f32 + margin {
        let mut gx = -margin;
        while gx < w as f32 + margin {
            // Map the grid point out of rotated lattice space.
            let sx = cos * (gx - cx) - sin * (gy - cy) + cx;
            let sy = sin * (gx - cx) + cos * (gy - cy) + cy;
            gx += pitch;

            if sx < 0.0 || sx >= w as f32 || sy < 0.0 || sy >= h as f32 {
                continue;
            }
            let sample = scratch.pixel(sx as u32, sy as u32);
            let mut brightness = color::luminance(sample.r, sample.g, sample.b);
            brightness = ((brightness - 0.5) * p.contrast + 0.5).clamp(0.0, 1.0);

            let size = (1.0 - brightness) * p.radius;
            if size <= 0.5 {
                continue;
            }
            let dot_color = if p.color_mode { sample } else { p.color };
            draw_dot(buf, sx, sy, size, p.radius, p.shape, dot_color);
        }
        gy += pitch;
    }
}

fn draw_dot(
    buf: &mut PixelBuffer,
    cx: f32,
    cy: f32,
    size: f32,
    radius: f32,
    shape: HalftoneShape,
    color: Rgba8,
) {
    // Line dots keep a fixed width; only their length tracks darkness.
    let (half_w, half_h) = match shape {
        HalftoneShape::Line => ((radius * 0.25).max(0.5), size),
        _ => (size, size),
    };

    let (w, h) = (buf.width() as i64, buf.height() as i64);
    let x0 = ((cx - half_w).floor() as i64).max(0);
    let x1 = ((cx + half_w).ceil() as i64).min(w - 1);
    let y0 = ((cy - half_h).floor() as i64).max(0);
    let y1 = ((cy + half_h).ceil() as i64).min(h - 1);

    for py in y0..=y1 {
        let dy = py as f32 + 0.5 - cy;
        for px in x0..=x1 {
            let dx = px as f32 + 0.5 - cx;
            let inside = match shape {
                HalftoneShape::Circle => dx * dx + dy * dy <= size * size,
                HalftoneShape::Diamond => dx.abs() + dy.abs() <= size,
                HalftoneShape::Line => dx.abs() <= half_w && dy.abs() <= half_h,
            };
            if inside {
                buf.put_pixel(px as u32, py as u32, color);
            }
        }
    }
}
