//! Chroma key stage: turns pixels near a key color transparent, with a
//! feathered alpha ramp past the hard threshold and spill suppression toward
//! luminance gray. Available as a standalone utility on the same buffer
//! contract as the chained stages.

use crate::{
    color,
    core::{PixelBuffer, Rgba8},
    params::ChromaParams,
};

/// Maximum possible RGB distance (space diagonal, sqrt(3 * 255^2)).
const MAX_RGB_DISTANCE: f32 = 442.0;

/// Key color used when the configured hex string does not parse.
const FALLBACK_KEY: Rgba8 = Rgba8::opaque(0, 255, 0);

pub fn apply(buf: &mut PixelBuffer, params: &ChromaParams) {
    let p = params.clamped();
    if !p.enabled {
        return;
    }
    let key = color::parse_hex(&p.key_color).unwrap_or(FALLBACK_KEY);

    let threshold = p.similarity * MAX_RGB_DISTANCE;
    let threshold_sq = threshold * threshold;
    let band_sq = (p.smoothness * 100.0) * (p.smoothness * 100.0);

    for px in buf.data_mut().chunks_exact_mut(4) {
        let dist_sq = distance_sq(px, key);

        // Inclusive so an exact key match keys out even at zero similarity.
        if dist_sq <= threshold_sq {
            px[3] = 0;
            continue;
        }
        if p.smoothness <= 0.0 || dist_sq >= threshold_sq + band_sq {
            continue;
        }

        // Feather band: linear alpha ramp over linear distance between the
        // threshold and the band edge.
        let dist = dist_sq.sqrt();
        let edge = (threshold_sq + band_sq).sqrt();
        let t = if edge > threshold {
            (dist - threshold) / (edge - threshold)
        } else {
            1.0
        };

        if p.spill > 0.0 {
            let gray = color::luminance(px[0], px[1], px[2]) * 255.0;
            for c in px.iter_mut().take(3) {
                let v = f32::from(*c);
                *c = color::clamp_channel(v + (gray - v) * p.spill);
            }
        }
        px[3] = color::clamp_channel(t * 255.0);
    }
}

#[inline]
fn distance_sq(px: &[u8], key: Rgba8) -> f32 {
    let dr = f32::from(px[0]) - f32::from(key.r);
    let dg = f32::from(px[1]) - f32::from(key.g);
    let db = f32::from(px[2]) - f32::from(key.b);
    dr * dr + dg * dg + db * db
}
