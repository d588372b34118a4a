//! Color math shared by the stages: hex parsing, luminance, and the 3x3
//! channel matrices backing the hue-rotate / saturate / brightness filter.

use crate::core::Rgba8;

/// Rec.601 luma weights used for luminance quantization (ascii, halftone,
/// chroma spill).
pub const LUMA_R: f32 = 0.299;
pub const LUMA_G: f32 = 0.587;
pub const LUMA_B: f32 = 0.114;

/// Luminance of an RGB triple normalized to [0, 1].
#[inline]
pub fn luminance(r: u8, g: u8, b: u8) -> f32 {
    (LUMA_R * f32::from(r) + LUMA_G * f32::from(g) + LUMA_B * f32::from(b)) / 255.0
}

/// Saturating f32 -> u8 channel conversion.
#[inline]
pub fn clamp_channel(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Parse `#rrggbb`, `rrggbb` or `#rgb` into an opaque color.
pub fn parse_hex(s: &str) -> Option<Rgba8> {
    let hex = s.trim().strip_prefix('#').unwrap_or_else(|| s.trim());
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Rgba8::opaque(r, g, b))
        }
        3 => {
            let d = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok();
            let (r, g, b) = (d(0)?, d(1)?, d(2)?);
            Some(Rgba8::opaque(r * 17, g * 17, b * 17))
        }
        _ => None,
    }
}

/// Row-major 3x3 matrix applied to RGB channels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorMatrix(pub [[f32; 3]; 3]);

impl ColorMatrix {
    pub const IDENTITY: Self = Self([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);

    /// W3C filter-effects hue rotation matrix for `degrees`.
    pub fn hue_rotate(degrees: f32) -> Self {
        let rad = degrees.to_radians();
        let (sin, cos) = rad.sin_cos();
        Self([
            [
                0.213 + cos * 0.787 - sin * 0.213,
                0.715 - cos * 0.715 - sin * 0.715,
                0.072 - cos * 0.072 + sin * 0.928,
            ],
            [
                0.213 - cos * 0.213 + sin * 0.143,
                0.715 + cos * 0.285 + sin * 0.140,
                0.072 - cos * 0.072 - sin * 0.283,
            ],
            [
                0.213 - cos * 0.213 - sin * 0.787,
                0.715 - cos * 0.715 + sin * 0.715,
                0.072 + cos * 0.928 + sin * 0.072,
            ],
        ])
    }

    /// W3C filter-effects saturation matrix. `s = 1` is identity, `s = 0`
    /// grayscale.
    pub fn saturate(s: f32) -> Self {
        Self([
            [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
            [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
            [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
        ])
    }

    /// Uniform channel multiplier.
    pub fn brightness(b: f32) -> Self {
        Self([[b, 0.0, 0.0], [0.0, b, 0.0], [0.0, 0.0, b]])
    }

    /// Matrix product `self * other` (other applies first).
    pub fn then(self, other: Self) -> Self {
        let a = self.0;
        let b = other.0;
        let mut out = [[0.0f32; 3]; 3];
        for (i, row) in out.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = a[i][0] * b[0][j] + a[i][1] * b[1][j] + a[i][2] * b[2][j];
            }
        }
        Self(out)
    }

    #[inline]
    pub fn apply(&self, r: u8, g: u8, b: u8) -> (u8, u8, u8) {
        let (rf, gf, bf) = (f32::from(r), f32::from(g), f32::from(b));
        let m = &self.0;
        (
            clamp_channel(m[0][0] * rf + m[0][1] * gf + m[0][2] * bf),
            clamp_channel(m[1][0] * rf + m[1][1] * gf + m[1][2] * bf),
            clamp_channel(m[2][0] * rf + m[2][1] * gf + m[2][2] * bf),
        )
    }

    pub fn is_identity(&self) -> bool {
        let eps = 1e-5;
        self.0
            .iter()
            .flatten()
            .zip(Self::IDENTITY.0.iter().flatten())
            .all(|(a, b)| (a - b).abs() < eps)
    }
}
