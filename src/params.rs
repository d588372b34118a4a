//! Per-frame parameter records supplied by the external control surface.
//!
//! Each record is an immutable value for the duration of one frame. The
//! control surface is expected to clamp slider ranges already; `clamped()` on
//! each record is the defensive boundary the pipeline applies anyway so that
//! out-of-range numbers degrade to a clamp or a no-op instead of failing.

use crate::core::Rgba8;

/// Geometry + color adjustment parameters (always-on stage).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GlobalParams {
    /// Brightness multiplier, 1.0 neutral.
    pub brightness: f32,
    /// Gaussian blur radius in pixels, 0 neutral.
    pub blur: f32,
    /// Hue rotation in degrees, 0 neutral.
    pub colormatrix: f32,
    /// Saturation multiplier, 1.0 neutral.
    pub saturation: f32,
    /// Per-frame jitter amplitude in pixels, 0 neutral.
    pub vibration: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    /// Binary luminance threshold, 0 disables the silhouette pass.
    pub threshold: u8,
}

impl Default for GlobalParams {
    fn default() -> Self {
        Self {
            brightness: 1.0,
            blur: 0.0,
            colormatrix: 0.0,
            saturation: 1.0,
            vibration: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            threshold: 0,
        }
    }
}

impl GlobalParams {
    pub fn clamped(self) -> Self {
        Self {
            brightness: clamp_finite(self.brightness, 0.0, 2.0, 1.0),
            blur: clamp_finite(self.blur, 0.0, 100.0, 0.0),
            colormatrix: if self.colormatrix.is_finite() {
                self.colormatrix.rem_euclid(360.0)
            } else {
                0.0
            },
            saturation: clamp_finite(self.saturation, 0.0, 3.0, 1.0),
            vibration: clamp_finite(self.vibration, 0.0, 200.0, 0.0),
            scale_x: clamp_finite(self.scale_x, 0.5, 3.0, 1.0),
            scale_y: clamp_finite(self.scale_y, 0.5, 3.0, 1.0),
            threshold: self.threshold,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlendMode {
    Displacement,
    Difference,
    HardMix,
    Interlace,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BlendParams {
    pub mode: BlendMode,
    /// Mix amount in percent, [0, 100].
    pub mix: f32,
    /// Hard-mix channel threshold.
    pub threshold: u8,
    /// Displacement magnitude / interlace band control.
    pub scale: f32,
}

impl Default for BlendParams {
    fn default() -> Self {
        Self {
            mode: BlendMode::Difference,
            mix: 50.0,
            threshold: 128,
            scale: 20.0,
        }
    }
}

impl BlendParams {
    pub fn clamped(self) -> Self {
        Self {
            mix: clamp_finite(self.mix, 0.0, 100.0, 50.0),
            scale: clamp_finite(self.scale, 0.0, 1000.0, 20.0),
            ..self
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TextFont {
    #[serde(rename = "Helvetica")]
    Helvetica,
    #[serde(rename = "Arial")]
    Arial,
    #[serde(rename = "Comic Sans MS")]
    ComicSans,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TextParams {
    pub content: String,
    pub font: TextFont,
    /// Relative size in [5, 100]; pixel size derives from buffer height.
    pub size: f32,
    /// Anchor position as a percentage of buffer width.
    pub x: f32,
    /// Anchor position as a percentage of buffer height.
    pub y: f32,
    pub color: Rgba8,
    pub is_bold: bool,
}

impl Default for TextParams {
    fn default() -> Self {
        Self {
            content: String::new(),
            font: TextFont::Helvetica,
            size: 20.0,
            x: 50.0,
            y: 50.0,
            color: Rgba8::WHITE,
            is_bold: false,
        }
    }
}

impl TextParams {
    pub fn clamped(&self) -> Self {
        Self {
            size: clamp_finite(self.size, 5.0, 100.0, 20.0),
            x: clamp_finite(self.x, 0.0, 100.0, 50.0),
            y: clamp_finite(self.y, 0.0, 100.0, 50.0),
            ..self.clone()
        }
    }
}

/// Glitch corruption amounts. Every pass is a no-op at 0.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GlitchParams {
    /// Fraction of rows to brightness-sort, [0, 50].
    pub pixel_sort: f32,
    /// Block displacement intensity, [0, 100].
    pub block_shift: f32,
    /// Horizontal red-channel shift in pixels, [0, 50].
    pub rgb_shift: f32,
    /// Scanline degradation intensity, [0, 10].
    pub scanlines: f32,
}

impl GlitchParams {
    pub fn clamped(self) -> Self {
        Self {
            pixel_sort: clamp_finite(self.pixel_sort, 0.0, 50.0, 0.0),
            block_shift: clamp_finite(self.block_shift, 0.0, 100.0, 0.0),
            rgb_shift: clamp_finite(self.rgb_shift, 0.0, 50.0, 0.0),
            scanlines: clamp_finite(self.scanlines, 0.0, 10.0, 0.0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HalftoneShape {
    Circle,
    Diamond,
    Line,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct HalftoneParams {
    /// Maximum dot radius in pixels, [2, 30].
    pub radius: f32,
    /// Screen angle in degrees, [0, 90].
    pub angle: f32,
    pub contrast: f32,
    pub shape: HalftoneShape,
    /// Sample dot color from the source instead of `color`.
    pub color_mode: bool,
    pub background_color: Rgba8,
    pub color: Rgba8,
}

impl Default for HalftoneParams {
    fn default() -> Self {
        Self {
            radius: 10.0,
            angle: 0.0,
            contrast: 1.0,
            shape: HalftoneShape::Circle,
            color_mode: false,
            background_color: Rgba8::BLACK,
            color: Rgba8::WHITE,
        }
    }
}

impl HalftoneParams {
    pub fn clamped(self) -> Self {
        Self {
            radius: clamp_finite(self.radius, 2.0, 30.0, 10.0),
            angle: clamp_finite(self.angle, 0.0, 90.0, 0.0),
            contrast: clamp_finite(self.contrast, 0.5, 3.0, 1.0),
            ..self
        }
    }
}

/// Which glyph ramp quantizes luminance, ordered blank/light to dense/dark.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlyphRamp {
    Simple,
    Complex,
    Blocks,
}

impl GlyphRamp {
    pub fn chars(self) -> &'static [char] {
        const SIMPLE: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];
        const COMPLEX: &[char] = &[
            ' ', '.', '\'', '`', '^', '"', ',', ':', ';', 'I', 'l', '!', 'i', '>', '<', '~', '+',
            '_', '-', '?', ']', '[', '}', '{', '1', ')', '(', '|', '/', 't', 'f', 'j', 'r', 'x',
            'n', 'u', 'v', 'c', 'z', 'X', 'Y', 'U', 'J', 'C', 'L', 'Q', '0', 'O', 'Z', 'm', 'w',
            'q', 'p', 'd', 'b', 'k', 'h', 'a', 'o', '*', '#', 'M', 'W', '&', '8', '%', 'B', '@',
            '$',
        ];
        const BLOCKS: &[char] = &[' ', '░', '▒', '▓', '█'];
        match self {
            GlyphRamp::Simple => SIMPLE,
            GlyphRamp::Complex => COMPLEX,
            GlyphRamp::Blocks => BLOCKS,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AsciiParams {
    /// Character cell width in pixels, [4, 24]; cell height is `scale * 1.6`.
    pub scale: f32,
    pub contrast: f32,
    pub color_mode: bool,
    pub inverted: bool,
    pub chars: GlyphRamp,
    pub background_color: Rgba8,
    pub text_color: Rgba8,
}

impl Default for AsciiParams {
    fn default() -> Self {
        Self {
            scale: 8.0,
            contrast: 1.0,
            color_mode: false,
            inverted: false,
            chars: GlyphRamp::Simple,
            background_color: Rgba8::BLACK,
            text_color: Rgba8::WHITE,
        }
    }
}

impl AsciiParams {
    pub fn clamped(self) -> Self {
        Self {
            scale: clamp_finite(self.scale, 4.0, 24.0, 8.0),
            contrast: clamp_finite(self.contrast, 0.5, 3.0, 1.0),
            ..self
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ChromaParams {
    pub enabled: bool,
    /// Key color as a hex string; malformed input falls back to green.
    pub key_color: String,
    /// Distance tolerance as a fraction of the RGB space diagonal.
    pub similarity: f32,
    /// Width of the feathered alpha ramp past the hard threshold.
    pub smoothness: f32,
    /// Fraction of spill suppression toward luminance gray.
    pub spill: f32,
}

impl Default for ChromaParams {
    fn default() -> Self {
        Self {
            enabled: false,
            key_color: "#00ff00".to_string(),
            similarity: 0.4,
            smoothness: 0.1,
            spill: 0.1,
        }
    }
}

impl ChromaParams {
    pub fn clamped(&self) -> Self {
        Self {
            similarity: clamp_finite(self.similarity, 0.0, 1.0, 0.4),
            smoothness: clamp_finite(self.smoothness, 0.0, 1.0, 0.1),
            spill: clamp_finite(self.spill, 0.0, 1.0, 0.1),
            ..self.clone()
        }
    }
}

/// Activation flags for the optional stages. Geometry/color always runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LayerActivation {
    pub blend: bool,
    pub text: bool,
    pub glitch: bool,
    pub halftone: bool,
    pub ascii: bool,
}

fn clamp_finite(v: f32, lo: f32, hi: f32, fallback: f32) -> f32 {
    if v.is_finite() { v.clamp(lo, hi) } else { fallback }
}
