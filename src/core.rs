use crate::error::{RasterfxError, RasterfxResult};

/// Longest output edge the pipeline will produce. Sources larger than this
/// are scaled down preserving aspect ratio to bound per-frame cost.
pub const MAX_LONG_EDGE: u32 = 2048;

/// Straight-alpha RGBA8 pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const BLACK: Self = Self::opaque(0, 0, 0);
    pub const WHITE: Self = Self::opaque(255, 255, 255);
    pub const TRANSPARENT: Self = Self {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Dimensions and readiness of the upstream frame source.
///
/// `ready` is true only once the source has decoded at least one frame with
/// non-zero dimensions; the pipeline skips the whole invocation otherwise.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameDescriptor {
    pub width: u32,
    pub height: u32,
    pub ready: bool,
}

impl FrameDescriptor {
    pub fn is_renderable(self) -> bool {
        self.ready && self.width > 0 && self.height > 0
    }
}

/// The shared working raster: straight-alpha RGBA8, row-major, 4 bytes per
/// pixel. Invariant: `data.len() == width * height * 4` at all times; any
/// resize reallocates and clears.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; byte_len(width, height)],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Reallocate to new dimensions, clearing to transparent black.
    /// No-op (beyond the clear) when dimensions are unchanged.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.width != width || self.height != height {
            self.width = width;
            self.height = height;
            self.data = vec![0; byte_len(width, height)];
        } else {
            self.fill(Rgba8::TRANSPARENT);
        }
    }

    /// Byte offset of pixel (x, y). Callers guarantee in-bounds coordinates.
    #[inline]
    pub fn offset(&self, x: u32, y: u32) -> usize {
        ((y * self.width + x) as usize) * 4
    }

    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Rgba8 {
        let i = self.offset(x, y);
        Rgba8 {
            r: self.data[i],
            g: self.data[i + 1],
            b: self.data[i + 2],
            a: self.data[i + 3],
        }
    }

    #[inline]
    pub fn put_pixel(&mut self, x: u32, y: u32, px: Rgba8) {
        let i = self.offset(x, y);
        self.data[i..i + 4].copy_from_slice(&px.to_array());
    }

    pub fn fill(&mut self, px: Rgba8) {
        let bytes = px.to_array();
        for chunk in self.data.chunks_exact_mut(4) {
            chunk.copy_from_slice(&bytes);
        }
    }

    /// Snapshot `src` into `self`, resizing if needed. Used for the
    /// pre-mutation copies destructive scans read from.
    pub fn copy_from(&mut self, src: &PixelBuffer) {
        if self.width != src.width || self.height != src.height {
            self.width = src.width;
            self.height = src.height;
            self.data.clear();
            self.data.extend_from_slice(&src.data);
        } else {
            self.data.copy_from_slice(&src.data);
        }
    }

    /// Replace the pixel contents from a raw RGBA slice of matching size.
    pub fn copy_from_raw(&mut self, raw: &[u8]) -> RasterfxResult<()> {
        if raw.len() != self.data.len() {
            return Err(RasterfxError::evaluation(
                "raw rgba length does not match buffer dimensions",
            ));
        }
        self.data.copy_from_slice(raw);
        Ok(())
    }
}

fn byte_len(width: u32, height: u32) -> usize {
    (width as usize) * (height as usize) * 4
}

/// Compute output dimensions from source dimensions, capping the longer edge
/// at [`MAX_LONG_EDGE`] while preserving aspect ratio. Degenerate sources
/// yield `None`.
pub fn fit_output_dims(src_w: u32, src_h: u32) -> Option<(u32, u32)> {
    if src_w == 0 || src_h == 0 {
        return None;
    }
    let long = src_w.max(src_h);
    if long <= MAX_LONG_EDGE {
        return Some((src_w, src_h));
    }
    let scale = f64::from(MAX_LONG_EDGE) / f64::from(long);
    let w = ((f64::from(src_w) * scale).round() as u32).max(1);
    let h = ((f64::from(src_h) * scale).round() as u32).max(1);
    Some((w, h))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_length_tracks_dimensions() {
        let mut buf = PixelBuffer::new(3, 2);
        assert_eq!(buf.data().len(), 24);
        buf.resize(5, 4);
        assert_eq!(buf.data().len(), 80);
        assert!(buf.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn resize_same_dims_clears() {
        let mut buf = PixelBuffer::new(2, 2);
        buf.fill(Rgba8::WHITE);
        buf.resize(2, 2);
        assert!(buf.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn pixel_round_trip() {
        let mut buf = PixelBuffer::new(4, 4);
        let px = Rgba8 {
            r: 1,
            g: 2,
            b: 3,
            a: 4,
        };
        buf.put_pixel(3, 2, px);
        assert_eq!(buf.pixel(3, 2), px);
    }

    #[test]
    fn fit_dims_passes_small_sources_through() {
        assert_eq!(fit_output_dims(640, 480), Some((640, 480)));
        assert_eq!(fit_output_dims(2048, 1024), Some((2048, 1024)));
    }

    #[test]
    fn fit_dims_caps_long_edge() {
        let (w, h) = fit_output_dims(4096, 2048).unwrap();
        assert_eq!(w, 2048);
        assert_eq!(h, 1024);

        let (w, h) = fit_output_dims(1000, 4000).unwrap();
        assert_eq!(h, 2048);
        assert_eq!(w, 512);
    }

    #[test]
    fn fit_dims_rejects_degenerate() {
        assert_eq!(fit_output_dims(0, 100), None);
        assert_eq!(fit_output_dims(100, 0), None);
    }
}
