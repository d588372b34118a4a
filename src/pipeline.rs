//! Pipeline orchestration: owns the working and scratch buffers, decides
//! output dimensions, and runs the active stages in fixed order over each
//! pulled frame.
//!
//! Stage order is fixed regardless of which optional layers are active:
//! geometry/color, blend, text, glitch, halftone, ascii. Skipped stages
//! leave the buffer untouched. One frame is in flight at a time; every
//! invocation starts from a freshly drawn base frame.

use tracing::{debug, trace};

use crate::{
    ascii, blend, chroma_key,
    core::{FrameDescriptor, PixelBuffer, fit_output_dims},
    error::{RasterfxError, RasterfxResult},
    geometry, glitch, halftone,
    params::{
        AsciiParams, BlendMode, BlendParams, ChromaParams, GlitchParams, GlobalParams,
        HalftoneParams, LayerActivation, TextParams,
    },
    text,
};

/// Borrowed view of one source frame crossing the module boundary.
#[derive(Clone, Copy, Debug)]
pub struct SourceFrame<'a> {
    pub data: &'a [u8],
    pub width: u32,
    pub height: u32,
    pub ready: bool,
}

impl SourceFrame<'_> {
    pub fn descriptor(&self) -> FrameDescriptor {
        FrameDescriptor {
            width: self.width,
            height: self.height,
            ready: self.ready,
        }
    }
}

/// Produces raw RGBA frames on demand. Frame acquisition (camera, file,
/// stream) lives entirely behind this trait.
pub trait FrameSource {
    fn current_frame(&mut self) -> SourceFrame<'_>;

    /// Second raster for the blend stage; `None` makes that stage a no-op.
    fn blend_source(&mut self) -> Option<SourceFrame<'_>> {
        None
    }
}

/// Consumes the finished raster once per rendered frame.
pub trait PresentationSink {
    fn present(&mut self, data: &[u8], width: u32, height: u32);
}

/// Supplies the per-frame parameter bundle, replaced wholesale whenever the
/// external control surface changes a value.
pub trait ParameterStore {
    fn frame_params(&self) -> FrameParams;
}

/// Everything the pipeline reads for one frame: the seven parameter records,
/// the per-stage activation flags, and the caller-supplied mirror decision
/// (true for front-facing live capture).
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FrameParams {
    pub global: GlobalParams,
    pub blend: BlendParams,
    pub text: TextParams,
    pub glitch: GlitchParams,
    pub halftone: HalftoneParams,
    pub ascii: AsciiParams,
    pub chroma: ChromaParams,
    pub layers: LayerActivation,
    pub mirror: bool,
}

impl FrameParams {
    /// True when some active stage draws fresh randomness every frame, so a
    /// static source still needs continuous re-rendering to animate.
    pub fn is_animated(&self) -> bool {
        if self.global.vibration > 0.0 {
            return true;
        }
        if self.layers.glitch {
            let g = self.glitch;
            if g.pixel_sort > 0.0 || g.block_shift > 0.0 || g.scanlines > 0.0 {
                return true;
            }
        }
        self.layers.blend
            && matches!(
                self.blend.mode,
                BlendMode::Displacement | BlendMode::Difference
            )
            && self.blend.mix > 0.0
    }
}

/// The orchestrator. Owns the working buffer, a scratch snapshot buffer and
/// the resampled blend overlay, all reused across frames, plus the seeded
/// generator behind every stochastic pass.
pub struct Pipeline {
    buf: PixelBuffer,
    scratch: PixelBuffer,
    overlay: PixelBuffer,
    blend_staging: Vec<u8>,
    rng: fastrand::Rng,
}

impl Pipeline {
    pub fn new(seed: u64) -> Self {
        Self {
            buf: PixelBuffer::new(0, 0),
            scratch: PixelBuffer::new(0, 0),
            overlay: PixelBuffer::new(0, 0),
            blend_staging: Vec::new(),
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    /// Restart the random sequence; two pipelines running the same seed over
    /// the same inputs produce byte-identical frames.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = fastrand::Rng::with_seed(seed);
    }

    /// Final raster of the most recent rendered frame.
    pub fn buffer(&self) -> &PixelBuffer {
        &self.buf
    }

    /// Pull one frame from `source`, render it under `store`'s parameters
    /// and hand the result to `sink`. Returns whether a frame was presented;
    /// a non-ready source skips the invocation for this tick.
    pub fn run_frame(
        &mut self,
        source: &mut dyn FrameSource,
        store: &dyn ParameterStore,
        sink: &mut dyn PresentationSink,
    ) -> RasterfxResult<bool> {
        let params = store.frame_params();

        // Stage the blend source up front so the primary borrow below does
        // not overlap it.
        let mut staging = std::mem::take(&mut self.blend_staging);
        staging.clear();
        let mut blend_dims = None;
        if params.layers.blend
            && let Some(b) = source.blend_source()
            && b.ready
            && b.width > 0
            && b.height > 0
            && b.data.len() == (b.width as usize) * (b.height as usize) * 4
        {
            staging.extend_from_slice(b.data);
            blend_dims = Some((b.width, b.height));
        }

        let frame = source.current_frame();
        let blend = blend_dims.map(|(w, h)| SourceFrame {
            data: staging.as_slice(),
            width: w,
            height: h,
            ready: true,
        });
        let rendered = self.render(frame, blend, &params)?;
        self.blend_staging = staging;

        if rendered {
            sink.present(self.buf.data(), self.buf.width(), self.buf.height());
        }
        Ok(rendered)
    }

    /// Render one frame into the working buffer. Returns `false` (leaving
    /// the previous contents in place) when the source is not renderable.
    #[tracing::instrument(skip_all)]
    pub fn render(
        &mut self,
        frame: SourceFrame<'_>,
        blend: Option<SourceFrame<'_>>,
        params: &FrameParams,
    ) -> RasterfxResult<bool> {
        if !frame.descriptor().is_renderable() {
            debug!("frame source not renderable, skipping invocation");
            return Ok(false);
        }
        let expected = (frame.width as usize) * (frame.height as usize) * 4;
        if frame.data.len() != expected {
            return Err(RasterfxError::validation(
                "source frame length does not match its dimensions",
            ));
        }
        let Some((w, h)) = fit_output_dims(frame.width, frame.height) else {
            return Ok(false);
        };
        if w != self.buf.width() || h != self.buf.height() {
            trace!(w, h, "resizing working buffers");
            self.buf.resize(w, h);
            self.scratch.resize(w, h);
        }

        geometry::apply(
            &mut self.buf,
            &mut self.scratch,
            frame.data,
            frame.width,
            frame.height,
            &params.global,
            params.mirror,
            &mut self.rng,
        );

        if params.layers.blend
            && let Some(b) = blend
        {
            self.overlay.resize(w, h);
            blend::resample_source(&mut self.overlay, b.data, b.width, b.height)?;
            blend::apply(
                &mut self.buf,
                &mut self.scratch,
                &self.overlay,
                &params.blend,
                &mut self.rng,
            )?;
        }
        if params.layers.text {
            text::apply(&mut self.buf, &params.text);
        }
        if params.layers.glitch {
            glitch::apply(&mut self.buf, &mut self.scratch, &params.glitch, &mut self.rng);
        }
        if params.layers.halftone {
            halftone::apply(&mut self.buf, &mut self.scratch, &params.halftone);
        }
        if params.layers.ascii {
            ascii::apply(&mut self.buf, &mut self.scratch, &params.ascii);
        }
        Ok(true)
    }

    /// Chroma keying over the current working buffer. Not part of the fixed
    /// chain; exposed on the same buffer contract for standalone use.
    pub fn apply_chroma_key(&mut self, params: &ChromaParams) {
        chroma_key::apply(&mut self.buf, params);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Rgba8;

    fn white_frame(data: &[u8], w: u32, h: u32) -> SourceFrame<'_> {
        SourceFrame {
            data,
            width: w,
            height: h,
            ready: true,
        }
    }

    #[test]
    fn non_ready_source_skips_invocation() {
        let mut pipe = Pipeline::new(1);
        let data = vec![255u8; 4];
        let frame = SourceFrame {
            ready: false,
            ..white_frame(&data, 1, 1)
        };
        assert!(!pipe.render(frame, None, &FrameParams::default()).unwrap());
    }

    #[test]
    fn degenerate_dimensions_skip_invocation() {
        let mut pipe = Pipeline::new(1);
        let frame = white_frame(&[], 0, 0);
        assert!(!pipe.render(frame, None, &FrameParams::default()).unwrap());
    }

    #[test]
    fn mismatched_length_is_a_contract_error() {
        let mut pipe = Pipeline::new(1);
        let data = vec![0u8; 8];
        let frame = white_frame(&data, 4, 4);
        assert!(pipe.render(frame, None, &FrameParams::default()).is_err());
    }

    #[test]
    fn oversized_source_is_capped() {
        let mut pipe = Pipeline::new(1);
        let data = vec![128u8; 4096 * 2 * 4];
        let frame = white_frame(&data, 4096, 2);
        assert!(pipe.render(frame, None, &FrameParams::default()).unwrap());
        assert_eq!(pipe.buffer().width(), 2048);
        assert_eq!(pipe.buffer().height(), 1);
    }

    #[test]
    fn white_threshold_frame_stays_white() {
        // All-white source, threshold 128, all optional layers off: white
        // output at full opacity.
        let mut pipe = Pipeline::new(1);
        let data = vec![255u8; 100 * 100 * 4];
        let frame = white_frame(&data, 100, 100);
        let params = FrameParams {
            global: GlobalParams {
                threshold: 128,
                ..GlobalParams::default()
            },
            ..FrameParams::default()
        };
        assert!(pipe.render(frame, None, &params).unwrap());
        assert!(
            pipe.buffer()
                .data()
                .chunks_exact(4)
                .all(|px| px == [255, 255, 255, 255])
        );
    }

    #[test]
    fn missing_blend_source_is_noop_even_when_active() {
        let mut pipe = Pipeline::new(1);
        let data = vec![200u8; 10 * 10 * 4];
        let frame = white_frame(&data, 10, 10);
        let params = FrameParams {
            layers: LayerActivation {
                blend: true,
                ..LayerActivation::default()
            },
            ..FrameParams::default()
        };
        assert!(pipe.render(frame, None, &params).unwrap());
        assert!(pipe.buffer().data().chunks_exact(4).all(|px| px[0] == 200));
    }

    #[test]
    fn same_seed_same_output() {
        let data = vec![90u8; 64 * 64 * 4];
        let params = FrameParams {
            global: GlobalParams {
                vibration: 5.0,
                ..GlobalParams::default()
            },
            glitch: GlitchParams {
                block_shift: 80.0,
                scanlines: 5.0,
                ..GlitchParams::default()
            },
            layers: LayerActivation {
                glitch: true,
                ..LayerActivation::default()
            },
            ..FrameParams::default()
        };
        let run = |seed| {
            let mut pipe = Pipeline::new(seed);
            pipe.render(white_frame(&data, 64, 64), None, &params).unwrap();
            pipe.buffer().clone()
        };
        assert_eq!(run(5), run(5));
    }

    #[test]
    fn is_animated_tracks_stochastic_stages() {
        let mut p = FrameParams::default();
        assert!(!p.is_animated());

        p.global.vibration = 2.0;
        assert!(p.is_animated());
        p.global.vibration = 0.0;

        p.layers.glitch = true;
        assert!(!p.is_animated()); // neutral glitch params draw nothing
        p.glitch.block_shift = 10.0;
        assert!(p.is_animated());
    }

    #[test]
    fn run_frame_presents_through_the_sink() {
        struct StaticSource(Vec<u8>);
        impl FrameSource for StaticSource {
            fn current_frame(&mut self) -> SourceFrame<'_> {
                SourceFrame {
                    data: &self.0,
                    width: 8,
                    height: 8,
                    ready: true,
                }
            }
        }
        struct Store;
        impl ParameterStore for Store {
            fn frame_params(&self) -> FrameParams {
                FrameParams::default()
            }
        }
        #[derive(Default)]
        struct Capture {
            frames: usize,
            dims: (u32, u32),
        }
        impl PresentationSink for Capture {
            fn present(&mut self, _data: &[u8], width: u32, height: u32) {
                self.frames += 1;
                self.dims = (width, height);
            }
        }

        let mut source = StaticSource(vec![50u8; 8 * 8 * 4]);
        let mut sink = Capture::default();
        let mut pipe = Pipeline::new(3);
        assert!(pipe.run_frame(&mut source, &Store, &mut sink).unwrap());
        assert_eq!(sink.frames, 1);
        assert_eq!(sink.dims, (8, 8));
    }

    #[test]
    fn chroma_key_utility_works_on_the_working_buffer() {
        let mut pipe = Pipeline::new(1);
        let data = [0u8, 255, 0, 255].repeat(16);
        pipe.render(white_frame(&data, 4, 4), None, &FrameParams::default())
            .unwrap();
        pipe.apply_chroma_key(&ChromaParams {
            enabled: true,
            ..ChromaParams::default()
        });
        assert!(pipe.buffer().data().chunks_exact(4).all(|px| px[3] == 0));
    }

    #[test]
    fn blend_source_flows_through_run_frame() {
        struct TwoSources {
            a: Vec<u8>,
            b: Vec<u8>,
        }
        impl FrameSource for TwoSources {
            fn current_frame(&mut self) -> SourceFrame<'_> {
                SourceFrame {
                    data: &self.a,
                    width: 4,
                    height: 4,
                    ready: true,
                }
            }
            fn blend_source(&mut self) -> Option<SourceFrame<'_>> {
                Some(SourceFrame {
                    data: &self.b,
                    width: 4,
                    height: 4,
                    ready: true,
                })
            }
        }
        struct Store;
        impl ParameterStore for Store {
            fn frame_params(&self) -> FrameParams {
                FrameParams {
                    blend: BlendParams {
                        mode: BlendMode::Interlace,
                        mix: 100.0,
                        scale: 10.0,
                        ..BlendParams::default()
                    },
                    layers: LayerActivation {
                        blend: true,
                        ..LayerActivation::default()
                    },
                    ..FrameParams::default()
                }
            }
        }
        struct Null;
        impl PresentationSink for Null {
            fn present(&mut self, _: &[u8], _: u32, _: u32) {}
        }

        let mut source = TwoSources {
            a: [10u8, 10, 10, 255].repeat(16),
            b: [200u8, 200, 200, 255].repeat(16),
        };
        let mut pipe = Pipeline::new(2);
        assert!(pipe.run_frame(&mut source, &Store, &mut Null).unwrap());
        // Interlace band height 1: even rows from B, odd rows from A.
        assert_eq!(pipe.buffer().pixel(0, 0).r, 200);
        assert_eq!(pipe.buffer().pixel(0, 1).r, 10);
    }

    #[test]
    fn second_render_reuses_buffers() {
        let mut pipe = Pipeline::new(1);
        let data = vec![1u8; 16 * 16 * 4];
        let frame = white_frame(&data, 16, 16);
        pipe.render(frame, None, &FrameParams::default()).unwrap();
        let first = pipe.buffer().clone();
        pipe.render(frame, None, &FrameParams::default()).unwrap();
        assert_eq!(pipe.buffer(), &first);
    }

    #[test]
    fn text_layer_composites_over_base() {
        let mut pipe = Pipeline::new(1);
        let data = vec![0u8; 64 * 64 * 4];
        let frame = SourceFrame {
            data: &data,
            width: 64,
            height: 64,
            ready: true,
        };
        let params = FrameParams {
            text: TextParams {
                content: "A".to_string(),
                color: Rgba8::opaque(255, 0, 0),
                ..TextParams::default()
            },
            layers: LayerActivation {
                text: true,
                ..LayerActivation::default()
            },
            ..FrameParams::default()
        };
        pipe.render(frame, None, &params).unwrap();
        assert!(
            pipe.buffer()
                .data()
                .chunks_exact(4)
                .any(|px| px == [255, 0, 0, 255])
        );
    }
}
