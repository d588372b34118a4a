#![forbid(unsafe_code)]

//! Real-time pixel-level corruption and stylization over RGBA frame buffers.
//!
//! The [`Pipeline`] pulls one frame at a time from a [`FrameSource`], runs
//! the active stages in fixed order over a shared working buffer, and hands
//! the finished raster to a [`PresentationSink`]. All randomness flows from
//! one explicit seed, so identical inputs render identical bytes.

pub mod ascii;
pub mod blend;
pub mod blur_cpu;
pub mod chroma_key;
pub mod color;
pub mod core;
pub mod error;
pub mod font;
pub mod geometry;
pub mod glitch;
pub mod halftone;
pub mod params;
pub mod pipeline;
pub mod text;

pub use self::core::{FrameDescriptor, MAX_LONG_EDGE, PixelBuffer, Rgba8, fit_output_dims};
pub use error::{RasterfxError, RasterfxResult};
pub use params::{
    AsciiParams, BlendMode, BlendParams, ChromaParams, GlitchParams, GlobalParams, GlyphRamp,
    HalftoneParams, HalftoneShape, LayerActivation, TextFont, TextParams,
};
pub use pipeline::{
    FrameParams, FrameSource, ParameterStore, Pipeline, PresentationSink, SourceFrame,
};
