// THEORY:
// This file is the main entry point for the `palm_vision` library crate.
// It follows the standard Rust convention of using `lib.rs` to define the public
// API that will be exposed to external consumers (like the `palm_tester` shell).
//
// The primary goal is to export the `SegmentationPipeline` and its associated data
// structures (`PipelineConfig`, `FrameReport`, etc.) as the high-level interface for
// the engine, plus `PipelineWorker` for callers that want it on its own task. The
// layers inside `core_modules` stay public for callers that need a single stage
// (the classifier, the hull, the fingertip filter) on its own.

pub mod async_pipeline;
pub mod core_modules;
pub mod error;
pub mod pipeline;

pub use async_pipeline::PipelineWorker;
pub use error::{Error, Result};
pub use pipeline::{
    DisplayOptions, FrameReport, FrameSummary, Hsv, PipelineConfig, RowOrder, SampleRegion,
    SegmentationPipeline, SkinBlob,
};
