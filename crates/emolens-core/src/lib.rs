//! emolens-core — Face detection, emotion classification, and frame
//! annotation.
//!
//! Uses SCRFD for face detection and a FER-style 7-class model for
//! emotion classification, both running via ONNX Runtime on the CPU.

pub mod annotate;
pub mod classifier;
pub mod detector;
pub mod font;
pub mod pipeline;
pub mod types;

pub use pipeline::{EmotionDetector, EmotionPipeline, PipelineError};
pub use types::{BoundingBox, Detection, EmotionLabel, EmotionScores};
