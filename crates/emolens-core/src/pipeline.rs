//! The two-stage detection pipeline: face boxes, then per-face emotion.

use crate::classifier::{ClassifierError, EmotionClassifier};
use crate::detector::{DetectorError, FaceDetector};
use crate::types::Detection;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("face detection failed: {0}")]
    Detector(#[from] DetectorError),
    #[error("emotion classification failed: {0}")]
    Classifier(#[from] ClassifierError),
}

/// A detector as the session controller sees it: one RGB24 frame in,
/// zero or more detections out, order unspecified.
pub trait EmotionDetector {
    fn detect(
        &mut self,
        rgb: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<Detection>, PipelineError>;
}

/// Face detector + emotion classifier composed into one pass per frame.
pub struct EmotionPipeline {
    faces: FaceDetector,
    emotions: EmotionClassifier,
}

impl EmotionPipeline {
    /// Load both ONNX models, failing fast if either is unavailable.
    pub fn load(face_model_path: &str, emotion_model_path: &str) -> Result<Self, PipelineError> {
        let faces = FaceDetector::load(face_model_path)?;
        let emotions = EmotionClassifier::load(emotion_model_path)?;
        Ok(Self { faces, emotions })
    }
}

impl EmotionDetector for EmotionPipeline {
    fn detect(
        &mut self,
        rgb: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<Detection>, PipelineError> {
        let boxes = self.faces.detect(rgb, width, height)?;

        let mut detections = Vec::with_capacity(boxes.len());
        for bbox in boxes {
            match self.emotions.classify(rgb, width, height, &bbox) {
                Ok(scores) => detections.push(Detection { bbox, scores }),
                // A box NMS kept but lying fully outside the frame has
                // nothing to classify; drop it and keep the rest.
                Err(ClassifierError::EmptyRegion) => {
                    tracing::debug!(
                        x = bbox.x,
                        y = bbox.y,
                        "skipping face box outside the frame"
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }

        tracing::debug!(faces = detections.len(), "frame processed");
        Ok(detections)
    }
}
