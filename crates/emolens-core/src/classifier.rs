//! FER-style emotion classifier via ONNX Runtime.
//!
//! Takes a detected face box, crops it from the RGB frame, and runs a
//! 7-class emotion model over the grayscale crop.

use crate::types::{BoundingBox, EmotionLabel, EmotionScores};
use ndarray::Array4;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::Path;
use thiserror::Error;

const EMOTION_INPUT_SIZE: usize = 64;
const EMOTION_CLASSES: usize = 7;

/// Label order of the model's output logits (FER2013 convention).
const MODEL_OUTPUT_ORDER: [EmotionLabel; EMOTION_CLASSES] = [
    EmotionLabel::Angry,
    EmotionLabel::Disgust,
    EmotionLabel::Fear,
    EmotionLabel::Happy,
    EmotionLabel::Sad,
    EmotionLabel::Surprise,
    EmotionLabel::Neutral,
];

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("model file not found: {0}")]
    ModelNotFound(String),
    #[error("inference failed: {0}")]
    InferenceFailed(String),
    #[error("face box does not intersect the frame")]
    EmptyRegion,
    #[error("ort: {0}")]
    Ort(#[from] ort::Error),
}

/// 7-class emotion classifier.
pub struct EmotionClassifier {
    session: Session,
}

impl EmotionClassifier {
    /// Load the emotion ONNX model from the given path.
    pub fn load(model_path: &str) -> Result<Self, ClassifierError> {
        if !Path::new(model_path).exists() {
            return Err(ClassifierError::ModelNotFound(model_path.to_string()));
        }

        let session = Session::builder()?
            .with_intra_threads(2)?
            .commit_from_file(model_path)?;

        tracing::info!(
            path = model_path,
            inputs = ?session.inputs().iter().map(|i| (i.name(), i.dtype())).collect::<Vec<_>>(),
            outputs = ?session.outputs().iter().map(|o| o.name()).collect::<Vec<_>>(),
            "loaded emotion model"
        );

        Ok(Self { session })
    }

    /// Classify the emotion of one detected face in an RGB24 frame.
    ///
    /// The face box is clamped to the frame before cropping; a box that
    /// does not intersect the frame at all is an [`ClassifierError::EmptyRegion`].
    pub fn classify(
        &mut self,
        rgb: &[u8],
        width: u32,
        height: u32,
        face: &BoundingBox,
    ) -> Result<EmotionScores, ClassifierError> {
        let (crop, crop_w, crop_h) = crop_gray(rgb, width as usize, height as usize, face)
            .ok_or(ClassifierError::EmptyRegion)?;

        let resized = resize_gray_bilinear(&crop, crop_w, crop_h, EMOTION_INPUT_SIZE, EMOTION_INPUT_SIZE);
        let input = preprocess(&resized);

        let outputs = self
            .session
            .run(ort::inputs![TensorRef::from_array_view(input.view())?])?;

        let (_, logits) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| ClassifierError::InferenceFailed(format!("emotion logits: {e}")))?;

        if logits.len() != EMOTION_CLASSES {
            return Err(ClassifierError::InferenceFailed(format!(
                "expected {EMOTION_CLASSES} emotion logits, got {}",
                logits.len()
            )));
        }

        let probs = softmax(logits);

        let mut scores = EmotionScores::new();
        for (i, &p) in probs.iter().enumerate() {
            scores.set(MODEL_OUTPUT_ORDER[i], p);
        }
        Ok(scores)
    }
}

/// Crop a face box out of an RGB24 frame as a grayscale buffer.
///
/// The box is clamped to the frame bounds. Returns `None` when the
/// clamped region is empty.
fn crop_gray(
    rgb: &[u8],
    width: usize,
    height: usize,
    face: &BoundingBox,
) -> Option<(Vec<u8>, usize, usize)> {
    let x0 = (face.x.floor().max(0.0) as usize).min(width);
    let y0 = (face.y.floor().max(0.0) as usize).min(height);
    let x1 = ((face.x + face.width).ceil().max(0.0) as usize).min(width);
    let y1 = ((face.y + face.height).ceil().max(0.0) as usize).min(height);

    if x1 <= x0 || y1 <= y0 {
        return None;
    }

    let crop_w = x1 - x0;
    let crop_h = y1 - y0;
    let mut gray = Vec::with_capacity(crop_w * crop_h);

    for y in y0..y1 {
        for x in x0..x1 {
            let off = (y * width + x) * 3;
            gray.push(luma(rgb[off], rgb[off + 1], rgb[off + 2]));
        }
    }

    Some((gray, crop_w, crop_h))
}

/// Integer Rec. 601 luma.
fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((299 * r as u32 + 587 * g as u32 + 114 * b as u32) / 1000) as u8
}

/// Resize a grayscale buffer using bilinear interpolation.
fn resize_gray_bilinear(
    gray: &[u8],
    width: usize,
    height: usize,
    new_w: usize,
    new_h: usize,
) -> Vec<u8> {
    let inv_x = width as f32 / new_w as f32;
    let inv_y = height as f32 / new_h as f32;

    let mut resized = vec![0u8; new_w * new_h];
    for y in 0..new_h {
        let src_y = (y as f32 + 0.5) * inv_y - 0.5;
        let y0 = (src_y.floor() as i32).clamp(0, height as i32 - 1) as usize;
        let y1 = (y0 + 1).min(height - 1);
        let fy = (src_y - src_y.floor()).clamp(0.0, 1.0);

        for x in 0..new_w {
            let src_x = (x as f32 + 0.5) * inv_x - 0.5;
            let x0 = (src_x.floor() as i32).clamp(0, width as i32 - 1) as usize;
            let x1 = (x0 + 1).min(width - 1);
            let fx = (src_x - src_x.floor()).clamp(0.0, 1.0);

            let tl = gray[y0 * width + x0] as f32;
            let tr = gray[y0 * width + x1] as f32;
            let bl = gray[y1 * width + x0] as f32;
            let br = gray[y1 * width + x1] as f32;

            let val = tl * (1.0 - fx) * (1.0 - fy)
                + tr * fx * (1.0 - fy)
                + bl * (1.0 - fx) * fy
                + br * fx * fy;

            resized[y * new_w + x] = val.round().clamp(0.0, 255.0) as u8;
        }
    }

    resized
}

/// Normalize a 64x64 grayscale crop into a NCHW [1, 1, 64, 64] tensor in [0, 1].
fn preprocess(gray: &[u8]) -> Array4<f32> {
    let size = EMOTION_INPUT_SIZE;
    let mut tensor = Array4::<f32>::zeros((1, 1, size, size));

    for y in 0..size {
        for x in 0..size {
            let pixel = gray.get(y * size + x).copied().unwrap_or(0) as f32;
            tensor[[0, 0, y, x]] = pixel / 255.0;
        }
    }

    tensor
}

/// Numerically stable softmax.
fn softmax(logits: &[f32]) -> Vec<f32> {
    let max_logit = logits.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let exp: Vec<f32> = logits.iter().map(|&x| (x - max_logit).exp()).collect();
    let sum: f32 = exp.iter().sum();
    exp.iter().map(|&e| e / sum).collect()
}
