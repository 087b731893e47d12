//! Session controller — owns the camera handle and the running flag,
//! and drives the per-frame capture → downscale → detect → annotate →
//! log step.

use crate::log_sink::EmotionLog;
use emolens_core::{annotate, EmotionDetector, PipelineError};
use emolens_hw::{CameraError, Frame, FrameSource};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("camera unavailable: {0}")]
    CaptureUnavailable(#[source] CameraError),
    #[error("frame read failed: {0}")]
    FrameRead(#[source] CameraError),
    #[error("detection failed: {0}")]
    Detector(#[from] PipelineError),
    #[error("log write failed: {0}")]
    Log(#[from] std::io::Error),
}

/// One running/stopped capture cycle.
///
/// Generic over the frame source and detector so the state machine is
/// testable without hardware or model files. Invariants: at most one
/// source handle is held at any instant, and after `stop` or any
/// `tick` error the handle is released.
pub struct Session<S: FrameSource, D: EmotionDetector> {
    opener: Box<dyn Fn(u32) -> Result<S, CameraError>>,
    source: Option<S>,
    running: bool,
    detector: D,
    log: EmotionLog,
    warmup_frames: usize,
}

impl<S: FrameSource, D: EmotionDetector> Session<S, D> {
    pub fn new(
        detector: D,
        log: EmotionLog,
        warmup_frames: usize,
        opener: impl Fn(u32) -> Result<S, CameraError> + 'static,
    ) -> Self {
        Self {
            opener: Box::new(opener),
            source: None,
            running: false,
            detector,
            log,
            warmup_frames,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn camera_attached(&self) -> bool {
        self.source.is_some()
    }

    /// Start signal: open the device if no handle is held, then run.
    /// Re-starting with a handle already open only sets the flag.
    pub fn start(&mut self, camera_index: u32) -> Result<(), SessionError> {
        if self.source.is_none() {
            let mut source =
                (self.opener)(camera_index).map_err(SessionError::CaptureUnavailable)?;

            // Discard frames until AGC/exposure settles.
            for _ in 0..self.warmup_frames {
                let _ = source.grab();
            }

            self.source = Some(source);
            tracing::info!(camera_index, "camera opened");
        }
        self.running = true;
        Ok(())
    }

    /// Stop signal: clears the running flag and releases the handle.
    pub fn stop(&mut self) {
        if self.source.take().is_some() {
            tracing::info!("camera released");
        }
        self.running = false;
    }

    /// One loop iteration: capture, downscale, detect, annotate, log.
    ///
    /// Returns the annotated frame for display, or `None` when the
    /// session is not running (the device is not touched). Every error
    /// runs the same cleanup — the handle is released and the running
    /// flag cleared — before propagating.
    pub fn tick(&mut self, scale: f32) -> Result<Option<Frame>, SessionError> {
        if !self.running {
            return Ok(None);
        }
        match self.step(scale) {
            Ok(frame) => Ok(Some(frame)),
            Err(e) => {
                self.stop();
                Err(e)
            }
        }
    }

    fn step(&mut self, scale: f32) -> Result<Frame, SessionError> {
        let source = self
            .source
            .as_mut()
            .ok_or(SessionError::CaptureUnavailable(CameraError::NotOpen))?;

        let frame = match source.grab() {
            Ok(frame) => frame,
            Err(
                e @ (CameraError::DeviceNotFound(_)
                | CameraError::DeviceBusy
                | CameraError::NotOpen),
            ) => return Err(SessionError::CaptureUnavailable(e)),
            Err(e) => return Err(SessionError::FrameRead(e)),
        };

        // Detection runs on the scaled frame, not the original.
        let mut frame = if scale < 1.0 {
            frame.downscale(scale)
        } else {
            frame
        };

        let detections = self
            .detector
            .detect(&frame.data, frame.width, frame.height)?;

        annotate::draw_detections(&mut frame.data, frame.width, frame.height, &detections);

        for det in &detections {
            let (emotion, confidence) = det.top_emotion();
            self.log.append(emotion, confidence)?;
        }

        tracing::debug!(
            faces = detections.len(),
            width = frame.width,
            height = frame.height,
            seq = frame.sequence,
            "frame processed"
        );

        Ok(frame)
    }
}
