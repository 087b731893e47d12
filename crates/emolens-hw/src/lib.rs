//! emolens-hw — Hardware abstraction for webcam capture.
//!
//! Provides V4L2-based camera access by device index, RGB24 frame
//! conversion, and frame downscaling.

pub mod camera;
pub mod frame;

pub use camera::{Camera, CameraError, DeviceInfo, FrameSource, PixelFormat};
pub use frame::Frame;
