use std::path::PathBuf;

/// Application configuration, loaded from `EMOLENS_*` environment
/// variables with defaults.
///
/// The runtime inputs — camera index, frame scale, start/stop, the log
/// toggle — live in the UI; this covers the ambient settings the UI
/// does not, plus initial values for the controls.
pub struct Config {
    /// Directory containing the ONNX model files.
    pub model_dir: PathBuf,
    /// Path of the CSV detection log.
    pub log_path: PathBuf,
    /// Initial camera index for the UI selector (0-4).
    pub camera_index: u32,
    /// Initial frame scale for the UI slider (0.25-1.0).
    pub frame_scale: f32,
    /// Frames discarded after opening the camera (AGC/AE settling).
    pub warmup_frames: usize,
}

impl Config {
    pub fn from_env() -> Self {
        let data_dir = std::env::var("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
                PathBuf::from(home).join(".local/share")
            })
            .join("emolens");

        let model_dir = std::env::var("EMOLENS_MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("models"));

        let log_path = std::env::var("EMOLENS_LOG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("logs").join("emotion_log.csv"));

        Self {
            model_dir,
            log_path,
            camera_index: env_u32("EMOLENS_CAMERA_INDEX", 0).min(4),
            frame_scale: env_f32("EMOLENS_FRAME_SCALE", 0.6).clamp(0.25, 1.0),
            warmup_frames: env_usize("EMOLENS_WARMUP_FRAMES", 2),
        }
    }

    /// Path to the SCRFD face detection model.
    pub fn face_model_path(&self) -> String {
        self.model_dir
            .join("det_10g.onnx")
            .to_string_lossy()
            .into_owned()
    }

    /// Path to the 7-class emotion model.
    pub fn emotion_model_path(&self) -> String {
        self.model_dir
            .join("emotion_fer7.onnx")
            .to_string_lossy()
            .into_owned()
    }
}

fn env_f32(key: &str, default: f32) -> f32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
