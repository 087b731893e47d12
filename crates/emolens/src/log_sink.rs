//! Append-only CSV log of emotion detections.
//!
//! One row per detected face per frame:
//! `<RFC 3339 local timestamp>,<lowercase label>,<confidence %.4f>`.

use emolens_core::EmotionLabel;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const HEADER: &str = "timestamp,emotion,confidence";

/// Owned path to the detection log. Cheap to clone; every operation
/// opens and closes the file, single-writer assumed.
#[derive(Clone)]
pub struct EmotionLog {
    path: PathBuf,
}

/// One parsed log row, kept as display text for the UI table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub timestamp: String,
    pub emotion: String,
    pub confidence: String,
}

impl EmotionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the parent directory and the header-only file if absent.
    /// Idempotent; safe to call on every run.
    pub fn ensure(&self) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        if !self.path.exists() {
            fs::write(&self.path, format!("{HEADER}\n"))?;
        }
        Ok(())
    }

    /// Append one detection row and close the file.
    pub fn append(&self, emotion: EmotionLabel, confidence: f32) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;
        writeln!(
            file,
            "{},{},{confidence:.4}",
            chrono::Local::now().to_rfc3339(),
            emotion
        )
    }

    /// Parse the log into display records, skipping the header.
    pub fn read_records(&self) -> io::Result<Vec<LogRecord>> {
        let text = fs::read_to_string(&self.path)?;
        Ok(text
            .lines()
            .skip(1)
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                let mut cols = line.splitn(3, ',');
                LogRecord {
                    timestamp: cols.next().unwrap_or_default().to_string(),
                    emotion: cols.next().unwrap_or_default().to_string(),
                    confidence: cols.next().unwrap_or_default().to_string(),
                }
            })
            .collect())
    }
}
