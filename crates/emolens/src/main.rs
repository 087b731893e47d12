use anyhow::Context;
use clap::{Parser, Subcommand};
use emolens_core::EmotionPipeline;
use emolens_hw::Camera;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod config;
mod log_sink;
mod session;
mod ui;

use config::Config;
use log_sink::EmotionLog;
use session::Session;
use ui::EmolensApp;

#[derive(Parser)]
#[command(name = "emolens", about = "Live webcam emotion annotation")]
struct Cli {
    /// Initial camera index (0-4)
    #[arg(long)]
    camera: Option<u32>,
    /// Initial frame scale (0.25-1.0)
    #[arg(long)]
    scale: Option<f32>,
    /// Path of the CSV detection log
    #[arg(long)]
    log_path: Option<PathBuf>,
    /// Directory containing the ONNX model files
    #[arg(long)]
    model_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List available capture devices
    Devices,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Some(Commands::Devices) = cli.command {
        let devices = Camera::list_devices();
        if devices.is_empty() {
            println!("no capture devices found");
        }
        for dev in devices {
            println!("{}  {} ({})", dev.path, dev.name, dev.driver);
        }
        return Ok(());
    }

    let mut config = Config::from_env();
    if let Some(camera) = cli.camera {
        config.camera_index = camera.min(4);
    }
    if let Some(scale) = cli.scale {
        config.frame_scale = scale.clamp(0.25, 1.0);
    }
    if let Some(log_path) = cli.log_path {
        config.log_path = log_path;
    }
    if let Some(model_dir) = cli.model_dir {
        config.model_dir = model_dir;
    }

    let log = EmotionLog::new(config.log_path.clone());
    log.ensure()
        .with_context(|| format!("failed to prepare log at {}", config.log_path.display()))?;

    let pipeline = EmotionPipeline::load(&config.face_model_path(), &config.emotion_model_path())
        .context("failed to load detection models")?;

    let session = Session::new(pipeline, log.clone(), config.warmup_frames, Camera::open_index);
    let app = EmolensApp::new(session, log, config.camera_index, config.frame_scale);

    tracing::info!("emolens starting");

    eframe::run_native(
        "Emolens",
        eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size([1024.0, 768.0])
                .with_title("Emolens"),
            ..Default::default()
        },
        Box::new(move |_cc| Ok(Box::new(app))),
    )
    .map_err(|e| anyhow::anyhow!("ui error: {e}"))
}
