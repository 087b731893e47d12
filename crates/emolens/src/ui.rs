//! The display surface — an egui window with runtime controls, the
//! latest annotated frame, a status line, and the log table.

use crate::log_sink::EmotionLog;
use crate::session::Session;
use emolens_core::EmotionPipeline;
use emolens_hw::Camera;
use std::time::Duration;

/// Repaint cadence while the capture loop is running. Caps the refresh
/// rate; there is no frame-dropping policy beyond it.
const RUNNING_REPAINT_INTERVAL: Duration = Duration::from_millis(30);
/// Most recent rows shown in the log table.
const LOG_TABLE_ROWS: usize = 200;

enum Status {
    Idle,
    Running,
    Error(String),
}

pub struct EmolensApp {
    session: Session<Camera, EmotionPipeline>,
    log: EmotionLog,
    camera_index: u32,
    frame_scale: f32,
    show_log: bool,
    texture: Option<egui::TextureHandle>,
    status: Status,
}

impl EmolensApp {
    pub fn new(
        session: Session<Camera, EmotionPipeline>,
        log: EmotionLog,
        camera_index: u32,
        frame_scale: f32,
    ) -> Self {
        Self {
            session,
            log,
            camera_index,
            frame_scale,
            show_log: false,
            texture: None,
            status: Status::Idle,
        }
    }

    /// Run one capture-detect-annotate-log iteration and upload the
    /// result as a texture. A stop signal set since the last repaint is
    /// observed here, at the top of the iteration.
    fn run_session_step(&mut self, ctx: &egui::Context) {
        if !self.session.is_running() {
            return;
        }

        match self.session.tick(self.frame_scale) {
            Ok(Some(frame)) => {
                let color_image = egui::ColorImage::from_rgb(
                    [frame.width as usize, frame.height as usize],
                    &frame.data,
                );
                self.texture =
                    Some(ctx.load_texture("camera", color_image, egui::TextureOptions::LINEAR));
            }
            Ok(None) => {}
            Err(e) => {
                // The session already released the camera and stopped.
                tracing::error!(error = %e, "capture loop terminated");
                self.status = Status::Error(e.to_string());
            }
        }

        if self.session.is_running() {
            ctx.request_repaint_after(RUNNING_REPAINT_INTERVAL);
        }
    }

    fn render_controls(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("controls").show(ctx, |ui| {
            ui.heading("Emolens");
            ui.separator();

            ui.add(egui::Slider::new(&mut self.camera_index, 0..=4).text("Camera index"));
            ui.add(egui::Slider::new(&mut self.frame_scale, 0.25..=1.0).text("Frame scale"));

            ui.horizontal(|ui| {
                if ui.button("Start").clicked() {
                    match self.session.start(self.camera_index) {
                        Ok(()) => self.status = Status::Running,
                        Err(e) => {
                            tracing::error!(error = %e, "start failed");
                            self.status = Status::Error(e.to_string());
                        }
                    }
                }
                if ui.button("Stop").clicked() {
                    self.session.stop();
                    self.status = Status::Idle;
                }
            });

            ui.checkbox(&mut self.show_log, "Show log table");
        });
    }

    fn render_main(&self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(texture) = &self.texture {
                let avail = ui.available_size();
                let tex = texture.size_vec2();
                let aspect = tex.x / tex.y;

                // Fit the frame into the panel, leaving room for the
                // status line below.
                let max_h = (avail.y - 60.0).max(120.0);
                let mut w = avail.x;
                let mut h = w / aspect;
                if h > max_h {
                    h = max_h;
                    w = h * aspect;
                }

                ui.add(egui::Image::new(texture).fit_to_exact_size(egui::vec2(w, h)));
            }

            let status_text = match &self.status {
                Status::Idle => "Stopped. Press Start to begin.".to_string(),
                Status::Running => "Running... press Stop to end".to_string(),
                Status::Error(msg) => format!("Error: {msg}"),
            };
            ui.label(status_text);

            if self.show_log {
                self.render_log_table(ui);
            }
        });
    }

    /// The log table reads the CSV fresh each repaint; a read failure
    /// renders as panel text and never touches the capture loop.
    fn render_log_table(&self, ui: &mut egui::Ui) {
        ui.separator();
        match self.log.read_records() {
            Ok(records) => {
                let start = records.len().saturating_sub(LOG_TABLE_ROWS);
                egui::ScrollArea::vertical().max_height(240.0).show(ui, |ui| {
                    egui::Grid::new("emotion_log").striped(true).show(ui, |ui| {
                        ui.label("timestamp");
                        ui.label("emotion");
                        ui.label("confidence");
                        ui.end_row();
                        for rec in &records[start..] {
                            ui.label(rec.timestamp.as_str());
                            ui.label(rec.emotion.as_str());
                            ui.label(rec.confidence.as_str());
                            ui.end_row();
                        }
                    });
                });
            }
            Err(e) => {
                ui.colored_label(egui::Color32::RED, format!("Failed to read log: {e}"));
            }
        }
    }
}

impl eframe::App for EmolensApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.run_session_step(ctx);
        self.render_controls(ctx);
        self.render_main(ctx);
    }
}
