use cancer_classifier::client::HttpPredictionClient;
use cancer_classifier::config::{Cli, load_settings};
use cancer_classifier::state::AppState;
use cancer_classifier::ui;
use clap::Parser;
use eframe::egui;
use eframe::egui::{Color32, RichText, Visuals};
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const BACKGROUND: Color32 = Color32::from_rgb(13, 27, 42);

pub struct ClassifierApp {
    state: AppState,
}

impl ClassifierApp {
    fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for ClassifierApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_visuals(Visuals::dark());

        if self.state.poll() {
            ctx.request_repaint();
        }
        if self.state.pending_requests() > 0 {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        ui::debug_panel(ctx, &mut self.state);

        egui::CentralPanel::default()
            .frame(egui::Frame::central_panel(&ctx.style()).fill(BACKGROUND))
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(24.0);
                        ui.heading(
                            RichText::new("Cancer Classifier")
                                .size(32.0)
                                .strong()
                                .color(Color32::from_rgb(224, 225, 221)),
                        );
                        ui.add_space(24.0);

                        ui::upload_panel(ctx, ui, &mut self.state);

                        if let Some(view) = self.state.view() {
                            ui.add_space(24.0);
                            ui::result_panel(ui, &view);
                        }

                        if !self.state.debug_panel_visible {
                            ui.add_space(24.0);
                            if ui.small_button("Show Debug Panel").clicked() {
                                self.state.debug_panel_visible = true;
                            }
                        }
                    });
                });
            });

        ui::alert_window(ctx, &mut self.state);
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let settings = load_settings(&cli);
    tracing::info!(endpoint = %settings.endpoint, timeout = ?settings.request_timeout, "starting cancer classifier");

    let client = HttpPredictionClient::new(&settings)?;
    let state = AppState::new(Arc::new(client));

    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "Cancer Classifier",
        options,
        Box::new(|cc| {
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(ClassifierApp::new(state)))
        }),
    )?;

    Ok(())
}
