use crate::render::{ClassificationView, ReportView, ResultView};
use crate::state::AppState;
use crate::upload::ACCEPTED_EXTENSIONS;
use eframe::egui;
use eframe::egui::{Color32, RichText, Ui};
use rfd::FileDialog;

const ACCENT: Color32 = Color32::from_rgb(119, 141, 169);
const TEXT: Color32 = Color32::from_rgb(224, 225, 221);
const PANEL_FILL: Color32 = Color32::from_rgb(27, 38, 59);

pub fn upload_panel(ctx: &egui::Context, ui: &mut Ui, state: &mut AppState) {
    egui::Frame::group(ui.style())
        .fill(PANEL_FILL)
        .inner_margin(16.0)
        .show(ui, |ui| {
            ui.set_max_width(420.0);
            ui.vertical_centered(|ui| {
                let picker_label = match state.upload.selected_file() {
                    Some(file) => file.file_name.clone(),
                    None => "Choose TSV File to Upload".to_string(),
                };

                if ui.button(picker_label).clicked() {
                    if let Some(path) = FileDialog::new()
                        .add_filter("Gene expression (TSV)", &ACCEPTED_EXTENSIONS)
                        .pick_file()
                    {
                        state.select_file(&path);
                    }
                }

                if let Some(err) = &state.selection_error {
                    ui.colored_label(Color32::RED, err);
                }

                ui.add_space(12.0);
                if ui.button(RichText::new("Upload & Analyze").strong()).clicked() {
                    state.submit();
                    ctx.request_repaint();
                }

                if state.is_loading {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Analyzing sample...");
                    });
                }

                ui.add_space(8.0);
                ui.label(
                    RichText::new("Upload a TSV file containing gene expression data.")
                        .small()
                        .color(TEXT),
                );
            });
        });
}

pub fn result_panel(ui: &mut Ui, view: &ResultView) {
    egui::Frame::group(ui.style())
        .fill(PANEL_FILL)
        .inner_margin(20.0)
        .show(ui, |ui| {
            ui.set_max_width(720.0);
            ui.heading(RichText::new(view.heading()).color(TEXT));
            ui.separator();

            match view {
                ResultView::Failure { message } => {
                    ui.colored_label(Color32::LIGHT_RED, message);
                }
                ResultView::Classification(classification) => classification_body(ui, classification),
                ResultView::Report(report) => report_body(ui, report),
            }
        });
}

fn labeled(ui: &mut Ui, label: &str, value: &str) {
    ui.horizontal(|ui| {
        ui.label(RichText::new(format!("{label}:")).strong().color(ACCENT));
        ui.label(RichText::new(value).color(TEXT));
    });
}

fn gene_list(ui: &mut Ui, id: &str, genes: &[String]) {
    egui::ScrollArea::vertical()
        .id_salt(id)
        .max_height(160.0)
        .show(ui, |ui| {
            for gene in genes {
                ui.label(RichText::new(format!("• {gene}")).color(TEXT));
            }
        });
}

fn classification_body(ui: &mut Ui, view: &ClassificationView) {
    labeled(ui, "Sample", &view.sample_name);
    ui.horizontal(|ui| {
        ui.label(RichText::new("Predicted Class:").strong().color(ACCENT));
        ui.label(RichText::new(&view.predicted_class).strong().color(Color32::LIGHT_GREEN));
    });
    labeled(ui, "Cancer Probability", &view.cancer_probability);
    labeled(ui, "Confidence Score", &view.confidence_score);

    ui.add_space(12.0);
    ui.label(RichText::new("Top Gene Expressions").size(18.0).color(TEXT));
    gene_list(ui, "top_genes_expression", &view.top_genes);

    ui.add_space(12.0);
    ui.label(RichText::new("Expression Summary").size(18.0).color(TEXT));
    egui::Grid::new("expression_summary")
        .num_columns(2)
        .striped(true)
        .show(ui, |ui| {
            for (label, value) in &view.summary {
                ui.label(RichText::new(*label).color(ACCENT));
                ui.label(RichText::new(value).color(TEXT));
                ui.end_row();
            }
        });

    if view.has_chart_data {
        ui.add_space(8.0);
        ui.label(RichText::new("Chart data received (not displayed).").italics().weak());
    }
}

fn report_body(ui: &mut Ui, view: &ReportView) {
    labeled(ui, "Sample", &view.sample_name);
    ui.horizontal(|ui| {
        ui.label(RichText::new("Prediction:").strong().color(ACCENT));
        ui.label(RichText::new(&view.prediction).strong().color(Color32::LIGHT_GREEN));
    });
    ui.label(RichText::new(&view.log_info).italics().color(ACCENT));

    ui.add_space(12.0);
    ui.label(RichText::new("Top 5 Gene Expressions").size(18.0).color(TEXT));
    gene_list(ui, "gene_expression_data", &view.top_genes);

    if let Some(url) = &view.chart_image_url {
        ui.add_space(12.0);
        ui.label(RichText::new("Visualization").size(18.0).color(TEXT));
        ui.add(
            egui::Image::from_uri(url.clone())
                .max_height(400.0)
                .maintain_aspect_ratio(true),
        );
    }
}

pub fn alert_window(ctx: &egui::Context, state: &mut AppState) {
    let Some(message) = state.alert.clone() else {
        return;
    };

    egui::Window::new("Notice")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.label(message);
            ui.add_space(8.0);
            if ui.button("OK").clicked() {
                state.dismiss_alert();
            }
        });
}

pub fn debug_panel(ctx: &egui::Context, state: &mut AppState) {
    egui::TopBottomPanel::bottom("debug_panel")
        .resizable(true)
        .min_height(50.0)
        .default_height(state.debug_panel_height)
        .show_animated(ctx, state.debug_panel_visible, |ui| {
            state.debug_panel_height = ui.available_height();

            ui.horizontal(|ui| {
                ui.heading("Debug Output");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Clear").clicked() {
                        state.debug_output.clear();
                    }
                    if ui.button("Hide").clicked() {
                        state.debug_panel_visible = false;
                    }
                });
            });
            ui.separator();

            egui::ScrollArea::vertical()
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    ui.add(
                        egui::TextEdit::multiline(&mut state.debug_output.as_str())
                            .desired_width(f32::INFINITY)
                            .desired_rows(6)
                            .font(egui::TextStyle::Monospace),
                    );
                });
        });
}
