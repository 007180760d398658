//! Maps a [`PredictionResult`] onto the view shown in the result panel.
//!
//! Pure functions only. Painting the view with egui lives in `ui`.

use crate::models::{
    ExpressionSummary, FlatResult, NestedOutcome, NestedPrediction, PredictionResult,
    Visualizations,
};
use serde_json::{Number, Value};

pub const UNAVAILABLE: &str = "unavailable";
pub const NO_VALID_RESULT: &str = "No valid result returned.";
pub const FLAT_GENE_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub enum ResultView {
    Failure { message: String },
    Classification(ClassificationView),
    Report(ReportView),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationView {
    pub sample_name: String,
    pub predicted_class: String,
    pub cancer_probability: String,
    pub confidence_score: String,
    pub top_genes: Vec<String>,
    pub summary: Vec<(&'static str, String)>,
    pub has_chart_data: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportView {
    pub sample_name: String,
    pub prediction: String,
    pub log_info: String,
    pub top_genes: Vec<String>,
    pub chart_image_url: Option<String>,
}

pub fn render(result: Option<&PredictionResult>) -> Option<ResultView> {
    let view = match result? {
        PredictionResult::Flat(flat) => ResultView::Report(report_view(flat)),
        PredictionResult::Nested(nested) => match nested.outcome() {
            NestedOutcome::Failure { message } => ResultView::Failure {
                message: message.unwrap_or(NO_VALID_RESULT).to_string(),
            },
            NestedOutcome::Success {
                prediction,
                visualizations,
            } => ResultView::Classification(classification_view(prediction, visualizations)),
        },
    };
    Some(view)
}

fn classification_view(
    prediction: Option<&NestedPrediction>,
    visualizations: Option<&Visualizations>,
) -> ClassificationView {
    let default_prediction = NestedPrediction::default();
    let prediction = prediction.unwrap_or(&default_prediction);
    let default_summary = ExpressionSummary::default();
    let summary = visualizations
        .and_then(|v| v.expression_summary.as_ref())
        .unwrap_or(&default_summary);

    ClassificationView {
        sample_name: text(&prediction.sample_name),
        predicted_class: text(&prediction.predicted_class),
        cancer_probability: percent(prediction.cancer_probability),
        confidence_score: percent(prediction.confidence_score),
        top_genes: prediction
            .top_genes_expression
            .iter()
            .map(|(gene, value)| format!("{gene}: {}", fixed3(value.as_f64())))
            .collect(),
        summary: vec![
            ("Mean Expression", fixed3(summary.mean_expression)),
            ("Median Expression", fixed3(summary.median_expression)),
            ("Std Expression", fixed3(summary.std_expression)),
            ("Min Expression", fixed3(summary.min_expression)),
            ("Max Expression", fixed3(summary.max_expression)),
            ("Total Genes", count(summary.total_genes.as_ref())),
            ("Selected Genes", count(summary.selected_genes_count.as_ref())),
        ],
        has_chart_data: visualizations.is_some_and(Visualizations::has_chart_data),
    }
}

fn report_view(flat: &FlatResult) -> ReportView {
    ReportView {
        sample_name: text(&flat.sample_name),
        prediction: text(&flat.prediction),
        log_info: text(&flat.log_info),
        top_genes: flat
            .gene_expression_data
            .iter()
            .take(FLAT_GENE_LIMIT)
            .map(|entry| format!("{}: {}", text(&entry.gene), text(&entry.value)))
            .collect(),
        chart_image_url: flat.chart_image_url.clone().filter(|url| !url.is_empty()),
    }
}

impl ResultView {
    pub fn heading(&self) -> &'static str {
        match self {
            ResultView::Failure { .. } => "Prediction Failed",
            ResultView::Classification(_) | ResultView::Report(_) => "Prediction Result",
        }
    }

    /// Plain-text rendering, one line per displayed element.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![self.heading().to_string()];
        match self {
            ResultView::Failure { message } => lines.push(message.clone()),
            ResultView::Classification(view) => {
                lines.push(format!("Sample: {}", view.sample_name));
                lines.push(format!("Predicted Class: {}", view.predicted_class));
                lines.push(format!("Cancer Probability: {}", view.cancer_probability));
                lines.push(format!("Confidence Score: {}", view.confidence_score));
                lines.push("Top Gene Expressions".to_string());
                lines.extend(view.top_genes.iter().cloned());
                lines.push("Expression Summary".to_string());
                lines.extend(
                    view.summary
                        .iter()
                        .map(|(label, value)| format!("{label}: {value}")),
                );
            }
            ResultView::Report(view) => {
                lines.push(format!("Sample: {}", view.sample_name));
                lines.push(format!("Prediction: {}", view.prediction));
                lines.push(view.log_info.clone());
                lines.push(format!("Top {FLAT_GENE_LIMIT} Gene Expressions"));
                lines.extend(view.top_genes.iter().cloned());
                if let Some(url) = &view.chart_image_url {
                    lines.push(format!("Chart: {url}"));
                }
            }
        }
        lines
    }
}

/// Formats `value * 100` with two decimals, e.g. `0.8765` as `87.65%`.
pub fn percent(value: Option<f64>) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) => format!("{:.2}%", (v * 10_000.0).round() / 100.0),
        None => UNAVAILABLE.to_string(),
    }
}

pub fn fixed3(value: Option<f64>) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) => format!("{v:.3}"),
        None => UNAVAILABLE.to_string(),
    }
}

fn count(value: Option<&Number>) -> String {
    value.map_or_else(|| UNAVAILABLE.to_string(), Number::to_string)
}

// Strings are shown without quotes, other JSON values in their compact form.
fn text(value: &Value) -> String {
    match value {
        Value::Null => UNAVAILABLE.to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => number_text(n),
        other => other.to_string(),
    }
}

// Whole floats drop the trailing `.0`, so `1.0` reads `1` like the service's own output.
fn number_text(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.is_finite() => format!("{f}"),
        _ => n.to_string(),
    }
}
