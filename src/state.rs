use crate::client::{PredictionClient, UploadError};
use crate::models::PredictionResult;
use crate::render::{ResultView, render};
use crate::upload::{Completion, UploadController};
use poll_promise::Promise;
use std::path::Path;
use std::sync::Arc;

pub const ALERT_NO_FILE: &str = "Please select a file";
pub const ALERT_UPLOAD_FAILED: &str = "Error uploading file";

struct InFlight {
    generation: u64,
    promise: Promise<Completion>,
}

pub struct AppState {
    pub upload: UploadController,
    pub current_result: Option<PredictionResult>,
    pub is_loading: bool,
    pub alert: Option<String>,
    pub selection_error: Option<String>,
    pub debug_output: String,
    pub debug_panel_height: f32,
    pub debug_panel_visible: bool,
    generation: u64,
    in_flight: Vec<InFlight>,
}

impl AppState {
    pub fn new(client: Arc<dyn PredictionClient>) -> Self {
        AppState {
            upload: UploadController::new(client),
            current_result: None,
            is_loading: false,
            alert: None,
            selection_error: None,
            debug_output: String::new(),
            debug_panel_height: 150.0,
            debug_panel_visible: false,
            generation: 0,
            in_flight: Vec::new(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn pending_requests(&self) -> usize {
        self.in_flight.len()
    }

    pub fn view(&self) -> Option<ResultView> {
        render(self.current_result.as_ref())
    }

    pub fn select_file(&mut self, path: &Path) {
        match self.upload.select_file(path) {
            Ok(()) => {
                self.selection_error = None;
                self.log(format!("Selected {}", path.display()));
            }
            Err(err) => {
                self.log(format!("Rejected selection: {err}"));
                self.selection_error = Some(err.to_string());
            }
        }
    }

    pub fn submit(&mut self) {
        let next = self.generation + 1;
        match self.upload.submit(next) {
            Ok(promise) => {
                self.generation = next;
                self.current_result = None;
                self.is_loading = true;
                self.in_flight.push(InFlight {
                    generation: next,
                    promise,
                });
                if self.in_flight.len() > 1 {
                    tracing::info!(
                        generation = next,
                        superseded = self.in_flight.len() - 1,
                        "submission supersedes pending requests"
                    );
                }
                self.log(format!("Submitted request #{next}"));
            }
            Err(UploadError::NoFileSelected) => {
                tracing::info!("submit without a selected file");
                self.alert = Some(ALERT_NO_FILE.to_string());
            }
            Err(err) => {
                tracing::warn!(error = %err, "submit failed before sending");
                self.alert = Some(ALERT_UPLOAD_FAILED.to_string());
            }
        }
    }

    /// Collects finished requests. Returns true when the visible state changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        let mut still_pending = Vec::with_capacity(self.in_flight.len());

        for flight in std::mem::take(&mut self.in_flight) {
            match flight.promise.try_take() {
                Ok(completion) => changed |= self.complete(completion),
                Err(promise) => still_pending.push(InFlight {
                    generation: flight.generation,
                    promise,
                }),
            }
        }

        self.in_flight = still_pending;
        changed
    }

    fn complete(&mut self, completion: Completion) -> bool {
        let Completion { generation, result } = completion;
        if generation != self.generation {
            tracing::info!(
                generation,
                current = self.generation,
                "discarding response from superseded request"
            );
            self.log(format!("Discarded stale response #{generation}"));
            return false;
        }

        self.is_loading = false;
        self.upload.finish();
        match result {
            Ok(prediction) => {
                self.log(format!(
                    "Request #{generation} returned a {} result",
                    prediction.shape()
                ));
                self.current_result = Some(prediction);
            }
            Err(err) => {
                tracing::error!(generation, error = %err, "upload failed");
                self.log(format!("Request #{generation} failed: {err}"));
                self.current_result = None;
                self.alert = Some(ALERT_UPLOAD_FAILED.to_string());
            }
        }
        true
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    fn log(&mut self, message: String) {
        self.debug_output.push_str(&message);
        self.debug_output.push('\n');
    }
}
