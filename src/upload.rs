use crate::client::{PredictionClient, TSV_MIME, UploadError};
use crate::models::{PredictionResult, SelectedFile, UploadState};
use poll_promise::Promise;
use std::path::Path;
use std::sync::Arc;

pub const ACCEPTED_EXTENSIONS: [&str; 2] = ["tsv", "txt"];

/// Result of one upload, tagged with the submission it belongs to.
pub struct Completion {
    pub generation: u64,
    pub result: Result<PredictionResult, UploadError>,
}

pub struct UploadController {
    state: UploadState,
    client: Arc<dyn PredictionClient>,
}

pub fn is_accepted_file(path: &Path) -> bool {
    let extension_ok = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            ACCEPTED_EXTENSIONS
                .iter()
                .any(|accepted| ext.eq_ignore_ascii_case(accepted))
        })
        .unwrap_or(false);

    extension_ok || mime_guess::from_path(path).iter_raw().any(|mime| mime == TSV_MIME)
}

impl UploadController {
    pub fn new(client: Arc<dyn PredictionClient>) -> Self {
        UploadController {
            state: UploadState::default(),
            client,
        }
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.state.selected_file.as_ref()
    }

    pub fn is_submitting(&self) -> bool {
        self.state.is_submitting
    }

    pub fn select_file(&mut self, path: &Path) -> Result<(), UploadError> {
        if !is_accepted_file(path) {
            tracing::info!(path = %path.display(), "rejected file selection");
            return Err(UploadError::UnsupportedFile {
                path: path.to_path_buf(),
            });
        }

        let file = SelectedFile::new(path);
        tracing::info!(file = %file.file_name, "selected file");
        self.state.selected_file = Some(file);
        Ok(())
    }

    /// Starts an upload of the selected file on a background thread.
    pub fn submit(&mut self, generation: u64) -> Result<Promise<Completion>, UploadError> {
        let file = self
            .state
            .selected_file
            .clone()
            .ok_or(UploadError::NoFileSelected)?;

        self.state.is_submitting = true;
        let client = Arc::clone(&self.client);
        let span = tracing::info_span!("upload", generation, file = %file.file_name);

        Ok(Promise::spawn_thread("predict_request", move || {
            let _entered = span.enter();
            tracing::info!("sending prediction request");
            let result = client.predict(&file);
            match &result {
                Ok(prediction) => tracing::info!(shape = prediction.shape(), "prediction received"),
                Err(err) => tracing::warn!(error = %err, "prediction request failed"),
            }
            Completion { generation, result }
        }))
    }

    pub fn finish(&mut self) {
        self.state.is_submitting = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingClient {
        calls: AtomicUsize,
    }

    impl PredictionClient for CountingClient {
        fn predict(&self, _file: &SelectedFile) -> Result<PredictionResult, UploadError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(UploadError::Status(reqwest::StatusCode::SERVICE_UNAVAILABLE))
        }
    }

    fn controller() -> (UploadController, Arc<CountingClient>) {
        let client = Arc::new(CountingClient {
            calls: AtomicUsize::new(0),
        });
        (UploadController::new(client.clone()), client)
    }

    #[test]
    fn accepts_tsv_and_txt_in_any_case() {
        assert!(is_accepted_file(Path::new("sample.tsv")));
        assert!(is_accepted_file(Path::new("SAMPLE.TSV")));
        assert!(is_accepted_file(Path::new("/runs/expr.txt")));
        assert!(!is_accepted_file(Path::new("expr.csv")));
        assert!(!is_accepted_file(Path::new("expr.tsv.gz")));
        assert!(!is_accepted_file(Path::new("README")));
    }

    #[test]
    fn selection_replaces_previous_file_without_uploading() {
        let (mut upload, client) = controller();
        upload.select_file(Path::new("first.tsv")).unwrap();
        upload.select_file(Path::new("second.txt")).unwrap();

        assert_eq!(upload.selected_file().unwrap().file_name, "second.txt");
        assert!(!upload.is_submitting());
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn rejected_selection_keeps_previous_file() {
        let (mut upload, _client) = controller();
        upload.select_file(Path::new("keep.tsv")).unwrap();

        let err = upload.select_file(Path::new("photo.png")).unwrap_err();
        assert!(matches!(err, UploadError::UnsupportedFile { ref path } if path == &PathBuf::from("photo.png")));
        assert_eq!(upload.selected_file().unwrap().file_name, "keep.tsv");
    }

    #[test]
    fn submit_without_file_never_calls_client() {
        let (mut upload, client) = controller();

        for generation in 1..=3 {
            let err = upload.submit(generation).err().unwrap();
            assert!(matches!(err, UploadError::NoFileSelected));
        }

        assert_eq!(upload.state(), &UploadState::default());
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn submit_runs_one_request_tagged_with_generation() {
        let (mut upload, client) = controller();
        upload.select_file(Path::new("sample.tsv")).unwrap();

        let promise = upload.submit(7).unwrap();
        assert!(upload.is_submitting());

        let completion = promise.block_and_take();
        assert_eq!(completion.generation, 7);
        assert!(matches!(completion.result, Err(UploadError::Status(_))));
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);

        upload.finish();
        assert!(!upload.is_submitting());
    }
}
