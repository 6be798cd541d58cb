use anyhow::{Context, Result};
use resizer_client::{JobObserver, JobState, ResizedImage, SelectedFile};
use std::path::{Path, PathBuf};

const PROGRESS_BAR_WIDTH: usize = 20;

/// Initialize tracing for the CLI binary.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

/// Presentation state for one terminal session.
#[derive(Debug)]
pub struct UiState {
    /// Set while a job is in flight; a second job must not start.
    pub busy: bool,
    pub state: JobState,
    pub progress: u8,
    pub status: String,
    echo: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            busy: false,
            state: JobState::Idle,
            progress: 0,
            status: String::new(),
            echo: true,
        }
    }
}

impl UiState {
    /// A state that records transitions without printing them.
    pub fn silent() -> Self {
        Self {
            echo: false,
            ..Default::default()
        }
    }

    /// Claim the trigger. Returns false if a job is already running.
    pub fn begin(&mut self) -> bool {
        if self.busy {
            return false;
        }
        self.busy = true;
        self.state = JobState::Idle;
        self.progress = 0;
        self.status.clear();
        true
    }

    pub fn render(&self) -> String {
        let filled = PROGRESS_BAR_WIDTH * usize::from(self.progress) / 100;
        let bar = format!(
            "{}{}",
            "#".repeat(filled),
            "-".repeat(PROGRESS_BAR_WIDTH - filled)
        );
        match self.state {
            JobState::Errored => format!("[{}] {:>3}% error: {}", bar, self.progress, self.status),
            _ => format!("[{}] {:>3}% {}", bar, self.progress, self.status),
        }
    }
}

impl JobObserver for UiState {
    fn on_transition(&mut self, state: JobState, progress: u8, status: &str) {
        self.state = state;
        self.progress = progress;
        self.status = status.to_string();
        if state.is_terminal() {
            self.busy = false;
        }
        if self.echo {
            eprintln!("{}", self.render());
        }
    }
}

/// Declared content type for an upload, from the file extension.
pub fn content_type_for(path: &Path) -> Option<&'static str> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())?;

    let content_type = match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        _ => return None,
    };
    Some(content_type)
}

/// Read a file from disk into the shape the orchestrator expects.
pub fn load_selected_file(path: &Path) -> Result<SelectedFile> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("Not a file name: {}", path.display()))?
        .to_string();
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

    Ok(SelectedFile {
        name,
        content_type: content_type_for(path).map(str::to_string),
        bytes,
    })
}

/// Write the resized image into `dir` under its download name.
pub fn save_result(dir: &Path, image: &ResizedImage) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    let path = dir.join(&image.download_name);
    std::fs::write(&path, &image.bytes)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_is_cleared_on_terminal_states() {
        for terminal in [JobState::Ready, JobState::Errored] {
            let mut ui = UiState::silent();
            assert!(ui.begin());
            assert!(!ui.begin());

            ui.on_transition(JobState::Uploading, 30, "Uploading your image...");
            assert!(ui.busy);

            ui.on_transition(terminal, 30, "done");
            assert!(!ui.busy);
            assert!(ui.begin());
        }
    }

    #[test]
    fn render_shows_progress_and_status() {
        let mut ui = UiState::silent();
        ui.on_transition(JobState::Transforming, 60, "Resizing your image...");
        assert_eq!(
            ui.render(),
            "[############--------]  60% Resizing your image..."
        );

        ui.on_transition(JobState::Errored, 60, "Resize failed: boom");
        assert!(ui.render().ends_with("error: Resize failed: boom"));
    }

    #[test]
    fn content_type_follows_extension() {
        assert_eq!(content_type_for(Path::new("a/Cat.PNG")), Some("image/png"));
        assert_eq!(content_type_for(Path::new("x.jpeg")), Some("image/jpeg"));
        assert_eq!(content_type_for(Path::new("notes.txt")), None);
        assert_eq!(content_type_for(Path::new("noext")), None);
    }

    #[test]
    fn load_and_save_roundtrip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("My Photo.png");
        std::fs::write(&input, b"pixels").unwrap();

        let file = load_selected_file(&input).unwrap();
        assert_eq!(file.name, "My Photo.png");
        assert_eq!(file.content_type.as_deref(), Some("image/png"));
        assert_eq!(file.bytes, b"pixels");

        let image = ResizedImage {
            bytes: bytes_of(b"jpeg"),
            content_type: "image/jpeg".to_string(),
            download_name: "resized-10x10-My Photo.png".to_string(),
            source_url: "http://localhost/x".to_string(),
        };
        let out = save_result(&dir.path().join("out"), &image).unwrap();
        assert_eq!(std::fs::read(out).unwrap(), b"jpeg");
    }

    #[test]
    fn missing_input_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_selected_file(&dir.path().join("absent.png")).is_err());
    }

    fn bytes_of(data: &'static [u8]) -> resizer_client::Bytes {
        resizer_client::Bytes::from_static(data)
    }
}
