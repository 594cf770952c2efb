//! Server test utilities.

use parcel_core::config::AppConfig;
use parcel_notify::Notifier;
use parcel_notify::testing::RecordingSender;
use parcel_server::{AppState, create_router};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// A router over a temporary content root.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestServer {
    pub router: axum::Router,
    pub state: AppState,
    /// Receives every notification batch when notifications are enabled.
    pub sender: Arc<RecordingSender>,
    content: TempDir,
}

#[allow(dead_code)]
impl TestServer {
    /// Test server with notifications delivered to a [`RecordingSender`].
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Test server with custom config modifications.
    pub fn with_config<F>(modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        let sender = RecordingSender::new();
        let notifier = Notifier::with_sender(sender.clone(), true);
        Self::build(modifier, notifier, sender)
    }

    /// Test server whose notifications are disabled.
    pub fn without_notifications() -> Self {
        Self::build(|_| {}, Notifier::Disabled, RecordingSender::new())
    }

    fn build<F>(modifier: F, notifier: Notifier, sender: Arc<RecordingSender>) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        let content = tempfile::tempdir().expect("Failed to create temp directory");
        let mut config = AppConfig::for_testing(content.path());
        modifier(&mut config);

        let state = AppState::new(config, notifier);
        let router = create_router(state.clone());

        Self {
            router,
            state,
            sender,
            content,
        }
    }

    pub fn root(&self) -> &Path {
        self.content.path()
    }

    /// Create `drop/{session}` and return its path.
    pub fn create_drop_dir(&self, session: &str) -> PathBuf {
        let dir = self.root().join("drop").join(session);
        std::fs::create_dir_all(&dir).expect("Failed to create drop directory");
        dir
    }

    /// Create `serve/{session}` and return its path.
    pub fn create_serve_dir(&self, session: &str) -> PathBuf {
        let dir = self.root().join("serve").join(session);
        std::fs::create_dir_all(&dir).expect("Failed to create serve directory");
        dir
    }

    /// Write `serve/{session}/{name}`.
    pub fn write_serve_file(&self, session: &str, name: &str, content: &[u8]) -> PathBuf {
        let path = self.create_serve_dir(session).join(name);
        std::fs::write(&path, content).expect("Failed to write serve file");
        path
    }

    /// Write `keys/{name}`.
    pub fn write_key(&self, name: &str, content: &str) {
        let dir = self.root().join("keys");
        std::fs::create_dir_all(&dir).expect("Failed to create keys directory");
        std::fs::write(dir.join(name), content).expect("Failed to write key");
    }

    /// Sorted names of the files in `drop/{session}`.
    pub fn drop_files(&self, session: &str) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.root().join("drop").join(session))
            .expect("Failed to read drop directory")
            .map(|e| e.expect("dir entry").file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}
