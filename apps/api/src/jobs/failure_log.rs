//! Append-only text log of failed enrichment attempts.

use std::path::{Path, PathBuf};

use chrono::Local;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

#[derive(Debug, Clone)]
pub struct FailureLog {
    path: PathBuf,
}

impl FailureLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `<timestamp> - Attempt <n> failed: <message>`, creating the
    /// parent directory on first use.
    pub async fn record(&self, attempt: u32, message: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.6f").to_string();
        let line = format_line(&timestamp, attempt, message);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await
    }
}

fn format_line(timestamp: &str, attempt: u32, message: &str) -> String {
    // One line per failure, whatever the message contains.
    let message = message.replace('\n', " ");
    format!("{timestamp} - Attempt {attempt} failed: {message}\n")
}
