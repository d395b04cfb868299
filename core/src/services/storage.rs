use std::{collections::HashMap, path::PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use notebook_api::{NotebookId, UserId};
use tokio::{fs, sync::Mutex};
use tracing::warn;

/// Persisted last-viewed watermarks, one per (user, notebook), stored as a
/// small JSON map.
pub struct WatermarkStore {
    file: PathBuf,
    data: Mutex<HashMap<String, i64>>,
}

fn key(user: UserId, notebook: NotebookId) -> String {
    format!("{user}:{notebook}")
}

/// Per-user data directory used when none is configured.
pub fn default_data_dir() -> Result<PathBuf> {
    let proj = ProjectDirs::from("org", "notebook", "notebook")
        .context("no home directory to keep client data in")?;
    Ok(proj.data_dir().to_path_buf())
}

impl WatermarkStore {
    /// Open (or start) the store in `dir`. A corrupt file reads as empty.
    pub async fn open(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir).await?;
        let file = dir.join("watermarks.json");
        let data = match fs::read(&file).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|err| {
                warn!(file = %file.display(), "ignoring unreadable watermarks: {err}");
                HashMap::new()
            }),
            Err(_) => HashMap::new(),
        };
        Ok(Self {
            file,
            data: Mutex::new(data),
        })
    }

    /// Last-viewed time in epoch millis, 0 if never viewed.
    pub async fn get(&self, user: UserId, notebook: NotebookId) -> i64 {
        self.data
            .lock()
            .await
            .get(&key(user, notebook))
            .copied()
            .unwrap_or(0)
    }

    /// Raise the watermark to `at`. Returns the stored value, which is never
    /// lowered.
    pub async fn advance(&self, user: UserId, notebook: NotebookId, at: i64) -> Result<i64> {
        let k = key(user, notebook);
        let mut data = self.data.lock().await;
        let current = data.get(&k).copied().unwrap_or(0);
        if at <= current {
            return Ok(current);
        }
        // memory only moves once the file holds the new value
        let mut next = data.clone();
        next.insert(k, at);
        let bytes = serde_json::to_vec(&next)?;
        fs::write(&self.file, bytes)
            .await
            .with_context(|| format!("writing {}", self.file.display()))?;
        *data = next;
        Ok(at)
    }
}
