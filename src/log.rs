use fs_err as fs;
use serde_json::to_string_pretty;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::wire::PromptPayload;

/// ========================================
/// Per-transaction artifact saving
/// ========================================
///
/// Debug aid: writes the prompt we sent and the raw completion we got back,
/// one directory per transaction id. Strictly best-effort; callers log and
/// ignore failures.

pub struct ArtifactLog {
    root: PathBuf,
}

pub struct SavedPaths {
    pub dir: PathBuf,
    pub prompt: PathBuf,
    pub completion: PathBuf,
}

fn tx_dir(root: &Path, tx: Uuid) -> PathBuf {
    root.join("tx").join(tx.to_string())
}

impl ArtifactLog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn save_stage(
        &self,
        stage: &str,
        tx: Uuid,
        payload: &PromptPayload,
        raw_completion: &str,
    ) -> anyhow::Result<SavedPaths> {
        let dir = tx_dir(&self.root, tx);
        fs::create_dir_all(&dir)?;

        let prompt = dir.join(format!("{stage}.prompt.json"));
        fs::write(&prompt, to_string_pretty(payload)?)?;

        let completion = dir.join(format!("{stage}.completion.txt"));
        fs::write(&completion, raw_completion)?;

        Ok(SavedPaths { dir, prompt, completion })
    }
}
