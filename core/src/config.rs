//! Engine configuration.
//!
//! Everything has a sensible default; a JSON file is only needed to
//! override the preview size or pin the draw RNG for reproducible runs.

use crate::error::EngineResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// How many eligible entries a progress view previews.
    #[serde(default = "default_preview_limit")]
    pub preview_limit: usize,

    /// Fixed seed for the winner-draw RNG. None = entropy-seeded.
    /// Set this only in tests and demos; production draws stay unseeded.
    #[serde(default)]
    pub draw_seed: Option<u64>,
}

fn default_preview_limit() -> usize {
    5
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            preview_limit: default_preview_limit(),
            draw_seed: None,
        }
    }
}

impl EngineConfig {
    pub fn load(path: &Path) -> EngineResult<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read config {}: {e}", path.display()))?;
        Ok(serde_json::from_str(&raw)?)
    }
}
