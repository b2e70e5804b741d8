//! Error types для stage/sync операций

use std::path::PathBuf;
use thiserror::Error;

use crate::dispatch::TickHandle;

/// Result type для scene операций
pub type SceneResult<T> = Result<T, SceneError>;

#[derive(Error, Debug)]
pub enum SceneError {
    /// Ground ray cast не нашёл пересечений (recoverable, caller решает)
    #[error("no hit below position")]
    NoHitBelow,

    #[error("unknown tick callback: {0:?}")]
    UnknownCallback(TickHandle),

    /// Tick callback вернул ошибку (или не смог запуститься)
    #[error("tick callback failed: {0}")]
    Callback(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid physics batch: {0}")]
    InvalidPhysicsBatch(String),

    #[error("geometry error: {0}")]
    Geometry(String),

    #[error("render error: {0}")]
    Render(String),
}
