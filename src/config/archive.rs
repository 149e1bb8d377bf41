//! Archive collaborator configuration types.

use serde::{Deserialize, Serialize};

/// Which archive backend stores finished drafts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveBackend {
    /// Process-local storage; finished drafts do not survive a restart.
    #[default]
    Memory,
}

/// Archive collaborator settings.
///
/// Credentials are accepted here (and via `DRAFTROOM__ARCHIVE__*` variables)
/// so external backends can be wired in without a schema change; the
/// in-memory backend ignores them with a warning.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ArchiveConfig {
    #[serde(default)]
    pub backend: ArchiveBackend,
    /// Path to a credentials file for an external archive service
    #[serde(default)]
    pub credentials_path: Option<String>,
    /// Project or tenant identifier for an external archive service
    #[serde(default)]
    pub project_id: Option<String>,
}
