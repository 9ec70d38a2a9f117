use serde::Serialize;
use std::path::PathBuf;

/// A selectable TLP power profile together with its user-editable backing file.
///
/// Everything except `enabled` is fixed when the catalog is built. `enabled` becomes
/// `true` once the profile store has verified (or created) the backing file and the
/// system drop-in directory exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    pub id: String,
    pub file_name: String,
    pub user_config_path: PathBuf,
    pub description: String,
    pub display_name: String,
    pub indicator_icon: String,
    pub enabled: bool,
}

/// Result of a successful `switch_to` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// The profile was installed and the active profile changed.
    Switched,
    /// The profile was already active; nothing was staged or installed.
    AlreadyActive,
}
