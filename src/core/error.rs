use std::io;
use std::path::PathBuf;

// Errors surfaced by the profile store, the active-profile detector and the switcher.
//
// Most filesystem failures on the user side never reach the caller: the store turns them
// into a disabled profile and the detector into an unknown active profile. What remains
// here is what a caller of `switch_to` or `load_profile_config` has to react to.
#[derive(Debug)]
pub enum TlpError {
    /// The privileged TLP drop-in directory does not exist, so TLP is most likely not installed.
    NotInstalled(PathBuf),
    /// A create/read/write/delete on a user-side file failed.
    Io { context: String, source: io::Error },
    /// The requested id is not part of the catalog.
    ProfileNotFound(String),
    /// The profile exists but its backing file could not be verified.
    ProfileDisabled(String),
    /// The privileged helper reported an error; the text is what it printed.
    SwitchRejected(String),
    /// The privileged helper could not be started at all.
    HelperLaunch(io::Error),
}

impl TlpError {
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        TlpError::Io {
            context: context.into(),
            source,
        }
    }
}

impl std::fmt::Display for TlpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TlpError::NotInstalled(dir) => write!(
                f,
                "TLP profile directory {} not found, maybe TLP is not installed",
                dir.display()
            ),
            TlpError::Io { context, source } => write!(f, "{context}: {source}"),
            TlpError::ProfileNotFound(id) => write!(f, "Profile not found: {id}"),
            TlpError::ProfileDisabled(id) => write!(f, "Profile is not available: {id}"),
            TlpError::SwitchRejected(text) => {
                write!(f, "Privileged helper rejected the switch: {text}")
            }
            TlpError::HelperLaunch(e) => write!(f, "Failed to launch privileged helper: {e}"),
        }
    }
}

impl std::error::Error for TlpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TlpError::Io { source, .. } => Some(source),
            TlpError::HelperLaunch(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, TlpError>;
