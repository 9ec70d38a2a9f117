/*
 * This module centralizes every filesystem location the tool touches: the per-user
 * profile directory, the privileged TLP drop-in directory with its generated marker
 * file, the transient staging file, and the application's own settings directory.
 * Paths are resolved once and passed around explicitly so tests can redirect all of
 * them into temporary directories.
 */
use directories::{BaseDirs, ProjectDirs};
use std::fs;
use std::path::{Path, PathBuf};

pub const APP_NAME: &str = "TlpProfile";
pub const USER_PROFILE_DIR_NAME: &str = ".tlp_profile";
pub const DEFAULT_SYSTEM_PROFILE_DIR: &str = "/etc/tlp.d";
pub const DEFAULT_MARKER_FILE_NAME: &str = "_tlp_extension_profile.conf";
pub const STAGING_FILE_NAME: &str = ".tmp_tlp_profile.conf";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlpPaths {
    pub user_profile_dir: PathBuf,
    pub system_profile_dir: PathBuf,
    pub marker_file_name: String,
    pub staging_file_name: String,
}

impl TlpPaths {
    pub fn new(user_profile_dir: PathBuf, system_profile_dir: PathBuf) -> Self {
        TlpPaths {
            user_profile_dir,
            system_profile_dir,
            marker_file_name: DEFAULT_MARKER_FILE_NAME.to_string(),
            staging_file_name: STAGING_FILE_NAME.to_string(),
        }
    }

    pub fn marker_path(&self) -> PathBuf {
        self.system_profile_dir.join(&self.marker_file_name)
    }

    pub fn staging_path(&self) -> PathBuf {
        self.user_profile_dir.join(&self.staging_file_name)
    }
}

/// `<home>/.tlp_profile`, or `None` when no home directory can be determined.
pub fn default_user_profile_dir() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.home_dir().join(USER_PROFILE_DIR_NAME))
}

/*
 * Retrieves the application's local configuration directory, creating it if necessary.
 * Holds `settings.json` and the log file. Returns `None` if the platform offers no such
 * location or it cannot be created.
 */
pub fn get_base_app_config_local_dir(app_name: &str) -> Option<PathBuf> {
    log::trace!("PathUtils: Resolving config local dir for '{app_name}'");
    ProjectDirs::from("", "", app_name).and_then(|proj_dirs| {
        let config_path = proj_dirs.config_local_dir();
        ensure_dir(config_path).then(|| config_path.to_path_buf())
    })
}

fn ensure_dir(path: &Path) -> bool {
    if path.exists() {
        log::trace!("PathUtils: Directory already exists: {path:?}");
        return true;
    }
    match fs::create_dir_all(path) {
        Ok(()) => {
            log::debug!("PathUtils: Created directory: {path:?}");
            true
        }
        Err(e) => {
            log::error!("PathUtils: Failed to create directory {path:?}: {e}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_and_staging_paths() {
        let paths = TlpPaths::new(
            PathBuf::from("/home/tester/.tlp_profile"),
            PathBuf::from("/etc/tlp.d"),
        );
        assert_eq!(
            paths.marker_path(),
            PathBuf::from("/etc/tlp.d/_tlp_extension_profile.conf")
        );
        assert_eq!(
            paths.staging_path(),
            PathBuf::from("/home/tester/.tlp_profile/.tmp_tlp_profile.conf")
        );
    }

    #[test]
    fn test_default_user_profile_dir_ends_with_profile_dir_name() {
        if let Some(dir) = default_user_profile_dir() {
            assert!(dir.ends_with(USER_PROFILE_DIR_NAME));
        }
    }

    #[test]
    fn test_ensure_dir_creates_nested() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir for test");
        let nested = temp_dir.path().join("a").join("b");

        assert!(ensure_dir(&nested));
        assert!(nested.is_dir());
        assert!(ensure_dir(&nested), "Existing directory should be accepted");
    }
}
