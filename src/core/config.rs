/*
 * Manages the tool's own settings: where the TLP drop-in directory lives, the name of
 * the generated marker file, which elevation helper to run, and optionally a custom
 * user profile directory. Settings are persisted as JSON in the standard per-user
 * config directory; a missing file simply means "use the defaults".
 *
 * A trait (`ConfigManagerOperations`) separates the storage from its callers so the
 * location can be replaced in tests.
 */
use crate::core::path_utils::{
    self, DEFAULT_MARKER_FILE_NAME, DEFAULT_SYSTEM_PROFILE_DIR, STAGING_FILE_NAME, TlpPaths,
};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};

pub const SETTINGS_FILENAME: &str = "settings.json";
pub const DEFAULT_HELPER_PROGRAM: &str = "/usr/bin/pkexec";

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Serde(serde_json::Error),
    NoConfigDirectory,
    NoHomeDirectory,
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Serde(err)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Configuration I/O error: {e}"),
            ConfigError::Serde(e) => write!(f, "Malformed settings file: {e}"),
            ConfigError::NoConfigDirectory => {
                write!(f, "Could not determine configuration directory")
            }
            ConfigError::NoHomeDirectory => write!(f, "Could not determine home directory"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Serde(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Overrides `<home>/.tlp_profile` when set.
    pub user_profile_dir: Option<PathBuf>,
    pub system_profile_dir: PathBuf,
    pub marker_file_name: String,
    pub helper_program: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            user_profile_dir: None,
            system_profile_dir: PathBuf::from(DEFAULT_SYSTEM_PROFILE_DIR),
            marker_file_name: DEFAULT_MARKER_FILE_NAME.to_string(),
            helper_program: PathBuf::from(DEFAULT_HELPER_PROGRAM),
        }
    }
}

impl Settings {
    pub fn resolve_paths(&self) -> Result<TlpPaths> {
        let user_profile_dir = match &self.user_profile_dir {
            Some(dir) => dir.clone(),
            None => path_utils::default_user_profile_dir().ok_or(ConfigError::NoHomeDirectory)?,
        };
        Ok(TlpPaths {
            user_profile_dir,
            system_profile_dir: self.system_profile_dir.clone(),
            marker_file_name: self.marker_file_name.clone(),
            staging_file_name: STAGING_FILE_NAME.to_string(),
        })
    }
}

pub trait ConfigManagerOperations: Send + Sync {
    fn settings_location(&self) -> Result<PathBuf>;
    fn load_settings(&self) -> Result<Settings>;
    fn save_settings(&self, settings: &Settings) -> Result<()>;

    /// Writes `settings` only when no settings file exists yet. Returns whether it wrote.
    fn save_settings_if_missing(&self, settings: &Settings) -> Result<bool> {
        if self.settings_location()?.exists() {
            return Ok(false);
        }
        self.save_settings(settings)?;
        Ok(true)
    }
}

pub struct CoreConfigManager {
    settings_path: Option<PathBuf>,
}

impl CoreConfigManager {
    /// Uses `settings.json` in the per-user config directory.
    pub fn new() -> Self {
        CoreConfigManager {
            settings_path: None,
        }
    }

    /// Uses an explicit settings file, e.g. from `--config`.
    pub fn with_settings_path(path: PathBuf) -> Self {
        CoreConfigManager {
            settings_path: Some(path),
        }
    }

}

impl Default for CoreConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

fn read_settings_file(file_path: &Path) -> Result<Settings> {
    if !file_path.exists() {
        log::debug!("CoreConfigManager: Settings file {file_path:?} does not exist, using defaults.");
        return Ok(Settings::default());
    }
    let reader = BufReader::new(File::open(file_path)?);
    let settings: Settings = serde_json::from_reader(reader)?;
    log::debug!("CoreConfigManager: Loaded settings from {file_path:?}: {settings:?}");
    Ok(settings)
}

impl ConfigManagerOperations for CoreConfigManager {
    fn settings_location(&self) -> Result<PathBuf> {
        match &self.settings_path {
            Some(path) => Ok(path.clone()),
            None => path_utils::get_base_app_config_local_dir(path_utils::APP_NAME)
                .map(|dir| dir.join(SETTINGS_FILENAME))
                .ok_or(ConfigError::NoConfigDirectory),
        }
    }

    fn load_settings(&self) -> Result<Settings> {
        let file_path = self.settings_location()?;
        log::trace!("CoreConfigManager: Loading settings from {file_path:?}");
        read_settings_file(&file_path)
    }

    fn save_settings(&self, settings: &Settings) -> Result<()> {
        let file_path = self.settings_location()?;
        if let Some(parent) = file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let writer = BufWriter::new(File::create(&file_path)?);
        serde_json::to_writer_pretty(writer, settings)?;
        log::debug!("CoreConfigManager: Saved settings to {file_path:?}.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_settings_missing_file_yields_defaults() {
        // Arrange
        let dir = tempdir().unwrap();
        let manager = CoreConfigManager::with_settings_path(dir.path().join(SETTINGS_FILENAME));

        // Act
        let settings = manager.load_settings().unwrap();

        // Assert
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.system_profile_dir, PathBuf::from("/etc/tlp.d"));
        assert_eq!(settings.marker_file_name, "_tlp_extension_profile.conf");
    }

    #[test]
    fn test_save_and_load_settings() {
        // Arrange
        let dir = tempdir().unwrap();
        let manager = CoreConfigManager::with_settings_path(dir.path().join(SETTINGS_FILENAME));
        let settings = Settings {
            user_profile_dir: Some(PathBuf::from("/srv/profiles")),
            system_profile_dir: PathBuf::from("/opt/tlp.d"),
            marker_file_name: "99-custom.conf".to_string(),
            helper_program: PathBuf::from("/usr/bin/doas"),
        };

        // Act
        manager.save_settings(&settings).unwrap();
        let loaded = manager.load_settings().unwrap();

        // Assert
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_partial_settings_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILENAME);
        fs::write(&path, r#"{ "system_profile_dir": "/opt/tlp.d" }"#).unwrap();
        let manager = CoreConfigManager::with_settings_path(path);

        let loaded = manager.load_settings().unwrap();

        assert_eq!(loaded.system_profile_dir, PathBuf::from("/opt/tlp.d"));
        assert_eq!(loaded.helper_program, PathBuf::from(DEFAULT_HELPER_PROGRAM));
        assert!(loaded.user_profile_dir.is_none());
    }

    #[test]
    fn test_malformed_settings_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILENAME);
        fs::write(&path, "{ not json").unwrap();
        let manager = CoreConfigManager::with_settings_path(path);

        assert!(matches!(manager.load_settings(), Err(ConfigError::Serde(_))));
    }

    #[test]
    fn test_resolve_paths_with_explicit_user_dir() {
        let settings = Settings {
            user_profile_dir: Some(PathBuf::from("/srv/profiles")),
            ..Settings::default()
        };

        let paths = settings.resolve_paths().unwrap();

        assert_eq!(paths.user_profile_dir, PathBuf::from("/srv/profiles"));
        assert_eq!(
            paths.marker_path(),
            PathBuf::from("/etc/tlp.d/_tlp_extension_profile.conf")
        );
        assert_eq!(
            paths.staging_path(),
            PathBuf::from("/srv/profiles/.tmp_tlp_profile.conf")
        );
    }

    #[test]
    fn test_save_settings_if_missing_writes_once() {
        // Arrange
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(SETTINGS_FILENAME);
        let manager = CoreConfigManager::with_settings_path(path.clone());

        // Act
        let first = manager.save_settings_if_missing(&Settings::default()).unwrap();
        fs::write(&path, r#"{ "marker_file_name": "99-custom.conf" }"#).unwrap();
        let second = manager.save_settings_if_missing(&Settings::default()).unwrap();

        // Assert
        assert!(first);
        assert!(!second);
        assert_eq!(manager.settings_location().unwrap(), path);
        assert_eq!(manager.load_settings().unwrap().marker_file_name, "99-custom.conf");
    }
}
