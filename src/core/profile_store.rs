/*
 * Owns the per-user profile definition files. Before the catalog is usable, the user
 * profile directory and one `<id>.conf` file per profile must exist; missing files are
 * created with a one-line comment header so the user knows what to put there.
 *
 * If the privileged TLP drop-in directory is missing, TLP is treated as not installed:
 * every profile is disabled and nothing is created on the user side.
 */
use super::catalog::ProfileCatalog;
use super::error::{Result, TlpError};
use super::models::Profile;
use super::path_utils::TlpPaths;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};

pub struct ProfileStore<'a> {
    paths: &'a TlpPaths,
}

impl<'a> ProfileStore<'a> {
    pub fn new(paths: &'a TlpPaths) -> Self {
        ProfileStore { paths }
    }

    pub fn system_dir_exists(&self) -> bool {
        self.paths.system_profile_dir.is_dir()
    }

    pub fn ensure_user_directory(&self) -> Result<()> {
        let dir = &self.paths.user_profile_dir;
        if dir.is_dir() {
            log::trace!("ProfileStore: User profile dir already exists: {dir:?}");
            return Ok(());
        }
        fs::create_dir_all(dir).map_err(|e| {
            TlpError::io(format!("Failed to create profile dir {}", dir.display()), e)
        })?;
        log::info!("ProfileStore: Created user profile dir {dir:?}");
        Ok(())
    }

    /*
     * Makes sure `profile.user_config_path` exists, creating it with a comment header
     * when absent. Returns whether the file is present afterwards. Never fails: creation
     * errors are logged and reported as `false`.
     */
    pub fn ensure_profile_file(&self, profile: &Profile) -> bool {
        let path = &profile.user_config_path;
        if path.is_file() {
            log::trace!("ProfileStore: Profile file present: {path:?}");
            return true;
        }
        match create_stub_file(profile) {
            Ok(()) => {
                log::info!("ProfileStore: Created profile file {path:?}");
                true
            }
            // Either created concurrently, or something that is not a file is in the way.
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                let usable = path.is_file();
                if !usable {
                    log::warn!("ProfileStore: {path:?} exists but is not a regular file");
                }
                usable
            }
            Err(e) => {
                log::error!("ProfileStore: Failed to create profile file {path:?}: {e}");
                false
            }
        }
    }

    /*
     * Runs the full initialization pass and records the resulting `enabled` flag on every
     * catalog entry. Returns `NotInstalled` (after disabling the whole catalog) when the
     * system drop-in directory is missing; any other failure only disables profiles.
     */
    pub fn prepare(&self, catalog: &mut ProfileCatalog) -> Result<()> {
        if !self.system_dir_exists() {
            log::error!(
                "ProfileStore: TLP dir {:?} not found, maybe TLP is not installed",
                self.paths.system_profile_dir
            );
            catalog.disable_all();
            return Err(TlpError::NotInstalled(self.paths.system_profile_dir.clone()));
        }

        if let Err(e) = self.ensure_user_directory() {
            log::error!("ProfileStore: {e}");
        }

        let results: Vec<(String, bool)> = catalog
            .list_profiles()
            .iter()
            .map(|profile| (profile.id.clone(), self.ensure_profile_file(profile)))
            .collect();
        for (id, enabled) in results {
            catalog.set_enabled(&id, enabled);
        }
        Ok(())
    }
}

fn create_stub_file(profile: &Profile) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&profile.user_config_path)?;
    writeln!(
        file,
        "# This file is managed by tlp-profile, {}. Adjust the settings below to satisfy your requirements.",
        profile.description
    )?;
    file.flush()
}
