/*
 * The state-changing core: the only writer of the active profile and the only code path
 * that touches the privileged TLP location.
 *
 * A switch assembles the new marker content in a staging file next to the user's
 * profiles (generated header, then the user's profile body), asks the privileged helper
 * to copy it over the marker, and removes the staging file whatever happened. The marker
 * is replaced by a single `cp`, so readers never see a half-assembled file.
 */
use super::catalog::ProfileCatalog;
use super::elevated::ElevatedCommandRunner;
use super::error::{Result, TlpError};
use super::models::{Profile, SwitchOutcome};
use super::notifier::ChangeNotifier;
use super::path_utils::TlpPaths;
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

pub const COPY_CHUNK_SIZE: usize = 4096;

pub struct ProfileSwitcher<'a> {
    paths: &'a TlpPaths,
    runner: &'a dyn ElevatedCommandRunner,
}

impl<'a> ProfileSwitcher<'a> {
    pub fn new(paths: &'a TlpPaths, runner: &'a dyn ElevatedCommandRunner) -> Self {
        ProfileSwitcher { paths, runner }
    }

    /*
     * Installs `profile_id` and records it as current in `notifier`. Subscribers are not
     * called here: on `Switched` the caller delivers the change with `notify` once it has
     * released its own locks. Switching to the profile that is already active does
     * nothing at all. On any failure the active profile is left untouched.
     */
    pub fn switch_to(
        &self,
        catalog: &ProfileCatalog,
        notifier: &ChangeNotifier,
        profile_id: &str,
    ) -> Result<SwitchOutcome> {
        let profile = catalog
            .find_profile(profile_id)
            .ok_or_else(|| TlpError::ProfileNotFound(profile_id.to_string()))?;

        if notifier.current().as_deref() == Some(profile_id) {
            log::debug!("ProfileSwitcher: '{profile_id}' is already active");
            return Ok(SwitchOutcome::AlreadyActive);
        }
        if !profile.enabled {
            return Err(TlpError::ProfileDisabled(profile_id.to_string()));
        }

        log::debug!("ProfileSwitcher: Start switching profile to '{profile_id}'");
        self.install(profile)?;
        notifier.set_current(profile_id);
        Ok(SwitchOutcome::Switched)
    }

    fn install(&self, profile: &Profile) -> Result<()> {
        let staging = StagingFile::new(self.paths.staging_path());
        write_staging_file(staging.path(), profile)?;

        let target = self.paths.marker_path();
        let output = self
            .runner
            .copy_file(staging.path(), &target)
            .map_err(TlpError::HelperLaunch)?;
        if output.is_failure() {
            let message = output.failure_message();
            log::error!("ProfileSwitcher: Failed to install '{}': {message}", profile.id);
            return Err(TlpError::SwitchRejected(message));
        }
        log::debug!("ProfileSwitcher: Installed '{}' at {target:?}", profile.id);
        Ok(())
    }
}

/// Generated two-line header; the first line is what the detector matches on.
pub fn generated_header(profile_id: &str) -> String {
    let timestamp = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "unknown time".to_string());
    format!("# {profile_id}\n# Generated by tlp-profile at {timestamp}. Do not change!\n")
}

fn write_staging_file(staging_path: &Path, profile: &Profile) -> Result<()> {
    let file = File::create(staging_path).map_err(|e| {
        TlpError::io(
            format!("Failed to create staging file {}", staging_path.display()),
            e,
        )
    })?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(generated_header(&profile.id).as_bytes())
        .map_err(|e| TlpError::io("Failed to write staging header", e))?;

    let mut source = File::open(&profile.user_config_path).map_err(|e| {
        TlpError::io(
            format!("Failed to open profile {}", profile.user_config_path.display()),
            e,
        )
    })?;
    let copied = copy_in_chunks(&mut source, &mut writer)
        .map_err(|e| TlpError::io("Failed to copy profile into staging file", e))?;
    writer
        .flush()
        .map_err(|e| TlpError::io("Failed to flush staging file", e))?;
    log::trace!(
        "ProfileSwitcher: Staged {copied} bytes of '{}' at {staging_path:?}",
        profile.id
    );
    Ok(())
}

/// Copies until a zero-length read. Returns the number of bytes copied.
pub fn copy_in_chunks<R: Read, W: Write>(source: &mut R, sink: &mut W) -> io::Result<u64> {
    let mut buffer = [0u8; COPY_CHUNK_SIZE];
    let mut total = 0u64;
    loop {
        let n = match source.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        sink.write_all(&buffer[..n])?;
        total += n as u64;
    }
    Ok(total)
}

// Removes the staging file when dropped.
struct StagingFile {
    path: PathBuf,
}

impl StagingFile {
    fn new(path: PathBuf) -> Self {
        StagingFile { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StagingFile {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => log::trace!("ProfileSwitcher: Removed staging file {:?}", self.path),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => log::warn!(
                "ProfileSwitcher: Failed to remove staging file {:?}: {e}",
                self.path
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::elevated::HelperOutput;
    use std::sync::Mutex;
    use tempfile::TempDir;

    struct CopyingRunner {
        calls: Mutex<Vec<(PathBuf, PathBuf)>>,
        stderr: String,
    }

    impl CopyingRunner {
        fn new(stderr: &str) -> Self {
            CopyingRunner {
                calls: Mutex::new(Vec::new()),
                stderr: stderr.to_string(),
            }
        }
    }

    impl ElevatedCommandRunner for CopyingRunner {
        fn copy_file(&self, source: &Path, target: &Path) -> io::Result<HelperOutput> {
            self.calls
                .lock()
                .unwrap()
                .push((source.to_path_buf(), target.to_path_buf()));
            assert!(source.exists(), "staging file must exist during the helper call");
            if self.stderr.is_empty() {
                fs::copy(source, target)?;
            }
            Ok(HelperOutput {
                status_code: Some(0),
                stderr: self.stderr.clone(),
            })
        }
    }

    fn setup(root: &Path) -> (TlpPaths, ProfileCatalog) {
        let paths = TlpPaths::new(root.join(".tlp_profile"), root.join("tlp.d"));
        fs::create_dir_all(&paths.user_profile_dir).unwrap();
        fs::create_dir_all(&paths.system_profile_dir).unwrap();
        let catalog = ProfileCatalog::new(&paths.user_profile_dir);
        for profile in catalog.list_profiles() {
            fs::write(
                &profile.user_config_path,
                format!("TLP_DEFAULT_MODE={}\n", profile.id),
            )
            .unwrap();
        }
        (paths, catalog)
    }

    #[test]
    fn test_switch_installs_header_and_body() {
        // Arrange
        let temp_dir = TempDir::new().unwrap();
        let (paths, catalog) = setup(temp_dir.path());
        let runner = CopyingRunner::new("");
        let notifier = ChangeNotifier::new();

        // Act
        let outcome = ProfileSwitcher::new(&paths, &runner)
            .switch_to(&catalog, &notifier, "power-saver")
            .unwrap();

        // Assert
        assert_eq!(outcome, SwitchOutcome::Switched);
        assert_eq!(notifier.current().as_deref(), Some("power-saver"));
        let marker = fs::read_to_string(paths.marker_path()).unwrap();
        let lines: Vec<&str> = marker.lines().collect();
        assert_eq!(lines[0], "# power-saver");
        assert!(lines[1].starts_with("# Generated by tlp-profile at "));
        assert!(lines[1].ends_with("Do not change!"));
        assert_eq!(lines[2], "TLP_DEFAULT_MODE=power-saver");
        assert!(!paths.staging_path().exists());
        let calls = runner.calls.lock().unwrap();
        assert_eq!(*calls, vec![(paths.staging_path(), paths.marker_path())]);
    }

    #[test]
    fn test_switch_rejected_keeps_state_and_removes_staging() {
        let temp_dir = TempDir::new().unwrap();
        let (paths, catalog) = setup(temp_dir.path());
        let runner = CopyingRunner::new("Error executing command as another user: Not authorized");
        let notifier = ChangeNotifier::new();
        notifier.publish("balanced");

        let result =
            ProfileSwitcher::new(&paths, &runner).switch_to(&catalog, &notifier, "performance");

        match result {
            Err(TlpError::SwitchRejected(text)) => assert!(text.contains("Not authorized")),
            other => panic!("expected SwitchRejected, got {other:?}"),
        }
        assert_eq!(notifier.current().as_deref(), Some("balanced"));
        assert!(!paths.staging_path().exists());
        assert!(!paths.marker_path().exists());
    }

    #[test]
    fn test_switch_missing_source_fails_before_helper() {
        let temp_dir = TempDir::new().unwrap();
        let (paths, catalog) = setup(temp_dir.path());
        fs::remove_file(paths.user_profile_dir.join("balanced.conf")).unwrap();
        let runner = CopyingRunner::new("");
        let notifier = ChangeNotifier::new();

        let result =
            ProfileSwitcher::new(&paths, &runner).switch_to(&catalog, &notifier, "balanced");

        assert!(matches!(result, Err(TlpError::Io { .. })));
        assert!(runner.calls.lock().unwrap().is_empty());
        assert!(!paths.staging_path().exists());
        assert!(notifier.current().is_none());
    }

    #[test]
    fn test_switch_unknown_and_disabled_profiles() {
        let temp_dir = TempDir::new().unwrap();
        let (paths, mut catalog) = setup(temp_dir.path());
        catalog.set_enabled("balanced", false);
        let runner = CopyingRunner::new("");
        let notifier = ChangeNotifier::new();
        let switcher = ProfileSwitcher::new(&paths, &runner);

        assert!(matches!(
            switcher.switch_to(&catalog, &notifier, "turbo"),
            Err(TlpError::ProfileNotFound(_))
        ));
        assert!(matches!(
            switcher.switch_to(&catalog, &notifier, "balanced"),
            Err(TlpError::ProfileDisabled(_))
        ));
        assert!(runner.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_copy_in_chunks_large_and_empty_sources() {
        let payload: Vec<u8> = (0..COPY_CHUNK_SIZE * 3 + 17)
            .map(|_| rand::random::<u8>())
            .collect();
        let mut sink = Vec::new();
        let copied = copy_in_chunks(&mut payload.as_slice(), &mut sink).unwrap();
        assert_eq!(copied, payload.len() as u64);
        assert_eq!(sink, payload);

        let mut empty_sink = Vec::new();
        assert_eq!(copy_in_chunks(&mut io::empty(), &mut empty_sink).unwrap(), 0);
        assert!(empty_sink.is_empty());
    }

    #[test]
    fn test_generated_header_first_line_is_profile_id() {
        let header = generated_header("balanced");
        assert_eq!(header.lines().next(), Some("# balanced"));
        assert_eq!(header.lines().count(), 2);
        assert!(header.ends_with('\n'));
    }
}
