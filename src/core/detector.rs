/*
 * Works out which profile, if any, is currently installed system-wide. The only source of
 * truth is the generated marker file in the TLP drop-in directory: its first line carries
 * the profile id written by the switcher. Detection never fails startup; any problem is
 * logged and reported as "unknown".
 */
use super::catalog::ProfileCatalog;
use super::path_utils::TlpPaths;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Only the header line matters, so a bounded prefix of the marker is enough.
pub const HEADER_READ_LIMIT: u64 = 4096;

pub struct ActiveProfileDetector<'a> {
    paths: &'a TlpPaths,
}

impl<'a> ActiveProfileDetector<'a> {
    pub fn new(paths: &'a TlpPaths) -> Self {
        ActiveProfileDetector { paths }
    }

    pub fn detect(&self, catalog: &ProfileCatalog) -> Option<String> {
        let system_dir = &self.paths.system_profile_dir;
        if !system_dir.is_dir() {
            log::debug!("ActiveProfileDetector: {system_dir:?} missing, skipping detection");
            return None;
        }

        let marker = match self.find_marker() {
            Ok(Some(path)) => path,
            Ok(None) => {
                log::info!(
                    "ActiveProfileDetector: No marker file '{}' in {system_dir:?}",
                    self.paths.marker_file_name
                );
                return None;
            }
            Err(e) => {
                log::warn!("ActiveProfileDetector: Failed to list {system_dir:?}: {e}");
                return None;
            }
        };

        let header = match read_header_line(&marker) {
            Ok(line) => line,
            Err(e) => {
                log::warn!("ActiveProfileDetector: Failed to read {marker:?}: {e}");
                return None;
            }
        };

        match catalog.match_header_line(&header) {
            Some(id) => {
                log::info!("ActiveProfileDetector: Active profile is '{id}'");
                Some(id.to_string())
            }
            None => {
                log::info!("ActiveProfileDetector: Marker header '{header}' matches no profile");
                None
            }
        }
    }

    fn find_marker(&self) -> io::Result<Option<PathBuf>> {
        for entry in fs::read_dir(&self.paths.system_profile_dir)? {
            let entry = entry?;
            if entry.file_name().to_string_lossy() == self.paths.marker_file_name.as_str() {
                return Ok(Some(entry.path()));
            }
        }
        Ok(None)
    }
}

/*
 * Reads at most `HEADER_READ_LIMIT` bytes of `path` and returns the trimmed text before
 * the first line break. Without a line break the whole prefix is the header. Invalid
 * UTF-8 (including a character cut by the read limit) is replaced, not rejected.
 */
pub fn read_header_line(path: &Path) -> io::Result<String> {
    let mut prefix = Vec::new();
    File::open(path)?
        .take(HEADER_READ_LIMIT)
        .read_to_end(&mut prefix)?;
    let text = String::from_utf8_lossy(&prefix);
    let first_line = text.split('\n').next().unwrap_or_default();
    Ok(first_line.trim().to_string())
}
