/*
 * SHA256 helpers used to tell whether the installed marker still reflects the user's
 * profile file. The marker is the user's file behind a generated header, so comparing
 * the marker body (header skipped) with the profile file shows whether the user edited
 * the profile after it was last installed.
 */
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

/// Number of generated lines the switcher puts in front of the profile body.
pub const GENERATED_HEADER_LINES: usize = 2;

pub fn sha256_of_reader<R: Read>(reader: &mut R) -> io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buffer = [0; 1024 * 4];
    loop {
        let n = reader.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

pub fn calculate_sha256_checksum(file_path: &Path) -> io::Result<String> {
    log::trace!("ChecksumUtils: Calculating SHA256 checksum for: {file_path:?}");
    let mut reader = BufReader::new(File::open(file_path)?);
    sha256_of_reader(&mut reader)
}

/*
 * Checksum of everything after the first `skip_lines` lines of `file_path`. A file with
 * fewer lines than that hashes as empty.
 */
pub fn calculate_body_checksum(file_path: &Path, skip_lines: usize) -> io::Result<String> {
    let mut reader = BufReader::new(File::open(file_path)?);
    let mut discarded = Vec::new();
    for _ in 0..skip_lines {
        discarded.clear();
        if reader.read_until(b'\n', &mut discarded)? == 0 {
            break;
        }
    }
    sha256_of_reader(&mut reader)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    #[test]
    fn test_calculate_sha256_checksum_empty_file() {
        let temp_file = NamedTempFile::new().unwrap();
        assert_eq!(
            calculate_sha256_checksum(temp_file.path()).unwrap(),
            EMPTY_SHA256
        );
    }

    #[test]
    fn test_body_checksum_matches_source_checksum() {
        let mut source = NamedTempFile::new().unwrap();
        source
            .as_file_mut()
            .write_all(b"TLP_ENABLE=1\nCPU_BOOST_ON_AC=1\n")
            .unwrap();
        let mut marker = NamedTempFile::new().unwrap();
        marker
            .as_file_mut()
            .write_all(b"# performance\n# Generated. Do not change!\nTLP_ENABLE=1\nCPU_BOOST_ON_AC=1\n")
            .unwrap();

        let source_sum = calculate_sha256_checksum(source.path()).unwrap();
        let body_sum = calculate_body_checksum(marker.path(), GENERATED_HEADER_LINES).unwrap();

        assert_eq!(source_sum, body_sum);
    }

    #[test]
    fn test_body_checksum_of_header_only_file_is_empty_hash() {
        let mut marker = NamedTempFile::new().unwrap();
        marker.as_file_mut().write_all(b"# balanced\n").unwrap();

        assert_eq!(
            calculate_body_checksum(marker.path(), GENERATED_HEADER_LINES).unwrap(),
            EMPTY_SHA256
        );
    }

    #[test]
    fn test_calculate_sha256_checksum_non_existing_file() {
        let path = Path::new("this_file_should_not_exist_for_checksum_test.conf");
        assert!(!path.exists());
        let err = calculate_sha256_checksum(path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
