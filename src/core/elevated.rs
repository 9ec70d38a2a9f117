/*
 * The privileged helper: the single place where the tool needs elevated rights. Writing
 * into the TLP drop-in directory is delegated to an external elevation program (pkexec by
 * default) running `cp <staging> <marker>`. The trait lets tests substitute a runner that
 * records calls and scripts the outcome.
 */
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HelperOutput {
    /// `None` when the process was terminated by a signal.
    pub status_code: Option<i32>,
    pub stderr: String,
}

impl HelperOutput {
    #[cfg(test)]
    pub fn success() -> Self {
        HelperOutput {
            status_code: Some(0),
            stderr: String::new(),
        }
    }

    /// Any error text counts as failure whatever the exit status says.
    pub fn is_failure(&self) -> bool {
        !self.stderr.is_empty() || self.status_code != Some(0)
    }

    /// Text to report to the caller when `is_failure()` holds.
    pub fn failure_message(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        match self.status_code {
            Some(0) => "helper wrote a blank error message".to_string(),
            Some(code) => format!("helper exited with status {code}"),
            None => "helper was terminated by a signal".to_string(),
        }
    }
}

pub trait ElevatedCommandRunner: Send + Sync {
    /// Copies `source` over `target` with elevated privileges.
    fn copy_file(&self, source: &Path, target: &Path) -> io::Result<HelperOutput>;
}

pub struct PkexecRunner {
    helper_program: PathBuf,
}

impl PkexecRunner {
    pub fn new(helper_program: PathBuf) -> Self {
        PkexecRunner { helper_program }
    }
}

impl ElevatedCommandRunner for PkexecRunner {
    fn copy_file(&self, source: &Path, target: &Path) -> io::Result<HelperOutput> {
        log::debug!(
            "PkexecRunner: {:?} cp {source:?} {target:?}",
            self.helper_program
        );
        let output = Command::new(&self.helper_program)
            .arg("cp")
            .arg(source)
            .arg(target)
            .stdin(Stdio::null())
            .output()?;
        let result = HelperOutput {
            status_code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        if !output.stdout.is_empty() {
            log::trace!(
                "PkexecRunner: helper stdout: {}",
                String::from_utf8_lossy(&output.stdout).trim()
            );
        }
        log::debug!("PkexecRunner: helper finished: {result:?}");
        Ok(result)
    }
}
