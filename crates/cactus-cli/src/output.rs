// SPDX-License-Identifier: MIT OR Apache-2.0
//! The run output directory: `run NNN - <procedure-id>/` under a base
//! directory, with its fixed set of marker/log/report files and a
//! `requests/` subdirectory of per-request pairs.

use cactus_error::ConfigKind;
use fs2::FileExt;
use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// A run's output directory, created and ready to receive files.
pub struct OutputDir {
    path: PathBuf,
    run_id: u64,
}

impl OutputDir {
    /// Allocate the next run id (via the base directory's `.runid` counter,
    /// file-locked on POSIX) and create `run NNN - <procedure-id>/`.
    ///
    /// # Errors
    ///
    /// [`ConfigKind::OutputDirectory`] if the base or run directory cannot
    /// be created, or the `.runid` counter cannot be read/written.
    pub fn create(base: &Path, procedure_id: &str) -> Result<Self, ConfigKind> {
        std::fs::create_dir_all(base).map_err(|e| ConfigKind::OutputDirectory { path: base.display().to_string(), reason: e.to_string() })?;

        let run_id = next_run_id(base)?;
        let path = base.join(format!("run {run_id:03} - {procedure_id}"));
        std::fs::create_dir_all(&path).map_err(|e| ConfigKind::OutputDirectory { path: path.display().to_string(), reason: e.to_string() })?;
        std::fs::create_dir_all(path.join("requests")).map_err(|e| ConfigKind::OutputDirectory { path: path.display().to_string(), reason: e.to_string() })?;

        Ok(Self { path, run_id })
    }

    /// This run's allocated id.
    #[must_use]
    pub fn run_id(&self) -> u64 {
        self.run_id
    }

    /// The run directory's path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The `requests/` subdirectory.
    #[must_use]
    pub fn requests_dir(&self) -> PathBuf {
        self.path.join("requests")
    }

    /// `cactus.log`'s path, for the tracing file appender.
    #[must_use]
    pub fn log_path(&self) -> PathBuf {
        self.path.join("cactus.log")
    }

    /// Write one of the small marker files (`.testprocedureid`,
    /// `.csipaustarget`, `.clientids`, `.versions`) with a trailing newline.
    ///
    /// # Errors
    ///
    /// [`ConfigKind::OutputDirectory`] if the write fails.
    pub fn write_marker(&self, name: &str, content: &str) -> Result<(), ConfigKind> {
        let path = self.path.join(name);
        std::fs::write(&path, format!("{content}\n")).map_err(|e| ConfigKind::OutputDirectory { path: path.display().to_string(), reason: e.to_string() })
    }

    /// Write `.result`: the literal `PASS` or `FAIL`.
    ///
    /// # Errors
    ///
    /// [`ConfigKind::OutputDirectory`] if the write fails.
    pub fn write_result(&self, passed: bool) -> Result<(), ConfigKind> {
        self.write_marker(".result", if passed { "PASS" } else { "FAIL" })
    }

    /// Write `report.html`.
    ///
    /// # Errors
    ///
    /// [`ConfigKind::OutputDirectory`] if the write fails.
    pub fn write_report(&self, html: &str) -> Result<(), ConfigKind> {
        let path = self.path.join("report.html");
        std::fs::write(&path, html).map_err(|e| ConfigKind::OutputDirectory { path: path.display().to_string(), reason: e.to_string() })
    }
}

/// Increment `<base>/.runid` under an exclusive file lock and return the
/// new value. The lock is a documented no-op on platforms where
/// [`fs2::FileExt::lock_exclusive`] isn't backed by a real advisory lock
/// (acceptable as a no-op on Windows, with a documented race).
fn next_run_id(base: &Path) -> Result<u64, ConfigKind> {
    let path = base.join(".runid");
    let mut file = OpenOptions::new().create(true).read(true).write(true).open(&path).map_err(|e| ConfigKind::OutputDirectory { path: path.display().to_string(), reason: e.to_string() })?;

    file.lock_exclusive().map_err(|e| ConfigKind::OutputDirectory { path: path.display().to_string(), reason: e.to_string() })?;

    let mut content = String::new();
    file.read_to_string(&mut content).map_err(|e| ConfigKind::OutputDirectory { path: path.display().to_string(), reason: e.to_string() })?;
    let next = content.trim().parse::<u64>().unwrap_or(0) + 1;

    file.seek(SeekFrom::Start(0)).map_err(|e| ConfigKind::OutputDirectory { path: path.display().to_string(), reason: e.to_string() })?;
    file.set_len(0).map_err(|e| ConfigKind::OutputDirectory { path: path.display().to_string(), reason: e.to_string() })?;
    file.write_all(next.to_string().as_bytes()).map_err(|e| ConfigKind::OutputDirectory { path: path.display().to_string(), reason: e.to_string() })?;

    FileExt::unlock(&file).map_err(|e| ConfigKind::OutputDirectory { path: path.display().to_string(), reason: e.to_string() })?;
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn successive_runs_allocate_increasing_ids() {
        let dir = tempfile::tempdir().unwrap();
        let first = OutputDir::create(dir.path(), "p1").unwrap();
        let second = OutputDir::create(dir.path(), "p1").unwrap();
        assert_eq!(first.run_id() + 1, second.run_id());
        assert!(first.path().is_dir());
        assert!(second.path().is_dir());
        assert_ne!(first.path(), second.path());
    }

    #[test]
    fn create_makes_the_requests_subdirectory() {
        let dir = tempfile::tempdir().unwrap();
        let output = OutputDir::create(dir.path(), "p1").unwrap();
        assert!(output.requests_dir().is_dir());
    }

    #[test]
    fn write_result_writes_the_literal_pass_or_fail() {
        let dir = tempfile::tempdir().unwrap();
        let output = OutputDir::create(dir.path(), "p1").unwrap();
        output.write_result(true).unwrap();
        let content = std::fs::read_to_string(output.path().join(".result")).unwrap();
        assert_eq!(content.trim(), "PASS");
    }
}
