//! Run logging: a size-rotated log file mirrored to stdout
//!
//! `init` hands back a `Dispatch` instead of installing a global subscriber;
//! the caller scopes it around the run with `tracing::dispatcher::with_default`.

use crate::error::Result;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::Dispatch;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Rotate once the active file would grow past this many bytes
pub const MAX_LOG_BYTES: u64 = 1_000_000;
/// Rotated files kept next to the active one (`send.log.1` .. `send.log.3`)
pub const LOG_BACKUPS: usize = 3;

/// Append-only file that rolls over by size, keeping a bounded number of backups
#[derive(Debug)]
pub struct RotatingFile {
    path: PathBuf,
    max_bytes: u64,
    backups: usize,
    file: File,
    written: u64,
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

impl RotatingFile {
    /// Open (or create) `path`, creating parent directories as needed
    pub fn open(path: &Path, max_bytes: u64, backups: usize) -> io::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let file = open_append(path)?;
        let written = file.metadata()?.len();

        Ok(Self {
            path: path.to_path_buf(),
            max_bytes,
            backups,
            file,
            written,
        })
    }

    /// Path of the `n`th backup, e.g. `send.log.2`
    pub fn backup_path(&self, n: usize) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(format!(".{}", n));
        PathBuf::from(name)
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;

        if self.backups == 0 {
            self.file = File::create(&self.path)?;
            self.written = 0;
            return Ok(());
        }

        let oldest = self.backup_path(self.backups);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }
        for n in (1..self.backups).rev() {
            let from = self.backup_path(n);
            if from.exists() {
                fs::rename(&from, self.backup_path(n + 1))?;
            }
        }
        fs::rename(&self.path, self.backup_path(1))?;

        self.file = open_append(&self.path)?;
        self.written = 0;
        Ok(())
    }
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written > 0 && self.written + buf.len() as u64 > self.max_bytes {
            self.rotate()?;
        }
        let n = self.file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Build the run's logging handle: rotated file at `log_file` plus stdout.
/// Level comes from `RUST_LOG`, defaulting to `info`.
pub fn init(log_file: &Path) -> Result<Dispatch> {
    let file = RotatingFile::open(log_file, MAX_LOG_BYTES, LOG_BACKUPS)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(fmt::layer().with_target(false).with_writer(io::stdout));

    Ok(Dispatch::new(subscriber))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_creates_parent_dirs() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("logs/nested/send.log");
        RotatingFile::open(&path, 100, 3).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_rotation_keeps_bounded_backups() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("send.log");
        let mut log = RotatingFile::open(&path, 10, 2).unwrap();

        for line in ["line-0001\n", "line-0002\n", "line-0003\n", "line-0004\n"] {
            log.write_all(line.as_bytes()).unwrap();
        }

        assert_eq!(fs::read_to_string(&path).unwrap(), "line-0004\n");
        assert_eq!(fs::read_to_string(log.backup_path(1)).unwrap(), "line-0003\n");
        assert_eq!(fs::read_to_string(log.backup_path(2)).unwrap(), "line-0002\n");
        assert!(!log.backup_path(3).exists());
    }

    #[test]
    fn test_existing_size_counts_toward_threshold() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("send.log");
        fs::write(&path, "0123456789").unwrap();

        let mut log = RotatingFile::open(&path, 12, 1).unwrap();
        log.write_all(b"abc").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "abc");
        assert_eq!(fs::read_to_string(log.backup_path(1)).unwrap(), "0123456789");
    }

    #[test]
    fn test_zero_backups_truncates() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("send.log");
        let mut log = RotatingFile::open(&path, 5, 0).unwrap();

        log.write_all(b"first").unwrap();
        log.write_all(b"second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        assert!(!log.backup_path(1).exists());
    }

    #[test]
    fn test_init_writes_to_log_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("logs/send.log");

        let dispatch = init(&path).unwrap();
        tracing::dispatcher::with_default(&dispatch, || {
            tracing::warn!("Contacts file is empty.");
        });

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("WARN"));
        assert!(content.contains("Contacts file is empty."));
    }
}
