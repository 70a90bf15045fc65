//! Single-instance guard backed by an OS advisory lock.
//!
//! The lock file holds the owner's pid for diagnostics only. Ownership is the
//! exclusive lock on the open handle, which the OS drops when the process
//! exits, so a crashed run never blocks the next start.

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::info;

use crate::error::LockError;

#[derive(Debug)]
pub struct InstanceLock {
    path: PathBuf,
    file: File,
}

impl InstanceLock {
    pub fn acquire(path: impl AsRef<Path>) -> Result<Self, LockError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        if let Err(e) = file.try_lock_exclusive() {
            if is_contended(&e) {
                return Err(LockError::AlreadyRunning {
                    pid: read_owner(&mut file),
                });
            }
            return Err(e.into());
        }

        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        write!(file, "{}", std::process::id())?;
        file.flush()?;

        info!("🔒 [LOCK] Acquired {}", path.display());
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        // The file stays behind; only the lock matters to the next run.
        let _ = FileExt::unlock(&self.file);
        info!("🔓 [LOCK] Released {}", self.path.display());
    }
}

fn is_contended(err: &std::io::Error) -> bool {
    err.kind() == ErrorKind::WouldBlock
        || err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

/// Pid recorded by the current owner, if it can be read.
fn read_owner(file: &mut File) -> Option<u32> {
    let mut content = String::new();
    file.read_to_string(&mut content).ok()?;
    content.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_second_acquire_fails_while_held() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.lock");

        let _held = InstanceLock::acquire(&path).unwrap();
        let err = InstanceLock::acquire(&path).unwrap_err();

        assert!(matches!(err, LockError::AlreadyRunning { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_contended_lock_reports_owner_pid() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.lock");

        let _held = InstanceLock::acquire(&path).unwrap();
        let err = InstanceLock::acquire(&path).unwrap_err();

        assert!(matches!(err, LockError::AlreadyRunning { pid: Some(pid) } if pid == std::process::id()));
    }

    #[test]
    fn test_lock_released_on_drop() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.lock");

        {
            let lock = InstanceLock::acquire(&path).unwrap();
            assert!(lock.path().exists());
        }
        assert!(InstanceLock::acquire(&path).is_ok());
    }

    #[test]
    fn test_leftover_file_without_lock_is_reused() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.lock");
        // What a crashed run leaves behind: a pid nobody holds a lock for.
        std::fs::write(&path, "4294967295 trailing").unwrap();

        let lock = InstanceLock::acquire(&path).unwrap();
        let content = std::fs::read_to_string(lock.path()).unwrap();
        assert_eq!(content, std::process::id().to_string());
    }
}
