// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cross-process single-flight lock, keyed by `cronId`, under a shared lock
//! directory. Acquisition failure is never an error — a quiet skip, per the
//! concurrency model: another host instance (or another run of this
//! process) already owns the run.

use ch_core::CronId;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// An acquired run lock. Releasing (dropping this value) unlocks and removes
/// the token file; the OS also releases the advisory lock if the holding
/// process dies, so a stale lock can never wedge another host instance.
pub struct RunLock {
    path: PathBuf,
    file: File,
}

impl RunLock {
    /// Attempt to acquire the lock for `cron_id` under `lock_dir`, creating
    /// the directory if needed. Returns `Ok(None)` (not an error) if another
    /// holder currently owns it.
    pub fn try_acquire(lock_dir: &Path, cron_id: &CronId) -> io::Result<Option<RunLock>> {
        std::fs::create_dir_all(lock_dir)?;
        let path = lock_dir.join(format!("{}.lock", cron_id.as_str()));
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)?;
        match file.try_lock_exclusive() {
            Ok(()) => {
                use std::io::Write;
                let mut f = &file;
                let _ = f.write_all(format!("{}\n", std::process::id()).as_bytes());
                Ok(Some(RunLock { path, file }))
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
        let _ = std::fs::remove_file(&self.path);
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
