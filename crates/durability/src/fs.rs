//! Crash-safe file writes
//!
//! Uses the write-fsync-rename pattern:
//! 1. Write to a sibling temp file (`<name>.tmp`)
//! 2. fsync the temp file
//! 3. Atomic rename to the final path
//! 4. fsync the parent directory (optional)
//!
//! A reader either sees the complete file at the final path or no file at
//! all.

use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Temp path used while writing `path`
pub fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

fn create_options(mode: u32) -> OpenOptions {
    let mut opts = OpenOptions::new();
    opts.create(true).write(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;
    opts
}

/// fsync a directory so a rename inside it is durable
pub fn sync_dir(dir: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        File::open(dir)?.sync_all()?;
    }
    #[cfg(not(unix))]
    let _ = dir;
    Ok(())
}

/// Write `data` to `path` atomically and durably
///
/// `mode` sets the permission bits of a newly created file on unix and is
/// subject to the process umask. On failure the temp file is removed and
/// the original error is returned.
pub fn write_and_sync_file(
    path: &Path,
    data: &[u8],
    mode: u32,
    sync_parent: bool,
) -> io::Result<()> {
    let tmp = temp_path(path);

    // A stale temp file would keep its old permission bits.
    if tmp.exists() {
        warn!(target: "raftsnap::snap", path = %tmp.display(), "Removing stale temp file");
        let _ = std::fs::remove_file(&tmp);
    }

    let result = write_temp(&tmp, data, mode).and_then(|()| std::fs::rename(&tmp, path));
    if let Err(e) = result {
        warn!(
            target: "raftsnap::snap",
            temp_path = %tmp.display(),
            error = %e,
            "Write failed, cleaning up temp file"
        );
        let _ = std::fs::remove_file(&tmp);
        return Err(e);
    }

    if sync_parent {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            sync_dir(parent)?;
        }
    }

    debug!(
        target: "raftsnap::snap",
        path = %path.display(),
        bytes = data.len(),
        "Atomic write completed"
    );
    Ok(())
}

fn write_temp(tmp: &Path, data: &[u8], mode: u32) -> io::Result<()> {
    let mut file = create_options(mode).open(tmp)?;
    file.write_all(data)?;
    file.sync_all()
}
