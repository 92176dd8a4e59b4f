//! Snapshotter configuration
//!
//! Controls file permissions and directory durability for snapshot writes.

/// Default permission bits for new snapshot files (before umask)
pub const DEFAULT_FILE_MODE: u32 = 0o666;

/// Snapshotter configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotterConfig {
    /// Permission bits for new snapshot files (unix only, subject to umask)
    pub file_mode: u32,
    /// fsync the snapshot directory after each rename
    pub sync_dir: bool,
    /// Create the snapshot directory on open if it is missing
    pub create_dir: bool,
}

impl Default for SnapshotterConfig {
    fn default() -> Self {
        SnapshotterConfig {
            file_mode: DEFAULT_FILE_MODE,
            sync_dir: true,
            create_dir: false,
        }
    }
}

impl SnapshotterConfig {
    /// Set file permission bits
    pub fn with_file_mode(mut self, mode: u32) -> Self {
        self.file_mode = mode;
        self
    }

    /// Enable or disable the directory fsync after rename
    pub fn with_sync_dir(mut self, sync_dir: bool) -> Self {
        self.sync_dir = sync_dir;
        self
    }

    /// Enable or disable directory creation on open
    pub fn with_create_dir(mut self, create_dir: bool) -> Self {
        self.create_dir = create_dir;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.file_mode > 0o777 {
            return Err(ConfigError::InvalidFileMode(self.file_mode));
        }
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File mode has bits outside of the permission range
    #[error("Invalid file mode: {0:o}")]
    InvalidFileMode(u32),
}
