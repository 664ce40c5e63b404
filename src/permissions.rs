//! # Key File Access Control
//!
//! POSIX mode bits are the only access control guarding the private key. This
//! module wraps them in an explicit descriptor so callers never poke at
//! `PermissionsExt` directly.
//!
//! On platforms without POSIX modes every check reports
//! [`PermissionStatus::Unsupported`] and logs a warning. Nothing is silently
//! treated as safe.

use crate::error::{NoteCryptError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Owner read/write only
pub const OWNER_ONLY: u32 = 0o600;
/// Owner read/write, everyone else read
pub const WORLD_READABLE: u32 = 0o644;
/// Owner-only directory
pub const OWNER_ONLY_DIR: u32 = 0o700;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    /// No group or world bits set
    Safe,
    /// Group or world bits set; `mode` holds the permission bits
    Unsafe { mode: u32 },
    /// The platform has no POSIX modes to check
    Unsupported,
}

/// Access-control descriptor for one key file
#[derive(Debug, Clone)]
pub struct KeyFileAccess {
    path: PathBuf,
}

impl KeyFileAccess {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Inspect the current mode without changing anything
    pub fn check(&self) -> Result<PermissionStatus> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&self.path)?.permissions().mode() & 0o777;
            if mode & 0o077 != 0 {
                Ok(PermissionStatus::Unsafe { mode })
            } else {
                Ok(PermissionStatus::Safe)
            }
        }

        #[cfg(not(unix))]
        {
            fs::metadata(&self.path)?;
            Ok(PermissionStatus::Unsupported)
        }
    }

    /// True only when the mode is verifiably owner-only
    pub fn has_safe_permissions(&self) -> Result<bool> {
        Ok(self.check()? == PermissionStatus::Safe)
    }

    /// Fail with [`NoteCryptError::UnsafeKeyPermissions`] unless owner-only
    pub fn enforce_safe_permissions(&self) -> Result<()> {
        match self.check()? {
            PermissionStatus::Safe => Ok(()),
            PermissionStatus::Unsafe { mode } => Err(NoteCryptError::UnsafeKeyPermissions {
                path: self.path.clone(),
                mode,
            }),
            PermissionStatus::Unsupported => {
                tracing::warn!(
                    path = %self.path.display(),
                    "filesystem has no POSIX modes; private key access is not verified"
                );
                Ok(())
            }
        }
    }

    /// Tighten the file to owner read/write
    pub fn restrict(&self) -> Result<PermissionStatus> {
        set_mode(&self.path, OWNER_ONLY)
    }
}

/// Set `mode` on `path`, reporting `Unsupported` where modes do not exist
pub fn set_mode(path: &Path, mode: u32) -> Result<PermissionStatus> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(path)?.permissions();
        perms.set_mode(mode);
        fs::set_permissions(path, perms)?;
        if mode & 0o077 != 0 {
            Ok(PermissionStatus::Unsafe { mode })
        } else {
            Ok(PermissionStatus::Safe)
        }
    }

    #[cfg(not(unix))]
    {
        let _ = mode;
        fs::metadata(path)?;
        tracing::warn!(
            path = %path.display(),
            "filesystem has no POSIX modes; permissions were not changed"
        );
        Ok(PermissionStatus::Unsupported)
    }
}
