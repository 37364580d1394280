use crate::{Error, Result};
use std::fs::File;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

#[cfg(unix)]
const DEFAULT_PERMISSIONS: u32 = 0o644;

#[cfg(not(unix))]
const DEFAULT_PERMISSIONS: u32 = 0;

/// Suffix of every staging file; the prefix is `.<destination name>.`.
pub const STAGE_SUFFIX: &str = ".parafetch.tmp";

#[derive(Clone, Copy, Debug)]
pub struct StageOptions {
    permissions: u32,
}

impl Default for StageOptions {
    fn default() -> Self { Self::new() }
}

impl StageOptions {
    pub fn new() -> Self {
        Self {
            permissions: DEFAULT_PERMISSIONS,
        }
    }

    #[cfg(unix)]
    pub fn permissions(mut self, permissions: u32) -> Self {
        self.permissions = permissions;
        self
    }

    #[cfg(not(unix))]
    pub fn permissions(self, _permissions: u32) -> Self { self }

    #[cfg(unix)]
    fn into_permissions(self) -> Option<std::fs::Permissions> {
        use std::os::unix::fs::PermissionsExt;
        Some(std::fs::Permissions::from_mode(self.permissions))
    }

    #[cfg(not(unix))]
    fn into_permissions(self) -> Option<std::fs::Permissions> { None }
}

/// A destination file written under a unique hidden sibling name and moved
/// into place by [`StagedFile::commit`]. Until then the destination is
/// untouched, and dropping the stage removes the temporary file.
#[derive(Debug)]
pub struct StagedFile {
    temp:        NamedTempFile,
    destination: PathBuf,
    options:     StageOptions,
}

impl StagedFile {
    /// Create a fresh staging file next to `destination` and return a write
    /// handle to it. Leftovers of earlier, interrupted stages never collide.
    pub fn create(destination: impl AsRef<Path>, options: StageOptions) -> Result<(Self, File)> {
        let destination = destination.as_ref().to_path_buf();
        let file_name = destination
            .file_name()
            .ok_or_else(|| Error::NoFileName(destination.clone()))?;
        let parent = match destination.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let prefix = format!(".{}.", file_name.to_string_lossy());
        let temp = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(STAGE_SUFFIX)
            .tempfile_in(parent)
            .map_err(|e| Error::Write {
                path: parent.join(format!("{prefix}*{STAGE_SUFFIX}")),
                source: e,
            })?;

        let file = temp.as_file().try_clone().map_err(|e| Error::Write {
            path: temp.path().to_path_buf(),
            source: e,
        })?;

        Ok((
            Self {
                temp,
                destination,
                options,
            },
            file,
        ))
    }

    pub fn staging_path(&self) -> &Path {
        self.temp.path()
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Move the staged file over the destination.
    pub fn commit(self) -> Result<PathBuf> {
        if let Some(perms) = self.options.into_permissions() {
            std::fs::set_permissions(self.temp.path(), perms).map_err(|e| Error::Write {
                path: self.temp.path().to_path_buf(),
                source: e,
            })?;
        }

        let from = self.temp.path().to_path_buf();
        self.temp.persist(&self.destination).map_err(|e| Error::Rename {
            from,
            to: self.destination.clone(),
            source: e.error,
        })?;

        Ok(self.destination)
    }
}
