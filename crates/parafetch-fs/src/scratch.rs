use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// File name prefix of every scratch slot; the chunk index follows it.
pub const SLOT_PREFIX: &str = "chunk.";

const STORE_PREFIX: &str = ".parafetch-";

/// Per-job directory of scratch slots keyed by chunk index.
///
/// The directory and anything still inside it is removed when the store is
/// dropped, on success and failure paths alike.
#[derive(Debug)]
pub struct ScratchStore {
    dir: TempDir,
}

impl ScratchStore {
    /// Create a fresh, uniquely named store directory under `root`.
    ///
    /// `root` must already exist; it is never created here, so a finished
    /// job leaves the tree exactly as it found it.
    pub fn create_in(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let dir = tempfile::Builder::new()
            .prefix(STORE_PREFIX)
            .tempdir_in(root)
            .map_err(|e| Error::CreateDir {
                path: root.to_path_buf(),
                source: e,
            })?;
        tracing::debug!(dir = %dir.path().display(), "created scratch store");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn slot_path(&self, index: u32) -> PathBuf {
        self.dir.path().join(format!("{SLOT_PREFIX}{index}"))
    }

    /// Reserve the slot for `index`. The returned guard removes whatever was
    /// written to the slot unless it is committed.
    pub fn reserve(&self, index: u32) -> Result<PendingSlot> {
        let path = self.slot_path(index);
        if path.exists() {
            return Err(Error::SlotTaken { index });
        }
        Ok(PendingSlot {
            index,
            path,
            committed: false,
        })
    }

    /// Indices of the slots currently present on disk, ascending.
    pub fn occupied(&self) -> Result<Vec<u32>> {
        let entries = std::fs::read_dir(self.path()).map_err(|e| Error::Read {
            path: self.path().to_path_buf(),
            source: e,
        })?;

        let mut indices = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::Read {
                path: self.path().to_path_buf(),
                source: e,
            })?;
            let name = entry.file_name();
            if let Some(index) = name
                .to_str()
                .and_then(|n| n.strip_prefix(SLOT_PREFIX))
                .and_then(|n| n.parse::<u32>().ok())
            {
                indices.push(index);
            }
        }
        indices.sort_unstable();
        Ok(indices)
    }
}

/// A slot that is being written. Dropping it without [`PendingSlot::commit`]
/// deletes the partial file.
#[derive(Debug)]
pub struct PendingSlot {
    index: u32,
    path: PathBuf,
    committed: bool,
}

impl PendingSlot {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Mark the slot as complete and hand over its ownership.
    pub fn commit(mut self) -> ScratchSlot {
        self.committed = true;
        ScratchSlot {
            index: self.index,
            path: std::mem::take(&mut self.path),
            removed: false,
        }
    }
}

impl Drop for PendingSlot {
    fn drop(&mut self) {
        if !self.committed {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

/// A completely written slot. Its owner is responsible for deleting it;
/// dropping it deletes the file as well.
#[derive(Debug)]
pub struct ScratchSlot {
    index: u32,
    path: PathBuf,
    removed: bool,
}

impl ScratchSlot {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the slot, reporting failures. A slot that already vanished is
    /// not an error.
    pub fn discard(mut self) -> Result<()> {
        self.removed = true;
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Remove {
                path: self.path.clone(),
                source: e,
            }),
        }
    }
}

impl Drop for ScratchSlot {
    fn drop(&mut self) {
        if !self.removed {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}
