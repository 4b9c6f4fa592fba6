use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{AssemblyError, Result};

/// A per-invocation scratch directory removed when dropped
///
/// The name carries a fresh UUID so concurrent invocations never share one.
/// Call [`ScopedTempDir::persist`] to keep the directory.
#[derive(Debug)]
pub struct ScopedTempDir {
    path: PathBuf,
    armed: bool,
}

impl ScopedTempDir {
    /// Create `<root>/<prefix><uuid>`, creating `root` if needed
    pub fn create(root: &Path, prefix: &str) -> Result<Self> {
        std::fs::create_dir_all(root)?;
        let path = root.join(format!("{}{}", prefix, Uuid::new_v4()));
        std::fs::create_dir(&path)?;
        debug!("Created scratch directory {:?}", path);
        Ok(Self { path, armed: true })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of `name` inside the scratch directory
    pub fn join(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }

    /// Disarm the guard and hand back the path
    pub fn persist(mut self) -> PathBuf {
        self.armed = false;
        std::mem::take(&mut self.path)
    }
}

impl Drop for ScopedTempDir {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        match std::fs::remove_dir_all(&self.path) {
            Ok(()) => debug!("Removed scratch directory {:?}", self.path),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove scratch directory {:?}: {}", self.path, e),
        }
    }
}

/// Claim a fresh `<root>/<prefix><YYYYMMDD_HHMMSS>` result directory
///
/// When a directory with that timestamp already exists, `_1`, `_2`, ... are
/// appended until an unused name is claimed. `create_dir` makes each claim
/// atomic, so two invocations in the same second get different directories.
pub fn allocate_output_dir(root: &Path, prefix: &str, now: DateTime<Local>) -> Result<PathBuf> {
    std::fs::create_dir_all(root).map_err(|e| AssemblyError::OutputDirFailed {
        path: root.display().to_string(),
        reason: e.to_string(),
    })?;

    let stem = format!("{}{}", prefix, now.format("%Y%m%d_%H%M%S"));
    let mut suffix = 0u32;

    loop {
        let name = if suffix == 0 {
            stem.clone()
        } else {
            format!("{}_{}", stem, suffix)
        };
        let candidate = root.join(name);

        match std::fs::create_dir(&candidate) {
            Ok(()) => return Ok(candidate),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                debug!("Output directory {:?} taken, trying next suffix", candidate);
                suffix += 1;
            }
            Err(e) => {
                return Err(AssemblyError::OutputDirFailed {
                    path: candidate.display().to_string(),
                    reason: e.to_string(),
                }.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    #[test]
    fn test_scratch_dir_removed_on_drop() {
        let root = tempdir().unwrap();
        let path = {
            let scratch = ScopedTempDir::create(root.path(), "live_photo_").unwrap();
            std::fs::write(scratch.join("key_photo.jpg"), b"jpeg").unwrap();
            assert!(scratch.path().exists());
            scratch.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn test_scratch_dir_name_is_unique() {
        let root = tempdir().unwrap();
        let a = ScopedTempDir::create(root.path(), "live_photo_").unwrap();
        let b = ScopedTempDir::create(root.path(), "live_photo_").unwrap();
        assert_ne!(a.path(), b.path());

        let name = a.path().file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("live_photo_"));
        assert!(Uuid::parse_str(&name["live_photo_".len()..]).is_ok());
    }

    #[test]
    fn test_persist_keeps_directory() {
        let root = tempdir().unwrap();
        let scratch = ScopedTempDir::create(root.path(), "live_photo_").unwrap();
        let path = scratch.persist();
        assert!(path.exists());
    }

    #[test]
    fn test_output_dir_name() {
        let root = tempdir().unwrap();
        let now = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        let dir = allocate_output_dir(root.path(), "livephoto_", now).unwrap();
        assert_eq!(dir, root.path().join("livephoto_20240309_140507"));
        assert!(dir.is_dir());
    }

    #[test]
    fn test_output_dir_collision_gets_suffix() {
        let root = tempdir().unwrap();
        let now = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();

        let first = allocate_output_dir(root.path(), "livephoto_", now).unwrap();
        let second = allocate_output_dir(root.path(), "livephoto_", now).unwrap();
        let third = allocate_output_dir(root.path(), "livephoto_", now).unwrap();

        assert_ne!(first, second);
        assert_eq!(second, root.path().join("livephoto_20240309_140507_1"));
        assert_eq!(third, root.path().join("livephoto_20240309_140507_2"));
    }
}
