// src/engine/workspace.rs

//! Scratch copy of a homework folder.
//!
//! When `copy_submission` is enabled, tasks run in a copy of the homework so
//! build artifacts and injected fixtures never land in the submission
//! itself. The copy is removed when the [`Workspace`] is dropped.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, warn};

use crate::fs::FileSystem;

pub struct Workspace {
    path: PathBuf,
    fs: Arc<dyn FileSystem>,
}

impl Workspace {
    /// Copy `source` into a fresh directory below `scratch_root`.
    ///
    /// The directory name combines the source folder name with a `blake3`
    /// hash of its full path and the process id, so concurrent runs over
    /// different submissions never share a directory.
    pub fn prepare(fs: Arc<dyn FileSystem>, scratch_root: &Path, source: &Path) -> Result<Self> {
        let path = scratch_root.join(scratch_name(source));

        // Leftover from an interrupted run with the same pid.
        fs.remove_dir_all(&path)?;
        fs.create_dir_all(scratch_root)?;

        let workspace = Self { path, fs };
        workspace.fs.copy_dir_all(source, &workspace.path)?;
        debug!(source = ?source, copy = ?workspace.path, "prepared scratch workspace");
        Ok(workspace)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        match self.fs.remove_dir_all(&self.path) {
            Ok(()) => debug!(copy = ?self.path, "removed scratch workspace"),
            Err(e) => warn!(copy = ?self.path, error = %e, "failed to remove scratch workspace"),
        }
    }
}

fn scratch_name(source: &Path) -> String {
    let name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "homework".to_string());
    let hash = blake3::hash(source.to_string_lossy().as_bytes()).to_hex();
    format!("{name}_{}_{}", &hash.as_str()[..16], std::process::id())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    #[test]
    fn scratch_names_differ_per_source() {
        let a = scratch_name(Path::new("/subs/alice/homework_1"));
        let b = scratch_name(Path::new("/subs/bob/homework_1"));
        assert_ne!(a, b);
        assert!(a.starts_with("homework_1_"));
    }

    #[test]
    fn workspace_is_removed_on_drop() {
        let fs = MockFileSystem::new();
        fs.add_file("/subs/hw1/task1/main.cpp", "int main() {}");
        let shared: Arc<dyn FileSystem> = Arc::new(fs.clone());

        let copy = {
            let ws = Workspace::prepare(shared, Path::new("/scratch"), Path::new("/subs/hw1"))
                .unwrap();
            assert!(fs.exists(&ws.path().join("task1/main.cpp")));
            ws.path().to_path_buf()
        };

        assert!(!fs.exists(&copy));
        assert!(fs.exists(Path::new("/subs/hw1/task1/main.cpp")));
    }
}
