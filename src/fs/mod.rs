// src/fs/mod.rs

use std::fmt::Debug;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

pub mod mock;

/// Abstract filesystem interface.
///
/// The engine only needs to look at the submission layout and manage scratch
/// copies of it; commands themselves always touch the real disk.
pub trait FileSystem: Send + Sync + Debug {
    fn exists(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Recursively copy the contents of `from` into `to` (created if needed).
    fn copy_dir_all(&self, from: &Path, to: &Path) -> Result<()>;

    /// Recursively remove `path`. Removing a missing path is not an error.
    fn remove_dir_all(&self, path: &Path) -> Result<()>;
}

/// Implementation that uses `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).with_context(|| format!("creating dir {:?}", path))
    }

    fn copy_dir_all(&self, from: &Path, to: &Path) -> Result<()> {
        fs::create_dir_all(to).with_context(|| format!("creating dir {:?}", to))?;
        for entry in fs::read_dir(from).with_context(|| format!("reading dir {:?}", from))? {
            let entry = entry?;
            let target = to.join(entry.file_name());
            let file_type = entry.file_type()?;
            if file_type.is_dir() {
                self.copy_dir_all(&entry.path(), &target)?;
            } else if file_type.is_symlink() {
                copy_symlink(&entry.path(), &target)?;
            } else {
                fs::copy(entry.path(), &target)
                    .with_context(|| format!("copying {:?} to {:?}", entry.path(), target))?;
            }
        }
        Ok(())
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        match fs::remove_dir_all(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("removing dir {:?}", path)),
        }
    }
}

#[cfg(unix)]
fn copy_symlink(from: &Path, to: &Path) -> Result<()> {
    let target = fs::read_link(from).with_context(|| format!("reading link {:?}", from))?;
    std::os::unix::fs::symlink(&target, to)
        .with_context(|| format!("creating link {:?} -> {:?}", to, target))
}

#[cfg(not(unix))]
fn copy_symlink(from: &Path, to: &Path) -> Result<()> {
    fs::copy(from, to).with_context(|| format!("copying {:?} to {:?}", from, to))?;
    Ok(())
}
