use super::FileSystem;
use anyhow::{Result, anyhow};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File(Vec<u8>),
    Dir,
}

/// In-memory filesystem for engine tests.
///
/// Paths are compared literally, so tests should use absolute paths.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    entries: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = path.as_ref().to_path_buf();
        let mut entries = self.entries.lock().unwrap();
        if let Some(parent) = path.parent() {
            Self::ensure_dirs(&mut entries, parent);
        }
        entries.insert(path, MockEntry::File(content.into()));
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut entries = self.entries.lock().unwrap();
        Self::ensure_dirs(&mut entries, path.as_ref());
    }

    fn ensure_dirs(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            entries
                .entry(ancestor.to_path_buf())
                .or_insert(MockEntry::Dir);
        }
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        let entries = self.entries.lock().unwrap();
        entries.contains_key(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        let entries = self.entries.lock().unwrap();
        matches!(entries.get(path), Some(MockEntry::Dir))
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        let mut entries = self.entries.lock().unwrap();
        if let Some(MockEntry::File(_)) = entries.get(path) {
            return Err(anyhow!("Is a file: {:?}", path));
        }
        Self::ensure_dirs(&mut entries, path);
        Ok(())
    }

    fn copy_dir_all(&self, from: &Path, to: &Path) -> Result<()> {
        let mut entries = self.entries.lock().unwrap();
        if !matches!(entries.get(from), Some(MockEntry::Dir)) {
            return Err(anyhow!("Not a directory or not found: {:?}", from));
        }

        let copied: Vec<(PathBuf, MockEntry)> = entries
            .iter()
            .filter_map(|(path, entry)| {
                let rel = path.strip_prefix(from).ok()?;
                if rel.as_os_str().is_empty() {
                    return None;
                }
                Some((to.join(rel), entry.clone()))
            })
            .collect();

        Self::ensure_dirs(&mut entries, to);
        for (path, entry) in copied {
            entries.insert(path, entry);
        }
        Ok(())
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        let mut entries = self.entries.lock().unwrap();
        entries.retain(|p, _| !p.starts_with(path));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_file_creates_parent_dirs() {
        let fs = MockFileSystem::new();
        fs.add_file("/subs/hw1/task1/main.cpp", "int main() {}");
        assert!(fs.is_dir(Path::new("/subs/hw1/task1")));
        assert!(fs.is_dir(Path::new("/subs")));
        assert!(!fs.is_dir(Path::new("/subs/hw1/task1/main.cpp")));
        assert!(fs.exists(Path::new("/subs/hw1/task1/main.cpp")));
    }

    #[test]
    fn copy_then_remove_round_trip() {
        let fs = MockFileSystem::new();
        fs.add_file("/subs/hw1/task1/main.cpp", "x");
        fs.copy_dir_all(Path::new("/subs/hw1"), Path::new("/tmp/scratch/hw1"))
            .unwrap();
        assert!(fs.exists(Path::new("/tmp/scratch/hw1/task1/main.cpp")));

        fs.remove_dir_all(Path::new("/tmp/scratch")).unwrap();
        assert!(!fs.exists(Path::new("/tmp/scratch/hw1")));
        assert!(fs.exists(Path::new("/subs/hw1/task1/main.cpp")));
    }
}
