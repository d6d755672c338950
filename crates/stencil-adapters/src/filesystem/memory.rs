//! In-memory filesystem adapter for testing.

use std::{
    collections::{BTreeMap, HashSet},
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use stencil_core::{
    application::{
        ApplicationError,
        ports::{FileEntry, Filesystem, ListOptions},
    },
    error::StencilResult,
};

/// In-memory filesystem for testing.
///
/// Cheap to clone; clones share contents, so a test can keep a handle while
/// the services own another. Reads of paths listed in `fail_reads` fail.
#[derive(Debug, Clone)]
pub struct MemoryFilesystem {
    inner: Arc<RwLock<MemoryFilesystemInner>>,
}

#[derive(Debug, Default)]
struct MemoryFilesystemInner {
    files: BTreeMap<PathBuf, String>,
    directories: HashSet<PathBuf>,
    fail_reads: HashSet<PathBuf>,
    reads: usize,
}

impl MemoryFilesystem {
    /// Create a new empty memory filesystem.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MemoryFilesystemInner::default())),
        }
    }

    /// Seed a file, creating its parent directories (testing helper).
    pub fn insert(&self, path: impl Into<PathBuf>, content: impl Into<String>) {
        let path = path.into();
        if let Ok(mut inner) = self.inner.write() {
            if let Some(parent) = path.parent() {
                add_ancestors(&mut inner.directories, parent);
            }
            inner.files.insert(path, content.into());
        }
    }

    /// Read a file's content (testing helper).
    pub fn read_file(&self, path: &Path) -> Option<String> {
        let inner = self.inner.read().ok()?;
        inner.files.get(path).cloned()
    }

    /// Make every later read of `path` fail.
    pub fn fail_reads_of(&self, path: impl Into<PathBuf>) {
        if let Ok(mut inner) = self.inner.write() {
            inner.fail_reads.insert(path.into());
        }
    }

    /// Number of successful `read_text` calls so far.
    pub fn read_count(&self) -> usize {
        self.inner.read().map(|i| i.reads).unwrap_or(0)
    }

    /// All file paths, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.inner
            .read()
            .map(|i| i.files.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Remove a directory and everything below it.
    pub fn remove_dir_all(&self, path: &Path) {
        if let Ok(mut inner) = self.inner.write() {
            inner.directories.retain(|d| !d.starts_with(path));
            inner.files.retain(|p, _| !p.starts_with(path));
        }
    }
}

impl Default for MemoryFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

fn add_ancestors(directories: &mut HashSet<PathBuf>, path: &Path) {
    let mut current = PathBuf::new();
    for component in path.components() {
        current.push(component);
        directories.insert(current.clone());
    }
}

fn not_found(path: &Path) -> stencil_core::error::StencilError {
    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason: "No such file".into(),
    }
    .into()
}

impl Filesystem for MemoryFilesystem {
    fn list_files(&self, root: &Path, options: &ListOptions) -> StencilResult<Vec<FileEntry>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;

        let files = inner
            .files
            .keys()
            .filter_map(|path| {
                let relative = path.strip_prefix(root).ok()?;
                let excluded = relative
                    .parent()
                    .into_iter()
                    .flat_map(|p| p.components())
                    .filter_map(|c| c.as_os_str().to_str())
                    .any(|c| options.excludes_dir(c));
                let name = path.file_name()?.to_str()?;
                (!excluded && options.includes(name)).then(|| FileEntry {
                    name: name.to_string(),
                    path: path.clone(),
                })
            })
            .collect();
        Ok(files)
    }

    fn read_text(&self, path: &Path) -> StencilResult<String> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;

        if inner.fail_reads.contains(path) {
            return Err(ApplicationError::FilesystemError {
                path: path.to_path_buf(),
                reason: "Permission denied".into(),
            }
            .into());
        }
        let content = inner.files.get(path).cloned().ok_or_else(|| not_found(path))?;
        inner.reads += 1;
        Ok(content)
    }

    fn write_text(&self, path: &Path, content: &str) -> StencilResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;

        // Ensure parent exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !inner.directories.contains(parent) {
                return Err(ApplicationError::FilesystemError {
                    path: path.to_path_buf(),
                    reason: "Parent directory does not exist".into(),
                }
                .into());
            }
        }

        inner.files.insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> StencilResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;

        let content = inner.files.remove(from).ok_or_else(|| not_found(from))?;
        inner.files.insert(to.to_path_buf(), content);
        Ok(())
    }

    fn delete(&self, path: &Path) -> StencilResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;

        inner
            .files
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| not_found(path))
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner
            .read()
            .map(|inner| inner.files.contains_key(path) || inner.directories.contains(path))
            .unwrap_or(false)
    }

    fn create_dir_all(&self, path: &Path) -> StencilResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;

        add_ancestors(&mut inner.directories, path);
        Ok(())
    }
}
