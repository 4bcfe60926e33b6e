//! Watched object description.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::mask::EventMask;

/// Stable identity of a watched object.
///
/// The object's path may change when it is renamed, the id never does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WatchId(Uuid);

impl WatchId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single file or directory tree configured for change monitoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchedObject {
    id: WatchId,
    path: PathBuf,
    is_directory: bool,
    recursive: bool,
    mask: EventMask,
}

impl WatchedObject {
    /// Describe a watched object without touching the filesystem.
    ///
    /// `recursive` is forced to `false` for single-file watches.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, is_directory: bool, recursive: bool, mask: EventMask) -> Self {
        Self {
            id: WatchId::new(),
            path: path.into(),
            is_directory,
            recursive: is_directory && recursive,
            mask,
        }
    }

    /// Describe a watched object, probing the filesystem for its type.
    ///
    /// Relative paths are made absolute against the current directory.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the path does not exist or cannot be read.
    pub fn from_path(path: impl Into<PathBuf>, recursive: bool, mask: EventMask) -> std::io::Result<Self> {
        let path = std::path::absolute(path.into())?;
        let is_directory = std::fs::metadata(&path)?.is_dir();
        Ok(Self::new(path, is_directory, recursive, mask))
    }

    #[must_use]
    pub fn id(&self) -> WatchId {
        self.id
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn is_directory(&self) -> bool {
        self.is_directory
    }

    #[must_use]
    pub fn recursive(&self) -> bool {
        self.recursive
    }

    #[must_use]
    pub fn mask(&self) -> EventMask {
        self.mask
    }

    /// Directory the OS notification scope is anchored at.
    ///
    /// The object itself for directory watches, its parent for file watches.
    /// A bare relative file name is anchored at the current directory.
    #[must_use]
    pub fn watch_root(&self) -> &Path {
        if self.is_directory {
            return &self.path;
        }
        match self.path.parent() {
            Some(parent) if parent.as_os_str().is_empty() => Path::new("."),
            Some(parent) => parent,
            None => &self.path,
        }
    }

    /// Base name of the object, used for identity matching of file watches.
    #[must_use]
    pub fn file_name(&self) -> Option<&std::ffi::OsStr> {
        self.path.file_name()
    }

    /// Rewrite the object's path after the object itself was renamed.
    pub(crate) fn set_path(&mut self, path: PathBuf) {
        self.path = path;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_watch_forces_non_recursive() {
        let object = WatchedObject::new("/tmp/a/f.txt", false, true, EventMask::ALL);
        assert!(!object.recursive());
        assert_eq!(object.watch_root(), Path::new("/tmp/a"));
    }

    #[test]
    fn test_directory_watch_root_is_itself() {
        let object = WatchedObject::new("/tmp/dir", true, true, EventMask::ALL);
        assert!(object.recursive());
        assert_eq!(object.watch_root(), Path::new("/tmp/dir"));
    }

    #[test]
    fn test_ids_are_unique() {
        let a = WatchedObject::new("/tmp/a", true, false, EventMask::ALL);
        let b = WatchedObject::new("/tmp/a", true, false, EventMask::ALL);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_from_path_probes_type() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("f.txt");
        std::fs::write(&file, "x").unwrap();

        assert!(WatchedObject::from_path(dir.path(), true, EventMask::ALL)
            .unwrap()
            .is_directory());
        assert!(!WatchedObject::from_path(&file, true, EventMask::ALL)
            .unwrap()
            .is_directory());
        assert!(WatchedObject::from_path(dir.path().join("missing"), false, EventMask::ALL).is_err());
    }

    #[test]
    fn test_bare_file_name_watches_current_dir() {
        let object = WatchedObject::new("notes.txt", false, false, EventMask::ALL);
        assert_eq!(object.watch_root(), Path::new("."));
    }

    #[test]
    fn test_from_path_makes_relative_path_absolute() {
        // Tests run from the package root.
        let object = WatchedObject::from_path("Cargo.toml", false, EventMask::ALL).unwrap();
        assert!(object.path().is_absolute());
        assert_eq!(object.file_name(), Some(std::ffi::OsStr::new("Cargo.toml")));
        assert_eq!(
            std::fs::canonicalize(object.watch_root()).unwrap(),
            std::fs::canonicalize(std::env::current_dir().unwrap()).unwrap()
        );
    }
}
