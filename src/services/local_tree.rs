use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::errors::UploadError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LocalEntryKind {
    Directory,
    File,
}

/// One descendant of the upload root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalEntry {
    pub path: PathBuf,
    pub kind: LocalEntryKind,
}

/// A validated local directory to be mirrored remotely
#[derive(Debug, Clone)]
pub struct LocalTree {
    root: PathBuf,
    name: OsString,
}

impl LocalTree {
    pub fn open(root: &Path) -> Result<Self, UploadError> {
        if !root.exists() {
            return Err(UploadError::LocalRootNotFound {
                path: root.to_path_buf(),
            });
        }
        if !root.is_dir() {
            return Err(UploadError::NotADirectory {
                path: root.to_path_buf(),
            });
        }

        // `.` and `..` have no name of their own
        let name = match root.file_name() {
            Some(name) => name.to_os_string(),
            None => fs::canonicalize(root)
                .map_err(|e| UploadError::io(root, e))?
                .file_name()
                .map(|name| name.to_os_string())
                .ok_or_else(|| UploadError::InvalidPath {
                    path: root.display().to_string(),
                    reason: "the upload root needs a directory name".to_string(),
                })?,
        };

        Ok(Self {
            root: root.to_path_buf(),
            name,
        })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Name of the remote folder the tree is uploaded into
    pub fn name(&self) -> &OsStr {
        &self.name
    }

    pub fn relative_path<'a>(&self, path: &'a Path) -> Result<&'a Path, UploadError> {
        path.strip_prefix(&self.root)
            .map_err(|_| UploadError::InvalidPath {
                path: path.display().to_string(),
                reason: format!("not below {}", self.root.display()),
            })
    }

    /// Lazily yields every descendant of the root exactly once. Sibling order
    /// is whatever the filesystem returns.
    pub fn walk(&self) -> impl Iterator<Item = Result<LocalEntry, UploadError>> {
        WalkDir::new(&self.root)
            .min_depth(1)
            .follow_links(false)
            .into_iter()
            .filter_map(|entry_result| match entry_result {
                Ok(entry) => classify_entry(entry).transpose(),
                Err(e) => Some(Err(UploadError::from(e))),
            })
    }
}

fn classify_entry(entry: DirEntry) -> Result<Option<LocalEntry>, UploadError> {
    let file_type = entry.file_type();

    let kind = if file_type.is_dir() {
        LocalEntryKind::Directory
    } else if file_type.is_file() {
        LocalEntryKind::File
    } else if file_type.is_symlink() {
        // Classified by target; linked directories are not descended into
        match fs::metadata(entry.path()) {
            Ok(metadata) if metadata.is_dir() => LocalEntryKind::Directory,
            Ok(metadata) if metadata.is_file() => LocalEntryKind::File,
            Ok(_) => {
                debug!("Skipping symlink to special file: {}", entry.path().display());
                return Ok(None);
            }
            Err(e) => {
                debug!("Skipping broken symlink {}: {}", entry.path().display(), e);
                return Ok(None);
            }
        }
    } else {
        debug!("Skipping special file: {}", entry.path().display());
        return Ok(None);
    };

    Ok(Some(LocalEntry {
        path: entry.into_path(),
        kind,
    }))
}
