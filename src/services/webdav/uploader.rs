use std::path::Path;

use tracing::{debug, info};

use crate::errors::UploadError;
use crate::models::{DirectoryOutcome, RemotePath, SyncSummary};
use crate::services::local_tree::{LocalEntryKind, LocalTree};

use super::config::{RetryConfig, WebDAVConfig};
use super::connection::WebDAVConnection;

/// Mirrors local directories and files onto a WebDAV server.
///
/// Every request is awaited in turn; nothing runs concurrently.
pub struct WebDAVUploader {
    connection: WebDAVConnection,
}

impl WebDAVUploader {
    /// Creates a new uploader with the default retry policy
    pub fn new(config: WebDAVConfig) -> Result<Self, UploadError> {
        Self::new_with_retry(config, RetryConfig::default())
    }

    /// Creates a new uploader with a custom retry policy
    pub fn new_with_retry(config: WebDAVConfig, retry_config: RetryConfig) -> Result<Self, UploadError> {
        Ok(Self {
            connection: WebDAVConnection::new(config, retry_config)?,
        })
    }

    pub fn connection(&self) -> &WebDAVConnection {
        &self.connection
    }

    /// Uploads `local_root` into `target_dir/<local_root name>`, creating
    /// `target_dir` and every mirrored subdirectory on the way.
    ///
    /// Stops at the first error. Whatever was uploaded before that stays on
    /// the server.
    pub async fn sync_directory(
        &self,
        local_root: &Path,
        target_dir: &RemotePath,
    ) -> Result<SyncSummary, UploadError> {
        let tree = LocalTree::open(local_root)?;
        let uploaded_folder = target_dir.join_os(tree.name())?;

        info!(
            "📁 Uploading {} to {}",
            tree.path().display(),
            uploaded_folder
        );

        let mut summary = SyncSummary::default();
        self.ensure_prefixes(target_dir, &mut summary).await?;
        summary.record_directory(self.ensure_remote_directory(&uploaded_folder).await?);

        for entry in tree.walk() {
            let entry = entry?;
            let relative = tree.relative_path(&entry.path)?;

            match entry.kind {
                LocalEntryKind::Directory => {
                    let remote_dir = uploaded_folder.join_relative(relative)?;
                    summary.record_directory(self.ensure_remote_directory(&remote_dir).await?);
                }
                LocalEntryKind::File => {
                    let parent = relative.parent().unwrap_or_else(|| Path::new(""));
                    let remote_dir = uploaded_folder.join_relative(parent)?;
                    let bytes = self.put_into(&entry.path, &remote_dir).await?;
                    summary.record_upload(bytes);
                }
            }
        }

        info!(
            "✅ Uploaded {} files ({} bytes) to {}, {} directories created, {} already existed",
            summary.files_uploaded,
            summary.bytes_uploaded,
            uploaded_folder,
            summary.directories_created,
            summary.directories_existing
        );

        Ok(summary)
    }

    /// Uploads one file into `remote_dir`. With `ensure_parents` every
    /// segment of `remote_dir` is created first. Returns the bytes sent.
    pub async fn upload_file(
        &self,
        local_file: &Path,
        remote_dir: &RemotePath,
        ensure_parents: bool,
    ) -> Result<u64, UploadError> {
        if ensure_parents {
            self.ensure_all_parents(remote_dir).await?;
        }

        self.put_into(local_file, remote_dir).await
    }

    /// Creates `path` and treats an already existing collection as success
    pub async fn ensure_remote_directory(&self, path: &RemotePath) -> Result<DirectoryOutcome, UploadError> {
        match self.create_remote_directory(path).await {
            Ok(()) => {
                debug!("Created remote directory: {}", path);
                Ok(DirectoryOutcome::Created)
            }
            Err(e) if e.is_already_exists() => {
                debug!("Remote directory already exists: {}", path);
                Ok(DirectoryOutcome::AlreadyExisted)
            }
            Err(e) => Err(e),
        }
    }

    /// Creates `path` with a single MKCOL (retried on transport failures)
    pub async fn create_remote_directory(&self, path: &RemotePath) -> Result<(), UploadError> {
        self.connection.create_directory(path).await
    }

    /// Ensures `a`, `a/b`, `a/b/c` in that order for `a/b/c`. MKCOL fails when
    /// the immediate parent is missing, so no deeper segment goes first.
    pub async fn ensure_all_parents(&self, path: &RemotePath) -> Result<(), UploadError> {
        self.ensure_prefixes(path, &mut SyncSummary::default()).await
    }

    async fn ensure_prefixes(&self, path: &RemotePath, summary: &mut SyncSummary) -> Result<(), UploadError> {
        for prefix in path.prefixes() {
            summary.record_directory(self.ensure_remote_directory(&prefix).await?);
        }
        Ok(())
    }

    async fn put_into(&self, local_file: &Path, remote_dir: &RemotePath) -> Result<u64, UploadError> {
        let file_name = local_file.file_name().ok_or_else(|| UploadError::InvalidPath {
            path: local_file.display().to_string(),
            reason: "file name is missing".to_string(),
        })?;
        let target = remote_dir.join_os(file_name)?;

        let bytes = self.connection.put_file(local_file, &target).await?;
        info!("⬆️ Uploaded {} ({} bytes) to {}", local_file.display(), bytes, target);
        Ok(bytes)
    }
}
