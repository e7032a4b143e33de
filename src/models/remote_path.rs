use std::borrow::Cow;
use std::ffi::OsStr;
use std::fmt;
use std::path::{Component, Path};
use std::str::FromStr;

use crate::errors::UploadError;

/// Slash-separated path relative to the WebDAV root, e.g. `backup/2024/photos`.
///
/// Segments are stored as raw, unencoded bytes so local names that are not
/// valid UTF-8 survive intact; [`RemotePath::to_url_path`] percent-encodes
/// each one when building request URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RemotePath {
    segments: Vec<Vec<u8>>,
}

impl RemotePath {
    /// The WebDAV root itself (no segments)
    pub fn root() -> Self {
        Self::default()
    }

    /// Parses a slash-separated path. Leading, trailing and doubled slashes
    /// are ignored, as are `.` segments. `..` is rejected.
    pub fn parse(path: &str) -> Result<Self, UploadError> {
        let mut segments = Vec::new();
        for segment in path.split('/') {
            match segment {
                "" | "." => continue,
                ".." => {
                    return Err(UploadError::InvalidPath {
                        path: path.to_string(),
                        reason: "parent directory segments are not allowed".to_string(),
                    })
                }
                other => segments.push(other.as_bytes().to_vec()),
            }
        }
        Ok(Self { segments })
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segments for display; invalid UTF-8 shows as U+FFFD
    pub fn segments(&self) -> impl Iterator<Item = Cow<'_, str>> + '_ {
        self.segments.iter().map(|segment| String::from_utf8_lossy(segment))
    }

    pub fn file_name(&self) -> Option<Cow<'_, str>> {
        self.segments.last().map(|segment| String::from_utf8_lossy(segment))
    }

    /// Appends a single segment (a file or directory name)
    pub fn join(&self, segment: &str) -> Result<Self, UploadError> {
        self.join_bytes(segment.as_bytes())
    }

    /// Appends a local file or directory name. On Unix the name's raw bytes
    /// are kept, so names that are not valid UTF-8 are still uploaded.
    pub fn join_os(&self, name: &OsStr) -> Result<Self, UploadError> {
        #[cfg(unix)]
        {
            use std::os::unix::ffi::OsStrExt;
            self.join_bytes(name.as_bytes())
        }

        #[cfg(not(unix))]
        {
            let name = name.to_str().ok_or_else(|| UploadError::InvalidPath {
                path: name.to_string_lossy().into_owned(),
                reason: "name is not valid Unicode; it was not uploaded".to_string(),
            })?;
            self.join(name)
        }
    }

    fn join_bytes(&self, segment: &[u8]) -> Result<Self, UploadError> {
        if segment.is_empty() || segment == b"." || segment == b".." || segment.contains(&b'/') {
            return Err(UploadError::InvalidPath {
                path: String::from_utf8_lossy(segment).into_owned(),
                reason: "not a single path segment".to_string(),
            });
        }

        let mut joined = self.clone();
        joined.segments.push(segment.to_vec());
        Ok(joined)
    }

    /// Appends every segment of a relative local path, mapping
    /// `a/b/c.txt` on disk onto `self/a/b/c.txt`.
    pub fn join_relative(&self, relative: &Path) -> Result<Self, UploadError> {
        let mut joined = self.clone();
        for component in relative.components() {
            match component {
                Component::CurDir => continue,
                Component::Normal(name) => joined = joined.join_os(name)?,
                _ => {
                    return Err(UploadError::InvalidPath {
                        path: relative.display().to_string(),
                        reason: "expected a relative path below the upload root".to_string(),
                    })
                }
            }
        }
        Ok(joined)
    }

    /// Every non-empty prefix from the outermost segment inward:
    /// `a/b/c` yields `a`, `a/b`, `a/b/c`.
    pub fn prefixes(&self) -> impl Iterator<Item = RemotePath> + '_ {
        (1..=self.segments.len()).map(move |len| RemotePath {
            segments: self.segments[..len].to_vec(),
        })
    }

    /// Percent-encoded form used in request URLs
    pub fn to_url_path(&self) -> String {
        self.segments
            .iter()
            .map(|segment| urlencoding::encode_binary(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl fmt::Display for RemotePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, segment) in self.segments().enumerate() {
            if index > 0 {
                f.write_str("/")?;
            }
            f.write_str(&segment)?;
        }
        Ok(())
    }
}

impl FromStr for RemotePath {
    type Err = UploadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes_slashes() {
        let path = RemotePath::parse("/backup//2024/./").unwrap();
        assert_eq!(path.segments().collect::<Vec<_>>(), vec!["backup", "2024"]);
        assert_eq!(path.to_string(), "backup/2024");
    }

    #[test]
    fn test_parse_rejects_parent_segments() {
        let result = RemotePath::parse("backup/../etc");
        assert!(matches!(result, Err(UploadError::InvalidPath { .. })));
    }

    #[test]
    fn test_empty_path_is_root() {
        assert!(RemotePath::parse("").unwrap().is_root());
        assert!(RemotePath::parse("/").unwrap().is_root());
        assert_eq!(RemotePath::root().prefixes().count(), 0);
    }

    #[test]
    fn test_prefixes_go_outermost_first() {
        let path = RemotePath::parse("a/b/c").unwrap();
        let prefixes: Vec<String> = path.prefixes().map(|p| p.to_string()).collect();
        assert_eq!(prefixes, vec!["a", "a/b", "a/b/c"]);
    }

    #[test]
    fn test_join_rejects_nested_segment() {
        let base = RemotePath::parse("backup").unwrap();
        assert!(base.join("a/b").is_err());
        assert!(base.join("..").is_err());
        assert_eq!(base.join("photos").unwrap().to_string(), "backup/photos");
    }

    #[test]
    fn test_join_relative_maps_local_components() {
        let base = RemotePath::parse("backup/2024/photos").unwrap();
        let joined = base.join_relative(Path::new("sub/deeper")).unwrap();
        assert_eq!(joined.to_string(), "backup/2024/photos/sub/deeper");

        let unchanged = base.join_relative(Path::new("")).unwrap();
        assert_eq!(unchanged, base);
    }

    #[test]
    fn test_join_relative_rejects_absolute_and_parent() {
        let base = RemotePath::parse("backup").unwrap();
        assert!(base.join_relative(Path::new("/etc")).is_err());
        assert!(base.join_relative(Path::new("../escape")).is_err());
    }

    #[test]
    fn test_url_path_encodes_each_segment() {
        let path = RemotePath::parse("My Documents/Q1 #report.pdf").unwrap();
        assert_eq!(path.to_url_path(), "My%20Documents/Q1%20%23report.pdf");
        assert_eq!(path.file_name().as_deref(), Some("Q1 #report.pdf"));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_names_keep_their_bytes() {
        use std::os::unix::ffi::OsStrExt;

        let base = RemotePath::parse("backup").unwrap();
        let joined = base
            .join_relative(Path::new(OsStr::from_bytes(b"caf\xe9/caf\xe9.txt")))
            .unwrap();

        assert_eq!(joined.to_url_path(), "backup/caf%E9/caf%E9.txt");
        assert_eq!(joined.to_string(), "backup/caf\u{FFFD}/caf\u{FFFD}.txt");
        assert_eq!(joined.prefixes().count(), 3);
    }

    #[test]
    fn test_join_os_rejects_separators() {
        let base = RemotePath::parse("backup").unwrap();
        assert!(base.join_os(OsStr::new("..")).is_err());
        assert!(base.join_os(OsStr::new("a/b")).is_err());
        assert_eq!(base.join_os(OsStr::new("notes.txt")).unwrap().to_string(), "backup/notes.txt");
    }
}
