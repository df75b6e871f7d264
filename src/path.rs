//! Entry name construction and the extraction-side traversal checks.
//!
//! Names read from an archive are untrusted. [`sanitize`] rejects anything
//! that could address a location outside the extraction root by its
//! spelling alone, and [`resolve_within`] catches escapes through symlinks
//! that already exist under the root.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::{Error, PathViolation, Result};

/// Build a forward-slash entry name from a path relative to the archive
/// root. The result is empty for the root itself.
///
/// Every non-empty name returned passes [`sanitize`] and maps back to the
/// same components. Paths that cannot be spelled that way are refused with
/// [`io::ErrorKind::InvalidData`]: components that are not valid UTF-8 or
/// contain a backslash, a drive-like first component such as `c:notes.txt`,
/// and anything that is not a plain relative path.
pub fn entry_name(relative: &Path) -> io::Result<String> {
    let mut segments = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(segment) => {
                let segment = segment
                    .to_str()
                    .ok_or_else(|| invalid_name("path is not valid UTF-8"))?;
                if segment.contains('\\') {
                    return Err(invalid_name("file name contains a backslash"));
                }
                segments.push(segment);
            }
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(invalid_name("path is not relative to the archive root"));
            }
        }
    }

    let name = segments.join("/");
    if !name.is_empty() {
        sanitize(&name).map_err(|violation| {
            invalid_name(format!("{name:?} cannot be stored as an entry name: {violation}"))
        })?;
    }
    Ok(name)
}

fn invalid_name(msg: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.into())
}

/// Turn an untrusted entry name into a relative path.
///
/// Both `/` and `\` count as separators; empty and `.` segments are
/// dropped.
pub fn sanitize(name: &str) -> Result<PathBuf, PathViolation> {
    if name.contains('\0') {
        return Err(PathViolation::NulByte);
    }
    if name.starts_with('/') || name.starts_with('\\') {
        return Err(PathViolation::Absolute);
    }
    if has_drive_prefix(name) {
        return Err(PathViolation::DrivePrefix);
    }

    let mut out = PathBuf::new();
    for segment in name.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => return Err(PathViolation::ParentDir),
            segment => out.push(segment),
        }
    }

    if out.as_os_str().is_empty() {
        return Err(PathViolation::Empty);
    }
    Ok(out)
}

fn has_drive_prefix(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Join `relative` onto `root` and check the result stays inside it.
///
/// `root` must already be canonical. The deepest ancestor of the joined
/// path that exists on disk is resolved, following symlinks, and must be
/// `root` or a descendant of it. Nothing is created or modified.
pub fn resolve_within(root: &Path, name: &str, relative: &Path) -> Result<PathBuf> {
    let joined = root.join(relative);

    let mut probe = joined.as_path();
    loop {
        match fs::symlink_metadata(probe) {
            Ok(_) => break,
            Err(e) if e.kind() == io::ErrorKind::NotFound => match probe.parent() {
                Some(parent) => probe = parent,
                None => break,
            },
            Err(e) => return Err(Error::io(probe, e)),
        }
    }

    let resolved = fs::canonicalize(probe).map_err(|e| Error::io(probe, e))?;
    if !resolved.starts_with(root) {
        return Err(Error::Security {
            name: name.to_string(),
            violation: PathViolation::OutsideRoot,
        });
    }

    Ok(joined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn entry_names_use_forward_slashes() {
        let relative: PathBuf = ["docs", "guide", "intro.md"].iter().collect();
        assert_eq!(entry_name(&relative).unwrap(), "docs/guide/intro.md");
        assert_eq!(entry_name(Path::new("")).unwrap(), "");
        assert_eq!(entry_name(Path::new("./a/b")).unwrap(), "a/b");
        // A colon past the first component is an ordinary character
        assert_eq!(entry_name(Path::new("notes/c:x.txt")).unwrap(), "notes/c:x.txt");
    }

    #[test]
    fn entry_name_refuses_names_the_reader_would_misread() {
        let mut refused = vec!["c:notes.txt", "../up", "/abs"];
        // Backslash is an ordinary file name character only on Unix
        if cfg!(unix) {
            refused.extend(["a\\b.txt", "trail\\", "dir/sub\\x"]);
        }
        for relative in refused {
            let err = entry_name(Path::new(relative)).unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::InvalidData, "{relative}");
        }
    }

    #[cfg(unix)]
    #[test]
    fn entry_name_rejects_non_utf8() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let relative = Path::new(OsStr::from_bytes(b"bad\xff.txt"));
        let err = entry_name(relative).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn sanitize_accepts_nested_names() {
        let expected: PathBuf = ["foo", "bar.txt"].iter().collect();
        assert_eq!(sanitize("foo/bar.txt").unwrap(), expected);
        assert_eq!(sanitize("foo\\bar.txt").unwrap(), expected);
        assert_eq!(sanitize("./foo//bar.txt").unwrap(), expected);
        assert_eq!(sanitize("foo/").unwrap(), PathBuf::from("foo"));
    }

    #[test]
    fn sanitize_rejects_escapes() {
        assert_eq!(sanitize("../../evil.txt"), Err(PathViolation::ParentDir));
        assert_eq!(sanitize("foo/../../evil.txt"), Err(PathViolation::ParentDir));
        assert_eq!(sanitize("foo\\..\\evil.txt"), Err(PathViolation::ParentDir));
        assert_eq!(sanitize("/etc/passwd"), Err(PathViolation::Absolute));
        assert_eq!(sanitize("\\windows\\system32"), Err(PathViolation::Absolute));
        assert_eq!(sanitize("C:/evil.txt"), Err(PathViolation::DrivePrefix));
        assert_eq!(sanitize("c:evil.txt"), Err(PathViolation::DrivePrefix));
        assert_eq!(sanitize("a\0b"), Err(PathViolation::NulByte));
        assert_eq!(sanitize("./"), Err(PathViolation::Empty));
        assert_eq!(sanitize(""), Err(PathViolation::Empty));
    }

    #[test]
    fn resolve_within_allows_missing_descendants() {
        let dir = TempDir::new().unwrap();
        let root = fs::canonicalize(dir.path()).unwrap();

        let resolved = resolve_within(&root, "a/b/c.txt", Path::new("a/b/c.txt")).unwrap();
        assert_eq!(resolved, root.join("a/b/c.txt"));
        assert!(!root.join("a").exists());
    }

    #[cfg(unix)]
    #[test]
    fn resolve_within_rejects_symlink_escape() {
        let outside = TempDir::new().unwrap();
        let dir = TempDir::new().unwrap();
        let root = fs::canonicalize(dir.path()).unwrap();
        std::os::unix::fs::symlink(outside.path(), root.join("link")).unwrap();

        let err = resolve_within(&root, "link/evil.txt", Path::new("link/evil.txt")).unwrap_err();
        assert!(matches!(
            err,
            Error::Security {
                violation: PathViolation::OutsideRoot,
                ..
            }
        ));
    }
}
