//! Zip unpacking into a namespace root.

use std::fs;
use std::io::{Cursor, Read};
use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};
use crate::paths::ensure_dir;

/// Upper bound on the buffer reserved from an entry's declared size.
const MAX_PREALLOC: u64 = 16 * 1024 * 1024;

/// What an unpack wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnpackSummary {
    /// Number of file entries written.
    pub files: usize,

    /// Total bytes written.
    pub bytes: u64,
}

/// Unpack a zip archive held in memory into `dest`.
///
/// Directory entries are skipped; parents of file entries are created on
/// demand. Existing files are overwritten, so unpacking the same archive
/// twice leaves the same tree. Entries whose path would land outside `dest`
/// fail the whole unpack with [`Error::Archive`] before anything is written
/// for them.
pub fn unpack(bytes: &[u8], dest: &Path) -> Result<UnpackSummary> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| Error::Archive(format!("not a zip archive: {e}")))?;

    ensure_dir(dest)?;
    let canonical_root = dest.canonicalize().map_err(|e| Error::io(dest, e))?;

    let mut summary = UnpackSummary::default();

    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| Error::Archive(format!("entry {index}: {e}")))?;

        if entry.is_dir() {
            continue;
        }

        let name = entry.name().to_string();
        let relative = entry_path(&name).ok_or_else(|| {
            tracing::warn!("Rejected archive entry outside destination: {}", name);
            Error::Archive(format!("entry '{name}' escapes the destination root"))
        })?;

        let mut contents = Vec::with_capacity(entry.size().min(MAX_PREALLOC) as usize);
        entry
            .read_to_end(&mut contents)
            .map_err(|e| Error::Archive(format!("entry '{name}': {e}")))?;

        let target = canonical_root.join(&relative);
        if let Some(parent) = target.parent() {
            ensure_dir(parent)?;
            // A symlink already inside the root could still redirect the write.
            let resolved = parent.canonicalize().map_err(|e| Error::io(parent, e))?;
            if !resolved.starts_with(&canonical_root) {
                return Err(Error::Archive(format!(
                    "entry '{name}' resolves outside the destination root"
                )));
            }
        }

        fs::write(&target, &contents).map_err(|e| Error::io(&target, e))?;

        tracing::debug!("Unpacked {} ({} bytes)", relative.display(), contents.len());
        summary.files += 1;
        summary.bytes += contents.len() as u64;
    }

    Ok(summary)
}

/// Turn an entry name into a relative path that stays below the root.
fn entry_path(name: &str) -> Option<PathBuf> {
    if name.contains('\0') {
        return None;
    }

    let mut path = PathBuf::new();
    for component in Path::new(name).components() {
        match component {
            Component::Normal(part) => path.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    if path.as_os_str().is_empty() {
        None
    } else {
        Some(path)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    fn build_zip(entries: &[(&str, Option<&[u8]>)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        for (name, contents) in entries {
            match contents {
                Some(bytes) => {
                    writer.start_file(*name, options).unwrap();
                    writer.write_all(bytes).unwrap();
                }
                None => writer.add_directory(*name, options).unwrap(),
            }
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_unpack_files_and_skip_directories() {
        let temp = TempDir::new().unwrap();
        let archive = build_zip(&[
            ("java/", None),
            ("java/lang/", None),
            ("java/lang/Object.class", Some(&b"\xca\xfe\xba\xbeobject"[..])),
            ("META-INF/MANIFEST.MF", Some(&b"Manifest-Version: 1.0\n"[..])),
        ]);

        let summary = unpack(&archive, temp.path()).expect("unpack should succeed");

        assert_eq!(summary.files, 2);
        assert_eq!(
            fs::read(temp.path().join("java/lang/Object.class")).unwrap(),
            b"\xca\xfe\xba\xbeobject"
        );
        assert_eq!(
            fs::read(temp.path().join("META-INF/MANIFEST.MF")).unwrap(),
            b"Manifest-Version: 1.0\n"
        );
    }

    #[test]
    fn test_directory_only_archive_writes_no_files() {
        let temp = TempDir::new().unwrap();
        let archive = build_zip(&[("empty/", None)]);

        let summary = unpack(&archive, temp.path()).unwrap();
        assert_eq!(summary, UnpackSummary::default());
        assert!(!temp.path().join("empty").is_file());
    }

    #[test]
    fn test_rejects_parent_traversal() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("root");
        let archive = build_zip(&[("../evil.txt", Some(&b"pwned"[..]))]);

        let err = unpack(&archive, &dest).unwrap_err();
        assert!(matches!(err, Error::Archive(_)));
        assert!(!temp.path().join("evil.txt").exists());
    }

    #[test]
    fn test_rejects_absolute_entry() {
        let temp = TempDir::new().unwrap();
        let archive = build_zip(&[("/etc/evil.txt", Some(&b"pwned"[..]))]);

        let err = unpack(&archive, temp.path()).unwrap_err();
        assert!(matches!(err, Error::Archive(_)));
    }

    #[test]
    fn test_rejects_garbage_bytes() {
        let temp = TempDir::new().unwrap();
        let err = unpack(b"definitely not a zip", temp.path()).unwrap_err();
        assert!(matches!(err, Error::Archive(_)));
    }

    #[test]
    fn test_entry_path() {
        assert_eq!(entry_path("a/b/c.class"), Some(PathBuf::from("a/b/c.class")));
        assert_eq!(entry_path("./a.txt"), Some(PathBuf::from("a.txt")));
        assert_eq!(entry_path("a/../../b"), None);
        assert_eq!(entry_path("/abs"), None);
        assert_eq!(entry_path(""), None);
    }
}
