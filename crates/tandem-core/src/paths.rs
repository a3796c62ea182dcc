//! Namespace root management.
//!
//! Every stage reads and writes through a fixed set of directories so that
//! provisioning is decoupled from translation.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Identity of one namespace root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RootKind {
    Runtime,
    Library,
    Input,
    Intermediate,
    Final,
}

impl RootKind {
    pub const ALL: [RootKind; 5] = [
        RootKind::Runtime,
        RootKind::Library,
        RootKind::Input,
        RootKind::Intermediate,
        RootKind::Final,
    ];

    /// Directory name under the base directory.
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Runtime => "runtime",
            Self::Library => "library",
            Self::Input => "input",
            Self::Intermediate => "intermediate",
            Self::Final => "final",
        }
    }
}

/// Directory structure shared by all pipeline runs.
///
/// ```text
/// <base>/
/// ├── runtime/       # Bundled runtime class tree
/// ├── library/       # Fetched backend class library
/// ├── input/         # The submitted source unit
/// ├── intermediate/  # Compiler output
/// ├── final/         # Backend output bundle
/// └── work/          # Scratch files (engine manifests)
/// ```
///
/// Roots are created if absent and never removed while a run is active.
#[derive(Debug, Clone)]
pub struct NamespaceRoots {
    /// Base directory holding every root.
    pub base_dir: PathBuf,

    pub runtime_dir: PathBuf,
    pub library_dir: PathBuf,
    pub input_dir: PathBuf,
    pub intermediate_dir: PathBuf,
    pub final_dir: PathBuf,

    /// Scratch space that is not itself a namespace root.
    pub work_dir: PathBuf,
}

impl NamespaceRoots {
    /// Lay out the roots under `base_dir`, creating every directory.
    ///
    /// # Errors
    /// Returns an error if directory creation fails.
    pub fn create(base_dir: &Path) -> Result<Self> {
        let roots = Self {
            base_dir: base_dir.to_path_buf(),
            runtime_dir: base_dir.join(RootKind::Runtime.dir_name()),
            library_dir: base_dir.join(RootKind::Library.dir_name()),
            input_dir: base_dir.join(RootKind::Input.dir_name()),
            intermediate_dir: base_dir.join(RootKind::Intermediate.dir_name()),
            final_dir: base_dir.join(RootKind::Final.dir_name()),
            work_dir: base_dir.join("work"),
        };

        for kind in RootKind::ALL {
            roots.ensure(kind)?;
        }
        ensure_dir(&roots.work_dir)?;

        Ok(roots)
    }

    /// Path of a root.
    pub fn get(&self, kind: RootKind) -> &Path {
        match kind {
            RootKind::Runtime => &self.runtime_dir,
            RootKind::Library => &self.library_dir,
            RootKind::Input => &self.input_dir,
            RootKind::Intermediate => &self.intermediate_dir,
            RootKind::Final => &self.final_dir,
        }
    }

    /// Create a root if it is absent.
    pub fn ensure(&self, kind: RootKind) -> Result<&Path> {
        let dir = self.get(kind);
        ensure_dir(dir)?;
        Ok(dir)
    }
}

pub(crate) fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))
}

/// Remove everything inside `dir` except the entry named `keep`.
pub(crate) fn clear_dir(dir: &Path, keep: Option<&str>) -> Result<()> {
    let entries = fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        if keep.is_some_and(|keep| entry.file_name() == keep) {
            continue;
        }
        let path = entry.path();
        let removed = if path.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        removed.map_err(|e| Error::io(&path, e))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_lays_out_all_roots() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let roots = NamespaceRoots::create(temp.path()).expect("Failed to create roots");

        for kind in RootKind::ALL {
            assert!(roots.get(kind).is_dir(), "{kind:?} missing");
            assert!(roots.get(kind).ends_with(kind.dir_name()));
        }
        assert!(roots.work_dir.is_dir());
    }

    #[test]
    fn test_roots_are_disjoint() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let roots = NamespaceRoots::create(temp.path()).expect("Failed to create roots");

        for a in RootKind::ALL {
            for b in RootKind::ALL {
                if a != b {
                    assert!(!roots.get(a).starts_with(roots.get(b)));
                }
            }
        }
    }

    #[test]
    fn test_ensure_recreates_missing_root() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let roots = NamespaceRoots::create(temp.path()).expect("Failed to create roots");

        fs::remove_dir_all(&roots.final_dir).unwrap();
        roots.ensure(RootKind::Final).expect("Failed to ensure root");
        assert!(roots.final_dir.is_dir());
    }

    #[test]
    fn test_create_is_repeatable() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let first = NamespaceRoots::create(temp.path()).unwrap();
        fs::write(first.input_dir.join("keep.txt"), "x").unwrap();

        let second = NamespaceRoots::create(temp.path()).unwrap();
        assert!(second.input_dir.join("keep.txt").exists());
    }

    #[test]
    fn test_clear_dir_keeps_root_and_named_entry() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let roots = NamespaceRoots::create(temp.path()).unwrap();
        fs::create_dir_all(roots.intermediate_dir.join("pkg")).unwrap();
        fs::write(roots.intermediate_dir.join("pkg/A.class"), "a").unwrap();
        fs::write(roots.intermediate_dir.join("Hello.class"), "h").unwrap();

        clear_dir(&roots.intermediate_dir, Some("Hello.class")).unwrap();
        assert!(!roots.intermediate_dir.join("pkg").exists());
        assert!(roots.intermediate_dir.join("Hello.class").exists());

        clear_dir(&roots.intermediate_dir, None).unwrap();
        assert!(roots.intermediate_dir.is_dir());
        assert_eq!(fs::read_dir(&roots.intermediate_dir).unwrap().count(), 0);
    }
}
