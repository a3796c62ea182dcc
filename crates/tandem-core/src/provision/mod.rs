//! Resource provisioning.
//!
//! Fills the runtime root from the archive bundled with the application and
//! the library root from an archive fetched over the network. No
//! translation may start before both have completed.

mod archive;
mod fetch;

use std::borrow::Cow;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::paths::{NamespaceRoots, RootKind};

pub use archive::{UnpackSummary, unpack};
pub use fetch::{ArchiveFetcher, HttpFetcher};

/// Where the bundled runtime archive comes from.
#[derive(Debug, Clone)]
pub enum RuntimeArchive {
    /// Compiled into the binary with `include_bytes!`.
    Embedded(&'static [u8]),
    /// Shipped next to the application.
    File(PathBuf),
}

impl RuntimeArchive {
    fn load(&self) -> Result<Cow<'static, [u8]>> {
        match self {
            Self::Embedded(bytes) => Ok(Cow::Borrowed(bytes)),
            Self::File(path) => std::fs::read(path)
                .map(Cow::Owned)
                .map_err(|e| Error::io(path, e)),
        }
    }
}

/// Fills the runtime and library roots.
pub struct Provisioner {
    runtime: RuntimeArchive,
    fetcher: Arc<dyn ArchiveFetcher>,
    timeout: Duration,
}

impl Provisioner {
    pub fn new(runtime: RuntimeArchive, fetcher: Arc<dyn ArchiveFetcher>, timeout: Duration) -> Self {
        Self {
            runtime,
            fetcher,
            timeout,
        }
    }

    /// Unpack the bundled runtime archive into the runtime root.
    ///
    /// Safe to call repeatedly; each call leaves the same tree.
    pub fn provision_runtime(&self, roots: &NamespaceRoots) -> Result<UnpackSummary> {
        let dest = roots.ensure(RootKind::Runtime)?;
        let bytes = self.runtime.load()?;
        let summary = unpack(&bytes, dest)?;
        tracing::info!(
            "Runtime provisioned: {} files, {} bytes",
            summary.files,
            summary.bytes
        );
        Ok(summary)
    }

    /// Fetch the library archive from `url` and unpack it into the library root.
    pub async fn provision_library(&self, roots: &NamespaceRoots, url: &str) -> Result<UnpackSummary> {
        let dest = roots.ensure(RootKind::Library)?;

        let bytes = tokio::time::timeout(self.timeout, self.fetcher.fetch(url))
            .await
            .map_err(|_| Error::Fetch {
                url: url.to_string(),
                message: format!("timed out after {:?}", self.timeout),
            })??;

        let summary = unpack(&bytes, dest)?;
        tracing::info!(
            "Library provisioned from {}: {} files, {} bytes",
            url,
            summary.files,
            summary.bytes
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Write};

    use futures::future::BoxFuture;
    use tempfile::TempDir;
    use walkdir::WalkDir;
    use zip::write::SimpleFileOptions;

    use super::*;

    struct StaticFetcher(Vec<u8>);

    impl ArchiveFetcher for StaticFetcher {
        fn fetch<'a>(&'a self, _url: &'a str) -> BoxFuture<'a, Result<Vec<u8>>> {
            Box::pin(async move { Ok(self.0.clone()) })
        }
    }

    struct StalledFetcher;

    impl ArchiveFetcher for StalledFetcher {
        fn fetch<'a>(&'a self, _url: &'a str) -> BoxFuture<'a, Result<Vec<u8>>> {
            Box::pin(futures::future::pending())
        }
    }

    fn runtime_zip() -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        writer.add_directory("java/lang/", options).unwrap();
        writer.start_file("java/lang/Object.class", options).unwrap();
        writer.write_all(b"object").unwrap();
        writer.start_file("java/lang/String.class", options).unwrap();
        writer.write_all(b"string").unwrap();
        writer.finish().unwrap().into_inner()
    }

    fn snapshot(root: &std::path::Path) -> Vec<(PathBuf, Vec<u8>)> {
        let mut files: Vec<_> = WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                let rel = e.path().strip_prefix(root).unwrap().to_path_buf();
                (rel, std::fs::read(e.path()).unwrap())
            })
            .collect();
        files.sort();
        files
    }

    fn provisioner(runtime: Vec<u8>, fetcher: Arc<dyn ArchiveFetcher>) -> Provisioner {
        let leaked: &'static [u8] = Box::leak(runtime.into_boxed_slice());
        Provisioner::new(
            RuntimeArchive::Embedded(leaked),
            fetcher,
            Duration::from_secs(5),
        )
    }

    #[test]
    fn test_provision_runtime_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let roots = NamespaceRoots::create(temp.path()).unwrap();
        let provisioner = provisioner(runtime_zip(), Arc::new(StaticFetcher(Vec::new())));

        provisioner.provision_runtime(&roots).unwrap();
        let once = snapshot(&roots.runtime_dir);

        provisioner.provision_runtime(&roots).unwrap();
        let twice = snapshot(&roots.runtime_dir);

        assert_eq!(once.len(), 2);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_missing_runtime_file_is_io_error() {
        let temp = TempDir::new().unwrap();
        let roots = NamespaceRoots::create(temp.path()).unwrap();
        let provisioner = Provisioner::new(
            RuntimeArchive::File(temp.path().join("absent.zip")),
            Arc::new(StaticFetcher(Vec::new())),
            Duration::from_secs(5),
        );

        let err = provisioner.provision_runtime(&roots).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[tokio::test]
    async fn test_provision_library_unpacks_fetched_bytes() {
        let temp = TempDir::new().unwrap();
        let roots = NamespaceRoots::create(temp.path()).unwrap();
        let provisioner = provisioner(Vec::new(), Arc::new(StaticFetcher(runtime_zip())));

        let summary = provisioner
            .provision_library(&roots, "http://example.invalid/classlib.zip")
            .await
            .unwrap();

        assert_eq!(summary.files, 2);
        assert!(roots.library_dir.join("java/lang/String.class").is_file());
    }

    #[tokio::test]
    async fn test_stalled_fetch_times_out() {
        let temp = TempDir::new().unwrap();
        let roots = NamespaceRoots::create(temp.path()).unwrap();
        let provisioner = Provisioner::new(
            RuntimeArchive::Embedded(&[]),
            Arc::new(StalledFetcher),
            Duration::from_millis(20),
        );

        let err = provisioner
            .provision_library(&roots, "http://example.invalid/classlib.zip")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Fetch { .. }));
    }

    #[tokio::test]
    async fn test_fetched_garbage_is_archive_error() {
        let temp = TempDir::new().unwrap();
        let roots = NamespaceRoots::create(temp.path()).unwrap();
        let provisioner = provisioner(Vec::new(), Arc::new(StaticFetcher(b"<html>404</html>".to_vec())));

        let err = provisioner
            .provision_library(&roots, "http://example.invalid/classlib.zip")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Archive(_)));
    }
}
