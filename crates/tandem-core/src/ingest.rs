//! Source ingestion: materialize submitted text as the single source unit.

use std::fs;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::paths::{NamespaceRoots, RootKind, clear_dir};

/// Write `text` as `file_name` directly inside the input root.
///
/// Any other file left in the input root by an earlier run is removed so the
/// compiler always sees exactly one source unit.
pub fn ingest(roots: &NamespaceRoots, file_name: &str, text: &str) -> Result<PathBuf> {
    validate_file_name(file_name)?;

    let input = roots.ensure(RootKind::Input)?;
    clear_dir(input, Some(file_name))?;

    let path = input.join(file_name);
    fs::write(&path, text.as_bytes()).map_err(|e| Error::io(&path, e))?;

    tracing::debug!("Source unit written to {} ({} bytes)", path.display(), text.len());
    Ok(path)
}

fn validate_file_name(file_name: &str) -> Result<()> {
    let is_plain = !file_name.is_empty()
        && file_name != "."
        && file_name != ".."
        && !file_name.contains(['/', '\\', '\0']);
    if is_plain {
        Ok(())
    } else {
        Err(Error::Ingest(format!(
            "source file name '{file_name}' must be a plain file name"
        )))
    }
}
