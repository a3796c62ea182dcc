//! Class lookup over the intermediate and library roots.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::RemappingConfig;

/// Rewrites platform class names to the backend's replacement classes.
///
/// With the default settings `java.lang.String` resolves as
/// `org.teavm.classlib.java.lang.TString`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameRemapping {
    pub package: String,
    pub package_prefix: String,
    pub class_prefix: String,
}

impl NameRemapping {
    /// Map a binary class name. Names outside the remapped package are
    /// returned unchanged.
    pub fn map(&self, class_name: &str) -> String {
        let in_package = class_name
            .strip_prefix(self.package.as_str())
            .is_some_and(|rest| rest.starts_with('.'));
        if !in_package {
            return class_name.to_string();
        }

        let (package, simple) = match class_name.rsplit_once('.') {
            Some((package, simple)) => (package, simple),
            None => return class_name.to_string(),
        };
        format!(
            "{}.{}.{}{}",
            self.package_prefix, package, self.class_prefix, simple
        )
    }
}

impl From<&RemappingConfig> for NameRemapping {
    fn from(config: &RemappingConfig) -> Self {
        Self {
            package: config.package.clone(),
            package_prefix: config.package_prefix.clone(),
            class_prefix: config.class_prefix.clone(),
        }
    }
}

/// Relative `.class` path of a binary class name.
pub fn class_file_path(class_name: &str) -> PathBuf {
    PathBuf::from(format!("{}.class", class_name.replace('.', "/")))
}

/// Anything that can answer "where is this class file".
pub trait ClassSource {
    fn locate(&self, class_name: &str) -> Option<PathBuf>;
}

/// A directory of class files, optionally read through a [`NameRemapping`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryClassSource {
    pub root: PathBuf,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub remapping: Option<NameRemapping>,
}

impl DirectoryClassSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            remapping: None,
        }
    }

    pub fn remapped(root: impl Into<PathBuf>, remapping: NameRemapping) -> Self {
        Self {
            root: root.into(),
            remapping: Some(remapping),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ClassSource for DirectoryClassSource {
    fn locate(&self, class_name: &str) -> Option<PathBuf> {
        let name = match &self.remapping {
            Some(remapping) => remapping.map(class_name),
            None => class_name.to_string(),
        };
        let path = self.root.join(class_file_path(&name));
        path.is_file().then_some(path)
    }
}

/// Ordered union of class sources. The first source holding a class wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CompositeClassSource {
    sources: Vec<DirectoryClassSource>,
}

impl CompositeClassSource {
    pub fn new(sources: Vec<DirectoryClassSource>) -> Self {
        Self { sources }
    }

    pub fn sources(&self) -> &[DirectoryClassSource] {
        &self.sources
    }
}

impl ClassSource for CompositeClassSource {
    fn locate(&self, class_name: &str) -> Option<PathBuf> {
        self.sources
            .iter()
            .find_map(|source| source.locate(class_name))
    }
}
