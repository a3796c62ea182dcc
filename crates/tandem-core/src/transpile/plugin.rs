//! Capability plugins installed into the backend engine.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};

/// A named bundle of intrinsics the backend engine gains when installed.
pub trait CapabilityPlugin: Send + Sync {
    fn name(&self) -> &str;

    /// Intrinsics this plugin contributes. Must not overlap with any other
    /// installed plugin.
    fn intrinsics(&self) -> &[&str];
}

/// Host interop: native bindings declared in source and the object model
/// behind them.
#[derive(Debug, Clone, Copy, Default)]
pub struct InteropBindingPlugin;

impl CapabilityPlugin for InteropBindingPlugin {
    fn name(&self) -> &str {
        "interop-binding"
    }

    fn intrinsics(&self) -> &[&str] {
        &[
            "jso.JSBody",
            "jso.JSObject.cast",
            "jso.JSFunctor",
            "jso.JSProperty",
            "jso.JSIndexer",
        ]
    }
}

/// Low-level platform services: object identity, cloning, threads, async.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlatformApiPlugin;

impl CapabilityPlugin for PlatformApiPlugin {
    fn name(&self) -> &str {
        "platform-api"
    }

    fn intrinsics(&self) -> &[&str] {
        &[
            "platform.Platform.getPlatformObject",
            "platform.Platform.clone",
            "platform.Platform.startThread",
            "platform.Platform.schedule",
            "platform.async.AsyncCallback",
        ]
    }
}

/// Replacement standard library hooks.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeLibraryPlugin;

impl CapabilityPlugin for RuntimeLibraryPlugin {
    fn name(&self) -> &str {
        "runtime-library"
    }

    fn intrinsics(&self) -> &[&str] {
        &[
            "classlib.ServiceLoader.load",
            "classlib.Class.getEnumConstants",
            "classlib.Locale.defaults",
            "classlib.String.intern",
        ]
    }
}

/// Serializable view of an installed plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginDescriptor {
    pub name: String,
    pub intrinsics: Vec<String>,
}

/// Ordered set of installed plugins with exclusive intrinsic ownership.
#[derive(Default)]
pub struct PluginSet {
    plugins: Vec<Box<dyn CapabilityPlugin>>,
    owners: BTreeMap<String, String>,
}

impl PluginSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interop-binding, platform-API, runtime-library, in that order.
    pub fn standard() -> Result<Self> {
        let mut set = Self::new();
        set.install(Box::new(InteropBindingPlugin))?;
        set.install(Box::new(PlatformApiPlugin))?;
        set.install(Box::new(RuntimeLibraryPlugin))?;
        Ok(set)
    }

    /// Install a plugin after those already present.
    ///
    /// Fails with [`Error::PluginConflict`] if any of its intrinsics is
    /// already owned; the set is left unchanged in that case.
    pub fn install(&mut self, plugin: Box<dyn CapabilityPlugin>) -> Result<()> {
        for intrinsic in plugin.intrinsics() {
            if let Some(owner) = self.owner_of(intrinsic) {
                return Err(Error::PluginConflict {
                    plugin: plugin.name().to_string(),
                    intrinsic: intrinsic.to_string(),
                    owner: owner.to_string(),
                });
            }
        }

        for intrinsic in plugin.intrinsics() {
            self.owners
                .insert(intrinsic.to_string(), plugin.name().to_string());
        }
        tracing::debug!(
            "Installed plugin {} ({} intrinsics)",
            plugin.name(),
            plugin.intrinsics().len()
        );
        self.plugins.push(plugin);
        Ok(())
    }

    /// Plugin names in install order.
    pub fn names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    /// Which plugin contributes `intrinsic`.
    fn owner_of(&self, intrinsic: &str) -> Option<&str> {
        self.owners.get(intrinsic).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    pub fn descriptors(&self) -> Vec<PluginDescriptor> {
        self.plugins
            .iter()
            .map(|p| PluginDescriptor {
                name: p.name().to_string(),
                intrinsics: p.intrinsics().iter().map(|i| i.to_string()).collect(),
            })
            .collect()
    }
}

impl fmt::Debug for PluginSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginSet")
            .field("plugins", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Custom {
        name: &'static str,
        intrinsics: Vec<&'static str>,
    }

    impl CapabilityPlugin for Custom {
        fn name(&self) -> &str {
            self.name
        }

        fn intrinsics(&self) -> &[&str] {
            &self.intrinsics
        }
    }

    #[test]
    fn test_standard_order() {
        let set = PluginSet::standard().unwrap();
        assert_eq!(
            set.names(),
            vec!["interop-binding", "platform-api", "runtime-library"]
        );
        assert_eq!(set.owner_of("jso.JSBody"), Some("interop-binding"));
        assert_eq!(set.owner_of("classlib.String.intern"), Some("runtime-library"));
    }

    #[test]
    fn test_overlap_is_rejected() {
        let mut set = PluginSet::standard().unwrap();
        let err = set
            .install(Box::new(Custom {
                name: "shadow",
                intrinsics: vec!["extra.Unique", "platform.Platform.clone"],
            }))
            .unwrap_err();

        match err {
            Error::PluginConflict {
                plugin,
                intrinsic,
                owner,
            } => {
                assert_eq!(plugin, "shadow");
                assert_eq!(intrinsic, "platform.Platform.clone");
                assert_eq!(owner, "platform-api");
            }
            other => panic!("expected PluginConflict, got {other:?}"),
        }

        // Nothing from the rejected plugin is kept.
        assert_eq!(set.len(), 3);
        assert_eq!(set.owner_of("extra.Unique"), None);
    }

    #[test]
    fn test_disjoint_plugin_is_accepted() {
        let mut set = PluginSet::standard().unwrap();
        set.install(Box::new(Custom {
            name: "metrics",
            intrinsics: vec!["metrics.counter"],
        }))
        .unwrap();

        let descriptors = set.descriptors();
        assert_eq!(descriptors.len(), 4);
        assert_eq!(descriptors[3].intrinsics, vec!["metrics.counter".to_string()]);
    }
}
