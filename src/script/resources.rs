use crate::errors::{BridgeError, Result};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Resource name of the shared support library.
pub const GLUE_LIBRARY: &str = "glueLib.js";

/// Resource name of the meta-tag lookup script.
pub const REQUIRE_META_TAG_BY_NAME: &str = "requireMetaTagByName.js";

const BUNDLED: &[(&str, &str)] = &[
    (GLUE_LIBRARY, include_str!("../../resources/glueLib.js")),
    (
        REQUIRE_META_TAG_BY_NAME,
        include_str!("../../resources/requireMetaTagByName.js"),
    ),
];

/// Name-to-text lookup for script resources.
pub trait ResourceLookup: Send + Sync {
    /// Fails with [`BridgeError::ResourceNotFound`] for unknown names.
    fn script_text(&self, name: &str) -> Result<String>;
}

impl ResourceLookup for HashMap<String, String> {
    fn script_text(&self, name: &str) -> Result<String> {
        self.get(name)
            .cloned()
            .ok_or_else(|| BridgeError::ResourceNotFound(name.to_string()))
    }
}

/// Scripts compiled into the crate, optionally shadowed by a directory on disk.
#[derive(Debug, Clone, Default)]
pub struct ScriptResources {
    script_dir: Option<PathBuf>,
}

impl ScriptResources {
    pub fn bundled() -> Self {
        Self { script_dir: None }
    }

    pub fn with_dir(script_dir: impl Into<PathBuf>) -> Self {
        Self {
            script_dir: Some(script_dir.into()),
        }
    }

    pub fn script_dir(&self) -> Option<&Path> {
        self.script_dir.as_deref()
    }

    fn bundled_text(name: &str) -> Option<&'static str> {
        BUNDLED
            .iter()
            .find(|(bundled, _)| *bundled == name)
            .map(|(_, text)| *text)
    }
}

// Only plain relative names resolve; nothing may climb out of the script dir.
fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && Path::new(name)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}

impl ResourceLookup for ScriptResources {
    fn script_text(&self, name: &str) -> Result<String> {
        if !is_plain_name(name) {
            return Err(BridgeError::ResourceNotFound(name.to_string()));
        }

        if let Some(dir) = &self.script_dir {
            let path = dir.join(name);
            if path.is_file() {
                debug!("Loading script resource {} from {}", name, path.display());
                return Ok(std::fs::read_to_string(path)?);
            }
        }

        Self::bundled_text(name)
            .map(|text| {
                debug!("Loading bundled script resource {}", name);
                text.to_string()
            })
            .ok_or_else(|| BridgeError::ResourceNotFound(name.to_string()))
    }
}
