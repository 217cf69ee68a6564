use crate::errors::{BridgeError, Result};
use crate::script::GLUE_LIBRARY;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub browser: BrowserConfig,
    pub scripts: ScriptConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub headless: bool,
    pub viewport: Viewport,
    pub user_agent: Option<String>,
    pub args: Vec<String>,
    pub script_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptConfig {
    /// Resource name of the glue library.
    pub glue_library: String,
    /// Directory searched before the bundled scripts.
    pub script_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl BridgeConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: BridgeConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.browser.script_timeout_ms == 0 {
            return Err(BridgeError::ConfigurationError(
                "browser.script_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.scripts.glue_library.trim().is_empty() {
            return Err(BridgeError::ConfigurationError(
                "scripts.glue_library must name a resource".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport: Viewport::default(),
            user_agent: None,
            args: vec![],
            script_timeout_ms: 30000,
        }
    }
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            glue_library: GLUE_LIBRARY.to_string(),
            script_dir: None,
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}
