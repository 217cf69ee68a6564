pub mod browser;
pub mod config;
pub mod errors;
pub mod locator;
pub mod script;
pub mod testing;

pub use browser::{ChromeBrowser, ChromeTab};
pub use config::{BridgeConfig, BrowserConfig, ScriptConfig, Viewport};
pub use errors::{BridgeError, RemoteError, RemoteErrorKind, Result};
pub use locator::{
    css_locator_for, translate, xpath_locator_for, Locator, LocatorSource, SelectorLanguage,
    Strategy,
};
pub use script::{
    propagate, GlueLibraryState, GluePayload, ResourceLookup, ScriptBridge, ScriptExecutor,
    ScriptResources, ScriptSession,
};
