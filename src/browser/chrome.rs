use crate::config::BrowserConfig;
use crate::errors::{BridgeError, RemoteError, Result};
use crate::script::ScriptExecutor;
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions, Tab};
use serde::Deserialize;
use serde_json::Value;
use std::ffi::OsStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Chrome process driven over the DevTools protocol.
///
/// Tabs created from it stop working once it is dropped.
pub struct ChromeBrowser {
    browser: Browser,
    script_timeout: Duration,
}

impl ChromeBrowser {
    pub fn launch(config: &BrowserConfig) -> Result<Self> {
        let window_size_arg = format!(
            "--window-size={},{}",
            config.viewport.width, config.viewport.height
        );

        let user_agent_arg = config
            .user_agent
            .as_ref()
            .map(|ua| format!("--user-agent={}", ua));

        let mut args = vec![
            OsStr::new("--no-sandbox"),
            OsStr::new("--disable-dev-shm-usage"),
            OsStr::new(&window_size_arg),
        ];

        if let Some(ref ua_arg) = user_agent_arg {
            args.push(OsStr::new(ua_arg));
        }

        for arg in &config.args {
            args.push(OsStr::new(arg));
        }

        let launch_options = LaunchOptions::default_builder()
            .headless(config.headless)
            .args(args)
            .build()
            .map_err(|e| BridgeError::LaunchFailed(e.to_string()))?;

        let browser =
            Browser::new(launch_options).map_err(|e| BridgeError::LaunchFailed(e.to_string()))?;

        Ok(Self {
            browser,
            script_timeout: Duration::from_millis(config.script_timeout_ms),
        })
    }

    pub fn new_tab(&self) -> Result<ChromeTab> {
        let tab = self
            .browser
            .new_tab()
            .map_err(|e| BridgeError::LaunchFailed(e.to_string()))?;

        // Bounds the blocking CDP call itself, which outlives an expired
        // async timeout in `execute_script`.
        tab.set_default_timeout(self.script_timeout);

        Ok(ChromeTab {
            tab,
            script_timeout: self.script_timeout,
        })
    }
}

/// A single tab; one remote script session.
pub struct ChromeTab {
    tab: Arc<Tab>,
    script_timeout: Duration,
}

impl ChromeTab {
    /// Load `url`. The new document starts without any injected globals.
    pub fn navigate(&self, url: &str) -> Result<()> {
        self.tab
            .navigate_to(url)
            .map_err(|e| BridgeError::NavigationFailed(e.to_string()))?;

        self.tab
            .wait_until_navigated()
            .map_err(|e| BridgeError::NavigationFailed(e.to_string()))?;

        Ok(())
    }

    pub fn url(&self) -> String {
        self.tab.get_url()
    }
}

#[async_trait]
impl ScriptExecutor for ChromeTab {
    async fn execute_script(
        &self,
        script: &str,
        args: &[Value],
    ) -> std::result::Result<Value, RemoteError> {
        let expression = wrap_script(script, args)?;
        let tab = Arc::clone(&self.tab);

        debug!("Evaluating script in {}", tab.get_url());
        let call = tokio::task::spawn_blocking(move || tab.evaluate(&expression, false));

        // On expiry the blocking evaluate is abandoned, not cancelled. It ends
        // on the blocking pool within the tab's default timeout and its result
        // is dropped.
        let object = match tokio::time::timeout(self.script_timeout, call).await {
            Err(_) => {
                return Err(RemoteError::timeout(format!(
                    "script did not complete within {}ms",
                    self.script_timeout.as_millis()
                )))
            }
            Ok(Err(join_error)) => return Err(RemoteError::transport(join_error.to_string())),
            Ok(Ok(evaluated)) => evaluated.map_err(|e| RemoteError::transport(e.to_string()))?,
        };

        decode_outcome(object.value, object.description)
    }
}

/// What the in-page wrapper reports back, serialized as a JSON string.
#[derive(Debug, Deserialize)]
struct ScriptOutcome {
    ok: bool,
    #[serde(default)]
    value: Value,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    marshalling: bool,
}

// The script body becomes an anonymous function applied to the arguments.
// Exceptions are caught in the page so their message survives the trip back,
// and results that JSON would silently flatten (DOM nodes, windows) are refused.
fn wrap_script(script: &str, args: &[Value]) -> std::result::Result<String, RemoteError> {
    let args_json = serde_json::to_string(args)
        .map_err(|e| RemoteError::transport(format!("unserializable arguments: {}", e)))?;

    Ok(format!(
        r#"(function() {{
    var refused = {{}};
    function marshal(key, v) {{
        if ((typeof Node !== 'undefined' && v instanceof Node) ||
            (typeof Window !== 'undefined' && v instanceof Window)) {{
            refused.path = key;
            throw refused;
        }}
        return v;
    }}
    var value;
    try {{
        value = (function() {{
{}
        }}).apply(null, {});
    }} catch (e) {{
        var message = (e && e.message !== undefined) ? String(e.message) : String(e);
        return JSON.stringify({{ ok: false, message: message }});
    }}
    try {{
        return JSON.stringify({{ ok: true, value: value === undefined ? null : value }}, marshal);
    }} catch (e) {{
        var detail = (e === refused)
            ? 'a DOM node or window' + (refused.path && refused.path !== 'value' ? ' at "' + refused.path + '"' : '')
            : ((e && e.message !== undefined) ? String(e.message) : String(e));
        return JSON.stringify({{ ok: false, marshalling: true, message: 'script result cannot be returned: ' + detail }});
    }}
}})()"#,
        script, args_json
    ))
}

fn decode_outcome(
    value: Option<Value>,
    description: Option<String>,
) -> std::result::Result<Value, RemoteError> {
    match value {
        Some(Value::String(text)) => {
            let outcome: ScriptOutcome = serde_json::from_str(&text).map_err(|e| {
                RemoteError::transport(format!("unreadable script outcome: {}", e))
            })?;
            let message = outcome.message.unwrap_or_default();
            match (outcome.ok, outcome.marshalling) {
                (true, _) => Ok(outcome.value),
                (false, true) => Err(RemoteError::marshalling(message)),
                (false, false) => Err(RemoteError::javascript(message)),
            }
        }
        // The wrapper itself failed, typically a syntax error in the script body.
        _ => Err(RemoteError::javascript(
            description.unwrap_or_else(|| "script produced no result".to_string()),
        )),
    }
}
