use super::executor::ScriptExecutor;
use super::propagate;
use super::resources::{ResourceLookup, ScriptResources, GLUE_LIBRARY};
use crate::config::ScriptConfig;
use crate::errors::{BridgeError, RemoteError, Result};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, trace};

/// Asks the page whether the glue library's helpers are defined.
pub const GLUE_PRESENCE_CHECK: &str =
    "return (typeof isObject === 'function' && typeof throwNew === 'function');";

/// Whether the glue library has been defined in a session.
///
/// Moves from `NotInjected` to `Injected` once and never back. The page itself
/// is still checked on every injection request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GlueLibraryState {
    #[default]
    NotInjected,
    Injected,
}

/// One remote session: an executor plus the glue state that belongs to it.
pub struct ScriptSession<E: ScriptExecutor> {
    session_id: String,
    executor: E,
    glue_state: Mutex<GlueLibraryState>,
}

impl<E: ScriptExecutor> ScriptSession<E> {
    pub fn new(executor: E) -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            executor,
            glue_state: Mutex::new(GlueLibraryState::NotInjected),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub async fn glue_state(&self) -> GlueLibraryState {
        *self.glue_state.lock().await
    }
}

/// Runs scripts in remote sessions and manages the shared glue library.
pub struct ScriptBridge<R: ResourceLookup = ScriptResources> {
    resources: R,
    glue_library: String,
}

impl ScriptBridge<ScriptResources> {
    pub fn new() -> Self {
        Self::with_resources(ScriptResources::bundled())
    }

    pub fn from_config(config: &ScriptConfig) -> Self {
        let resources = match &config.script_dir {
            Some(dir) => ScriptResources::with_dir(dir),
            None => ScriptResources::bundled(),
        };
        Self::with_resources(resources).with_glue_library(config.glue_library.clone())
    }
}

impl Default for ScriptBridge<ScriptResources> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: ResourceLookup> ScriptBridge<R> {
    pub fn with_resources(resources: R) -> Self {
        Self {
            resources,
            glue_library: GLUE_LIBRARY.to_string(),
        }
    }

    pub fn with_glue_library(mut self, name: impl Into<String>) -> Self {
        self.glue_library = name.into();
        self
    }

    pub fn resources(&self) -> &R {
        &self.resources
    }

    pub fn get_script_resource(&self, name: &str) -> Result<String> {
        self.resources.script_text(name)
    }

    /// Execute a script for its side effects. Remote failures are returned as-is.
    pub async fn run<E: ScriptExecutor>(
        &self,
        session: &ScriptSession<E>,
        script: &str,
        args: &[Value],
    ) -> Result<()> {
        self.run_and_return(session, script, args).await?;
        Ok(())
    }

    /// Execute a script and hand back whatever it returned.
    pub async fn run_and_return<E: ScriptExecutor>(
        &self,
        session: &ScriptSession<E>,
        script: &str,
        args: &[Value],
    ) -> Result<Value> {
        debug!(
            session = %session.session_id,
            "Executing script with {} argument(s)",
            args.len()
        );
        let value = session.executor.execute_script(script, args).await?;
        Ok(value)
    }

    /// Define the glue library in the session unless the page already has it.
    ///
    /// The page is asked first, since loading a new document discards its
    /// globals. The session lock is held across the check and the definition
    /// call, so overlapping callers run the library script at most once.
    pub async fn inject_glue_lib<E: ScriptExecutor>(
        &self,
        session: &ScriptSession<E>,
    ) -> Result<()> {
        let mut state = session.glue_state.lock().await;

        let present = session.executor.execute_script(GLUE_PRESENCE_CHECK, &[]).await?;
        if present == Value::Bool(true) {
            trace!(session = %session.session_id, "Glue library already present");
            *state = GlueLibraryState::Injected;
            return Ok(());
        }

        if *state == GlueLibraryState::Injected {
            debug!(session = %session.session_id, "Glue library missing from page, redefining");
        }

        let source = self.get_script_resource(&self.glue_library)?;
        session.executor.execute_script(&source, &[]).await?;
        *state = GlueLibraryState::Injected;

        info!(
            session = %session.session_id,
            "Injected glue library {}",
            self.glue_library
        );
        Ok(())
    }

    /// See [`propagate::propagate`].
    pub fn propagate(err: RemoteError) -> BridgeError {
        propagate::propagate(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::resources::REQUIRE_META_TAG_BY_NAME;
    use crate::testing::{FakePage, ScriptedExecutor};
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn meta_tag_responder(script: &str, args: &[Value]) -> std::result::Result<Value, RemoteError> {
        if script.contains("getElementsByTagName('meta')") {
            let name = args[0].as_str().unwrap_or_default();
            return Err(RemoteError::javascript(format!(
                "{{\"kind\":\"NoSuchElement\",\"message\":\"No meta element found with name: {}\"}}",
                name
            )));
        }
        Ok(Value::Null)
    }

    #[tokio::test]
    async fn test_run_passes_script_and_arguments() {
        let bridge = ScriptBridge::new();
        let session = ScriptSession::new(ScriptedExecutor::returning(Value::Null));
        let script = "document.querySelector(arguments[0]).value = arguments[1];";

        bridge
            .run(&session, script, &[json!("#input"), json!("test")])
            .await
            .unwrap();

        let calls = session.executor().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].script, script);
        assert_eq!(calls[0].args, vec![json!("#input"), json!("test")]);
    }

    #[tokio::test]
    async fn test_run_and_return_hands_back_value() {
        let bridge = ScriptBridge::new();
        let session = ScriptSession::new(ScriptedExecutor::returning(json!("test")));

        let value = bridge
            .run_and_return(
                &session,
                "return document.querySelector(arguments[0]).value;",
                &[json!("#input")],
            )
            .await
            .unwrap();

        assert_eq!(value, json!("test"));
    }

    #[tokio::test]
    async fn test_run_does_not_decode_structured_failures() {
        let raised = RemoteError::javascript(r#"{"kind":"NoSuchElement","message":"gone"}"#);
        let expected = raised.clone();
        let bridge = ScriptBridge::new();
        let session = ScriptSession::new(ScriptedExecutor::new(move |_, _| Err(raised.clone())));

        match bridge.run(&session, "throwNew('NoSuchElement', 'gone');", &[]).await {
            Err(BridgeError::Remote(err)) => assert_eq!(err, expected),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_run_and_return_reports_timeouts_verbatim() {
        let bridge = ScriptBridge::new();
        let session = ScriptSession::new(ScriptedExecutor::new(|_, _| {
            Err(RemoteError::timeout("script timed out after 30000ms"))
        }));

        match bridge.run_and_return(&session, "while (true) {}", &[]).await {
            Err(BridgeError::Remote(err)) => {
                assert_eq!(err, RemoteError::timeout("script timed out after 30000ms"))
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_inject_glue_lib_runs_definition_once() {
        let bridge = ScriptBridge::new();
        let session = ScriptSession::new(FakePage::returning(Value::Null));
        let glue = bridge.get_script_resource(GLUE_LIBRARY).unwrap();

        assert_eq!(session.glue_state().await, GlueLibraryState::NotInjected);
        bridge.inject_glue_lib(&session).await.unwrap();
        bridge.inject_glue_lib(&session).await.unwrap();

        assert_eq!(session.glue_state().await, GlueLibraryState::Injected);
        assert_eq!(session.executor().count_script(&glue), 1);
        assert_eq!(session.executor().count_script(GLUE_PRESENCE_CHECK), 2);
    }

    #[tokio::test]
    async fn test_concurrent_injection_runs_definition_once() {
        let bridge = Arc::new(ScriptBridge::new());
        let session = Arc::new(ScriptSession::new(FakePage::returning(Value::Null)));
        let glue = bridge.get_script_resource(GLUE_LIBRARY).unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let bridge = bridge.clone();
            let session = session.clone();
            handles.push(tokio::spawn(async move {
                bridge.inject_glue_lib(&session).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(session.executor().count_script(&glue), 1);
    }

    #[tokio::test]
    async fn test_navigation_leads_to_redefinition() {
        let bridge = ScriptBridge::new();
        let session = ScriptSession::new(FakePage::new(|_, _| {
            Err(RemoteError::javascript(
                r#"{"kind":"NoSuchElement","message":"missing"}"#,
            ))
        }));
        let glue = bridge.get_script_resource(GLUE_LIBRARY).unwrap();

        bridge.inject_glue_lib(&session).await.unwrap();
        session.executor().navigate();
        bridge.inject_glue_lib(&session).await.unwrap();

        assert!(session.executor().has_glue());
        assert_eq!(session.glue_state().await, GlueLibraryState::Injected);
        assert_eq!(session.executor().count_script(&glue), 2);

        let err = bridge
            .run(&session, "throwNew('NoSuchElement', 'missing');", &[])
            .await
            .unwrap_err();
        match err {
            BridgeError::Remote(remote) => assert!(matches!(
                ScriptBridge::<ScriptResources>::propagate(remote),
                BridgeError::NoSuchElement(message) if message == "missing"
            )),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_library_already_in_page_is_not_redefined() {
        let bridge = ScriptBridge::new();
        let session = ScriptSession::new(FakePage::returning(Value::Null));
        session
            .executor()
            .execute_script("window.throwNew = function () {};", &[])
            .await
            .unwrap();
        let glue = bridge.get_script_resource(GLUE_LIBRARY).unwrap();

        bridge.inject_glue_lib(&session).await.unwrap();

        assert_eq!(session.glue_state().await, GlueLibraryState::Injected);
        assert_eq!(session.executor().count_script(&glue), 0);
    }

    #[tokio::test]
    async fn test_sessions_track_glue_independently() {
        let bridge = ScriptBridge::new();
        let first = ScriptSession::new(FakePage::returning(Value::Null));
        let second = ScriptSession::new(FakePage::returning(Value::Null));

        bridge.inject_glue_lib(&first).await.unwrap();

        assert_ne!(first.session_id(), second.session_id());
        assert_eq!(first.glue_state().await, GlueLibraryState::Injected);
        assert_eq!(second.glue_state().await, GlueLibraryState::NotInjected);
        assert!(second.executor().calls().is_empty());
    }

    #[tokio::test]
    async fn test_failed_injection_can_be_retried() {
        let bridge = ScriptBridge::new();
        let attempts = std::sync::atomic::AtomicUsize::new(0);
        let session = ScriptSession::new(ScriptedExecutor::new(move |_, _| {
            if attempts.fetch_add(1, std::sync::atomic::Ordering::SeqCst) == 0 {
                Err(RemoteError::transport("connection reset"))
            } else {
                Ok(Value::Null)
            }
        }));

        assert!(matches!(
            bridge.inject_glue_lib(&session).await,
            Err(BridgeError::Remote(_))
        ));
        assert_eq!(session.glue_state().await, GlueLibraryState::NotInjected);

        bridge.inject_glue_lib(&session).await.unwrap();
        assert_eq!(session.glue_state().await, GlueLibraryState::Injected);
        // failed check, then check plus definition
        assert_eq!(session.executor().calls().len(), 3);
    }

    #[tokio::test]
    async fn test_missing_glue_resource_is_fatal() {
        let bridge = ScriptBridge::with_resources(HashMap::<String, String>::new());
        let session = ScriptSession::new(FakePage::returning(Value::Null));

        assert!(matches!(
            bridge.inject_glue_lib(&session).await,
            Err(BridgeError::ResourceNotFound(name)) if name == GLUE_LIBRARY
        ));
        assert_eq!(session.executor().calls().len(), 1);
        assert!(!session.executor().has_glue());
        assert_eq!(session.glue_state().await, GlueLibraryState::NotInjected);
    }

    #[tokio::test]
    async fn test_meta_tag_failure_propagates_as_no_such_element() {
        let bridge = ScriptBridge::new();
        let session = ScriptSession::new(FakePage::new(meta_tag_responder));

        bridge.inject_glue_lib(&session).await.unwrap();
        let script = bridge.get_script_resource(REQUIRE_META_TAG_BY_NAME).unwrap();

        let err = bridge
            .run_and_return(&session, &script, &[json!("test")])
            .await
            .map_err(|e| match e {
                BridgeError::Remote(remote) => ScriptBridge::<ScriptResources>::propagate(remote),
                other => other,
            })
            .unwrap_err();

        match err {
            BridgeError::NoSuchElement(message) => {
                assert!(message.starts_with("No meta element found with name: "));
                assert_eq!(message, "No meta element found with name: test");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_from_config_uses_configured_glue_name() {
        let config = ScriptConfig {
            glue_library: "custom.js".to_string(),
            script_dir: None,
        };
        let bridge = ScriptBridge::from_config(&config);
        assert_eq!(bridge.glue_library, "custom.js");
        assert!(bridge.resources().script_dir().is_none());
    }
}
