use crate::errors::RemoteError;
use crate::script::{ScriptExecutor, GLUE_PRESENCE_CHECK};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

type Responder = dyn Fn(&str, &[Value]) -> Result<Value, RemoteError> + Send + Sync;

/// A script call observed by [`ScriptedExecutor`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub script: String,
    pub args: Vec<Value>,
}

/// In-process executor that records every call and answers from a responder.
pub struct ScriptedExecutor {
    responder: Box<Responder>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedExecutor {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&str, &[Value]) -> Result<Value, RemoteError> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answers every call with `value`.
    pub fn returning(value: Value) -> Self {
        Self::new(move |_, _| Ok(value.clone()))
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    /// Number of calls whose script text equals `script`.
    pub fn count_script(&self, script: &str) -> usize {
        self.calls().iter().filter(|c| c.script == script).count()
    }

    fn record(&self, script: &str, args: &[Value]) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                script: script.to_string(),
                args: args.to_vec(),
            });
        }
    }
}

#[async_trait]
impl ScriptExecutor for ScriptedExecutor {
    async fn execute_script(&self, script: &str, args: &[Value]) -> Result<Value, RemoteError> {
        self.record(script, args);
        (self.responder)(script, args)
    }
}

/// Executor double with page-like globals.
///
/// A script that assigns `throwNew` defines the glue globals, [`FakePage::navigate`]
/// clears them, and calling `throwNew` without them fails the way a browser does.
/// Everything else goes to the responder.
pub struct FakePage {
    scripted: ScriptedExecutor,
    glue_defined: AtomicBool,
}

impl FakePage {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&str, &[Value]) -> Result<Value, RemoteError> + Send + Sync + 'static,
    {
        Self {
            scripted: ScriptedExecutor::new(responder),
            glue_defined: AtomicBool::new(false),
        }
    }

    pub fn returning(value: Value) -> Self {
        Self::new(move |_, _| Ok(value.clone()))
    }

    /// Load a new document; page globals are gone afterwards.
    pub fn navigate(&self) {
        self.glue_defined.store(false, Ordering::SeqCst);
    }

    pub fn has_glue(&self) -> bool {
        self.glue_defined.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.scripted.calls()
    }

    pub fn count_script(&self, script: &str) -> usize {
        self.scripted.count_script(script)
    }
}

#[async_trait]
impl ScriptExecutor for FakePage {
    async fn execute_script(&self, script: &str, args: &[Value]) -> Result<Value, RemoteError> {
        if script == GLUE_PRESENCE_CHECK {
            self.scripted.record(script, args);
            return Ok(Value::Bool(self.has_glue()));
        }
        if script.contains("throwNew = function") {
            self.scripted.record(script, args);
            self.glue_defined.store(true, Ordering::SeqCst);
            return Ok(Value::Null);
        }
        if script.contains("throwNew(") && !self.has_glue() {
            self.scripted.record(script, args);
            return Err(RemoteError::javascript("throwNew is not defined"));
        }
        self.scripted.execute_script(script, args).await
    }
}
