use crate::errors::RemoteError;
use async_trait::async_trait;
use serde_json::Value;

/// Remote script execution capability.
///
/// `args` are exposed to the script as `arguments[0..]` and the script's
/// `return` value comes back as JSON. A script that raises surfaces as a
/// [`RemoteError`] of kind `Javascript`.
#[async_trait]
pub trait ScriptExecutor: Send + Sync {
    async fn execute_script(
        &self,
        script: &str,
        args: &[Value],
    ) -> std::result::Result<Value, RemoteError>;
}

#[async_trait]
impl<E: ScriptExecutor + ?Sized> ScriptExecutor for std::sync::Arc<E> {
    async fn execute_script(
        &self,
        script: &str,
        args: &[Value],
    ) -> std::result::Result<Value, RemoteError> {
        (**self).execute_script(script, args).await
    }
}
