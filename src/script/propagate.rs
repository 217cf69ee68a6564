use crate::errors::{BridgeError, RemoteError, RemoteErrorKind};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Label the remote environment may put in front of a raised error's message.
const ERROR_LABEL: &str = "Error:";

type Reconstruct = fn(String) -> BridgeError;

/// Payload kinds that map onto a local error. Add a row to recognize a new kind.
const PROPAGATED_KINDS: &[(&str, Reconstruct)] = &[
    ("NoSuchElement", BridgeError::NoSuchElement),
    ("StaleElementReference", BridgeError::StaleElementReference),
    ("InvalidArgument", BridgeError::InvalidArgument),
    ("InvalidElementState", BridgeError::InvalidElementState),
    ("ElementNotInteractable", BridgeError::ElementNotInteractable),
    ("Timeout", BridgeError::Timeout),
    ("UnsupportedOperation", BridgeError::UnsupportedOperation),
];

/// The `{kind, message}` envelope raised by the glue library's `throwNew`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GluePayload {
    pub kind: String,
    pub message: String,
}

impl GluePayload {
    /// Extract an envelope from a script-raised failure.
    ///
    /// Timeouts and transport failures never carry one. Trailing text after
    /// the JSON object (a stack trace, for instance) is ignored.
    pub fn decode(err: &RemoteError) -> Option<GluePayload> {
        if err.kind != RemoteErrorKind::Javascript {
            return None;
        }

        let text = err.message.trim_start();
        let text = text.strip_prefix(ERROR_LABEL).unwrap_or(text).trim_start();
        if !text.starts_with('{') {
            return None;
        }

        serde_json::Deserializer::from_str(text)
            .into_iter::<GluePayload>()
            .next()
            .and_then(|parsed| parsed.ok())
    }

    pub fn is_recognized(&self) -> bool {
        PROPAGATED_KINDS.iter().any(|(kind, _)| *kind == self.kind)
    }
}

/// Turn a remote failure into the local error it encodes.
///
/// Failures without a recognized payload come back as `BridgeError::Remote`
/// holding the original error untouched.
pub fn propagate(err: RemoteError) -> BridgeError {
    let Some(payload) = GluePayload::decode(&err) else {
        return BridgeError::Remote(err);
    };

    match PROPAGATED_KINDS
        .iter()
        .find(|(kind, _)| *kind == payload.kind)
    {
        Some((kind, reconstruct)) => {
            debug!("Propagating remote {} failure", kind);
            reconstruct(payload.message)
        }
        None => BridgeError::Remote(err),
    }
}
