pub mod bridge;
pub mod executor;
pub mod propagate;
pub mod resources;

pub use bridge::{GlueLibraryState, ScriptBridge, ScriptSession, GLUE_PRESENCE_CHECK};
pub use executor::ScriptExecutor;
pub use propagate::{propagate, GluePayload};
pub use resources::{ResourceLookup, ScriptResources, GLUE_LIBRARY, REQUIRE_META_TAG_BY_NAME};
