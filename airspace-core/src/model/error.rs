//! Errors raised while assembling or evaluating a constraint model.

use thiserror::Error;

use super::{VariableId, VariableKey};

/// Errors returned by the model IR.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// A strict declaration hit a key that already exists.
    #[error("variable {key} is already declared")]
    VariableKeyCollision {
        /// The colliding key.
        key: VariableKey,
    },
    /// A key was looked up that this model never declared.
    #[error("variable {key} is not part of the model")]
    UnknownKey {
        /// The missing key.
        key: VariableKey,
    },
    /// A handle does not belong to this model.
    #[error("variable handle {id} is not part of the model")]
    UnknownVariable {
        /// The foreign handle.
        id: VariableId,
    },
}
