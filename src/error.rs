//! Error types.
//!
//! Script errors stop at the component that detects them: the runner returns
//! them as values and the dispatcher records them in its report. Nothing here
//! unwinds across a notification.

use thiserror::Error;

use crate::core::{EffectId, UserId};
use crate::scripts::TriggerType;

/// Errors from storing, compiling or running effect scripts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    /// The effect has no script for this trigger.
    #[error("{effect} has no {trigger} script")]
    MissingScript { effect: EffectId, trigger: TriggerType },

    /// Attempted to store empty script text.
    #[error("no script text provided for {trigger}")]
    EmptyScript { trigger: TriggerType },

    #[error("unknown effect {0}")]
    UnknownEffect(EffectId),

    /// Script editing is restricted to privileged users.
    #[error("{user} may not edit effect scripts")]
    PermissionDenied { user: UserId },

    #[error("{trigger} script on {effect} does not compile: {message}")]
    Compile {
        effect: EffectId,
        trigger: TriggerType,
        message: String,
    },

    /// The script raised an error or exceeded a sandbox limit.
    #[error("{trigger} script on {effect} failed: {message}")]
    Runtime {
        effect: EffectId,
        trigger: TriggerType,
        message: String,
    },

    /// A document could not be converted into a script value.
    #[error("cannot expose {name} to scripts: {message}")]
    Binding { name: String, message: String },
}

/// Errors from loading a [`SessionConfig`](crate::core::SessionConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid session config: {0}")]
    Parse(#[from] toml::de::Error),
}
