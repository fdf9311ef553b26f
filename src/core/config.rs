//! Session configuration.
//!
//! Peers configure the engine at startup with a `SessionConfig`. Every peer
//! in a session must use the same policies, otherwise they may classify the
//! same notification differently.
//!
//! ```
//! use effect_scripts::core::{SessionConfig, TogglePolicy, TransferPolicy};
//!
//! let config = SessionConfig::from_toml_str(r#"
//!     transfer_policy = "legacy"
//!     restrict_permissions = true
//!
//!     [limits]
//!     max_operations = 5000
//! "#).unwrap();
//!
//! assert_eq!(config.transfer_policy, TransferPolicy::Legacy);
//! assert_eq!(config.toggle_policy, TogglePolicy::Combined);
//! assert_eq!(config.limits.max_operations, 5000);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How effects held by items reach their actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferPolicy {
    /// Effects stay on the item and apply through it. Creating or deleting
    /// the item creates or deletes its effects.
    #[default]
    Modern,

    /// Effects are copied onto the actor with the item as origin. Effects
    /// still held by an item never trigger.
    Legacy,
}

/// Which toggle triggers fire when an effect changes activity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TogglePolicy {
    /// `onEnable`/`onDisable` and `onToggle` all fire.
    #[default]
    Combined,

    /// `onEnable`/`onDisable` fire when present; `onToggle` only fires for
    /// effects without the matching specific script.
    Exclusive,
}

/// Resource limits applied to every script run.
///
/// Zero means unlimited, except for `max_call_levels` where it keeps the
/// interpreter's own recursion cap.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxLimits {
    /// Maximum interpreter operations before a script is aborted.
    /// This is the only guard against scripts that never finish.
    pub max_operations: u64,

    /// Maximum script function call depth. Zero keeps the interpreter's
    /// built-in cap.
    pub max_call_levels: usize,

    /// Maximum length of any string a script builds.
    pub max_string_size: usize,

    pub max_array_size: usize,
    pub max_map_size: usize,
}

impl Default for SandboxLimits {
    fn default() -> Self {
        Self {
            max_operations: 1_000_000,
            max_call_levels: 64,
            max_string_size: 1 << 20,
            max_array_size: 10_000,
            max_map_size: 10_000,
        }
    }
}

impl SandboxLimits {
    /// No size or operation limits. Call depth keeps the interpreter's cap.
    #[must_use]
    pub fn unlimited() -> Self {
        Self {
            max_operations: 0,
            max_call_levels: 0,
            max_string_size: 0,
            max_array_size: 0,
            max_map_size: 0,
        }
    }
}

/// Complete session configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub transfer_policy: TransferPolicy,
    pub toggle_policy: TogglePolicy,

    /// Only privileged users may add, change or remove scripts.
    pub restrict_permissions: bool,

    pub limits: SandboxLimits,
}

impl SessionConfig {
    /// Parse a configuration from TOML. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Set the transfer policy (builder pattern).
    #[must_use]
    pub fn with_transfer_policy(mut self, policy: TransferPolicy) -> Self {
        self.transfer_policy = policy;
        self
    }

    /// Set the toggle policy (builder pattern).
    #[must_use]
    pub fn with_toggle_policy(mut self, policy: TogglePolicy) -> Self {
        self.toggle_policy = policy;
        self
    }

    /// Restrict script editing to privileged users (builder pattern).
    #[must_use]
    pub fn with_restricted_permissions(mut self, restrict: bool) -> Self {
        self.restrict_permissions = restrict;
        self
    }

    /// Set sandbox limits (builder pattern).
    #[must_use]
    pub fn with_limits(mut self, limits: SandboxLimits) -> Self {
        self.limits = limits;
        self
    }
}
