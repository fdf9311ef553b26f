//! # effect-scripts
//!
//! Runs user-authored scripts attached to status effects, exactly once per
//! qualifying state change, across many peers observing the same session.
//!
//! ## Design Principles
//!
//! 1. **Every peer sees everything**: all peers receive every change
//!    notification and classify it identically. No peer coordinates with
//!    another.
//!
//! 2. **Deterministic election**: the user responsible for an actor's
//!    scripts is a pure function of the world, so exactly one peer runs
//!    each script while that user stays connected.
//!
//! 3. **Pure classification**: triggers are derived from explicit
//!    before/after snapshots carried by the notification, never from state
//!    threaded through update options.
//!
//! 4. **Isolated scripts**: scripts see a fixed set of bindings, run under
//!    resource limits and report failures as values.
//!
//! ## Architecture
//!
//! ```text
//! Notification -> TriggerClassifier (+ CombatTracker) -> [FiredTrigger]
//!              -> Dispatcher (executor election) -> ScriptRunner
//! ```
//!
//! - **Persistent Data Structures**: worlds are `im-rs` maps, so every
//!   notification can carry full before/after snapshots cheaply.
//!
//! ## Modules
//!
//! - `core`: ids, users, documents, combat, the `World` snapshot, configuration
//! - `scripts`: trigger types, script storage, sandbox and runner
//! - `triggers`: notifications, trigger classification, combat timeline
//! - `executor`: executor election
//! - `dispatch`: dispatcher and session peer
//! - `error`: error types

pub mod core;
pub mod error;
pub mod scripts;
pub mod triggers;
pub mod executor;
pub mod dispatch;

// Re-export commonly used types
pub use crate::core::{
    ActorId, CombatId, CombatantId, DocumentRef, EffectId, ItemId, SceneId, TokenId, UserId,
    Permission, User, UserRole,
    Actor, Attunement, EffectRecord, Item, Owner, Scene, Token,
    Combat, Combatant,
    World,
    SandboxLimits, SessionConfig, TogglePolicy, TransferPolicy,
};

pub use crate::error::{ConfigError, ScriptError};

pub use crate::scripts::{
    ScriptChange, ScriptCommand, ScriptEnvironment, ScriptReport, ScriptRunner,
    ScriptableEntity, Speaker, TriggerType,
};

pub use crate::triggers::{
    Change, CombatDelta, FiredTrigger, Notification, Phase, Subject, SystemEvent,
    TriggerClassifier,
};

pub use crate::executor::{designated_executor, is_executor};

pub use crate::dispatch::{DispatchReport, Dispatcher, Outcome, Peer};
