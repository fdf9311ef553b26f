//! Effect scripts: storage, sandbox and single-shot execution.
//!
//! ## Key Components
//!
//! - [`TriggerType`]: the event a script is bound to
//! - [`ScriptableEntity`]: one script per trigger on an effect record
//! - [`ScriptEnvironment`]: the fixed bindings a script can see
//! - [`Sandbox`]: the embedded `rhai` interpreter and its host API
//! - [`ScriptRunner`]: compile, bind, run, report
//!
//! Scripts cannot touch session state directly. Calls such as
//! `toggle_effect(id, true)` are queued as [`ScriptCommand`]s and returned
//! in the [`ScriptReport`] for the host to apply.

pub mod trigger;
pub mod store;
pub mod sandbox;
pub mod environment;
pub mod runner;

pub use environment::{OriginDocument, ScriptEnvironment, Speaker};
pub use runner::{ScriptReport, ScriptRunner};
pub use sandbox::{Sandbox, ScriptCommand, SCRIPT_LOG_TARGET};
pub use store::{ScriptChange, ScriptableEntity};
pub use trigger::{TriggerGroup, TriggerType};
