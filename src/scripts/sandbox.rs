//! Embedded interpreter for effect scripts.
//!
//! Scripts are compiled by a `rhai` engine with no module loading and no
//! `eval`. The only values a script can see are the ones its runner pushes
//! into a fresh scope. The only way out is the small host API registered
//! here, and every call on it is queued as a [`ScriptCommand`] for the host
//! document layer to apply after the run. The sandbox never mutates a
//! [`World`](crate::core::World).

use std::cell::RefCell;
use std::rc::Rc;

use rhai::module_resolvers::DummyModuleResolver;
use rhai::{Engine, EvalAltResult, Scope, AST, INT};
use serde::{Deserialize, Serialize};

use crate::core::{EffectId, SandboxLimits};

use super::environment::Speaker;

/// Tracing target for output produced by scripts themselves.
pub const SCRIPT_LOG_TARGET: &str = "effect_scripts::script";

/// A change a script asked the host to make.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScriptCommand {
    /// Post a chat message as the script's speaker.
    Chat { speaker: Speaker, content: String },

    /// Show a notification to the executing user.
    Notify { message: String },

    /// Enable or disable an effect.
    ToggleEffect { effect: EffectId, disabled: bool },

    DeleteEffect { effect: EffectId },
}

#[derive(Default)]
struct SharedState {
    commands: Vec<ScriptCommand>,
    speaker: Speaker,
}

/// A configured interpreter plus the command queue its host API writes to.
///
/// Not `Send`: each peer owns its sandbox and runs scripts one at a time.
pub struct Sandbox {
    engine: Engine,
    shared: Rc<RefCell<SharedState>>,
}

impl Sandbox {
    pub fn new(limits: &SandboxLimits) -> Self {
        let mut engine = Engine::new();
        engine.set_module_resolver(DummyModuleResolver::new());
        engine.disable_symbol("eval");

        engine.set_max_operations(limits.max_operations);
        if limits.max_call_levels > 0 {
            engine.set_max_call_levels(limits.max_call_levels);
        }
        engine.set_max_string_size(limits.max_string_size);
        engine.set_max_array_size(limits.max_array_size);
        engine.set_max_map_size(limits.max_map_size);

        engine.on_print(|text| tracing::info!(target: SCRIPT_LOG_TARGET, "{}", text));
        engine.on_debug(|text, source, position| {
            tracing::debug!(
                target: SCRIPT_LOG_TARGET,
                source = source.unwrap_or_default(),
                position = %position,
                "{}",
                text
            );
        });

        let shared = Rc::new(RefCell::new(SharedState::default()));
        register_api(&mut engine, &shared);

        Self { engine, shared }
    }

    /// Compile script text into a reusable unit.
    pub fn compile(&self, source: &str) -> Result<AST, String> {
        self.engine.compile(source).map_err(|e| e.to_string())
    }

    /// Run a compiled script against a scope.
    ///
    /// Returns the commands the script queued. Commands queued before a
    /// failure are discarded with it.
    pub fn run(
        &self,
        ast: &AST,
        scope: &mut Scope<'_>,
        speaker: Speaker,
    ) -> Result<Vec<ScriptCommand>, String> {
        {
            let mut shared = self.shared.borrow_mut();
            shared.commands.clear();
            shared.speaker = speaker;
        }

        let result = self.engine.run_ast_with_scope(scope, ast);
        let commands = std::mem::take(&mut self.shared.borrow_mut().commands);

        match result {
            Ok(()) => Ok(commands),
            Err(err) => Err(err.to_string()),
        }
    }
}

fn effect_id(raw: INT) -> Result<EffectId, Box<EvalAltResult>> {
    u32::try_from(raw)
        .map(EffectId::new)
        .map_err(|_| format!("invalid effect id {}", raw).into())
}

fn register_api(engine: &mut Engine, shared: &Rc<RefCell<SharedState>>) {
    let state = Rc::clone(shared);
    engine.register_fn("chat", move |content: &str| {
        let mut guard = state.borrow_mut();
        let speaker = guard.speaker.clone();
        guard.commands.push(ScriptCommand::Chat {
            speaker,
            content: content.to_string(),
        });
    });

    let state = Rc::clone(shared);
    engine.register_fn("notify", move |message: &str| {
        state.borrow_mut().commands.push(ScriptCommand::Notify {
            message: message.to_string(),
        });
    });

    let state = Rc::clone(shared);
    engine.register_fn(
        "toggle_effect",
        move |effect: INT, disabled: bool| -> Result<(), Box<EvalAltResult>> {
            let effect = effect_id(effect)?;
            state
                .borrow_mut()
                .commands
                .push(ScriptCommand::ToggleEffect { effect, disabled });
            Ok(())
        },
    );

    let state = Rc::clone(shared);
    engine.register_fn(
        "delete_effect",
        move |effect: INT| -> Result<(), Box<EvalAltResult>> {
            let effect = effect_id(effect)?;
            state
                .borrow_mut()
                .commands
                .push(ScriptCommand::DeleteEffect { effect });
            Ok(())
        },
    );
}
