//! Single-shot script execution.
//!
//! The runner looks up an effect's script for a trigger, compiles it, binds
//! the [`ScriptEnvironment`] into a fresh scope and runs it once. Failures
//! come back as [`ScriptError`] values after being logged; they never
//! unwind into the caller.

use serde::{Deserialize, Serialize};

use crate::core::{EffectId, EffectRecord, SandboxLimits, UserId, World};
use crate::error::ScriptError;

use super::environment::ScriptEnvironment;
use super::sandbox::{Sandbox, ScriptCommand};
use super::store::ScriptableEntity;
use super::trigger::TriggerType;

/// The result of a successful script run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptReport {
    pub effect: EffectId,
    pub trigger: TriggerType,

    /// Host changes the script requested, in call order.
    pub commands: Vec<ScriptCommand>,
}

/// Runs effect scripts in an isolated sandbox.
pub struct ScriptRunner {
    sandbox: Sandbox,
}

impl ScriptRunner {
    pub fn new(limits: &SandboxLimits) -> Self {
        Self {
            sandbox: Sandbox::new(limits),
        }
    }

    /// Run `effect`'s script for `trigger`.
    ///
    /// `user` is the executing user (for the `character` binding) and
    /// `context` is bound as `context`, defaulting to an empty map.
    pub fn run(
        &self,
        world: &World,
        effect: &EffectRecord,
        trigger: &TriggerType,
        user: Option<UserId>,
        context: Option<&serde_json::Value>,
    ) -> Result<ScriptReport, ScriptError> {
        let result = self.execute(world, effect, trigger, user, context);
        match &result {
            Ok(report) => tracing::debug!(
                effect = %effect.id,
                trigger = %trigger,
                commands = report.commands.len(),
                "effect script completed"
            ),
            Err(ScriptError::MissingScript { .. }) => {}
            Err(err) => tracing::error!(
                effect = %effect.id,
                trigger = %trigger,
                actor = ?world.effect_actor(effect),
                error = %err,
                "effect script failed"
            ),
        }
        result
    }

    fn execute(
        &self,
        world: &World,
        effect: &EffectRecord,
        trigger: &TriggerType,
        user: Option<UserId>,
        context: Option<&serde_json::Value>,
    ) -> Result<ScriptReport, ScriptError> {
        let source = effect
            .script(trigger)
            .ok_or_else(|| ScriptError::MissingScript {
                effect: effect.id,
                trigger: trigger.clone(),
            })?;

        let ast = self
            .sandbox
            .compile(source)
            .map_err(|message| ScriptError::Compile {
                effect: effect.id,
                trigger: trigger.clone(),
                message,
            })?;

        let environment = ScriptEnvironment::resolve(world, effect, user);
        let speaker = environment.speaker.clone();
        let mut scope = environment.into_scope(context)?;

        let commands = self
            .sandbox
            .run(&ast, &mut scope, speaker)
            .map_err(|message| ScriptError::Runtime {
                effect: effect.id,
                trigger: trigger.clone(),
                message,
            })?;

        Ok(ScriptReport {
            effect: effect.id,
            trigger: trigger.clone(),
            commands,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Actor, ActorId};

    fn setup(script: &str) -> (World, EffectRecord) {
        let mut world = World::new();
        world.add_actor(Actor::new(ActorId(1), "Hero"));
        let effect = EffectRecord::on_actor(EffectId(7), "Rage", ActorId(1))
            .with_script(TriggerType::OnEnable, script);
        world.add_effect(effect.clone());
        (world, effect)
    }

    #[test]
    fn test_run_reads_bindings() {
        let (world, effect) = setup(
            r#"
                if actor.name == "Hero" && effect.id == 7 {
                    notify(`${effect.name} on ${actor.name}`);
                }
            "#,
        );
        let runner = ScriptRunner::new(&SandboxLimits::default());
        let report = runner
            .run(&world, &effect, &TriggerType::OnEnable, None, None)
            .unwrap();

        assert_eq!(
            report.commands,
            vec![ScriptCommand::Notify { message: "Rage on Hero".into() }]
        );
    }

    #[test]
    fn test_run_reads_context() {
        let (world, effect) = setup("notify(`rolled ${context.total}`);");
        let runner = ScriptRunner::new(&SandboxLimits::default());
        let context = serde_json::json!({ "total": 18 });
        let report = runner
            .run(&world, &effect, &TriggerType::OnEnable, None, Some(&context))
            .unwrap();

        assert_eq!(
            report.commands,
            vec![ScriptCommand::Notify { message: "rolled 18".into() }]
        );
    }

    #[test]
    fn test_missing_script() {
        let (world, effect) = setup("notify(\"x\");");
        let runner = ScriptRunner::new(&SandboxLimits::default());
        let err = runner
            .run(&world, &effect, &TriggerType::OnDisable, None, None)
            .unwrap_err();
        assert_eq!(
            err,
            ScriptError::MissingScript { effect: EffectId(7), trigger: TriggerType::OnDisable }
        );
    }

    #[test]
    fn test_compile_error() {
        let (world, effect) = setup("let = ;");
        let runner = ScriptRunner::new(&SandboxLimits::default());
        let err = runner
            .run(&world, &effect, &TriggerType::OnEnable, None, None)
            .unwrap_err();
        assert!(matches!(err, ScriptError::Compile { .. }));
    }

    #[test]
    fn test_runtime_error_is_contained() {
        let (world, effect) = setup("throw \"no\";");
        let runner = ScriptRunner::new(&SandboxLimits::default());
        let err = runner
            .run(&world, &effect, &TriggerType::OnEnable, None, None)
            .unwrap_err();
        assert!(matches!(err, ScriptError::Runtime { effect: EffectId(7), .. }));

        // The runner is still usable afterwards
        let (world, effect) = setup("notify(\"ok\");");
        assert!(runner.run(&world, &effect, &TriggerType::OnEnable, None, None).is_ok());
    }

    #[test]
    fn test_unknown_identifiers_are_not_visible() {
        let (world, effect) = setup("notify(game.users);");
        let runner = ScriptRunner::new(&SandboxLimits::default());
        assert!(runner.run(&world, &effect, &TriggerType::OnEnable, None, None).is_err());
    }
}
