//! Sequential dispatch of fired triggers.
//!
//! Triggers are handled strictly in arrival order. For each one the
//! dispatcher elects the executor for the trigger's actor and, if that is
//! the local user, runs the script to completion before moving on. A
//! failing script only fails its own entry.

use crate::core::{UserId, World};
use crate::error::ScriptError;
use crate::executor::designated_executor;
use crate::scripts::{ScriptCommand, ScriptReport, ScriptRunner};
use crate::triggers::{FiredTrigger, Notification, Phase};

/// What happened to one fired trigger on this peer.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    /// The local user was the executor and the script ran.
    Executed(ScriptReport),

    /// The local user was the executor but the script failed.
    Failed(ScriptError),

    /// Another user is responsible for it.
    NotExecutor(UserId),

    /// Nobody eligible is connected; the trigger is dropped.
    NoExecutor,
}

/// One fired trigger and its outcome.
#[derive(Clone, Debug, PartialEq)]
pub struct DispatchEntry {
    pub fired: FiredTrigger,
    pub outcome: Outcome,
}

/// Outcomes for every trigger of one notification, in dispatch order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DispatchReport {
    entries: Vec<DispatchEntry>,
}

impl DispatchReport {
    #[must_use]
    pub fn entries(&self) -> &[DispatchEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Scripts this peer ran successfully.
    pub fn executed(&self) -> impl Iterator<Item = &ScriptReport> {
        self.entries.iter().filter_map(|e| match &e.outcome {
            Outcome::Executed(report) => Some(report),
            _ => None,
        })
    }

    /// Scripts this peer ran that failed.
    pub fn failures(&self) -> impl Iterator<Item = &ScriptError> {
        self.entries.iter().filter_map(|e| match &e.outcome {
            Outcome::Failed(err) => Some(err),
            _ => None,
        })
    }

    /// Number of scripts this peer attempted, successful or not.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, Outcome::Executed(_) | Outcome::Failed(_)))
            .count()
    }

    /// All commands queued by successful scripts, in run order.
    pub fn commands(&self) -> impl Iterator<Item = &ScriptCommand> {
        self.executed().flat_map(|report| report.commands.iter())
    }
}

/// Elects and runs, one trigger at a time.
pub struct Dispatcher {
    local_user: UserId,
    runner: ScriptRunner,
}

impl Dispatcher {
    pub fn new(local_user: UserId, runner: ScriptRunner) -> Self {
        Self { local_user, runner }
    }

    #[must_use]
    pub fn local_user(&self) -> UserId {
        self.local_user
    }

    #[must_use]
    pub fn runner(&self) -> &ScriptRunner {
        &self.runner
    }

    /// Dispatch the triggers classified from `notification`.
    pub fn dispatch(&self, notification: &Notification, fired: Vec<FiredTrigger>) -> DispatchReport {
        let entries = fired
            .into_iter()
            .map(|fired| {
                let world = match fired.phase {
                    Phase::Before => &notification.before,
                    Phase::After => &notification.after,
                };
                let outcome = self.dispatch_one(world, &fired);
                DispatchEntry { fired, outcome }
            })
            .collect();
        DispatchReport { entries }
    }

    fn dispatch_one(&self, world: &World, fired: &FiredTrigger) -> Outcome {
        match designated_executor(world, fired.actor) {
            None => {
                tracing::debug!(trigger = %fired, "no connected executor, dropping trigger");
                Outcome::NoExecutor
            }
            Some(user) if user != self.local_user => Outcome::NotExecutor(user),
            Some(_) => {
                let Some(effect) = world.effect(fired.effect) else {
                    return Outcome::Failed(ScriptError::UnknownEffect(fired.effect));
                };
                let result = self.runner.run(
                    world,
                    effect,
                    &fired.trigger,
                    Some(self.local_user),
                    fired.context.as_ref(),
                );
                match result {
                    Ok(report) => Outcome::Executed(report),
                    Err(err) => Outcome::Failed(err),
                }
            }
        }
    }
}
