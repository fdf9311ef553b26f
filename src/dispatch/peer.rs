//! One connected participant of a session.
//!
//! A `Peer` is what each client embeds: its own identity, the session
//! configuration, a classifier and a dispatcher. Feeding every peer the same
//! notifications is enough for the session as a whole to run each
//! qualifying script once.

use crate::core::{ActorId, EffectId, SessionConfig, User, UserId, World};
use crate::error::ScriptError;
use crate::executor::designated_executor;
use crate::scripts::{ScriptChange, ScriptReport, ScriptRunner, ScriptableEntity, TriggerType};
use crate::triggers::{Notification, TriggerClassifier};

use super::dispatcher::{DispatchReport, Dispatcher};

/// A session participant.
pub struct Peer {
    user: UserId,
    config: SessionConfig,
    classifier: TriggerClassifier,
    dispatcher: Dispatcher,
}

impl Peer {
    pub fn new(user: UserId, config: SessionConfig) -> Self {
        let runner = ScriptRunner::new(&config.limits);
        Self {
            user,
            classifier: TriggerClassifier::new(&config),
            dispatcher: Dispatcher::new(user, runner),
            config,
        }
    }

    #[must_use]
    pub fn user(&self) -> UserId {
        self.user
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Classify a notification and run whatever this peer is responsible for.
    pub fn handle(&self, notification: &Notification) -> DispatchReport {
        let fired = self.classifier.classify(notification);
        self.dispatcher.dispatch(notification, fired)
    }

    /// Who runs `actor`'s scripts right now.
    #[must_use]
    pub fn executor_for(&self, world: &World, actor: ActorId) -> Option<UserId> {
        designated_executor(world, actor)
    }

    // === Script store ===

    pub fn has_script(
        &self,
        world: &World,
        effect: EffectId,
        trigger: &TriggerType,
    ) -> Result<bool, ScriptError> {
        world
            .effect(effect)
            .map(|e| e.has_script(trigger))
            .ok_or(ScriptError::UnknownEffect(effect))
    }

    /// Store script text on an effect.
    pub fn set_script(
        &self,
        world: &mut World,
        effect: EffectId,
        trigger: TriggerType,
        text: &str,
    ) -> Result<ScriptChange, ScriptError> {
        self.check_edit(world)?;
        let record = world
            .effect_mut(effect)
            .ok_or(ScriptError::UnknownEffect(effect))?;
        record.set_script(trigger, text)
    }

    /// Set or remove script text; see [`ScriptableEntity::update_script`].
    pub fn update_script(
        &self,
        world: &mut World,
        effect: EffectId,
        trigger: TriggerType,
        text: Option<&str>,
    ) -> Result<ScriptChange, ScriptError> {
        self.check_edit(world)?;
        let record = world
            .effect_mut(effect)
            .ok_or(ScriptError::UnknownEffect(effect))?;
        Ok(record.update_script(trigger, text))
    }

    /// Remove script text, returning what was stored.
    pub fn remove_script(
        &self,
        world: &mut World,
        effect: EffectId,
        trigger: &TriggerType,
    ) -> Result<Option<String>, ScriptError> {
        self.check_edit(world)?;
        let record = world
            .effect_mut(effect)
            .ok_or(ScriptError::UnknownEffect(effect))?;
        Ok(record.remove_script(trigger))
    }

    // === Manual invocation ===

    /// Run an effect's script for `trigger` right here, bypassing
    /// classification and executor election.
    pub fn invoke(
        &self,
        world: &World,
        effect: EffectId,
        trigger: &TriggerType,
        context: Option<&serde_json::Value>,
    ) -> Result<ScriptReport, ScriptError> {
        let record = world.effect(effect).ok_or(ScriptError::UnknownEffect(effect))?;
        if !record.has_script(trigger) {
            tracing::warn!(effect = %effect, trigger = %trigger, "no script to invoke");
            return Err(ScriptError::MissingScript {
                effect,
                trigger: trigger.clone(),
            });
        }
        self.dispatcher
            .runner()
            .run(world, record, trigger, Some(self.user), context)
    }

    fn check_edit(&self, world: &World) -> Result<(), ScriptError> {
        if !self.config.restrict_permissions {
            return Ok(());
        }
        if world.user(self.user).is_some_and(User::is_privileged) {
            return Ok(());
        }
        tracing::warn!(user = %self.user, "script edit rejected, editing is restricted");
        Err(ScriptError::PermissionDenied { user: self.user })
    }
}
