//! Script storage on effect-like records.
//!
//! Any record that carries scripts implements [`ScriptableEntity`] by exposing
//! its trigger-to-text map. The provided methods give the public contract:
//! at most one script per trigger, empty text never stored.

use rustc_hash::FxHashMap;

use crate::core::EffectRecord;
use crate::error::ScriptError;

use super::trigger::TriggerType;

/// What an [`update_script`](ScriptableEntity::update_script) call did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScriptChange {
    Created,
    Replaced,
    Removed,
    Unchanged,
}

/// A record that can hold one script per trigger type.
pub trait ScriptableEntity {
    /// The raw trigger-to-text map.
    fn scripts(&self) -> &FxHashMap<TriggerType, String>;

    /// Mutable access to the raw map.
    fn scripts_mut(&mut self) -> &mut FxHashMap<TriggerType, String>;

    /// Script text for a trigger, if non-empty text is stored.
    fn script(&self, trigger: &TriggerType) -> Option<&str> {
        self.scripts()
            .get(trigger)
            .map(String::as_str)
            .filter(|text| !text.trim().is_empty())
    }

    fn has_script(&self, trigger: &TriggerType) -> bool {
        self.script(trigger).is_some()
    }

    /// Store script text for a trigger, replacing any previous text.
    ///
    /// Empty or whitespace-only text is rejected.
    fn set_script(&mut self, trigger: TriggerType, text: &str) -> Result<ScriptChange, ScriptError> {
        if text.trim().is_empty() {
            return Err(ScriptError::EmptyScript { trigger });
        }
        let change = if self.has_script(&trigger) {
            ScriptChange::Replaced
        } else {
            ScriptChange::Created
        };
        self.scripts_mut().insert(trigger, text.to_string());
        Ok(change)
    }

    /// Remove the script for a trigger, returning its text.
    fn remove_script(&mut self, trigger: &TriggerType) -> Option<String> {
        self.scripts_mut().remove(trigger)
    }

    /// Set-or-remove: `None` or empty text removes, identical text is left
    /// alone, anything else replaces.
    fn update_script(&mut self, trigger: TriggerType, text: Option<&str>) -> ScriptChange {
        match text.filter(|t| !t.trim().is_empty()) {
            None => match self.remove_script(&trigger) {
                Some(_) => ScriptChange::Removed,
                None => ScriptChange::Unchanged,
            },
            Some(text) if self.script(&trigger) == Some(text) => ScriptChange::Unchanged,
            Some(text) => {
                let change = if self.has_script(&trigger) {
                    ScriptChange::Replaced
                } else {
                    ScriptChange::Created
                };
                self.scripts_mut().insert(trigger, text.to_string());
                change
            }
        }
    }

    /// Built-in triggers with a script, in display order, followed by
    /// external triggers sorted by name.
    fn used_triggers(&self) -> Vec<TriggerType> {
        let mut used: Vec<TriggerType> = TriggerType::builtin()
            .filter(|t| self.has_script(t))
            .cloned()
            .collect();
        let mut external: Vec<TriggerType> = self
            .scripts()
            .keys()
            .filter(|t| t.is_external() && self.has_script(t))
            .cloned()
            .collect();
        external.sort();
        used.extend(external);
        used
    }

    /// Built-in triggers still free for a new script, in display order.
    fn unused_triggers(&self) -> Vec<TriggerType> {
        TriggerType::builtin()
            .filter(|t| !self.has_script(t))
            .cloned()
            .collect()
    }
}

impl ScriptableEntity for EffectRecord {
    fn scripts(&self) -> &FxHashMap<TriggerType, String> {
        &self.scripts
    }

    fn scripts_mut(&mut self) -> &mut FxHashMap<TriggerType, String> {
        &mut self.scripts
    }
}
