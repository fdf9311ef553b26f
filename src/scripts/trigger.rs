//! Trigger types.
//!
//! A trigger type names the event a script is bound to. The built-in set is
//! closed; rules systems add their own named events (`dnd5e.rollAttack`),
//! which pass through verbatim as [`TriggerType::External`].
//!
//! Trigger types serialize as their names, so a script map is keyed by
//! plain strings in any serialized form.

use serde::{Deserialize, Serialize};

/// Named event category a script can be bound to.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TriggerType {
    /// Never fired automatically; only reachable by manual invocation.
    Never,

    // === Effect lifecycle ===
    OnCreate,
    OnDelete,
    OnToggle,
    OnEnable,
    OnDisable,

    // === Combatant ===
    OnTurnStart,
    OnTurnEnd,
    OnCombatantDefeated,

    // === Combat ===
    OnEachTurn,
    OnRoundStart,
    OnRoundEnd,
    OnCombatStart,
    OnCombatEnd,

    /// Event sourced from a rules system, named by that system.
    External(String),
}

/// A labelled group of built-in triggers, for listing in an authoring UI.
#[derive(Clone, Copy, Debug)]
pub struct TriggerGroup {
    /// Group label, `None` for the ungrouped sentinel.
    pub label: Option<&'static str>,
    pub triggers: &'static [TriggerType],
}

const GROUPS: &[TriggerGroup] = &[
    TriggerGroup {
        label: None,
        triggers: &[TriggerType::Never],
    },
    TriggerGroup {
        label: Some("effect"),
        triggers: &[
            TriggerType::OnCreate,
            TriggerType::OnDelete,
            TriggerType::OnToggle,
            TriggerType::OnEnable,
            TriggerType::OnDisable,
        ],
    },
    TriggerGroup {
        label: Some("combatant"),
        triggers: &[
            TriggerType::OnTurnStart,
            TriggerType::OnTurnEnd,
            TriggerType::OnCombatantDefeated,
        ],
    },
    TriggerGroup {
        label: Some("combat"),
        triggers: &[
            TriggerType::OnEachTurn,
            TriggerType::OnRoundStart,
            TriggerType::OnRoundEnd,
            TriggerType::OnCombatStart,
            TriggerType::OnCombatEnd,
        ],
    },
];

impl TriggerType {
    /// The name scripts are stored under.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            TriggerType::Never => "never",
            TriggerType::OnCreate => "onCreate",
            TriggerType::OnDelete => "onDelete",
            TriggerType::OnToggle => "onToggle",
            TriggerType::OnEnable => "onEnable",
            TriggerType::OnDisable => "onDisable",
            TriggerType::OnTurnStart => "onTurnStart",
            TriggerType::OnTurnEnd => "onTurnEnd",
            TriggerType::OnCombatantDefeated => "onCombatantDefeated",
            TriggerType::OnEachTurn => "onEachTurn",
            TriggerType::OnRoundStart => "onRoundStart",
            TriggerType::OnRoundEnd => "onRoundEnd",
            TriggerType::OnCombatStart => "onCombatStart",
            TriggerType::OnCombatEnd => "onCombatEnd",
            TriggerType::External(name) => name,
        }
    }

    /// Built-in triggers grouped for display.
    #[must_use]
    pub fn groups() -> &'static [TriggerGroup] {
        GROUPS
    }

    /// Every built-in trigger, in display order.
    pub fn builtin() -> impl Iterator<Item = &'static TriggerType> {
        GROUPS.iter().flat_map(|g| g.triggers.iter())
    }

    #[must_use]
    pub fn is_external(&self) -> bool {
        matches!(self, TriggerType::External(_))
    }
}

impl From<&str> for TriggerType {
    fn from(name: &str) -> Self {
        match name {
            "never" => TriggerType::Never,
            "onCreate" => TriggerType::OnCreate,
            "onDelete" => TriggerType::OnDelete,
            "onToggle" => TriggerType::OnToggle,
            "onEnable" => TriggerType::OnEnable,
            "onDisable" => TriggerType::OnDisable,
            "onTurnStart" => TriggerType::OnTurnStart,
            "onTurnEnd" => TriggerType::OnTurnEnd,
            "onCombatantDefeated" => TriggerType::OnCombatantDefeated,
            "onEachTurn" => TriggerType::OnEachTurn,
            "onRoundStart" => TriggerType::OnRoundStart,
            "onRoundEnd" => TriggerType::OnRoundEnd,
            "onCombatStart" => TriggerType::OnCombatStart,
            "onCombatEnd" => TriggerType::OnCombatEnd,
            other => TriggerType::External(other.to_string()),
        }
    }
}

impl From<String> for TriggerType {
    fn from(name: String) -> Self {
        match TriggerType::from(name.as_str()) {
            TriggerType::External(_) => TriggerType::External(name),
            builtin => builtin,
        }
    }
}

impl From<TriggerType> for String {
    fn from(trigger: TriggerType) -> Self {
        match trigger {
            TriggerType::External(name) => name,
            builtin => builtin.name().to_string(),
        }
    }
}

impl std::fmt::Display for TriggerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
