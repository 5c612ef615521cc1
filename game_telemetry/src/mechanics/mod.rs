//! Game mechanics as seen by telemetry: event kinds, unlock methods, level bands.

use serde::{Deserialize, Serialize};

/// Every kind of event the game loop reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    // Level lifecycle
    LevelStart,
    LevelEnd,

    // Moves
    BottleSelect,
    PourAttempt,
    PourExecute,

    // Hidden contents
    UnknownReveal,

    // Instability
    InstabilityWarning,
    InstabilityReset,
    InstabilityCollapse,

    // Locks
    DecoKeyUse,
    CorkUnlock,
    KeystoneSolved,
}

impl EventKind {
    /// All event kinds, in declaration order.
    pub const ALL: [EventKind; 12] = [
        EventKind::LevelStart,
        EventKind::LevelEnd,
        EventKind::BottleSelect,
        EventKind::PourAttempt,
        EventKind::PourExecute,
        EventKind::UnknownReveal,
        EventKind::InstabilityWarning,
        EventKind::InstabilityReset,
        EventKind::InstabilityCollapse,
        EventKind::DecoKeyUse,
        EventKind::CorkUnlock,
        EventKind::KeystoneSolved,
    ];

    /// The wire name used in the `kind` discriminator.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::LevelStart => "level_start",
            EventKind::LevelEnd => "level_end",
            EventKind::BottleSelect => "bottle_select",
            EventKind::PourAttempt => "pour_attempt",
            EventKind::PourExecute => "pour_execute",
            EventKind::UnknownReveal => "unknown_reveal",
            EventKind::InstabilityWarning => "instability_warning",
            EventKind::InstabilityReset => "instability_reset",
            EventKind::InstabilityCollapse => "instability_collapse",
            EventKind::DecoKeyUse => "deco_key_use",
            EventKind::CorkUnlock => "cork_unlock",
            EventKind::KeystoneSolved => "keystone_solved",
        }
    }

    /// Look up a kind by its wire name. Unknown names yield `None`.
    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    /// Whether this kind belongs to the instability family.
    pub fn is_instability(&self) -> bool {
        matches!(
            self,
            EventKind::InstabilityWarning
                | EventKind::InstabilityReset
                | EventKind::InstabilityCollapse
        )
    }

    /// Whether this kind carries behavioral signal for confidence estimation.
    ///
    /// Level boundaries and bottle selection are bookkeeping only.
    pub fn is_signal_bearing(&self) -> bool {
        match self {
            EventKind::CorkUnlock
            | EventKind::KeystoneSolved
            | EventKind::DecoKeyUse
            | EventKind::UnknownReveal
            | EventKind::PourAttempt
            | EventKind::PourExecute => true,
            kind => kind.is_instability(),
        }
    }

    /// Evidence weight applied to any feature triggered by this kind.
    pub fn weight(&self) -> f64 {
        match self {
            EventKind::LevelStart => 0.8,
            EventKind::LevelEnd => 0.8,
            EventKind::BottleSelect => 0.3,
            EventKind::PourAttempt => 0.5,
            EventKind::PourExecute => 0.6,
            EventKind::UnknownReveal => 1.2,
            EventKind::InstabilityWarning => 1.5,
            EventKind::InstabilityReset => 1.5,
            EventKind::InstabilityCollapse => 1.5,
            EventKind::DecoKeyUse => 1.4,
            EventKind::CorkUnlock => 1.8,
            EventKind::KeystoneSolved => 1.8,
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a corked vessel was opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnlockMethod {
    /// Solved the keystone puzzle.
    Keystone,
    /// Spent a decorative key item.
    DecoKey,
    /// Any method the engine does not score.
    Other,
}

impl UnlockMethod {
    /// Parse a wire value, tolerating case and separator differences.
    pub fn from_wire(name: &str) -> Self {
        let normalized: String = name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "keystone" => UnlockMethod::Keystone,
            "decokey" | "key" => UnlockMethod::DecoKey,
            _ => UnlockMethod::Other,
        }
    }
}

/// Coarse difficulty tier inferred from the level number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelBand {
    #[default]
    Early,
    Mid,
    Late,
    Infinite,
}

impl LevelBand {
    /// Band for a level number. Missing levels count as level 0.
    pub fn from_level(level: Option<u32>) -> Self {
        match level.unwrap_or(0) {
            0..=7 => LevelBand::Early,
            8..=17 => LevelBand::Mid,
            18..=34 => LevelBand::Late,
            _ => LevelBand::Infinite,
        }
    }

    /// Number of moves a typical solve takes in this band.
    pub fn expected_solve_length(&self) -> u32 {
        match self {
            LevelBand::Early => 28,
            LevelBand::Mid => 44,
            LevelBand::Late => 62,
            LevelBand::Infinite => 72,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LevelBand::Early => "early",
            LevelBand::Mid => "mid",
            LevelBand::Late => "late",
            LevelBand::Infinite => "infinite",
        }
    }
}

impl std::fmt::Display for LevelBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
