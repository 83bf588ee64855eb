//! Shared configuration types for arclog.
//!
//! Everything the analysis core treats as a tunable lives here as plain
//! serde-deserializable data: the encounter profile (boss, spawn ability,
//! tracked debuff, power buff), combo definitions with their freshness
//! windows, cast groups, and leaderboard sizing. Defaults describe the
//! Black Dragon encounter the tool was originally written for.

use serde::{Deserialize, Serialize};

/// Describes the boss encounter whose wave mechanic is being tracked.
///
/// A "wave" starts when `boss_name` begins casting `spawn_ability`; the
/// wave's debuff instances carry `debuff_label`, and the boss gains one
/// stack of `power_buff` per unresolved mechanic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncounterProfile {
    pub boss_name: String,
    pub spawn_ability: String,
    pub debuff_label: String,
    pub power_buff: String,

    /// Boss power gained per stack of `power_buff`, in percent.
    pub power_percent_per_stack: u32,
    /// Stack count at which the boss is considered enraged.
    pub enrage_stacks: u32,
    /// Clear times above this are flagged slow by downstream visualization.
    /// Not part of pass/fail logic.
    pub slow_clear_secs: f64,
    /// Entities whose name contains one of these markers are not players
    /// (mounts, companions) and are skipped by the wave tracker.
    pub excluded_markers: Vec<String>,
}

impl Default for EncounterProfile {
    fn default() -> Self {
        Self {
            boss_name: "Black Dragon".to_string(),
            spawn_ability: "Penetrating Dark Energy".to_string(),
            debuff_label: "Penetrating Dark Energy".to_string(),
            power_buff: "Devilish Contract".to_string(),
            power_percent_per_stack: 10,
            enrage_stacks: 15,
            slow_clear_secs: 15.0,
            excluded_markers: vec!["Mount".to_string(), "Companion".to_string()],
        }
    }
}

/// One prerequisite buff of a buff-conjunction combo, with its own
/// freshness window relative to the trigger cast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrereqBuff {
    pub label: String,
    pub window_secs: i64,
}

/// Combo variant built from a conjunction of buffs: the trigger cast
/// succeeds only when every prerequisite buff was gained within its own
/// window before the cast. Prerequisites are consumed by the check.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuffComboConfig {
    pub name: String,
    pub trigger_cast: String,
    pub prerequisites: Vec<PrereqBuff>,
}

impl Default for BuffComboConfig {
    fn default() -> Self {
        Self {
            name: "Distress Combo".to_string(),
            trigger_cast: "Mocking Howl".to_string(),
            prerequisites: vec![
                PrereqBuff {
                    label: "Retribution".to_string(),
                    window_secs: 59,
                },
                PrereqBuff {
                    label: "Toughened (Rank 4)".to_string(),
                    window_secs: 9,
                },
                PrereqBuff {
                    label: "Bull Rush: Aggro Boost".to_string(),
                    window_secs: 5,
                },
            ],
        }
    }
}

/// Combo variant built from an attacker → target → reaction chain: an
/// attack with `opener_ability` on a target opens a pending chain, and a
/// `reaction_debuff` landing on that target within `window_secs` credits
/// the attacker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainComboConfig {
    pub name: String,
    pub opener_ability: String,
    pub reaction_debuff: String,
    pub window_secs: i64,
}

impl Default for ChainComboConfig {
    fn default() -> Self {
        Self {
            name: "Discord Combo".to_string(),
            opener_ability: "Critical Discord".to_string(),
            reaction_debuff: "Dissonance".to_string(),
            window_secs: 3,
        }
    }
}

/// A named group of abilities whose successful casts (and, for a few
/// stealth-style items, buff gains) are counted per player.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CastGroup {
    pub name: String,
    /// Labels counted from "successfully cast" lines.
    #[serde(default)]
    pub casts: Vec<String>,
    /// Labels counted from "gained the buff" lines.
    #[serde(default)]
    pub buffs: Vec<String>,
}

impl CastGroup {
    fn casts(name: &str, labels: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            casts: labels.iter().map(|s| s.to_string()).collect(),
            buffs: Vec::new(),
        }
    }

    fn buff(name: &str, label: &str) -> Self {
        Self {
            name: name.to_string(),
            casts: Vec::new(),
            buffs: vec![label.to_string()],
        }
    }
}

/// Default tracked cast groups (raid utility items and signature casts).
pub fn default_cast_groups() -> Vec<CastGroup> {
    vec![
        CastGroup::casts(
            "Kraken Scepter",
            &["Desolate Sea Sovereign", "Arcadian Sea Sovereign"],
        ),
        CastGroup::buff("Kraken Shield", "Arcadian Sea Keeper Stealth"),
        CastGroup::casts("Startling Strain", &["Startling Strain"]),
        CastGroup::casts("Stillness", &["Stillness"]),
        CastGroup::casts("Bubble Trap", &["Bubble Trap"]),
        CastGroup::casts("Banshee Wail", &["Banshee Wail"]),
        CastGroup::casts("Halcy Neck", &["Deliverance Shield"]),
        CastGroup::casts("Egirl Neck", &["Hands of Salvation"]),
    ]
}

/// Leaderboard sizing and significance filtering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Top-N for combo and cast leaderboards.
    pub combo_board_limit: usize,
    /// Top-N for damage/healing entity boards.
    pub entity_board_limit: usize,
    /// Entries below this share of the board total are dropped from
    /// ability breakdowns (significance filter, not a minimum count).
    pub tolerance_ratio: f64,
    /// Self-targeted heal labels counted as potion healing.
    pub pot_abilities: Vec<String>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            combo_board_limit: 10,
            entity_board_limit: 25,
            tolerance_ratio: 0.01,
            pot_abilities: vec![
                "Minor Healing Potion".to_string(),
                "Healing Potion".to_string(),
                "Grimoire".to_string(),
                "Ginseng".to_string(),
            ],
        }
    }
}

/// Full configuration for one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub profile: EncounterProfile,
    pub buff_combo: BuffComboConfig,
    pub chain_combo: ChainComboConfig,
    pub cast_groups: Vec<CastGroup>,
    pub boards: BoardConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            profile: EncounterProfile::default(),
            buff_combo: BuffComboConfig::default(),
            chain_combo: ChainComboConfig::default(),
            cast_groups: default_cast_groups(),
            boards: BoardConfig::default(),
        }
    }
}
