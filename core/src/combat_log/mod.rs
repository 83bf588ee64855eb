//! Typed combat-log events.
//!
//! The extractor turns raw log lines into `LogEvent`s; everything
//! downstream (wave tracker, combo tracker, meters) consumes these and
//! never looks at raw text again.

use chrono::NaiveDateTime;
use serde::Serialize;

/// What kind of thing a log line described.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EventKind {
    /// Actor attacked target with an ability for `magnitude` damage.
    Attack,
    /// Actor healed target with an ability for `magnitude` health.
    Heal,
    /// Actor gained a buff named `label`.
    BuffGained,
    /// Actor was struck by a debuff named `label`.
    DebuffApplied,
    /// Actor's debuff named `label` cleared.
    DebuffCleared,
    /// Actor successfully cast the ability named `label`.
    Cast,
    /// The encounter boss began casting its wave-spawning ability.
    WaveSpawn,
    /// The encounter boss gained one stack of its power buff.
    PowerGain,
}

/// One extracted log event.
///
/// `timestamp` is always parseable by construction: a line whose timestamp
/// fails structural parsing never produces an event.
#[derive(Debug, Clone, Serialize)]
pub struct LogEvent {
    pub line_number: usize,
    pub timestamp: NaiveDateTime,
    pub kind: EventKind,
    /// Entity performing the event (attacker, caster, or buff/debuff target
    /// for self-referential kinds).
    pub actor: String,
    /// Receiving entity, when the line names one.
    pub target: Option<String>,
    /// Ability, buff, or debuff name. Exact match against configured sets.
    pub label: String,
    /// Damage or heal amount; absent for buff/debuff/cast events.
    pub magnitude: Option<i64>,
    /// True when a damage line carried a critical-hit marker.
    pub critical: bool,
}
