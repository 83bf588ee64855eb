//! Wave and debuff lifecycle tracking.
//!
//! A wave opens when the boss begins its spawn cast and closes on the next
//! spawn (or end of stream). Debuff applications are paired with their
//! later clear events through a per-entity single-slot index into the
//! global debuff event list; a re-application before the clear overwrites
//! the slot and abandons the earlier instance (last-applied-wins, kept
//! as-is from the encounter's observed behavior).

use chrono::NaiveDateTime;
use hashbrown::HashMap;
use serde::Serialize;

use arclog_types::EncounterProfile;

use crate::combat_log::{EventKind, LogEvent};

/// One lifecycle record for a debuff instance.
#[derive(Debug, Clone, Serialize)]
pub struct DebuffEvent {
    pub entity: String,
    pub applied_at: NaiveDateTime,
    pub cleared: bool,
    pub cleared_at: Option<NaiveDateTime>,
}

/// A group of debuff applications bounded by two consecutive spawn casts.
#[derive(Debug, Clone, Serialize)]
pub struct Wave {
    pub started_at: NaiveDateTime,
    /// Entities struck during this wave, in order of first application.
    pub affected: Vec<String>,
    /// Entities that cleared their debuff while the wave was open.
    pub cleared: Vec<String>,
    /// Clear durations in seconds, parallel to `cleared`.
    pub clear_durations: Vec<f64>,
    /// True if the boss gained a power stack during this wave.
    pub power_gained: bool,
}

impl Wave {
    fn open(started_at: NaiveDateTime) -> Self {
        Self {
            started_at,
            affected: Vec::new(),
            cleared: Vec::new(),
            clear_durations: Vec::new(),
            power_gained: false,
        }
    }

    /// Entities that never cleared, in affected order. Computed at read
    /// time so a clear arriving after the wave closed cannot double-count.
    pub fn failed(&self) -> Vec<String> {
        self.affected
            .iter()
            .filter(|e| !self.cleared.contains(e))
            .cloned()
            .collect()
    }

    pub fn avg_clear_secs(&self) -> f64 {
        if self.clear_durations.is_empty() {
            return 0.0;
        }
        self.clear_durations.iter().sum::<f64>() / self.clear_durations.len() as f64
    }
}

/// Per-entity running aggregate. `failed` is derived at report time as
/// `total - cleared`, never tracked incrementally.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PlayerStat {
    pub total: u32,
    pub cleared: u32,
    /// Online mean of clear durations in seconds.
    pub avg_clear_secs: f64,
}

/// State machine pairing debuff applications with clears and grouping
/// them into waves. Consumes events strictly in file order.
#[derive(Debug)]
pub struct WaveTracker {
    profile: EncounterProfile,
    waves: Vec<Wave>,
    current: Option<Wave>,
    player_stats: HashMap<String, PlayerStat>,
    debuff_events: Vec<DebuffEvent>,
    /// Entity -> index of its outstanding instance in `debuff_events`.
    /// Exactly one slot per entity; a new application overwrites it.
    active_debuffs: HashMap<String, usize>,
    power_stacks: u32,
}

impl WaveTracker {
    pub fn new(profile: EncounterProfile) -> Self {
        Self {
            profile,
            waves: Vec::new(),
            current: None,
            player_stats: HashMap::new(),
            debuff_events: Vec::new(),
            active_debuffs: HashMap::new(),
            power_stacks: 0,
        }
    }

    pub fn handle_event(&mut self, event: &LogEvent) {
        match event.kind {
            EventKind::WaveSpawn => self.on_spawn(event.timestamp),
            EventKind::DebuffApplied if event.label == self.profile.debuff_label => {
                self.on_applied(event)
            }
            EventKind::DebuffCleared if event.label == self.profile.debuff_label => {
                self.on_cleared(event)
            }
            EventKind::PowerGain => self.on_power_gain(),
            _ => {}
        }
    }

    fn on_spawn(&mut self, timestamp: NaiveDateTime) {
        if let Some(wave) = self.current.take() {
            tracing::debug!(
                wave = self.waves.len() + 1,
                affected = wave.affected.len(),
                cleared = wave.cleared.len(),
                "closing wave"
            );
            self.waves.push(wave);
        }
        tracing::debug!(%timestamp, "wave spawn");
        self.current = Some(Wave::open(timestamp));
    }

    fn on_applied(&mut self, event: &LogEvent) {
        if self.is_excluded(&event.actor) {
            return;
        }

        // Wave attribution: first application per entity per wave counts
        // toward that entity's total.
        if let Some(wave) = self.current.as_mut()
            && !wave.affected.iter().any(|e| e == &event.actor)
        {
            wave.affected.push(event.actor.clone());
            self.player_stats.entry(event.actor.clone()).or_default().total += 1;
        }

        // Lifecycle tracking happens regardless of wave state so that a
        // clear can always be paired with its most recent application.
        self.debuff_events.push(DebuffEvent {
            entity: event.actor.clone(),
            applied_at: event.timestamp,
            cleared: false,
            cleared_at: None,
        });
        self.active_debuffs
            .insert(event.actor.clone(), self.debuff_events.len() - 1);
    }

    fn on_cleared(&mut self, event: &LogEvent) {
        // A clear with no outstanding instance is a no-op, not an error.
        let Some(idx) = self.active_debuffs.remove(&event.actor) else {
            return;
        };

        let record = &mut self.debuff_events[idx];
        record.cleared = true;
        record.cleared_at = Some(event.timestamp);
        let clear_secs = event
            .timestamp
            .signed_duration_since(record.applied_at)
            .num_seconds() as f64;

        // Only clears landing while the entity's wave is still open count
        // toward wave and player stats; late clears stay in the lifecycle
        // list but are not attributed to the closed wave.
        if let Some(wave) = self.current.as_mut()
            && wave.affected.iter().any(|e| e == &event.actor)
        {
            wave.cleared.push(event.actor.clone());
            wave.clear_durations.push(clear_secs);

            let stat = self.player_stats.entry(event.actor.clone()).or_default();
            stat.cleared += 1;
            stat.avg_clear_secs += (clear_secs - stat.avg_clear_secs) / stat.cleared as f64;
        }
    }

    fn on_power_gain(&mut self) {
        self.power_stacks += 1;
        if let Some(wave) = self.current.as_mut() {
            wave.power_gained = true;
        }
    }

    fn is_excluded(&self, entity: &str) -> bool {
        self.profile
            .excluded_markers
            .iter()
            .any(|marker| entity.contains(marker))
    }

    /// Close any open wave. Must be called at end of stream; afterwards
    /// there is never a dangling open wave.
    pub fn finish(&mut self) {
        if let Some(wave) = self.current.take() {
            self.waves.push(wave);
        }
    }

    pub fn waves(&self) -> &[Wave] {
        &self.waves
    }

    pub fn player_stats(&self) -> &HashMap<String, PlayerStat> {
        &self.player_stats
    }

    pub fn debuff_events(&self) -> &[DebuffEvent] {
        &self.debuff_events
    }

    pub fn power_stacks(&self) -> u32 {
        self.power_stacks
    }

    pub fn boss_power_percent(&self) -> u32 {
        self.power_stacks * self.profile.power_percent_per_stack
    }

    pub fn enraged(&self) -> bool {
        self.power_stacks >= self.profile.enrage_stacks
    }

    pub fn profile(&self) -> &EncounterProfile {
        &self.profile
    }

    /// Decompose into final state for report building.
    pub fn into_parts(mut self) -> WaveTrackerParts {
        self.finish();
        WaveTrackerParts {
            waves: self.waves,
            player_stats: self.player_stats,
            debuff_events: self.debuff_events,
            power_stacks: self.power_stacks,
            profile: self.profile,
        }
    }
}

/// Final owned state of a finished tracker run.
#[derive(Debug)]
pub struct WaveTrackerParts {
    pub waves: Vec<Wave>,
    pub player_stats: HashMap<String, PlayerStat>,
    pub debuff_events: Vec<DebuffEvent>,
    pub power_stacks: u32,
    pub profile: EncounterProfile,
}
