//! Aggregation and ranking.
//!
//! `Tally` is the single counter primitive used across the crate: it
//! preserves first-seen insertion order so ranking ties resolve
//! deterministically, supports the 1% significance filter, and produces
//! truncated top-N boards. `MeterAggregator` folds raw damage/heal events
//! into the boards the final report serves.

use hashbrown::HashMap;
use serde::Serialize;

use arclog_types::BoardConfig;

use crate::combat_log::{EventKind, LogEvent};

/// One ranked board row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardEntry {
    pub name: String,
    pub value: i64,
}

/// Insertion-ordered name -> value counter.
///
/// Iteration and ranking tie-breaks follow first-seen order, which is the
/// documented deterministic tie-break for equal values.
#[derive(Debug, Clone, Default)]
pub struct Tally {
    entries: Vec<(String, i64)>,
    index: HashMap<String, usize>,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: &str, amount: i64) {
        match self.index.get(name) {
            Some(&idx) => self.entries[idx].1 += amount,
            None => {
                self.index.insert(name.to_string(), self.entries.len());
                self.entries.push((name.to_string(), amount));
            }
        }
    }

    pub fn get(&self, name: &str) -> i64 {
        self.index.get(name).map_or(0, |&idx| self.entries[idx].1)
    }

    pub fn sum(&self) -> i64 {
        self.entries.iter().map(|(_, v)| v).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Descending by value; ties keep first-seen order (stable sort).
    /// `limit` of `None` returns every entry.
    pub fn ranked(&self, limit: Option<usize>) -> Vec<BoardEntry> {
        let mut rows: Vec<BoardEntry> = self
            .entries
            .iter()
            .map(|(name, value)| BoardEntry {
                name: name.clone(),
                value: *value,
            })
            .collect();
        rows.sort_by(|a, b| b.value.cmp(&a.value));
        if let Some(limit) = limit {
            rows.truncate(limit);
        }
        rows
    }

    /// Drop entries below `ratio` of the total before ranking. This is a
    /// significance filter, not a minimum count.
    pub fn ranked_with_tolerance(&self, ratio: f64, limit: Option<usize>) -> Vec<BoardEntry> {
        let floor = self.sum() as f64 * ratio;
        let mut rows: Vec<BoardEntry> = self
            .entries
            .iter()
            .filter(|(_, value)| *value as f64 >= floor)
            .map(|(name, value)| BoardEntry {
                name: name.clone(),
                value: *value,
            })
            .collect();
        rows.sort_by(|a, b| b.value.cmp(&a.value));
        if let Some(limit) = limit {
            rows.truncate(limit);
        }
        rows
    }
}

/// Per-ability hit statistics for one attacker.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AbilityStats {
    pub total: i64,
    pub crit_total: i64,
    pub hits: u32,
    pub crits: u32,
    pub highest_hit: i64,
}

impl AbilityStats {
    fn record(&mut self, amount: i64, critical: bool) {
        self.total += amount;
        self.hits += 1;
        if critical {
            self.crit_total += amount;
            self.crits += 1;
        }
        if amount > self.highest_hit {
            self.highest_hit = amount;
        }
    }

    /// Average hit, one decimal.
    pub fn average_hit(&self) -> f64 {
        if self.hits == 0 {
            return 0.0;
        }
        let avg = self.total as f64 / self.hits as f64;
        (avg * 10.0).round() / 10.0
    }

    /// Share of damage dealt by crits, truncated integer percent.
    pub fn crit_share_percent(&self) -> i64 {
        if self.total == 0 {
            return 0;
        }
        self.crit_total * 100 / self.total
    }

    /// Crit rate over hit count, truncated integer percent.
    pub fn crit_chance_percent(&self) -> i64 {
        if self.hits == 0 {
            return 0;
        }
        self.crits as i64 * 100 / self.hits as i64
    }
}

/// Insertion-ordered ability -> stats map for one attacker.
#[derive(Debug, Clone, Default)]
pub struct AbilityTally {
    entries: Vec<(String, AbilityStats)>,
    index: HashMap<String, usize>,
}

/// One row of a tolerance-filtered ability breakdown.
#[derive(Debug, Clone, Serialize)]
pub struct AbilityRow {
    pub ability: String,
    pub total: i64,
    pub crit_total: i64,
    pub hits: u32,
    pub crits: u32,
    pub highest_hit: i64,
    pub average_hit: f64,
    pub crit_share_percent: i64,
    pub crit_chance_percent: i64,
}

impl AbilityTally {
    fn record(&mut self, ability: &str, amount: i64, critical: bool) {
        let idx = match self.index.get(ability) {
            Some(&idx) => idx,
            None => {
                self.index.insert(ability.to_string(), self.entries.len());
                self.entries.push((ability.to_string(), AbilityStats::default()));
                self.entries.len() - 1
            }
        };
        self.entries[idx].1.record(amount, critical);
    }

    fn total(&self) -> i64 {
        self.entries.iter().map(|(_, s)| s.total).sum()
    }

    /// All abilities above the tolerance floor, descending by total.
    pub fn breakdown(&self, tolerance_ratio: f64) -> Vec<AbilityRow> {
        let floor = self.total() as f64 * tolerance_ratio;
        let mut rows: Vec<AbilityRow> = self
            .entries
            .iter()
            .filter(|(_, stats)| stats.total as f64 >= floor)
            .map(|(ability, stats)| AbilityRow {
                ability: ability.clone(),
                total: stats.total,
                crit_total: stats.crit_total,
                hits: stats.hits,
                crits: stats.crits,
                highest_hit: stats.highest_hit,
                average_hit: stats.average_hit(),
                crit_share_percent: stats.crit_share_percent(),
                crit_chance_percent: stats.crit_chance_percent(),
            })
            .collect();
        rows.sort_by(|a, b| b.total.cmp(&a.total));
        rows
    }
}

/// Folds attack and heal events into entity boards and per-attacker
/// ability breakdowns.
#[derive(Debug)]
pub struct MeterAggregator {
    boards: BoardConfig,
    damage_done: Tally,
    healing_done: Tally,
    damage_taken: Tally,
    healing_received: Tally,
    pot_healing: Tally,
    ability_damage: HashMap<String, AbilityTally>,
    /// Target -> per-attacker damage sources.
    damage_taken_from: HashMap<String, Tally>,
}

impl MeterAggregator {
    pub fn new(boards: BoardConfig) -> Self {
        Self {
            boards,
            damage_done: Tally::new(),
            healing_done: Tally::new(),
            damage_taken: Tally::new(),
            healing_received: Tally::new(),
            pot_healing: Tally::new(),
            ability_damage: HashMap::new(),
            damage_taken_from: HashMap::new(),
        }
    }

    pub fn handle_event(&mut self, event: &LogEvent) {
        match event.kind {
            EventKind::Attack => {
                let Some(amount) = event.magnitude else {
                    return;
                };
                self.damage_done.add(&event.actor, amount);
                if let Some(target) = event.target.as_deref() {
                    self.damage_taken.add(target, amount);
                    self.damage_taken_from
                        .entry(target.to_string())
                        .or_default()
                        .add(&event.actor, amount);
                }
                self.ability_damage
                    .entry(event.actor.clone())
                    .or_default()
                    .record(&event.label, amount, event.critical);
            }
            EventKind::Heal => {
                let Some(amount) = event.magnitude else {
                    return;
                };
                self.healing_done.add(&event.actor, amount);
                let Some(target) = event.target.as_deref() else {
                    return;
                };
                if target == event.actor {
                    // Self-heals stay off the received board; self-targeted
                    // potion labels feed the pots board.
                    if self.boards.pot_abilities.iter().any(|p| p == &event.label) {
                        self.pot_healing.add(&event.actor, amount);
                    }
                } else {
                    self.healing_received.add(target, amount);
                }
            }
            _ => {}
        }
    }

    pub fn boards(&self) -> &BoardConfig {
        &self.boards
    }

    pub fn damage_done(&self) -> &Tally {
        &self.damage_done
    }

    pub fn healing_done(&self) -> &Tally {
        &self.healing_done
    }

    pub fn damage_taken(&self) -> &Tally {
        &self.damage_taken
    }

    pub fn healing_received(&self) -> &Tally {
        &self.healing_received
    }

    pub fn pot_healing(&self) -> &Tally {
        &self.pot_healing
    }

    /// Per-target attacker sources, sorted by target name. Attackers
    /// below the tolerance share of that target's damage taken are
    /// dropped.
    pub fn damage_sources(&self) -> Vec<(String, Vec<BoardEntry>)> {
        let mut targets: Vec<&String> = self.damage_taken_from.keys().collect();
        targets.sort();
        targets
            .into_iter()
            .map(|target| {
                (
                    target.clone(),
                    self.damage_taken_from[target]
                        .ranked_with_tolerance(self.boards.tolerance_ratio, None),
                )
            })
            .collect()
    }

    /// Per-attacker ability breakdowns, sorted by attacker name for
    /// deterministic output.
    pub fn ability_breakdowns(&self) -> Vec<(String, Vec<AbilityRow>)> {
        let mut players: Vec<&String> = self.ability_damage.keys().collect();
        players.sort();
        players
            .into_iter()
            .map(|player| {
                (
                    player.clone(),
                    self.ability_damage[player].breakdown(self.boards.tolerance_ratio),
                )
            })
            .collect()
    }
}
