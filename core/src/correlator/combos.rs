//! Combo detection.
//!
//! Two bounded-time AND-conditions are tracked:
//! - a buff conjunction: the trigger cast succeeds when every prerequisite
//!   buff was gained recently enough, each under its own window;
//! - an attack chain: an opener attack on a target followed by the
//!   reaction debuff on that target within a short window credits the
//!   attacker.

use chrono::NaiveDateTime;
use hashbrown::HashMap;

use arclog_types::{BuffComboConfig, ChainComboConfig};

use crate::breakdown::Tally;
use crate::combat_log::{EventKind, LogEvent};

#[derive(Debug, Clone)]
struct PendingChain {
    attacker: String,
    opened_at: NaiveDateTime,
}

/// Stateful detector for both combo variants.
#[derive(Debug)]
pub struct ComboTracker {
    buff_combo: BuffComboConfig,
    chain_combo: ChainComboConfig,
    /// Entity -> prerequisite label -> last time the buff was gained.
    /// Timestamps never expire on their own; they are checked and then
    /// consumed by the trigger cast.
    prereq_seen: HashMap<String, HashMap<String, NaiveDateTime>>,
    /// Target -> most recent opener attack. A newer opener on the same
    /// target overwrites the older one (last-attacker-wins, kept as-is).
    /// Bounded by the number of distinct target names; entries are never
    /// expired.
    pending_chains: HashMap<String, PendingChain>,
    buff_successes: Tally,
    chain_successes: Tally,
}

impl ComboTracker {
    pub fn new(buff_combo: BuffComboConfig, chain_combo: ChainComboConfig) -> Self {
        Self {
            buff_combo,
            chain_combo,
            prereq_seen: HashMap::new(),
            pending_chains: HashMap::new(),
            buff_successes: Tally::new(),
            chain_successes: Tally::new(),
        }
    }

    pub fn handle_event(&mut self, event: &LogEvent) {
        match event.kind {
            EventKind::BuffGained => self.on_buff(event),
            EventKind::Cast if event.label == self.buff_combo.trigger_cast => {
                self.on_trigger_cast(event)
            }
            EventKind::Attack if event.label == self.chain_combo.opener_ability => {
                self.on_opener(event)
            }
            EventKind::DebuffApplied if event.label == self.chain_combo.reaction_debuff => {
                self.on_reaction(event)
            }
            _ => {}
        }
    }

    fn on_buff(&mut self, event: &LogEvent) {
        let is_prereq = self
            .buff_combo
            .prerequisites
            .iter()
            .any(|p| p.label == event.label);
        if !is_prereq {
            return;
        }
        self.prereq_seen
            .entry(event.actor.clone())
            .or_default()
            .insert(event.label.clone(), event.timestamp);
    }

    fn on_trigger_cast(&mut self, event: &LogEvent) {
        if let Some(buffs) = self.prereq_seen.get(&event.actor) {
            let all_fresh = self.buff_combo.prerequisites.iter().all(|prereq| {
                buffs.get(&prereq.label).is_some_and(|seen| {
                    event.timestamp.signed_duration_since(*seen).num_seconds()
                        <= prereq.window_secs
                })
            });
            if all_fresh {
                tracing::debug!(player = %event.actor, combo = %self.buff_combo.name, "combo success");
                self.buff_successes.add(&event.actor, 1);
            }
        }
        // One-shot consumption: the check spends the buffs whether or not
        // the conjunction held.
        self.prereq_seen.remove(&event.actor);
    }

    fn on_opener(&mut self, event: &LogEvent) {
        let Some(target) = event.target.as_deref() else {
            return;
        };
        self.pending_chains.insert(
            target.to_string(),
            PendingChain {
                attacker: event.actor.clone(),
                opened_at: event.timestamp,
            },
        );
    }

    fn on_reaction(&mut self, event: &LogEvent) {
        // The struck entity is the chain key; a reaction with no pending
        // chain is a no-op.
        let Some(chain) = self.pending_chains.get(&event.actor) else {
            return;
        };
        let elapsed = event
            .timestamp
            .signed_duration_since(chain.opened_at)
            .num_seconds();
        if elapsed <= self.chain_combo.window_secs {
            tracing::debug!(player = %chain.attacker, combo = %self.chain_combo.name, "combo success");
            let attacker = chain.attacker.clone();
            self.chain_successes.add(&attacker, 1);
        }
    }

    pub fn buff_combo_name(&self) -> &str {
        &self.buff_combo.name
    }

    pub fn chain_combo_name(&self) -> &str {
        &self.chain_combo.name
    }

    pub fn buff_successes(&self) -> &Tally {
        &self.buff_successes
    }

    pub fn chain_successes(&self) -> &Tally {
        &self.chain_successes
    }
}
