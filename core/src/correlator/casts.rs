//! Per-player cast counting for configured ability groups.

use arclog_types::CastGroup;

use crate::breakdown::Tally;
use crate::combat_log::{EventKind, LogEvent};

/// Counts successful casts (and configured buff gains) per group, per
/// actor. Counters only ever increase.
#[derive(Debug)]
pub struct CastTracker {
    groups: Vec<CastGroup>,
    /// Parallel to `groups`.
    counts: Vec<Tally>,
}

impl CastTracker {
    pub fn new(groups: Vec<CastGroup>) -> Self {
        let counts = groups.iter().map(|_| Tally::new()).collect();
        Self { groups, counts }
    }

    pub fn handle_event(&mut self, event: &LogEvent) {
        match event.kind {
            EventKind::Cast => self.record(event, |group, label| {
                group.casts.iter().any(|c| c == label)
            }),
            EventKind::BuffGained => self.record(event, |group, label| {
                group.buffs.iter().any(|b| b == label)
            }),
            _ => {}
        }
    }

    fn record(&mut self, event: &LogEvent, matches: impl Fn(&CastGroup, &str) -> bool) {
        for (group, counts) in self.groups.iter().zip(self.counts.iter_mut()) {
            if matches(group, &event.label) {
                counts.add(&event.actor, 1);
            }
        }
    }

    /// Group name and per-actor counts, in configuration order.
    pub fn group_counts(&self) -> impl Iterator<Item = (&str, &Tally)> {
        self.groups
            .iter()
            .zip(self.counts.iter())
            .map(|(group, counts)| (group.name.as_str(), counts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arclog_types::default_cast_groups;
    use chrono::NaiveDate;

    fn cast(actor: &str, label: &str, kind: EventKind) -> LogEvent {
        LogEvent {
            line_number: 0,
            timestamp: NaiveDate::from_ymd_opt(2025, 3, 1)
                .unwrap()
                .and_hms_opt(21, 0, 0)
                .unwrap(),
            kind,
            actor: actor.to_string(),
            target: None,
            label: label.to_string(),
            magnitude: None,
            critical: false,
        }
    }

    #[test]
    fn counts_casts_into_matching_group() {
        let mut t = CastTracker::new(default_cast_groups());
        t.handle_event(&cast("Vex", "Desolate Sea Sovereign", EventKind::Cast));
        t.handle_event(&cast("Vex", "Arcadian Sea Sovereign", EventKind::Cast));
        t.handle_event(&cast("Mira", "Stillness", EventKind::Cast));

        let scepter = t
            .group_counts()
            .find(|(name, _)| *name == "Kraken Scepter")
            .map(|(_, counts)| counts.get("Vex"))
            .unwrap();
        assert_eq!(scepter, 2);
    }

    #[test]
    fn buff_backed_group_counts_buff_gains() {
        let mut t = CastTracker::new(default_cast_groups());
        t.handle_event(&cast(
            "Vex",
            "Arcadian Sea Keeper Stealth",
            EventKind::BuffGained,
        ));
        let shield = t
            .group_counts()
            .find(|(name, _)| *name == "Kraken Shield")
            .map(|(_, counts)| counts.get("Vex"))
            .unwrap();
        assert_eq!(shield, 1);
    }

    #[test]
    fn unrelated_labels_count_nowhere() {
        let mut t = CastTracker::new(default_cast_groups());
        t.handle_event(&cast("Vex", "Some Random Spell", EventKind::Cast));
        assert!(t.group_counts().all(|(_, counts)| counts.is_empty()));
    }
}
