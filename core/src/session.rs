//! One analysis run over a log, from raw lines to the final report.
//!
//! The session owns every correlator and feeds each extracted event to
//! all of them in file order. Lines can arrive in any grouping (whole
//! file, chunks, one at a time); only order matters, so chunked and
//! unchunked runs over the same bytes produce identical reports.

use arclog_types::AnalysisConfig;

use crate::breakdown::MeterAggregator;
use crate::combat_log::LogEvent;
use crate::correlator::{CastTracker, ComboTracker, WaveTracker};
use crate::parser::extract_event;
use crate::report::{self, AnalysisReport};

pub struct AnalysisSession {
    profile: arclog_types::EncounterProfile,
    line_number: usize,
    waves: WaveTracker,
    combos: ComboTracker,
    casts: CastTracker,
    meters: MeterAggregator,
}

impl AnalysisSession {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            profile: config.profile.clone(),
            line_number: 0,
            waves: WaveTracker::new(config.profile),
            combos: ComboTracker::new(config.buff_combo, config.chain_combo),
            casts: CastTracker::new(config.cast_groups),
            meters: MeterAggregator::new(config.boards),
        }
    }

    /// Feed one raw log line. Unparseable lines are counted but otherwise
    /// ignored.
    pub fn process_line(&mut self, line: &str) {
        self.line_number += 1;
        if let Some(event) = extract_event(self.line_number, line, &self.profile) {
            self.process_event(&event);
        }
    }

    /// Feed a batch of raw lines, in order.
    pub fn process_lines<'a, I: IntoIterator<Item = &'a str>>(&mut self, lines: I) {
        for line in lines {
            self.process_line(line);
        }
    }

    /// Feed one already-extracted event.
    pub fn process_event(&mut self, event: &LogEvent) {
        self.waves.handle_event(event);
        self.combos.handle_event(event);
        self.casts.handle_event(event);
        self.meters.handle_event(event);
    }

    /// Number of raw lines seen so far.
    pub fn lines_seen(&self) -> usize {
        self.line_number
    }

    /// Close any open wave and build the report.
    pub fn finish(self) -> AnalysisReport {
        tracing::debug!(lines = self.line_number, "analysis finished");
        report::build_report(self.waves, self.combos, self.casts, self.meters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synthetic_log() -> Vec<String> {
        let mut lines = Vec::new();
        let line = |secs: u32, body: &str| {
            format!("<2025-03-01 21:00:{secs:02}{body}")
        };
        // Wave 1: Ana clears, Bo fails; boss gains power
        lines.push(line(
            0,
            "|ic1;Black Dragon|r is casting |cff57d6aePenetrating Dark Energy|r|r!",
        ));
        lines.push(line(
            1,
            "|ic2;Ana|r was struck by a |cff57d6aePenetrating Dark Energy|r|r debuff!",
        ));
        lines.push(line(
            2,
            "|ic3;Bo|r was struck by a |cff57d6aePenetrating Dark Energy|r|r debuff!",
        ));
        lines.push(line(
            3,
            "|ic2;Ana|r attacked Kraken|r using |cff57d6aeTriple Slash|r|r and caused |cffc13d36-500|r|r |cffc13d36Health|r|r (|cffc13d36Critical Hit!|r|r)!",
        ));
        lines.push(line(
            5,
            "|ic2;Ana|r's |cff57d6aePenetrating Dark Energy|r|r debuff cleared",
        ));
        lines.push(line(
            8,
            "|ic1;Black Dragon|r gained the buff: |cff57d6aeDevilish Contract|r|r.",
        ));
        // Wave 2: nobody struck
        lines.push(line(
            30,
            "|ic1;Black Dragon|r is casting |cff57d6aePenetrating Dark Energy|r|r!",
        ));
        // Combos and casts in between
        lines.push(line(31, "|ic2;Ana|r gained the buff: |cff57d6aeRetribution|r|r."));
        lines.push(line(
            32,
            "|ic2;Ana|r gained the buff: |cff57d6aeToughened (Rank 4)|r|r.",
        ));
        lines.push(line(
            33,
            "|ic2;Ana|r gained the buff: |cff57d6aeBull Rush: Aggro Boost|r|r.",
        ));
        lines.push(line(
            34,
            "|ic2;Ana|r successfully cast |cff57d6aeMocking Howl|r|r!",
        ));
        lines.push(line(
            40,
            "|ic3;Bo|r targeted Ana|r using |cff57d6aeMend|r|r to restore |cff9be85a300|r|r health.",
        ));
        lines.push(line(41, "|ic3;Bo|r successfully cast |cff57d6aeStillness|r|r!"));
        lines.push("chatter that parses to nothing".to_string());
        lines
    }

    fn run(lines: &[String], chunk_size: usize) -> AnalysisReport {
        let mut session = AnalysisSession::new(AnalysisConfig::default());
        for chunk in lines.chunks(chunk_size) {
            session.process_lines(chunk.iter().map(String::as_str));
        }
        session.finish()
    }

    #[test]
    fn chunked_and_unchunked_runs_are_identical() {
        let lines = synthetic_log();
        let whole = serde_json::to_string(&run(&lines, lines.len())).unwrap();
        for chunk_size in [1, 2, 3, 7] {
            let chunked = serde_json::to_string(&run(&lines, chunk_size)).unwrap();
            assert_eq!(whole, chunked, "chunk size {chunk_size} diverged");
        }
    }

    #[test]
    fn end_to_end_wave_and_combo_results() {
        let lines = synthetic_log();
        let report = run(&lines, lines.len());

        assert!(report.waves.success);
        assert_eq!(report.waves.total_waves, 2);
        assert_eq!(report.waves.boss_power_percent, 10);
        assert!(!report.waves.enraged);
        assert_eq!(report.waves.wave_summary[0].failed_players, vec!["Bo"]);

        // Ana's buff combo landed: all three buffs within their windows
        let distress = report
            .combo_boards
            .iter()
            .find(|b| b.name == "Distress Combo")
            .unwrap();
        assert_eq!(distress.entries.len(), 1);
        assert_eq!(distress.entries[0].name, "Ana");

        // Cast board picked up Bo's Stillness
        let stillness = report
            .cast_boards
            .iter()
            .find(|b| b.name == "Stillness")
            .unwrap();
        assert_eq!(stillness.entries[0].name, "Bo");

        // Meters
        assert_eq!(report.damage_done[0].name, "Ana");
        assert_eq!(report.damage_done[0].value, 500);
        assert_eq!(report.healing_received[0].name, "Ana");
        assert_eq!(report.healing_received[0].value, 300);
        assert_eq!(report.damage_taken_from[0].target, "Kraken");
        assert_eq!(report.damage_taken_from[0].sources[0].name, "Ana");
        assert_eq!(report.damage_taken_from[0].sources[0].value, 500);
    }

    #[test]
    fn empty_input_reports_no_waves() {
        let session = AnalysisSession::new(AnalysisConfig::default());
        let report = session.finish();
        assert!(!report.waves.success);
        assert_eq!(
            report.waves.message.as_deref(),
            Some("no debuff waves detected in log")
        );
    }

    #[test]
    fn player_failed_counts_derive_from_totals() {
        let lines = synthetic_log();
        let report = run(&lines, lines.len());
        for row in &report.waves.player_stats {
            assert_eq!(row.failed, i64::from(row.total) - i64::from(row.cleared));
        }
    }
}
