//! Tests for the wave tracker.
//!
//! Covers the spawn-bounded wave lifecycle, apply/clear pairing with the
//! single-slot active index, and the derived failure counts.

use chrono::{NaiveDate, NaiveDateTime};

use arclog_types::EncounterProfile;

use super::waves::WaveTracker;
use crate::combat_log::{EventKind, LogEvent};

fn ts(secs: i64) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, 1)
        .unwrap()
        .and_hms_opt(21, 0, 0)
        .unwrap()
        + chrono::Duration::seconds(secs)
}

fn ev(kind: EventKind, actor: &str, at: i64) -> LogEvent {
    LogEvent {
        line_number: 0,
        timestamp: ts(at),
        kind,
        actor: actor.to_string(),
        target: None,
        label: "Penetrating Dark Energy".to_string(),
        magnitude: None,
        critical: false,
    }
}

fn spawn(at: i64) -> LogEvent {
    ev(EventKind::WaveSpawn, "Black Dragon", at)
}

fn applied(player: &str, at: i64) -> LogEvent {
    ev(EventKind::DebuffApplied, player, at)
}

fn cleared(player: &str, at: i64) -> LogEvent {
    ev(EventKind::DebuffCleared, player, at)
}

fn tracker() -> WaveTracker {
    WaveTracker::new(EncounterProfile::default())
}

#[test]
fn apply_then_clear_inside_one_wave() {
    let mut t = tracker();
    t.handle_event(&spawn(0));
    t.handle_event(&applied("P1", 1));
    t.handle_event(&cleared("P1", 10));
    t.handle_event(&spawn(60));
    t.finish();

    assert_eq!(t.waves().len(), 2);
    let wave = &t.waves()[0];
    assert_eq!(wave.affected, vec!["P1"]);
    assert_eq!(wave.cleared, vec!["P1"]);
    assert_eq!(wave.clear_durations, vec![9.0]);
    assert!(wave.failed().is_empty());

    let stat = &t.player_stats()["P1"];
    assert_eq!(stat.total, 1);
    assert_eq!(stat.cleared, 1);
    assert!((stat.avg_clear_secs - 9.0).abs() < f64::EPSILON);
}

#[test]
fn uncleared_debuff_fails_at_wave_close() {
    let mut t = tracker();
    t.handle_event(&spawn(0));
    t.handle_event(&applied("P1", 1));
    t.handle_event(&spawn(60));
    t.finish();

    let wave = &t.waves()[0];
    assert_eq!(wave.affected, vec!["P1"]);
    assert!(wave.cleared.is_empty());
    assert_eq!(wave.failed(), vec!["P1"]);

    let stat = &t.player_stats()["P1"];
    assert_eq!(stat.total, 1);
    assert_eq!(stat.cleared, 0);
}

#[test]
fn replayed_clear_is_a_noop() {
    let mut t = tracker();
    t.handle_event(&spawn(0));
    t.handle_event(&applied("P1", 1));
    t.handle_event(&cleared("P1", 5));
    t.handle_event(&cleared("P1", 6));
    t.finish();

    let stat = &t.player_stats()["P1"];
    assert_eq!(stat.cleared, 1);
    assert_eq!(t.waves()[0].cleared.len(), 1);
}

#[test]
fn clear_without_apply_is_a_noop() {
    let mut t = tracker();
    t.handle_event(&spawn(0));
    t.handle_event(&cleared("P1", 5));
    t.finish();

    assert!(t.player_stats().is_empty());
    assert!(t.waves()[0].cleared.is_empty());
}

#[test]
fn reapplication_overwrites_active_slot() {
    let mut t = tracker();
    t.handle_event(&spawn(0));
    t.handle_event(&applied("P1", 1));
    t.handle_event(&applied("P1", 7));
    t.handle_event(&cleared("P1", 10));
    t.finish();

    // Last-applied-wins: clear pairs with the second application (3s),
    // not the abandoned first one (9s).
    assert_eq!(t.waves()[0].clear_durations, vec![3.0]);
    // Re-application within the same wave does not double-count total
    let stat = &t.player_stats()["P1"];
    assert_eq!(stat.total, 1);

    // Both lifecycle records exist; only the second is marked cleared
    let events = t.debuff_events();
    assert_eq!(events.len(), 2);
    assert!(!events[0].cleared);
    assert!(events[1].cleared);
}

#[test]
fn repeated_application_same_wave_counts_total_once() {
    let mut t = tracker();
    t.handle_event(&spawn(0));
    t.handle_event(&applied("P1", 1));
    t.handle_event(&applied("P1", 2));
    t.handle_event(&applied("P1", 3));
    t.finish();

    assert_eq!(t.waves()[0].affected, vec!["P1"]);
    assert_eq!(t.player_stats()["P1"].total, 1);
}

#[test]
fn debuff_outside_wave_tracks_lifecycle_but_no_attribution() {
    let mut t = tracker();
    t.handle_event(&applied("P1", 1));
    t.handle_event(&cleared("P1", 4));
    t.finish();

    assert!(t.waves().is_empty());
    assert!(t.player_stats().is_empty());
    let events = t.debuff_events();
    assert_eq!(events.len(), 1);
    assert!(events[0].cleared);
}

#[test]
fn late_clear_after_wave_close_not_attributed() {
    let mut t = tracker();
    t.handle_event(&spawn(0));
    t.handle_event(&applied("P1", 1));
    t.handle_event(&spawn(60));
    t.handle_event(&cleared("P1", 61));
    t.finish();

    // The first wave closed with P1 unresolved; the late clear resolves
    // the lifecycle record but credits neither wave nor player stats.
    assert_eq!(t.waves()[0].failed(), vec!["P1"]);
    assert!(t.waves()[1].cleared.is_empty());
    let stat = &t.player_stats()["P1"];
    assert_eq!(stat.total, 1);
    assert_eq!(stat.cleared, 0);
    assert!(t.debuff_events()[0].cleared);
}

#[test]
fn non_player_entities_are_skipped() {
    let mut t = tracker();
    t.handle_event(&spawn(0));
    t.handle_event(&applied("Vex's Mount", 1));
    t.handle_event(&applied("Scout Companion", 2));
    t.finish();

    assert!(t.waves()[0].affected.is_empty());
    assert!(t.player_stats().is_empty());
    assert!(t.debuff_events().is_empty());
}

#[test]
fn other_debuff_labels_are_ignored() {
    let mut t = tracker();
    t.handle_event(&spawn(0));
    let mut other = applied("P1", 1);
    other.label = "Dissonance".to_string();
    t.handle_event(&other);
    t.finish();

    assert!(t.waves()[0].affected.is_empty());
}

#[test]
fn online_average_matches_arithmetic_mean() {
    let mut t = tracker();
    t.handle_event(&spawn(0));
    t.handle_event(&applied("P1", 1));
    t.handle_event(&cleared("P1", 5)); // 4s
    t.handle_event(&applied("P1", 10));
    t.handle_event(&cleared("P1", 21)); // 11s
    t.handle_event(&applied("P1", 30));
    t.handle_event(&cleared("P1", 37)); // 7s
    t.finish();

    let stat = &t.player_stats()["P1"];
    assert_eq!(stat.cleared, 3);
    let expected = (4.0 + 11.0 + 7.0) / 3.0;
    assert!((stat.avg_clear_secs - expected).abs() < 1e-9);
}

#[test]
fn power_gain_accumulates_and_marks_wave() {
    let mut t = tracker();
    t.handle_event(&ev(EventKind::PowerGain, "Black Dragon", 1));
    t.handle_event(&spawn(2));
    t.handle_event(&ev(EventKind::PowerGain, "Black Dragon", 3));
    t.finish();

    assert_eq!(t.power_stacks(), 2);
    assert_eq!(t.boss_power_percent(), 20);
    assert!(!t.enraged());
    assert!(t.waves()[0].power_gained);
}

#[test]
fn enrage_at_threshold() {
    let mut t = tracker();
    for i in 0..15 {
        t.handle_event(&ev(EventKind::PowerGain, "Black Dragon", i));
    }
    assert!(t.enraged());
    assert_eq!(t.boss_power_percent(), 150);
}

#[test]
fn end_of_stream_closes_open_wave() {
    let mut t = tracker();
    t.handle_event(&spawn(0));
    t.handle_event(&applied("P1", 1));
    t.finish();

    assert_eq!(t.waves().len(), 1);
    // finish is idempotent
    t.finish();
    assert_eq!(t.waves().len(), 1);
}
