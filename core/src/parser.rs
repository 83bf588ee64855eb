//! Event extraction from raw log lines.
//!
//! Each line is matched structurally against the log's fixed markup:
//! a `<YYYY-MM-DD HH:MM:SS` timestamp prefix, an optional `|icNNNN;`
//! icon marker, `|r` span terminators and `|cff……` color codes around
//! names and amounts. Matching is exact; a line that carries a trigger
//! phrase but fails structural parsing is dropped, never an error.

use std::fs::File;
use std::path::Path;

use chrono::NaiveDateTime;
use memchr::{memchr, memchr_iter, memmem};
use memmap2::Mmap;
use rayon::prelude::*;

use arclog_types::EncounterProfile;

use crate::combat_log::{EventKind, LogEvent};

const ATTACKED: &str = " attacked ";
const TARGETED: &str = " targeted ";
const USING: &str = " using |cff57d6ae";
const CAUSED: &str = " and caused |cffc13d36-";
const HEALTH_SPAN: &str = " |cffc13d36Health|r|r";
const CRIT_OPEN: &str = " (|cffc13d36";
const RESTORE: &str = " to restore |cff9be85a";
const STRUCK: &str = " was struck by a |cff57d6ae";
const DEBUFF_SUFFIX: &str = " debuff!";
const CLEAR_PREFIX: &str = "'s |cff57d6ae";
const CLEAR_SUFFIX: &str = " debuff cleared";
const GAINED_BUFF: &str = " gained the buff: |cff57d6ae";
const SUCCESS_CAST: &str = " successfully cast |cff57d6ae";
const IS_CASTING: &str = " is casting |cff57d6ae";
const SPAN_END: &str = "|r|r";

/// Parse an entire log file into ordered events.
///
/// Line extraction is embarrassingly parallel (each line is independent);
/// the indexed collect preserves file order for the correlator.
pub fn parse_log_file<P: AsRef<Path>>(
    path: P,
    profile: &EncounterProfile,
) -> std::io::Result<Vec<LogEvent>> {
    let file = File::open(path)?;
    let mmap = unsafe { Mmap::map(&file)? };
    let bytes = mmap.as_ref();

    // Find all line boundaries
    let mut line_ranges: Vec<(usize, usize)> = Vec::new();
    let mut start = 0;
    for end in memchr_iter(b'\n', bytes) {
        if end > start {
            line_ranges.push((start, end));
        }
        start = end + 1;
    }
    if start < bytes.len() {
        line_ranges.push((start, bytes.len()));
    }

    let events: Vec<LogEvent> = line_ranges
        .par_iter()
        .enumerate()
        .filter_map(|(idx, &(start, end))| {
            let line = std::str::from_utf8(&bytes[start..end]).ok()?;
            extract_event(idx + 1, line, profile)
        })
        .collect();

    Ok(events)
}

/// Extract zero or one typed event from a raw line.
///
/// Patterns are attempted in fixed priority order; the first structural
/// match wins. Returns `None` for lines that match nothing, including
/// lines with a recognizable phrase but corrupt structure.
pub fn extract_event(
    line_number: usize,
    line: &str,
    profile: &EncounterProfile,
) -> Option<LogEvent> {
    let (rest, timestamp) = parse_timestamp(line)?;
    let (actor, rest) = parse_actor(rest)?;

    if let Some(rest) = rest.strip_prefix(ATTACKED) {
        return parse_attack(line_number, timestamp, actor, rest);
    }
    if let Some(rest) = rest.strip_prefix(TARGETED) {
        return parse_heal(line_number, timestamp, actor, rest);
    }
    if let Some(rest) = rest.strip_prefix(IS_CASTING) {
        let (label, rest) = take_until(rest, SPAN_END)?;
        if !rest.starts_with('!') {
            return None;
        }
        // Only the configured boss spawn cast is a wave boundary; other
        // cast-begin lines carry no information for this analysis.
        if actor == profile.boss_name && label == profile.spawn_ability {
            return Some(event(line_number, timestamp, EventKind::WaveSpawn, actor, label));
        }
        return None;
    }
    if let Some(rest) = rest.strip_prefix(STRUCK) {
        let (label, rest) = take_until(rest, SPAN_END)?;
        if !rest.starts_with(DEBUFF_SUFFIX) {
            return None;
        }
        return Some(event(line_number, timestamp, EventKind::DebuffApplied, actor, label));
    }
    if let Some(rest) = rest.strip_prefix(CLEAR_PREFIX) {
        let (label, rest) = take_until(rest, SPAN_END)?;
        if !rest.starts_with(CLEAR_SUFFIX) {
            return None;
        }
        return Some(event(line_number, timestamp, EventKind::DebuffCleared, actor, label));
    }
    if let Some(rest) = rest.strip_prefix(GAINED_BUFF) {
        let (label, _) = take_until(rest, SPAN_END)?;
        let kind = if actor == profile.boss_name && label == profile.power_buff {
            EventKind::PowerGain
        } else {
            EventKind::BuffGained
        };
        return Some(event(line_number, timestamp, kind, actor, label));
    }
    if let Some(rest) = rest.strip_prefix(SUCCESS_CAST) {
        let (label, rest) = take_until(rest, SPAN_END)?;
        if !rest.starts_with('!') {
            return None;
        }
        return Some(event(line_number, timestamp, EventKind::Cast, actor, label));
    }

    None
}

fn parse_attack(
    line_number: usize,
    timestamp: NaiveDateTime,
    actor: &str,
    rest: &str,
) -> Option<LogEvent> {
    let (target, rest) = take_until(rest, "|r")?;
    let rest = rest.strip_prefix(USING)?;
    let (label, rest) = take_until(rest, SPAN_END)?;
    let rest = rest.strip_prefix(CAUSED)?;
    let (amount, rest) = take_until(rest, SPAN_END)?;
    let magnitude = amount.parse::<i64>().ok()?;
    let rest = rest.strip_prefix(HEALTH_SPAN)?;
    let rest = rest.strip_prefix(CRIT_OPEN)?;
    let (crit_type, rest) = take_until(rest, SPAN_END)?;
    if !rest.starts_with(")!") {
        return None;
    }

    Some(LogEvent {
        line_number,
        timestamp,
        kind: EventKind::Attack,
        actor: actor.to_string(),
        target: Some(target.trim().to_string()),
        label: label.to_string(),
        magnitude: Some(magnitude),
        critical: crit_type.contains("Critical"),
    })
}

fn parse_heal(
    line_number: usize,
    timestamp: NaiveDateTime,
    actor: &str,
    rest: &str,
) -> Option<LogEvent> {
    let (target, rest) = take_until(rest, "|r")?;
    let rest = rest.strip_prefix(USING)?;
    let (label, rest) = take_until(rest, SPAN_END)?;
    let rest = rest.strip_prefix(RESTORE)?;
    let (amount, rest) = take_until(rest, SPAN_END)?;
    let magnitude = amount.parse::<i64>().ok()?;
    if !rest.starts_with(" health.") {
        return None;
    }

    Some(LogEvent {
        line_number,
        timestamp,
        kind: EventKind::Heal,
        actor: actor.to_string(),
        target: Some(target.trim().to_string()),
        label: label.to_string(),
        magnitude: Some(magnitude),
        critical: false,
    })
}

fn event(
    line_number: usize,
    timestamp: NaiveDateTime,
    kind: EventKind,
    actor: &str,
    label: &str,
) -> LogEvent {
    LogEvent {
        line_number,
        timestamp,
        kind,
        actor: actor.to_string(),
        target: None,
        label: label.to_string(),
        magnitude: None,
        critical: false,
    }
}

/// Split off the `<YYYY-MM-DD HH:MM:SS` prefix.
/// Layout is byte-checked before handing the slice to chrono, so a line
/// with a mangled timestamp fails here and is dropped by the caller.
fn parse_timestamp(input: &str) -> Option<(&str, NaiveDateTime)> {
    let b = input.as_bytes();
    if b.len() < 20
        || b[0] != b'<'
        || b[5] != b'-'
        || b[8] != b'-'
        || b[11] != b' '
        || b[14] != b':'
        || b[17] != b':'
    {
        return None;
    }
    let ts = NaiveDateTime::parse_from_str(&input[1..20], "%Y-%m-%d %H:%M:%S").ok()?;
    Some((&input[20..], ts))
}

/// Split off the actor name, dropping the `|icNNNN;` icon marker when
/// present. The span ends at the first `|r` terminator.
fn parse_actor(input: &str) -> Option<(&str, &str)> {
    let end = memmem::find(input.as_bytes(), b"|r")?;
    let span = &input[..end];
    let name = if span.starts_with('|') {
        let semi = memchr(b';', span.as_bytes())?;
        &span[semi + 1..]
    } else {
        span
    };
    Some((name.trim(), &input[end + 2..]))
}

fn take_until<'a>(input: &'a str, needle: &str) -> Option<(&'a str, &'a str)> {
    let pos = memmem::find(input.as_bytes(), needle.as_bytes())?;
    Some((&input[..pos], &input[pos + needle.len()..]))
}
