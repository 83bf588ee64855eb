//! Final report assembly.
//!
//! Everything here is a pure projection of finished tracker state into
//! serializable rows. Derived figures (failed counts, clear rates, wave
//! averages) are computed at this point, never stored incrementally.

use serde::Serialize;

use crate::breakdown::{AbilityRow, BoardEntry, MeterAggregator};
use crate::correlator::{CastTracker, ComboTracker, DebuffEvent, WaveTracker};

/// One player's debuff track record across every wave.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerStatRow {
    pub player: String,
    pub total: u32,
    pub cleared: u32,
    /// `total - cleared`. Negative when a re-applied debuff was cleared
    /// more than once inside one wave: re-application does not bump
    /// `total` (per-wave idempotence) but every in-wave clear counts, so
    /// under last-applied-wins `cleared` can exceed `total`. The rate
    /// exceeds 100 in the same case.
    pub failed: i64,
    /// Cleared share as a percentage, one decimal. `None` when the player
    /// was never affected.
    pub clear_rate_percent: Option<f64>,
    pub avg_clear_secs: f64,
}

/// One wave, summarized.
#[derive(Debug, Clone, Serialize)]
pub struct WaveSummaryRow {
    /// 1-based wave number in spawn order.
    pub wave: usize,
    pub players_hit: usize,
    pub cleared: usize,
    pub failed: usize,
    pub avg_clear_secs: f64,
    pub power_gained: bool,
    pub failed_players: Vec<String>,
}

/// The wave section of the report.
#[derive(Debug, Clone, Serialize)]
pub struct WaveReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub total_waves: usize,
    pub boss_power_percent: u32,
    pub enraged: bool,
    pub player_stats: Vec<PlayerStatRow>,
    pub wave_summary: Vec<WaveSummaryRow>,
    pub debuff_events: Vec<DebuffEvent>,
}

/// A named ranked board (combos, cast groups).
#[derive(Debug, Clone, Serialize)]
pub struct Leaderboard {
    pub name: String,
    pub entries: Vec<BoardEntry>,
}

/// Tolerance-filtered attacker sources for one target.
#[derive(Debug, Clone, Serialize)]
pub struct DamageSourceBreakdown {
    pub target: String,
    pub sources: Vec<BoardEntry>,
}

/// Tolerance-filtered ability rows for one attacker.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerAbilityBreakdown {
    pub player: String,
    pub abilities: Vec<AbilityRow>,
}

/// The complete analysis output, ready for serialization.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub waves: WaveReport,
    pub combo_boards: Vec<Leaderboard>,
    pub cast_boards: Vec<Leaderboard>,
    pub damage_done: Vec<BoardEntry>,
    pub healing_done: Vec<BoardEntry>,
    pub damage_taken: Vec<BoardEntry>,
    pub healing_received: Vec<BoardEntry>,
    pub pot_healing: Vec<BoardEntry>,
    pub damage_taken_from: Vec<DamageSourceBreakdown>,
    pub ability_breakdowns: Vec<PlayerAbilityBreakdown>,
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub(crate) fn build_wave_report(tracker: WaveTracker) -> WaveReport {
    let parts = tracker.into_parts();

    let mut player_stats: Vec<PlayerStatRow> = parts
        .player_stats
        .iter()
        .map(|(player, stat)| {
            let failed = i64::from(stat.total) - i64::from(stat.cleared);
            let clear_rate_percent = if stat.total == 0 {
                None
            } else {
                Some(round1(stat.cleared as f64 / stat.total as f64 * 100.0))
            };
            PlayerStatRow {
                player: player.clone(),
                total: stat.total,
                cleared: stat.cleared,
                failed,
                clear_rate_percent,
                avg_clear_secs: round1(stat.avg_clear_secs),
            }
        })
        .collect();
    // Best performers first: rate desc, then faster average, then name so
    // the ordering stays deterministic across runs.
    player_stats.sort_by(|a, b| {
        let rate = b
            .clear_rate_percent
            .unwrap_or(-1.0)
            .total_cmp(&a.clear_rate_percent.unwrap_or(-1.0));
        rate.then_with(|| a.avg_clear_secs.total_cmp(&b.avg_clear_secs))
            .then_with(|| a.player.cmp(&b.player))
    });

    let wave_summary: Vec<WaveSummaryRow> = parts
        .waves
        .iter()
        .enumerate()
        .map(|(idx, wave)| WaveSummaryRow {
            wave: idx + 1,
            players_hit: wave.affected.len(),
            cleared: wave.cleared.len(),
            failed: wave.failed().len(),
            avg_clear_secs: round1(wave.avg_clear_secs()),
            power_gained: wave.power_gained,
            failed_players: wave.failed(),
        })
        .collect();

    let success = !parts.waves.is_empty();
    WaveReport {
        success,
        message: (!success).then(|| "no debuff waves detected in log".to_string()),
        total_waves: parts.waves.len(),
        boss_power_percent: parts.power_stacks * parts.profile.power_percent_per_stack,
        enraged: parts.power_stacks >= parts.profile.enrage_stacks,
        player_stats,
        wave_summary,
        debuff_events: parts.debuff_events,
    }
}

pub(crate) fn build_report(
    waves: WaveTracker,
    combos: ComboTracker,
    casts: CastTracker,
    meters: MeterAggregator,
) -> AnalysisReport {
    let combo_limit = Some(meters.boards().combo_board_limit);
    let entity_limit = Some(meters.boards().entity_board_limit);

    let combo_boards = vec![
        Leaderboard {
            name: combos.buff_combo_name().to_string(),
            entries: combos.buff_successes().ranked(combo_limit),
        },
        Leaderboard {
            name: combos.chain_combo_name().to_string(),
            entries: combos.chain_successes().ranked(combo_limit),
        },
    ];

    let cast_boards = casts
        .group_counts()
        .map(|(name, counts)| Leaderboard {
            name: name.to_string(),
            entries: counts.ranked(combo_limit),
        })
        .collect();

    let damage_taken_from = meters
        .damage_sources()
        .into_iter()
        .map(|(target, sources)| DamageSourceBreakdown { target, sources })
        .collect();

    let ability_breakdowns = meters
        .ability_breakdowns()
        .into_iter()
        .map(|(player, abilities)| PlayerAbilityBreakdown { player, abilities })
        .collect();

    AnalysisReport {
        waves: build_wave_report(waves),
        combo_boards,
        cast_boards,
        damage_done: meters.damage_done().ranked(entity_limit),
        healing_done: meters.healing_done().ranked(entity_limit),
        damage_taken: meters.damage_taken().ranked(entity_limit),
        healing_received: meters.healing_received().ranked(entity_limit),
        pot_healing: meters.pot_healing().ranked(entity_limit),
        damage_taken_from,
        ability_breakdowns,
    }
}
