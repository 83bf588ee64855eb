//! Temporal correlation of the ordered event stream.
//!
//! Three independent state machines consume events in file order:
//! - `WaveTracker` pairs debuff applications with their clears and groups
//!   them into spawn-bounded waves;
//! - `ComboTracker` detects the two bounded-time combo variants;
//! - `CastTracker` counts configured ability casts per player.
//!
//! Input order is trusted as-is: timestamps are non-decreasing in the
//! source and the correlators never re-sort.

mod casts;
mod combos;
mod waves;

#[cfg(test)]
mod waves_tests;

pub use casts::CastTracker;
pub use combos::ComboTracker;
pub use waves::{DebuffEvent, PlayerStat, Wave, WaveTracker, WaveTrackerParts};
