//! Combat log analysis core.
//!
//! The pipeline has three stages, each usable on its own:
//! extraction ([`parser`]) turns raw lines into typed [`combat_log`]
//! events, correlation ([`correlator`]) runs the wave/combo/cast state
//! machines over the ordered stream, and aggregation ([`breakdown`],
//! [`report`]) projects the finished state into a serializable report.
//! [`session::AnalysisSession`] wires all three together.

pub mod breakdown;
pub mod combat_log;
pub mod config;
pub mod correlator;
pub mod parser;
pub mod report;
pub mod session;

pub use combat_log::{EventKind, LogEvent};
pub use config::{ConfigError, load_config};
pub use parser::{extract_event, parse_log_file};
pub use report::AnalysisReport;
pub use session::AnalysisSession;
