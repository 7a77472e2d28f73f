//! Search orchestrator: primary engine, single fallback, quality filter.
//!
//! The orchestrator never fails. Fetch and extraction problems are logged
//! and treated as "no results from that engine", so the worst outcome of a
//! search is an empty result set.

pub mod filter;
pub mod search;

pub use filter::quality_filter;
pub use search::Orchestrator;
