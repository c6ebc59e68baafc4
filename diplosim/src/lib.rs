//! Scenario runner for the diplomatic relationship engine.
//!
//! A scenario is a JSON file naming the realms, an optional engine config and
//! a list of turn-stamped actions. The binary replays it turn by turn.

pub mod scenario;
