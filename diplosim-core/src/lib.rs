//! # Diplomatic Relationship Engine
//!
//! Tracks, decays and summarizes how every realm regards every other realm in
//! a turn-based strategy simulation.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐     ┌───────────────┐     ┌──────────────────┐
//! │ Action        │────▶│  Diplomacy    │────▶│ RelationshipReg- │
//! │ handlers      │     │ (world state) │     │ istry (per realm)│
//! └───────────────┘     └──────┬────────┘     └────────┬─────────┘
//!                              │                       │
//!                     ┌────────▼───────┐      ┌────────▼─────────┐
//!                     │  EventLog      │      │ RelationshipLed- │
//!                     │  (notices)     │      │ ger (per target) │
//!                     └────────────────┘      └────────┬─────────┘
//!                                                      │
//!                                             ┌────────▼─────────┐
//!                                             │ BonusEffect      │
//!                                             │ (timed modifier) │
//!                                             └──────────────────┘
//! ```
//!
//! ## Key Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`BonusKind`] | Closed set of diplomatic event kinds with a fixed table |
//! | [`RelationshipLedger`] | One realm's running account of another |
//! | [`RelationshipRegistry`] | Every ledger a realm holds |
//! | [`Diplomacy`] | All registries, action handlers, turn advance |
//! | [`run_pact_cascade`] | Defensive-pact chain reaction |
//! | [`DiplomacyEvent`] | Notifications for presentation layers |
//!
//! ## Turn contract
//!
//! Every action for a turn is applied first; [`Diplomacy::advance_turn`] then
//! decays every ledger exactly once. Symmetric relations (war, alliance,
//! pacts, peace) go through [`Diplomacy::apply_symmetric_effect`] so both
//! ledgers change together.

pub mod bonus;
pub mod config;
pub mod events;
pub mod ledger;
pub mod pact;
pub mod profiling;
pub mod registry;
pub mod relations;
pub mod save;
pub mod state;
pub mod testing;

pub use bonus::{BonusEffect, BonusKind, PERMANENT};
pub use config::DiplomacyConfig;
pub use events::{DiplomacyEvent, EventLog, EventLogError};
pub use ledger::RelationshipLedger;
pub use pact::{
    run_pact_cascade, CascadeReport, NoopMaterializer, PactActivation, RecordingMaterializer,
    WarMaterializer,
};
pub use registry::{apply_symmetric_effect, RelationsError, RelationshipRegistry};
pub use profiling::TraceLevel;
pub use relations::{
    casus_belli_report, combined_relation_text, ledger_liking_tier, liking_tier,
    multiple_border_crossings, relation_label, CasusBelliReport, LikingTier, RelationLabel,
};
pub use save::{DiplomacySave, LoadError};
pub use state::{AffinitySource, Diplomacy, Realm, RealmIndex, RealmNames};
pub use testing::DiplomacyBuilder;
