//! Diplomatic notifications recorded by the engine.
//!
//! The engine never drives presentation directly (sound, panels, music).
//! Instead each action handler pushes a [`DiplomacyEvent`] and the caller
//! decides what to show. Events serialize as JSON lines:
//!
//! ```json
//! {"type":"war_declared","turn":12,"aggressor":0,"victim":2}
//! ```
//!
//! # Events
//!
//! - `bonus_added` - An effect landed in a ledger
//! - `effects_expired` - Decay removed one or more effects from a ledger
//! - `war_declared` - A realm declared war
//! - `pact_activated` - A defensive pact pulled a third party into a war
//! - `promise_resolved` - A vote promise was kept or broken
//! - `realm_lost` - A realm left the game
//! - `meeting` - Two realms met

use crate::bonus::BonusKind;
use crate::state::RealmIndex;
use serde::{Deserialize, Serialize};
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiplomacyEvent {
    BonusAdded {
        turn: u32,
        owner: RealmIndex,
        target: RealmIndex,
        kind: BonusKind,
    },

    EffectsExpired {
        turn: u32,
        owner: RealmIndex,
        target: RealmIndex,
        kinds: Vec<BonusKind>,
    },

    WarDeclared {
        turn: u32,
        aggressor: RealmIndex,
        victim: RealmIndex,
    },

    /// `ally` joined against `aggressor` to defend `defended`.
    PactActivated {
        turn: u32,
        aggressor: RealmIndex,
        defended: RealmIndex,
        ally: RealmIndex,
        ally_name: String,
    },

    PromiseResolved {
        turn: u32,
        /// Realm that held the promise
        promisee: RealmIndex,
        /// Realm that promised and then voted
        voter: RealmIndex,
        kept: bool,
    },

    RealmLost {
        turn: u32,
        realm: RealmIndex,
    },

    Meeting {
        turn: u32,
        a: RealmIndex,
        b: RealmIndex,
    },
}

#[derive(Error, Debug)]
pub enum EventLogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Ordered record of everything the engine emitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLog {
    events: Vec<DiplomacyEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: DiplomacyEvent) {
        log::trace!("event: {:?}", event);
        self.events.push(event);
    }

    pub fn events(&self) -> &[DiplomacyEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Take every recorded event, leaving the log empty.
    pub fn drain(&mut self) -> Vec<DiplomacyEvent> {
        std::mem::take(&mut self.events)
    }

    /// Write one JSON object per line.
    pub fn write_jsonl(&self, writer: &mut dyn Write) -> Result<(), EventLogError> {
        for event in &self.events {
            serde_json::to_writer(&mut *writer, event)?;
            writeln!(writer)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Write the log to `path` as JSONL, replacing any existing file.
    pub fn to_jsonl_file(&self, path: impl AsRef<Path>) -> Result<(), EventLogError> {
        let file = std::fs::File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_jsonl(&mut writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_war_declared_shape() {
        let event = DiplomacyEvent::WarDeclared {
            turn: 12,
            aggressor: 0,
            victim: 2,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "war_declared");
        assert_eq!(json["turn"], 12);
        assert_eq!(json["aggressor"], 0);
        assert_eq!(json["victim"], 2);
    }

    #[test]
    fn test_bonus_kind_serializes_snake_case() {
        let event = DiplomacyEvent::BonusAdded {
            turn: 1,
            owner: 1,
            target: 0,
            kind: BonusKind::WarDeclarationAgainstUs,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "war_declaration_against_us");
    }

    #[test]
    fn test_write_jsonl_one_line_per_event() {
        let mut log = EventLog::new();
        log.push(DiplomacyEvent::RealmLost { turn: 3, realm: 1 });
        log.push(DiplomacyEvent::Meeting { turn: 3, a: 0, b: 2 });

        let mut out = Vec::new();
        log.write_jsonl(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);

        let back: DiplomacyEvent = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(back, DiplomacyEvent::Meeting { turn: 3, a: 0, b: 2 });
    }

    #[test]
    fn test_drain_empties_log() {
        let mut log = EventLog::new();
        log.push(DiplomacyEvent::RealmLost { turn: 0, realm: 0 });
        assert_eq!(log.drain().len(), 1);
        assert!(log.is_empty());
    }
}
