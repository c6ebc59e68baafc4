//! Persisted layout of the relationship state.
//!
//! Each registry saves as an ordered list of
//! `(target, meeting_count, [(kind_code, remaining_lifetime)])`. Magnitude and
//! singleton policy are re-derived from the kind table on load; only the
//! affinity kind stores its externally supplied magnitude. Everything that
//! could only come from a corrupt file is rejected here, at load time, so the
//! in-memory invariants (complete registries, singleton uniqueness, known
//! kinds) never need runtime checks.

use crate::bonus::{BonusEffect, BonusKind};
use crate::config::DiplomacyConfig;
use crate::ledger::RelationshipLedger;
use crate::registry::RelationshipRegistry;
use crate::state::{Diplomacy, Realm, RealmIndex};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Malformed save: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unknown bonus kind code {code} in ledger {owner}->{target}")]
    UnknownKind {
        owner: RealmIndex,
        target: RealmIndex,
        code: u8,
    },
    #[error("Duplicate singleton {kind:?} in ledger {owner}->{target}")]
    DuplicateSingleton {
        owner: RealmIndex,
        target: RealmIndex,
        kind: BonusKind,
    },
    #[error("Affinity effect in ledger {owner}->{target} has no stored magnitude")]
    MissingAffinityMagnitude { owner: RealmIndex, target: RealmIndex },
    #[error("Registry {owner} is missing its ledger for realm {target}")]
    MissingLedger { owner: RealmIndex, target: RealmIndex },
    #[error("Registry {owner} has an unexpected or repeated ledger for realm {target}")]
    UnexpectedLedger { owner: RealmIndex, target: RealmIndex },
    #[error("Save lists {realms} realms but {registries} registries")]
    RealmCountMismatch { realms: usize, registries: usize },
    #[error("Registry at position {position} claims owner {owner}")]
    OwnerMismatch { position: usize, owner: RealmIndex },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectSave {
    pub kind: u8,
    pub lifetime: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magnitude: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSave {
    pub target: RealmIndex,
    pub meeting_count: u32,
    pub effects: Vec<EffectSave>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySave {
    pub owner: RealmIndex,
    pub ledgers: Vec<LedgerSave>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiplomacySave {
    pub turn: u32,
    #[serde(default)]
    pub config: DiplomacyConfig,
    pub realms: Vec<Realm>,
    pub registries: Vec<RegistrySave>,
}

impl From<&RelationshipLedger> for LedgerSave {
    fn from(ledger: &RelationshipLedger) -> Self {
        Self {
            target: ledger.target(),
            meeting_count: ledger.meeting_count(),
            effects: ledger
                .effects()
                .iter()
                .map(|e| EffectSave {
                    kind: e.kind().code(),
                    lifetime: e.remaining_lifetime(),
                    magnitude: (e.kind() == BonusKind::DiplomacyBonus)
                        .then(|| e.base_magnitude()),
                })
                .collect(),
        }
    }
}

impl From<&RelationshipRegistry> for RegistrySave {
    fn from(registry: &RelationshipRegistry) -> Self {
        Self {
            owner: registry.owner(),
            ledgers: registry.ledgers().map(LedgerSave::from).collect(),
        }
    }
}

fn restore_ledger(owner: RealmIndex, save: &LedgerSave) -> Result<RelationshipLedger, LoadError> {
    let mut effects: Vec<BonusEffect> = Vec::with_capacity(save.effects.len());
    for entry in &save.effects {
        let kind = BonusKind::from_code(entry.kind).ok_or(LoadError::UnknownKind {
            owner,
            target: save.target,
            code: entry.kind,
        })?;
        if kind.is_singleton() && effects.iter().any(|e| e.kind() == kind) {
            return Err(LoadError::DuplicateSingleton {
                owner,
                target: save.target,
                kind,
            });
        }
        if kind == BonusKind::DiplomacyBonus && entry.magnitude.is_none() {
            return Err(LoadError::MissingAffinityMagnitude {
                owner,
                target: save.target,
            });
        }
        effects.push(BonusEffect::restore(kind, entry.lifetime, entry.magnitude));
    }
    Ok(RelationshipLedger::restore(
        save.target,
        save.meeting_count,
        effects,
    ))
}

impl RelationshipRegistry {
    /// Rebuild a registry, requiring exactly one ledger per other realm.
    ///
    /// Ledgers may appear in any order in the save; they are stored in target
    /// order.
    pub fn from_save(save: &RegistrySave, realm_count: usize) -> Result<Self, LoadError> {
        let owner = save.owner;
        let mut slots: Vec<Option<RelationshipLedger>> = vec![None; realm_count];

        for ledger in &save.ledgers {
            let target = ledger.target;
            if target == owner || target >= realm_count || slots[target].is_some() {
                return Err(LoadError::UnexpectedLedger { owner, target });
            }
            slots[target] = Some(restore_ledger(owner, ledger)?);
        }

        let mut ledgers = Vec::with_capacity(realm_count.saturating_sub(1));
        for (target, slot) in slots.into_iter().enumerate() {
            if target == owner {
                continue;
            }
            ledgers.push(slot.ok_or(LoadError::MissingLedger { owner, target })?);
        }
        Ok(RelationshipRegistry::from_ledgers(owner, ledgers))
    }
}

impl Diplomacy {
    pub fn to_save(&self) -> DiplomacySave {
        DiplomacySave {
            turn: self.turn,
            config: self.config.clone(),
            realms: self.realms.clone(),
            registries: self.registries.iter().map(RegistrySave::from).collect(),
        }
    }

    pub fn from_save(save: &DiplomacySave) -> Result<Self, LoadError> {
        let realm_count = save.realms.len();
        if save.registries.len() != realm_count {
            return Err(LoadError::RealmCountMismatch {
                realms: realm_count,
                registries: save.registries.len(),
            });
        }

        let mut registries = Vec::with_capacity(realm_count);
        for (position, registry) in save.registries.iter().enumerate() {
            if registry.owner != position {
                return Err(LoadError::OwnerMismatch {
                    position,
                    owner: registry.owner,
                });
            }
            registries.push(RelationshipRegistry::from_save(registry, realm_count)?);
        }

        log::debug!(
            "Loaded diplomacy save: turn {}, {} realms",
            save.turn,
            realm_count
        );
        Ok(Diplomacy::from_parts(
            save.turn,
            save.config.clone(),
            save.realms.clone(),
            registries,
        ))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.to_save())
    }

    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let save: DiplomacySave = serde_json::from_str(json)?;
        Self::from_save(&save)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pact::NoopMaterializer;
    use crate::state::AffinitySource;
    use crate::testing::DiplomacyBuilder;

    struct Flat(i32);

    impl AffinitySource for Flat {
        fn diplomacy_affinity(&self, _realm: RealmIndex) -> i32 {
            self.0
        }
    }

    fn sample() -> Diplomacy {
        let mut diplo = DiplomacyBuilder::new()
            .with_realms(&["Terran", "Mechion", "Chiraloid"])
            .with_defensive_pact(1, 2)
            .build();
        diplo.add_bonus(0, 1, BonusKind::BorderCrossed).unwrap();
        diplo.add_bonus(0, 1, BonusKind::BorderCrossed).unwrap();
        diplo.record_meeting(0, 2).unwrap();
        diplo.promise_vote(2, 0, false).unwrap();
        diplo.advance_turn();
        diplo.declare_war(0, 1, &mut NoopMaterializer).unwrap();
        diplo.apply_affinity(2, 0, &Flat(-3)).unwrap();
        diplo.make_peace(0, 2).unwrap();
        for _ in 0..12 {
            diplo.advance_turn();
        }
        diplo
    }

    #[test]
    fn test_save_restores_state() {
        let diplo = sample();
        let json = diplo.to_json().unwrap();
        let loaded = Diplomacy::from_json(&json).unwrap();

        assert_eq!(loaded.checksum(), diplo.checksum());
        assert_eq!(loaded.registries(), diplo.registries());
        assert_eq!(loaded.turn, 13);
        assert_eq!(
            loaded.ledger(2, 0).unwrap().aggregate_score(),
            diplo.ledger(2, 0).unwrap().aggregate_score()
        );
    }

    #[test]
    fn test_magnitude_only_stored_for_affinity() {
        let save = sample().to_save();
        for registry in &save.registries {
            for ledger in &registry.ledgers {
                for effect in &ledger.effects {
                    let is_affinity = effect.kind == BonusKind::DiplomacyBonus.code();
                    assert_eq!(effect.magnitude.is_some(), is_affinity);
                }
            }
        }
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let mut save = sample().to_save();
        save.registries[1].ledgers[0].effects.push(EffectSave {
            kind: 200,
            lifetime: 5,
            magnitude: None,
        });
        match Diplomacy::from_save(&save) {
            Err(LoadError::UnknownKind { owner, code, .. }) => {
                assert_eq!(owner, 1);
                assert_eq!(code, 200);
            }
            other => panic!("expected UnknownKind, got {:?}", other.map(|d| d.turn)),
        }
    }

    #[test]
    fn test_duplicate_singleton_rejected() {
        let mut save = sample().to_save();
        let alliance = EffectSave {
            kind: BonusKind::Alliance.code(),
            lifetime: 255,
            magnitude: None,
        };
        save.registries[0].ledgers[1].effects.push(alliance.clone());
        save.registries[0].ledgers[1].effects.push(alliance);
        assert!(matches!(
            Diplomacy::from_save(&save),
            Err(LoadError::DuplicateSingleton {
                kind: BonusKind::Alliance,
                ..
            })
        ));
    }

    #[test]
    fn test_affinity_without_magnitude_rejected() {
        let mut save = sample().to_save();
        let entry = save.registries[2].ledgers[0]
            .effects
            .iter_mut()
            .find(|e| e.kind == BonusKind::DiplomacyBonus.code())
            .unwrap();
        entry.magnitude = None;
        assert!(matches!(
            Diplomacy::from_save(&save),
            Err(LoadError::MissingAffinityMagnitude {
                owner: 2,
                target: 0
            })
        ));
    }

    #[test]
    fn test_zero_lifetime_long_peace_purged_on_decay() {
        let diplo = sample();
        let mut save = diplo.to_save();
        let ledger = &mut save.registries[1].ledgers[1];
        assert_eq!(ledger.target, 2);
        ledger.effects.push(EffectSave {
            kind: BonusKind::LongPeace.code(),
            lifetime: 0,
            magnitude: None,
        });
        let mut loaded = Diplomacy::from_save(&save).unwrap();
        assert_eq!(
            loaded.ledger(1, 2).unwrap().aggregate_score(),
            diplo.ledger(1, 2).unwrap().aggregate_score()
        );

        loaded.advance_turn();
        assert!(!loaded.ledger(1, 2).unwrap().has_kind(BonusKind::LongPeace));
    }

    #[test]
    fn test_missing_ledger_rejected() {
        let mut save = sample().to_save();
        save.registries[2].ledgers.remove(0);
        assert!(matches!(
            Diplomacy::from_save(&save),
            Err(LoadError::MissingLedger {
                owner: 2,
                target: 0
            })
        ));
    }

    #[test]
    fn test_self_ledger_rejected() {
        let mut save = sample().to_save();
        save.registries[1].ledgers[0].target = 1;
        assert!(matches!(
            Diplomacy::from_save(&save),
            Err(LoadError::UnexpectedLedger {
                owner: 1,
                target: 1
            })
        ));
    }

    #[test]
    fn test_registry_count_must_match() {
        let mut save = sample().to_save();
        save.registries.pop();
        assert!(matches!(
            Diplomacy::from_save(&save),
            Err(LoadError::RealmCountMismatch {
                realms: 3,
                registries: 2
            })
        ));
    }

    #[test]
    fn test_ledgers_load_in_any_order() {
        let diplo = sample();
        let mut save = diplo.to_save();
        save.registries[0].ledgers.reverse();
        let loaded = Diplomacy::from_save(&save).unwrap();
        assert_eq!(loaded.registries(), diplo.registries());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            Diplomacy::from_json("{ not json"),
            Err(LoadError::Json(_))
        ));
    }
}
