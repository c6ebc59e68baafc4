use crate::bonus::BonusKind;
use crate::config::DiplomacyConfig;
use crate::state::{Diplomacy, Realm, RealmIndex};

/// Fixture builder for relationship state.
///
/// Realms are indexed in the order they are added.
pub struct DiplomacyBuilder {
    realms: Vec<Realm>,
    config: DiplomacyConfig,
    symmetric: Vec<(RealmIndex, RealmIndex, BonusKind)>,
    one_sided: Vec<(RealmIndex, RealmIndex, BonusKind)>,
}

impl DiplomacyBuilder {
    pub fn new() -> Self {
        Self {
            realms: Vec::new(),
            config: DiplomacyConfig::default(),
            symmetric: Vec::new(),
            one_sided: Vec::new(),
        }
    }

    pub fn config(mut self, config: DiplomacyConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_realm(mut self, name: &str) -> Self {
        self.realms.push(Realm::new(name));
        self
    }

    pub fn with_realms(mut self, names: &[&str]) -> Self {
        self.realms.extend(names.iter().map(|n| Realm::new(*n)));
        self
    }

    pub fn with_defensive_pact(self, a: RealmIndex, b: RealmIndex) -> Self {
        self.with_symmetric(a, b, BonusKind::DefensivePact)
    }

    pub fn with_alliance(self, a: RealmIndex, b: RealmIndex) -> Self {
        self.with_symmetric(a, b, BonusKind::Alliance)
    }

    pub fn with_symmetric(mut self, a: RealmIndex, b: RealmIndex, kind: BonusKind) -> Self {
        self.symmetric.push((a, b, kind));
        self
    }

    /// `owner`'s view of `target` gains `kind`.
    pub fn with_bonus(mut self, owner: RealmIndex, target: RealmIndex, kind: BonusKind) -> Self {
        self.one_sided.push((owner, target, kind));
        self
    }

    /// Build the state. Setup effects do not appear in the event log.
    pub fn build(self) -> Diplomacy {
        let mut diplo = Diplomacy::new(self.realms, self.config);
        for (a, b, kind) in self.symmetric {
            if let Err(e) = diplo.apply_symmetric_effect(a, b, kind) {
                log::warn!("Fixture {:?} between {} and {} skipped: {}", kind, a, b, e);
            }
        }
        for (owner, target, kind) in self.one_sided {
            if let Err(e) = diplo.add_bonus(owner, target, kind) {
                log::warn!("Fixture {:?} {}->{} skipped: {}", kind, owner, target, e);
            }
        }
        diplo.drain_events();
        diplo
    }
}

impl Default for DiplomacyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_methods() {
        let diplo = DiplomacyBuilder::default()
            .with_realm("Terran")
            .with_realms(&["Mechion", "Chiraloid"])
            .with_alliance(0, 2)
            .with_bonus(1, 0, BonusKind::Insult)
            .build();

        assert_eq!(diplo.realm_count(), 3);
        assert_eq!(diplo.realms()[1].name, "Mechion");
        assert!(diplo.ledger(0, 2).unwrap().has_kind(BonusKind::Alliance));
        assert!(diplo.ledger(2, 0).unwrap().has_kind(BonusKind::Alliance));
        assert!(diplo.ledger(1, 0).unwrap().has_kind(BonusKind::Insult));
        assert!(!diplo.ledger(0, 1).unwrap().has_kind(BonusKind::Insult));
        assert!(diplo.events().is_empty());
    }

    #[test]
    fn test_invalid_fixture_is_skipped() {
        let diplo = DiplomacyBuilder::new()
            .with_realms(&["A", "B"])
            .with_defensive_pact(0, 5)
            .build();
        assert!(!diplo.ledger(0, 1).unwrap().has_kind(BonusKind::DefensivePact));
    }
}
