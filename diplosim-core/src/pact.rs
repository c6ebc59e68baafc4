//! Defensive-pact chain reaction.
//!
//! When a war is declared, every realm holding a defensive pact with the
//! victim joins against the aggressor. With
//! [`DiplomacyConfig::chain_defensive_pacts`](crate::config::DiplomacyConfig)
//! set, realms that join pull in their own pact partners in turn
//! (breadth-first). A visited set keeps cyclic pact topologies finite: each
//! realm is activated at most once per declaration.

use crate::bonus::BonusKind;
use crate::registry::{apply_symmetric_effect, RelationsError, RelationshipRegistry};
use crate::state::{RealmIndex, RealmNames};
use rustc_hash::FxHashSet;
use std::collections::VecDeque;
use tracing::instrument;

/// Boundary to the trade/negotiation subsystem, which records wars as formal
/// agreements. The engine only asks; it never builds the record itself.
pub trait WarMaterializer {
    fn materialize_war(&mut self, aggressor: RealmIndex, defender: RealmIndex);
}

/// Discards every request.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMaterializer;

impl WarMaterializer for NoopMaterializer {
    fn materialize_war(&mut self, _aggressor: RealmIndex, _defender: RealmIndex) {}
}

/// Keeps every request in order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecordingMaterializer {
    pub wars: Vec<(RealmIndex, RealmIndex)>,
}

impl WarMaterializer for RecordingMaterializer {
    fn materialize_war(&mut self, aggressor: RealmIndex, defender: RealmIndex) {
        self.wars.push((aggressor, defender));
    }
}

/// One third party pulled into the war.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PactActivation {
    pub ally: RealmIndex,
    /// Realm whose pact brought `ally` in.
    pub defended: RealmIndex,
    pub ally_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadeReport {
    pub activations: Vec<PactActivation>,
}

impl CascadeReport {
    pub fn is_empty(&self) -> bool {
        self.activations.is_empty()
    }

    /// Display names of activated realms, in activation order.
    pub fn names(&self) -> Vec<&str> {
        self.activations
            .iter()
            .map(|a| a.ally_name.as_str())
            .collect()
    }

    /// Notification text, or `None` when nobody was pulled in.
    pub fn summary(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        Some(format!(
            "Defensive pacts activated: {}",
            self.names().join(", ")
        ))
    }
}

/// Run the cascade for one declaration.
///
/// For every activated realm `i`: the materializer is asked for a war between
/// `aggressor` and `i`, war is written to both ledgers, and `i`'s view of the
/// aggressor gains a [`BonusKind::WarDeclaration`] grievance. Realms already at
/// war with the aggressor are skipped.
///
/// `aggressor == victim` logs a warning and returns an empty report.
#[instrument(skip_all, name = "pact_cascade", fields(aggressor = aggressor, victim = victim))]
pub fn run_pact_cascade(
    registries: &mut [RelationshipRegistry],
    aggressor: RealmIndex,
    victim: RealmIndex,
    chain: bool,
    names: &dyn RealmNames,
    materializer: &mut dyn WarMaterializer,
) -> Result<CascadeReport, RelationsError> {
    let realm_count = registries.len();
    for index in [aggressor, victim] {
        if index >= realm_count {
            return Err(RelationsError::OutOfRange { index, realm_count });
        }
    }
    if aggressor == victim {
        log::warn!(
            "Pact cascade requested with realm {} as both aggressor and victim; ignoring",
            aggressor
        );
        return Ok(CascadeReport::default());
    }

    let mut report = CascadeReport::default();
    let mut visited: FxHashSet<RealmIndex> = FxHashSet::default();
    visited.insert(aggressor);
    visited.insert(victim);

    let mut queue = VecDeque::from([victim]);
    while let Some(defended) = queue.pop_front() {
        let partners: Vec<RealmIndex> = registries[defended]
            .ledgers()
            .filter(|ledger| ledger.has_kind(BonusKind::DefensivePact))
            .map(|ledger| ledger.target())
            .filter(|target| !visited.contains(target))
            .collect();

        for ally in partners {
            visited.insert(ally);

            if registries[aggressor].ledger_for(ally)?.has_kind(BonusKind::War) {
                log::debug!(
                    "Realm {} already at war with {}, pact with {} changes nothing",
                    ally,
                    aggressor,
                    defended
                );
                continue;
            }

            materializer.materialize_war(aggressor, ally);
            apply_symmetric_effect(registries, aggressor, ally, BonusKind::War)?;
            registries[ally]
                .ledger_for_mut(aggressor)?
                .add_bonus(BonusKind::WarDeclaration);

            let ally_name = names.empire_name(ally);
            log::info!(
                "{} honours its defensive pact with {} and joins the war against {}",
                ally_name,
                names.empire_name(defended),
                names.empire_name(aggressor)
            );
            report.activations.push(PactActivation {
                ally,
                defended,
                ally_name,
            });

            if chain {
                queue.push_back(ally);
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Names;

    impl RealmNames for Names {
        fn empire_name(&self, realm: RealmIndex) -> String {
            format!("Realm{}", realm)
        }
    }

    fn registries(count: usize) -> Vec<RelationshipRegistry> {
        (0..count)
            .map(|i| RelationshipRegistry::new(i, count))
            .collect()
    }

    fn pact(registries: &mut [RelationshipRegistry], a: RealmIndex, b: RealmIndex) {
        apply_symmetric_effect(registries, a, b, BonusKind::DefensivePact).unwrap();
    }

    #[test]
    fn test_no_pacts_no_activation() {
        let mut regs = registries(3);
        let mut wars = RecordingMaterializer::default();
        let report = run_pact_cascade(&mut regs, 0, 1, true, &Names, &mut wars).unwrap();
        assert!(report.is_empty());
        assert_eq!(report.summary(), None);
        assert!(wars.wars.is_empty());
    }

    #[test]
    fn test_direct_pact_activates() {
        let mut regs = registries(3);
        pact(&mut regs, 1, 2);
        let mut wars = RecordingMaterializer::default();

        let report = run_pact_cascade(&mut regs, 0, 1, false, &Names, &mut wars).unwrap();
        assert_eq!(report.names(), vec!["Realm2"]);
        assert_eq!(
            report.summary().as_deref(),
            Some("Defensive pacts activated: Realm2")
        );
        assert_eq!(wars.wars, vec![(0, 2)]);

        assert!(regs[0].ledger_for(2).unwrap().has_kind(BonusKind::War));
        assert!(regs[2].ledger_for(0).unwrap().has_kind(BonusKind::War));
        assert!(regs[2]
            .ledger_for(0)
            .unwrap()
            .has_kind(BonusKind::WarDeclaration));
        // The victim's own pact with the ally is untouched.
        assert!(regs[1]
            .ledger_for(2)
            .unwrap()
            .has_kind(BonusKind::DefensivePact));
    }

    #[test]
    fn test_pact_with_aggressor_is_broken_by_war() {
        let mut regs = registries(3);
        pact(&mut regs, 1, 2);
        pact(&mut regs, 0, 2);
        let mut wars = NoopMaterializer;

        let report = run_pact_cascade(&mut regs, 0, 1, false, &Names, &mut wars).unwrap();
        assert_eq!(report.names(), vec!["Realm2"]);
        assert!(!regs[0]
            .ledger_for(2)
            .unwrap()
            .has_kind(BonusKind::DefensivePact));
    }

    #[test]
    fn test_chain_follows_partners_when_enabled() {
        let mut regs = registries(4);
        pact(&mut regs, 1, 2);
        pact(&mut regs, 2, 3);

        let mut wars = RecordingMaterializer::default();
        let report = run_pact_cascade(&mut regs.clone(), 0, 1, false, &Names, &mut wars).unwrap();
        assert_eq!(report.names(), vec!["Realm2"]);

        let mut wars = RecordingMaterializer::default();
        let report = run_pact_cascade(&mut regs, 0, 1, true, &Names, &mut wars).unwrap();
        assert_eq!(report.names(), vec!["Realm2", "Realm3"]);
        assert_eq!(report.activations[1].defended, 2);
        assert_eq!(wars.wars, vec![(0, 2), (0, 3)]);
    }

    #[test]
    fn test_cyclic_pacts_terminate() {
        // 1 <-> 2 <-> 3 <-> 1, plus the aggressor bound to all of them.
        let mut regs = registries(4);
        pact(&mut regs, 1, 2);
        pact(&mut regs, 2, 3);
        pact(&mut regs, 3, 1);
        pact(&mut regs, 0, 1);
        pact(&mut regs, 0, 2);

        for victim in 1..4 {
            let mut copy = regs.clone();
            let mut wars = RecordingMaterializer::default();
            let report = run_pact_cascade(&mut copy, 0, victim, true, &Names, &mut wars).unwrap();

            let mut allies: Vec<RealmIndex> = report.activations.iter().map(|a| a.ally).collect();
            assert_eq!(allies.len(), 2);
            allies.sort_unstable();
            allies.dedup();
            assert_eq!(allies.len(), 2, "each third party activates at most once");
            assert!(!allies.contains(&victim));
            assert!(!allies.contains(&0));
        }
    }

    #[test]
    fn test_skips_realms_already_at_war() {
        let mut regs = registries(3);
        pact(&mut regs, 1, 2);
        apply_symmetric_effect(&mut regs, 0, 2, BonusKind::War).unwrap();

        let mut wars = RecordingMaterializer::default();
        let report = run_pact_cascade(&mut regs, 0, 1, true, &Names, &mut wars).unwrap();
        assert!(report.is_empty());
        assert!(wars.wars.is_empty());
    }

    #[test]
    fn test_self_war_is_noop() {
        let mut regs = registries(3);
        pact(&mut regs, 1, 2);
        let before = regs.clone();

        let mut wars = RecordingMaterializer::default();
        let report = run_pact_cascade(&mut regs, 1, 1, true, &Names, &mut wars).unwrap();
        assert!(report.is_empty());
        assert_eq!(regs, before);
    }

    #[test]
    fn test_out_of_range_rejected() {
        let mut regs = registries(2);
        let result = run_pact_cascade(&mut regs, 0, 9, true, &Names, &mut NoopMaterializer);
        assert_eq!(
            result,
            Err(RelationsError::OutOfRange {
                index: 9,
                realm_count: 2
            })
        );
    }
}
