//! Per-realm collection of ledgers, one for every other realm.

use crate::bonus::BonusKind;
use crate::ledger::RelationshipLedger;
use crate::relations::ledger_liking_tier;
use crate::state::RealmIndex;
use thiserror::Error;
use tracing::instrument;

/// Invalid realm identity in a lookup.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationsError {
    #[error("Realm {realm} has no ledger for itself")]
    SelfReference { realm: RealmIndex },
    #[error("Realm index {index} out of range (realm count {realm_count})")]
    OutOfRange {
        index: RealmIndex,
        realm_count: usize,
    },
}

/// All of one realm's ledgers.
///
/// Holds exactly `realm_count - 1` ledgers; slot `p` maps to target `p` below
/// the owner's index and `p + 1` above it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipRegistry {
    owner: RealmIndex,
    ledgers: Vec<RelationshipLedger>,
}

impl RelationshipRegistry {
    /// Empty ledgers toward every other realm.
    pub fn new(owner: RealmIndex, realm_count: usize) -> Self {
        let ledgers = (0..realm_count)
            .filter(|&target| target != owner)
            .map(RelationshipLedger::new)
            .collect();
        Self { owner, ledgers }
    }

    /// Caller guarantees `ledgers` is complete and in target order.
    pub(crate) fn from_ledgers(owner: RealmIndex, ledgers: Vec<RelationshipLedger>) -> Self {
        Self { owner, ledgers }
    }

    pub fn owner(&self) -> RealmIndex {
        self.owner
    }

    /// Number of realms in the game this registry was built for.
    pub fn realm_count(&self) -> usize {
        self.ledgers.len() + 1
    }

    /// Number of ledgers (`realm_count - 1`).
    pub fn len(&self) -> usize {
        self.ledgers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ledgers.is_empty()
    }

    fn slot(&self, target: RealmIndex) -> Result<usize, RelationsError> {
        if target == self.owner {
            return Err(RelationsError::SelfReference { realm: self.owner });
        }
        if target >= self.realm_count() {
            return Err(RelationsError::OutOfRange {
                index: target,
                realm_count: self.realm_count(),
            });
        }
        Ok(if target < self.owner { target } else { target - 1 })
    }

    pub fn ledger_for(&self, target: RealmIndex) -> Result<&RelationshipLedger, RelationsError> {
        let slot = self.slot(target)?;
        Ok(&self.ledgers[slot])
    }

    pub fn ledger_for_mut(
        &mut self,
        target: RealmIndex,
    ) -> Result<&mut RelationshipLedger, RelationsError> {
        let slot = self.slot(target)?;
        Ok(&mut self.ledgers[slot])
    }

    /// Ledgers in target-index order.
    pub fn ledgers(&self) -> impl Iterator<Item = &RelationshipLedger> {
        self.ledgers.iter()
    }

    /// Decay every ledger by one turn.
    ///
    /// Returns `(target, expired kinds)` for ledgers that lost at least one effect.
    #[instrument(level = "debug", skip_all, name = "decay_registry", fields(owner = self.owner))]
    pub fn decay_all_one_turn(&mut self) -> Vec<(RealmIndex, Vec<BonusKind>)> {
        self.ledgers
            .iter_mut()
            .filter_map(|ledger| {
                let expired = ledger.decay_one_turn();
                (!expired.is_empty()).then(|| (ledger.target(), expired))
            })
            .collect()
    }

    /// Target with the lowest liking tier; ties go to the lowest index.
    ///
    /// `None` only when there are no other realms.
    pub fn least_liked_target(&self) -> Option<RealmIndex> {
        self.ledgers
            .iter()
            .min_by_key(|ledger| ledger_liking_tier(ledger).value())
            .map(RelationshipLedger::target)
    }
}

/// Write `kind` into both directions of a pair in one call.
///
/// Used for relations that must stay mirrored (war, alliance, pacts, peace).
/// Returns whether each side actually gained the effect.
pub fn apply_symmetric_effect(
    registries: &mut [RelationshipRegistry],
    a: RealmIndex,
    b: RealmIndex,
    kind: BonusKind,
) -> Result<(bool, bool), RelationsError> {
    let realm_count = registries.len();
    for index in [a, b] {
        if index >= realm_count {
            return Err(RelationsError::OutOfRange { index, realm_count });
        }
    }
    if a == b {
        return Err(RelationsError::SelfReference { realm: a });
    }

    let added_a = registries[a].ledger_for_mut(b)?.add_bonus(kind);
    let added_b = registries[b].ledger_for_mut(a)?.add_bonus(kind);
    Ok((added_a, added_b))
}
