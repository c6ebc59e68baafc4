//! One realm's running account of another realm.
//!
//! A ledger is owned by a [`RelationshipRegistry`](crate::registry::RelationshipRegistry);
//! the owner is implicit and the target is explicit. Effects keep insertion
//! order, which is the tie-break for "most significant cause" queries.

use crate::bonus::{BonusEffect, BonusKind};
use crate::state::RealmIndex;

/// Kinds cleared when war starts.
const CLEARED_BY_WAR: [BonusKind; 5] = [
    BonusKind::Alliance,
    BonusKind::TradeAlliance,
    BonusKind::LongPeace,
    BonusKind::DefensivePact,
    BonusKind::TradeFleetVisited,
];

/// Kinds cleared by an embargo.
const CLEARED_BY_EMBARGO: [BonusKind; 3] = [
    BonusKind::Alliance,
    BonusKind::TradeAlliance,
    BonusKind::DefensivePact,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipLedger {
    target: RealmIndex,
    effects: Vec<BonusEffect>,
    meeting_count: u32,
}

impl RelationshipLedger {
    pub fn new(target: RealmIndex) -> Self {
        Self {
            target,
            effects: Vec::new(),
            meeting_count: 0,
        }
    }

    pub(crate) fn restore(target: RealmIndex, meeting_count: u32, effects: Vec<BonusEffect>) -> Self {
        Self {
            target,
            effects,
            meeting_count,
        }
    }

    pub fn target(&self) -> RealmIndex {
        self.target
    }

    pub fn effects(&self) -> &[BonusEffect] {
        &self.effects
    }

    pub fn meeting_count(&self) -> u32 {
        self.meeting_count
    }

    pub fn record_meeting(&mut self) {
        self.meeting_count = self.meeting_count.saturating_add(1);
    }

    /// Add an effect of `kind` using the table magnitude.
    ///
    /// Returns `false` (and changes nothing) when `kind` is a singleton that is
    /// already present.
    pub fn add_bonus(&mut self, kind: BonusKind) -> bool {
        self.insert(BonusEffect::new(kind))
    }

    /// Add the race/government affinity effect with a caller-supplied magnitude.
    pub fn add_affinity_bonus(&mut self, magnitude: i32) -> bool {
        self.insert(BonusEffect::affinity(magnitude))
    }

    fn insert(&mut self, effect: BonusEffect) -> bool {
        let kind = effect.kind();
        if effect.is_singleton() && self.has_kind(kind) {
            log::trace!(
                "Ledger toward {}: {:?} already present, skipping",
                self.target,
                kind
            );
            return false;
        }

        match kind {
            BonusKind::War => self.remove_kinds(&CLEARED_BY_WAR),
            BonusKind::Embargo => self.remove_kinds(&CLEARED_BY_EMBARGO),
            BonusKind::LongPeace => self.remove_kinds(&[BonusKind::War]),
            _ => {}
        }

        self.effects.push(effect);
        true
    }

    fn remove_kinds(&mut self, kinds: &[BonusKind]) {
        self.effects.retain(|e| !kinds.contains(&e.kind()));
    }

    /// Remove every effect of `kind`. Returns how many were removed.
    pub fn remove_kind(&mut self, kind: BonusKind) -> usize {
        let before = self.effects.len();
        self.effects.retain(|e| e.kind() != kind);
        before - self.effects.len()
    }

    /// Advance every effect one turn and purge those that reached zero.
    ///
    /// Returns the kinds that expired, in ledger order.
    pub fn decay_one_turn(&mut self) -> Vec<BonusKind> {
        for effect in &mut self.effects {
            effect.tick_lifetime();
        }

        let expired: Vec<BonusKind> = self
            .effects
            .iter()
            .filter(|e| e.is_expired())
            .map(|e| e.kind())
            .collect();
        if !expired.is_empty() {
            self.effects.retain(|e| !e.is_expired());
        }
        expired
    }

    /// Sum of current magnitudes.
    pub fn aggregate_score(&self) -> i32 {
        self.effects.iter().map(BonusEffect::magnitude).sum()
    }

    pub fn has_kind(&self, kind: BonusKind) -> bool {
        self.effects.iter().any(|e| e.kind() == kind)
    }

    pub fn count_of(&self, kind: BonusKind) -> usize {
        self.effects.iter().filter(|e| e.kind() == kind).count()
    }

    /// Remaining lifetime of the first effect of `kind` (0 if absent).
    pub fn lifetime_of(&self, kind: BonusKind) -> u8 {
        self.effects
            .iter()
            .find(|e| e.kind() == kind)
            .map_or(0, BonusEffect::remaining_lifetime)
    }

    /// Accumulated casus-belli weight over every effect present.
    pub fn casus_belli_score(&self) -> i32 {
        self.effects
            .iter()
            .map(|e| e.kind().casus_belli_weight())
            .sum()
    }

    /// Kind with the largest total casus-belli contribution.
    ///
    /// Ties go to the earlier kind in enumeration order. `None` when nothing
    /// contributes.
    pub fn dominant_casus_belli_kind(&self) -> Option<BonusKind> {
        let mut best: Option<(BonusKind, i32)> = None;
        for kind in BonusKind::ALL {
            let weight = kind.casus_belli_weight();
            if weight <= 0 {
                continue;
            }
            let total = weight * self.count_of(kind) as i32;
            if total == 0 {
                continue;
            }
            match best {
                Some((_, best_total)) if best_total >= total => {}
                _ => best = Some((kind, total)),
            }
        }
        best.map(|(kind, _)| kind)
    }

    /// Human-readable phrase for [`dominant_casus_belli_kind`](Self::dominant_casus_belli_kind).
    pub fn dominant_casus_belli(&self) -> &'static str {
        self.dominant_casus_belli_kind()
            .map_or("no grievance", BonusKind::casus_belli_phrase)
    }

    /// Settle an outstanding vote promise.
    ///
    /// If a promise to vote yes or no is on record, every promise and prior
    /// outcome is cleared and exactly one `PromiseKept` / `PromiseBroken` is
    /// added. Returns `Some(kept)`, or `None` when no promise was on record.
    pub fn record_promise_outcome(&mut self, voted_yes: bool) -> Option<bool> {
        let promised_yes = self.effects.iter().find_map(|e| match e.kind() {
            BonusKind::PromisedVoteYes => Some(true),
            BonusKind::PromisedVoteNo => Some(false),
            _ => None,
        })?;

        let kept = promised_yes == voted_yes;
        self.effects.retain(|e| !e.kind().is_promise());
        self.add_bonus(if kept {
            BonusKind::PromiseKept
        } else {
            BonusKind::PromiseBroken
        });
        Some(kept)
    }
}
