//! Timed diplomatic modifiers and the per-kind lookup table.
//!
//! Every [`BonusEffect`] is built from a [`BonusKind`] alone. Magnitude, starting
//! lifetime, singleton policy and casus-belli weight all come from
//! [`BonusKind::def`], an exhaustive `match`, so adding a kind is a compile error
//! until the table covers it.
//!
//! ## Save compatibility
//!
//! Kinds are persisted by their numeric code (declaration order, see
//! [`BonusKind::code`]). Reordering or inserting variants in the middle breaks
//! existing saves; append new kinds at the end.

use serde::{Deserialize, Serialize};

/// Lifetime value meaning "lasts until a rule removes it".
pub const PERMANENT: u8 = u8::MAX;

/// Closed set of diplomatic event categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum BonusKind {
    War,
    WarDeclaration,
    TradeAlliance,
    Alliance,
    BorderCrossed,
    GiftGiven,
    MadeDemand,
    DiplomaticTrade,
    SameRace,
    LongPeace,
    Insult,
    Nuked,
    NothingToTrade,
    DefensivePact,
    EspionageBorderCross,
    SpyTrade,
    /// Race/government affinity; magnitude supplied by the caller.
    DiplomacyBonus,
    TradeFleetVisited,
    PirateBoarding,
    Embargo,
    LikedEmbargo,
    DislikedEmbargo,
    RealmLost,
    OlympicsParticipation,
    OlympicsBoycott,
    PromisedVoteYes,
    PromisedVoteNo,
    PromiseKept,
    PromiseBroken,
    WarDeclarationAgainstUs,
    FalseFlag,
    FreedConvict,
    PromisedProtection,
    SameGovernment,
    SimilarGovernment,
    OpposedGovernment,
}

/// Static definition for one [`BonusKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BonusDef {
    /// Liking contribution while the effect is live.
    pub magnitude: i32,
    /// Starting lifetime in turns ([`PERMANENT`] = until removed).
    pub lifetime: u8,
    /// At most one effect of this kind per ledger.
    pub singleton: bool,
    /// Weight toward the casus-belli score (independent of magnitude).
    pub casus_belli: i32,
}

impl BonusKind {
    /// Every kind in save-code order.
    pub const ALL: [BonusKind; 36] = [
        BonusKind::War,
        BonusKind::WarDeclaration,
        BonusKind::TradeAlliance,
        BonusKind::Alliance,
        BonusKind::BorderCrossed,
        BonusKind::GiftGiven,
        BonusKind::MadeDemand,
        BonusKind::DiplomaticTrade,
        BonusKind::SameRace,
        BonusKind::LongPeace,
        BonusKind::Insult,
        BonusKind::Nuked,
        BonusKind::NothingToTrade,
        BonusKind::DefensivePact,
        BonusKind::EspionageBorderCross,
        BonusKind::SpyTrade,
        BonusKind::DiplomacyBonus,
        BonusKind::TradeFleetVisited,
        BonusKind::PirateBoarding,
        BonusKind::Embargo,
        BonusKind::LikedEmbargo,
        BonusKind::DislikedEmbargo,
        BonusKind::RealmLost,
        BonusKind::OlympicsParticipation,
        BonusKind::OlympicsBoycott,
        BonusKind::PromisedVoteYes,
        BonusKind::PromisedVoteNo,
        BonusKind::PromiseKept,
        BonusKind::PromiseBroken,
        BonusKind::WarDeclarationAgainstUs,
        BonusKind::FalseFlag,
        BonusKind::FreedConvict,
        BonusKind::PromisedProtection,
        BonusKind::SameGovernment,
        BonusKind::SimilarGovernment,
        BonusKind::OpposedGovernment,
    ];

    /// Numeric save code.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Inverse of [`code`](Self::code). `None` for codes no kind owns.
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    /// Fixed table entry for this kind.
    pub const fn def(self) -> BonusDef {
        const fn d(magnitude: i32, lifetime: u8, singleton: bool, casus_belli: i32) -> BonusDef {
            BonusDef {
                magnitude,
                lifetime,
                singleton,
                casus_belli,
            }
        }

        match self {
            BonusKind::War => d(-10, PERMANENT, true, 0),
            BonusKind::WarDeclaration => d(-5, 30, false, 6),
            BonusKind::TradeAlliance => d(3, PERMANENT, true, 0),
            BonusKind::Alliance => d(5, PERMANENT, true, 0),
            BonusKind::BorderCrossed => d(-3, 20, false, 3),
            BonusKind::GiftGiven => d(2, 20, false, 0),
            BonusKind::MadeDemand => d(-4, 30, false, 7),
            BonusKind::DiplomaticTrade => d(1, 20, false, 0),
            BonusKind::SameRace => d(2, PERMANENT, true, 0),
            // Counts up from 1; magnitude grows with the counter.
            BonusKind::LongPeace => d(1, 1, true, 0),
            BonusKind::Insult => d(-3, 25, false, 5),
            BonusKind::Nuked => d(-8, 50, false, 4),
            BonusKind::NothingToTrade => d(-1, 10, true, 0),
            BonusKind::DefensivePact => d(4, PERMANENT, true, 0),
            BonusKind::EspionageBorderCross => d(-2, 20, false, 3),
            BonusKind::SpyTrade => d(-2, 20, false, 2),
            BonusKind::DiplomacyBonus => d(0, PERMANENT, true, 0),
            BonusKind::TradeFleetVisited => d(1, 10, true, 0),
            BonusKind::PirateBoarding => d(-3, 20, false, 3),
            BonusKind::Embargo => d(-5, PERMANENT, true, 2),
            BonusKind::LikedEmbargo => d(2, 30, true, 0),
            BonusKind::DislikedEmbargo => d(-2, 30, true, 1),
            BonusKind::RealmLost => d(0, PERMANENT, true, 0),
            BonusKind::OlympicsParticipation => d(2, 30, true, 0),
            BonusKind::OlympicsBoycott => d(-2, 30, true, 1),
            BonusKind::PromisedVoteYes => d(1, 50, true, 0),
            BonusKind::PromisedVoteNo => d(1, 50, true, 0),
            BonusKind::PromiseKept => d(3, 40, true, 0),
            BonusKind::PromiseBroken => d(-5, 40, true, 4),
            BonusKind::WarDeclarationAgainstUs => d(-8, 100, false, 8),
            BonusKind::FalseFlag => d(-6, 60, false, 8),
            BonusKind::FreedConvict => d(2, 20, false, 0),
            BonusKind::PromisedProtection => d(3, PERMANENT, true, 0),
            BonusKind::SameGovernment => d(3, PERMANENT, true, 0),
            BonusKind::SimilarGovernment => d(1, PERMANENT, true, 0),
            BonusKind::OpposedGovernment => d(-3, PERMANENT, true, 0),
        }
    }

    pub const fn is_singleton(self) -> bool {
        self.def().singleton
    }

    pub const fn casus_belli_weight(self) -> i32 {
        self.def().casus_belli
    }

    /// Vote promises and their resolved outcomes.
    pub const fn is_promise(self) -> bool {
        matches!(
            self,
            BonusKind::PromisedVoteYes
                | BonusKind::PromisedVoteNo
                | BonusKind::PromiseKept
                | BonusKind::PromiseBroken
        )
    }

    /// Short phrase used when this kind is the main grievance.
    pub const fn casus_belli_phrase(self) -> &'static str {
        match self {
            BonusKind::WarDeclaration => "attacked a realm under our protection",
            BonusKind::BorderCrossed => "crossed our borders",
            BonusKind::MadeDemand => "made demands of us",
            BonusKind::Insult => "insulted us",
            BonusKind::Nuked => "bombarded our worlds",
            BonusKind::EspionageBorderCross => "sent spies across our borders",
            BonusKind::SpyTrade => "traded in stolen secrets",
            BonusKind::PirateBoarding => "boarded our ships",
            BonusKind::Embargo => "placed us under embargo",
            BonusKind::DislikedEmbargo => "embargoed our friends",
            BonusKind::OlympicsBoycott => "boycotted our games",
            BonusKind::PromiseBroken => "broke a promise to us",
            BonusKind::WarDeclarationAgainstUs => "declared war on us",
            BonusKind::FalseFlag => "staged a false-flag attack",
            _ => "no grievance",
        }
    }
}

/// A single timed modifier between two realms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BonusEffect {
    kind: BonusKind,
    magnitude: i32,
    lifetime: u8,
}

impl BonusEffect {
    /// Build from the lookup table.
    pub fn new(kind: BonusKind) -> Self {
        let def = kind.def();
        Self {
            kind,
            magnitude: def.magnitude,
            lifetime: def.lifetime,
        }
    }

    /// Build a [`BonusKind::DiplomacyBonus`] with an externally supplied magnitude.
    pub fn affinity(magnitude: i32) -> Self {
        Self {
            magnitude,
            ..Self::new(BonusKind::DiplomacyBonus)
        }
    }

    /// Rebuild from persisted parts. Only the affinity kind keeps a stored
    /// magnitude; every other kind re-reads the table.
    pub(crate) fn restore(kind: BonusKind, lifetime: u8, affinity: Option<i32>) -> Self {
        let mut effect = match (kind, affinity) {
            (BonusKind::DiplomacyBonus, Some(m)) => Self::affinity(m),
            _ => Self::new(kind),
        };
        effect.lifetime = lifetime;
        effect
    }

    pub fn kind(&self) -> BonusKind {
        self.kind
    }

    pub fn is_singleton(&self) -> bool {
        self.kind.is_singleton()
    }

    pub fn remaining_lifetime(&self) -> u8 {
        self.lifetime
    }

    /// Magnitude as stored (the table value, or the supplied affinity).
    pub fn base_magnitude(&self) -> i32 {
        self.magnitude
    }

    /// Current liking contribution.
    ///
    /// Long peace grows by one point per ten turns held. Expired effects
    /// contribute nothing.
    pub fn magnitude(&self) -> i32 {
        if self.lifetime == 0 {
            return 0;
        }
        match self.kind {
            BonusKind::LongPeace => self.magnitude + i32::from(self.lifetime) / 10,
            _ => self.magnitude,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.lifetime == 0
    }

    /// Advance one turn.
    ///
    /// Long peace counts up (saturating). Permanent effects hold. Everything
    /// else counts down toward zero. An expired effect stays expired.
    pub fn tick_lifetime(&mut self) {
        self.lifetime = match self.kind {
            _ if self.lifetime == 0 => 0,
            BonusKind::LongPeace => self.lifetime.saturating_add(1),
            _ if self.lifetime == PERMANENT => PERMANENT,
            _ => self.lifetime.saturating_sub(1),
        };
    }

    /// Overwrite the counter, clamped to `0..=255`.
    pub fn set_lifetime(&mut self, turns: i32) {
        self.lifetime = turns.clamp(0, i32::from(PERMANENT)) as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_follow_declaration_order() {
        for (idx, kind) in BonusKind::ALL.iter().enumerate() {
            assert_eq!(kind.code() as usize, idx);
            assert_eq!(BonusKind::from_code(idx as u8), Some(*kind));
        }
        assert_eq!(BonusKind::from_code(36), None);
        assert_eq!(BonusKind::from_code(u8::MAX), None);
    }

    #[test]
    fn test_border_crossing_table_entry() {
        let def = BonusKind::BorderCrossed.def();
        assert_eq!(def.magnitude, -3);
        assert_eq!(def.lifetime, 20);
        assert!(!def.singleton);
        assert_eq!(def.casus_belli, 3);
    }

    #[test]
    fn test_casus_belli_weights() {
        assert_eq!(BonusKind::MadeDemand.casus_belli_weight(), 7);
        assert_eq!(BonusKind::WarDeclarationAgainstUs.casus_belli_weight(), 8);
        assert_eq!(BonusKind::FalseFlag.casus_belli_weight(), 8);
        assert_eq!(BonusKind::Insult.casus_belli_weight(), 5);
        assert_eq!(BonusKind::Nuked.casus_belli_weight(), 4);
        assert_eq!(BonusKind::Alliance.casus_belli_weight(), 0);
        assert_eq!(BonusKind::TradeAlliance.casus_belli_weight(), 0);
        assert_eq!(BonusKind::DefensivePact.casus_belli_weight(), 0);
    }

    #[test]
    fn test_every_grievance_has_a_phrase() {
        for kind in BonusKind::ALL {
            if kind.casus_belli_weight() > 0 {
                assert_ne!(kind.casus_belli_phrase(), "no grievance", "{:?}", kind);
            }
        }
    }

    #[test]
    fn test_affinity_magnitude_is_external() {
        let effect = BonusEffect::affinity(4);
        assert_eq!(effect.kind(), BonusKind::DiplomacyBonus);
        assert_eq!(effect.magnitude(), 4);
        assert_eq!(effect.remaining_lifetime(), PERMANENT);
    }

    #[test]
    fn test_tick_counts_down() {
        let mut effect = BonusEffect::new(BonusKind::Insult);
        effect.tick_lifetime();
        assert_eq!(effect.remaining_lifetime(), 24);
    }

    #[test]
    fn test_permanent_effects_hold() {
        let mut effect = BonusEffect::new(BonusKind::Alliance);
        for _ in 0..300 {
            effect.tick_lifetime();
        }
        assert_eq!(effect.remaining_lifetime(), PERMANENT);
        assert_eq!(effect.magnitude(), 5);
    }

    #[test]
    fn test_long_peace_grows() {
        let mut effect = BonusEffect::new(BonusKind::LongPeace);
        assert_eq!(effect.magnitude(), 1);
        for _ in 0..19 {
            effect.tick_lifetime();
        }
        assert_eq!(effect.remaining_lifetime(), 20);
        assert_eq!(effect.magnitude(), 3);
    }

    #[test]
    fn test_expired_long_peace_stays_expired() {
        let mut effect = BonusEffect::new(BonusKind::LongPeace);
        effect.set_lifetime(0);
        effect.tick_lifetime();
        assert!(effect.is_expired());
        assert_eq!(effect.magnitude(), 0);
    }

    #[test]
    fn test_set_lifetime_clamps() {
        let mut effect = BonusEffect::new(BonusKind::GiftGiven);
        effect.set_lifetime(1000);
        assert_eq!(effect.remaining_lifetime(), 255);
        effect.set_lifetime(-7);
        assert_eq!(effect.remaining_lifetime(), 0);
        assert!(effect.is_expired());
        assert_eq!(effect.magnitude(), 0);
    }

    #[test]
    fn test_restore_rereads_table() {
        let effect = BonusEffect::restore(BonusKind::Insult, 3, Some(99));
        assert_eq!(effect.magnitude(), -3);
        assert_eq!(effect.remaining_lifetime(), 3);

        let affinity = BonusEffect::restore(BonusKind::DiplomacyBonus, PERMANENT, Some(-2));
        assert_eq!(affinity.magnitude(), -2);
    }
}
