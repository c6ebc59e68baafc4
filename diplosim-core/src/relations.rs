//! Read-only classification of ledgers.
//!
//! Everything here is a total function of a ledger's contents; AI and
//! presentation layers call these to color, label and rank relationships.

use crate::bonus::BonusKind;
use crate::ledger::RelationshipLedger;
use serde::{Deserialize, Serialize};

/// Coarse five-step attitude derived from an aggregate score.
///
/// Ordered from worst to best; [`value`](Self::value) is the numeric rank used
/// when scanning for the least-liked realm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LikingTier {
    Hate,
    Dislike,
    Neutral,
    Like,
    Friends,
}

impl LikingTier {
    pub const fn value(self) -> u8 {
        self as u8
    }

    pub const fn label(self) -> &'static str {
        match self {
            LikingTier::Hate => "Hate",
            LikingTier::Dislike => "Dislike",
            LikingTier::Neutral => "Neutral",
            LikingTier::Like => "Like",
            LikingTier::Friends => "Friends",
        }
    }
}

/// Formal relation state. Mutually exclusive; see [`relation_label`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationLabel {
    #[default]
    None,
    Peace,
    TradeAlliance,
    DefensivePact,
    Alliance,
    War,
}

impl RelationLabel {
    pub const fn label(self) -> &'static str {
        match self {
            RelationLabel::None => "",
            RelationLabel::Peace => "Peace",
            RelationLabel::TradeAlliance => "Trade alliance",
            RelationLabel::DefensivePact => "Defensive pact",
            RelationLabel::Alliance => "Alliance",
            RelationLabel::War => "War",
        }
    }
}

/// Casus-belli summary for one ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CasusBelliReport {
    pub score: i32,
    pub dominant: Option<BonusKind>,
    pub dominant_reason: &'static str,
}

/// Bucket a score into a tier.
///
/// `< -15` Hate, `-15..-5` Dislike, `-5..=5` Neutral, `6..=15` Like,
/// `> 15` Friends. Exactly ±5 is Neutral and exactly ±15 stays in the inner
/// tier.
pub fn liking_tier(score: i32) -> LikingTier {
    if score < -15 {
        LikingTier::Hate
    } else if score < -5 {
        LikingTier::Dislike
    } else if score <= 5 {
        LikingTier::Neutral
    } else if score <= 15 {
        LikingTier::Like
    } else {
        LikingTier::Friends
    }
}

/// Tier of a ledger's current aggregate score.
pub fn ledger_liking_tier(ledger: &RelationshipLedger) -> LikingTier {
    liking_tier(ledger.aggregate_score())
}

/// Formal relation state of a ledger.
///
/// Checked in order peace, trade alliance, defensive pact, alliance, war; a
/// later match overrides an earlier one.
pub fn relation_label(ledger: &RelationshipLedger) -> RelationLabel {
    const PRIORITY: [(BonusKind, RelationLabel); 5] = [
        (BonusKind::LongPeace, RelationLabel::Peace),
        (BonusKind::TradeAlliance, RelationLabel::TradeAlliance),
        (BonusKind::DefensivePact, RelationLabel::DefensivePact),
        (BonusKind::Alliance, RelationLabel::Alliance),
        (BonusKind::War, RelationLabel::War),
    ];

    PRIORITY
        .iter()
        .filter(|(kind, _)| ledger.has_kind(*kind))
        .map(|(_, label)| *label)
        .last()
        .unwrap_or_default()
}

/// More than two recorded border violations (open or covert).
pub fn multiple_border_crossings(ledger: &RelationshipLedger) -> bool {
    ledger.count_of(BonusKind::BorderCrossed) + ledger.count_of(BonusKind::EspionageBorderCross) > 2
}

/// Tier label, followed by the relation label when there is one.
pub fn combined_relation_text(ledger: &RelationshipLedger) -> String {
    let tier = ledger_liking_tier(ledger).label();
    match relation_label(ledger) {
        RelationLabel::None => tier.to_string(),
        label => format!("{} {}", tier, label.label()),
    }
}

pub fn casus_belli_report(ledger: &RelationshipLedger) -> CasusBelliReport {
    CasusBelliReport {
        score: ledger.casus_belli_score(),
        dominant: ledger.dominant_casus_belli_kind(),
        dominant_reason: ledger.dominant_casus_belli(),
    }
}
