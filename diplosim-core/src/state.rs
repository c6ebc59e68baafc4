use crate::bonus::BonusKind;
use crate::config::DiplomacyConfig;
use crate::events::{DiplomacyEvent, EventLog};
use crate::ledger::RelationshipLedger;
use crate::pact::{run_pact_cascade, CascadeReport, WarMaterializer};
use crate::registry::{apply_symmetric_effect, RelationsError, RelationshipRegistry};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Position of a realm in the game's realm list.
pub type RealmIndex = usize;

/// Display-name lookup for notification text.
pub trait RealmNames {
    fn empire_name(&self, realm: RealmIndex) -> String;
}

/// Race/government diplomacy affinity, owned by the species/government layer.
pub trait AffinitySource {
    /// How agreeable `realm`'s race and government are to deal with.
    fn diplomacy_affinity(&self, realm: RealmIndex) -> i32;
}

/// Identity of one participant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Realm {
    pub name: String,
    /// Marked when the realm is eliminated; its ledgers stay in place.
    #[serde(default)]
    pub lost: bool,
}

impl Realm {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lost: false,
        }
    }
}

/// Every realm's view of every other realm, plus the turn clock.
///
/// All relationship-changing actions for a turn go through the handlers here;
/// [`advance_turn`](Self::advance_turn) then runs decay exactly once and moves
/// the clock forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diplomacy {
    pub turn: u32,
    pub config: DiplomacyConfig,
    pub(crate) realms: Vec<Realm>,
    pub(crate) registries: Vec<RelationshipRegistry>,
    events: EventLog,
}

impl RealmNames for Diplomacy {
    fn empire_name(&self, realm: RealmIndex) -> String {
        self.realms
            .get(realm)
            .map_or_else(|| format!("Realm #{}", realm), |r| r.name.clone())
    }
}

impl Diplomacy {
    /// A fresh game: every ordered pair starts with an empty ledger.
    pub fn new(realms: Vec<Realm>, config: DiplomacyConfig) -> Self {
        let count = realms.len();
        let registries = (0..count)
            .map(|owner| RelationshipRegistry::new(owner, count))
            .collect();
        Self {
            turn: 0,
            config,
            realms,
            registries,
            events: EventLog::new(),
        }
    }

    pub(crate) fn from_parts(
        turn: u32,
        config: DiplomacyConfig,
        realms: Vec<Realm>,
        registries: Vec<RelationshipRegistry>,
    ) -> Self {
        Self {
            turn,
            config,
            realms,
            registries,
            events: EventLog::new(),
        }
    }

    pub fn realm_count(&self) -> usize {
        self.realms.len()
    }

    pub fn realms(&self) -> &[Realm] {
        &self.realms
    }

    fn check_index(&self, index: RealmIndex) -> Result<(), RelationsError> {
        if index >= self.realms.len() {
            return Err(RelationsError::OutOfRange {
                index,
                realm_count: self.realms.len(),
            });
        }
        Ok(())
    }

    pub fn registry(&self, owner: RealmIndex) -> Result<&RelationshipRegistry, RelationsError> {
        self.check_index(owner)?;
        Ok(&self.registries[owner])
    }

    pub fn registries(&self) -> &[RelationshipRegistry] {
        &self.registries
    }

    /// `owner`'s ledger about `target`.
    pub fn ledger(
        &self,
        owner: RealmIndex,
        target: RealmIndex,
    ) -> Result<&RelationshipLedger, RelationsError> {
        self.registry(owner)?.ledger_for(target)
    }

    fn ledger_mut(
        &mut self,
        owner: RealmIndex,
        target: RealmIndex,
    ) -> Result<&mut RelationshipLedger, RelationsError> {
        self.check_index(owner)?;
        self.registries[owner].ledger_for_mut(target)
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<DiplomacyEvent> {
        self.events.drain()
    }

    fn note_added(&mut self, owner: RealmIndex, target: RealmIndex, kind: BonusKind) {
        self.events.push(DiplomacyEvent::BonusAdded {
            turn: self.turn,
            owner,
            target,
            kind,
        });
    }

    /// One-sided effect: `owner`'s view of `target` changes.
    pub fn add_bonus(
        &mut self,
        owner: RealmIndex,
        target: RealmIndex,
        kind: BonusKind,
    ) -> Result<bool, RelationsError> {
        let added = self.ledger_mut(owner, target)?.add_bonus(kind);
        if added {
            self.note_added(owner, target, kind);
        }
        Ok(added)
    }

    /// Mirrored effect written into both ledgers of the pair.
    pub fn apply_symmetric_effect(
        &mut self,
        a: RealmIndex,
        b: RealmIndex,
        kind: BonusKind,
    ) -> Result<(bool, bool), RelationsError> {
        let (added_a, added_b) = apply_symmetric_effect(&mut self.registries, a, b, kind)?;
        if added_a {
            self.note_added(a, b, kind);
        }
        if added_b {
            self.note_added(b, a, kind);
        }
        Ok((added_a, added_b))
    }

    /// Add the affinity effect to `owner`'s view of `target`, sized by
    /// `target`'s race and government.
    pub fn apply_affinity(
        &mut self,
        owner: RealmIndex,
        target: RealmIndex,
        source: &dyn AffinitySource,
    ) -> Result<bool, RelationsError> {
        let magnitude = source.diplomacy_affinity(target);
        let added = self
            .ledger_mut(owner, target)?
            .add_affinity_bonus(magnitude);
        if added {
            self.note_added(owner, target, BonusKind::DiplomacyBonus);
        }
        Ok(added)
    }

    /// Both realms record a diplomatic encounter.
    pub fn record_meeting(&mut self, a: RealmIndex, b: RealmIndex) -> Result<(), RelationsError> {
        self.ledger(b, a)?;
        self.ledger_mut(a, b)?.record_meeting();
        self.ledger_mut(b, a)?.record_meeting();
        self.events.push(DiplomacyEvent::Meeting {
            turn: self.turn,
            a,
            b,
        });
        Ok(())
    }

    /// `promiser` promises `promisee` how it will vote.
    pub fn promise_vote(
        &mut self,
        promiser: RealmIndex,
        promisee: RealmIndex,
        vote_yes: bool,
    ) -> Result<bool, RelationsError> {
        let kind = if vote_yes {
            BonusKind::PromisedVoteYes
        } else {
            BonusKind::PromisedVoteNo
        };
        self.add_bonus(promisee, promiser, kind)
    }

    /// `voter` has voted; `promisee` checks it against any promise on record.
    ///
    /// Returns `Some(kept)` when a promise was settled.
    pub fn resolve_vote(
        &mut self,
        promisee: RealmIndex,
        voter: RealmIndex,
        voted_yes: bool,
    ) -> Result<Option<bool>, RelationsError> {
        let outcome = self
            .ledger_mut(promisee, voter)?
            .record_promise_outcome(voted_yes);
        if let Some(kept) = outcome {
            log::info!(
                "{} {} its vote promise to {}",
                self.empire_name(voter),
                if kept { "kept" } else { "broke" },
                self.empire_name(promisee)
            );
            self.events.push(DiplomacyEvent::PromiseResolved {
                turn: self.turn,
                promisee,
                voter,
                kept,
            });
        }
        Ok(outcome)
    }

    /// Declare war and run the defensive-pact cascade.
    ///
    /// Writes war into both ledgers, gives the victim a grievance against the
    /// aggressor, asks `materializer` to record the war, then pulls in pact
    /// partners. `aggressor == victim` is logged and ignored, as is a
    /// declaration between realms already at war.
    #[instrument(skip_all, name = "declare_war", fields(aggressor = aggressor, victim = victim))]
    pub fn declare_war(
        &mut self,
        aggressor: RealmIndex,
        victim: RealmIndex,
        materializer: &mut dyn WarMaterializer,
    ) -> Result<CascadeReport, RelationsError> {
        self.check_index(aggressor)?;
        self.check_index(victim)?;
        if aggressor == victim {
            log::warn!(
                "{} tried to declare war on itself; ignoring",
                self.empire_name(aggressor)
            );
            return Ok(CascadeReport::default());
        }

        if self.registries[aggressor]
            .ledger_for(victim)?
            .has_kind(BonusKind::War)
        {
            log::debug!(
                "{} is already at war with {}; declaration ignored",
                self.empire_name(aggressor),
                self.empire_name(victim)
            );
            return Ok(CascadeReport::default());
        }

        log::info!(
            "{} declares war on {}",
            self.empire_name(aggressor),
            self.empire_name(victim)
        );
        materializer.materialize_war(aggressor, victim);
        self.apply_symmetric_effect(aggressor, victim, BonusKind::War)?;
        self.add_bonus(victim, aggressor, BonusKind::WarDeclarationAgainstUs)?;
        self.events.push(DiplomacyEvent::WarDeclared {
            turn: self.turn,
            aggressor,
            victim,
        });

        let names = NameTable(&self.realms);
        let report = run_pact_cascade(
            &mut self.registries,
            aggressor,
            victim,
            self.config.chain_defensive_pacts,
            &names,
            materializer,
        )?;

        for activation in &report.activations {
            let ally = activation.ally;
            self.note_added(aggressor, ally, BonusKind::War);
            self.note_added(ally, aggressor, BonusKind::War);
            self.note_added(ally, aggressor, BonusKind::WarDeclaration);
            self.events.push(DiplomacyEvent::PactActivated {
                turn: self.turn,
                aggressor,
                defended: activation.defended,
                ally: activation.ally,
                ally_name: activation.ally_name.clone(),
            });
        }
        if let Some(summary) = report.summary() {
            log::info!("{}", summary);
        }
        Ok(report)
    }

    /// End a war between two realms; long peace starts counting.
    pub fn make_peace(&mut self, a: RealmIndex, b: RealmIndex) -> Result<(), RelationsError> {
        self.apply_symmetric_effect(a, b, BonusKind::LongPeace)?;
        log::info!(
            "{} and {} make peace",
            self.empire_name(a),
            self.empire_name(b)
        );
        Ok(())
    }

    /// Mark a realm eliminated: everyone else's ledger about it gets the
    /// `RealmLost` marker. Ledgers are never removed.
    pub fn mark_realm_lost(&mut self, lost: RealmIndex) -> Result<(), RelationsError> {
        self.check_index(lost)?;
        if self.realms[lost].lost {
            return Ok(());
        }
        self.realms[lost].lost = true;
        for owner in 0..self.realms.len() {
            if owner != lost {
                self.add_bonus(owner, lost, BonusKind::RealmLost)?;
            }
        }
        log::info!("{} has been lost", self.empire_name(lost));
        self.events.push(DiplomacyEvent::RealmLost {
            turn: self.turn,
            realm: lost,
        });
        Ok(())
    }

    /// Close the turn: decay every registry once, then advance the clock.
    ///
    /// Must run after every action for the turn has been applied.
    #[instrument(skip_all, name = "advance_turn")]
    pub fn advance_turn(&mut self) {
        let turn = self.turn;
        let mut expired_total = 0;
        for registry in &mut self.registries {
            let owner = registry.owner();
            for (target, kinds) in registry.decay_all_one_turn() {
                expired_total += kinds.len();
                if self.config.record_expirations {
                    self.events.push(DiplomacyEvent::EffectsExpired {
                        turn,
                        owner,
                        target,
                        kinds,
                    });
                }
            }
        }
        log::debug!("Turn {}: {} effects expired", turn, expired_total);

        self.turn += 1;
        crate::profiling::frame_mark_turn();
    }

    /// Compute a deterministic checksum of the relationship state.
    ///
    /// Identical states produce identical checksums; used for replay
    /// validation and desync detection. The event log is not included.
    pub fn checksum(&self) -> u64 {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        self.turn.hash(&mut hasher);

        for (index, realm) in self.realms.iter().enumerate() {
            index.hash(&mut hasher);
            realm.hash(&mut hasher);
        }

        for registry in &self.registries {
            registry.owner().hash(&mut hasher);
            for ledger in registry.ledgers() {
                ledger.target().hash(&mut hasher);
                ledger.meeting_count().hash(&mut hasher);
                for effect in ledger.effects() {
                    effect.kind().code().hash(&mut hasher);
                    effect.remaining_lifetime().hash(&mut hasher);
                    effect.base_magnitude().hash(&mut hasher);
                }
            }
        }

        hasher.finish()
    }
}

/// Borrowed name list handed to the cascade while registries are mutably
/// borrowed.
struct NameTable<'a>(&'a [Realm]);

impl RealmNames for NameTable<'_> {
    fn empire_name(&self, realm: RealmIndex) -> String {
        self.0
            .get(realm)
            .map_or_else(|| format!("Realm #{}", realm), |r| r.name.clone())
    }
}
