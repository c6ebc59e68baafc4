use anyhow::{Context, Result};
use diplosim_core::{
    AffinitySource, BonusKind, Diplomacy, DiplomacyConfig, Realm, RealmIndex, RelationsError,
    WarMaterializer,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One participant as written in a scenario file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealmSpec {
    pub name: String,
    /// Diplomacy affinity of this realm's race and government.
    #[serde(default)]
    pub affinity: i32,
}

/// A relationship-changing action, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    AddBonus {
        owner: RealmIndex,
        target: RealmIndex,
        kind: BonusKind,
    },
    Symmetric {
        a: RealmIndex,
        b: RealmIndex,
        kind: BonusKind,
    },
    /// Both realms take the other's affinity into account.
    Affinity { a: RealmIndex, b: RealmIndex },
    DeclareWar {
        aggressor: RealmIndex,
        victim: RealmIndex,
    },
    MakePeace { a: RealmIndex, b: RealmIndex },
    Meet { a: RealmIndex, b: RealmIndex },
    PromiseVote {
        promiser: RealmIndex,
        promisee: RealmIndex,
        yes: bool,
    },
    /// `voter` casts its vote; every realm holding a promise from it settles.
    Vote { voter: RealmIndex, yes: bool },
    RealmLost { realm: RealmIndex },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledAction {
    pub turn: u32,
    #[serde(flatten)]
    pub action: Action,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub realms: Vec<RealmSpec>,
    #[serde(default)]
    pub config: DiplomacyConfig,
    #[serde(default)]
    pub actions: Vec<ScheduledAction>,
}

impl AffinitySource for Scenario {
    fn diplomacy_affinity(&self, realm: RealmIndex) -> i32 {
        self.realms.get(realm).map_or(0, |r| r.affinity)
    }
}

impl Scenario {
    /// Fresh relationship state for this scenario's realms.
    pub fn initial_state(&self) -> Diplomacy {
        let realms = self.realms.iter().map(|r| Realm::new(&r.name)).collect();
        Diplomacy::new(realms, self.config.clone())
    }

    /// Actions stamped with `turn`, in file order.
    pub fn actions_for(&self, turn: u32) -> impl Iterator<Item = &Action> {
        self.actions
            .iter()
            .filter(move |a| a.turn == turn)
            .map(|a| &a.action)
    }

    /// Last turn any action is scheduled for.
    pub fn last_action_turn(&self) -> Option<u32> {
        self.actions.iter().map(|a| a.turn).max()
    }
}

pub fn load_scenario(path: &Path) -> Result<Scenario> {
    log::info!("Loading scenario from {:?}", path);
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenario {}", path.display()))?;
    let scenario: Scenario = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse scenario {}", path.display()))?;
    if scenario.realms.len() < 2 {
        anyhow::bail!(
            "Scenario {} needs at least two realms, found {}",
            path.display(),
            scenario.realms.len()
        );
    }
    log::info!(
        "Loaded {} realms and {} scheduled actions",
        scenario.realms.len(),
        scenario.actions.len()
    );
    Ok(scenario)
}

/// Apply one action to the state.
pub fn apply_action(
    diplo: &mut Diplomacy,
    affinity: &dyn AffinitySource,
    action: &Action,
    materializer: &mut dyn WarMaterializer,
) -> Result<(), RelationsError> {
    match *action {
        Action::AddBonus {
            owner,
            target,
            kind,
        } => {
            diplo.add_bonus(owner, target, kind)?;
        }
        Action::Symmetric { a, b, kind } => {
            diplo.apply_symmetric_effect(a, b, kind)?;
        }
        Action::Affinity { a, b } => {
            diplo.apply_affinity(a, b, affinity)?;
            diplo.apply_affinity(b, a, affinity)?;
        }
        Action::DeclareWar { aggressor, victim } => {
            diplo.declare_war(aggressor, victim, materializer)?;
        }
        Action::MakePeace { a, b } => diplo.make_peace(a, b)?,
        Action::Meet { a, b } => diplo.record_meeting(a, b)?,
        Action::PromiseVote {
            promiser,
            promisee,
            yes,
        } => {
            diplo.promise_vote(promiser, promisee, yes)?;
        }
        Action::Vote { voter, yes } => {
            for promisee in 0..diplo.realm_count() {
                if promisee != voter {
                    diplo.resolve_vote(promisee, voter, yes)?;
                }
            }
        }
        Action::RealmLost { realm } => diplo.mark_realm_lost(realm)?,
    }
    Ok(())
}

/// Built-in four-realm scenario used when no file is given.
pub fn demo_scenario() -> Scenario {
    let realm = |name: &str, affinity: i32| RealmSpec {
        name: name.to_string(),
        affinity,
    };
    let at = |turn: u32, action: Action| ScheduledAction { turn, action };

    Scenario {
        realms: vec![
            realm("Terran", 1),
            realm("Mechion", -2),
            realm("Chiraloid", 0),
            realm("Reborgian", 3),
        ],
        config: DiplomacyConfig::default(),
        actions: vec![
            at(0, Action::Meet { a: 0, b: 1 }),
            at(0, Action::Affinity { a: 0, b: 1 }),
            at(
                0,
                Action::Symmetric {
                    a: 1,
                    b: 2,
                    kind: BonusKind::DefensivePact,
                },
            ),
            at(
                0,
                Action::Symmetric {
                    a: 2,
                    b: 3,
                    kind: BonusKind::DefensivePact,
                },
            ),
            at(
                1,
                Action::AddBonus {
                    owner: 1,
                    target: 0,
                    kind: BonusKind::BorderCrossed,
                },
            ),
            at(
                2,
                Action::AddBonus {
                    owner: 1,
                    target: 0,
                    kind: BonusKind::BorderCrossed,
                },
            ),
            at(
                2,
                Action::PromiseVote {
                    promiser: 3,
                    promisee: 0,
                    yes: true,
                },
            ),
            at(
                3,
                Action::AddBonus {
                    owner: 1,
                    target: 0,
                    kind: BonusKind::BorderCrossed,
                },
            ),
            at(
                4,
                Action::DeclareWar {
                    aggressor: 0,
                    victim: 1,
                },
            ),
            at(6, Action::Vote { voter: 3, yes: false }),
            at(12, Action::MakePeace { a: 0, b: 1 }),
            at(12, Action::MakePeace { a: 0, b: 2 }),
            at(12, Action::MakePeace { a: 0, b: 3 }),
        ],
    }
}
