//! Sports league scheduling fixtures.
//!
//! Every ordered pair of teams plays one match; the solver picks the round
//! of each match. Teams play at most once per round, avoid long home or
//! away streaks and short return matches, and travel as little as possible.
//! Team ids are `0..n` and each team stores its distance to every other
//! team, indexed by id.

use std::sync::Arc;

use plansmith_core::{
    Entity, EntityClassDef, Fact, FactClassDef, FieldDef, FieldId, HardSoftScore, Problem,
    ProblemBuilder, ProblemDescriptor, Row, Value, ValueRangeDef,
};
use plansmith_scoring::collector::{to_consecutive_sequences, SequenceChain};
use plansmith_scoring::joiner::{equal, filtering};
use plansmith_scoring::{Constraint, ConstraintFactory, ConstraintGraph};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const TEAM: &str = "Team";
pub const ROUND: &str = "Round";
pub const MATCH: &str = "Match";

pub const MAX_CONSECUTIVE_MATCHES: usize = 4;

const TEAM_CLASS: usize = 0;
const ROUND_CLASS: usize = 1;

pub fn descriptor() -> Arc<ProblemDescriptor> {
    Arc::new(
        ProblemDescriptor::builder()
            .fact_class(FactClassDef::new(TEAM, ["name", "distances"]))
            .fact_class(FactClassDef::new(ROUND, ["index", "weekend_or_holiday"]))
            .entity_class(EntityClassDef::new(
                MATCH,
                vec![
                    FieldDef::new("home_team"),
                    FieldDef::new("away_team"),
                    FieldDef::new("classic_match"),
                    FieldDef::planning_variable("round", ValueRangeDef::facts(ROUND)),
                ],
            ))
            .build()
            .expect("sports league descriptor is valid"),
    )
}

pub fn builder() -> ProblemBuilder<HardSoftScore> {
    Problem::builder(descriptor())
}

pub fn constraint_graph(descriptor: Arc<ProblemDescriptor>) -> Arc<ConstraintGraph<HardSoftScore>> {
    Arc::new(
        ConstraintGraph::build(descriptor, define_constraints)
            .expect("sports league constraints are valid"),
    )
}

pub fn team(id: i64, name: &str, distances: &[i64]) -> Fact {
    Fact::new(
        id,
        vec![
            Value::from(name),
            Value::List(distances.iter().map(|&d| Value::Int(d)).collect()),
        ],
    )
}

/// Round `index`, with the round id equal to its index.
pub fn round(index: i64, weekend_or_holiday: bool) -> Fact {
    Fact::new(index, vec![Value::Int(index), Value::Bool(weekend_or_holiday)])
}

pub fn fixture(id: i64, home: i64, away: i64, classic: bool, round: Option<i64>) -> Entity {
    Entity::new(
        id,
        vec![
            Value::fact(TEAM_CLASS, home),
            Value::fact(TEAM_CLASS, away),
            Value::Bool(classic),
            round_ref(round),
        ],
    )
}

pub fn round_ref(round: Option<i64>) -> Value {
    round.map_or(Value::None, |index| Value::fact(ROUND_CLASS, index))
}

/// A seeded double round robin over `teams` teams with `2 * (teams - 1)`
/// rounds, every third round on a weekend. Rounds start random or empty.
pub fn generate(seed: u64, teams: usize) -> Problem<HardSoftScore> {
    let mut rng = StdRng::seed_from_u64(seed);
    let n = teams as i64;
    let rounds = (2 * (n - 1)).max(1);

    let mut distances = vec![vec![0i64; teams]; teams];
    for a in 0..teams {
        for b in a + 1..teams {
            let d = rng.random_range(50..800);
            distances[a][b] = d;
            distances[b][a] = d;
        }
    }

    let mut builder = builder();
    for (id, row) in distances.iter().enumerate() {
        builder = builder.fact(TEAM, team(id as i64, &format!("Team {id}"), row));
    }
    for index in 0..rounds {
        builder = builder.fact(ROUND, round(index, index % 3 == 2));
    }

    let mut id = 0;
    for home in 0..n {
        for away in (0..n).filter(|&a| a != home) {
            let classic = (home + away) % 5 == 0;
            let round = rng.random_bool(0.6).then(|| rng.random_range(0..rounds));
            builder = builder.entity(MATCH, fixture(id, home, away, classic, round));
            id += 1;
        }
    }
    builder.build().expect("generated sports league problem is valid")
}

#[derive(Debug, Clone, Copy)]
struct Fields {
    home_team: FieldId,
    away_team: FieldId,
    classic_match: FieldId,
    round: FieldId,
    round_index: FieldId,
    weekend_or_holiday: FieldId,
    distances: FieldId,
}

impl Fields {
    fn new(factory: &ConstraintFactory<HardSoftScore>) -> Self {
        Self {
            home_team: factory.field(MATCH, "home_team"),
            away_team: factory.field(MATCH, "away_team"),
            classic_match: factory.field(MATCH, "classic_match"),
            round: factory.field(MATCH, "round"),
            round_index: factory.field(ROUND, "index"),
            weekend_or_holiday: factory.field(ROUND, "weekend_or_holiday"),
            distances: factory.field(TEAM, "distances"),
        }
    }

    fn home(self, m: &Row<'_>) -> Value {
        m.get(self.home_team).clone()
    }

    fn away(self, m: &Row<'_>) -> Value {
        m.get(self.away_team).clone()
    }

    fn round_index(self, m: &Row<'_>) -> Option<i64> {
        m.resolve(self.round)?.int(self.round_index)
    }

    /// Round index shifted by `delta`, as a join key.
    fn round_key(self, m: &Row<'_>, delta: i64) -> Value {
        self.round_index(m).map_or(Value::None, |i| Value::Int(i + delta))
    }

    /// Distance from the team in `from` of match `m` to team `to`.
    fn distance(self, m: &Row<'_>, from: FieldId, to: &Value) -> i64 {
        let (Some(team), Some(to)) = (m.resolve(from), to.as_fact_key()) else {
            return 0;
        };
        usize::try_from(to.id)
            .ok()
            .and_then(|i| team.list(self.distances).get(i))
            .and_then(Value::as_int)
            .unwrap_or(0)
    }
}

pub fn define_constraints(factory: &ConstraintFactory<HardSoftScore>) -> Vec<Constraint<HardSoftScore>> {
    vec![
        matches_on_same_day(factory),
        multiple_consecutive_home_matches(factory),
        multiple_consecutive_away_matches(factory),
        repeat_match_on_the_next_day(factory),
        start_to_away_hop(factory),
        home_to_away_hop(factory),
        away_to_away_hop(factory),
        away_to_home_hop(factory),
        away_to_end_hop(factory),
        classic_matches(factory),
    ]
}

pub fn matches_on_same_day(factory: &ConstraintFactory<HardSoftScore>) -> Constraint<HardSoftScore> {
    let f = Fields::new(factory);
    factory
        .for_each_unique_pair(
            MATCH,
            vec![
                equal(move |t| f.round_key(&t.row(0), 0), move |r| f.round_key(r, 0)),
                filtering(move |t, other| {
                    let m = t.row(0);
                    let teams = [f.home(&m), f.away(&m)];
                    teams.contains(&f.home(other)) || teams.contains(&f.away(other))
                }),
            ],
        )
        .penalize(HardSoftScore::ONE_HARD)
        .as_constraint("Matches on the same day")
}

fn consecutive_matches(
    factory: &ConstraintFactory<HardSoftScore>,
    side: fn(&Fields) -> FieldId,
    name: &str,
) -> Constraint<HardSoftScore> {
    let f = Fields::new(factory);
    let team_field = side(&f);
    factory
        .for_each(MATCH)
        .join(
            TEAM,
            vec![equal(move |t| t.row(0).get(team_field).clone(), |r| r.identity())],
        )
        .group_by(
            |t| t.row(1).identity(),
            to_consecutive_sequences(
                move |t| t.row(0).get(f.round).clone(),
                move |t| f.round_index(&t.row(0)).unwrap_or_default(),
            ),
        )
        .flatten_last(SequenceChain::into_sequences)
        .filter(|_, sequence| sequence.count() >= MAX_CONSECUTIVE_MATCHES)
        .penalize_with(HardSoftScore::ONE_HARD, |_, sequence| sequence.count() as i64)
        .as_constraint(name)
}

pub fn multiple_consecutive_home_matches(
    factory: &ConstraintFactory<HardSoftScore>,
) -> Constraint<HardSoftScore> {
    consecutive_matches(factory, |f| f.home_team, "4 or more consecutive home matches")
}

pub fn multiple_consecutive_away_matches(
    factory: &ConstraintFactory<HardSoftScore>,
) -> Constraint<HardSoftScore> {
    consecutive_matches(factory, |f| f.away_team, "4 or more consecutive away matches")
}

pub fn repeat_match_on_the_next_day(
    factory: &ConstraintFactory<HardSoftScore>,
) -> Constraint<HardSoftScore> {
    let f = Fields::new(factory);
    factory
        .for_each(MATCH)
        .if_exists(
            MATCH,
            vec![
                equal(move |t| f.home(&t.row(0)), move |r| f.away(r)),
                equal(move |t| f.away(&t.row(0)), move |r| f.home(r)),
                equal(move |t| f.round_key(&t.row(0), 1), move |r| f.round_key(r, 0)),
            ],
        )
        .penalize(HardSoftScore::ONE_HARD)
        .as_constraint("Repeat match on the next day")
}

pub fn start_to_away_hop(factory: &ConstraintFactory<HardSoftScore>) -> Constraint<HardSoftScore> {
    let f = Fields::new(factory);
    factory
        .for_each(MATCH)
        .if_not_exists(
            ROUND,
            vec![equal(
                move |t| f.round_key(&t.row(0), -1),
                move |r| r.get(f.round_index).clone(),
            )],
        )
        .penalize_with(HardSoftScore::ONE_SOFT, move |t| {
            let m = t.row(0);
            f.distance(&m, f.away_team, &f.home(&m))
        })
        .as_constraint("Start to away hop")
}

pub fn home_to_away_hop(factory: &ConstraintFactory<HardSoftScore>) -> Constraint<HardSoftScore> {
    let f = Fields::new(factory);
    factory
        .for_each(MATCH)
        .join(
            MATCH,
            vec![
                equal(move |t| f.home(&t.row(0)), move |r| f.away(r)),
                equal(move |t| f.round_key(&t.row(0), 1), move |r| f.round_key(r, 0)),
            ],
        )
        .penalize_with(HardSoftScore::ONE_SOFT, move |t| {
            f.distance(&t.row(0), f.home_team, &f.home(&t.row(1)))
        })
        .as_constraint("Home to away hop")
}

pub fn away_to_away_hop(factory: &ConstraintFactory<HardSoftScore>) -> Constraint<HardSoftScore> {
    let f = Fields::new(factory);
    factory
        .for_each(MATCH)
        .join(
            MATCH,
            vec![
                equal(move |t| f.away(&t.row(0)), move |r| f.away(r)),
                equal(move |t| f.round_key(&t.row(0), 1), move |r| f.round_key(r, 0)),
            ],
        )
        .penalize_with(HardSoftScore::ONE_SOFT, move |t| {
            f.distance(&t.row(0), f.home_team, &f.home(&t.row(1)))
        })
        .as_constraint("Away to away hop")
}

pub fn away_to_home_hop(factory: &ConstraintFactory<HardSoftScore>) -> Constraint<HardSoftScore> {
    let f = Fields::new(factory);
    factory
        .for_each(MATCH)
        .join(
            MATCH,
            vec![
                equal(move |t| f.away(&t.row(0)), move |r| f.home(r)),
                equal(move |t| f.round_key(&t.row(0), 1), move |r| f.round_key(r, 0)),
            ],
        )
        .penalize_with(HardSoftScore::ONE_SOFT, move |t| {
            let m = t.row(0);
            f.distance(&m, f.home_team, &f.away(&m))
        })
        .as_constraint("Away to home hop")
}

pub fn away_to_end_hop(factory: &ConstraintFactory<HardSoftScore>) -> Constraint<HardSoftScore> {
    let f = Fields::new(factory);
    factory
        .for_each(MATCH)
        .if_not_exists(
            ROUND,
            vec![equal(
                move |t| f.round_key(&t.row(0), 1),
                move |r| r.get(f.round_index).clone(),
            )],
        )
        .penalize_with(HardSoftScore::ONE_SOFT, move |t| {
            let m = t.row(0);
            f.distance(&m, f.home_team, &f.away(&m))
        })
        .as_constraint("Away to end hop")
}

pub fn classic_matches(factory: &ConstraintFactory<HardSoftScore>) -> Constraint<HardSoftScore> {
    let f = Fields::new(factory);
    factory
        .for_each(MATCH)
        .filter(move |t| {
            let m = t.row(0);
            m.bool(f.classic_match)
                && !m.resolve(f.round).is_some_and(|r| r.bool(f.weekend_or_holiday))
        })
        .penalize(HardSoftScore::of_soft(1000))
        .as_constraint("Classic matches played on weekends or holidays")
}
