//! Hand-built scenarios over the fixture domains.

use std::sync::Arc;

use plansmith_core::{
    Decimal, ElementRef, EntityRef, HardMediumSoftDecimalScore, HardSoftScore, ModelError,
};
use plansmith_scoring::{ScoreDirector, ScoreDirectorError};
use plansmith_test::flight_crew::{self, ATTENDANT, PILOT};
use plansmith_test::{sports_league, tournament};

fn crew_director(pilot_slot_employee: i64) -> ScoreDirector<HardSoftScore> {
    let problem = flight_crew::builder()
        .fact(flight_crew::AIRPORT, flight_crew::airport(0, "LHR"))
        .fact(flight_crew::AIRPORT, flight_crew::airport(1, "JFK"))
        .fact(flight_crew::EMPLOYEE, flight_crew::employee(1, "Amy", 0, &[ATTENDANT], &[]))
        .fact(flight_crew::EMPLOYEE, flight_crew::employee(2, "Beth", 0, &[PILOT], &[]))
        .fact(flight_crew::FLIGHT, flight_crew::flight(1, 0, 600, 1, 1000))
        .fact(flight_crew::FLIGHT, flight_crew::flight(2, 1, 1200, 0, 1600))
        .entity(
            flight_crew::ASSIGNMENT,
            flight_crew::assignment(1, 1, 0, PILOT, Some(pilot_slot_employee)),
        )
        .entity(
            flight_crew::ASSIGNMENT,
            flight_crew::assignment(2, 2, 0, ATTENDANT, Some(1)),
        )
        .build()
        .unwrap();
    let graph = flight_crew::constraint_graph(Arc::clone(problem.descriptor()));
    ScoreDirector::new(problem, graph).unwrap()
}

#[test]
fn test_missing_skill_costs_exactly_one_penalty() {
    let mut director = crew_director(1);
    assert_eq!(director.calculate_score(), HardSoftScore::of_hard(-100));

    let explanation = director.explain();
    let skill = explanation.constraint("Required skill").unwrap();
    assert_eq!(skill.score, HardSoftScore::of_hard(-100));
    assert_eq!(
        skill.matches[0].justification.elements,
        vec![ElementRef::Entity(EntityRef::new(0, 0))]
    );
    assert_eq!(explanation.non_zero_constraints().len(), 1);
}

#[test]
fn test_qualified_crew_is_feasible() {
    let mut director = crew_director(2);
    assert_eq!(director.calculate_score(), HardSoftScore::of_soft(-2000));
    // Beth ends up in JFK and Amy starts there
    let explanation = director.explain();
    assert!(explanation.is_feasible());
    assert_eq!(explanation.non_zero_constraints().len(), 2);
}

#[test]
fn test_reassignment_clears_skill_penalty() {
    let mut director = crew_director(1);
    director.calculate_score();
    let slot = EntityRef::new(0, 0);
    let (_, employee) = director
        .working_solution()
        .descriptor()
        .variable(flight_crew::ASSIGNMENT, "employee")
        .unwrap();
    director
        .change_variable(slot, employee, flight_crew::employee_ref(Some(2)))
        .unwrap();
    assert_eq!(director.calculate_score(), HardSoftScore::of_soft(-2000));
    assert_eq!(director.calculate_score(), director.full_score());
}

fn league_director(rounds: &[i64]) -> ScoreDirector<HardSoftScore> {
    let mut builder = sports_league::builder();
    for id in 0..6 {
        builder = builder.fact(
            sports_league::TEAM,
            sports_league::team(id, &format!("Team {id}"), &[0; 6]),
        );
    }
    for index in 0..10 {
        builder = builder.fact(sports_league::ROUND, sports_league::round(index, false));
    }
    for (away, &round) in (1..).zip(rounds) {
        builder = builder.entity(
            sports_league::MATCH,
            sports_league::fixture(away, 0, away, false, Some(round)),
        );
    }
    let problem = builder.build().unwrap();
    let graph = sports_league::constraint_graph(Arc::clone(problem.descriptor()));
    ScoreDirector::new(problem, graph).unwrap()
}

fn home_streak_score(director: &ScoreDirector<HardSoftScore>) -> HardSoftScore {
    director
        .explain()
        .constraint("4 or more consecutive home matches")
        .unwrap()
        .score
}

#[test]
fn test_short_home_runs_are_not_penalized() {
    // runs 1..=3 and 5..=6
    let mut director = league_director(&[1, 2, 3, 5, 6]);
    director.calculate_score();
    assert_eq!(home_streak_score(&director), HardSoftScore::ZERO);
    assert_eq!(
        director
            .explain()
            .constraint("4 or more consecutive away matches")
            .unwrap()
            .match_count(),
        0
    );
}

#[test]
fn test_long_home_run_is_penalized_per_match() {
    let mut director = league_director(&[1, 2, 3, 5, 6]);
    director.calculate_score();
    let (_, round) = director
        .working_solution()
        .descriptor()
        .variable(sports_league::MATCH, "round")
        .unwrap();

    // 1..=4 becomes a run of four
    director
        .change_variable(EntityRef::new(0, 3), round, sports_league::round_ref(Some(4)))
        .unwrap();
    director.calculate_score();
    assert_eq!(home_streak_score(&director), HardSoftScore::of_hard(-4));

    // 1..=5, a run of five
    director
        .change_variable(EntityRef::new(0, 4), round, sports_league::round_ref(Some(5)))
        .unwrap();
    assert_eq!(director.calculate_score(), director.full_score());
    assert_eq!(home_streak_score(&director), HardSoftScore::of_hard(-5));
}

fn tournament_director(teams: &[Option<i64>]) -> ScoreDirector<HardMediumSoftDecimalScore> {
    let mut builder = tournament::builder();
    for id in 0..3 {
        builder = builder.fact(tournament::TEAM, tournament::team(id, &format!("Team {id}")));
    }
    for (day, &team) in (0..).zip(teams) {
        builder = builder
            .fact(tournament::DAY, tournament::day(day))
            .entity(tournament::ASSIGNMENT, tournament::slot(day, day, 0, team));
    }
    builder = builder.fact(tournament::UNAVAILABILITY, tournament::unavailability(0, 2, 0));
    let problem = builder.build().unwrap();
    let graph = tournament::constraint_graph(Arc::clone(problem.descriptor()));
    ScoreDirector::new(problem, graph).unwrap()
}

#[test]
fn test_balanced_assignment_counts_are_fair() {
    let mut director = tournament_director(&[Some(0), Some(1), Some(2)]);
    assert_eq!(director.calculate_score(), HardMediumSoftDecimalScore::ZERO);
}

#[test]
fn test_unbalanced_assignment_counts_cost_medium() {
    let mut director = tournament_director(&[Some(0), Some(1), Some(2)]);
    director.calculate_score();
    let (_, team) = director
        .working_solution()
        .descriptor()
        .variable(tournament::ASSIGNMENT, "team")
        .unwrap();

    director
        .change_variable(EntityRef::new(0, 2), team, tournament::team_ref(Some(0)))
        .unwrap();
    let score = director.calculate_score();
    // loads {2, 1}: sqrt(0.25 + 0.25)
    assert_eq!(score.medium(), -Decimal::new(70711, 5));
    assert!(score < HardMediumSoftDecimalScore::ZERO);
    assert_eq!(score, director.full_score());
}

#[test]
fn test_unavailable_team_costs_hard() {
    let mut director = tournament_director(&[Some(2), Some(1), Some(0)]);
    let score = director.calculate_score();
    assert_eq!(score.hard(), Decimal::from(-1));
    assert!(!director.explain().is_feasible());
}

#[test]
fn test_pinned_slot_rejects_change() {
    let problem = tournament::generate(3, 7, 8, 4);
    let pinned = problem
        .entity_refs()
        .find(|&e| problem.is_pinned(e))
        .unwrap();
    let graph = tournament::constraint_graph(Arc::clone(problem.descriptor()));
    let (_, team) = problem
        .descriptor()
        .variable(tournament::ASSIGNMENT, "team")
        .unwrap();
    let mut director = ScoreDirector::new(problem, graph).unwrap();
    let before = director.calculate_score();

    let err = director
        .change_variable(pinned, team, tournament::team_ref(Some(6)))
        .unwrap_err();
    assert!(matches!(
        err,
        ScoreDirectorError::Model(ModelError::PinnedEntity { .. })
    ));
    assert_eq!(director.calculate_score(), before);
}
