use plansmith_core::Value;
use plansmith_test::{flight_crew, tournament};
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::*;
use crate::heuristic::r#move::Move;

#[test]
fn test_selectors_never_propose_pinned_entities() {
    for seed in 0..5 {
        let problem = tournament::generate(seed, 7, 18, 4);
        let pinned: Vec<_> = problem
            .entity_refs()
            .filter(|&e| problem.is_pinned(e))
            .collect();
        assert!(!pinned.is_empty());

        let selector = UnionMoveSelector::new(vec![
            Box::new(ChangeMoveSelector::new(&problem, None)),
            Box::new(SwapMoveSelector::new(&problem, None)),
        ]);
        let mut rng = StdRng::seed_from_u64(seed);
        for _ in 0..5_000 {
            let m = selector.random_move(&problem, &mut rng).unwrap();
            let entities = Move::<tournament::Score>::entities(&m);
            assert!(entities.iter().all(|e| !pinned.contains(e)), "{m:?}");
        }
    }
}

#[test]
fn test_change_selector_size() {
    // 18 days, one slot pinned every 4 days: 72 - 5 movable slots, 7 teams each
    let problem = tournament::generate(0, 7, 18, 4);
    let selector = ChangeMoveSelector::new(&problem, None);
    assert_eq!(selector.targets().len(), 67);
    assert_eq!(MoveSelector::<tournament::Score>::size(&selector), 67 * 7);
}

#[test]
fn test_change_selector_never_unassigns_required_variable() {
    let problem = flight_crew::generate(3, 6, 4);
    let selector = ChangeMoveSelector::new(&problem, None);
    let mut rng = StdRng::seed_from_u64(9);
    for _ in 0..1_000 {
        let Some(EitherMove::Change(m)) = selector.random_move(&problem, &mut rng) else {
            panic!("expected a change move");
        };
        assert_ne!(m.to_value(), &Value::None);
    }
}

#[test]
fn test_swap_selector_pairs_distinct_entities() {
    let problem = tournament::generate(2, 5, 4, 3);
    let selector = SwapMoveSelector::new(&problem, None);
    // 12 slots, one pinned
    assert_eq!(MoveSelector::<tournament::Score>::size(&selector), 11 * 10 / 2);
    let mut rng = StdRng::seed_from_u64(4);
    for _ in 0..1_000 {
        let Some(EitherMove::Swap(m)) = selector.random_move(&problem, &mut rng) else {
            panic!("expected a swap move");
        };
        assert_ne!(m.left(), m.right());
    }
}

#[test]
fn test_empty_selectors() {
    // a single day with a single pinned slot leaves nothing to move
    let problem = tournament::generate(0, 3, 1, 1);
    let mut rng = StdRng::seed_from_u64(0);
    let change = ChangeMoveSelector::new(&problem, None);
    assert!(change.random_move(&problem, &mut rng).is_none());
    let union = UnionMoveSelector::<tournament::Score>::new(vec![
        Box::new(change),
        Box::new(SwapMoveSelector::new(&problem, None)),
    ]);
    assert!(union.is_empty());
    assert!(union.random_move(&problem, &mut rng).is_none());
}
