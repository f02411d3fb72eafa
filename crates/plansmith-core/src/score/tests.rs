//! Tests for score types.

use super::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

fn random_hms(rng: &mut StdRng) -> HardMediumSoftScore {
    HardMediumSoftScore::of(
        rng.random_range(-50..50),
        rng.random_range(-50..50),
        rng.random_range(-5000..5000),
    )
}

fn random_decimal(rng: &mut StdRng) -> HardMediumSoftDecimalScore {
    let level = |rng: &mut StdRng| Decimal::new(rng.random_range(-100_000..100_000), 3);
    HardMediumSoftDecimalScore::of(level(rng), level(rng), level(rng))
}

mod hard_soft_score {
    use super::*;

    #[test]
    fn test_creation() {
        let score = HardSoftScore::of(-2, -100);
        assert_eq!(score.hard(), -2);
        assert_eq!(score.soft(), -100);
        assert_eq!(HardSoftScore::of_hard(-3), HardSoftScore::of(-3, 0));
        assert_eq!(HardSoftScore::of_soft(7), HardSoftScore::of(0, 7));
    }

    #[test]
    fn test_feasibility_ignores_soft() {
        assert!(HardSoftScore::of(0, -1_000_000).is_feasible());
        assert!(HardSoftScore::of(5, -1).is_feasible());
        assert!(!HardSoftScore::of(-1, 1_000_000).is_feasible());
    }

    #[test]
    fn test_comparison() {
        assert!(HardSoftScore::of(0, -100) > HardSoftScore::of(-1, 0));
        assert!(HardSoftScore::of(-1, -5) > HardSoftScore::of(-1, -6));
    }

    #[test]
    fn test_multiply() {
        assert_eq!(
            HardSoftScore::of(-1, 10).multiply(3),
            HardSoftScore::of(-3, 30)
        );
        assert_eq!(HardSoftScore::of(-2, 4).abs(), HardSoftScore::of(2, 4));
    }

    #[test]
    fn test_parse_and_display() {
        let score: HardSoftScore = "-2hard/-30soft".parse().unwrap();
        assert_eq!(score, HardSoftScore::of(-2, -30));
        assert_eq!(score.to_string(), "-2hard/-30soft");
        assert!(HardSoftScore::parse("-2hard").is_err());
        assert!(HardSoftScore::parse("xhard/0soft").is_err());
    }

    #[test]
    fn test_level_labels() {
        assert_eq!(HardSoftScore::level_label(0), Some(ScoreLevel::Hard));
        assert_eq!(HardSoftScore::level_label(1), Some(ScoreLevel::Soft));
        assert_eq!(HardSoftScore::level_label(2), None);
    }
}

mod hard_medium_soft_score {
    use super::*;

    #[test]
    fn test_medium_beats_soft() {
        let a = HardMediumSoftScore::of(0, -10, -100);
        let b = HardMediumSoftScore::of(0, -5, -200);
        assert!(b > a);
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            HardMediumSoftScore::parse("0hard/-1medium/-2soft").unwrap(),
            HardMediumSoftScore::of(0, -1, -2)
        );
    }

    #[test]
    fn test_algebra() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let (a, b, c) = (random_hms(&mut rng), random_hms(&mut rng), random_hms(&mut rng));
            assert_eq!(a + b, b + a);
            assert_eq!((a + b) + c, a + (b + c));
            assert_eq!(a - a, HardMediumSoftScore::ZERO);
            assert_eq!(a + HardMediumSoftScore::zero(), a);
        }
    }

    #[test]
    fn test_total_order_follows_level_priority() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..500 {
            let (a, b) = (random_hms(&mut rng), random_hms(&mut rng));
            let lexicographic = (a.hard(), a.medium(), a.soft()).cmp(&(b.hard(), b.medium(), b.soft()));
            assert_eq!(a.cmp(&b), lexicographic);
            assert_eq!(a.cmp(&b), b.cmp(&a).reverse());
        }
    }

    #[test]
    fn test_feasibility_derivation() {
        let mut rng = StdRng::seed_from_u64(13);
        for _ in 0..500 {
            let score = random_hms(&mut rng);
            assert_eq!(score.is_feasible(), score.hard() >= 0);
        }
    }
}

mod decimal_scores {
    use super::*;

    #[test]
    fn test_exact_sum() {
        let tenth = HardSoftDecimalScore::of_soft(Decimal::new(1, 1));
        let fifth = HardSoftDecimalScore::of_soft(Decimal::new(2, 1));
        assert_eq!(tenth + fifth, HardSoftDecimalScore::of_soft(Decimal::new(3, 1)));
    }

    #[test]
    fn test_tiny_hard_penalty_is_infeasible() {
        let score = HardMediumSoftDecimalScore::of(
            Decimal::new(-1, 20),
            Decimal::ZERO,
            Decimal::from(1000),
        );
        assert!(!score.is_feasible());
        assert!(HardMediumSoftDecimalScore::ZERO.is_feasible());
    }

    #[test]
    fn test_multiply_decimal() {
        let weight = HardMediumSoftDecimalScore::ONE_MEDIUM;
        let scaled = weight.multiply_decimal(Decimal::new(1414, 3));
        assert_eq!(scaled.medium(), Decimal::new(1414, 3));
        assert_eq!(weight.multiply(4), HardMediumSoftDecimalScore::of_ints(0, 4, 0));
    }

    #[test]
    fn test_parse() {
        let score = HardMediumSoftDecimalScore::parse("0hard/-1.5medium/-0.25soft").unwrap();
        assert_eq!(score.medium(), Decimal::new(-15, 1));
        assert_eq!(score.soft(), Decimal::new(-25, 2));
    }

    #[test]
    fn test_algebra() {
        let mut rng = StdRng::seed_from_u64(17);
        for _ in 0..500 {
            let (a, b, c) = (
                random_decimal(&mut rng),
                random_decimal(&mut rng),
                random_decimal(&mut rng),
            );
            assert_eq!(a + b, b + a);
            assert_eq!((a + b) + c, a + (b + c));
            assert_eq!(a.cmp(&b), b.cmp(&a).reverse());
            assert_eq!(a.is_feasible(), a.hard() >= Decimal::ZERO);
        }
    }
}
