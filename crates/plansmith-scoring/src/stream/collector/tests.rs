use rust_decimal::Decimal;

use plansmith_core::Value;

use super::*;

fn consecutive() -> ConsecutiveAccumulator {
    to_consecutive_sequences(|_| Value::None, |_| 0).create_accumulator()
}

fn balance() -> LoadBalanceAccumulator {
    load_balance(|_| Value::None, |_| 0).create_accumulator()
}

#[test]
fn test_count_accumulate_and_retract() {
    let mut acc = count().create_accumulator();
    acc.accumulate(&());
    acc.accumulate(&());
    acc.accumulate(&());
    assert_eq!(acc.finish(), 3);
    acc.retract(&());
    assert_eq!(acc.get(), 2);
}

#[test]
fn test_sum_integer_and_decimal() {
    let mut acc = sum(|_| 0).create_accumulator();
    acc.accumulate(&5);
    acc.accumulate(&7);
    acc.retract(&5);
    assert_eq!(acc.finish(), 7);

    let mut acc = sum_decimal(|_| Decimal::ZERO).create_accumulator();
    acc.accumulate(&Decimal::new(15, 1));
    acc.accumulate(&Decimal::new(25, 1));
    assert_eq!(acc.finish(), Decimal::from(4));
}

#[test]
fn test_consecutive_runs_split_on_gaps() {
    let mut acc = consecutive();
    for i in [1, 2, 3, 5, 6, 9] {
        acc.accumulate(&(i, Value::Int(i)));
    }
    let chain = acc.finish();
    let lengths: Vec<i64> = chain.sequences().iter().map(Sequence::length).collect();
    assert_eq!(lengths, vec![3, 2, 1]);
    assert_eq!(chain.sequences()[0].first_index(), 1);
    assert_eq!(chain.sequences()[0].last_index(), 3);
    assert_eq!(
        chain.breaks().iter().map(SequenceBreak::length).collect::<Vec<_>>(),
        vec![2, 3]
    );
}

#[test]
fn test_consecutive_retract_splits_run() {
    let mut acc = consecutive();
    for i in 1..=4 {
        acc.accumulate(&(i, Value::Int(i)));
    }
    assert_eq!(acc.finish().len(), 1);

    acc.retract(&(2, Value::Int(2)));
    let chain = acc.finish();
    assert_eq!(chain.len(), 2);
    assert_eq!(chain.sequences()[0].count(), 1);
    assert_eq!(chain.sequences()[1].count(), 2);
}

#[test]
fn test_consecutive_shared_index_counts_items() {
    let mut acc = consecutive();
    acc.accumulate(&(1, Value::Int(10)));
    acc.accumulate(&(1, Value::Int(11)));
    acc.accumulate(&(2, Value::Int(12)));
    let chain = acc.finish();
    assert_eq!(chain.len(), 1);
    assert_eq!(chain.sequences()[0].length(), 2);
    assert_eq!(chain.sequences()[0].count(), 3);
}

#[test]
fn test_load_balance_even_distribution_is_zero() {
    let mut acc = balance();
    for key in 1..=3 {
        acc.accumulate(&(Value::Int(key), 1));
    }
    assert_eq!(acc.finish().unfairness(), Decimal::ZERO);
}

#[test]
fn test_load_balance_uneven_distribution_is_positive() {
    let mut acc = balance();
    acc.accumulate(&(Value::Int(1), 1));
    acc.accumulate(&(Value::Int(2), 1));
    acc.accumulate(&(Value::Int(3), 1));
    acc.accumulate(&(Value::Int(3), 1));

    let result = acc.finish();
    // loads {1, 1, 2}: Σ(x - 4/3)² = 2/3
    assert_eq!(result.unfairness(), Decimal::new(81650, 5));
    assert_eq!(result.loads().get(&Value::Int(3)), Some(&2));
}

#[test]
fn test_load_balance_retract_restores_balance() {
    let mut acc = balance();
    acc.accumulate(&(Value::Int(1), 2));
    acc.accumulate(&(Value::Int(2), 2));
    acc.accumulate(&(Value::Int(2), 3));
    assert!(acc.finish().unfairness() > Decimal::ZERO);

    acc.retract(&(Value::Int(2), 3));
    assert_eq!(acc.finish().unfairness(), Decimal::ZERO);

    acc.retract(&(Value::Int(2), 2));
    assert_eq!(acc.finish().loads().len(), 1);
    assert_eq!(acc.finish().unfairness(), Decimal::ZERO);
}

#[test]
fn test_load_balance_ignores_zero_metric() {
    let mut acc = balance();
    acc.accumulate(&(Value::Int(1), 1));
    acc.accumulate(&(Value::Int(2), 0));
    assert_eq!(acc.finish().loads().len(), 1);
}
