//! Unit tests for EMA indicator

use confluence::indicators::trend::{calculate_ema, ema_multiplier};
use confluence::indicators::IndicatorError;

use crate::fixtures::{linear_closes, zigzag_closes};

#[test]
fn test_ema_insufficient_data() {
    let prices = linear_closes(10, 100.0, 0.1);
    let ema = calculate_ema(&prices, 20).unwrap();
    assert_eq!(ema.len(), 10);
    assert!(ema.iter().all(Option::is_none));
}

#[test]
fn test_ema_seed_is_simple_mean() {
    let prices = vec![2.0, 4.0, 6.0, 8.0, 10.0];
    let ema = calculate_ema(&prices, 3).unwrap();
    assert_eq!(ema[0], None);
    assert_eq!(ema[1], None);
    assert_eq!(ema[2], Some(4.0));
}

#[test]
fn test_ema_matches_recurrence_replay() {
    let prices = zigzag_closes(40, 1.0);
    let period = 9;
    let ema = calculate_ema(&prices, period).unwrap();

    let k = ema_multiplier(period);
    let mut expected = prices[..period].iter().sum::<f64>() / period as f64;
    assert_eq!(ema[period - 1], Some(expected));
    for i in period..prices.len() {
        expected = prices[i] * k + expected * (1.0 - k);
        let actual = ema[i].unwrap();
        assert!(
            (actual - expected).abs() < 1e-9,
            "index {}: {} != {}",
            i,
            actual,
            expected
        );
    }
}

#[test]
fn test_ema_rejects_zero_period() {
    let prices = linear_closes(10, 100.0, 1.0);
    assert!(matches!(
        calculate_ema(&prices, 0),
        Err(IndicatorError::InvalidParameter { .. })
    ));
}
