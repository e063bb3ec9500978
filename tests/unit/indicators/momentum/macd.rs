//! Unit tests for MACD indicator

use confluence::indicators::momentum::{calculate_macd, calculate_macd_default};
use confluence::indicators::IndicatorError;

use crate::fixtures::{accelerating_closes, linear_closes, zigzag_closes};

#[test]
fn test_macd_histogram_identity() {
    let prices = zigzag_closes(60, 1.0);
    let macd = calculate_macd_default(&prices).unwrap();

    for i in 0..prices.len() {
        match (macd.macd_line[i], macd.signal_line[i]) {
            (Some(line), Some(signal)) => assert_eq!(macd.histogram[i], Some(line - signal)),
            _ => assert_eq!(macd.histogram[i], None),
        }
    }
}

#[test]
fn test_macd_warm_up_offsets() {
    let prices = accelerating_closes(60);
    let macd = calculate_macd(&prices, 12, 26, 9).unwrap();

    // MACD line starts with the slow EMA, the signal 8 defined values later.
    assert_eq!(macd.macd_line.iter().position(Option::is_some), Some(25));
    assert_eq!(macd.signal_line.iter().position(Option::is_some), Some(33));
    assert_eq!(macd.histogram.iter().position(Option::is_some), Some(33));
    assert!(macd.histogram[59].unwrap() > 0.0);
}

#[test]
fn test_macd_insufficient_data() {
    let prices = linear_closes(30, 100.0, 1.0);
    let macd = calculate_macd_default(&prices).unwrap();
    assert!(macd.macd_line[25..].iter().all(Option::is_some));
    assert!(macd.histogram.iter().all(Option::is_none));
}

#[test]
fn test_macd_invalid_parameter() {
    let prices = linear_closes(60, 100.0, 1.0);
    match calculate_macd(&prices, 12, 26, 0) {
        Err(IndicatorError::InvalidParameter { name, .. }) => assert_eq!(name, "signal_period"),
        other => panic!("expected InvalidParameter, got {:?}", other),
    }
}
