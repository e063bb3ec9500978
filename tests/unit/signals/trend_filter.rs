//! Unit tests for the long-term trend filter

use confluence::models::signal::SignalVote;
use confluence::signals::trend_filter::long_term_trend;

use crate::fixtures::{candles_from_closes, downtrend_long, linear_closes, uptrend_long};

#[test]
fn rising_closes_give_call() {
    assert_eq!(long_term_trend(&uptrend_long()).unwrap(), SignalVote::Call);
}

#[test]
fn falling_closes_give_put() {
    assert_eq!(long_term_trend(&downtrend_long()).unwrap(), SignalVote::Put);
}

#[test]
fn flat_closes_are_neutral() {
    let candles = candles_from_closes(&linear_closes(60, 42.0, 0.0), 60);
    assert_eq!(long_term_trend(&candles).unwrap(), SignalVote::Neutral);
}

#[test]
fn short_history_is_neutral() {
    let candles = candles_from_closes(&linear_closes(49, 100.0, 1.0), 60);
    assert_eq!(long_term_trend(&candles).unwrap(), SignalVote::Neutral);
    assert_eq!(long_term_trend(&[]).unwrap(), SignalVote::Neutral);
}
