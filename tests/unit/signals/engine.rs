//! Unit tests for signal engine

use confluence::models::signal::{Direction, SignalTier, SignalVote};
use confluence::signals::engine::{AnalysisError, SignalEngine, MIN_CANDLES};

use crate::fixtures::{
    candles_from_closes, downtrend_long, linear_closes, medium_call_short, strong_call_short,
    strong_put_short, uptrend_long,
};

#[test]
fn rising_market_yields_strong_call() {
    let result = SignalEngine::evaluate("EURUSD=X", &strong_call_short(), &uptrend_long()).unwrap();

    assert_eq!(result.symbol, "EURUSD=X");
    assert_eq!(result.votes.trend, SignalVote::Call);
    assert_eq!(result.votes.ema, SignalVote::Call);
    assert_eq!(result.votes.rsi, SignalVote::Call);
    assert_eq!(result.votes.macd, SignalVote::Call);
    assert_eq!(result.votes.bollinger, SignalVote::Neutral);
    assert_eq!(result.direction, Direction::Call);
    assert_eq!(result.strength, 3);
    assert_eq!(result.tier, Some(SignalTier::Strong));

    let rsi = result.indicators.rsi.unwrap();
    assert!(rsi > 50.0 && rsi < 70.0, "rsi {}", rsi);
    assert_eq!(result.close_price, strong_call_short().last().unwrap().close);
}

#[test]
fn falling_market_yields_strong_put() {
    let result = SignalEngine::evaluate("GBPUSD=X", &strong_put_short(), &downtrend_long()).unwrap();
    assert_eq!(result.direction, Direction::Put);
    assert_eq!(result.strength, 3);
}

#[test]
fn strong_votes_against_trend_abstain() {
    let result = SignalEngine::evaluate("EURUSD=X", &strong_call_short(), &downtrend_long()).unwrap();
    assert_eq!(result.votes.call_votes(), 3);
    assert_eq!(result.direction, Direction::Abstain);
    assert_eq!(result.strength, 0);
}

#[test]
fn two_votes_without_long_history_are_weak() {
    // No long-term candles: trend neutral, the two-vote majority still fires.
    let result = SignalEngine::evaluate("BTC-USD", &medium_call_short(), &[]).unwrap();
    assert_eq!(result.votes.trend, SignalVote::Neutral);
    assert_eq!(result.votes.rsi, SignalVote::Neutral);
    assert_eq!(result.direction, Direction::Call);
    assert_eq!(result.strength, 2);
    assert_eq!(result.tier, Some(SignalTier::Weak));
}

#[test]
fn too_few_candles_is_insufficient_data() {
    let short = candles_from_closes(&linear_closes(MIN_CANDLES - 1, 100.0, 0.1), 5);
    match SignalEngine::evaluate("EURUSD=X", &short, &uptrend_long()) {
        Err(AnalysisError::InsufficientData {
            required,
            available,
        }) => {
            assert_eq!(required, MIN_CANDLES);
            assert_eq!(available, MIN_CANDLES - 1);
        }
        other => panic!("expected InsufficientData, got {:?}", other),
    }
}

#[test]
fn snapshot_fields_are_defined_after_warm_up() {
    let snapshot = SignalEngine::snapshot(&linear_closes(60, 1.0, 0.001)).unwrap();
    assert!(snapshot.ema9.is_some());
    assert!(snapshot.ema21.is_some());
    assert!(snapshot.rsi.is_some());
    assert!(snapshot.bb_middle.is_some());
    assert!(snapshot.macd_histogram.is_some());

    let early = SignalEngine::snapshot(&linear_closes(15, 1.0, 0.001)).unwrap();
    assert!(early.ema9.is_some());
    assert!(early.ema21.is_none());
    assert!(early.macd_histogram.is_none());
}
