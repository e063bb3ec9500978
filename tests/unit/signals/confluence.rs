//! Unit tests for confluence classification

use confluence::models::indicators::IndicatorSnapshot;
use confluence::models::signal::{Direction, SignalTier, SignalVote, VoteBreakdown};
use confluence::signals::confluence::{cast_votes, classify};

use SignalVote::{Call, Neutral, Put};

fn votes(ema: SignalVote, rsi: SignalVote, bollinger: SignalVote, macd: SignalVote, trend: SignalVote) -> VoteBreakdown {
    VoteBreakdown {
        ema,
        rsi,
        bollinger,
        macd,
        trend,
    }
}

#[test]
fn three_calls_one_put_with_trend_is_strong() {
    let result = classify(&votes(Call, Call, Put, Call, Call));
    assert_eq!(result.direction, Direction::Call);
    assert_eq!(result.strength, 3);
    assert_eq!(result.tier, Some(SignalTier::Strong));
}

#[test]
fn four_puts_with_trend_is_strength_four() {
    let result = classify(&votes(Put, Put, Put, Put, Put));
    assert_eq!(result.direction, Direction::Put);
    assert_eq!(result.strength, 4);
}

#[test]
fn tie_always_abstains() {
    for trend in [Call, Put, Neutral] {
        let result = classify(&votes(Call, Put, Call, Put, trend));
        assert_eq!(result.direction, Direction::Abstain, "trend {:?}", trend);
        assert_eq!(result.strength, 0);
        assert_eq!(result.tier, None);
    }
}

#[test]
fn two_votes_with_trend_is_medium() {
    let result = classify(&votes(Call, Neutral, Neutral, Call, Call));
    assert_eq!(result.direction, Direction::Call);
    assert_eq!(result.strength, 2);
    assert_eq!(result.tier, Some(SignalTier::Medium));
}

#[test]
fn two_votes_against_opposing_trend_is_weak() {
    let result = classify(&votes(Call, Neutral, Neutral, Call, Put));
    assert_eq!(result.direction, Direction::Call);
    assert_eq!(result.strength, 2);
    assert_eq!(result.tier, Some(SignalTier::Weak));
}

#[test]
fn three_votes_without_trend_abstain() {
    let result = classify(&votes(Put, Put, Put, Neutral, Neutral));
    assert_eq!(result.direction, Direction::Abstain);

    let result = classify(&votes(Put, Put, Put, Call, Call));
    assert_eq!(result.direction, Direction::Abstain);
}

#[test]
fn single_vote_abstains() {
    let result = classify(&votes(Call, Neutral, Neutral, Neutral, Call));
    assert_eq!(result.direction, Direction::Abstain);
}

#[test]
fn cast_votes_reads_snapshot() {
    let snapshot = IndicatorSnapshot {
        ema9: Some(1.10),
        ema21: Some(1.05),
        rsi: Some(35.0),
        bb_upper: Some(1.20),
        bb_middle: Some(1.10),
        bb_lower: Some(1.00),
        macd_histogram: Some(-0.002),
    };
    let breakdown = cast_votes(&snapshot, 1.20, Neutral);
    assert_eq!(breakdown, votes(Call, Put, Put, Put, Neutral));
    assert_eq!(breakdown.call_votes(), 1);
    assert_eq!(breakdown.put_votes(), 3);
}
