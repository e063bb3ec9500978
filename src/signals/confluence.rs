//! Confluence voting and strength-tier classification.
//!
//! Each of the four indicators casts one vote from its last defined value.
//! Votes are then classified in strict priority order:
//!
//! 1. strong: three or more votes, majority, trend agrees
//! 2. medium: exactly two votes, majority, trend agrees
//! 3. weak: exactly two votes, majority, trend ignored
//! 4. otherwise abstain
//!
//! The weak tier fires even when the trend filter points the other way.

use crate::models::indicators::IndicatorSnapshot;
use crate::models::signal::{Direction, SignalTier, SignalVote, VoteBreakdown};

pub const RSI_NEUTRAL: f64 = 50.0;
pub const RSI_OVERBOUGHT: f64 = 70.0;
pub const RSI_OVERSOLD: f64 = 30.0;

/// Direction, strength and tier produced by [`classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub direction: Direction,
    pub strength: u8,
    pub tier: Option<SignalTier>,
}

impl Classification {
    fn abstain() -> Self {
        Self {
            direction: Direction::Abstain,
            strength: 0,
            tier: None,
        }
    }
}

/// Collect the four indicator votes and attach the trend bias.
pub fn cast_votes(snapshot: &IndicatorSnapshot, close: f64, trend: SignalVote) -> VoteBreakdown {
    VoteBreakdown {
        ema: analyze_ema(snapshot.ema9, snapshot.ema21),
        rsi: analyze_rsi(snapshot.rsi),
        bollinger: analyze_bollinger(close, snapshot.bb_upper, snapshot.bb_lower),
        macd: analyze_macd(snapshot.macd_histogram),
        trend,
    }
}

/// Turn votes into a final direction and strength.
pub fn classify(votes: &VoteBreakdown) -> Classification {
    let calls = votes.call_votes();
    let puts = votes.put_votes();

    let tiers = [
        (SignalTier::Strong, calls >= 3, puts >= 3, true),
        (SignalTier::Medium, calls == 2, puts == 2, true),
        (SignalTier::Weak, calls == 2, puts == 2, false),
    ];

    for (tier, call_count_ok, put_count_ok, needs_trend) in tiers {
        if call_count_ok && calls > puts && (!needs_trend || votes.trend == SignalVote::Call) {
            return Classification {
                direction: Direction::Call,
                strength: calls,
                tier: Some(tier),
            };
        }
        if put_count_ok && puts > calls && (!needs_trend || votes.trend == SignalVote::Put) {
            return Classification {
                direction: Direction::Put,
                strength: puts,
                tier: Some(tier),
            };
        }
    }

    Classification::abstain()
}

fn analyze_ema(fast: Option<f64>, slow: Option<f64>) -> SignalVote {
    match (fast, slow) {
        (Some(fast), Some(slow)) if fast > slow => SignalVote::Call,
        (Some(fast), Some(slow)) if fast < slow => SignalVote::Put,
        _ => SignalVote::Neutral,
    }
}

fn analyze_rsi(rsi: Option<f64>) -> SignalVote {
    match rsi {
        Some(rsi) if rsi > RSI_NEUTRAL && rsi < RSI_OVERBOUGHT => SignalVote::Call,
        Some(rsi) if rsi > RSI_OVERSOLD && rsi < RSI_NEUTRAL => SignalVote::Put,
        _ => SignalVote::Neutral,
    }
}

// Band touches are read as reversals: oversold favours CALL, overbought PUT.
fn analyze_bollinger(close: f64, upper: Option<f64>, lower: Option<f64>) -> SignalVote {
    if matches!(lower, Some(lower) if close <= lower) {
        SignalVote::Call
    } else if matches!(upper, Some(upper) if close >= upper) {
        SignalVote::Put
    } else {
        SignalVote::Neutral
    }
}

fn analyze_macd(histogram: Option<f64>) -> SignalVote {
    match histogram {
        Some(h) if h > 0.0 => SignalVote::Call,
        Some(h) if h < 0.0 => SignalVote::Put,
        _ => SignalVote::Neutral,
    }
}
