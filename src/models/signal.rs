use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::indicators::IndicatorSnapshot;

/// A single indicator's (or the trend filter's) opinion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalVote {
    Call,
    Put,
    #[default]
    Neutral,
}

impl SignalVote {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalVote::Call => "CALL",
            SignalVote::Put => "PUT",
            SignalVote::Neutral => "NEUTRAL",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "CALL" => SignalVote::Call,
            "PUT" => SignalVote::Put,
            _ => SignalVote::Neutral,
        }
    }
}

impl fmt::Display for SignalVote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final direction of an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Call,
    Put,
    #[default]
    Abstain,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Call => "CALL",
            Direction::Put => "PUT",
            Direction::Abstain => "ABSTAIN",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "CALL" => Direction::Call,
            "PUT" => Direction::Put,
            _ => Direction::Abstain,
        }
    }

    pub fn is_directional(&self) -> bool {
        !matches!(self, Direction::Abstain)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which classification rule produced a directional result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalTier {
    /// Three or more votes, confirmed by the trend filter.
    Strong,
    /// Two-vote majority, confirmed by the trend filter.
    Medium,
    /// Two-vote majority without trend confirmation.
    Weak,
}

/// Per-indicator votes plus the trend filter's bias.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteBreakdown {
    pub ema: SignalVote,
    pub rsi: SignalVote,
    pub bollinger: SignalVote,
    pub macd: SignalVote,
    pub trend: SignalVote,
}

impl VoteBreakdown {
    fn indicator_votes(&self) -> [SignalVote; 4] {
        [self.ema, self.rsi, self.bollinger, self.macd]
    }

    pub fn call_votes(&self) -> u8 {
        self.indicator_votes()
            .iter()
            .filter(|v| **v == SignalVote::Call)
            .count() as u8
    }

    pub fn put_votes(&self) -> u8 {
        self.indicator_votes()
            .iter()
            .filter(|v| **v == SignalVote::Put)
            .count() as u8
    }
}

/// Outcome of one analysis of one instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub symbol: String,
    pub direction: Direction,
    pub strength: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<SignalTier>,
    pub votes: VoteBreakdown,
    pub indicators: IndicatorSnapshot,
    pub close_price: f64,
    pub timestamp: DateTime<Utc>,
}

impl AnalysisResult {
    pub fn is_directional(&self) -> bool {
        self.direction.is_directional()
    }
}

/// Last directional signal emitted for an instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmittedSignalState {
    pub symbol: String,
    pub direction: Direction,
    pub strength: u8,
    pub votes: VoteBreakdown,
    pub emitted_at: DateTime<Utc>,
}

impl EmittedSignalState {
    pub fn from_result(result: &AnalysisResult) -> Self {
        Self {
            symbol: result.symbol.clone(),
            direction: result.direction,
            strength: result.strength,
            votes: result.votes,
            emitted_at: result.timestamp,
        }
    }

    /// Whether `result` describes the same signal state as this one.
    pub fn matches(&self, result: &AnalysisResult) -> bool {
        self.direction == result.direction && self.strength == result.strength
    }
}

/// Signal row as kept by the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSignal {
    pub id: i64,
    pub instrument_id: i64,
    pub symbol: String,
    pub direction: Direction,
    pub strength: u8,
    pub interval: String,
    pub votes: VoteBreakdown,
    pub close_price: f64,
    pub indicators: IndicatorSnapshot,
    pub created_at: DateTime<Utc>,
}
