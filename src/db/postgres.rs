//! PostgreSQL store for instruments and signals

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio_postgres::error::SqlState;
use tokio_postgres::{Client, NoTls, Row};

use super::{SignalRepository, StoreError, SIGNAL_INTERVAL};
use crate::models::indicators::IndicatorSnapshot;
use crate::models::instrument::{Instrument, InstrumentCategory};
use crate::models::signal::{AnalysisResult, Direction, SignalVote, StoredSignal, VoteBreakdown};

const INSTRUMENT_COLUMNS: &str = "id, symbol, display_name, category, active";

const SIGNAL_SELECT: &str = "SELECT s.id, s.instrument_id, i.symbol, s.direction, s.strength, s.interval,
        s.ema_vote, s.rsi_vote, s.bollinger_vote, s.macd_vote, s.trend_vote,
        s.close_price, s.indicators, s.created_at
     FROM signals s
     JOIN instruments i ON i.id = s.instrument_id";

pub struct PostgresStore {
    client: Client,
}

impl PostgresStore {
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let (client, connection) = tokio_postgres::connect(database_url, NoTls).await?;

        // Spawn connection task
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(error = %e, "PostgreSQL connection error");
            }
        });

        let store = Self { client };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        self.client
            .batch_execute(
                "CREATE TABLE IF NOT EXISTS instruments (
                    id BIGSERIAL PRIMARY KEY,
                    symbol TEXT NOT NULL UNIQUE,
                    display_name TEXT NOT NULL,
                    category TEXT NOT NULL,
                    active BOOLEAN NOT NULL DEFAULT TRUE,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );
                CREATE TABLE IF NOT EXISTS signals (
                    id BIGSERIAL PRIMARY KEY,
                    instrument_id BIGINT NOT NULL REFERENCES instruments(id),
                    direction TEXT NOT NULL,
                    strength SMALLINT NOT NULL,
                    interval TEXT NOT NULL,
                    ema_vote TEXT NOT NULL,
                    rsi_vote TEXT NOT NULL,
                    bollinger_vote TEXT NOT NULL,
                    macd_vote TEXT NOT NULL,
                    trend_vote TEXT NOT NULL,
                    close_price DOUBLE PRECISION NOT NULL,
                    indicators TEXT NOT NULL,
                    created_at TIMESTAMPTZ NOT NULL
                );
                CREATE INDEX IF NOT EXISTS signals_created_at_idx ON signals (created_at DESC);
                CREATE INDEX IF NOT EXISTS signals_instrument_idx ON signals (instrument_id, created_at DESC);",
            )
            .await?;
        Ok(())
    }

    async fn query_signals(
        &self,
        filter: &str,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> Result<Vec<StoredSignal>, StoreError> {
        let query = format!(
            "{} {} ORDER BY s.created_at DESC, s.id DESC LIMIT ${}",
            SIGNAL_SELECT,
            filter,
            params.len()
        );
        let rows = self.client.query(&query, params).await?;
        rows.iter().map(signal_from_row).collect()
    }
}

fn instrument_from_row(row: &Row) -> Result<Instrument, StoreError> {
    let category: String = row.try_get(3)?;
    Ok(Instrument {
        id: Some(row.try_get(0)?),
        symbol: row.try_get(1)?,
        display_name: row.try_get(2)?,
        category: InstrumentCategory::parse(&category)
            .ok_or_else(|| StoreError::InvalidRow(format!("unknown category {}", category)))?,
        active: row.try_get(4)?,
    })
}

fn signal_from_row(row: &Row) -> Result<StoredSignal, StoreError> {
    let direction: String = row.try_get(3)?;
    let strength: i16 = row.try_get(4)?;
    let vote = |idx: usize| -> Result<SignalVote, StoreError> {
        let value: String = row.try_get(idx)?;
        Ok(SignalVote::parse(&value))
    };
    let indicators: String = row.try_get(12)?;
    let created_at: DateTime<Utc> = row.try_get(13)?;

    Ok(StoredSignal {
        id: row.try_get(0)?,
        instrument_id: row.try_get(1)?,
        symbol: row.try_get(2)?,
        direction: Direction::parse(&direction),
        strength: u8::try_from(strength)
            .map_err(|_| StoreError::InvalidRow(format!("strength {} out of range", strength)))?,
        interval: row.try_get(5)?,
        votes: VoteBreakdown {
            ema: vote(6)?,
            rsi: vote(7)?,
            bollinger: vote(8)?,
            macd: vote(9)?,
            trend: vote(10)?,
        },
        close_price: row.try_get(11)?,
        indicators: serde_json::from_str::<IndicatorSnapshot>(&indicators)?,
        created_at,
    })
}

#[async_trait]
impl SignalRepository for PostgresStore {
    async fn get_all_instruments(&self) -> Result<Vec<Instrument>, StoreError> {
        let rows = self
            .client
            .query(
                &format!("SELECT {} FROM instruments ORDER BY id", INSTRUMENT_COLUMNS),
                &[],
            )
            .await?;
        rows.iter().map(instrument_from_row).collect()
    }

    async fn get_active_instruments(&self) -> Result<Vec<Instrument>, StoreError> {
        let rows = self
            .client
            .query(
                &format!(
                    "SELECT {} FROM instruments WHERE active ORDER BY id",
                    INSTRUMENT_COLUMNS
                ),
                &[],
            )
            .await?;
        rows.iter().map(instrument_from_row).collect()
    }

    async fn get_or_create_instrument(
        &self,
        instrument: &Instrument,
    ) -> Result<Instrument, StoreError> {
        self.client
            .execute(
                "INSERT INTO instruments (symbol, display_name, category, active)
                 VALUES ($1, $2, $3, $4)
                 ON CONFLICT (symbol) DO NOTHING",
                &[
                    &instrument.symbol,
                    &instrument.display_name,
                    &instrument.category.as_str(),
                    &instrument.active,
                ],
            )
            .await?;

        let row = self
            .client
            .query_one(
                &format!("SELECT {} FROM instruments WHERE symbol = $1", INSTRUMENT_COLUMNS),
                &[&instrument.symbol],
            )
            .await?;
        instrument_from_row(&row)
    }

    async fn create_instrument(&self, instrument: &Instrument) -> Result<Instrument, StoreError> {
        let result = self
            .client
            .query_one(
                &format!(
                    "INSERT INTO instruments (symbol, display_name, category, active)
                     VALUES ($1, $2, $3, $4)
                     RETURNING {}",
                    INSTRUMENT_COLUMNS
                ),
                &[
                    &instrument.symbol,
                    &instrument.display_name,
                    &instrument.category.as_str(),
                    &instrument.active,
                ],
            )
            .await;

        match result {
            Ok(row) => instrument_from_row(&row),
            Err(e) if e.code() == Some(&SqlState::UNIQUE_VIOLATION) => {
                Err(StoreError::DuplicateInstrument(instrument.symbol.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn set_instrument_active(
        &self,
        id: i64,
        active: bool,
    ) -> Result<Instrument, StoreError> {
        let row = self
            .client
            .query_opt(
                &format!(
                    "UPDATE instruments SET active = $2 WHERE id = $1 RETURNING {}",
                    INSTRUMENT_COLUMNS
                ),
                &[&id, &active],
            )
            .await?
            .ok_or(StoreError::InstrumentNotFound(id))?;
        instrument_from_row(&row)
    }

    async fn save_signal(
        &self,
        instrument_id: i64,
        result: &AnalysisResult,
    ) -> Result<StoredSignal, StoreError> {
        let indicators = serde_json::to_string(&result.indicators)?;
        let strength = i16::from(result.strength);

        let row = self
            .client
            .query_one(
                "INSERT INTO signals (instrument_id, direction, strength, interval,
                    ema_vote, rsi_vote, bollinger_vote, macd_vote, trend_vote,
                    close_price, indicators, created_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                 RETURNING id",
                &[
                    &instrument_id,
                    &result.direction.as_str(),
                    &strength,
                    &SIGNAL_INTERVAL,
                    &result.votes.ema.as_str(),
                    &result.votes.rsi.as_str(),
                    &result.votes.bollinger.as_str(),
                    &result.votes.macd.as_str(),
                    &result.votes.trend.as_str(),
                    &result.close_price,
                    &indicators,
                    &result.timestamp,
                ],
            )
            .await
            .map_err(|e| {
                if e.code() == Some(&SqlState::FOREIGN_KEY_VIOLATION) {
                    StoreError::InstrumentNotFound(instrument_id)
                } else {
                    StoreError::Database(e)
                }
            })?;

        Ok(StoredSignal {
            id: row.try_get(0)?,
            instrument_id,
            symbol: result.symbol.clone(),
            direction: result.direction,
            strength: result.strength,
            interval: SIGNAL_INTERVAL.to_string(),
            votes: result.votes,
            close_price: result.close_price,
            indicators: result.indicators.clone(),
            created_at: result.timestamp,
        })
    }

    async fn recent_signals(&self, limit: usize) -> Result<Vec<StoredSignal>, StoreError> {
        let limit = sql_limit(limit);
        self.query_signals("", &[&limit]).await
    }

    async fn signals_by_symbol(
        &self,
        symbol: &str,
        limit: usize,
    ) -> Result<Vec<StoredSignal>, StoreError> {
        let limit = sql_limit(limit);
        self.query_signals("WHERE i.symbol = $1", &[&symbol, &limit])
            .await
    }

    async fn strong_signals(
        &self,
        min_strength: u8,
        limit: usize,
    ) -> Result<Vec<StoredSignal>, StoreError> {
        let min_strength = i16::from(min_strength);
        let limit = sql_limit(limit);
        self.query_signals("WHERE s.strength >= $1", &[&min_strength, &limit])
            .await
    }
}

/// `LIMIT` parameter for a requested row count, saturating at `i64::MAX`.
fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}
