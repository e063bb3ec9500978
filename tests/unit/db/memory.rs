//! Unit tests for the in-memory signal repository

use chrono::{Duration, Utc};
use confluence::db::{seed_default_instruments, MemoryStore, SignalRepository, StoreError};
use confluence::models::indicators::IndicatorSnapshot;
use confluence::models::instrument::{Instrument, InstrumentCategory, DEFAULT_INSTRUMENTS};
use confluence::models::signal::{AnalysisResult, Direction, VoteBreakdown};

fn result(symbol: &str, strength: u8, minutes_ago: i64) -> AnalysisResult {
    AnalysisResult {
        symbol: symbol.to_string(),
        direction: Direction::Call,
        strength,
        tier: None,
        votes: VoteBreakdown::default(),
        indicators: IndicatorSnapshot::default(),
        close_price: 1.1,
        timestamp: Utc::now() - Duration::minutes(minutes_ago),
    }
}

#[tokio::test]
async fn seeding_is_idempotent() {
    let store = MemoryStore::new();
    assert_eq!(seed_default_instruments(&store).await.unwrap(), DEFAULT_INSTRUMENTS.len());
    assert_eq!(seed_default_instruments(&store).await.unwrap(), DEFAULT_INSTRUMENTS.len());
    assert_eq!(store.get_all_instruments().await.unwrap().len(), DEFAULT_INSTRUMENTS.len());
}

#[tokio::test]
async fn get_or_create_keeps_existing_row() {
    let store = MemoryStore::new();
    let created = store
        .get_or_create_instrument(&Instrument::new("AAPL", "Apple", InstrumentCategory::Equity))
        .await
        .unwrap();
    store.set_instrument_active(created.id.unwrap(), false).await.unwrap();

    let again = store
        .get_or_create_instrument(&Instrument::new("AAPL", "Apple Inc.", InstrumentCategory::Equity))
        .await
        .unwrap();
    assert_eq!(again.id, created.id);
    assert_eq!(again.display_name, "Apple");
    assert!(!again.active);
    assert!(store.get_active_instruments().await.unwrap().is_empty());
}

#[tokio::test]
async fn create_rejects_duplicates_and_unknown_ids() {
    let store = MemoryStore::new();
    let instrument = Instrument::new("ETH-USD", "Ethereum", InstrumentCategory::Crypto);
    store.create_instrument(&instrument).await.unwrap();

    assert!(matches!(
        store.create_instrument(&instrument).await,
        Err(StoreError::DuplicateInstrument(_))
    ));
    assert!(matches!(
        store.set_instrument_active(99, true).await,
        Err(StoreError::InstrumentNotFound(99))
    ));
    assert!(matches!(
        store.save_signal(99, &result("ETH-USD", 3, 0)).await,
        Err(StoreError::InstrumentNotFound(99))
    ));
}

#[tokio::test]
async fn signal_queries_are_newest_first() {
    let store = MemoryStore::new();
    let eur = store
        .create_instrument(&Instrument::new("EURUSD=X", "EUR/USD", InstrumentCategory::Forex))
        .await
        .unwrap()
        .id
        .unwrap();
    let btc = store
        .create_instrument(&Instrument::new("BTC-USD", "Bitcoin", InstrumentCategory::Crypto))
        .await
        .unwrap()
        .id
        .unwrap();

    store.save_signal(eur, &result("EURUSD=X", 2, 30)).await.unwrap();
    store.save_signal(btc, &result("BTC-USD", 4, 20)).await.unwrap();
    let latest = store.save_signal(eur, &result("EURUSD=X", 3, 10)).await.unwrap();
    assert_eq!(latest.interval, "5m");

    let recent = store.recent_signals(10).await.unwrap();
    assert_eq!(recent.len(), 3);
    assert_eq!(recent[0].id, latest.id);

    let eur_signals = store.signals_by_symbol("EURUSD=X", 10).await.unwrap();
    assert_eq!(eur_signals.len(), 2);
    assert!(eur_signals.iter().all(|s| s.instrument_id == eur));

    let strong = store.strong_signals(3, 10).await.unwrap();
    let strengths: Vec<u8> = strong.iter().map(|s| s.strength).collect();
    assert_eq!(strengths, vec![3, 4]);

    assert_eq!(store.recent_signals(1).await.unwrap().len(), 1);
}
