//! Confluence signal engine: technical indicators, confluence voting and a
//! scheduled analysis loop with change-based notification.

pub mod config;
pub mod core;
pub mod db;
pub mod indicators;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod signals;
