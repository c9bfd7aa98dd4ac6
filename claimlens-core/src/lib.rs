//! ClaimLens Core - domain model for announcement credibility scoring
//!
//! This crate provides the foundational primitives:
//! - Signals: independently computed units of evidence
//! - Identifier grammars (LEI, ISIN, CIN, advisor registrations)
//! - Technical contradiction indicators (SMA/RSI)
//! - Lexical hype and statistical legitimacy classifiers
//! - Numeric anomaly detection over filing history
//! - The weighted credibility scorer and evidence case model

pub mod anomaly;
pub mod evidence;
pub mod hype;
pub mod identifiers;
pub mod registry;
pub mod score;
pub mod signals;
pub mod technicals;
pub mod textclass;

pub use anomaly::*;
pub use evidence::*;
pub use hype::*;
pub use identifiers::*;
pub use registry::*;
pub use score::*;
pub use signals::*;
pub use technicals::*;
pub use textclass::*;

/// Moving-average window for trend checks
pub const MA_WINDOW: usize = 20;

/// RSI lookback period (Wilder)
pub const RSI_PERIOD: usize = 14;

/// Neutral RSI substituted for short series
pub const NEUTRAL_RSI: f64 = 50.0;

/// Default relative-deviation threshold for numeric anomalies
pub const DEFAULT_ANOMALY_THRESHOLD: f64 = 0.2;

/// Default probability threshold for the legitimacy classifier
pub const DEFAULT_LEGIT_THRESHOLD: f64 = 0.5;

/// Minimum extracted-text length counted as a usable document
pub const MIN_USEFUL_TEXT_LEN: usize = 40;

/// Credibility score bounds
pub const MIN_SCORE: i32 = 0;
pub const MAX_SCORE: i32 = 100;
