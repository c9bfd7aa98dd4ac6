//! Technical contradiction indicators
//!
//! Computes a 20-period simple moving average and a 14-period RSI (Wilder
//! seed) over a daily close series, then counts the ways the latest price
//! action contradicts an announcement's claimed sentiment. Short series
//! degrade to simplified statistics instead of failing.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{MA_WINDOW, NEUTRAL_RSI, RSI_PERIOD};

/// Claimed direction of an announcement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Negative,
}

/// One daily observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// An ordered daily close series
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series, sorting defensively so dates are non-decreasing
    pub fn new(mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|p| p.date);
        Self { points }
    }

    /// Build a series from bare closes with synthetic consecutive dates
    pub fn from_closes(closes: &[f64]) -> Self {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint {
                date: start + chrono::Duration::days(i as i64),
                close,
            })
            .collect();
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.points.last().map(|p| p.close)
    }
}

/// Technical reading for one series against one claimed sentiment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContradictionReading {
    /// 20-period SMA, or the plain mean for short series
    pub ma20: f64,
    /// 14-period RSI, or 50 for short series
    pub rsi: f64,
    /// Count of independent contradictions (0-2)
    pub contradiction_score: u8,
}

impl ContradictionReading {
    /// Neutral reading used when no price data is available
    pub fn neutral() -> Self {
        Self {
            ma20: 0.0,
            rsi: NEUTRAL_RSI,
            contradiction_score: 0,
        }
    }
}

/// Simple moving average over the last `window` closes; falls back to the
/// mean of all closes when fewer than `window` points exist
pub fn moving_average(closes: &[f64], window: usize) -> f64 {
    if closes.is_empty() {
        return 0.0;
    }
    let slice = if closes.len() >= window {
        &closes[closes.len() - window..]
    } else {
        closes
    };
    slice.iter().sum::<f64>() / slice.len() as f64
}

/// 14-period RSI via the Wilder seed window.
///
/// Needs at least `period` deltas (period + 1 points); otherwise returns the
/// neutral value 50. A window with no down-moves treats the relative
/// strength ratio as 0 rather than dividing by zero.
pub fn rsi(closes: &[f64], period: usize) -> f64 {
    if closes.len() < period + 1 {
        return NEUTRAL_RSI;
    }
    let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();

    let seed = &deltas[..period];
    let up: f64 = seed.iter().filter(|d| **d >= 0.0).sum::<f64>() / period as f64;
    let down: f64 = -seed.iter().filter(|d| **d < 0.0).sum::<f64>() / period as f64;

    let rs = if down != 0.0 { up / down } else { 0.0 };
    100.0 - 100.0 / (1.0 + rs)
}

/// Count the ways price action contradicts the claimed sentiment.
///
/// Increments are independent:
/// - latest close on the wrong side of the moving average for the claim
/// - RSI overbought (>70) against a positive claim, or oversold (<30)
///   against a negative one
pub fn contradiction(series: &PriceSeries, sentiment: Sentiment) -> ContradictionReading {
    let closes = series.closes();
    let last = match closes.last() {
        Some(&last) => last,
        None => return ContradictionReading::neutral(),
    };

    let ma20 = moving_average(&closes, MA_WINDOW);
    let rsi = rsi(&closes, RSI_PERIOD);

    let mut score = 0u8;
    match sentiment {
        Sentiment::Positive if last < ma20 => score += 1,
        Sentiment::Negative if last > ma20 => score += 1,
        _ => {}
    }
    if (rsi > 70.0 && sentiment == Sentiment::Positive)
        || (rsi < 30.0 && sentiment == Sentiment::Negative)
    {
        score += 1;
    }

    ContradictionReading {
        ma20,
        rsi,
        contradiction_score: score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_series_falls_back_to_mean() {
        let closes = [10.0, 12.0, 14.0];
        assert!((moving_average(&closes, 20) - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_ma_fallback_boundary() {
        // 19 points: plain mean; 20 points: windowed
        let nineteen: Vec<f64> = (1..=19).map(|i| i as f64).collect();
        assert!((moving_average(&nineteen, 20) - 10.0).abs() < 1e-9);

        let twenty_one: Vec<f64> = (1..=21).map(|i| i as f64).collect();
        // last 20 values are 2..=21, mean 11.5
        assert!((moving_average(&twenty_one, 20) - 11.5).abs() < 1e-9);
    }

    #[test]
    fn test_rsi_short_series_is_neutral() {
        let closes: Vec<f64> = (0..14).map(|i| 100.0 + i as f64).collect();
        assert_eq!(rsi(&closes, RSI_PERIOD), NEUTRAL_RSI);
        // 15 points carries exactly enough deltas
        let closes: Vec<f64> = (0..15).map(|i| 100.0 + i as f64).collect();
        assert_ne!(rsi(&closes, RSI_PERIOD), NEUTRAL_RSI);
    }

    #[test]
    fn test_rsi_no_down_moves_does_not_divide_by_zero() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        // relative strength treated as 0 in that branch
        assert_eq!(rsi(&closes, RSI_PERIOD), 0.0);
    }

    #[test]
    fn test_empty_series_neutral_reading() {
        let series = PriceSeries::default();
        let reading = contradiction(&series, Sentiment::Positive);
        assert_eq!(reading, ContradictionReading::neutral());
    }

    #[test]
    fn test_overbought_decline_contradicts_positive_claim() {
        // Strong early run-up (RSI seed window well above 70), then a slide
        // that drags the last close under the 20-period average.
        let mut closes = vec![100.0];
        let deltas = [
            2.0, 2.0, 2.0, 2.0, 2.0, 2.0, 2.0, -0.5, 2.0, 2.0, 2.0, 2.0, 2.0, 2.0,
        ];
        for d in deltas {
            closes.push(closes.last().unwrap() + d);
        }
        for _ in 0..10 {
            closes.push(closes.last().unwrap() - 3.0);
        }
        assert_eq!(closes.len(), 25);

        let series = PriceSeries::from_closes(&closes);
        let reading = contradiction(&series, Sentiment::Positive);

        assert!(reading.rsi > 70.0);
        assert!(series.last_close().unwrap() < reading.ma20);
        assert_eq!(reading.contradiction_score, 2);
    }

    #[test]
    fn test_aligned_claim_scores_zero() {
        // Steady climb with a positive claim: nothing contradicts
        let closes: Vec<f64> = (0..25).map(|i| 100.0 + i as f64 * 2.0).collect();
        let series = PriceSeries::from_closes(&closes);
        let reading = contradiction(&series, Sentiment::Positive);
        assert_eq!(reading.contradiction_score, 0);
    }

    #[test]
    fn test_series_sorts_by_date() {
        let d = |day| NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
        let series = PriceSeries::new(vec![
            PricePoint { date: d(3), close: 3.0 },
            PricePoint { date: d(1), close: 1.0 },
            PricePoint { date: d(2), close: 2.0 },
        ]);
        assert_eq!(series.closes(), vec![1.0, 2.0, 3.0]);
    }
}
