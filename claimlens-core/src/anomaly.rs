//! Numeric anomaly detection over filing history
//!
//! Flags a new filing figure that deviates sharply from the historical mean
//! for the same entity. Applied per field (revenue, profit, eps)
//! independently; the scorer decides what any flagged field implies.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::DEFAULT_ANOMALY_THRESHOLD;

/// Deviation reading for one numeric series ending in the newest value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyReading {
    /// Newest observation, None when the series is empty
    pub latest: Option<f64>,
    /// Mean of everything before the newest observation
    pub mean: Option<f64>,
    /// Relative deviation (latest - mean) / mean; 0 when the mean is 0
    pub deviation: Option<f64>,
    pub anomaly: bool,
}

impl AnomalyReading {
    fn quiet(latest: Option<f64>) -> Self {
        Self {
            latest,
            mean: None,
            deviation: None,
            anomaly: false,
        }
    }
}

/// Numeric figures reported by one filing. Absent fields are skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialFigures {
    pub revenue: Option<f64>,
    pub profit: Option<f64>,
    pub eps: Option<f64>,
}

impl FinancialFigures {
    fn field(&self, name: &str) -> Option<f64> {
        match name {
            "revenue" => self.revenue,
            "profit" => self.profit,
            "eps" => self.eps,
            _ => None,
        }
    }
}

/// Fields compared between a new filing and its history
pub const FILING_FIELDS: &[&str] = &["revenue", "profit", "eps"];

/// Per-field anomaly readings for one filing comparison
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilingAnomalies {
    pub fields: BTreeMap<String, AnomalyReading>,
}

impl FilingAnomalies {
    /// True when any field deviates beyond its threshold
    pub fn any(&self) -> bool {
        self.fields.values().any(|r| r.anomaly)
    }

    /// Names of the flagged fields
    pub fn flagged(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(_, r)| r.anomaly)
            .map(|(k, _)| k.as_str())
            .collect()
    }
}

/// Detect whether the newest value of a series is an outlier versus the
/// mean of its history.
///
/// Fewer than 2 finite observations means no deviation is computable: the
/// reading reports the latest value (None for an empty series) and
/// `anomaly = false`, never an error.
pub fn detect(series: &[f64], threshold: f64) -> AnomalyReading {
    let clean: Vec<f64> = series.iter().copied().filter(|v| v.is_finite()).collect();
    if clean.len() < 2 {
        return AnomalyReading::quiet(clean.last().copied());
    }

    let latest = clean[clean.len() - 1];
    let history = &clean[..clean.len() - 1];
    let mean = history.iter().sum::<f64>() / history.len() as f64;
    let deviation = if mean != 0.0 { (latest - mean) / mean } else { 0.0 };

    AnomalyReading {
        latest: Some(latest),
        mean: Some(mean),
        deviation: Some(deviation),
        anomaly: deviation.abs() > threshold,
    }
}

/// Compare a new filing against historical filings, field by field
pub fn compare_filing(
    new_filing: &FinancialFigures,
    history: &[FinancialFigures],
    threshold: f64,
) -> FilingAnomalies {
    let mut out = FilingAnomalies::default();
    for &field in FILING_FIELDS {
        let Some(latest) = new_filing.field(field) else {
            continue;
        };
        let mut series: Vec<f64> = history.iter().filter_map(|h| h.field(field)).collect();
        series.push(latest);
        out.fields.insert(field.to_string(), detect(&series, threshold));
    }
    out
}

/// Convenience wrapper using the default 20% threshold
pub fn compare_filing_default(
    new_filing: &FinancialFigures,
    history: &[FinancialFigures],
) -> FilingAnomalies {
    compare_filing(new_filing, history, DEFAULT_ANOMALY_THRESHOLD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_series_never_flags() {
        for series in [&[][..], &[42.0][..]] {
            let reading = detect(series, DEFAULT_ANOMALY_THRESHOLD);
            assert!(!reading.anomaly);
            assert!(reading.deviation.is_none());
        }
        assert_eq!(detect(&[42.0], 0.2).latest, Some(42.0));
        assert_eq!(detect(&[], 0.2).latest, None);
    }

    #[test]
    fn test_outlier_flagged() {
        let reading = detect(&[100.0, 104.0, 150.0], 0.2);
        assert!(reading.anomaly);
        // mean of history = 102, deviation ≈ 0.47
        assert!((reading.mean.unwrap() - 102.0).abs() < 1e-9);
        assert!(reading.deviation.unwrap() > 0.4);
    }

    #[test]
    fn test_within_threshold_not_flagged() {
        let reading = detect(&[100.0, 104.0, 110.0], 0.2);
        assert!(!reading.anomaly);
    }

    #[test]
    fn test_zero_mean_deviation_is_zero() {
        let reading = detect(&[0.0, 0.0, 5.0], 0.2);
        assert_eq!(reading.deviation, Some(0.0));
        assert!(!reading.anomaly);
    }

    #[test]
    fn test_nan_values_dropped() {
        let reading = detect(&[100.0, f64::NAN, 104.0, 150.0], 0.2);
        assert!(reading.anomaly);
    }

    #[test]
    fn test_compare_filing_per_field() {
        let history = vec![
            FinancialFigures { revenue: Some(100.0), profit: Some(18.0), eps: None },
            FinancialFigures { revenue: Some(104.0), profit: Some(20.0), eps: None },
        ];
        let new = FinancialFigures { revenue: Some(150.0), profit: Some(9.0), eps: None };

        let result = compare_filing_default(&new, &history);
        assert!(result.any());
        assert!(result.fields["revenue"].anomaly);
        assert!(result.fields["profit"].anomaly);
        // eps absent in the new filing: no reading at all
        assert!(!result.fields.contains_key("eps"));
    }

    #[test]
    fn test_negative_swing_flagged() {
        let history = vec![FinancialFigures { profit: Some(20.0), ..Default::default() }];
        let new = FinancialFigures { profit: Some(9.0), ..Default::default() };
        let result = compare_filing_default(&new, &history);
        assert_eq!(result.flagged(), vec!["profit"]);
    }
}
