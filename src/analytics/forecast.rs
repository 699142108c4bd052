//! Term-over-term enrollment forecast.
//!
//! The forecast is a naive linear extrapolation: an ordinary least-squares
//! line through the historical rates, indexed by term position. It carries
//! no confidence interval and is not a validated statistical model.

use super::{AnalyticsError, EnrollmentRate, GroupSummary};
use crate::sections::compare_terms;
use serde::Serialize;

pub const NAIVE_FORECAST_DISCLAIMER: &str =
    "Naive linear extrapolation of past enrollment rates. Not a validated statistical model.";

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TermPoint {
    pub term: String,
    pub rate: EnrollmentRate,
    pub section_count: usize,
}

/// Term groups as a series, oldest term first.
pub fn term_series(term_groups: &[GroupSummary]) -> Vec<TermPoint> {
    let mut points: Vec<TermPoint> = term_groups
        .iter()
        .map(|g| TermPoint {
            term: g.key.clone(),
            rate: g.enrollment_rate,
            section_count: g.section_count,
        })
        .collect();
    points.sort_by(|a, b| compare_terms(&a.term, &b.term));
    points
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    pub fn at(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Least-squares line through `values` at x = 0, 1, 2, ...
///
/// A constant series gives a flat line at that value.
pub fn fit_linear(values: &[f64]) -> Result<LinearFit, AnalyticsError> {
    if values.len() < 2 {
        return Err(AnalyticsError::InsufficientData {
            required: 2,
            available: values.len(),
        });
    }

    let first = values[0];
    if values.iter().all(|v| (v - first).abs() <= f64::EPSILON) {
        return Ok(LinearFit {
            slope: 0.0,
            intercept: first,
        });
    }

    let n = values.len() as f64;
    let mean_x = (n - 1.0) / 2.0;
    let mean_y = values.iter().sum::<f64>() / n;

    let (mut sxy, mut sxx) = (0.0, 0.0);
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - mean_x;
        sxy += dx * (y - mean_y);
        sxx += dx * dx;
    }

    let slope = sxy / sxx;
    Ok(LinearFit {
        slope,
        intercept: mean_y - slope * mean_x,
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastMethod {
    NaiveLinear,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProjectedPoint {
    /// Terms past the last historical one, starting at 1.
    pub offset: usize,
    /// Not clamped, may fall outside 0..=1.
    pub rate: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Forecast {
    pub method: ForecastMethod,
    pub slope: f64,
    pub intercept: f64,
    pub history: Vec<TermPoint>,
    pub projections: Vec<ProjectedPoint>,
    pub disclaimer: &'static str,
}

/// Projects the enrollment rate `periods` terms past the history.
///
/// Terms with an undefined rate are left out of the fit. This is a naive
/// linear extrapolation, see the module docs.
pub fn forecast(series: &[TermPoint], periods: usize) -> Result<Forecast, AnalyticsError> {
    let history: Vec<TermPoint> = series
        .iter()
        .filter(|p| p.rate.is_defined())
        .cloned()
        .collect();
    let values: Vec<f64> = history.iter().filter_map(|p| p.rate.value()).collect();

    let fit = fit_linear(&values)?;
    let last = values.len() - 1;
    let projections = (1..=periods)
        .map(|offset| ProjectedPoint {
            offset,
            rate: fit.at((last + offset) as f64),
        })
        .collect();

    Ok(Forecast {
        method: ForecastMethod::NaiveLinear,
        slope: fit.slope,
        intercept: fit.intercept,
        history,
        projections,
        disclaimer: NAIVE_FORECAST_DISCLAIMER,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::RiskCounts;

    fn point(term: &str, rate: Option<f64>) -> TermPoint {
        TermPoint {
            term: term.to_string(),
            rate: rate.map_or(EnrollmentRate::Undefined, EnrollmentRate::Defined),
            section_count: 1,
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_linear_series_projects_forward() {
        let fit = fit_linear(&[10.0, 20.0, 30.0, 40.0]).unwrap();
        assert_close(fit.slope, 10.0);
        assert_close(fit.intercept, 10.0);

        let series = vec![
            point("2023FA", Some(10.0)),
            point("2024SP", Some(20.0)),
            point("2024FA", Some(30.0)),
            point("2025SP", Some(40.0)),
        ];
        let forecast = forecast(&series, 3).unwrap();
        let projected: Vec<f64> = forecast.projections.iter().map(|p| p.rate).collect();
        assert_eq!(projected.len(), 3);
        assert_close(projected[0], 50.0);
        assert_close(projected[1], 60.0);
        assert_close(projected[2], 70.0);
        assert_eq!(forecast.projections[0].offset, 1);
        assert_eq!(forecast.method, ForecastMethod::NaiveLinear);
    }

    #[test]
    fn test_flat_series_stays_flat() {
        let series = vec![
            point("2023FA", Some(25.0)),
            point("2024SP", Some(25.0)),
            point("2024FA", Some(25.0)),
        ];
        let forecast = forecast(&series, 3).unwrap();
        assert_eq!(forecast.slope, 0.0);
        for p in &forecast.projections {
            assert!(!p.rate.is_nan());
            assert_eq!(p.rate, 25.0);
        }
    }

    #[test]
    fn test_too_few_points() {
        assert_eq!(
            forecast(&[point("2024FA", Some(0.5))], 3),
            Err(AnalyticsError::InsufficientData {
                required: 2,
                available: 1
            })
        );
        assert!(fit_linear(&[]).is_err());
    }

    #[test]
    fn test_undefined_rates_are_skipped() {
        let series = vec![
            point("2023FA", Some(0.5)),
            point("2024SP", None),
            point("2024FA", Some(0.7)),
        ];
        let forecast = forecast(&series, 1).unwrap();
        assert_eq!(forecast.history.len(), 2);
        assert_close(forecast.slope, 0.2);
        assert_close(forecast.projections[0].rate, 0.9);

        let only_one = vec![point("2023FA", Some(0.5)), point("2024SP", None)];
        assert!(matches!(
            super::forecast(&only_one, 1),
            Err(AnalyticsError::InsufficientData { available: 1, .. })
        ));
    }

    #[test]
    fn test_projections_are_not_clamped() {
        let series = vec![point("2023FA", Some(0.9)), point("2024SP", Some(1.0))];
        let forecast = forecast(&series, 2).unwrap();
        assert!(forecast.projections[1].rate > 1.0);
    }

    #[test]
    fn test_term_series_is_chronological() {
        let group = |key: &str, rate: f64| GroupSummary {
            key: key.to_string(),
            section_count: 2,
            total_capacity: 20,
            total_enrolled: 10,
            enrollment_rate: EnrollmentRate::Defined(rate),
            average_section_rate: EnrollmentRate::Defined(rate),
            risk_counts: RiskCounts::default(),
        };
        let series = term_series(&[
            group("2024FA", 0.7),
            group("2024SP", 0.6),
            group("2023FA", 0.5),
        ]);
        let terms: Vec<&str> = series.iter().map(|p| p.term.as_str()).collect();
        assert_eq!(terms, vec!["2023FA", "2024SP", "2024FA"]);
        assert_eq!(series[0].rate, EnrollmentRate::Defined(0.5));

        let forecast = forecast(&series, 1).unwrap();
        assert_close(forecast.slope, 0.1);
    }
}
