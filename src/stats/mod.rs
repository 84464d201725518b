//! Combination rules for Monte-Carlo run statistics.
//!
//! Two different uncertainty rules are in use and each stays at its
//! callsite: per-variant slopes use [`variant_slope_uncertainty`], the
//! combined totals use [`total_uncertainty`]. Per-variant Pearson and
//! Spearman R use the plain [`mean`] and [`sem`], ignoring per-run errors.

pub mod report;

use serde::Serialize;

use crate::data::model::Measurement;

// ---------------------------------------------------------------------------
// Estimate – value ± uncertainty
// ---------------------------------------------------------------------------

/// A combined value and its uncertainty.
///
/// An undefined uncertainty is NaN; `serde_json` writes it as `null`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Estimate {
    pub value: f64,
    pub error: f64,
}

impl std::fmt::Display for Estimate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} +- {}", self.value, self.error)
    }
}

/// Slope and correlation estimates for one field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldSummary {
    pub runs: usize,
    pub slope: Estimate,
    pub pearson: Estimate,
    pub spearman: Estimate,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Summary of the runs of a single variant.
///
/// Slope: inverse-variance weighted mean, SEM scaled by the quadratic
/// normalised error term. Pearson/Spearman: plain mean ± SEM.
pub fn summarize_variant(runs: &[Measurement]) -> Option<FieldSummary> {
    if runs.is_empty() {
        return None;
    }
    let (slopes, slope_errs) = columns(runs, |m| (m.slope, m.slope_err));
    let pearson: Vec<f64> = runs.iter().map(|m| m.pearson).collect();
    let spearman: Vec<f64> = runs.iter().map(|m| m.spearman).collect();

    Some(FieldSummary {
        runs: runs.len(),
        slope: Estimate {
            value: weighted_mean(&slopes, &slope_errs),
            error: variant_slope_uncertainty(&slopes, &slope_errs),
        },
        pearson: Estimate {
            value: mean(&pearson),
            error: sem(&pearson),
        },
        spearman: Estimate {
            value: mean(&spearman),
            error: sem(&spearman),
        },
    })
}

/// Summary of the runs of all variants combined.
///
/// All three quantities use the inverse-variance weighted mean and
/// `sqrt(1 / Σ 1/e²)`.
pub fn summarize_total(runs: &[Measurement]) -> Option<FieldSummary> {
    if runs.is_empty() {
        return None;
    }
    let weighted = |pick: fn(&Measurement) -> (f64, f64)| {
        let (values, errors) = columns(runs, pick);
        Estimate {
            value: weighted_mean(&values, &errors),
            error: total_uncertainty(&errors),
        }
    };

    Some(FieldSummary {
        runs: runs.len(),
        slope: weighted(|m| (m.slope, m.slope_err)),
        pearson: weighted(|m| (m.pearson, m.pearson_err)),
        spearman: weighted(|m| (m.spearman, m.spearman_err)),
    })
}

fn columns(runs: &[Measurement], pick: impl Fn(&Measurement) -> (f64, f64)) -> (Vec<f64>, Vec<f64>) {
    runs.iter().map(pick).unzip()
}

// ---------------------------------------------------------------------------
// Formulas
// ---------------------------------------------------------------------------

/// Arithmetic mean; NaN for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Standard error of the mean with Bessel's correction.
///
/// NaN for fewer than two values, where the sample variance is undefined.
pub fn sem(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt() / n.sqrt()
}

/// Inverse-variance weighted mean: `Σ(v/e²) / Σ(1/e²)`.
pub fn weighted_mean(values: &[f64], errors: &[f64]) -> f64 {
    debug_assert_eq!(values.len(), errors.len());
    let (num, den) = values
        .iter()
        .zip(errors)
        .fold((0.0, 0.0), |(num, den), (v, e)| {
            let w = 1.0 / (e * e);
            (num + v * w, den + w)
        });
    num / den
}

/// Uncertainty of a weighted mean: `sqrt(1 / Σ(1/e²))`.
pub fn total_uncertainty(errors: &[f64]) -> f64 {
    let inv: f64 = errors.iter().map(|e| 1.0 / (e * e)).sum();
    (1.0 / inv).sqrt()
}

/// Per-variant slope uncertainty: `sem(v) · sqrt(Σ_i (e_i / Σ_j e_j²)²)`.
pub fn variant_slope_uncertainty(values: &[f64], errors: &[f64]) -> f64 {
    let norm: f64 = errors.iter().map(|e| e * e).sum();
    let spread: f64 = errors.iter().map(|e| (e / norm).powi(2)).sum();
    sem(values) * spread.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    fn run(slope: f64, slope_err: f64, r: f64, r_err: f64) -> Measurement {
        Measurement {
            slope,
            slope_err,
            pearson: r,
            pearson_err: r_err,
            spearman: r,
            spearman_err: r_err,
        }
    }

    #[test]
    fn weighted_mean_of_equal_errors_is_plain_mean() {
        assert!((weighted_mean(&[1.0, 2.0], &[1.0, 1.0]) - 1.5).abs() < EPS);
    }

    #[test]
    fn weighted_mean_favours_small_errors() {
        // weights 1 and 4
        let m = weighted_mean(&[1.0, 2.0], &[1.0, 0.5]);
        assert!((m - 9.0 / 5.0).abs() < EPS);
    }

    #[test]
    fn total_uncertainty_of_two_unit_errors() {
        assert!((total_uncertainty(&[1.0, 1.0]) - 1.0 / 2f64.sqrt()).abs() < EPS);
    }

    #[test]
    fn sem_uses_sample_variance() {
        // sample std of [1, 2, 3] is 1
        assert!((sem(&[1.0, 2.0, 3.0]) - 1.0 / 3f64.sqrt()).abs() < EPS);
        assert!(sem(&[1.0]).is_nan());
    }

    #[test]
    fn variant_slope_uncertainty_scales_sem() {
        // Σe² = 2, Σ(e/2)² = 0.5
        let u = variant_slope_uncertainty(&[1.0, 2.0], &[1.0, 1.0]);
        assert!((u - 0.5 * 0.5f64.sqrt()).abs() < EPS);
    }

    #[test]
    fn variant_summary_keeps_correlations_unweighted() {
        let runs = [run(1.0, 1.0, 0.2, 0.001), run(2.0, 1.0, 0.4, 10.0)];
        let s = summarize_variant(&runs).unwrap();
        assert_eq!(s.runs, 2);
        assert!((s.slope.value - 1.5).abs() < EPS);
        assert!((s.pearson.value - 0.3).abs() < EPS);
        assert!((s.pearson.error - sem(&[0.2, 0.4])).abs() < EPS);
    }

    #[test]
    fn total_summary_weights_correlations() {
        let runs = [run(1.0, 1.0, 0.2, 1.0), run(2.0, 1.0, 0.4, 0.5)];
        let s = summarize_total(&runs).unwrap();
        assert!((s.slope.value - 1.5).abs() < EPS);
        assert!((s.slope.error - 1.0 / 2f64.sqrt()).abs() < EPS);
        assert!((s.pearson.value - (0.2 + 0.4 * 4.0) / 5.0).abs() < EPS);
        assert!((s.pearson.error - (1.0f64 / 5.0).sqrt()).abs() < EPS);
    }

    #[test]
    fn empty_runs_have_no_summary() {
        assert!(summarize_variant(&[]).is_none());
        assert!(summarize_total(&[]).is_none());
    }
}
