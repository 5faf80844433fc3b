//! Multiple testing correction of p-values
//!
//! All methods return the adjusted p-values in the order of the input,
//! capped at `1.0`.

use std::cmp::Ordering;

use crate::config::Correction;
use crate::stats::f64_from_usize;
use crate::{GoError, GoResult};

/// Adjusts `pvalues` with the given correction `method`
///
/// # Errors
///
/// - [`GoError::Engine`]: `method` is [`Correction::GScs`], which can only be
///   calculated by g:Profiler, or a p-value is outside of `[0, 1]`
///
/// # Examples
///
/// ```
/// use goenrich::config::Correction;
/// use goenrich::stats::adjust;
///
/// let adjusted = adjust(&[0.01, 0.04, 0.03], Correction::BenjaminiHochberg).unwrap();
/// assert!((adjusted[0] - 0.03).abs() < 1e-12);
/// assert!((adjusted[1] - 0.04).abs() < 1e-12);
/// assert!((adjusted[2] - 0.04).abs() < 1e-12);
/// ```
pub fn adjust(pvalues: &[f64], method: Correction) -> GoResult<Vec<f64>> {
    if let Some(p) = pvalues.iter().find(|p| !(0.0..=1.0).contains(*p)) {
        return Err(GoError::Engine(format!("invalid p-value: {p}")));
    }
    match method {
        Correction::None => Ok(pvalues.to_vec()),
        Correction::Bonferroni => Ok(bonferroni(pvalues)),
        Correction::Holm => Ok(holm(pvalues)),
        Correction::BenjaminiHochberg => Ok(step_up(pvalues, 1.0)),
        Correction::BenjaminiYekutieli => {
            let c_n: f64 = (1..=pvalues.len()).map(|i| 1.0 / f64_from_usize(i)).sum();
            Ok(step_up(pvalues, c_n))
        }
        Correction::GScs => Err(GoError::Engine(
            "g:SCS correction is only available through g:Profiler".to_string(),
        )),
    }
}

/// Returns the indices of `pvalues`, sorted by ascending p-value
fn ascending_order(pvalues: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..pvalues.len()).collect();
    order.sort_by(|a, b| {
        pvalues[*a]
            .partial_cmp(&pvalues[*b])
            .unwrap_or(Ordering::Equal)
    });
    order
}

fn bonferroni(pvalues: &[f64]) -> Vec<f64> {
    let n = f64_from_usize(pvalues.len());
    pvalues.iter().map(|p| (p * n).min(1.0)).collect()
}

/// Holm step-down: `max_{j <= i} (n - j) * p_(j)`
fn holm(pvalues: &[f64]) -> Vec<f64> {
    let n = pvalues.len();
    let mut adjusted = vec![0.0; n];
    let mut running_max = 0.0f64;
    for (rank, idx) in ascending_order(pvalues).into_iter().enumerate() {
        let value = (pvalues[idx] * f64_from_usize(n - rank)).min(1.0);
        running_max = running_max.max(value);
        adjusted[idx] = running_max;
    }
    adjusted
}

/// Benjamini-Hochberg step-up, scaled by `factor` for Benjamini-Yekutieli
fn step_up(pvalues: &[f64], factor: f64) -> Vec<f64> {
    let n = pvalues.len();
    let order = ascending_order(pvalues);
    let mut adjusted = vec![0.0; n];
    let mut current_min = 1.0f64;

    // Process from largest to smallest p-value
    for (rank, idx) in order.into_iter().enumerate().rev() {
        let value =
            (pvalues[idx] * factor * f64_from_usize(n) / f64_from_usize(rank + 1)).min(1.0);
        current_min = current_min.min(value);
        adjusted[idx] = current_min;
    }
    adjusted
}

#[cfg(test)]
mod test {
    use super::*;

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-9, "{actual:?} != {expected:?}");
        }
    }

    const P: [f64; 5] = [0.01, 0.02, 0.03, 0.04, 0.05];

    #[test]
    fn none() {
        assert_close(&adjust(&P, Correction::None).unwrap(), &P);
    }

    #[test]
    fn bonferroni_caps() {
        assert_close(
            &adjust(&[0.01, 0.3, 0.5], Correction::Bonferroni).unwrap(),
            &[0.03, 0.9, 1.0],
        );
    }

    #[test]
    fn holm_is_monotone() {
        // R: p.adjust(c(0.01, 0.04, 0.03, 0.005), "holm")
        assert_close(
            &adjust(&[0.01, 0.04, 0.03, 0.005], Correction::Holm).unwrap(),
            &[0.03, 0.06, 0.06, 0.02],
        );
    }

    #[test]
    fn benjamini_hochberg() {
        // R: p.adjust(c(0.01, 0.02, 0.03, 0.04, 0.05), "BH")
        assert_close(
            &adjust(&P, Correction::BenjaminiHochberg).unwrap(),
            &[0.05, 0.05, 0.05, 0.05, 0.05],
        );
        assert_close(
            &adjust(&[0.04, 0.001, 0.5], Correction::BenjaminiHochberg).unwrap(),
            &[0.06, 0.003, 0.5],
        );
    }

    #[test]
    fn benjamini_yekutieli() {
        // c(5) = 1 + 1/2 + 1/3 + 1/4 + 1/5
        let c_n = 137.0 / 60.0;
        assert_close(
            &adjust(&P, Correction::BenjaminiYekutieli).unwrap(),
            &[0.05 * c_n; 5],
        );
    }

    #[test]
    fn empty_input() {
        assert!(adjust(&[], Correction::BenjaminiHochberg)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn rejected() {
        assert!(adjust(&P, Correction::GScs).is_err());
        assert!(adjust(&[1.5], Correction::None).is_err());
    }
}
