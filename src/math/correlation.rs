//! Correlation statistics.
//!
//! Pearson r and Spearman ρ with two-sided p-values from the t-distribution
//! with `n - 2` degrees of freedom:
//!
//! ```text
//! t = r · sqrt((n - 2) / (1 - r²)),   p = 2 · P(T > |t|)
//! ```
//!
//! Spearman ρ is Pearson r on average ranks (ties share the mean rank).

use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::domain::{CorrelationMethod, CorrelationResult};

/// Arithmetic mean; `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator); `None` below two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() as f64 - 1.0);
    Some(var.sqrt())
}

/// Pearson correlation coefficient.
///
/// `None` when lengths differ, fewer than two pairs, or either side is constant.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let mx = mean(x)?;
    let my = mean(y)?;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mx;
        let dy = yi - my;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}

/// Spearman rank correlation coefficient.
pub fn spearman(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    pearson(&average_ranks(x), &average_ranks(y))
}

/// 1-based ranks, ties replaced by their average rank.
pub fn average_ranks(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[a].partial_cmp(&values[b]).unwrap_or(std::cmp::Ordering::Equal));

    let mut ranks = vec![0.0; n];
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j < n && values[order[j]] == values[order[i]] {
            j += 1;
        }
        let avg = (i + j) as f64 / 2.0 + 0.5;
        for &idx in &order[i..j] {
            ranks[idx] = avg;
        }
        i = j;
    }
    ranks
}

/// Two-sided p-value for a correlation coefficient over `n` pairs.
pub fn correlation_p_value(r: f64, n: usize) -> f64 {
    if !r.is_finite() {
        return f64::NAN;
    }
    if n < 3 {
        // Two points always lie on a line.
        return 1.0;
    }
    let df = (n - 2) as f64;
    let denom = 1.0 - r * r;
    if denom <= 0.0 {
        return 0.0;
    }
    let t = r * (df / denom).sqrt();
    match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => (2.0 * dist.sf(t.abs())).clamp(0.0, 1.0),
        Err(_) => f64::NAN,
    }
}

pub fn pearson_test(x: &[f64], y: &[f64]) -> CorrelationResult {
    match pearson(x, y) {
        Some(r) => CorrelationResult::new(CorrelationMethod::Pearson, r, correlation_p_value(r, x.len())),
        None => CorrelationResult::undefined(CorrelationMethod::Pearson),
    }
}

pub fn spearman_test(x: &[f64], y: &[f64]) -> CorrelationResult {
    match spearman(x, y) {
        Some(r) => CorrelationResult::new(CorrelationMethod::Spearman, r, correlation_p_value(r, x.len())),
        None => CorrelationResult::undefined(CorrelationMethod::Spearman),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const X: [f64; 5] = [1.0, 2.0, 3.0, 4.0, 5.0];
    const Y: [f64; 5] = [2.0, 4.0, 5.0, 4.0, 5.0];

    #[test]
    fn pearson_matches_reference_values() {
        let res = pearson_test(&X, &Y);
        assert!((res.coefficient - 0.774_596_669_241_483).abs() < 1e-12);
        assert!((res.p_value - 0.124_027_062_657_555).abs() < 1e-6);
        assert!((res.r_squared - 0.6).abs() < 1e-12);
    }

    #[test]
    fn spearman_matches_reference_values() {
        let res = spearman_test(&X, &Y);
        assert!((res.coefficient - 0.737_864_787_372_622).abs() < 1e-12);
        assert!((res.p_value - 0.154_618_523_128_449).abs() < 1e-6);
    }

    #[test]
    fn ranks_average_ties() {
        assert_eq!(average_ranks(&Y), vec![1.0, 2.5, 4.5, 2.5, 4.5]);
    }

    #[test]
    fn constant_series_is_undefined() {
        let flat = [50.0; 5];
        assert_eq!(pearson(&flat, &X), None);
        let res = pearson_test(&flat, &X);
        assert!(!res.is_defined());
        assert!(res.p_value.is_nan());
    }

    #[test]
    fn perfect_and_two_point_cases() {
        let y: Vec<f64> = X.iter().map(|v| 3.0 - 2.0 * v).collect();
        let res = pearson_test(&X, &y);
        assert!((res.coefficient + 1.0).abs() < 1e-12);
        assert!(res.p_value < 1e-12);

        let two = pearson_test(&[1.0, 2.0], &[5.0, 3.0]);
        assert!((two.coefficient + 1.0).abs() < 1e-12);
        assert_eq!(two.p_value, 1.0);
    }

    #[test]
    fn sample_std_uses_n_minus_one() {
        let sd = sample_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((sd - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
        assert_eq!(sample_std(&[1.0]), None);
        assert_eq!(mean(&[]), None);
    }
}
