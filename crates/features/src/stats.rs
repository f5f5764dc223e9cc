//! Statistics over a single window of values.
//!
//! Every function returns `None` when the statistic is undefined: too few
//! points, zero variance, or a non-finite result.

use statrs::statistics::Statistics;

/// Spread, in ULPs of the scale, below which values count as identical.
pub const FLAT_TOLERANCE_ULPS: f64 = 64.0;

/// Population central moments of a window.
#[derive(Debug, Clone, Copy)]
struct Moments {
    m2: f64,
    m3: f64,
    m4: f64,
}

impl Moments {
    fn of(values: &[f64]) -> Self {
        let mean = values.iter().mean();
        let n = values.len() as f64;
        let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
        for &x in values {
            let d = x - mean;
            let d2 = d * d;
            m2 += d2;
            m3 += d2 * d;
            m4 += d2 * d2;
        }
        Self {
            m2: m2 / n,
            m3: m3 / n,
            m4: m4 / n,
        }
    }
}

fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

/// Largest absolute value, 0 for an empty slice.
pub fn max_abs(values: &[f64]) -> f64 {
    values.iter().fold(0.0, |acc: f64, x| acc.max(x.abs()))
}

/// True when the range of `values` is within [`FLAT_TOLERANCE_ULPS`] of
/// `scale`, i.e. the values are identical up to rounding noise at that scale.
pub fn is_flat(values: &[f64], scale: f64) -> bool {
    let (lo, hi) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| (lo.min(x), hi.max(x)));
    !(hi - lo > FLAT_TOLERANCE_ULPS * f64::EPSILON * scale.abs())
}

/// Zero variance relative to the magnitude of the values themselves.
pub fn is_degenerate(values: &[f64]) -> bool {
    is_flat(values, max_abs(values))
}

/// Sample standard deviation (divisor n-1).
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    finite(values.iter().std_dev())
}

/// Fisher-Pearson skewness, `m3 / m2^1.5`.
pub fn skewness(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    if is_degenerate(values) {
        return None;
    }
    let m = Moments::of(values);
    finite(m.m3 / m.m2.powf(1.5))
}

/// Fisher excess kurtosis, `m4 / m2^2 - 3`.
pub fn excess_kurtosis(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    if is_degenerate(values) {
        return None;
    }
    let m = Moments::of(values);
    finite(m.m4 / (m.m2 * m.m2) - 3.0)
}

/// Pearson correlation of two equal-length series.
pub fn pearson(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.len() != b.len() || a.len() < 2 {
        return None;
    }
    if is_degenerate(a) || is_degenerate(b) {
        return None;
    }
    let cov = a.iter().covariance(b.iter());
    finite(cov / (a.iter().std_dev() * b.iter().std_dev()))
}

/// Correlation of `values` with itself shifted by `lag` inside the same
/// window. The overlap is `len - lag` pairs and must be at least 2.
pub fn autocorrelation(values: &[f64], lag: usize) -> Option<f64> {
    if lag == 0 || lag >= values.len() {
        return None;
    }
    let n = values.len() - lag;
    pearson(&values[..n], &values[lag..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_sample_std_dev() {
        // Mean 2.5, squared deviations sum to 5, / 3
        let sd = sample_std_dev(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_abs_diff_eq!(sd, (5.0f64 / 3.0).sqrt(), epsilon = 1e-12);
        assert!(sample_std_dev(&[1.0]).is_none());
    }

    #[test]
    fn test_symmetric_skewness_is_zero() {
        let s = skewness(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_abs_diff_eq!(s, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_known_skewness_and_kurtosis() {
        // m2 = 2.16, m3 = 3.696, m4 = 13.1232
        let values = [1.0, 1.0, 2.0, 2.0, 5.0];
        assert_abs_diff_eq!(
            skewness(&values).unwrap(),
            3.696 / 2.16f64.powf(1.5),
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(
            excess_kurtosis(&values).unwrap(),
            13.1232 / (2.16 * 2.16) - 3.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_three_point_kurtosis() {
        // Any non-degenerate 3-point sample has excess kurtosis -1.5
        let k = excess_kurtosis(&[0.3, -1.0, 7.0]).unwrap();
        assert_abs_diff_eq!(k, -1.5, epsilon = 1e-9);
    }

    #[test]
    fn test_constant_window_is_degenerate() {
        let values = [0.01; 6];
        assert!(skewness(&values).is_none());
        assert!(excess_kurtosis(&values).is_none());
        assert!(autocorrelation(&values, 1).is_none());
        assert_abs_diff_eq!(sample_std_dev(&values).unwrap(), 0.0, epsilon = 1e-15);
    }

    #[test]
    fn test_rounding_noise_is_degenerate() {
        let noisy = [1.0, 1.0 + f64::EPSILON, 1.0 - f64::EPSILON, 1.0];
        assert!(is_degenerate(&noisy));
        assert!(skewness(&noisy).is_none());
        assert!(excess_kurtosis(&noisy).is_none());
        assert!(pearson(&noisy, &[1.0, 2.0, 3.0, 4.0]).is_none());

        // Same spread is real variation at a smaller scale
        let small = [0.0, 1e-15, -1e-15, 0.0];
        assert!(!is_degenerate(&small));
        assert!(!is_flat(&small, 1e-15));
        assert!(is_flat(&small, 1.0));
    }

    #[test]
    fn test_max_abs() {
        assert_abs_diff_eq!(max_abs(&[0.5, -2.0, 1.0]), 2.0);
        assert_abs_diff_eq!(max_abs(&[]), 0.0);
    }

    #[test]
    fn test_autocorrelation_alternating() {
        let values = [1.0, -1.0, 1.0, -1.0, 1.0, -1.0];
        assert_abs_diff_eq!(autocorrelation(&values, 1).unwrap(), -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(autocorrelation(&values, 2).unwrap(), 1.0, epsilon = 1e-12);

        let values = [1.0, -1.0, 2.0, -2.0, 3.0, -3.0];
        assert!(autocorrelation(&values, 1).unwrap() < 0.0);
        assert!(autocorrelation(&values, 2).unwrap() > 0.0);
    }

    #[test]
    fn test_autocorrelation_overlap_too_small() {
        let values = [1.0, 2.0, 4.0];
        assert!(autocorrelation(&values, 2).is_none());
        assert!(autocorrelation(&values, 3).is_none());
        assert!(autocorrelation(&values, 0).is_none());
        assert_abs_diff_eq!(autocorrelation(&values, 1).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_pearson_perfect_linear() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let b = [2.0, 4.0, 6.0, 8.0];
        assert_abs_diff_eq!(pearson(&a, &b).unwrap(), 1.0, epsilon = 1e-12);
        assert!(pearson(&a, &[1.0, 1.0, 1.0, 1.0]).is_none());
        assert!(pearson(&a, &b[..3]).is_none());
    }
}
