//! Rolling-window statistics over `f64` series.
//!
//! Window ends at (and includes) the current index. A window containing a NaN
//! yields NaN. Output length always equals input length.

/// Simple return `x[t] / x[t-1] - 1`; NaN at index 0.
pub fn pct_change(values: &[f64]) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    for (i, w) in values.windows(2).enumerate() {
        out[i + 1] = w[1] / w[0] - 1.0;
    }
    out
}

/// Shift a series forward by `by` positions, filling the head with NaN.
pub fn shift(values: &[f64], by: usize) -> Vec<f64> {
    let n = values.len();
    let mut out = vec![f64::NAN; n];
    if by < n {
        out[by..].copy_from_slice(&values[..n - by]);
    }
    out
}

fn rolling<F>(values: &[f64], window: usize, f: F) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64,
{
    let n = values.len();
    let mut out = vec![f64::NAN; n];
    if window == 0 || n < window {
        return out;
    }
    for end in window - 1..n {
        let slice = &values[end + 1 - window..=end];
        if slice.iter().any(|v| v.is_nan()) {
            continue;
        }
        out[end] = f(slice);
    }
    out
}

pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    rolling(values, window, |w| w.iter().sum::<f64>() / w.len() as f64)
}

/// Sample standard deviation (n - 1 denominator). Window of 1 is NaN.
pub fn rolling_std(values: &[f64], window: usize) -> Vec<f64> {
    if window < 2 {
        return vec![f64::NAN; values.len()];
    }
    rolling(values, window, |w| {
        let mean = w.iter().sum::<f64>() / w.len() as f64;
        let var = w.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (w.len() - 1) as f64;
        var.sqrt()
    })
}

pub fn rolling_max(values: &[f64], window: usize) -> Vec<f64> {
    rolling(values, window, |w| w.iter().copied().fold(f64::NEG_INFINITY, f64::max))
}

pub fn rolling_min(values: &[f64], window: usize) -> Vec<f64> {
    rolling(values, window, |w| w.iter().copied().fold(f64::INFINITY, f64::min))
}

/// Z-score of each value against its trailing window.
///
/// A flat window (std = 0) scores 0 rather than dividing by zero.
pub fn rolling_zscore(values: &[f64], window: usize) -> Vec<f64> {
    let mean = rolling_mean(values, window);
    let std = rolling_std(values, window);
    values
        .iter()
        .zip(mean.iter().zip(&std))
        .map(|(&v, (&m, &s))| {
            if m.is_nan() || s.is_nan() {
                f64::NAN
            } else if s == 0.0 {
                0.0
            } else {
                (v - m) / s
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn pct_change_basic() {
        let r = pct_change(&[100.0, 110.0, 99.0]);
        assert!(r[0].is_nan());
        assert_approx(r[1], 0.1, DEFAULT_EPSILON);
        assert_approx(r[2], -0.1, DEFAULT_EPSILON);
    }

    #[test]
    fn shift_by_one() {
        let s = shift(&[1.0, 2.0, 3.0], 1);
        assert!(s[0].is_nan());
        assert_eq!(&s[1..], &[1.0, 2.0]);
        assert!(shift(&[1.0], 3).iter().all(|v| v.is_nan()));
    }

    #[test]
    fn mean_max_min() {
        let v = [1.0, 3.0, 2.0, 5.0];
        let mean = rolling_mean(&v, 2);
        assert!(mean[0].is_nan());
        assert_approx(mean[1], 2.0, DEFAULT_EPSILON);
        assert_approx(mean[3], 3.5, DEFAULT_EPSILON);
        assert_eq!(rolling_max(&v, 3)[2], 3.0);
        assert_eq!(rolling_max(&v, 3)[3], 5.0);
        assert_eq!(rolling_min(&v, 3)[3], 2.0);
    }

    #[test]
    fn sample_std() {
        // sample std of [2, 4, 4, 4, 5, 5, 7, 9] = sqrt(32/7)
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let s = rolling_std(&v, 8);
        assert_approx(s[7], (32.0_f64 / 7.0).sqrt(), 1e-12);
    }

    #[test]
    fn nan_in_window_yields_nan() {
        let v = [1.0, f64::NAN, 3.0, 4.0, 5.0];
        let m = rolling_mean(&v, 2);
        assert!(m[1].is_nan());
        assert!(m[2].is_nan());
        assert_approx(m[3], 3.5, DEFAULT_EPSILON);
    }

    #[test]
    fn zscore_flat_window_is_zero() {
        let z = rolling_zscore(&[5.0; 4], 3);
        assert!(z[1].is_nan());
        assert_eq!(z[2], 0.0);
        assert_eq!(z[3], 0.0);
    }

    #[test]
    fn zscore_spike_is_positive() {
        let mut v = vec![100.0; 10];
        v.push(400.0);
        let z = rolling_zscore(&v, 5);
        assert!(z[10] > 1.0);
    }
}
