/// Euclidean norm.
pub fn l2(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// Max-abs norm. NaN entries propagate.
pub fn linf(v: &[f64]) -> f64 {
    let mut m: f64 = 0.0;
    for &x in v {
        if x.is_nan() {
            return f64::NAN;
        }
        m = m.max(x.abs());
    }
    m
}

/// ‖reported − model‖ / ‖reported‖ for both norms over the common prefix.
///
/// Returns None when the common prefix is empty. A zero reported norm is not
/// special-cased and yields Inf or NaN.
pub fn relative_errors(reported: &[f64], model: &[f64]) -> Option<(f64, f64)> {
    let m = reported.len().min(model.len());
    if m == 0 {
        return None;
    }
    let reported = &reported[..m];
    let diff: Vec<f64> = reported.iter().zip(&model[..m]).map(|(r, y)| r - y).collect();
    Some((l2(&diff) / l2(reported), linf(&diff) / linf(reported)))
}

/// Minimum and maximum over the non-NaN entries of a matrix.
pub fn nan_min_max(rows: &[Vec<f64>]) -> Option<(f64, f64)> {
    let mut acc: Option<(f64, f64)> = None;
    for &v in rows.iter().flatten() {
        if v.is_nan() {
            continue;
        }
        acc = Some(match acc {
            None => (v, v),
            Some((lo, hi)) => (lo.min(v), hi.max(v)),
        });
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_errors_use_common_prefix() {
        let (r2, rinf) = relative_errors(&[3.0, 4.0, 100.0], &[3.0, 4.0]).unwrap();
        assert_eq!(r2, 0.0);
        assert_eq!(rinf, 0.0);
        assert!(relative_errors(&[], &[1.0]).is_none());
    }

    #[test]
    fn zero_reported_norm_is_not_guarded() {
        let (r2, rinf) = relative_errors(&[0.0, 0.0], &[1.0, 0.0]).unwrap();
        assert!(r2.is_infinite());
        assert!(rinf.is_infinite());
        let (r2, _) = relative_errors(&[0.0], &[0.0]).unwrap();
        assert!(r2.is_nan());
    }

    #[test]
    fn nan_min_max_skips_nan() {
        let m = vec![vec![f64::NAN, 2.0], vec![-1.0, f64::NAN]];
        assert_eq!(nan_min_max(&m), Some((-1.0, 2.0)));
        assert_eq!(nan_min_max(&[vec![f64::NAN]]), None);
    }
}
