//! Value transforms applied to one series before it is plotted. Gaps
//! (`None`) stay gaps and never count towards sums or extrema.

use crate::config::ValueTransforms;

/// Apply every enabled transform, in the order normalize, cumulative,
/// percentage, moving average.
pub fn apply(values: &mut [Option<f64>], transforms: &ValueTransforms) {
    if transforms.normalize {
        normalize(values);
    }
    if transforms.cumulative {
        cumulative(values);
    }
    if transforms.percentage {
        percentage(values);
    }
    if let Some(window) = transforms.moving_average {
        moving_average(values, window);
    }
}

/// Min-max scaling to 0..1. A flat series becomes all zeros.
pub fn normalize(values: &mut [Option<f64>]) {
    let (min, max) = values
        .iter()
        .flatten()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let range = max - min;
    for v in values.iter_mut().flatten() {
        *v = if range.abs() < f64::EPSILON { 0.0 } else { (*v - min) / range };
    }
}

pub fn cumulative(values: &mut [Option<f64>]) {
    let mut sum = 0.0;
    for v in values.iter_mut().flatten() {
        sum += *v;
        *v = sum;
    }
}

/// Each value as a percentage of the series total. A zero total gives 0.
pub fn percentage(values: &mut [Option<f64>]) {
    let total: f64 = values.iter().flatten().sum();
    for v in values.iter_mut().flatten() {
        *v = if total == 0.0 { 0.0 } else { *v / total * 100.0 };
    }
}

/// Trailing mean over `window` rows, averaging the numeric values in the
/// window. The first `window - 1` rows have no average and become gaps.
/// Windows below 2, or longer than the series, leave it unchanged.
pub fn moving_average(values: &mut [Option<f64>], window: usize) {
    if window < 2 || values.len() < window {
        return;
    }
    let source = values.to_vec();
    for (i, out) in values.iter_mut().enumerate() {
        *out = if i + 1 < window {
            None
        } else {
            let present: Vec<f64> = source[i + 1 - window..=i].iter().flatten().copied().collect();
            (!present.is_empty()).then(|| present.iter().sum::<f64>() / present.len() as f64)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(vals: &[f64]) -> Vec<Option<f64>> {
        vals.iter().copied().map(Some).collect()
    }

    #[test]
    fn test_normalize_keeps_gaps() {
        let mut v = vec![Some(10.0), None, Some(20.0), Some(15.0)];
        normalize(&mut v);
        assert_eq!(v, [Some(0.0), None, Some(1.0), Some(0.5)]);

        let mut flat = some(&[3.0, 3.0]);
        normalize(&mut flat);
        assert_eq!(flat, some(&[0.0, 0.0]));
    }

    #[test]
    fn test_cumulative_running_total() {
        let mut v = vec![Some(1.0), None, Some(2.0), Some(3.0)];
        cumulative(&mut v);
        assert_eq!(v, [Some(1.0), None, Some(3.0), Some(6.0)]);
    }

    #[test]
    fn test_percentage_of_total() {
        let mut v = some(&[1.0, 3.0]);
        percentage(&mut v);
        assert_eq!(v, some(&[25.0, 75.0]));

        let mut zero = some(&[0.0, 0.0]);
        percentage(&mut zero);
        assert_eq!(zero, some(&[0.0, 0.0]));
    }

    #[test]
    fn test_moving_average_window() {
        let mut v = vec![Some(1.0), Some(2.0), Some(3.0), None, Some(5.0)];
        moving_average(&mut v, 2);
        assert_eq!(v, [None, Some(1.5), Some(2.5), Some(3.0), Some(5.0)]);

        let mut short = some(&[1.0, 2.0]);
        moving_average(&mut short, 3);
        assert_eq!(short, some(&[1.0, 2.0]));
    }

    #[test]
    fn test_apply_order() {
        let transforms = ValueTransforms {
            cumulative: true,
            percentage: true,
            ..ValueTransforms::default()
        };
        let mut v = some(&[1.0, 1.0, 2.0]);
        apply(&mut v, &transforms);
        // cumulative [1, 2, 4] then percent of 7
        let expected = [1.0 / 7.0, 2.0 / 7.0, 4.0 / 7.0].map(|x| Some(x * 100.0));
        for (a, b) in v.iter().zip(expected) {
            assert!((a.unwrap() - b.unwrap()).abs() < 1e-9);
        }
    }
}
