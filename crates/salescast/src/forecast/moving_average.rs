//! Moving averages and recent-volatility measures.

use crate::utils::mean;

/// Mean of the last `window` values, or `None` if there are fewer.
pub fn simple_moving_average(values: &[f64], window: usize) -> Option<f64> {
    if window == 0 || values.len() < window {
        return None;
    }
    mean(&values[values.len() - window..])
}

/// Weighted mean of the trailing values, one weight per value.
///
/// `weights` run oldest to newest, so `[1, 2, 3]` weights the latest value
/// most. Returns `None` when there are fewer values than weights or the
/// weights sum to zero.
pub fn weighted_moving_average(values: &[f64], weights: &[f64]) -> Option<f64> {
    if weights.is_empty() || values.len() < weights.len() {
        return None;
    }
    let weight_sum: f64 = weights.iter().sum();
    if weight_sum == 0.0 {
        return None;
    }

    let recent = &values[values.len() - weights.len()..];
    let weighted: f64 = recent.iter().zip(weights).map(|(v, w)| v * w).sum();
    Some(weighted / weight_sum)
}

/// Population standard deviation; 0 for fewer than two values.
pub fn population_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let Some(avg) = mean(values) else {
        return 0.0;
    };
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_moving_average() {
        let values = [10.0, 100.0, 200.0, 300.0];
        assert_eq!(simple_moving_average(&values, 3), Some(200.0));
        assert_eq!(simple_moving_average(&values, 4), Some(152.5));
        assert_eq!(simple_moving_average(&values, 6), None);
        assert_eq!(simple_moving_average(&values, 0), None);
    }

    #[test]
    fn test_weighted_moving_average() {
        let wma = weighted_moving_average(&[100.0, 200.0, 300.0], &[1.0, 2.0, 3.0]).unwrap();
        assert!((wma - 1400.0 / 6.0).abs() < 1e-9);

        // Only the trailing values are weighted
        let wma = weighted_moving_average(&[9999.0, 100.0, 200.0, 300.0], &[1.0, 2.0, 3.0]).unwrap();
        assert!((wma - 1400.0 / 6.0).abs() < 1e-9);

        assert_eq!(weighted_moving_average(&[1.0, 2.0], &[1.0, 2.0, 3.0]), None);
        assert_eq!(weighted_moving_average(&[1.0, 2.0], &[0.0, 0.0]), None);
    }

    #[test]
    fn test_population_std() {
        assert_eq!(population_std(&[5.0]), 0.0);
        assert_eq!(population_std(&[7.0, 7.0, 7.0]), 0.0);
        // mean 200, squared deviations 10000 + 0 + 10000 over 3
        let std = population_std(&[100.0, 200.0, 300.0]);
        assert!((std - (20000.0f64 / 3.0).sqrt()).abs() < 1e-9);
    }
}
