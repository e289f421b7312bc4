//! Ordinary least squares over a period index.

/// A fitted line `value = slope * index + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination against the observed values.
    pub r_squared: f64,
}

impl LinearFit {
    /// Fit values against their zero-based positions `0, 1, 2, ...`.
    ///
    /// Returns `None` for an empty slice. A single value fits a flat line.
    /// When every value is identical the line is exact and R² is 1.0.
    pub fn fit(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let n = values.len() as f64;
        let mean_x = (n - 1.0) / 2.0;
        let mean_y = values.iter().sum::<f64>() / n;

        let (mut sxx, mut sxy) = (0.0, 0.0);
        for (i, y) in values.iter().enumerate() {
            let dx = i as f64 - mean_x;
            sxx += dx * dx;
            sxy += dx * (y - mean_y);
        }

        let slope = if sxx == 0.0 { 0.0 } else { sxy / sxx };
        let intercept = mean_y - slope * mean_x;

        let (mut ss_res, mut ss_tot) = (0.0, 0.0);
        for (i, y) in values.iter().enumerate() {
            let fitted = slope * i as f64 + intercept;
            ss_res += (y - fitted).powi(2);
            ss_tot += (y - mean_y).powi(2);
        }

        let r_squared = if ss_tot == 0.0 {
            if ss_res == 0.0 { 1.0 } else { 0.0 }
        } else {
            1.0 - ss_res / ss_tot
        };

        Some(Self {
            slope,
            intercept,
            r_squared,
        })
    }

    /// Value of the line at a period index.
    pub fn predict(&self, index: f64) -> f64 {
        self.slope * index + self.intercept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_line() {
        let fit = LinearFit::fit(&[100.0, 200.0, 300.0]).unwrap();
        assert!((fit.slope - 100.0).abs() < 1e-9);
        assert!((fit.intercept - 100.0).abs() < 1e-9);
        assert!((fit.predict(3.0) - 400.0).abs() < 1e-9);
        assert!((fit.r_squared - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_flat_values() {
        let fit = LinearFit::fit(&[150.0, 150.0, 150.0]).unwrap();
        assert_eq!(fit.slope, 0.0);
        assert_eq!(fit.predict(3.0), 150.0);
        assert_eq!(fit.r_squared, 1.0);
    }

    #[test]
    fn test_noisy_decline() {
        // y = 10 - 2x with residuals (+1, -1, -1, +1)
        let fit = LinearFit::fit(&[11.0, 7.0, 5.0, 5.0]).unwrap();
        assert!((fit.slope - (-2.0)).abs() < 1e-9);
        assert!((fit.intercept - 10.0).abs() < 1e-9);
        // ss_res = 4, ss_tot = 24
        assert!((fit.r_squared - (1.0 - 4.0 / 24.0)).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(LinearFit::fit(&[]).is_none());
        let single = LinearFit::fit(&[42.0]).unwrap();
        assert_eq!(single.slope, 0.0);
        assert_eq!(single.predict(1.0), 42.0);
    }
}
