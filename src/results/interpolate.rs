use crate::error::{Result, VibraCoreError};

/// Piecewise-linear interpolant with linear extrapolation past both ends.
#[derive(Debug, Clone, PartialEq)]
pub struct Interp1d {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl Interp1d {
    /// Samples need not be sorted. For repeated `x` the first sample wins.
    /// Samples with a NaN coordinate are dropped.
    pub fn new(xs: &[f64], ys: &[f64]) -> Result<Self> {
        if xs.len() != ys.len() {
            return Err(VibraCoreError::Shape(format!(
                "interpolation needs equally long inputs, got {} and {}",
                xs.len(),
                ys.len()
            )));
        }

        let mut points: Vec<(f64, f64)> = xs
            .iter()
            .copied()
            .zip(ys.iter().copied())
            .filter(|(x, y)| !x.is_nan() && !y.is_nan())
            .collect();
        // stable, so the first of equal x stays in front
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        points.dedup_by(|later, earlier| later.0 == earlier.0);

        if points.len() < 2 {
            return Err(VibraCoreError::InvalidInput(format!(
                "interpolation needs at least two distinct samples, got {}",
                points.len()
            )));
        }

        let (xs, ys) = points.into_iter().unzip();
        Ok(Self { xs, ys })
    }

    pub fn eval(&self, x: f64) -> f64 {
        if x.is_nan() {
            return f64::NAN;
        }
        let n = self.xs.len();
        let i = match self.xs.partition_point(|&v| v <= x) {
            0 => 0,
            p if p >= n => n - 2,
            p => p - 1,
        };
        let (x0, x1) = (self.xs[i], self.xs[i + 1]);
        let (y0, y1) = (self.ys[i], self.ys[i + 1]);
        y0 + (x - x0) * (y1 - y0) / (x1 - x0)
    }

    pub fn eval_many(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.eval(x)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn interpolates_unsorted_samples() {
        let f = Interp1d::new(&[2.0, 0.0, 1.0], &[20.0, 0.0, 10.0]).unwrap();
        assert!(close(f.eval(0.5), 5.0));
        assert!(close(f.eval(1.5), 15.0));
        assert!(close(f.eval(2.0), 20.0));
    }

    #[test]
    fn extrapolates_from_end_segments() {
        let f = Interp1d::new(&[0.0, 1.0, 3.0], &[0.0, 1.0, 5.0]).unwrap();
        assert!(close(f.eval(-1.0), -1.0));
        assert!(close(f.eval(4.0), 7.0));
    }

    #[test]
    fn first_duplicate_wins() {
        let f = Interp1d::new(&[0.0, 1.0, 1.0, 2.0], &[0.0, 1.0, 99.0, 2.0]).unwrap();
        assert!(close(f.eval(1.0), 1.0));
    }

    #[test]
    fn needs_two_distinct_samples() {
        assert!(matches!(
            Interp1d::new(&[1.0, 1.0], &[2.0, 3.0]),
            Err(VibraCoreError::InvalidInput(_))
        ));
        assert!(matches!(
            Interp1d::new(&[1.0], &[2.0, 3.0]),
            Err(VibraCoreError::Shape(_))
        ));
    }

    #[test]
    fn nan_in_nan_out() {
        let f = Interp1d::new(&[0.0, 1.0], &[0.0, 1.0]).unwrap();
        assert!(f.eval(f64::NAN).is_nan());
    }
}
