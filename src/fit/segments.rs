//! Piecewise-linear fits split by the sign of the independent variable.
//!
//! Transmission backlash and preload make the loading and unloading halves of
//! a torque sweep behave differently, so each half gets its own line. Rows with
//! torque exactly zero sit between the halves and are left out of both fits.

use crate::domain::Side;
use crate::math::{LinearFit, fit_line};

/// The rows of one side of the axis and the line fitted through them.
#[derive(Debug, Clone)]
pub struct Segment {
    pub side: Side,
    pub points: Vec<(f64, f64)>,
    /// `None` when the side holds fewer than two points.
    pub fit: Option<LinearFit>,
}

impl Segment {
    /// Observed `(min, max)` of x over this segment's points.
    pub fn x_extent(&self) -> Option<(f64, f64)> {
        let mut iter = self.points.iter().map(|&(x, _)| x);
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), x| (lo.min(x), hi.max(x))))
    }
}

/// Select the rows on `side` and fit a line through them.
pub fn fit_segment(x: &[f64], y: &[f64], side: Side) -> Segment {
    let points: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter(|&(&xi, _)| side.contains(xi))
        .map(|(&xi, &yi)| (xi, yi))
        .collect();

    let (xs, ys): (Vec<f64>, Vec<f64>) = points.iter().copied().unzip();
    let fit = fit_line(&xs, &ys);

    Segment { side, points, fit }
}

/// Fit both sides: `[positive, negative]`.
pub fn fit_both_sides(x: &[f64], y: &[f64]) -> [Segment; 2] {
    Side::BOTH.map(|side| fit_segment(x, y, side))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_rows_are_excluded_from_both_sides() {
        let [pos, neg] = fit_both_sides(&[0.0, 1.0], &[0.0, 0.5]);

        assert_eq!(pos.points, vec![(1.0, 0.5)]);
        assert!(pos.fit.is_none());

        assert!(neg.points.is_empty());
        assert!(neg.fit.is_none());
        assert!(neg.x_extent().is_none());
    }

    #[test]
    fn each_side_gets_its_own_line() {
        // Positive half: y = 0.01x, negative half: y = 0.02x - 0.01.
        let x = [-3.0, -2.0, -1.0, 0.0, 1.0, 2.0, 3.0];
        let y = [-0.07, -0.05, -0.03, 0.0, 0.01, 0.02, 0.03];

        let [pos, neg] = fit_both_sides(&x, &y);
        let pos_fit = pos.fit.unwrap();
        let neg_fit = neg.fit.unwrap();

        assert_eq!(pos_fit.n, 3);
        assert!((pos_fit.slope - 0.01).abs() < 1e-10);
        assert!(pos_fit.intercept.abs() < 1e-10);

        assert_eq!(neg_fit.n, 3);
        assert!((neg_fit.slope - 0.02).abs() < 1e-10);
        assert!((neg_fit.intercept + 0.01).abs() < 1e-10);
    }

    #[test]
    fn nan_torque_rows_are_excluded() {
        let segment = fit_segment(&[f64::NAN, 1.0, 2.0], &[9.0, 1.0, 2.0], Side::Positive);
        assert_eq!(segment.points.len(), 2);
        assert_eq!(segment.fit.unwrap().n, 2);
    }

    #[test]
    fn extent_covers_observed_range_only() {
        let segment = fit_segment(&[-5.0, -0.5, -2.0, 4.0], &[1.0, 2.0, 3.0, 4.0], Side::Negative);
        assert_eq!(segment.x_extent(), Some((-5.0, -0.5)));
    }
}
