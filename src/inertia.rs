//! Moments of inertia of a polyline
//!
//! Each point pair contributes its length as mass, placed at the first point
//! of the pair. The normalized second moments give the principal axis of a
//! run of points, and `det` tells how round (1) or flat (0) it is.

use crate::Point;
use std::ops::Add;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Inertia {
    mass: f64,
    sx: f64,
    sy: f64,
    sxx: f64,
    sxy: f64,
    syy: f64,
}

impl Inertia {
    /// Moments of the point pairs `(i, i + 1)` for `i` in `start..end - 1`
    pub fn calc(points: &[Point], start: usize, end: usize) -> Self {
        let mut inertia = Self::default();
        for i in start..end.saturating_sub(1) {
            inertia.increase(&points[i], &points[i + 1], 1.0);
        }
        inertia
    }

    /// Add (`coef = 1`) or remove (`coef = -1`) the pair `p1`-`p2`.
    ///
    /// Only `p1` carries the pair's mass.
    pub fn increase(&mut self, p1: &Point, p2: &Point, coef: f64) {
        let dm = coef * p1.distance(p2);
        self.mass += dm;
        self.sx += dm * p1.x;
        self.sy += dm * p1.y;
        self.sxx += dm * p1.x * p1.x;
        self.syy += dm * p1.y * p1.y;
        self.sxy += dm * p1.x * p1.y;
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn center_x(&self) -> f64 {
        if self.mass <= 0.0 {
            return 0.0;
        }
        self.sx / self.mass
    }

    pub fn center_y(&self) -> f64 {
        if self.mass <= 0.0 {
            return 0.0;
        }
        self.sy / self.mass
    }

    pub fn xx(&self) -> f64 {
        if self.mass <= 0.0 {
            return 0.0;
        }
        (self.sxx - self.sx * self.sx / self.mass) / self.mass
    }

    pub fn xy(&self) -> f64 {
        if self.mass <= 0.0 {
            return 0.0;
        }
        (self.sxy - self.sx * self.sy / self.mass) / self.mass
    }

    pub fn yy(&self) -> f64 {
        if self.mass <= 0.0 {
            return 0.0;
        }
        (self.syy - self.sy * self.sy / self.mass) / self.mass
    }

    /// Radius of gyration
    pub fn rad(&self) -> f64 {
        let trace = self.xx() + self.yy();
        if trace <= 0.0 {
            return 0.0;
        }
        trace.sqrt()
    }

    /// Normalized determinant: 1 for a circle, 0 for a straight line
    pub fn det(&self) -> f64 {
        if self.mass <= 0.0 {
            return 0.0;
        }
        let ixx = self.xx();
        let iyy = self.yy();
        let ixy = self.xy();
        let trace = ixx + iyy;
        if trace <= 0.0 {
            return 0.0;
        }
        4.0 * (ixx * iyy - ixy * ixy) / trace / trace
    }
}

impl Add for Inertia {
    type Output = Inertia;

    fn add(self, other: Inertia) -> Inertia {
        Inertia {
            mass: self.mass + other.mass,
            sx: self.sx + other.sx,
            sy: self.sy + other.sy,
            sxx: self.sxx + other.sxx,
            sxy: self.sxy + other.sxy,
            syy: self.syy + other.syy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn wobbly(n: usize) -> Vec<Point> {
        (0..n)
            .map(|i| {
                let t = i as f64;
                Point::new(t * 3.0 + (t * 0.7).sin() * 5.0, (t * 0.3).cos() * 20.0 + t)
            })
            .collect()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * (1.0 + a.abs().max(b.abs()))
    }

    #[test]
    fn test_additivity_over_shared_point() {
        let points = wobbly(30);
        let whole = Inertia::calc(&points, 2, 27);
        for m in 2..27 {
            let sum = Inertia::calc(&points, 2, m + 1) + Inertia::calc(&points, m, 27);
            assert!(close(whole.mass, sum.mass), "mass at split {}", m);
            assert!(close(whole.sx, sum.sx));
            assert!(close(whole.sy, sum.sy));
            assert!(close(whole.sxx, sum.sxx));
            assert!(close(whole.sxy, sum.sxy));
            assert!(close(whole.syy, sum.syy));
        }
    }

    #[test]
    fn test_increase_then_decrease_restores() {
        let points = wobbly(10);
        let base = Inertia::calc(&points, 0, 6);
        let mut moved = base;
        moved.increase(&points[5], &points[6], 1.0);
        assert_eq!(moved, Inertia::calc(&points, 0, 7));
        moved.increase(&points[5], &points[6], -1.0);
        assert!(close(moved.mass(), base.mass()));
        assert!(close(moved.xx(), base.xx()));
    }

    #[test]
    fn test_degenerate_input_is_zero() {
        let points = vec![Point::new(4.0, -2.0); 8];
        let inertia = Inertia::calc(&points, 0, points.len());
        assert_eq!(inertia.mass(), 0.0);
        assert_eq!(inertia.rad(), 0.0);
        assert_eq!(inertia.det(), 0.0);
        assert_eq!(inertia.xx(), 0.0);
        assert_eq!(inertia.xy(), 0.0);
        assert_eq!(inertia.yy(), 0.0);
        assert_eq!(inertia.center_x(), 0.0);

        let empty = Inertia::calc(&points, 3, 3);
        assert_eq!(empty.det(), 0.0);
        assert_eq!(empty.rad(), 0.0);
    }

    #[test]
    fn test_straight_line_has_zero_det() {
        let points: Vec<Point> = (0..20).map(|i| Point::new(i as f64, 2.0 * i as f64)).collect();
        let inertia = Inertia::calc(&points, 0, points.len());
        assert!(inertia.det().abs() < 1e-9);
        assert!(inertia.rad() > 0.0);
    }

    #[test]
    fn test_circle_has_unit_det() {
        let n = 24;
        let points: Vec<Point> = (0..=n)
            .map(|i| {
                let a = 2.0 * PI * i as f64 / n as f64;
                Point::new(50.0 * a.cos(), 50.0 * a.sin())
            })
            .collect();
        let inertia = Inertia::calc(&points, 0, points.len());
        assert!((inertia.det() - 1.0).abs() < 1e-9);
        assert!((inertia.rad() - 50.0).abs() < 1e-9);
        assert!(inertia.center_x().abs() < 1e-9);
        assert!(inertia.center_y().abs() < 1e-9);
    }
}
