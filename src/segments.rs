//! Covariance segments
//!
//! A `StrokeSegment` keeps the running sums of a point run, so two adjacent
//! segments can be fused in constant time. Its principal axis comes from
//! the closed-form eigen decomposition of the 2x2 covariance matrix.

use crate::Point;
use nalgebra::Vector2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeSegment {
    start: usize,
    end: usize,
    /// Sums of x², xy and y²
    cov_accumulator: [f64; 3],
    /// Sums of x and y
    mean_accumulator: [f64; 2],
    center: Vector2<f64>,
    main_axis: Vector2<f64>,
    minor: f64,
    major: f64,
}

impl StrokeSegment {
    /// Segment over `points[start..end]`; `start < end`.
    pub fn new(points: &[Point], start: usize, end: usize) -> Self {
        debug_assert!(start < end, "empty stroke segment {}..{}", start, end);
        let mut cov_accumulator = [0.0; 3];
        let mut mean_accumulator = [0.0; 2];
        for p in &points[start..end] {
            mean_accumulator[0] += p.x;
            mean_accumulator[1] += p.y;
            cov_accumulator[0] += p.x * p.x;
            cov_accumulator[1] += p.x * p.y;
            cov_accumulator[2] += p.y * p.y;
        }
        Self::from_sums(start, end, cov_accumulator, mean_accumulator)
    }

    /// Segment covering `self` followed by `next`, from their sums alone
    pub fn fuse(&self, next: &StrokeSegment) -> Self {
        debug_assert_eq!(self.end, next.start);
        let mut cov_accumulator = self.cov_accumulator;
        for (acc, other) in cov_accumulator.iter_mut().zip(next.cov_accumulator) {
            *acc += other;
        }
        let mut mean_accumulator = self.mean_accumulator;
        for (acc, other) in mean_accumulator.iter_mut().zip(next.mean_accumulator) {
            *acc += other;
        }
        Self::from_sums(self.start, next.end, cov_accumulator, mean_accumulator)
    }

    fn from_sums(
        start: usize,
        end: usize,
        cov_accumulator: [f64; 3],
        mean_accumulator: [f64; 2],
    ) -> Self {
        let inv_weight = 1.0 / (end - start) as f64;
        let sq_inv_weight = inv_weight * inv_weight;
        let center = Vector2::new(
            mean_accumulator[0] * inv_weight,
            mean_accumulator[1] * inv_weight,
        );
        let cov = [
            cov_accumulator[0] * inv_weight
                - mean_accumulator[0] * mean_accumulator[0] * sq_inv_weight,
            cov_accumulator[1] * inv_weight
                - mean_accumulator[0] * mean_accumulator[1] * sq_inv_weight,
            cov_accumulator[2] * inv_weight
                - mean_accumulator[1] * mean_accumulator[1] * sq_inv_weight,
        ];

        let half_trace = (cov[0] + cov[2]) / 2.0;
        let shift = (half_trace * half_trace - cov[0] * cov[2] + cov[1] * cov[1])
            .max(0.0)
            .sqrt();
        let minor = (half_trace - shift).max(f64::EPSILON);
        let major = (half_trace + shift).max(minor);

        // Two expressions of the same eigenvector; each vanishes on one axis.
        let from_row = Vector2::new(half_trace + shift - cov[2], cov[1]);
        let from_col = Vector2::new(cov[1], half_trace + shift - cov[0]);
        let axis = if from_row.norm() >= from_col.norm() {
            from_row
        } else {
            from_col
        };
        let main_axis = axis.try_normalize(0.0).unwrap_or_else(Vector2::x);

        Self {
            start,
            end,
            cov_accumulator,
            mean_accumulator,
            center,
            main_axis,
            minor,
            major,
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    /// One past the last point of the segment
    pub fn end(&self) -> usize {
        self.end
    }

    pub fn mean(&self) -> Point {
        Point::new(self.center.x, self.center.y)
    }

    /// Unit vector along the principal axis
    pub fn axis(&self) -> Vector2<f64> {
        self.main_axis
    }

    pub fn minor(&self) -> f64 {
        self.minor
    }

    pub fn major(&self) -> f64 {
        self.major
    }

    pub fn is_line(&self, max_minor_is_line: f64) -> bool {
        self.minor < max_minor_is_line
    }

    pub fn cos_angle_with(&self, other: &StrokeSegment) -> f64 {
        self.main_axis.dot(&other.main_axis)
    }

    /// Orthogonal projection of `point` onto the segment's line
    pub fn project_onto_line(&self, point: &Point) -> Point {
        let offset = Vector2::new(point.x - self.center.x, point.y - self.center.y);
        let projected = self.center + self.main_axis * offset.dot(&self.main_axis);
        Point::new(projected.x, projected.y)
    }

    /// Intersection of the two segments' lines, `None` when they are parallel
    pub fn intersect(&self, other: &StrokeSegment) -> Option<Point> {
        let h = self.center - other.center;
        let denom = other.main_axis.perp(&self.main_axis);
        if denom.abs() < f64::EPSILON {
            return None;
        }
        let t_other = h.perp(&self.main_axis) / denom;
        let p = other.center + other.main_axis * t_other;
        Some(Point::new(p.x, p.y))
    }
}
