//! Circle detection
//!
//! Scores how far a stroke strays from the circle implied by its inertia
//! tensor, and draws the replacement circle as a closed polyline.

use crate::config::InertiaRecognizerConfig;
use crate::inertia::Inertia;
use crate::shapes::{RecognizedShape, ShapeType};
use crate::{Point, Stroke};
use std::f64::consts::PI;

/// Mean radial deviation of the stroke from the fitted circle, relative to
/// its radius. 0 for a perfect circle, and 0 as well for a degenerate
/// stroke, so callers must gate on `det` too.
pub fn score_circle(points: &[Point], inertia: &Inertia) -> f64 {
    let r0 = inertia.rad();
    let divisor = inertia.mass() * r0;
    if divisor == 0.0 {
        return 0.0;
    }

    let x0 = inertia.center_x();
    let y0 = inertia.center_y();
    let sum: f64 = points
        .windows(2)
        .map(|pair| {
            let (p1, p2) = (&pair[0], &pair[1]);
            let dm = p1.distance(p2);
            let delta_r = (p1.x - x0).hypot(p1.y - y0) - r0;
            dm * delta_r.abs()
        })
        .sum();

    sum / divisor
}

/// Whole-stroke circle test
pub fn is_circle(points: &[Point], inertia: &Inertia, config: &InertiaRecognizerConfig) -> bool {
    if !(inertia.det() > config.circle_min_det) {
        return false;
    }
    let score = score_circle(points, inertia);
    log::debug!("circle score {:.4}", score);
    score < config.circle_max_score
}

/// Closed polyline approximating a circle, one vertex per two length units
/// and never fewer than `min_points` sides
pub fn make_circle_points(center: Point, radius: f64, min_points: usize) -> Vec<Point> {
    let npts = ((2.0 * radius) as usize).max(min_points).max(1);
    (0..=npts)
        .map(|i| {
            let a = 2.0 * PI * i as f64 / npts as f64;
            Point::new(center.x + radius * a.cos(), center.y + radius * a.sin())
        })
        .collect()
}

/// Replace the stroke by a circle when it is round enough
pub fn recognize_circle(
    stroke: &Stroke,
    config: &InertiaRecognizerConfig,
) -> Option<RecognizedShape> {
    let inertia = Inertia::calc(&stroke.points, 0, stroke.points.len());
    if !is_circle(&stroke.points, &inertia, config) {
        return None;
    }
    let center = Point::new(inertia.center_x(), inertia.center_y());
    let vertices = make_circle_points(center, inertia.rad(), config.circle_min_points);
    Some(RecognizedShape::new(ShapeType::Circle, stroke, vertices))
}
