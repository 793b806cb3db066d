//! Shape synthesis
//!
//! Builds clean replacement strokes (rectangles, closed polygons, lines and
//! open polylines) from the segments found by the polygonal decomposition.

use crate::config::InertiaRecognizerConfig;
use crate::polygonal::RecoSegment;
use crate::{Point, Stroke};
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

/// Types of shapes that can be recognized
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ShapeType {
    Line,
    Rectangle,
    Triangle,
    Quadrilateral,
    Polygon,
    Circle,
}

/// Bounding box of a shape
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShapeBounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
}

/// A recognized shape and the stroke that replaces the original one
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognizedShape {
    pub shape_type: ShapeType,
    pub bounds: ShapeBounds,
    pub stroke: Stroke,
}

impl RecognizedShape {
    /// Wrap `vertices` in a new stroke styled like `template`
    pub fn new(shape_type: ShapeType, template: &Stroke, vertices: Vec<Point>) -> Self {
        Self::with_rotation(shape_type, template, vertices, 0.0)
    }

    pub fn with_rotation(
        shape_type: ShapeType,
        template: &Stroke,
        vertices: Vec<Point>,
        rotation: f64,
    ) -> Self {
        let points: Vec<Point> = vertices.iter().map(|p| Point::new(p.x, p.y)).collect();
        let mut bounds = calculate_bounds(&points);
        bounds.rotation = rotation;
        Self {
            shape_type,
            bounds,
            stroke: Stroke::with_style_of(template, points),
        }
    }

    /// True when every coordinate of the replacement stroke is finite
    pub fn is_finite(&self) -> bool {
        self.stroke.points.iter().all(Point::is_finite)
    }

    pub fn is_closed(&self) -> bool {
        match (self.stroke.points.first(), self.stroke.points.last()) {
            (Some(first), Some(last)) => self.stroke.points.len() > 2 && first == last,
            _ => false,
        }
    }
}

/// Calculate bounding box of points
pub fn calculate_bounds(points: &[Point]) -> ShapeBounds {
    let mut min_x = f64::MAX;
    let mut min_y = f64::MAX;
    let mut max_x = f64::MIN;
    let mut max_y = f64::MIN;

    for p in points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }

    if points.is_empty() {
        return ShapeBounds {
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            rotation: 0.0,
        };
    }

    ShapeBounds {
        x: min_x,
        y: min_y,
        width: max_x - min_x,
        height: max_y - min_y,
        rotation: 0.0,
    }
}

/// Test if four segments form a rectangle.
///
/// Consecutive sides must be roughly perpendicular and meet roughly at
/// their ends. The result has the averaged slant, snapped to the axes
/// when close, and repeats its first vertex to close the outline.
pub fn try_rectangle(
    segments: &[RecoSegment],
    template: &Stroke,
    config: &InertiaRecognizerConfig,
) -> Option<RecognizedShape> {
    if segments.len() != 4 || segments[0].start != 0 {
        return None;
    }

    let mut sides = segments.to_vec();
    let mut avg_angle = 0.0;
    for i in 0..4 {
        let r1 = &sides[i];
        let r2 = &sides[(i + 1) % 4];
        if ((r1.angle - r2.angle).abs() - FRAC_PI_2).abs() > config.rectangle_angle_tolerance {
            return None;
        }
        avg_angle += r1.angle;
        if r2.angle > r1.angle {
            avg_angle += (i + 1) as f64 * FRAC_PI_2;
        } else {
            avg_angle -= (i + 1) as f64 * FRAC_PI_2;
        }

        // r1 points away from r2 rather than towards it
        let reversed = (r1.p2.x - r1.p1.x) * (r2.center.x - r1.center.x)
            + (r1.p2.y - r1.p1.y) * (r2.center.y - r1.center.y)
            < 0.0;
        sides[i].reversed = reversed;
    }

    for i in 0..4 {
        let r1 = &sides[i];
        let r2 = &sides[(i + 1) % 4];
        let gap = r1.head().distance(&r2.tail());
        if gap > config.rectangle_linear_tolerance * (r1.radius + r2.radius) {
            return None;
        }
    }

    avg_angle /= 4.0;
    if avg_angle.abs() < config.slant_tolerance {
        avg_angle = 0.0;
    }
    if avg_angle.abs() > FRAC_PI_2 - config.slant_tolerance {
        avg_angle = FRAC_PI_2;
    }

    for (i, side) in sides.iter_mut().enumerate() {
        side.angle = avg_angle + i as f64 * FRAC_PI_2;
    }

    let mut vertices = corners(&sides)?;
    vertices.push(vertices[0]);
    log::debug!("rectangle at slant {:.3}", avg_angle);
    Some(RecognizedShape::with_rotation(
        ShapeType::Rectangle,
        template,
        vertices,
        avg_angle,
    ))
}

/// Test if the segments form a closed polygon whose sides meet at their
/// pairwise intersections.
pub fn try_closed_polygon(
    segments: &[RecoSegment],
    nsides: usize,
    template: &Stroke,
    config: &InertiaRecognizerConfig,
) -> Option<RecognizedShape> {
    if nsides < 3 || segments.len() != nsides || segments[0].start != 0 {
        return None;
    }

    let corner_points = corners(segments)?;
    let mut sides = segments.to_vec();
    for (side, corner) in sides.iter_mut().zip(&corner_points) {
        // a side is reversed when its first end is the one touching the next corner
        side.reversed = corner.distance(&side.p1) < corner.distance(&side.p2);
    }

    for i in 0..nsides {
        let r1 = &sides[i];
        let r2 = &sides[(i + 1) % nsides];
        let corner = &corner_points[i];
        let dist = r1.head().distance(corner) + r2.tail().distance(corner);
        if dist > config.polygon_linear_tolerance * (r1.radius + r2.radius) {
            return None;
        }
    }

    let shape_type = match nsides {
        3 => ShapeType::Triangle,
        4 => ShapeType::Quadrilateral,
        _ => ShapeType::Polygon,
    };
    let mut vertices = corner_points;
    vertices.push(vertices[0]);
    Some(RecognizedShape::new(shape_type, template, vertices))
}

/// Straight line for a single-segment stroke.
///
/// Nearly horizontal or vertical lines are snapped through the segment
/// center; any other line keeps the stroke's own first and last points.
pub fn make_line(
    segment: &RecoSegment,
    det: f64,
    points: &[Point],
    template: &Stroke,
    config: &InertiaRecognizerConfig,
) -> Option<RecognizedShape> {
    if !(det < config.line_max_det) {
        return None;
    }

    let (p1, p2, rotation) = if segment.angle.abs() < config.slant_tolerance {
        (
            Point::new(segment.p1.x, segment.center.y),
            Point::new(segment.p2.x, segment.center.y),
            0.0,
        )
    } else if segment.angle.abs() > FRAC_PI_2 - config.slant_tolerance {
        let angle = if segment.angle > 0.0 { FRAC_PI_2 } else { -FRAC_PI_2 };
        (
            Point::new(segment.center.x, segment.p1.y),
            Point::new(segment.center.x, segment.p2.y),
            angle,
        )
    } else {
        let first = points.first()?;
        let last = points.last()?;
        (*first, *last, segment.angle)
    };

    Some(RecognizedShape::with_rotation(
        ShapeType::Line,
        template,
        vec![p1, p2],
        rotation,
    ))
}

/// Open polyline through the corners of a decomposition.
///
/// Starts and ends at the stroke's own endpoints. A corner is the meeting
/// point of two neighbouring sides only when they turn by more than the
/// slant tolerance and their lines cross within reach of both sides;
/// otherwise it falls back to the break point they share.
pub fn make_polygon(
    segments: &[RecoSegment],
    points: &[Point],
    template: &Stroke,
    config: &InertiaRecognizerConfig,
) -> Option<RecognizedShape> {
    let first = points.first()?;
    let last = points.last()?;
    let min_turn = config.slant_tolerance.sin();
    let mut vertices = Vec::with_capacity(segments.len() + 1);
    vertices.push(*first);
    for pair in segments.windows(2) {
        let (r1, r2) = (&pair[0], &pair[1]);
        let shared = *points.get(r1.end)?;
        let turns = (r2.angle - r1.angle).sin().abs() >= min_turn;
        let corner = match r1.edge_intersection(r2) {
            Some(corner) if turns && corner.distance(&shared) <= r1.radius + r2.radius => corner,
            _ => {
                log::debug!("no sharp corner between sides at {}, using break point", r1.end);
                shared
            }
        };
        vertices.push(corner);
    }
    vertices.push(*last);
    Some(RecognizedShape::new(ShapeType::Polygon, template, vertices))
}

/// Intersections of every side with the next one, wrapping around
fn corners(sides: &[RecoSegment]) -> Option<Vec<Point>> {
    let n = sides.len();
    (0..n)
        .map(|i| sides[i].edge_intersection(&sides[(i + 1) % n]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    /// Interior angle at `b` of the path `a`-`b`-`c`, in `[0, pi]`
    fn interior_angle(a: &Point, b: &Point, c: &Point) -> f64 {
        let a1 = (a.y - b.y).atan2(a.x - b.x);
        let a2 = (c.y - b.y).atan2(c.x - b.x);
        let diff = (a1 - a2).abs() % (2.0 * PI);
        if diff > PI {
            2.0 * PI - diff
        } else {
            diff
        }
    }

    fn template() -> Stroke {
        Stroke {
            id: "orig".to_string(),
            points: vec![],
            color: "#3366ff".to_string(),
            width: 2.5,
            tool: "pen".to_string(),
            fill: None,
        }
    }

    fn side(start: usize, end: usize, from: (f64, f64), to: (f64, f64)) -> RecoSegment {
        let center = Point::new((from.0 + to.0) / 2.0, (from.1 + to.1) / 2.0);
        let mut angle = (to.1 - from.1).atan2(to.0 - from.0);
        // principal axes live in (-pi/2, pi/2]
        if angle > FRAC_PI_2 {
            angle -= PI;
        } else if angle <= -FRAC_PI_2 {
            angle += PI;
        }
        let (sin, cos) = angle.sin_cos();
        let half = (to.0 - from.0).hypot(to.1 - from.1) / 2.0;
        RecoSegment {
            start,
            end,
            center,
            angle,
            radius: half,
            p1: Point::new(center.x - half * cos, center.y - half * sin),
            p2: Point::new(center.x + half * cos, center.y + half * sin),
            reversed: false,
        }
    }

    fn rectangle_sides(w: f64, h: f64) -> Vec<RecoSegment> {
        vec![
            side(0, 10, (0.0, 0.0), (w, 0.0)),
            side(10, 20, (w, 0.0), (w, h)),
            side(20, 30, (w, h), (0.0, h)),
            side(30, 40, (0.0, h), (0.0, 0.0)),
        ]
    }

    #[test]
    fn test_rectangle_round_trip() {
        let config = InertiaRecognizerConfig::default();
        let (w, h) = (120.0, 45.0);
        let sides = rectangle_sides(w, h);
        let shape = try_rectangle(&sides, &template(), &config).unwrap();
        assert_eq!(shape.shape_type, ShapeType::Rectangle);
        assert!(shape.is_closed());

        let pts = &shape.stroke.points;
        assert_eq!(pts.len(), 5);
        let lengths: Vec<f64> = pts.windows(2).map(|p| p[0].distance(&p[1])).collect();
        let tol = config.rectangle_linear_tolerance;
        assert!((lengths[0] - h).abs() < tol);
        assert!((lengths[1] - w).abs() < tol);
        assert!((lengths[2] - h).abs() < tol);
        assert!((lengths[3] - w).abs() < tol);
        for i in 0..4 {
            let angle = interior_angle(&pts[(i + 3) % 4], &pts[i], &pts[(i + 1) % 4]);
            assert!((angle - FRAC_PI_2).abs() < config.rectangle_angle_tolerance);
        }

        // input segments stay untouched
        assert_eq!(sides, rectangle_sides(w, h));
    }

    #[test]
    fn test_rectangle_copies_style() {
        let shape = try_rectangle(
            &rectangle_sides(50.0, 50.0),
            &template(),
            &InertiaRecognizerConfig::default(),
        )
        .unwrap();
        assert_eq!(shape.stroke.color, "#3366ff");
        assert_eq!(shape.stroke.width, 2.5);
        assert_ne!(shape.stroke.id, "orig");
        assert!((shape.bounds.width - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_rectangle_rejects_skewed_corner() {
        let mut sides = rectangle_sides(100.0, 100.0);
        sides[1] = side(10, 20, (100.0, 0.0), (160.0, 100.0));
        assert!(try_rectangle(&sides, &template(), &InertiaRecognizerConfig::default()).is_none());
    }

    #[test]
    fn test_rectangle_rejects_open_gap() {
        let mut sides = rectangle_sides(100.0, 100.0);
        sides[2] = side(20, 30, (100.0, 100.0), (60.0, 100.0));
        sides[3] = side(30, 40, (0.0, 160.0), (0.0, 40.0));
        assert!(try_rectangle(&sides, &template(), &InertiaRecognizerConfig::default()).is_none());
    }

    #[test]
    fn test_rectangle_needs_four_sides() {
        let sides = rectangle_sides(100.0, 50.0);
        assert!(try_rectangle(&sides[..3], &template(), &InertiaRecognizerConfig::default())
            .is_none());
    }

    #[test]
    fn test_closed_triangle() {
        let sides = vec![
            side(0, 10, (0.0, 0.0), (100.0, 0.0)),
            side(10, 20, (100.0, 0.0), (50.0, 80.0)),
            side(20, 30, (50.0, 80.0), (0.0, 0.0)),
        ];
        let shape = try_closed_polygon(&sides, 3, &template(), &InertiaRecognizerConfig::default())
            .unwrap();
        assert_eq!(shape.shape_type, ShapeType::Triangle);
        let pts = &shape.stroke.points;
        assert_eq!(pts.len(), 4);
        assert!(pts[0].distance(&Point::new(100.0, 0.0)) < 1e-6);
        assert!(pts[1].distance(&Point::new(50.0, 80.0)) < 1e-6);
        assert!(pts[2].distance(&Point::new(0.0, 0.0)) < 1e-6);
    }

    #[test]
    fn test_open_triangle_is_not_closed_polygon() {
        let sides = vec![
            side(0, 10, (0.0, 0.0), (100.0, 0.0)),
            side(10, 20, (100.0, 0.0), (50.0, 80.0)),
            side(20, 30, (50.0, 80.0), (40.0, 64.0)),
        ];
        assert!(
            try_closed_polygon(&sides, 3, &template(), &InertiaRecognizerConfig::default())
                .is_none()
        );
    }

    #[test]
    fn test_line_snaps_horizontal() {
        let config = InertiaRecognizerConfig::default();
        let seg = side(0, 1, (0.0, 10.0), (100.0, 13.0));
        let points = vec![Point::new(0.0, 10.0), Point::new(100.0, 13.0)];
        let shape = make_line(&seg, 0.0, &points, &template(), &config).unwrap();
        let pts = &shape.stroke.points;
        assert_eq!(pts[0].y, pts[1].y);
        assert_eq!(pts[0].y, seg.center.y);
    }

    #[test]
    fn test_line_snaps_vertical() {
        let config = InertiaRecognizerConfig::default();
        let seg = side(0, 1, (20.0, 0.0), (22.0, 100.0));
        let points = vec![Point::new(20.0, 0.0), Point::new(22.0, 100.0)];
        let shape = make_line(&seg, 0.0, &points, &template(), &config).unwrap();
        let pts = &shape.stroke.points;
        assert_eq!(pts[0].x, pts[1].x);
        assert_eq!(shape.bounds.rotation, FRAC_PI_2);
    }

    #[test]
    fn test_slanted_line_keeps_stroke_endpoints() {
        let config = InertiaRecognizerConfig::default();
        let seg = side(0, 1, (0.0, 0.0), (100.0, 60.0));
        let points = vec![Point::new(0.5, -0.5), Point::new(50.0, 30.0), Point::new(99.0, 61.0)];
        let shape = make_line(&seg, 0.0, &points, &template(), &config).unwrap();
        assert_eq!(shape.stroke.points, vec![Point::new(0.5, -0.5), Point::new(99.0, 61.0)]);
        assert!(make_line(&seg, 0.5, &points, &template(), &config).is_none());
    }

    #[test]
    fn test_open_polygon_through_corners() {
        let sides = vec![
            side(0, 10, (0.0, 0.0), (50.0, 0.0)),
            side(10, 20, (50.0, 0.0), (50.0, 50.0)),
        ];
        let points: Vec<Point> = (0..=20)
            .map(|i| {
                if i <= 10 {
                    Point::new(i as f64 * 5.0, 0.0)
                } else {
                    Point::new(50.0, (i - 10) as f64 * 5.0)
                }
            })
            .collect();
        let shape =
            make_polygon(&sides, &points, &template(), &InertiaRecognizerConfig::default())
                .unwrap();
        assert_eq!(shape.shape_type, ShapeType::Polygon);
        assert!(!shape.is_closed());
        let pts = &shape.stroke.points;
        assert_eq!(pts.len(), 3);
        assert!(pts[1].distance(&Point::new(50.0, 0.0)) < 1e-9);
    }

    #[test]
    fn test_open_polygon_keeps_break_point_on_hairpin() {
        let sides = vec![
            side(0, 10, (0.0, 0.0), (50.0, 0.0)),
            side(10, 20, (50.0, 2.0), (0.0, 3.0)),
        ];
        let mut points: Vec<Point> = (0..=10).map(|i| Point::new(i as f64 * 5.0, 0.0)).collect();
        points[10] = Point::new(50.0, 1.0);
        points.extend((1..=10).map(|i| Point::new(50.0 - i as f64 * 5.0, 2.0 + i as f64 * 0.1)));

        let shape =
            make_polygon(&sides, &points, &template(), &InertiaRecognizerConfig::default())
                .unwrap();
        assert_eq!(shape.stroke.points[1], Point::new(50.0, 1.0));
        assert!(shape.bounds.width <= 50.0);
    }

    #[test]
    fn test_calculate_bounds() {
        let points = vec![
            Point::new(10.0, 20.0),
            Point::new(100.0, 200.0),
            Point::new(50.0, 100.0),
        ];

        let bounds = calculate_bounds(&points);
        assert_eq!(bounds.x, 10.0);
        assert_eq!(bounds.y, 20.0);
        assert_eq!(bounds.width, 90.0);
        assert_eq!(bounds.height, 180.0);
    }
}
