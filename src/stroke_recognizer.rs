//! Covariance segment recognizer
//!
//! Cuts the stroke into fixed-size runs, keeps splitting the runs that are
//! not straight and fusing neighbours that stay straight together, then
//! turns the surviving segments into a polygon through their pairwise line
//! intersections. Closed polygons that are nearly regular get regularized.

use crate::config::SegmentRecognizerConfig;
use crate::segments::StrokeSegment;
use crate::shapes::{RecognizedShape, ShapeType};
use crate::{Point, Stroke};
use std::f64::consts::PI;

/// Try to recognize `stroke` as a polygonal line.
///
/// Returns `None` when the stroke is too short or does not decompose into
/// well separated straight segments.
pub fn recognize_segments(
    stroke: &Stroke,
    config: &SegmentRecognizerConfig,
) -> Option<RecognizedShape> {
    if stroke.points.len() <= 2 * config.min_nb_points_per_segment {
        return None;
    }

    let mut pass = SplitFuse::new(&stroke.points, config);
    if !pass.is_polygon() {
        return None;
    }
    if !pass.check_minimal_angle() {
        log::debug!("segment recognizer: minimal angle rejected");
        return None;
    }

    let polygon = pass.segments_to_polygon()?;
    if !polygon.iter().all(Point::is_finite) {
        return None;
    }

    let closed = polygon.len() > 2 && polygon.first() == polygon.last();
    let shape_type = match (closed, polygon.len()) {
        (false, 2) => ShapeType::Line,
        (true, 4) => ShapeType::Triangle,
        (true, 5) => ShapeType::Quadrilateral,
        _ => ShapeType::Polygon,
    };
    Some(RecognizedShape::new(shape_type, stroke, polygon))
}

/// Working state of one recognition: the segment list being read and the
/// one being written, swapped after every pass.
struct SplitFuse<'a> {
    points: &'a [Point],
    config: &'a SegmentRecognizerConfig,
    min_points: usize,
    segments: Vec<StrokeSegment>,
    scratch: Vec<StrokeSegment>,
}

impl<'a> SplitFuse<'a> {
    fn new(points: &'a [Point], config: &'a SegmentRecognizerConfig) -> Self {
        Self {
            points,
            config,
            min_points: config.min_nb_points_per_segment.max(1),
            segments: Vec::new(),
            scratch: Vec::new(),
        }
    }

    fn is_line(&self, segment: &StrokeSegment) -> bool {
        segment.is_line(self.config.max_minor_is_line)
    }

    fn is_splittable(&self, segment: &StrokeSegment) -> bool {
        segment.end() > 2 * self.min_points + segment.start()
    }

    fn decrease_segment_size_factor(&self, factor: usize) -> usize {
        (factor / self.config.nb_segments_per_split.max(1)).max(1)
    }

    fn is_polygon(&mut self) -> bool {
        let nb_points = self.points.len();
        let mut factor =
            (nb_points / (self.min_points * self.config.initial_nb_segments.max(1))).max(1);

        self.scratch.clear();
        let mut initial = std::mem::take(&mut self.scratch);
        self.split_into_segments(0, nb_points, factor, &mut initial);
        self.segments = initial;
        factor = self.decrease_segment_size_factor(factor);

        let (mut nb_non_linear, mut splittable) = self.nb_non_linear_segments();
        while nb_non_linear > 0 && splittable {
            if nb_non_linear >= self.config.max_nb_segments {
                log::debug!("segment recognizer: max_nb_segments reached");
                return false;
            }
            self.fuse_split_segments(factor);
            factor = self.decrease_segment_size_factor(factor);
            (nb_non_linear, splittable) = self.nb_non_linear_segments();
        }
        self.fuse_split_segments(factor);

        if nb_non_linear == 0 {
            return true;
        }
        self.fuse_split_final()
    }

    /// Append segments of `min_points * factor` points covering
    /// `start..end`; a remainder shorter than `min_points` joins the last one.
    fn split_into_segments(
        &self,
        start: usize,
        end: usize,
        factor: usize,
        out: &mut Vec<StrokeSegment>,
    ) {
        let increment = self.min_points * factor.max(1);
        let mut current_end = start;
        while current_end < end {
            let segment_start = current_end;
            current_end = (segment_start + increment).min(end);
            if end < current_end + self.min_points {
                current_end = end;
            }
            out.push(StrokeSegment::new(self.points, segment_start, current_end));
        }
    }

    fn fuse_split_segments(&mut self, factor: usize) {
        let current = std::mem::take(&mut self.segments);
        let mut next = std::mem::take(&mut self.scratch);
        next.clear();

        for segment in &current {
            if !self.is_line(segment) {
                if self.is_splittable(segment) {
                    self.split_into_segments(segment.start(), segment.end(), factor, &mut next);
                } else {
                    next.push(*segment);
                }
            } else if let Some(last) = next.last_mut() {
                let fused = last.fuse(segment);
                if fused.is_line(self.config.max_minor_is_line) {
                    *last = fused;
                } else {
                    next.push(*segment);
                }
            } else {
                next.push(*segment);
            }
        }

        self.segments = next;
        self.scratch = current;
    }

    /// Last resort for segments that are still bent: cut each one where its
    /// halves straighten the neighbours they are fused into.
    fn fuse_split_final(&mut self) -> bool {
        let current = std::mem::take(&mut self.segments);
        let mut next: Vec<StrokeSegment> = Vec::with_capacity(current.len());

        let mut ind = 0;
        while ind < current.len() {
            let segment = &current[ind];
            if self.is_line(segment) {
                next.push(*segment);
                ind += 1;
                continue;
            }
            if ind == 0 || ind + 1 == current.len() {
                log::debug!("segment recognizer: first or last segment not linear");
                return false;
            }

            let Some(prev_segment) = next.last().copied() else {
                return false;
            };
            let next_segment = &current[ind + 1];
            let split = (segment.start() + 1..segment.end()).find_map(|split_ind| {
                let fused_prev =
                    prev_segment.fuse(&StrokeSegment::new(self.points, segment.start(), split_ind));
                let fused_next =
                    StrokeSegment::new(self.points, split_ind, segment.end()).fuse(next_segment);
                (self.is_line(&fused_prev) && self.is_line(&fused_next))
                    .then_some((fused_prev, fused_next))
            });

            let Some((fused_prev, fused_next)) = split else {
                log::debug!("segment recognizer: internal segment not linear");
                return false;
            };
            if let Some(last) = next.last_mut() {
                *last = fused_prev;
            }
            next.push(fused_next);
            // the following segment is now part of fused_next
            ind += 2;
        }

        self.segments = next;
        true
    }

    fn nb_non_linear_segments(&self) -> (usize, bool) {
        let mut nb_non_linear = 0;
        let mut splittable = false;
        for segment in &self.segments {
            if !self.is_line(segment) {
                nb_non_linear += 1;
                splittable = splittable || self.is_splittable(segment);
            }
        }
        (nb_non_linear, splittable)
    }

    /// Neighbouring segments must meet at a real corner
    fn check_minimal_angle(&self) -> bool {
        self.segments.windows(2).all(|pair| {
            pair[0].cos_angle_with(&pair[1]).abs() < self.config.maximal_segment_cos_angle
        })
    }

    fn segments_to_polygon(&self) -> Option<Vec<Point>> {
        let first_segment = self.segments.first()?;
        let last_segment = self.segments.last()?;
        let mut first = first_segment.project_onto_line(&self.points[first_segment.start()]);
        let mut last = last_segment.project_onto_line(&self.points[last_segment.end() - 1]);

        let is_closed = first.distance(&last) < self.config.close_polygon_tolerance;
        if is_closed {
            if self.segments.len() < 3 {
                log::debug!("segment recognizer: closed outline with too few sides");
                return None;
            }
            first = Point::new((first.x + last.x) / 2.0, (first.y + last.y) / 2.0);
            last = first;
        }

        let mut polygon = Vec::with_capacity(self.segments.len() + 1);
        polygon.push(first);
        for pair in self.segments.windows(2) {
            polygon.push(pair[0].intersect(&pair[1])?);
        }
        polygon.push(last);

        if is_closed
            && !stabilize_triangles(&polygon)
            && !stabilize_parallelogram(&polygon, self.config)
        {
            if let Some(regular) = regularize_polygon(&polygon, self.config) {
                log::debug!("segment recognizer: regularizing closed polygon");
                polygon = regular;
            }
        }
        Some(polygon)
    }
}

/// Snapping triangles to special triangles is not implemented; always
/// falls through to the next stabilizer.
pub fn stabilize_triangles(polygon: &[Point]) -> bool {
    if polygon.len() != 4 {
        return false;
    }
    log::debug!("segment recognizer: stabilize_triangles not implemented yet");
    false
}

/// Detects quadrilaterals whose opposite sides have matching lengths.
///
/// Snapping them to squares, rectangles or rhombi is not implemented: the
/// outline is reported as handled and left as drawn.
pub fn stabilize_parallelogram(polygon: &[Point], config: &SegmentRecognizerConfig) -> bool {
    if polygon.len() != 5 {
        return false;
    }
    let side_length: Vec<f64> = polygon.windows(2).map(|p| p[0].distance(&p[1])).collect();
    let tolerance = config.regularize_rectangle_rel_length_deviation;
    let matches = |a: f64, b: f64| (b - a).abs() / a < tolerance;
    if matches(side_length[0], side_length[2]) && matches(side_length[1], side_length[3]) {
        log::warn!("segment recognizer: stabilize_parallelogram not implemented yet");
        return true;
    }
    false
}

/// Snap a closed, nearly regular polygon onto the exact regular polygon.
///
/// `polygon` repeats its first vertex at the end. Vertices are taken in
/// polar form around their centroid; when every vertex lies within
/// `regularize_angle_deviation` of its ideal direction and within
/// `regularize_rel_radius_deviation` of the mean radius, the regular
/// polygon at the mean radius is returned, keeping vertex 0's direction
/// and the drawing orientation.
pub fn regularize_polygon(
    polygon: &[Point],
    config: &SegmentRecognizerConfig,
) -> Option<Vec<Point>> {
    if polygon.len() < 4 || polygon.first() != polygon.last() {
        return None;
    }
    let vertices = &polygon[..polygon.len() - 1];
    let n = vertices.len() as f64;

    let cx = vertices.iter().map(|p| p.x).sum::<f64>() / n;
    let cy = vertices.iter().map(|p| p.y).sum::<f64>() / n;
    let polar: Vec<(f64, f64)> = vertices
        .iter()
        .map(|p| ((p.x - cx).hypot(p.y - cy), (p.y - cy).atan2(p.x - cx)))
        .collect();
    let mean_radius = polar.iter().map(|(r, _)| r).sum::<f64>() / n;
    if !(mean_radius > 0.0) {
        return None;
    }

    let orientation = if signed_area(vertices) >= 0.0 { 1.0 } else { -1.0 };
    let step = orientation * 2.0 * PI / n;
    let phi0 = polar[0].1;

    let is_regular = polar.iter().enumerate().all(|(ind, &(r, phi))| {
        let deviation = wrap_angle(phi - phi0 - step * ind as f64).abs();
        deviation < config.regularize_angle_deviation
            && ((r - mean_radius) / mean_radius).abs() < config.regularize_rel_radius_deviation
    });
    if !is_regular {
        return None;
    }

    let mut regular: Vec<Point> = (0..vertices.len())
        .map(|ind| {
            let phi = phi0 + step * ind as f64;
            Point::new(cx + mean_radius * phi.cos(), cy + mean_radius * phi.sin())
        })
        .collect();
    regular.push(regular[0]);
    Some(regular)
}

/// Shoelace area, positive for counter-clockwise vertices in a y-up frame
fn signed_area(vertices: &[Point]) -> f64 {
    let n = vertices.len();
    (0..n)
        .map(|i| {
            let (a, b) = (&vertices[i], &vertices[(i + 1) % n]);
            a.x * b.y - b.x * a.y
        })
        .sum::<f64>()
        / 2.0
}

/// Wrap an angle into `[-pi, pi)`
fn wrap_angle(angle: f64) -> f64 {
    (angle + PI).rem_euclid(2.0 * PI) - PI
}
