//! Polygonal decomposition of a stroke
//!
//! Splits a point range into at most `max_sides` straight runs, judged by
//! the inertia `det` of each run, then nudges the break points to make the
//! runs as straight as possible.

use crate::inertia::Inertia;
use crate::Point;

/// Straight runs covering a point range.
///
/// Run `i` spans points `breaks[i]..=breaks[i + 1]`; neighbouring runs share
/// their break point.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygonal {
    pub breaks: Vec<usize>,
    pub inertias: Vec<Inertia>,
}

impl Polygonal {
    pub fn sides(&self) -> usize {
        self.inertias.len()
    }

    /// Fitted geometry of every run
    pub fn segments(&self, points: &[Point]) -> Vec<RecoSegment> {
        self.inertias
            .iter()
            .enumerate()
            .map(|(i, inertia)| {
                RecoSegment::from_inertia(points, self.breaks[i], self.breaks[i + 1], inertia)
            })
            .collect()
    }
}

/// Find a polygonal line with at most `max_sides` sides through
/// `points[start..=end]`.
///
/// `end` must be a valid index into `points`. Returns `None` when no
/// decomposition keeps every run's `det` below `max_det`.
pub fn find_polygonal(
    points: &[Point],
    start: usize,
    end: usize,
    max_sides: usize,
    max_det: f64,
) -> Option<Polygonal> {
    if end == start || max_sides == 0 {
        return None;
    }

    // too small for a polygon
    let nsides = if end - start < 5 { 1 } else { max_sides };

    // look for a linear piece that's big enough
    let (mut i1, mut i2, mut s) = (0..nsides).find_map(|k| {
        let i1 = start + (k * (end - start)) / nsides;
        let i2 = start + ((k + 1) * (end - start)) / nsides;
        let s = Inertia::calc(points, i1, i2);
        (s.det() < max_det).then_some((i1, i2, s))
    })?;

    // grow it one point at a time towards whichever side stays straighter
    loop {
        let mut s1 = s;
        let det1 = if i1 > start {
            s1.increase(&points[i1 - 1], &points[i1], 1.0);
            s1.det()
        } else {
            1.0
        };

        let mut s2 = s;
        let det2 = if i2 < end {
            s2.increase(&points[i2], &points[i2 + 1], 1.0);
            s2.det()
        } else {
            1.0
        };

        if det1 < det2 && det1 < max_det {
            i1 -= 1;
            s = s1;
        } else if det2 < det1 && det2 < max_det {
            i2 += 1;
            s = s2;
        } else {
            break;
        }
    }

    let mut result = if i1 > start {
        let budget = nsides.checked_sub(if i2 == end { 1 } else { 2 })?;
        find_polygonal(points, start, i1, budget, max_det)?
    } else {
        Polygonal {
            breaks: vec![start],
            inertias: Vec::new(),
        }
    };

    result.breaks.push(i2);
    result.inertias.push(s);

    if i2 < end {
        let budget = nsides.checked_sub(result.sides())?;
        let right = find_polygonal(points, i2, end, budget, max_det)?;
        result.breaks.extend_from_slice(&right.breaks[1..]);
        result.inertias.extend(right.inertias);
    }

    Some(result)
}

/// Move each interior break point while that lowers the summed squared
/// `det` of the two runs it separates.
///
/// One greedy pass from left to right; a break is only tried to the right
/// when moving it left did not help.
pub fn optimize_polygonal(points: &[Point], polygonal: &mut Polygonal) {
    let Polygonal { breaks, inertias } = polygonal;
    let cost_of = |a: &Inertia, b: &Inertia| a.det() * a.det() + b.det() * b.det();

    for i in 1..inertias.len() {
        let mut cost = cost_of(&inertias[i - 1], &inertias[i]);
        let mut s1 = inertias[i - 1];
        let mut s2 = inertias[i];
        let mut improved = false;

        while breaks[i] > breaks[i - 1] + 1 {
            let b = breaks[i];
            s1.increase(&points[b - 1], &points[b - 2], -1.0);
            s2.increase(&points[b - 1], &points[b - 2], 1.0);
            let new_cost = cost_of(&s1, &s2);
            if !(new_cost < cost) {
                break;
            }
            improved = true;
            cost = new_cost;
            breaks[i] -= 1;
            inertias[i - 1] = s1;
            inertias[i] = s2;
        }

        if improved {
            continue;
        }

        let mut s1 = inertias[i - 1];
        let mut s2 = inertias[i];
        while breaks[i] + 1 < breaks[i + 1] {
            let b = breaks[i];
            s1.increase(&points[b], &points[b + 1], 1.0);
            s2.increase(&points[b], &points[b + 1], -1.0);
            let new_cost = cost_of(&s1, &s2);
            if !(new_cost < cost) {
                break;
            }
            cost = new_cost;
            breaks[i] += 1;
            inertias[i - 1] = s1;
            inertias[i] = s2;
        }
    }
}

/// Straight segment fitted to one run of a decomposition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecoSegment {
    pub start: usize,
    pub end: usize,
    pub center: Point,
    /// Principal axis direction in `(-pi/2, pi/2]`
    pub angle: f64,
    pub radius: f64,
    pub p1: Point,
    pub p2: Point,
    /// True when the segment runs from `p2` to `p1` in drawing order
    pub reversed: bool,
}

impl RecoSegment {
    pub fn from_inertia(points: &[Point], start: usize, end: usize, inertia: &Inertia) -> Self {
        let center = Point::new(inertia.center_x(), inertia.center_y());
        let a = inertia.xx();
        let b = inertia.xy();
        let c = inertia.yy();
        // maximizes the inertia quadratic form: tan(2t) = 2b / (a - c)
        let angle = (2.0 * b).atan2(a - c) / 2.0;
        let radius = (3.0 * (a + c)).max(0.0).sqrt();

        let (sin, cos) = angle.sin_cos();
        let (mut lmin, mut lmax) = (0.0_f64, 0.0_f64);
        for p in &points[start..=end] {
            let l = (p.x - center.x) * cos + (p.y - center.y) * sin;
            lmin = lmin.min(l);
            lmax = lmax.max(l);
        }

        Self {
            start,
            end,
            center,
            angle,
            radius,
            p1: Point::new(center.x + lmin * cos, center.y + lmin * sin),
            p2: Point::new(center.x + lmax * cos, center.y + lmax * sin),
            reversed: false,
        }
    }

    /// Endpoint reached first when drawing the segment
    pub fn tail(&self) -> Point {
        if self.reversed {
            self.p2
        } else {
            self.p1
        }
    }

    /// Endpoint reached last when drawing the segment
    pub fn head(&self) -> Point {
        if self.reversed {
            self.p1
        } else {
            self.p2
        }
    }

    /// Intersection of the infinite lines through both segments.
    ///
    /// `None` for (nearly) parallel segments.
    pub fn edge_intersection(&self, other: &RecoSegment) -> Option<Point> {
        let denom = (other.angle - self.angle).sin();
        if denom.abs() < f64::EPSILON {
            return None;
        }
        let t = ((other.center.x - self.center.x) * other.angle.sin()
            - (other.center.y - self.center.y) * other.angle.cos())
            / denom;
        Some(Point::new(
            self.center.x + t * self.angle.cos(),
            self.center.y + t * self.angle.sin(),
        ))
    }
}
