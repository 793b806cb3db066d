//! Recognizer configuration
//!
//! All numeric thresholds live here so an integrator can tune them without
//! touching the algorithms. Defaults are the values the recognizers were
//! tuned with for screen-space strokes.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Which recognizer handles a stroke
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Inertia-tensor polygon recognizer with circle fallback
    #[default]
    Inertia,
    /// Covariance segment recognizer with polygon regularization
    Segment,
}

/// Top-level recognizer configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognizerConfig {
    pub strategy: Strategy,
    pub inertia: InertiaRecognizerConfig,
    pub segment: SegmentRecognizerConfig,
}

/// Thresholds for the inertia polygon recognizer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InertiaRecognizerConfig {
    /// Maximum number of straight sides a decomposition may use
    pub max_polygon_sides: usize,
    /// A run is straight enough to be a side when its det is below this
    pub segment_max_det: f64,
    /// A single-side stroke becomes a line when its det is below this
    pub line_max_det: f64,
    pub circle_min_det: f64,
    pub circle_max_score: f64,
    /// Lower bound on the number of sides used to draw a circle
    pub circle_min_points: usize,
    /// Angles this close to horizontal/vertical are snapped (radians)
    pub slant_tolerance: f64,
    pub rectangle_angle_tolerance: f64,
    pub rectangle_linear_tolerance: f64,
    pub polygon_linear_tolerance: f64,
    /// Emit a plain polyline when a decomposition matches no other shape
    pub emit_polygons: bool,
}

impl Default for InertiaRecognizerConfig {
    fn default() -> Self {
        Self {
            max_polygon_sides: 4,
            segment_max_det: 0.015,
            line_max_det: 0.015,
            circle_min_det: 0.95,
            circle_max_score: 0.10,
            circle_min_points: 24,
            slant_tolerance: 5.0 * PI / 180.0,
            rectangle_angle_tolerance: 15.0 * PI / 180.0,
            rectangle_linear_tolerance: 0.20,
            polygon_linear_tolerance: 0.20,
            emit_polygons: true,
        }
    }
}

/// Thresholds for the covariance segment recognizer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentRecognizerConfig {
    pub min_nb_points_per_segment: usize,
    pub initial_nb_segments: usize,
    /// How many pieces a non-linear segment is cut into on each pass
    pub nb_segments_per_split: usize,
    /// Give up once this many segments are still not straight
    pub max_nb_segments: usize,
    /// Largest minor eigenvalue (squared length) of a straight segment
    pub max_minor_is_line: f64,
    /// Adjacent segments closer to parallel than this are not a corner
    pub maximal_segment_cos_angle: f64,
    /// Open ends closer than this close the polygon
    pub close_polygon_tolerance: f64,
    pub regularize_angle_deviation: f64,
    pub regularize_rel_radius_deviation: f64,
    pub regularize_rectangle_rel_length_deviation: f64,
}

impl Default for SegmentRecognizerConfig {
    fn default() -> Self {
        Self {
            min_nb_points_per_segment: 5,
            initial_nb_segments: 4,
            nb_segments_per_split: 2,
            max_nb_segments: 12,
            max_minor_is_line: 2.0,
            maximal_segment_cos_angle: 0.9,
            close_polygon_tolerance: 10.0,
            regularize_angle_deviation: 0.1,
            regularize_rel_radius_deviation: 0.1,
            regularize_rectangle_rel_length_deviation: 0.1,
        }
    }
}
