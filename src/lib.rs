//! inkshape - Freehand stroke shape recognition
//!
//! Turns a finished pen stroke into a clean geometric primitive (line,
//! rectangle, triangle, quadrilateral, polygon or circle) that a host application can
//! substitute for the original stroke.
//!
//! Two recognizers are available behind [`recognizer::RecognizerStrategy`]:
//! an inertia-tensor polygon recognizer and a covariance segment recognizer.
//! Pick one with [`config::RecognizerConfig::strategy`].

pub mod circle;
pub mod config;
pub mod error;
pub mod inertia;
pub mod polygonal;
pub mod recognizer;
pub mod segments;
pub mod shapes;
pub mod stroke_recognizer;

use geo::{BoundingRect, LineString};
use serde::{Deserialize, Serialize};

pub use config::{RecognizerConfig, Strategy};
pub use error::RecognizeError;
pub use recognizer::{RecognizerStrategy, ShapeRecognizer};
pub use shapes::{RecognizedShape, ShapeType};

/// A single point in a stroke
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub pressure: Option<f64>,
    #[serde(default)]
    pub timestamp: u64,
}

impl Point {
    /// Plain geometric point without pressure or timing
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            pressure: None,
            timestamp: 0,
        }
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: &Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A stroke consisting of multiple points
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stroke {
    pub id: String,
    pub points: Vec<Point>,
    pub color: String,
    pub width: f64,
    pub tool: String,
    /// Fill opacity, `None` when the stroke is not filled
    #[serde(default)]
    pub fill: Option<u8>,
}

impl Stroke {
    /// Empty stroke with a fresh id and default pen style
    pub fn new() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            points: Vec::new(),
            color: "#000000".to_string(),
            width: 1.0,
            tool: "pen".to_string(),
            fill: None,
        }
    }

    /// Copy the visual attributes of `other` onto this stroke.
    ///
    /// Points and id are left alone.
    pub fn apply_style_from(&mut self, other: &Stroke) {
        self.color = other.color.clone();
        self.width = other.width;
        self.tool = other.tool.clone();
        self.fill = other.fill;
    }

    /// New stroke with the style of `template` and the given geometry
    pub fn with_style_of(template: &Stroke, points: Vec<Point>) -> Self {
        let mut stroke = Stroke::new();
        stroke.apply_style_from(template);
        stroke.points = points;
        stroke
    }

    /// Length of the bounding-box diagonal, 0 for an empty stroke
    pub fn bounds_diagonal(&self) -> f64 {
        let line: LineString<f64> = self.points.iter().map(|p| (p.x, p.y)).collect();
        line.bounding_rect()
            .map(|rect| rect.width().hypot(rect.height()))
            .unwrap_or(0.0)
    }
}

impl Default for Stroke {
    fn default() -> Self {
        Self::new()
    }
}
