//! Recognizer façade
//!
//! `ShapeRecognizer` validates the input stroke, applies the size gate and
//! hands the stroke to the recognizer picked by the configuration.

use crate::circle::recognize_circle;
use crate::config::{
    InertiaRecognizerConfig, RecognizerConfig, SegmentRecognizerConfig, Strategy,
};
use crate::error::RecognizeError;
use crate::polygonal::{find_polygonal, optimize_polygonal};
use crate::shapes::{self, RecognizedShape};
use crate::stroke_recognizer::recognize_segments;
use crate::Stroke;

/// A way of turning one stroke into a shape.
///
/// Implementations may assume the stroke has passed
/// [`validate_stroke`]: it is non-empty, its points are finite and
/// `min_stroke_size` is a positive number. `Ok(None)` means the stroke is
/// not recognized.
pub trait RecognizerStrategy: Send + Sync {
    fn recognize(
        &self,
        stroke: &Stroke,
        min_stroke_size: f64,
    ) -> Result<Option<RecognizedShape>, RecognizeError>;
}

/// Inertia-tensor polygon recognizer with a circle fallback
#[derive(Debug, Clone, Default)]
pub struct InertiaPolygonRecognizer {
    config: InertiaRecognizerConfig,
}

impl InertiaPolygonRecognizer {
    pub fn new(config: InertiaRecognizerConfig) -> Self {
        Self { config }
    }

    fn recognize_shape(&self, stroke: &Stroke) -> Option<RecognizedShape> {
        let points = &stroke.points;
        let config = &self.config;

        let polygonal = find_polygonal(
            points,
            0,
            points.len() - 1,
            config.max_polygon_sides,
            config.segment_max_det,
        )
        .map(|mut polygonal| {
            optimize_polygonal(points, &mut polygonal);
            polygonal
        });

        let segments = match &polygonal {
            Some(polygonal) => {
                log::debug!(
                    "polygon with {} sides, breaks {:?}",
                    polygonal.sides(),
                    polygonal.breaks
                );
                let segments = polygonal.segments(points);

                if let Some(shape) = shapes::try_rectangle(&segments, stroke, config) {
                    log::debug!("recognized rectangle");
                    return Some(shape);
                }
                for nsides in [3, 4] {
                    if let Some(shape) =
                        shapes::try_closed_polygon(&segments, nsides, stroke, config)
                    {
                        log::debug!("recognized closed polygon with {} sides", nsides);
                        return Some(shape);
                    }
                }
                if let ([segment], [inertia]) = (segments.as_slice(), polygonal.inertias.as_slice())
                {
                    if let Some(shape) =
                        shapes::make_line(segment, inertia.det(), points, stroke, config)
                    {
                        log::debug!("recognized line");
                        return Some(shape);
                    }
                }
                segments
            }
            None => Vec::new(),
        };

        if let Some(shape) = recognize_circle(stroke, config) {
            log::debug!("recognized circle");
            return Some(shape);
        }

        if config.emit_polygons && !segments.is_empty() {
            log::debug!("falling back to open polygon");
            return shapes::make_polygon(&segments, points, stroke, config);
        }
        None
    }
}

impl RecognizerStrategy for InertiaPolygonRecognizer {
    fn recognize(
        &self,
        stroke: &Stroke,
        min_stroke_size: f64,
    ) -> Result<Option<RecognizedShape>, RecognizeError> {
        if !is_large_enough(stroke, min_stroke_size) {
            return Ok(None);
        }
        Ok(self.recognize_shape(stroke).filter(RecognizedShape::is_finite))
    }
}

/// Covariance split/merge recognizer with polygon regularization
#[derive(Debug, Clone, Default)]
pub struct CovarianceSegmentRecognizer {
    config: SegmentRecognizerConfig,
}

impl CovarianceSegmentRecognizer {
    pub fn new(config: SegmentRecognizerConfig) -> Self {
        Self { config }
    }
}

impl RecognizerStrategy for CovarianceSegmentRecognizer {
    fn recognize(
        &self,
        stroke: &Stroke,
        min_stroke_size: f64,
    ) -> Result<Option<RecognizedShape>, RecognizeError> {
        if !is_large_enough(stroke, min_stroke_size) {
            return Ok(None);
        }
        Ok(recognize_segments(stroke, &self.config).filter(RecognizedShape::is_finite))
    }
}

/// Entry point used by host applications
pub struct ShapeRecognizer {
    strategy: Box<dyn RecognizerStrategy>,
}

impl ShapeRecognizer {
    pub fn new(config: RecognizerConfig) -> Self {
        let strategy: Box<dyn RecognizerStrategy> = match config.strategy {
            Strategy::Inertia => Box::new(InertiaPolygonRecognizer::new(config.inertia)),
            Strategy::Segment => Box::new(CovarianceSegmentRecognizer::new(config.segment)),
        };
        Self { strategy }
    }

    pub fn with_strategy(strategy: Box<dyn RecognizerStrategy>) -> Self {
        Self { strategy }
    }

    /// Recognize `stroke`, returning the shape that should replace it.
    ///
    /// Strokes with fewer than 3 points or a bounding-box diagonal below
    /// `min_stroke_size` are never recognized.
    pub fn recognize(
        &self,
        stroke: &Stroke,
        min_stroke_size: f64,
    ) -> Result<Option<RecognizedShape>, RecognizeError> {
        validate_stroke(stroke, min_stroke_size)?;
        let shape = self.strategy.recognize(stroke, min_stroke_size)?;
        match &shape {
            Some(shape) => log::debug!(
                "stroke {} recognized as {:?}",
                stroke.id,
                shape.shape_type
            ),
            None => log::debug!("stroke {} not recognized", stroke.id),
        }
        Ok(shape)
    }
}

impl Default for ShapeRecognizer {
    fn default() -> Self {
        Self::new(RecognizerConfig::default())
    }
}

/// Check the caller's side of the contract
pub fn validate_stroke(stroke: &Stroke, min_stroke_size: f64) -> Result<(), RecognizeError> {
    if !(min_stroke_size.is_finite() && min_stroke_size > 0.0) {
        return Err(RecognizeError::InvalidMinSize(min_stroke_size));
    }
    if stroke.points.is_empty() {
        return Err(RecognizeError::EmptyStroke);
    }
    if let Some(index) = stroke.points.iter().position(|p| !p.is_finite()) {
        return Err(RecognizeError::NonFinitePoint { index });
    }
    Ok(())
}

fn is_large_enough(stroke: &Stroke, min_stroke_size: f64) -> bool {
    stroke.points.len() >= 3 && stroke.bounds_diagonal() >= min_stroke_size
}
