use thiserror::Error;

/// Misuse of the recognizer API.
///
/// A stroke that simply is not a shape is not an error; recognition returns
/// `Ok(None)` for those.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum RecognizeError {
    #[error("stroke has no points")]
    EmptyStroke,

    #[error("minimum stroke size must be a positive finite number, got {0}")]
    InvalidMinSize(f64),

    #[error("stroke point {index} has a non-finite coordinate")]
    NonFinitePoint { index: usize },
}
