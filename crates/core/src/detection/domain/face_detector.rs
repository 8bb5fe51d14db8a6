use thiserror::Error;

use crate::shared::face_bounds::FaceBounds;
use crate::shared::frame::Frame;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectionError {
    #[error("failed to load detection model: {0}")]
    ModelLoad(String),
    #[error("frame has no image data")]
    EmptyFrame,
    #[error("unsupported frame: {0}")]
    UnsupportedFrame(String),
    #[error("detection failed: {0}")]
    Failed(String),
}

/// Domain interface for an external face detector.
///
/// Boxes are reported in upright image coordinates, i.e. after applying the
/// frame's rotation. Implementations may be stateful, hence `&mut self`.
pub trait FaceDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<FaceBounds>, DetectionError>;

    /// Releases detector resources. Default: no-op.
    fn close(&mut self) {}
}
