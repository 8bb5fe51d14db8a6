use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::detection::domain::face_detector::{DetectionError, FaceDetector};
use crate::shared::config::DetectorSettings;
use crate::shared::face_bounds::FaceBounds;
use crate::shared::frame::Frame;

/// SeetaFace's cascade cannot look for faces smaller than this.
const MIN_CASCADE_FACE_SIZE: u32 = 20;

/// Face detector backed by the `rustface` crate (SeetaFace engine).
///
/// Works on the frame's upright luminance plane, so reported boxes are in
/// display orientation. The cascade has no tracking; `track_id` is left
/// unset.
pub struct RustfaceDetector {
    model: rustface::Model,
    settings: DetectorSettings,
}

impl RustfaceDetector {
    pub fn from_model_file(path: &Path, settings: DetectorSettings) -> Result<Self, DetectionError> {
        let file = File::open(path).map_err(|e| {
            DetectionError::ModelLoad(format!("{}: {e}", path.display()))
        })?;
        let model = rustface::read_model(BufReader::new(file))
            .map_err(|e| DetectionError::ModelLoad(format!("{}: {e}", path.display())))?;
        log::info!("Loaded SeetaFace model from {}", path.display());
        Ok(Self { model, settings })
    }
}

/// Minimum face size in pixels, given as a proportion of the shorter side.
fn min_face_size_px(proportion: f32, width: u32, height: u32) -> u32 {
    let shorter = width.min(height) as f32;
    ((shorter * proportion) as u32).max(MIN_CASCADE_FACE_SIZE)
}

impl FaceDetector for RustfaceDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<FaceBounds>, DetectionError> {
        if !frame.has_data() {
            return Err(DetectionError::EmptyFrame);
        }
        if frame.orientation().is_none() {
            return Err(DetectionError::UnsupportedFrame(format!(
                "rotation {} is not a multiple of 90",
                frame.rotation()
            )));
        }

        let (luma, width, height) = frame.upright_luma();
        if luma.len() < width as usize * height as usize {
            return Err(DetectionError::UnsupportedFrame(format!(
                "expected {}x{} luma bytes, got {}",
                width,
                height,
                luma.len()
            )));
        }

        let mut detector = rustface::create_detector_with_model(self.model.clone());
        detector.set_min_face_size(min_face_size_px(
            self.settings.min_face_size,
            width,
            height,
        ));
        detector.set_score_thresh(self.settings.score_threshold);
        detector.set_pyramid_scale_factor(self.settings.pyramid_scale_factor);
        detector.set_slide_window_step(
            self.settings.slide_window_step,
            self.settings.slide_window_step,
        );

        let faces = detector.detect(&rustface::ImageData::new(&luma, width, height));
        log::debug!("Detected {} face(s) in {}x{} frame", faces.len(), width, height);

        Ok(faces
            .iter()
            .map(|face| {
                let bbox = face.bbox();
                FaceBounds::new(
                    bbox.x() as f32,
                    bbox.y() as f32,
                    bbox.width() as f32,
                    bbox.height() as f32,
                )
                .with_score(face.score())
            })
            .collect())
    }

    fn close(&mut self) {
        log::debug!("Closing SeetaFace detector");
    }
}
