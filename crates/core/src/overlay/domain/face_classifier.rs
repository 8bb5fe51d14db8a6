use crate::overlay::domain::coordinate_transformer::{CoordinateTransformer, ViewRect};
use crate::shared::camera::Size;
use crate::shared::constants::CENTER_REGION_MARGIN;
use crate::shared::face_bounds::FaceBounds;

/// Outcome of inspecting one frame's detections.
#[derive(Debug, Clone, PartialEq)]
pub enum FaceClassification {
    NoFace,
    /// A single face whose centre lies inside the centre region.
    ExactlyOne {
        face: FaceBounds,
        view_bounds: ViewRect,
    },
    MoreThanOne,
}

impl FaceClassification {
    pub fn label(&self) -> &'static str {
        match self {
            FaceClassification::NoFace => "no face",
            FaceClassification::ExactlyOne { .. } => "exactly one face",
            FaceClassification::MoreThanOne => "more than one face",
        }
    }
}

/// The part of the view a lone face must be centred in.
///
/// `margin` is trimmed from each edge as a fraction of the view; bounds are
/// inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CenterRegion {
    margin: f32,
}

impl CenterRegion {
    pub fn new(margin: f32) -> Self {
        Self {
            margin: margin.clamp(0.0, 0.5),
        }
    }

    pub fn contains(&self, view: Size, x: f32, y: f32) -> bool {
        let (min_x, max_x) = (view.width * self.margin, view.width * (1.0 - self.margin));
        let (min_y, max_y) = (view.height * self.margin, view.height * (1.0 - self.margin));
        (min_x..=max_x).contains(&x) && (min_y..=max_y).contains(&y)
    }
}

impl Default for CenterRegion {
    fn default() -> Self {
        Self::new(CENTER_REGION_MARGIN)
    }
}

/// Sorts a frame's detections into no face / exactly one / many.
///
/// Without a transform (preview size not yet known) a single face cannot be
/// placed and counts as no face.
pub fn classify(
    faces: &[FaceBounds],
    transformer: Option<&CoordinateTransformer>,
    region: CenterRegion,
) -> FaceClassification {
    match faces {
        [] => FaceClassification::NoFace,
        [face] => {
            let Some(t) = transformer else {
                return FaceClassification::NoFace;
            };
            let (cx, cy) = t.map_center(face);
            if region.contains(t.view(), cx, cy) {
                FaceClassification::ExactlyOne {
                    face: face.clone(),
                    view_bounds: t.map_bounds(face),
                }
            } else {
                FaceClassification::NoFace
            }
        }
        _ => FaceClassification::MoreThanOne,
    }
}
