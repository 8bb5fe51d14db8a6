use std::sync::Arc;

use crate::overlay::domain::coordinate_transformer::CoordinateTransformer;
use crate::overlay::domain::face_classifier::{classify, CenterRegion, FaceClassification};
use crate::overlay::domain::overlay_renderer::{BoundsStyle, OverlayRenderer};
use crate::shared::camera::{Facing, Orientation, Size};
use crate::shared::config::OverlayConfig;
use crate::shared::face_bounds::FaceBounds;
use crate::shared::frame::Frame;

pub type NoFaceFn = Box<dyn FnMut() + Send>;
pub type OneFaceFn = Box<dyn FnMut(&FaceBounds) + Send>;
pub type MoreFacesFn = Box<dyn FnMut() + Send>;

/// Hooks invoked on every draw, one per classification.
#[derive(Default)]
pub struct FaceCallbacks {
    pub on_no_face: Option<NoFaceFn>,
    pub on_exactly_one_face: Option<OneFaceFn>,
    pub on_more_faces: Option<MoreFacesFn>,
}

impl FaceCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_no_face(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.on_no_face = Some(Box::new(f));
        self
    }

    pub fn on_exactly_one_face(mut self, f: impl FnMut(&FaceBounds) + Send + 'static) -> Self {
        self.on_exactly_one_face = Some(Box::new(f));
        self
    }

    pub fn on_more_faces(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.on_more_faces = Some(Box::new(f));
        self
    }

    fn notify(&mut self, classification: &FaceClassification) {
        match classification {
            FaceClassification::NoFace => {
                if let Some(f) = self.on_no_face.as_mut() {
                    f();
                }
            }
            FaceClassification::ExactlyOne { face, .. } => {
                if let Some(f) = self.on_exactly_one_face.as_mut() {
                    f(face);
                }
            }
            FaceClassification::MoreThanOne => {
                if let Some(f) = self.on_more_faces.as_mut() {
                    f();
                }
            }
        }
    }
}

/// Camera geometry the overlay needs to place faces: preview size in
/// upright space, rotation and facing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OverlayAttributes {
    pub preview: Size,
    pub orientation: Orientation,
    pub facing: Facing,
}

impl OverlayAttributes {
    /// Derives attributes from a camera frame.
    ///
    /// Quarter-turn rotations swap width and height so the preview is
    /// expressed the way it is displayed. Returns `None` for zero-sized
    /// frames or rotations that are not a multiple of a right angle.
    pub fn from_frame(frame: &Frame) -> Option<Self> {
        if frame.width() == 0 || frame.height() == 0 {
            return None;
        }
        let orientation = frame.orientation()?;
        let sensor = Size::new(frame.width() as f32, frame.height() as f32);
        let preview = if orientation.is_quarter_turn() {
            sensor.transposed()
        } else {
            sensor
        };
        Some(Self {
            preview,
            orientation,
            facing: frame.facing(),
        })
    }
}

/// Overlay state: what is shown, how it maps onto the view, and who to tell.
///
/// Faces are replaced wholesale on each detection result; drawing
/// classifies them, notifies the matching callback and outlines a lone
/// centred face.
pub struct FaceBoundsOverlay {
    faces: Vec<FaceBounds>,
    attributes: OverlayAttributes,
    view: Size,
    center_region: CenterRegion,
    style: BoundsStyle,
    callbacks: FaceCallbacks,
    last_frame: Option<Arc<Frame>>,
    redraw_pending: bool,
}

impl FaceBoundsOverlay {
    pub fn new(center_region: CenterRegion, style: BoundsStyle) -> Self {
        Self {
            faces: Vec::new(),
            attributes: OverlayAttributes::default(),
            view: Size::default(),
            center_region,
            style,
            callbacks: FaceCallbacks::default(),
            last_frame: None,
            redraw_pending: false,
        }
    }

    pub fn from_config(config: &OverlayConfig) -> Self {
        Self::new(
            CenterRegion::new(config.center_region_margin),
            config.bounds,
        )
    }

    pub fn faces(&self) -> &[FaceBounds] {
        &self.faces
    }

    pub fn attributes(&self) -> OverlayAttributes {
        self.attributes
    }

    pub fn view_size(&self) -> Size {
        self.view
    }

    pub fn set_view_size(&mut self, view: Size) {
        if self.view != view {
            self.view = view;
            self.redraw_pending = true;
        }
    }

    pub fn set_callbacks(&mut self, callbacks: FaceCallbacks) {
        self.callbacks = callbacks;
    }

    /// Returns whether anything changed.
    pub fn update_attributes(&mut self, attributes: OverlayAttributes) -> bool {
        if self.attributes == attributes {
            return false;
        }
        log::debug!(
            "Overlay attributes: preview {}x{}, rotation {}, facing {}",
            attributes.preview.width,
            attributes.preview.height,
            attributes.orientation,
            attributes.facing
        );
        self.attributes = attributes;
        true
    }

    /// Replaces the displayed faces and marks the overlay for redraw.
    pub fn update_faces(&mut self, faces: Vec<FaceBounds>, frame: Arc<Frame>) {
        self.faces = faces;
        self.last_frame = Some(frame);
        self.redraw_pending = true;
    }

    /// The frame that produced the current faces.
    pub fn last_frame(&self) -> Option<Arc<Frame>> {
        self.last_frame.clone()
    }

    pub fn needs_redraw(&self) -> bool {
        self.redraw_pending
    }

    pub fn transformer(&self) -> Option<CoordinateTransformer> {
        CoordinateTransformer::new(
            self.attributes.preview,
            self.view,
            self.attributes.orientation,
            self.attributes.facing,
        )
    }

    pub fn classify(&self) -> FaceClassification {
        classify(&self.faces, self.transformer().as_ref(), self.center_region)
    }

    /// Classifies the current faces, notifies, and outlines a lone centred face.
    pub fn draw(&mut self, renderer: &mut dyn OverlayRenderer) -> FaceClassification {
        self.redraw_pending = false;
        let classification = self.classify();
        self.callbacks.notify(&classification);
        if let FaceClassification::ExactlyOne { view_bounds, .. } = &classification {
            renderer.draw_bounds(view_bounds, &self.style);
        }
        classification
    }
}

impl Default for FaceBoundsOverlay {
    fn default() -> Self {
        Self::new(CenterRegion::default(), BoundsStyle::default())
    }
}
