/// A detected face: an axis-aligned box in upright sensor coordinates.
///
/// Produced by a detector and replaced wholesale when the next frame's
/// results arrive.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceBounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub track_id: Option<u32>,
    pub score: f64,
}

impl FaceBounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            track_id: None,
            score: 0.0,
        }
    }

    /// Box of the given size centred on `(cx, cy)`.
    pub fn centered_at(cx: f32, cy: f32, width: f32, height: f32) -> Self {
        Self::new(cx - width / 2.0, cy - height / 2.0, width, height)
    }

    pub fn with_track_id(mut self, track_id: u32) -> Self {
        self.track_id = Some(track_id);
        self
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }

    pub fn exact_center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn exact_center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    pub fn exact_center(&self) -> (f32, f32) {
        (self.exact_center_x(), self.exact_center_y())
    }

    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }
}
