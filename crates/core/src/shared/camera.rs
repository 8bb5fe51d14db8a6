/// Clockwise rotation the camera image needs to appear upright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    Angle0,
    Angle90,
    Angle180,
    #[default]
    Angle270,
}

impl Orientation {
    pub const ALL: &[Orientation] = &[
        Orientation::Angle0,
        Orientation::Angle90,
        Orientation::Angle180,
        Orientation::Angle270,
    ];

    /// Maps a rotation in degrees onto an orientation.
    ///
    /// Values outside `0..360` are normalised first; anything that is not a
    /// multiple of a right angle is rejected.
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        match degrees.rem_euclid(360) {
            0 => Some(Orientation::Angle0),
            90 => Some(Orientation::Angle90),
            180 => Some(Orientation::Angle180),
            270 => Some(Orientation::Angle270),
            _ => None,
        }
    }

    pub fn degrees(self) -> i32 {
        match self {
            Orientation::Angle0 => 0,
            Orientation::Angle90 => 90,
            Orientation::Angle180 => 180,
            Orientation::Angle270 => 270,
        }
    }

    /// Rotation expressed in right angles, as detector metadata expects it.
    pub fn quarter_turns(self) -> u8 {
        (self.degrees() / 90) as u8
    }

    /// True when the image axes are swapped relative to the display.
    pub fn is_quarter_turn(self) -> bool {
        matches!(self, Orientation::Angle90 | Orientation::Angle270)
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

/// Which way the active camera points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    Front,
    #[default]
    Back,
}

impl Facing {
    pub fn from_is_back(is_camera_facing_back: bool) -> Self {
        if is_camera_facing_back {
            Facing::Back
        } else {
            Facing::Front
        }
    }
}

impl std::fmt::Display for Facing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Facing::Front => write!(f, "front"),
            Facing::Back => write!(f, "back"),
        }
    }
}

/// Width and height in pixels of either the preview or the view.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn transposed(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }
}
