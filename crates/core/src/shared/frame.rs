use std::borrow::Cow;

use crate::shared::camera::{Facing, Orientation};

/// Pixel layout of a camera frame's bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// Y plane followed by interleaved VU at quarter resolution.
    Nv21,
    /// Y plane followed by V and U planes at quarter resolution.
    Yv12,
    Gray8,
    Rgb8,
}

impl PixelFormat {
    pub fn expected_len(self, width: u32, height: u32) -> usize {
        let pixels = width as usize * height as usize;
        match self {
            PixelFormat::Nv21 | PixelFormat::Yv12 => pixels * 3 / 2,
            PixelFormat::Gray8 => pixels,
            PixelFormat::Rgb8 => pixels * 3,
        }
    }
}

/// One camera callback's worth of image data.
///
/// `data` may be empty when the camera delivered a frame without a buffer;
/// such frames still carry geometry but are never sent to a detector.
/// Frames whose data does not match their size and format are rejected
/// before detection (see [`Frame::is_complete`]).
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    rotation: i32,
    format: PixelFormat,
    is_camera_facing_back: bool,
}

impl Frame {
    pub fn new(
        data: Vec<u8>,
        width: u32,
        height: u32,
        rotation: i32,
        format: PixelFormat,
        is_camera_facing_back: bool,
    ) -> Self {
        Self {
            data,
            width,
            height,
            rotation,
            format,
            is_camera_facing_back,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn has_data(&self) -> bool {
        !self.data.is_empty()
    }

    /// Whether `data` holds exactly one image of this size and format.
    pub fn is_complete(&self) -> bool {
        self.data.len() == self.format.expected_len(self.width, self.height)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Rotation in degrees as reported by the camera.
    pub fn rotation(&self) -> i32 {
        self.rotation
    }

    pub fn orientation(&self) -> Option<Orientation> {
        Orientation::from_degrees(self.rotation)
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn is_camera_facing_back(&self) -> bool {
        self.is_camera_facing_back
    }

    pub fn facing(&self) -> Facing {
        Facing::from_is_back(self.is_camera_facing_back)
    }

    /// Luminance plane in sensor orientation, `width * height` bytes.
    pub fn luma(&self) -> Cow<'_, [u8]> {
        let pixels = self.width as usize * self.height as usize;
        match self.format {
            PixelFormat::Nv21 | PixelFormat::Yv12 | PixelFormat::Gray8 => {
                Cow::Borrowed(&self.data[..pixels.min(self.data.len())])
            }
            PixelFormat::Rgb8 => Cow::Owned(
                self.data
                    .chunks_exact(3)
                    .map(|px| {
                        let (r, g, b) = (px[0] as u32, px[1] as u32, px[2] as u32);
                        ((77 * r + 150 * g + 29 * b + 128) >> 8) as u8
                    })
                    .collect(),
            ),
        }
    }

    /// Luminance plane rotated upright, with its width and height.
    ///
    /// Unsupported rotations leave the plane as captured.
    pub fn upright_luma(&self) -> (Cow<'_, [u8]>, u32, u32) {
        let luma = self.luma();
        match self.orientation() {
            None | Some(Orientation::Angle0) => (luma, self.width, self.height),
            Some(orientation) => {
                let (rotated, w, h) = rotate_plane(&luma, self.width, self.height, orientation);
                (Cow::Owned(rotated), w, h)
            }
        }
    }
}

/// Rotates a single-channel plane clockwise by `orientation`.
fn rotate_plane(src: &[u8], width: u32, height: u32, orientation: Orientation) -> (Vec<u8>, u32, u32) {
    let w = width as usize;
    let h = height as usize;
    let mut dst = Vec::with_capacity(w * h);

    match orientation {
        Orientation::Angle0 => (src.to_vec(), width, height),
        Orientation::Angle90 => {
            for y in 0..w {
                for x in 0..h {
                    dst.push(src[(h - 1 - x) * w + y]);
                }
            }
            (dst, height, width)
        }
        Orientation::Angle180 => {
            dst.extend(src.iter().rev());
            (dst, width, height)
        }
        Orientation::Angle270 => {
            for y in 0..w {
                for x in 0..h {
                    dst.push(src[x * w + (w - 1 - y)]);
                }
            }
            (dst, height, width)
        }
    }
}
