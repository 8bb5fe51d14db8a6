use serde::{Deserialize, Serialize};

use crate::overlay::domain::coordinate_transformer::ViewRect;

/// Stroke used to outline a face on the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundsStyle {
    pub color: [u8; 3],
    pub stroke_width: f32,
}

impl Default for BoundsStyle {
    fn default() -> Self {
        Self {
            // holo blue dark
            color: [0x00, 0x99, 0xCC],
            stroke_width: 4.0,
        }
    }
}

/// Drawing surface the overlay paints onto.
///
/// The overlay decides *what* to draw in view coordinates; implementations
/// own the pixels.
pub trait OverlayRenderer {
    fn draw_bounds(&mut self, rect: &ViewRect, style: &BoundsStyle);
}
