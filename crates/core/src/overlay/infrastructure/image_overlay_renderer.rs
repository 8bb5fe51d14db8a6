use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

use crate::overlay::domain::coordinate_transformer::ViewRect;
use crate::overlay::domain::overlay_renderer::{BoundsStyle, OverlayRenderer};
use crate::shared::camera::Size;

/// Draws overlay strokes straight into an RGB image.
///
/// The stroke is centred on the rectangle's edges; `imageproc` clips each
/// band to the image.
pub struct ImageOverlayRenderer {
    image: RgbImage,
}

impl ImageOverlayRenderer {
    pub fn new(image: RgbImage) -> Self {
        Self { image }
    }

    /// View size matching the wrapped image.
    pub fn size(&self) -> Size {
        Size::new(self.image.width() as f32, self.image.height() as f32)
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }
}

impl OverlayRenderer for ImageOverlayRenderer {
    fn draw_bounds(&mut self, rect: &ViewRect, style: &BoundsStyle) {
        let stroke = style.stroke_width.round().max(1.0) as u32;
        let half = stroke as f32 / 2.0;
        let color = Rgb(style.color);

        let left = (rect.left - half).round() as i32;
        let top = (rect.top - half).round() as i32;
        let right = (rect.right - half).round() as i32;
        let bottom = (rect.bottom - half).round() as i32;
        let outer_width = (rect.width() + stroke as f32).round().max(1.0) as u32;
        let outer_height = (rect.height() + stroke as f32).round().max(1.0) as u32;

        let bands = [
            Rect::at(left, top).of_size(outer_width, stroke),
            Rect::at(left, bottom).of_size(outer_width, stroke),
            Rect::at(left, top).of_size(stroke, outer_height),
            Rect::at(right, top).of_size(stroke, outer_height),
        ];
        for band in bands {
            draw_filled_rect_mut(&mut self.image, band, color);
        }
    }
}
