use crate::shared::camera::{Facing, Orientation, Size};
use crate::shared::face_bounds::FaceBounds;

/// Axis-aligned rectangle in view coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl ViewRect {
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn center(&self) -> (f32, f32) {
        (
            (self.left + self.right) / 2.0,
            (self.top + self.bottom) / 2.0,
        )
    }
}

/// Maps face bounds from preview (upright sensor) space into view space.
///
/// Each axis is scaled by `view / preview`. Depending on rotation and
/// facing, the scaled centre is then mirrored:
///
/// | facing | rotation | x        | y        |
/// |--------|----------|----------|----------|
/// | front  | 270°     | mirrored | as is    |
/// | front  | 90°      | as is    | mirrored |
/// | back   | 270°     | mirrored | mirrored |
/// | back   | 90°      | as is    | as is    |
///
/// Other rotations keep the scaled coordinates unmirrored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateTransformer {
    preview: Size,
    view: Size,
    orientation: Orientation,
    facing: Facing,
}

impl CoordinateTransformer {
    /// Returns `None` while either the preview or the view size is unknown.
    pub fn new(preview: Size, view: Size, orientation: Orientation, facing: Facing) -> Option<Self> {
        if preview.is_empty() || view.is_empty() {
            return None;
        }
        Some(Self {
            preview,
            view,
            orientation,
            facing,
        })
    }

    pub fn view(&self) -> Size {
        self.view
    }

    pub fn scale_x(&self, x: f32) -> f32 {
        x * (self.view.width / self.preview.width)
    }

    pub fn scale_y(&self, y: f32) -> f32 {
        y * (self.view.height / self.preview.height)
    }

    pub fn view_center_x(&self, scaled_x: f32) -> f32 {
        if self.mirrors_x() {
            self.view.width - scaled_x
        } else {
            scaled_x
        }
    }

    pub fn view_center_y(&self, scaled_y: f32) -> f32 {
        if self.mirrors_y() {
            self.view.height - scaled_y
        } else {
            scaled_y
        }
    }

    pub fn mirrors_x(&self) -> bool {
        matches!(
            (self.facing, self.orientation),
            (Facing::Front, Orientation::Angle270) | (Facing::Back, Orientation::Angle270)
        )
    }

    pub fn mirrors_y(&self) -> bool {
        matches!(
            (self.facing, self.orientation),
            (Facing::Front, Orientation::Angle90) | (Facing::Back, Orientation::Angle270)
        )
    }

    /// Centre of `face` in view coordinates.
    pub fn map_center(&self, face: &FaceBounds) -> (f32, f32) {
        (
            self.view_center_x(self.scale_x(face.exact_center_x())),
            self.view_center_y(self.scale_y(face.exact_center_y())),
        )
    }

    /// Bounding rectangle of `face` in view coordinates.
    ///
    /// Mirroring moves the centre only; the extents are plain scaled halves.
    pub fn map_bounds(&self, face: &FaceBounds) -> ViewRect {
        let (cx, cy) = self.map_center(face);
        let x_offset = self.scale_x(face.width / 2.0);
        let y_offset = self.scale_y(face.height / 2.0);
        ViewRect {
            left: cx - x_offset,
            top: cy - y_offset,
            right: cx + x_offset,
            bottom: cy + y_offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    const PREVIEW: Size = Size {
        width: 480.0,
        height: 640.0,
    };
    const VIEW: Size = Size {
        width: 960.0,
        height: 1920.0,
    };

    fn transformer(orientation: Orientation, facing: Facing) -> CoordinateTransformer {
        CoordinateTransformer::new(PREVIEW, VIEW, orientation, facing).unwrap()
    }

    #[test]
    fn test_empty_preview_has_no_transform() {
        let t = CoordinateTransformer::new(Size::default(), VIEW, Orientation::Angle90, Facing::Back);
        assert!(t.is_none());
    }

    #[test]
    fn test_empty_view_has_no_transform() {
        let t = CoordinateTransformer::new(PREVIEW, Size::default(), Orientation::Angle90, Facing::Back);
        assert!(t.is_none());
    }

    #[test]
    fn test_scale_per_axis() {
        let t = transformer(Orientation::Angle90, Facing::Back);
        assert_relative_eq!(t.scale_x(100.0), 200.0);
        assert_relative_eq!(t.scale_y(100.0), 300.0);
    }

    #[test]
    fn test_front_270_mirrors_x() {
        let t = transformer(Orientation::Angle270, Facing::Front);
        let scaled = t.scale_x(100.0);
        assert_relative_eq!(t.view_center_x(scaled), VIEW.width - scaled);
        assert_relative_eq!(t.view_center_y(t.scale_y(100.0)), 300.0);
    }

    #[test]
    fn test_back_90_is_unmirrored() {
        let t = transformer(Orientation::Angle90, Facing::Back);
        let scaled = t.scale_x(100.0);
        assert_relative_eq!(t.view_center_x(scaled), scaled);
        assert_relative_eq!(t.view_center_y(t.scale_y(100.0)), 300.0);
    }

    #[rstest]
    #[case::front_270(Orientation::Angle270, Facing::Front, true, false)]
    #[case::front_90(Orientation::Angle90, Facing::Front, false, true)]
    #[case::back_270(Orientation::Angle270, Facing::Back, true, true)]
    #[case::back_90(Orientation::Angle90, Facing::Back, false, false)]
    #[case::front_0(Orientation::Angle0, Facing::Front, false, false)]
    #[case::back_0(Orientation::Angle0, Facing::Back, false, false)]
    #[case::front_180(Orientation::Angle180, Facing::Front, false, false)]
    #[case::back_180(Orientation::Angle180, Facing::Back, false, false)]
    fn test_mirroring_table(
        #[case] orientation: Orientation,
        #[case] facing: Facing,
        #[case] mirror_x: bool,
        #[case] mirror_y: bool,
    ) {
        let t = transformer(orientation, facing);
        assert_eq!(t.mirrors_x(), mirror_x);
        assert_eq!(t.mirrors_y(), mirror_y);
    }

    #[test]
    fn test_unsupported_rotation_falls_back_to_scaled() {
        let t = transformer(Orientation::Angle180, Facing::Front);
        let face = FaceBounds::centered_at(120.0, 160.0, 40.0, 40.0);
        let (cx, cy) = t.map_center(&face);
        assert_relative_eq!(cx, 240.0);
        assert_relative_eq!(cy, 480.0);
    }

    #[test]
    fn test_map_center_preview_center_lands_on_view_center() {
        let face = FaceBounds::centered_at(240.0, 320.0, 60.0, 80.0);
        for &o in Orientation::ALL {
            for facing in [Facing::Front, Facing::Back] {
                let (cx, cy) = transformer(o, facing).map_center(&face);
                assert_relative_eq!(cx, VIEW.width / 2.0);
                assert_relative_eq!(cy, VIEW.height / 2.0);
            }
        }
    }

    #[test]
    fn test_map_bounds_uses_scaled_half_extents() {
        let t = transformer(Orientation::Angle270, Facing::Front);
        // centre (100, 100) -> scaled (200, 300) -> mirrored x = 760
        let face = FaceBounds::centered_at(100.0, 100.0, 50.0, 20.0);
        let rect = t.map_bounds(&face);
        assert_relative_eq!(rect.left, 760.0 - 50.0);
        assert_relative_eq!(rect.right, 760.0 + 50.0);
        assert_relative_eq!(rect.top, 300.0 - 30.0);
        assert_relative_eq!(rect.bottom, 300.0 + 30.0);
        assert_relative_eq!(rect.width(), 100.0);
        assert_relative_eq!(rect.height(), 60.0);
        assert_eq!(rect.center(), (760.0, 300.0));
    }
}
