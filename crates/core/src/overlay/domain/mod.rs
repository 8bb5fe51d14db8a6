pub mod coordinate_transformer;
pub mod error_notifier;
pub mod face_bounds_overlay;
pub mod face_classifier;
pub mod overlay_renderer;
