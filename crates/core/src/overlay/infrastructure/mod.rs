pub mod image_overlay_renderer;
