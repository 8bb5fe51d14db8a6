pub mod camera;
pub mod config;
pub mod constants;
pub mod face_bounds;
pub mod frame;
