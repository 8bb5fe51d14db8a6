pub const SEETA_MODEL_NAME: &str = "seeta_fd_frontal_v1.0.bin";
pub const SEETA_MODEL_URL: &str =
    "https://github.com/atomashpolskiy/rustface/raw/master/model/seeta_fd_frontal_v1.0.bin";

/// Smallest face to report, as a proportion of the image's shorter side.
pub const MIN_FACE_SIZE: f32 = 0.15;

/// Fraction of the view trimmed from each edge when deciding whether a
/// single face is centred. 0.25 leaves the middle 50% in both axes.
pub const CENTER_REGION_MARGIN: f32 = 0.25;

pub const DETECTION_ERROR_PREFIX: &str = "Error processing images";

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
