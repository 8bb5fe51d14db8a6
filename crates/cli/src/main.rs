use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use image::{imageops, RgbImage};

use faceoverlay_core::detection::domain::face_detector::FaceDetector;
use faceoverlay_core::detection::infrastructure::model_resolver::ModelResolver;
use faceoverlay_core::detection::infrastructure::rustface_detector::RustfaceDetector;
use faceoverlay_core::detection::infrastructure::single_flight_dispatcher::DispatchStatus;
use faceoverlay_core::overlay::domain::coordinate_transformer::CoordinateTransformer;
use faceoverlay_core::overlay::domain::error_notifier::LogErrorNotifier;
use faceoverlay_core::overlay::domain::face_bounds_overlay::{FaceBoundsOverlay, FaceCallbacks};
use faceoverlay_core::overlay::infrastructure::image_overlay_renderer::ImageOverlayRenderer;
use faceoverlay_core::pipeline::process_frames_use_case::{OverlayEvent, ProcessFramesUseCase};
use faceoverlay_core::shared::camera::{Facing, Orientation, Size};
use faceoverlay_core::shared::config::OverlayConfig;
use faceoverlay_core::shared::constants::{IMAGE_EXTENSIONS, SEETA_MODEL_NAME, SEETA_MODEL_URL};
use faceoverlay_core::shared::frame::{Frame, PixelFormat};

/// Runs the face bounds overlay over still images treated as camera frames.
#[derive(Parser)]
#[command(name = "face-overlay")]
struct Cli {
    /// Input image files.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// SeetaFace model file (downloaded to the cache when omitted).
    #[arg(long)]
    model: Option<PathBuf>,

    /// Sensor rotation in degrees: 0, 90, 180 or 270.
    #[arg(long, default_value = "0")]
    rotation: i32,

    /// Camera the frames come from.
    #[arg(long, value_enum, default_value_t = CameraFacing::Back)]
    facing: CameraFacing,

    /// Overlay view width (defaults to the upright frame width).
    #[arg(long)]
    view_width: Option<u32>,

    /// Overlay view height (defaults to the upright frame height).
    #[arg(long)]
    view_height: Option<u32>,

    /// Directory for annotated images.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Settings file (defaults to the platform config directory).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CameraFacing {
    Front,
    Back,
}

impl From<CameraFacing> for Facing {
    fn from(facing: CameraFacing) -> Self {
        match facing {
            CameraFacing::Front => Facing::Front,
            CameraFacing::Back => Facing::Back,
        }
    }
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let config = OverlayConfig::load(cli.config.as_deref())?;
    let detector = build_detector(&cli, &config)?;
    let orientation = Orientation::from_degrees(cli.rotation)
        .ok_or_else(|| format!("Unsupported rotation: {}", cli.rotation))?;

    let mut use_case = ProcessFramesUseCase::new(
        detector,
        FaceBoundsOverlay::from_config(&config),
        Arc::new(LogErrorNotifier),
    );
    let events = use_case.events();
    let facing = Facing::from(cli.facing);
    let mut failures = 0usize;

    if let Some(dir) = &cli.output {
        std::fs::create_dir_all(dir)?;
    }

    for input in &cli.inputs {
        let sensor = image::open(input)?.to_rgb8();
        let view_image = view_image(
            &sensor,
            orientation,
            facing,
            cli.view_width,
            cli.view_height,
        );
        use_case.set_view_size(Size::new(
            view_image.width() as f32,
            view_image.height() as f32,
        ));

        let (width, height) = sensor.dimensions();
        let frame = Frame::new(
            sensor.into_raw(),
            width,
            height,
            cli.rotation,
            PixelFormat::Rgb8,
            facing == Facing::Back,
        );

        match use_case.process(frame, callbacks_for(input)) {
            DispatchStatus::Accepted => {}
            DispatchStatus::Dropped => {
                log::warn!("Skipped {}: detector busy", input.display());
                continue;
            }
            DispatchStatus::Closed => return Err("Face detector is closed".into()),
        }

        match events.recv()? {
            OverlayEvent::Invalidated => {
                let mut renderer = ImageOverlayRenderer::new(view_image);
                let classification = use_case.draw(&mut renderer);
                println!("{}: {}", input.display(), classification.label());
                if let Some(dir) = &cli.output {
                    let dest = output_path(dir, input);
                    renderer.into_image().save(&dest)?;
                    log::info!("Output written to {}", dest.display());
                }
            }
            OverlayEvent::DetectionFailed(e) => {
                eprintln!("{}: {e}", input.display());
                failures += 1;
            }
        }
    }

    use_case.close();

    if failures > 0 {
        return Err(format!("{failures} of {} image(s) failed", cli.inputs.len()).into());
    }
    Ok(())
}

fn build_detector(
    cli: &Cli,
    config: &OverlayConfig,
) -> Result<Box<dyn FaceDetector>, Box<dyn std::error::Error>> {
    let model_path = match &cli.model {
        Some(path) => path.clone(),
        None => {
            log::info!("Resolving model: {SEETA_MODEL_NAME}");
            let path = ModelResolver::with_default_cache()?.resolve(
                SEETA_MODEL_NAME,
                SEETA_MODEL_URL,
                Some(Box::new(download_progress)),
            )?;
            eprintln!();
            path
        }
    };
    Ok(Box::new(RustfaceDetector::from_model_file(
        &model_path,
        config.detector.clone(),
    )?))
}

fn callbacks_for(input: &Path) -> FaceCallbacks {
    let (none, one, many) = (
        input.display().to_string(),
        input.display().to_string(),
        input.display().to_string(),
    );
    FaceCallbacks::new()
        .on_no_face(move || log::debug!("{none}: no centred face"))
        .on_exactly_one_face(move |face| {
            log::debug!(
                "{one}: face at ({:.0}, {:.0}) score {:.2}",
                face.exact_center_x(),
                face.exact_center_y(),
                face.score
            )
        })
        .on_more_faces(move || log::debug!("{many}: several faces"))
}

/// The sensor image as the overlay's view shows it: rotated upright,
/// mirrored the way the overlay mirrors face centres, then scaled to the
/// requested view size.
fn view_image(
    sensor: &RgbImage,
    orientation: Orientation,
    facing: Facing,
    width: Option<u32>,
    height: Option<u32>,
) -> RgbImage {
    let mut upright = match orientation {
        Orientation::Angle0 => sensor.clone(),
        Orientation::Angle90 => imageops::rotate90(sensor),
        Orientation::Angle180 => imageops::rotate180(sensor),
        Orientation::Angle270 => imageops::rotate270(sensor),
    };
    let preview = Size::new(upright.width() as f32, upright.height() as f32);
    if let Some(transformer) = CoordinateTransformer::new(preview, preview, orientation, facing) {
        if transformer.mirrors_x() {
            imageops::flip_horizontal_in_place(&mut upright);
        }
        if transformer.mirrors_y() {
            imageops::flip_vertical_in_place(&mut upright);
        }
    }
    let target = (
        width.unwrap_or(upright.width()),
        height.unwrap_or(upright.height()),
    );
    if target == upright.dimensions() {
        upright
    } else {
        imageops::resize(&upright, target.0, target.1, imageops::FilterType::Triangle)
    }
}

fn output_path(dir: &Path, input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "frame".to_string());
    dir.join(format!("{stem}_overlay.png"))
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    for input in &cli.inputs {
        if !input.exists() {
            return Err(format!("Input file not found: {}", input.display()).into());
        }
        if !is_image(input) {
            return Err(format!("Not a supported image: {}", input.display()).into());
        }
    }
    if let Some(model) = &cli.model {
        if !model.exists() {
            return Err(format!("Model file not found: {}", model.display()).into());
        }
    }
    if Orientation::from_degrees(cli.rotation).is_none() {
        return Err(format!(
            "Rotation must be a multiple of 90 degrees, got {}",
            cli.rotation
        )
        .into());
    }
    if cli.view_width == Some(0) || cli.view_height == Some(0) {
        return Err("View dimensions must be positive".into());
    }
    Ok(())
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading face detection model... {pct}%");
    } else {
        eprint!("\rDownloading face detection model... {downloaded} bytes");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faceoverlay_core::overlay::domain::overlay_renderer::{BoundsStyle, OverlayRenderer};
    use faceoverlay_core::shared::face_bounds::FaceBounds;
    use image::Rgb;
    use rstest::rstest;

    const MARK: Rgb<u8> = Rgb([255, 255, 255]);

    /// 640x480 sensor image with one white pixel that lands at (100, 320)
    /// once rotated upright by 270 degrees.
    fn marked_sensor() -> RgbImage {
        let mut sensor = RgbImage::new(640, 480);
        sensor.put_pixel(319, 100, MARK);
        sensor
    }

    #[rstest]
    #[case::front(Facing::Front)]
    #[case::back(Facing::Back)]
    fn test_outline_lands_on_the_face_in_the_view(#[case] facing: Facing) {
        let view = view_image(&marked_sensor(), Orientation::Angle270, facing, None, None);
        let size = Size::new(view.width() as f32, view.height() as f32);
        assert_eq!(size, Size::new(480.0, 640.0));

        let face = FaceBounds::centered_at(100.5, 320.5, 40.0, 40.0);
        let transformer =
            CoordinateTransformer::new(size, size, Orientation::Angle270, facing).unwrap();
        let (cx, cy) = transformer.map_center(&face);

        assert_eq!(*view.get_pixel(cx as u32, cy as u32), MARK);
        assert_eq!(transformer.map_bounds(&face).center(), (cx, cy));
    }

    #[test]
    fn test_unmirrored_view_is_plain_upright_image() {
        let view = view_image(&marked_sensor(), Orientation::Angle0, Facing::Front, None, None);
        assert_eq!(view.dimensions(), (640, 480));
        assert_eq!(*view.get_pixel(319, 100), MARK);
    }

    #[test]
    fn test_view_is_scaled_to_requested_size() {
        let view = view_image(&marked_sensor(), Orientation::Angle90, Facing::Back, Some(240), Some(320));
        assert_eq!(view.dimensions(), (240, 320));
    }

    #[test]
    fn test_outline_drawn_around_mirrored_face() {
        let view = view_image(&marked_sensor(), Orientation::Angle270, Facing::Front, None, None);
        let size = Size::new(480.0, 640.0);
        let transformer =
            CoordinateTransformer::new(size, size, Orientation::Angle270, Facing::Front).unwrap();
        let rect = transformer.map_bounds(&FaceBounds::centered_at(100.5, 320.5, 40.0, 40.0));

        let mut renderer = ImageOverlayRenderer::new(view);
        renderer.draw_bounds(&rect, &BoundsStyle::default());
        let image = renderer.into_image();

        // face pixel stays visible inside the box, the box edge is painted
        assert_eq!(*image.get_pixel(379, 320), MARK);
        assert_eq!(image.get_pixel(rect.left as u32, 320).0, BoundsStyle::default().color);
    }

    #[test]
    fn test_facing_is_parsed_by_clap() {
        let cli = Cli::try_parse_from(["face-overlay", "a.png", "--facing", "front"]).unwrap();
        assert_eq!(cli.facing, CameraFacing::Front);
        assert_eq!(Facing::from(cli.facing), Facing::Front);

        let cli = Cli::try_parse_from(["face-overlay", "a.png"]).unwrap();
        assert_eq!(cli.facing, CameraFacing::Back);
    }

    #[test]
    fn test_unknown_facing_is_rejected() {
        assert!(Cli::try_parse_from(["face-overlay", "a.png", "--facing", "sideways"]).is_err());
    }
}
