use std::sync::{Arc, Mutex};
use std::time::Duration;

use faceoverlay_core::detection::domain::face_detector::{DetectionError, FaceDetector};
use faceoverlay_core::detection::infrastructure::single_flight_dispatcher::DispatchStatus;
use faceoverlay_core::overlay::domain::error_notifier::ErrorNotifier;
use faceoverlay_core::overlay::domain::face_bounds_overlay::{FaceBoundsOverlay, FaceCallbacks};
use faceoverlay_core::overlay::domain::face_classifier::FaceClassification;
use faceoverlay_core::overlay::infrastructure::image_overlay_renderer::ImageOverlayRenderer;
use faceoverlay_core::pipeline::process_frames_use_case::{OverlayEvent, ProcessFramesUseCase};
use faceoverlay_core::shared::config::OverlayConfig;
use faceoverlay_core::shared::face_bounds::FaceBounds;
use faceoverlay_core::shared::frame::{Frame, PixelFormat};
use image::RgbImage;
use rstest::rstest;

const TIMEOUT: Duration = Duration::from_secs(5);

/// Replays a scripted sequence of results, then repeats the last one.
struct ScriptedDetector {
    script: Vec<Result<Vec<FaceBounds>, DetectionError>>,
    next: usize,
}

impl FaceDetector for ScriptedDetector {
    fn detect(&mut self, _frame: &Frame) -> Result<Vec<FaceBounds>, DetectionError> {
        let i = self.next.min(self.script.len() - 1);
        self.next += 1;
        self.script[i].clone()
    }
}

#[derive(Default)]
struct Toasts(Mutex<Vec<String>>);

impl ErrorNotifier for Toasts {
    fn notify(&self, message: &str) {
        self.0.lock().unwrap().push(message.to_string());
    }
}

fn use_case(
    script: Vec<Result<Vec<FaceBounds>, DetectionError>>,
    toasts: Arc<Toasts>,
) -> ProcessFramesUseCase {
    ProcessFramesUseCase::new(
        Box::new(ScriptedDetector { script, next: 0 }),
        FaceBoundsOverlay::from_config(&OverlayConfig::default()),
        toasts,
    )
}

/// 640x480 RGB frame from the back camera, rotated a quarter turn.
fn frame() -> Frame {
    Frame::new(vec![0u8; 640 * 480 * 3], 640, 480, 90, PixelFormat::Rgb8, true)
}

fn draw_next(uc: &ProcessFramesUseCase) -> (FaceClassification, RgbImage) {
    assert_eq!(
        uc.events().recv_timeout(TIMEOUT).unwrap(),
        OverlayEvent::Invalidated
    );
    let mut renderer = ImageOverlayRenderer::new(RgbImage::new(480, 640));
    uc.set_view_size(renderer.size());
    let classification = uc.draw(&mut renderer);
    (classification, renderer.into_image())
}

#[rstest]
#[case::centred(vec![FaceBounds::centered_at(240.0, 320.0, 120.0, 120.0)], "exactly one face")]
#[case::corner(vec![FaceBounds::centered_at(0.0, 0.0, 60.0, 60.0)], "no face")]
#[case::empty(Vec::new(), "no face")]
#[case::crowd(
    vec![
        FaceBounds::centered_at(240.0, 320.0, 60.0, 60.0),
        FaceBounds::centered_at(400.0, 100.0, 60.0, 60.0),
    ],
    "more than one face"
)]
fn test_frame_to_classification(#[case] faces: Vec<FaceBounds>, #[case] expected: &str) {
    let uc = use_case(vec![Ok(faces)], Arc::default());

    assert_eq!(uc.process(frame(), FaceCallbacks::new()), DispatchStatus::Accepted);
    let (classification, _) = draw_next(&uc);

    assert_eq!(classification.label(), expected);
}

#[test]
fn test_centred_face_is_outlined_in_output_image() {
    let face = FaceBounds::centered_at(240.0, 320.0, 120.0, 120.0);
    let uc = use_case(vec![Ok(vec![face])], Arc::default());
    let default_color = OverlayConfig::default().bounds.color;

    uc.process(frame(), FaceCallbacks::new());
    let (_, image) = draw_next(&uc);

    // left edge of the box sits at x = 180
    assert_eq!(image.get_pixel(180, 320).0, default_color);
    assert_eq!(image.get_pixel(240, 320).0, [0, 0, 0]);
}

#[test]
fn test_callbacks_follow_each_result() {
    let uc = use_case(
        vec![
            Ok(vec![FaceBounds::centered_at(240.0, 320.0, 120.0, 120.0)]),
            Ok(Vec::new()),
        ],
        Arc::default(),
    );
    let seen = Arc::new(Mutex::new(Vec::new()));

    for _ in 0..2 {
        let (one, none) = (seen.clone(), seen.clone());
        let callbacks = FaceCallbacks::new()
            .on_exactly_one_face(move |_| one.lock().unwrap().push("one"))
            .on_no_face(move || none.lock().unwrap().push("none"));
        assert_eq!(uc.process(frame(), callbacks), DispatchStatus::Accepted);
        draw_next(&uc);
    }

    assert_eq!(*seen.lock().unwrap(), vec!["one", "none"]);
}

#[test]
fn test_failure_is_toasted_and_processing_recovers() {
    let toasts = Arc::new(Toasts::default());
    let uc = use_case(
        vec![
            Err(DetectionError::Failed("out of memory".into())),
            Ok(vec![FaceBounds::centered_at(240.0, 320.0, 120.0, 120.0)]),
        ],
        toasts.clone(),
    );

    uc.process(frame(), FaceCallbacks::new());
    assert!(matches!(
        uc.events().recv_timeout(TIMEOUT).unwrap(),
        OverlayEvent::DetectionFailed(_)
    ));
    assert_eq!(
        toasts.0.lock().unwrap().as_slice(),
        ["Error processing images: detection failed: out of memory"]
    );

    uc.process(frame(), FaceCallbacks::new());
    let (classification, _) = draw_next(&uc);
    assert_eq!(classification.label(), "exactly one face");
    assert!(uc.last_frame().is_some());
}
