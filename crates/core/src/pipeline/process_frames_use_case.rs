use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crossbeam_channel::{Receiver, Sender};

use crate::detection::domain::face_detector::{DetectionError, FaceDetector};
use crate::detection::infrastructure::single_flight_dispatcher::{
    DispatchStatus, SingleFlightDispatcher,
};
use crate::overlay::domain::error_notifier::ErrorNotifier;
use crate::overlay::domain::face_bounds_overlay::{
    FaceBoundsOverlay, FaceCallbacks, OverlayAttributes,
};
use crate::overlay::domain::face_classifier::FaceClassification;
use crate::overlay::domain::overlay_renderer::OverlayRenderer;
use crate::shared::camera::Size;
use crate::shared::constants::DETECTION_ERROR_PREFIX;
use crate::shared::frame::Frame;

/// Sent to the UI side whenever a detection completes.
///
/// The channel holds one event. While an event is unread, later ones are
/// dropped; the overlay state already reflects the newest result.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayEvent {
    /// New faces were stored; the overlay should be redrawn.
    Invalidated,
    DetectionFailed(DetectionError),
}

/// Entry point for camera frames.
///
/// Each frame updates the overlay's camera geometry and, if no detection is
/// running, is handed to the detector. Results land in the shared overlay
/// and an [`OverlayEvent`] tells the UI thread to call [`Self::draw`].
pub struct ProcessFramesUseCase {
    overlay: Arc<Mutex<FaceBoundsOverlay>>,
    dispatcher: SingleFlightDispatcher,
    notifier: Arc<dyn ErrorNotifier>,
    events_tx: Sender<OverlayEvent>,
    events_rx: Receiver<OverlayEvent>,
}

impl ProcessFramesUseCase {
    pub fn new(
        detector: Box<dyn FaceDetector>,
        overlay: FaceBoundsOverlay,
        notifier: Arc<dyn ErrorNotifier>,
    ) -> Self {
        let (events_tx, events_rx) = crossbeam_channel::bounded(1);
        Self {
            overlay: Arc::new(Mutex::new(overlay)),
            dispatcher: SingleFlightDispatcher::new(detector),
            notifier,
            events_tx,
            events_rx,
        }
    }

    /// Feeds one camera frame.
    ///
    /// Frames without image data only update geometry and report `Dropped`.
    pub fn process(&self, frame: Frame, callbacks: FaceCallbacks) -> DispatchStatus {
        {
            let mut overlay = lock(&self.overlay);
            match OverlayAttributes::from_frame(&frame) {
                Some(attributes) => {
                    overlay.update_attributes(attributes);
                }
                None => log::warn!(
                    "Ignoring overlay attributes for {}x{} frame at rotation {}",
                    frame.width(),
                    frame.height(),
                    frame.rotation()
                ),
            }
            overlay.set_callbacks(callbacks);
        }

        if !frame.has_data() {
            log::debug!("Frame has no image data, skipping detection");
            return DispatchStatus::Dropped;
        }

        let frame = Arc::new(frame);
        let overlay = self.overlay.clone();
        let success_tx = self.events_tx.clone();
        let error_tx = self.events_tx.clone();
        let notifier = self.notifier.clone();
        let source = frame.clone();

        self.dispatcher.dispatch(
            frame,
            move |faces| {
                lock(&overlay).update_faces(faces, source);
                post(&success_tx, OverlayEvent::Invalidated);
            },
            move |error| {
                notifier.notify(&format!("{DETECTION_ERROR_PREFIX}: {error}"));
                post(&error_tx, OverlayEvent::DetectionFailed(error));
            },
        )
    }

    pub fn events(&self) -> Receiver<OverlayEvent> {
        self.events_rx.clone()
    }

    pub fn overlay(&self) -> Arc<Mutex<FaceBoundsOverlay>> {
        self.overlay.clone()
    }

    pub fn set_view_size(&self, view: Size) {
        lock(&self.overlay).set_view_size(view);
    }

    /// Redraws the overlay onto `renderer`, notifying the installed callbacks.
    pub fn draw(&self, renderer: &mut dyn OverlayRenderer) -> FaceClassification {
        lock(&self.overlay).draw(renderer)
    }

    /// The frame behind the faces currently shown.
    pub fn last_frame(&self) -> Option<Arc<Frame>> {
        lock(&self.overlay).last_frame()
    }

    pub fn is_detecting(&self) -> bool {
        self.dispatcher.is_busy()
    }

    pub fn close(&mut self) {
        self.dispatcher.close();
    }
}

fn post(events: &Sender<OverlayEvent>, event: OverlayEvent) {
    if events.try_send(event).is_err() {
        log::trace!("Overlay event pending, coalescing");
    }
}

fn lock(overlay: &Mutex<FaceBoundsOverlay>) -> MutexGuard<'_, FaceBoundsOverlay> {
    overlay.lock().unwrap_or_else(PoisonError::into_inner)
}
