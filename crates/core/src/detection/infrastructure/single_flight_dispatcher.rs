use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender, TrySendError};

use crate::detection::domain::face_detector::{DetectionError, FaceDetector};
use crate::shared::face_bounds::FaceBounds;
use crate::shared::frame::Frame;

pub type SuccessFn = Box<dyn FnOnce(Vec<FaceBounds>) + Send>;
pub type ErrorFn = Box<dyn FnOnce(DetectionError) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStatus {
    /// The frame was handed to the detector.
    Accepted,
    /// A detection was already in flight; the frame was discarded.
    Dropped,
    /// The dispatcher has been closed or its worker has died.
    Closed,
}

struct Job {
    frame: Arc<Frame>,
    on_success: SuccessFn,
    on_error: ErrorFn,
}

/// Runs a detector on its own thread with at most one request in flight.
///
/// Requests arriving while a detection is running are dropped, never queued.
/// The busy flag is claimed with a compare-and-swap, so concurrent callers
/// cannot both get through, and it is released before the completion
/// callback runs so the callback may dispatch the next frame.
pub struct SingleFlightDispatcher {
    busy: Arc<AtomicBool>,
    job_tx: Option<Sender<Job>>,
    worker: Option<JoinHandle<()>>,
}

impl SingleFlightDispatcher {
    pub fn new(detector: Box<dyn FaceDetector>) -> Self {
        let (job_tx, job_rx) = crossbeam_channel::bounded::<Job>(1);
        let busy = Arc::new(AtomicBool::new(false));
        let worker = spawn_worker(detector, job_rx, busy.clone());
        Self {
            busy,
            job_tx: Some(job_tx),
            worker: Some(worker),
        }
    }

    pub fn dispatch(
        &self,
        frame: Arc<Frame>,
        on_success: impl FnOnce(Vec<FaceBounds>) + Send + 'static,
        on_error: impl FnOnce(DetectionError) + Send + 'static,
    ) -> DispatchStatus {
        let Some(job_tx) = self.job_tx.as_ref() else {
            return DispatchStatus::Closed;
        };

        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            log::trace!("Detection in flight, dropping frame");
            return DispatchStatus::Dropped;
        }

        let job = Job {
            frame,
            on_success: Box::new(on_success),
            on_error: Box::new(on_error),
        };

        match job_tx.try_send(job) {
            Ok(()) => DispatchStatus::Accepted,
            Err(TrySendError::Full(_)) => {
                // Slot still occupied; release the flag we just took.
                self.busy.store(false, Ordering::Release);
                DispatchStatus::Dropped
            }
            Err(TrySendError::Disconnected(_)) => {
                log::error!("Detection worker is gone");
                self.busy.store(false, Ordering::Release);
                DispatchStatus::Closed
            }
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Stops accepting frames, waits for the worker and closes the detector.
    pub fn close(&mut self) {
        drop(self.job_tx.take());
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                log::error!("Detection worker panicked");
            }
        }
    }
}

impl Drop for SingleFlightDispatcher {
    fn drop(&mut self) {
        self.close();
    }
}

fn spawn_worker(
    mut detector: Box<dyn FaceDetector>,
    job_rx: Receiver<Job>,
    busy: Arc<AtomicBool>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        for job in job_rx {
            let result = if job.frame.is_complete() {
                panic::catch_unwind(AssertUnwindSafe(|| detector.detect(&job.frame)))
                    .unwrap_or_else(|_| Err(DetectionError::Failed("detector panicked".into())))
            } else {
                Err(DetectionError::UnsupportedFrame(format!(
                    "expected {} bytes for {}x{} {:?}, got {}",
                    job.frame.format().expected_len(job.frame.width(), job.frame.height()),
                    job.frame.width(),
                    job.frame.height(),
                    job.frame.format(),
                    job.frame.data().len()
                )))
            };
            busy.store(false, Ordering::Release);

            match result {
                Ok(faces) => (job.on_success)(faces),
                Err(e) => {
                    log::error!("Error processing images: {e}");
                    (job.on_error)(e)
                }
            }
        }
        detector.close();
    })
}
