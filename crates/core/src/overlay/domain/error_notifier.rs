/// Surfaces transient, user-visible messages (the overlay's "toast").
pub trait ErrorNotifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Notifier that only writes to the log.
pub struct LogErrorNotifier;

impl ErrorNotifier for LogErrorNotifier {
    fn notify(&self, message: &str) {
        log::warn!("{message}");
    }
}
