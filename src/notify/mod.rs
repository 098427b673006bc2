//! Transient user notifications (the toast boundary of the results view).
use tracing::{event, Level};

/// Message shown whenever a results cycle fails, scheduled or manual
pub const FETCH_FAILED_MESSAGE: &str = "Failed to load live results. Please try again.";

/// Trait that defines how the pipeline surfaces transient messages to the user
pub trait Notifier {
    fn error(&self, message: &str);
}

/// Default [`Notifier`]: the message goes to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn error(&self, message: &str) {
        event!(Level::ERROR, "{}", message);
    }
}
