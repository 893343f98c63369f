/// Receives human-readable progress messages from the tracker.
pub trait StatusSink {
    fn update_info(&self, message: &str);
}

/// Forwards status messages to the log.
pub struct LogStatus;

impl StatusSink for LogStatus {
    fn update_info(&self, message: &str) {
        log::info!("{}", message);
    }
}

impl<F: Fn(&str)> StatusSink for F {
    fn update_info(&self, message: &str) {
        self(message)
    }
}
