/// Destination for status events raised by pipeline stages.
///
/// Stages report through an injected sink instead of calling the global
/// logger, so selection and wiring logic can be observed in tests and
/// redirected by embedding applications.
pub trait EventSink {
    fn warn(&self, source: &str, message: &str);
    fn info(&self, source: &str, message: &str);
}

/// Forwards events to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn warn(&self, source: &str, message: &str) {
        log::warn!("{}: {}", source, message);
    }

    fn info(&self, source: &str, message: &str) {
        log::info!("{}: {}", source, message);
    }
}
