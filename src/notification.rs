const APP_NAME: &str = "mapsketch";

/// Sink for user-visible notices such as a failed map capture.
pub trait Notifier {
    fn notify(&self, body: &str);
}

/// Desktop notification through the session's notification daemon.
#[derive(Debug, Clone, Copy, Default)]
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn notify(&self, body: &str) {
        if let Err(err) = notify_rust::Notification::new()
            .appname(APP_NAME)
            .summary(APP_NAME)
            .body(body)
            .show()
        {
            tracing::warn!("system notification failed: {err}");
        }
    }
}

/// Writes notices to the log only.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, body: &str) {
        tracing::warn!(notice = body, "user notice");
    }
}

/// Desktop notices when enabled, log lines otherwise.
pub fn notifier_for(desktop: bool) -> Box<dyn Notifier> {
    if desktop {
        Box::new(DesktopNotifier)
    } else {
        Box::new(LogNotifier)
    }
}
