//! Progress indicators for otp-deploy.

use indicatif::{ProgressBar, ProgressStyle};
use std::thread;
use std::time::Duration;

/// Spinner with a message, ticking on its own thread.
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg} {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Block for `duration` behind a spinner. Zero returns immediately.
pub fn wait(duration: Duration, msg: &str) {
    if duration.is_zero() {
        return;
    }
    log::debug!("waiting {}s: {msg}", duration.as_secs());
    let pb = spinner(msg);
    thread::sleep(duration);
    pb.finish_and_clear();
}
