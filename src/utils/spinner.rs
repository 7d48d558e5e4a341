//! Progress indicator on stderr while a chat request is in flight.

use std::io::{self, IsTerminal, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

pub const SPINNER_FRAMES: [&str; 10] = [
    "⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏",
];
const FRAME_INTERVAL: Duration = Duration::from_millis(80);

/// Animated `<frame> <message>` line, cleared again on [`Spinner::stop`] or drop.
///
/// Only runs when enabled and stderr is a terminal, so piped output and
/// `--quiet` runs stay clean. Must be started inside a tokio runtime.
pub struct Spinner {
    stop_flag: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl Spinner {
    pub fn start(message: &str, enabled: bool) -> Self {
        let stop_flag = Arc::new(AtomicBool::new(false));
        if !enabled || !io::stderr().is_terminal() {
            return Self {
                stop_flag,
                task: None,
            };
        }

        let message = message.to_string();
        let flag = Arc::clone(&stop_flag);
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(FRAME_INTERVAL);
            for frame in SPINNER_FRAMES.iter().cycle() {
                interval.tick().await;
                let mut stderr = io::stderr().lock();
                if flag.load(Ordering::SeqCst) {
                    return;
                }
                let _ = write!(stderr, "\r{frame} {message}");
                let _ = stderr.flush();
            }
        });

        Self {
            stop_flag,
            task: Some(task),
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    pub fn stop(&mut self) {
        let Some(task) = self.task.take() else {
            return;
        };
        self.stop_flag.store(true, Ordering::SeqCst);
        task.abort();

        // Holding the lock after setting the flag keeps a late frame off the cleared line.
        let mut stderr = io::stderr().lock();
        let _ = write!(stderr, "\r\x1b[2K");
        let _ = stderr.flush();
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_spinner_never_starts() {
        let mut spinner = Spinner::start("thinking...", false);
        assert!(!spinner.is_running());
        spinner.stop();
        spinner.stop();
        assert!(!spinner.is_running());
    }

    #[tokio::test]
    async fn stop_is_idempotent_when_running() {
        let mut spinner = Spinner::start("thinking...", true);
        spinner.stop();
        assert!(!spinner.is_running());
        spinner.stop();
    }

    #[test]
    fn frames_are_single_glyphs() {
        assert!(SPINNER_FRAMES.iter().all(|frame| frame.chars().count() == 1));
    }
}
