use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative stop signal shared between the Ctrl-C handler and the
/// capture loops. Both the enrollment and the test loop check it once per
/// frame; neither loop blocks longer than a single frame read.
#[derive(Clone, Debug, Default)]
pub struct StopFlag {
    stopped: Arc<AtomicBool>,
}

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

/// Install a Ctrl-C handler that trips the given flag.
///
/// Cancellation is not an error: the loops observe the flag and exit
/// cleanly, releasing the recorder and engine handles on the way out.
pub fn install_ctrlc(flag: &StopFlag) -> Result<(), ctrlc::Error> {
    let flag = flag.clone();
    ctrlc::set_handler(move || {
        tracing::info!("Stop requested via Ctrl-C");
        flag.trigger();
    })
}
