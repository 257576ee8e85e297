//! Release handle for an open streaming response.

use std::fmt;

/// Releases the connection behind a stream.
///
/// The release action is taken out of the controller when it runs, so it
/// can fire at most once however many exit paths reach it.
#[derive(Default)]
pub struct StreamController {
    on_abort: Option<Box<dyn FnOnce() + Send>>,
    aborted: bool,
}

impl fmt::Debug for StreamController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamController")
            .field("aborted", &self.aborted)
            .finish()
    }
}

impl StreamController {
    /// A controller with no release action of its own.
    pub fn new() -> Self {
        Self::default()
    }

    /// A controller that runs `on_abort` when the stream is released.
    pub fn with_abort<F>(on_abort: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            on_abort: Some(Box::new(on_abort)),
            aborted: false,
        }
    }

    /// Marks the stream released and runs the release action.
    ///
    /// Returns `true` only for the call that actually released it.
    pub fn abort(&mut self) -> bool {
        if self.aborted {
            return false;
        }
        self.aborted = true;
        if let Some(on_abort) = self.on_abort.take() {
            on_abort();
        }
        true
    }

    /// Returns `true` once the stream has been released.
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }
}
