//! One-shot auto-advance timer
//!
//! The timer never touches controller state: on expiry it posts a message into
//! the controller inbox and the controller decides what to do with it.

use tokio::sync::mpsc::WeakUnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Duration, Instant};
use tracing::trace;

/// Stand-in deadline for delays past the end of the clock
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// Pending delayed callback feeding a message back into an inbox
#[derive(Debug)]
pub struct OneShotTimer {
    handle: JoinHandle<()>,
    deadline: Instant,
}

impl OneShotTimer {
    /// Post `message` into `inbox` after `delay`
    ///
    /// Holds only a weak sender, so a pending timer does not keep a controller
    /// alive after every handle to it is gone.
    pub fn arm<T: Send + 'static>(delay: Duration, inbox: WeakUnboundedSender<T>, message: T) -> Self {
        let now = Instant::now();
        let deadline = now.checked_add(delay).unwrap_or_else(|| now + FAR_FUTURE);
        let handle = tokio::spawn(async move {
            sleep_until(deadline).await;
            match inbox.upgrade() {
                Some(tx) => {
                    // Receiver gone means the controller already exited
                    let _ = tx.send(message);
                }
                None => trace!("Timer fired after its inbox closed"),
            }
        });
        Self { handle, deadline }
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Still waiting to fire
    pub fn is_armed(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Abort the pending callback; no-op once it has fired
    pub fn cancel(&self) {
        self.handle.abort();
    }
}

impl Drop for OneShotTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
