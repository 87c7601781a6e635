//! Turn timer backed by the tokio runtime.

use crate::clock::{TimerToken, TurnTimer};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, trace};

/// [`TurnTimer`] that sleeps on the tokio runtime and delivers elapsed tokens
/// over a channel.
///
/// The receiving end is returned from [`TokioTimer::new`]; the host loop
/// forwards each received token to
/// [`TurnEngine::handle_timeout`](crate::TurnEngine::handle_timeout).
/// A token that arrives after it was cancelled is ignored by the engine.
///
/// Arming spawns a task, so it must happen inside a tokio runtime.
#[derive(Debug)]
pub struct TokioTimer {
    tx: mpsc::UnboundedSender<TimerToken>,
    pending: Option<(TimerToken, JoinHandle<()>)>,
}

impl TokioTimer {
    /// Creates a timer and the channel its elapsed tokens are delivered on.
    #[instrument]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TimerToken>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx, pending: None }, rx)
    }

    fn abort_pending(&mut self) {
        if let Some((token, handle)) = self.pending.take() {
            trace!(%token, "Aborting timer task");
            handle.abort();
        }
    }
}

impl TurnTimer for TokioTimer {
    fn arm(&mut self, token: TimerToken, after: Duration) {
        self.abort_pending();
        let tx = self.tx.clone();
        debug!(%token, ?after, "Arming turn timer");
        let handle = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            // Receiver gone means the host stopped listening.
            let _ = tx.send(token);
        });
        self.pending = Some((token, handle));
    }

    fn cancel(&mut self, token: TimerToken) {
        if self.pending.as_ref().map(|(pending, _)| *pending) == Some(token) {
            self.abort_pending();
        }
    }
}

impl Drop for TokioTimer {
    fn drop(&mut self) {
        self.abort_pending();
    }
}
