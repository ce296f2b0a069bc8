use std::{
    fmt,
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use futures::FutureExt;
use stream_cancel::{Trigger, Tripwire};

/// Resolves once shutdown has begun.
///
/// Every task of a listener holds a clone; dropping or cancelling the paired
/// [`Trigger`] fires all of them at once.
#[derive(Clone)]
pub struct ShutdownSignal {
    begin_shutdown: Tripwire,
}

impl ShutdownSignal {
    pub fn new(begin_shutdown: Tripwire) -> Self {
        Self { begin_shutdown }
    }

    /// Creates a signal together with the trigger that fires it.
    pub fn new_wired() -> (Trigger, Self) {
        let (trigger, tripwire) = Tripwire::new();
        (trigger, Self::new(tripwire))
    }
}

impl Future for ShutdownSignal {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.begin_shutdown.poll_unpin(cx).map(|_| ())
    }
}

impl fmt::Debug for ShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShutdownSignal").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::timeout;

    use super::*;

    #[tokio::test]
    async fn fires_every_clone_when_the_trigger_is_cancelled() {
        let (trigger, signal) = ShutdownSignal::new_wired();
        let other = signal.clone();

        trigger.cancel();

        timeout(Duration::from_secs(1), signal).await.unwrap();
        timeout(Duration::from_secs(1), other).await.unwrap();
    }

    #[tokio::test]
    async fn fires_when_the_trigger_is_dropped() {
        let (trigger, signal) = ShutdownSignal::new_wired();
        drop(trigger);
        timeout(Duration::from_secs(1), signal).await.unwrap();
    }
}
