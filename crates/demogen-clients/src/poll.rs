//! Bounded polling for asynchronous provider tasks.
//!
//! Converts a submit/poll lifecycle into a single await with a total time
//! ceiling. Timing goes through `tokio::time`, so tests run against the
//! paused clock instead of real sleeps.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

/// Outcome of waiting on an asynchronous task.
///
/// `TimedOut` is a value, not an error: callers decide whether a timeout
/// is fatal for their stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Waited<T> {
    /// The task reached a terminal status; the final observed object.
    Terminal(T),
    /// `max_wait` elapsed without a terminal status.
    TimedOut,
}

impl<T> Waited<T> {
    /// Returns the terminal object, if any.
    pub fn terminal(self) -> Option<T> {
        match self {
            Waited::Terminal(value) => Some(value),
            Waited::TimedOut => None,
        }
    }

    /// Returns true if the wait timed out.
    pub fn is_timed_out(&self) -> bool {
        matches!(self, Waited::TimedOut)
    }
}

/// Poll `operation` every `poll_interval` until `is_terminal` says the
/// observed value is final or `max_wait` elapses.
///
/// Errors from the poll operation propagate immediately; they are not
/// retried here.
pub async fn wait_until<T, E, F, Fut>(
    mut operation: F,
    is_terminal: impl Fn(&T) -> bool,
    max_wait: Duration,
    poll_interval: Duration,
) -> Result<Waited<T>, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let deadline = Instant::now() + max_wait;

    loop {
        let observed = operation().await?;
        if is_terminal(&observed) {
            return Ok(Waited::Terminal(observed));
        }

        if Instant::now() + poll_interval > deadline {
            debug!("Wait exhausted after {:?}", max_wait);
            return Ok(Waited::TimedOut);
        }
        tokio::time::sleep(poll_interval).await;
    }
}
