//! The mail-waiting core: poll an inbox until a mail matching a predicate
//! arrives, a deadline passes, or the caller cancels.
//!
//! The wait algorithm lives in one place ([`WaitState`], a state machine with
//! no I/O of its own) and is driven by two thin adapters with identical
//! semantics: [`wait_for_match`] suspends on the Tokio timer, and
//! [`wait_for_match_blocking`] sleeps the calling thread. Which inbox gets
//! polled is abstracted behind [`FetchInbox`] / [`BlockingFetchInbox`], so
//! the loop can be exercised against scripted inboxes in tests.

use crate::error::{BoxError, WaitError};
use crate::models::Email;
use async_trait::async_trait;
use log::debug;
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Source of inbox snapshots for the async wait driver.
///
/// Implemented by [`crate::Client`]; implement it yourself to wait over a
/// fake or alternative mail source.
#[async_trait]
pub trait FetchInbox: Send + Sync {
    /// Return the mail currently visible in `address`'s inbox. Ordering is
    /// service-defined and callers must not rely on it.
    async fn fetch_inbox(&self, address: &str) -> crate::Result<Vec<Email>>;
}

/// Source of inbox snapshots for the blocking wait driver.
pub trait BlockingFetchInbox {
    /// Return the mail currently visible in `address`'s inbox.
    fn fetch_inbox(&self, address: &str) -> crate::Result<Vec<Email>>;
}

/// Final verdict of a wait call.
///
/// Transport and predicate failures are reported separately as
/// [`WaitError`]; every wait produces exactly one outcome or error.
#[derive(Debug, Clone, PartialEq)]
pub enum WaitOutcome {
    /// A mail satisfying the predicate arrived.
    Matched(Email),
    /// The deadline passed with no match. This is a normal outcome, not an
    /// error: the caller decides whether "no mail yet" warrants another wait.
    TimedOut,
    /// The cancellation token fired before a match or timeout.
    Cancelled,
}

/// Timing and cancellation parameters for a wait call.
#[derive(Debug, Clone)]
pub struct WaitOptions {
    /// Maximum total wait. Zero means poll exactly once and report.
    pub timeout: Duration,
    /// Delay between polls. Must be positive; it is capped per-sleep so the
    /// wait never overshoots the deadline by a full interval.
    pub interval: Duration,
    /// Optional external cancellation. Observed around suspensions, so a
    /// cancel takes effect within roughly one polling granularity.
    pub cancel: Option<CancellationToken>,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            interval: Duration::from_secs(2),
            cancel: None,
        }
    }
}

impl WaitOptions {
    /// Options with the given timeout and poll interval and no cancellation.
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self {
            timeout,
            interval,
            cancel: None,
        }
    }

    /// Attach a cancellation token.
    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|t| t.is_cancelled())
    }
}

/// How often the blocking driver wakes mid-sleep to check for cancellation.
const CANCEL_GRANULARITY: Duration = Duration::from_millis(50);

/// What the driver should do after one poll has been evaluated.
#[derive(Debug)]
enum Step {
    Matched(Email),
    TimedOut,
    Sleep(Duration),
}

/// One wait call's state: the predicate, the ids already evaluated, and the
/// deadline. Pure bookkeeping; the drivers own all I/O and suspension.
struct WaitState<F> {
    predicate: F,
    seen: HashSet<String>,
    started: Instant,
    timeout: Duration,
    interval: Duration,
}

impl<F> WaitState<F>
where
    F: FnMut(&Email) -> Result<bool, BoxError>,
{
    fn new(predicate: F, options: &WaitOptions, now: Instant) -> Self {
        Self {
            predicate,
            seen: HashSet::new(),
            started: now,
            timeout: options.timeout,
            interval: options.interval,
        }
    }

    /// Evaluate one inbox snapshot.
    ///
    /// Mail already seen in this call is skipped, so a rejected mail is
    /// never handed to the predicate twice even if the service returns it on
    /// every poll. Novel mail is evaluated in snapshot order; the first
    /// match ends the wait, and a predicate error ends it without touching
    /// the rest of the snapshot.
    fn observe(&mut self, snapshot: Vec<Email>, now: Instant) -> Result<Step, WaitError> {
        for mail in snapshot {
            if !self.seen.insert(mail.id.clone()) {
                continue;
            }
            match (self.predicate)(&mail) {
                Ok(true) => return Ok(Step::Matched(mail)),
                Ok(false) => {}
                Err(err) => return Err(WaitError::Predicate(err)),
            }
        }

        let elapsed = now.saturating_duration_since(self.started);
        if elapsed >= self.timeout {
            return Ok(Step::TimedOut);
        }
        // Cap the sleep so the next wake lands on or before the deadline.
        Ok(Step::Sleep(self.interval.min(self.timeout - elapsed)))
    }
}

fn validate(address: &str, options: &WaitOptions) -> Result<(), WaitError> {
    if address.is_empty() {
        return Err(WaitError::InvalidArguments("address must not be empty"));
    }
    if options.interval.is_zero() {
        return Err(WaitError::InvalidArguments("interval must be positive"));
    }
    Ok(())
}

/// Poll `source` until a mail matching `predicate` arrives in `address`'s
/// inbox, the timeout passes, or the cancellation token fires.
///
/// Polls are strictly sequential: the next fetch never starts before the
/// previous snapshot's predicate evaluations complete. All state is local to
/// the call, so any number of waits may run concurrently over one source.
pub async fn wait_for_match<S, F>(
    source: &S,
    address: &str,
    predicate: F,
    options: &WaitOptions,
) -> Result<WaitOutcome, WaitError>
where
    S: FetchInbox + ?Sized,
    F: FnMut(&Email) -> Result<bool, BoxError> + Send,
{
    validate(address, options)?;
    let mut state = WaitState::new(predicate, options, Instant::now());

    loop {
        if options.is_cancelled() {
            return Ok(WaitOutcome::Cancelled);
        }

        let snapshot = source.fetch_inbox(address).await?;
        debug!("polled {address}: {} mail visible", snapshot.len());

        match state.observe(snapshot, Instant::now())? {
            Step::Matched(mail) => return Ok(WaitOutcome::Matched(mail)),
            Step::TimedOut => return Ok(WaitOutcome::TimedOut),
            Step::Sleep(delay) => match &options.cancel {
                Some(token) => {
                    tokio::select! {
                        _ = token.cancelled() => return Ok(WaitOutcome::Cancelled),
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
                None => tokio::time::sleep(delay).await,
            },
        }
    }
}

/// Blocking counterpart of [`wait_for_match`]; occupies the calling thread.
///
/// Semantics are identical to the async driver. Suspension is a thread
/// sleep taken in short slices so an external cancel is noticed within
/// about 50 ms.
pub fn wait_for_match_blocking<S, F>(
    source: &S,
    address: &str,
    predicate: F,
    options: &WaitOptions,
) -> Result<WaitOutcome, WaitError>
where
    S: BlockingFetchInbox + ?Sized,
    F: FnMut(&Email) -> Result<bool, BoxError>,
{
    validate(address, options)?;
    let mut state = WaitState::new(predicate, options, Instant::now());

    loop {
        if options.is_cancelled() {
            return Ok(WaitOutcome::Cancelled);
        }

        let snapshot = source.fetch_inbox(address)?;
        debug!("polled {address}: {} mail visible", snapshot.len());

        match state.observe(snapshot, Instant::now())? {
            Step::Matched(mail) => return Ok(WaitOutcome::Matched(mail)),
            Step::TimedOut => return Ok(WaitOutcome::TimedOut),
            Step::Sleep(delay) => {
                let wake = Instant::now() + delay;
                loop {
                    if options.is_cancelled() {
                        return Ok(WaitOutcome::Cancelled);
                    }
                    let now = Instant::now();
                    if now >= wake {
                        break;
                    }
                    std::thread::sleep((wake - now).min(CANCEL_GRANULARITY));
                }
            }
        }
    }
}
