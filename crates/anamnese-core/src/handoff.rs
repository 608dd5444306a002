//! WhatsApp handoff after the document is emitted.
//!
//! The navigation is scheduled, not awaited: a one-shot timer fires after
//! [`HANDOFF_DELAY`] so the download has time to start. The returned
//! [`TimerHandle`] cancels the navigation when dropped or cancelled, and can
//! carry a hook that runs instead of the task on cancellation.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Messaging endpoint with the studio's fixed number.
pub const WHATSAPP_ENDPOINT: &str = "https://wa.me/5547984751455";

/// Pre-filled message sent with the handoff.
pub const GREETING: &str =
    "Olá! Segue minha anamnese preenchida para o procedimento de cílios 💕";

/// Time given to the download before navigating away.
pub const HANDOFF_DELAY: Duration = Duration::from_millis(1500);

/// Endpoint with the percent-encoded greeting as `text`.
pub fn handoff_url() -> String {
    format!("{}?text={}", WHATSAPP_ENDPOINT, urlencoding::encode(GREETING))
}

/// Moves the user to an external URL. Fire-and-forget: failures are the
/// implementation's to log.
pub trait Navigator: Send + Sync {
    fn navigate(&self, url: &str);
}

/// Navigator that only remembers where it was sent.
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    visited: Arc<Mutex<Vec<String>>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visited(&self) -> Vec<String> {
        match self.visited.lock() {
            Ok(visited) => visited.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, url: &str) {
        match self.visited.lock() {
            Ok(mut visited) => visited.push(url.to_string()),
            Err(poisoned) => poisoned.into_inner().push(url.to_string()),
        }
    }
}

/// Work run when a timer fires.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Runs a task once after a delay.
pub trait Scheduler {
    fn schedule(&self, delay: Duration, task: Task) -> TimerHandle;
}

/// How a timer ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerOutcome {
    Fired,
    Cancelled,
    Pending,
}

const PENDING: u8 = 0;
const FIRED: u8 = 1;
const CANCELLED: u8 = 2;

/// Shared by a handle and its scheduled task. Resolves exactly once, either
/// to fired or to cancelled.
#[derive(Default)]
struct TimerFlags {
    state: AtomicU8,
    on_cancel: Mutex<Option<Task>>,
}

impl fmt::Debug for TimerFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerFlags")
            .field("outcome", &self.outcome())
            .finish()
    }
}

impl TimerFlags {
    fn outcome(&self) -> TimerOutcome {
        match self.state.load(Ordering::SeqCst) {
            FIRED => TimerOutcome::Fired,
            CANCELLED => TimerOutcome::Cancelled,
            _ => TimerOutcome::Pending,
        }
    }

    fn resolve(&self, to: u8) -> bool {
        self.state
            .compare_exchange(PENDING, to, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    fn hook_slot(&self) -> std::sync::MutexGuard<'_, Option<Task>> {
        match self.on_cancel.lock() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Claim the timer for its task. False when it was cancelled first.
    fn fire(&self) -> bool {
        if !self.resolve(FIRED) {
            return false;
        }
        self.hook_slot().take();
        true
    }

    /// Claim the timer for cancellation and run the cancel hook. False when
    /// the task already fired.
    fn cancel(&self) -> bool {
        if !self.resolve(CANCELLED) {
            return false;
        }
        let hook = self.hook_slot().take();
        if let Some(hook) = hook {
            hook();
        }
        true
    }
}

/// Cancellation handle for a scheduled task.
///
/// Dropping the handle before the task fires cancels it.
#[must_use = "dropping the handle cancels the scheduled task"]
#[derive(Debug)]
pub struct TimerHandle {
    flags: Arc<TimerFlags>,
    wake: Option<mpsc::Sender<()>>,
    thread: Option<JoinHandle<()>>,
    detached: bool,
}

impl TimerHandle {
    fn new(flags: Arc<TimerFlags>) -> Self {
        Self {
            flags,
            wake: None,
            thread: None,
            detached: false,
        }
    }

    /// Cancel the task if it has not fired yet.
    pub fn cancel(&mut self) {
        if !self.flags.cancel() {
            return;
        }
        if let Some(wake) = self.wake.take() {
            let _ = wake.send(());
        }
    }

    /// Run `hook` if the task is cancelled before it fires, including a
    /// cancel by dropping the handle. Replaces any earlier hook.
    pub fn on_cancel(self, hook: impl FnOnce() + Send + 'static) -> Self {
        if self.outcome() == TimerOutcome::Cancelled {
            hook();
        } else {
            *self.flags.hook_slot() = Some(Box::new(hook));
        }
        self
    }

    pub fn outcome(&self) -> TimerOutcome {
        self.flags.outcome()
    }

    /// Let the task run without holding the handle.
    pub fn detach(mut self) {
        self.detached = true;
    }

    /// Block until a thread-backed timer resolves. Manual timers return their
    /// current outcome immediately.
    pub fn wait(mut self) -> TimerOutcome {
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::warn!("handoff timer thread panicked");
            }
        }
        self.flags.outcome()
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        if !self.detached {
            self.cancel();
        }
    }
}

/// Scheduler backed by one sleeping thread per timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadScheduler;

impl Scheduler for ThreadScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> TimerHandle {
        let flags = Arc::new(TimerFlags::default());
        let (wake_tx, wake_rx) = mpsc::channel::<()>();
        let thread_flags = Arc::clone(&flags);
        let deadline = Instant::now() + delay;

        let thread = std::thread::spawn(move || {
            match wake_rx.recv_timeout(delay) {
                // Woken by cancel()
                Ok(()) => return,
                Err(RecvTimeoutError::Timeout) => {}
                // Detached handle: sit out the rest of the delay
                Err(RecvTimeoutError::Disconnected) => {
                    std::thread::sleep(deadline.saturating_duration_since(Instant::now()));
                }
            }
            if thread_flags.fire() {
                task();
            }
        });

        let mut handle = TimerHandle::new(flags);
        handle.wake = Some(wake_tx);
        handle.thread = Some(thread);
        handle
    }
}

struct PendingTask {
    due: Duration,
    flags: Arc<TimerFlags>,
    task: Task,
}

#[derive(Default)]
struct ManualClock {
    now: Duration,
    pending: Vec<PendingTask>,
}

/// Scheduler driven by a virtual clock. Nothing fires until [`advance`].
///
/// [`advance`]: ManualScheduler::advance
#[derive(Clone, Default)]
pub struct ManualScheduler {
    clock: Arc<Mutex<ManualClock>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_clock<R>(&self, f: impl FnOnce(&mut ManualClock) -> R) -> R {
        match self.clock.lock() {
            Ok(mut clock) => f(&mut *clock),
            Err(poisoned) => {
                let mut clock = poisoned.into_inner();
                f(&mut *clock)
            }
        }
    }

    /// Move the clock forward and run every task that came due, in due order.
    /// Returns how many ran.
    pub fn advance(&self, by: Duration) -> usize {
        let mut due = self.with_clock(|clock| {
            clock.now += by;
            let now = clock.now;
            let (due, rest): (Vec<_>, Vec<_>) =
                clock.pending.drain(..).partition(|p| p.due <= now);
            clock.pending = rest;
            due
        });
        due.sort_by_key(|p| p.due);

        let mut ran = 0;
        for pending in due {
            if !pending.flags.fire() {
                continue;
            }
            (pending.task)();
            ran += 1;
        }
        ran
    }

    /// Tasks still waiting (cancelled ones included until their due time).
    pub fn pending(&self) -> usize {
        self.with_clock(|clock| clock.pending.len())
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> TimerHandle {
        let flags = Arc::new(TimerFlags::default());
        self.with_clock(|clock| {
            let due = clock.now + delay;
            clock.pending.push(PendingTask {
                due,
                flags: Arc::clone(&flags),
                task,
            });
        });
        TimerHandle::new(flags)
    }
}

/// Builds the handoff URL and schedules the navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoffDispatcher {
    url: String,
    delay: Duration,
}

impl Default for HandoffDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HandoffDispatcher {
    pub fn new() -> Self {
        Self {
            url: handoff_url(),
            delay: HANDOFF_DELAY,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Navigate after the delay, then run `on_done`. Not retried.
    pub fn dispatch(
        &self,
        scheduler: &dyn Scheduler,
        navigator: Arc<dyn Navigator>,
        on_done: impl FnOnce() + Send + 'static,
    ) -> TimerHandle {
        let url = self.url.clone();
        tracing::debug!(delay_ms = self.delay.as_millis() as u64, "handoff scheduled");
        scheduler.schedule(
            self.delay,
            Box::new(move || {
                tracing::info!(url = %url, "handing off to WhatsApp");
                navigator.navigate(&url);
                on_done();
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_handoff_url_is_percent_encoded() {
        let url = handoff_url();
        assert!(url.starts_with("https://wa.me/5547984751455?text="));
        assert!(url.contains("Ol%C3%A1"));
        assert!(url.ends_with("%F0%9F%92%95"));
        assert!(!url.contains(' '));

        let encoded = url.split("?text=").nth(1).unwrap();
        assert_eq!(urlencoding::decode(encoded).unwrap(), GREETING);
    }

    #[test]
    fn test_dispatch_waits_for_delay() {
        let scheduler = ManualScheduler::new();
        let navigator = RecordingNavigator::new();
        let dispatcher = HandoffDispatcher::new();

        let handle = dispatcher.dispatch(&scheduler, Arc::new(navigator.clone()), || {});

        assert_eq!(scheduler.advance(Duration::from_millis(1499)), 0);
        assert!(navigator.visited().is_empty());
        assert_eq!(handle.outcome(), TimerOutcome::Pending);

        assert_eq!(scheduler.advance(Duration::from_millis(1)), 1);
        assert_eq!(navigator.visited(), vec![handoff_url()]);
        assert_eq!(handle.outcome(), TimerOutcome::Fired);
    }

    #[test]
    fn test_on_done_runs_after_navigation() {
        let scheduler = ManualScheduler::new();
        let navigator = RecordingNavigator::new();
        let done = Arc::new(AtomicUsize::new(0));
        let done_clone = Arc::clone(&done);
        let nav_clone = navigator.clone();

        let _handle = HandoffDispatcher::new().dispatch(&scheduler, Arc::new(navigator), move || {
            assert_eq!(nav_clone.visited().len(), 1);
            done_clone.fetch_add(1, Ordering::SeqCst);
        });

        scheduler.advance(HANDOFF_DELAY);
        assert_eq!(done.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cancelled_handoff_never_navigates() {
        let scheduler = ManualScheduler::new();
        let navigator = RecordingNavigator::new();

        let mut handle =
            HandoffDispatcher::new().dispatch(&scheduler, Arc::new(navigator.clone()), || {});
        handle.cancel();

        assert_eq!(scheduler.advance(HANDOFF_DELAY * 2), 0);
        assert!(navigator.visited().is_empty());
        assert_eq!(handle.outcome(), TimerOutcome::Cancelled);
    }

    #[test]
    fn test_dropped_handle_cancels() {
        let scheduler = ManualScheduler::new();
        let navigator = RecordingNavigator::new();

        drop(HandoffDispatcher::new().dispatch(&scheduler, Arc::new(navigator.clone()), || {}));

        scheduler.advance(HANDOFF_DELAY);
        assert!(navigator.visited().is_empty());
    }

    #[test]
    fn test_cancel_hook_runs_on_drop() {
        let scheduler = ManualScheduler::new();
        let cancelled = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&cancelled);

        let handle = scheduler
            .schedule(HANDOFF_DELAY, Box::new(|| {}))
            .on_cancel(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        drop(handle);

        assert_eq!(cancelled.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.advance(HANDOFF_DELAY), 0);
    }

    #[test]
    fn test_cancel_hook_skipped_once_fired() {
        let scheduler = ManualScheduler::new();
        let cancelled = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&cancelled);

        let mut handle = scheduler
            .schedule(HANDOFF_DELAY, Box::new(|| {}))
            .on_cancel(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        assert_eq!(scheduler.advance(HANDOFF_DELAY), 1);
        handle.cancel();
        drop(handle);

        assert_eq!(cancelled.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_thread_scheduler_fires() {
        let navigator = RecordingNavigator::new();
        let handle = ThreadScheduler.schedule(Duration::from_millis(10), {
            let navigator = navigator.clone();
            Box::new(move || navigator.navigate("https://example.invalid"))
        });

        assert_eq!(handle.wait(), TimerOutcome::Fired);
        assert_eq!(navigator.visited(), vec!["https://example.invalid".to_string()]);
    }

    #[test]
    fn test_thread_scheduler_cancel() {
        let navigator = RecordingNavigator::new();
        let mut handle = ThreadScheduler.schedule(Duration::from_secs(30), {
            let navigator = navigator.clone();
            Box::new(move || navigator.navigate("https://example.invalid"))
        });

        handle.cancel();
        assert_eq!(handle.wait(), TimerOutcome::Cancelled);
        assert!(navigator.visited().is_empty());
    }

    #[test]
    fn test_detached_thread_timer_still_fires() {
        let navigator = RecordingNavigator::new();
        ThreadScheduler
            .schedule(Duration::from_millis(10), {
                let navigator = navigator.clone();
                Box::new(move || navigator.navigate("https://example.invalid"))
            })
            .detach();

        let deadline = Instant::now() + Duration::from_secs(5);
        while navigator.visited().is_empty() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(navigator.visited().len(), 1);
    }

    #[test]
    fn test_detached_manual_timer_stays_pending() {
        let scheduler = ManualScheduler::new();
        let navigator = RecordingNavigator::new();

        HandoffDispatcher::new()
            .dispatch(&scheduler, Arc::new(navigator.clone()), || {})
            .detach();

        assert_eq!(scheduler.pending(), 1);
        assert_eq!(scheduler.advance(HANDOFF_DELAY), 1);
        assert_eq!(navigator.visited(), vec![handoff_url()]);
    }
}
