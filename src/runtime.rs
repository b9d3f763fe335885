use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent};
use tracing::{debug, trace};

/// Identifies the session a timer was armed for.
pub type SessionId = u64;

/// Unified event type consumed by the app runner
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    /// One second of play elapsed in the given session.
    Tick(SessionId),
}

/// Source of application events (keyboard, resize, timer ticks)
pub trait AppEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;
}

/// Event source backed by a channel. Terminal input and session timers both
/// feed the sending half.
pub struct ChannelEventSource {
    rx: Receiver<AppEvent>,
}

impl ChannelEventSource {
    pub fn new(rx: Receiver<AppEvent>) -> Self {
        Self { rx }
    }
}

impl AppEventSource for ChannelEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Forward crossterm key and resize events into `tx` from a reader thread.
pub fn spawn_terminal_input(tx: Sender<AppEvent>) {
    thread::spawn(move || loop {
        let evt = match event::read() {
            Ok(CtEvent::Key(key)) => AppEvent::Key(key),
            Ok(CtEvent::Resize(_, _)) => AppEvent::Resize,
            Ok(_) => continue,
            Err(_) => break,
        };

        if tx.send(evt).is_err() {
            break;
        }
    });
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// The game clock: one tick per second.
    pub fn seconds() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Periodic tick task owned by a single session.
///
/// Sends `AppEvent::Tick(session)` every interval until cancelled. Dropping
/// the timer cancels it and joins the thread, so a timer never outlives its
/// owner.
#[derive(Debug)]
pub struct SessionTimer {
    session: SessionId,
    cancel: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl SessionTimer {
    pub fn start<T: Ticker>(session: SessionId, ticker: &T, events: Sender<AppEvent>) -> Self {
        let interval = ticker.interval();
        let (cancel_tx, cancel_rx) = mpsc::channel::<()>();

        let handle = thread::spawn(move || loop {
            match cancel_rx.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => {
                    trace!(session, "tick");
                    if events.send(AppEvent::Tick(session)).is_err() {
                        break;
                    }
                }
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        });

        debug!(session, ?interval, "session timer started");
        Self {
            session,
            cancel: Some(cancel_tx),
            handle: Some(handle),
        }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Stop ticking and wait for the timer thread to exit.
    pub fn cancel(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        // dropping the sender wakes the thread with Disconnected
        self.cancel.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
            debug!(session = self.session, "session timer stopped");
        }
    }
}

impl Drop for SessionTimer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Runner that advances the application one event at a time
pub struct Runner<E: AppEventSource> {
    event_source: E,
    poll_interval: Duration,
}

impl<E: AppEventSource> Runner<E> {
    pub fn new(event_source: E, poll_interval: Duration) -> Self {
        Self {
            event_source,
            poll_interval,
        }
    }

    /// Blocks up to the poll interval and returns the next event, if any.
    /// `Err(Disconnected)` means every producer is gone.
    pub fn step(&self) -> Result<Option<AppEvent>, RecvTimeoutError> {
        match self.event_source.recv_timeout(self.poll_interval) {
            Ok(ev) => Ok(Some(ev)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(RecvTimeoutError::Disconnected),
        }
    }
}
