//! Debounce utility.
//!
//! Each call cancels the pending timer (if any) and arms a new one, so a burst
//! of calls runs the task once, `delay_ms` after the last call.

use std::cell::RefCell;

/// Error returned when the host refuses to schedule a timer.
#[derive(Debug, thiserror::Error)]
#[error("Failed to schedule timer: {0}")]
pub struct TimerError(pub String);

/// Host timer facility (`setTimeout`/`clearTimeout` in the browser).
pub trait Timers {
    type Handle;

    fn set_timeout(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> Result<Self::Handle, TimerError>;

    /// Cancelling an already-fired handle is a no-op.
    fn clear_timeout(&self, handle: Self::Handle);
}

pub struct Debouncer<T: Timers> {
    timers: T,
    delay_ms: u32,
    pending: RefCell<Option<T::Handle>>,
}

impl<T: Timers> Debouncer<T> {
    pub fn new(timers: T, delay_ms: u32) -> Self {
        Self {
            timers,
            delay_ms,
            pending: RefCell::new(None),
        }
    }

    pub fn delay_ms(&self) -> u32 {
        self.delay_ms
    }

    pub fn timers(&self) -> &T {
        &self.timers
    }

    /// Reset the timer and schedule `task`.
    pub fn call(&self, task: Box<dyn FnOnce()>) -> Result<(), TimerError> {
        if let Some(handle) = self.pending.borrow_mut().take() {
            self.timers.clear_timeout(handle);
        }
        let handle = self.timers.set_timeout(self.delay_ms, task)?;
        *self.pending.borrow_mut() = Some(handle);
        Ok(())
    }

    /// Drop the pending timer without running it.
    pub fn cancel(&self) {
        if let Some(handle) = self.pending.borrow_mut().take() {
            self.timers.clear_timeout(handle);
        }
    }
}
