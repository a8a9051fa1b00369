//! Single-use, timeout-bounded value handoff
//!
//! One party calls [`Rendezvous::wait`] at most once; the other calls
//! [`Rendezvous::provide`] whenever its value shows up. Whichever happens
//! first, the value reaches the waiter, or the waiter gives up when its
//! timeout elapses.

use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::oneshot;

enum Slot<T> {
    /// Nothing provided, nobody waiting
    Empty,
    /// Provided before anyone waited
    Pending(T),
    /// A waiter is parked
    Waiting(oneshot::Sender<T>),
    /// The single wait has finished
    Closed,
}

struct Inner<T> {
    slot: Slot<T>,
    waited: bool,
}

/// Exchanges one value between two independently scheduled parties.
pub struct Rendezvous<T> {
    inner: Mutex<Inner<T>>,
}

impl<T> Rendezvous<T> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                slot: Slot::Empty,
                waited: false,
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner<T>> {
        // The slot is always left in a consistent state, so a poisoned lock
        // is still usable.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Wait up to `timeout` for a value.
    ///
    /// Returns immediately when a value is already pending.
    ///
    /// # Panics
    ///
    /// Panics if called more than once on the same instance.
    pub async fn wait(&self, timeout: Duration) -> Option<T> {
        let mut rx = {
            let mut inner = self.lock();
            assert!(!inner.waited, "Rendezvous::wait called more than once");
            inner.waited = true;

            match std::mem::replace(&mut inner.slot, Slot::Closed) {
                Slot::Pending(value) => return Some(value),
                Slot::Empty => {
                    let (tx, rx) = oneshot::channel();
                    inner.slot = Slot::Waiting(tx);
                    rx
                }
                Slot::Waiting(_) | Slot::Closed => {
                    unreachable!("slot cannot be occupied before the first wait")
                }
            }
        };

        let received = tokio::time::timeout(timeout, &mut rx).await;

        let mut inner = self.lock();
        inner.slot = Slot::Closed;
        match received {
            Ok(Ok(value)) => Some(value),
            // A provide may have landed between the timer firing and the
            // slot closing.
            _ => rx.try_recv().ok(),
        }
    }

    /// Hand over a value.
    ///
    /// Wakes a parked waiter, or stores the value for the future wait,
    /// replacing any earlier pending value. Returns whether the value can
    /// still reach the waiter; once the wait has finished it is dropped.
    pub fn provide(&self, value: T) -> bool {
        let mut inner = self.lock();
        match std::mem::replace(&mut inner.slot, Slot::Closed) {
            Slot::Empty | Slot::Pending(_) => {
                inner.slot = Slot::Pending(value);
                true
            }
            Slot::Waiting(tx) => tx.send(value).is_ok(),
            Slot::Closed => false,
        }
    }

    /// True once `wait` has been called.
    pub fn has_waited(&self) -> bool {
        self.lock().waited
    }
}

impl<T> Default for Rendezvous<T> {
    fn default() -> Self {
        Self::new()
    }
}
