//! In-flight computation marker
//!
//! One `Flight` exists per key while its leader runs the loader. Other callers
//! block in [`Flight::wait`] until the leader calls [`Flight::complete`], then
//! look the key up again.

use std::sync::Arc;
use parking_lot::{Condvar, Mutex};

pub(crate) struct Flight {
    done: Mutex<bool>,
    signal: Condvar,
}

impl Flight {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            done: Mutex::new(false),
            signal: Condvar::new(),
        })
    }

    /// Block until the flight completes
    pub(crate) fn wait(&self) {
        let mut done = self.done.lock();
        while !*done {
            self.signal.wait(&mut done);
        }
    }

    /// Mark the flight finished and wake every waiter
    pub(crate) fn complete(&self) {
        *self.done.lock() = true;
        self.signal.notify_all();
    }

    #[cfg(test)]
    fn is_complete(&self) -> bool {
        *self.done.lock()
    }
}
