//! Dispatch Serialization
//!
//! One element's notifications are dispatched by a single thread at a time:
//! the caller's thread for the local pass, an executor thread for the remote
//! outcome. The lock is re-entrant so a listener may feed input back into
//! the element it is observing.

use std::sync::{Condvar, Mutex, PoisonError};
use std::thread::{self, ThreadId};

use crate::lock;

#[derive(Debug, Default)]
pub(crate) struct DispatchLock {
    owner: Mutex<Option<(ThreadId, usize)>>,
    released: Condvar,
}

impl DispatchLock {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Block until no other thread is dispatching for this element
    pub(crate) fn acquire(&self) -> DispatchGuard<'_> {
        let me = thread::current().id();
        let mut owner = lock(&self.owner);
        loop {
            match *owner {
                None => {
                    *owner = Some((me, 1));
                    break;
                }
                Some((id, ref mut depth)) if id == me => {
                    *depth += 1;
                    break;
                }
                Some(_) => {}
            }
            owner = self
                .released
                .wait(owner)
                .unwrap_or_else(PoisonError::into_inner);
        }
        DispatchGuard { lock: self }
    }
}

pub(crate) struct DispatchGuard<'a> {
    lock: &'a DispatchLock,
}

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        let mut owner = lock(&self.lock.owner);
        let done = match owner.as_mut() {
            Some((_, depth)) => {
                *depth -= 1;
                *depth == 0
            }
            None => false,
        };
        if done {
            *owner = None;
            self.lock.released.notify_all();
        }
    }
}
