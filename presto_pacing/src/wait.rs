// Copyright 2026 the Presto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Wake/wait primitives for parking the render thread.
//!
//! Two implementations satisfy the same event contract:
//!
//! - **Legacy** — a `parking_lot` mutex-guarded flag plus condition variable,
//!   available everywhere.
//! - **Address wait** — a single `AtomicU32` parked on with the Linux futex
//!   syscall, so a handle is one word and needs no kernel object.
//!
//! [`WaitStrategy::detect`] probes once per process; every controller then uses
//! the same strategy. A handle is either auto-reset (a successful wait
//! consumes the signal) or manual-reset (signaled until [`WaitHandle::reset`]).

use std::sync::OnceLock;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::error::WaitError;

/// Which wait primitive backs a [`WaitHandle`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WaitStrategy {
    /// Mutex and condition variable.
    Legacy,
    /// Futex on a 32-bit word.
    AddressWait,
}

impl WaitStrategy {
    /// Returns the strategy for this process, probing on first use.
    #[must_use]
    pub fn detect() -> Self {
        static STRATEGY: OnceLock<WaitStrategy> = OnceLock::new();
        *STRATEGY.get_or_init(probe)
    }

    /// Creates a handle, initially unsignaled.
    ///
    /// Requesting [`AddressWait`](Self::AddressWait) where it is unavailable
    /// yields a legacy handle.
    #[must_use]
    pub fn create_handle(self, manual_reset: bool) -> WaitHandle {
        let inner = match self {
            #[cfg(any(target_os = "linux", target_os = "android"))]
            Self::AddressWait => Inner::Address(futex::AddressEvent::new()),
            #[cfg(not(any(target_os = "linux", target_os = "android")))]
            Self::AddressWait => Inner::Legacy(LegacyEvent::new()),
            Self::Legacy => Inner::Legacy(LegacyEvent::new()),
        };
        WaitHandle {
            inner,
            manual_reset,
        }
    }
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn probe() -> WaitStrategy {
    if futex::probe() {
        WaitStrategy::AddressWait
    } else {
        log::debug!("futex unavailable, using legacy wait primitive");
        WaitStrategy::Legacy
    }
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
fn probe() -> WaitStrategy {
    WaitStrategy::Legacy
}

/// An event the render thread blocks on and other threads signal.
#[derive(Debug)]
pub struct WaitHandle {
    inner: Inner,
    manual_reset: bool,
}

#[derive(Debug)]
enum Inner {
    Legacy(LegacyEvent),
    #[cfg(any(target_os = "linux", target_os = "android"))]
    Address(futex::AddressEvent),
}

impl WaitHandle {
    /// Blocks until signaled or until `timeout` elapses (`None` waits forever).
    ///
    /// Returns `Ok(true)` if the handle was signaled. An auto-reset handle is
    /// unsignaled again on return.
    pub fn wait(&self, timeout: Option<Duration>) -> Result<bool, WaitError> {
        let deadline = timeout.and_then(|t| Instant::now().checked_add(t));
        match &self.inner {
            Inner::Legacy(event) => Ok(event.wait(self.manual_reset, deadline)),
            #[cfg(any(target_os = "linux", target_os = "android"))]
            Inner::Address(event) => event.wait(self.manual_reset, deadline),
        }
    }

    /// Signals the handle, releasing one waiter (auto-reset) or all of them
    /// (manual-reset).
    ///
    /// Never fails: a wake that the OS rejects is logged and dropped.
    pub fn wake_up(&self) {
        match &self.inner {
            Inner::Legacy(event) => event.set(self.manual_reset),
            #[cfg(any(target_os = "linux", target_os = "android"))]
            Inner::Address(event) => event.set(self.manual_reset),
        }
    }

    /// Returns the handle to the unsignaled state.
    pub fn reset(&self) {
        match &self.inner {
            Inner::Legacy(event) => event.reset(),
            #[cfg(any(target_os = "linux", target_os = "android"))]
            Inner::Address(event) => event.reset(),
        }
    }

    /// Whether this handle stays signaled after a wait.
    #[must_use]
    pub fn is_manual_reset(&self) -> bool {
        self.manual_reset
    }

    /// The primitive backing this handle.
    #[must_use]
    pub fn strategy(&self) -> WaitStrategy {
        match &self.inner {
            Inner::Legacy(_) => WaitStrategy::Legacy,
            #[cfg(any(target_os = "linux", target_os = "android"))]
            Inner::Address(_) => WaitStrategy::AddressWait,
        }
    }
}

#[derive(Debug, Default)]
struct LegacyEvent {
    signaled: Mutex<bool>,
    cond: Condvar,
}

impl LegacyEvent {
    fn new() -> Self {
        Self::default()
    }

    fn wait(&self, manual_reset: bool, deadline: Option<Instant>) -> bool {
        let mut signaled = self.signaled.lock();
        while !*signaled {
            match deadline {
                None => self.cond.wait(&mut signaled),
                Some(deadline) => {
                    if self.cond.wait_until(&mut signaled, deadline).timed_out() {
                        break;
                    }
                }
            }
        }
        let was_signaled = *signaled;
        if was_signaled && !manual_reset {
            *signaled = false;
        }
        was_signaled
    }

    fn set(&self, manual_reset: bool) {
        let mut signaled = self.signaled.lock();
        *signaled = true;
        if manual_reset {
            self.cond.notify_all();
        } else {
            self.cond.notify_one();
        }
    }

    fn reset(&self) {
        *self.signaled.lock() = false;
    }
}

#[cfg(any(target_os = "linux", target_os = "android"))]
mod futex {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::{Duration, Instant};

    use rustix::io::Errno;
    use rustix::thread::futex::{self, Flags};
    use rustix::time::Timespec;

    use crate::error::WaitError;

    const UNSIGNALED: u32 = 0;
    const SIGNALED: u32 = 1;

    /// Returns `true` if the kernel accepts futex calls.
    pub(super) fn probe() -> bool {
        let word = AtomicU32::new(UNSIGNALED);
        futex::wake(&word, Flags::PRIVATE, 1).is_ok()
    }

    #[derive(Debug, Default)]
    pub(super) struct AddressEvent {
        state: AtomicU32,
    }

    impl AddressEvent {
        pub(super) fn new() -> Self {
            Self::default()
        }

        pub(super) fn wait(
            &self,
            manual_reset: bool,
            deadline: Option<Instant>,
        ) -> Result<bool, WaitError> {
            loop {
                if self.try_consume(manual_reset) {
                    return Ok(true);
                }
                let timeout = match deadline {
                    None => None,
                    Some(deadline) => {
                        let now = Instant::now();
                        if now >= deadline {
                            return Ok(false);
                        }
                        Some(to_timespec(deadline - now))
                    }
                };
                match futex::wait(&self.state, Flags::PRIVATE, UNSIGNALED, timeout.as_ref()) {
                    Ok(()) => {}
                    // Re-check the word; a timeout is caught by the deadline above.
                    Err(err)
                        if err == Errno::AGAIN || err == Errno::INTR || err == Errno::TIMEDOUT => {}
                    Err(err) => return Err(WaitError::Os(err.raw_os_error())),
                }
            }
        }

        fn try_consume(&self, manual_reset: bool) -> bool {
            if manual_reset {
                self.state.load(Ordering::Acquire) == SIGNALED
            } else {
                self.state
                    .compare_exchange(SIGNALED, UNSIGNALED, Ordering::Acquire, Ordering::Relaxed)
                    .is_ok()
            }
        }

        pub(super) fn set(&self, manual_reset: bool) {
            if self.state.swap(SIGNALED, Ordering::Release) == SIGNALED {
                return;
            }
            let waiters = if manual_reset { u32::MAX } else { 1 };
            if let Err(err) = futex::wake(&self.state, Flags::PRIVATE, waiters) {
                log::debug!("futex wake failed: {err}");
            }
        }

        pub(super) fn reset(&self) {
            self.state.store(UNSIGNALED, Ordering::Relaxed);
        }
    }

    fn to_timespec(d: Duration) -> Timespec {
        Timespec {
            tv_sec: i64::try_from(d.as_secs()).unwrap_or(i64::MAX),
            tv_nsec: i64::from(d.subsec_nanos()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    fn strategies() -> Vec<WaitStrategy> {
        let mut all = vec![WaitStrategy::Legacy];
        if WaitStrategy::detect() == WaitStrategy::AddressWait {
            all.push(WaitStrategy::AddressWait);
        }
        all
    }

    #[test]
    fn detect_is_stable() {
        assert_eq!(WaitStrategy::detect(), WaitStrategy::detect());
    }

    #[test]
    fn auto_reset_consumes_signal() {
        for strategy in strategies() {
            let handle = strategy.create_handle(false);
            assert_eq!(handle.strategy(), strategy);
            assert_eq!(handle.wait(Some(Duration::ZERO)), Ok(false), "{strategy:?}");
            handle.wake_up();
            handle.wake_up();
            assert_eq!(handle.wait(Some(Duration::ZERO)), Ok(true), "{strategy:?}");
            assert_eq!(
                handle.wait(Some(Duration::from_millis(5))),
                Ok(false),
                "{strategy:?}: signals do not stack"
            );
        }
    }

    #[test]
    fn manual_reset_stays_signaled() {
        for strategy in strategies() {
            let handle = strategy.create_handle(true);
            assert!(handle.is_manual_reset());
            handle.wake_up();
            assert_eq!(handle.wait(None), Ok(true), "{strategy:?}");
            assert_eq!(handle.wait(Some(Duration::ZERO)), Ok(true), "{strategy:?}");
            handle.reset();
            assert_eq!(handle.wait(Some(Duration::ZERO)), Ok(false), "{strategy:?}");
        }
    }

    #[test]
    fn wakes_across_threads() {
        for strategy in strategies() {
            let handle = Arc::new(strategy.create_handle(false));
            let waiter = {
                let handle = Arc::clone(&handle);
                thread::spawn(move || handle.wait(Some(Duration::from_secs(5))))
            };
            thread::sleep(Duration::from_millis(10));
            handle.wake_up();
            assert_eq!(
                waiter.join().expect("waiter thread"),
                Ok(true),
                "{strategy:?}: waiter released before its timeout"
            );
        }
    }

    #[test]
    fn manual_reset_releases_every_waiter() {
        for strategy in strategies() {
            let handle = Arc::new(strategy.create_handle(true));
            let waiters: Vec<_> = (0..3)
                .map(|_| {
                    let handle = Arc::clone(&handle);
                    thread::spawn(move || handle.wait(Some(Duration::from_secs(5))))
                })
                .collect();
            thread::sleep(Duration::from_millis(10));
            handle.wake_up();
            for waiter in waiters {
                assert_eq!(waiter.join().expect("waiter thread"), Ok(true), "{strategy:?}");
            }
        }
    }

    #[test]
    fn timeout_elapses() {
        for strategy in strategies() {
            let handle = strategy.create_handle(false);
            let start = Instant::now();
            assert_eq!(handle.wait(Some(Duration::from_millis(20))), Ok(false));
            assert!(
                start.elapsed() >= Duration::from_millis(20),
                "{strategy:?}: returned before the timeout"
            );
        }
    }
}
