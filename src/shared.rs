//! Interrupt-safe controller for `static` placement.
//!
//! The tick interrupt and foreground code both go through `critical_section::with`, so every
//! multi-field slot mutation happens with interrupts masked and the tick handler never observes a
//! half-written slot.
//!
//! The clock lives outside the mutex and is the authoritative time: `now()` and `set_time()` are
//! plain atomic accesses and are safe from anywhere, including event callbacks. It is copied into
//! the controller before every access and copied back afterwards.
//!
//! Callbacks run inside the critical section. Apart from `now()`/`set_time()` they must not call
//! back into the same [`SharedEventController`]; a `tick()` arriving while the controller is
//! already borrowed is dropped without advancing the clock.
//!
//! ```
//! use core::sync::atomic::{AtomicU32, Ordering};
//! use ph_scheduler::{Callback, SharedEventController, Start};
//!
//! static EVENTS: SharedEventController<8> = SharedEventController::new();
//! static BLINKS: AtomicU32 = AtomicU32::new(0);
//! static BLINK: fn(i32) = |_| {
//!     BLINKS.fetch_add(1, Ordering::Relaxed);
//! };
//!
//! let id = EVENTS.with(|ctl| {
//!     let id = ctl.add_infinite_recurring_event(Callback::new(&BLINK), Start::Delay(10), 10, 0);
//!     ctl.enable(id);
//!     id
//! });
//!
//! // From the 1 ms timer interrupt:
//! for _ in 0..30 {
//!     EVENTS.tick();
//! }
//! assert_eq!(BLINKS.load(Ordering::Relaxed), 3);
//! EVENTS.with(|ctl| ctl.remove(id));
//! ```

use core::cell::RefCell;

use critical_section::Mutex;

use crate::clock::Clock;
use crate::controller::EventController;

pub struct SharedEventController<const N: usize> {
    clock: Clock,
    inner: Mutex<RefCell<EventController<'static, N>>>,
}

impl<const N: usize> SharedEventController<N> {
    pub const fn new() -> Self {
        Self {
            clock: Clock::new(),
            inner: Mutex::new(RefCell::new(EventController::new())),
        }
    }

    /// Tick entry point for the timer interrupt.
    pub fn tick(&self) {
        critical_section::with(|cs| match self.inner.borrow(cs).try_borrow_mut() {
            Ok(mut ctl) => {
                let now = self.clock.advance();
                ctl.set_time(now);
                ctl.dispatch(now);
            }
            Err(_) => warn!("re-entrant tick dropped"),
        });
    }

    #[inline]
    pub fn now(&self) -> u32 {
        self.clock.now()
    }

    #[inline]
    pub fn set_time(&self, millis: u32) {
        self.clock.set(millis);
    }

    /// Run `f` against the controller with interrupts masked.
    ///
    /// # Panics
    /// If called from inside an event callback of this same controller.
    pub fn with<R>(&self, f: impl FnOnce(&mut EventController<'static, N>) -> R) -> R {
        critical_section::with(|cs| self.run(&mut self.inner.borrow(cs).borrow_mut(), f))
    }

    /// Like [`with`](Self::with), but returns `None` instead of panicking when the controller is
    /// already borrowed.
    pub fn try_with<R>(&self, f: impl FnOnce(&mut EventController<'static, N>) -> R) -> Option<R> {
        critical_section::with(|cs| {
            let mut ctl = self.inner.borrow(cs).try_borrow_mut().ok()?;
            Some(self.run(&mut ctl, f))
        })
    }

    fn run<R>(
        &self,
        ctl: &mut EventController<'static, N>,
        f: impl FnOnce(&mut EventController<'static, N>) -> R,
    ) -> R {
        ctl.set_time(self.clock.now());
        let out = f(ctl);
        self.clock.set(ctl.now());
        out
    }
}

impl<const N: usize> Default for SharedEventController<N> {
    fn default() -> Self {
        Self::new()
    }
}
