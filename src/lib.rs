//! Tick-driven event scheduling for no-std embedded targets.
//!
//! # Highlights
//! - Fixed-capacity event table; no allocation, no dynamic collections.
//! - One-shot, recurring, infinitely recurring, and software-PWM events.
//! - Generation-stamped handles: a handle to a retired event can never touch the event that
//!   later reuses its slot.
//! - Missed periods are skipped, not replayed, so a stalled or disabled event never bursts.
//!
//! # Quick start
//! ```
//! use core::sync::atomic::{AtomicU32, Ordering};
//! use ph_scheduler::{EventController, Start};
//!
//! let hits = AtomicU32::new(0);
//! let on_hit = |_arg: i32| {
//!     hits.fetch_add(1, Ordering::Relaxed);
//! };
//!
//! let mut events = EventController::<8>::new();
//! let id = events.add_recurring_event(&on_hit, Start::Delay(5), 10, 3, 0);
//! events.enable(id);
//!
//! // Normally driven by a 1 ms timer interrupt.
//! for _ in 0..100 {
//!     events.tick();
//! }
//! assert_eq!(hits.load(Ordering::Relaxed), 3);
//! assert!(!events.is_valid(id));
//! ```
//!
//! # No-std
//! The crate is `#![no_std]`. Tests require `std`.
//!
//! # Concurrency
//! [`EventController`] is a plain `&mut self` state machine. To share one between the tick
//! interrupt and foreground code, place a [`SharedEventController`] in a `static`; it wraps the
//! controller in a `critical-section` mutex. The target must provide a `critical-section`
//! implementation.
//!
//! # Semantics
//! - One tick is one millisecond. The clock is a wrapping `u32`.
//! - Events are created disabled and fire only once enabled.
//! - A full table, or an offset from a stale origin, yields [`EventId::NONE`].
//! - Operations on stale handles are silent no-ops.
//! - Removing an event fires its stop callback; clearing it does not.
#![no_std]

#[macro_use]
mod fmt;

pub mod callback;
pub mod clock;
pub mod compose;
pub mod controller;
pub mod event;
pub mod shared;
pub mod table;

pub use callback::Callback;
pub use clock::Clock;
pub use compose::Start;
pub use controller::EventController;
pub use event::{EventId, EventIdPair, NO_ARG, Slot};
pub use shared::SharedEventController;
pub use table::EventTable;

#[cfg(test)]
extern crate std;
