//! Event builders: one-shot, recurring, infinite, and PWM pairs.
//!
//! Every builder takes a [`Start`] selecting how the first due time is derived:
//! - `At(t)`: absolute tick `t`.
//! - `Delay(d)`: `now + d`.
//! - `Offset(origin, o)`: the origin event's current due time plus `o`. A stale origin makes
//!   the builder return [`EventId::NONE`] (or [`EventIdPair::NONE`]).
//!
//! Recurring builders take a signed count; any negative count means "forever". Due times wrap
//! with the clock; periods longer than [`MAX_SPAN`] are capped to it.
//!
//! # PWM
//! A PWM pair is two recurring events sharing a period: leg 0 fires the `on` callback at phase 0,
//! leg 1 fires the `off` callback at phase `on_duration`.
//! - `on_duration == 0`: a single leg firing `off` (always off).
//! - `on_duration >= period`: the period is raised to `on_duration`, leaving a single leg firing
//!   `on` (always on).
//! - `period == 0 && on_duration == 0`: nothing is allocated.
//!
//! If the table cannot hold both legs, the first leg is released again and no event is created.

use crate::callback::Callback;
use crate::clock::MAX_SPAN;
use crate::controller::EventController;
use crate::event::{EventId, EventIdPair};
use crate::table::SlotInit;

/// When an event's first occurrence is due.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Start {
    /// Absolute clock value.
    At(u32),
    /// Ticks from now.
    Delay(u32),
    /// Ticks after the origin event's next due time.
    Offset(EventId, u32),
}

impl Start {
    /// Due on the very next tick.
    pub const NOW: Start = Start::Delay(0);
}

/// Occurrence budget of a recurring event.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Repeat {
    Times(u32),
    Forever,
}

impl Repeat {
    fn from_count(count: i32) -> Self {
        u32::try_from(count).map_or(Repeat::Forever, Repeat::Times)
    }
}

impl<'a, const N: usize> EventController<'a, N> {
    /// Resolve a start selector to an absolute due time.
    pub fn resolve_start(&self, start: Start) -> Option<u32> {
        match start {
            Start::At(time) => Some(time),
            Start::Delay(delay) => Some(self.now().wrapping_add(delay)),
            Start::Offset(origin, offset) => self
                .table()
                .validate(origin)
                .map(|slot| slot.due_time.wrapping_add(offset)),
        }
    }

    fn add_at(
        &mut self,
        callback: Callback<'a>,
        due_time: u32,
        period: u32,
        repeat: Repeat,
        arg: i32,
    ) -> EventId {
        let (occurrence_limit, infinite) = match repeat {
            Repeat::Times(count) => (count, false),
            Repeat::Forever => (0, true),
        };
        self.allocate(SlotInit {
            callback,
            due_time,
            period: period.min(MAX_SPAN),
            occurrence_limit,
            infinite,
            arg,
        })
    }

    fn add_starting(
        &mut self,
        callback: Callback<'a>,
        start: Start,
        period: u32,
        repeat: Repeat,
        arg: i32,
    ) -> EventId {
        match self.resolve_start(start) {
            Some(due_time) => self.add_at(callback, due_time, period, repeat, arg),
            None => {
                debug!("origin handle is stale; event not added");
                EventId::NONE
            }
        }
    }

    /// Add a one-shot event.
    pub fn add_event(
        &mut self,
        callback: impl Into<Callback<'a>>,
        start: Start,
        arg: i32,
    ) -> EventId {
        self.add_starting(callback.into(), start, 0, Repeat::Times(1), arg)
    }

    /// Add an event firing `count` times, `period` ticks apart. A negative `count` repeats forever.
    pub fn add_recurring_event(
        &mut self,
        callback: impl Into<Callback<'a>>,
        start: Start,
        period: u32,
        count: i32,
        arg: i32,
    ) -> EventId {
        self.add_starting(callback.into(), start, period, Repeat::from_count(count), arg)
    }

    pub fn add_infinite_recurring_event(
        &mut self,
        callback: impl Into<Callback<'a>>,
        start: Start,
        period: u32,
        arg: i32,
    ) -> EventId {
        self.add_starting(callback.into(), start, period, Repeat::Forever, arg)
    }

    /// Add a software PWM pair running for `count` periods. A negative `count` runs forever.
    #[allow(clippy::too_many_arguments)]
    pub fn add_pwm(
        &mut self,
        on: impl Into<Callback<'a>>,
        off: impl Into<Callback<'a>>,
        start: Start,
        period: u32,
        on_duration: u32,
        count: i32,
        arg: i32,
    ) -> EventIdPair {
        self.add_pwm_legs(
            on.into(),
            off.into(),
            start,
            period,
            on_duration,
            Repeat::from_count(count),
            arg,
        )
    }

    pub fn add_infinite_pwm(
        &mut self,
        on: impl Into<Callback<'a>>,
        off: impl Into<Callback<'a>>,
        start: Start,
        period: u32,
        on_duration: u32,
        arg: i32,
    ) -> EventIdPair {
        self.add_pwm_legs(on.into(), off.into(), start, period, on_duration, Repeat::Forever, arg)
    }

    #[allow(clippy::too_many_arguments)]
    fn add_pwm_legs(
        &mut self,
        on: Callback<'a>,
        off: Callback<'a>,
        start: Start,
        period: u32,
        on_duration: u32,
        repeat: Repeat,
        arg: i32,
    ) -> EventIdPair {
        if period == 0 && on_duration == 0 {
            return EventIdPair::NONE;
        }
        let Some(due_time) = self.resolve_start(start) else {
            debug!("origin handle is stale; pwm not added");
            return EventIdPair::NONE;
        };
        let period = period.max(on_duration);

        let mut pair = EventIdPair::NONE;
        if on_duration == 0 {
            pair.event_id_0 = self.add_at(off, due_time, period, repeat, arg);
        } else if on_duration < period {
            pair.event_id_0 = self.add_at(on, due_time, period, repeat, arg);
            if pair.event_id_0.is_none() {
                return EventIdPair::NONE;
            }
            pair.event_id_1 = self.add_starting(
                off,
                Start::Offset(pair.event_id_0, on_duration),
                period,
                repeat,
                arg,
            );
            if pair.event_id_1.is_none() {
                self.clear(pair.event_id_0);
                return EventIdPair::NONE;
            }
        } else {
            pair.event_id_0 = self.add_at(on, due_time, period, repeat, arg);
        }
        pair
    }
}
