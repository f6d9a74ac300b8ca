//! Clock plus event table, and the per-tick dispatch engine.
//!
//! # Tick processing
//! Each [`EventController::tick`] advances the clock by one and sweeps every occupied slot whose
//! due time has arrived:
//! 1. Recurring slots are caught up: `due_time` jumps past `now` in whole periods. Missed
//!    occurrences are dropped, never replayed.
//! 2. An enabled slot with occurrences left fires (start callback first on its first
//!    occurrence, then the main callback).
//! 3. A disabled recurring slot with occurrences left is parked; it keeps tracking its due time
//!    so re-enabling it resumes at the next boundary.
//! 4. Anything else is retired, which fires its stop callback.
//!
//! Catch-up runs whether or not the slot is enabled. Due checks are wrap-aware (see
//! [`clock::is_due`]), so a recurring event keeps its cadence when the clock wraps.

use crate::callback::Callback;
use crate::clock::{self, Clock};
use crate::event::{EventId, EventIdPair, Slot};
use crate::table::{EventTable, SlotInit};

/// Fixed-capacity event scheduler driven by a 1 ms tick.
///
/// Events are created disabled; call [`enable`](Self::enable) once the handle is stored.
#[derive(Debug)]
pub struct EventController<'a, const N: usize> {
    clock: Clock,
    table: EventTable<'a, N>,
}

impl<'a, const N: usize> EventController<'a, N> {
    pub const fn new() -> Self {
        Self {
            clock: Clock::new(),
            table: EventTable::new(),
        }
    }

    /// Drop every event without firing stop callbacks and rewind the clock to 0.
    pub fn reset(&mut self) {
        self.clear_all_events();
    }

    #[inline]
    pub fn now(&self) -> u32 {
        self.clock.now()
    }

    #[inline]
    pub fn set_time(&self, millis: u32) {
        self.clock.set(millis);
    }

    #[inline]
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    #[inline]
    pub fn table(&self) -> &EventTable<'a, N> {
        &self.table
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Tick entry point. Call exactly once per millisecond, never re-entrantly.
    pub fn tick(&mut self) {
        let now = self.clock.advance();
        self.dispatch(now);
    }

    /// Sweep the table against an already-advanced clock value.
    pub(crate) fn dispatch(&mut self, now: u32) {
        for index in 0..N {
            self.process(index, now);
        }
    }

    fn process(&mut self, index: usize, now: u32) {
        let slot = self.table.slot_mut(index);
        if slot.free || !clock::is_due(slot.due_time, now) {
            return;
        }

        if slot.period > 0 {
            let missed = now.wrapping_sub(slot.due_time) / slot.period + 1;
            slot.due_time = slot.due_time.wrapping_add(missed.wrapping_mul(slot.period));
        }

        if slot.enabled && slot.has_remaining() {
            let first = slot.occurrence_count == 0;
            slot.occurrence_count = slot.occurrence_count.saturating_add(1);
            let (on_start, callback, arg) = (slot.callback_on_start, slot.callback, slot.arg);
            if first {
                on_start.call(arg);
            }
            callback.call(arg);
        } else if !slot.enabled && slot.is_recurring() && slot.has_remaining() {
            // Parked until re-enabled.
        } else {
            trace!("retiring slot {=usize} at {=u32}", index, now);
            self.table.remove_index(index);
        }
    }

    /// Claim a slot stamped with the current clock value.
    pub(crate) fn allocate(&mut self, init: SlotInit<'a>) -> EventId {
        let epoch = self.clock.now();
        self.table.allocate(init, epoch)
    }

    pub fn is_valid(&self, id: EventId) -> bool {
        self.table.is_valid(id)
    }

    pub fn enable(&mut self, id: EventId) {
        self.table.enable(id);
    }

    pub fn enable_pair(&mut self, pair: EventIdPair) {
        for id in pair.legs() {
            self.table.enable(id);
        }
    }

    pub fn disable(&mut self, id: EventId) {
        self.table.disable(id);
    }

    pub fn disable_pair(&mut self, pair: EventIdPair) {
        for id in pair.legs() {
            self.table.disable(id);
        }
    }

    /// Remove the event, firing its stop callback. No-op for a stale handle.
    pub fn remove(&mut self, id: EventId) {
        self.table.remove(id);
    }

    pub fn remove_pair(&mut self, pair: EventIdPair) {
        for id in pair.legs() {
            self.table.remove(id);
        }
    }

    /// Remove the event without firing its stop callback.
    pub fn clear(&mut self, id: EventId) {
        self.table.clear(id);
    }

    /// Enable whatever occupies slot `index`, without checking a handle. No-op on a free slot.
    pub fn enable_index(&mut self, index: usize) {
        self.table.enable_index(index);
    }

    pub fn disable_index(&mut self, index: usize) {
        self.table.disable_index(index);
    }

    /// Free slot `index` unconditionally, firing its stop callback if one is attached.
    pub fn remove_index(&mut self, index: usize) {
        self.table.remove_index(index);
    }

    pub fn clear_index(&mut self, index: usize) {
        self.table.clear_index(index);
    }

    pub fn clear_pair(&mut self, pair: EventIdPair) {
        for id in pair.legs() {
            self.table.clear(id);
        }
    }

    /// Remove every event (firing stop callbacks) and rewind the clock to 0.
    pub fn remove_all_events(&mut self) {
        self.table.remove_all();
        self.clock.set(0);
    }

    /// Clear every event (no stop callbacks) and rewind the clock to 0.
    pub fn clear_all_events(&mut self) {
        self.table.clear_all();
        self.clock.set(0);
    }

    /// Attach a callback fired once, just before the first occurrence.
    pub fn add_start_callback(&mut self, id: EventId, callback: impl Into<Callback<'a>>) {
        if let Some(slot) = self.table.validate_mut(id) {
            slot.callback_on_start = callback.into();
        }
    }

    /// Attach a callback fired once when the event is retired or removed.
    pub fn add_stop_callback(&mut self, id: EventId, callback: impl Into<Callback<'a>>) {
        if let Some(slot) = self.table.validate_mut(id) {
            slot.callback_on_stop = callback.into();
        }
    }

    pub fn replace_callback(&mut self, id: EventId, callback: impl Into<Callback<'a>>) {
        if let Some(slot) = self.table.validate_mut(id) {
            slot.callback = callback.into();
        }
    }

    /// Start callback for a PWM pair; attached to the rising leg only.
    pub fn add_start_callback_pair(
        &mut self,
        pair: EventIdPair,
        callback: impl Into<Callback<'a>>,
    ) {
        self.add_start_callback(pair.event_id_0, callback);
    }

    /// Stop callback for a PWM pair; attached to the rising leg only.
    pub fn add_stop_callback_pair(
        &mut self,
        pair: EventIdPair,
        callback: impl Into<Callback<'a>>,
    ) {
        self.add_stop_callback(pair.event_id_0, callback);
    }

    pub fn replace_callbacks(
        &mut self,
        pair: EventIdPair,
        callback_0: impl Into<Callback<'a>>,
        callback_1: impl Into<Callback<'a>>,
    ) {
        self.replace_callback(pair.event_id_0, callback_0);
        self.replace_callback(pair.event_id_1, callback_1);
    }

    /// Overwrite the event's argument with its slot index.
    pub fn set_event_arg_to_event_index(&mut self, id: EventId) {
        if let Some(slot) = self.table.validate_mut(id) {
            slot.arg = id.index() as i32;
        }
    }

    /// Copy of the slot behind `id`, or an empty slot if the handle is stale.
    pub fn get(&self, id: EventId) -> Slot<'a> {
        self.table.get(id)
    }

    pub fn try_get(&self, id: EventId) -> Option<Slot<'a>> {
        self.table.try_get(id)
    }

    pub fn get_index(&self, index: usize) -> Slot<'a> {
        self.table.get_index(index)
    }

    pub fn slots(&self) -> &[Slot<'a>; N] {
        self.table.slots()
    }

    /// Events that are allocated and enabled.
    pub fn events_active(&self) -> usize {
        self.table.active_count()
    }

    /// Free slots left for new events.
    pub fn events_available(&self) -> usize {
        self.table.available_count()
    }
}

impl<const N: usize> Default for EventController<'_, N> {
    fn default() -> Self {
        Self::new()
    }
}
