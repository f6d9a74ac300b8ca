//! Fixed-capacity slot arena.
//!
//! # Overview
//! - `N` slots, allocated lowest-index-first by a linear scan.
//! - Allocation never waits: a full table yields [`EventId::NONE`] and leaves every slot intact.
//! - Handle-based operations validate index, occupancy, and epoch first; a stale handle is a
//!   silent no-op.
//! - Index-based operations are for the scheduler and skip the epoch check.

use crate::callback::Callback;
use crate::event::{EventId, Slot};

/// Everything needed to populate a freshly allocated slot.
#[derive(Copy, Clone, Debug)]
pub(crate) struct SlotInit<'a> {
    pub callback: Callback<'a>,
    pub due_time: u32,
    pub period: u32,
    pub occurrence_limit: u32,
    pub infinite: bool,
    pub arg: i32,
}

#[derive(Debug)]
pub struct EventTable<'a, const N: usize> {
    slots: [Slot<'a>; N],
}

impl<'a, const N: usize> EventTable<'a, N> {
    pub const fn new() -> Self {
        assert!(N > 0);
        Self {
            slots: [Slot::EMPTY; N],
        }
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    fn find_free(&self) -> Option<usize> {
        self.slots.iter().position(|slot| slot.free)
    }

    /// Claim the lowest free slot, stamping it with `epoch`. The new slot starts disabled.
    pub(crate) fn allocate(&mut self, init: SlotInit<'a>, epoch: u32) -> EventId {
        let Some(index) = self.find_free() else {
            warn!("event table full ({=usize} slots)", N);
            return EventId::NONE;
        };
        self.slots[index] = Slot {
            callback: init.callback,
            callback_on_start: Callback::EMPTY,
            callback_on_stop: Callback::EMPTY,
            epoch,
            due_time: init.due_time,
            period: init.period,
            occurrence_limit: init.occurrence_limit,
            occurrence_count: 0,
            infinite: init.infinite,
            enabled: false,
            free: false,
            arg: init.arg,
        };
        trace!("allocated slot {=usize} due {=u32}", index, init.due_time);
        EventId::new(index, epoch)
    }

    /// Resolve a handle to its slot, or `None` if the handle is stale or out of range.
    pub fn validate(&self, id: EventId) -> Option<&Slot<'a>> {
        self.slots
            .get(id.index())
            .filter(|slot| !slot.free && slot.epoch == id.epoch())
    }

    pub(crate) fn validate_mut(&mut self, id: EventId) -> Option<&mut Slot<'a>> {
        let slot = self
            .slots
            .get_mut(id.index())
            .filter(|slot| !slot.free && slot.epoch == id.epoch());
        if slot.is_none() && !id.is_none() {
            debug!("ignoring stale handle to slot {=usize}", id.index());
        }
        slot
    }

    #[inline]
    pub fn is_valid(&self, id: EventId) -> bool {
        self.validate(id).is_some()
    }

    /// Free the slot behind `id`, firing its stop callback. Returns false for a stale handle.
    pub fn remove(&mut self, id: EventId) -> bool {
        if self.validate_mut(id).is_none() {
            return false;
        }
        self.remove_index(id.index());
        true
    }

    /// Unconditionally free slot `index`, firing its stop callback if one is attached.
    ///
    /// Fires even for disabled slots: removal is a forced terminal transition.
    pub fn remove_index(&mut self, index: usize) {
        let Some(slot) = self.slots.get(index) else {
            return;
        };
        let (on_stop, arg) = (slot.callback_on_stop, slot.arg);
        on_stop.call(arg);
        self.clear_index(index);
    }

    /// Free the slot behind `id` without firing its stop callback.
    pub fn clear(&mut self, id: EventId) -> bool {
        if self.validate_mut(id).is_none() {
            return false;
        }
        self.clear_index(id.index());
        true
    }

    pub fn clear_index(&mut self, index: usize) {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = Slot::EMPTY;
        }
    }

    pub fn remove_all(&mut self) {
        for index in 0..N {
            self.remove_index(index);
        }
    }

    pub fn clear_all(&mut self) {
        self.slots = [Slot::EMPTY; N];
    }

    pub fn enable(&mut self, id: EventId) -> bool {
        self.set_enabled(id, true)
    }

    pub fn disable(&mut self, id: EventId) -> bool {
        self.set_enabled(id, false)
    }

    fn set_enabled(&mut self, id: EventId, enabled: bool) -> bool {
        match self.validate_mut(id) {
            Some(slot) => {
                slot.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Enable an occupied slot by index. No-op on a free slot.
    pub fn enable_index(&mut self, index: usize) {
        self.set_enabled_index(index, true);
    }

    pub fn disable_index(&mut self, index: usize) {
        self.set_enabled_index(index, false);
    }

    fn set_enabled_index(&mut self, index: usize, enabled: bool) {
        if let Some(slot) = self.slots.get_mut(index).filter(|slot| !slot.free) {
            slot.enabled = enabled;
        }
    }

    /// Occupied and enabled slots.
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| !s.free && s.enabled).count()
    }

    /// Free slots.
    pub fn available_count(&self) -> usize {
        self.slots.iter().filter(|s| s.free).count()
    }

    /// Copy of the slot behind `id`, or an empty slot if the handle is stale.
    pub fn get(&self, id: EventId) -> Slot<'a> {
        self.try_get(id).unwrap_or_default()
    }

    pub fn try_get(&self, id: EventId) -> Option<Slot<'a>> {
        self.validate(id).copied()
    }

    /// Copy of slot `index` regardless of occupancy, or an empty slot if out of range.
    pub fn get_index(&self, index: usize) -> Slot<'a> {
        self.slots.get(index).copied().unwrap_or_default()
    }

    pub fn slots(&self) -> &[Slot<'a>; N] {
        &self.slots
    }

    #[inline]
    pub(crate) fn slot_mut(&mut self, index: usize) -> &mut Slot<'a> {
        &mut self.slots[index]
    }
}

impl<const N: usize> Default for EventTable<'_, N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{EventTable, SlotInit};
    use crate::callback::Callback;
    use crate::event::{EventId, NO_ARG};
    use std::sync::Mutex;
    use std::vec::Vec;

    fn one_shot(due_time: u32, arg: i32) -> SlotInit<'static> {
        SlotInit {
            callback: Callback::EMPTY,
            due_time,
            period: 0,
            occurrence_limit: 1,
            infinite: false,
            arg,
        }
    }

    #[test]
    fn allocates_lowest_free_index() {
        let mut table = EventTable::<4>::new();
        let a = table.allocate(one_shot(5, 1), 0);
        let b = table.allocate(one_shot(5, 2), 0);
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);

        assert!(table.remove(a));
        let c = table.allocate(one_shot(5, 3), 7);
        assert_eq!(c.index(), 0);
        assert_eq!(c.epoch(), 7);
        assert_eq!(table.available_count(), 2);
    }

    #[test]
    fn new_slot_is_populated_and_disabled() {
        let mut table = EventTable::<2>::new();
        let id = table.allocate(
            SlotInit {
                callback: Callback::EMPTY,
                due_time: 40,
                period: 10,
                occurrence_limit: 3,
                infinite: false,
                arg: 9,
            },
            12,
        );
        let slot = table.get(id);
        assert!(!slot.free);
        assert!(!slot.enabled);
        assert_eq!(slot.epoch, 12);
        assert_eq!(slot.due_time, 40);
        assert_eq!(slot.period, 10);
        assert_eq!(slot.occurrence_limit, 3);
        assert_eq!(slot.occurrence_count, 0);
        assert_eq!(slot.arg, 9);
    }

    #[test]
    fn full_table_returns_none_without_mutation() {
        let mut table = EventTable::<3>::new();
        for i in 0..3 {
            assert!(!table.allocate(one_shot(1, i), 0).is_none());
        }
        assert_eq!(table.available_count(), 0);

        let before = *table.slots();
        let id = table.allocate(one_shot(99, 99), 5);
        assert_eq!(id, EventId::NONE);
        for (a, b) in before.iter().zip(table.slots().iter()) {
            assert_eq!(a.arg, b.arg);
            assert_eq!(a.due_time, b.due_time);
        }
    }

    #[test]
    fn stale_handle_is_rejected_after_reuse() {
        let mut table = EventTable::<1>::new();
        let old = table.allocate(one_shot(1, 1), 3);
        assert!(table.remove(old));
        let new = table.allocate(one_shot(1, 2), 4);
        assert_eq!(old.index(), new.index());
        assert_ne!(old, new);

        assert!(!table.is_valid(old));
        assert!(!table.enable(old));
        assert!(!table.remove(old));
        assert!(!table.clear(old));
        assert!(table.is_valid(new));
        assert!(!table.get(new).enabled);
    }

    #[test]
    fn remove_fires_stop_even_when_disabled() {
        let stops = Mutex::new(Vec::new());
        let on_stop = |arg: i32| stops.lock().unwrap().push(arg);

        let mut table = EventTable::<2>::new();
        let id = table.allocate(one_shot(10, 77), 0);
        table.slot_mut(id.index()).callback_on_stop = Callback::from(&on_stop);

        assert!(table.remove(id));
        assert!(!table.remove(id));
        assert_eq!(&stops.lock().unwrap()[..], &[77]);

        let slot = table.get_index(id.index());
        assert!(slot.free);
        assert_eq!(slot.arg, NO_ARG);
        assert!(slot.callback_on_stop.is_empty());
    }

    #[test]
    fn clear_skips_stop_callback() {
        let stops = Mutex::new(Vec::new());
        let on_stop = |arg: i32| stops.lock().unwrap().push(arg);

        let mut table = EventTable::<2>::new();
        let id = table.allocate(one_shot(10, 5), 0);
        table.slot_mut(id.index()).callback_on_stop = Callback::from(&on_stop);

        assert!(table.clear(id));
        assert!(stops.lock().unwrap().is_empty());
        assert_eq!(table.available_count(), 2);
    }

    #[test]
    fn counts_track_enable_state() {
        let mut table = EventTable::<4>::new();
        let a = table.allocate(one_shot(1, 0), 0);
        let _b = table.allocate(one_shot(1, 0), 0);
        assert_eq!(table.active_count(), 0);
        assert_eq!(table.available_count(), 2);

        table.enable(a);
        assert_eq!(table.active_count(), 1);
        table.disable(a);
        assert_eq!(table.active_count(), 0);

        table.enable_index(3);
        assert_eq!(table.active_count(), 0);
        assert!(!table.get_index(3).enabled);
    }

    #[test]
    fn out_of_range_lookups_are_empty() {
        let table = EventTable::<2>::new();
        assert!(table.get(EventId::NONE).free);
        assert!(table.try_get(EventId::NONE).is_none());
        assert!(table.get_index(10).free);
    }
}
