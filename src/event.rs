//! Slot records and the generation-stamped handles that name them.
//!
//! # Handles
//! Slots are reused, so a bare index cannot tell "my event" apart from a later event that landed
//! in the same row. An [`EventId`] pairs the index with the slot's epoch (the clock value when it
//! was allocated); it only resolves while the slot still carries that epoch. Freeing a slot
//! invalidates every handle to it for good.
//!
//! Two allocations of the same index within a single tick share an epoch and are therefore
//! indistinguishable by handle.

use crate::callback::Callback;

/// Argument value carried by free slots.
pub const NO_ARG: i32 = -1;

/// One row of the event table.
#[derive(Copy, Clone, Debug)]
pub struct Slot<'a> {
    pub callback: Callback<'a>,
    pub callback_on_start: Callback<'a>,
    pub callback_on_stop: Callback<'a>,
    /// Clock value at allocation. Doubles as the slot's generation stamp.
    pub epoch: u32,
    /// Absolute tick of the next occurrence.
    pub due_time: u32,
    /// Spacing between occurrences; `0` for one-shot events.
    pub period: u32,
    pub occurrence_limit: u32,
    pub occurrence_count: u32,
    pub infinite: bool,
    pub enabled: bool,
    pub free: bool,
    pub arg: i32,
}

impl<'a> Slot<'a> {
    /// Free-state slot.
    pub const EMPTY: Self = Self {
        callback: Callback::EMPTY,
        callback_on_start: Callback::EMPTY,
        callback_on_stop: Callback::EMPTY,
        epoch: 0,
        due_time: 0,
        period: 0,
        occurrence_limit: 0,
        occurrence_count: 0,
        infinite: false,
        enabled: false,
        free: true,
        arg: NO_ARG,
    };

    /// True while the slot still has occurrences left to fire.
    #[inline]
    pub fn has_remaining(&self) -> bool {
        self.infinite || self.occurrence_count < self.occurrence_limit
    }

    #[inline]
    pub fn is_recurring(&self) -> bool {
        self.period > 0
    }
}

impl Default for Slot<'_> {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Handle to one allocation of a table slot.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EventId {
    index: usize,
    epoch: u32,
}

impl EventId {
    /// "No event". Compares unequal to every handle returned by a successful allocation.
    pub const NONE: Self = Self {
        index: usize::MAX,
        epoch: 0,
    };

    #[inline]
    pub(crate) const fn new(index: usize, epoch: u32) -> Self {
        Self { index, epoch }
    }

    #[inline]
    pub const fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub const fn epoch(&self) -> u32 {
        self.epoch
    }

    #[inline]
    pub const fn is_none(&self) -> bool {
        self.index == usize::MAX
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::NONE
    }
}

/// Handles to the rising (`event_id_0`) and falling (`event_id_1`) legs of a PWM event.
///
/// Degenerate PWM parameters produce a single leg; `event_id_1` is then [`EventId::NONE`].
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EventIdPair {
    pub event_id_0: EventId,
    pub event_id_1: EventId,
}

impl EventIdPair {
    pub const NONE: Self = Self {
        event_id_0: EventId::NONE,
        event_id_1: EventId::NONE,
    };

    #[inline]
    pub const fn is_none(&self) -> bool {
        self.event_id_0.is_none() && self.event_id_1.is_none()
    }

    #[inline]
    pub const fn legs(&self) -> [EventId; 2] {
        [self.event_id_0, self.event_id_1]
    }
}

impl Default for EventIdPair {
    fn default() -> Self {
        Self::NONE
    }
}
