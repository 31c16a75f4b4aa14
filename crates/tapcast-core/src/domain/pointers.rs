//! Fixed-capacity registry of live pointer contacts.
//!
//! Maps a 64-bit logical pointer id from the controller to a stable
//! small-integer slot for the lifetime of the contact. The arena holds at
//! most [`MAX_POINTERS`] entries and never allocates per touch event;
//! lookups are a linear scan over the small fixed table.

use thiserror::Error;

use crate::domain::geometry::PhysicalPoint;

/// Maximum number of simultaneously tracked contacts, matching the
/// platform's fixed pointer ceiling.
pub const MAX_POINTERS: usize = 10;

/// One currently tracked contact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    /// Logical pointer id assigned by the controller.
    pub id: i64,
    /// Latest mapped position on the local device.
    pub point: PhysicalPoint,
    /// Latest reported pressure.
    pub pressure: f32,
    /// Whether the latest update marked this contact as lifting. The entry
    /// stays in the table until [`PointersState::release`] is called, so the
    /// up-event itself still reports it.
    pub is_up: bool,
}

/// Every slot is occupied by another live pointer; the caller must drop
/// the offending touch event.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("all {MAX_POINTERS} pointer slots are occupied")]
pub struct SlotsExhausted;

/// Slot-indexed arena of live pointers.
///
/// Invariants: a live id keeps its slot until released; no two live
/// entries share an id; freed slots are reused lowest-first, so a lone
/// mouse or first finger always lands in slot 0.
#[derive(Debug, Default)]
pub struct PointersState {
    slots: [Option<Pointer>; MAX_POINTERS],
}

impl PointersState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the slot already assigned to `id`, or assigns the lowest
    /// free slot to it.
    ///
    /// # Errors
    ///
    /// Returns [`SlotsExhausted`] when `id` is new and the table is full.
    pub fn resolve_slot(&mut self, id: i64) -> Result<usize, SlotsExhausted> {
        if let Some(slot) = self.slots.iter().position(|p| matches!(p, Some(p) if p.id == id)) {
            return Ok(slot);
        }
        let free = self
            .slots
            .iter()
            .position(Option::is_none)
            .ok_or(SlotsExhausted)?;
        self.slots[free] = Some(Pointer {
            id,
            point: PhysicalPoint::default(),
            pressure: 0.0,
            is_up: false,
        });
        Ok(free)
    }

    /// Overwrites the tracked state of an occupied slot.
    pub fn update(&mut self, slot: usize, point: PhysicalPoint, pressure: f32, is_up: bool) {
        if let Some(pointer) = self.slots[slot].as_mut() {
            pointer.point = point;
            pointer.pressure = pressure;
            pointer.is_up = is_up;
        }
    }

    /// Frees a slot for reuse. Called exactly once per contact, after the
    /// event synthesizing its up-transition has been produced.
    pub fn release(&mut self, slot: usize) {
        self.slots[slot] = None;
    }

    /// Number of currently occupied slots, lifting contacts included.
    pub fn live_count(&self) -> u8 {
        self.slots.iter().filter(|p| p.is_some()).count() as u8
    }

    /// The pointer occupying `slot`, if any.
    pub fn get(&self, slot: usize) -> Option<&Pointer> {
        self.slots[slot].as_ref()
    }

    /// Iterates the occupied slots in slot order.
    pub fn live(&self) -> impl Iterator<Item = (usize, &Pointer)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, p)| p.as_ref().map(|p| (slot, p)))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
