//! Synthesized hardware-input events, the output side of the endpoint.
//!
//! A [`SynthesizedEvent`] is produced by the controller and handed to the
//! event sink immediately; the core never retains one.

use crate::domain::geometry::PhysicalPoint;
use crate::domain::motion::{source, tool_type};

/// Which class of input device a synthesized event claims to come from.
///
/// Touchscreen events must never carry a button mask; mouse events pass
/// the controller's button mask through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSource {
    Touchscreen,
    Mouse,
}

impl EventSource {
    /// The raw input-source code the platform expects.
    pub fn raw(self) -> u32 {
        match self {
            EventSource::Touchscreen => source::TOUCHSCREEN,
            EventSource::Mouse => source::MOUSE,
        }
    }

    /// The tool type reported for the pointer that caused the event.
    pub fn tool_type(self) -> i32 {
        match self {
            EventSource::Touchscreen => tool_type::FINGER,
            EventSource::Mouse => tool_type::MOUSE,
        }
    }
}

/// Immutable copy of one tracked pointer at the moment an event was built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSnapshot {
    /// Slot index the pointer occupies in the table.
    pub slot: u8,
    /// Logical pointer id from the controller.
    pub id: i64,
    pub point: PhysicalPoint,
    pub pressure: f32,
    /// [`tool_type`] constant for this pointer.
    pub tool_type: i32,
}

/// One ordered primitive input event, ownership of which transfers to the
/// event sink on delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesizedEvent {
    /// Base timestamp of the current gesture, in device-uptime millis.
    /// Platforms use it to compute gesture duration.
    pub timestamp_base: i64,
    /// Timestamp of this event, in device-uptime millis.
    pub timestamp_now: i64,
    /// Motion action code, pointer index bits included where applicable.
    pub action: i32,
    /// Number of live pointers at the time of the event.
    pub pointer_count: u8,
    /// Snapshots of all live pointers, in slot order.
    pub pointers: Vec<PointerSnapshot>,
    /// Active mouse-button mask; always 0 for touchscreen events.
    pub buttons: u32,
    /// The specific button that transitioned; nonzero only for button
    /// press/release events.
    pub action_button: u32,
    /// Horizontal scroll axis value; nonzero only for scroll events.
    pub hscroll: f32,
    /// Vertical scroll axis value; nonzero only for scroll events.
    pub vscroll: f32,
    pub source: EventSource,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
