//! Mock event sink for testing and for running the endpoint without a
//! platform input backend.
//!
//! Every delivered event is recorded in a `Mutex<Vec<...>>` so tests can
//! assert exactly what was injected and in what order. Setting
//! `fail_all` makes every delivery return an error, exercising the
//! callers' failure paths without a broken platform.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use tapcast_core::domain::event::SynthesizedEvent;
use tracing::trace;

use crate::application::controller::{EventSink, InjectMode, SinkError};

/// One recorded key delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyRecord {
    pub action: i32,
    pub keycode: i32,
    pub repeat: i32,
    pub metastate: i32,
    pub mode: InjectMode,
}

/// A sink that records all deliveries instead of touching the OS.
#[derive(Debug, Default)]
pub struct MockEventSink {
    /// Motion events in delivery order.
    pub motions: Mutex<Vec<SynthesizedEvent>>,
    /// Key events in delivery order.
    pub keys: Mutex<Vec<KeyRecord>>,
    /// When set, every delivery fails with a platform error.
    pub fail_all: AtomicBool,
}

impl MockEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of deliveries of either kind.
    pub fn delivered(&self) -> usize {
        self.motions.lock().unwrap().len() + self.keys.lock().unwrap().len()
    }
}

impl EventSink for &MockEventSink {
    fn deliver(&self, event: &SynthesizedEvent) -> Result<(), SinkError> {
        if self.fail_all.load(Ordering::Relaxed) {
            return Err(SinkError::Platform("mock failure".to_string()));
        }
        trace!(action = event.action, source = ?event.source, "mock sink delivery");
        self.motions.lock().unwrap().push(event.clone());
        Ok(())
    }

    fn deliver_key(
        &self,
        action: i32,
        keycode: i32,
        repeat: i32,
        metastate: i32,
        mode: InjectMode,
    ) -> Result<(), SinkError> {
        if self.fail_all.load(Ordering::Relaxed) {
            return Err(SinkError::Platform("mock failure".to_string()));
        }
        self.keys.lock().unwrap().push(KeyRecord {
            action,
            keycode,
            repeat,
            metastate,
            mode,
        });
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
