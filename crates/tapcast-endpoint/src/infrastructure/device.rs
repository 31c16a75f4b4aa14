//! Screen-geometry device mapper.
//!
//! Validates that a controller position was generated against the
//! device's current screen size before letting it through. Positions
//! produced for a different size (typically a rotation that the
//! controller has not observed yet) get no mapping, and the caller drops
//! the event: a stale coordinate must never be injected.

use tapcast_core::domain::geometry::{PhysicalPoint, ScreenSize};
use tapcast_core::protocol::messages::Position;
use tracing::debug;

use crate::application::controller::DeviceMapper;

/// The local device's screen as seen by the input subsystem.
#[derive(Debug, Clone)]
pub struct ScreenGeometry {
    size: ScreenSize,
}

impl ScreenGeometry {
    pub fn new(size: ScreenSize) -> Self {
        Self { size }
    }

    pub fn size(&self) -> ScreenSize {
        self.size
    }

    /// Replaces the current screen size, e.g. after the display rotates.
    /// Pending controller positions declared at the old size will stop
    /// mapping until the controller catches up.
    pub fn set_size(&mut self, size: ScreenSize) {
        debug!(width = size.width, height = size.height, "screen size updated");
        self.size = size;
    }
}

impl DeviceMapper for ScreenGeometry {
    fn to_physical(&self, position: Position) -> Option<PhysicalPoint> {
        if position.screen_width != self.size.width || position.screen_height != self.size.height {
            return None;
        }
        Some(PhysicalPoint::new(position.x, position.y))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
