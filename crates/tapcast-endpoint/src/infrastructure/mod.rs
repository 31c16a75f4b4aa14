//! Concrete implementations of the application-layer traits plus the
//! network dispatch loop.

pub mod composer;
pub mod device;
pub mod event_sink;
pub mod network;
