//! Pure input-domain types: geometry, motion constants, the pointer
//! table, and synthesized events. No OS, socket, or UI dependencies.

pub mod event;
pub mod geometry;
pub mod motion;
pub mod pointers;
