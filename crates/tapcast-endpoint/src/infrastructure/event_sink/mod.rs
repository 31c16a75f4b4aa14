//! Event-sink implementations.
//!
//! The real sink is whatever platform call delivers a synthesized event
//! into the local input subsystem (a uinput device, a compositor
//! protocol, an `InputManager` binder call). That boundary is out of
//! scope here; the crate ships the recording mock used by tests and by
//! the default binary wiring.

pub mod mock;
