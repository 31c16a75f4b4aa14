//! tapcast-endpoint library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does tapcast-endpoint do? (for beginners)
//!
//! The *endpoint* runs on (or next to) the device being controlled. A
//! remote *controller* sends it a stream of binary control messages over
//! one TCP connection: key presses, text, touch contacts, and scroll
//! wheel motion. The endpoint decodes each message, tracks which touch
//! contacts are currently down, and synthesizes the platform motion and
//! key events that make the device behave as if a finger or mouse were
//! physically on it.
//!
//! The endpoint application:
//!
//! 1. Connects to the controller's control socket over TCP.
//! 2. Reads framed control messages one at a time (`Session`).
//! 3. Tracks up to ten concurrent touch contacts in a fixed slot table.
//! 4. Remaps actions for multi-touch and brackets mouse button presses
//!    with the extra down/up events the platform expects (`Controller`).
//! 5. Hands each synthesized event to an [`EventSink`] for injection.
//!
//! [`EventSink`]: application::controller::EventSink

/// Application layer: event synthesis and the traits it depends on.
pub mod application;

/// Runtime configuration loading.
pub mod config;

/// Infrastructure layer: device geometry, sinks, key composition, network.
pub mod infrastructure;
