//! # tapcast-core
//!
//! Shared library for tapcast, the remote input-injection endpoint of a
//! screen-mirroring pair. Contains the control-message wire codec, the
//! fixed-capacity pointer table, and the synthesized-event domain types.
//!
//! This crate has zero dependencies on OS APIs or network sockets: bytes
//! come in as slices, events go out as plain structs. The endpoint
//! application (`tapcast-endpoint`) wires it to a TCP stream and an event
//! sink.

pub mod domain;
pub mod protocol;

pub use domain::event::{EventSource, PointerSnapshot, SynthesizedEvent};
pub use domain::geometry::{PhysicalPoint, ScreenSize};
pub use domain::pointers::{Pointer, PointersState, SlotsExhausted, MAX_POINTERS};
pub use protocol::codec::{decode_message, decode_payload, encode_message, ProtocolError};
pub use protocol::messages::{ControlMsg, MessageType, Position};
