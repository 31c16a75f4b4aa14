//! Application layer: the event-synthesis controller and the collaborator
//! traits it drives.

pub mod controller;
