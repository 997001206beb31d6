//! valet — a deterministic, in-memory parking slot allocation engine.
//!
//! Zones contain areas, areas contain slots. Requests flow through a
//! strict lifecycle (`requested → allocated → occupied → released`,
//! with cancellation), allocation prefers the requested zone and falls
//! back one hop to adjacent zones, and every successful allocation is
//! recorded in an undo log that supports last-k rollback.
//!
//! The core is single-threaded and synchronous: [`engine::Engine`]
//! takes `&mut self` for every mutation and callers serialize access.

pub mod clock;
pub mod engine;
pub mod ids;
pub mod model;
pub mod observability;
