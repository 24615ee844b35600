//! Core board logic for the pipeboard lead kanban.
//!
//! This crate holds the pure, synchronous half of the system: the lead and
//! stage types, the grouped-by-stage column state with its two sanctioned
//! mutation primitives, and the drag reconciler state machine. Networking
//! and orchestration live in `pipeboard-client`.

pub mod board;
pub mod drag;
pub mod types;
