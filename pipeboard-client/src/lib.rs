//! Async collaborators around the pipeboard core: the HTTP lead store
//! client, bearer-token session storage, environment-driven configuration,
//! and the board controller that orchestrates loads, edits, and drag
//! persistence.

pub mod api;
pub mod config;
pub mod controller;
pub mod session;
