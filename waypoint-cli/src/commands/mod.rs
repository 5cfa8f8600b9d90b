//! Command implementations for the waypoint CLI

pub mod serve;

pub use serve::run_serve;
