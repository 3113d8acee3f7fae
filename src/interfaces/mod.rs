//! Adapters between the outside world and the engines.

pub mod csv;
