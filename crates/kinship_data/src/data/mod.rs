//! Core data structures for the Kinship simulation.

pub mod agent;
pub mod emotion;
pub mod stats;
