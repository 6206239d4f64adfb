//! Component types shared by the Kinship simulation crates.
//!
//! Everything here is plain data: the contagion engine in `kinship_core`
//! reads and writes these components, the ECS stores them.

pub mod data;

pub use data::agent::{Identity, Position};
pub use data::emotion::{Emotion, EmotionalState, EmpathyProfile};
pub use data::stats::ContagionStats;
