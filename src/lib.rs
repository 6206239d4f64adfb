//! Kinship: emotional contagion among simulated creatures.
//!
//! The engine lives in `kinship_core`; this crate wires it to an ECS world,
//! loads `config.toml`, and hosts the headless runner.

pub mod model;

pub use kinship_core::{init_logging, ContagionConfig};
pub use model::config::AppConfig;
pub use model::world::World;
