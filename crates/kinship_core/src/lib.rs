//! # Kinship Core
//!
//! The emotional contagion engine behind the Kinship creature simulation.
//!
//! Agents are entities in an `hecs` world carrying an [`Identity`], a
//! [`Position`], an [`EmotionalState`] and, optionally, an [`EmpathyProfile`].
//! Every `update_interval` seconds the [`ContagionSystem`]:
//! - rebuilds a uniform-grid spatial hash of all agents in parallel;
//! - scans each emotional agent's 3x3 block of cells in parallel and rolls
//!   distance- and empathy-weighted contagion against nearby agents;
//! - applies the strongest proposal per target after the scan has joined;
//! - decays every agent's intensity back toward neutral.
//!
//! Random draws come from per-(tick, agent) ChaCha streams, so a fixed seed
//! reproduces a run exactly regardless of thread count.
//!
//! ## Example
//!
//! ```
//! use kinship_core::{ContagionConfig, ContagionSystem};
//! use kinship_data::{Emotion, EmotionalState, EmpathyProfile, Identity, Position};
//!
//! let mut ecs = hecs::World::new();
//! ecs.spawn((
//!     Identity::new(),
//!     Position::planar(12.0, 12.0),
//!     EmotionalState::new(Emotion::Happy, 0.9),
//!     EmpathyProfile::new(0.3),
//! ));
//!
//! let mut system = ContagionSystem::new(ContagionConfig::default()).unwrap();
//! assert!(system.update(&mut ecs, 0.1).is_none()); // throttled
//! let stats = system.update(&mut ecs, 0.5).expect("interval elapsed");
//! assert_eq!(stats.agents, 1);
//! ```
//!
//! [`Identity`]: kinship_data::Identity
//! [`Position`]: kinship_data::Position
//! [`EmotionalState`]: kinship_data::EmotionalState
//! [`EmpathyProfile`]: kinship_data::EmpathyProfile

/// Configuration for the contagion pipeline
pub mod config;
/// Symmetric emotion blending table
pub mod emotion;
/// Pipeline metrics and logging setup
pub mod metrics;
/// Per-(tick, agent) random streams
pub mod rng;
/// Uniform grid spatial hash with a 3x3 neighbor scan
pub mod spatial_hash;
/// Simulation systems
pub mod systems;
/// Fixed-interval pipeline gate
pub mod throttle;

pub use config::{BlendFallback, ConfigError, ContagionConfig, DistanceMetric};
pub use metrics::{init_logging, Metrics};
pub use spatial_hash::{GridError, SpatialHash};
pub use systems::contagion::ContagionSystem;
pub use throttle::Throttle;
