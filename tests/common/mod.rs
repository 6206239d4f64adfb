#[macro_use]
pub mod macros;

use kinship_lib::model::config::AppConfig;
use kinship_lib::World;
use kinship_core::ContagionConfig;
use kinship_data::{EmotionalState, Position};
use uuid::Uuid;

/// Stable test id for agent `n`.
#[allow(dead_code)]
pub fn id(n: u128) -> Uuid {
    Uuid::from_u128(n)
}

struct AgentSpec {
    id: Uuid,
    position: Position,
    state: EmotionalState,
    empathy: Option<f32>,
}

#[allow(dead_code)]
pub struct WorldBuilder {
    config: AppConfig,
    agents: Vec<AgentSpec>,
}

#[allow(dead_code)]
impl WorldBuilder {
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.world.initial_population = 0;
        config.world.seed = Some(0);
        Self {
            config,
            agents: Vec::new(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.world.seed = Some(seed);
        self
    }

    pub fn with_config<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        modifier(&mut self.config);
        self
    }

    pub fn with_contagion<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut ContagionConfig),
    {
        modifier(&mut self.config.contagion);
        self
    }

    /// Makes every contagion roll succeed.
    pub fn always_roll(self) -> Self {
        self.with_contagion(|c| c.base_chance = 1.0e6)
    }

    pub fn with_agent(
        mut self,
        n: u128,
        x: f64,
        z: f64,
        state: EmotionalState,
        empathy: Option<f32>,
    ) -> Self {
        self.agents.push(AgentSpec {
            id: id(n),
            position: Position::planar(x, z),
            state,
            empathy,
        });
        self
    }

    pub fn build(self) -> World {
        let mut world = World::new(0, self.config).expect("Failed to create world");
        for spec in self.agents {
            world.spawn_agent_with_id(spec.id, spec.position, spec.state, spec.empathy);
        }
        world
    }
}
