use crate::model::config::AppConfig;
use kinship_core::ContagionSystem;
use kinship_data::{ContagionStats, Emotion, EmotionalState, EmpathyProfile, Identity, Position};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

/// Owned copy of one agent's components.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentView {
    pub id: Uuid,
    pub position: Position,
    pub state: EmotionalState,
    pub empathy: Option<EmpathyProfile>,
}

/// A population of agents plus the contagion system that drives them.
pub struct World {
    pub ecs: hecs::World,
    pub config: AppConfig,
    pub contagion: ContagionSystem,
    pub rng: ChaCha8Rng,
    pub step: u64,
    index: HashMap<Uuid, hecs::Entity>,
}

impl World {
    /// Creates a world and scatters `initial_population` agents across it.
    pub fn new(initial_population: usize, mut config: AppConfig) -> anyhow::Result<Self> {
        if let Some(seed) = config.world.seed {
            config.contagion.seed = seed;
        }
        config.validate()?;

        let rng = match config.world.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let contagion = ContagionSystem::new(config.contagion.clone())?;

        let mut world = Self {
            ecs: hecs::World::new(),
            config,
            contagion,
            rng,
            step: 0,
            index: HashMap::new(),
        };
        world.populate(initial_population);
        Ok(world)
    }

    fn populate(&mut self, count: usize) {
        let width = self.config.world.width;
        let height = self.config.world.height;
        let fraction = self.config.world.emotional_fraction;

        for _ in 0..count {
            let id = Uuid::from_u128(self.rng.gen());
            let position = Position::planar(
                self.rng.gen_range(0.0..width),
                self.rng.gen_range(0.0..height),
            );
            let state = if self.rng.gen_bool(fraction) {
                let emotion = Emotion::ALL[self.rng.gen_range(1..Emotion::ALL.len())];
                EmotionalState::new(emotion, self.rng.gen_range(0.5..=1.0))
            } else {
                EmotionalState::neutral()
            };
            let empathy = self.rng.gen_range(0.0..=1.0);
            self.spawn_agent_with_id(id, position, state, Some(empathy));
        }
        tracing::debug!(count, "population spawned");
    }

    /// Adds an agent with a fresh random id.
    pub fn spawn_agent(
        &mut self,
        position: Position,
        state: EmotionalState,
        empathy: Option<f32>,
    ) -> Uuid {
        let id = Uuid::from_u128(self.rng.gen());
        self.spawn_agent_with_id(id, position, state, empathy);
        id
    }

    /// Adds an agent under `id`. Agents spawned without an empathy level
    /// carry no [`EmpathyProfile`] and never catch emotions.
    pub fn spawn_agent_with_id(
        &mut self,
        id: Uuid,
        position: Position,
        state: EmotionalState,
        empathy: Option<f32>,
    ) -> hecs::Entity {
        let handle = match empathy {
            Some(level) => self.ecs.spawn((
                Identity { id },
                position,
                state,
                EmpathyProfile::new(level),
            )),
            None => self.ecs.spawn((Identity { id }, position, state)),
        };
        if let Some(old) = self.index.insert(id, handle) {
            tracing::warn!(%id, "duplicate agent id, previous entity despawned");
            let _ = self.ecs.despawn(old);
        }
        handle
    }

    pub fn despawn_agent(&mut self, id: Uuid) -> bool {
        match self.index.remove(&id) {
            Some(handle) => self.ecs.despawn(handle).is_ok(),
            None => false,
        }
    }

    pub fn handle(&self, id: Uuid) -> Option<hecs::Entity> {
        self.index.get(&id).copied()
    }

    pub fn set_position(&mut self, id: Uuid, position: Position) -> bool {
        self.handle(id)
            .and_then(|h| self.ecs.get::<&mut Position>(h).ok())
            .map(|mut p| *p = position)
            .is_some()
    }

    /// Advances simulation time by `dt` seconds. Returns pipeline statistics
    /// when the contagion throttle let this step through.
    pub fn update(&mut self, dt: f64) -> Option<ContagionStats> {
        self.step += 1;
        self.contagion.update(&mut self.ecs, dt)
    }

    pub fn time(&self) -> f64 {
        self.contagion.clock()
    }

    pub fn population(&self) -> usize {
        self.index.len()
    }

    pub fn agent(&self, id: Uuid) -> Option<AgentView> {
        let handle = self.handle(id)?;
        let entity = self.ecs.entity(handle).ok()?;
        Some(AgentView {
            id,
            position: *entity.get::<&Position>()?,
            state: *entity.get::<&EmotionalState>()?,
            empathy: entity.get::<&EmpathyProfile>().map(|e| *e),
        })
    }

    /// Every agent, ordered by id.
    pub fn agents(&self) -> Vec<AgentView> {
        let mut ids: Vec<Uuid> = self.index.keys().copied().collect();
        ids.sort();
        ids.into_iter().filter_map(|id| self.agent(id)).collect()
    }

    /// Agents per emotion, neutral included.
    pub fn emotion_census(&self) -> BTreeMap<Emotion, usize> {
        let mut census = BTreeMap::new();
        let mut query = self.ecs.query::<&EmotionalState>();
        for (_, state) in query.iter() {
            *census.entry(state.emotion).or_insert(0) += 1;
        }
        census
    }
}
