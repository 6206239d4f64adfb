//! Emotional contagion between nearby agents.
//!
//! One pipeline run:
//! 1. snapshot every agent (sorted by id) and rebuild the spatial hash in parallel;
//! 2. scan each non-neutral source's 3x3 neighborhood in parallel, rolling
//!    against a per-(tick, source) stream and emitting [`ContagionProposal`]s;
//! 3. keep the strongest proposal per target and apply it;
//! 4. decay every agent's intensity by the elapsed time.
//!
//! The scan never writes to an agent. All mutation happens in steps 3 and 4
//! after the parallel phases have joined.

use crate::config::{ConfigError, ContagionConfig};
use crate::emotion::resolve_blend;
use crate::metrics::Metrics;
use crate::rng::agent_rng;
use crate::spatial_hash::SpatialHash;
use crate::throttle::Throttle;
use kinship_data::{ContagionStats, Emotion, EmotionalState, EmpathyProfile, Identity, Position};
use rand::Rng;
use rayon::prelude::*;
use std::time::Instant;
use uuid::Uuid;

/// Read-only copy of an agent taken before the scan.
#[derive(Debug, Clone)]
pub struct AgentSnapshot {
    pub handle: hecs::Entity,
    pub id: Uuid,
    pub state: EmotionalState,
    /// `None` when the agent has no empathy profile; such agents can spread
    /// emotions but never catch them.
    pub empathy: Option<f32>,
}

/// Deferred change to one target's emotional state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContagionProposal {
    /// Snapshot slot of the target.
    pub target: u32,
    pub source: Uuid,
    pub emotion: Emotion,
    pub intensity: f32,
    pub strength: f32,
}

pub struct ScanContext<'a> {
    pub config: &'a ContagionConfig,
    pub grid: &'a SpatialHash,
    pub snapshots: &'a [AgentSnapshot],
    pub positions: &'a [Position],
    pub tick: u64,
}

#[derive(Debug, Default)]
pub struct SourceScan {
    pub candidates: usize,
    pub rolls_won: usize,
    pub proposals: Vec<ContagionProposal>,
}

/// `source_intensity * target_empathy * (1 - distance / radius)`.
#[inline]
pub fn influence_strength(
    source_intensity: f32,
    target_empathy: f32,
    distance: f64,
    radius: f64,
) -> f32 {
    let distance_factor = (1.0 - distance / radius).clamp(0.0, 1.0) as f32;
    source_intensity.clamp(0.0, 1.0) * target_empathy.clamp(0.0, 1.0) * distance_factor
}

/// What `target` turns into when reached by `incoming` at `strength`.
///
/// - above `overwrite_threshold` the incoming emotion replaces the current one;
/// - from `blend_threshold` up to `overwrite_threshold` the blend table decides;
/// - below `blend_threshold` nothing happens.
pub fn blend_outcome(
    target: &EmotionalState,
    incoming: Emotion,
    strength: f32,
    config: &ContagionConfig,
) -> Option<(Emotion, f32)> {
    let current = if target.emotion.is_neutral() {
        0.0
    } else {
        target.intensity.clamp(0.0, 1.0)
    };

    let (emotion, intensity) = if strength > config.overwrite_threshold {
        (incoming, strength)
    } else if strength >= config.blend_threshold {
        let emotion = resolve_blend(target.emotion, incoming, config.blend_fallback)?;
        let intensity = if emotion == target.emotion {
            current.max(strength)
        } else {
            (current + strength) / 2.0
        };
        (emotion, intensity)
    } else {
        return None;
    };

    let intensity = intensity.clamp(0.0, 1.0);
    if emotion.is_neutral() || intensity <= 0.0 {
        return None;
    }
    Some((emotion, intensity))
}

/// Scans the neighborhood of the agent in `slot` and collects its proposals.
pub fn scan_source(slot: usize, ctx: &ScanContext) -> SourceScan {
    let mut scan = SourceScan::default();
    let (Some(source), Some(origin)) = (ctx.snapshots.get(slot), ctx.positions.get(slot)) else {
        return scan;
    };
    if source.state.emotion.is_neutral() {
        return scan;
    }

    let config = ctx.config;
    let mut rng = agent_rng(config.seed, ctx.tick, &source.id);

    ctx.grid.for_each_candidate(
        slot as u32,
        origin,
        ctx.positions,
        config.radius_sq(),
        config.distance_metric,
        |other, d2| {
            scan.candidates += 1;
            let Some(target) = ctx.snapshots.get(other as usize) else {
                return;
            };
            let Some(empathy) = target.empathy else {
                return;
            };

            let strength = influence_strength(
                source.state.intensity,
                empathy,
                d2.sqrt(),
                config.contagion_radius,
            );
            let probability = strength * config.base_chance;
            let roll: f32 = rng.gen();
            if roll > probability {
                return;
            }
            scan.rolls_won += 1;

            if let Some((emotion, intensity)) =
                blend_outcome(&target.state, source.state.emotion, strength, config)
            {
                scan.proposals.push(ContagionProposal {
                    target: other,
                    source: source.id,
                    emotion,
                    intensity,
                    strength,
                });
            }
        },
    );
    scan
}

/// Keeps one proposal per target: the strongest, ties going to the lowest
/// source id. Output is sorted by target slot.
pub fn reduce_proposals(mut proposals: Vec<ContagionProposal>) -> Vec<ContagionProposal> {
    proposals.sort_unstable_by(|a, b| {
        a.target
            .cmp(&b.target)
            .then_with(|| b.strength.total_cmp(&a.strength))
            .then_with(|| a.source.cmp(&b.source))
    });
    proposals.dedup_by_key(|p| p.target);
    proposals
}

pub fn apply_proposal(
    state: &mut EmotionalState,
    empathy: &mut EmpathyProfile,
    proposal: &ContagionProposal,
    now: f64,
    empathy_growth: f32,
) {
    state.emotion = proposal.emotion;
    state.started_at = now;
    state.intensity = proposal.intensity.clamp(0.0, 1.0);
    state.source = Some(proposal.source);

    empathy.contagion_events = empathy.contagion_events.saturating_add(1);
    empathy.last_contagion_at = Some(now);
    empathy.level = (empathy.level + empathy_growth).clamp(0.0, 1.0);
}

/// Linear decay over `elapsed` seconds. Returns true when the state collapsed
/// to neutral during this call.
pub fn decay_state(
    state: &mut EmotionalState,
    decay_rate: f32,
    elapsed: f64,
    neutral_threshold: f32,
) -> bool {
    if state.emotion.is_neutral() {
        state.intensity = 0.0;
        return false;
    }

    let loss = (f64::from(decay_rate) * elapsed.max(0.0)) as f32;
    let intensity = (state.intensity - loss).min(1.0);
    if intensity.is_nan() || intensity < neutral_threshold || intensity <= 0.0 {
        state.reset();
        true
    } else {
        state.intensity = intensity;
        false
    }
}

/// Throttled driver for the contagion pipeline.
pub struct ContagionSystem {
    config: ContagionConfig,
    grid: SpatialHash,
    throttle: Throttle,
    metrics: Metrics,
    tick: u64,
    clock: f64,
    snapshots: Vec<AgentSnapshot>,
    positions: Vec<Position>,
}

impl ContagionSystem {
    pub fn new(config: ContagionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            grid: SpatialHash::new(config.cell_size, config.grid_width, config.grid_height),
            throttle: Throttle::new(config.update_interval),
            metrics: Metrics::new(),
            tick: 0,
            clock: 0.0,
            snapshots: Vec::new(),
            positions: Vec::new(),
            config,
        })
    }

    pub fn config(&self) -> &ContagionConfig {
        &self.config
    }

    /// Completed pipeline runs; also the tick number fed to the seeding.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Simulation time accumulated through [`ContagionSystem::update`].
    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn grid(&self) -> &SpatialHash {
        &self.grid
    }

    /// Advances simulation time by `dt` and runs the pipeline if the update
    /// interval has elapsed. Returns `None` for throttled ticks.
    pub fn update(&mut self, ecs: &mut hecs::World, dt: f64) -> Option<ContagionStats> {
        if dt.is_finite() && dt > 0.0 {
            self.clock += dt;
        }
        match self.throttle.advance(dt) {
            Some(elapsed) => Some(self.run(ecs, elapsed)),
            None => {
                self.metrics.record_skip();
                None
            }
        }
    }

    /// Runs one full pipeline pass regardless of the throttle, decaying by
    /// `elapsed` seconds.
    pub fn run(&mut self, ecs: &mut hecs::World, elapsed: f64) -> ContagionStats {
        let started = Instant::now();
        self.tick += 1;
        let mut stats = ContagionStats::default();

        self.capture_snapshots(ecs);
        let rejected = self.grid.build_parallel(&self.positions);
        stats.agents = self.positions.len() - rejected;

        let scans: Vec<SourceScan> = {
            let ctx = ScanContext {
                config: &self.config,
                grid: &self.grid,
                snapshots: &self.snapshots,
                positions: &self.positions,
                tick: self.tick,
            };
            (0..self.snapshots.len())
                .into_par_iter()
                .map(|slot| scan_source(slot, &ctx))
                .collect()
        };

        let mut proposals = Vec::new();
        for scan in scans {
            stats.candidates += scan.candidates;
            stats.rolls_won += scan.rolls_won;
            proposals.extend(scan.proposals);
        }

        for proposal in reduce_proposals(proposals) {
            let handle = self.snapshots[proposal.target as usize].handle;
            if let Ok((state, empathy)) =
                ecs.query_one_mut::<(&mut EmotionalState, &mut EmpathyProfile)>(handle)
            {
                apply_proposal(
                    state,
                    empathy,
                    &proposal,
                    self.clock,
                    self.config.empathy_growth,
                );
                stats.applied += 1;
            }
        }

        stats.reset_to_neutral = decay_all(ecs, &self.config, elapsed);
        self.metrics.record_run(&stats, started.elapsed());
        stats
    }

    fn capture_snapshots(&mut self, ecs: &hecs::World) {
        let mut query = ecs.query::<(&Identity, &Position, &EmotionalState, Option<&EmpathyProfile>)>();
        let mut rows: Vec<(AgentSnapshot, Position)> = query
            .iter()
            .map(|(handle, (identity, pos, state, empathy))| {
                (
                    AgentSnapshot {
                        handle,
                        id: identity.id,
                        state: *state,
                        empathy: empathy.map(|e| e.level),
                    },
                    *pos,
                )
            })
            .collect();
        rows.sort_by_key(|(snapshot, _)| snapshot.id);

        self.snapshots.clear();
        self.positions.clear();
        for (snapshot, pos) in rows {
            self.snapshots.push(snapshot);
            self.positions.push(pos);
        }
    }
}

fn decay_all(ecs: &mut hecs::World, config: &ContagionConfig, elapsed: f64) -> usize {
    let mut states: Vec<&mut EmotionalState> = ecs
        .query_mut::<&mut EmotionalState>()
        .into_iter()
        .map(|(_, state)| state)
        .collect();
    states
        .par_iter_mut()
        .map(|state| decay_state(state, config.decay_rate, elapsed, config.neutral_threshold))
        .filter(|&reset| reset)
        .count()
}
