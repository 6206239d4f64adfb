//! Per-agent random streams.
//!
//! Workers never share a generator. Each (tick, agent) pair derives its own
//! seed, so a tick's draws do not depend on scheduling or thread count.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

#[inline]
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Mixes the world seed, tick counter and agent id into one stream seed.
pub fn agent_seed(world_seed: u64, tick: u64, agent: &Uuid) -> u64 {
    let bits = agent.as_u128();
    let mut state = world_seed ^ 0x5EED;
    let mut h = splitmix64(&mut state);
    for word in [tick, (bits >> 64) as u64, bits as u64] {
        state = h ^ word;
        h = splitmix64(&mut state);
    }
    h
}

pub fn agent_rng(world_seed: u64, tick: u64, agent: &Uuid) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(agent_seed(world_seed, tick, agent))
}
