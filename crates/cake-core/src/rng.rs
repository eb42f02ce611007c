//! Seeded per-agent randomness for sample requests.

use std::hash::Hasher;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use siphasher::sip::SipHasher13;

/// Random stream owned by one sampled agent.
///
/// Each agent draws from its own `StdRng`, seeded with SipHash-1-3 (zero keys)
/// of `(seed, agent)`. Adding or removing agents therefore never shifts the
/// draws of the others.
#[derive(Debug, Clone)]
pub struct AgentRng {
    rng: StdRng,
}

impl AgentRng {
    /// Stream of `agent` under the request seed `seed`.
    pub fn for_agent(seed: u64, agent: usize) -> Self {
        Self {
            rng: StdRng::seed_from_u64(agent_seed(seed, agent)),
        }
    }

    /// Density drawn uniformly from `[0, upper)`.
    pub fn density(&mut self, upper: f64) -> f64 {
        if upper > 0.0 {
            self.rng.gen_range(0.0..upper)
        } else {
            0.0
        }
    }
}

/// Seed of `agent`'s stream under `seed`.
pub fn agent_seed(seed: u64, agent: usize) -> u64 {
    let mut hasher = SipHasher13::new_with_keys(0, 0);
    hasher.write_u64(seed);
    hasher.write_u64(agent as u64);
    hasher.finish()
}
