//! Headless episode driver.
//!
//! Runs the per-tick cycle against a [`SimulationWorld`]: physics step, reward,
//! then every `decision_period` ticks an observation and an action.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rapier3d::na::Vector3;
use rayon::prelude::*;
use tracing::{info, warn};

use crate::agent::WalkerAgent;
use crate::body_part::BodyPartName;
use crate::config::WalkerConfig;
use crate::controller::JointDriveController;
use crate::error::Result;
use crate::orientation::OrientationCube;
use crate::rl_interface::ACTION_SIZE;
use crate::world::SimulationWorld;

/// Maps an observation vector to an action vector.
pub trait Policy {
    /// `reward` is what the agent earned since the previous decision.
    fn act(&mut self, observation: &[f32], reward: f32) -> Vec<f32>;
}

/// Uniform random actions in [-1, 1].
#[derive(Debug, Clone)]
pub struct RandomPolicy {
    rng: SmallRng,
}

impl RandomPolicy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Policy for RandomPolicy {
    fn act(&mut self, _observation: &[f32], _reward: f32) -> Vec<f32> {
        (0..ACTION_SIZE).map(|_| self.rng.gen_range(-1.0..=1.0)).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeSummary {
    pub seed: u64,
    pub steps: usize,
    pub decisions: usize,
    pub cumulative_reward: f32,
    pub touched_target: bool,
    pub hips_position: Vector3<f32>,
}

fn reached_target(world: &SimulationWorld, target: &Vector3<f32>, radius: f32) -> Result<bool> {
    for part in world.body_parts() {
        if (world.body_state(*part)?.position - target).norm() <= radius {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Run one episode. The episode ends at `max_steps`, when the target is
/// reached, or with an error when the physics diverges.
pub fn run_episode<P: Policy>(config: &WalkerConfig, seed: u64, policy: &mut P) -> Result<EpisodeSummary> {
    let mut world = SimulationWorld::new(config.joint_drive);
    let mut agent = WalkerAgent::new(seed).with_maximum_walking_speed(config.maximum_walking_speed);
    let params = &config.reset_parameters;
    let target = Vector3::from(config.walk_target);

    agent.initialize(&mut world, params)?;
    agent.on_episode_begin(&mut world, params)?;

    let mut cube = OrientationCube::default();
    let hips = world.body_state(BodyPartName::Hips)?.position;
    cube.update_orientation(hips, target);

    let decision_period = config.decision_period.max(1);
    let mut decisions = 0;
    let mut touched_target = false;
    let mut steps = 0;

    while steps < config.max_steps {
        world.step();
        steps += 1;

        let hips = world.body_state(BodyPartName::Hips)?.position;
        cube.update_orientation(hips, target);

        if let Err(err) = agent.fixed_update(&world, &cube) {
            warn!(seed, steps, %err, "episode aborted");
            return Err(err);
        }

        if reached_target(&world, &target, config.target_radius)? {
            agent.touched_target();
            touched_target = true;
            break;
        }

        if steps % decision_period == 0 {
            let observation = agent.collect_observations(&world, &cube)?.to_vec();
            let actions = policy.act(&observation, agent.take_reward());
            agent.on_action_received_flat(&mut world, &actions)?;
            decisions += 1;
        }
    }

    let summary = EpisodeSummary {
        seed,
        steps,
        decisions,
        cumulative_reward: agent.cumulative_reward(),
        touched_target,
        hips_position: world.body_state(BodyPartName::Hips)?.position,
    };
    info!(
        seed,
        steps,
        reward = summary.cumulative_reward,
        touched_target,
        "episode finished"
    );
    Ok(summary)
}

/// Run independent random-policy episodes in parallel, one per seed.
pub fn run_random_episodes(config: &WalkerConfig, seeds: &[u64]) -> Vec<Result<EpisodeSummary>> {
    seeds
        .par_iter()
        .map(|&seed| {
            let mut policy = RandomPolicy::new(seed.wrapping_add(1));
            run_episode(config, seed, &mut policy)
        })
        .collect()
}
