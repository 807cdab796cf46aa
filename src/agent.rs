use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rapier3d::na::{UnitQuaternion, Vector3};
use tracing::{debug, trace};

use crate::body_part::BodyPartName;
use crate::controller::JointDriveController;
use crate::error::Result;
use crate::orientation::OrientationReference;
use crate::reset_params::{ResetParameters, CHEST_MASS, DEFAULT_SEGMENT_MASS, HIP_MASS, SPINE_MASS};
use crate::reward::{self, RewardTerms, TOUCHED_TARGET_BONUS};
use crate::rl_interface::{WalkerAction, WalkerIO, WalkerObservation};

pub const DEFAULT_MAXIMUM_WALKING_SPEED: f32 = 999.0;

/// Adapter between a policy and the walker's joint-drive controller.
///
/// The controller, orientation reference and reset parameters are owned by
/// the host and passed into each hook.
#[derive(Debug, Clone)]
pub struct WalkerAgent {
    /// Largest hips speed the velocity alignment term accounts for
    pub maximum_walking_speed: f32,
    rng: SmallRng,
    reward: f32,
    cumulative_reward: f32,
}

impl WalkerAgent {
    pub fn new(seed: u64) -> Self {
        Self {
            maximum_walking_speed: DEFAULT_MAXIMUM_WALKING_SPEED,
            rng: SmallRng::seed_from_u64(seed),
            reward: 0.0,
            cumulative_reward: 0.0,
        }
    }

    pub fn with_maximum_walking_speed(mut self, speed: f32) -> Self {
        self.maximum_walking_speed = speed;
        self
    }

    /// Register every body part and apply the initial reset parameters.
    pub fn initialize<C, P>(&mut self, controller: &mut C, params: &P) -> Result<()>
    where
        C: JointDriveController + ?Sized,
        P: ResetParameters + ?Sized,
    {
        for part in BodyPartName::ALL {
            controller.setup_body_part(part)?;
        }
        self.set_reset_parameters(controller, params)
    }

    /// Reset every registered part, face a random heading and reapply the
    /// reset parameters.
    pub fn on_episode_begin<C, P>(&mut self, controller: &mut C, params: &P) -> Result<()>
    where
        C: JointDriveController + ?Sized,
        P: ResetParameters + ?Sized,
    {
        let parts = controller.body_parts().to_vec();
        for part in parts {
            controller.reset_body_part(part)?;
        }

        let yaw_degrees: f32 = self.rng.gen_range(0.0..360.0);
        controller.set_root_rotation(UnitQuaternion::from_axis_angle(
            &Vector3::y_axis(),
            yaw_degrees.to_radians(),
        ));
        debug!(yaw_degrees, "episode begin");

        self.reward = 0.0;
        self.cumulative_reward = 0.0;
        self.set_reset_parameters(controller, params)
    }

    pub fn collect_observations<C, R>(&self, controller: &C, reference: &R) -> Result<WalkerObservation>
    where
        C: JointDriveController + ?Sized,
        R: OrientationReference + ?Sized,
    {
        WalkerIO::sense(controller, reference)
    }

    pub fn on_action_received<C>(&mut self, controller: &mut C, action: &WalkerAction) -> Result<()>
    where
        C: JointDriveController + ?Sized,
    {
        WalkerIO::apply_action(action, controller)
    }

    /// Decode a flat action vector and apply it.
    pub fn on_action_received_flat<C>(&mut self, controller: &mut C, actions: &[f32]) -> Result<()>
    where
        C: JointDriveController + ?Sized,
    {
        let action = WalkerAction::from_flat(actions)?;
        self.on_action_received(controller, &action)
    }

    /// Per physics tick reward. Nothing is added when a term diverges.
    pub fn fixed_update<C, R>(&mut self, controller: &C, reference: &R) -> Result<RewardTerms>
    where
        C: JointDriveController + ?Sized,
        R: OrientationReference + ?Sized,
    {
        let terms = reward::evaluate(controller, reference, self.maximum_walking_speed)?;
        trace!(?terms, "tick reward");
        self.add_reward(terms.total());
        Ok(terms)
    }

    /// Bonus for reaching the walk target.
    pub fn touched_target(&mut self) {
        self.add_reward(TOUCHED_TARGET_BONUS);
    }

    pub fn add_reward(&mut self, increment: f32) {
        self.reward += increment;
        self.cumulative_reward += increment;
    }

    /// Reward accumulated since the last decision.
    pub fn reward(&self) -> f32 {
        self.reward
    }

    /// Return the reward accumulated since the last decision and start a new one.
    pub fn take_reward(&mut self) -> f32 {
        std::mem::take(&mut self.reward)
    }

    pub fn cumulative_reward(&self) -> f32 {
        self.cumulative_reward
    }

    pub fn set_torso_mass<C, P>(&self, controller: &mut C, params: &P) -> Result<()>
    where
        C: JointDriveController + ?Sized,
        P: ResetParameters + ?Sized,
    {
        controller.set_mass(
            BodyPartName::Chest,
            params.get_with_default(CHEST_MASS, DEFAULT_SEGMENT_MASS),
        )?;
        controller.set_mass(
            BodyPartName::Spine,
            params.get_with_default(SPINE_MASS, DEFAULT_SEGMENT_MASS),
        )?;
        controller.set_mass(
            BodyPartName::Hips,
            params.get_with_default(HIP_MASS, DEFAULT_SEGMENT_MASS),
        )
    }

    pub fn set_reset_parameters<C, P>(&self, controller: &mut C, params: &P) -> Result<()>
    where
        C: JointDriveController + ?Sized,
        P: ResetParameters + ?Sized,
    {
        self.set_torso_mass(controller, params)
    }
}
