//! Per-channel spring state

use crate::config::SpringConfig;

/// One independently animated scalar.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Channel {
    current: f32,
    target: f32,
    velocity: f32,
}

impl Channel {
    /// A channel at rest on `initial`.
    pub fn at_rest(initial: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            velocity: 0.0,
        }
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub(crate) fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    pub(crate) fn snap_to(&mut self, value: f32) {
        *self = Self::at_rest(value);
    }

    pub(crate) fn add_velocity(&mut self, impulse: f32) {
        self.velocity += impulse;
    }

    /// Advance by `h` reference steps with semi-implicit Euler.
    ///
    /// With `h == 1.0` this is the plain per-frame update: velocity first,
    /// then position from the new velocity. Reads only this channel's state.
    pub fn integrate(&self, config: &SpringConfig, h: f32) -> Self {
        let displacement = self.current - self.target;
        let spring_force = -config.stiffness * displacement;
        let damping_force = -config.damping * self.velocity;
        let acceleration = (spring_force + damping_force) / config.mass;

        let velocity = self.velocity + acceleration * h;
        Self {
            current: self.current + velocity * h,
            target: self.target,
            velocity,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.current.is_finite() && self.velocity.is_finite()
    }

    /// Close enough to the target, and slow enough, to stop animating.
    pub fn is_settled(&self, config: &SpringConfig) -> bool {
        (self.current - self.target).abs() < config.rest_displacement
            && self.velocity.abs() < config.rest_velocity
    }
}

impl Default for Channel {
    fn default() -> Self {
        Self::at_rest(0.0)
    }
}
