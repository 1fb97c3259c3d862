//! Shared spring constants
//!
//! All constants are expressed in *reference steps*: one call to
//! [`SpringSettler::step`](crate::SpringSettler::step) advances time by
//! exactly one unit, and the constants are tuned against that unit rather
//! than against seconds.

use crate::error::{ensure_positive, SettleError};

/// Default rest threshold for both displacement and velocity.
pub const DEFAULT_REST_THRESHOLD: f32 = 0.01;

/// Physical constants shared by every channel of a settler.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringConfig {
    /// Spring constant. Higher snaps to the target faster.
    pub stiffness: f32,
    /// Velocity decay constant. Higher means less overshoot.
    pub damping: f32,
    /// Inertia divisor. Higher means a slower response.
    pub mass: f32,
    /// Displacement below which a channel may count as settled.
    pub rest_displacement: f32,
    /// Speed below which a channel may count as settled.
    pub rest_velocity: f32,
}

impl SpringConfig {
    /// Build and validate a config with the default rest thresholds.
    pub fn new(stiffness: f32, damping: f32, mass: f32) -> Result<Self, SettleError> {
        let config = Self {
            stiffness,
            damping,
            mass,
            rest_displacement: DEFAULT_REST_THRESHOLD,
            rest_velocity: DEFAULT_REST_THRESHOLD,
        };
        config.validate()?;
        Ok(config)
    }

    /// Scroll-following parallax layers: smooth, no visible overshoot
    pub const fn parallax() -> Self {
        Self::preset(0.08, 0.85, 1.0)
    }

    /// Slow drift toward the target
    pub const fn gentle() -> Self {
        Self::preset(0.04, 0.7, 1.0)
    }

    /// Quick, tight response
    pub const fn snappy() -> Self {
        Self::preset(0.2, 0.9, 1.0)
    }

    /// Under-damped: overshoots visibly, then settles
    pub const fn bouncy() -> Self {
        Self::preset(0.12, 0.25, 1.0)
    }

    const fn preset(stiffness: f32, damping: f32, mass: f32) -> Self {
        Self {
            stiffness,
            damping,
            mass,
            rest_displacement: DEFAULT_REST_THRESHOLD,
            rest_velocity: DEFAULT_REST_THRESHOLD,
        }
    }

    /// Replace the rest thresholds.
    pub fn with_rest_thresholds(mut self, displacement: f32, velocity: f32) -> Self {
        self.rest_displacement = displacement;
        self.rest_velocity = velocity;
        self
    }

    /// Check that every constant and threshold is strictly positive and finite.
    pub fn validate(&self) -> Result<(), SettleError> {
        ensure_positive("stiffness", self.stiffness)?;
        ensure_positive("damping", self.damping)?;
        ensure_positive("mass", self.mass)?;
        ensure_positive("rest_displacement", self.rest_displacement)?;
        ensure_positive("rest_velocity", self.rest_velocity)?;
        Ok(())
    }

    /// Whether one reference step decays instead of amplifying.
    ///
    /// The discrete update keeps its eigenvalues inside the unit circle only
    /// while `stiffness/mass + 2*damping/mass < 4`. Past that line values grow
    /// every step until a tick is rejected as non-finite. Low damping is fine:
    /// it oscillates but still decays.
    pub fn is_stable(&self) -> bool {
        let k = self.stiffness / self.mass;
        let c = self.damping / self.mass;
        k + 2.0 * c < 4.0
    }

    /// Continuous-time damping ratio, `c / (2 * sqrt(k * m))`.
    ///
    /// Informational only; the discrete step overshoots at somewhat higher
    /// ratios than the continuous spring would.
    pub fn damping_ratio(&self) -> f32 {
        self.damping / (2.0 * (self.stiffness * self.mass).sqrt())
    }
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::parallax()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        for config in [
            SpringConfig::parallax(),
            SpringConfig::gentle(),
            SpringConfig::snappy(),
            SpringConfig::bouncy(),
        ] {
            assert!(config.validate().is_ok(), "{config:?}");
            assert!(config.is_stable(), "{config:?}");
        }
    }

    #[test]
    fn rejects_non_positive_constants() {
        for (k, c, m, name) in [
            (0.0, 0.85, 1.0, "stiffness"),
            (0.08, -0.1, 1.0, "damping"),
            (0.08, 0.85, 0.0, "mass"),
            (f32::NAN, 0.85, 1.0, "stiffness"),
            (0.08, f32::INFINITY, 1.0, "damping"),
        ] {
            match SpringConfig::new(k, c, m) {
                Err(SettleError::InvalidParameter { name: got, .. }) => assert_eq!(got, name),
                other => panic!("expected InvalidParameter for {name}, got {other:?}"),
            }
        }
    }

    #[test]
    fn unstable_step_is_valid_but_flagged() {
        let config = SpringConfig::new(3.0, 0.6, 1.0).unwrap();
        assert!(!config.is_stable());
        // Same ratios become stable with enough mass
        assert!(SpringConfig::new(3.0, 0.6, 2.0).unwrap().is_stable());
    }

    #[test]
    fn rest_thresholds_are_validated() {
        let config = SpringConfig::parallax().with_rest_thresholds(0.0, 0.01);
        assert!(config.validate().is_err());
    }

    #[test]
    fn bouncy_is_the_least_damped_preset() {
        assert!(SpringConfig::bouncy().damping_ratio() < SpringConfig::parallax().damping_ratio());
    }
}
