//! The spring settler
//!
//! Owns a keyed set of channels and advances all of them each tick. The
//! settler has no clock of its own; the caller decides when to tick.

use std::fmt::Debug;
use std::hash::Hash;

use indexmap::IndexMap;

use crate::channel::Channel;
use crate::config::SpringConfig;
use crate::error::{ensure_finite, ensure_positive, SettleError};

/// Reference frame rate the default constants are tuned against.
pub const DEFAULT_FRAME_RATE: f32 = 60.0;

/// Upper bound on integration sub-steps in a single [`SpringSettler::tick`].
pub const MAX_SUBSTEPS: u32 = 240;

const STEP_EPSILON: f32 = 1e-4;

/// Channel counts after a tick
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub active: usize,
    pub settled: usize,
}

/// Drives a set of keyed channels toward their targets.
///
/// Every channel integrates independently against the shared
/// [`SpringConfig`]; adding, removing, or retargeting one channel never
/// changes another's trajectory. Mutation requires `&mut self`, so a settler
/// shared across threads needs external locking.
#[derive(Clone, Debug)]
pub struct SpringSettler<K> {
    channels: IndexMap<K, Channel>,
    config: SpringConfig,
    frame_rate: f32,
    staging: Vec<Channel>,
}

impl<K> SpringSettler<K>
where
    K: Hash + Eq + Debug,
{
    pub fn new() -> Self {
        Self::from_valid_config(SpringConfig::default())
    }

    /// Create a settler with `config`, validated the same way as
    /// [`SpringSettler::configure_with`].
    pub fn with_config(config: SpringConfig) -> Result<Self, SettleError> {
        config.validate()?;
        warn_if_unstable(&config);
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: SpringConfig) -> Self {
        Self {
            channels: IndexMap::new(),
            config,
            frame_rate: DEFAULT_FRAME_RATE,
            staging: Vec::new(),
        }
    }

    /// Set the reference frame rate used to convert `tick(dt)` seconds into steps.
    pub fn frame_rate(mut self, hz: f32) -> Result<Self, SettleError> {
        self.frame_rate = ensure_positive("frame_rate", hz)?;
        Ok(self)
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    /// Replace the shared constants, keeping the current rest thresholds.
    ///
    /// Any strictly positive finite triple is accepted, including ones that
    /// fail [`SpringConfig::is_stable`]. On error nothing changes.
    pub fn configure(&mut self, stiffness: f32, damping: f32, mass: f32) -> Result<(), SettleError> {
        let config = SpringConfig {
            stiffness,
            damping,
            mass,
            ..self.config
        };
        self.configure_with(config)
    }

    /// Replace the whole config, rest thresholds included.
    pub fn configure_with(&mut self, config: SpringConfig) -> Result<(), SettleError> {
        if let Err(err) = config.validate() {
            tracing::debug!("Rejected spring config {:?}: {}", config, err);
            return Err(err);
        }
        warn_if_unstable(&config);
        tracing::debug!(
            stiffness = config.stiffness,
            damping = config.damping,
            mass = config.mass,
            damping_ratio = config.damping_ratio(),
            "Spring config updated"
        );
        self.config = config;
        Ok(())
    }

    pub fn config(&self) -> &SpringConfig {
        &self.config
    }

    pub fn reference_frame_rate(&self) -> f32 {
        self.frame_rate
    }

    // ========================================================================
    // Channel set
    // ========================================================================

    /// Register `key` at rest on `initial`.
    ///
    /// Re-registering an existing key replaces it with a fresh channel, which
    /// discards its velocity and target. Returns `true` when that happened.
    pub fn register_channel(&mut self, key: K, initial: f32) -> Result<bool, SettleError> {
        let initial = ensure_finite("initial", initial)?;
        let replaced = self.channels.insert(key, Channel::at_rest(initial));
        if let Some(previous) = replaced {
            tracing::debug!(
                "Channel re-registered at {}, discarding {:?}",
                initial,
                previous
            );
        }
        Ok(replaced.is_some())
    }

    /// Register `key` at rest on zero.
    pub fn register(&mut self, key: K) -> bool {
        self.channels.insert(key, Channel::default()).is_some()
    }

    /// Remove `key`, returning its last state. Absent keys are a no-op.
    pub fn remove_channel(&mut self, key: &K) -> Option<Channel> {
        self.channels.swap_remove(key)
    }

    pub fn clear(&mut self) {
        self.channels.clear();
    }

    pub fn contains(&self, key: &K) -> bool {
        self.channels.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    // ========================================================================
    // Driving channels
    // ========================================================================

    /// Point `key` at a new target. Position and velocity are untouched
    /// until the next tick.
    pub fn set_target(&mut self, key: &K, value: f32) -> Result<(), SettleError> {
        let value = ensure_finite("target", value)?;
        self.channel_mut(key)?.set_target(value);
        Ok(())
    }

    /// Jump `key` to `value` and stop it there.
    pub fn snap_to(&mut self, key: &K, value: f32) -> Result<(), SettleError> {
        let value = ensure_finite("value", value)?;
        self.channel_mut(key)?.snap_to(value);
        Ok(())
    }

    /// Add `impulse` to the velocity of `key`, e.g. a released fling.
    pub fn nudge(&mut self, key: &K, impulse: f32) -> Result<(), SettleError> {
        let impulse = ensure_finite("impulse", impulse)?;
        let channel = self.channel_mut(key)?;
        ensure_finite("impulse", channel.velocity() + impulse)?;
        channel.add_velocity(impulse);
        Ok(())
    }

    fn channel_mut(&mut self, key: &K) -> Result<&mut Channel, SettleError> {
        self.channels
            .get_mut(key)
            .ok_or_else(|| SettleError::unknown(key))
    }

    // ========================================================================
    // Ticking
    // ========================================================================

    /// Advance every channel by exactly one reference step.
    pub fn step(&mut self) -> Result<TickReport, SettleError> {
        self.advance(1, 1.0)
    }

    /// Advance every channel by `dt` seconds.
    ///
    /// `dt` is converted to reference steps with the frame rate. Anything
    /// longer than one step is split into equal sub-steps of at most one
    /// step each, so a dropped frame does not push the integrator outside
    /// its stable range. At exactly the reference rate this equals
    /// [`SpringSettler::step`].
    pub fn tick(&mut self, dt: f32) -> Result<TickReport, SettleError> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(SettleError::invalid(
                "dt",
                dt,
                "must be a non-negative finite number of seconds",
            ));
        }
        if dt == 0.0 {
            return Ok(self.report());
        }

        let mut scale = dt * self.frame_rate;
        // Rounding noise must not turn one reference step into two
        let mut substeps = (scale - STEP_EPSILON).ceil().max(1.0) as u32;
        if substeps > MAX_SUBSTEPS {
            tracing::warn!(
                "Tick of {:.3}s spans {} steps, clamping to {}",
                dt,
                substeps,
                MAX_SUBSTEPS
            );
            substeps = MAX_SUBSTEPS;
            scale = MAX_SUBSTEPS as f32;
        }
        self.advance(substeps, scale / substeps as f32)
    }

    /// Integrate all channels into the staging buffer, then commit only if
    /// every result is finite.
    fn advance(&mut self, substeps: u32, h: f32) -> Result<TickReport, SettleError> {
        let config = self.config;

        self.staging.clear();
        self.staging.extend(self.channels.values().map(|channel| {
            let mut next = *channel;
            for _ in 0..substeps {
                next = next.integrate(&config, h);
            }
            next
        }));

        if let Some((index, bad)) = self
            .staging
            .iter()
            .enumerate()
            .find(|(_, channel)| !channel.is_finite())
        {
            let key = self.channels.get_index(index).map(|(key, _)| key);
            tracing::warn!("Tick rejected: channel {:?} would become {:?}", key, bad);
            let (name, value) = if bad.current().is_finite() {
                ("velocity", bad.velocity())
            } else {
                ("current", bad.current())
            };
            return Err(SettleError::invalid(
                name,
                value,
                "tick would leave a channel non-finite",
            ));
        }

        for (channel, next) in self.channels.values_mut().zip(self.staging.drain(..)) {
            *channel = next;
        }

        let report = self.report();
        tracing::trace!(
            active = report.active,
            settled = report.settled,
            substeps,
            "Tick complete"
        );
        Ok(report)
    }

    fn report(&self) -> TickReport {
        let settled = self
            .channels
            .values()
            .filter(|channel| channel.is_settled(&self.config))
            .count();
        TickReport {
            active: self.channels.len() - settled,
            settled,
        }
    }

    // ========================================================================
    // Reading values
    // ========================================================================

    /// Current value of `key`.
    pub fn value_of(&self, key: &K) -> Result<f32, SettleError> {
        self.channel_ref(key).map(Channel::current)
    }

    pub fn velocity_of(&self, key: &K) -> Result<f32, SettleError> {
        self.channel_ref(key).map(Channel::velocity)
    }

    pub fn target_of(&self, key: &K) -> Result<f32, SettleError> {
        self.channel_ref(key).map(Channel::target)
    }

    pub fn channel(&self, key: &K) -> Option<&Channel> {
        self.channels.get(key)
    }

    fn channel_ref(&self, key: &K) -> Result<&Channel, SettleError> {
        self.channels.get(key).ok_or_else(|| SettleError::unknown(key))
    }

    pub fn is_settled(&self, key: &K) -> Result<bool, SettleError> {
        self.channel_ref(key)
            .map(|channel| channel.is_settled(&self.config))
    }

    /// Check if any channel is still moving
    pub fn has_active_channels(&self) -> bool {
        self.channels
            .values()
            .any(|channel| !channel.is_settled(&self.config))
    }

    /// Iterate `(key, current value)` in channel order
    pub fn values(&self) -> impl Iterator<Item = (&K, f32)> {
        self.channels
            .iter()
            .map(|(key, channel)| (key, channel.current()))
    }

    /// Iterate over all channels
    pub fn channels(&self) -> impl Iterator<Item = (&K, &Channel)> {
        self.channels.iter()
    }
}

fn warn_if_unstable(config: &SpringConfig) {
    if !config.is_stable() {
        tracing::warn!(
            "Spring config {:?} amplifies every step; ticks will diverge",
            config
        );
    }
}

impl<K> Default for SpringSettler<K>
where
    K: Hash + Eq + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}
