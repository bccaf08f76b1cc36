use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, LayoutResult};

/// Tunables for the layout simulation.
///
/// Defaults reproduce the visually-tuned behaviour of the character graph
/// view; every field can be overridden from a JSON config file.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Link length at which the spring force vanishes.
    pub link_distance: f32,
    /// Base spring strength before link weight scaling.
    pub link_strength: f32,
    /// Per-unit-weight boost of link strength.
    pub link_weight_factor: f32,
    /// Base repulsive charge magnitude.
    pub charge_strength: f32,
    /// Per-unit-weight boost of node charge.
    pub charge_weight_factor: f32,
    /// Pull toward the viewport center, proportional to displacement.
    pub center_strength: f32,
    /// Velocity multiplier applied once per tick before integration.
    pub velocity_decay: f32,
    /// Longest distance a free node may travel in one tick.
    pub max_step: f32,
    /// Floor for alpha; ticking stops once alpha reaches it.
    pub alpha_min: f32,
    /// Value alpha cools toward.
    pub alpha_target: f32,
    /// Number of ticks for alpha to cool from 1 to `alpha_min`.
    pub cooling_ticks: u32,
    /// Cadence of the background tick loop.
    pub tick_interval_ms: u64,
    /// Clamp for link distance in the spring force.
    pub min_link_distance: f32,
    /// Clamp for pair distance in the charge force.
    pub min_charge_distance: f32,
    /// Keep damped velocity across ticks instead of zeroing it after
    /// integration.
    pub carry_velocity: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            link_distance: 100.0,
            link_strength: 0.7,
            link_weight_factor: 0.1,
            charge_strength: 500.0,
            charge_weight_factor: 0.01,
            center_strength: 0.1,
            velocity_decay: 0.9,
            max_step: 50.0,
            alpha_min: 0.001,
            alpha_target: 0.0,
            cooling_ticks: 300,
            tick_interval_ms: 16,
            min_link_distance: 0.1,
            min_charge_distance: 1.0,
            carry_velocity: false,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> LayoutResult<()> {
        let non_negative = [
            ("link_distance", self.link_distance),
            ("link_strength", self.link_strength),
            ("link_weight_factor", self.link_weight_factor),
            ("charge_strength", self.charge_strength),
            ("charge_weight_factor", self.charge_weight_factor),
            ("center_strength", self.center_strength),
            ("alpha_target", self.alpha_target),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(LayoutError::Config(format!(
                    "{name} must be a finite value >= 0, got {value}"
                )));
            }
        }

        let positive = [
            ("min_link_distance", self.min_link_distance),
            ("min_charge_distance", self.min_charge_distance),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(LayoutError::Config(format!(
                    "{name} must be a finite value > 0, got {value}"
                )));
            }
        }

        if self.max_step.is_nan() || self.max_step <= 0.0 {
            return Err(LayoutError::Config(format!(
                "max_step must be > 0, got {}",
                self.max_step
            )));
        }
        if !(0.0..=1.0).contains(&self.velocity_decay) {
            return Err(LayoutError::Config(format!(
                "velocity_decay must be in [0, 1], got {}",
                self.velocity_decay
            )));
        }
        if !(self.alpha_min > 0.0 && self.alpha_min < 1.0) {
            return Err(LayoutError::Config(format!(
                "alpha_min must be in (0, 1), got {}",
                self.alpha_min
            )));
        }
        if self.alpha_target >= self.alpha_min {
            return Err(LayoutError::Config(format!(
                "alpha_target must be below alpha_min ({}), got {}",
                self.alpha_min, self.alpha_target
            )));
        }
        if self.cooling_ticks == 0 {
            return Err(LayoutError::Config(
                "cooling_ticks must be at least 1".to_owned(),
            ));
        }
        if self.tick_interval_ms == 0 {
            return Err(LayoutError::Config(
                "tick_interval_ms must be at least 1".to_owned(),
            ));
        }

        Ok(())
    }

    /// Per-tick cooling rate, calibrated so alpha falls from 1 to
    /// `alpha_min` over `cooling_ticks` ticks.
    pub fn alpha_decay(&self) -> f32 {
        1.0 - self.alpha_min.powf(1.0 / self.cooling_ticks as f32)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}
