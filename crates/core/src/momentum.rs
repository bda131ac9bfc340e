//! Post-release glide.
//!
//! Fixed-step exponential decay: each tick multiplies the velocity by the
//! decay factor and moves the offset by one nominal frame's worth of it,
//! independent of how much real time passed between ticks.

use crate::config::EngineConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Momentum {
    velocity: f64,
    decay: f64,
    floor: f64,
    frame_ms: f64,
    ticks: usize,
}

impl Momentum {
    pub fn launch(velocity: f64, config: &EngineConfig) -> Self {
        Self {
            velocity,
            decay: config.decay,
            floor: config.velocity_floor,
            frame_ms: config.frame_ms,
            ticks: 0,
        }
    }

    /// Advance one tick. Returns the offset displacement while still moving,
    /// `None` once the velocity has decayed to the floor.
    pub fn step(&mut self) -> Option<f64> {
        self.velocity *= self.decay;
        if self.velocity.abs() > self.floor {
            self.ticks += 1;
            Some(-self.velocity * self.frame_ms)
        } else {
            None
        }
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Ticks that have moved the offset so far.
    pub fn ticks(&self) -> usize {
        self.ticks
    }
}

/// Upper bound on the moving ticks a glide from `velocity` can take:
/// `ceil(log(floor / |v0|) / log(decay))`.
pub fn max_ticks(velocity: f64, decay: f64, floor: f64) -> usize {
    let speed = velocity.abs();
    if speed <= floor || !speed.is_finite() {
        return 0;
    }
    ((floor / speed).ln() / decay.ln()).ceil() as usize
}
