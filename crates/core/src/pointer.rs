//! Single-pointer drag tracking.
//!
//! A [`DragSession`] lives from pointer-down to pointer-up/leave. It turns
//! pointer travel into a scroll offset (amplified by the drag gain) and keeps
//! a running velocity estimate for the release hand-off.

/// What to do once the pointer lets go.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Release {
    /// Fast enough to glide: start momentum with this velocity.
    Fling(f64),
    /// Align to the nearest item right away.
    Settle,
}

impl Release {
    pub fn classify(velocity: f64, launch_velocity: f64) -> Self {
        if velocity.abs() > launch_velocity {
            Self::Fling(velocity)
        } else {
            Self::Settle
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    anchor_x: f64,
    anchor_offset: f64,
    last_x: f64,
    last_time_ms: f64,
    velocity: f64,
}

impl DragSession {
    /// Begin a drag at pointer `x` while the track sits at `offset`.
    pub fn start(x: f64, time_ms: f64, offset: f64) -> Self {
        Self {
            anchor_x: x,
            anchor_offset: offset,
            last_x: x,
            last_time_ms: time_ms,
            velocity: 0.0,
        }
    }

    /// Offset for a pointer at `x`. Dragging right moves the track toward
    /// lower offsets.
    pub fn offset_for(&self, x: f64, gain: f64) -> f64 {
        self.anchor_offset - (x - self.anchor_x) * gain
    }

    /// Record a pointer sample and update the velocity estimate
    /// (units per millisecond, positive when moving right).
    pub fn sample(&mut self, x: f64, time_ms: f64, min_interval_ms: f64) {
        let dt = (time_ms - self.last_time_ms).max(min_interval_ms);
        self.velocity = (x - self.last_x) / dt;
        self.last_x = x;
        self.last_time_ms = time_ms;
    }

    /// Shift the anchor after the offset was rewritten underneath the drag,
    /// so the next move continues from the rewritten position.
    pub fn rebase(&mut self, shift: f64) {
        self.anchor_offset += shift;
    }

    pub fn anchor_offset(&self) -> f64 {
        self.anchor_offset
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_displacement_is_amplified() {
        let session = DragSession::start(100.0, 0.0, 400.0);
        assert_eq!(session.offset_for(100.0, 1.2), 400.0);
        assert!((session.offset_for(150.0, 1.2) - 340.0).abs() < 1e-9);
        assert!((session.offset_for(50.0, 1.2) - 460.0).abs() < 1e-9);
    }

    #[test]
    fn velocity_tracks_last_sample() {
        let mut session = DragSession::start(0.0, 1000.0, 400.0);
        session.sample(10.0, 1010.0, 1.0);
        assert!((session.velocity() - 1.0).abs() < 1e-9);
        session.sample(6.0, 1030.0, 1.0);
        assert!((session.velocity() + 0.2).abs() < 1e-9);
    }

    #[test]
    fn same_millisecond_samples_use_floor_interval() {
        let mut session = DragSession::start(0.0, 1000.0, 400.0);
        session.sample(3.0, 1000.0, 1.0);
        assert_eq!(session.velocity(), 3.0);
        assert!(session.velocity().is_finite());
    }

    #[test]
    fn rebase_shifts_anchor() {
        let mut session = DragSession::start(0.0, 0.0, 790.0);
        let before = session.offset_for(-10.0, 1.0);
        session.rebase(-400.0);
        assert_eq!(session.anchor_offset(), 390.0);
        assert_eq!(session.offset_for(-10.0, 1.0), before - 400.0);
    }

    #[test]
    fn release_threshold_is_exclusive() {
        assert_eq!(Release::classify(0.3, 0.3), Release::Settle);
        assert_eq!(Release::classify(-0.2, 0.3), Release::Settle);
        assert_eq!(Release::classify(0.31, 0.3), Release::Fling(0.31));
        assert_eq!(Release::classify(-1.5, 0.3), Release::Fling(-1.5));
    }
}
