//! Wrap correction.
//!
//! Once the offset leaves the band the originals can be reached from, it is
//! rewritten by exactly one segment. The copy being left and the copy being
//! entered draw the same items, so the rewrite is invisible.

/// A wrap rewrite from `from` to `to`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correction {
    pub from: f64,
    pub to: f64,
}

impl Correction {
    /// Signed change applied to the offset.
    pub fn shift(&self) -> f64 {
        self.to - self.from
    }
}

/// Where `offset` must be rewritten to, if anywhere. Zero segments
/// (measurement not ready) never wrap.
pub fn correct(offset: f64, segment: f64) -> Option<f64> {
    if !segment.is_finite() || segment <= 0.0 || !offset.is_finite() {
        return None;
    }
    if offset >= 2.0 * segment {
        Some(offset - segment)
    } else if offset <= 0.0 {
        Some(offset + segment)
    } else {
        None
    }
}

/// Re-entrancy guard held while a rewrite settles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdjustmentLock {
    held: bool,
}

impl AdjustmentLock {
    pub fn is_held(&self) -> bool {
        self.held
    }

    pub fn release(&mut self) {
        self.held = false;
    }
}

/// The wrap check plus its lock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WrapCorrector {
    lock: AdjustmentLock,
}

impl WrapCorrector {
    /// Check `offset` against a track `segment` wide. A rewrite takes the
    /// lock; while the lock is held every check is a no-op.
    pub fn check(&mut self, offset: f64, segment: f64) -> Option<Correction> {
        if self.lock.is_held() {
            return None;
        }
        let to = correct(offset, segment)?;
        self.lock.held = true;
        Some(Correction { from: offset, to })
    }

    pub fn is_locked(&self) -> bool {
        self.lock.is_held()
    }

    pub fn release(&mut self) {
        self.lock.release();
    }
}
