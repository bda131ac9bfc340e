use serde::{Deserialize, Serialize};

/// Whether an item is one of the carousel's own items or a copy the engine
/// inserted at either end of the track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemRole {
    Original,
    /// Presentation-only copy. Hosts must hide it from assistive technology
    /// and keep it out of the focus order.
    Duplicate,
}

/// An item as measured by the host, in track order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemMeasure {
    /// Rendered on-axis width in layout units, without the inter-item gap.
    pub width: f64,
    pub role: ItemRole,
}

impl ItemMeasure {
    pub fn original(width: f64) -> Self {
        Self {
            width,
            role: ItemRole::Original,
        }
    }

    pub fn duplicate(width: f64) -> Self {
        Self {
            width,
            role: ItemRole::Duplicate,
        }
    }
}

/// How the host should apply a new scroll offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScrollBehavior {
    /// Jump without animation. Used for drag updates, momentum ticks and
    /// wrap rewrites.
    Instant,
    /// Animate to the target (snap alignment).
    Smooth,
}

impl ScrollBehavior {
    /// The matching CSS `scroll-behavior` keyword.
    pub fn as_css(self) -> &'static str {
        match self {
            Self::Instant => "auto",
            Self::Smooth => "smooth",
        }
    }
}

/// The delayed tasks an engine instance can have in flight. At most one
/// timer of each kind is pending at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimerKind {
    /// Releases the adjustment lock taken by a wrap rewrite.
    LockRelease,
    /// Runs the wrap check once a smooth snap has had time to finish.
    SnapSettle,
    /// Debounced wrap check after native scroll notifications.
    ScrollDebounce,
    /// Debounced re-measure after viewport resizes.
    ResizeDebounce,
}

impl TimerKind {
    pub const ALL: [TimerKind; 4] = [
        TimerKind::LockRelease,
        TimerKind::SnapSettle,
        TimerKind::ScrollDebounce,
        TimerKind::ResizeDebounce,
    ];

    /// Dense index into per-kind tables.
    pub fn slot(self) -> usize {
        match self {
            Self::LockRelease => 0,
            Self::SnapSettle => 1,
            Self::ScrollDebounce => 2,
            Self::ResizeDebounce => 3,
        }
    }
}

/// Identifies one scheduled timer. Tokens are never reused within an engine
/// instance, so a host firing a cancelled timer is detected and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimerToken(pub u64);

/// Identifies one animation frame request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameToken(pub u64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_slots_are_dense() {
        let mut seen = [false; 4];
        for kind in TimerKind::ALL {
            seen[kind.slot()] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn tokens_serialize_as_plain_numbers() {
        let json = serde_json::to_string(&TimerToken(7)).unwrap();
        assert_eq!(json, "7");
    }
}
