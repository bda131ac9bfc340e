use serde::{Deserialize, Serialize};

use crate::types::{FrameToken, ScrollBehavior, TimerKind, TimerToken};

/// A single instruction from the engine to its host.
///
/// The engine answers every `HostEvent` with a `Vec<HostCommand>`. Hosts
/// execute the list in order; each command carries all the data it needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HostCommand {
    /// Remove every duplicate item from the track, then insert copies of the
    /// original items: `leading` (in order) before the first original and
    /// `trailing` (in order) after the last. Values are indices into the
    /// original item sequence.
    BuildTrack {
        leading: Vec<usize>,
        trailing: Vec<usize>,
    },

    /// Move the track to a new scroll offset.
    SetOffset {
        offset: f64,
        behavior: ScrollBehavior,
    },

    /// Cancel the default action of the pointer event being handled
    /// (text selection, native drag, page panning).
    SuppressDefault,

    /// Call back with `HostEvent::Frame` on the next animation frame.
    RequestFrame { token: FrameToken },

    /// Drop a pending frame request.
    CancelFrame { token: FrameToken },

    /// Call back with `HostEvent::Timer` after `delay_ms`.
    ScheduleTimer {
        kind: TimerKind,
        token: TimerToken,
        delay_ms: f64,
    },

    /// Drop a pending timer.
    CancelTimer { kind: TimerKind, token: TimerToken },

    /// Measure the first track item and answer with `HostEvent::Measured`.
    Measure,
}

impl HostCommand {
    /// The target offset, if this command moves the track.
    pub fn offset(&self) -> Option<f64> {
        match self {
            Self::SetOffset { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}
