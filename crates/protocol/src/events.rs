use serde::{Deserialize, Serialize};

use crate::types::{FrameToken, ItemMeasure, TimerToken};

/// Something that happened on the host side and that the engine reacts to.
///
/// Pointer positions are on-axis and relative to the track's left edge;
/// times are milliseconds on any monotonic clock the host keeps consistent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HostEvent {
    /// (Re)initialize the carousel. `items` lists the track's current
    /// children in order, including stale duplicates from an earlier build.
    Attach {
        items: Vec<ItemMeasure>,
        viewport_width: f64,
    },

    /// Mouse button pressed or first touch point placed.
    PointerDown { x: f64, time_ms: f64 },

    PointerMove { x: f64, time_ms: f64 },

    /// Mouse button released or touch lifted.
    PointerUp,

    /// Pointer left the track while pressed.
    PointerLeave,

    /// A previously requested animation frame is due.
    Frame { token: FrameToken },

    /// A previously scheduled timer fired.
    Timer { token: TimerToken },

    /// The track's native scroll position changed (any cause, including
    /// OS-level inertial scrolling the engine did not drive).
    Scroll { offset: f64 },

    Resize { viewport_width: f64 },

    /// Answer to `HostCommand::Measure`: the first track item's rendered
    /// width, without the gap.
    Measured { item_width: f64 },
}
