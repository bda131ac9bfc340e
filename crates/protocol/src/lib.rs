pub mod commands;
pub mod events;
pub mod types;

pub use commands::HostCommand;
pub use events::HostEvent;
pub use types::{FrameToken, ItemMeasure, ItemRole, ScrollBehavior, TimerKind, TimerToken};
