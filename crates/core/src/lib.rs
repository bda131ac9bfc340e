//! Infinite-loop scroll engine for horizontal carousels.
//!
//! The engine is host-agnostic: it consumes [`HostEvent`]s and answers with
//! [`HostCommand`]s, never touching a document or a clock itself.
//!
//! ```text
//!   pointer / frame / timer / scroll / resize
//!                     │
//!                     ▼
//!   HostEvent ──▶ CarouselEngine ──▶ HostCommand[] ──▶ host (DOM, terminal, script)
//!                 track · drag ·      (SetOffset,
//!                 momentum · wrap ·    ScheduleTimer,
//!                 snap                 RequestFrame…)
//! ```
//!
//! [`HostEvent`]: infiniscroll_protocol::HostEvent
//! [`HostCommand`]: infiniscroll_protocol::HostCommand

pub mod config;
pub mod engine;
pub mod momentum;
pub mod pointer;
pub mod schedule;
pub mod snap;
pub mod track;
pub mod wrap;

pub use config::{ConfigError, EngineConfig};
pub use engine::{CarouselEngine, EngineError, Phase, Writer};
pub use track::{Region, Track, TrackError};
