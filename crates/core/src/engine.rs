//! Per-carousel state machine.
//!
//! ```text
//!            pointer-down            release, |v| > launch
//!   Idle ───────────────▶ Dragging ─────────────────────▶ Momentum
//!    ▲                        │ release, slow                 │ |v| ≤ floor
//!    │                        ▼                               ▼
//!    └──── settle timer ── SnapSettling ◀──────────────────────┘
//! ```
//!
//! Wrap correction is a transient sub-state reachable from Dragging, Momentum
//! and SnapSettling: the rewrite is applied immediately and the adjustment
//! lock stays held until the `LockRelease` timer fires.
//!
//! # Invariants
//!
//! 1. At most one offset writer is active: the [`Phase`] names it.
//! 2. Starting a drag cancels any pending momentum frame, snap settle and
//!    scroll debounce.
//! 3. While the lock is held, pointer input, wrap checks and momentum
//!    steps do not move the offset.
//! 4. A wrap rewrite moves the offset by exactly one segment, toward the
//!    originals, and never happens while the item width is unmeasured.

use infiniscroll_protocol::{HostCommand, HostEvent, ItemMeasure, ScrollBehavior, TimerKind};
use thiserror::Error;
use tracing::{debug, trace};

use crate::config::EngineConfig;
use crate::momentum::Momentum;
use crate::pointer::{DragSession, Release};
use crate::schedule::Scheduler;
use crate::snap::snap_target;
use crate::track::{Track, TrackError};
use crate::wrap::WrapCorrector;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("viewport {viewport_width} is not below the {breakpoint} breakpoint")]
    Inactive { viewport_width: f64, breakpoint: f64 },
    #[error("track: {0}")]
    Track(#[from] TrackError),
}

/// What the engine is currently doing with the offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    Idle,
    Dragging(DragSession),
    Momentum(Momentum),
    /// A smooth snap is animating; a wrap check follows once it settles.
    SnapSettling,
}

/// The component allowed to write the offset in a given phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Writer {
    Drag,
    Momentum,
    Snap,
}

impl Phase {
    pub fn writer(&self) -> Option<Writer> {
        match self {
            Self::Idle => None,
            Self::Dragging(_) => Some(Writer::Drag),
            Self::Momentum(_) => Some(Writer::Momentum),
            Self::SnapSettling => Some(Writer::Snap),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Dragging(_) => "dragging",
            Self::Momentum(_) => "momentum",
            Self::SnapSettling => "snap-settling",
        }
    }
}

/// One carousel instance.
///
/// Owns everything that used to be shared page state: the track model, the
/// mirrored offset, the drag session, the lock and the pending timers.
/// Instances share nothing.
#[derive(Debug, Clone)]
pub struct CarouselEngine {
    config: EngineConfig,
    track: Option<Track>,
    offset: f64,
    phase: Phase,
    corrector: WrapCorrector,
    scheduler: Scheduler,
    /// Release velocity of a drag that ended while the lock was held.
    deferred_release: Option<f64>,
    /// Viewport grew past the breakpoint after attach.
    suspended: bool,
    pending_viewport: Option<f64>,
}

impl CarouselEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            track: None,
            offset: 0.0,
            phase: Phase::Idle,
            corrector: WrapCorrector::default(),
            scheduler: Scheduler::default(),
            deferred_release: None,
            suspended: false,
            pending_viewport: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn track(&self) -> Option<&Track> {
        self.track.as_ref()
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_attached(&self) -> bool {
        self.track.is_some()
    }

    pub fn is_locked(&self) -> bool {
        self.corrector.is_locked()
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Original index currently at the track's leading edge.
    pub fn logical_index(&self) -> Option<usize> {
        self.track.as_ref()?.logical_index(self.offset)
    }

    /// Dispatch a host event. Errors that only mean "do not activate" are
    /// logged and swallowed: the host keeps native scrolling.
    pub fn handle(&mut self, event: HostEvent) -> Vec<HostCommand> {
        match event {
            HostEvent::Attach {
                items,
                viewport_width,
            } => match self.attach(&items, viewport_width) {
                Ok(commands) => commands,
                Err(err) => {
                    debug!(%err, "carousel not activated");
                    Vec::new()
                }
            },
            HostEvent::PointerDown { x, time_ms } => self.pointer_down(x, time_ms),
            HostEvent::PointerMove { x, time_ms } => self.pointer_move(x, time_ms),
            HostEvent::PointerUp | HostEvent::PointerLeave => self.pointer_up(),
            HostEvent::Frame { token } => {
                if self.scheduler.take_frame(token) {
                    self.frame()
                } else {
                    Vec::new()
                }
            }
            HostEvent::Timer { token } => match self.scheduler.fire(token) {
                Some(kind) => self.timer(kind),
                None => Vec::new(),
            },
            HostEvent::Scroll { offset } => self.scroll(offset),
            HostEvent::Resize { viewport_width } => self.resize(viewport_width),
            HostEvent::Measured { item_width } => self.measured(item_width),
        }
    }

    /// Build (or rebuild) the track and park it at the start of the
    /// originals. Any work in flight from an earlier build is cancelled.
    pub fn attach(
        &mut self,
        items: &[ItemMeasure],
        viewport_width: f64,
    ) -> Result<Vec<HostCommand>, EngineError> {
        if !self.config.is_active_width(viewport_width) {
            return Err(EngineError::Inactive {
                viewport_width,
                breakpoint: self.config.breakpoint,
            });
        }
        let track = Track::build(items, self.config.item_gap)?;

        let mut out = Vec::new();
        self.scheduler.cancel_all(&mut out);
        self.phase = Phase::Idle;
        self.corrector.release();
        self.deferred_release = None;
        self.suspended = false;
        self.pending_viewport = None;

        out.push(HostCommand::BuildTrack {
            leading: track.leading(),
            trailing: track.trailing(),
        });
        self.offset = track.park_offset();
        out.push(HostCommand::SetOffset {
            offset: self.offset,
            behavior: ScrollBehavior::Instant,
        });
        debug!(
            items = track.original_count(),
            item_width = track.item_width(),
            offset = self.offset,
            "carousel attached"
        );
        self.track = Some(track);
        Ok(out)
    }

    fn accepts_input(&self) -> bool {
        self.track.is_some() && !self.suspended && !self.corrector.is_locked()
    }

    fn pointer_down(&mut self, x: f64, time_ms: f64) -> Vec<HostCommand> {
        if !self.accepts_input() {
            return Vec::new();
        }
        let mut out = Vec::new();
        self.scheduler.cancel_frame(&mut out);
        self.scheduler.cancel(TimerKind::SnapSettle, &mut out);
        self.scheduler.cancel(TimerKind::ScrollDebounce, &mut out);
        self.deferred_release = None;
        debug!(from = self.phase.name(), offset = self.offset, "drag start");
        self.phase = Phase::Dragging(DragSession::start(x, time_ms, self.offset));
        out
    }

    fn pointer_move(&mut self, x: f64, time_ms: f64) -> Vec<HostCommand> {
        if !self.accepts_input() {
            return Vec::new();
        }
        let Phase::Dragging(session) = &mut self.phase else {
            return Vec::new();
        };
        let offset = session.offset_for(x, self.config.drag_gain);
        session.sample(x, time_ms, self.config.min_sample_interval_ms);

        let mut out = vec![HostCommand::SuppressDefault];
        self.set_offset(offset, &mut out);
        self.check_wrap(&mut out);
        out
    }

    fn pointer_up(&mut self) -> Vec<HostCommand> {
        let Phase::Dragging(session) = self.phase else {
            return Vec::new();
        };
        self.phase = Phase::Idle;
        let velocity = session.velocity();
        debug!(velocity, offset = self.offset, "drag end");

        if self.corrector.is_locked() {
            self.deferred_release = Some(velocity);
            return Vec::new();
        }
        let mut out = Vec::new();
        self.release(velocity, &mut out);
        out
    }

    fn release(&mut self, velocity: f64, out: &mut Vec<HostCommand>) {
        match Release::classify(velocity, self.config.launch_velocity) {
            Release::Fling(velocity) => {
                self.phase = Phase::Momentum(Momentum::launch(velocity, &self.config));
                self.momentum_tick(out);
            }
            Release::Settle => self.snap(out),
        }
    }

    fn frame(&mut self) -> Vec<HostCommand> {
        let mut out = Vec::new();
        if matches!(self.phase, Phase::Momentum(_)) {
            self.momentum_tick(&mut out);
        }
        out
    }

    fn momentum_tick(&mut self, out: &mut Vec<HostCommand>) {
        if self.corrector.is_locked() {
            // Hold position until the rewrite settles, then carry on.
            self.scheduler.request_frame(out);
            return;
        }
        let Phase::Momentum(momentum) = &mut self.phase else {
            return;
        };
        match momentum.step() {
            Some(displacement) => {
                trace!(velocity = momentum.velocity(), displacement, "momentum tick");
                let offset = self.offset + displacement;
                self.set_offset(offset, out);
                self.check_wrap(out);
                self.scheduler.request_frame(out);
            }
            None => {
                debug!(ticks = momentum.ticks(), offset = self.offset, "momentum spent");
                self.snap(out);
            }
        }
    }

    fn snap(&mut self, out: &mut Vec<HostCommand>) {
        let item_width = self.track.as_ref().map_or(0.0, Track::item_width);
        let Some(target) = snap_target(self.offset, item_width) else {
            self.phase = Phase::Idle;
            return;
        };
        self.phase = Phase::SnapSettling;
        self.offset = target;
        out.push(HostCommand::SetOffset {
            offset: target,
            behavior: ScrollBehavior::Smooth,
        });
        self.scheduler
            .schedule(TimerKind::SnapSettle, self.config.snap_settle_ms, out);
        debug!(target, "snap");
    }

    fn timer(&mut self, kind: TimerKind) -> Vec<HostCommand> {
        let mut out = Vec::new();
        match kind {
            TimerKind::LockRelease => {
                self.corrector.release();
                if let Some(velocity) = self.deferred_release.take() {
                    self.release(velocity, &mut out);
                }
            }
            TimerKind::SnapSettle => {
                if self.phase == Phase::SnapSettling {
                    self.phase = Phase::Idle;
                }
                self.check_wrap(&mut out);
            }
            TimerKind::ScrollDebounce => {
                if !matches!(self.phase, Phase::Dragging(_)) {
                    self.check_wrap(&mut out);
                }
            }
            TimerKind::ResizeDebounce => self.resize_settled(&mut out),
        }
        out
    }

    /// Native scroll notification. The host's position is authoritative.
    fn scroll(&mut self, offset: f64) -> Vec<HostCommand> {
        if self.track.is_none() || self.suspended || !offset.is_finite() {
            return Vec::new();
        }
        self.offset = offset;
        let mut out = Vec::new();
        if !matches!(self.phase, Phase::Dragging(_)) && !self.corrector.is_locked() {
            self.scheduler.schedule(
                TimerKind::ScrollDebounce,
                self.config.scroll_debounce_ms,
                &mut out,
            );
        }
        out
    }

    fn resize(&mut self, viewport_width: f64) -> Vec<HostCommand> {
        if self.track.is_none() {
            return Vec::new();
        }
        self.pending_viewport = Some(viewport_width);
        let mut out = Vec::new();
        self.scheduler.schedule(
            TimerKind::ResizeDebounce,
            self.config.resize_debounce_ms,
            &mut out,
        );
        out
    }

    fn resize_settled(&mut self, out: &mut Vec<HostCommand>) {
        let Some(viewport_width) = self.pending_viewport.take() else {
            return;
        };
        self.scheduler.cancel_frame(out);
        self.scheduler.cancel(TimerKind::SnapSettle, out);
        self.scheduler.cancel(TimerKind::ScrollDebounce, out);
        self.phase = Phase::Idle;
        self.deferred_release = None;

        if self.config.is_active_width(viewport_width) {
            self.suspended = false;
            out.push(HostCommand::Measure);
        } else {
            debug!(viewport_width, "viewport above breakpoint, suspending");
            self.suspended = true;
        }
    }

    /// Fresh item width from the host: re-park at the start of the originals.
    fn measured(&mut self, item_width: f64) -> Vec<HostCommand> {
        if self.suspended {
            return Vec::new();
        }
        let Some(track) = self.track.as_mut() else {
            return Vec::new();
        };
        track.remeasure(item_width);
        self.offset = track.park_offset();
        debug!(
            item_width = track.item_width(),
            offset = self.offset,
            "remeasured"
        );
        vec![HostCommand::SetOffset {
            offset: self.offset,
            behavior: ScrollBehavior::Instant,
        }]
    }

    fn set_offset(&mut self, offset: f64, out: &mut Vec<HostCommand>) {
        self.offset = offset;
        out.push(HostCommand::SetOffset {
            offset,
            behavior: ScrollBehavior::Instant,
        });
    }

    fn check_wrap(&mut self, out: &mut Vec<HostCommand>) {
        let segment = self.track.as_ref().map_or(0.0, Track::segment_width);
        let Some(correction) = self.corrector.check(self.offset, segment) else {
            return;
        };
        debug!(
            from = correction.from,
            to = correction.to,
            phase = self.phase.name(),
            "wrap"
        );
        self.set_offset(correction.to, out);
        if let Phase::Dragging(session) = &mut self.phase {
            session.rebase(correction.shift());
        }
        self.scheduler
            .schedule(TimerKind::LockRelease, self.config.lock_window_ms, out);
    }
}
