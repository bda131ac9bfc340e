//! A simulated browser for the terminal preview.
//!
//! Keeps the scroll position the way a page would, answers engine commands
//! with a virtual clock, and reports native scroll notifications back. No
//! terminal code lives here.

use std::collections::VecDeque;
use std::time::Duration;

use infiniscroll_core::{CarouselEngine, EngineConfig, EngineError, Region};
use infiniscroll_protocol::{
    FrameToken, HostCommand, HostEvent, ItemMeasure, ScrollBehavior, TimerToken,
};
use tracing::trace;

/// Layout units per terminal column.
pub const CELL_UNITS: f64 = 8.0;
pub const VIEWPORT_COLS: u16 = 48;
pub const ITEM_COLS: u16 = 10;
pub const GAP_COLS: u16 = 2;
/// Viewport width reported while the desktop toggle is on.
pub const DESKTOP_WIDTH: f64 = 1024.0;

const GLIDE: Duration = Duration::from_millis(300);
const GLIDE_STEP: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, Copy)]
struct Glide {
    from: f64,
    to: f64,
    started: Duration,
}

/// An item slot positioned in viewport columns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleItem {
    /// Left edge relative to the viewport; may be negative when clipped.
    pub col: i32,
    /// 1-based number of the original item shown.
    pub label: usize,
    pub region: Region,
}

#[derive(Debug)]
pub struct PreviewHost {
    engine: CarouselEngine,
    items: usize,
    scroll_left: f64,
    glide: Option<Glide>,
    frame: Option<(Duration, FrameToken)>,
    timers: Vec<(Duration, TimerToken)>,
    scroll_pending: bool,
    desktop: bool,
    now: Duration,
}

impl PreviewHost {
    /// The preview lays items out on whole columns, so the gap is fixed.
    pub fn new(items: usize, mut config: EngineConfig) -> Self {
        config.item_gap = f64::from(GAP_COLS) * CELL_UNITS;
        Self {
            engine: CarouselEngine::new(config),
            items,
            scroll_left: 0.0,
            glide: None,
            frame: None,
            timers: Vec::new(),
            scroll_pending: false,
            desktop: false,
            now: Duration::ZERO,
        }
    }

    pub fn attach(&mut self) -> Result<(), EngineError> {
        let measures = vec![ItemMeasure::original(item_units()); self.items];
        let commands = self.engine.attach(&measures, self.viewport_width())?;
        self.apply(commands);
        Ok(())
    }

    #[cfg(test)]
    pub fn engine(&self) -> &CarouselEngine {
        &self.engine
    }

    #[cfg(test)]
    pub fn scroll_left(&self) -> f64 {
        self.scroll_left
    }

    pub fn is_desktop(&self) -> bool {
        self.desktop
    }

    pub fn viewport_width(&self) -> f64 {
        if self.desktop {
            DESKTOP_WIDTH
        } else {
            f64::from(VIEWPORT_COLS) * CELL_UNITS
        }
    }

    /// Switch between the phone viewport and a desktop-sized one.
    pub fn toggle_desktop(&mut self) {
        self.desktop = !self.desktop;
        let viewport_width = self.viewport_width();
        self.dispatch(HostEvent::Resize { viewport_width });
    }

    pub fn pointer_down(&mut self, x: f64) {
        let time_ms = self.time_ms();
        self.dispatch(HostEvent::PointerDown { x, time_ms });
    }

    pub fn pointer_move(&mut self, x: f64) {
        let time_ms = self.time_ms();
        self.dispatch(HostEvent::PointerMove { x, time_ms });
    }

    pub fn pointer_up(&mut self) {
        self.dispatch(HostEvent::PointerUp);
    }

    /// Scroll the track directly, like a wheel or keyboard would.
    pub fn native_scroll(&mut self, delta: f64) {
        self.glide = None;
        self.scroll_left += delta;
        self.scroll_pending = true;
    }

    /// Move the clock to `now` and deliver everything that became due.
    pub fn advance(&mut self, now: Duration) {
        self.now = now;

        if let Some(glide) = self.glide {
            let progress = (now.saturating_sub(glide.started)).as_secs_f64() / GLIDE.as_secs_f64();
            if progress >= 1.0 {
                self.scroll_left = glide.to;
                self.glide = None;
            } else {
                self.scroll_left = glide.from + (glide.to - glide.from) * ease(progress);
            }
            self.scroll_pending = true;
        }

        if self.scroll_pending {
            self.scroll_pending = false;
            let offset = self.scroll_left;
            self.dispatch(HostEvent::Scroll { offset });
        }

        if let Some((due, token)) = self.frame
            && due <= now
        {
            self.frame = None;
            self.dispatch(HostEvent::Frame { token });
        }

        while let Some(index) = self.earliest_due_timer() {
            let (_, token) = self.timers.remove(index);
            self.dispatch(HostEvent::Timer { token });
        }
    }

    /// When the host next has work to do, if anything is pending.
    pub fn next_deadline(&self) -> Option<Duration> {
        let glide = self.glide.map(|_| self.now + GLIDE_STEP);
        let frame = self.frame.map(|(due, _)| due);
        let timers = self.timers.iter().map(|(due, _)| *due);
        glide.into_iter().chain(frame).chain(timers).min()
    }

    pub fn is_busy(&self) -> bool {
        self.glide.is_some() || self.frame.is_some() || !self.timers.is_empty()
    }

    /// Item slots overlapping the viewport at the current scroll position.
    pub fn visible_items(&self) -> Vec<VisibleItem> {
        let Some(track) = self.engine.track() else {
            return Vec::new();
        };
        let item_width = track.item_width();
        if item_width <= 0.0 {
            return Vec::new();
        }
        track
            .slots()
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| {
                let left = i as f64 * item_width - self.scroll_left;
                let col = (left / CELL_UNITS).floor() as i32;
                let visible =
                    col + i32::from(ITEM_COLS) > 0 && col < i32::from(VIEWPORT_COLS);
                visible.then_some(VisibleItem {
                    col,
                    label: slot.source + 1,
                    region: slot.region,
                })
            })
            .collect()
    }

    pub fn status(&self) -> String {
        if self.engine.is_suspended() {
            return format!(
                "suspended: viewport {} ≥ breakpoint {}",
                self.viewport_width(),
                self.engine.config().breakpoint
            );
        }
        let offset = self.engine.offset();
        let index = self
            .engine
            .logical_index()
            .map_or_else(|| "-".to_string(), |i| (i + 1).to_string());
        let region = self
            .engine
            .track()
            .and_then(|t| t.region_at(offset))
            .map_or("outside", |r| match r {
                Region::Leading => "leading",
                Region::Original => "original",
                Region::Trailing => "trailing",
            });
        let lock = if self.engine.is_locked() { "locked" } else { "free" };
        format!(
            "offset {offset:>7.1} | {} | item {index} | {region} | {lock}",
            self.engine.phase().name()
        )
    }

    fn time_ms(&self) -> f64 {
        self.now.as_secs_f64() * 1000.0
    }

    fn earliest_due_timer(&self) -> Option<usize> {
        self.timers
            .iter()
            .enumerate()
            .filter(|(_, (due, _))| *due <= self.now)
            .min_by_key(|(_, (due, _))| *due)
            .map(|(index, _)| index)
    }

    fn dispatch(&mut self, event: HostEvent) {
        let commands = self.engine.handle(event);
        self.apply(commands);
    }

    fn apply(&mut self, commands: Vec<HostCommand>) {
        let mut queue = VecDeque::from(commands);
        while let Some(command) = queue.pop_front() {
            trace!(?command, "host");
            match command {
                HostCommand::BuildTrack { .. } | HostCommand::SuppressDefault => {}
                HostCommand::SetOffset {
                    offset,
                    behavior: ScrollBehavior::Instant,
                } => {
                    self.glide = None;
                    self.scroll_left = offset;
                    self.scroll_pending = true;
                }
                HostCommand::SetOffset {
                    offset,
                    behavior: ScrollBehavior::Smooth,
                } => {
                    self.glide = Some(Glide {
                        from: self.scroll_left,
                        to: offset,
                        started: self.now,
                    });
                }
                HostCommand::RequestFrame { token } => {
                    let frame_ms = self.engine.config().frame_ms;
                    self.frame = Some((self.now + millis(frame_ms), token));
                }
                HostCommand::CancelFrame { token } => {
                    if self.frame.is_some_and(|(_, pending)| pending == token) {
                        self.frame = None;
                    }
                }
                HostCommand::ScheduleTimer {
                    token, delay_ms, ..
                } => self.timers.push((self.now + millis(delay_ms), token)),
                HostCommand::CancelTimer { token, .. } => {
                    self.timers.retain(|(_, pending)| *pending != token);
                }
                HostCommand::Measure => {
                    let more = self.engine.handle(HostEvent::Measured {
                        item_width: item_units(),
                    });
                    queue.extend(more);
                }
            }
        }
    }
}

fn item_units() -> f64 {
    f64::from(ITEM_COLS) * CELL_UNITS
}

fn millis(ms: f64) -> Duration {
    Duration::try_from_secs_f64(ms / 1000.0).unwrap_or(Duration::ZERO)
}

/// Ease-out, roughly what browsers use for smooth scrolling.
fn ease(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(3)
}
