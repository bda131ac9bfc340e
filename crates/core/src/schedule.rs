use infiniscroll_protocol::{FrameToken, HostCommand, TimerKind, TimerToken};

/// Per-instance bookkeeping for delayed work.
///
/// The host owns the real timers and frame callbacks; the scheduler only
/// hands out tokens and remembers which one is current for each kind.
/// Scheduling a kind that is already pending replaces it, which is all a
/// debounce needs. Firing a token that is not current is reported as stale.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    next: u64,
    timers: [Option<TimerToken>; TimerKind::ALL.len()],
    frame: Option<FrameToken>,
}

impl Scheduler {
    fn issue(&mut self) -> u64 {
        self.next += 1;
        self.next
    }

    pub fn schedule(&mut self, kind: TimerKind, delay_ms: f64, out: &mut Vec<HostCommand>) {
        self.cancel(kind, out);
        let token = TimerToken(self.issue());
        self.timers[kind.slot()] = Some(token);
        out.push(HostCommand::ScheduleTimer {
            kind,
            token,
            delay_ms,
        });
    }

    pub fn cancel(&mut self, kind: TimerKind, out: &mut Vec<HostCommand>) {
        if let Some(token) = self.timers[kind.slot()].take() {
            out.push(HostCommand::CancelTimer { kind, token });
        }
    }

    pub fn is_pending(&self, kind: TimerKind) -> bool {
        self.timers[kind.slot()].is_some()
    }

    /// Consume a fired timer. Returns its kind, or `None` for a stale token.
    pub fn fire(&mut self, token: TimerToken) -> Option<TimerKind> {
        let kind = TimerKind::ALL
            .into_iter()
            .find(|kind| self.timers[kind.slot()] == Some(token))?;
        self.timers[kind.slot()] = None;
        Some(kind)
    }

    /// Ask for the next animation frame unless one is already requested.
    pub fn request_frame(&mut self, out: &mut Vec<HostCommand>) {
        if self.frame.is_some() {
            return;
        }
        let token = FrameToken(self.issue());
        self.frame = Some(token);
        out.push(HostCommand::RequestFrame { token });
    }

    pub fn cancel_frame(&mut self, out: &mut Vec<HostCommand>) {
        if let Some(token) = self.frame.take() {
            out.push(HostCommand::CancelFrame { token });
        }
    }

    pub fn frame_pending(&self) -> bool {
        self.frame.is_some()
    }

    /// Consume a delivered frame. `false` for a stale token.
    pub fn take_frame(&mut self, token: FrameToken) -> bool {
        if self.frame == Some(token) {
            self.frame = None;
            true
        } else {
            false
        }
    }

    pub fn cancel_all(&mut self, out: &mut Vec<HostCommand>) {
        self.cancel_frame(out);
        for kind in TimerKind::ALL {
            self.cancel(kind, out);
        }
    }
}
