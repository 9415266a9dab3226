//! Per-step countdown.
//!
//! The countdown holds no clock of its own: the session runtime delivers one
//! tick per period and the countdown decides whether it expired. Keeping the
//! clock outside makes every transition deterministic under test.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not armed, the tick was ignored.
    Idle,
    Running { remaining: u32 },
    /// Reached zero on this tick. Reported once, after which the countdown is disarmed.
    Expired,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Countdown {
    initial: u32,
    remaining: u32,
    armed: bool,
}

impl Countdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restarts from `duration_secs`, dropping whatever was left.
    pub fn arm(&mut self, duration_secs: u32) {
        self.initial = duration_secs;
        self.remaining = duration_secs;
        self.armed = true;
    }

    /// Stops ticking without reporting expiry.
    pub fn disarm(&mut self) {
        self.armed = false;
    }

    pub fn clear(&mut self) {
        self.armed = false;
        self.remaining = 0;
    }

    pub fn tick(&mut self) -> TickOutcome {
        if !self.armed {
            return TickOutcome::Idle;
        }

        if self.remaining <= 1 {
            self.remaining = 0;
            self.armed = false;
            return TickOutcome::Expired;
        }

        self.remaining -= 1;
        TickOutcome::Running {
            remaining: self.remaining,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn initial(&self) -> u32 {
        self.initial
    }

    /// Fraction of the step still left, used for radial and bar progress.
    pub fn fraction(&self) -> f32 {
        if self.initial == 0 {
            return 0.0;
        }
        self.remaining as f32 / self.initial as f32
    }
}

/// Renders seconds as `MM:SS`.
pub fn format_clock(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
