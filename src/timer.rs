/// Remaining seconds at which the timer display switches to the warning color.
pub const WARN_THRESHOLD_SECS: u32 = 120;

/// A countdown that advances only on explicit ticks, so zero-crossing
/// behavior is testable without real time passing. The caller owns the
/// interval that delivers ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Countdown {
    remaining: u32,
    active: bool,
}

impl Countdown {
    /// An inactive countdown holding `secs` for display.
    pub fn new(secs: u32) -> Self {
        Self {
            remaining: secs,
            active: false,
        }
    }

    /// Reset to `secs` and start counting.
    pub fn restart(&mut self, secs: u32) {
        self.remaining = secs;
        self.active = true;
    }

    pub fn stop(&mut self) {
        self.active = false;
    }

    /// Advance one second. Returns `true` exactly when this tick crossed
    /// zero; the countdown stops itself at that point, so the crossing
    /// fires once.
    pub fn tick(&mut self) -> bool {
        if !self.active {
            return false;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.active = false;
            true
        } else {
            false
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_warning(&self) -> bool {
        self.remaining <= WARN_THRESHOLD_SECS
    }
}

/// `HH:MM:SS`, used for the follow-up timer in the header.
pub fn format_clock(secs: u32) -> String {
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// `MM:SS minutes left`, used for the interview timer.
pub fn format_minutes_left(secs: u32) -> String {
    format!("{:02}:{:02} minutes left", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn reaches_zero_after_exactly_n_ticks_and_fires_once() {
        let mut c = Countdown::new(0);
        c.restart(3);

        assert!(!c.tick());
        assert!(!c.tick());
        assert!(c.tick());
        assert_eq!(c.remaining(), 0);
        assert!(!c.is_active());

        // Further ticks are no-ops once stopped.
        assert!(!c.tick());
        assert_eq!(c.remaining(), 0);
    }

    #[test]
    fn inactive_countdown_does_not_advance() {
        let mut c = Countdown::new(300);
        assert!(!c.tick());
        assert_eq!(c.remaining(), 300);
    }

    #[test]
    fn stop_freezes_remaining() {
        let mut c = Countdown::new(0);
        c.restart(10);
        c.tick();
        c.stop();
        assert!(!c.tick());
        assert_eq!(c.remaining(), 9);
    }

    #[test]
    fn restart_resets_remaining() {
        let mut c = Countdown::new(0);
        c.restart(2);
        c.tick();
        c.restart(2);
        assert_eq!(c.remaining(), 2);
        assert!(c.is_active());
    }

    #[test]
    fn warning_threshold() {
        let mut c = Countdown::new(121);
        assert!(!c.is_warning());
        c.restart(120);
        assert!(c.is_warning());
    }

    #[test]
    fn clock_formats() {
        assert_eq!(format_clock(300), "00:05:00");
        assert_eq!(format_clock(3661), "01:01:01");
        assert_eq!(format_minutes_left(300), "05:00 minutes left");
        assert_eq!(format_minutes_left(59), "00:59 minutes left");
    }
}
