use std::time::Duration;
use web_time::Instant;

/// How long the copy result stays on the button before it reverts.
pub const FEEDBACK_DURATION: Duration = Duration::from_secs(2);

pub const LABEL_IDLE: &str = "Copy";
pub const LABEL_PENDING: &str = "Copying\u{2026}";
pub const LABEL_COPIED: &str = "Copied \u{2714}";
pub const LABEL_FAILED: &str = "Copy failed \u{2716}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyState {
    Idle,
    Pending,
    Shown { outcome: CopyOutcome, since: Instant },
}

/// Copy button state: `Idle -> Pending -> Shown -> Idle`.
#[derive(Debug)]
pub struct CopyFeedback {
    state: CopyState,
}

impl Default for CopyFeedback {
    fn default() -> Self {
        Self {
            state: CopyState::Idle,
        }
    }
}

impl CopyFeedback {
    #[cfg(test)]
    pub fn state(&self) -> CopyState {
        self.state
    }

    /// Returns false (and does nothing) unless the button is idle.
    pub fn begin(&mut self) -> bool {
        if self.state != CopyState::Idle {
            return false;
        }
        self.state = CopyState::Pending;
        true
    }

    pub fn resolve<E>(&mut self, result: &Result<(), E>, now: Instant) {
        let outcome = match result {
            Ok(()) => CopyOutcome::Copied,
            Err(_) => CopyOutcome::Failed,
        };
        self.state = CopyState::Shown {
            outcome,
            since: now,
        };
    }

    /// Expire a shown result once its display time has passed.
    pub fn tick(&mut self, now: Instant) {
        if let CopyState::Shown { since, .. } = self.state {
            if now.saturating_duration_since(since) >= FEEDBACK_DURATION {
                self.state = CopyState::Idle;
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self.state {
            CopyState::Idle => LABEL_IDLE,
            CopyState::Pending => LABEL_PENDING,
            CopyState::Shown {
                outcome: CopyOutcome::Copied,
                ..
            } => LABEL_COPIED,
            CopyState::Shown {
                outcome: CopyOutcome::Failed,
                ..
            } => LABEL_FAILED,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.state == CopyState::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_shows_then_reverts() {
        let mut fb = CopyFeedback::default();
        let t0 = Instant::now();
        assert!(fb.begin());
        assert_eq!(fb.label(), LABEL_PENDING);
        assert!(!fb.is_enabled());

        fb.resolve::<()>(&Ok(()), t0);
        assert_eq!(fb.label(), LABEL_COPIED);

        fb.tick(t0 + Duration::from_millis(1999));
        assert_eq!(fb.label(), LABEL_COPIED);
        fb.tick(t0 + FEEDBACK_DURATION);
        assert_eq!(fb.label(), LABEL_IDLE);
        assert!(fb.is_enabled());
    }

    #[test]
    fn test_failure_reverts_to_idle_label_after_delay() {
        let mut fb = CopyFeedback::default();
        let initial = fb.label();
        let t0 = Instant::now();
        fb.begin();
        fb.resolve(&Err("no clipboard"), t0);
        assert_eq!(fb.label(), LABEL_FAILED);
        assert!(!fb.is_enabled());

        fb.tick(t0 + Duration::from_millis(500));
        assert_eq!(fb.label(), LABEL_FAILED);
        fb.tick(t0 + FEEDBACK_DURATION + Duration::from_millis(16));
        assert_eq!(fb.label(), initial);
        assert!(fb.is_enabled());
    }

    #[test]
    fn test_begin_ignored_while_busy() {
        let mut fb = CopyFeedback::default();
        assert!(fb.begin());
        assert!(!fb.begin());
        fb.resolve::<()>(&Ok(()), Instant::now());
        assert!(!fb.begin());
    }

    #[test]
    fn test_tick_leaves_pending_alone() {
        let mut fb = CopyFeedback::default();
        fb.begin();
        fb.tick(Instant::now() + Duration::from_secs(60));
        assert_eq!(fb.state(), CopyState::Pending);
    }
}
