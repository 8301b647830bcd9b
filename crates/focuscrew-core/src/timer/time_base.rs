use std::time::Duration;

use tokio::time::Instant;

/// Clock that a progress animation is driven from.
///
/// Freezing keeps the elapsed offset; resuming continues from it, so the
/// animation picks up where it stopped instead of jumping ahead by the
/// paused time.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeBase {
    /// Instant the animation would have started at had it never paused.
    begin: Option<Instant>,
    frozen: Option<Duration>,
}

impl TimeBase {
    pub fn start(&mut self, now: Instant) {
        self.begin = Some(now);
        self.frozen = None;
    }

    pub fn freeze(&mut self, now: Instant) {
        if self.frozen.is_none() {
            self.frozen = Some(self.offset(now));
        }
    }

    pub fn resume(&mut self, now: Instant) {
        if let Some(offset) = self.frozen.take() {
            self.begin = now.checked_sub(offset).or(Some(now));
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.is_some()
    }

    /// Elapsed animation time at `now`.
    pub fn offset(&self, now: Instant) -> Duration {
        match (self.frozen, self.begin) {
            (Some(frozen), _) => frozen,
            (None, Some(begin)) => now.saturating_duration_since(begin),
            (None, None) => Duration::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freeze_and_resume_keeps_offset() {
        let t0 = Instant::now();
        let mut tb = TimeBase::default();
        tb.start(t0);
        assert_eq!(tb.offset(t0 + Duration::from_secs(3)), Duration::from_secs(3));

        tb.freeze(t0 + Duration::from_secs(3));
        assert!(tb.is_frozen());
        assert_eq!(tb.offset(t0 + Duration::from_secs(10)), Duration::from_secs(3));

        tb.resume(t0 + Duration::from_secs(10));
        assert_eq!(tb.offset(t0 + Duration::from_secs(12)), Duration::from_secs(5));
    }

    #[test]
    fn double_freeze_keeps_first_offset() {
        let t0 = Instant::now();
        let mut tb = TimeBase::default();
        tb.start(t0);
        tb.freeze(t0 + Duration::from_secs(1));
        tb.freeze(t0 + Duration::from_secs(4));
        assert_eq!(tb.offset(t0 + Duration::from_secs(9)), Duration::from_secs(1));
    }

    #[test]
    fn unstarted_is_zero() {
        let tb = TimeBase::default();
        assert_eq!(tb.offset(Instant::now()), Duration::ZERO);
    }
}
