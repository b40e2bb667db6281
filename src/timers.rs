use std::time::{Duration, Instant};

use tracing::debug;

pub const RESIZE_CLOSE_DELAY: Duration = Duration::from_millis(100);
pub const WARNING_TTL: Duration = Duration::from_secs(3);
pub const PULSE_DURATION: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum TimerKind {
    /// Time pickers close a short while after the viewport stops resizing.
    CloseOnResize,
    /// End of the attention pulse on the range picker's "to" button.
    PulseEnd,
}

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct TimerKey {
    pub picker: String,
    pub kind: TimerKind,
}

impl TimerKey {
    pub fn new(picker: impl Into<String>, kind: TimerKind) -> Self {
        Self {
            picker: picker.into(),
            kind,
        }
    }
}

/// Deadline queue for deferred UI choreography.
///
/// Scheduling a key that is already pending replaces its deadline, so a burst
/// of resize events fires once. Handlers must re-check picker state when a key
/// comes due; nothing here guarantees the state that scheduled it still holds.
#[derive(Debug, Default)]
pub struct TimerQueue {
    pending: Vec<(TimerKey, Instant)>,
}

impl TimerQueue {
    pub fn schedule(&mut self, key: TimerKey, deadline: Instant) {
        self.cancel(&key);
        debug!(picker = %key.picker, kind = ?key.kind, "timer scheduled");
        self.pending.push((key, deadline));
    }

    pub fn cancel(&mut self, key: &TimerKey) -> bool {
        let before = self.pending.len();
        self.pending.retain(|(pending, _)| pending != key);
        before != self.pending.len()
    }

    pub fn cancel_picker(&mut self, picker: &str) {
        self.pending.retain(|(pending, _)| pending.picker != picker);
    }

    /// Removes and returns every key due at `now`, earliest first.
    pub fn take_due(&mut self, now: Instant) -> Vec<TimerKey> {
        let mut due = Vec::new();
        self.pending.retain(|(key, deadline)| {
            if *deadline <= now {
                due.push((key.clone(), *deadline));
                false
            } else {
                true
            }
        });
        due.sort_by_key(|(_, deadline)| *deadline);
        due.into_iter().map(|(key, _)| key).collect()
    }

    pub fn is_pending(&self, key: &TimerKey) -> bool {
        self.pending.iter().any(|(pending, _)| pending == key)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.iter().map(|(_, deadline)| *deadline).min()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub text: String,
    pub expires_at: Instant,
}

/// Transient user-facing warnings (the toast stack).
#[derive(Debug, Default)]
pub struct Notifications {
    notices: Vec<Notice>,
}

impl Notifications {
    pub fn push(&mut self, text: impl Into<String>, now: Instant, ttl: Duration) {
        self.notices.push(Notice {
            text: text.into(),
            expires_at: now + ttl,
        });
    }

    pub fn prune(&mut self, now: Instant) {
        self.notices.retain(|notice| notice.expires_at > now);
    }

    pub fn active(&self) -> &[Notice] {
        &self.notices
    }

    pub fn next_expiry(&self) -> Option<Instant> {
        self.notices.iter().map(|notice| notice.expires_at).min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rescheduling_replaces_the_pending_deadline() {
        let start = Instant::now();
        let key = TimerKey::new("meeting-time", TimerKind::CloseOnResize);
        let mut timers = TimerQueue::default();

        timers.schedule(key.clone(), start + RESIZE_CLOSE_DELAY);
        timers.schedule(key.clone(), start + Duration::from_millis(150) + RESIZE_CLOSE_DELAY);
        assert_eq!(timers.len(), 1);

        assert!(timers.take_due(start + Duration::from_millis(120)).is_empty());
        assert_eq!(timers.take_due(start + Duration::from_millis(260)), vec![key]);
        assert!(timers.is_empty());
    }

    #[test]
    fn due_keys_come_out_earliest_first() {
        let start = Instant::now();
        let late = TimerKey::new("a", TimerKind::PulseEnd);
        let early = TimerKey::new("b", TimerKind::CloseOnResize);
        let mut timers = TimerQueue::default();
        timers.schedule(late.clone(), start + Duration::from_millis(50));
        timers.schedule(early.clone(), start + Duration::from_millis(10));
        assert_eq!(timers.next_deadline(), Some(start + Duration::from_millis(10)));
        assert_eq!(timers.take_due(start + Duration::from_secs(1)), vec![early, late]);
    }

    #[test]
    fn cancel_picker_drops_only_its_timers() {
        let start = Instant::now();
        let mut timers = TimerQueue::default();
        timers.schedule(TimerKey::new("a", TimerKind::PulseEnd), start);
        timers.schedule(TimerKey::new("a", TimerKind::CloseOnResize), start);
        timers.schedule(TimerKey::new("b", TimerKind::PulseEnd), start);
        timers.cancel_picker("a");
        assert_eq!(timers.len(), 1);
        assert!(timers.is_pending(&TimerKey::new("b", TimerKind::PulseEnd)));
    }

    #[test]
    fn notices_expire_after_their_ttl() {
        let start = Instant::now();
        let mut notices = Notifications::default();
        notices.push("Please select a \"From Date\" first!", start, WARNING_TTL);
        notices.prune(start + Duration::from_secs(2));
        assert_eq!(notices.active().len(), 1);
        notices.prune(start + WARNING_TTL);
        assert!(notices.active().is_empty());
    }
}
