//! Command handlers for the bedtime session context.
//!
//! [`SleepTimerController`] owns the sleep timer aggregate together with its
//! two wakeups: the expiry at the deadline and the once-a-second display
//! tick.

use chrono::{DateTime, TimeDelta, Utc};
use moonbeams_core::aggregate::AggregateRoot;
use moonbeams_core::clock::Clock;
use moonbeams_core::command::Command;
use moonbeams_core::schedule::{Schedule, WakeupHandle};
use tracing::{debug, info, trace};
use uuid::Uuid;

use crate::domain::aggregates::SleepTimer;
use crate::domain::commands::{CancelSleepTimer, SelectSleepDuration};
use crate::domain::countdown;
use crate::domain::events::{CancelReason, SessionEvent};

/// Wakeups owned by the timer controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerWakeup {
    /// The deadline has been reached.
    Expire,
    /// Refresh the countdown display.
    Tick,
}

/// Outcome of firing a timer wakeup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerFired {
    /// The display was refreshed.
    Ticked {
        /// Remaining time as `MM:SS`.
        remaining: String,
    },
    /// The countdown ran out.
    Expired,
}

/// Seconds between display ticks.
const TICK_SECONDS: i64 = 1;

/// The session timer controller.
#[derive(Debug)]
pub struct SleepTimerController {
    timer: SleepTimer,
    schedule: Schedule<TimerWakeup>,
    expiry: Option<WakeupHandle>,
    tick: Option<WakeupHandle>,
    display: Option<String>,
}

impl Default for SleepTimerController {
    fn default() -> Self {
        Self::new()
    }
}

impl SleepTimerController {
    /// Creates a controller with no timer armed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            timer: SleepTimer::new(Uuid::new_v4()),
            schedule: Schedule::new(),
            expiry: None,
            tick: None,
            display: None,
        }
    }

    /// The timer aggregate.
    #[must_use]
    pub fn timer(&self) -> &SleepTimer {
        &self.timer
    }

    /// The countdown shown to the listener; `None` when hidden.
    #[must_use]
    pub fn display(&self) -> Option<&str> {
        self.display.as_deref()
    }

    /// Deadline of the next timer wakeup.
    #[must_use]
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.schedule.next_deadline()
    }

    /// Deadlines of every scheduled expiry. At most one exists.
    #[must_use]
    pub fn pending_expiries(&self) -> Vec<DateTime<Utc>> {
        self.schedule
            .pending()
            .filter(|(_, kind)| **kind == TimerWakeup::Expire)
            .map(|(deadline, _)| deadline)
            .collect()
    }

    /// Drains the recorded timer events.
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        self.timer.take_uncommitted_events()
    }

    /// Handles `SelectSleepDuration`. Zero or no minutes disarms; anything
    /// else replaces the running countdown. Returns whether a timer is now
    /// armed.
    pub fn handle_arm(&mut self, command: &SelectSleepDuration, clock: &dyn Clock) -> bool {
        let minutes = match command.minutes {
            Some(minutes) if minutes > 0 => minutes,
            _ => {
                self.cancel(CancelReason::Disarmed, command.correlation_id, clock);
                return false;
            }
        };

        self.clear_wakeups();
        let now = clock.now();
        let deadline = self.timer.arm(minutes, command.correlation_id, clock);
        self.expiry = Some(self.schedule.schedule_at(deadline, TimerWakeup::Expire));
        self.tick = Some(self.schedule.schedule_after(
            now,
            TimeDelta::seconds(TICK_SECONDS),
            TimerWakeup::Tick,
        ));
        self.display = countdown::remaining_seconds(deadline, now).map(countdown::format_remaining);

        info!(
            command = command.command_type(),
            correlation_id = %command.correlation_id,
            minutes,
            %deadline,
            "sleep timer armed"
        );
        true
    }

    /// Handles `CancelSleepTimer`.
    pub fn handle_cancel(&mut self, command: &CancelSleepTimer, clock: &dyn Clock) -> bool {
        debug!(command = command.command_type(), "cancelling sleep timer");
        self.cancel(CancelReason::Requested, command.correlation_id, clock)
    }

    /// Cancels for `reason`: drops both wakeups and hides the display.
    /// Idempotent; returns whether a timer was armed.
    pub fn cancel(&mut self, reason: CancelReason, correlation_id: Uuid, clock: &dyn Clock) -> bool {
        self.clear_wakeups();
        self.display = None;
        let cancelled = self.timer.cancel(reason, correlation_id, clock);
        if cancelled {
            info!(%correlation_id, ?reason, "sleep timer cancelled");
        } else {
            debug!(?reason, "no sleep timer to cancel");
        }
        cancelled
    }

    /// Fires the earliest wakeup if it is due.
    pub fn fire_next_due(&mut self, clock: &dyn Clock) -> Option<TimerFired> {
        let now = clock.now();
        let due = self.schedule.pop_due(now)?;

        match due.kind {
            TimerWakeup::Expire => {
                self.expiry = None;
                Some(self.expire(clock))
            }
            TimerWakeup::Tick => {
                self.tick = None;
                let deadline = self.timer.deadline()?;
                let Some(seconds) = countdown::remaining_seconds(deadline, now) else {
                    return Some(self.expire(clock));
                };
                let remaining = countdown::format_remaining(seconds);
                trace!(%remaining, "sleep timer tick");
                self.display = Some(remaining.clone());
                self.tick = Some(self.schedule.schedule_after(
                    now,
                    TimeDelta::seconds(TICK_SECONDS),
                    TimerWakeup::Tick,
                ));
                Some(TimerFired::Ticked { remaining })
            }
        }
    }

    fn expire(&mut self, clock: &dyn Clock) -> TimerFired {
        self.clear_wakeups();
        self.display = None;
        self.timer.expire(clock);
        info!(correlation_id = %self.timer.armed_correlation_id(), "sleep timer expired");
        TimerFired::Expired
    }

    fn clear_wakeups(&mut self) {
        for handle in [self.expiry.take(), self.tick.take()].into_iter().flatten() {
            self.schedule.cancel(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use moonbeams_core::event::DomainEvent;
    use moonbeams_test_support::ManualClock;

    use super::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 20, 30, 0).unwrap()
    }

    fn arm(controller: &mut SleepTimerController, clock: &ManualClock, minutes: Option<u32>) -> bool {
        controller.handle_arm(
            &SelectSleepDuration {
                correlation_id: Uuid::new_v4(),
                minutes,
            },
            clock,
        )
    }

    fn drain(controller: &mut SleepTimerController, clock: &ManualClock) -> Vec<TimerFired> {
        std::iter::from_fn(|| controller.fire_next_due(clock)).collect()
    }

    #[test]
    fn test_rearming_leaves_single_expiry_at_latest_deadline() {
        // Arrange
        let clock = ManualClock::new(t0());
        let mut controller = SleepTimerController::new();

        // Act
        arm(&mut controller, &clock, Some(5));
        arm(&mut controller, &clock, Some(10));

        // Assert
        assert_eq!(controller.pending_expiries(), vec![t0() + TimeDelta::minutes(10)]);
        assert_eq!(controller.display(), Some("10:00"));
    }

    #[test]
    fn test_arm_zero_or_none_schedules_nothing() {
        let clock = ManualClock::new(t0());
        let mut controller = SleepTimerController::new();

        assert!(!arm(&mut controller, &clock, Some(0)));
        assert!(!arm(&mut controller, &clock, None));

        assert!(controller.next_deadline().is_none());
        assert!(controller.display().is_none());
        assert!(controller.take_events().is_empty());
    }

    #[test]
    fn test_arm_zero_disarms_running_timer() {
        let clock = ManualClock::new(t0());
        let mut controller = SleepTimerController::new();
        arm(&mut controller, &clock, Some(5));

        arm(&mut controller, &clock, Some(0));

        assert!(!controller.timer().is_armed());
        assert!(controller.next_deadline().is_none());
        assert!(controller.display().is_none());
    }

    #[test]
    fn test_tick_shows_one_second_left_just_before_deadline() {
        // Arrange
        let clock = ManualClock::new(t0());
        let mut controller = SleepTimerController::new();
        arm(&mut controller, &clock, Some(1));

        // Act
        clock.set(t0() + TimeDelta::seconds(59));
        let fired = drain(&mut controller, &clock);

        // Assert
        assert_eq!(
            fired,
            vec![TimerFired::Ticked {
                remaining: "00:01".into()
            }]
        );
        assert_eq!(controller.display(), Some("00:01"));
    }

    #[test]
    fn test_ticks_count_down_each_second() {
        let clock = ManualClock::new(t0());
        let mut controller = SleepTimerController::new();
        arm(&mut controller, &clock, Some(2));

        let mut shown = Vec::new();
        for _ in 0..3 {
            clock.advance(TimeDelta::seconds(1));
            for fired in drain(&mut controller, &clock) {
                if let TimerFired::Ticked { remaining } = fired {
                    shown.push(remaining);
                }
            }
        }

        assert_eq!(shown, vec!["01:59", "01:58", "01:57"]);
    }

    #[test]
    fn test_expires_exactly_once_just_after_deadline() {
        // Arrange
        let clock = ManualClock::new(t0());
        let mut controller = SleepTimerController::new();
        arm(&mut controller, &clock, Some(1));
        controller.take_events();

        // Act
        clock.set(t0() + TimeDelta::minutes(1) + TimeDelta::milliseconds(1));
        let fired = drain(&mut controller, &clock);
        clock.advance(TimeDelta::minutes(5));
        let later = drain(&mut controller, &clock);

        // Assert
        let expiries = fired.iter().filter(|f| **f == TimerFired::Expired).count();
        assert_eq!(expiries, 1);
        assert!(later.is_empty());
        assert!(controller.next_deadline().is_none());
        assert!(controller.display().is_none());
        assert!(!controller.timer().is_armed());

        let events = controller.take_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type(), "session.sleep_timer_expired");
    }

    #[test]
    fn test_late_tick_past_deadline_counts_as_expiry() {
        let clock = ManualClock::new(t0());
        let mut controller = SleepTimerController::new();
        arm(&mut controller, &clock, Some(1));
        // Leave only the tick scheduled.
        let expiry = controller.expiry.take().unwrap();
        controller.schedule.cancel(expiry);

        clock.set(t0() + TimeDelta::minutes(2));
        let fired = drain(&mut controller, &clock);

        assert_eq!(fired, vec![TimerFired::Expired]);
        assert!(!controller.timer().is_armed());
    }

    #[test]
    fn test_cancel_is_idempotent_and_hides_display() {
        let clock = ManualClock::new(t0());
        let mut controller = SleepTimerController::new();
        arm(&mut controller, &clock, Some(3));
        let command = CancelSleepTimer {
            correlation_id: Uuid::new_v4(),
        };

        assert!(controller.handle_cancel(&command, &clock));
        assert!(!controller.handle_cancel(&command, &clock));
        assert!(controller.display().is_none());
        assert!(controller.next_deadline().is_none());
    }
}
