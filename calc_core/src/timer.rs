//! # Stopwatch & Countdown
//!
//! Time-keeping state machines. Callers pass the current [`Instant`] into
//! every transition so behaviour is deterministic under test.

use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Hours, minutes, seconds and hundredths of a duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockReading {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    pub centis: u64,
}

impl From<Duration> for ClockReading {
    fn from(duration: Duration) -> Self {
        let millis = duration.as_millis() as u64;
        ClockReading {
            hours: millis / 3_600_000,
            minutes: (millis / 60_000) % 60,
            seconds: (millis / 1000) % 60,
            centis: (millis % 1000) / 10,
        }
    }
}

impl fmt::Display for ClockReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}.{:02}",
            self.hours, self.minutes, self.seconds, self.centis
        )
    }
}

/// One recorded lap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lap {
    /// 1-based
    pub number: usize,
    /// Time since the previous lap
    pub split: Duration,
    /// Time since the stopwatch started
    pub total: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct Stopwatch {
    running_since: Option<Instant>,
    accumulated: Duration,
    laps: Vec<Duration>,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    /// No-op if already running.
    pub fn start(&mut self, now: Instant) {
        if self.running_since.is_none() {
            self.running_since = Some(now);
        }
    }

    /// No-op if already paused.
    pub fn pause(&mut self, now: Instant) {
        if let Some(since) = self.running_since.take() {
            self.accumulated += now.saturating_duration_since(since);
        }
    }

    pub fn toggle(&mut self, now: Instant) {
        if self.is_running() {
            self.pause(now);
        } else {
            self.start(now);
        }
    }

    /// Stop and clear elapsed time and laps.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        self.accumulated
            + self
                .running_since
                .map_or(Duration::ZERO, |since| now.saturating_duration_since(since))
    }

    /// Record a lap. Laps are only taken while running.
    pub fn lap(&mut self, now: Instant) -> Option<Lap> {
        if !self.is_running() {
            return None;
        }
        self.laps.push(self.elapsed(now));
        self.laps().pop()
    }

    pub fn laps(&self) -> Vec<Lap> {
        let mut previous = Duration::ZERO;
        self.laps
            .iter()
            .enumerate()
            .map(|(i, &total)| {
                let lap = Lap {
                    number: i + 1,
                    split: total.saturating_sub(previous),
                    total,
                };
                previous = total;
                lap
            })
            .collect()
    }
}

/// A countdown of fixed length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    duration: Duration,
}

impl Countdown {
    pub fn from_hms(hours: u64, minutes: u64, seconds: u64) -> CalcResult<Self> {
        let total = hours
            .checked_mul(3600)
            .and_then(|h| minutes.checked_mul(60).and_then(|m| h.checked_add(m)))
            .and_then(|hm| hm.checked_add(seconds))
            .ok_or_else(|| CalcError::invalid_input("duration", format!("{}h {}m {}s", hours, minutes, seconds), "Duration is too long"))?;
        if total == 0 {
            return Err(CalcError::invalid_input("duration", "0", "Timer duration must be greater than zero"));
        }
        Ok(Countdown {
            duration: Duration::from_secs(total),
        })
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn remaining(&self, elapsed: Duration) -> Duration {
        self.duration.saturating_sub(elapsed)
    }

    pub fn is_finished(&self, elapsed: Duration) -> bool {
        elapsed >= self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_clock_reading_format() {
        assert_eq!(ClockReading::from(ms(0)).to_string(), "00:00:00.00");
        assert_eq!(ClockReading::from(ms(3_723_456)).to_string(), "01:02:03.45");
        assert_eq!(ClockReading::from(ms(100 * 3_600_000)).to_string(), "100:00:00.00");
    }

    #[test]
    fn test_stopwatch_start_pause_resume() {
        let t0 = Instant::now();
        let mut sw = Stopwatch::new();
        assert_eq!(sw.elapsed(t0), Duration::ZERO);

        sw.start(t0);
        assert!(sw.is_running());
        assert_eq!(sw.elapsed(t0 + ms(1500)), ms(1500));

        sw.pause(t0 + ms(2000));
        assert!(!sw.is_running());
        assert_eq!(sw.elapsed(t0 + ms(9000)), ms(2000));

        sw.toggle(t0 + ms(10_000));
        assert_eq!(sw.elapsed(t0 + ms(10_500)), ms(2500));
    }

    #[test]
    fn test_stopwatch_laps() {
        let t0 = Instant::now();
        let mut sw = Stopwatch::new();
        assert!(sw.lap(t0).is_none());

        sw.start(t0);
        let first = sw.lap(t0 + ms(1000)).unwrap();
        assert_eq!(first.number, 1);
        assert_eq!(first.split, ms(1000));

        let second = sw.lap(t0 + ms(2500)).unwrap();
        assert_eq!(second.number, 2);
        assert_eq!(second.split, ms(1500));
        assert_eq!(second.total, ms(2500));

        sw.pause(t0 + ms(3000));
        assert!(sw.lap(t0 + ms(4000)).is_none());
        assert_eq!(sw.laps().len(), 2);
    }

    #[test]
    fn test_stopwatch_reset() {
        let t0 = Instant::now();
        let mut sw = Stopwatch::new();
        sw.start(t0);
        sw.lap(t0 + ms(100));
        sw.reset();
        assert!(!sw.is_running());
        assert!(sw.laps().is_empty());
        assert_eq!(sw.elapsed(t0 + ms(500)), Duration::ZERO);
    }

    #[test]
    fn test_countdown() {
        let timer = Countdown::from_hms(0, 1, 30).unwrap();
        assert_eq!(timer.duration(), Duration::from_secs(90));
        assert_eq!(timer.remaining(Duration::from_secs(30)), Duration::from_secs(60));
        assert!(!timer.is_finished(Duration::from_secs(89)));
        assert_eq!(timer.remaining(Duration::from_secs(120)), Duration::ZERO);
        assert!(timer.is_finished(Duration::from_secs(90)));
    }

    #[test]
    fn test_countdown_rejects_zero() {
        assert!(Countdown::from_hms(0, 0, 0).is_err());
        assert!(Countdown::from_hms(u64::MAX, 1, 0).is_err());
    }
}
