#![doc = r#"
Conversion between ticks and seconds.

A [`TimeMap`] is a list of `(tick, seconds)` breakpoints, one for every tick at
which some event of the file sits. Queries that hit a breakpoint exactly are
answered from it; anything between two breakpoints is linearly interpolated.
Queries outside the first and last breakpoint return `None`.
"#]

use crate::{file::timing::Timing, message::DEFAULT_TEMPO_MICROS};
use alloc::vec::Vec;

/// One point of the tempo map
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Breakpoint {
    /// Absolute tick
    pub tick: i64,
    /// Seconds from the start of the file
    pub seconds: f64,
}

/// A breakpoint table built from every event of a file
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeMap {
    points: Vec<Breakpoint>,
}

/// What the builder needs to know about one event
#[derive(Debug, Clone, Copy)]
pub(crate) struct TimedItem {
    pub tick: i64,
    /// Microseconds per quarter note, if the event is a tempo message
    pub tempo: Option<u32>,
}

impl TimeMap {
    /// Build from events in playback order with absolute ticks.
    ///
    /// A breakpoint is recorded for the first event and whenever the tick
    /// advances. A tempo message takes effect after its own tick has been
    /// recorded. With SMPTE timing ticks have a fixed length and tempo
    /// messages are ignored.
    pub(crate) fn build(timing: &Timing, items: impl IntoIterator<Item = TimedItem>) -> Self {
        let fixed = timing
            .ticks_per_second()
            .map(|tps| 1. / tps.max(1) as f64);
        let tpq = timing.ticks_per_quarter_note().unwrap_or(1).max(1) as f64;
        let seconds_per_tick = |micros: u32| micros as f64 / 1_000_000. / tpq;

        let mut spt = fixed.unwrap_or_else(|| seconds_per_tick(DEFAULT_TEMPO_MICROS));
        let mut points: Vec<Breakpoint> = Vec::new();
        let mut last_tick = 0;
        let mut seconds = 0.;
        #[cfg(feature = "tracing")]
        let mut ignored = 0usize;

        for item in items {
            if points.is_empty() || item.tick > last_tick {
                seconds += (item.tick - last_tick) as f64 * spt;
                last_tick = item.tick;
                points.push(Breakpoint {
                    tick: item.tick,
                    seconds,
                });
            }
            if let Some(micros) = item.tempo {
                if fixed.is_none() {
                    spt = seconds_per_tick(micros);
                } else {
                    #[cfg(feature = "tracing")]
                    {
                        ignored += 1;
                    }
                }
            }
        }

        #[cfg(feature = "tracing")]
        if ignored > 0 {
            tracing::warn!(
                ignored,
                "Tempo messages ignored: the file uses SMPTE timing with a fixed tick length"
            );
        }
        Self { points }
    }

    /// The breakpoints in tick order
    pub fn breakpoints(&self) -> &[Breakpoint] {
        &self.points
    }

    /// True if no event was mapped
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Seconds at an absolute tick, or `None` outside the mapped range
    pub fn seconds_at(&self, tick: i64) -> Option<f64> {
        let index = match self.points.binary_search_by(|p| p.tick.cmp(&tick)) {
            Ok(i) => return Some(self.points[i].seconds),
            Err(i) => i,
        };
        if index == 0 || index >= self.points.len() {
            return None;
        }
        let (lo, hi) = (self.points[index - 1], self.points[index]);
        let fraction = (tick - lo.tick) as f64 / (hi.tick - lo.tick) as f64;
        Some(lo.seconds + fraction * (hi.seconds - lo.seconds))
    }

    /// Absolute tick at a time in seconds, or `None` outside the mapped range.
    ///
    /// Interpolated ticks are rounded to the nearest whole tick.
    pub fn tick_at(&self, seconds: f64) -> Option<i64> {
        if seconds.is_nan() {
            return None;
        }
        let index = match self
            .points
            .binary_search_by(|p| p.seconds.total_cmp(&seconds))
        {
            Ok(i) => return Some(self.points[i].tick),
            Err(i) => i,
        };
        if index == 0 || index >= self.points.len() {
            return None;
        }
        let (lo, hi) = (self.points[index - 1], self.points[index]);
        let span = hi.seconds - lo.seconds;
        if span <= 0. {
            return Some(lo.tick);
        }
        let fraction = (seconds - lo.seconds) / span;
        Some(lo.tick + (fraction * (hi.tick - lo.tick) as f64 + 0.5) as i64)
    }

    /// Seconds at the last breakpoint
    pub fn duration(&self) -> f64 {
        self.points.last().map(|p| p.seconds).unwrap_or(0.)
    }
}

#[cfg(test)]
fn item(tick: i64, tempo: Option<u32>) -> TimedItem {
    TimedItem { tick, tempo }
}

#[cfg(test)]
fn close(found: Option<f64>, expected: f64) -> bool {
    found.is_some_and(|s| (s - expected).abs() < 1e-9)
}

#[test]
fn default_tempo_and_interpolation() {
    let timing = Timing::new_ticks_per_quarter_note(480);
    let map = TimeMap::build(&timing, [item(0, Some(500_000)), item(480, None)]);

    assert_eq!(map.breakpoints().len(), 2);
    assert!(close(map.seconds_at(480), 0.5));
    assert!(close(map.seconds_at(240), 0.25));
    assert_eq!(map.seconds_at(481), None);
    assert_eq!(map.seconds_at(-1), None);
    assert_eq!(map.tick_at(0.25), Some(240));
    assert_eq!(map.tick_at(0.6), None);
}

#[test]
fn tempo_applies_after_its_tick() {
    let timing = Timing::new_ticks_per_quarter_note(100);
    // 120 bpm until tick 100, then 60 bpm
    let map = TimeMap::build(
        &timing,
        [item(0, None), item(100, Some(1_000_000)), item(200, None)],
    );
    assert!(close(map.seconds_at(100), 0.5));
    assert!(close(map.seconds_at(200), 1.5));
}

#[test]
fn smpte_timing_ignores_tempo() {
    let timing = Timing::milliseconds();
    let map = TimeMap::build(&timing, [item(0, Some(250_000)), item(1500, None)]);
    assert!(close(map.seconds_at(1500), 1.5));
}
