// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Frequency governing for the engine's loops.
//!
//! A [`FrequencyGovernor`] measures how many iterations its owning loop
//! completes per second and advertises the deadline the loop should pace
//! itself against. The governor never blocks: sleeping (or not sleeping,
//! when the target is 0) is the owning loop's responsibility, which keeps
//! the frame loop and the input loop independently paced without the
//! governor knowing anything about threads.

use std::time::{Duration, Instant};

/// Rate limiter and measurer for a single loop.
///
/// One instance per loop; never share a governor for writes across loops.
#[derive(Debug, Clone)]
pub struct FrequencyGovernor {
    target: u32,
    rate: u32,
    count: u32,
    window_start: Instant,
    next_deadline: Option<Instant>,
}

impl FrequencyGovernor {
    /// Creates a governor with the given target iterations per second.
    ///
    /// A target of 0 means unlimited: no deadline is advertised and the
    /// owning loop must not block between iterations.
    ///
    /// ## Returns
    /// A new governor with no measurement window open; call [`start`]
    /// before the first iteration.
    ///
    /// [`start`]: FrequencyGovernor::start
    pub fn new(target: u32) -> Self {
        Self {
            target,
            rate: 0,
            count: 0,
            window_start: Instant::now(),
            next_deadline: None,
        }
    }

    /// Resets the measurement window.
    pub fn start(&mut self) {
        self.start_at(Instant::now());
    }

    pub(crate) fn start_at(&mut self, now: Instant) {
        self.count = 0;
        self.rate = 0;
        self.window_start = now;
        self.next_deadline = self.period().map(|p| now + p);
    }

    /// Records one completed loop iteration.
    ///
    /// Call this once per iteration after the useful work is done. When at
    /// least one whole second has elapsed since the window start, the
    /// iteration counter is published as the measured [`rate`] and the
    /// window advances by whole seconds (not to "now", which would let
    /// drift accumulate).
    ///
    /// [`rate`]: FrequencyGovernor::rate
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    pub(crate) fn tick_at(&mut self, now: Instant) {
        self.count += 1;

        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed >= Duration::from_secs(1) {
            self.rate = self.count;
            self.count = 0;
            self.window_start += Duration::from_secs(elapsed.as_secs());
            log::trace!("governor window closed: {} iterations/s", self.rate);
        }

        if let Some(period) = self.period() {
            // Each iteration consumes one period slot; if the loop has
            // fallen more than a period behind, snap forward instead of
            // trying to catch up with a burst.
            let base = match self.next_deadline {
                Some(deadline) if deadline + period > now => deadline,
                _ => now,
            };
            self.next_deadline = Some(base + period);
        } else {
            self.next_deadline = None;
        }
    }

    /// Changes the target iterations per second.
    ///
    /// Takes effect on the next iteration; the measured rate is not reset.
    pub fn set_target(&mut self, target: u32) {
        if target != self.target {
            log::debug!("governor target changed: {} -> {}", self.target, target);
        }
        self.target = target;
        if target == 0 {
            self.next_deadline = None;
        }
    }

    /// The desired iterations per second (0 = unlimited).
    pub fn target(&self) -> u32 {
        self.target
    }

    /// Iterations measured in the last completed one-second window.
    pub fn rate(&self) -> u32 {
        self.rate
    }

    /// The instant the owning loop should wait for before its next
    /// iteration, or `None` when the target is 0 (busy mode).
    pub fn next_deadline(&self) -> Option<Instant> {
        self.next_deadline
    }

    fn period(&self) -> Option<Duration> {
        (self.target > 0).then(|| Duration::from_secs(1) / self.target)
    }
}

impl Default for FrequencyGovernor {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    /// The measured rate equals the number of ticks once a full simulated
    /// second has elapsed with no intervening start().
    #[test]
    fn rate_counts_ticks_in_window() {
        let t0 = Instant::now();
        let mut governor = FrequencyGovernor::new(0);
        governor.start_at(t0);
        assert_eq!(governor.rate(), 0, "No measurement exists before a window closes");

        for i in 1..=4 {
            governor.tick_at(t0 + ms(i * 200));
            assert_eq!(governor.rate(), 0);
        }
        governor.tick_at(t0 + ms(1000));
        assert_eq!(governor.rate(), 5, "All five ticks land in the first window");
    }

    /// start() discards the previous measurement entirely.
    #[test]
    fn start_resets_measurement() {
        let t0 = Instant::now();
        let mut governor = FrequencyGovernor::new(0);
        governor.start_at(t0);
        for i in 1..=3 {
            governor.tick_at(t0 + ms(i * 400));
        }
        assert_eq!(governor.rate(), 3);

        let t1 = t0 + ms(2000);
        governor.start_at(t1);
        assert_eq!(governor.rate(), 0, "Rate resets on start");
        governor.tick_at(t1 + ms(1100));
        assert_eq!(governor.rate(), 1);
    }

    /// The window start advances by whole seconds, never to "now".
    #[test]
    fn window_advances_whole_seconds() {
        let t0 = Instant::now();
        let mut governor = FrequencyGovernor::new(0);
        governor.start_at(t0);

        governor.tick_at(t0 + ms(2500));
        assert_eq!(governor.window_start, t0 + ms(2000));
    }

    /// Changing the target mid-run does not disturb the measured rate.
    #[test]
    fn target_change_preserves_rate() {
        let t0 = Instant::now();
        let mut governor = FrequencyGovernor::new(60);
        governor.start_at(t0);
        for i in 1..=6 {
            governor.tick_at(t0 + ms(i * 170));
        }
        let measured = governor.rate();
        assert_eq!(measured, 6);

        governor.set_target(120);
        assert_eq!(governor.rate(), measured);
        assert_eq!(governor.target(), 120);
    }

    /// An unlimited governor never advertises a deadline.
    #[test]
    fn zero_target_has_no_deadline() {
        let t0 = Instant::now();
        let mut governor = FrequencyGovernor::new(0);
        governor.start_at(t0);
        governor.tick_at(t0 + ms(5));
        assert!(governor.next_deadline().is_none());

        // Dropping the target to 0 mid-run clears a pending deadline.
        let mut paced = FrequencyGovernor::new(100);
        paced.start_at(t0);
        paced.tick_at(t0 + ms(5));
        assert!(paced.next_deadline().is_some());
        paced.set_target(0);
        assert!(paced.next_deadline().is_none());
    }

    /// A paced governor advances its deadline one period per iteration.
    #[test]
    fn deadline_advances_one_period_per_tick() {
        let t0 = Instant::now();
        let mut governor = FrequencyGovernor::new(100); // 10 ms period
        governor.start_at(t0);
        assert_eq!(governor.next_deadline(), Some(t0 + ms(10)));

        governor.tick_at(t0 + ms(4));
        assert_eq!(governor.next_deadline(), Some(t0 + ms(20)));
    }

    /// A loop that has fallen behind snaps to "now + period" instead of
    /// bursting to catch up.
    #[test]
    fn deadline_snaps_forward_when_behind() {
        let t0 = Instant::now();
        let mut governor = FrequencyGovernor::new(100); // 10 ms period
        governor.start_at(t0);

        governor.tick_at(t0 + ms(50));
        assert_eq!(governor.next_deadline(), Some(t0 + ms(60)));
    }
}
