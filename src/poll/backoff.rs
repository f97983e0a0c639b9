use std::time::Duration;

const MINUTE: Duration = Duration::from_secs(60);

/// How a cycle ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Something changed and was reported
    Reported,
    /// Nothing changed
    Quiet,
    /// The cycle failed and the snapshot was rolled back
    Recovered,
}

/// Sleep interval that widens while nothing happens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backoff {
    base: Duration,
    step: Duration,
    ceiling: Duration,
    current: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Backoff::new(15 * MINUTE, 5 * MINUTE, 60 * MINUTE)
    }
}

impl Backoff {
    pub fn new(base: Duration, step: Duration, ceiling: Duration) -> Self {
        let ceiling = ceiling.max(base);
        Backoff {
            base,
            step,
            ceiling,
            current: base,
        }
    }

    pub fn current(&self) -> Duration {
        self.current
    }

    /// Interval to sleep after a cycle with `outcome`.
    ///
    /// Reporting sleeps the base interval and resets the current one to it, so
    /// the first quiet cycle after a report sleeps the base interval again
    /// (15, 15, 20, ...). Quiet and failed cycles sleep the current interval
    /// and widen the next one by one step, up to the ceiling.
    pub fn next_interval(&mut self, outcome: CycleOutcome) -> Duration {
        match outcome {
            CycleOutcome::Reported => {
                self.current = self.base;
                self.base
            }
            CycleOutcome::Quiet | CycleOutcome::Recovered => {
                let interval = self.current;
                self.current = (self.current + self.step).min(self.ceiling);
                interval
            }
        }
    }
}
