mod backoff;
mod scheduler;

pub use backoff::{Backoff, CycleOutcome};
pub use scheduler::{Clock, PollSettings, Poller, SystemClock};
