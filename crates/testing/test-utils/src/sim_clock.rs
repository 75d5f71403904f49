use chrono::{DateTime, Utc};
use concepts::time::ClockFn;
use std::{sync::Arc, time::Duration};
use tracing::info;

/// Clock frozen at a single instant.
#[derive(Clone, Copy, Debug)]
pub struct ConstClock(pub DateTime<Utc>);

impl ClockFn for ConstClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Clock that only moves when a test moves it.
#[derive(Clone)]
pub struct SimClock {
    current_time: Arc<std::sync::Mutex<DateTime<Utc>>>,
}

impl SimClock {
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            current_time: Arc::new(std::sync::Mutex::new(now)),
        }
    }

    /// Called by a test to move the time forward.
    pub fn move_time_forward(&self, duration: Duration) {
        let mut guard = self.current_time.lock().unwrap();
        let old = *guard;
        let new = old + duration;
        *guard = new;
        info!("Set clock from `{old}` to `{new}`");
    }
}

impl ClockFn for SimClock {
    fn now(&self) -> DateTime<Utc> {
        *self.current_time.lock().unwrap()
    }
}
