use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, RwLock};

/// Source of "now" for every deadline and window decision. Handlers and
/// workers share one instance; tests swap in a controlled time instead of
/// sleeping through real minutes.
#[derive(Debug, Clone)]
pub enum Clock {
    System,
    Fixed(Arc<RwLock<DateTime<Utc>>>),
}

impl Clock {
    pub fn system() -> Self {
        Clock::System
    }

    pub fn fixed(at: DateTime<Utc>) -> Self {
        Clock::Fixed(Arc::new(RwLock::new(at)))
    }

    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(at) => *at.read().expect("clock lock poisoned"),
        }
    }

    /// No-op on the system clock.
    pub fn set(&self, to: DateTime<Utc>) {
        if let Clock::Fixed(at) = self {
            *at.write().expect("clock lock poisoned") = to;
        }
    }

    /// No-op on the system clock.
    pub fn advance(&self, by: Duration) {
        if let Clock::Fixed(at) = self {
            let mut guard = at.write().expect("clock lock poisoned");
            *guard = *guard + by;
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Clock::System
    }
}
