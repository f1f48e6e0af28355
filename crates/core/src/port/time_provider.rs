// Time Provider Port (for testability)

use chrono::NaiveDateTime;

/// Time provider interface (allows fixed clocks in tests)
pub trait TimeProvider: Send + Sync {
    /// Current local time, used for `creation_time` / `created_on` columns
    fn now(&self) -> NaiveDateTime;
}

/// System time provider (production)
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

/// Always returns the same instant
pub struct FixedTimeProvider(pub NaiveDateTime);

impl TimeProvider for FixedTimeProvider {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
