//! Time source for message timestamps.

use chrono::{DateTime, Local};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;

    /// Time of day formatted with a chrono format string.
    fn timestamp(&self, format: &str) -> String {
        self.now().format(format).to_string()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Local>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_fixed_clock_formats_time_of_day() {
        let at = Local.with_ymd_and_hms(2024, 5, 1, 15, 4, 5).unwrap();
        let clock = FixedClock(at);
        assert_eq!(clock.timestamp("%-I:%M:%S %p"), "3:04:05 PM");
        assert_eq!(clock.timestamp("%H:%M"), "15:04");
    }

    #[test]
    fn test_system_clock_advances() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
