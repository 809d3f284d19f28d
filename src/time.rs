/*! Time structures.

The RPL engine never reads a clock itself. The caller hands it an [Instant] with every
inbound message, and the engine stores it where timestamps matter: neighbor cache
expiry and the DIO reception time used for latency measurement.

 - [Instant] is an absolute point in time.
 - [Duration] is a relative amount of time.

[Instant]: struct.Instant.html
[Duration]: struct.Duration.html
*/

use core::{fmt, ops};

/// An absolute time value, in microseconds since an arbitrary epoch such as system startup.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Instant {
    micros: i64,
}

impl Instant {
    pub const ZERO: Instant = Instant { micros: 0 };

    /// Create a new `Instant` from a number of microseconds.
    pub const fn from_micros(micros: i64) -> Instant {
        Instant { micros }
    }

    /// Create a new `Instant` from a number of milliseconds.
    pub const fn from_millis(millis: i64) -> Instant {
        Instant {
            micros: millis * 1000,
        }
    }

    /// Create a new `Instant` from a number of seconds.
    pub const fn from_secs(secs: i64) -> Instant {
        Instant {
            micros: secs * 1_000_000,
        }
    }

    /// The fractional number of milliseconds past the last whole second.
    pub const fn millis(&self) -> i64 {
        self.micros % 1_000_000 / 1000
    }

    /// The number of whole seconds since the epoch.
    pub const fn secs(&self) -> i64 {
        self.micros / 1_000_000
    }

    /// The total number of milliseconds since the epoch.
    pub const fn total_millis(&self) -> i64 {
        self.micros / 1000
    }

    pub const fn total_micros(&self) -> i64 {
        self.micros
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{:0>3}s", self.secs(), self.millis())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Instant {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}.{:03}s", self.secs(), self.millis());
    }
}

impl ops::Add<Duration> for Instant {
    type Output = Instant;

    fn add(self, rhs: Duration) -> Instant {
        Instant::from_micros(self.micros + rhs.total_micros() as i64)
    }
}

impl ops::AddAssign<Duration> for Instant {
    fn add_assign(&mut self, rhs: Duration) {
        self.micros += rhs.total_micros() as i64;
    }
}

impl ops::Sub<Instant> for Instant {
    type Output = Duration;

    fn sub(self, rhs: Instant) -> Duration {
        Duration::from_micros((self.micros - rhs.micros).unsigned_abs())
    }
}

/// A relative amount of time.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Duration {
    micros: u64,
}

impl Duration {
    pub const ZERO: Duration = Duration::from_micros(0);

    /// Create a new `Duration` from a number of microseconds.
    pub const fn from_micros(micros: u64) -> Duration {
        Duration { micros }
    }

    /// Create a new `Duration` from a number of milliseconds.
    pub const fn from_millis(millis: u64) -> Duration {
        Duration {
            micros: millis * 1000,
        }
    }

    /// Create a new `Duration` from a number of seconds.
    pub const fn from_secs(secs: u64) -> Duration {
        Duration {
            micros: secs * 1_000_000,
        }
    }

    /// The number of whole seconds in this `Duration`.
    pub const fn secs(&self) -> u64 {
        self.micros / 1_000_000
    }

    pub const fn total_millis(&self) -> u64 {
        self.micros / 1000
    }

    pub const fn total_micros(&self) -> u64 {
        self.micros
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{:03}s", self.secs(), self.total_millis() % 1000)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Duration {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}.{:03}s", self.secs(), self.total_millis() % 1000);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn instant_arithmetic() {
        let start = Instant::from_secs(10);
        let later = start + Duration::from_millis(1500);

        assert_eq!(later.total_millis(), 11_500);
        assert_eq!(later - start, Duration::from_millis(1500));
        assert_eq!(start - later, Duration::from_millis(1500));
    }

    #[test]
    fn display() {
        assert_eq!(format!("{}", Instant::from_millis(5674)), "5.674s");
        assert_eq!(format!("{}", Duration::from_millis(30_020)), "30.020s");
    }
}
