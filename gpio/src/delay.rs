//! Blocking delay service used to honour the timing of bit-banged protocols.
use std::fmt::Debug;
use std::thread::sleep;
use std::time::Duration;

/// A blocking timer. Every call blocks the calling thread for at least the requested duration.
pub trait Delay: Debug {
    /// Sleeps for the given amount of microseconds.
    fn delay_us(&self, us: u32);

    /// Sleeps for the given amount of milliseconds.
    fn delay_ms(&self, ms: u32);

    /// Sleeps for a fraction of a second. Negative and NaN values are treated as zero.
    fn delay_secs(&self, secs: f32);
}

/// [Delay] implementation backed by [std::thread::sleep].
#[derive(Debug, Default, Copy, Clone)]
pub struct StdDelay;

impl Delay for StdDelay {
    fn delay_us(&self, us: u32) {
        sleep(Duration::from_micros(us as u64));
    }

    fn delay_ms(&self, ms: u32) {
        sleep(Duration::from_millis(ms as u64));
    }

    fn delay_secs(&self, secs: f32) {
        sleep(secs_to_duration(secs));
    }
}

pub(crate) fn secs_to_duration(secs: f32) -> Duration {
    if secs.is_nan() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f32(secs).unwrap_or(Duration::MAX)
}
