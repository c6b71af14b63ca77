//! Near-time timestamp provider.

use chrono::{Duration, Utc};
use rand::Rng;
use std::io::Write;

/// Look-back window for date fields, in seconds.
pub const NEAR_TIME_WINDOW_SECS: i64 = 3600;

/// Layout shared by every generated date: RFC 3339, microseconds, UTC.
pub const TIME_LAYOUT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// Write a UTC timestamp up to `window_secs` seconds before now.
///
/// This is NOT deterministic: the result depends on the wall clock.
pub fn write_near_time<R: Rng>(
    rng: &mut R,
    window_secs: i64,
    buf: &mut Vec<u8>,
) -> std::io::Result<()> {
    let offset = rng.random_range(0..window_secs.max(1));
    let time = Utc::now() - Duration::seconds(offset);
    write!(buf, "{}", time.format(TIME_LAYOUT))
}
