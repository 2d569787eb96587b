use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};

/// Seconds between 1900-01-01 and 1970-01-01
pub const NTP_EPOCH_OFFSET: u64 = 2_208_988_800;

/// Scale of the fraction field (2^32 units per second)
const FRACTION_SCALE: u64 = 1 << 32;

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// NTP-style timestamp: whole seconds since 1900-01-01 and a binary fraction
/// of a second.
///
/// On the wire this is the seconds word followed by the fraction word, both
/// big-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct NtpTimestamp {
    /// Seconds since 1900-01-01 00:00:00 UTC
    pub seconds: u32,
    /// Fraction of a second in units of 2^-32 s
    pub fraction: u32,
}

impl NtpTimestamp {
    /// Creates a timestamp from its raw fields
    pub fn new(seconds: u32, fraction: u32) -> Self {
        NtpTimestamp { seconds, fraction }
    }

    /// Current system time
    pub fn now() -> Result<Self> {
        Self::from_system_time(SystemTime::now())
    }

    /// Converts a system time, truncating below 2^-32 s.
    ///
    /// Fails for instants outside the first NTP era (1900-01-01 through
    /// 2036-02-07).
    pub fn from_system_time(time: SystemTime) -> Result<Self> {
        let (unix_secs, nanos) = match time.duration_since(UNIX_EPOCH) {
            Ok(d) => (d.as_secs() as i128, d.subsec_nanos()),
            Err(e) => {
                // Pre-1970: floor the seconds so the fraction stays positive
                let d = e.duration();
                match d.subsec_nanos() {
                    0 => (-(d.as_secs() as i128), 0),
                    n => (-(d.as_secs() as i128) - 1, NANOS_PER_SEC as u32 - n),
                }
            }
        };

        let ntp_secs = unix_secs + NTP_EPOCH_OFFSET as i128;
        let seconds = u32::try_from(ntp_secs)
            .map_err(|_| Error::timestamp(format!("{} s is outside the NTP era", unix_secs)))?;
        let fraction = ((nanos as u64) << 32) / NANOS_PER_SEC;

        Ok(NtpTimestamp {
            seconds,
            fraction: fraction as u32,
        })
    }

    /// Converts to a system time, rounding the fraction to the nearest
    /// nanosecond.
    pub fn to_system_time(&self) -> Result<SystemTime> {
        let nanos = (self.fraction as u64 * NANOS_PER_SEC + FRACTION_SCALE / 2) >> 32;
        let unix_secs = self.seconds as i64 - NTP_EPOCH_OFFSET as i64;

        let time = if unix_secs >= 0 {
            UNIX_EPOCH.checked_add(Duration::new(unix_secs as u64, 0))
        } else {
            UNIX_EPOCH.checked_sub(Duration::from_secs(unix_secs.unsigned_abs()))
        };

        time.and_then(|t| t.checked_add(Duration::from_nanos(nanos)))
            .ok_or_else(|| Error::timestamp(format!("{} is not representable as a system time", self)))
    }

    /// Seconds since 1900-01-01 as a float, the way the port agent logs them
    pub fn as_f64(&self) -> f64 {
        self.seconds as f64 + self.fraction as f64 / FRACTION_SCALE as f64
    }

    /// Seconds relative to the Unix epoch (negative before 1970)
    pub fn unix_seconds(&self) -> f64 {
        self.as_f64() - NTP_EPOCH_OFFSET as f64
    }

    /// The 64-bit wire value rendered as 16 hex digits
    pub fn as_hex(&self) -> String {
        hex::encode_upper(self.to_bytes())
    }

    /// Big-endian wire form: seconds word then fraction word
    pub fn to_bytes(&self) -> [u8; 8] {
        let mut out = [0u8; 8];
        out[..4].copy_from_slice(&self.seconds.to_be_bytes());
        out[4..].copy_from_slice(&self.fraction.to_be_bytes());
        out
    }

    /// Parses the big-endian wire form
    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        NtpTimestamp {
            seconds: u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            fraction: u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
        }
    }

    /// UTC calendar time
    pub fn to_datetime(&self) -> Result<DateTime<Utc>> {
        Ok(DateTime::<Utc>::from(self.to_system_time()?))
    }

    /// Seconds elapsed between this timestamp and now
    pub fn elapsed(&self) -> Result<f64> {
        Ok(Self::now()?.as_f64() - self.as_f64())
    }
}

impl fmt::Display for NtpTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_ntp_epoch() {
        let ts = NtpTimestamp::default();
        let time = ts.to_system_time().unwrap();
        assert_eq!(time, UNIX_EPOCH - Duration::from_secs(NTP_EPOCH_OFFSET));
        assert_eq!(ts.to_datetime().unwrap().to_rfc3339(), "1900-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_unix_epoch() {
        let ts = NtpTimestamp::from_system_time(UNIX_EPOCH).unwrap();
        assert_eq!(ts, NtpTimestamp::new(NTP_EPOCH_OFFSET as u32, 0));
        assert_eq!(ts.unix_seconds(), 0.0);
    }

    #[test]
    fn test_half_second_fraction() {
        let time = UNIX_EPOCH + Duration::from_millis(1_500);
        let ts = NtpTimestamp::from_system_time(time).unwrap();
        assert_eq!(ts.seconds, NTP_EPOCH_OFFSET as u32 + 1);
        assert_eq!(ts.fraction, 0x8000_0000);
        assert_eq!(ts.to_system_time().unwrap(), time);
    }

    #[test]
    fn test_system_time_round_trip_is_exact_to_the_nanosecond() {
        let time = UNIX_EPOCH + Duration::new(1_700_000_000, 123_456_789);
        let ts = NtpTimestamp::from_system_time(time).unwrap();
        assert_eq!(ts.to_system_time().unwrap(), time);
    }

    #[test]
    fn test_pre_unix_epoch() {
        let time = UNIX_EPOCH - Duration::from_millis(250);
        let ts = NtpTimestamp::from_system_time(time).unwrap();
        assert_eq!(ts.seconds, NTP_EPOCH_OFFSET as u32 - 1);
        assert_eq!(ts.fraction, 0xC000_0000);
        assert_eq!(ts.to_system_time().unwrap(), time);
    }

    #[test]
    fn test_outside_era_is_an_error() {
        let before = UNIX_EPOCH - Duration::from_secs(NTP_EPOCH_OFFSET + 1);
        assert!(matches!(
            NtpTimestamp::from_system_time(before),
            Err(Error::Timestamp(_))
        ));

        let after = UNIX_EPOCH + Duration::from_secs(u32::MAX as u64);
        assert!(NtpTimestamp::from_system_time(after).is_err());
    }

    #[test]
    fn test_max_fraction_carries_into_seconds() {
        let ts = NtpTimestamp::new(NTP_EPOCH_OFFSET as u32, u32::MAX);
        let time = ts.to_system_time().unwrap();
        assert_eq!(time, UNIX_EPOCH + Duration::from_secs(1));
    }

    #[test]
    fn test_wire_bytes() {
        let ts = NtpTimestamp::new(0x0102_0304, 0xA0B0_C0D0);
        let bytes = ts.to_bytes();
        assert_eq!(bytes, [0x01, 0x02, 0x03, 0x04, 0xA0, 0xB0, 0xC0, 0xD0]);
        assert_eq!(NtpTimestamp::from_bytes(bytes), ts);
        assert_eq!(ts.as_hex(), "01020304A0B0C0D0");
    }

    #[test]
    fn test_as_f64() {
        let ts = NtpTimestamp::new(10, 0x4000_0000);
        assert_eq!(ts.as_f64(), 10.25);
        assert_eq!(ts.to_string(), "10.25");
    }

    #[test]
    fn test_now_and_elapsed() {
        let ts = NtpTimestamp::now().unwrap();
        let elapsed = ts.elapsed().unwrap();
        assert!(elapsed >= 0.0 && elapsed < 5.0);
    }
}
