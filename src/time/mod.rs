//! Timestamp encoding for the packet header
//!
//! The header carries an 8-byte timestamp. Two producers in the field write
//! incompatible forms into those bytes:
//!
//! - NTP-style: a 32-bit seconds word counted from 1900-01-01 followed by a
//!   32-bit binary fraction of a second (the port agent's native form)
//! - Unix float: one big-endian IEEE-754 double holding seconds since
//!   1970-01-01
//!
//! Nothing in the bytes tells the two apart, so a [`TimestampCodec`] is built
//! for exactly one [`TimestampFormat`] and never guesses.
//!
//! # Examples
//!
//! ```
//! use port_agent_packet::time::{TimestampCodec, TimestampFormat};
//! use std::time::{Duration, UNIX_EPOCH};
//!
//! let codec = TimestampCodec::new(TimestampFormat::Ntp);
//! let time = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
//! let bytes = codec.encode(time).unwrap();
//! assert_eq!(codec.decode(bytes).unwrap(), time);
//! ```

mod ntp;

pub use self::ntp::{NtpTimestamp, NTP_EPOCH_OFFSET};

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};

/// Wire representation of the 8-byte timestamp field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampFormat {
    /// Seconds since 1900 and a 2^-32 s fraction, two big-endian u32 words
    #[default]
    Ntp,
    /// Seconds since 1970 as a big-endian f64
    UnixFloat,
}

/// Converts between header timestamp bytes and [`SystemTime`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimestampCodec {
    format: TimestampFormat,
}

impl TimestampCodec {
    /// Creates a codec fixed to one wire format
    pub fn new(format: TimestampFormat) -> Self {
        TimestampCodec { format }
    }

    /// Returns the wire format this codec reads and writes
    pub fn format(&self) -> TimestampFormat {
        self.format
    }

    /// Encodes an instant into the 8 header bytes
    pub fn encode(&self, time: SystemTime) -> Result<[u8; 8]> {
        match self.format {
            TimestampFormat::Ntp => Ok(NtpTimestamp::from_system_time(time)?.to_bytes()),
            TimestampFormat::UnixFloat => Ok(unix_seconds(time).to_be_bytes()),
        }
    }

    /// Decodes the 8 header bytes into an instant
    pub fn decode(&self, bytes: [u8; 8]) -> Result<SystemTime> {
        match self.format {
            TimestampFormat::Ntp => NtpTimestamp::from_bytes(bytes).to_system_time(),
            TimestampFormat::UnixFloat => from_unix_seconds(f64::from_be_bytes(bytes)),
        }
    }

    /// Seconds since the Unix epoch carried by the bytes, without building a
    /// [`SystemTime`]
    pub fn unix_seconds(&self, bytes: [u8; 8]) -> f64 {
        match self.format {
            TimestampFormat::Ntp => NtpTimestamp::from_bytes(bytes).unix_seconds(),
            TimestampFormat::UnixFloat => f64::from_be_bytes(bytes),
        }
    }

    /// The instant an all-zero timestamp field decodes to
    pub fn epoch(&self) -> SystemTime {
        match self.format {
            TimestampFormat::Ntp => UNIX_EPOCH - Duration::from_secs(NTP_EPOCH_OFFSET),
            TimestampFormat::UnixFloat => UNIX_EPOCH,
        }
    }
}

fn unix_seconds(time: SystemTime) -> f64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_secs_f64(),
        Err(e) => -e.duration().as_secs_f64(),
    }
}

fn from_unix_seconds(secs: f64) -> Result<SystemTime> {
    let magnitude = Duration::try_from_secs_f64(secs.abs())
        .map_err(|e| Error::timestamp(format!("invalid float timestamp {}: {}", secs, e)))?;

    let time = if secs >= 0.0 {
        UNIX_EPOCH.checked_add(magnitude)
    } else {
        UNIX_EPOCH.checked_sub(magnitude)
    };

    time.ok_or_else(|| Error::timestamp(format!("float timestamp {} out of range", secs)))
}

/// Utility functions for comparing timestamps
pub mod util {
    use std::time::{Duration, SystemTime};

    /// Absolute difference between two instants
    pub fn time_diff(a: SystemTime, b: SystemTime) -> Duration {
        a.duration_since(b).unwrap_or_else(|e| e.duration())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_format_is_ntp() {
        assert_eq!(TimestampCodec::default().format(), TimestampFormat::Ntp);
    }

    #[test]
    fn test_ntp_zero_bytes_decode_to_1900() {
        let codec = TimestampCodec::new(TimestampFormat::Ntp);
        let time = codec.decode([0; 8]).unwrap();
        assert_eq!(time, codec.epoch());
        assert_eq!(codec.unix_seconds([0; 8]), -(NTP_EPOCH_OFFSET as f64));
    }

    #[test]
    fn test_float_zero_bytes_decode_to_unix_epoch() {
        let codec = TimestampCodec::new(TimestampFormat::UnixFloat);
        assert_eq!(codec.decode([0; 8]).unwrap(), UNIX_EPOCH);
        assert_eq!(codec.epoch(), UNIX_EPOCH);
    }

    #[test]
    fn test_ntp_layout() {
        let codec = TimestampCodec::new(TimestampFormat::Ntp);
        let time = UNIX_EPOCH + Duration::from_millis(1_500);
        let bytes = codec.encode(time).unwrap();
        let seconds = (NTP_EPOCH_OFFSET + 1) as u32;
        assert_eq!(&bytes[..4], &seconds.to_be_bytes());
        assert_eq!(&bytes[4..], &[0x80, 0, 0, 0]);
        assert_eq!(codec.unix_seconds(bytes), 1.5);
    }

    #[test]
    fn test_float_layout() {
        let codec = TimestampCodec::new(TimestampFormat::UnixFloat);
        let time = UNIX_EPOCH + Duration::from_millis(1_700_000_000_500);
        let bytes = codec.encode(time).unwrap();
        assert_eq!(bytes, 1_700_000_000.5f64.to_be_bytes());
        assert_eq!(codec.decode(bytes).unwrap(), time);
    }

    #[test]
    fn test_float_round_trip_within_a_microsecond() {
        let codec = TimestampCodec::new(TimestampFormat::UnixFloat);
        let time = UNIX_EPOCH + Duration::new(1_700_000_000, 123_456_789);
        let decoded = codec.decode(codec.encode(time).unwrap()).unwrap();
        assert!(util::time_diff(decoded, time) < Duration::from_micros(1));
    }

    #[test]
    fn test_float_negative_seconds() {
        let codec = TimestampCodec::new(TimestampFormat::UnixFloat);
        let time = UNIX_EPOCH - Duration::from_secs(86_400);
        assert_eq!(codec.decode(codec.encode(time).unwrap()).unwrap(), time);
    }

    #[test]
    fn test_float_nan_is_an_error() {
        let codec = TimestampCodec::new(TimestampFormat::UnixFloat);
        let result = codec.decode(f64::NAN.to_be_bytes());
        assert!(matches!(result, Err(Error::Timestamp(_))));
        assert!(codec.decode(f64::INFINITY.to_be_bytes()).is_err());
    }

    #[test]
    fn test_ntp_out_of_era_is_an_error() {
        let codec = TimestampCodec::new(TimestampFormat::Ntp);
        let far_future = UNIX_EPOCH + Duration::from_secs(5_000_000_000);
        assert!(codec.encode(far_future).is_err());
    }

    #[test]
    fn test_time_diff_is_symmetric() {
        let a = UNIX_EPOCH + Duration::from_secs(10);
        let b = UNIX_EPOCH + Duration::from_secs(12);
        assert_eq!(util::time_diff(a, b), Duration::from_secs(2));
        assert_eq!(util::time_diff(b, a), Duration::from_secs(2));
    }

    #[test]
    fn test_format_serde_names() {
        let json = serde_json::to_string(&TimestampFormat::UnixFloat).unwrap();
        assert_eq!(json, "\"unix_float\"");
        let format: TimestampFormat = serde_json::from_str("\"ntp\"").unwrap();
        assert_eq!(format, TimestampFormat::Ntp);
    }
}
