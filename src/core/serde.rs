use serde::{Serialize, Serializer};
use std::time::{SystemTime, UNIX_EPOCH};

/// Serializes SystemTime as signed seconds relative to UNIX_EPOCH
pub fn serialize_time<S>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let secs = match time.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_secs_f64(),
        Err(e) => -e.duration().as_secs_f64(),
    };
    secs.serialize(serializer)
}

/// Serializes raw bytes as an uppercase hex string
pub fn serialize_hex<S, T>(bytes: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: AsRef<[u8]>,
{
    hex::encode_upper(bytes).serialize(serializer)
}
