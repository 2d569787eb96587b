use serde::{Deserialize, Serialize};

use crate::core::{Error, Result, HEADER_SIZE};
use crate::time::TimestampFormat;

/// How the assembler treats a frame whose checksum does not match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyMode {
    /// Drop the frame and report a checksum mismatch to the caller
    #[default]
    Strict,
    /// Emit the frame anyway, flagged as failing verification
    Lenient,
}

/// Configuration for a packet assembler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblerConfig {
    /// Wire format of the header timestamp
    pub timestamp_format: TimestampFormat,
    /// Checksum policy
    pub verify: VerifyMode,
    /// Largest frame accepted; bigger frames are discarded like undersized ones
    pub max_packet_size: u16,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        AssemblerConfig {
            timestamp_format: TimestampFormat::Ntp,
            verify: VerifyMode::Strict,
            max_packet_size: u16::MAX,
        }
    }
}

impl AssemblerConfig {
    /// Lenient configuration for diagnostic tools that display every frame
    pub fn lenient() -> Self {
        AssemblerConfig {
            verify: VerifyMode::Lenient,
            ..Default::default()
        }
    }

    /// Checks that the configuration can describe at least an empty frame
    pub fn validate(&self) -> Result<()> {
        if (self.max_packet_size as usize) < HEADER_SIZE {
            return Err(Error::config(format!(
                "max_packet_size {} is smaller than the {}-byte header",
                self.max_packet_size, HEADER_SIZE
            )));
        }
        Ok(())
    }
}
