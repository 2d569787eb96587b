//! Core types and constants for the port agent packet protocol
//!
//! This module contains the wire constants and the building blocks shared
//! by the timestamp and protocol modules.

pub mod error;
pub mod types;
pub mod serde;

pub use self::error::{Error, Result};
pub use self::types::{AssemblerConfig, VerifyMode};

/// Sync marker at the start of every frame
pub const SYNC: [u8; 3] = [0xA3, 0x9D, 0x7A];

/// Fixed header length in bytes, sync marker included
pub const HEADER_SIZE: usize = 16;

/// Largest frame the 16-bit size field can describe
pub const MAX_PACKET_SIZE: usize = u16::MAX as usize;

/// Largest payload a single frame can carry
pub const MAX_PAYLOAD_SIZE: usize = MAX_PACKET_SIZE - HEADER_SIZE;

/// Byte offset of the message type field
pub const MESSAGE_TYPE_OFFSET: usize = 3;

/// Byte offset of the packet size field
pub const PACKET_SIZE_OFFSET: usize = 4;

/// Byte offset of the checksum field
pub const CHECKSUM_OFFSET: usize = 6;

/// Byte offset of the timestamp field
pub const TIMESTAMP_OFFSET: usize = 8;

/// Width of the timestamp field
pub const TIMESTAMP_SIZE: usize = 8;
