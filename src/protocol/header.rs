use bytes::{Buf, BufMut};
use serde::Serialize;

use crate::core::{Error, Result, HEADER_SIZE, MAX_PAYLOAD_SIZE, SYNC};
use crate::core::serde::serialize_hex;
use super::message::MessageType;

/// The fixed 16-byte frame header.
///
/// Layout, big-endian:
///
/// | Offset | Width | Field        |
/// |--------|-------|--------------|
/// | 0      | 3     | sync marker  |
/// | 3      | 1     | message type |
/// | 4      | 2     | packet size  |
/// | 6      | 2     | checksum     |
/// | 8      | 8     | timestamp    |
///
/// The message type is kept as the raw code so frames with an unmapped type
/// can still be carried and displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PacketHeader {
    /// Raw message type code
    pub message_type: u8,
    /// Total frame length, header included
    pub packet_size: u16,
    /// Checksum as stored in the frame
    pub checksum: u16,
    /// Raw timestamp bytes
    #[serde(serialize_with = "serialize_hex")]
    pub timestamp: [u8; 8],
}

impl PacketHeader {
    /// Builds a header for a payload of the given length
    pub fn new(
        message_type: MessageType,
        payload_len: usize,
        checksum: u16,
        timestamp: [u8; 8],
    ) -> Result<Self> {
        if payload_len > MAX_PAYLOAD_SIZE {
            return Err(Error::PayloadTooLarge {
                size: payload_len,
                max: MAX_PAYLOAD_SIZE,
            });
        }

        Ok(PacketHeader {
            message_type: message_type.code(),
            packet_size: (HEADER_SIZE + payload_len) as u16,
            checksum,
            timestamp,
        })
    }

    /// Parses a header, failing if the sync marker is not at offset 0.
    ///
    /// Field values are not range-checked here; see
    /// [`PacketHeader::payload_len`] and [`PacketHeader::kind`].
    pub fn parse(bytes: &[u8; HEADER_SIZE]) -> Result<Self> {
        let mut buf = &bytes[..];

        let mut sync = [0u8; 3];
        buf.copy_to_slice(&mut sync);
        if sync != SYNC {
            return Err(Error::InvalidSync { found: sync });
        }

        let message_type = buf.get_u8();
        let packet_size = buf.get_u16();
        let checksum = buf.get_u16();
        let mut timestamp = [0u8; 8];
        buf.copy_to_slice(&mut timestamp);

        Ok(PacketHeader {
            message_type,
            packet_size,
            checksum,
            timestamp,
        })
    }

    /// Appends the 16 header bytes to a buffer
    pub fn write_to<B: BufMut>(&self, dst: &mut B) {
        dst.put_slice(&SYNC);
        dst.put_u8(self.message_type);
        dst.put_u16(self.packet_size);
        dst.put_u16(self.checksum);
        dst.put_slice(&self.timestamp);
    }

    /// The 16 header bytes
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        self.write_to(&mut &mut out[..]);
        out
    }

    /// Payload length implied by the packet size.
    ///
    /// A packet size below the header length is a framing error.
    pub fn payload_len(&self) -> Result<usize> {
        (self.packet_size as usize)
            .checked_sub(HEADER_SIZE)
            .ok_or(Error::InvalidPacketSize {
                size: self.packet_size,
            })
    }

    /// Resolves the message type code
    pub fn kind(&self) -> Result<MessageType> {
        MessageType::try_from(self.message_type)
    }
}

/// Packs a header from its logical fields.
pub fn pack(
    message_type: MessageType,
    payload_len: usize,
    checksum: u16,
    timestamp: [u8; 8],
) -> Result<[u8; HEADER_SIZE]> {
    Ok(PacketHeader::new(message_type, payload_len, checksum, timestamp)?.to_bytes())
}

/// Unpacks a header from its 16 wire bytes.
pub fn unpack(bytes: &[u8; HEADER_SIZE]) -> Result<PacketHeader> {
    PacketHeader::parse(bytes)
}
