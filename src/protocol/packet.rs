use std::fmt::{self, Write};
use std::time::SystemTime;

use bytes::{Bytes, BytesMut};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::core::serde::{serialize_hex, serialize_time};
use crate::core::{Error, Result, HEADER_SIZE, SYNC};
use crate::time::{NtpTimestamp, TimestampCodec, TimestampFormat};
use crate::util;
use super::checksum;
use super::header::PacketHeader;
use super::message::MessageType;

/// One complete protocol frame.
///
/// Packets are immutable once built, either by [`PacketEncoder`] or by the
/// assembler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Packet {
    header: PacketHeader,
    #[serde(serialize_with = "serialize_time")]
    timestamp: SystemTime,
    #[serde(serialize_with = "serialize_hex")]
    payload: Bytes,
}

impl Packet {
    pub(crate) fn from_parts(header: PacketHeader, timestamp: SystemTime, payload: Bytes) -> Self {
        Packet {
            header,
            timestamp,
            payload,
        }
    }

    /// The decoded header fields
    pub fn header(&self) -> &PacketHeader {
        &self.header
    }

    /// Resolved message type, or the raw code if it is not registered
    pub fn message_type(&self) -> Result<MessageType> {
        self.header.kind()
    }

    /// Raw message type code
    pub fn message_code(&self) -> u8 {
        self.header.message_type
    }

    /// Total frame length, header included
    pub fn packet_size(&self) -> u16 {
        self.header.packet_size
    }

    /// Checksum as stored in the frame
    pub fn checksum(&self) -> u16 {
        self.header.checksum
    }

    /// Instant carried in the header
    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    /// Raw header timestamp bytes
    pub fn raw_timestamp(&self) -> [u8; 8] {
        self.header.timestamp
    }

    /// The payload bytes
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Payload length in bytes
    pub fn payload_size(&self) -> usize {
        self.payload.len()
    }

    /// The full wire frame
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(HEADER_SIZE + self.payload.len());
        self.header.write_to(&mut buf);
        buf.extend_from_slice(&self.payload);
        buf.freeze()
    }

    /// Checksum recomputed over the frame
    pub fn computed_checksum(&self) -> u16 {
        checksum::compute(&self.to_bytes())
    }

    /// Returns true if the stored checksum matches the frame contents
    pub fn checksum_valid(&self) -> bool {
        self.computed_checksum() == self.header.checksum
    }

    /// Checks the stored checksum.
    ///
    /// The checksum is an 8-bit XOR fold and only detects accidental
    /// corruption.
    pub fn verify(&self) -> Result<()> {
        let actual = self.computed_checksum();
        if actual != self.header.checksum {
            return Err(Error::ChecksumMismatch {
                expected: self.header.checksum,
                actual,
            });
        }
        Ok(())
    }

    /// Payload as text, when it is entirely ASCII
    pub fn payload_text(&self) -> Option<&str> {
        if self.payload.is_ascii() {
            std::str::from_utf8(&self.payload).ok()
        } else {
            None
        }
    }

    /// One-line description in the data-log decoder's format
    pub fn summary(&self) -> String {
        let name = self.message_type().map(MessageType::name).unwrap_or("UNKNOWN");
        let date = DateTime::<Utc>::from(self.timestamp).format("%a %b %e %H:%M:%S %Y");
        format!(
            "MsgType={} ({}), DataSize={}, TimeStamp={} ({})",
            self.message_code(),
            name,
            self.payload_size(),
            hex::encode_upper(self.header.timestamp),
            date
        )
    }

    /// The payload wrapped in a `port_agent_packet` element
    pub fn as_ascii(&self) -> String {
        format!(
            "<port_agent_packet type=\"{}\" time=\"{}\">{}</port_agent_packet>\n\r",
            self.type_label(),
            self.time_number(),
            String::from_utf8_lossy(&self.payload)
        )
    }

    /// Multi-line dump of the header and payload for logs
    pub fn pretty(&self) -> String {
        let frame = self.to_bytes();
        let mut out = String::new();

        let _ = writeln!(out);
        let _ = writeln!(out, "Sync: 0x{}", hex::encode(SYNC));
        let _ = writeln!(out, "Type: {} ({})", self.message_code(), self.type_label());
        let _ = writeln!(out, "Size: {}", self.packet_size());
        let _ = writeln!(out, "Checksum: {:x}", self.checksum());
        let _ = writeln!(out, "Timestamp: {}", self.time_number());
        let _ = writeln!(out, "Payload (ascii): ");
        let _ = writeln!(out, "{}", util::printable(&self.payload));
        let _ = writeln!(out, "Payload (hex): {}", util::hex_lines(&self.payload, HEADER_SIZE));
        let _ = write!(out, "Full Packet (hex): {}", util::hex_lines(&frame, 0));
        out
    }

    fn type_label(&self) -> &'static str {
        self.message_type().map(MessageType::label).unwrap_or("UNKNOWN")
    }

    // NTP seconds when representable, like the port agent logs them
    fn time_number(&self) -> String {
        match NtpTimestamp::from_system_time(self.timestamp) {
            Ok(ts) => ts.to_string(),
            Err(_) => hex::encode_upper(self.header.timestamp),
        }
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

/// Builds wire frames
#[derive(Debug, Clone, Copy, Default)]
pub struct PacketEncoder {
    timestamps: TimestampCodec,
}

impl PacketEncoder {
    /// Creates an encoder writing timestamps in the given format
    pub fn new(format: TimestampFormat) -> Self {
        PacketEncoder {
            timestamps: TimestampCodec::new(format),
        }
    }

    /// Timestamp codec used for the header field
    pub fn timestamp_codec(&self) -> TimestampCodec {
        self.timestamps
    }

    /// Builds a packet value
    pub fn build(&self, kind: MessageType, payload: &[u8], timestamp: SystemTime) -> Result<Packet> {
        let raw_timestamp = self.timestamps.encode(timestamp)?;
        let mut header = PacketHeader::new(kind, payload.len(), 0, raw_timestamp)?;

        let mut frame = BytesMut::with_capacity(header.packet_size as usize);
        header.write_to(&mut frame);
        frame.extend_from_slice(payload);
        header.checksum = checksum::seal(&mut frame);

        debug!(
            kind = kind.name(),
            size = header.packet_size,
            checksum = header.checksum,
            "Built packet"
        );

        let payload = frame.freeze().slice(HEADER_SIZE..);
        let timestamp = self.timestamps.decode(raw_timestamp)?;
        Ok(Packet::from_parts(header, timestamp, payload))
    }

    /// Builds a complete wire frame ready for transmission
    pub fn encode(&self, kind: MessageType, payload: &[u8], timestamp: SystemTime) -> Result<Bytes> {
        Ok(self.build(kind, payload, timestamp)?.to_bytes())
    }

    /// Builds an empty-payload heartbeat frame
    pub fn heartbeat(&self, timestamp: SystemTime) -> Result<Bytes> {
        self.encode(MessageType::Heartbeat, &[], timestamp)
    }
}
