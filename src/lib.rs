//! Port agent packet protocol
//!
//! The port agent wraps instrument traffic in small binary frames: a 3-byte
//! sync marker, a fixed 16-byte header carrying the message type, frame
//! size, an XOR checksum and a timestamp, followed by an opaque payload.
//!
//! This library implements the framing contract only. Bytes can come from
//! any source; the [`protocol::PacketAssembler`] recovers frames from them,
//! and the [`protocol::PacketEncoder`] builds frames for sending.
//!
//! ```
//! use port_agent_packet::protocol::{MessageType, PacketAssembler, PacketEncoder};
//! use std::time::SystemTime;
//!
//! let frame = PacketEncoder::default()
//!     .encode(MessageType::DataFromInstrument, b"42.1C", SystemTime::now())
//!     .unwrap();
//!
//! let mut assembler = PacketAssembler::default();
//! let packets = assembler.feed(&frame);
//! assert_eq!(&packets[0].as_ref().unwrap().payload()[..], b"42.1C");
//! ```

pub mod core;
pub mod protocol;
pub mod time;
pub mod util;

// Re-export commonly used items
pub use crate::core::{AssemblerConfig, Error, Result, VerifyMode};
pub use crate::protocol::{MessageType, Packet, PacketAssembler, PacketCodec, PacketEncoder};
pub use crate::time::{TimestampCodec, TimestampFormat};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
