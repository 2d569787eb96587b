//! Protocol implementation module
//!
//! This module defines the port agent packet framing: the message type
//! registry, the fixed header, the checksum, packet encoding, and the
//! stream assembler that recovers frames from arbitrary byte input.

pub mod checksum;
pub mod codec;
pub mod header;
pub mod message;
pub mod packet;
pub mod state;

pub use self::codec::PacketCodec;
pub use self::header::{pack, unpack, PacketHeader};
pub use self::message::{name_of, MessageType};
pub use self::packet::{Packet, PacketEncoder};
pub use self::state::{AssemblerStats, PacketAssembler, ScanState};
