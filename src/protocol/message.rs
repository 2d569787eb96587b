use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};

/// Packet kinds carried in the message type byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum MessageType {
    /// Raw data read from the instrument
    DataFromInstrument = 1,
    /// Data written by the driver towards the instrument
    DataFromDriver = 2,
    /// Command addressed to the port agent itself
    PortAgentCommand = 3,
    /// Port agent status report
    PortAgentStatus = 4,
    /// Port agent fault report
    PortAgentFault = 5,
    /// Command forwarded to the instrument
    InstrumentCommand = 6,
    /// Keep-alive with an empty payload
    Heartbeat = 7,
    /// Instrument data wrapped in a pickled envelope
    PickledDataFromInstrument = 8,
    /// Driver data wrapped in a pickled envelope
    PickledDataFromDriver = 9,
}

impl MessageType {
    /// Every known type, in code order
    pub const ALL: [MessageType; 9] = [
        MessageType::DataFromInstrument,
        MessageType::DataFromDriver,
        MessageType::PortAgentCommand,
        MessageType::PortAgentStatus,
        MessageType::PortAgentFault,
        MessageType::InstrumentCommand,
        MessageType::Heartbeat,
        MessageType::PickledDataFromInstrument,
        MessageType::PickledDataFromDriver,
    ];

    /// Looks up a wire code, `None` for anything outside 1–9
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1..=9 => Some(Self::ALL[code as usize - 1]),
            _ => None,
        }
    }

    /// The wire code
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Human-readable name, as the data-log decoder prints it
    pub fn name(self) -> &'static str {
        match self {
            MessageType::DataFromInstrument => "Data From Instrument",
            MessageType::DataFromDriver => "Data From Driver",
            MessageType::PortAgentCommand => "Port Agent Command",
            MessageType::PortAgentStatus => "Port Agent Status",
            MessageType::PortAgentFault => "Port Agent Fault",
            MessageType::InstrumentCommand => "Instrument Command",
            MessageType::Heartbeat => "Heartbeat",
            MessageType::PickledDataFromInstrument => "Pickled Data From Instrument",
            MessageType::PickledDataFromDriver => "Pickled Data From Driver",
        }
    }

    /// Upper-case label used in ASCII envelopes
    pub fn label(self) -> &'static str {
        match self {
            MessageType::DataFromInstrument => "DATA_FROM_INSTRUMENT",
            MessageType::DataFromDriver => "DATA_FROM_DRIVER",
            MessageType::PortAgentCommand => "PORT_AGENT_COMMAND",
            MessageType::PortAgentStatus => "PORT_AGENT_STATUS",
            MessageType::PortAgentFault => "PORT_AGENT_FAULT",
            MessageType::InstrumentCommand => "INSTRUMENT_COMMAND",
            MessageType::Heartbeat => "PORT_AGENT_HEARTBEAT",
            MessageType::PickledDataFromInstrument => "PICKLED_DATA_FROM_INSTRUMENT",
            MessageType::PickledDataFromDriver => "PICKLED_DATA_FROM_DRIVER",
        }
    }
}

impl TryFrom<u8> for MessageType {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self> {
        MessageType::from_code(code).ok_or(Error::UnknownMessageType(code))
    }
}

impl From<MessageType> for u8 {
    fn from(kind: MessageType) -> u8 {
        kind.code()
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Name registered for a wire code.
///
/// Unmapped codes come back as [`Error::UnknownMessageType`] carrying the raw
/// value.
pub fn name_of(code: u8) -> Result<&'static str> {
    MessageType::try_from(code).map(MessageType::name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip() {
        for (i, kind) in MessageType::ALL.iter().enumerate() {
            assert_eq!(kind.code() as usize, i + 1);
            assert_eq!(MessageType::from_code(kind.code()), Some(*kind));
        }
    }

    #[test]
    fn test_names() {
        assert_eq!(name_of(1).unwrap(), "Data From Instrument");
        assert_eq!(name_of(7).unwrap(), "Heartbeat");
        assert_eq!(name_of(9).unwrap(), "Pickled Data From Driver");
        assert_eq!(MessageType::Heartbeat.label(), "PORT_AGENT_HEARTBEAT");
    }

    #[test]
    fn test_unknown_codes() {
        for code in [0u8, 10, 200, 255] {
            assert!(MessageType::from_code(code).is_none());
            assert!(matches!(name_of(code), Err(Error::UnknownMessageType(c)) if c == code));
        }
    }

    #[test]
    fn test_try_from() {
        let kind = MessageType::try_from(3).unwrap();
        assert_eq!(kind, MessageType::PortAgentCommand);
        assert_eq!(u8::from(kind), 3);
        assert_eq!(kind.to_string(), "Port Agent Command");
    }
}
