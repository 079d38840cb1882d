//! Transport capability consumed by the device link
//!
//! The link only needs to pull one complete SysEx message at a time and to
//! push bytes out. Framing of the byte stream belongs to the transport.

pub mod midir_port;

use thiserror::Error;

use crate::midi::MidiMessage;

pub use midir_port::MidirTransport;

/// Transport failures
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("MIDI port '{0}' not found")]
    PortNotFound(String),

    #[error("Failed to initialise MIDI backend: {0}")]
    Init(#[from] midir::InitError),

    #[error("Failed to connect to MIDI port '{port}': {reason}")]
    Connect { port: String, reason: String },

    #[error("Failed to send MIDI data: {0}")]
    Send(#[from] midir::SendError),

    #[error("Not connected to output port")]
    NotConnected,
}

/// Byte-level MIDI transport
pub trait Transport {
    /// Take the next complete inbound SysEx message (F0 ... F7), if any
    ///
    /// Must not block. Messages come out in arrival order.
    fn try_read_sysex(&mut self) -> Option<Vec<u8>>;

    /// Write raw bytes to the output
    fn send_bytes(&mut self, data: &[u8]) -> Result<(), TransportError>;

    /// Encode and send a MIDI message
    fn send_message(&mut self, message: &MidiMessage) -> Result<(), TransportError> {
        self.send_bytes(&message.encode())
    }

    /// Send a SysEx body, adding the F0/F7 boundaries
    fn send_sysex(&mut self, body: &[u8]) -> Result<(), TransportError> {
        self.send_message(&MidiMessage::SysEx { data: body.to_vec() })
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn try_read_sysex(&mut self) -> Option<Vec<u8>> {
        (**self).try_read_sysex()
    }

    fn send_bytes(&mut self, data: &[u8]) -> Result<(), TransportError> {
        (**self).send_bytes(data)
    }
}
