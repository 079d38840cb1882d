//! MIDI utilities and message types
//!
//! Only the message kinds the device link actually exchanges are modelled:
//! control changes, program changes and system exclusive frames. Everything
//! else is carried as an opaque status byte so it can still be logged.

use std::fmt;

/// SysEx start byte
pub const SYSEX_START: u8 = 0xF0;

/// SysEx end byte
pub const SYSEX_END: u8 = 0xF7;

/// MIDI message types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MidiMessage {
    /// Control Change: channel (0-15), cc (0-127), value (0-127)
    ControlChange { channel: u8, cc: u8, value: u8 },

    /// Program Change: channel (0-15), program (0-127)
    ProgramChange { channel: u8, program: u8 },

    /// System Exclusive: payload between the F0/F7 boundaries
    SysEx { data: Vec<u8> },

    /// Any other message, identified by its status byte only
    Other { status: u8 },
}

impl MidiMessage {
    /// Parse a MIDI message from raw bytes
    pub fn parse(data: &[u8]) -> Option<Self> {
        let (&status, rest) = data.split_first()?;

        // Running status would need state we don't keep
        if status < 0x80 {
            return None;
        }

        match status & 0xF0 {
            0xB0 => {
                if rest.len() < 2 { return None; }
                Some(MidiMessage::ControlChange {
                    channel: status & 0x0F,
                    cc: rest[0] & 0x7F,
                    value: rest[1] & 0x7F,
                })
            }
            0xC0 => {
                let program = *rest.first()?;
                Some(MidiMessage::ProgramChange {
                    channel: status & 0x0F,
                    program: program & 0x7F,
                })
            }
            _ if status == SYSEX_START => {
                let end = rest.iter().position(|&b| b == SYSEX_END)?;
                Some(MidiMessage::SysEx { data: rest[..end].to_vec() })
            }
            _ => Some(MidiMessage::Other { status }),
        }
    }

    /// Encode the message to MIDI bytes
    pub fn encode(&self) -> Vec<u8> {
        match *self {
            MidiMessage::ControlChange { channel, cc, value } => {
                vec![0xB0 | (channel & 0x0F), cc & 0x7F, value & 0x7F]
            }
            MidiMessage::ProgramChange { channel, program } => {
                vec![0xC0 | (channel & 0x0F), program & 0x7F]
            }
            MidiMessage::SysEx { ref data } => {
                let mut result = Vec::with_capacity(data.len() + 2);
                result.push(SYSEX_START);
                result.extend_from_slice(data);
                result.push(SYSEX_END);
                result
            }
            MidiMessage::Other { status } => vec![status],
        }
    }

    /// Get the channel for channel messages (0-15), None for system messages
    pub fn channel(&self) -> Option<u8> {
        match *self {
            MidiMessage::ControlChange { channel, .. }
            | MidiMessage::ProgramChange { channel, .. } => Some(channel),
            MidiMessage::Other { status } if status < 0xF0 => Some(status & 0x0F),
            _ => None,
        }
    }
}

impl fmt::Display for MidiMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            MidiMessage::ControlChange { channel, cc, value } => {
                write!(f, "CC ch:{} cc:{} v:{}", channel + 1, cc, value)
            }
            MidiMessage::ProgramChange { channel, program } => {
                write!(f, "ProgramChange ch:{} p:{}", channel + 1, program)
            }
            MidiMessage::SysEx { ref data } => {
                write!(f, "SysEx {} bytes", data.len())
            }
            MidiMessage::Other { status } => write!(f, "Status 0x{:02X}", status),
        }
    }
}

/// Check whether raw bytes start a SysEx frame
pub fn is_sysex(data: &[u8]) -> bool {
    data.first() == Some(&SYSEX_START)
}

/// Format MIDI bytes as hex string for debugging
pub fn format_hex(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_change() {
        let data = vec![0xB2, 7, 100]; // CC ch 3, volume, value 100
        let msg = MidiMessage::parse(&data).unwrap();

        assert_eq!(msg, MidiMessage::ControlChange {
            channel: 2,
            cc: 7,
            value: 100,
        });
        assert_eq!(msg.channel(), Some(2));
    }

    #[test]
    fn test_program_change_masks_to_seven_bits() {
        let msg = MidiMessage::ProgramChange { channel: 0, program: 0x81 };
        assert_eq!(msg.encode(), vec![0xC0, 0x01]);
    }

    #[test]
    fn test_sysex_parse_strips_boundaries() {
        let data = vec![0xF0, 0x00, 0x01, 0x74, 0x03, 0x10, 0xF7];
        let msg = MidiMessage::parse(&data).unwrap();

        assert_eq!(msg, MidiMessage::SysEx { data: vec![0x00, 0x01, 0x74, 0x03, 0x10] });
        assert_eq!(msg.channel(), None);
    }

    #[test]
    fn test_unterminated_sysex_is_rejected() {
        assert_eq!(MidiMessage::parse(&[0xF0, 0x00, 0x01]), None);
    }

    #[test]
    fn test_encode_sysex_adds_boundaries() {
        let msg = MidiMessage::SysEx { data: vec![0x01, 0x02] };
        assert_eq!(msg.encode(), vec![0xF0, 0x01, 0x02, 0xF7]);
    }

    #[test]
    fn test_other_messages_keep_status() {
        let msg = MidiMessage::parse(&[0x90, 60, 100]).unwrap();
        assert_eq!(msg, MidiMessage::Other { status: 0x90 });
        assert_eq!(msg.channel(), Some(0));
        assert_eq!(MidiMessage::parse(&[0xF8]).unwrap().channel(), None);
    }

    #[test]
    fn test_running_status_and_empty_input() {
        assert_eq!(MidiMessage::parse(&[]), None);
        assert_eq!(MidiMessage::parse(&[0x40, 0x10]), None);
    }

    #[test]
    fn test_format_hex() {
        assert_eq!(format_hex(&[0xF0, 0x0A, 0xF7]), "F0 0A F7");
        assert!(is_sysex(&[0xF0]));
        assert!(!is_sysex(&[0xB0, 0, 0]));
    }
}
