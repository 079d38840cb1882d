//! Decoded vendor events

use std::fmt;

use super::constants::{sub_type, NOTE_NAMES};

/// A decoded inbound vendor message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VendorEvent {
    /// Firmware version report, the reply to our version request
    FirmwareVersion { major: u8, minor: u8 },

    /// Name of the active preset
    PresetName { name: String },

    /// Number of the active preset (zero-based)
    PresetNumber { number: u16 },

    /// Realtime tuner reading, sent continuously while the tuner is open
    TunerRealtime { note: u8, string: u8, fine: u8 },

    /// Realtime tempo pulse
    TempoRealtime,

    /// Looper state change
    LooperStatus(LooperStatus),

    /// Blocks-and-bypass dump of the active preset, carried uninterpreted
    BypassStates { raw: Vec<u8> },

    /// Parameter value response
    ParameterSet {
        effect_id: u16,
        param_id: u16,
        value: u32,
        label: String,
    },

    /// Any other sub-type
    Other { sub_type: u8 },
}

impl VendorEvent {
    /// Sub-type byte this event was decoded from
    pub fn sub_type(&self) -> u8 {
        match self {
            VendorEvent::FirmwareVersion { .. } => sub_type::FIRMWARE_VERSION,
            VendorEvent::PresetName { .. } => sub_type::PRESET_NAME,
            VendorEvent::PresetNumber { .. } => sub_type::PRESET_CHANGE,
            VendorEvent::TunerRealtime { .. } => sub_type::REALTIME_TUNER,
            VendorEvent::TempoRealtime => sub_type::REALTIME_TEMPO,
            VendorEvent::LooperStatus(_) => sub_type::LOOPER_STATUS,
            VendorEvent::BypassStates { .. } => sub_type::GET_PRESET_BLOCKS_AND_BYPASS,
            VendorEvent::ParameterSet { .. } => sub_type::SET_PARAMETER,
            VendorEvent::Other { sub_type } => *sub_type,
        }
    }

    /// Note name of a tuner reading, if this is one
    pub fn note_name(&self) -> Option<&'static str> {
        match self {
            VendorEvent::TunerRealtime { note, .. } => NOTE_NAMES.get(*note as usize).copied(),
            _ => None,
        }
    }
}

impl fmt::Display for VendorEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VendorEvent::FirmwareVersion { major, minor } => {
                write!(f, "Firmware {}.{:02}", major, minor)
            }
            VendorEvent::PresetName { name } => write!(f, "Preset name '{}'", name),
            VendorEvent::PresetNumber { number } => write!(f, "Preset #{}", u32::from(*number) + 1),
            VendorEvent::TunerRealtime { string, fine, .. } => write!(
                f,
                "Tuner {} string:{} fine:{}",
                self.note_name().unwrap_or("??").trim_end(),
                string,
                fine
            ),
            VendorEvent::TempoRealtime => write!(f, "Tempo"),
            VendorEvent::LooperStatus(status) => write!(f, "Looper {:?}", status),
            VendorEvent::BypassStates { raw } => write!(f, "Bypass states {} bytes", raw.len()),
            VendorEvent::ParameterSet { effect_id, param_id, value, label } => write!(
                f,
                "Param effect:{} param:{} value:{} '{}'",
                effect_id, param_id, value, label
            ),
            VendorEvent::Other { sub_type } => write!(f, "Vendor sub-type 0x{:02X}", sub_type),
        }
    }
}

/// Looper state bits
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct LooperStatus(pub u8);

impl LooperStatus {
    pub fn record(self) -> bool { self.bit(0) }
    pub fn play(self) -> bool { self.bit(1) }
    pub fn once(self) -> bool { self.bit(2) }
    pub fn overdub(self) -> bool { self.bit(3) }
    pub fn reverse(self) -> bool { self.bit(4) }
    pub fn half_speed(self) -> bool { self.bit(5) }

    fn bit(self, n: u8) -> bool {
        self.0 & (1 << n) != 0
    }
}

impl fmt::Debug for LooperStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LooperStatus")
            .field("record", &self.record())
            .field("play", &self.play())
            .field("once", &self.once())
            .field("overdub", &self.overdub())
            .field("reverse", &self.reverse())
            .field("half_speed", &self.half_speed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_looper_flags() {
        let status = LooperStatus(0b10_1010);
        assert!(!status.record());
        assert!(status.play());
        assert!(!status.once());
        assert!(status.overdub());
        assert!(!status.reverse());
        assert!(status.half_speed());
    }

    #[test]
    fn test_note_names() {
        let tuner = VendorEvent::TunerRealtime { note: 3, string: 5, fine: 63 };
        assert_eq!(tuner.note_name(), Some("C "));
        assert_eq!(tuner.to_string(), "Tuner C string:5 fine:63");

        let out_of_range = VendorEvent::TunerRealtime { note: 12, string: 0, fine: 0 };
        assert_eq!(out_of_range.note_name(), None);
        assert_eq!(VendorEvent::TempoRealtime.note_name(), None);
    }

    #[test]
    fn test_sub_type_round_trips_to_catalog() {
        assert_eq!(VendorEvent::TempoRealtime.sub_type(), sub_type::REALTIME_TEMPO);
        assert_eq!(VendorEvent::Other { sub_type: 0x42 }.sub_type(), 0x42);
        assert_eq!(
            VendorEvent::PresetNumber { number: 0 }.sub_type(),
            sub_type::PRESET_CHANGE
        );
    }
}
